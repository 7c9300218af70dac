//! Pagination
//!
//! Drives the navigation engine across successive list pages. Only the
//! very first page load is fatal; everything after it is accumulated and
//! the walk stops early instead of aborting.

use crate::backend::{Backend, Target};
use crate::config::{CrawlConfig, PaginationConfig};
use crate::crawler::navigator;
use crate::crawler::resolver;
use crate::output::{CrawlError, ExtractedRecord, FieldValue};
use url::Url;

/// Everything accumulated across the whole walk
#[derive(Debug, Default)]
pub struct CrawlOutcome {
    pub records: Vec<ExtractedRecord>,
    pub errors: Vec<CrawlError>,
    pub next_page_url: Option<String>,
    /// Set when the initial page could not be loaded
    pub fatal: bool,
}

/// Walks list pages from the configured start URL
///
/// Termination conditions are checked in order after each list page:
/// no next-page URL resolved (pagination exhausted), the page counter
/// reaching `max_pages` (the unvisited next URL is surfaced in the
/// outcome), otherwise the walk continues onto the resolved URL. With
/// pagination disabled or absent exactly one list page is processed.
pub async fn run<B: Backend>(backend: &mut B, config: &CrawlConfig) -> CrawlOutcome {
    let mut outcome = CrawlOutcome::default();

    let start_url = match Url::parse(&config.start_url) {
        Ok(url) => url,
        Err(e) => {
            outcome.errors.push(CrawlError::page(
                &config.start_url,
                format!("invalid start URL: {}", e),
            ));
            outcome.fatal = true;
            return outcome;
        }
    };

    let mut current = match backend.open(&start_url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::error!("Initial page load failed: {}", e);
            outcome
                .errors
                .push(CrawlError::page(start_url.as_str(), e.to_string()));
            outcome.fatal = true;
            return outcome;
        }
    };

    let mut pages_processed: u32 = 0;

    loop {
        let page_url = backend.page_url(&current).clone();
        tracing::info!("Processing list page {}: {}", pages_processed + 1, page_url);

        let page_outcome = navigator::walk_list_page(backend, &current, config).await;
        outcome.records.extend(page_outcome.records);
        outcome.errors.extend(page_outcome.errors);
        pages_processed += 1;

        let Some(pagination) = config.pagination.as_ref().filter(|p| p.enabled) else {
            backend.close_page(current).await;
            break;
        };

        let next = match resolve_next_url(backend, &current, pagination, &page_url).await {
            Ok(next) => next,
            Err(error) => {
                outcome.errors.push(error);
                backend.close_page(current).await;
                break;
            }
        };

        let Some(next) = next else {
            tracing::info!("Pagination exhausted after {} pages", pages_processed);
            backend.close_page(current).await;
            break;
        };

        // A next link pointing back at the current page would loop forever.
        if next == page_url {
            backend.close_page(current).await;
            break;
        }

        if let Some(max_pages) = pagination.max_pages {
            if pages_processed >= max_pages {
                tracing::info!(
                    "Reached max_pages = {}, surfacing next page {}",
                    max_pages,
                    next
                );
                outcome.next_page_url = Some(next.to_string());
                backend.close_page(current).await;
                break;
            }
        }

        current = match backend.navigate(current, &next).await {
            Ok(page) => page,
            Err(e) => {
                // Not the initial page: record it and stop, never abort.
                tracing::warn!("Next list page {} failed to load: {}", next, e);
                outcome
                    .errors
                    .push(CrawlError::page(next.as_str(), e.to_string()));
                break;
            }
        };
    }

    outcome
}

/// Resolves the next-page URL from the just-processed list page
async fn resolve_next_url<B: Backend>(
    backend: &B,
    page: &B::Page,
    pagination: &PaginationConfig,
    base: &Url,
) -> Result<Option<Url>, CrawlError> {
    let Some(selector) = pagination.next_page_selector.as_deref() else {
        return Ok(None);
    };

    let resolved = resolver::resolve(
        backend,
        Target::Page(page),
        selector,
        &pagination.next_page_attribute,
        false,
    )
    .await
    .map_err(|e| CrawlError::page(base.as_str(), e.to_string()))?;

    match resolved {
        FieldValue::Single(Some(href)) => base.join(&href).map(Some).map_err(|e| {
            CrawlError::page(
                base.as_str(),
                format!("cannot resolve next page URL '{}': {}", href, e),
            )
        }),
        _ => Ok(None),
    }
}
