//! List-page navigation
//!
//! Walks one list page: enumerate its items, then visit each item's
//! detail page (or extract the item in place when no detail link is
//! configured). A failure on one item is recorded and never stops the
//! walk; only the caller treats list-page loads themselves as fatal.

use crate::backend::{Backend, Target};
use crate::config::CrawlConfig;
use crate::crawler::extractor::extract;
use crate::output::{CrawlError, ExtractedRecord};
use url::Url;

/// Records and errors accumulated from one list page
#[derive(Debug, Default)]
pub struct PageOutcome {
    pub records: Vec<ExtractedRecord>,
    pub errors: Vec<CrawlError>,
}

/// Processes one loaded list page
///
/// With no `navigation` configured the page itself is the sole extraction
/// target. Otherwise items are enumerated in document order and their
/// detail URLs are resolved up front, against the still-loaded list page;
/// visits then proceed one at a time with the configured inter-request
/// delay between consecutive visits, applied even when a visit failed.
pub async fn walk_list_page<B: Backend>(
    backend: &mut B,
    page: &B::Page,
    config: &CrawlConfig,
) -> PageOutcome {
    let page_url = backend.page_url(page).clone();
    let mut outcome = PageOutcome::default();

    let Some(nav) = &config.navigation else {
        let (record, field_errors) =
            extract(backend, Target::Page(page), &config.extractors, &page_url).await;
        outcome.records.push(record);
        outcome.errors.extend(field_errors);
        return outcome;
    };

    backend.wait_for(page, &nav.list_items_selector).await;

    let items = match backend
        .query_all(Target::Page(page), &nav.list_items_selector)
        .await
    {
        Ok(items) => items,
        Err(e) => {
            outcome
                .errors
                .push(CrawlError::page(page_url.as_str(), e.to_string()));
            return outcome;
        }
    };

    tracing::info!("Found {} items on {}", items.len(), page_url);

    match &nav.detail_link_selector {
        Some(link_selector) => {
            // Resolve every detail URL before leaving the list page.
            let mut plan = Vec::with_capacity(items.len());
            for (index, item) in items.iter().enumerate() {
                plan.push(
                    resolve_detail_url(
                        backend,
                        item,
                        index,
                        link_selector,
                        &nav.detail_link_attribute,
                        &page_url,
                    )
                    .await,
                );
            }

            for (index, planned) in plan.into_iter().enumerate() {
                if index > 0 {
                    tokio::time::sleep(config.wait_config.request_delay()).await;
                }
                match planned {
                    Err(error) => outcome.errors.push(error),
                    Ok(detail_url) => {
                        visit_detail(backend, index, &detail_url, config, &mut outcome).await;
                    }
                }
            }
        }
        None => {
            for (index, item) in items.iter().enumerate() {
                if index > 0 {
                    tokio::time::sleep(config.wait_config.request_delay()).await;
                }
                let (record, field_errors) =
                    extract(backend, Target::Element(item), &config.extractors, &page_url).await;
                outcome.records.push(record);
                outcome.errors.extend(field_errors);
            }
        }
    }

    outcome
}

/// Opens one detail page, extracts it, and releases it
async fn visit_detail<B: Backend>(
    backend: &mut B,
    index: usize,
    detail_url: &Url,
    config: &CrawlConfig,
    outcome: &mut PageOutcome,
) {
    tracing::debug!("Visiting detail page {} for item {}", detail_url, index);

    let detail_page = match backend.open(detail_url).await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!("Item {} detail page failed: {}", index, e);
            outcome.errors.push(CrawlError::item(
                index,
                Some(detail_url.to_string()),
                e.to_string(),
            ));
            return;
        }
    };

    let final_url = backend.page_url(&detail_page).clone();
    let (record, field_errors) = extract(
        backend,
        Target::Page(&detail_page),
        &config.extractors,
        &final_url,
    )
    .await;
    outcome.records.push(record);
    outcome.errors.extend(field_errors);

    backend.close_page(detail_page).await;
}

/// Resolves an item's detail URL against the list page URL
async fn resolve_detail_url<B: Backend>(
    backend: &B,
    item: &B::Element,
    index: usize,
    link_selector: &str,
    link_attribute: &str,
    base: &Url,
) -> Result<Url, CrawlError> {
    let link = backend
        .query_one(Target::Element(item), link_selector)
        .await
        .map_err(|e| CrawlError::item(index, None, e.to_string()))?;

    let Some(link) = link else {
        return Err(CrawlError::item(
            index,
            None,
            format!("no element matched detail link selector '{}'", link_selector),
        ));
    };

    let href = backend
        .read(&link, link_attribute)
        .await
        .map_err(|e| CrawlError::item(index, None, e.to_string()))?;

    let Some(href) = href else {
        return Err(CrawlError::item(
            index,
            None,
            format!("detail link has no '{}' attribute", link_attribute),
        ));
    };

    base.join(&href).map_err(|e| {
        CrawlError::item(
            index,
            None,
            format!("cannot resolve detail URL '{}': {}", href, e),
        )
    })
}
