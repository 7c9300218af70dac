//! Crawl orchestration
//!
//! Top-level driver and sole owner of the rendering backend's lifecycle:
//! acquire once at crawl start, release once at crawl end regardless of
//! outcome, including the fatal path. The backend variant is a pure
//! function of the configuration's `engine` value.

use crate::backend::{Backend, BrowserBackend, StaticBackend};
use crate::config::{CrawlConfig, EngineKind};
use crate::crawler::paginator;
use crate::output::{CrawlError, CrawlResult};
use crate::BackendError;

/// Executes a crawl and assembles its final result
///
/// The configuration is expected to be validated already; validation
/// failures never reach this point. `success` is false only when the
/// initial page load (or backend acquisition) failed — accumulated
/// per-item errors alongside extracted records still yield success.
pub async fn execute(config: &CrawlConfig) -> CrawlResult {
    tracing::info!(
        "Starting crawl of {} with the {} engine",
        config.start_url,
        config.engine
    );

    match config.engine {
        EngineKind::Static => match StaticBackend::acquire(&config.wait_config) {
            Ok(backend) => run_with(backend, config).await,
            Err(e) => acquisition_failure(config, e),
        },
        EngineKind::Browser => match BrowserBackend::acquire(&config.wait_config).await {
            Ok(backend) => run_with(backend, config).await,
            Err(e) => acquisition_failure(config, e),
        },
    }
}

async fn run_with<B: Backend>(mut backend: B, config: &CrawlConfig) -> CrawlResult {
    let outcome = paginator::run(&mut backend, config).await;

    // Release before assembling: every exit path of the walk ends here,
    // the fatal one included.
    backend.release().await;

    if outcome.fatal {
        tracing::error!("Crawl failed fatally: {} errors", outcome.errors.len());
    } else {
        tracing::info!(
            "Crawl finished: {} records, {} errors",
            outcome.records.len(),
            outcome.errors.len()
        );
    }

    CrawlResult {
        success: !outcome.fatal,
        total_items: outcome.records.len(),
        data: outcome.records,
        next_page_url: outcome.next_page_url,
        context: config.context.clone(),
        errors: outcome.errors,
    }
}

fn acquisition_failure(config: &CrawlConfig, error: BackendError) -> CrawlResult {
    tracing::error!("Failed to acquire {} backend: {}", config.engine, error);
    CrawlResult {
        success: false,
        data: Vec::new(),
        next_page_url: None,
        total_items: 0,
        context: config.context.clone(),
        errors: vec![CrawlError::page(&config.start_url, error.to_string())],
    }
}
