//! Crawl execution engine
//!
//! The engine layers, leaf-first: selector resolution, field extraction,
//! list-page navigation, pagination, and the orchestrator that owns the
//! rendering backend for the duration of one crawl. Every layer returns
//! partial results together with accumulated errors; only the initial
//! page load can fail the crawl as a whole.

pub mod extractor;
pub mod navigator;
pub mod orchestrator;
pub mod paginator;
pub mod resolver;

pub use navigator::PageOutcome;
pub use orchestrator::execute;
pub use paginator::CrawlOutcome;
