//! Configuration module
//!
//! Handles parsing and validating JSON crawl configurations.
//!
//! # Example
//!
//! ```no_run
//! use gleaner::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawl.json")).unwrap();
//! println!("Crawling {} with the {} engine", config.start_url, config.engine);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    CrawlConfig, EngineKind, ExtractorConfig, NavigationConfig, PaginationConfig, WaitConfig,
};

// Re-export parser and validation entry points
pub use parser::{load_config, parse_config};
pub use validation::{check, validate, ValidationReport};
