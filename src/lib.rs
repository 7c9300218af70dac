//! Gleaner: a configurable structured-data web crawler
//!
//! This crate extracts structured records from web pages according to a
//! declarative JSON configuration. It supports static-HTML fetching and
//! browser-driven rendering, list-to-detail navigation, and multi-page
//! pagination.

pub mod backend;
pub mod config;
pub mod crawler;
pub mod output;

use thiserror::Error;

/// Main error type for gleaner operations
#[derive(Debug, Error)]
pub enum GleanerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Errors raised by a rendering backend
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Failed to load {url}: {message}")]
    Load { url: String, message: String },

    #[error("HTTP {status} for {url}")]
    HttpStatus { url: String, status: u16 },

    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Malformed selector: {selector}")]
    SelectorSyntax { selector: String },

    #[error("Browser session error: {0}")]
    Session(String),
}

/// Result type alias for gleaner operations
pub type Result<T> = std::result::Result<T, GleanerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for backend operations
pub type BackendResult<T> = std::result::Result<T, BackendError>;

// Re-export commonly used types
pub use config::{CrawlConfig, EngineKind};
pub use crawler::execute;
pub use output::{CrawlError, CrawlResult, ExtractedRecord, FieldValue};
