use crate::config::types::CrawlConfig;
use crate::config::validation::validate;
use crate::ConfigResult;
use std::fs;
use std::path::Path;

/// Parses a configuration from a JSON string and validates it
pub fn parse_config(json: &str) -> ConfigResult<CrawlConfig> {
    let config: CrawlConfig = serde_json::from_str(json)?;
    validate(&config)?;
    Ok(config)
}

/// Loads a configuration from a JSON file and validates it
///
/// # Arguments
///
/// * `path` - Path to the JSON configuration file
///
/// # Returns
///
/// * `Ok(CrawlConfig)` - Parsed and validated configuration
/// * `Err(ConfigError)` - Read, parse, or validation failure
pub fn load_config(path: &Path) -> ConfigResult<CrawlConfig> {
    let contents = fs::read_to_string(path)?;
    parse_config(&contents)
}
