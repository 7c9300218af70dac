use crate::config::types::{CrawlConfig, EngineKind, ExtractorConfig};
use crate::ConfigError;
use scraper::Selector;
use serde::Serialize;
use std::collections::HashSet;
use url::Url;

/// Outcome of checking a configuration without executing it
#[derive(Debug, Clone, Default, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Checks a configuration and collects every problem found
///
/// Errors make the configuration unusable; warnings are advisory and do
/// not block a crawl.
pub fn check(config: &CrawlConfig) -> ValidationReport {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();

    check_start_url(config, &mut errors);
    check_extractors(&config.extractors, &mut errors);
    check_navigation(config, &mut errors);
    check_pagination(config, &mut errors);
    check_wait(config, &mut errors);

    if config.engine == EngineKind::Browser && config.wait_config.delay_between_requests < 1.0 {
        warnings.push(
            "Consider increasing delay_between_requests for the browser engine to avoid being blocked"
                .to_string(),
        );
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
        warnings,
    }
}

/// Validates the entire configuration, failing on the collected errors
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    let report = check(config);
    if report.valid {
        Ok(())
    } else {
        Err(ConfigError::Validation(report.errors.join("; ")))
    }
}

fn check_start_url(config: &CrawlConfig, errors: &mut Vec<String>) {
    if config.start_url.is_empty() {
        errors.push("start_url is required".to_string());
        return;
    }

    match Url::parse(&config.start_url) {
        Ok(url) if url.scheme() == "http" || url.scheme() == "https" => {}
        Ok(url) => errors.push(format!(
            "start_url must use http or https, got '{}'",
            url.scheme()
        )),
        Err(e) => errors.push(format!("start_url is not a valid URL: {}", e)),
    }
}

fn check_extractors(extractors: &[ExtractorConfig], errors: &mut Vec<String>) {
    if extractors.is_empty() {
        errors.push("At least one extractor is required".to_string());
        return;
    }

    let mut seen = HashSet::new();
    for (i, extractor) in extractors.iter().enumerate() {
        if extractor.field_name.is_empty() {
            errors.push(format!("Extractor {}: field_name is required", i));
        } else if !seen.insert(extractor.field_name.as_str()) {
            errors.push(format!(
                "Extractor {}: duplicate field_name '{}'",
                i, extractor.field_name
            ));
        }

        if extractor.selector.is_empty() {
            errors.push(format!("Extractor {}: selector is required", i));
        } else {
            check_selector(&extractor.selector, &format!("Extractor {}", i), errors);
        }

        if extractor.attribute.is_empty() {
            errors.push(format!("Extractor {}: attribute cannot be empty", i));
        }
    }
}

fn check_navigation(config: &CrawlConfig, errors: &mut Vec<String>) {
    let Some(nav) = &config.navigation else {
        return;
    };

    if nav.list_items_selector.is_empty() {
        errors.push("Navigation config: list_items_selector is required".to_string());
    } else {
        check_selector(&nav.list_items_selector, "Navigation config", errors);
    }

    if let Some(selector) = &nav.detail_link_selector {
        if selector.is_empty() {
            errors.push("Navigation config: detail_link_selector cannot be empty".to_string());
        } else {
            check_selector(selector, "Navigation config", errors);
        }
    }

    if nav.detail_link_attribute.is_empty() {
        errors.push("Navigation config: detail_link_attribute cannot be empty".to_string());
    }
}

fn check_pagination(config: &CrawlConfig, errors: &mut Vec<String>) {
    let Some(pagination) = &config.pagination else {
        return;
    };

    if pagination.enabled {
        match &pagination.next_page_selector {
            Some(selector) if !selector.is_empty() => {
                check_selector(selector, "Pagination config", errors);
            }
            _ => errors.push(
                "Pagination config: next_page_selector is required when pagination is enabled"
                    .to_string(),
            ),
        }

        if pagination.next_page_attribute.is_empty() {
            errors.push("Pagination config: next_page_attribute cannot be empty".to_string());
        }
    }

    if let Some(max_pages) = pagination.max_pages {
        if max_pages == 0 {
            errors.push("Pagination config: max_pages must be greater than 0".to_string());
        }
    }
}

fn check_wait(config: &CrawlConfig, errors: &mut Vec<String>) {
    let delay = config.wait_config.delay_between_requests;
    if !delay.is_finite() || delay < 0.0 {
        errors.push(format!(
            "Wait config: delay_between_requests must be a non-negative number, got {}",
            delay
        ));
    }
}

fn check_selector(selector: &str, scope: &str, errors: &mut Vec<String>) {
    if Selector::parse(selector).is_err() {
        errors.push(format!("{}: malformed selector '{}'", scope, selector));
    }
}
