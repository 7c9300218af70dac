use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Value extracted for one field of a record
///
/// Serializes to `null` (no match, single), a string (single match), or an
/// array of strings (`multiple` rule, possibly empty).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Single(Option<String>),
    Multiple(Vec<String>),
}

impl FieldValue {
    /// The null value written when a single-match rule found nothing or a
    /// field failed to extract
    pub fn null() -> Self {
        FieldValue::Single(None)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Single(None))
    }
}

/// One extracted record: field name to extracted value, in stable order
pub type ExtractedRecord = BTreeMap<String, FieldValue>;

/// Where in the crawl an error originated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "scope", rename_all = "snake_case")]
pub enum ErrorContext {
    /// A page-level failure (list page load, next-link resolution)
    Page { url: String },

    /// A failure scoped to one list item
    Item {
        index: usize,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
    },

    /// A failure scoped to one field of one page
    Field { url: String, field: String },
}

/// An error accumulated during a crawl, never fatal past the first page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlError {
    #[serde(flatten)]
    pub context: ErrorContext,
    pub message: String,
}

impl CrawlError {
    pub fn page(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            context: ErrorContext::Page { url: url.into() },
            message: message.into(),
        }
    }

    pub fn item(index: usize, url: Option<String>, message: impl Into<String>) -> Self {
        Self {
            context: ErrorContext::Item { index, url },
            message: message.into(),
        }
    }

    pub fn field(
        url: impl Into<String>,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            context: ErrorContext::Field {
                url: url.into(),
                field: field.into(),
            },
            message: message.into(),
        }
    }
}

impl std::fmt::Display for CrawlError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.context {
            ErrorContext::Page { url } => write!(f, "[{}] {}", url, self.message),
            ErrorContext::Item { index, url } => match url {
                Some(url) => write!(f, "[item {} @ {}] {}", index, url, self.message),
                None => write!(f, "[item {}] {}", index, self.message),
            },
            ErrorContext::Field { url, field } => {
                write!(f, "[{} field '{}'] {}", url, field, self.message)
            }
        }
    }
}

/// Terminal aggregate of one crawl invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlResult {
    /// False only when the crawl failed fatally (initial page unreachable
    /// or the backend could not be acquired)
    pub success: bool,

    /// Extracted records, in visit order
    pub data: Vec<ExtractedRecord>,

    /// Next-page URL when the crawl stopped at max_pages with more pages
    /// available; a caller resumes by crawling this URL
    pub next_page_url: Option<String>,

    /// Count of records in `data`
    pub total_items: usize,

    /// Context passed through from the configuration, unchanged
    pub context: Map<String, Value>,

    /// Every error accumulated during the crawl
    pub errors: Vec<CrawlError>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_value_serialization() {
        assert_eq!(serde_json::to_string(&FieldValue::null()).unwrap(), "null");
        assert_eq!(
            serde_json::to_string(&FieldValue::Single(Some("x".to_string()))).unwrap(),
            r#""x""#
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Multiple(vec![])).unwrap(),
            "[]"
        );
        assert_eq!(
            serde_json::to_string(&FieldValue::Multiple(vec!["a".to_string(), "b".to_string()]))
                .unwrap(),
            r#"["a","b"]"#
        );
    }

    #[test]
    fn test_empty_list_is_not_null() {
        assert!(FieldValue::null().is_null());
        assert!(!FieldValue::Multiple(vec![]).is_null());
    }

    #[test]
    fn test_crawl_error_display() {
        let e = CrawlError::item(2, Some("https://a.test/d2".to_string()), "HTTP 404");
        assert_eq!(e.to_string(), "[item 2 @ https://a.test/d2] HTTP 404");

        let e = CrawlError::field("https://a.test/", "title", "malformed selector");
        assert!(e.to_string().contains("field 'title'"));
    }

    #[test]
    fn test_crawl_error_json_shape() {
        let e = CrawlError::page("https://a.test/", "connection refused");
        let json = serde_json::to_value(&e).unwrap();
        assert_eq!(json["scope"], "page");
        assert_eq!(json["url"], "https://a.test/");
        assert_eq!(json["message"], "connection refused");
    }

    #[test]
    fn test_crawl_result_json_field_names() {
        let result = CrawlResult {
            success: true,
            data: vec![ExtractedRecord::from([(
                "title".to_string(),
                FieldValue::Single(Some("Hello".to_string())),
            )])],
            next_page_url: None,
            total_items: 1,
            context: Map::new(),
            errors: vec![],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["total_items"], 1);
        assert_eq!(json["data"][0]["title"], "Hello");
        assert_eq!(json["next_page_url"], serde_json::Value::Null);
        assert!(json["errors"].as_array().unwrap().is_empty());
    }
}
