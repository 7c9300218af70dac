//! Field extraction
//!
//! Applies the ordered extractor list to one page or element, producing a
//! record. Partial-record semantics: a failing field is written as null
//! and recorded as an error, and extraction continues with the remaining
//! fields. A record is never discarded wholesale for one bad field.

use crate::backend::{Backend, Target};
use crate::config::ExtractorConfig;
use crate::crawler::resolver;
use crate::output::{CrawlError, ExtractedRecord, FieldValue};
use url::Url;

/// Extracts one record from the target
///
/// Returns the record together with any field-scoped errors.
pub async fn extract<B: Backend>(
    backend: &B,
    target: Target<'_, B::Page, B::Element>,
    extractors: &[ExtractorConfig],
    page_url: &Url,
) -> (ExtractedRecord, Vec<CrawlError>) {
    let mut record = ExtractedRecord::new();
    let mut errors = Vec::new();

    for rule in extractors {
        match resolver::resolve(backend, target, &rule.selector, &rule.attribute, rule.multiple)
            .await
        {
            Ok(value) => {
                record.insert(rule.field_name.clone(), value);
            }
            Err(e) => {
                tracing::warn!(
                    "Field '{}' failed on {}: {}",
                    rule.field_name,
                    page_url,
                    e
                );
                record.insert(rule.field_name.clone(), FieldValue::null());
                errors.push(CrawlError::field(
                    page_url.as_str(),
                    &rule.field_name,
                    e.to_string(),
                ));
            }
        }
    }

    (record, errors)
}
