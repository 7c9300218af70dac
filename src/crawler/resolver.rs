//! Selector resolution
//!
//! Maps one selector rule to a field value against a page or element.
//! Absence is data here: a selector matching nothing yields null (single)
//! or an empty list (multiple), never an error. Only a malformed selector
//! string raises, and callers record that as an item-scoped crawl error.

use crate::backend::{Backend, Target};
use crate::output::FieldValue;
use crate::{BackendError, BackendResult};
use scraper::Selector;

/// Validates selector syntax without running a query
///
/// `scraper`'s CSS parser is the single syntax authority for both
/// backends, so a selector the static engine would reject also fails
/// before ever reaching the browser.
pub fn check_selector(selector: &str) -> BackendResult<()> {
    Selector::parse(selector)
        .map(|_| ())
        .map_err(|_| BackendError::SelectorSyntax {
            selector: selector.to_string(),
        })
}

/// Resolves a selector rule to its value
pub async fn resolve<B: Backend>(
    backend: &B,
    target: Target<'_, B::Page, B::Element>,
    selector: &str,
    attribute: &str,
    multiple: bool,
) -> BackendResult<FieldValue> {
    check_selector(selector)?;

    if multiple {
        let mut values = Vec::new();
        for element in backend.query_all(target, selector).await? {
            if let Some(value) = backend.read(&element, attribute).await? {
                values.push(value);
            }
        }
        Ok(FieldValue::Multiple(values))
    } else {
        match backend.query_one(target, selector).await? {
            Some(element) => Ok(FieldValue::Single(backend.read(&element, attribute).await?)),
            None => Ok(FieldValue::Single(None)),
        }
    }
}
