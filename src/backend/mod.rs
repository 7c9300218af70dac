//! Rendering backends
//!
//! A rendering backend turns a URL into a queryable document. Two variants
//! share the [`Backend`] contract: [`StaticBackend`] performs a single HTTP
//! GET and parses the returned markup with no script execution;
//! [`BrowserBackend`] drives a real headless browser session and can wait
//! for client-side rendering. The variant is a pure function of the
//! configuration's `engine` value; there is no fallback between variants.

pub mod browser;
pub mod static_fetch;

pub use browser::BrowserBackend;
pub use static_fetch::StaticBackend;

use crate::BackendResult;
use async_trait::async_trait;
use url::Url;

/// A query target: either a whole page or one element within it
pub enum Target<'a, P, E> {
    Page(&'a P),
    Element(&'a E),
}

impl<P, E> Clone for Target<'_, P, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<P, E> Copy for Target<'_, P, E> {}

/// Capability set shared by every rendering backend
///
/// Page and element handles are created and destroyed exclusively by the
/// owning backend and are never shared across concurrent visits; the crawl
/// engine visits pages strictly one at a time.
#[async_trait]
pub trait Backend: Send {
    type Page: Send + Sync;
    type Element: Send + Sync;

    /// Loads a URL into a fresh page handle
    ///
    /// Fails with `Load`, `Timeout`, or `HttpStatus` when the document
    /// cannot be brought to a queryable state.
    async fn open(&mut self, url: &Url) -> BackendResult<Self::Page>;

    /// Follows a link from an existing page, reusing the underlying
    /// session where the backend supports it
    ///
    /// Consumes the source page: the returned handle replaces it.
    async fn navigate(&mut self, page: Self::Page, url: &Url) -> BackendResult<Self::Page>;

    /// Returns the first element matching `selector`, or `None`
    async fn query_one(
        &self,
        target: Target<'_, Self::Page, Self::Element>,
        selector: &str,
    ) -> BackendResult<Option<Self::Element>>;

    /// Returns every element matching `selector`, in document order
    async fn query_all(
        &self,
        target: Target<'_, Self::Page, Self::Element>,
        selector: &str,
    ) -> BackendResult<Vec<Self::Element>>;

    /// Reads `"text"` (trimmed visible text) or an HTML attribute from an
    /// element; absence is `None`, never an error
    async fn read(&self, element: &Self::Element, attribute: &str) -> BackendResult<Option<String>>;

    /// Best-effort wait for `selector` to appear on a page
    ///
    /// The static variant returns immediately; the browser variant polls up
    /// to the configured element wait timeout. Absence afterwards simply
    /// yields empty query results.
    async fn wait_for(&self, page: &Self::Page, selector: &str);

    /// The page's final URL, after any redirects
    fn page_url<'a>(&self, page: &'a Self::Page) -> &'a Url;

    /// Destroys a page handle
    async fn close_page(&self, page: Self::Page);

    /// Releases the backend and any external session it owns
    ///
    /// Called exactly once per crawl, on every exit path.
    async fn release(self);
}

/// Reads the `"text"` pseudo-attribute name used by extraction rules
pub(crate) const TEXT_ATTRIBUTE: &str = "text";
