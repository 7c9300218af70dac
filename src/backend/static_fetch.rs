//! Static-fetch rendering backend
//!
//! Performs a single HTTP GET per page and parses the returned markup with
//! `scraper`. No scripts run; what the server sends is what gets queried.
//!
//! Pages hold the final URL and the raw document text. Elements hold their
//! serialized fragment and are re-parsed per query, which keeps handles
//! owned and `Send` without tying them to a parsed document's lifetime.

use crate::backend::{Backend, Target, TEXT_ATTRIBUTE};
use crate::config::WaitConfig;
use crate::{BackendError, BackendResult};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::time::Duration;
use url::Url;

/// User agent presented by the static variant
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// A fetched, parsed-on-demand document
pub struct StaticPage {
    url: Url,
    html: String,
}

impl StaticPage {
    pub(crate) fn from_html(url: Url, html: impl Into<String>) -> Self {
        Self {
            url,
            html: html.into(),
        }
    }
}

/// One element, held as its serialized fragment
pub struct StaticElement {
    fragment: String,
}

/// Static-fetch backend over a shared HTTP client
pub struct StaticBackend {
    client: Client,
}

impl StaticBackend {
    /// Builds the backend and its HTTP client
    ///
    /// The client carries the page-load timeout, so every `open` call is
    /// bounded without per-request bookkeeping.
    pub fn acquire(wait: &WaitConfig) -> BackendResult<Self> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(wait.page_load())
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true)
            .build()
            .map_err(|e| BackendError::Session(e.to_string()))?;

        Ok(Self { client })
    }

    async fn fetch(&self, url: &Url) -> BackendResult<StaticPage> {
        let response = self
            .client
            .get(url.as_str())
            .send()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(BackendError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| classify_request_error(url, &e))?;

        tracing::debug!("Fetched {} ({} bytes)", final_url, body.len());
        Ok(StaticPage::from_html(final_url, body))
    }
}

fn classify_request_error(url: &Url, error: &reqwest::Error) -> BackendError {
    if error.is_timeout() {
        BackendError::Timeout {
            url: url.to_string(),
        }
    } else {
        BackendError::Load {
            url: url.to_string(),
            message: error.to_string(),
        }
    }
}

fn parse_selector(selector: &str) -> BackendResult<Selector> {
    Selector::parse(selector).map_err(|_| BackendError::SelectorSyntax {
        selector: selector.to_string(),
    })
}

/// The single content element wrapped by a parsed fragment
fn fragment_root(doc: &Html) -> Option<ElementRef<'_>> {
    doc.root_element()
        .children()
        .find_map(ElementRef::wrap)
}

fn read_element(element: ElementRef<'_>, attribute: &str) -> Option<String> {
    if attribute == TEXT_ATTRIBUTE {
        Some(element.text().collect::<String>().trim().to_string())
    } else {
        element.value().attr(attribute).map(str::to_string)
    }
}

/// Runs `select` against a page or fragment target
///
/// For element targets, matching is descendant-only: the fragment's own
/// root element is excluded, matching how an in-item query behaves in the
/// browser variant.
fn select_fragments(
    target: Target<'_, StaticPage, StaticElement>,
    selector: &Selector,
    first_only: bool,
) -> Vec<StaticElement> {
    let mut matches = Vec::new();

    match target {
        Target::Page(page) => {
            let doc = Html::parse_document(&page.html);
            for element in doc.select(selector) {
                matches.push(StaticElement {
                    fragment: element.html(),
                });
                if first_only {
                    break;
                }
            }
        }
        Target::Element(item) => {
            let doc = Html::parse_fragment(&item.fragment);
            let root_id = fragment_root(&doc).map(|root| root.id());
            for element in doc.select(selector) {
                if Some(element.id()) == root_id {
                    continue;
                }
                matches.push(StaticElement {
                    fragment: element.html(),
                });
                if first_only {
                    break;
                }
            }
        }
    }

    matches
}

#[async_trait]
impl Backend for StaticBackend {
    type Page = StaticPage;
    type Element = StaticElement;

    async fn open(&mut self, url: &Url) -> BackendResult<Self::Page> {
        self.fetch(url).await
    }

    async fn navigate(&mut self, page: Self::Page, url: &Url) -> BackendResult<Self::Page> {
        drop(page);
        self.fetch(url).await
    }

    async fn query_one(
        &self,
        target: Target<'_, Self::Page, Self::Element>,
        selector: &str,
    ) -> BackendResult<Option<Self::Element>> {
        let selector = parse_selector(selector)?;
        Ok(select_fragments(target, &selector, true).into_iter().next())
    }

    async fn query_all(
        &self,
        target: Target<'_, Self::Page, Self::Element>,
        selector: &str,
    ) -> BackendResult<Vec<Self::Element>> {
        let selector = parse_selector(selector)?;
        Ok(select_fragments(target, &selector, false))
    }

    async fn read(
        &self,
        element: &Self::Element,
        attribute: &str,
    ) -> BackendResult<Option<String>> {
        let doc = Html::parse_fragment(&element.fragment);
        Ok(fragment_root(&doc).and_then(|root| read_element(root, attribute)))
    }

    async fn wait_for(&self, _page: &Self::Page, _selector: &str) {
        // Nothing renders after the fetch; the document is already final.
    }

    fn page_url<'a>(&self, page: &'a Self::Page) -> &'a Url {
        &page.url
    }

    async fn close_page(&self, page: Self::Page) {
        drop(page);
    }

    async fn release(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backend() -> StaticBackend {
        StaticBackend::acquire(&WaitConfig::default()).unwrap()
    }

    fn page(html: &str) -> StaticPage {
        StaticPage::from_html(Url::parse("https://example.com/list").unwrap(), html)
    }

    const LIST_HTML: &str = r#"
        <html><body>
            <div class="item"><a href="/d1">First</a><span class="tag">a</span></div>
            <div class="item"><a href="/d2">Second</a><span class="tag">b</span></div>
            <div class="item"><a href="/d3">Third</a></div>
        </body></html>
    "#;

    #[tokio::test]
    async fn test_query_all_document_order() {
        let backend = backend();
        let page = page(LIST_HTML);

        let items = backend
            .query_all(Target::Page(&page), ".item")
            .await
            .unwrap();
        assert_eq!(items.len(), 3);

        let first_text = backend.read(&items[0], "text").await.unwrap();
        assert_eq!(first_text.as_deref(), Some("Firsta"));
    }

    #[tokio::test]
    async fn test_query_one_returns_first_match() {
        let backend = backend();
        let page = page(LIST_HTML);

        let item = backend
            .query_one(Target::Page(&page), ".item a")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            backend.read(&item, "href").await.unwrap().as_deref(),
            Some("/d1")
        );
    }

    #[tokio::test]
    async fn test_query_one_no_match_is_none() {
        let backend = backend();
        let page = page(LIST_HTML);

        let missing = backend
            .query_one(Target::Page(&page), ".absent")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_query_within_element_is_descendant_only() {
        let backend = backend();
        let page = page(
            r#"<html><body><div class="box" id="outer"><div class="box" id="inner">i</div></div></body></html>"#,
        );

        // The outer element matches ".box" itself; querying ".box" within
        // it must only see descendants, never the element itself.
        let outer = backend
            .query_one(Target::Page(&page), "#outer")
            .await
            .unwrap()
            .unwrap();
        let inner = backend
            .query_all(Target::Element(&outer), ".box")
            .await
            .unwrap();
        assert_eq!(inner.len(), 1);
        assert_eq!(
            backend.read(&inner[0], "id").await.unwrap().as_deref(),
            Some("inner")
        );
    }

    #[tokio::test]
    async fn test_read_text_is_trimmed() {
        let backend = backend();
        let page = page("<html><body><h1>  Padded Title  </h1></body></html>");

        let h1 = backend
            .query_one(Target::Page(&page), "h1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            backend.read(&h1, "text").await.unwrap().as_deref(),
            Some("Padded Title")
        );
    }

    #[tokio::test]
    async fn test_read_absent_attribute_is_none() {
        let backend = backend();
        let page = page(LIST_HTML);

        let item = backend
            .query_one(Target::Page(&page), ".item")
            .await
            .unwrap()
            .unwrap();
        assert!(backend.read(&item, "data-missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_malformed_selector_errors() {
        let backend = backend();
        let page = page(LIST_HTML);

        let result = backend.query_all(Target::Page(&page), "div[").await;
        assert!(matches!(
            result,
            Err(BackendError::SelectorSyntax { .. })
        ));
    }

    #[tokio::test]
    async fn test_page_url_reported() {
        let backend = backend();
        let page = page(LIST_HTML);
        assert_eq!(
            backend.page_url(&page).as_str(),
            "https://example.com/list"
        );
    }
}
