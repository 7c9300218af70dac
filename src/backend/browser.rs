//! Browser-driven rendering backend
//!
//! Drives a headless Chromium session over the DevTools protocol. Pages
//! are real tabs: scripts run, and queries see the rendered DOM. Each
//! crawl owns exactly one browser process, released when the backend is.
//!
//! Detail pages open in their own tabs so the list page a crawl is walking
//! stays live until its next-page link has been resolved.

use crate::backend::{Backend, Target, TEXT_ATTRIBUTE};
use crate::config::WaitConfig;
use crate::{BackendError, BackendResult};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::element::Element;
use chromiumoxide::error::CdpError;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use url::Url;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A loaded browser tab
pub struct BrowserPage {
    page: Page,
    url: Url,
}

/// Browser-driven backend owning one Chromium session
pub struct BrowserBackend {
    browser: Browser,
    handler_task: JoinHandle<()>,
    page_load: Duration,
    element_wait: Duration,
}

/// Locates a Chromium executable from the environment or well-known paths
///
/// Returns `None` to let chromiumoxide run its own detection.
pub(crate) fn find_executable() -> Option<PathBuf> {
    for var in ["CHROMIUM_PATH", "CHROME"] {
        if let Ok(value) = std::env::var(var) {
            let path = PathBuf::from(value);
            if path.exists() {
                return Some(path);
            }
            tracing::warn!(
                "{} points to a non-existent file: {}",
                var,
                path.display()
            );
        }
    }

    let candidates = [
        "/usr/bin/google-chrome",
        "/usr/bin/google-chrome-stable",
        "/usr/bin/chromium",
        "/usr/bin/chromium-browser",
        "/snap/bin/chromium",
        "/Applications/Google Chrome.app/Contents/MacOS/Google Chrome",
        "/Applications/Chromium.app/Contents/MacOS/Chromium",
    ];

    candidates
        .into_iter()
        .map(PathBuf::from)
        .find(|path| path.exists())
}

impl BrowserBackend {
    /// Launches the browser session
    ///
    /// Spawns the CDP event handler task that must run for the lifetime of
    /// the session; it is aborted by [`Backend::release`].
    pub async fn acquire(wait: &WaitConfig) -> BackendResult<Self> {
        let mut builder = BrowserConfig::builder()
            .window_size(1920, 1080)
            .request_timeout(wait.page_load())
            .arg("--no-sandbox")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage");

        if let Some(executable) = find_executable() {
            tracing::info!("Using browser executable: {}", executable.display());
            builder = builder.chrome_executable(executable);
        }

        let config = builder.build().map_err(BackendError::Session)?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| BackendError::Session(format!("Failed to launch browser: {}", e)))?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("Browser handler event error: {}", e);
                }
            }
        });

        Ok(Self {
            browser,
            handler_task,
            page_load: wait.page_load(),
            element_wait: wait.element_wait(),
        })
    }

    /// Loads `url` into `page` and waits for the document to settle
    async fn load_into(&self, page: Page, url: &Url) -> BackendResult<BrowserPage> {
        let navigation = tokio::time::timeout(self.page_load, async {
            page.goto(url.as_str()).await?;
            page.wait_for_navigation().await?;
            Ok::<(), CdpError>(())
        })
        .await;

        match navigation {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = page.close().await;
                return Err(BackendError::Load {
                    url: url.to_string(),
                    message: e.to_string(),
                });
            }
            Err(_) => {
                let _ = page.close().await;
                return Err(BackendError::Timeout {
                    url: url.to_string(),
                });
            }
        }

        // wait_for_navigation returns on the HTTP response; give scripts a
        // bounded chance to produce a body before queries run.
        poll_for_element(&page, "body", self.element_wait).await;

        let final_url = page
            .url()
            .await
            .ok()
            .flatten()
            .and_then(|u| Url::parse(&u).ok())
            .unwrap_or_else(|| url.clone());

        tracing::debug!("Browser loaded {}", final_url);
        Ok(BrowserPage {
            page,
            url: final_url,
        })
    }
}

/// Polls for a selector until it matches or the timeout elapses
async fn poll_for_element(page: &Page, selector: &str, timeout: Duration) -> bool {
    let start = Instant::now();
    loop {
        if page.find_element(selector).await.is_ok() {
            return true;
        }
        if start.elapsed() >= timeout {
            tracing::debug!("Selector '{}' did not appear within {:?}", selector, timeout);
            return false;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[async_trait]
impl Backend for BrowserBackend {
    type Page = BrowserPage;
    type Element = Element;

    async fn open(&mut self, url: &Url) -> BackendResult<Self::Page> {
        let page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| BackendError::Session(format!("Failed to open tab: {}", e)))?;
        self.load_into(page, url).await
    }

    async fn navigate(&mut self, page: Self::Page, url: &Url) -> BackendResult<Self::Page> {
        // Same tab, new document: the session survives the navigation.
        self.load_into(page.page, url).await
    }

    async fn query_one(
        &self,
        target: Target<'_, Self::Page, Self::Element>,
        selector: &str,
    ) -> BackendResult<Option<Self::Element>> {
        // The protocol conflates "no match" with failure; absence is data.
        let found = match target {
            Target::Page(page) => page.page.find_element(selector).await,
            Target::Element(element) => element.find_element(selector).await,
        };
        Ok(found.ok())
    }

    async fn query_all(
        &self,
        target: Target<'_, Self::Page, Self::Element>,
        selector: &str,
    ) -> BackendResult<Vec<Self::Element>> {
        let found = match target {
            Target::Page(page) => page.page.find_elements(selector).await,
            Target::Element(element) => element.find_elements(selector).await,
        };
        Ok(found.unwrap_or_default())
    }

    async fn read(
        &self,
        element: &Self::Element,
        attribute: &str,
    ) -> BackendResult<Option<String>> {
        let value = if attribute == TEXT_ATTRIBUTE {
            element
                .inner_text()
                .await
                .ok()
                .flatten()
                .map(|text| text.trim().to_string())
        } else {
            element.attribute(attribute).await.ok().flatten()
        };
        Ok(value)
    }

    async fn wait_for(&self, page: &Self::Page, selector: &str) {
        poll_for_element(&page.page, selector, self.element_wait).await;
    }

    fn page_url<'a>(&self, page: &'a Self::Page) -> &'a Url {
        &page.url
    }

    async fn close_page(&self, page: Self::Page) {
        if let Err(e) = page.page.close().await {
            tracing::debug!("Failed to close tab: {}", e);
        }
    }

    async fn release(mut self) {
        if let Err(e) = self.browser.close().await {
            tracing::warn!("Failed to close browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("Failed to wait for browser exit: {}", e);
        }
        self.handler_task.abort();
        tracing::debug!("Browser session released");
    }
}
