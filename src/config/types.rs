use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

/// Top-level crawl configuration
///
/// The JSON field names here are the external contract: a configuration
/// document is deserialized into this structure unchanged.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CrawlConfig {
    /// Starting URL to crawl
    pub start_url: String,

    /// Rendering engine to use
    #[serde(default)]
    pub engine: EngineKind,

    /// Navigation configuration for list-to-detail crawling
    #[serde(default)]
    pub navigation: Option<NavigationConfig>,

    /// Ordered list of field extractors
    pub extractors: Vec<ExtractorConfig>,

    /// Pagination configuration
    #[serde(default)]
    pub pagination: Option<PaginationConfig>,

    /// Wait and timeout configuration
    #[serde(default)]
    pub wait_config: WaitConfig,

    /// Opaque context data passed through to the result
    #[serde(default)]
    pub context: Map<String, Value>,
}

impl CrawlConfig {
    /// Returns true when pagination is configured and enabled
    pub fn pagination_enabled(&self) -> bool {
        self.pagination.as_ref().is_some_and(|p| p.enabled)
    }
}

/// Supported rendering engines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Full browser session with script execution
    #[default]
    Browser,

    /// Single HTTP GET, markup parsed without script execution
    Static,
}

impl EngineKind {
    /// Every supported engine, in preference order
    pub const ALL: [EngineKind; 2] = [EngineKind::Browser, EngineKind::Static];

    /// The wire name of this engine
    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Browser => "browser",
            EngineKind::Static => "static",
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One field-extraction rule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractorConfig {
    /// Name of the field in the output record
    pub field_name: String,

    /// CSS selector identifying the source elements
    pub selector: String,

    /// What to read from a matched element: "text" or an attribute name
    #[serde(default = "default_text_attribute")]
    pub attribute: String,

    /// Whether to collect every match instead of the first
    #[serde(default)]
    pub multiple: bool,
}

/// List-to-detail navigation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NavigationConfig {
    /// Selector for the items on a list page
    pub list_items_selector: String,

    /// Selector for the detail link within a list item; when absent the
    /// item itself is extracted in place, with no detail page load
    #[serde(default)]
    pub detail_link_selector: Option<String>,

    /// Attribute of the link element carrying the detail URL
    #[serde(default = "default_link_attribute")]
    pub detail_link_attribute: String,
}

/// Pagination configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct PaginationConfig {
    /// Whether pagination is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Selector for the next-page link on a list page
    #[serde(default)]
    pub next_page_selector: Option<String>,

    /// Attribute of the next-page element carrying the URL
    #[serde(default = "default_link_attribute")]
    pub next_page_attribute: String,

    /// Maximum number of list pages to process
    #[serde(default)]
    pub max_pages: Option<u32>,
}

/// Wait and timeout configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WaitConfig {
    /// Page load timeout in seconds
    #[serde(default = "default_page_load_timeout")]
    pub page_load_timeout: u64,

    /// Element wait timeout in seconds (browser engine only)
    #[serde(default = "default_element_wait_timeout")]
    pub element_wait_timeout: u64,

    /// Delay between requests in seconds, fractional
    #[serde(default = "default_delay_between_requests")]
    pub delay_between_requests: f64,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            page_load_timeout: default_page_load_timeout(),
            element_wait_timeout: default_element_wait_timeout(),
            delay_between_requests: default_delay_between_requests(),
        }
    }
}

impl WaitConfig {
    /// Page load timeout as a Duration
    pub fn page_load(&self) -> Duration {
        Duration::from_secs(self.page_load_timeout)
    }

    /// Element wait timeout as a Duration
    pub fn element_wait(&self) -> Duration {
        Duration::from_secs(self.element_wait_timeout)
    }

    /// Inter-request delay as a Duration
    ///
    /// Negative values are clamped to zero; validation rejects them before
    /// a crawl starts, but this accessor must never panic.
    pub fn request_delay(&self) -> Duration {
        Duration::from_secs_f64(self.delay_between_requests.max(0.0))
    }
}

fn default_text_attribute() -> String {
    "text".to_string()
}

fn default_link_attribute() -> String {
    "href".to_string()
}

fn default_page_load_timeout() -> u64 {
    10
}

fn default_element_wait_timeout() -> u64 {
    5
}

fn default_delay_between_requests() -> f64 {
    1.0
}
