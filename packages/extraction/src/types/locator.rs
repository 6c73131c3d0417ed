//! Locators and extraction requests.

use serde::{Deserialize, Serialize};

/// Label used when the clicked element carries no visible text.
pub const DEFAULT_LABEL: &str = "Selected element";

/// Maximum label length, in characters.
pub const LABEL_MAX_CHARS: usize = 30;

/// Query language of a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocatorKind {
    Css,
    #[serde(alias = "XPath")]
    Xpath,
}

/// A stored way of finding an element again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(rename = "type", alias = "kind")]
    pub kind: LocatorKind,
    pub value: String,
    #[serde(default)]
    pub label: String,
}

impl Locator {
    pub fn css(value: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Css,
            value: value.into(),
            label: String::new(),
        }
    }

    pub fn xpath(value: impl Into<String>) -> Self {
        Self {
            kind: LocatorKind::Xpath,
            value: value.into(),
            label: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }
}

/// Trim and truncate visible element text into a locator label.
pub fn make_label(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return DEFAULT_LABEL.to_string();
    }
    trimmed.chars().take(LABEL_MAX_CHARS).collect()
}

/// A page visit: where to go and what to pull out.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub url: String,
    pub locators: Vec<Locator>,
    #[serde(default)]
    pub use_proxy: bool,
    /// Stored and logged; pages are always fetched as static HTML.
    #[serde(default, rename = "requiresJavaScript")]
    pub requires_javascript: bool,
}

impl ExtractionRequest {
    pub fn new(url: impl Into<String>, locators: Vec<Locator>) -> Self {
        Self {
            url: url.into(),
            locators,
            use_proxy: false,
            requires_javascript: false,
        }
    }

    pub fn with_proxy(mut self, use_proxy: bool) -> Self {
        self.use_proxy = use_proxy;
        self
    }

    pub fn with_javascript(mut self, requires_javascript: bool) -> Self {
        self.requires_javascript = requires_javascript;
        self
    }
}

/// One entry per requested locator, in request order. `None` marks a locator
/// that matched nothing or could not be evaluated.
pub type ExtractionResults = Vec<Option<String>>;
