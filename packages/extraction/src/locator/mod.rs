//! Locators: synthesis from a clicked element and evaluation on a page.
//!
//! A locator is either a CSS selector or an XPath expression. The
//! synthesizer produces both for one element so a saved workflow can later
//! re-find the same element on a freshly fetched copy of the page.

mod node;
mod synthesize;
mod xpath;

pub use node::DomNode;
pub use synthesize::{css_path, synthesize, xpath, SynthesizedLocators};
pub use xpath::XPathDocument;
