//! Fetcher implementations.
//!
//! # Available Fetchers
//!
//! - `HttpFetcher` - reqwest client, direct or routed through a proxy
//! - `MockFetcher` - For testing
//!
//! # Example
//!
//! ```rust,ignore
//! use extraction::fetchers::{FetchRequest, Fetcher, HttpFetcher};
//!
//! let fetcher = HttpFetcher::new()?;
//! let page = fetcher.fetch(&FetchRequest::new("https://example.com")).await?;
//! ```

mod http;
mod mock;

pub use http::HttpFetcher;
pub use mock::{MockFetcher, MockResponse};

// Re-export from traits for convenience
pub use crate::traits::fetcher::{FetchRequest, FetchedPage, Fetcher, ProxyRoute};
