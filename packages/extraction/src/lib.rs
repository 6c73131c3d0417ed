//! Locator-Driven Page Extraction Library
//!
//! Re-finds user-chosen elements on freshly fetched pages and returns their
//! text, optionally routing the fetch through a rotating proxy pool.
//!
//! # Design Philosophy
//!
//! - Locators are synthesized once, from a clicked element, and replayed many times
//! - One result per locator, in order; a miss is `None`, never a reshuffle
//! - The proxy pool is an owned value, shared explicitly
//! - Library handles mechanics, app handles transport and persistence policy
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extraction::{ExtractionRequest, Extractor, HttpFetcher, Locator, ProxyPool, ProxyProtocol};
//!
//! let pool = Arc::new(ProxyPool::new());
//! pool.add_many(["1.2.3.4:8080:user:pass"], ProxyProtocol::Http)?;
//!
//! let extractor = Extractor::new(pool, Arc::new(HttpFetcher::new()?));
//! let request = ExtractionRequest::new("https://example.com", vec![Locator::css("h1")])
//!     .with_proxy(true);
//! let results = extractor.extract(&request).await?;
//! ```
//!
//! # Modules
//!
//! - [`locator`] - CSS path / XPath synthesis and XPath evaluation
//! - [`pool`] - Rotating proxy pool
//! - [`pipeline`] - Fetch, parse, and locator application
//! - [`fetchers`] - Fetcher implementations (HttpFetcher, MockFetcher)
//! - [`stores`] - Workflow storage (MemoryStore)
//! - [`traits`] - Fetcher and WorkflowStore abstractions
//! - [`types`] - Proxies, settings, locators, workflows
//! - [`security`] - Credential handling

pub mod error;
pub mod fetchers;
pub mod locator;
pub mod pipeline;
pub mod pool;
pub mod security;
pub mod stores;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ExtractionError, FetchError, LocatorError, PoolError, Result};
pub use fetchers::{HttpFetcher, MockFetcher, MockResponse};
pub use locator::{synthesize, DomNode, SynthesizedLocators, XPathDocument};
pub use pipeline::{validate_target_url, Extractor, FETCH_TIMEOUT, USER_AGENT};
pub use pool::{PoolStats, ProxyPool};
pub use security::{ProxyCredentials, SecretString};
pub use stores::MemoryStore;
pub use traits::{
    fetcher::{FetchRequest, FetchedPage, Fetcher, ProxyRoute},
    store::WorkflowStore,
};
pub use types::{
    locator::{ExtractionRequest, ExtractionResults, Locator, LocatorKind},
    proxy::{Proxy, ProxyKey, ProxyProtocol, ProxyStatus},
    settings::{PoolSettings, PoolSettingsPatch},
    workflow::{NewWorkflow, Workflow},
};
