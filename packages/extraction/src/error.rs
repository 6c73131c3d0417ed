//! Typed errors for the extraction library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors that can occur while running an extraction request.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// Request is missing fields or carries malformed values
    #[error("invalid request: {reason}")]
    Validation { reason: String },

    /// Fetching the target page failed
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The fetched response could not be treated as a document
    #[error("could not parse document from {url}: {reason}")]
    Parse { url: String, reason: String },

    /// Proxy registry rejected an operation
    #[error("proxy pool error: {0}")]
    Pool(#[from] PoolError),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Anything else
    #[error("internal error: {0}")]
    Internal(String),
}

impl ExtractionError {
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Whether the failure came from the upstream page rather than the caller.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::Fetch(_) | Self::Parse { .. })
    }
}

/// Errors that can occur during fetch operations.
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed (connection refused, DNS, TLS, proxy handshake...)
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Upstream answered with a non-2xx status
    #[error("HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// Deadline expired before the response arrived
    #[error("timeout after {seconds}s fetching: {url}")]
    Timeout { url: String, seconds: u64 },

    /// Proxy route could not be turned into a client configuration
    #[error("invalid proxy configuration: {0}")]
    InvalidProxy(String),
}

/// Errors raised by the proxy registry.
#[derive(Debug, Error)]
pub enum PoolError {
    /// A raw proxy line did not match `host:port[:username[:password]]`
    #[error("invalid proxy line {line:?}: {reason}")]
    InvalidProxyLine { line: String, reason: String },

    /// Unknown protocol name in a bulk enrollment
    #[error("unknown proxy protocol: {0}")]
    UnknownProtocol(String),

    /// No proxy with this identity is enrolled
    #[error("proxy not found: {0}")]
    NotFound(String),
}

/// Errors raised while resolving a single locator against a document.
///
/// These never abort an extraction; the locator yields an absent result.
#[derive(Debug, Error)]
pub enum LocatorError {
    #[error("invalid CSS selector: {selector}")]
    InvalidSelector { selector: String },

    #[error("unsupported XPath expression {expression:?}: {reason}")]
    UnsupportedXPath { expression: String, reason: String },

    #[error("page could not be parsed for XPath: {reason}")]
    XPathDocument { reason: String },
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for pool operations.
pub type PoolResult<T> = std::result::Result<T, PoolError>;

/// Result type alias for locator resolution.
pub type LocatorResult<T> = std::result::Result<T, LocatorError>;
