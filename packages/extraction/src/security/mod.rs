//! Credential handling for outbound proxies.

pub mod credentials;

pub use credentials::{ProxyCredentials, SecretString};
