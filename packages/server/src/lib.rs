// Locator Extraction - API Core
//
// This crate exposes the extraction pipeline, the proxy pool, and saved
// workflows over HTTP. Domain logic lives in the `extraction` crate; this
// crate owns configuration, routing, and error mapping.

pub mod config;
pub mod server;

pub use config::*;
