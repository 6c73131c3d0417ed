//! Core trait abstractions for the extraction library.
//!
//! These traits define the seams where applications plug in page retrieval
//! and workflow persistence.

pub mod fetcher;
pub mod store;
