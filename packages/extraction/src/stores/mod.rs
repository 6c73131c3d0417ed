//! Storage implementations for the extraction library.
//!
//! Available backends:
//! - `MemoryStore` - In-memory workflow storage

pub mod memory;

pub use memory::MemoryStore;
