//! Data types shared by the pool, the synthesizer and the pipeline.

pub mod locator;
pub mod proxy;
pub mod settings;
pub mod workflow;
