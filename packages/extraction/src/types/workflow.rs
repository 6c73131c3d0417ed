//! Saved extraction workflows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::locator::{ExtractionRequest, Locator};
use crate::error::{ExtractionError, Result};

/// A target page plus the locators to apply to it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workflow {
    pub id: Uuid,
    pub name: String,
    pub target_url: String,
    pub selectors: Vec<Locator>,
    pub requires_java_script: bool,
    pub use_proxy: bool,
    pub last_saved: DateTime<Utc>,
}

impl Workflow {
    /// The extraction this workflow describes.
    pub fn to_request(&self) -> ExtractionRequest {
        ExtractionRequest::new(self.target_url.clone(), self.selectors.clone())
            .with_proxy(self.use_proxy)
            .with_javascript(self.requires_java_script)
    }
}

/// Fields accepted when saving a workflow.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWorkflow {
    pub name: String,
    pub target_url: String,
    #[serde(default)]
    pub selectors: Vec<Locator>,
    #[serde(default)]
    pub requires_java_script: bool,
    #[serde(default)]
    pub use_proxy: bool,
}

impl NewWorkflow {
    pub fn new(name: impl Into<String>, target_url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_url: target_url.into(),
            selectors: Vec::new(),
            requires_java_script: false,
            use_proxy: false,
        }
    }

    pub fn with_selector(mut self, locator: Locator) -> Self {
        self.selectors.push(locator);
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(ExtractionError::validation("workflow name is required"));
        }
        crate::pipeline::validate_target_url(&self.target_url)?;
        Ok(())
    }

    /// Stamp an id and save time.
    pub fn into_workflow(self, saved_at: DateTime<Utc>) -> Workflow {
        Workflow {
            id: Uuid::now_v7(),
            name: self.name.trim().to_string(),
            target_url: self.target_url,
            selectors: self.selectors,
            requires_java_script: self.requires_java_script,
            use_proxy: self.use_proxy,
            last_saved: saved_at,
        }
    }
}
