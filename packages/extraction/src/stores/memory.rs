//! In-memory storage implementation for testing and development.

use async_trait::async_trait;
use indexmap::IndexMap;
use std::sync::{PoisonError, RwLock};
use uuid::Uuid;

use crate::error::Result;
use crate::traits::store::WorkflowStore;
use crate::types::workflow::Workflow;

/// In-memory storage for saved workflows.
///
/// Not suitable for production as data is lost on restart. Listing returns
/// workflows in the order they were first saved.
#[derive(Debug, Default)]
pub struct MemoryStore {
    workflows: RwLock<IndexMap<Uuid, Workflow>>,
}

impl MemoryStore {
    /// Create a new empty memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data.
    pub fn clear(&self) {
        self.workflows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    /// Get the number of stored workflows.
    pub fn workflow_count(&self) -> usize {
        self.workflows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn save_workflow(&self, workflow: &Workflow) -> Result<()> {
        self.workflows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(workflow.id, workflow.clone());
        Ok(())
    }

    async fn get_workflow(&self, id: Uuid) -> Result<Option<Workflow>> {
        Ok(self
            .workflows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&id)
            .cloned())
    }

    async fn list_workflows(&self) -> Result<Vec<Workflow>> {
        Ok(self
            .workflows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect())
    }

    async fn delete_workflow(&self, id: Uuid) -> Result<bool> {
        Ok(self
            .workflows
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&id)
            .is_some())
    }
}
