//! Storage trait for saved workflows.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::types::workflow::Workflow;

/// Persistence for saved workflows.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    /// Store a workflow, replacing any existing one with the same id.
    async fn save_workflow(&self, workflow: &Workflow) -> Result<()>;

    /// Get a workflow by id.
    async fn get_workflow(&self, id: Uuid) -> Result<Option<Workflow>>;

    /// All workflows, oldest first.
    async fn list_workflows(&self) -> Result<Vec<Workflow>>;

    /// Remove a workflow. Returns whether it existed.
    async fn delete_workflow(&self, id: Uuid) -> Result<bool>;
}
