//! Workflow execution lifecycle tracking.
//!
//! The runner owns the one stateful lifecycle in the system. An execution
//! row is committed in `pending`, flipped to `running` before the outbound
//! engine call, and landed in `completed`/`failed` from the call's outcome.
//! Cancellation makes a best-effort attempt to stop the remote job and
//! updates the local row regardless of what the engine says.

use std::sync::Arc;
use std::time::Instant;

use serde_json::Value;

use alphamind_storage::{ExecutionFilter, ExecutionStore, WorkflowExecution};

use crate::client::EngineClient;
use crate::error::{Result, WorkflowError};

/// Parameters for starting an execution.
#[derive(Debug, Clone, Default)]
pub struct ExecuteRequest {
    /// External workflow reference
    pub workflow_id: String,
    /// Display name, when the caller knows it
    pub workflow_name: Option<String>,
    /// Input payload forwarded to the engine
    pub input_data: Value,
    /// Agent that triggered the execution, if any
    pub agent_id: Option<String>,
    /// Conversation the execution belongs to, if any
    pub conversation_id: Option<String>,
}

/// Drives workflow executions against the engine and records their lifecycle.
pub struct WorkflowRunner {
    client: Arc<EngineClient>,
    store: Arc<ExecutionStore>,
}

impl WorkflowRunner {
    /// Create a new runner.
    pub fn new(client: Arc<EngineClient>, store: Arc<ExecutionStore>) -> Self {
        Self { client, store }
    }

    /// The engine client behind this runner.
    pub fn client(&self) -> &Arc<EngineClient> {
        &self.client
    }

    /// The execution store behind this runner.
    pub fn store(&self) -> &Arc<ExecutionStore> {
        &self.store
    }

    /// Execute a workflow and track the run to a terminal state.
    ///
    /// The returned row is always terminal: `completed` with output and
    /// elapsed time, or `failed` with the error text. Engine failures are
    /// not errors from the caller's point of view; only store failures
    /// propagate.
    pub async fn execute(&self, request: ExecuteRequest) -> Result<WorkflowExecution> {
        if request.workflow_id.is_empty() {
            return Err(WorkflowError::InvalidInput(
                "workflow_id must not be empty".to_string(),
            ));
        }

        let mut execution = WorkflowExecution::new(&request.workflow_id, request.input_data.clone());
        execution.workflow_name = request.workflow_name;
        execution.agent_id = request.agent_id;
        execution.conversation_id = request.conversation_id;

        self.store.insert(&execution).await?;
        self.store.mark_running(&execution.id).await?;

        let started = Instant::now();
        let result = self
            .client
            .run_workflow(&request.workflow_id, &request.input_data)
            .await;
        let elapsed_ms = started.elapsed().as_millis() as u64;

        let execution = match result {
            Ok(outcome) => {
                tracing::info!(
                    execution_id = %execution.id,
                    workflow_id = %request.workflow_id,
                    via_webhook = outcome.via_webhook,
                    elapsed_ms,
                    "Workflow execution completed"
                );
                self.store
                    .mark_completed(
                        &execution.id,
                        outcome.output,
                        elapsed_ms,
                        outcome.remote_execution_id,
                    )
                    .await?
            }
            Err(e) => {
                tracing::warn!(
                    execution_id = %execution.id,
                    workflow_id = %request.workflow_id,
                    error = %e,
                    "Workflow execution failed"
                );
                self.store.mark_failed(&execution.id, e.to_string()).await?
            }
        };

        Ok(execution)
    }

    /// Cancel a running execution.
    ///
    /// The remote stop is best-effort: its outcome is logged and otherwise
    /// ignored. The local row transitions to `cancelled` regardless.
    pub async fn cancel(&self, execution_id: &str) -> Result<WorkflowExecution> {
        let execution = self
            .store
            .get(execution_id)
            .await?
            .ok_or_else(|| {
                WorkflowError::Storage(alphamind_storage::Error::NotFound(format!(
                    "Execution {} not found",
                    execution_id
                )))
            })?;

        if let Some(remote_id) = &execution.remote_execution_id {
            match self.client.stop_execution(remote_id).await {
                Ok(stopped) => {
                    tracing::debug!(remote_id = %remote_id, stopped, "Remote stop attempted");
                }
                Err(e) => {
                    tracing::warn!(remote_id = %remote_id, error = %e, "Remote stop failed");
                }
            }
        }

        Ok(self.store.mark_cancelled(execution_id).await?)
    }

    /// Get a tracked execution by id.
    pub async fn get(&self, execution_id: &str) -> Result<Option<WorkflowExecution>> {
        Ok(self.store.get(execution_id).await?)
    }

    /// List tracked executions.
    pub async fn list(&self, filter: ExecutionFilter) -> Result<Vec<WorkflowExecution>> {
        Ok(self.store.query(filter).await?)
    }
}
