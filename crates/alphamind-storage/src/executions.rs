//! Workflow execution records.
//!
//! Each row tracks one invocation of an externally-hosted workflow. The
//! status lifecycle is `pending -> running -> {completed | failed |
//! cancelled}`; every transition is a single-row update and the store
//! rejects anything outside that table, so a row can never jump straight
//! from `pending` to a terminal state.

use redb::{Database, ReadableTable, TableDefinition};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::Error;

const EXECUTIONS_TABLE: TableDefinition<&str, &[u8]> = TableDefinition::new("workflow_executions");

/// Store for workflow execution records.
pub struct ExecutionStore {
    db: Arc<Database>,
}

/// One invocation of an external workflow and its eventual outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowExecution {
    /// Unique execution ID
    pub id: String,
    /// External workflow reference
    pub workflow_id: String,
    /// Display name of the workflow, when known
    pub workflow_name: Option<String>,
    /// Agent that triggered the execution, if any
    pub agent_id: Option<String>,
    /// Conversation the execution belongs to, if any
    pub conversation_id: Option<String>,
    /// Lifecycle status
    pub status: ExecutionStatus,
    /// Input payload sent to the engine
    #[serde(default)]
    pub input_data: serde_json::Value,
    /// Output payload returned by the engine
    pub output_data: Option<serde_json::Value>,
    /// Error text for failed executions
    pub error_message: Option<String>,
    /// Elapsed wall time in milliseconds
    pub execution_time_ms: Option<u64>,
    /// Engine-side execution id, when the engine reported one
    pub remote_execution_id: Option<String>,
    /// Creation timestamp
    pub created_at: i64,
    /// Completion timestamp (set on any terminal transition)
    pub completed_at: Option<i64>,
}

/// Execution lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionStatus {
    /// Row committed, outbound call not yet made
    Pending,
    /// Outbound call in flight
    Running,
    /// Engine returned success
    Completed,
    /// Engine call errored or returned non-success
    Failed,
    /// Cancelled by the caller
    Cancelled,
}

impl ExecutionStatus {
    /// Whether `self -> next` is a legal lifecycle transition.
    fn can_transition_to(self, next: ExecutionStatus) -> bool {
        use ExecutionStatus::*;
        matches!(
            (self, next),
            (Pending, Running) | (Running, Completed) | (Running, Failed) | (Running, Cancelled)
        )
    }

    /// Lowercase wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for ExecutionStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Error> {
        match s {
            "pending" => Ok(Self::Pending),
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(Error::InvalidInput(format!(
                "unknown execution status '{}'",
                other
            ))),
        }
    }
}

impl WorkflowExecution {
    /// Create a new pending execution with generated id and timestamp.
    pub fn new(workflow_id: impl Into<String>, input_data: serde_json::Value) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            workflow_id: workflow_id.into(),
            workflow_name: None,
            agent_id: None,
            conversation_id: None,
            status: ExecutionStatus::Pending,
            input_data,
            output_data: None,
            error_message: None,
            execution_time_ms: None,
            remote_execution_id: None,
            created_at: chrono::Utc::now().timestamp(),
            completed_at: None,
        }
    }
}

/// Query filter for execution records.
#[derive(Debug, Clone, Default)]
pub struct ExecutionFilter {
    /// Filter by workflow ID
    pub workflow_id: Option<String>,
    /// Filter by status
    pub status: Option<ExecutionStatus>,
    /// Maximum number of results
    pub limit: Option<usize>,
    /// Offset for pagination
    pub offset: Option<usize>,
}

impl ExecutionStore {
    /// Open or create an execution store at the given path.
    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Arc<Self>, Error> {
        let db = Database::create(path)?;
        let write_txn = db.begin_write()?;
        write_txn.open_table(EXECUTIONS_TABLE)?;
        write_txn.commit()?;
        Ok(Arc::new(Self { db: Arc::new(db) }))
    }

    /// Create an in-memory execution store for testing.
    pub fn memory() -> Result<Arc<Self>, Error> {
        let temp_path =
            std::env::temp_dir().join(format!("executions_test_{}.redb", uuid::Uuid::new_v4()));
        Self::open(temp_path)
    }

    /// Commit a new execution row.
    pub async fn insert(&self, execution: &WorkflowExecution) -> Result<(), Error> {
        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EXECUTIONS_TABLE)?;
            let value = serde_json::to_vec(execution)?;
            table.insert(execution.id.as_str(), value.as_slice())?;
        }
        write_txn.commit()?;
        Ok(())
    }

    /// Get an execution record by ID.
    pub async fn get(&self, id: &str) -> Result<Option<WorkflowExecution>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXECUTIONS_TABLE)?;
        match table.get(id)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(bytes.value())?)),
            None => Ok(None),
        }
    }

    /// Query execution records with filters, newest first.
    pub async fn query(&self, filter: ExecutionFilter) -> Result<Vec<WorkflowExecution>, Error> {
        let read_txn = self.db.begin_read()?;
        let table = read_txn.open_table(EXECUTIONS_TABLE)?;

        let mut executions = Vec::new();
        for item in table.iter()? {
            let (_id, bytes) = item?;
            let execution: WorkflowExecution = serde_json::from_slice(bytes.value())?;

            if let Some(workflow_id) = &filter.workflow_id {
                if &execution.workflow_id != workflow_id {
                    continue;
                }
            }
            if let Some(status) = filter.status {
                if execution.status != status {
                    continue;
                }
            }
            executions.push(execution);
        }

        executions.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        if let Some(offset) = filter.offset {
            if offset < executions.len() {
                executions = executions.into_iter().skip(offset).collect();
            } else {
                executions.clear();
            }
        }
        if let Some(limit) = filter.limit {
            executions.truncate(limit);
        }

        Ok(executions)
    }

    /// Transition `pending -> running`. Called after the row is committed,
    /// before the outbound engine call.
    pub async fn mark_running(&self, id: &str) -> Result<WorkflowExecution, Error> {
        self.transition(id, ExecutionStatus::Running, |_| {}).await
    }

    /// Transition `running -> completed`, storing output and elapsed time.
    pub async fn mark_completed(
        &self,
        id: &str,
        output: serde_json::Value,
        execution_time_ms: u64,
        remote_execution_id: Option<String>,
    ) -> Result<WorkflowExecution, Error> {
        self.transition(id, ExecutionStatus::Completed, |execution| {
            execution.output_data = Some(output);
            execution.execution_time_ms = Some(execution_time_ms);
            execution.remote_execution_id = remote_execution_id;
            execution.completed_at = Some(chrono::Utc::now().timestamp());
        })
        .await
    }

    /// Transition `running -> failed`, capturing the error text.
    pub async fn mark_failed(
        &self,
        id: &str,
        error_message: impl Into<String>,
    ) -> Result<WorkflowExecution, Error> {
        let error_message = error_message.into();
        self.transition(id, ExecutionStatus::Failed, move |execution| {
            execution.error_message = Some(error_message);
            execution.completed_at = Some(chrono::Utc::now().timestamp());
        })
        .await
    }

    /// Transition `running -> cancelled`.
    pub async fn mark_cancelled(&self, id: &str) -> Result<WorkflowExecution, Error> {
        self.transition(id, ExecutionStatus::Cancelled, |execution| {
            execution.completed_at = Some(chrono::Utc::now().timestamp());
        })
        .await
    }

    /// Apply a guarded status transition as a single-row update.
    async fn transition<F>(
        &self,
        id: &str,
        next: ExecutionStatus,
        apply: F,
    ) -> Result<WorkflowExecution, Error>
    where
        F: FnOnce(&mut WorkflowExecution),
    {
        let mut execution = self
            .get(id)
            .await?
            .ok_or_else(|| Error::NotFound(format!("Execution {} not found", id)))?;

        if !execution.status.can_transition_to(next) {
            return Err(Error::InvalidTransition {
                from: execution.status.as_str().to_string(),
                to: next.as_str().to_string(),
            });
        }

        execution.status = next;
        apply(&mut execution);

        let write_txn = self.db.begin_write()?;
        {
            let mut table = write_txn.open_table(EXECUTIONS_TABLE)?;
            let value = serde_json::to_vec(&execution)?;
            table.insert(id, value.as_slice())?;
        }
        write_txn.commit()?;

        tracing::debug!(
            execution_id = %id,
            status = execution.status.as_str(),
            "Execution transitioned"
        );
        Ok(execution)
    }
}
