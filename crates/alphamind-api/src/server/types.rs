//! Server state shared across all handlers.

use std::sync::Arc;

use alphamind_core::config::{self, EngineSettings};
use alphamind_storage::{AgentStore, ConversationStore, DataStore, ExecutionStore};
use alphamind_workflow::{EngineClient, EngineConfig, WorkflowRunner};

/// Maximum request body size (10 MB)
pub const MAX_REQUEST_BODY_SIZE: usize = 10 * 1024 * 1024;

/// Server state shared across all handlers.
#[derive(Clone)]
pub struct ServerState {
    /// Agent store.
    pub agents: Arc<AgentStore>,

    /// Conversation and message store.
    pub conversations: Arc<ConversationStore>,

    /// Dataset and knowledge base store.
    pub data: Arc<DataStore>,

    /// Workflow engine client.
    pub engine: Arc<EngineClient>,

    /// Workflow execution runner.
    pub runner: Arc<WorkflowRunner>,

    /// Server start timestamp.
    pub started_at: i64,
}

impl ServerState {
    /// Create a server state with persistent stores under the configured
    /// data directory and engine settings from the environment.
    pub async fn new() -> anyhow::Result<Self> {
        let data_dir = config::data_dir();
        if let Err(e) = std::fs::create_dir_all(&data_dir) {
            tracing::warn!(error = %e, "Failed to create data directory");
        }

        let agents = match AgentStore::open(data_dir.join("agents.redb")) {
            Ok(store) => {
                tracing::info!("Agent store initialized at {:?}", data_dir.join("agents.redb"));
                store
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open agent store, using in-memory");
                AgentStore::memory()?
            }
        };

        let conversations = match ConversationStore::open(data_dir.join("conversations.redb")) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open conversation store, using in-memory");
                ConversationStore::memory()?
            }
        };

        let data = match DataStore::open(data_dir.join("data.redb")) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open data store, using in-memory");
                DataStore::memory()?
            }
        };

        let executions = match ExecutionStore::open(data_dir.join("executions.redb")) {
            Ok(store) => store,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to open execution store, using in-memory");
                ExecutionStore::memory()?
            }
        };

        Self::with_stores(
            agents,
            conversations,
            data,
            executions,
            EngineSettings::from_env().into(),
        )
    }

    /// Assemble a state from already-open stores and an engine config.
    /// Used directly by tests with in-memory stores.
    pub fn with_stores(
        agents: Arc<AgentStore>,
        conversations: Arc<ConversationStore>,
        data: Arc<DataStore>,
        executions: Arc<ExecutionStore>,
        engine_config: EngineConfig,
    ) -> anyhow::Result<Self> {
        let engine = Arc::new(EngineClient::new(engine_config)?);
        let runner = Arc::new(WorkflowRunner::new(engine.clone(), executions));

        Ok(Self {
            agents,
            conversations,
            data,
            engine,
            runner,
            started_at: chrono::Utc::now().timestamp(),
        })
    }
}
