//! Common test utilities for API tests.

use alphamind_api::ServerState;
use alphamind_storage::{AgentStore, ConversationStore, DataStore, ExecutionStore};
use alphamind_workflow::EngineConfig;

/// Create a server state over in-memory stores, pointing at an engine
/// endpoint that nothing listens on. Engine-touching paths fail fast.
pub fn create_test_server_state() -> ServerState {
    create_test_server_state_with_engine("http://127.0.0.1:1")
}

/// Create a server state over in-memory stores with a specific engine
/// endpoint (e.g. a wiremock server).
pub fn create_test_server_state_with_engine(endpoint: &str) -> ServerState {
    ServerState::with_stores(
        AgentStore::memory().unwrap(),
        ConversationStore::memory().unwrap(),
        DataStore::memory().unwrap(),
        ExecutionStore::memory().unwrap(),
        EngineConfig::new(endpoint),
    )
    .unwrap()
}
