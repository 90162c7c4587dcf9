//! Persistent stores for AlphaMind entities.
//!
//! Each store owns one redb database file and keeps entity records as
//! JSON-serialized rows keyed by string id. Stores commit per operation;
//! there is no cross-store transaction.

pub mod agents;
pub mod conversations;
pub mod data;
pub mod error;
pub mod executions;

pub use agents::{Agent, AgentFilter, AgentStatus, AgentStore};
pub use conversations::{
    Conversation, ConversationFilter, ConversationStatus, ConversationStore, DeleteOutcome,
    Message, MessageRole,
};
pub use data::{
    DataStore, DataType, Dataset, DatasetStatus, KbDocument, KbStatus, KnowledgeBase, SearchHit,
};
pub use error::{Error, Result};
pub use executions::{ExecutionFilter, ExecutionStatus, ExecutionStore, WorkflowExecution};
