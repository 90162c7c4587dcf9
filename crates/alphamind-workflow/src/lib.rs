//! External workflow engine integration.
//!
//! [`EngineClient`] speaks the n8n HTTP API (basic auth, fixed per-call
//! timeouts). [`WorkflowRunner`] drives the execution lifecycle: it commits
//! a pending record, marks it running before the outbound call, and lands it
//! in a terminal state from the call's outcome.

pub mod client;
pub mod error;
pub mod runner;

pub use client::{EngineClient, EngineConfig, RunOutcome};
pub use error::{Result, WorkflowError};
pub use runner::{ExecuteRequest, WorkflowRunner};
