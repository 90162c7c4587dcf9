//! Handler-level tests against an in-memory server state.

mod common;

mod agents;
mod basic;
mod chat;
mod data;
mod workflows;
