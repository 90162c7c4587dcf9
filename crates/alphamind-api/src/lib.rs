//! HTTP surface for AlphaMind.
//!
//! Handlers return a uniform `{success, data|error, message}` envelope.
//! Routing, shared server state and the serve loop live under [`server`].

pub mod handlers;
pub mod models;
pub mod server;

pub use server::{create_router_with_state, run, ServerState};
