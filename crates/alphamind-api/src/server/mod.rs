//! Web server for AlphaMind.

pub mod router;
pub mod types;

pub use router::create_router_with_state;
pub use types::{ServerState, MAX_REQUEST_BODY_SIZE};

use std::net::SocketAddr;

/// Start the web server on a specific address.
/// This is the main entry point for running the server.
pub async fn run(bind: SocketAddr) -> anyhow::Result<()> {
    let state = ServerState::new().await?;

    if state.engine.test_connection().await {
        tracing::info!(endpoint = %state.engine.endpoint(), "Workflow engine reachable");
    } else {
        tracing::warn!(
            endpoint = %state.engine.endpoint(),
            "Workflow engine not reachable; executions will fail until it comes up"
        );
    }

    let app = create_router_with_state(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;

    tracing::info!("AlphaMind API listening on http://{}", bind);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to install Ctrl+C handler");
    }
    tracing::info!("Shutdown signal received");
}
