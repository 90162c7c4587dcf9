//! Command-line interface for the AlphaMind API server.

use std::net::SocketAddr;

use anyhow::Result;
use clap::{Parser, Subcommand};

use alphamind_core::config::EngineSettings;
use alphamind_workflow::{EngineClient, EngineConfig};

/// AlphaMind - agents, conversations and workflow executions over HTTP.
#[derive(Parser, Debug)]
#[command(name = "alphamind")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// Start the web server.
    Serve {
        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
        /// Port to bind to.
        #[arg(short, long, default_value_t = 8210)]
        port: u16,
    },
    /// Probe the workflow engine and list its workflows.
    EngineCheck,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Check if JSON logging is requested (for production/container environments)
    let json_logging = std::env::var("ALPHAMIND_LOG_JSON")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(false);

    let default_directive = if args.verbose { "alphamind=debug" } else { "alphamind=info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| {
            tracing_subscriber::EnvFilter::new(default_directive)
                .add_directive(tracing::Level::INFO.into())
        });

    if json_logging {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .compact()
            .init();
    }

    match args.command {
        Command::Serve { host, port } => run_server(host, port).await,
        Command::EngineCheck => engine_check().await,
    }
}

async fn run_server(host: String, port: u16) -> Result<()> {
    let bind: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid bind address {}:{}: {}", host, port, e))?;
    alphamind_api::run(bind).await
}

async fn engine_check() -> Result<()> {
    let settings = EngineSettings::from_env();
    let endpoint = settings.endpoint.clone();
    let client = EngineClient::new(EngineConfig::from(settings))?;

    if !client.test_connection().await {
        anyhow::bail!("Engine at {} is not reachable", endpoint);
    }
    println!("Engine at {} is healthy", endpoint);

    let workflows = client.list_workflows().await?;
    println!("{} workflow(s) available:", workflows.len());
    for workflow in workflows {
        let id = workflow.get("id").and_then(|v| v.as_str()).unwrap_or("?");
        let name = workflow.get("name").and_then(|v| v.as_str()).unwrap_or("?");
        let active = workflow
            .get("active")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);
        println!("  {} {} ({})", id, name, if active { "active" } else { "inactive" });
    }
    Ok(())
}
