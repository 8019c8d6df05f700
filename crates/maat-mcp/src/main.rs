use anyhow::Result;
use clap::Parser;
use rmcp::{transport::stdio, ServiceExt};
use tracing::info;

use maat_lib::FinderConfig;
use maat_mcp::RestaurantServer;

/// Nearby restaurant finder MCP server (stdio transport).
#[derive(Parser, Debug)]
#[command(name = "maat-mcp", version, about)]
struct Cli {
    /// Log filter directive, written to stderr.
    #[arg(long, env = "RUST_LOG", default_value = "maat_mcp=info,maat_lib=info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the protocol; logs MUST go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::try_new(&cli.log_level)?)
        .init();

    let config = FinderConfig::from_env();
    let server = RestaurantServer::from_config(&config)?;

    info!("starting MCP server over stdio");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!(error = %e, "failed to start MCP server");
    })?;

    service.waiting().await?;
    info!("MCP server stopped");
    Ok(())
}
