//! minecraft-wiki-mcp - MCP server for the Minecraft Wiki
//!
//! This binary serves the wiki tools over stdio to AI assistants like
//! Claude Desktop.

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use minecraft_wiki_mcp::config::{DEFAULT_API_URL, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use minecraft_wiki_mcp::{McpServer, ToolContext, ToolRegistry, WikiClient, WikiConfig, WikiService};

/// MCP server for the Minecraft Wiki.
#[derive(Parser, Debug)]
#[command(name = "minecraft-wiki-mcp")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// MediaWiki API endpoint.
    #[arg(long, env = "MINECRAFT_WIKI_API_URL", default_value = DEFAULT_API_URL)]
    api_url: String,

    /// Timeout for one API request, in seconds.
    #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
    timeout_secs: u64,

    /// User-Agent header sent to the wiki.
    #[arg(long, default_value = DEFAULT_USER_AGENT)]
    user_agent: String,

    /// Enable verbose logging.
    #[arg(short, long)]
    verbose: bool,

    /// Log output file (default: stderr).
    #[arg(long)]
    log_file: Option<String>,

    /// Emit logs as JSON lines.
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = init_logging(&args) {
        eprintln!("failed to set up logging: {:#}", e);
        return ExitCode::FAILURE;
    }

    tracing::info!(
        "Starting {} v{}",
        minecraft_wiki_mcp::server::SERVER_NAME,
        minecraft_wiki_mcp::server::SERVER_VERSION
    );

    let server = match build_server(&args) {
        Ok(server) => server,
        Err(e) => {
            tracing::error!("Startup failed: {:#}", e);
            return ExitCode::FAILURE;
        }
    };

    match server.run_stdio().await {
        Ok(()) => {
            tracing::info!("Server exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Server error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr or a file; stdout carries the protocol.
fn init_logging(args: &Args) -> anyhow::Result<()> {
    let filter = if args.verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    match &args.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path))?;
            let layer = fmt::layer().with_ansi(false).with_writer(Mutex::new(file));
            if args.log_json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .init();
            } else {
                tracing_subscriber::registry().with(filter).with(layer).init();
            }
        }
        None => {
            let layer = fmt::layer().with_writer(std::io::stderr);
            if args.log_json {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(layer.json())
                    .init();
            } else {
                tracing_subscriber::registry().with(filter).with(layer).init();
            }
        }
    }

    Ok(())
}

fn build_server(args: &Args) -> anyhow::Result<McpServer> {
    let config = WikiConfig::new(&args.api_url)?
        .with_timeout(Duration::from_secs(args.timeout_secs))?
        .with_user_agent(args.user_agent.as_str());

    let client = WikiClient::new(&config).context("cannot build HTTP client")?;
    tracing::info!(
        api_url = %client.api_url(),
        timeout_secs = args.timeout_secs,
        "Using wiki API"
    );

    let tools = ToolRegistry::new(ToolContext::new(WikiService::new(client)));
    Ok(McpServer::new(tools))
}
