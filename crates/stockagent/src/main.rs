use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Parser, Debug)]
#[command(
    name = "stockagent",
    about = "Stock Market AI Agent API - latest close price plus an LLM buy/hold/sell recommendation"
)]
struct Cli {
    /// Path to configuration file. Built-in defaults are used when omitted.
    #[arg(short, long)]
    config: Option<String>,

    /// Env file to load before reading credentials (default: `.env` if present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Address to bind (overrides `server.host`)
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on (overrides `server.port`)
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing (respects RUST_LOG env var, defaults to info)
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match cli.log_format {
        LogFormat::Text => tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init(),
    }

    let mut config = stockagent::load_config(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }

    // Real environment variables win over the env file
    stockagent::load_dotenv(cli.env_file.as_deref())?;

    // Refuse to start without the recommendation provider credential
    let orchestrator = stockagent::build_service(&config, |name| std::env::var(name).ok())
        .context("Failed to load recommendation provider credentials")?;
    let orchestrator = Arc::new(orchestrator);

    let addr = config.server.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;

    let shutdown = CancellationToken::new();
    let signal = shutdown.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        tracing::info!("Received shutdown signal");
        signal.cancel();
    });

    stockagent::serve(listener, orchestrator, shutdown).await
}
