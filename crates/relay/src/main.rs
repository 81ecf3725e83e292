use std::path::PathBuf;

use clap::Parser;
use relay::config::{self, FileConfig};
use relay::{Config, Result};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "Relay queries to Gemini with remote MCP tools attached", long_about = None)]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./relay.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on
    #[arg(long)]
    host: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    // Loaded before the subscriber so RUST_LOG may come from .env.
    let dotenv = config::load_dotenv(config::DOTENV_FILE);

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if dotenv? {
        debug!(path = config::DOTENV_FILE, "loaded environment from dotenv file");
    }

    // Flags win over the environment.
    let file = FileConfig::discover(cli.config.as_deref())?;
    let config = Config::resolve(file, |key| match key {
        "RELAY_HOST" if cli.host.is_some() => cli.host.clone(),
        "RELAY_PORT" if cli.port.is_some() => cli.port.map(|port| port.to_string()),
        _ => std::env::var(key).ok(),
    })?;

    relay::run(config).await
}
