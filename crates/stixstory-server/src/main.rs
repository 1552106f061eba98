//! Stixstory server binary
//!
//! Starts the HTTP service for synthetic CTI graph generation.

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use stixstory_server::{config::ServerConfig, start_server};

/// Stixstory - synthetic CTI graphs with inferred relationships
#[derive(Debug, Parser)]
#[command(name = "stixstory-server")]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "STIXSTORY_CONFIG")]
    config: Option<PathBuf>,

    /// Bind address, overrides the config file
    #[arg(long, env = "STIXSTORY_BIND")]
    bind: Option<String>,

    /// Bind port, overrides the config file
    #[arg(short, long, env = "STIXSTORY_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => {
            eprintln!("Warning: No config file specified, using defaults");
            eprintln!("Usage: stixstory-server --config <path-to-config.toml>");
            ServerConfig::default()
        }
    };

    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(port) = args.port {
        config.bind_port = port;
    }

    start_server(config).await?;
    Ok(())
}
