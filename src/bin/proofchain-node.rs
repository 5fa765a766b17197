#![forbid(unsafe_code)]
//! Ledger node: serves the HTTP API on the given port

use clap::Parser;
use colored::*;
use proofchain::api::run_api_server;
use proofchain::config::load_config;
use proofchain::node::Node;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "proofchain-node", version, about = "Run a proofchain ledger node")]
struct Args {
    /// Port for the HTTP API (overrides network.api_port)
    port: Option<u16>,

    /// Path to the TOML configuration file
    #[arg(long, default_value = "config.toml")]
    config: PathBuf,

    /// Leading zero hex digits required by the proof-of-work
    #[arg(long)]
    difficulty: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = load_config(&args.config)?;
    if let Some(port) = args.port {
        config.network.api_port = port;
    }
    if let Some(difficulty) = args.difficulty {
        config.miner.difficulty = difficulty;
    }

    let node = Arc::new(Node::from_config(&config)?);

    println!("{}", "proofchain node".bright_cyan().bold());
    println!("{}", "---------------".bright_cyan());
    println!("  {} {}", "node id:".bright_green(), node.node_id().bright_white());
    println!(
        "  {} {}",
        "api:".bright_green(),
        format!("http://0.0.0.0:{}", config.network.api_port).bright_white()
    );
    println!(
        "  {} {}",
        "difficulty:".bright_green(),
        config.miner.difficulty.to_string().bright_white()
    );
    println!(
        "  {} {}",
        "peers:".bright_green(),
        node.peers().await.len().to_string().bright_white()
    );
    println!();

    run_api_server(node, config.network.api_port).await?;
    Ok(())
}
