//! Meridian daemon — entry point for running a node.

use clap::Parser;
use meridian_node::{Node, NodeConfig};
use meridian_types::NetworkId;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "meridian-daemon", about = "Meridian proof-of-authority node daemon")]
struct Cli {
    /// Network to participate in: "live", "test", or "dev".
    /// When a config file is provided, defaults to the file's value.
    #[arg(long, env = "MERIDIAN_NETWORK")]
    network: Option<String>,

    /// Data directory (node key storage).
    #[arg(long, env = "MERIDIAN_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Hex-encoded proposer private key (for testing).
    #[arg(long, env = "MERIDIAN_PROPOSER_KEY")]
    key: Option<String>,

    /// Log level: "trace", "debug", "info", "warn", "error".
    #[arg(long, default_value = "info", env = "MERIDIAN_LOG_LEVEL")]
    log_level: String,

    /// Path to a TOML configuration file. File settings are the base;
    /// CLI flags and env vars override them.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn parse_network(s: &str) -> NetworkId {
    match s.to_lowercase().as_str() {
        "live" => NetworkId::Live,
        "test" => NetworkId::Test,
        _ => NetworkId::Dev,
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // the CLI level always has a value and overrides the file's anyway
    meridian_utils::init_tracing(&cli.log_level);

    let file_config: Option<NodeConfig> = match &cli.config {
        Some(path) => match NodeConfig::from_toml_file(path) {
            Ok(config) => {
                tracing::info!("loaded config from {}", path.display());
                Some(config)
            }
            Err(e) => {
                tracing::warn!("failed to load config file: {e}, using CLI defaults");
                None
            }
        },
        None => None,
    };

    let base = file_config.unwrap_or_default();
    let config = NodeConfig {
        network: cli
            .network
            .as_deref()
            .map(parse_network)
            .unwrap_or(base.network),
        data_dir: cli.data_dir.unwrap_or(base.data_dir),
        proposer_key: cli.key.or(base.proposer_key),
        params: base.params,
        log_level: cli.log_level,
    };

    tracing::info!(
        "starting Meridian node on {} network",
        config.network.as_str()
    );

    let mut node = Node::new(config)?;
    node.start()?;

    node.wait_for_signal().await;
    tracing::info!("shutdown signal received, stopping node");
    node.stop().await;

    tracing::info!("meridian daemon exited cleanly");
    Ok(())
}
