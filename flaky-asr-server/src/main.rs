//! Flaky ASR Server Binary
//!
//! Simulates an unreliable speech-recognition backend for exercising client
//! retry and timeout handling.

use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use flaky_asr_config::{ConfigLoader, FlakyAsrConfig};
use flaky_asr_server::Server;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file path (YAML, or JSON with a .json extension)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Server bind address
    #[arg(short, long)]
    bind: Option<String>,

    /// Server port
    #[arg(short, long)]
    port: Option<u16>,

    /// Print the effective configuration and exit
    #[arg(long)]
    print_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // File (or defaults), then FLAKY_ASR_* environment, then CLI flags
    let mut config = ConfigLoader::new().load(cli.config.as_ref())?;
    apply_cli_overrides(&mut config, &cli)?;

    if cli.print_config {
        println!("{}", serde_yaml::to_string(&config)?);
        return Ok(());
    }

    flaky_asr_logging::init_logging_from_config(&config.logging)?;

    let server = Server::new(config)?;
    server.start().await
}

/// Apply CLI argument overrides to configuration
fn apply_cli_overrides(config: &mut FlakyAsrConfig, cli: &Cli) -> Result<()> {
    if let Some(bind) = &cli.bind {
        config.server.bind_address = bind.clone();
    }

    if let Some(port) = cli.port {
        config.server.port = port;
    }

    config
        .validate_all()
        .map_err(|e| anyhow::anyhow!("Invalid configuration: {}", e))?;

    Ok(())
}
