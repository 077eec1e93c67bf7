//! Voice Metrics Service CLI
//!
//! Windowed ingest and metrics for voice agent interaction events.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use voice_metrics_service::{config::Config, VERSION};

#[derive(Parser)]
#[command(name = "voice-metrics")]
#[command(version = VERSION)]
#[command(about = "Windowed ingest and metrics service for voice agent events", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the ingest, metrics and report server
    Serve {
        /// Address to bind to
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides PORT)
        #[arg(long)]
        port: Option<u16>,

        /// Retention time window in seconds
        #[arg(long)]
        time_window: Option<u64>,

        /// Maximum number of retained events
        #[arg(long)]
        max_events: Option<usize>,
    },

    /// Post simulated events to an ingest endpoint
    Simulate {
        /// Ingest URL (overrides TARGET_URL)
        #[arg(long)]
        target: Option<String>,

        /// Seconds between events
        #[arg(long)]
        interval: Option<u64>,

        /// Stop after this many events
        #[arg(long)]
        count: Option<u64>,
    },

    /// Show configuration
    Config,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let mut config = Config::load().context("Failed to load configuration")?;

    match cli.command {
        Commands::Serve {
            host,
            port,
            time_window,
            max_events,
        } => {
            if let Some(host) = host {
                config.host = host;
            }
            if let Some(port) = port {
                config.port = port;
            }
            if let Some(secs) = time_window {
                config.time_window = std::time::Duration::from_secs(secs);
            }
            if let Some(max) = max_events {
                config.max_events = max;
            }
            config.validate()?;
            cmd_serve(config).await
        }
        Commands::Simulate {
            target,
            interval,
            count,
        } => {
            if let Some(target) = target {
                config.simulator.target_url = target;
            }
            if let Some(secs) = interval {
                config.simulator.interval = std::time::Duration::from_secs(secs);
            }
            config.validate()?;
            cmd_simulate(config, count).await
        }
        Commands::Config => {
            cmd_config(&config);
            Ok(())
        }
    }
}

/// Install the tracing subscriber, honouring RUST_LOG.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[cfg(feature = "server")]
async fn cmd_serve(config: Config) -> anyhow::Result<()> {
    use voice_metrics_service::{server, ServerConfig, SharedEventStore};

    let store = SharedEventStore::new(config.retention_policy());
    let (_addr, shutdown_tx) =
        server::run_with_store(ServerConfig::from_config(&config), store.clone())
            .await
            .context("Failed to start server")?;

    tracing::info!("Press Ctrl+C to stop");
    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for Ctrl+C")?;

    let _ = shutdown_tx.send(());
    tracing::info!("{}", store.stats().summary());
    Ok(())
}

#[cfg(not(feature = "server"))]
async fn cmd_serve(_config: Config) -> anyhow::Result<()> {
    anyhow::bail!("serve requires the `server` feature")
}

#[cfg(feature = "simulator")]
async fn cmd_simulate(config: Config, count: Option<u64>) -> anyhow::Result<()> {
    use voice_metrics_service::{MockGenerator, Simulator};

    let simulator = Simulator::new(
        config.simulator.target_url.clone(),
        config.simulator.interval,
        MockGenerator::new(),
    )?;

    let summary = simulator
        .run(count, async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await;

    tracing::info!(
        "Simulation finished: {} sent, {} failed",
        summary.sent,
        summary.failed
    );
    Ok(())
}

#[cfg(not(feature = "simulator"))]
async fn cmd_simulate(_config: Config, _count: Option<u64>) -> anyhow::Result<()> {
    anyhow::bail!("simulate requires the `simulator` feature")
}

fn cmd_config(config: &Config) {
    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).unwrap_or_else(|_| "Error".to_string())
    );
}
