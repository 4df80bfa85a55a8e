//! Admin console server for the hotel reservation engine.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use hotel_server::snapshot::SnapshotFile;
use hotel_server::{load_engine, spawn_engine, Config, Server};
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "hotel-server", about = "Hotel reservation admin console server")]
struct Cli {
    /// TOML config file (overrides HOTEL_CONFIG)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind
    #[arg(long)]
    bind: Option<String>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// JSON snapshot file for the inventory store
    #[arg(long)]
    data_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("loading configuration")?;
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(path) = cli.data_file {
        config.data_file = Some(path);
    }

    init_logging(&config.log_level);

    info!(
        "Starting hotel-server on {} (max_clients = {})",
        config.socket_addr_string(),
        config.max_clients
    );

    let engine = load_engine(&config).await?;
    let snapshot = config.data_file.as_ref().map(SnapshotFile::new);
    let (handle, engine_task) = spawn_engine(engine, snapshot, &config);

    let server = Server::bind(config, handle).await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Interrupt received");
            shutdown_tx.send(true).ok();
        }
    });

    server.run(shutdown_rx).await?;

    // The server owned the last handle; the engine loop ends on its own.
    engine_task.await.context("engine task failed")?;
    info!("Bye");
    Ok(())
}

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
