//! # AEON Shard Server
//!
//! Headless host for one world shard. Usage:
//!
//! ```text
//! aeon_server [config.toml]
//! ```
//!
//! Without a config path every knob takes its default. The safety cap can
//! additionally be overridden through `AEON_SAFETY_CAP`, so an operator
//! can clamp a misbehaving deployment without shipping a new file.

use std::sync::Arc;

use aeon_engine::SimConfig;
use aeon_net::ServerConfig;
use aeon_store::{Backend, FsBackend, MemoryBackend};
use serde::Deserialize;

/// The full host configuration: transport plus simulation.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Config {
    /// Transport and operational knobs.
    server: ServerConfig,
    /// Simulation tuning.
    sim: SimConfig,
}

fn load_config() -> Config {
    let mut config = match std::env::args().nth(1) {
        Some(path) => {
            let raw = match std::fs::read_to_string(&path) {
                Ok(raw) => raw,
                Err(err) => {
                    eprintln!("cannot read config {path}: {err}");
                    std::process::exit(1);
                }
            };
            match toml::from_str(&raw) {
                Ok(config) => config,
                Err(err) => {
                    eprintln!("cannot parse config {path}: {err}");
                    std::process::exit(1);
                }
            }
        }
        None => Config::default(),
    };

    if let Ok(cap) = std::env::var("AEON_SAFETY_CAP") {
        match cap.parse() {
            Ok(cap) => config.server.safety_cap = cap,
            Err(_) => eprintln!("ignoring non-numeric AEON_SAFETY_CAP"),
        }
    }
    config
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = load_config();

    let backend: Arc<dyn Backend> = match &config.server.data_dir {
        Some(dir) => match FsBackend::open(dir) {
            Ok(backend) => {
                tracing::info!(dir = %dir.display(), "filesystem persistence");
                Arc::new(backend)
            }
            Err(err) => {
                tracing::error!(error = %err, "cannot open data directory");
                std::process::exit(1);
            }
        },
        None => {
            tracing::info!("in-memory persistence (nothing survives restart)");
            Arc::new(MemoryBackend::new())
        }
    };

    if let Err(err) = aeon_net::run(config.server, config.sim, backend).await {
        tracing::error!(error = %err, "shard server failed");
        std::process::exit(1);
    }
}
