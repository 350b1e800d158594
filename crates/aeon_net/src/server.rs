//! # WebSocket Server
//!
//! The async shell around [`ShardService`]: one listener, one reader and
//! one writer task per connection, one task owning the shard. All game
//! logic stays behind the service; this module only moves frames.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use aeon_engine::{Shard, SimConfig};
use aeon_store::{Backend, StoreWriter};
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;

use crate::bridge::{Outbound, SocketBridge, WsBridge};
use crate::service::ShardService;
use crate::NetResult;

/// Transport and operational knobs for one shard host.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Listen address.
    pub bind: String,
    /// Tick cadence in milliseconds. The legacy protocol assumes ~640.
    pub tick_ms: u64,
    /// Daily request ceiling for the safety gate.
    pub safety_cap: u32,
    /// Per-connection inbound queue depth.
    pub queue_depth: usize,
    /// Accounts granted operator (admin) rights.
    pub operators: Vec<String>,
    /// Data directory for the filesystem backend; in-memory when unset.
    pub data_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:7777".to_string(),
            tick_ms: 640,
            safety_cap: 90_000,
            queue_depth: 32,
            operators: Vec::new(),
            data_dir: None,
        }
    }
}

/// Messages from connection tasks to the shard task.
enum ShardMsg {
    Open { id: u64, bridge: Box<dyn SocketBridge> },
    Frame { id: u64, raw: String },
    Close { id: u64 },
}

/// Runs one shard host until the process dies.
///
/// # Errors
///
/// Returns a [`crate::NetError`] when the listener cannot bind; per-connection
/// failures are logged and contained.
pub async fn run(config: ServerConfig, sim: SimConfig, backend: Arc<dyn Backend>) -> NetResult<()> {
    let writer = StoreWriter::spawn(backend.clone());
    let shard = Shard::new(sim, Some(writer.handle()));
    let service = ShardService::new(
        shard,
        config.safety_cap,
        backend,
        writer.handle(),
        &config.operators,
        config.queue_depth,
    );

    let (tx, rx) = mpsc::channel::<ShardMsg>(256);
    tokio::spawn(shard_task(service, rx, config.tick_ms));

    let listener = TcpListener::bind(&config.bind).await?;
    tracing::info!(addr = %config.bind, tick_ms = config.tick_ms, "aeon shard listening");

    let mut next_id: u64 = 0;
    loop {
        let (stream, addr) = listener.accept().await?;
        next_id += 1;
        let tx = tx.clone();
        let id = next_id;
        tokio::spawn(async move {
            handle_connection(stream, id, tx).await;
            tracing::debug!(%addr, session = id, "connection task finished");
        });
    }
}

/// Current Unix time in milliseconds.
fn unix_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_millis() as u64).unwrap_or(0)
}

/// The single thread of control for one shard: the tick timer and every
/// inbound message execute one at a time against the service.
async fn shard_task(mut service: ShardService, mut rx: mpsc::Receiver<ShardMsg>, tick_ms: u64) {
    let mut ticker = tokio::time::interval(Duration::from_millis(tick_ms.max(1)));
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
    loop {
        tokio::select! {
            _ = ticker.tick() => service.tick(unix_ms()),
            msg = rx.recv() => match msg {
                Some(ShardMsg::Open { id, bridge }) => service.open(id, bridge),
                Some(ShardMsg::Frame { id, raw }) => service.enqueue(id, raw, unix_ms()),
                Some(ShardMsg::Close { id }) => service.close(id, unix_ms()),
                None => {
                    tracing::info!("shard channel closed, stopping");
                    break;
                }
            }
        }
    }
}

/// Reader/writer pair for one WebSocket connection.
async fn handle_connection(stream: TcpStream, id: u64, tx: mpsc::Sender<ShardMsg>) {
    let ws = match accept_async(stream).await {
        Ok(ws) => ws,
        Err(err) => {
            tracing::warn!(session = id, error = %err, "websocket handshake failed");
            return;
        }
    };
    let (mut sink, mut source) = ws.split();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<Outbound>();
    if tx.send(ShardMsg::Open { id, bridge: Box::new(WsBridge::new(out_tx)) }).await.is_err() {
        return;
    }
    tracing::info!(session = id, "session connected");

    let writer = tokio::spawn(async move {
        while let Some(out) = out_rx.recv().await {
            match out {
                Outbound::Frame(frame) => {
                    if sink.send(Message::Text(frame)).await.is_err() {
                        break;
                    }
                }
                Outbound::Close => {
                    let _ = sink.send(Message::Close(None)).await;
                    break;
                }
            }
        }
    });

    while let Some(msg) = source.next().await {
        match msg {
            Ok(Message::Text(raw)) => {
                if tx.send(ShardMsg::Frame { id, raw }).await.is_err() {
                    break;
                }
            }
            Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                Ok(raw) => {
                    if tx.send(ShardMsg::Frame { id, raw }).await.is_err() {
                        break;
                    }
                }
                Err(_) => {
                    tracing::warn!(session = id, "non-utf8 binary frame dropped");
                }
            },
            Ok(Message::Close(_)) => break,
            Ok(_) => {} // ping/pong handled by the stack
            Err(err) => {
                tracing::debug!(session = id, error = %err, "socket error");
                break;
            }
        }
    }

    let _ = tx.send(ShardMsg::Close { id }).await;
    writer.abort();
    tracing::info!(session = id, "session disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.tick_ms, 640);
        assert_eq!(config.safety_cap, 90_000);
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_config_overlays_from_toml() {
        let config: ServerConfig = toml::from_str("bind = \"0.0.0.0:9000\"\nsafety_cap = 5").unwrap();
        assert_eq!(config.bind, "0.0.0.0:9000");
        assert_eq!(config.safety_cap, 5);
        assert_eq!(config.tick_ms, 640);
    }
}
