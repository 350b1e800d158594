//! # Socket Bridge Adapter
//!
//! The protocol handler talks to connections through a socket-shaped
//! trait, not a concrete transport. Production wraps a WebSocket writer
//! task; tests use a channel-backed bridge and inspect what was sent.
//! Swapping one for the other never touches routing logic.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc::UnboundedSender;

/// What a bridge can carry toward the peer.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outbound {
    /// A serialized response frame.
    Frame(String),
    /// An orderly close.
    Close,
}

/// The socket-like interface the protocol handler sees.
pub trait SocketBridge: Send {
    /// Queues a frame toward the peer. Best-effort: a gone peer is logged,
    /// never an error that could poison the shard task.
    fn send(&self, frame: String);

    /// Requests an orderly close.
    fn close(&self);
}

/// Production bridge: feeds the per-connection WebSocket writer task.
pub struct WsBridge {
    tx: UnboundedSender<Outbound>,
}

impl WsBridge {
    /// Wraps a writer-task channel.
    #[must_use]
    pub fn new(tx: UnboundedSender<Outbound>) -> Self {
        Self { tx }
    }
}

impl SocketBridge for WsBridge {
    fn send(&self, frame: String) {
        if self.tx.send(Outbound::Frame(frame)).is_err() {
            tracing::debug!("peer writer gone, frame dropped");
        }
    }

    fn close(&self) {
        let _ = self.tx.send(Outbound::Close);
    }
}

/// Test bridge: records everything sent.
#[derive(Clone, Default)]
pub struct ChannelBridge {
    sent: Arc<Mutex<Vec<Outbound>>>,
}

impl ChannelBridge {
    /// Creates an empty recording bridge.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything sent so far.
    #[must_use]
    pub fn drain(&self) -> Vec<Outbound> {
        std::mem::take(&mut self.sent.lock())
    }

    /// Serialized frames sent so far, closes filtered out.
    #[must_use]
    pub fn frames(&self) -> Vec<String> {
        self.sent
            .lock()
            .iter()
            .filter_map(|o| match o {
                Outbound::Frame(f) => Some(f.clone()),
                Outbound::Close => None,
            })
            .collect()
    }

    /// True when a close was requested.
    #[must_use]
    pub fn closed(&self) -> bool {
        self.sent.lock().iter().any(|o| *o == Outbound::Close)
    }
}

impl SocketBridge for ChannelBridge {
    fn send(&self, frame: String) {
        self.sent.lock().push(Outbound::Frame(frame));
    }

    fn close(&self) {
        self.sent.lock().push(Outbound::Close);
    }
}
