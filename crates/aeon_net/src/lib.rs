//! # AEON Net - The Realtime Session Layer
//!
//! WebSocket sessions feeding one authoritative shard task.
//!
//! ## Architecture
//!
//! ```text
//! CLIENT ──ws──► reader task ──mpsc──► ┌──────────────────┐
//!                                      │   SHARD TASK     │
//! CLIENT ◄──ws── writer task ◄──mpsc── │ gate ► queue ►   │
//!                                      │ protocol ► router│
//!                                      │ 640ms tick timer │
//!                                      └──────────────────┘
//! ```
//!
//! - The shard task owns the [`aeon_engine::Shard`] outright; the tick
//!   timer and all inbound frames execute one at a time against it, so no
//!   locking exists inside a shard.
//! - The [`bridge::SocketBridge`] trait keeps the protocol handler
//!   independent of the transport: tests drive a channel-backed bridge,
//!   production wraps the WebSocket writer.
//! - The [`gate::SafetyGate`] rejects frames at the transport boundary
//!   once the daily request budget is spent.

#![deny(unsafe_code)]

pub mod bridge;
pub mod gate;
pub mod protocol;
pub mod queue;
pub mod server;
pub mod service;
pub mod session;

pub use bridge::{ChannelBridge, SocketBridge};
pub use gate::SafetyGate;
pub use protocol::{ClientFrame, Request};
pub use queue::InboundQueue;
pub use server::{run, ServerConfig};
pub use service::ShardService;
pub use session::{Session, SessionPhase};

use thiserror::Error;

/// Errors from the transport layer.
///
/// Gameplay rejections never appear here; those are tagged responses. This
/// type covers infrastructure faults only.
#[derive(Error, Debug)]
pub enum NetError {
    /// Socket-level failure.
    #[error("transport i/o: {0}")]
    Io(#[from] std::io::Error),

    /// WebSocket protocol failure.
    #[error("websocket: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    /// A frame could not be decoded at all.
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),

    /// The intent path is not part of the protocol.
    #[error("unknown path: {0}")]
    UnknownPath(String),

    /// The body did not match the path's schema.
    #[error("bad body for {path}: {reason}")]
    BadBody {
        /// The offending path.
        path: String,
        /// What was wrong.
        reason: String,
    },

    /// The peer went away mid-send.
    #[error("session closed")]
    SessionClosed,
}

/// Result type for transport operations.
pub type NetResult<T> = Result<T, NetError>;
