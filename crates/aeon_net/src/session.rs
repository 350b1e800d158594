//! # Session State Machine
//!
//! Per connection: `Connecting → Accepted → Authenticated → Streaming →
//! Closing → Closed`. The first frame must establish a session; anything
//! else is rejected until a player is bound.

use crate::queue::InboundQueue;

/// Lifecycle phase of one connection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionPhase {
    /// Socket handshake in flight.
    Connecting,
    /// Upgrade accepted, no player bound yet.
    Accepted,
    /// Credentials verified, player bound.
    Authenticated,
    /// Normal frame flow.
    Streaming,
    /// Teardown initiated.
    Closing,
    /// Fully closed.
    Closed,
}

/// Bookkeeping for one connection.
#[derive(Clone, Debug)]
pub struct Session {
    /// Connection id, unique per shard.
    pub id: u64,
    /// Current lifecycle phase.
    pub phase: SessionPhase,
    /// The bound player's shard key, once authenticated.
    pub player_key: Option<String>,
    /// The connection's bounded inbound queue.
    pub queue: InboundQueue,
}

impl Session {
    /// Creates a session in `Connecting` with the given queue bound.
    #[must_use]
    pub fn new(id: u64, queue_cap: usize) -> Self {
        Self { id, phase: SessionPhase::Connecting, player_key: None, queue: InboundQueue::new(queue_cap) }
    }

    /// Marks the upgrade complete.
    pub fn accept(&mut self) {
        if self.phase == SessionPhase::Connecting {
            self.phase = SessionPhase::Accepted;
        }
    }

    /// Binds a player and moves straight into streaming.
    ///
    /// Returns `false` when the session is not in a bindable phase.
    pub fn authenticate(&mut self, player_key: String) -> bool {
        if self.phase != SessionPhase::Accepted {
            return false;
        }
        self.player_key = Some(player_key);
        self.phase = SessionPhase::Authenticated;
        self.phase = SessionPhase::Streaming;
        true
    }

    /// True once a player is bound and frames flow.
    #[must_use]
    pub fn is_streaming(&self) -> bool {
        self.phase == SessionPhase::Streaming
    }

    /// Starts teardown.
    pub fn begin_close(&mut self) {
        if !matches!(self.phase, SessionPhase::Closed) {
            self.phase = SessionPhase::Closing;
        }
    }

    /// Finishes teardown.
    pub fn close(&mut self) {
        self.phase = SessionPhase::Closed;
    }
}
