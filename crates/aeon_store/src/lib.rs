//! # AEON Store - Persistence Adapter
//!
//! Uniform get/put of the serialized [`PlayerState`] blob and an
//! append-only event log, behind the pluggable [`Backend`] trait.
//!
//! ## Design
//!
//! - **No business logic.** Backends move bytes; the simulation never
//!   waits on them.
//! - **Fire-and-forget.** The shard hands writes to a [`StoreWriter`]
//!   thread over a bounded channel. Failures are logged and the game
//!   plays on from memory.
//! - Two backends ship: [`MemoryBackend`] (tests, default) and
//!   [`FsBackend`] (one JSON file per normalized username plus an
//!   `events.jsonl` append log).

#![deny(unsafe_code)]

pub mod backend;
pub mod fs;
pub mod writer;

pub use backend::{Backend, EventRecord, MemoryBackend};
pub use fs::FsBackend;
pub use writer::{StoreHandle, StoreWriter};

use thiserror::Error;

/// Errors from persistence operations.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Underlying filesystem failure.
    #[error("store i/o: {0}")]
    Io(#[from] std::io::Error),

    /// Blob could not be encoded or decoded.
    #[error("store codec: {0}")]
    Codec(#[from] serde_json::Error),

    /// The background writer has shut down.
    #[error("store writer closed")]
    WriterClosed,
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Normalizes a username into a storage key.
///
/// Keys are lowercase with whitespace collapsed to underscores so the same
/// account always maps to the same record.
#[must_use]
pub fn normalize_username(username: &str) -> String {
    username.trim().to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_username() {
        assert_eq!(normalize_username("  Pick Of Gods "), "pick_of_gods");
        assert_eq!(normalize_username("tess"), "tess");
    }
}
