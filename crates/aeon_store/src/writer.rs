//! # Background Store Writer
//!
//! The simulation never blocks on persistence. Writes travel over a
//! bounded channel to a dedicated thread; when the channel is full or the
//! backend fails, the write is dropped with a warning and the game keeps
//! running from memory.

use std::sync::Arc;
use std::thread::JoinHandle;

use aeon_core::PlayerState;
use crossbeam_channel::{bounded, Sender, TrySendError};

use crate::backend::{Backend, EventRecord};

/// Commands accepted by the writer thread.
enum WriteCmd {
    Player(Box<PlayerState>),
    Event(EventRecord),
    Shutdown,
}

/// Cloneable, non-blocking handle to the writer thread.
#[derive(Clone)]
pub struct StoreHandle {
    tx: Sender<WriteCmd>,
}

impl StoreHandle {
    /// Queues a player blob write. Never blocks; drops with a warning when
    /// the queue is full or the writer is gone.
    pub fn store_player(&self, player: &PlayerState) {
        self.dispatch(WriteCmd::Player(Box::new(player.clone())), "player");
    }

    /// Queues an event append. Same non-blocking contract.
    pub fn append_event(&self, event: EventRecord) {
        self.dispatch(WriteCmd::Event(event), "event");
    }

    fn dispatch(&self, cmd: WriteCmd, what: &str) {
        match self.tx.try_send(cmd) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                tracing::warn!(what, "store queue full, dropping write");
            }
            Err(TrySendError::Disconnected(_)) => {
                tracing::warn!(what, "store writer gone, dropping write");
            }
        }
    }
}

/// The writer thread plus its handle.
pub struct StoreWriter {
    handle: StoreHandle,
    thread: Option<JoinHandle<()>>,
}

/// Queue depth before writes start being dropped.
const QUEUE_DEPTH: usize = 256;

impl StoreWriter {
    /// Spawns the writer thread over `backend`.
    #[must_use]
    pub fn spawn(backend: Arc<dyn Backend>) -> Self {
        let (tx, rx) = bounded::<WriteCmd>(QUEUE_DEPTH);
        let thread = std::thread::Builder::new()
            .name("aeon-store-writer".to_string())
            .spawn(move || {
                while let Ok(cmd) = rx.recv() {
                    match cmd {
                        WriteCmd::Player(player) => {
                            if let Err(err) = backend.store_player(&player) {
                                tracing::warn!(player = %player.name, error = %err, "player write failed");
                            }
                        }
                        WriteCmd::Event(event) => {
                            if let Err(err) = backend.append_event(&event) {
                                tracing::warn!(kind = %event.kind, error = %err, "event append failed");
                            }
                        }
                        WriteCmd::Shutdown => break,
                    }
                }
            })
            .expect("spawn store writer thread");
        Self { handle: StoreHandle { tx }, thread: Some(thread) }
    }

    /// Returns a cloneable handle for producers.
    #[must_use]
    pub fn handle(&self) -> StoreHandle {
        self.handle.clone()
    }

    /// Drains the queue and stops the thread.
    pub fn shutdown(mut self) {
        let _ = self.handle.tx.send(WriteCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for StoreWriter {
    fn drop(&mut self) {
        let _ = self.handle.tx.try_send(WriteCmd::Shutdown);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use aeon_core::XpTable;

    #[test]
    fn test_writes_reach_backend() {
        let backend = Arc::new(MemoryBackend::new());
        let writer = StoreWriter::spawn(backend.clone());
        let handle = writer.handle();

        let player = PlayerState::new("Tess", false, &XpTable::default());
        handle.store_player(&player);
        handle.append_event(EventRecord::new("login", serde_json::json!({"user": "tess"}), 1));

        writer.shutdown();
        assert!(backend.load_player("tess").unwrap().is_some());
        assert_eq!(backend.event_count(), 1);
    }

    #[test]
    fn test_handle_survives_writer_death() {
        let backend = Arc::new(MemoryBackend::new());
        let writer = StoreWriter::spawn(backend);
        let handle = writer.handle();
        writer.shutdown();
        // Dropped, not panicked.
        handle.append_event(EventRecord::new("late", serde_json::json!({}), 2));
    }
}
