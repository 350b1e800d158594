//! # Shard Service
//!
//! The protocol handler: sessions in, tagged responses out. Fully
//! synchronous; the async server wires sockets to it, tests drive it
//! directly through [`ChannelBridge`]s. It owns the shard, the safety
//! gate, and every session's bookkeeping; nothing here is shared across
//! threads.

use std::collections::HashMap;
use std::sync::Arc;

use aeon_engine::{ActorRef, GameResponse, Intent, Shard};
use aeon_store::{normalize_username, Backend, EventRecord, StoreHandle};

use crate::bridge::SocketBridge;
use crate::gate::{SafetyGate, SERVICE_LIMIT_MSG};
use crate::protocol::{parse_frame, parse_request, Request};
use crate::session::Session;
use crate::NetError;

struct Entry {
    session: Session,
    bridge: Box<dyn SocketBridge>,
}

/// One shard's protocol handler: safety gate, session table, router.
pub struct ShardService {
    shard: Shard,
    gate: SafetyGate,
    sessions: HashMap<u64, Entry>,
    backend: Arc<dyn Backend>,
    store: StoreHandle,
    operators: Vec<String>,
    queue_cap: usize,
}

impl ShardService {
    /// Assembles a service around a shard.
    #[must_use]
    pub fn new(
        shard: Shard,
        safety_cap: u32,
        backend: Arc<dyn Backend>,
        store: StoreHandle,
        operators: &[String],
        queue_cap: usize,
    ) -> Self {
        Self {
            shard,
            gate: SafetyGate::new(safety_cap),
            sessions: HashMap::new(),
            backend,
            store,
            operators: operators.iter().map(|o| normalize_username(o)).collect(),
            queue_cap,
        }
    }

    /// Borrows the underlying shard, for tests and health endpoints.
    #[must_use]
    pub fn shard(&self) -> &Shard {
        &self.shard
    }

    /// Number of live sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    /// Registers a new connection behind its bridge.
    pub fn open(&mut self, id: u64, bridge: Box<dyn SocketBridge>) {
        let mut session = Session::new(id, self.queue_cap);
        session.accept();
        self.sessions.insert(id, Entry { session, bridge });
        tracing::debug!(session = id, "session accepted");
    }

    /// Counts and enqueues one inbound frame.
    ///
    /// The safety gate runs here, at the transport boundary, before the
    /// frame can ever reach the router.
    pub fn enqueue(&mut self, id: u64, raw: String, now_ms: u64) {
        if !self.gate.admit(now_ms) {
            self.respond(id, &GameResponse::fail(SERVICE_LIMIT_MSG));
            return;
        }
        if let Some(entry) = self.sessions.get_mut(&id) {
            entry.session.queue.push(raw);
        }
    }

    /// One scheduling interval: drain inbound queues, advance world time,
    /// then push tick snapshots to every bound session.
    pub fn tick(&mut self, now_ms: u64) {
        self.drain_queues(now_ms);
        self.shard.advance();

        let bound: Vec<(u64, String)> = self
            .sessions
            .values()
            .filter(|e| e.session.is_streaming())
            .filter_map(|e| e.session.player_key.clone().map(|k| (e.session.id, k)))
            .collect();
        for (id, key) in bound {
            let resp = self.shard.apply(&key, ActorRef::Owner, Intent::Tick);
            self.respond(id, &resp);
        }
    }

    /// Tears a session down on peer disconnect: the player's entities stay
    /// resident in the shard, the blob is flushed best-effort.
    pub fn close(&mut self, id: u64, now_ms: u64) {
        let Some(mut entry) = self.sessions.remove(&id) else { return };
        entry.session.begin_close();
        if let Some(key) = entry.session.player_key.as_deref() {
            self.shard.flush_player(key);
            self.store.append_event(EventRecord::new(
                "logout",
                serde_json::json!({ "user": key }),
                now_ms,
            ));
        }
        entry.session.close();
        tracing::info!(session = id, "session closed");
    }

    fn drain_queues(&mut self, now_ms: u64) {
        let ids: Vec<u64> = self.sessions.keys().copied().collect();
        for id in ids {
            loop {
                let raw = match self.sessions.get_mut(&id) {
                    Some(entry) => entry.session.queue.pop(),
                    None => break, // terminated mid-drain
                };
                let Some(raw) = raw else { break };
                self.process(id, &raw, now_ms);
            }
        }
    }

    fn process(&mut self, id: u64, raw: &str, now_ms: u64) {
        let frame = match parse_frame(raw) {
            Ok(frame) => frame,
            Err(err) => {
                // A malformed frame is a session fault: only this session
                // dies, and its state is flushed on the way out.
                tracing::warn!(session = id, error = %err, "malformed frame, terminating session");
                self.terminate(id, now_ms);
                return;
            }
        };
        let request = match parse_request(&frame) {
            Ok(request) => request,
            Err(NetError::UnknownPath(path)) => {
                self.respond(id, &GameResponse::fail(format!("Unknown path: {path}")));
                return;
            }
            Err(err) => {
                self.respond(id, &GameResponse::fail(format!("Bad request: {err}")));
                return;
            }
        };

        match request {
            Request::Login { username, pass } => self.handle_auth(id, &username, &pass, false, now_ms),
            Request::Register { username, pass } => self.handle_auth(id, &username, &pass, true, now_ms),
            Request::Game(intent) => {
                let key = self
                    .sessions
                    .get(&id)
                    .filter(|e| e.session.is_streaming())
                    .and_then(|e| e.session.player_key.clone());
                let Some(key) = key else {
                    // Nothing but login/register passes before a bind.
                    self.respond(id, &GameResponse::fail("No session."));
                    return;
                };
                let resp = self.shard.apply(&key, ActorRef::Owner, intent);
                self.respond(id, &resp);
            }
        }
    }

    fn handle_auth(&mut self, id: u64, username: &str, pass: &str, register: bool, now_ms: u64) {
        let already_bound = self.sessions.get(&id).is_some_and(|e| e.session.is_streaming());
        if already_bound {
            self.respond(id, &GameResponse::fail("Session already bound."));
            return;
        }

        if register {
            if !self.backend.register(username, pass) {
                self.respond(id, &GameResponse::fail("User exists."));
                return;
            }
        } else if !self.backend.verify(username, pass) {
            self.respond(id, &GameResponse::fail("Invalid credentials."));
            return;
        }

        let stored = match self.backend.load_player(username) {
            Ok(stored) => stored,
            Err(err) => {
                // Best-effort: a broken blob means a fresh start, not an
                // unavailable game.
                tracing::warn!(username, error = %err, "stored player unreadable");
                None
            }
        };
        let operator = self.operators.contains(&normalize_username(username));
        let key = self.shard.login(username, operator, stored);
        if let Some(entry) = self.sessions.get_mut(&id) {
            if !entry.session.authenticate(key.clone()) {
                self.respond(id, &GameResponse::fail("Session not ready."));
                return;
            }
        }
        self.shard.flush_player(&key);
        self.store.append_event(EventRecord::new(
            if register { "register" } else { "login" },
            serde_json::json!({ "user": key }),
            now_ms,
        ));

        let resp = match self.shard.player(&key) {
            Some(player) => GameResponse::success("Welcome to the world.")
                .with_state(player)
                .with_world(self.shard.world()),
            None => GameResponse::fail("Login failed."),
        };
        self.respond(id, &resp);
    }

    fn terminate(&mut self, id: u64, now_ms: u64) {
        if let Some(entry) = self.sessions.get(&id) {
            entry.bridge.close();
        }
        self.close(id, now_ms);
    }

    fn respond(&self, id: u64, resp: &GameResponse) {
        let Some(entry) = self.sessions.get(&id) else { return };
        match serde_json::to_string(resp) {
            Ok(raw) => entry.bridge.send(raw),
            Err(err) => tracing::warn!(session = id, error = %err, "response encode failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::ChannelBridge;
    use aeon_engine::{ResponseStatus, SimConfig};
    use aeon_store::{MemoryBackend, StoreWriter};
    use serde_json::json;

    fn service(safety_cap: u32) -> (ShardService, Arc<MemoryBackend>, StoreWriter) {
        let backend = Arc::new(MemoryBackend::new());
        let writer = StoreWriter::spawn(backend.clone());
        let shard = Shard::new(SimConfig { bot_enabled: false, ..SimConfig::default() }, Some(writer.handle()));
        let service = ShardService::new(shard, safety_cap, backend.clone(), writer.handle(), &[], 8);
        (service, backend, writer)
    }

    fn frame(path: &str, body: serde_json::Value) -> String {
        json!({ "path": path, "body": body }).to_string()
    }

    fn status_of(raw: &str) -> ResponseStatus {
        serde_json::from_str::<GameResponse>(raw).unwrap().status
    }

    #[test]
    fn test_first_frame_must_establish_a_session() {
        let (mut service, _, _writer) = service(100);
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));

        service.enqueue(1, frame("/action/move", json!({"x": 1.0, "z": 2.0})), 0);
        service.tick(0);

        let frames = bridge.frames();
        // First reply rejects the unbound intent; a tick snapshot is not
        // pushed to unbound sessions.
        assert_eq!(status_of(&frames[0]), ResponseStatus::Fail);
        assert_eq!(frames.len(), 1);
    }

    #[test]
    fn test_register_binds_and_streams() {
        let (mut service, backend, _writer) = service(100);
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));

        service.enqueue(1, frame("/auth/register", json!({"username": "Tess", "pass": "pw"})), 0);
        service.tick(0);

        let frames = bridge.frames();
        assert_eq!(status_of(&frames[0]), ResponseStatus::Success);
        // The tick that processed the register also pushed a snapshot.
        assert_eq!(frames.len(), 2);
        assert!(backend.verify("tess", "pw"));
    }

    #[test]
    fn test_login_rejects_bad_credentials() {
        let (mut service, backend, _writer) = service(100);
        backend.register("Tess", "pw");
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));

        service.enqueue(1, frame("/auth/login", json!({"username": "Tess", "pass": "wrong"})), 0);
        service.tick(0);
        assert_eq!(status_of(&bridge.frames()[0]), ResponseStatus::Fail);
    }

    #[test]
    fn test_bound_session_routes_intents() {
        let (mut service, _, _writer) = service(100);
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));
        service.enqueue(1, frame("/auth/register", json!({"username": "Tess", "pass": "pw"})), 0);
        service.tick(0);
        let _ = bridge.drain();

        service.enqueue(1, frame("/action/move", json!({"x": 3.0, "z": 4.0})), 1);
        service.tick(1);
        let player = service.shard().player("tess").unwrap();
        assert!((player.position.x - 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_safety_gate_rejects_past_cap() {
        let (mut service, _, _writer) = service(2);
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));

        service.enqueue(1, frame("/auth/register", json!({"username": "Tess", "pass": "pw"})), 0);
        service.enqueue(1, frame("/ai/tick", json!({})), 0);
        service.enqueue(1, frame("/ai/tick", json!({})), 0);

        // The third frame was answered immediately with the limit message,
        // before the router ever saw it.
        let limited = bridge
            .frames()
            .iter()
            .any(|f| f.contains("Service limit"));
        assert!(limited);
    }

    #[test]
    fn test_malformed_frame_terminates_only_that_session() {
        let (mut service, _, _writer) = service(100);
        let victim = ChannelBridge::new();
        let bystander = ChannelBridge::new();
        service.open(1, Box::new(victim.clone()));
        service.open(2, Box::new(bystander.clone()));
        service.enqueue(2, frame("/auth/register", json!({"username": "By", "pass": "pw"})), 0);

        service.enqueue(1, "}{ not json".to_string(), 0);
        service.tick(0);

        assert!(victim.closed(), "faulting session is closed");
        assert_eq!(service.session_count(), 1);
        assert!(!bystander.closed(), "other sessions unaffected");
        assert!(service.shard().player("by").is_some(), "shard kept running");
    }

    #[test]
    fn test_disconnect_leaves_entities_resident() {
        let (mut service, _, _writer) = service(100);
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));
        service.enqueue(1, frame("/auth/register", json!({"username": "Tess", "pass": "pw"})), 0);
        service.tick(0);

        service.close(1, 1);
        assert_eq!(service.session_count(), 0);
        assert!(service.shard().player("tess").is_some(), "entities stay resident");
    }

    #[test]
    fn test_tick_pushes_snapshots_to_bound_sessions() {
        let (mut service, _, _writer) = service(100);
        let bridge = ChannelBridge::new();
        service.open(1, Box::new(bridge.clone()));
        service.enqueue(1, frame("/auth/register", json!({"username": "Tess", "pass": "pw"})), 0);
        service.tick(0);
        let _ = bridge.drain();

        service.tick(1);
        let frames = bridge.frames();
        assert_eq!(frames.len(), 1);
        let resp: GameResponse = serde_json::from_str(&frames[0]).unwrap();
        assert_eq!(resp.status, ResponseStatus::Ok);
        assert!(resp.state.is_some());
        assert!(resp.world.is_some());
    }
}
