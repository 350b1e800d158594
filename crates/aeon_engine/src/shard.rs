//! # The Shard
//!
//! One shard = one world + the players resident in it. The shard runs as a
//! single logical thread of control: the transport task owns it and feeds
//! it the tick and all inbound intents one at a time, so nothing in here
//! locks.
//!
//! [`Shard::advance`] is the only place time moves. It reactivates due
//! resources, expires ground items, drives the always-on simulated player,
//! and sweeps players out to persistence on a cadence.

use std::collections::HashMap;

use aeon_core::{Npc, NpcRole, PlayerState, SceneKind, WorldState, XpTable};
use aeon_store::{normalize_username, StoreHandle};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::agent::SquadAgent;
use crate::config::SimConfig;
use crate::recipes::{default_recipes, Recipe};
use crate::response::XpDrop;

/// One isolated instance of the world plus its resident players.
pub struct Shard {
    /// Simulation tuning.
    pub(crate) config: SimConfig,
    /// Current tick. Only [`Shard::advance`] moves it.
    pub(crate) now: u64,
    /// The active scene's world state.
    pub(crate) world: WorldState,
    /// Resident players, keyed by normalized username.
    pub(crate) players: HashMap<String, PlayerState>,
    /// Decision-engine state per squad.
    pub(crate) agents: HashMap<String, SquadAgent>,
    /// Pending XP drops per player, drained into responses.
    pub(crate) xp_drops: HashMap<String, Vec<XpDrop>>,
    /// The crafting table.
    pub(crate) recipes: Vec<Recipe>,
    /// The immutable XP threshold table.
    pub(crate) xp_table: XpTable,
    /// Deterministic RNG for damage rolls.
    pub(crate) rng: ChaCha8Rng,
    /// Fire-and-forget persistence, when attached.
    pub(crate) store: Option<StoreHandle>,
    /// Key of the always-on simulated player, when enabled.
    bot_key: Option<String>,
}

impl Shard {
    /// Creates a shard with a freshly generated starting scene.
    #[must_use]
    pub fn new(config: SimConfig, store: Option<StoreHandle>) -> Self {
        let xp_table = XpTable::default();
        let world = SceneKind::Greenvale.generate(config.world_seed, 0);
        let rng = ChaCha8Rng::seed_from_u64(config.world_seed);
        let mut shard = Self {
            world,
            players: HashMap::new(),
            agents: HashMap::new(),
            xp_drops: HashMap::new(),
            recipes: default_recipes(),
            xp_table,
            rng,
            store,
            bot_key: None,
            now: 0,
            config,
        };
        if shard.config.bot_enabled {
            shard.spawn_bot();
        }
        shard
    }

    /// The immutable XP table.
    #[must_use]
    pub fn xp_table(&self) -> &XpTable {
        &self.xp_table
    }

    /// The current tick.
    #[must_use]
    pub fn now(&self) -> u64 {
        self.now
    }

    /// Borrows the active world.
    #[must_use]
    pub fn world(&self) -> &WorldState {
        &self.world
    }

    /// Borrows a resident player.
    #[must_use]
    pub fn player(&self, key: &str) -> Option<&PlayerState> {
        self.players.get(key)
    }

    /// Binds a player into the shard, loading the stored blob or creating
    /// a fresh account. Returns the session key.
    pub fn login(&mut self, username: &str, operator: bool, stored: Option<PlayerState>) -> String {
        let key = normalize_username(username);
        if !self.players.contains_key(&key) {
            let player = stored.unwrap_or_else(|| PlayerState::new(username, operator, &self.xp_table));
            tracing::info!(player = %player.name, era = player.era, "player bound to shard");
            self.players.insert(key.clone(), player);
        }
        key
    }

    /// Flushes one player to persistence, best-effort.
    pub fn flush_player(&self, key: &str) {
        if let (Some(handle), Some(player)) = (&self.store, self.players.get(key)) {
            handle.store_player(player);
        }
    }

    /// Advances world time by one tick.
    ///
    /// This is the single place time moves: resources reactivate, ground
    /// items expire, the simulated player acts, and the persistence sweep
    /// runs on its cadence. Session squads are driven separately by their
    /// tick intents.
    pub fn advance(&mut self) -> u64 {
        self.now += 1;
        self.world.time_of_day = ((self.now / self.config.ticks_per_hour) % 24) as u8;

        let respawned = self.world.respawn_due(self.now);
        if respawned > 0 {
            tracing::debug!(count = respawned, tick = self.now, "resources reactivated");
        }
        self.world.expire_ground_items(self.now);

        if let Some(bot_key) = self.bot_key.clone() {
            let in_scene = self.players.get(&bot_key).is_some_and(|p| p.scene == self.world.scene);
            if in_scene {
                let _ = self.run_squad(&bot_key);
                self.mirror_bot(&bot_key);
            }
        }

        if let Some(handle) = &self.store {
            if self.now % self.config.persist_interval == 0 {
                for player in self.players.values() {
                    handle.store_player(player);
                }
            }
        }
        self.now
    }

    /// Runs the decision engine for one squad and applies its intents.
    ///
    /// Returns the squad's latest thought, follower's taking precedence.
    pub fn run_squad(&mut self, key: &str) -> Option<String> {
        let decisions = {
            let player = self.players.get(key)?;
            if player.scene != self.world.scene {
                return None;
            }
            let agent = self.agents.entry(key.to_string()).or_default();
            agent.think(player, &self.world, &self.config)
        };

        let mut thought = None;
        for decision in decisions {
            if decision.thought.is_some() {
                thought = decision.thought.clone();
            }
            if let Some(intent) = decision.intent {
                let response = self.apply(key, decision.actor, intent);
                tracing::trace!(key, status = ?response.status, "agent intent applied");
            }
        }
        thought
    }

    /// Drains pending XP drops for a player.
    pub(crate) fn drain_drops(&mut self, key: &str) -> Vec<XpDrop> {
        self.xp_drops.get_mut(key).map(std::mem::take).unwrap_or_default()
    }

    /// Creates the always-on simulated player.
    fn spawn_bot(&mut self) {
        let name = self.config.bot_name.clone();
        let key = self.login(&name, false, None);
        if let Some(bot) = self.players.get_mut(&key) {
            bot.autopilot = true;
            bot.position = aeon_core::Position::new(5.0, 5.0);
        }
        self.bot_key = Some(key);
    }

    /// Keeps the simulated player visible in the world as a bot NPC.
    fn mirror_bot(&mut self, key: &str) {
        let Some(bot) = self.players.get(key) else { return };
        let id = format!("bot-{key}");
        let position = bot.position;
        let combat_level = bot.melee_level();
        if let Some(npc) = self.world.npc_mut(&id) {
            npc.position = position;
            npc.combat_level = combat_level;
        } else {
            self.world.npcs.push(Npc {
                id,
                name: bot.name.clone(),
                role: NpcRole::Bot,
                hp: 0,
                max_hp: 0,
                combat_level,
                position,
                stock: Vec::new(),
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shard() -> Shard {
        Shard::new(SimConfig { bot_enabled: false, ..SimConfig::default() }, None)
    }

    #[test]
    fn test_login_creates_and_reuses() {
        let mut shard = shard();
        let key = shard.login("Tess", false, None);
        assert_eq!(key, "tess");
        let era_before = shard.player(&key).unwrap().era;
        let again = shard.login("TESS", false, None);
        assert_eq!(again, key, "same normalized account");
        assert_eq!(shard.player(&key).unwrap().era, era_before);
    }

    #[test]
    fn test_advance_moves_time_once_per_call() {
        let mut shard = shard();
        assert_eq!(shard.now(), 0);
        shard.advance();
        shard.advance();
        assert_eq!(shard.now(), 2);
    }

    #[test]
    fn test_bot_spawns_and_mirrors() {
        let mut shard = Shard::new(SimConfig::default(), None);
        shard.advance();
        let mirrored = shard.world().npcs.iter().any(|n| n.role == NpcRole::Bot);
        assert!(mirrored, "bot should be visible in the world");
    }
}
