//! # Simulation Tuning
//!
//! Every tunable the simulation depends on lives here, loaded once at
//! startup from TOML and passed by reference. Durations are in ticks
//! (one tick per scheduling interval).

use serde::Deserialize;

/// Tunable simulation parameters for one shard.
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Seed for deterministic scene generation.
    pub world_seed: u64,
    /// Ticks before a harvested resource reactivates.
    pub respawn_cooldown: u64,
    /// Ticks before a dropped item vanishes.
    pub ground_despawn: u64,
    /// Movement per tick for autonomous walkers.
    pub companion_speed: f32,
    /// A follower beyond this distance closes in on its owner.
    pub follow_radius: f32,
    /// Ground items inside this radius attract looters.
    pub loot_radius: f32,
    /// PRAYER XP per buried item.
    pub prayer_xp: f64,
    /// Percent of max hp restored per food item.
    pub food_heal_percent: u32,
    /// Whether the always-on simulated player spawns.
    pub bot_enabled: bool,
    /// The simulated player's name.
    pub bot_name: String,
    /// Ticks per in-world hour.
    pub ticks_per_hour: u64,
    /// Ticks between background persistence sweeps.
    pub persist_interval: u64,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            world_seed: 0x0AE0_11AD,
            // ~30s at the 640ms cadence.
            respawn_cooldown: 47,
            // ~2min at the 640ms cadence.
            ground_despawn: 187,
            companion_speed: 2.5,
            follow_radius: 3.0,
            loot_radius: 8.0,
            prayer_xp: 4.5,
            food_heal_percent: 30,
            bot_enabled: true,
            bot_name: "Wanderer".to_string(),
            ticks_per_hour: 56,
            persist_interval: 50,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_sane() {
        let config = SimConfig::default();
        assert!(config.respawn_cooldown > 0);
        assert!(config.companion_speed > 0.0);
        assert!(config.loot_radius > config.follow_radius);
    }

    #[test]
    fn test_partial_toml_overlays_defaults() {
        let config: SimConfig = toml::from_str("respawn_cooldown = 5\nbot_enabled = false").unwrap();
        assert_eq!(config.respawn_cooldown, 5);
        assert!(!config.bot_enabled);
        assert_eq!(config.loot_radius, SimConfig::default().loot_radius);
    }
}
