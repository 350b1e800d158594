//! # Players and Followers
//!
//! A player owns exactly one follower. The follower keeps a non-owning
//! back-reference (the owner's id) for lookup only, its own bounded
//! inventory, and a small memory of the last command so interrupted work
//! can resume.

use serde::{Deserialize, Serialize};

use crate::item::{Equipment, Inventory, ItemKind, ItemStack};
use crate::level::XpTable;
use crate::position::Position;
use crate::scene::SceneKind;
use crate::skill::{SkillMap, SkillName};

/// The companion's name for a given era. The follower is renamed as its
/// owner evolves.
#[must_use]
pub const fn companion_name(era: u8) -> &'static str {
    match era {
        0 | 1 => "Ember",
        2 | 3 => "Ashkin",
        4 | 5 => "Brand",
        6 | 7 => "Pyrrhus",
        8 | 9 => "Calder",
        10 | 11 => "Solace",
        _ => "Aurel",
    }
}

/// Commands a follower obeys.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FollowerCommand {
    /// Shadow the owner.
    Follow,
    /// Halt in place.
    Stay,
    /// Hunt live enemies.
    Kill,
    /// Deposit carried goods.
    Bank,
    /// Work a gathering skill.
    Gather,
}

/// What the follower remembers across interruptions.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentMemory {
    /// The last explicit command received.
    pub last_command: Option<FollowerCommand>,
    /// The skill that command targeted, if any.
    pub last_skill: Option<SkillName>,
}

/// The player's companion entity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Follower {
    /// Unique id.
    pub id: String,
    /// Owner's player id. Lookup only; never an ownership edge.
    pub owner_id: String,
    /// Display name.
    pub name: String,
    /// Current position.
    pub position: Position,
    /// Active command.
    pub command: FollowerCommand,
    /// The follower's own bounded inventory.
    pub inventory: Inventory,
    /// Memory for resuming interrupted work.
    pub memory: AgentMemory,
}

/// Quest progress, advanced by kill/stage side effects.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuestState {
    /// Current stage, monotone non-decreasing.
    pub stage: u32,
    /// Quest display name.
    pub name: String,
}

impl Default for QuestState {
    fn default() -> Self {
        Self { stage: 0, name: "First Fires".to_string() }
    }
}

/// The authoritative record for one player.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Unique id, derived from the normalized username.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Operator accounts may issue admin intents.
    pub operator: bool,
    /// Current health.
    pub hp: u32,
    /// Health pool, tied to the HITS level.
    pub max_hp: u32,
    /// Skill progress.
    pub skills: SkillMap,
    /// Era, 0..=12, monotone non-decreasing.
    pub era: u8,
    /// Bounded inventory.
    pub inventory: Inventory,
    /// Unbounded bank storage; stacks universally.
    pub bank: Vec<ItemStack>,
    /// Worn equipment.
    pub equipment: Equipment,
    /// Position in the current scene.
    pub position: Position,
    /// Scene the player occupies.
    pub scene: SceneKind,
    /// Quest progress.
    pub quest: QuestState,
    /// When set, the decision engine drives this player each tick.
    pub autopilot: bool,
    /// The player's companion.
    pub follower: Follower,
}

impl PlayerState {
    /// Creates a fresh player with starter gear and a follower at its side.
    #[must_use]
    pub fn new(username: &str, operator: bool, table: &XpTable) -> Self {
        let id = format!("player-{}", username.to_lowercase());
        let mut inventory = Inventory::new();
        // Starter kit; failures impossible on an empty inventory.
        let _ = inventory.add(ItemStack::new(ItemKind::HandAxe, 1));
        let _ = inventory.add(ItemStack::new(ItemKind::CookedMeat, 1));
        let _ = inventory.add(ItemStack::new(ItemKind::CookedMeat, 1));

        let bank = vec![
            ItemStack::new(ItemKind::Logs, 50),
            ItemStack::new(ItemKind::Flint, 50),
            ItemStack::new(ItemKind::CookedMeat, 20),
        ];

        let follower = Follower {
            id: format!("companion-{}", username.to_lowercase()),
            owner_id: id.clone(),
            name: "Ember".to_string(),
            position: Position::new(-2.0, -2.0),
            command: FollowerCommand::Follow,
            inventory: Inventory::new(),
            memory: AgentMemory::default(),
        };

        Self {
            id,
            name: username.to_string(),
            operator,
            hp: 10,
            max_hp: 10,
            skills: SkillMap::starting(0, table),
            era: 0,
            inventory,
            bank,
            equipment: Equipment::default(),
            position: Position::new(0.0, 0.0),
            scene: SceneKind::Greenvale,
            quest: QuestState::default(),
            autopilot: false,
            follower,
        }
    }

    /// Deposits a stack into the bank, merging with any existing stack of
    /// the same kind (the bank stacks universally).
    pub fn bank_deposit(&mut self, stack: ItemStack) {
        if let Some(existing) = self.bank.iter_mut().find(|s| s.kind == stack.kind) {
            existing.count += stack.count;
        } else {
            self.bank.push(stack);
        }
    }

    /// Removes up to `count` of `kind` from the bank, returning how many
    /// were actually taken.
    pub fn bank_withdraw(&mut self, kind: ItemKind, count: u32) -> u32 {
        let Some(idx) = self.bank.iter().position(|s| s.kind == kind) else {
            return 0;
        };
        let taken = self.bank[idx].count.min(count);
        self.bank[idx].count -= taken;
        if self.bank[idx].count == 0 {
            self.bank.remove(idx);
        }
        taken
    }

    /// The melee skill level used to scale damage rolls.
    #[must_use]
    pub fn melee_level(&self) -> u8 {
        self.skills.get(SkillName::Strength).level.max(self.skills.get(SkillName::Attack).level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> XpTable {
        XpTable::default()
    }

    #[test]
    fn test_new_player_shape() {
        let p = PlayerState::new("Tess", false, &table());
        assert_eq!(p.id, "player-tess");
        assert_eq!(p.era, 0);
        assert_eq!(p.hp, 10);
        assert!(!p.operator);
        assert_eq!(p.follower.owner_id, p.id);
        assert!(p.inventory.count_of(ItemKind::HandAxe) == 1);
    }

    #[test]
    fn test_bank_universal_stacking() {
        let mut p = PlayerState::new("Tess", false, &table());
        p.bank_deposit(ItemStack::new(ItemKind::Logs, 3));
        let total = p.bank.iter().filter(|s| s.kind == ItemKind::Logs).count();
        assert_eq!(total, 1, "bank merges same-kind stacks");
        assert_eq!(p.bank.iter().find(|s| s.kind == ItemKind::Logs).unwrap().count, 53);
    }

    #[test]
    fn test_bank_withdraw_clamps() {
        let mut p = PlayerState::new("Tess", false, &table());
        let taken = p.bank_withdraw(ItemKind::CookedMeat, 999);
        assert_eq!(taken, 20);
        assert_eq!(p.bank_withdraw(ItemKind::CookedMeat, 1), 0);
    }
}
