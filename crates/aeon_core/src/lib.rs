//! # AEON Core - The Simulation Model
//!
//! In-memory state for one shard of the persistent world, plus the pure
//! rules that govern it: items, inventories, skills, XP thresholds, eras,
//! resources, NPCs and ground items.
//!
//! ## Design
//!
//! - **No I/O.** This crate never touches the disk, the network or the
//!   clock. World time is a tick number owned by the caller.
//! - **Single writer.** Only the action router (in `aeon_engine`) mutates
//!   these types. Everything here is plain data plus invariant-preserving
//!   methods.
//! - **Rejections are data.** Fallible inventory operations return a
//!   [`CoreError`] that callers translate into tagged responses; nothing in
//!   this crate panics on bad player input.

#![deny(unsafe_code)]

pub mod item;
pub mod level;
pub mod player;
pub mod position;
pub mod scene;
pub mod skill;
pub mod world;

pub use item::{Equipment, EquipSlot, Inventory, InventorySnapshot, ItemFlags, ItemKind, ItemStack, INVENTORY_CAP};
pub use level::{XpTable, MAX_LEVEL};
pub use player::{companion_name, AgentMemory, Follower, FollowerCommand, PlayerState, QuestState};
pub use position::Position;
pub use scene::SceneKind;
pub use skill::{era_min_level, era_name, Skill, SkillMap, SkillName, ERA_COUNT};
pub use world::{Biome, GroundItem, Npc, NpcRole, ResourceEntity, ResourceKind, TravelMarker, WorldState};

use thiserror::Error;

/// Errors produced by core state operations.
///
/// These model *expected* gameplay rejections. The action router converts
/// them into tagged `Fail` responses; they are never allowed to escape as
/// panics or transport errors.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// Inventory is at its slot cap and cannot take another stack.
    #[error("inventory full: capacity {capacity}")]
    InventoryFull {
        /// The slot cap that was hit.
        capacity: usize,
    },

    /// Not enough of an item to satisfy a removal or recipe input.
    #[error("insufficient items: need {required} of {kind:?}, have {available}")]
    InsufficientItems {
        /// The item that was missing.
        kind: ItemKind,
        /// The amount required.
        required: u32,
        /// The amount available.
        available: u32,
    },

    /// The named slot holds nothing to unequip.
    #[error("nothing equipped in slot {0:?}")]
    EmptySlot(EquipSlot),

    /// The item cannot be worn or wielded.
    #[error("item {0:?} is not equippable")]
    NotEquippable(ItemKind),
}

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;
