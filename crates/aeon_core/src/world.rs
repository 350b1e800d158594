//! # World Model
//!
//! Mutable state for one shard: resources with time-driven respawn, NPCs,
//! ephemeral ground items and travel markers. The action router is the only
//! writer; the decision engine reads.
//!
//! ## Respawn
//!
//! A harvested resource flips `active = false` and records a `ready_at`
//! tick. The tick callback calls [`WorldState::respawn_due`]; nothing else
//! reactivates resources, so respawn is deterministic for tests and leaks
//! no timers across shard teardown.

use serde::{Deserialize, Serialize};

use crate::item::{ItemFlags, ItemKind, ItemStack};
use crate::position::Position;
use crate::scene::SceneKind;
use crate::skill::SkillName;

/// Biomes a scene can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Biome {
    /// Dense green lowland.
    Jungle,
    /// Arid dunes.
    Desert,
    /// Mild hills and fields.
    Temperate,
}

/// Every interactable world object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceKind {
    /// Common tree.
    Tree,
    /// Oak tree, higher tier.
    OakTree,
    /// Copper rock.
    CopperRock,
    /// Tin rock.
    TinRock,
    /// Iron rock, higher tier.
    IronRock,
    /// Net fishing spot.
    FishingSpot,
    /// Bank access point.
    BankBooth,
    /// Scene gateway.
    Portal,
    /// Smelting station.
    Furnace,
    /// General crafting station.
    CraftingBench,
}

impl ResourceKind {
    /// The skill trained by harvesting this resource, if gatherable.
    #[must_use]
    pub const fn skill(self) -> Option<SkillName> {
        match self {
            Self::Tree | Self::OakTree => Some(SkillName::Woodcutting),
            Self::CopperRock | Self::TinRock | Self::IronRock => Some(SkillName::Mining),
            Self::FishingSpot => Some(SkillName::Fishing),
            _ => None,
        }
    }

    /// The item a successful harvest yields.
    #[must_use]
    pub const fn reward(self) -> Option<ItemKind> {
        match self {
            Self::Tree => Some(ItemKind::Logs),
            Self::OakTree => Some(ItemKind::OakLogs),
            Self::CopperRock => Some(ItemKind::CopperOre),
            Self::TinRock => Some(ItemKind::TinOre),
            Self::IronRock => Some(ItemKind::IronOre),
            Self::FishingSpot => Some(ItemKind::RawShrimp),
            _ => None,
        }
    }

    /// XP granted per harvest.
    #[must_use]
    pub const fn xp_reward(self) -> f64 {
        match self {
            Self::Tree => 25.0,
            Self::OakTree => 37.5,
            Self::CopperRock | Self::TinRock => 17.5,
            Self::IronRock => 35.0,
            Self::FishingSpot => 10.0,
            _ => 0.0,
        }
    }

    /// Skill level required to harvest.
    #[must_use]
    pub const fn level_req(self) -> u8 {
        match self {
            Self::OakTree | Self::IronRock => 15,
            _ => 1,
        }
    }

    /// The tool flag a harvester must carry or wear.
    #[must_use]
    pub const fn tool_flag(self) -> Option<ItemFlags> {
        match self {
            Self::Tree | Self::OakTree => Some(ItemFlags::TOOL_AXE),
            Self::CopperRock | Self::TinRock | Self::IronRock => Some(ItemFlags::TOOL_PICK),
            Self::FishingSpot => Some(ItemFlags::TOOL_NET),
            _ => None,
        }
    }

    /// The tool item handed out by opportunistic acquisition.
    #[must_use]
    pub const fn tool_item(self) -> Option<ItemKind> {
        match self {
            Self::Tree | Self::OakTree => Some(ItemKind::HandAxe),
            Self::CopperRock | Self::TinRock | Self::IronRock => Some(ItemKind::Pickaxe),
            Self::FishingSpot => Some(ItemKind::FishingNet),
            _ => None,
        }
    }

    /// True for crafting stations.
    #[must_use]
    pub const fn is_station(self) -> bool {
        matches!(self, Self::Furnace | Self::CraftingBench)
    }

    /// True when harvesting makes sense at all.
    #[must_use]
    pub const fn gatherable(self) -> bool {
        self.skill().is_some()
    }
}

/// One interactable object in the world.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResourceEntity {
    /// Unique id within the scene.
    pub id: String,
    /// What this object is.
    pub kind: ResourceKind,
    /// Content tier, scene-dependent.
    pub tier: u8,
    /// Position in the scene.
    pub position: Position,
    /// Whether the resource can currently be harvested.
    pub active: bool,
    /// Tick at which an inactive resource reactivates.
    #[serde(default)]
    pub ready_at: u64,
    /// Scene a portal leads to.
    #[serde(default)]
    pub portal_to: Option<SceneKind>,
    /// Era required to use a portal.
    #[serde(default)]
    pub era_required: u8,
}

impl ResourceEntity {
    /// Creates an active resource.
    #[must_use]
    pub fn new(id: impl Into<String>, kind: ResourceKind, tier: u8, position: Position) -> Self {
        Self {
            id: id.into(),
            kind,
            tier,
            position,
            active: true,
            ready_at: 0,
            portal_to: None,
            era_required: 0,
        }
    }
}

/// Roles an NPC can hold.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NpcRole {
    /// Attackable hostile.
    Enemy,
    /// Friendly advisor.
    Guide,
    /// Runs a shop.
    Merchant,
    /// Mirror of an always-on simulated player.
    Bot,
}

/// A non-player character.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Npc {
    /// Unique id within the scene.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: NpcRole,
    /// Current health; zero for roles without a health pool.
    pub hp: u32,
    /// Health pool.
    pub max_hp: u32,
    /// Combat strength, scales incoming XP and spawned prey.
    pub combat_level: u8,
    /// Position in the scene.
    pub position: Position,
    /// Shop stock for merchants.
    #[serde(default)]
    pub stock: Vec<ItemStack>,
}

impl Npc {
    /// True while the NPC can be attacked.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.role == NpcRole::Enemy && self.hp > 0
    }
}

/// An item lying on the ground.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GroundItem {
    /// Unique id within the scene.
    pub id: String,
    /// The item stack on the ground.
    pub item: ItemStack,
    /// Where it lies.
    pub position: Position,
    /// Tick at which it vanishes.
    pub despawn_at: u64,
}

/// A travel destination on the world map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TravelMarker {
    /// Unique id.
    pub id: String,
    /// Display label.
    pub label: String,
    /// Scene the marker leads to.
    pub scene: SceneKind,
    /// Minimum era to travel here.
    pub era_required: u8,
    /// Arrival position.
    pub position: Position,
}

/// All mutable state for one scene of one shard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct WorldState {
    /// Generation seed.
    pub seed: u64,
    /// The scene this world renders.
    pub scene: SceneKind,
    /// Scene biome.
    pub biome: Biome,
    /// Hour of day, 0..24, advanced by the tick.
    pub time_of_day: u8,
    /// Interactable objects.
    pub resources: Vec<ResourceEntity>,
    /// NPCs.
    pub npcs: Vec<Npc>,
    /// Ephemeral ground items.
    pub ground_items: Vec<GroundItem>,
    /// Travel destinations reachable from here.
    pub markers: Vec<TravelMarker>,
    /// Counter for generated entity ids.
    #[serde(default)]
    pub next_spawn: u64,
}

impl WorldState {
    /// Borrows a resource by id.
    #[must_use]
    pub fn resource(&self, id: &str) -> Option<&ResourceEntity> {
        self.resources.iter().find(|r| r.id == id)
    }

    /// Mutably borrows a resource by id.
    pub fn resource_mut(&mut self, id: &str) -> Option<&mut ResourceEntity> {
        self.resources.iter_mut().find(|r| r.id == id)
    }

    /// Borrows an NPC by id.
    #[must_use]
    pub fn npc(&self, id: &str) -> Option<&Npc> {
        self.npcs.iter().find(|n| n.id == id)
    }

    /// Mutably borrows an NPC by id.
    pub fn npc_mut(&mut self, id: &str) -> Option<&mut Npc> {
        self.npcs.iter_mut().find(|n| n.id == id)
    }

    /// Removes an NPC by id.
    pub fn remove_npc(&mut self, id: &str) -> Option<Npc> {
        let idx = self.npcs.iter().position(|n| n.id == id)?;
        Some(self.npcs.remove(idx))
    }

    /// Borrows a travel marker by id.
    #[must_use]
    pub fn marker(&self, id: &str) -> Option<&TravelMarker> {
        self.markers.iter().find(|m| m.id == id)
    }

    /// Drops an item on the ground, returning its generated id.
    pub fn drop_item(&mut self, item: ItemStack, position: Position, despawn_at: u64) -> String {
        self.next_spawn += 1;
        let id = format!("drop-{}", self.next_spawn);
        self.ground_items.push(GroundItem { id: id.clone(), item, position, despawn_at });
        id
    }

    /// Removes a ground item by id.
    pub fn take_ground_item(&mut self, id: &str) -> Option<GroundItem> {
        let idx = self.ground_items.iter().position(|g| g.id == id)?;
        Some(self.ground_items.remove(idx))
    }

    /// Reactivates every resource whose cooldown has elapsed.
    ///
    /// Returns how many came back. Called from the tick only.
    pub fn respawn_due(&mut self, now: u64) -> usize {
        let mut count = 0;
        for resource in &mut self.resources {
            if !resource.active && now >= resource.ready_at {
                resource.active = true;
                count += 1;
            }
        }
        count
    }

    /// Removes ground items whose despawn tick has passed.
    pub fn expire_ground_items(&mut self, now: u64) {
        self.ground_items.retain(|g| g.despawn_at > now);
    }

    /// Nearest active resource satisfying `pred`, by Euclidean distance.
    #[must_use]
    pub fn nearest_resource<F>(&self, from: Position, pred: F) -> Option<&ResourceEntity>
    where
        F: Fn(&ResourceEntity) -> bool,
    {
        self.resources
            .iter()
            .filter(|r| r.active && pred(r))
            .min_by(|a, b| {
                from.distance(a.position).partial_cmp(&from.distance(b.position)).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Nearest live enemy, by Euclidean distance.
    #[must_use]
    pub fn nearest_enemy(&self, from: Position) -> Option<&Npc> {
        self.npcs
            .iter()
            .filter(|n| n.is_alive())
            .min_by(|a, b| {
                from.distance(a.position).partial_cmp(&from.distance(b.position)).unwrap_or(std::cmp::Ordering::Equal)
            })
    }

    /// Nearest ground item within `radius`.
    #[must_use]
    pub fn nearest_ground_item(&self, from: Position, radius: f32) -> Option<&GroundItem> {
        self.ground_items
            .iter()
            .filter(|g| from.distance(g.position) < radius)
            .min_by(|a, b| {
                from.distance(a.position).partial_cmp(&from.distance(b.position)).unwrap_or(std::cmp::Ordering::Equal)
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SceneKind;

    fn bare_world() -> WorldState {
        WorldState {
            seed: 7,
            scene: SceneKind::Greenvale,
            biome: Biome::Jungle,
            time_of_day: 12,
            resources: Vec::new(),
            npcs: Vec::new(),
            ground_items: Vec::new(),
            markers: Vec::new(),
            next_spawn: 0,
        }
    }

    #[test]
    fn test_respawn_is_time_driven() {
        let mut world = bare_world();
        let mut tree = ResourceEntity::new("tree-1", ResourceKind::Tree, 0, Position::default());
        tree.active = false;
        tree.ready_at = 50;
        world.resources.push(tree);

        assert_eq!(world.respawn_due(49), 0);
        assert!(!world.resource("tree-1").unwrap().active);
        assert_eq!(world.respawn_due(50), 1);
        assert!(world.resource("tree-1").unwrap().active);
    }

    #[test]
    fn test_ground_item_expiry() {
        let mut world = bare_world();
        world.drop_item(ItemStack::new(ItemKind::Bones, 1), Position::default(), 100);
        world.expire_ground_items(99);
        assert_eq!(world.ground_items.len(), 1);
        world.expire_ground_items(100);
        assert!(world.ground_items.is_empty());
    }

    #[test]
    fn test_nearest_resource_picks_closest() {
        let mut world = bare_world();
        world.resources.push(ResourceEntity::new("far", ResourceKind::Tree, 0, Position::new(10.0, 0.0)));
        world.resources.push(ResourceEntity::new("near", ResourceKind::Tree, 0, Position::new(2.0, 0.0)));
        let found = world.nearest_resource(Position::default(), |r| r.kind == ResourceKind::Tree).unwrap();
        assert_eq!(found.id, "near");
    }

    #[test]
    fn test_inactive_resources_invisible_to_search() {
        let mut world = bare_world();
        let mut tree = ResourceEntity::new("tree-1", ResourceKind::Tree, 0, Position::new(1.0, 0.0));
        tree.active = false;
        world.resources.push(tree);
        assert!(world.nearest_resource(Position::default(), |r| r.kind == ResourceKind::Tree).is_none());
    }

    #[test]
    fn test_drop_ids_unique() {
        let mut world = bare_world();
        let a = world.drop_item(ItemStack::new(ItemKind::Bones, 1), Position::default(), 10);
        let b = world.drop_item(ItemStack::new(ItemKind::Bones, 1), Position::default(), 10);
        assert_ne!(a, b);
    }
}
