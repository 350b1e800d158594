//! # Items, Inventories and Equipment
//!
//! The item catalogue is a closed enum; behavior hangs off per-kind flags
//! rather than string tags. Inventories are bounded at [`INVENTORY_CAP`]
//! slots and support transactional snapshot/restore so multi-step
//! operations (crafting) can commit all-or-nothing.

use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Hard slot cap for player and follower inventories.
///
/// Once an inventory reaches the cap, game logic must force a banking
/// transition before further gathering.
pub const INVENTORY_CAP: usize = 28;

/// Flags describing item behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ItemFlags(u32);

impl ItemFlags {
    /// No flags set.
    pub const NONE: Self = Self(0);
    /// Restores health when eaten.
    pub const FOOD: Self = Self(1 << 0);
    /// Grants PRAYER experience when buried.
    pub const PRAYER: Self = Self(1 << 1);
    /// Multiple copies merge into one slot.
    pub const STACKABLE: Self = Self(1 << 2);
    /// Chops trees.
    pub const TOOL_AXE: Self = Self(1 << 3);
    /// Mines rocks.
    pub const TOOL_PICK: Self = Self(1 << 4);
    /// Nets fishing spots.
    pub const TOOL_NET: Self = Self(1 << 5);
    /// Melee weapon.
    pub const WEAPON: Self = Self(1 << 6);
    /// Raw gathered material.
    pub const RESOURCE: Self = Self(1 << 7);
    /// Currency.
    pub const COIN: Self = Self(1 << 8);
    /// Wearable armor.
    pub const ARMOR: Self = Self(1 << 9);

    /// Checks whether any bit of `flag` is set.
    #[inline]
    #[must_use]
    pub const fn has(self, flag: Self) -> bool {
        (self.0 & flag.0) != 0
    }

    /// Combines two flag sets.
    #[inline]
    #[must_use]
    pub const fn with(self, flag: Self) -> Self {
        Self(self.0 | flag.0)
    }

    /// True when the item is a gathering tool or a weapon.
    ///
    /// Banking keeps these back so the entity can resume work afterwards.
    #[inline]
    #[must_use]
    pub const fn is_kit(self) -> bool {
        self.has(Self::TOOL_AXE)
            || self.has(Self::TOOL_PICK)
            || self.has(Self::TOOL_NET)
            || self.has(Self::WEAPON)
    }
}

/// Equipment slots on a player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EquipSlot {
    /// Wielded weapon or tool.
    MainHand,
    /// Shield hand.
    OffHand,
    /// Headgear.
    Head,
    /// Torso armor.
    Body,
    /// Leg armor.
    Legs,
}

/// Every item the simulation knows about.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemKind {
    /// Plain logs from a common tree.
    Logs,
    /// Sturdier oak logs.
    OakLogs,
    /// Copper ore.
    CopperOre,
    /// Tin ore.
    TinOre,
    /// Iron ore.
    IronOre,
    /// Sparking stone, stackable.
    Flint,
    /// A dry twig.
    Twig,
    /// Freshly netted shrimp.
    RawShrimp,
    /// Cooked shrimp, edible.
    CookedShrimp,
    /// Raw meat.
    RawMeat,
    /// Cooked meat, edible.
    CookedMeat,
    /// Ruined food.
    BurntFood,
    /// Remains for burial.
    Bones,
    /// Currency, stackable.
    Coins,
    /// A smelted bronze bar.
    BronzeBar,
    /// A basic chopping axe.
    HandAxe,
    /// A basic mining pick.
    Pickaxe,
    /// A small fishing net.
    FishingNet,
    /// A sharpened bone spear.
    BoneSpear,
    /// A forged bronze sword.
    BronzeSword,
    /// A plain wooden shield.
    WoodenShield,
    /// A stitched leather cap.
    LeatherCap,
    /// A stitched leather body.
    LeatherBody,
}

impl ItemKind {
    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Logs => "Logs",
            Self::OakLogs => "Oak Logs",
            Self::CopperOre => "Copper Ore",
            Self::TinOre => "Tin Ore",
            Self::IronOre => "Iron Ore",
            Self::Flint => "Flint",
            Self::Twig => "Twig",
            Self::RawShrimp => "Raw Shrimp",
            Self::CookedShrimp => "Cooked Shrimp",
            Self::RawMeat => "Raw Meat",
            Self::CookedMeat => "Cooked Meat",
            Self::BurntFood => "Burnt Food",
            Self::Bones => "Bones",
            Self::Coins => "Coins",
            Self::BronzeBar => "Bronze Bar",
            Self::HandAxe => "Hand Axe",
            Self::Pickaxe => "Pickaxe",
            Self::FishingNet => "Fishing Net",
            Self::BoneSpear => "Bone Spear",
            Self::BronzeSword => "Bronze Sword",
            Self::WoodenShield => "Wooden Shield",
            Self::LeatherCap => "Leather Cap",
            Self::LeatherBody => "Leather Body",
        }
    }

    /// Behavior flags.
    #[must_use]
    pub const fn flags(self) -> ItemFlags {
        match self {
            Self::Logs | Self::OakLogs | Self::TinOre | Self::IronOre | Self::CopperOre | Self::RawShrimp | Self::RawMeat | Self::BronzeBar | Self::Twig => ItemFlags::RESOURCE,
            Self::Flint => ItemFlags::RESOURCE.with(ItemFlags::STACKABLE),
            Self::CookedShrimp | Self::CookedMeat => ItemFlags::FOOD,
            Self::BurntFood => ItemFlags::NONE,
            Self::Bones => ItemFlags::PRAYER,
            Self::Coins => ItemFlags::COIN.with(ItemFlags::STACKABLE),
            Self::HandAxe => ItemFlags::TOOL_AXE,
            Self::Pickaxe => ItemFlags::TOOL_PICK,
            Self::FishingNet => ItemFlags::TOOL_NET,
            Self::BoneSpear | Self::BronzeSword => ItemFlags::WEAPON,
            Self::WoodenShield | Self::LeatherCap | Self::LeatherBody => ItemFlags::ARMOR,
        }
    }

    /// Base value in coins, used for shop pricing.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Twig | Self::BurntFood => 1,
            Self::Logs | Self::Flint | Self::RawShrimp | Self::RawMeat | Self::Bones => 2,
            Self::CookedShrimp | Self::CookedMeat | Self::CopperOre | Self::TinOre => 5,
            Self::OakLogs | Self::IronOre => 10,
            Self::BronzeBar | Self::WoodenShield => 15,
            Self::HandAxe | Self::Pickaxe | Self::FishingNet | Self::BoneSpear => 20,
            Self::LeatherCap => 25,
            Self::LeatherBody => 40,
            Self::BronzeSword => 60,
            Self::Coins => 1,
        }
    }

    /// The slot this item occupies when equipped, if any.
    #[must_use]
    pub const fn slot(self) -> Option<EquipSlot> {
        match self {
            Self::HandAxe | Self::Pickaxe | Self::BoneSpear | Self::BronzeSword => Some(EquipSlot::MainHand),
            Self::WoodenShield => Some(EquipSlot::OffHand),
            Self::LeatherCap => Some(EquipSlot::Head),
            Self::LeatherBody => Some(EquipSlot::Body),
            _ => None,
        }
    }
}

/// A stack of identical items.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStack {
    /// The item kind.
    pub kind: ItemKind,
    /// Number of items in this stack.
    pub count: u32,
}

impl ItemStack {
    /// Creates a stack.
    #[inline]
    #[must_use]
    pub const fn new(kind: ItemKind, count: u32) -> Self {
        Self { kind, count }
    }
}

/// A bounded inventory of item stacks.
///
/// Non-stackable items occupy one slot per acquisition. The slot cap is
/// [`INVENTORY_CAP`]; overflow is reported as [`CoreError::InventoryFull`]
/// and leaves the inventory untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Inventory {
    slots: Vec<ItemStack>,
}

impl Inventory {
    /// Creates an empty inventory.
    #[must_use]
    pub const fn new() -> Self {
        Self { slots: Vec::new() }
    }

    /// Number of occupied slots.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when no slots are occupied.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// True when the slot cap is reached.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.slots.len() >= INVENTORY_CAP
    }

    /// Iterates over occupied slots.
    pub fn iter(&self) -> impl Iterator<Item = &ItemStack> {
        self.slots.iter()
    }

    /// Total count of a kind across all slots.
    #[must_use]
    pub fn count_of(&self, kind: ItemKind) -> u32 {
        self.slots.iter().filter(|s| s.kind == kind).map(|s| s.count).sum()
    }

    /// True when any slot carries an item whose flags match `flag`.
    #[must_use]
    pub fn has_flag(&self, flag: ItemFlags) -> bool {
        self.slots.iter().any(|s| s.kind.flags().has(flag))
    }

    /// First item kind whose flags match `flag`.
    #[must_use]
    pub fn find_flag(&self, flag: ItemFlags) -> Option<ItemKind> {
        self.slots.iter().find(|s| s.kind.flags().has(flag)).map(|s| s.kind)
    }

    /// First slot holding anything that is not tool-or-weapon kit.
    ///
    /// Banking deposits run off this: everything goes except the kit the
    /// entity needs to keep working.
    #[must_use]
    pub fn find_non_kit(&self) -> Option<ItemKind> {
        self.slots.iter().find(|s| !s.kind.flags().is_kit()).map(|s| s.kind)
    }

    /// Adds a stack, merging into an existing slot for stackables.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InventoryFull`] when a new slot would exceed the
    /// cap; the inventory is left unchanged.
    pub fn add(&mut self, stack: ItemStack) -> CoreResult<()> {
        if stack.kind.flags().has(ItemFlags::STACKABLE) {
            if let Some(slot) = self.slots.iter_mut().find(|s| s.kind == stack.kind) {
                slot.count += stack.count;
                return Ok(());
            }
        }
        if self.is_full() {
            return Err(CoreError::InventoryFull { capacity: INVENTORY_CAP });
        }
        self.slots.push(stack);
        Ok(())
    }

    /// Removes `count` items of `kind` across slots.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InsufficientItems`] when fewer than `count` are
    /// held; nothing is removed in that case.
    pub fn remove(&mut self, kind: ItemKind, count: u32) -> CoreResult<()> {
        let available = self.count_of(kind);
        if available < count {
            return Err(CoreError::InsufficientItems { kind, required: count, available });
        }
        let mut remaining = count;
        self.slots.retain_mut(|slot| {
            if remaining == 0 || slot.kind != kind {
                return true;
            }
            let take = slot.count.min(remaining);
            slot.count -= take;
            remaining -= take;
            slot.count > 0
        });
        Ok(())
    }

    /// Removes one item matching `flag` and returns its kind.
    #[must_use]
    pub fn take_one_flagged(&mut self, flag: ItemFlags) -> Option<ItemKind> {
        let kind = self.find_flag(flag)?;
        self.remove(kind, 1).ok()?;
        Some(kind)
    }

    /// Creates a snapshot for transactional rollback.
    #[must_use]
    pub fn snapshot(&self) -> InventorySnapshot {
        InventorySnapshot { slots: self.slots.clone() }
    }

    /// Restores a previously taken snapshot.
    pub fn restore(&mut self, snapshot: &InventorySnapshot) {
        self.slots = snapshot.slots.clone();
    }
}

/// Saved inventory state for rollback.
#[derive(Clone, Debug)]
pub struct InventorySnapshot {
    slots: Vec<ItemStack>,
}

/// Named equipment slots.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Equipment {
    /// Wielded weapon or tool.
    pub main_hand: Option<ItemStack>,
    /// Shield hand.
    pub off_hand: Option<ItemStack>,
    /// Headgear.
    pub head: Option<ItemStack>,
    /// Torso armor.
    pub body: Option<ItemStack>,
    /// Leg armor.
    pub legs: Option<ItemStack>,
}

impl Equipment {
    /// Borrows the stack in a slot.
    #[must_use]
    pub fn get(&self, slot: EquipSlot) -> Option<&ItemStack> {
        match slot {
            EquipSlot::MainHand => self.main_hand.as_ref(),
            EquipSlot::OffHand => self.off_hand.as_ref(),
            EquipSlot::Head => self.head.as_ref(),
            EquipSlot::Body => self.body.as_ref(),
            EquipSlot::Legs => self.legs.as_ref(),
        }
    }

    /// Swaps the stack in a slot, returning the previous occupant.
    pub fn swap(&mut self, slot: EquipSlot, stack: Option<ItemStack>) -> Option<ItemStack> {
        let target = match slot {
            EquipSlot::MainHand => &mut self.main_hand,
            EquipSlot::OffHand => &mut self.off_hand,
            EquipSlot::Head => &mut self.head,
            EquipSlot::Body => &mut self.body,
            EquipSlot::Legs => &mut self.legs,
        };
        std::mem::replace(target, stack)
    }

    /// True when any equipped item matches `flag`.
    #[must_use]
    pub fn has_flag(&self, flag: ItemFlags) -> bool {
        [&self.main_hand, &self.off_hand, &self.head, &self.body, &self.legs]
            .into_iter()
            .flatten()
            .any(|s| s.kind.flags().has(flag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_count() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        assert_eq!(inv.count_of(ItemKind::Logs), 2);
        assert_eq!(inv.len(), 2); // logs do not stack
    }

    #[test]
    fn test_stackables_merge() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::Coins, 10)).unwrap();
        inv.add(ItemStack::new(ItemKind::Coins, 5)).unwrap();
        assert_eq!(inv.count_of(ItemKind::Coins), 15);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_cap_enforced() {
        let mut inv = Inventory::new();
        for _ in 0..INVENTORY_CAP {
            inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        }
        assert!(inv.is_full());
        let err = inv.add(ItemStack::new(ItemKind::Twig, 1)).unwrap_err();
        assert_eq!(err, CoreError::InventoryFull { capacity: INVENTORY_CAP });
        assert_eq!(inv.len(), INVENTORY_CAP);
    }

    #[test]
    fn test_stackable_merges_past_cap() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::Coins, 1)).unwrap();
        for _ in 0..INVENTORY_CAP - 1 {
            inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        }
        assert!(inv.is_full());
        // Coins merge into the existing slot even at the cap.
        inv.add(ItemStack::new(ItemKind::Coins, 9)).unwrap();
        assert_eq!(inv.count_of(ItemKind::Coins), 10);
    }

    #[test]
    fn test_remove_insufficient_leaves_state() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        let err = inv.remove(ItemKind::Logs, 2).unwrap_err();
        assert!(matches!(err, CoreError::InsufficientItems { .. }));
        assert_eq!(inv.count_of(ItemKind::Logs), 1);
    }

    #[test]
    fn test_remove_spans_slots() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        inv.remove(ItemKind::Logs, 2).unwrap();
        assert_eq!(inv.count_of(ItemKind::Logs), 1);
        assert_eq!(inv.len(), 1);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::CopperOre, 1)).unwrap();
        let snap = inv.snapshot();
        inv.add(ItemStack::new(ItemKind::TinOre, 1)).unwrap();
        inv.remove(ItemKind::CopperOre, 1).unwrap();
        inv.restore(&snap);
        assert_eq!(inv.count_of(ItemKind::CopperOre), 1);
        assert_eq!(inv.count_of(ItemKind::TinOre), 0);
    }

    #[test]
    fn test_kit_is_kept_back() {
        let mut inv = Inventory::new();
        inv.add(ItemStack::new(ItemKind::HandAxe, 1)).unwrap();
        inv.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        assert_eq!(inv.find_non_kit(), Some(ItemKind::Logs));
        inv.remove(ItemKind::Logs, 1).unwrap();
        assert_eq!(inv.find_non_kit(), None);
    }

    #[test]
    fn test_equipment_swap() {
        let mut eq = Equipment::default();
        let old = eq.swap(EquipSlot::MainHand, Some(ItemStack::new(ItemKind::HandAxe, 1)));
        assert!(old.is_none());
        let old = eq.swap(EquipSlot::MainHand, Some(ItemStack::new(ItemKind::BronzeSword, 1)));
        assert_eq!(old.unwrap().kind, ItemKind::HandAxe);
        assert!(eq.has_flag(ItemFlags::WEAPON));
        assert!(!eq.has_flag(ItemFlags::TOOL_AXE));
    }
}
