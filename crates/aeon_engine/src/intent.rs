//! # Intents
//!
//! Named, validated requests the router applies atomically. Client frames
//! and the decision engine both produce these; there is no second write
//! path. A few variants are simulation-only: the wire parser never emits
//! them, only the decision engine does.

use aeon_core::{EquipSlot, FollowerCommand, ItemKind, SkillName};

/// Which entity of a squad an intent acts as.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActorRef {
    /// The player itself.
    Owner,
    /// The player's follower.
    Follower,
}

/// Bank sub-operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BankOp {
    /// Move items from the acting inventory into the owner's bank.
    Deposit {
        /// Item to deposit.
        item: ItemKind,
        /// How many to deposit; clamps to the held count.
        amount: u32,
    },
    /// Move items from the bank into the owner's inventory.
    Withdraw {
        /// Item to withdraw.
        item: ItemKind,
        /// How many to withdraw; clamps to the banked count and free room.
        amount: u32,
    },
}

/// Privileged operator actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AdminOp {
    /// Restore full health.
    Heal,
    /// Grant a large EVOLUTION XP credit.
    ForceEvolve,
    /// Max every skill and era.
    MaxOut,
    /// Reset skills and era to a fresh account.
    Reset,
}

/// Every request the router understands.
#[derive(Clone, Debug, PartialEq)]
pub enum Intent {
    /// Set position unconditionally (authoritative trust model).
    Move {
        /// Target x.
        x: f32,
        /// Target z.
        z: f32,
    },
    /// Harvest a resource, open a station, or enter a portal.
    Gather {
        /// Resource id.
        target: String,
    },
    /// Strike a live enemy.
    Attack {
        /// NPC id.
        target: String,
    },
    /// Claim a ground item.
    Pickup {
        /// Ground item id.
        target: String,
    },
    /// Craft a recipe, all-or-nothing.
    Craft {
        /// Recipe id.
        recipe: String,
    },
    /// Wear or wield an inventory item.
    Equip {
        /// The item to equip.
        item: ItemKind,
    },
    /// Remove an equipped item back into the inventory.
    Unequip {
        /// The slot to clear.
        slot: EquipSlot,
    },
    /// Consume a food item for health.
    Eat {
        /// A specific food, or the first edible item when `None`.
        item: Option<ItemKind>,
    },
    /// Consume a prayer item for a fixed XP credit.
    Bury,
    /// Bank deposit or withdrawal.
    Bank(BankOp),
    /// Buy from a merchant.
    ShopBuy {
        /// Merchant NPC id.
        npc: String,
        /// Item to buy.
        item: ItemKind,
        /// Quantity; clamps to stock.
        qty: u32,
    },
    /// Sell to a merchant.
    ShopSell {
        /// Merchant NPC id.
        npc: String,
        /// Item to sell.
        item: ItemKind,
        /// Quantity; clamps to held count.
        qty: u32,
    },
    /// Travel to a world-map marker, replacing the world.
    Travel {
        /// Marker id.
        marker: String,
    },
    /// Advance one era if the progression skill already qualifies.
    Evolve,
    /// Command the follower.
    Command {
        /// The new command.
        command: FollowerCommand,
        /// Optional skill focus carried with a gather command.
        skill: Option<SkillName>,
    },
    /// Run the decision engine for this squad and return a snapshot.
    Tick,
    /// Privileged operator action.
    Admin(AdminOp),

    // ------------------------------------------------------------------
    // Simulation-only intents. The wire parser never produces these; the
    // decision engine uses them to keep world mutation inside the router.
    // ------------------------------------------------------------------
    /// Spawn a bank booth near the actor when the scene has none.
    EnsureBank,
    /// Spawn a level-appropriate enemy when the scene has none.
    SpawnPrey,
    /// Opportunistically acquire a missing gathering tool.
    AcquireTool {
        /// The tool to add.
        kind: ItemKind,
    },
}
