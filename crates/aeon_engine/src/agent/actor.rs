//! # Actor Views
//!
//! A squad holds two kinds of actor. Rather than branching on a union
//! type, the ladder sees one small interface: where the actor stands,
//! which health pool it guards, which inventory feeds survival checks,
//! and which inventory it carries goods in. A follower guards its owner's
//! health and eats from the owner's pack, but carries loot in its own.

use aeon_core::{Inventory, ItemFlags, PlayerState, Position};

/// What the decision ladder needs to know about an entity.
pub trait Actor {
    /// Current position.
    fn position(&self) -> Position;
    /// Health pool: (current, max).
    fn hp(&self) -> (u32, u32);
    /// Inventory feeding survival and passive-credit checks.
    fn pantry(&self) -> &Inventory;
    /// Inventory the actor fills while working.
    fn carry(&self) -> &Inventory;
    /// Whether the actor has working kit matching `flag` to hand.
    fn has_kit(&self, flag: ItemFlags) -> bool;
    /// Whether this actor is the follower of its squad.
    fn is_follower(&self) -> bool;
}

/// The player itself.
pub struct OwnerActor<'a> {
    player: &'a PlayerState,
}

impl<'a> OwnerActor<'a> {
    /// Views a player as an actor.
    #[must_use]
    pub fn new(player: &'a PlayerState) -> Self {
        Self { player }
    }
}

impl Actor for OwnerActor<'_> {
    fn position(&self) -> Position {
        self.player.position
    }

    fn hp(&self) -> (u32, u32) {
        (self.player.hp, self.player.max_hp)
    }

    fn pantry(&self) -> &Inventory {
        &self.player.inventory
    }

    fn carry(&self) -> &Inventory {
        &self.player.inventory
    }

    /// Owners may carry tools or wield them.
    fn has_kit(&self, flag: ItemFlags) -> bool {
        self.player.inventory.has_flag(flag) || self.player.equipment.has_flag(flag)
    }

    fn is_follower(&self) -> bool {
        false
    }
}

/// The player's companion.
pub struct FollowerActor<'a> {
    player: &'a PlayerState,
}

impl<'a> FollowerActor<'a> {
    /// Views a player's follower as an actor.
    #[must_use]
    pub fn new(player: &'a PlayerState) -> Self {
        Self { player }
    }
}

impl Actor for FollowerActor<'_> {
    fn position(&self) -> Position {
        self.player.follower.position
    }

    /// The follower guards its owner's health pool.
    fn hp(&self) -> (u32, u32) {
        (self.player.hp, self.player.max_hp)
    }

    /// Shared resources: food and prayer items come from the owner.
    fn pantry(&self) -> &Inventory {
        &self.player.inventory
    }

    fn carry(&self) -> &Inventory {
        &self.player.follower.inventory
    }

    /// Followers work out of their own pack only.
    fn has_kit(&self, flag: ItemFlags) -> bool {
        self.player.follower.inventory.has_flag(flag)
    }

    fn is_follower(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeon_core::{ItemKind, ItemStack, XpTable};

    #[test]
    fn test_follower_shares_pantry_not_carry() {
        let mut player = PlayerState::new("Tess", false, &XpTable::default());
        player.follower.inventory.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();

        let follower = FollowerActor::new(&player);
        assert_eq!(follower.pantry().count_of(ItemKind::Logs), 0, "pantry is the owner's");
        assert_eq!(follower.carry().count_of(ItemKind::Logs), 1, "carry is its own");
        assert_eq!(follower.hp(), (player.hp, player.max_hp));
    }

    #[test]
    fn test_owner_views_itself() {
        let player = PlayerState::new("Tess", false, &XpTable::default());
        let owner = OwnerActor::new(&player);
        assert!(!owner.is_follower());
        assert_eq!(owner.position(), player.position);
    }
}
