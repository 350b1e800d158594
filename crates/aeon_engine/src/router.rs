//! # The Action Router
//!
//! One handler per named intent, all funneled through [`Shard::apply`],
//! the single write path for client intents and AI intents alike.
//!
//! ## Contract
//!
//! - Expected rejections come back as `Fail` responses with the state
//!   untouched; handlers never return errors or panic for them.
//! - Multi-step mutations (craft, withdraw) commit all-or-nothing from the
//!   caller's point of view, using inventory snapshots for rollback.

use aeon_core::{
    era_name, ItemFlags, ItemKind, ItemStack, Npc, NpcRole, PlayerState, Position, ResourceEntity, ResourceKind,
    SkillName, INVENTORY_CAP,
};
use rand::Rng;

use crate::intent::{ActorRef, AdminOp, BankOp, Intent};
use crate::progress::{advance_era, award_xp};
use crate::response::{GameResponse, ResponseStatus};
use crate::shard::Shard;

/// Fraction of an item's value paid out when selling to a shop.
const SHOP_SELL_NUMERATOR: u32 = 6;
const SHOP_SELL_DENOMINATOR: u32 = 10;

/// EVOLUTION XP granted by the force-evolve admin action.
const FORCE_EVOLVE_XP: f64 = 5000.0;

/// Agility XP granted per completed travel.
const TRAVEL_XP: f64 = 5.0;

impl Shard {
    /// Validates and applies one intent against the world and the acting
    /// player, returning a tagged response.
    pub fn apply(&mut self, key: &str, actor: ActorRef, intent: Intent) -> GameResponse {
        if !self.players.contains_key(key) {
            return GameResponse::fail("No session.");
        }
        match intent {
            Intent::Move { x, z } => self.handle_move(key, actor, x, z),
            Intent::Gather { target } => self.handle_gather(key, actor, &target),
            Intent::Attack { target } => self.handle_attack(key, &target),
            Intent::Pickup { target } => self.handle_pickup(key, &target),
            Intent::Craft { recipe } => self.handle_craft(key, &recipe),
            Intent::Equip { item } => self.handle_equip(key, item),
            Intent::Unequip { slot } => self.handle_unequip(key, slot),
            Intent::Eat { item } => self.handle_eat(key, item),
            Intent::Bury => self.handle_bury(key),
            Intent::Bank(op) => self.handle_bank(key, actor, op),
            Intent::ShopBuy { npc, item, qty } => self.handle_shop_buy(key, &npc, item, qty),
            Intent::ShopSell { npc, item, qty } => self.handle_shop_sell(key, &npc, item, qty),
            Intent::Travel { marker } => self.handle_travel(key, &marker),
            Intent::Evolve => self.handle_evolve(key),
            Intent::Command { command, skill } => self.handle_command(key, command, skill),
            Intent::Tick => self.handle_tick(key),
            Intent::Admin(op) => self.handle_admin(key, op),
            Intent::EnsureBank => self.handle_ensure_bank(key, actor),
            Intent::SpawnPrey => self.handle_spawn_prey(key, actor),
            Intent::AcquireTool { kind } => self.handle_acquire_tool(key, actor, kind),
        }
    }

    /// Position is set unconditionally: the trust model is authoritative
    /// and intentionally simple, with no collision or speed validation.
    fn handle_move(&mut self, key: &str, actor: ActorRef, x: f32, z: f32) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        match actor {
            ActorRef::Owner => player.position = Position::new(x, z),
            ActorRef::Follower => player.follower.position = Position::new(x, z),
        }
        GameResponse::ok()
    }

    fn handle_gather(&mut self, key: &str, actor: ActorRef, target: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(resource) = self.world.resource(target) else {
            return GameResponse::fail("Nothing to gather.");
        };
        let kind = resource.kind;

        // Stations and access points answer with an interface, not a harvest.
        if kind == ResourceKind::BankBooth {
            return GameResponse::with_status(ResponseStatus::OpenBank, "Bank open.");
        }
        if kind.is_station() {
            let recipes: Vec<_> = self.recipes.iter().filter(|r| r.station == Some(kind)).cloned().collect();
            let mut resp = GameResponse::with_status(ResponseStatus::OpenCrafting, "Opening station...");
            resp.recipes = Some(recipes);
            return resp;
        }
        if kind == ResourceKind::Portal {
            let era_required = resource.era_required;
            let Some(destination) = resource.portal_to else {
                return GameResponse::fail("The portal is dormant.");
            };
            if player.era < era_required {
                return GameResponse::fail(format!("Era {era_required} required."));
            }
            self.world = destination.generate(self.config.world_seed, self.now);
            player.scene = destination;
            player.position = Position::new(0.0, 0.0);
            player.follower.position = Position::new(-2.0, -2.0);
            tracing::info!(player = %player.name, scene = destination.name(), "scene switch");
            let state = player.clone();
            return GameResponse::with_status(ResponseStatus::SceneChange, "Warping...")
                .with_state(&state)
                .with_world(&self.world);
        }

        let (Some(skill), Some(reward)) = (kind.skill(), kind.reward()) else {
            return GameResponse::fail("Nothing interesting happens.");
        };
        if !resource.active {
            return GameResponse::fail("It is depleted.");
        }
        if player.skills.get(skill).level < kind.level_req() {
            return GameResponse::fail(format!("You need level {} {:?}.", kind.level_req(), skill));
        }
        if let Some(tool) = kind.tool_flag() {
            let has_tool = match actor {
                ActorRef::Owner => player.inventory.has_flag(tool) || player.equipment.has_flag(tool),
                ActorRef::Follower => player.follower.inventory.has_flag(tool),
            };
            if !has_tool {
                return GameResponse::fail("You lack the right tool.");
            }
        }

        // Commit: item first (capacity gate), then XP and the cooldown.
        let inventory = match actor {
            ActorRef::Owner => &mut player.inventory,
            ActorRef::Follower => &mut player.follower.inventory,
        };
        if inventory.add(ItemStack::new(reward, 1)).is_err() {
            return GameResponse::fail("Your pack is full.");
        }
        award_xp(
            player,
            skill,
            kind.xp_reward(),
            &self.xp_table,
            self.xp_drops.entry(key.to_string()).or_default(),
        );
        let cooldown = self.config.respawn_cooldown;
        let ready_at = self.now + cooldown;
        if let Some(resource) = self.world.resource_mut(target) {
            resource.active = false;
            resource.ready_at = ready_at;
        }
        let state = player.clone();
        let drops = self.drain_drops(key);
        GameResponse::success(format!("You get some {}.", reward.name().to_lowercase()))
            .with_state(&state)
            .with_drops(drops)
    }

    fn handle_attack(&mut self, key: &str, target: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(npc) = self.world.npc(target) else {
            return GameResponse::fail("Target not found.");
        };
        if !npc.is_alive() {
            return GameResponse::fail("Target is already dead.");
        }

        // Bounded roll scaled by the attacker's melee level. Zero is a miss.
        let max_hit = 1 + u32::from(player.melee_level()) / 4;
        let damage = self.rng.gen_range(0..=max_hit);

        let npc = self.world.npc_mut(target).expect("checked above");
        npc.hp = npc.hp.saturating_sub(damage);
        let dead = npc.hp == 0;
        let npc_name = npc.name.clone();
        let npc_position = npc.position;
        let npc_level = npc.combat_level;

        if damage > 0 {
            let drops = self.xp_drops.entry(key.to_string()).or_default();
            award_xp(player, SkillName::Attack, f64::from(damage) * 4.0, &self.xp_table, drops);
            award_xp(player, SkillName::Hits, f64::from(damage) * 1.33, &self.xp_table, drops);
        }

        if dead {
            self.world.remove_npc(target);
            let despawn_at = self.now + self.config.ground_despawn;
            self.world.drop_item(ItemStack::new(ItemKind::Bones, 1), npc_position, despawn_at);
            let quest_msg = quest_on_kill(player, npc_level).unwrap_or_default();
            tracing::debug!(player = %player.name, npc = %npc_name, "enemy defeated");
            let state = player.clone();
            let drops = self.drain_drops(key);
            return GameResponse::success(format!("You defeated {npc_name}! ({damage} damage){quest_msg}"))
                .with_state(&state)
                .with_world(&self.world)
                .with_drops(drops);
        }

        let state = player.clone();
        let drops = self.drain_drops(key);
        let msg = if damage > 0 { format!("You hit {damage}!") } else { "You miss!".to_string() };
        GameResponse::success(msg).with_state(&state).with_drops(drops)
    }

    /// Ground item claims always land in the owner's inventory, including
    /// claims made by the follower on the owner's behalf.
    fn handle_pickup(&mut self, key: &str, target: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(ground) = self.world.take_ground_item(target) else {
            return GameResponse::fail("It is gone.");
        };
        let name = ground.item.kind.name().to_string();
        if player.inventory.add(ground.item).is_err() {
            // Atomic from the caller's view: the item goes back.
            self.world.ground_items.push(ground);
            return GameResponse::fail("Your pack is full.");
        }
        let state = player.clone();
        GameResponse::success(format!("Picked up {name}.")).with_state(&state)
    }

    /// All-or-nothing: either every input is consumed and the output plus
    /// XP lands, or the inventory is byte-identical to before the call.
    fn handle_craft(&mut self, key: &str, recipe_id: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(recipe) = self.recipes.iter().find(|r| r.id == recipe_id) else {
            return GameResponse::fail("Unknown recipe.");
        };
        if player.skills.get(recipe.skill).level < recipe.level_req {
            return GameResponse::fail(format!("You need level {} {:?}.", recipe.level_req, recipe.skill));
        }

        let snapshot = player.inventory.snapshot();
        for (kind, qty) in &recipe.inputs {
            if player.inventory.remove(*kind, *qty).is_err() {
                player.inventory.restore(&snapshot);
                return GameResponse::fail(format!("Missing {}x {}.", qty, kind.name()));
            }
        }
        if player.inventory.add(ItemStack::new(recipe.output, recipe.output_qty)).is_err() {
            player.inventory.restore(&snapshot);
            return GameResponse::fail("Your pack is full.");
        }

        let (name, skill, xp) = (recipe.name.clone(), recipe.skill, recipe.xp);
        award_xp(player, skill, xp, &self.xp_table, self.xp_drops.entry(key.to_string()).or_default());
        let state = player.clone();
        let drops = self.drain_drops(key);
        GameResponse::success(format!("Crafted {name}.")).with_state(&state).with_drops(drops)
    }

    fn handle_equip(&mut self, key: &str, item: ItemKind) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(slot) = item.slot() else {
            return GameResponse::fail("You cannot equip that.");
        };
        if player.inventory.remove(item, 1).is_err() {
            return GameResponse::fail("Item not in your pack.");
        }
        let previous = player.equipment.swap(slot, Some(ItemStack::new(item, 1)));
        if let Some(previous) = previous {
            // The slot just freed guarantees room for the swap-out.
            let _ = player.inventory.add(previous);
        }
        let state = player.clone();
        GameResponse::success(format!("Equipped {}.", item.name())).with_state(&state)
    }

    fn handle_unequip(&mut self, key: &str, slot: aeon_core::EquipSlot) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(stack) = player.equipment.get(slot).copied() else {
            return GameResponse::fail("Nothing equipped there.");
        };
        if player.inventory.add(stack).is_err() {
            return GameResponse::fail("Your pack is full.");
        }
        player.equipment.swap(slot, None);
        let state = player.clone();
        GameResponse::success(format!("Unequipped {}.", stack.kind.name())).with_state(&state)
    }

    fn handle_eat(&mut self, key: &str, item: Option<ItemKind>) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let kind = match item {
            Some(kind) if kind.flags().has(ItemFlags::FOOD) => kind,
            Some(_) => return GameResponse::fail("You cannot eat that."),
            None => match player.inventory.find_flag(ItemFlags::FOOD) {
                Some(kind) => kind,
                None => return GameResponse::fail("You have nothing to eat."),
            },
        };
        if player.inventory.remove(kind, 1).is_err() {
            return GameResponse::fail("You have nothing to eat.");
        }
        let heal = (player.max_hp * self.config.food_heal_percent / 100).max(1);
        player.hp = (player.hp + heal).min(player.max_hp);
        let state = player.clone();
        GameResponse::success(format!("You eat the {}.", kind.name().to_lowercase())).with_state(&state)
    }

    fn handle_bury(&mut self, key: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(kind) = player.inventory.take_one_flagged(ItemFlags::PRAYER) else {
            return GameResponse::fail("Nothing to bury.");
        };
        let prayer_xp = self.config.prayer_xp;
        award_xp(player, SkillName::Prayer, prayer_xp, &self.xp_table, self.xp_drops.entry(key.to_string()).or_default());
        let state = player.clone();
        let drops = self.drain_drops(key);
        GameResponse::success(format!("You bury the {}.", kind.name().to_lowercase()))
            .with_state(&state)
            .with_drops(drops)
    }

    fn handle_bank(&mut self, key: &str, actor: ActorRef, op: BankOp) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        match op {
            BankOp::Deposit { item, amount } => {
                let inventory = match actor {
                    ActorRef::Owner => &mut player.inventory,
                    ActorRef::Follower => &mut player.follower.inventory,
                };
                let held = inventory.count_of(item);
                let take = held.min(amount);
                if take == 0 {
                    return GameResponse::fail("Nothing to deposit.");
                }
                inventory.remove(item, take).expect("count checked");
                player.bank_deposit(ItemStack::new(item, take));
                let state = player.clone();
                GameResponse::success(format!("Deposited {}x {}.", take, item.name())).with_state(&state)
            }
            BankOp::Withdraw { item, amount } => {
                // Withdrawals always land in the owner's pack.
                let taken = if item.flags().has(ItemFlags::STACKABLE) {
                    let taken = player.bank_withdraw(item, amount);
                    if taken > 0 && player.inventory.add(ItemStack::new(item, taken)).is_err() {
                        player.bank_deposit(ItemStack::new(item, taken));
                        return GameResponse::fail("Your pack is full.");
                    }
                    taken
                } else {
                    let free = (INVENTORY_CAP - player.inventory.len()) as u32;
                    let want = amount.min(free);
                    if want == 0 {
                        return GameResponse::fail("Your pack is full.");
                    }
                    let taken = player.bank_withdraw(item, want);
                    for _ in 0..taken {
                        let _ = player.inventory.add(ItemStack::new(item, 1));
                    }
                    taken
                };
                if taken == 0 {
                    return GameResponse::fail("The bank holds none of that.");
                }
                let state = player.clone();
                GameResponse::success(format!("Withdrew {}x {}.", taken, item.name())).with_state(&state)
            }
        }
    }

    fn handle_shop_buy(&mut self, key: &str, npc_id: &str, item: ItemKind, qty: u32) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(npc) = self.world.npc(npc_id) else { return GameResponse::fail("Shop not found.") };
        if npc.role != NpcRole::Merchant {
            return GameResponse::fail("Shop not found.");
        }
        let Some(stocked) = npc.stock.iter().find(|s| s.kind == item) else {
            return GameResponse::fail("Item not in stock.");
        };
        let qty = qty.max(1).min(stocked.count);
        let cost = item.value() * qty;
        if player.inventory.count_of(ItemKind::Coins) < cost {
            return GameResponse::fail(format!("You need {cost} coins."));
        }

        // Capacity gate before any mutation.
        let room = if item.flags().has(ItemFlags::STACKABLE) {
            !player.inventory.is_full() || player.inventory.count_of(item) > 0
        } else {
            (INVENTORY_CAP - player.inventory.len()) as u32 >= qty
        };
        if !room {
            return GameResponse::fail("Your pack is full.");
        }

        player.inventory.remove(ItemKind::Coins, cost).expect("coins checked");
        if item.flags().has(ItemFlags::STACKABLE) {
            let _ = player.inventory.add(ItemStack::new(item, qty));
        } else {
            for _ in 0..qty {
                let _ = player.inventory.add(ItemStack::new(item, 1));
            }
        }
        let npc = self.world.npc_mut(npc_id).expect("checked above");
        if let Some(idx) = npc.stock.iter().position(|s| s.kind == item) {
            npc.stock[idx].count -= qty;
            if npc.stock[idx].count == 0 {
                npc.stock.remove(idx);
            }
        }
        let state = player.clone();
        GameResponse::success(format!("Bought {}x {} for {} coins.", qty, item.name(), cost))
            .with_state(&state)
            .with_world(&self.world)
    }

    fn handle_shop_sell(&mut self, key: &str, npc_id: &str, item: ItemKind, qty: u32) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(npc) = self.world.npc(npc_id) else { return GameResponse::fail("Shop not found.") };
        if npc.role != NpcRole::Merchant {
            return GameResponse::fail("Shop not found.");
        }
        let held = player.inventory.count_of(item);
        let qty = qty.max(1).min(held);
        if qty == 0 {
            return GameResponse::fail("You do not have that.");
        }
        let unit = (item.value() * SHOP_SELL_NUMERATOR / SHOP_SELL_DENOMINATOR).max(1);
        let payout = unit * qty;

        // All-or-nothing: goods out, coins in, or neither.
        let snapshot = player.inventory.snapshot();
        player.inventory.remove(item, qty).expect("count checked");
        if player.inventory.add(ItemStack::new(ItemKind::Coins, payout)).is_err() {
            player.inventory.restore(&snapshot);
            return GameResponse::fail("Your pack is full.");
        }

        let npc = self.world.npc_mut(npc_id).expect("checked above");
        if let Some(stocked) = npc.stock.iter_mut().find(|s| s.kind == item) {
            stocked.count += qty;
        } else {
            npc.stock.push(ItemStack::new(item, qty));
        }
        let state = player.clone();
        GameResponse::success(format!("Sold {}x {} for {} coins.", qty, item.name(), payout)).with_state(&state)
    }

    /// Travel replaces the world wholesale; a failed era gate leaves both
    /// the world and the player untouched.
    fn handle_travel(&mut self, key: &str, marker_id: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let Some(marker) = self.world.marker(marker_id) else {
            return GameResponse::fail("Invalid destination.");
        };
        if player.era < marker.era_required {
            return GameResponse::fail(format!("Era {} required.", marker.era_required));
        }
        let (destination, label, arrival) = (marker.scene, marker.label.clone(), marker.position);
        self.world = destination.generate(self.config.world_seed, self.now);
        player.scene = destination;
        player.position = arrival;
        player.follower.position = Position::new(arrival.x - 2.0, arrival.z - 2.0);
        award_xp(player, SkillName::Agility, TRAVEL_XP, &self.xp_table, self.xp_drops.entry(key.to_string()).or_default());
        tracing::info!(player = %player.name, scene = destination.name(), "travel");
        let state = player.clone();
        let drops = self.drain_drops(key);
        GameResponse::with_status(ResponseStatus::SceneChange, format!("Traveled to {label}."))
            .with_state(&state)
            .with_world(&self.world)
            .with_drops(drops)
    }

    fn handle_evolve(&mut self, key: &str) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        if advance_era(player) {
            let era = player.era;
            let state = player.clone();
            GameResponse::success(format!("You advance to the {} era.", era_name(era))).with_state(&state)
        } else {
            GameResponse::fail("You are not ready to evolve.")
        }
    }

    fn handle_command(
        &mut self,
        key: &str,
        command: aeon_core::FollowerCommand,
        skill: Option<SkillName>,
    ) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        player.follower.command = command;
        player.follower.memory.last_command = Some(command);
        if skill.is_some() {
            player.follower.memory.last_skill = skill;
        }
        let state = player.clone();
        GameResponse::ok().with_state(&state)
    }

    /// Runs the decision engine for this squad and answers with the
    /// current snapshot. Time itself is advanced only by [`Shard::advance`].
    fn handle_tick(&mut self, key: &str) -> GameResponse {
        let thought = self.run_squad(key);
        let Some(player) = self.players.get(key) else { return GameResponse::fail("No session.") };
        let state = player.clone();
        let drops = self.drain_drops(key);
        let mut resp = GameResponse::ok().with_state(&state).with_world(&self.world).with_drops(drops);
        resp.thought = thought;
        resp
    }

    fn handle_admin(&mut self, key: &str, op: AdminOp) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        if !player.operator {
            return GameResponse::fail("Operator only.");
        }
        match op {
            AdminOp::Heal => {
                player.hp = player.max_hp;
            }
            AdminOp::ForceEvolve => {
                award_xp(
                    player,
                    SkillName::Evolution,
                    FORCE_EVOLVE_XP,
                    &self.xp_table,
                    self.xp_drops.entry(key.to_string()).or_default(),
                );
            }
            AdminOp::MaxOut => {
                let top = self.xp_table.max_level();
                let top_xp = self.xp_table.xp_for_level(top) as f64;
                for name in SkillName::ALL {
                    let skill = player.skills.get_mut(name);
                    skill.level = top;
                    skill.xp = top_xp;
                    skill.unlocked = true;
                }
                player.era = aeon_core::ERA_COUNT - 1;
                player.max_hp = u32::from(top);
                player.hp = player.max_hp;
            }
            AdminOp::Reset => {
                player.skills = aeon_core::SkillMap::starting(0, &self.xp_table);
                player.era = 0;
                player.max_hp = 10;
                player.hp = 10;
            }
        }
        tracing::warn!(player = %player.name, ?op, "admin action");
        let state = player.clone();
        let drops = self.drain_drops(key);
        GameResponse::success("Admin command executed.").with_state(&state).with_drops(drops)
    }

    /// Simulation-only: drops a bank booth near the actor when the scene
    /// somehow has none, so banking can always complete.
    fn handle_ensure_bank(&mut self, key: &str, actor: ActorRef) -> GameResponse {
        if self.world.resources.iter().any(|r| r.kind == ResourceKind::BankBooth) {
            return GameResponse::ok();
        }
        let Some(player) = self.players.get(key) else { return GameResponse::fail("No session.") };
        let at = match actor {
            ActorRef::Owner => player.position,
            ActorRef::Follower => player.follower.position,
        };
        self.world.next_spawn += 1;
        let id = format!("bank-sim-{}", self.world.next_spawn);
        self.world
            .resources
            .push(ResourceEntity::new(id, ResourceKind::BankBooth, 1, Position::new(at.x + 2.0, at.z + 2.0)));
        GameResponse::ok()
    }

    /// Simulation-only: spawns a level-matched enemy when the scene has no
    /// live prey left for a combat grind.
    fn handle_spawn_prey(&mut self, key: &str, actor: ActorRef) -> GameResponse {
        let Some(player) = self.players.get(key) else { return GameResponse::fail("No session.") };
        let at = match actor {
            ActorRef::Owner => player.position,
            ActorRef::Follower => player.follower.position,
        };
        if self.world.nearest_enemy(at).is_some() {
            return GameResponse::ok();
        }
        let level = player.melee_level();
        let name = match level {
            0..=4 => "Marsh Rat",
            5..=9 => "Feral Hound",
            10..=19 => "Dune Jackal",
            _ => "Rusted Sentry",
        };
        self.world.next_spawn += 1;
        let id = format!("prey-{}", self.world.next_spawn);
        self.world.npcs.push(Npc {
            id,
            name: name.to_string(),
            role: NpcRole::Enemy,
            hp: u32::from(level) * 4,
            max_hp: u32::from(level) * 4,
            combat_level: level,
            position: Position::new(at.x + 4.0, at.z - 4.0),
            stock: Vec::new(),
        });
        GameResponse::ok()
    }

    /// Simulation-only: hands the actor a missing gathering tool. A
    /// deliberate simplification standing in for a market or craft chain.
    fn handle_acquire_tool(&mut self, key: &str, actor: ActorRef, kind: ItemKind) -> GameResponse {
        let Some(player) = self.players.get_mut(key) else { return GameResponse::fail("No session.") };
        let inventory = match actor {
            ActorRef::Owner => &mut player.inventory,
            ActorRef::Follower => &mut player.follower.inventory,
        };
        if inventory.has_flag(kind.flags()) {
            return GameResponse::ok();
        }
        if inventory.add(ItemStack::new(kind, 1)).is_err() {
            return GameResponse::fail("Your pack is full.");
        }
        GameResponse::ok()
    }
}

/// Quest-stage side effects on enemy kills. Returns a suffix for the kill
/// message when the quest advanced.
fn quest_on_kill(player: &mut PlayerState, npc_level: u8) -> Option<String> {
    match player.quest.stage {
        0 => {
            player.quest.stage = 1;
            Some(" Quest updated: first blood.".to_string())
        }
        1 if npc_level >= 10 => {
            player.quest.stage = 2;
            Some(" Quest updated: a worthy hunt.".to_string())
        }
        _ => None,
    }
}
