//! # The Priority Ladder
//!
//! One evaluation per entity per tick. Rules are ordered; the first that
//! fires owns the tick. Handlers below the ladder dispatch on the
//! entity's current state tag.

use aeon_core::{
    era_min_level, FollowerCommand, ItemFlags, PlayerState, ResourceKind, SkillName, WorldState, ERA_COUNT,
};

use crate::agent::actor::{Actor, FollowerActor, OwnerActor};
use crate::config::SimConfig;
use crate::intent::{ActorRef, BankOp, Intent};

/// Health fraction below which survival takes over.
const SURVIVAL_THRESHOLD: f32 = 0.4;

/// Food items pulled from the bank per withdraw trip.
const FOOD_WITHDRAW: u32 = 5;

/// Where an entity's state machine currently sits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AgentState {
    /// Nothing claimed this entity's attention.
    #[default]
    Idle,
    /// Trailing the owner.
    Following,
    /// Walking to the bank and emptying the pack.
    Banking,
    /// Working a skill against a resource or enemy.
    Grinding,
    /// Closing on a ground item.
    Looting,
}

/// A banking errand beyond the default deposit run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SubTask {
    /// Deposit everything except kit.
    DepositAll,
    /// Pull food out for survival.
    WithdrawFood,
}

/// One emitted step: an optional intent plus an optional thought line.
#[derive(Clone, Debug)]
pub struct Decision {
    /// Which entity acts.
    pub actor: ActorRef,
    /// The intent to route, when the rule produced one.
    pub intent: Option<Intent>,
    /// A thought surfaced to the owner's client.
    pub thought: Option<String>,
}

impl Decision {
    fn act(actor: ActorRef, intent: Intent, thought: impl Into<String>) -> Self {
        Self { actor, intent: Some(intent), thought: Some(thought.into()) }
    }

    fn quiet(actor: ActorRef, intent: Intent) -> Self {
        Self { actor, intent: Some(intent), thought: None }
    }

    fn note(actor: ActorRef, thought: impl Into<String>) -> Self {
        Self { actor, intent: None, thought: Some(thought.into()) }
    }
}

/// Decision-engine state for one squad (owner + follower).
#[derive(Clone, Debug)]
pub struct SquadAgent {
    /// Owner's state tag.
    pub owner_state: AgentState,
    /// Follower's state tag.
    pub follower_state: AgentState,
    /// The skill currently being ground.
    pub goal: Option<SkillName>,
    /// Pending banking errand.
    pub sub_task: Option<SubTask>,
}

impl Default for SquadAgent {
    fn default() -> Self {
        Self {
            owner_state: AgentState::Idle,
            follower_state: AgentState::Following,
            goal: None,
            sub_task: None,
        }
    }
}

impl SquadAgent {
    /// Evaluates the squad for one tick: the owner when on autopilot, the
    /// follower always. Reads state, emits intents, mutates only itself.
    pub fn think(&mut self, player: &PlayerState, world: &WorldState, config: &SimConfig) -> Vec<Decision> {
        let mut out = Vec::new();
        if player.autopilot {
            let mut state = self.owner_state;
            self.ladder(&OwnerActor::new(player), player, world, config, &mut out, &mut state);
            self.owner_state = state;
        }
        let mut state = self.follower_state;
        self.ladder(&FollowerActor::new(player), player, world, config, &mut out, &mut state);
        self.follower_state = state;
        out
    }

    fn ladder<A: Actor>(
        &mut self,
        actor: &A,
        player: &PlayerState,
        world: &WorldState,
        config: &SimConfig,
        out: &mut Vec<Decision>,
        state: &mut AgentState,
    ) {
        let who = if actor.is_follower() { ActorRef::Follower } else { ActorRef::Owner };

        // 1. Command override.
        if actor.is_follower() {
            match player.follower.command {
                FollowerCommand::Stay => {
                    *state = AgentState::Idle;
                    out.push(Decision::note(who, "Staying put."));
                    return;
                }
                FollowerCommand::Follow => {
                    if actor.position().distance(player.position) > config.follow_radius {
                        let (next, _) = actor.position().step_toward(player.position, config.companion_speed);
                        *state = AgentState::Following;
                        out.push(Decision::act(who, Intent::Move { x: next.x, z: next.z }, "Wait for me!"));
                        return;
                    }
                }
                _ => {}
            }
        }

        // 2. Survival. The foodless branch is a transition; once in
        // Banking the dispatch below walks the errand to completion.
        let (hp, max_hp) = actor.hp();
        if (hp as f32) < (max_hp as f32) * SURVIVAL_THRESHOLD {
            if actor.pantry().has_flag(ItemFlags::FOOD) {
                out.push(Decision::act(who, Intent::Eat { item: None }, "Eating."));
                return;
            }
            if !actor.is_follower() && *state != AgentState::Banking {
                *state = AgentState::Banking;
                self.sub_task = Some(SubTask::WithdrawFood);
                out.push(Decision::note(who, "Need food!"));
                return;
            }
        }

        // 3. Passive credit, every tick regardless of state.
        if actor.pantry().has_flag(ItemFlags::PRAYER) {
            out.push(Decision::act(who, Intent::Bury, "Offering the bones."));
            return;
        }

        // 4. Looting. Claims land in the owner's pack.
        if !player.inventory.is_full() {
            if let Some(loot) = world.nearest_ground_item(actor.position(), config.loot_radius) {
                let name = loot.item.kind.name().to_lowercase();
                let (next, arrived) = actor.position().step_toward(loot.position, config.companion_speed);
                let id = loot.id.clone();
                out.push(Decision::quiet(who, Intent::Move { x: next.x, z: next.z }));
                if arrived {
                    out.push(Decision::act(who, Intent::Pickup { target: id }, format!("Grabbed the {name}!")));
                } else {
                    out.push(Decision::note(who, format!("Running to grab the {name}.")));
                }
                *state = AgentState::Looting;
                return;
            }
        }

        // 5. Inventory-full, or an explicit banking command. A transition,
        // not a loop: once in Banking the dispatch below owns the tick.
        let commanded = actor.is_follower() && player.follower.command == FollowerCommand::Bank;
        if *state != AgentState::Banking && (actor.carry().is_full() || commanded) {
            *state = AgentState::Banking;
            self.sub_task = Some(SubTask::DepositAll);
            out.push(Decision::note(who, "Pack full. Banking."));
            return;
        }

        // 6. Evolution check, owner only.
        if !actor.is_follower() && player.era + 1 < ERA_COUNT {
            let level = player.skills.get(SkillName::Evolution).level;
            if level >= era_min_level(player.era + 1) {
                out.push(Decision::act(who, Intent::Evolve, "Evolving!"));
                return;
            }
        }

        // 7. State dispatch.
        match *state {
            AgentState::Banking => self.banking(actor, player, world, config, out, state, who),
            AgentState::Grinding => self.grinding(actor, player, world, config, out, state, who),
            AgentState::Looting => {
                *state = AgentState::Idle;
            }
            AgentState::Idle | AgentState::Following => {
                if actor.is_follower() {
                    if matches!(player.follower.command, FollowerCommand::Kill | FollowerCommand::Gather) {
                        *state = AgentState::Grinding;
                    }
                } else {
                    self.pick_goal(player, out, state, who);
                }
            }
        }
    }

    /// Walk to a bank booth, then run the errand one step per tick.
    #[allow(clippy::too_many_arguments)]
    fn banking<A: Actor>(
        &mut self,
        actor: &A,
        player: &PlayerState,
        world: &WorldState,
        config: &SimConfig,
        out: &mut Vec<Decision>,
        state: &mut AgentState,
        who: ActorRef,
    ) {
        let Some(bank) = world.nearest_resource(actor.position(), |r| r.kind == ResourceKind::BankBooth) else {
            // Simulation contexts may lack a booth entirely; conjure one.
            out.push(Decision::act(who, Intent::EnsureBank, "Looking for a bank."));
            return;
        };
        let (next, arrived) = actor.position().step_toward(bank.position, config.companion_speed);
        if !arrived {
            out.push(Decision::act(who, Intent::Move { x: next.x, z: next.z }, "Running to the bank."));
            return;
        }
        out.push(Decision::quiet(who, Intent::Move { x: next.x, z: next.z }));

        match self.sub_task {
            Some(SubTask::WithdrawFood) => {
                if let Some(stack) = player.bank.iter().find(|s| s.kind.flags().has(ItemFlags::FOOD)) {
                    out.push(Decision::act(
                        who,
                        Intent::Bank(BankOp::Withdraw { item: stack.kind, amount: FOOD_WITHDRAW }),
                        "Withdrawing food.",
                    ));
                } else {
                    out.push(Decision::note(who, "No food banked."));
                }
                self.sub_task = None;
                *state = AgentState::Idle;
            }
            _ => {
                // Deposit one slot per tick, kit stays.
                if let Some(kind) = actor.carry().find_non_kit() {
                    let amount = actor.carry().count_of(kind);
                    out.push(Decision::act(
                        who,
                        Intent::Bank(BankOp::Deposit { item: kind, amount }),
                        format!("Depositing {}.", kind.name().to_lowercase()),
                    ));
                } else {
                    self.sub_task = None;
                    *state = AgentState::Idle;
                    out.push(Decision::act(
                        who,
                        Intent::Command { command: FollowerCommand::Follow, skill: None },
                        "Banking complete.",
                    ));
                }
            }
        }
    }

    /// Resolve a target skill, secure the tool, close on the nearest
    /// eligible target, and fire the matching intent on arrival.
    #[allow(clippy::too_many_arguments)]
    fn grinding<A: Actor>(
        &mut self,
        actor: &A,
        player: &PlayerState,
        world: &WorldState,
        config: &SimConfig,
        out: &mut Vec<Decision>,
        state: &mut AgentState,
        who: ActorRef,
    ) {
        let skill = if actor.is_follower() {
            match player.follower.command {
                FollowerCommand::Kill => Some(SkillName::Attack),
                FollowerCommand::Gather => self
                    .goal
                    .or(player.follower.memory.last_skill)
                    .or(Some(SkillName::Mining)),
                _ => self.goal,
            }
        } else {
            self.goal
        };
        let Some(skill) = skill else {
            *state = AgentState::Idle;
            return;
        };

        if skill.is_melee() {
            match world.nearest_enemy(actor.position()) {
                None => out.push(Decision::act(who, Intent::SpawnPrey, "Hunting.")),
                Some(enemy) => {
                    let id = enemy.id.clone();
                    let name = enemy.name.clone();
                    let (next, arrived) = actor.position().step_toward(enemy.position, config.companion_speed);
                    out.push(Decision::quiet(who, Intent::Move { x: next.x, z: next.z }));
                    if arrived {
                        out.push(Decision::act(who, Intent::Attack { target: id }, "Fighting!"));
                    } else {
                        out.push(Decision::note(who, format!("Moving to {name}.")));
                    }
                }
            }
            return;
        }

        let level = player.skills.get(skill).level;
        let Some(target) =
            world.nearest_resource(actor.position(), |r| r.kind.skill() == Some(skill) && r.kind.level_req() <= level)
        else {
            out.push(Decision::note(who, format!("Waiting for {skill:?} to come back.")));
            return;
        };

        if let Some(flag) = target.kind.tool_flag() {
            if !actor.has_kit(flag) {
                if let Some(tool) = target.kind.tool_item() {
                    out.push(Decision::act(
                        who,
                        Intent::AcquireTool { kind: tool },
                        format!("Fetching a {}.", tool.name().to_lowercase()),
                    ));
                    return;
                }
            }
        }

        let id = target.id.clone();
        let (next, arrived) = actor.position().step_toward(target.position, config.companion_speed);
        out.push(Decision::quiet(who, Intent::Move { x: next.x, z: next.z }));
        if arrived {
            out.push(Decision::act(who, Intent::Gather { target: id }, format!("Training {skill:?}.")));
        } else {
            out.push(Decision::note(who, "On the move."));
        }
    }

    /// Owner goal selection: unlocked trainable skills, ranked by distance
    /// to the next multiple of ten, ties to the lower level.
    fn pick_goal(&mut self, player: &PlayerState, out: &mut Vec<Decision>, state: &mut AgentState, who: ActorRef) {
        let mut candidates: Vec<SkillName> = SkillName::ALL
            .into_iter()
            .filter(|s| s.trainable() && s.era_unlocked() <= player.era && player.skills.get(*s).unlocked)
            .collect();
        if candidates.is_empty() {
            out.push(Decision::note(who, "Nothing left to train."));
            return;
        }
        candidates.sort_by_key(|s| {
            let level = player.skills.get(*s).level;
            (10 - (level % 10), level)
        });
        let goal = candidates[0];
        self.goal = Some(goal);
        *state = AgentState::Grinding;
        let next_level = player.skills.get(goal).level + 1;
        out.push(Decision::note(who, format!("Goal: train {goal:?} to level {next_level}.")));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aeon_core::{ItemKind, ItemStack, Position, SceneKind, XpTable};

    /// An entity's position after one hypothetical step toward a point.
    fn step(from: Position, to: Position, speed: f32) -> Position {
        from.step_toward(to, speed).0
    }

    fn setup() -> (PlayerState, WorldState, SimConfig) {
        let table = XpTable::default();
        let player = PlayerState::new("Tess", false, &table);
        let world = SceneKind::Greenvale.generate(1, 0);
        (player, world, SimConfig { bot_enabled: false, ..SimConfig::default() })
    }

    fn empty_world() -> WorldState {
        let mut world = SceneKind::Greenvale.generate(1, 0);
        world.resources.clear();
        world.npcs.clear();
        world.ground_items.clear();
        world
    }

    #[test]
    fn test_stay_command_halts_follower() {
        let (mut player, world, config) = setup();
        player.follower.command = FollowerCommand::Stay;
        player.follower.position = Position::new(10.0, 0.0);
        // Stale starter food and twigs out of the way for a pure check.
        player.inventory = aeon_core::Inventory::new();

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &world, &config);

        assert!(decisions.iter().all(|d| !matches!(d.intent, Some(Intent::Move { .. }))));
        assert_eq!(agent.follower_state, AgentState::Idle);
    }

    #[test]
    fn test_follow_closes_distance() {
        let (mut player, _, config) = setup();
        player.inventory = aeon_core::Inventory::new();
        let empty = empty_world();
        player.follower.position = Position::new(10.0, 0.0);

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &empty, &config);
        let moved = decisions.iter().find_map(|d| match d.intent {
            Some(Intent::Move { x, z }) if d.actor == ActorRef::Follower => Some(Position::new(x, z)),
            _ => None,
        });
        let expected = step(Position::new(10.0, 0.0), player.position, config.companion_speed);
        assert_eq!(moved, Some(expected));
        assert_eq!(agent.follower_state, AgentState::Following);
    }

    #[test]
    fn test_survival_eats_before_anything_else() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.hp = 3;
        player.max_hp = 10;
        player.autopilot = true;

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions.iter().any(|d| matches!(d.intent, Some(Intent::Eat { .. }))));
    }

    #[test]
    fn test_survival_without_food_goes_banking() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.hp = 3;
        player.max_hp = 10;
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();

        let mut agent = SquadAgent::default();
        let _ = agent.think(&player, &world, &config);
        assert_eq!(agent.owner_state, AgentState::Banking);
        assert_eq!(agent.sub_task, Some(SubTask::WithdrawFood));
    }

    #[test]
    fn test_prayer_items_are_buried_every_tick() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        player.inventory.add(ItemStack::new(ItemKind::Bones, 1)).unwrap();

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions.iter().any(|d| matches!(d.intent, Some(Intent::Bury))));
    }

    #[test]
    fn test_loot_in_radius_attracts() {
        let (mut player, _, config) = setup();
        let mut world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        world.drop_item(ItemStack::new(ItemKind::Flint, 1), Position::new(4.0, 0.0), 1000);

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions.iter().any(|d| matches!(d.intent, Some(Intent::Move { .. }))));
        assert_eq!(agent.owner_state, AgentState::Looting);
    }

    #[test]
    fn test_arrival_claims_loot() {
        let (mut player, _, config) = setup();
        let mut world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        let id = world.drop_item(ItemStack::new(ItemKind::Flint, 1), Position::new(1.0, 0.0), 1000);

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions
            .iter()
            .any(|d| matches!(&d.intent, Some(Intent::Pickup { target }) if *target == id)));
    }

    #[test]
    fn test_full_pack_forces_banking() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        for _ in 0..aeon_core::INVENTORY_CAP {
            player.inventory.add(ItemStack::new(ItemKind::Logs, 1)).unwrap();
        }

        let mut agent = SquadAgent::default();
        let _ = agent.think(&player, &world, &config);
        assert_eq!(agent.owner_state, AgentState::Banking);
        assert_eq!(agent.sub_task, Some(SubTask::DepositAll));
    }

    #[test]
    fn test_evolution_check_emits_evolve() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        player.skills.get_mut(SkillName::Evolution).level = 15;

        let mut agent = SquadAgent::default();
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions
            .iter()
            .any(|d| matches!(d.intent, Some(Intent::Evolve)) && d.actor == ActorRef::Owner));
    }

    #[test]
    fn test_goal_selection_prefers_milestones() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        player.skills.get_mut(SkillName::Woodcutting).level = 9;
        player.skills.get_mut(SkillName::Mining).level = 5;

        let mut agent = SquadAgent::default();
        let _ = agent.think(&player, &world, &config);
        assert_eq!(agent.goal, Some(SkillName::Woodcutting), "9 is one from the milestone");
        assert_eq!(agent.owner_state, AgentState::Grinding);
    }

    #[test]
    fn test_goal_tie_breaks_to_lower_level() {
        let (mut player, _, config) = setup();
        let world = empty_world();
        player.autopilot = true;
        player.inventory = aeon_core::Inventory::new();
        // Both are 3 from a milestone; fishing is the lower level.
        player.skills.get_mut(SkillName::Woodcutting).level = 17;
        player.skills.get_mut(SkillName::Fishing).level = 7;
        player.skills.get_mut(SkillName::Mining).level = 15;
        player.skills.get_mut(SkillName::Attack).level = 15;
        player.skills.get_mut(SkillName::Strength).level = 15;
        player.skills.get_mut(SkillName::Defense).level = 15;

        let mut agent = SquadAgent::default();
        let _ = agent.think(&player, &world, &config);
        assert_eq!(agent.goal, Some(SkillName::Fishing));
    }

    #[test]
    fn test_kill_command_routes_to_combat_grind() {
        let (mut player, _, config) = setup();
        let mut world = empty_world();
        player.inventory = aeon_core::Inventory::new();
        player.follower.command = FollowerCommand::Kill;
        world.npcs.push(aeon_core::Npc {
            id: "rat-1".to_string(),
            name: "Marsh Rat".to_string(),
            role: aeon_core::NpcRole::Enemy,
            hp: 8,
            max_hp: 8,
            combat_level: 3,
            position: Position::new(-2.0, -2.0),
            stock: Vec::new(),
        });

        let mut agent = SquadAgent::default();
        // First tick transitions into grinding, second acts on it.
        let _ = agent.think(&player, &world, &config);
        assert_eq!(agent.follower_state, AgentState::Grinding);
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions
            .iter()
            .any(|d| matches!(&d.intent, Some(Intent::Attack { target }) if target == "rat-1")));
    }

    #[test]
    fn test_missing_tool_is_acquired_opportunistically() {
        let (mut player, _, config) = setup();
        let mut world = empty_world();
        player.inventory = aeon_core::Inventory::new();
        player.follower.command = FollowerCommand::Gather;
        player.follower.memory.last_skill = Some(SkillName::Mining);
        world.resources.push(aeon_core::ResourceEntity::new(
            "copper-1",
            ResourceKind::CopperRock,
            0,
            Position::new(-2.0, -2.0),
        ));

        let mut agent = SquadAgent::default();
        let _ = agent.think(&player, &world, &config);
        let decisions = agent.think(&player, &world, &config);
        assert!(decisions
            .iter()
            .any(|d| matches!(d.intent, Some(Intent::AcquireTool { kind: ItemKind::Pickaxe }))));
    }
}
