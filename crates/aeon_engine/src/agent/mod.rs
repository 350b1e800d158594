//! # The Autonomous Decision Engine
//!
//! Two entities per owner, the player on autopilot and its follower,
//! evaluated once per tick against a fixed priority ladder. The engine
//! reads game state and emits [`Intent`]s; the router applies them. It
//! never writes world or player state itself.
//!
//! ## The ladder, top to bottom, first match wins
//!
//! 1. Command override (follower only): STAY halts, FOLLOW closes in.
//! 2. Survival: eat below 40% health, or go bank for food.
//! 3. Passive credit: bury any carried prayer item.
//! 4. Looting: claim nearby ground items while there is room.
//! 5. Inventory-full: transition to banking.
//! 6. Evolution check (owner only): emit an evolve intent when ready.
//! 7. State dispatch: banking, grinding, goal selection.

mod actor;
mod brain;

pub use actor::{Actor, FollowerActor, OwnerActor};
pub use brain::{AgentState, Decision, SquadAgent, SubTask};
