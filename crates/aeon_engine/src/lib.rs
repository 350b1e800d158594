//! # AEON Engine - The Authoritative Simulation
//!
//! The action router, the autonomous decision engine, and the shard that
//! binds them to one world.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                        SHARD                            │
//! ├─────────────────────────────────────────────────────────┤
//! │  client intents ──┐                                     │
//! │                   ├──► Router::apply ──► World/Players  │
//! │  agent intents ───┘         ▲                           │
//! │                             │                           │
//! │  tick ──► DecisionEngine ───┘  (reads state,            │
//! │                                 emits intents)          │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! The router is the single writer of world and player state. The decision
//! engine never mutates game state; it reads and emits intents into the
//! same router the transport uses. The tick is the only place time
//! advances.

#![deny(unsafe_code)]

pub mod agent;
pub mod config;
pub mod intent;
pub mod progress;
pub mod recipes;
pub mod response;
pub mod router;
pub mod shard;

pub use config::SimConfig;
pub use intent::{ActorRef, AdminOp, BankOp, Intent};
pub use recipes::{default_recipes, Recipe};
pub use response::{GameResponse, ResponseStatus, XpDrop};
pub use shard::Shard;
