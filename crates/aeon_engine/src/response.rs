//! # Tagged Responses
//!
//! Every handler returns a [`GameResponse`]. Expected rejections (missing
//! target, insufficient materials, locked era) are `Fail` responses, never
//! errors or panics, and always leave state unchanged.

use aeon_core::{ItemStack, PlayerState, SkillName, WorldState};
use serde::{Deserialize, Serialize};

use crate::recipes::Recipe;

/// Outcome tag on a response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseStatus {
    /// The action applied and changed state.
    Success,
    /// The action was rejected; nothing changed.
    Fail,
    /// Acknowledged; nothing interesting to report.
    Ok,
    /// The world was replaced by a scene switch.
    SceneChange,
    /// A bank interface should open.
    OpenBank,
    /// A crafting interface should open.
    OpenCrafting,
    /// A shop interface should open.
    OpenShop,
}

/// One floating XP credit, surfaced to clients.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct XpDrop {
    /// The credited skill.
    pub skill: SkillName,
    /// The amount credited.
    pub amount: f64,
}

/// The structured result of one intent.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct GameResponse {
    /// Outcome tag.
    pub status: ResponseStatus,
    /// Human-readable outcome line.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
    /// Updated player snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<Box<PlayerState>>,
    /// Updated world snapshot.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub world: Option<Box<WorldState>>,
    /// XP credits accumulated since the last flush.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub xp_drops: Vec<XpDrop>,
    /// Recipes for an opened crafting station.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipes: Option<Vec<Recipe>>,
    /// Stock for an opened shop.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock: Option<Vec<ItemStack>>,
    /// The companion's latest thought, on tick responses.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thought: Option<String>,
}

impl Default for ResponseStatus {
    fn default() -> Self {
        Self::Ok
    }
}

impl GameResponse {
    /// A bare acknowledgement.
    #[must_use]
    pub fn ok() -> Self {
        Self { status: ResponseStatus::Ok, ..Self::default() }
    }

    /// A rejection that left state unchanged.
    #[must_use]
    pub fn fail(msg: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Fail, msg: Some(msg.into()), ..Self::default() }
    }

    /// A successful state change.
    #[must_use]
    pub fn success(msg: impl Into<String>) -> Self {
        Self { status: ResponseStatus::Success, msg: Some(msg.into()), ..Self::default() }
    }

    /// Creates a response with an arbitrary status and message.
    #[must_use]
    pub fn with_status(status: ResponseStatus, msg: impl Into<String>) -> Self {
        Self { status, msg: Some(msg.into()), ..Self::default() }
    }

    /// Attaches a player snapshot.
    #[must_use]
    pub fn with_state(mut self, player: &PlayerState) -> Self {
        self.state = Some(Box::new(player.clone()));
        self
    }

    /// Attaches a world snapshot.
    #[must_use]
    pub fn with_world(mut self, world: &WorldState) -> Self {
        self.world = Some(Box::new(world.clone()));
        self
    }

    /// Attaches drained XP drops.
    #[must_use]
    pub fn with_drops(mut self, drops: Vec<XpDrop>) -> Self {
        self.xp_drops = drops;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fail_is_bare() {
        let resp = GameResponse::fail("nope");
        assert_eq!(resp.status, ResponseStatus::Fail);
        assert!(resp.state.is_none());
        assert!(resp.xp_drops.is_empty());
    }

    #[test]
    fn test_serialization_skips_empties() {
        let raw = serde_json::to_string(&GameResponse::ok()).unwrap();
        assert!(!raw.contains("xp_drops"));
        assert!(!raw.contains("state"));
        assert!(raw.contains("OK"));
    }
}
