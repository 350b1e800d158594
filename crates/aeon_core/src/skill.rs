//! # Skills and Eras
//!
//! Every entity carries the full skill map. The EVOLUTION skill is the
//! progression skill: its level alone drives era advancement, and it
//! passively receives half of all other XP gained.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::level::XpTable;

/// Number of eras, 0 through 12.
pub const ERA_COUNT: u8 = 13;

/// Minimum EVOLUTION level required to enter `era`.
#[must_use]
pub const fn era_min_level(era: u8) -> u8 {
    era * 10
}

/// Display name for an era.
#[must_use]
pub const fn era_name(era: u8) -> &'static str {
    match era {
        0 => "Dawn",
        1 => "Stone",
        2 => "Village",
        3 => "Bronze",
        4 => "Iron",
        5 => "Classical",
        6 => "Medieval",
        7 => "Renaissance",
        8 => "Industrial",
        9 => "Atomic",
        10 => "Information",
        11 => "Stellar",
        _ => "Ascendant",
    }
}

/// Every skill the simulation tracks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SkillName {
    /// Melee accuracy.
    Attack,
    /// Melee damage.
    Strength,
    /// Damage avoidance.
    Defense,
    /// Health pool. Its level is the entity's max hp.
    Hits,
    /// Chopping trees.
    Woodcutting,
    /// Mining rocks.
    Mining,
    /// Netting fishing spots.
    Fishing,
    /// Preparing food.
    Cooking,
    /// Lighting fires.
    Firemaking,
    /// Working materials into goods.
    Crafting,
    /// Burying remains.
    Prayer,
    /// Moving through the world.
    Agility,
    /// The progression skill. Drives eras; receives half of all other XP.
    Evolution,
}

impl SkillName {
    /// All skills, in registry order.
    pub const ALL: [SkillName; 13] = [
        Self::Attack,
        Self::Strength,
        Self::Defense,
        Self::Hits,
        Self::Woodcutting,
        Self::Mining,
        Self::Fishing,
        Self::Cooking,
        Self::Firemaking,
        Self::Crafting,
        Self::Prayer,
        Self::Agility,
        Self::Evolution,
    ];

    /// Era in which the skill unlocks.
    #[must_use]
    pub const fn era_unlocked(self) -> u8 {
        match self {
            Self::Prayer | Self::Agility => 1,
            _ => 0,
        }
    }

    /// True for skills the autonomous goal picker may grind.
    ///
    /// Passive and derived skills are excluded; they advance as side
    /// effects of other actions.
    #[must_use]
    pub const fn trainable(self) -> bool {
        matches!(
            self,
            Self::Woodcutting | Self::Mining | Self::Fishing | Self::Attack | Self::Strength | Self::Defense
        )
    }

    /// True for melee combat skills.
    #[must_use]
    pub const fn is_melee(self) -> bool {
        matches!(self, Self::Attack | Self::Strength | Self::Defense)
    }
}

/// One skill's progress.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Skill {
    /// Current level, always derivable from `xp` via the XP table.
    pub level: u8,
    /// Accumulated experience, monotone non-decreasing.
    pub xp: f64,
    /// Whether the era gate has opened this skill.
    pub unlocked: bool,
}

impl Skill {
    /// A fresh level-1 skill.
    #[must_use]
    pub const fn fresh(unlocked: bool) -> Self {
        Self { level: 1, xp: 0.0, unlocked }
    }
}

/// The full per-entity skill map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SkillMap {
    skills: BTreeMap<SkillName, Skill>,
}

impl SkillMap {
    /// Creates the starting skill map for a given era.
    ///
    /// HITS starts at level 10 with the matching XP so a fresh entity has a
    /// survivable health pool.
    #[must_use]
    pub fn starting(era: u8, table: &XpTable) -> Self {
        let mut skills = BTreeMap::new();
        for name in SkillName::ALL {
            let unlocked = name.era_unlocked() <= era;
            let skill = if name == SkillName::Hits {
                Skill { level: 10, xp: table.xp_for_level(10) as f64, unlocked }
            } else {
                Skill::fresh(unlocked)
            };
            skills.insert(name, skill);
        }
        Self { skills }
    }

    /// Borrows a skill. Every name exists after construction.
    #[must_use]
    pub fn get(&self, name: SkillName) -> &Skill {
        self.skills.get(&name).expect("skill map is total")
    }

    /// Mutably borrows a skill.
    pub fn get_mut(&mut self, name: SkillName) -> &mut Skill {
        self.skills.get_mut(&name).expect("skill map is total")
    }

    /// Iterates over all skills.
    pub fn iter(&self) -> impl Iterator<Item = (SkillName, &Skill)> {
        self.skills.iter().map(|(k, v)| (*k, v))
    }

    /// Opens every skill whose era gate is at or below `era`.
    pub fn unlock_for_era(&mut self, era: u8) {
        for (name, skill) in &mut self.skills {
            if name.era_unlocked() <= era {
                skill.unlocked = true;
            }
        }
    }
}
