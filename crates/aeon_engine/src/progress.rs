//! # XP Credits and Era Advancement
//!
//! The fan-out rule: every credit to a non-progression skill also credits
//! half the amount to EVOLUTION, exactly once. This is written as two
//! explicit sequential credits inside one call, not recursion, so the
//! "exactly one fan-out" invariant is visible in the control flow.
//!
//! Era advancement checks a single threshold per level-up event. An XP
//! jump that crosses several era thresholds still advances one era; the
//! decision engine's evolve check catches the rest up on later ticks.

use aeon_core::{companion_name, era_min_level, era_name, PlayerState, SkillName, XpTable, ERA_COUNT};

use crate::response::XpDrop;

/// Fraction of every non-progression credit passed on to EVOLUTION.
const EVOLUTION_SHARE: f64 = 0.5;

/// Credits `amount` XP to `skill`, then fans half of it out to the
/// progression skill. Level-ups and era advances are applied as side
/// effects; every credit pushes an [`XpDrop`].
pub fn award_xp(player: &mut PlayerState, skill: SkillName, amount: f64, table: &XpTable, drops: &mut Vec<XpDrop>) {
    if amount <= 0.0 {
        return;
    }
    credit(player, skill, amount, table, drops);
    if skill != SkillName::Evolution {
        credit(player, SkillName::Evolution, amount * EVOLUTION_SHARE, table, drops);
    }
}

/// Applies one credit to one skill.
fn credit(player: &mut PlayerState, skill: SkillName, amount: f64, table: &XpTable, drops: &mut Vec<XpDrop>) {
    let entry = player.skills.get_mut(skill);
    entry.xp += amount;
    let new_level = table.level_for_xp(entry.xp);
    drops.push(XpDrop { skill, amount });

    if new_level <= entry.level {
        return;
    }
    entry.level = new_level;
    tracing::info!(player = %player.name, ?skill, level = new_level, "level up");

    if skill == SkillName::Hits {
        // The HITS level is the health pool.
        player.max_hp = u32::from(new_level);
        player.hp = player.hp.min(player.max_hp);
    }
    if skill == SkillName::Evolution {
        advance_era(player);
    }
}

/// Advances the era by one step when the progression skill qualifies.
///
/// Returns whether an advance happened. At most one step per call, even
/// when the current level clears several thresholds.
pub fn advance_era(player: &mut PlayerState) -> bool {
    if player.era + 1 >= ERA_COUNT {
        return false;
    }
    let next = player.era + 1;
    if player.skills.get(SkillName::Evolution).level < era_min_level(next) {
        return false;
    }
    player.era = next;
    player.skills.unlock_for_era(next);
    player.follower.name = companion_name(next).to_string();
    tracing::info!(player = %player.name, era = next, name = era_name(next), "era advance");
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh() -> (PlayerState, XpTable) {
        let table = XpTable::default();
        let player = PlayerState::new("Tess", false, &table);
        (player, table)
    }

    #[test]
    fn test_fan_out_is_exactly_half_once() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        award_xp(&mut player, SkillName::Woodcutting, 100.0, &table, &mut drops);

        assert!((player.skills.get(SkillName::Woodcutting).xp - 100.0).abs() < f64::EPSILON);
        assert!((player.skills.get(SkillName::Evolution).xp - 50.0).abs() < f64::EPSILON);
        assert_eq!(drops.len(), 2);
    }

    #[test]
    fn test_progression_credit_does_not_compound() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        award_xp(&mut player, SkillName::Evolution, 100.0, &table, &mut drops);
        assert!((player.skills.get(SkillName::Evolution).xp - 100.0).abs() < f64::EPSILON);
        assert_eq!(drops.len(), 1);
    }

    #[test]
    fn test_level_two_at_exact_threshold() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        let threshold = table.xp_for_level(2) as f64;
        award_xp(&mut player, SkillName::Mining, threshold, &table, &mut drops);
        assert_eq!(player.skills.get(SkillName::Mining).level, 2);
    }

    #[test]
    fn test_era_advances_single_step_per_update() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        // Enough EVOLUTION XP for level 25, which clears the thresholds of
        // eras 1 (level 10) and 2 (level 20) in one jump.
        let xp = table.xp_for_level(25) as f64;
        award_xp(&mut player, SkillName::Evolution, xp, &table, &mut drops);

        assert_eq!(player.skills.get(SkillName::Evolution).level, 25);
        assert_eq!(player.era, 1, "one era per update, not batched");

        // A later explicit check picks up the remaining threshold.
        assert!(advance_era(&mut player));
        assert_eq!(player.era, 2);
        assert!(!advance_era(&mut player));
    }

    #[test]
    fn test_era_unlocks_gated_skills() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        assert!(!player.skills.get(SkillName::Prayer).unlocked);
        let xp = table.xp_for_level(10) as f64;
        award_xp(&mut player, SkillName::Evolution, xp, &table, &mut drops);
        assert_eq!(player.era, 1);
        assert!(player.skills.get(SkillName::Prayer).unlocked);
    }

    #[test]
    fn test_hits_level_raises_health_pool() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        let xp = table.xp_for_level(20) as f64;
        award_xp(&mut player, SkillName::Hits, xp, &table, &mut drops);
        assert_eq!(player.max_hp, 20);
        assert!(player.hp <= player.max_hp);
    }

    #[test]
    fn test_zero_amount_is_inert() {
        let (mut player, table) = fresh();
        let mut drops = Vec::new();
        award_xp(&mut player, SkillName::Fishing, 0.0, &table, &mut drops);
        assert!(drops.is_empty());
        assert!(player.skills.get(SkillName::Evolution).xp.abs() < f64::EPSILON);
    }
}
