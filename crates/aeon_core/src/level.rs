//! # XP Table and Level Resolution
//!
//! Levels are never stored authoritatively; they are recomputed from XP
//! through one immutable threshold table built at startup.

use serde::{Deserialize, Serialize};

/// Highest attainable skill level.
pub const MAX_LEVEL: u8 = 120;

/// Monotone XP thresholds, one entry per level.
///
/// `thresholds[n]` is the minimum XP for level `n`. Built once from the
/// closed-form curve and immutable afterwards.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct XpTable {
    thresholds: Vec<u64>,
}

impl XpTable {
    /// Builds the table up to `max_level`.
    ///
    /// The curve: each level contributes `floor(level + 300 * 2^(level/7))`
    /// points, and the threshold is the running point total divided by 4.
    #[must_use]
    pub fn new(max_level: u8) -> Self {
        let mut thresholds = vec![0u64; usize::from(max_level) + 1];
        let mut points: u64 = 0;
        for level in 1..=usize::from(max_level) {
            let contribution = (level as f64 + 300.0 * 2f64.powf(level as f64 / 7.0)).floor() as u64;
            points += contribution;
            thresholds[level] = points / 4;
        }
        Self { thresholds }
    }

    /// The minimum XP for `level`. Levels past the table end clamp to the
    /// final threshold.
    #[must_use]
    pub fn xp_for_level(&self, level: u8) -> u64 {
        let idx = usize::from(level).min(self.thresholds.len() - 1);
        self.thresholds[idx]
    }

    /// The highest level whose threshold is at or below `xp`.
    ///
    /// Total over all `xp >= 0`: negative or sub-threshold values resolve to
    /// level 1, values past the final threshold to the table maximum.
    #[must_use]
    pub fn level_for_xp(&self, xp: f64) -> u8 {
        let max = self.thresholds.len() - 1;
        for level in 1..max {
            if xp < self.thresholds[level + 1] as f64 {
                return level as u8;
            }
        }
        max as u8
    }

    /// The table's maximum level.
    #[must_use]
    pub fn max_level(&self) -> u8 {
        (self.thresholds.len() - 1) as u8
    }
}

impl Default for XpTable {
    fn default() -> Self {
        Self::new(MAX_LEVEL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_thresholds_monotone() {
        let table = XpTable::new(MAX_LEVEL);
        for level in 1..=MAX_LEVEL {
            assert!(
                table.xp_for_level(level) > table.xp_for_level(level - 1) || level == 1,
                "threshold not increasing at level {level}"
            );
        }
    }

    #[test]
    fn test_level_for_xp_non_decreasing_and_total() {
        let table = XpTable::new(MAX_LEVEL);
        let mut last = 0;
        for xp in (0..2_000_000u64).step_by(1_337) {
            let level = table.level_for_xp(xp as f64);
            assert!(level >= last);
            assert!(level >= 1 && level <= MAX_LEVEL);
            last = level;
        }
    }

    #[test]
    fn test_exact_threshold_resolves_to_that_level() {
        let table = XpTable::new(MAX_LEVEL);
        let threshold = table.xp_for_level(2);
        assert_eq!(table.level_for_xp(threshold as f64), 2);
        assert_eq!(table.level_for_xp(threshold as f64 - 1.0), 1);
    }

    #[test]
    fn test_zero_xp_is_level_one() {
        let table = XpTable::new(MAX_LEVEL);
        assert_eq!(table.level_for_xp(0.0), 1);
    }

    #[test]
    fn test_huge_xp_clamps_to_max() {
        let table = XpTable::new(MAX_LEVEL);
        assert_eq!(table.level_for_xp(1e12), MAX_LEVEL);
    }

    #[test]
    fn test_stable_under_repeated_calls() {
        let table = XpTable::new(MAX_LEVEL);
        let xp = 83_014.0;
        let first = table.level_for_xp(xp);
        for _ in 0..10 {
            assert_eq!(table.level_for_xp(xp), first);
        }
    }
}
