//! XP curve and level tracking.

use bevy::prelude::*;

pub const MAX_LEVEL: u32 = 99;

/// XP needed to go from `level - 1` to `level`.
///
/// Fast exponential start up to level 10, then linear steps of 60 up to 20,
/// then steps of 110.
pub fn required_xp(level: u32) -> u32 {
    match level {
        0 | 1 => 0,
        2 => 10,
        3..=10 => (10.0 * 1.6_f64.powi(level as i32 - 2)).floor() as u32,
        11..=20 => 320 + (level - 11) * 60,
        _ => 1145 + (level - 21) * 110,
    }
}

/// Level reached after collecting `total_xp` from level 1.
pub fn level_for_total_xp(total_xp: u32) -> u32 {
    let mut level = 1;
    let mut accumulated = 0;
    while level < MAX_LEVEL {
        let required = required_xp(level + 1);
        if accumulated + required > total_xp {
            break;
        }
        accumulated += required;
        level += 1;
    }
    level
}

#[derive(Resource, Debug, Clone, PartialEq)]
pub struct LevelSystem {
    pub level: u32,
    /// XP collected toward the next level.
    pub current_xp: u32,
    pub total_xp: u32,
}

impl Default for LevelSystem {
    fn default() -> Self {
        Self {
            level: 1,
            current_xp: 0,
            total_xp: 0,
        }
    }
}

impl LevelSystem {
    /// Add XP and apply every level-up it pays for.
    /// Returns the levels reached, in order. Ignored at the max level.
    pub fn gain_xp(&mut self, amount: u32) -> Vec<u32> {
        let mut reached = Vec::new();
        if self.level >= MAX_LEVEL || amount == 0 {
            return reached;
        }
        self.current_xp += amount;
        self.total_xp += amount;

        while self.level < MAX_LEVEL {
            let required = required_xp(self.level + 1);
            if self.current_xp < required {
                break;
            }
            self.current_xp -= required;
            self.level += 1;
            info!("Level up! Lv.{}", self.level);
            reached.push(self.level);
        }
        reached
    }

    /// XP needed for the next level; zero at the cap.
    pub fn required_for_next(&self) -> u32 {
        if self.level >= MAX_LEVEL {
            0
        } else {
            required_xp(self.level + 1)
        }
    }

    /// Progress toward the next level in `[0, 1]`.
    pub fn progress(&self) -> f32 {
        match self.required_for_next() {
            0 => 1.0,
            required => (self.current_xp as f32 / required as f32).min(1.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn curve_matches_each_band() {
        assert_eq!(required_xp(1), 0);
        assert_eq!(required_xp(2), 10);
        assert_eq!(required_xp(3), 16);
        assert_eq!(required_xp(10), 429);
        assert_eq!(required_xp(11), 320);
        assert_eq!(required_xp(20), 860);
        assert_eq!(required_xp(21), 1145);
        assert_eq!(required_xp(99), 9725);
    }

    #[test]
    fn overflow_carries_into_consecutive_level_ups() {
        let mut levels = LevelSystem::default();
        assert_eq!(levels.gain_xp(31), vec![2, 3]);
        assert_eq!(levels.level, 3);
        assert_eq!(levels.current_xp, 5);
        assert_eq!(levels.total_xp, 31);
    }

    #[test]
    fn partial_xp_does_not_level() {
        let mut levels = LevelSystem::default();
        assert!(levels.gain_xp(9).is_empty());
        assert!((levels.progress() - 0.9).abs() < 1e-6);
    }

    #[test]
    fn total_xp_maps_back_to_level() {
        assert_eq!(level_for_total_xp(0), 1);
        assert_eq!(level_for_total_xp(10), 2);
        assert_eq!(level_for_total_xp(25), 2);
        assert_eq!(level_for_total_xp(26), 3);
    }

    #[test]
    fn max_level_ignores_xp() {
        let mut levels = LevelSystem {
            level: MAX_LEVEL,
            ..default()
        };
        assert!(levels.gain_xp(1_000_000).is_empty());
        assert_eq!(levels.total_xp, 0);
        assert_eq!(levels.progress(), 1.0);
    }
}
