//! Scoring, combo and level progression

use std::time::Duration;

/// Base points per line count, multiplied by the level
pub const LINE_SCORES: [u64; 5] = [0, 100, 300, 500, 800];
/// Per-combo-step bonus, multiplied by combo and level
pub const COMBO_BONUS: u64 = 50;
pub const LINES_PER_LEVEL: u32 = 10;

/// Points awarded for one clearing lock
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClearAward {
    pub lines: u8,
    pub base: u64,
    /// Zero unless this lock continued a combo
    pub combo_bonus: u64,
    /// Combo counter value the bonus was computed from
    pub combo: u32,
    pub leveled_up: bool,
}

impl ClearAward {
    pub fn total(&self) -> u64 {
        self.base + self.combo_bonus
    }
}

/// Scoring calculation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Score {
    /// Current score
    pub points: u64,
    /// Current level, always lines / 10 + 1
    pub level: u32,
    /// Total lines cleared
    pub lines: u32,
    /// Consecutive clearing locks since the last non-clearing lock
    pub combo: u32,
}

impl Default for Score {
    fn default() -> Self {
        Self::new()
    }
}

impl Score {
    pub fn new() -> Self {
        Self {
            points: 0,
            level: 1,
            lines: 0,
            combo: 0,
        }
    }

    /// Award a clear of `count` rows (1..=4) at the current level
    pub fn award_clear(&mut self, count: u8) -> ClearAward {
        let base = LINE_SCORES[usize::from(count.min(4))] * u64::from(self.level);
        let combo = self.combo;
        let combo_bonus = if combo > 0 {
            COMBO_BONUS * u64::from(combo) * u64::from(self.level)
        } else {
            0
        };

        self.points += base + combo_bonus;
        self.combo += 1;
        self.lines += u32::from(count);

        let previous_level = self.level;
        self.level = self.lines / LINES_PER_LEVEL + 1;

        ClearAward {
            lines: count,
            base,
            combo_bonus,
            combo,
            leveled_up: self.level > previous_level,
        }
    }

    /// Reset combo (called when piece locks without clearing lines)
    pub fn reset_combo(&mut self) {
        self.combo = 0;
    }

    /// Add score for soft drop (1 point per cell)
    pub fn add_soft_drop(&mut self, cells: u32) {
        self.points += u64::from(cells);
    }

    /// Add score for hard drop (2 points per cell)
    pub fn add_hard_drop(&mut self, cells: u32) {
        self.points += u64::from(cells) * 2;
    }

    /// Gravity interval for the current level
    pub fn drop_interval(&self) -> Duration {
        drop_interval(self.level)
    }
}

/// `max(80, 1000 - (level - 1) * 90)` milliseconds
pub fn drop_interval(level: u32) -> Duration {
    let slowdown = u64::from(level.saturating_sub(1)) * 90;
    Duration::from_millis(1000u64.saturating_sub(slowdown).max(80))
}
