//! Lock delay: the grace period a resting piece gets before it is fixed
//! to the board.
//!
//! Successful moves and rotations while locking restore the full delay, but
//! only [`MAX_LOCK_RESETS`] times per piece. Lifting off and touching down
//! again on a row the piece has already rested on counts as a restore too.
//! Once the budget is spent the timer keeps running no matter what the
//! player does, airborne or not, so every piece eventually locks. Only a
//! landing deeper than any before it starts a fresh delay.

use std::time::Duration;

/// Time a resting piece waits before locking
pub const LOCK_DELAY: Duration = Duration::from_millis(500);
/// Timer restores allowed per piece
pub const MAX_LOCK_RESETS: u8 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Airborne,
    Locking { remaining: Duration },
}

/// What the lock timer says after a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockStatus {
    Airborne,
    Locking,
    /// Timer ran out: lock the piece now
    Expired,
}

#[derive(Debug, Clone)]
pub struct LockDelay {
    phase: Phase,
    resets: u8,
    /// Deepest row the piece has rested on
    floor: Option<i32>,
    /// Timer left over from the last lift-off
    saved: Duration,
}

impl Default for LockDelay {
    fn default() -> Self {
        Self::new()
    }
}

impl LockDelay {
    pub fn new() -> Self {
        Self {
            phase: Phase::Airborne,
            resets: 0,
            floor: None,
            saved: LOCK_DELAY,
        }
    }

    /// Advance by one frame. `resting` is whether the cell below the piece is
    /// blocked this frame, `row` is the piece's current row.
    pub fn update(&mut self, resting: bool, row: i32, dt: Duration) -> LockStatus {
        if !resting {
            self.lift_off();
            if self.spent() {
                self.saved = self.saved.saturating_sub(dt);
            }
            return LockStatus::Airborne;
        }

        let remaining = match self.phase {
            Phase::Airborne => self.touch_down(row),
            Phase::Locking { remaining } => remaining,
        };
        let remaining = remaining.saturating_sub(dt);
        self.phase = Phase::Locking { remaining };

        if remaining.is_zero() {
            LockStatus::Expired
        } else {
            LockStatus::Locking
        }
    }

    /// Timer for a piece landing on `row`
    fn touch_down(&mut self, row: i32) -> Duration {
        match self.floor {
            Some(floor) if row <= floor => {
                if self.spent() {
                    self.saved
                } else {
                    self.resets += 1;
                    LOCK_DELAY
                }
            }
            _ => {
                self.floor = Some(row);
                LOCK_DELAY
            }
        }
    }

    fn lift_off(&mut self) {
        if let Phase::Locking { remaining } = self.phase {
            self.saved = remaining;
        }
        self.phase = Phase::Airborne;
    }

    fn spent(&self) -> bool {
        self.resets >= MAX_LOCK_RESETS
    }

    /// A move or rotation went through. Returns true if the timer was restored.
    pub fn on_successful_move(&mut self) -> bool {
        match self.phase {
            Phase::Locking { .. } if !self.spent() => {
                self.phase = Phase::Locking { remaining: LOCK_DELAY };
                self.resets += 1;
                true
            }
            _ => false,
        }
    }

    /// Drop any running timer, keeping the reset count
    pub fn cancel(&mut self) {
        self.lift_off();
    }

    /// Fresh piece: no timer and a full reset budget
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn is_locking(&self) -> bool {
        matches!(self.phase, Phase::Locking { .. })
    }

    pub fn resets_used(&self) -> u8 {
        self.resets
    }

    /// Fraction of the delay still left (1.0 when airborne)
    pub fn progress(&self) -> f32 {
        match self.phase {
            Phase::Airborne => 1.0,
            Phase::Locking { remaining } => remaining.as_secs_f32() / LOCK_DELAY.as_secs_f32(),
        }
    }
}
