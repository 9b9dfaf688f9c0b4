//! Wall kick data
//!
//! When a rotation would collide, these horizontal offsets are tried in
//! order. The first entry is always zero (rotate in place).

use crate::tetromino::RotationDirection;

const CLOCKWISE_KICKS: [i32; 5] = [0, -1, 1, -2, 2];
const COUNTER_CLOCKWISE_KICKS: [i32; 5] = [0, 1, -1, 2, -2];

/// Column offsets to try for a rotation in `direction`
pub fn wall_kicks(direction: RotationDirection) -> &'static [i32; 5] {
    match direction {
        RotationDirection::Clockwise => &CLOCKWISE_KICKS,
        RotationDirection::CounterClockwise => &COUNTER_CLOCKWISE_KICKS,
    }
}
