//! Active falling piece logic

use crate::board::{Board, BOARD_WIDTH};
use crate::kicks::wall_kicks;
use crate::tetromino::{RotationDirection, Shape, TetrominoType};

/// Column where every piece's matrix origin spawns (horizontally centered)
pub const SPAWN_COL: i32 = BOARD_WIDTH as i32 / 2 - 2;
pub const SPAWN_ROW: i32 = 0;

/// An active falling piece
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Piece {
    /// The type of tetromino
    pub kind: TetrominoType,
    /// Rotation state index, always below `kind.rotation_states()`
    pub rotation: usize,
    /// Board row of the matrix's top-left corner, grows downward
    pub row: i32,
    /// Board column of the matrix's top-left corner
    pub col: i32,
}

impl Piece {
    /// Create a new piece at the spawn position in rotation 0
    pub fn spawn(kind: TetrominoType) -> Self {
        Self {
            kind,
            rotation: 0,
            row: SPAWN_ROW,
            col: SPAWN_COL,
        }
    }

    pub fn shape(&self) -> Shape {
        self.kind.shape(self.rotation)
    }

    /// Absolute board positions (row, col) of all 4 blocks
    pub fn blocks(self) -> impl Iterator<Item = (i32, i32)> {
        let (row, col) = (self.row, self.col);
        self.shape().blocks().map(move |(r, c)| (row + r, col + c))
    }

    /// Is the cell directly below any block occupied (or the floor)?
    pub fn is_resting(&self, board: &Board) -> bool {
        board.collides(self, 1, 0, None)
    }

    /// Try to move by (d_row, d_col), returns true if successful
    pub fn try_shift(&mut self, board: &Board, d_row: i32, d_col: i32) -> bool {
        if board.collides(self, d_row, d_col, None) {
            return false;
        }
        self.row += d_row;
        self.col += d_col;
        true
    }

    /// Try to rotate, testing each horizontal wall kick in turn
    pub fn rotate(&mut self, direction: RotationDirection, board: &Board) -> bool {
        let states = self.kind.rotation_states();
        let new_rotation = match direction {
            RotationDirection::Clockwise => (self.rotation + 1) % states,
            RotationDirection::CounterClockwise => (self.rotation + states - 1) % states,
        };

        let Some(&kick) = wall_kicks(direction)
            .iter()
            .find(|&&kick| !board.collides(self, 0, kick, Some(new_rotation)))
        else {
            return false;
        };

        self.col += kick;
        self.rotation = new_rotation;
        true
    }

    /// Row the piece would land on if hard-dropped
    pub fn ghost_row(&self, board: &Board) -> i32 {
        let mut distance = 0;
        while !board.collides(self, distance + 1, 0, None) {
            distance += 1;
        }
        self.row + distance
    }

    /// Hard drop - move down as far as possible and return distance dropped
    pub fn hard_drop(&mut self, board: &Board) -> i32 {
        let landing = self.ghost_row(board);
        let distance = landing - self.row;
        self.row = landing;
        distance
    }
}
