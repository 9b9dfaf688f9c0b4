//! Tetromino definitions and shapes
//!
//! Every piece type owns a table of occupancy matrices, one per distinct
//! rotation state. Matrix row 0 is the top row, matching board rows.

use ratatui::style::Color;

/// The 7 tetromino types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoType {
    I, // Cyan - long bar
    O, // Yellow - square
    T, // Purple - T-shape
    S, // Green - S-shape
    Z, // Red - Z-shape
    J, // Blue - J-shape
    L, // Orange - L-shape
}

type Matrix = [[u8; 4]; 4];

const I_STATES: [Matrix; 4] = [
    [[0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0], [0, 0, 1, 0]],
    [[0, 0, 0, 0], [0, 0, 0, 0], [1, 1, 1, 1], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0]],
];

const O_STATES: [Matrix; 1] = [[[0, 1, 1, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]]];

// 3x3 pieces live in the top-left corner of the 4x4 matrix
const T_STATES: [Matrix; 4] = [
    [[0, 1, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
];

const S_STATES: [Matrix; 4] = [
    [[0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [0, 1, 1, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
    [[1, 0, 0, 0], [1, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
];

const Z_STATES: [Matrix; 4] = [
    [[1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 1, 0], [0, 1, 1, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [1, 1, 0, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
];

const J_STATES: [Matrix; 4] = [
    [[1, 0, 0, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 1, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 1, 0], [0, 0, 1, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 0, 0], [1, 1, 0, 0], [0, 0, 0, 0]],
];

const L_STATES: [Matrix; 4] = [
    [[0, 0, 1, 0], [1, 1, 1, 0], [0, 0, 0, 0], [0, 0, 0, 0]],
    [[0, 1, 0, 0], [0, 1, 0, 0], [0, 1, 1, 0], [0, 0, 0, 0]],
    [[0, 0, 0, 0], [1, 1, 1, 0], [1, 0, 0, 0], [0, 0, 0, 0]],
    [[1, 1, 0, 0], [0, 1, 0, 0], [0, 1, 0, 0], [0, 0, 0, 0]],
];

impl TetrominoType {
    /// Get the color for this tetromino
    pub fn color(&self) -> Color {
        match self {
            TetrominoType::I => Color::Rgb(0, 245, 255),
            TetrominoType::O => Color::Rgb(255, 215, 0),
            TetrominoType::T => Color::Rgb(191, 95, 255),
            TetrominoType::S => Color::Rgb(57, 255, 20),
            TetrominoType::Z => Color::Rgb(255, 49, 49),
            TetrominoType::J => Color::Rgb(30, 144, 255),
            TetrominoType::L => Color::Rgb(255, 140, 0),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            TetrominoType::I => "I",
            TetrominoType::O => "O",
            TetrominoType::T => "T",
            TetrominoType::S => "S",
            TetrominoType::Z => "Z",
            TetrominoType::J => "J",
            TetrominoType::L => "L",
        }
    }

    /// Get all tetromino types for bag randomization
    pub fn all() -> [TetrominoType; 7] {
        [
            TetrominoType::I,
            TetrominoType::O,
            TetrominoType::T,
            TetrominoType::S,
            TetrominoType::Z,
            TetrominoType::J,
            TetrominoType::L,
        ]
    }

    fn states(&self) -> &'static [Matrix] {
        match self {
            TetrominoType::I => &I_STATES,
            TetrominoType::O => &O_STATES,
            TetrominoType::T => &T_STATES,
            TetrominoType::S => &S_STATES,
            TetrominoType::Z => &Z_STATES,
            TetrominoType::J => &J_STATES,
            TetrominoType::L => &L_STATES,
        }
    }

    /// Number of distinct rotation states (1 for O, 4 for everything else)
    pub fn rotation_states(&self) -> usize {
        self.states().len()
    }

    /// Side length of the bounding matrix
    pub fn matrix_size(&self) -> usize {
        match self {
            TetrominoType::I | TetrominoType::O => 4,
            _ => 3,
        }
    }

    /// Occupancy matrix for a rotation index, reduced modulo the state count
    pub fn shape(&self, rotation: usize) -> Shape {
        let states = self.states();
        Shape {
            size: self.matrix_size(),
            cells: states[rotation % states.len()],
        }
    }
}

/// Direction for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// A resolved occupancy matrix (3x3 or 4x4)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shape {
    size: usize,
    cells: Matrix,
}

impl Shape {
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.size && col < self.size && self.cells[row][col] != 0
    }

    /// Occupied (row, col) offsets, top to bottom, left to right
    pub fn blocks(self) -> impl Iterator<Item = (i32, i32)> {
        let Shape { size, cells } = self;
        (0..size).flat_map(move |row| {
            (0..size)
                .filter(move |&col| cells[row][col] != 0)
                .map(move |col| (row as i32, col as i32))
        })
    }
}
