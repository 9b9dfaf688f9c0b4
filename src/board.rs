//! Game board representation and collision detection

use crate::piece::Piece;
use crate::tetromino::TetrominoType;

/// Standard board dimensions
pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

/// A cell on the board - either empty or tagged with the piece that locked there
pub type Cell = Option<TetrominoType>;

/// Result of writing a landed piece into the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockOutcome {
    Placed,
    /// Some block sat above the visible board
    TopOut,
}

/// The game board
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    /// Grid stored as [row][col], row 0 is the top
    cells: [[Cell; BOARD_WIDTH]; BOARD_HEIGHT],
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Create a new empty board
    pub fn new() -> Self {
        Self {
            cells: [[None; BOARD_WIDTH]; BOARD_HEIGHT],
        }
    }

    /// Get the cell at (row, col), None if out of bounds
    pub fn get(&self, row: i32, col: i32) -> Option<Cell> {
        if row < 0 || col < 0 {
            return None;
        }
        self.cells
            .get(row as usize)
            .and_then(|cells| cells.get(col as usize))
            .copied()
    }

    /// Set a cell, returns false if out of bounds
    pub fn set(&mut self, row: i32, col: i32, cell: Cell) -> bool {
        if row < 0 || col < 0 {
            return false;
        }
        match self
            .cells
            .get_mut(row as usize)
            .and_then(|cells| cells.get_mut(col as usize))
        {
            Some(slot) => {
                *slot = cell;
                true
            }
            None => false,
        }
    }

    /// Rows top to bottom
    pub fn rows(&self) -> &[[Cell; BOARD_WIDTH]; BOARD_HEIGHT] {
        &self.cells
    }

    /// Would `piece`, shifted by (d_row, d_col) and optionally re-rotated, overlap
    /// a wall, the floor or a filled cell? Rows above the board are never
    /// checked against the grid.
    pub fn collides(&self, piece: &Piece, d_row: i32, d_col: i32, rotation: Option<usize>) -> bool {
        let shape = piece.kind.shape(rotation.unwrap_or(piece.rotation));
        shape.blocks().any(|(r, c)| {
            let row = piece.row + r + d_row;
            let col = piece.col + c + d_col;
            if col < 0 || col >= BOARD_WIDTH as i32 || row >= BOARD_HEIGHT as i32 {
                return true;
            }
            row >= 0 && self.cells[row as usize][col as usize].is_some()
        })
    }

    /// Write a landed piece into the grid. Nothing is written if any block
    /// is above the visible board.
    pub fn lock(&mut self, piece: &Piece) -> LockOutcome {
        if piece.blocks().any(|(row, _)| row < 0) {
            return LockOutcome::TopOut;
        }
        for (row, col) in piece.blocks() {
            self.set(row, col, Some(piece.kind));
        }
        LockOutcome::Placed
    }

    /// Indices of completely filled rows, ascending
    pub fn full_rows(&self) -> Vec<usize> {
        (0..BOARD_HEIGHT)
            .filter(|&row| self.cells[row].iter().all(|cell| cell.is_some()))
            .collect()
    }

    /// Remove the given rows and drop everything above them, filling the top
    /// with empty rows
    pub fn remove_rows(&mut self, rows: &[usize]) {
        let mut write_row = BOARD_HEIGHT;
        for read_row in (0..BOARD_HEIGHT).rev() {
            if rows.contains(&read_row) {
                continue;
            }
            write_row -= 1;
            if write_row != read_row {
                self.cells[write_row] = self.cells[read_row];
            }
        }
        for row in 0..write_row {
            self.cells[row] = [None; BOARD_WIDTH];
        }
    }

    /// Check if the board is completely empty
    pub fn is_empty(&self) -> bool {
        self.cells
            .iter()
            .all(|row| row.iter().all(|cell| cell.is_none()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill_row(board: &mut Board, row: i32, kind: TetrominoType) {
        for col in 0..BOARD_WIDTH as i32 {
            board.set(row, col, Some(kind));
        }
    }

    #[test]
    fn test_new_board_is_empty() {
        assert!(Board::new().is_empty());
    }

    #[test]
    fn test_set_and_get() {
        let mut board = Board::new();
        assert!(board.set(5, 5, Some(TetrominoType::Z)));
        assert_eq!(board.get(5, 5), Some(Some(TetrominoType::Z)));
    }

    #[test]
    fn test_out_of_bounds() {
        let mut board = Board::new();
        assert_eq!(board.get(-1, 0), None);
        assert_eq!(board.get(0, -1), None);
        assert_eq!(board.get(BOARD_HEIGHT as i32, 0), None);
        assert_eq!(board.get(0, BOARD_WIDTH as i32), None);
        assert!(!board.set(0, BOARD_WIDTH as i32, Some(TetrominoType::I)));
    }

    #[test]
    fn test_collides_with_walls_and_floor() {
        let board = Board::new();
        let piece = Piece::spawn(TetrominoType::O);
        assert!(!board.collides(&piece, 0, 0, None));
        // O occupies matrix columns 1..=2, spawned at column 3
        assert!(board.collides(&piece, 0, -5, None));
        assert!(!board.collides(&piece, 0, -4, None));
        assert!(!board.collides(&piece, 0, 4, None));
        assert!(board.collides(&piece, 0, 5, None));
        assert!(board.collides(&piece, 19, 0, None));
        assert!(!board.collides(&piece, 18, 0, None));
    }

    #[test]
    fn test_rows_above_board_ignore_grid() {
        let mut board = Board::new();
        fill_row(&mut board, 0, TetrominoType::J);
        let piece = Piece::spawn(TetrominoType::O);
        // shifted up: blocks at rows -2 and -1 never touch the grid
        assert!(!board.collides(&piece, -2, 0, None));
        assert!(board.collides(&piece, -1, 0, None));
    }

    #[test]
    fn test_rotation_override() {
        let board = Board::new();
        let mut piece = Piece::spawn(TetrominoType::I);
        piece.col = -1;
        // vertical state 3 uses matrix column 1 only
        assert!(board.collides(&piece, 0, 0, None));
        assert!(!board.collides(&piece, 0, 0, Some(3)));
    }

    #[test]
    fn test_lock_writes_type_tags() {
        let mut board = Board::new();
        let mut piece = Piece::spawn(TetrominoType::T);
        piece.row = 18;
        assert_eq!(board.lock(&piece), LockOutcome::Placed);
        assert_eq!(board.get(18, 4), Some(Some(TetrominoType::T)));
        assert_eq!(board.get(19, 3), Some(Some(TetrominoType::T)));
    }

    #[test]
    fn test_lock_above_board_tops_out() {
        let mut board = Board::new();
        let mut piece = Piece::spawn(TetrominoType::I);
        // state 0 fills matrix row 1
        piece.row = -2;
        assert_eq!(board.lock(&piece), LockOutcome::TopOut);
        assert!(board.is_empty());
    }

    #[test]
    fn test_clear_single_line() {
        let mut board = Board::new();
        fill_row(&mut board, 19, TetrominoType::I);
        board.set(18, 0, Some(TetrominoType::Z));
        board.set(17, 3, Some(TetrominoType::S));

        let full = board.full_rows();
        assert_eq!(full, vec![19]);
        board.remove_rows(&full);

        assert_eq!(board.get(19, 0), Some(Some(TetrominoType::Z)));
        assert_eq!(board.get(18, 3), Some(Some(TetrominoType::S)));
        assert_eq!(board.get(18, 0), Some(None));
        assert!(board.rows()[0].iter().all(|cell| cell.is_none()));
    }

    #[test]
    fn test_clear_non_adjacent_lines() {
        let mut board = Board::new();
        fill_row(&mut board, 19, TetrominoType::I);
        board.set(18, 1, Some(TetrominoType::L));
        fill_row(&mut board, 17, TetrominoType::I);
        board.set(16, 2, Some(TetrominoType::J));

        let full = board.full_rows();
        assert_eq!(full, vec![17, 19]);
        board.remove_rows(&full);

        assert_eq!(board.get(19, 1), Some(Some(TetrominoType::L)));
        assert_eq!(board.get(18, 2), Some(Some(TetrominoType::J)));
        assert!(board.full_rows().is_empty());
    }
}
