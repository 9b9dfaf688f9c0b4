//! 7-bag randomizer for piece generation
//!
//! All 7 pieces are shuffled into a bag and dealt from the back before the
//! bag is refilled. Each aligned run of 7 draws is a permutation of all types.

use crate::tetromino::TetrominoType;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// The 7-bag piece randomizer
#[derive(Debug, Clone)]
pub struct Bag {
    pieces: Vec<TetrominoType>,
    rng: ChaCha8Rng,
}

impl Default for Bag {
    fn default() -> Self {
        Self::new()
    }
}

impl Bag {
    /// Create an empty bag seeded from OS entropy
    pub fn new() -> Self {
        Self::with_seed(rand::random())
    }

    /// Create an empty bag with a fixed seed (reproducible sequences)
    pub fn with_seed(seed: u64) -> Self {
        Self {
            pieces: Vec::with_capacity(7),
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Draw the next piece, refilling first if the bag is empty
    pub fn draw(&mut self) -> TetrominoType {
        loop {
            if let Some(piece) = self.pieces.pop() {
                return piece;
            }
            self.refill();
        }
    }

    /// Pieces left before the next refill
    pub fn remaining(&self) -> usize {
        self.pieces.len()
    }

    /// Replace the contents with a freshly shuffled full set (Fisher-Yates)
    pub fn refill(&mut self) {
        self.pieces.clear();
        self.pieces.extend(TetrominoType::all());
        for i in (1..self.pieces.len()).rev() {
            let j = self.rng.gen_range(0..=i);
            self.pieces.swap(i, j);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_bag_contains_all_pieces() {
        let mut bag = Bag::with_seed(7);
        let pieces: HashSet<_> = (0..7).map(|_| bag.draw()).collect();
        assert_eq!(pieces.len(), 7);
        assert_eq!(bag.remaining(), 0);
    }

    #[test]
    fn test_refill_only_when_empty() {
        let mut bag = Bag::with_seed(1);
        bag.draw();
        assert_eq!(bag.remaining(), 6);
        for _ in 0..6 {
            bag.draw();
        }
        assert_eq!(bag.remaining(), 0);
        bag.draw();
        assert_eq!(bag.remaining(), 6);
    }

    #[test]
    fn test_same_seed_same_sequence() {
        let mut a = Bag::with_seed(42);
        let mut b = Bag::with_seed(42);
        for _ in 0..50 {
            assert_eq!(a.draw(), b.draw());
        }
    }

    #[test]
    fn test_no_more_than_two_in_a_row() {
        let mut bag = Bag::with_seed(99);
        let seq: Vec<_> = (0..700).map(|_| bag.draw()).collect();
        for window in seq.windows(3) {
            assert!(!(window[0] == window[1] && window[1] == window[2]));
        }
    }
}
