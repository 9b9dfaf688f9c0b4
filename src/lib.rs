//! NEONTRIS - a falling-block puzzle engine
//!
//! The engine ([`game::Game`]) is plain state driven by commands and a
//! per-frame tick. Rendering, sound and high-score storage sit behind it:
//! the engine hands out a [`game::GameView`] snapshot, queues
//! [`game::GameEvent`]s, and talks to a [`storage::HighScoreStore`].

pub mod audio;
pub mod bag;
pub mod board;
pub mod game;
pub mod input;
pub mod kicks;
pub mod lock_delay;
pub mod piece;
pub mod score;
pub mod settings;
pub mod storage;
pub mod tetromino;
pub mod ui;

pub use board::{BOARD_HEIGHT, BOARD_WIDTH, Board, Cell};
pub use game::{Command, Game, GameConfig, GameEvent, GameView, Phase, Sound};
pub use piece::Piece;
pub use storage::{FileStore, HighScoreStore, MemoryStore};
pub use tetromino::TetrominoType;
