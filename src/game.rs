//! Core game state and logic
//!
//! [`Game`] owns one session: board, active/next/hold pieces, the bag, score
//! and the run phase. It is driven from outside through exactly two entry
//! points: [`Game::apply`] for player commands and [`Game::tick`] once per
//! frame. Nothing in here schedules itself, so the clear animation hands
//! control back to gravity on the one tick that finishes it.

use crate::bag::Bag;
use crate::board::{Board, LockOutcome};
use crate::lock_delay::{LockDelay, LockStatus};
use crate::piece::Piece;
use crate::score::Score;
use crate::storage::HighScoreStore;
use crate::tetromino::{RotationDirection, TetrominoType};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, trace, warn};

/// Frames the line-clear flash runs before rows are removed
pub const CLEAR_ANIM_FRAMES: u8 = 8;
/// Frames a floating notification stays on screen
pub const NOTIFICATION_FRAMES: u32 = 90;

/// What a soft drop does when the piece is already resting
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoftDropPolicy {
    /// Lock immediately
    #[default]
    LockOnContact,
    /// Ignore the command and let the lock delay decide
    DeferToLockDelay,
}

/// Session rules
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub soft_drop: SoftDropPolicy,
    /// Fixed bag seed; every (re)start replays the same piece sequence
    pub seed: Option<u64>,
}

/// Inbound player commands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Start,
    MoveLeft,
    MoveRight,
    SoftDrop,
    HardDrop,
    RotateCW,
    RotateCCW,
    Hold,
    TogglePause,
    Restart,
    ToggleMute,
    /// 0-100, larger values are clamped
    SetVolume(u8),
}

/// Sounds the front-end should play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sound {
    Move,
    Rotate,
    Lock,
    HardDrop,
    LineClear(u8),
    LevelUp,
    Hold,
    GameOver,
}

/// Outbound notifications, drained by the front-end each frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    Sound(Sound),
    MuteChanged(bool),
    VolumeChanged(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Combo,
    Double,
    Triple,
    Tetris,
}

/// Floating text shown over the board for a while
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub text: String,
    pub frames_left: u32,
}

impl Notification {
    /// Fraction of the lifetime left, 1.0 when fresh
    pub fn life(&self) -> f32 {
        self.frames_left as f32 / NOTIFICATION_FRAMES as f32
    }
}

/// Line-clear flash in progress
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearAnimation {
    rows: Vec<usize>,
    frame: u8,
}

impl ClearAnimation {
    fn new(rows: Vec<usize>) -> Self {
        Self { rows, frame: 0 }
    }

    /// Rows being cleared, ascending
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn frame(&self) -> u8 {
        self.frame
    }

    /// Highlight strength: ramps up to the midpoint, then back down
    pub fn flash_alpha(&self) -> f32 {
        let t = f32::from(self.frame) / f32::from(CLEAR_ANIM_FRAMES);
        if t < 0.5 { t * 2.0 } else { (1.0 - t) * 2.0 }
    }

    /// Returns true once the last frame has been shown
    fn advance(&mut self) -> bool {
        self.frame += 1;
        self.frame >= CLEAR_ANIM_FRAMES
    }
}

/// Session run phase
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Running,
    /// Running, but gravity and input wait for the clear flash
    Clearing(ClearAnimation),
    Paused,
    GameOver,
}

impl Phase {
    /// Is `command` meaningful in this phase? Everything else is dropped.
    pub fn accepts(&self, command: Command) -> bool {
        match command {
            Command::Restart | Command::ToggleMute | Command::SetVolume(_) => true,
            Command::Start => matches!(self, Phase::Idle | Phase::GameOver),
            Command::TogglePause => matches!(self, Phase::Running | Phase::Paused),
            Command::MoveLeft
            | Command::MoveRight
            | Command::SoftDrop
            | Command::HardDrop
            | Command::RotateCW
            | Command::RotateCCW
            | Command::Hold => matches!(self, Phase::Running),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Running => "running",
            Phase::Clearing(_) => "clearing",
            Phase::Paused => "paused",
            Phase::GameOver => "game over",
        }
    }
}

/// Everything a renderer needs for one frame
#[derive(Debug, Clone, Copy)]
pub struct GameView<'a> {
    pub phase: &'a Phase,
    pub board: &'a Board,
    pub active: Option<Piece>,
    /// Row the active piece would land on
    pub ghost_row: Option<i32>,
    pub hold: Option<TetrominoType>,
    /// Hold already spent for the current piece
    pub hold_used: bool,
    pub next: Option<TetrominoType>,
    pub notifications: &'a [Notification],
    pub score: &'a Score,
    pub high_score: u64,
    /// Active piece opacity, fades while the lock timer runs
    pub active_alpha: f32,
    pub muted: bool,
    pub volume: u8,
}

/// The main game struct
pub struct Game {
    config: GameConfig,
    store: Box<dyn HighScoreStore>,
    board: Board,
    /// Current falling piece
    current: Option<Piece>,
    next: Option<TetrominoType>,
    /// Held piece (can swap once per piece)
    hold: Option<TetrominoType>,
    /// Whether hold has been used this piece
    hold_used: bool,
    bag: Bag,
    score: Score,
    high_score: u64,
    phase: Phase,
    /// Time accumulated towards the next gravity step
    gravity: Duration,
    lock_delay: LockDelay,
    notifications: Vec<Notification>,
    events: Vec<GameEvent>,
    muted: bool,
    volume: u8,
}

impl Game {
    /// Create an idle session; the high score is read from `store`
    pub fn new(config: GameConfig, store: Box<dyn HighScoreStore>) -> Self {
        let bag = match config.seed {
            Some(seed) => Bag::with_seed(seed),
            None => Bag::new(),
        };
        let mut game = Self {
            config,
            store,
            board: Board::new(),
            current: None,
            next: None,
            hold: None,
            hold_used: false,
            bag,
            score: Score::new(),
            high_score: 0,
            phase: Phase::Idle,
            gravity: Duration::ZERO,
            lock_delay: LockDelay::new(),
            notifications: Vec::new(),
            events: Vec::new(),
            muted: false,
            volume: 50,
        };
        game.reload_high_score();
        game
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current(&self) -> Option<&Piece> {
        self.current.as_ref()
    }

    pub fn next(&self) -> Option<TetrominoType> {
        self.next
    }

    pub fn hold(&self) -> Option<TetrominoType> {
        self.hold
    }

    pub fn hold_used(&self) -> bool {
        self.hold_used
    }

    pub fn score(&self) -> &Score {
        &self.score
    }

    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    pub fn notifications(&self) -> &[Notification] {
        &self.notifications
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn muted(&self) -> bool {
        self.muted
    }

    pub fn volume(&self) -> u8 {
        self.volume
    }

    /// Seed the audio state, e.g. from saved settings
    pub fn set_audio(&mut self, muted: bool, volume: u8) {
        self.muted = muted;
        self.volume = volume.min(100);
    }

    /// Take every event produced since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn view(&self) -> GameView<'_> {
        GameView {
            phase: &self.phase,
            board: &self.board,
            active: self.current,
            ghost_row: self.current.map(|piece| piece.ghost_row(&self.board)),
            hold: self.hold,
            hold_used: self.hold_used,
            next: self.next,
            notifications: &self.notifications,
            score: &self.score,
            high_score: self.high_score,
            active_alpha: 0.6 + 0.4 * self.lock_delay.progress(),
            muted: self.muted,
            volume: self.volume,
        }
    }

    /// Process a command. Returns false if the current phase ignores it.
    pub fn apply(&mut self, command: Command) -> bool {
        if !self.phase.accepts(command) {
            trace!(?command, phase = self.phase.name(), "command ignored");
            return false;
        }

        match command {
            Command::Start | Command::Restart => self.start(),
            Command::MoveLeft => self.shift(-1),
            Command::MoveRight => self.shift(1),
            Command::SoftDrop => self.soft_drop(),
            Command::HardDrop => self.hard_drop(),
            Command::RotateCW => self.rotate(RotationDirection::Clockwise),
            Command::RotateCCW => self.rotate(RotationDirection::CounterClockwise),
            Command::Hold => self.hold_piece(),
            Command::TogglePause => self.toggle_pause(),
            Command::ToggleMute => {
                self.muted = !self.muted;
                self.events.push(GameEvent::MuteChanged(self.muted));
            }
            Command::SetVolume(volume) => {
                self.volume = volume.min(100);
                self.events.push(GameEvent::VolumeChanged(self.volume));
            }
        }
        true
    }

    /// Advance one frame of `dt`
    pub fn tick(&mut self, dt: Duration) {
        if self.phase != Phase::Paused {
            self.age_notifications();
        }

        match self.phase {
            Phase::Running => self.step(dt),
            Phase::Clearing(ref mut animation) => {
                if animation.advance() {
                    let rows = std::mem::take(&mut animation.rows);
                    self.finish_clear(&rows);
                }
            }
            Phase::Idle | Phase::Paused | Phase::GameOver => {}
        }
    }

    /// Reset everything and enter Running with a fresh piece
    fn start(&mut self) {
        self.board = Board::new();
        self.score = Score::new();
        self.hold = None;
        self.hold_used = false;
        self.notifications.clear();
        self.lock_delay.reset();
        self.gravity = Duration::ZERO;
        self.bag = match self.config.seed {
            Some(seed) => Bag::with_seed(seed),
            None => Bag::new(),
        };
        self.reload_high_score();

        let first = self.bag.draw();
        self.next = Some(self.bag.draw());
        self.phase = Phase::Running;
        info!(high_score = self.high_score, "session started");
        self.spawn(first);
    }

    fn reload_high_score(&mut self) {
        match self.store.load() {
            Ok(value) => self.high_score = self.high_score.max(value),
            Err(e) => warn!(error = %e, "could not load high score"),
        }
    }

    fn toggle_pause(&mut self) {
        self.phase = match self.phase {
            Phase::Running => Phase::Paused,
            Phase::Paused => Phase::Running,
            _ => return,
        };
        info!(phase = self.phase.name(), "pause toggled");
    }

    /// Gravity and lock delay for one frame
    fn step(&mut self, dt: Duration) {
        let Some(piece) = self.current else {
            return;
        };

        self.gravity += dt;
        let resting = piece.is_resting(&self.board);

        if self.lock_delay.update(resting, piece.row, dt) == LockStatus::Expired {
            self.lock();
            return;
        }

        let interval = self.score.drop_interval();
        if self.gravity >= interval {
            let carry = self.gravity.as_nanos() % interval.as_nanos();
            self.gravity = Duration::from_nanos(carry as u64);
            if !resting {
                if let Some(piece) = self.current.as_mut() {
                    piece.try_shift(&self.board, 1, 0);
                }
            }
        }
    }

    fn shift(&mut self, d_col: i32) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        if piece.try_shift(&self.board, 0, d_col) {
            self.lock_delay.on_successful_move();
            self.events.push(GameEvent::Sound(Sound::Move));
        }
    }

    fn rotate(&mut self, direction: RotationDirection) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        // single-state pieces have nothing to turn into
        if piece.kind.rotation_states() == 1 {
            return;
        }
        if piece.rotate(direction, &self.board) {
            self.lock_delay.on_successful_move();
            self.events.push(GameEvent::Sound(Sound::Rotate));
        }
    }

    fn soft_drop(&mut self) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        if piece.try_shift(&self.board, 1, 0) {
            self.score.add_soft_drop(1);
            self.gravity = Duration::ZERO;
            self.lock_delay.cancel();
            self.events.push(GameEvent::Sound(Sound::Move));
            return;
        }
        match self.config.soft_drop {
            SoftDropPolicy::LockOnContact => self.lock(),
            SoftDropPolicy::DeferToLockDelay => {}
        }
    }

    fn hard_drop(&mut self) {
        let Some(piece) = self.current.as_mut() else {
            return;
        };
        let distance = piece.hard_drop(&self.board);
        self.score.add_hard_drop(distance.max(0) as u32);
        self.events.push(GameEvent::Sound(Sound::HardDrop));
        self.lock();
    }

    fn hold_piece(&mut self) {
        if self.hold_used {
            return;
        }
        let Some(current) = self.current else {
            return;
        };

        self.hold_used = true;
        self.lock_delay.cancel();
        let incoming = match self.hold.replace(current.kind) {
            Some(held) => held,
            None => self.take_next(),
        };
        debug!(held = current.kind.name(), incoming = incoming.name(), "hold");
        self.events.push(GameEvent::Sound(Sound::Hold));
        self.spawn(incoming);
    }

    /// Pop the queued next piece and queue a replacement
    fn take_next(&mut self) -> TetrominoType {
        let kind = self.next.take().unwrap_or_else(|| self.bag.draw());
        self.next = Some(self.bag.draw());
        kind
    }

    fn spawn_next(&mut self) {
        let kind = self.take_next();
        self.spawn(kind);
    }

    /// Put `kind` at the spawn position, topping out if it doesn't fit
    fn spawn(&mut self, kind: TetrominoType) {
        let piece = Piece::spawn(kind);
        self.current = Some(piece);
        self.lock_delay.reset();
        self.gravity = Duration::ZERO;

        if self.board.collides(&piece, 0, 0, None) {
            debug!(piece = kind.name(), "spawn blocked");
            self.game_over();
        } else {
            trace!(piece = kind.name(), "spawned");
        }
    }

    /// Fix the active piece to the board and move on to clearing or the next piece
    fn lock(&mut self) {
        let Some(piece) = self.current.take() else {
            return;
        };
        self.lock_delay.reset();

        if self.board.lock(&piece) == LockOutcome::TopOut {
            debug!(piece = piece.kind.name(), "locked above the board");
            self.current = Some(piece);
            self.game_over();
            return;
        }

        self.hold_used = false;
        self.events.push(GameEvent::Sound(Sound::Lock));

        let full = self.board.full_rows();
        if full.is_empty() {
            self.score.reset_combo();
            self.spawn_next();
        } else {
            debug!(rows = ?full, "clearing");
            self.phase = Phase::Clearing(ClearAnimation::new(full));
        }
    }

    fn finish_clear(&mut self, rows: &[usize]) {
        let count = rows.len() as u8;
        self.board.remove_rows(rows);
        let award = self.score.award_clear(count);

        if award.combo_bonus > 0 {
            self.notify(
                NotificationKind::Combo,
                format!("COMBO ×{}  +{}", award.combo, award.combo_bonus),
            );
        }
        match count {
            4 => self.notify(NotificationKind::Tetris, "TETRIS!".to_string()),
            3 => self.notify(NotificationKind::Triple, "TRIPLE!".to_string()),
            2 => self.notify(NotificationKind::Double, "DOUBLE!".to_string()),
            _ => {}
        }

        self.events.push(GameEvent::Sound(Sound::LineClear(count)));
        if award.leveled_up {
            info!(level = self.score.level, "level up");
            self.events.push(GameEvent::Sound(Sound::LevelUp));
        }
        debug!(lines = count, points = award.total(), combo = self.score.combo, "rows cleared");

        self.phase = Phase::Running;
        self.spawn_next();
    }

    fn game_over(&mut self) {
        self.phase = Phase::GameOver;
        self.events.push(GameEvent::Sound(Sound::GameOver));
        info!(score = self.score.points, lines = self.score.lines, "game over");

        if self.score.points > self.high_score {
            self.high_score = self.score.points;
            if let Err(e) = self.store.persist(self.high_score) {
                warn!(error = %e, "could not persist high score");
            }
        }
    }

    fn notify(&mut self, kind: NotificationKind, text: String) {
        self.notifications.push(Notification {
            kind,
            text,
            frames_left: NOTIFICATION_FRAMES,
        });
    }

    fn age_notifications(&mut self) {
        for notification in &mut self.notifications {
            notification.frames_left = notification.frames_left.saturating_sub(1);
        }
        self.notifications.retain(|n| n.frames_left > 0);
    }
}
