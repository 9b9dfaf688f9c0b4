//! Input handling with DAS (Delayed Auto Shift) and ARR (Auto Repeat Rate)
//!
//! Uses a polling-based approach that doesn't rely on key release events,
//! which are unreliable on Linux terminals. The key map is fixed.

use crate::game::Command;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::time::{Duration, Instant};

/// Time after which we consider a key "released" if no repeat received
const KEY_TIMEOUT: Duration = Duration::from_millis(100);
const DAS: Duration = Duration::from_millis(170);
const ARR: Duration = Duration::from_millis(50);
/// Volume change per +/- press
pub const VOLUME_STEP: i16 = 10;

/// What a key press asks the front-end to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    Game(Command),
    /// Relative volume change, resolved against the current volume
    AdjustVolume(i16),
    Quit,
}

/// Keys that auto-repeat while held
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Held {
    Left,
    Right,
    Down,
}

impl Held {
    fn command(self) -> Command {
        match self {
            Held::Left => Command::MoveLeft,
            Held::Right => Command::MoveRight,
            Held::Down => Command::SoftDrop,
        }
    }
}

#[derive(Debug, Clone)]
struct KeyPressState {
    first_press: Instant,
    last_seen: Instant,
    das_triggered: bool,
    last_arr: Option<Instant>,
}

impl KeyPressState {
    fn new(now: Instant) -> Self {
        Self {
            first_press: now,
            last_seen: now,
            das_triggered: false,
            last_arr: None,
        }
    }
}

/// Map a key to its action, ignoring repeat state
pub fn map_key(key: KeyEvent) -> Option<InputAction> {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(InputAction::Quit);
    }

    let action = match normalize_key(key.code) {
        KeyCode::Left => InputAction::Game(Command::MoveLeft),
        KeyCode::Right => InputAction::Game(Command::MoveRight),
        KeyCode::Down => InputAction::Game(Command::SoftDrop),
        KeyCode::Up | KeyCode::Char('x') => InputAction::Game(Command::RotateCW),
        KeyCode::Char('z') => InputAction::Game(Command::RotateCCW),
        KeyCode::Char(' ') => InputAction::Game(Command::HardDrop),
        KeyCode::Char('c') => InputAction::Game(Command::Hold),
        KeyCode::Char('p') | KeyCode::Esc => InputAction::Game(Command::TogglePause),
        KeyCode::Char('r') => InputAction::Game(Command::Restart),
        KeyCode::Enter => InputAction::Game(Command::Start),
        KeyCode::Char('m') => InputAction::Game(Command::ToggleMute),
        KeyCode::Char('+') | KeyCode::Char('=') => InputAction::AdjustVolume(VOLUME_STEP),
        KeyCode::Char('-') => InputAction::AdjustVolume(-VOLUME_STEP),
        KeyCode::Char('q') => InputAction::Quit,
        _ => return None,
    };
    Some(action)
}

/// Apply a relative change to a 0-100 volume
pub fn adjust_volume(volume: u8, delta: i16) -> u8 {
    (i16::from(volume) + delta).clamp(0, 100) as u8
}

/// Input handler with DAS/ARR support
#[derive(Debug, Default)]
pub struct InputHandler {
    left_state: Option<KeyPressState>,
    right_state: Option<KeyPressState>,
    down_state: Option<KeyPressState>,
}

impl InputHandler {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&mut self, held: Held) -> &mut Option<KeyPressState> {
        match held {
            Held::Left => &mut self.left_state,
            Held::Right => &mut self.right_state,
            Held::Down => &mut self.down_state,
        }
    }

    /// Handle a key press event - returns the immediate action, if any
    pub fn key_down(&mut self, key: KeyEvent) -> Option<InputAction> {
        self.key_down_at(key, Instant::now())
    }

    fn key_down_at(&mut self, key: KeyEvent, now: Instant) -> Option<InputAction> {
        let action = map_key(key)?;

        let held = match action {
            InputAction::Game(Command::MoveLeft) => Held::Left,
            InputAction::Game(Command::MoveRight) => Held::Right,
            InputAction::Game(Command::SoftDrop) => Held::Down,
            other => return Some(other),
        };

        // Cancel opposite direction
        match held {
            Held::Left => self.right_state = None,
            Held::Right => self.left_state = None,
            Held::Down => {}
        }

        let slot = self.slot(held);
        if let Some(state) = slot.as_mut() {
            // Terminal key repeat: the key is still down, DAS/ARR owns it
            state.last_seen = now;
            return None;
        }
        *slot = Some(KeyPressState::new(now));
        Some(action)
    }

    /// Handle a key release event (may not be called on Linux)
    pub fn key_up(&mut self, key: KeyEvent) {
        match map_key(key) {
            Some(InputAction::Game(Command::MoveLeft)) => self.left_state = None,
            Some(InputAction::Game(Command::MoveRight)) => self.right_state = None,
            Some(InputAction::Game(Command::SoftDrop)) => self.down_state = None,
            _ => {}
        }
    }

    /// Update held keys and return repeat commands (call every frame)
    pub fn update(&mut self) -> Vec<Command> {
        self.update_at(Instant::now())
    }

    fn update_at(&mut self, now: Instant) -> Vec<Command> {
        let mut commands = Vec::new();
        for held in [Held::Left, Held::Right, Held::Down] {
            let slot = self.slot(held);
            // Check for timed-out keys (no recent key event = released)
            if slot
                .as_ref()
                .is_some_and(|state| now.duration_since(state.last_seen) > KEY_TIMEOUT)
            {
                *slot = None;
            }
            if let Some(state) = slot {
                if process_das_arr(state, now, DAS, ARR) {
                    commands.push(held.command());
                }
            }
        }
        commands
    }

    /// Clear all held keys (useful for pause/resume)
    pub fn clear(&mut self) {
        self.left_state = None;
        self.right_state = None;
        self.down_state = None;
    }
}

/// Process DAS/ARR logic for a key state, returns true if should trigger action
fn process_das_arr(state: &mut KeyPressState, now: Instant, das: Duration, arr: Duration) -> bool {
    let held_duration = now.duration_since(state.first_press);

    if held_duration >= das {
        if !state.das_triggered {
            // First trigger after DAS
            state.das_triggered = true;
            state.last_arr = Some(now);
            return true;
        } else if let Some(last) = state.last_arr {
            if now.duration_since(last) >= arr {
                state.last_arr = Some(now);
                return true;
            }
        }
    }

    false
}

/// Normalize key codes for consistent handling
fn normalize_key(code: KeyCode) -> KeyCode {
    match code {
        KeyCode::Char(c) => KeyCode::Char(c.to_ascii_lowercase()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn fixed_map() {
        assert_eq!(
            map_key(key(KeyCode::Char(' '))),
            Some(InputAction::Game(Command::HardDrop))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('Z'))),
            Some(InputAction::Game(Command::RotateCCW))
        );
        assert_eq!(
            map_key(key(KeyCode::Char('r'))),
            Some(InputAction::Game(Command::Restart))
        );
        assert_eq!(map_key(key(KeyCode::Char('-'))), Some(InputAction::AdjustVolume(-10)));
        assert_eq!(map_key(key(KeyCode::Char('k'))), None);
        assert_eq!(
            map_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputAction::Quit)
        );
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(adjust_volume(95, 10), 100);
        assert_eq!(adjust_volume(5, -10), 0);
        assert_eq!(adjust_volume(50, 10), 60);
    }

    #[test]
    fn held_key_fires_once_then_repeats() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        assert_eq!(
            input.key_down_at(key(KeyCode::Left), start),
            Some(InputAction::Game(Command::MoveLeft))
        );
        // terminal repeat events while held don't fire by themselves
        let t = start + Duration::from_millis(60);
        assert_eq!(input.key_down_at(key(KeyCode::Left), t), None);
        assert!(input.update_at(t).is_empty());

        let t = start + Duration::from_millis(120);
        input.key_down_at(key(KeyCode::Left), t);
        let t = start + Duration::from_millis(170);
        assert_eq!(input.update_at(t), vec![Command::MoveLeft]);
        assert!(input.update_at(t + Duration::from_millis(20)).is_empty());
    }

    #[test]
    fn silent_key_times_out() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down_at(key(KeyCode::Down), start);
        assert!(input.update_at(start + Duration::from_millis(300)).is_empty());
        // treated as a fresh press afterwards
        assert_eq!(
            input.key_down_at(key(KeyCode::Down), start + Duration::from_millis(310)),
            Some(InputAction::Game(Command::SoftDrop))
        );
    }

    #[test]
    fn opposite_direction_cancels() {
        let mut input = InputHandler::new();
        let start = Instant::now();
        input.key_down_at(key(KeyCode::Left), start);
        assert_eq!(
            input.key_down_at(key(KeyCode::Right), start),
            Some(InputAction::Game(Command::MoveRight))
        );
        assert!(input.left_state.is_none());
    }
}
