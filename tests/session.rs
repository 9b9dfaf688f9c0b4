//! Whole-session scenarios through the public API, with a real high-score file.

use neontris::game::{Command, Game, GameConfig, GameEvent, Phase, Sound};
use neontris::storage::{FileStore, HighScoreStore};
use std::path::{Path, PathBuf};
use std::time::Duration;

fn scratch_file() -> PathBuf {
    std::env::temp_dir()
        .join(format!("neontris-session-{:016x}", rand::random::<u64>()))
        .join("highscore.toml")
}

fn seeded(seed: u64, path: &Path) -> Game {
    Game::new(
        GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        },
        Box::new(FileStore::at(path)),
    )
}

/// Hard-drop at the spawn column until the stack reaches the top
fn stack_to_the_top(game: &mut Game) {
    for _ in 0..200 {
        if *game.phase() == Phase::GameOver {
            return;
        }
        assert!(game.apply(Command::HardDrop));
        // spawn-column stacks never complete a row, but tick anyway
        game.tick(Duration::from_millis(16));
    }
    panic!("stack never topped out");
}

#[test]
fn top_out_persists_high_score_and_restart_keeps_it() {
    let path = scratch_file();
    let mut game = seeded(1, &path);
    assert_eq!(game.high_score(), 0);

    game.apply(Command::Start);
    stack_to_the_top(&mut game);

    let final_score = game.score().points;
    assert!(final_score > 0);
    assert_eq!(game.high_score(), final_score);
    assert_eq!(FileStore::at(&path).load().unwrap(), final_score);

    let events = game.drain_events();
    assert!(events.contains(&GameEvent::Sound(Sound::HardDrop)));
    assert_eq!(events.last(), Some(&GameEvent::Sound(Sound::GameOver)));

    // a new session picks the stored value up
    let mut second = seeded(1, &path);
    assert_eq!(second.high_score(), final_score);

    // same seed, same moves: same score, which does not beat the record
    second.apply(Command::Start);
    stack_to_the_top(&mut second);
    assert_eq!(second.score().points, final_score);
    assert_eq!(FileStore::at(&path).load().unwrap(), final_score);

    assert!(second.apply(Command::Restart));
    assert_eq!(second.score().points, 0);
    assert_eq!(second.high_score(), final_score);
    assert_eq!(*second.phase(), Phase::Running);

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn start_again_after_game_over() {
    let path = scratch_file();
    let mut game = seeded(9, &path);
    game.apply(Command::Start);
    stack_to_the_top(&mut game);

    assert!(!game.apply(Command::TogglePause));
    assert!(game.apply(Command::Start));
    assert_eq!(*game.phase(), Phase::Running);
    assert!(game.board().is_empty());
    assert!(game.hold().is_none());

    let _ = std::fs::remove_dir_all(path.parent().unwrap());
}

#[test]
fn idle_session_only_takes_start_and_settings() {
    let path = scratch_file();
    let mut game = seeded(3, &path);

    assert!(!game.apply(Command::RotateCW));
    assert!(!game.apply(Command::SoftDrop));
    assert!(game.apply(Command::SetVolume(30)));
    assert!(game.apply(Command::ToggleMute));
    assert_eq!(
        game.drain_events(),
        vec![GameEvent::VolumeChanged(30), GameEvent::MuteChanged(true)]
    );

    game.tick(Duration::from_secs(3));
    assert_eq!(*game.phase(), Phase::Idle);
    assert!(game.current().is_none());
    assert!(game.apply(Command::Start));
    assert!(game.current().is_some());
}
