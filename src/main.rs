//! NEONTRIS - falling blocks in the terminal

use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use neontris::audio::AudioManager;
use neontris::game::{Command, Game, GameEvent};
use neontris::input::{InputAction, InputHandler, adjust_volume};
use neontris::settings::Settings;
use neontris::storage::{FileStore, HighScoreStore, MemoryStore};
use neontris::ui;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::{
    io::{self, stdout},
    time::{Duration, Instant},
};

/// Target frame rate
const TARGET_FPS: u64 = 60;
const FRAME_DURATION: Duration = Duration::from_micros(1_000_000 / TARGET_FPS);
/// Longest step fed to the engine, so a stalled terminal doesn't teleport pieces
const MAX_FRAME_STEP: Duration = Duration::from_millis(250);

/// Get the neontris temp directory, creating it if needed
fn neontris_temp_dir() -> std::path::PathBuf {
    let dir = std::env::temp_dir().join("neontris");
    let _ = std::fs::create_dir_all(&dir);
    dir
}

fn high_score_store() -> Box<dyn HighScoreStore> {
    match FileStore::default_location() {
        Some(store) => {
            tracing::info!(path = %store.path().display(), "high score file");
            Box::new(store)
        }
        None => {
            tracing::warn!("no data directory, high score will not survive this run");
            Box::new(MemoryStore::default())
        }
    }
}

fn main() -> anyhow::Result<()> {
    let session_id: u32 = rand::random();

    // Setup tracing to a log file, the terminal belongs to the game
    let log_dir = neontris_temp_dir();
    let log_file = format!("{:08x}.log", session_id);
    let file_appender = tracing_appender::rolling::never(&log_dir, &log_file);
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("neontris=debug".parse()?),
        )
        .with_ansi(false)
        .init();

    tracing::info!(
        "NEONTRIS starting up, session={:08x}, log={}",
        session_id,
        log_dir.join(&log_file).display()
    );

    let mut settings = Settings::load();

    let mut game = Game::new(settings.gameplay.clone(), high_score_store());
    game.set_audio(settings.audio.muted, settings.audio.volume);

    // Initialize audio (optional - game works without audio)
    let mut audio = AudioManager::new(settings.audio.volume, settings.audio.muted);

    // Setup terminal
    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen)?;

    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let result = run_app(&mut terminal, &mut game, &mut audio, &settings);

    // Restore terminal
    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen)?;

    settings.audio.muted = game.muted();
    settings.audio.volume = game.volume();
    if let Err(e) = settings.save() {
        tracing::warn!(error = %e, "could not save settings");
        eprintln!("Warning: Could not save settings: {e:#}");
    }

    if result.is_ok() {
        let score = game.score();
        println!("\nThanks for playing NEONTRIS!");
        println!("Final Score: {}", score.points);
        println!("Level: {} | Lines: {}", score.level, score.lines);
        println!("Best: {}", game.high_score().max(score.points));
    }

    Ok(result?)
}

fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    game: &mut Game,
    audio: &mut Option<AudioManager>,
    settings: &Settings,
) -> io::Result<()> {
    let mut input = InputHandler::new();
    let mut last_frame = Instant::now();

    loop {
        let now = Instant::now();
        let dt = now.duration_since(last_frame).min(MAX_FRAME_STEP);
        last_frame = now;

        for command in input.update() {
            game.apply(command);
        }
        game.tick(dt);
        dispatch_events(game, audio);

        terminal.draw(|frame| ui::render_game(frame, &game.view(), settings))?;

        if !event::poll(FRAME_DURATION)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };

        match key.kind {
            KeyEventKind::Release => {
                input.key_up(key);
                continue;
            }
            KeyEventKind::Press | KeyEventKind::Repeat => {}
        }

        match input.key_down(key) {
            Some(InputAction::Quit) => return Ok(()),
            Some(InputAction::Game(command)) => {
                if game.apply(command) && command == Command::TogglePause {
                    input.clear();
                }
            }
            Some(InputAction::AdjustVolume(delta)) => {
                game.apply(Command::SetVolume(adjust_volume(game.volume(), delta)));
            }
            None => {}
        }
        dispatch_events(game, audio);
    }
}

/// Forward engine events to the audio collaborator
fn dispatch_events(game: &mut Game, audio: &mut Option<AudioManager>) {
    for event in game.drain_events() {
        let Some(audio) = audio.as_mut() else {
            continue;
        };
        match event {
            GameEvent::Sound(sound) => audio.play(sound),
            GameEvent::MuteChanged(muted) => audio.set_muted(muted),
            GameEvent::VolumeChanged(volume) => audio.set_volume(volume),
        }
    }
}
