//! High-score persistence
//!
//! The engine only ever sees [`HighScoreStore`]. Store errors are reported
//! back as `anyhow` errors and the game decides what to do with them (it
//! logs and carries on).

use anyhow::Context;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Key the value is stored under
pub const HIGH_SCORE_KEY: &str = "tetris-high-score";

/// Durable home for the single high-score value
pub trait HighScoreStore {
    fn load(&self) -> anyhow::Result<u64>;
    fn persist(&mut self, value: u64) -> anyhow::Result<()>;
}

/// In-memory store, used when nothing durable is available
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    value: u64,
}

impl MemoryStore {
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&self) -> anyhow::Result<u64> {
        Ok(self.value)
    }

    fn persist(&mut self, value: u64) -> anyhow::Result<()> {
        self.value = value;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct HighScoreFile {
    #[serde(rename = "tetris-high-score", default)]
    high_score: u64,
}

/// TOML file holding `tetris-high-score = <n>`
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `highscore.toml` in the platform data directory
    pub fn default_location() -> Option<Self> {
        ProjectDirs::from("com", "neontris", "neontris")
            .map(|dirs| Self::at(dirs.data_dir().join("highscore.toml")))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl HighScoreStore for FileStore {
    fn load(&self) -> anyhow::Result<u64> {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(0),
            Err(e) => {
                return Err(e).with_context(|| format!("reading {}", self.path.display()));
            }
        };
        let file: HighScoreFile = toml::from_str(&contents)
            .with_context(|| format!("parsing {}", self.path.display()))?;
        Ok(file.high_score)
    }

    fn persist(&mut self, value: u64) -> anyhow::Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        let contents = toml::to_string(&HighScoreFile { high_score: value })?;
        fs::write(&self.path, contents)
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("neontris-store-{:016x}", rand::random::<u64>()))
            .join("highscore.toml")
    }

    #[test]
    fn memory_store_round_trip() {
        let mut store = MemoryStore::default();
        assert_eq!(store.load().unwrap(), 0);
        store.persist(1200).unwrap();
        assert_eq!(store.load().unwrap(), 1200);
    }

    #[test]
    fn missing_file_loads_zero() {
        let store = FileStore::at(scratch_path());
        assert_eq!(store.load().unwrap(), 0);
    }

    #[test]
    fn file_uses_fixed_key() {
        let path = scratch_path();
        let mut store = FileStore::at(&path);
        store.persist(4321).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains(HIGH_SCORE_KEY));
        assert_eq!(store.load().unwrap(), 4321);

        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn corrupt_file_is_an_error() {
        let path = scratch_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "tetris-high-score = \"lots\"").unwrap();
        assert!(FileStore::at(&path).load().is_err());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
