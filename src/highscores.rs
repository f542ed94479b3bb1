//! Top-3 leaderboard persisted as JSON under the user config dir (`stackduel/leaderboard.json`).

use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const CAPACITY: usize = 3;
const APP_DIR: &str = "stackduel";
const FILENAME: &str = "leaderboard.json";

#[derive(Debug, Error)]
pub enum ScoresError {
    #[error("no config directory to store the leaderboard in")]
    NoConfigDir,
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not encode leaderboard: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub name: String,
    pub score: u32,
    /// Local date the game ended, `YYYY-MM-DD`.
    pub date: String,
    pub duration_secs: u64,
}

impl Entry {
    /// Entry stamped with today's date.
    pub fn now(name: impl Into<String>, score: u32, duration: Duration) -> Self {
        Self {
            name: name.into(),
            score,
            date: Local::now().format("%Y-%m-%d").to_string(),
            duration_secs: duration.as_secs(),
        }
    }
}

/// Best scores, highest first, never more than [`CAPACITY`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Leaderboard {
    entries: Vec<Entry>,
}

/// `<config dir>/stackduel/leaderboard.json`.
pub fn default_path() -> Result<PathBuf, ScoresError> {
    dirs::config_dir()
        .map(|dir| dir.join(APP_DIR).join(FILENAME))
        .ok_or(ScoresError::NoConfigDir)
}

impl Leaderboard {
    /// Read the leaderboard. A missing or unreadable file is an empty board.
    pub fn load(path: &Path) -> Self {
        let Ok(content) = fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str::<Self>(&content)
            .map(Self::normalized)
            .unwrap_or_default()
    }

    /// Sort descending and cap, in case the file was edited by hand.
    fn normalized(mut self) -> Self {
        self.entries.sort_by(|a, b| b.score.cmp(&a.score));
        self.entries.truncate(CAPACITY);
        self
    }

    pub fn save(&self, path: &Path) -> Result<(), ScoresError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// A positive score that beats the lowest entry, or any positive score while there is room.
    pub fn qualifies(&self, score: u32) -> bool {
        score > 0
            && (self.entries.len() < CAPACITY
                || self.entries.last().is_some_and(|last| score > last.score))
    }

    /// Insert if the score qualifies. Returns the 0-based rank it took.
    /// Ties rank below the existing entries.
    pub fn insert(&mut self, entry: Entry) -> Option<usize> {
        if !self.qualifies(entry.score) {
            return None;
        }
        let rank = self
            .entries
            .iter()
            .position(|e| entry.score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(rank, entry);
        self.entries.truncate(CAPACITY);
        Some(rank)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str, score: u32) -> Entry {
        Entry {
            name: name.to_string(),
            score,
            date: "2024-01-01".to_string(),
            duration_secs: 60,
        }
    }

    fn scratch(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("stackduel-test-{}-{name}", std::process::id()))
            .join(FILENAME)
    }

    fn scores(board: &Leaderboard) -> Vec<u32> {
        board.entries().iter().map(|e| e.score).collect()
    }

    #[test]
    fn zero_never_qualifies() {
        let board = Leaderboard::default();
        assert!(!board.qualifies(0));
        assert!(board.qualifies(1));
    }

    #[test]
    fn keeps_top_three_descending() {
        let mut board = Leaderboard::default();
        assert_eq!(board.insert(entry("a", 50)), Some(0));
        assert_eq!(board.insert(entry("b", 120)), Some(0));
        assert_eq!(board.insert(entry("c", 80)), Some(1));
        assert_eq!(scores(&board), [120, 80, 50]);

        assert!(!board.qualifies(50));
        assert_eq!(board.insert(entry("d", 50)), None);
        assert_eq!(board.insert(entry("e", 90)), Some(1));
        assert_eq!(scores(&board), [120, 90, 80]);
    }

    #[test]
    fn ties_rank_after_existing() {
        let mut board = Leaderboard::default();
        board.insert(entry("first", 70));
        assert_eq!(board.insert(entry("second", 70)), Some(1));
        assert_eq!(board.entries()[0].name, "first");
    }

    #[test]
    fn save_then_load() {
        let path = scratch("roundtrip");
        let mut board = Leaderboard::default();
        board.insert(Entry::now("Ann", 310, Duration::from_secs(95)));
        board.save(&path).unwrap();

        let loaded = Leaderboard::load(&path);
        assert_eq!(loaded, board);
        assert_eq!(loaded.entries()[0].duration_secs, 95);
        assert_eq!(loaded.entries()[0].date.len(), 10);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn missing_or_malformed_file_is_empty() {
        assert!(Leaderboard::load(&scratch("missing")).entries().is_empty());

        let path = scratch("malformed");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();
        assert!(Leaderboard::load(&path).entries().is_empty());
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }

    #[test]
    fn hand_edited_file_is_normalized() {
        let path = scratch("unsorted");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        let raw = Leaderboard {
            entries: vec![entry("a", 10), entry("b", 40), entry("c", 30), entry("d", 20)],
        };
        fs::write(&path, serde_json::to_string(&raw).unwrap()).unwrap();
        assert_eq!(scores(&Leaderboard::load(&path)), [40, 30, 20]);
        let _ = fs::remove_dir_all(path.parent().unwrap());
    }
}
