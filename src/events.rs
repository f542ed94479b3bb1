//! Events emitted by boards and the match, drained by the app each frame.

use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GameEvent {
    /// The active piece was merged into the arena.
    Locked { board: usize },
    /// A sweep removed `count` rows. `rows` holds their pre-sweep indices, bottom first.
    LinesCleared {
        board: usize,
        count: u32,
        base_points: u32,
        bonus_points: u32,
        rows: Vec<usize>,
    },
    LevelUp { board: usize, level: u32 },
    /// A spawn or garbage push left no legal placement.
    GameOver {
        board: usize,
        final_score: u32,
        duration: Duration,
    },
    SurvivalWin { winner: String, loser: String },
}

impl GameEvent {
    /// Board the event belongs to, if any.
    pub fn board(&self) -> Option<usize> {
        match self {
            Self::Locked { board }
            | Self::LinesCleared { board, .. }
            | Self::LevelUp { board, .. }
            | Self::GameOver { board, .. } => Some(*board),
            Self::SurvivalWin { .. } => None,
        }
    }
}
