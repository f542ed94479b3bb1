//! Board engine: one arena, its active piece and lookahead, score, lines and level.

use crate::ScoringPolicy;
use crate::arena::{Arena, DEFAULT_HEIGHT, DEFAULT_WIDTH, Player};
use crate::events::GameEvent;
use crate::piece::{Matrix, PieceKind, Rotation};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::time::Duration;

/// Drop interval at level 1.
const BASE_DROP_MS: u64 = 1000;
/// Interval shaved off per level.
const DROP_STEP_MS: u64 = 90;
/// Fastest interval, reached at level 11.
const MIN_DROP_MS: u64 = 120;

pub const LINES_PER_LEVEL: u32 = 10;
const POINTS_PER_LINE: u32 = 10;

/// Gravity interval for a level: max(120, 1000 - 90 * (level - 1)) ms.
pub fn drop_interval_for(level: u32) -> Duration {
    let shaved = u64::from(level.saturating_sub(1)) * DROP_STEP_MS;
    Duration::from_millis(BASE_DROP_MS.saturating_sub(shaved).max(MIN_DROP_MS))
}

/// (base, bonus) points for a sweep that removed `cleared` rows.
pub fn points_for(policy: ScoringPolicy, cleared: u32) -> (u32, u32) {
    let base = cleared.saturating_mul(POINTS_PER_LINE);
    let bonus = match policy {
        ScoringPolicy::Percent => {
            let percent = if cleared <= 1 { 0 } else { cleared * 10 };
            // Rounded half up.
            (base.saturating_mul(percent) + 50) / 100
        }
        ScoringPolicy::Doubling => {
            let mut row_value = POINTS_PER_LINE;
            let mut total = 0u32;
            for _ in 0..cleared {
                total = total.saturating_add(row_value);
                row_value = row_value.saturating_mul(2);
            }
            total - base
        }
    };
    (base, bonus)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ready,
    Playing,
    Paused,
    GameOver,
    Winner,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::GameOver | Self::Winner)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Ready => "Ready",
            Self::Playing => "Playing",
            Self::Paused => "Paused",
            Self::GameOver => "Game Over",
            Self::Winner => "Winner!",
        }
    }
}

/// Horizontal step of the active piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shift {
    Left,
    Right,
}

impl Shift {
    fn dx(self) -> i32 {
        match self {
            Self::Left => -1,
            Self::Right => 1,
        }
    }
}

/// Per-board rules; shared by both boards of a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: usize,
    pub height: usize,
    pub start_level: u32,
    pub scoring: ScoringPolicy,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            start_level: 1,
            scoring: ScoringPolicy::default(),
        }
    }
}

#[derive(Debug)]
pub struct Board {
    id: usize,
    label: String,
    config: BoardConfig,
    arena: Arena,
    player: Option<Player>,
    /// Lookahead: spawns next.
    next: Matrix,
    score: u32,
    lines: u32,
    level: u32,
    lines_for_next_level: u32,
    /// Time since the last forced descent.
    drop_counter: Duration,
    drop_interval: Duration,
    status: Status,
    /// Time spent Playing since start.
    elapsed: Duration,
    events: Vec<GameEvent>,
    rng: ChaCha8Rng,
}

impl Board {
    pub fn new(id: usize, label: impl Into<String>, config: BoardConfig, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let next = PieceKind::random(&mut rng).matrix();
        let level = config.start_level.max(1);
        Self {
            id,
            label: label.into(),
            arena: Arena::new(config.width, config.height),
            player: None,
            next,
            score: 0,
            lines: 0,
            level,
            lines_for_next_level: LINES_PER_LEVEL,
            drop_counter: Duration::ZERO,
            drop_interval: drop_interval_for(level),
            status: Status::Ready,
            elapsed: Duration::ZERO,
            events: Vec::new(),
            rng,
            config,
        }
    }

    /// Reset everything except the RNG stream and spawn the first piece.
    pub fn start(&mut self) {
        self.arena = Arena::new(self.config.width, self.config.height);
        self.player = None;
        self.next = PieceKind::random(&mut self.rng).matrix();
        self.score = 0;
        self.lines = 0;
        self.level = self.config.start_level.max(1);
        self.lines_for_next_level = LINES_PER_LEVEL;
        self.drop_counter = Duration::ZERO;
        self.drop_interval = drop_interval_for(self.level);
        self.elapsed = Duration::ZERO;
        self.events.clear();
        self.status = Status::Playing;
        self.spawn();
    }

    #[inline]
    fn is_playing(&self) -> bool {
        self.status == Status::Playing
    }

    pub fn move_piece(&mut self, shift: Shift) {
        if !self.is_playing() {
            return;
        }
        if let Some(ref mut player) = self.player {
            player.x += shift.dx();
            if self.arena.collides(player) {
                player.x -= shift.dx();
            }
        }
    }

    /// One row down; locks when blocked. Always restarts the gravity timer.
    pub fn soft_drop(&mut self) {
        if !self.is_playing() {
            return;
        }
        self.drop_counter = Duration::ZERO;
        if let Some(ref mut player) = self.player {
            player.y += 1;
            if self.arena.collides(player) {
                player.y -= 1;
                self.lock();
            }
        }
    }

    pub fn hard_drop(&mut self) {
        if !self.is_playing() {
            return;
        }
        if let Some(ref mut player) = self.player {
            while !self.arena.collides(player) {
                player.y += 1;
            }
            player.y = (player.y - 1).max(0);
            self.lock();
        }
        self.drop_counter = Duration::ZERO;
    }

    /// Rotate with horizontal kicks +1, -2, +3, ... (cumulative) bounded by the matrix width.
    /// A rotation that no kick resolves is undone.
    pub fn rotate(&mut self, rotation: Rotation) {
        if !self.is_playing() {
            return;
        }
        let Some(ref mut player) = self.player else {
            return;
        };
        let x = player.x;
        player.matrix.rotate(rotation);
        let mut offset: i32 = 1;
        while self.arena.collides(player) {
            player.x += offset;
            offset = -(offset + offset.signum());
            if offset > player.matrix.width() as i32 {
                player.matrix.rotate(rotation.inverse());
                player.x = x;
                return;
            }
        }
    }

    /// Advance gravity by `delta`; one forced descent once the interval is exceeded.
    pub fn tick(&mut self, delta: Duration) {
        if !self.is_playing() {
            return;
        }
        self.elapsed += delta;
        self.drop_counter += delta;
        if self.drop_counter > self.drop_interval {
            self.soft_drop();
        }
    }

    /// Merge the active piece, sweep, score and spawn the lookahead.
    fn lock(&mut self) {
        let Some(player) = self.player.take() else {
            return;
        };
        self.arena.merge(&player);
        self.events.push(GameEvent::Locked { board: self.id });
        self.sweep_and_score();
        if !self.status.is_terminal() {
            self.spawn();
        }
    }

    fn sweep_and_score(&mut self) {
        let rows = self.arena.sweep();
        if rows.is_empty() {
            return;
        }
        let cleared = rows.len() as u32;
        let (base_points, bonus_points) = points_for(self.config.scoring, cleared);
        self.score = self.score.saturating_add(base_points + bonus_points);
        self.lines += cleared;
        self.events.push(GameEvent::LinesCleared {
            board: self.id,
            count: cleared,
            base_points,
            bonus_points,
            rows,
        });
        self.advance_level();
    }

    fn advance_level(&mut self) {
        let before = self.level;
        while self.lines >= self.lines_for_next_level {
            self.level += 1;
            self.lines_for_next_level += LINES_PER_LEVEL;
            self.events.push(GameEvent::LevelUp {
                board: self.id,
                level: self.level,
            });
        }
        if self.level != before {
            self.drop_interval = drop_interval_for(self.level);
            self.drop_counter = Duration::ZERO;
        }
    }

    /// Promote the lookahead to the active piece, centred on row 0.
    fn spawn(&mut self) {
        let upcoming = PieceKind::random(&mut self.rng).matrix();
        let matrix = std::mem::replace(&mut self.next, upcoming);
        let x = (self.arena.width() / 2) as i32 - (matrix.width() / 2) as i32;
        let player = Player { matrix, x, y: 0 };
        if self.arena.collides(&player) {
            self.top_out();
        } else {
            self.player = Some(player);
        }
    }

    fn top_out(&mut self) {
        self.player = None;
        self.status = Status::GameOver;
        self.events.push(GameEvent::GameOver {
            board: self.id,
            final_score: self.score,
            duration: self.elapsed,
        });
    }

    /// Push garbage rows from below and lift the active piece out of them.
    /// Returns the rows actually inserted.
    pub fn receive_garbage(&mut self, rows: u32) -> usize {
        if !matches!(self.status, Status::Playing | Status::Paused) {
            return 0;
        }
        let inserted = self.arena.push_garbage(rows as usize, &mut self.rng);
        if let Some(ref mut player) = self.player {
            player.y = (player.y - inserted as i32).max(0);
            if self.arena.collides(player) {
                self.top_out();
            }
        }
        inserted
    }

    pub fn declare_winner(&mut self) {
        if !self.status.is_terminal() {
            self.status = Status::Winner;
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.status = match (self.status, paused) {
            (Status::Playing, true) => Status::Paused,
            (Status::Paused, false) => Status::Playing,
            (status, _) => status,
        };
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn player(&self) -> Option<&Player> {
        self.player.as_ref()
    }

    pub fn next(&self) -> &Matrix {
        &self.next
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lines(&self) -> u32 {
        self.lines
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn lines_for_next_level(&self) -> u32 {
        self.lines_for_next_level
    }

    pub fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    #[cfg(test)]
    pub fn arena_mut(&mut self) -> &mut Arena {
        &mut self.arena
    }

    /// Replace the active piece with a fresh `kind` at (x, y).
    #[cfg(test)]
    pub fn place(&mut self, kind: PieceKind, x: i32, y: i32) {
        self.player = Some(Player {
            matrix: kind.matrix(),
            x,
            y,
        });
    }

    #[cfg(test)]
    pub fn set_next(&mut self, kind: PieceKind) {
        self.next = kind.matrix();
    }
}
