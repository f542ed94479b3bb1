//! Match controller: owns one or two boards, routes commands, ticks them each frame
//! and forwards garbage between opponents in survival mode.

use crate::GameMode;
use crate::board::{Board, BoardConfig, Shift};
use crate::events::GameEvent;
use crate::piece::Rotation;
use std::time::Duration;

/// Player command, already resolved to a board by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Shift),
    SoftDrop,
    HardDrop,
    Rotate(Rotation),
}

#[derive(Debug, Clone)]
pub struct MatchConfig {
    pub mode: GameMode,
    pub board: BoardConfig,
    /// Board labels; the second is unused in solo.
    pub labels: [String; 2],
    /// Board `i` is seeded with `seed + i`.
    pub seed: u64,
}

#[derive(Debug)]
pub struct Match {
    mode: GameMode,
    boards: Vec<Board>,
    paused: bool,
    events: Vec<GameEvent>,
}

impl Match {
    pub fn new(config: MatchConfig) -> Self {
        let count = match config.mode {
            GameMode::Solo => 1,
            GameMode::Versus | GameMode::Survival => 2,
        };
        let boards = config
            .labels
            .into_iter()
            .take(count)
            .enumerate()
            .map(|(i, label)| {
                Board::new(
                    i,
                    label,
                    config.board.clone(),
                    config.seed.wrapping_add(i as u64),
                )
            })
            .collect();
        Self {
            mode: config.mode,
            boards,
            paused: false,
            events: Vec::new(),
        }
    }

    /// (Re)start every board from scratch. Also clears pause and pending events.
    pub fn start(&mut self) {
        self.paused = false;
        self.events.clear();
        for board in &mut self.boards {
            board.start();
        }
    }

    /// Advance every board by `delta`, settling each before the next one ticks.
    pub fn tick(&mut self, delta: Duration) {
        if self.paused {
            return;
        }
        for index in 0..self.boards.len() {
            self.boards[index].tick(delta);
            self.settle(index);
        }
    }

    /// Apply a command to board `player`. Unknown boards and paused matches ignore it.
    pub fn command(&mut self, player: usize, command: Command) {
        if self.paused {
            return;
        }
        let Some(board) = self.boards.get_mut(player) else {
            return;
        };
        match command {
            Command::Move(shift) => board.move_piece(shift),
            Command::SoftDrop => board.soft_drop(),
            Command::HardDrop => board.hard_drop(),
            Command::Rotate(rotation) => board.rotate(rotation),
        }
        self.settle(player);
    }

    pub fn toggle_pause(&mut self) {
        if self.is_over() {
            return;
        }
        self.paused = !self.paused;
        for board in &mut self.boards {
            board.set_paused(self.paused);
        }
    }

    /// Solo: the board ended. Survival: someone lost. Versus: both ended.
    pub fn is_over(&self) -> bool {
        let terminal = |b: &Board| b.status().is_terminal();
        match self.mode {
            GameMode::Solo | GameMode::Survival => self.boards.iter().any(terminal),
            GameMode::Versus => self.boards.iter().all(terminal),
        }
    }

    fn opponent(&self, index: usize) -> Option<usize> {
        (self.boards.len() == 2).then(|| 1 - index)
    }

    /// Drain board `index`'s events, apply survival rules, republish them.
    fn settle(&mut self, index: usize) {
        for event in self.boards[index].take_events() {
            let garbage = match event {
                GameEvent::LinesCleared { count, .. } => count,
                _ => 0,
            };
            let topped_out = matches!(event, GameEvent::GameOver { .. });
            self.events.push(event);

            if self.mode != GameMode::Survival {
                continue;
            }
            let Some(opponent) = self.opponent(index) else {
                continue;
            };
            if garbage > 0 {
                self.boards[opponent].receive_garbage(garbage);
                self.settle(opponent);
            }
            if topped_out && !self.boards[opponent].status().is_terminal() {
                self.boards[opponent].declare_winner();
                self.events.push(GameEvent::SurvivalWin {
                    winner: self.boards[opponent].label().to_string(),
                    loser: self.boards[index].label().to_string(),
                });
            }
        }
    }

    pub fn take_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn boards(&self) -> &[Board] {
        &self.boards
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    #[cfg(test)]
    pub fn board_mut(&mut self, index: usize) -> &mut Board {
        &mut self.boards[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Status;
    use crate::piece::{Cell, PieceKind};

    fn started(mode: GameMode) -> Match {
        let mut m = Match::new(MatchConfig {
            mode,
            board: BoardConfig::default(),
            labels: ["Ann".to_string(), "Bo".to_string()],
            seed: 7,
        });
        m.start();
        m
    }

    fn y_of(m: &Match, index: usize) -> i32 {
        m.boards()[index].player().expect("active piece").y
    }

    /// Board 0 clears the two bottom rows with an O dropped at column 0.
    fn clear_two_rows(m: &mut Match) {
        for y in 18..20 {
            m.board_mut(0)
                .arena_mut()
                .fill_row_except(y, &[0, 1], Cell::Garbage);
        }
        m.board_mut(0).place(PieceKind::O, 0, 0);
        m.command(0, Command::HardDrop);
    }

    #[test]
    fn mode_decides_board_count() {
        assert_eq!(started(GameMode::Solo).boards().len(), 1);
        assert_eq!(started(GameMode::Versus).boards().len(), 2);
        let m = started(GameMode::Survival);
        assert_eq!(m.boards().len(), 2);
        assert_eq!(m.boards()[1].label(), "Bo");
        assert!(m.boards().iter().all(|b| b.status() == Status::Playing));
    }

    #[test]
    fn survival_sends_cleared_rows_as_garbage() {
        let mut m = started(GameMode::Survival);
        m.board_mut(1).place(PieceKind::T, 4, 6);
        clear_two_rows(&mut m);

        assert_eq!(m.boards()[0].lines(), 2);
        let rows: Vec<_> = m.boards()[1].arena().rows().collect();
        for row in &rows[18..20] {
            assert_eq!(row.iter().filter(|c| c.is_empty()).count(), 1);
            assert!(row.iter().all(|&c| c == Cell::Empty || c == Cell::Garbage));
        }
        assert_eq!(m.boards()[1].arena().filled_count(), 22);
        assert_eq!(y_of(&m, 1), 4);
        assert_eq!(m.boards()[1].status(), Status::Playing);
        assert!(!m.is_over());
    }

    #[test]
    fn garbage_lift_stops_at_the_top_row() {
        let mut m = started(GameMode::Survival);
        m.board_mut(1).place(PieceKind::T, 4, 1);
        clear_two_rows(&mut m);
        assert_eq!(y_of(&m, 1), 0);
    }

    #[test]
    fn versus_boards_do_not_exchange_garbage() {
        let mut m = started(GameMode::Versus);
        clear_two_rows(&mut m);
        assert_eq!(m.boards()[0].lines(), 2);
        assert_eq!(m.boards()[1].arena().filled_count(), 0);
    }

    #[test]
    fn garbage_that_buries_the_opponent_ends_the_match() {
        let mut m = started(GameMode::Survival);
        for y in 2..20 {
            m.board_mut(1)
                .arena_mut()
                .fill_row_except(y, &[0], Cell::Garbage);
        }
        m.board_mut(1).place(PieceKind::O, 5, 0);
        clear_two_rows(&mut m);

        assert_eq!(m.boards()[1].status(), Status::GameOver);
        assert_eq!(m.boards()[0].status(), Status::Winner);
        assert!(m.is_over());
        let events = m.take_events();
        assert!(events.contains(&GameEvent::SurvivalWin {
            winner: "Ann".to_string(),
            loser: "Bo".to_string(),
        }));
        let cleared_at = events
            .iter()
            .position(|e| matches!(e, GameEvent::LinesCleared { board: 0, .. }))
            .unwrap();
        let lost_at = events
            .iter()
            .position(|e| matches!(e, GameEvent::GameOver { board: 1, .. }))
            .unwrap();
        assert!(cleared_at < lost_at);
    }

    #[test]
    fn topping_out_hands_survival_to_the_opponent() {
        let mut m = started(GameMode::Survival);
        for y in 0..3 {
            m.board_mut(1)
                .arena_mut()
                .fill_row_except(y, &[11], Cell::Garbage);
        }
        m.board_mut(1).place(PieceKind::O, 0, 18);
        m.command(1, Command::HardDrop);
        assert_eq!(m.boards()[1].status(), Status::GameOver);
        assert_eq!(m.boards()[0].status(), Status::Winner);
        assert_eq!(
            m.take_events()
                .into_iter()
                .filter(|e| matches!(e, GameEvent::SurvivalWin { .. }))
                .count(),
            1
        );
        // Winner no longer accepts input.
        let before = m.boards()[0].arena().clone();
        m.command(0, Command::HardDrop);
        assert_eq!(m.boards()[0].arena(), &before);
    }

    #[test]
    fn versus_runs_until_both_boards_end() {
        let mut m = started(GameMode::Versus);
        for y in 0..3 {
            m.board_mut(0)
                .arena_mut()
                .fill_row_except(y, &[11], Cell::Garbage);
        }
        m.board_mut(0).place(PieceKind::O, 0, 18);
        m.command(0, Command::HardDrop);
        assert_eq!(m.boards()[0].status(), Status::GameOver);
        assert_eq!(m.boards()[1].status(), Status::Playing);
        assert!(!m.is_over());
    }

    #[test]
    fn pause_freezes_every_board() {
        let mut m = started(GameMode::Versus);
        m.board_mut(0).place(PieceKind::O, 4, 2);
        m.board_mut(1).place(PieceKind::O, 4, 2);
        m.toggle_pause();
        assert!(m.is_paused());
        assert!(m.boards().iter().all(|b| b.status() == Status::Paused));
        m.tick(Duration::from_secs(5));
        m.command(0, Command::SoftDrop);
        m.command(1, Command::Move(Shift::Left));
        assert_eq!(y_of(&m, 0), 2);
        assert_eq!(m.boards()[1].player().unwrap().x, 4);

        m.toggle_pause();
        m.command(1, Command::Move(Shift::Left));
        assert_eq!(m.boards()[1].player().unwrap().x, 3);
    }

    #[test]
    fn tick_drives_gravity_on_all_boards() {
        let mut m = started(GameMode::Versus);
        m.board_mut(0).place(PieceKind::O, 4, 2);
        m.board_mut(1).place(PieceKind::O, 4, 5);
        m.tick(Duration::from_millis(1001));
        assert_eq!(y_of(&m, 0), 3);
        assert_eq!(y_of(&m, 1), 6);
    }

    #[test]
    fn commands_for_missing_boards_are_ignored() {
        let mut m = started(GameMode::Solo);
        m.command(1, Command::HardDrop);
        m.command(5, Command::Rotate(Rotation::Clockwise));
        assert_eq!(m.boards()[0].arena().filled_count(), 0);
    }

    #[test]
    fn restart_resets_mid_game() {
        let mut m = started(GameMode::Survival);
        clear_two_rows(&mut m);
        m.toggle_pause();
        m.start();
        assert!(!m.is_paused());
        assert!(m.take_events().is_empty());
        for board in m.boards() {
            assert_eq!(board.status(), Status::Playing);
            assert_eq!(board.score(), 0);
            assert_eq!(board.arena().filled_count(), 0);
            assert!(board.player().is_some());
        }
    }

    #[test]
    fn pause_is_ignored_after_the_match_ends() {
        let mut m = started(GameMode::Solo);
        for y in 0..3 {
            m.board_mut(0)
                .arena_mut()
                .fill_row_except(y, &[11], Cell::Garbage);
        }
        m.board_mut(0).place(PieceKind::O, 0, 18);
        m.command(0, Command::HardDrop);
        assert!(m.is_over());
        m.toggle_pause();
        assert!(!m.is_paused());
    }
}
