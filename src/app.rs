//! App: terminal init, main loop, tick, key handling and leaderboard bookkeeping.

use crate::board::Status;
use crate::events::GameEvent;
use crate::highscores::{self, Entry, Leaderboard};
use crate::input::{Action, key_to_action};
use crate::matchup::Match;
use crate::theme::Theme;
use crate::ui::{self, Flash, View};
use crate::{Args, GameConfig, GameMode};
use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// ~60 FPS.
const FRAME: Duration = Duration::from_millis(16);
/// How long a status message stays up.
const STATUS_TTL: Duration = Duration::from_secs(4);
/// Longest delta fed to the engine; a stalled terminal must not dump many drops at once.
const MAX_DELTA: Duration = Duration::from_millis(250);

pub struct App {
    args: Args,
    game: Match,
    theme: Theme,
    scores_path: Option<PathBuf>,
    leaderboard: Option<Leaderboard>,
    status: Option<(String, Instant)>,
    flashes: [Option<Flash>; 2],
    last_frame: Instant,
}

impl App {
    pub fn new(args: Args, config: GameConfig, theme: Theme) -> Self {
        let mut status = None;
        let scores_path = match (&args.scores_file, args.no_scores) {
            (_, true) => None,
            (Some(path), false) => Some(path.clone()),
            (None, false) => match highscores::default_path() {
                Ok(path) => Some(path),
                Err(e) => {
                    status = Some((format!("Leaderboard disabled: {e}"), Instant::now()));
                    None
                }
            },
        };
        let leaderboard = scores_path.as_deref().map(Leaderboard::load);
        let mut game = Match::new(config.match_config());
        game.start();
        Self {
            args,
            game,
            theme,
            scores_path,
            leaderboard,
            status,
            flashes: [None, None],
            last_frame: Instant::now(),
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal = DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        terminal.hide_cursor()?;

        let result = self.run_loop(&mut terminal);

        let _ = terminal.show_cursor();
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;
        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.last_frame = Instant::now();
        loop {
            let now = Instant::now();
            let delta = now.saturating_duration_since(self.last_frame).min(MAX_DELTA);
            self.last_frame = now;

            self.game.tick(delta);
            self.drain_events();
            if self.status.as_ref().is_some_and(|(_, at)| at.elapsed() >= STATUS_TTL) {
                self.status = None;
            }

            let view = View {
                game: &self.game,
                theme: &self.theme,
                leaderboard: self.leaderboard.as_ref(),
                status: self.status.as_ref().map(|(msg, _)| msg.as_str()),
                now,
            };
            terminal.draw(|f| ui::draw(f, &view, &mut self.flashes))?;
            for slot in &mut self.flashes {
                if slot.as_ref().is_some_and(Flash::done) {
                    *slot = None;
                }
            }

            let timeout = FRAME.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Press and auto-repeat move pieces; releases are ignored.
                        if key.kind == KeyEventKind::Release {
                            continue;
                        }
                        if !self.handle(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }

    /// Apply an action. Returns false when the app should exit.
    fn handle(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause => self.game.toggle_pause(),
            Action::Restart => self.restart(),
            Action::Command(player, command) => {
                let board = if self.game.mode() == GameMode::Solo {
                    0
                } else {
                    player
                };
                self.game.command(board, command);
                self.drain_events();
            }
            Action::None => {}
        }
        true
    }

    fn restart(&mut self) {
        self.game.start();
        self.flashes = [None, None];
        self.status = None;
        self.last_frame = Instant::now();
    }

    fn set_status(&mut self, msg: String) {
        self.status = Some((msg, Instant::now()));
    }

    fn drain_events(&mut self) {
        for event in self.game.take_events() {
            let label = event
                .board()
                .and_then(|i| self.game.boards().get(i))
                .map(|b| b.label().to_string())
                .unwrap_or_default();
            match event {
                GameEvent::LinesCleared {
                    board,
                    count,
                    base_points,
                    bonus_points,
                    rows,
                } => {
                    if bonus_points > 0 {
                        self.set_status(format!(
                            "{label} cleared {count} rows: {base_points} + {bonus_points} bonus"
                        ));
                    }
                    if !self.args.no_animation {
                        if let Some(slot) = self.flashes.get_mut(board) {
                            *slot = Some(Flash::new(rows));
                        }
                    }
                    // Garbage just shifted the opponent's rows under any flash it had running.
                    if self.game.mode() == GameMode::Survival {
                        if let Some(slot) = self.flashes.get_mut(1 - board.min(1)) {
                            *slot = None;
                        }
                    }
                }
                GameEvent::GameOver {
                    final_score,
                    duration,
                    ..
                } => self.record(&label, final_score, duration),
                GameEvent::LevelUp { level, .. } => {
                    self.set_status(format!("{label} reached level {level}"));
                }
                GameEvent::SurvivalWin { winner, loser } => {
                    self.set_status(format!("{winner} outlasted {loser}"));
                    // The survivor never tops out, so its score is offered here.
                    let survivor = self
                        .game
                        .boards()
                        .iter()
                        .find(|b| b.status() == Status::Winner)
                        .map(|b| (b.score(), b.elapsed()));
                    if let Some((score, elapsed)) = survivor {
                        self.record(&winner, score, elapsed);
                    }
                }
                GameEvent::Locked { .. } => {}
            }
        }
    }

    /// Offer a finished board's score to the leaderboard and persist it.
    fn record(&mut self, name: &str, score: u32, duration: Duration) {
        let (Some(leaderboard), Some(path)) = (self.leaderboard.as_mut(), self.scores_path.as_deref())
        else {
            return;
        };
        let Some(rank) = leaderboard.insert(Entry::now(name, score, duration)) else {
            return;
        };
        let msg = match leaderboard.save(path) {
            Ok(()) => format!("{name} takes #{} on the leaderboard with {score}", rank + 1),
            Err(e) => format!("Could not save leaderboard: {e}"),
        };
        self.set_status(msg);
    }
}
