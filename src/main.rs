//! stackduel: falling-block puzzle game in the terminal, solo or head-to-head.

mod app;
mod arena;
mod board;
mod events;
mod highscores;
mod input;
mod matchup;
mod piece;
mod theme;
mod ui;

use anyhow::Result;
use app::App;
use board::BoardConfig;
use clap::{Parser, ValueEnum};
use matchup::MatchConfig;

/// Smallest arena accepted from the command line, in cells.
const MIN_ARENA_SIDE: u16 = 4;

/// Options derived from CLI that shape the match (mode, scoring, arena, seed, names).
#[derive(Debug, Clone)]
pub struct GameConfig {
    pub mode: GameMode,
    pub scoring: ScoringPolicy,
    pub width: usize,
    pub height: usize,
    pub start_level: u32,
    pub seed: u64,
    pub names: [String; 2],
}

impl GameConfig {
    pub fn match_config(&self) -> MatchConfig {
        MatchConfig {
            mode: self.mode,
            board: BoardConfig {
                width: self.width,
                height: self.height,
                start_level: self.start_level,
                scoring: self.scoring,
            },
            labels: self.names.clone(),
            seed: self.seed,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_default();
    let config = GameConfig {
        mode: args.mode,
        scoring: args.scoring,
        width: usize::from(args.width.max(MIN_ARENA_SIDE)),
        height: usize::from(args.height.max(MIN_ARENA_SIDE)),
        start_level: args.level.max(1),
        seed: args.seed.unwrap_or_else(rand::random),
        names: [args.p1_name.clone(), args.p2_name.clone()],
    };
    let mut app = App::new(args, config, theme);
    app.run()?;
    Ok(())
}

/// Falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "stackduel",
    version,
    about = "Falling-block puzzle in the terminal. Clear rows to score; in survival mode every row you clear lands under your opponent.",
    long_about = "stackduel is a falling-block puzzle game for one or two players sharing a keyboard.\n\n\
        Solo: play until the stack reaches the top. Versus: two independent boards side by side. \
        Survival: every row you clear is pushed under your opponent's stack as a garbage row \
        with a single hole; the first board that cannot place a piece loses.\n\n\
        CONTROLS (player 1 / solo):\n  A/D  Move    W  Rotate CW   E  Rotate CCW   S  Soft drop   Space  Hard drop\n\n\
        CONTROLS (player 2 / solo):\n  Left/Right  Move    Up  Rotate CW   /  Rotate CCW   Down  Soft drop   Enter  Hard drop\n\n\
        P  Pause    R  Restart    Esc  Quit"
)]
pub struct Args {
    /// Game mode: solo (one board), versus (two independent boards) or survival (two boards trading garbage rows).
    #[arg(short, long, default_value = "solo")]
    pub mode: GameMode,

    /// Scoring edition: percent (10 per row plus 10% per row bonus on multi-row clears) or doubling (each extra row in a clear is worth twice the previous).
    #[arg(long, default_value = "percent")]
    pub scoring: ScoringPolicy,

    /// Arena width in cells.
    #[arg(long, default_value = "12", value_name = "COLS")]
    pub width: u16,

    /// Arena height in cells.
    #[arg(long, default_value = "20", value_name = "ROWS")]
    pub height: u16,

    /// Starting level (gravity speed).
    #[arg(long, default_value = "1", value_name = "N")]
    pub level: u32,

    /// Seed for the piece and garbage random streams; random when not set.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Name of player 1 (left board), also used on the leaderboard.
    #[arg(long, default_value = "Player 1", value_name = "NAME")]
    pub p1_name: String,

    /// Name of player 2 (right board).
    #[arg(long, default_value = "Player 2", value_name = "NAME")]
    pub p2_name: String,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses One Dark if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the line-clear flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Leaderboard file. Defaults to <config dir>/stackduel/leaderboard.json.
    #[arg(long, value_name = "FILE")]
    pub scores_file: Option<std::path::PathBuf>,

    /// Neither read nor write the leaderboard.
    #[arg(long)]
    pub no_scores: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum GameMode {
    #[default]
    Solo,
    Versus,
    Survival,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ScoringPolicy {
    #[default]
    Percent,
    Doubling,
}
