//! Layout and drawing: one or two boards with sidebars, overlays, status line and line-clear flash.

use crate::GameMode;
use crate::arena::Arena;
use crate::board::{Board, Status};
use crate::highscores::Leaderboard;
use crate::matchup::Match;
use crate::piece::{Cell, Matrix};
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Position, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Widget};
use std::collections::HashSet;
use std::time::{Duration, Instant};
use tachyonfx::{
    CellFilter, Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx, ref_count,
};

/// Terminal columns per arena cell; keeps cells roughly square.
const CELL_COLS: u16 = 2;
const SIDEBAR_WIDTH: u16 = 22;
/// Next box (6) + stats box (11).
const SIDEBAR_HEIGHT: u16 = 17;
const BOARD_GAP: u16 = 2;
const STATUS_HEIGHT: u16 = 1;
const LINE_CLEAR_FLASH_MS: u32 = 300;

/// Line-clear flash on one board: the cleared row indices and the running effect.
pub struct Flash {
    rows: Vec<usize>,
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl Flash {
    pub fn new(rows: Vec<usize>) -> Self {
        Self {
            rows,
            effect: None,
            last_process: None,
        }
    }

    pub fn done(&self) -> bool {
        self.effect.as_ref().is_some_and(Effect::done)
    }
}

/// Everything a frame needs besides the flashes.
pub struct View<'a> {
    pub game: &'a Match,
    pub theme: &'a Theme,
    /// None when the leaderboard is disabled.
    pub leaderboard: Option<&'a Leaderboard>,
    /// Transient message (save errors, new record); key hints when None.
    pub status: Option<&'a str>,
    pub now: Instant,
}

fn cells_u16(n: usize) -> u16 {
    u16::try_from(n).unwrap_or(u16::MAX)
}

/// Outer size of one arena panel including its border.
fn panel_size(board: &Board) -> (u16, u16) {
    let arena = board.arena();
    (
        cells_u16(arena.width()).saturating_mul(CELL_COLS).saturating_add(2),
        cells_u16(arena.height()).saturating_add(2),
    )
}

/// Smallest terminal (columns, rows) that fits every board, its sidebar and the status line.
pub fn required_size(game: &Match) -> (u16, u16) {
    let boards = game.boards();
    let width = boards
        .iter()
        .map(|b| panel_size(b).0 + SIDEBAR_WIDTH)
        .sum::<u16>()
        + BOARD_GAP * cells_u16(boards.len().saturating_sub(1));
    let height = boards
        .iter()
        .map(|b| panel_size(b).1.max(SIDEBAR_HEIGHT))
        .max()
        .unwrap_or(0)
        + STATUS_HEIGHT;
    (width, height)
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

pub fn draw(frame: &mut Frame, view: &View, flashes: &mut [Option<Flash>]) {
    let area = frame.area();
    let theme = view.theme;
    Block::default()
        .style(Style::default().bg(theme.bg))
        .render(area, frame.buffer_mut());

    let (need_w, need_h) = required_size(view.game);
    if area.width < need_w || area.height < need_h {
        let msg = format!("Terminal too small: need {need_w}x{need_h}, have {}x{}", area.width, area.height);
        Paragraph::new(Line::from(Span::styled(msg, Style::default().fg(theme.title))))
            .alignment(Alignment::Center)
            .render(centered(area, area.width, 1), frame.buffer_mut());
        return;
    }

    let play = Rect {
        height: need_h - STATUS_HEIGHT,
        ..centered(area, need_w, need_h)
    };
    let mut x = play.x;
    for (index, board) in view.game.boards().iter().enumerate() {
        let (pw, ph) = panel_size(board);
        let panel = Rect {
            x,
            y: play.y,
            width: pw,
            height: ph,
        };
        let sidebar = Rect {
            x: x + pw,
            y: play.y,
            width: SIDEBAR_WIDTH,
            height: play.height,
        };
        let cleared = flashes
            .get(index)
            .and_then(Option::as_ref)
            .filter(|f| !f.done())
            .map_or(&[][..], |f| f.rows.as_slice());
        let inner = draw_arena(frame, board, theme, panel, cleared);
        draw_sidebar(frame, view, board, sidebar);
        if let Some(flash) = flashes.get_mut(index).and_then(Option::as_mut) {
            render_flash(frame, flash, inner, theme, view.now);
        }
        x += pw + SIDEBAR_WIDTH + BOARD_GAP;
    }

    let status = Rect {
        y: play.y + play.height,
        height: STATUS_HEIGHT,
        ..play
    };
    draw_status_line(frame, view, status);

    if view.game.is_over() {
        draw_match_over(frame, view, play);
    } else if view.game.is_paused() {
        draw_pause_overlay(frame, theme, play);
    }
}

/// Arena rows laid out as they stood before the last sweep. Cleared rows are `None`;
/// every other row sits back at its pre-sweep index.
fn rows_before_sweep<'a>(arena: &'a Arena, cleared: &[usize]) -> Vec<Option<&'a [Cell]>> {
    let mut kept = arena.rows().skip(cleared.len());
    (0..arena.height())
        .map(|y| if cleared.contains(&y) { None } else { kept.next() })
        .collect()
}

/// Border plus locked cells plus active piece. Returns the inner cell area.
/// While a flash runs, `cleared` holds the swept rows and they are drawn as solid bars.
fn draw_arena(
    frame: &mut Frame,
    board: &Board,
    theme: &Theme,
    area: Rect,
    cleared: &[usize],
) -> Rect {
    let border = if board.status().is_terminal() {
        theme.inactive_fg
    } else {
        theme.div_line
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border).bg(theme.bg))
        .title(Span::styled(format!(" {} ", board.label()), Style::default().fg(theme.title)));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());

    let buf = frame.buffer_mut();
    let mut paint = |x: i32, y: i32, color: Color| {
        let (Ok(cx), Ok(cy)) = (u16::try_from(x), u16::try_from(y)) else {
            return;
        };
        let (bx, by) = (inner.x + cx * CELL_COLS, inner.y + cy);
        if bx + CELL_COLS <= inner.right() && by < inner.bottom() {
            buf.set_string(bx, by, "██", Style::default().fg(color).bg(theme.bg));
        }
    };
    let width = board.arena().width();
    for (y, row) in rows_before_sweep(board.arena(), cleared).into_iter().enumerate() {
        match row {
            Some(row) => {
                for (x, cell) in row.iter().enumerate() {
                    if !cell.is_empty() {
                        paint(x as i32, y as i32, theme.cell_color(*cell));
                    }
                }
            }
            None => (0..width).for_each(|x| paint(x as i32, y as i32, theme.title)),
        }
    }
    if let Some(player) = board.player() {
        for (x, y, cell) in player.cells() {
            paint(x, y, theme.cell_color(cell));
        }
    }
    inner
}

fn draw_preview(frame: &mut Frame, matrix: &Matrix, theme: &Theme, area: Rect) {
    let buf = frame.buffer_mut();
    let left = area.x + area.width.saturating_sub(cells_u16(matrix.width()) * CELL_COLS) / 2;
    for (x, y, cell) in matrix.blocks() {
        let (bx, by) = (left + cells_u16(x) * CELL_COLS, area.y + cells_u16(y));
        if bx + CELL_COLS <= area.right() && by < area.bottom() {
            buf.set_string(bx, by, "██", Style::default().fg(theme.cell_color(cell)));
        }
    }
}

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{:02}:{:02}", secs / 60, secs % 60)
}

fn draw_sidebar(frame: &mut Frame, view: &View, board: &Board, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(6), Constraint::Length(11)])
        .split(area);

    let next_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Next ", title_style));
    let next_inner = next_block.inner(chunks[0]);
    next_block.render(chunks[0], frame.buffer_mut());
    draw_preview(frame, board.next(), theme, next_inner);

    let status_style = match board.status() {
        Status::Winner => Style::default().fg(theme.title).bold(),
        Status::GameOver => Style::default().fg(theme.inactive_fg),
        _ => fg_style,
    };
    let stat = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };
    let mut lines = vec![
        Line::from(Span::styled(board.status().label(), status_style)),
        stat("Score: ", board.score().to_string()),
        stat("Lines: ", board.lines().to_string()),
        stat("Level: ", board.level().to_string()),
        stat(
            "Level up in: ",
            board
                .lines_for_next_level()
                .saturating_sub(board.lines())
                .to_string(),
        ),
        stat("Drop: ", format!("{} ms", board.drop_interval().as_millis())),
        stat("Time: ", format_duration(board.elapsed())),
    ];
    if let Some(best) = view.leaderboard.and_then(|l| l.entries().first()) {
        lines.push(stat("Best: ", best.score.to_string()));
    }
    let stats_block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(" Stats ", title_style));
    let stats_inner = stats_block.inner(chunks[1]);
    stats_block.render(chunks[1], frame.buffer_mut());
    Paragraph::new(lines).render(stats_inner, frame.buffer_mut());
}

fn draw_status_line(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let line = match view.status {
        Some(msg) => Line::from(Span::styled(msg.to_string(), Style::default().fg(theme.title))),
        None => {
            let hints = match view.game.mode() {
                GameMode::Solo => "AD/←→ move  W/↑ rotate  E or / ccw  S/↓ soft  Space drop  P pause  Esc quit",
                GameMode::Versus | GameMode::Survival => {
                    "P1: A D W E S Space   P2: ← → ↑ / ↓ Enter   P pause  R restart  Esc quit"
                }
            };
            Line::from(Span::styled(hints, Style::default().fg(theme.inactive_fg)))
        }
    };
    Paragraph::new(line)
        .alignment(Alignment::Center)
        .render(area, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup = centered(area, 28, 5);
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(" Paused ", Style::default().fg(Color::Black).bg(theme.title))),
        Line::from(Span::styled("P resume   Esc quit", Style::default().fg(theme.main_fg))),
    ];
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}

/// Headline for a finished match.
fn outcome(game: &Match) -> String {
    let boards = game.boards();
    match game.mode() {
        GameMode::Solo => "Game Over".to_string(),
        GameMode::Survival => boards
            .iter()
            .find(|b| b.status() == Status::Winner)
            .map_or_else(|| "No survivors".to_string(), |b| format!("{} wins!", b.label())),
        GameMode::Versus => match boards {
            [a, b] if a.score() == b.score() => format!("Tie at {}", a.score()),
            [a, b] => {
                let top = if a.score() > b.score() { a } else { b };
                format!("{} wins with {}", top.label(), top.score())
            }
            _ => "Game Over".to_string(),
        },
    }
}

fn draw_match_over(frame: &mut Frame, view: &View, area: Rect) {
    let theme = view.theme;
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(outcome(view.game), title_style.bold())),
        Line::from(""),
    ];
    for board in view.game.boards() {
        lines.push(Line::from(Span::styled(
            format!(
                "{}: {} pts  {} lines  {}",
                board.label(),
                board.score(),
                board.lines(),
                format_duration(board.elapsed())
            ),
            fg_style,
        )));
    }
    if let Some(leaderboard) = view.leaderboard {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled("Leaderboard", title_style)));
        if leaderboard.entries().is_empty() {
            lines.push(Line::from(Span::styled("no scores yet", Style::default().fg(theme.inactive_fg))));
        }
        for (rank, entry) in leaderboard.entries().iter().enumerate() {
            lines.push(Line::from(Span::styled(
                format!(
                    "{}. {:<12} {:>6}  {}  {}",
                    rank + 1,
                    entry.name,
                    entry.score,
                    entry.date,
                    format_duration(Duration::from_secs(entry.duration_secs))
                ),
                fg_style,
            )));
        }
    }
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled("R restart   Esc quit", Style::default().fg(theme.inactive_fg))));

    let popup = centered(area, 46, cells_u16(lines.len()) + 2);
    Clear.render(popup, frame.buffer_mut());
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.title).bg(theme.bg)),
        )
        .style(Style::default().bg(theme.bg))
        .render(popup, frame.buffer_mut());
}

/// Fade the cleared rows from the highlight colour. `draw_arena` keeps them at their
/// pre-sweep positions until the effect is done.
fn render_flash(frame: &mut Frame, flash: &mut Flash, inner: Rect, theme: &Theme, now: Instant) {
    let delta = flash
        .last_process
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or_default();
    flash.last_process = Some(now);
    let delta_ms = u32::try_from(delta.as_millis()).unwrap_or(u32::MAX);

    if flash.effect.is_none() {
        let rows: HashSet<u16> = flash.rows.iter().map(|&y| inner.y + cells_u16(y)).collect();
        let filter = CellFilter::PositionFn(ref_count(move |pos: Position| rows.contains(&pos.y)));
        flash.effect = Some(
            fx::fade_to(theme.title, theme.bg, (LINE_CLEAR_FLASH_MS, Interpolation::QuadOut))
                .with_filter(filter)
                .with_area(inner),
        );
    }
    if let Some(effect) = flash.effect.as_mut() {
        frame.render_effect(effect, inner, TfxDuration::from_millis(delta_ms));
    }
}
