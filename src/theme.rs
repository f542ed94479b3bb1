//! Theme loading: btop-style `theme[key]="value"` files and hex → ratatui Color.

use crate::Palette;
use crate::piece::Cell;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

const fn rgb(hex: u32) -> Color {
    Color::Rgb((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
}

/// One Dark piece colours, indexed by cell code minus one: T, O, L, J, I, S, Z, garbage.
const ONEDARK_PIECES: [Color; 8] = [
    rgb(0xC678DD),
    rgb(0xE5C07B),
    rgb(0xD19A66),
    rgb(0x61AFEF),
    rgb(0x56B6C2),
    rgb(0x98C379),
    rgb(0xE06C75),
    rgb(0x5C6370),
];

const HIGH_CONTRAST_PIECES: [Color; 8] = [
    rgb(0xFF00FF),
    rgb(0xFFFF00),
    rgb(0xFF8800),
    rgb(0x0088FF),
    rgb(0x00FFFF),
    rgb(0x00FF00),
    rgb(0xFF0000),
    rgb(0xBBBBBB),
];

/// Okabe-Ito style set; no two pieces rely on red/green alone.
const COLORBLIND_PIECES: [Color; 8] = [
    rgb(0xEE3377),
    rgb(0xBBBB00),
    rgb(0xEE7733),
    rgb(0x0077BB),
    rgb(0x33BBEE),
    rgb(0x009988),
    rgb(0xCC3311),
    rgb(0x777777),
];

/// Theme keys consulted for each piece colour, first hit wins.
const PIECE_KEYS: [&[&str]; 8] = [
    &["piece_t", "net_box"],
    &["piece_o", "title", "cpu_mid"],
    &["piece_l", "proc_box"],
    &["piece_j", "cpu_box"],
    &["piece_i", "hi_fg", "proc_misc"],
    &["piece_s", "mem_box", "cpu_start"],
    &["piece_z", "cpu_end", "temp_end"],
    &["garbage", "inactive_fg"],
];

#[derive(Debug, Clone)]
pub struct Theme {
    /// Piece colours by cell code minus one.
    pub pieces: [Color; 8],
    /// Arena background.
    pub bg: Color,
    /// Borders.
    pub div_line: Color,
    /// Score, level and body text.
    pub main_fg: Color,
    /// Titles and highlights.
    pub title: Color,
    /// Secondary text: hints, finished boards.
    pub inactive_fg: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::onedark()
    }
}

impl Theme {
    pub const fn onedark() -> Self {
        Self {
            pieces: ONEDARK_PIECES,
            bg: rgb(0x282C34),
            div_line: rgb(0x3F444F),
            main_fg: rgb(0xABB2BF),
            title: rgb(0xE5C07B),
            inactive_fg: rgb(0x5C6370),
        }
    }

    /// Load a btop-style theme file, then apply `palette` on top.
    /// A missing or unset path yields One Dark.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let mut theme = match path {
            Some(p) if p.exists() => Self::from_map(&parse_theme_file(&std::fs::read_to_string(p)?)),
            _ => Self::onedark(),
        };
        theme.apply_palette(palette);
        Ok(theme)
    }

    /// Replace piece colours for the high-contrast and colorblind palettes.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.pieces = HIGH_CONTRAST_PIECES;
                self.bg = Color::Black;
                self.main_fg = Color::White;
            }
            Palette::Colorblind => self.pieces = COLORBLIND_PIECES,
        }
    }

    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |keys: &[&str]| keys.iter().find_map(|k| map.get(*k).and_then(|v| parse_hex(v).ok()));
        let base = Self::onedark();
        let mut pieces = base.pieces;
        for (slot, keys) in pieces.iter_mut().zip(PIECE_KEYS) {
            if let Some(color) = get(keys) {
                *slot = color;
            }
        }
        Self {
            pieces,
            bg: get(&["main_bg", "meter_bg"]).unwrap_or(base.bg),
            div_line: get(&["div_line"]).unwrap_or(base.div_line),
            main_fg: get(&["main_fg"]).unwrap_or(base.main_fg),
            title: get(&["title"]).unwrap_or(base.title),
            inactive_fg: get(&["inactive_fg"]).unwrap_or(base.inactive_fg),
        }
    }

    /// Colour for a locked or falling cell; empty cells use the background.
    pub fn cell_color(&self, cell: Cell) -> Color {
        match cell.code() {
            0 => self.bg,
            code => self.pieces[(usize::from(code) - 1) % self.pieces.len()],
        }
    }
}

/// Parse a btop-style theme file into key -> value.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .filter_map(|line| {
            let (key, rest) = line.strip_prefix("theme[")?.split_once(']')?;
            let (_, value) = rest.split_once('=')?;
            let value = value.trim().trim_matches('"').trim_matches('\'');
            (!value.is_empty()).then(|| (key.trim().to_string(), value.to_string()))
        })
        .collect()
}

/// Parse "#RRGGBB" or "#RGB".
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let hex = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.trim().to_string());
    if !hex.is_ascii() {
        return Err(invalid());
    }
    let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).map_err(|_| invalid());
    match hex.len() {
        6 => Ok(Color::Rgb(channel(0..2)?, channel(2..4)?, channel(4..6)?)),
        3 => Ok(Color::Rgb(
            channel(0..1)? * 17,
            channel(1..2)? * 17,
            channel(2..3)? * 17,
        )),
        _ => Err(invalid()),
    }
}
