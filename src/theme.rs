//! Palette loading: btop-style `theme[key]="value"` files and hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Number of piece colours; board cells store a 1-based index into this palette.
pub const PALETTE_SIZE: usize = 7;

/// Theme keys for the piece palette, in catalog order (I, O, T, S, Z, L, J).
const PIECE_KEYS: [&str; PALETTE_SIZE] = [
    "piece_i", "piece_o", "piece_t", "piece_s", "piece_z", "piece_l", "piece_j",
];

const CYAN: Color = Color::Rgb(0, 255, 255);
const BLUE: Color = Color::Rgb(0, 0, 255);
const ORANGE: Color = Color::Rgb(255, 165, 0);
const YELLOW: Color = Color::Rgb(255, 255, 0);
const GREEN: Color = Color::Rgb(0, 255, 0);
const MAGENTA: Color = Color::Rgb(255, 0, 255);
const RED: Color = Color::Rgb(255, 0, 0);
const WHITE: Color = Color::Rgb(255, 255, 255);
const BLACK: Color = Color::Rgb(0, 0, 0);

/// Colours used by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Piece colours; slot 0 is palette index 1.
    pub pieces: [Color; PALETTE_SIZE],
    /// Empty board cell.
    pub empty: Color,
    /// Cell border glyphs.
    pub border: Color,
    /// Screen background around the board.
    pub background: Color,
    /// Title and game-over text.
    pub text: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
    #[error("invalid colour for theme[{key}]: {source}")]
    InvalidKey {
        key: String,
        #[source]
        source: Box<ThemeError>,
    },
}

impl Default for Theme {
    fn default() -> Self {
        Self::classic()
    }
}

impl Theme {
    /// Cyan, blue, orange, yellow, green, magenta, red on white cells with black borders.
    pub fn classic() -> Self {
        Self {
            pieces: [CYAN, BLUE, ORANGE, YELLOW, GREEN, MAGENTA, RED],
            empty: WHITE,
            border: BLACK,
            background: BLACK,
            text: WHITE,
        }
    }

    /// Load overrides from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to the classic palette if path is None or the file is missing.
    pub fn load(path: Option<&Path>) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            Some(p) => {
                warn!(path = %p.display(), "theme file not found, using classic palette");
                return Ok(Self::default());
            }
            None => return Ok(Self::default()),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        debug!(path = %path.display(), keys = map.len(), "loaded theme");
        Self::from_map(&map)
    }

    fn from_map(map: &HashMap<String, String>) -> Result<Self, ThemeError> {
        let mut theme = Self::default();
        for (i, key) in PIECE_KEYS.iter().enumerate() {
            if let Some(c) = lookup(map, key)? {
                theme.pieces[i] = c;
            }
        }
        if let Some(c) = lookup(map, "empty")? {
            theme.empty = c;
        }
        if let Some(c) = lookup(map, "border")? {
            theme.border = c;
        }
        if let Some(c) = lookup(map, "background")? {
            theme.background = c;
        }
        if let Some(c) = lookup(map, "text")? {
            theme.text = c;
        }
        for key in map.keys() {
            let known = PIECE_KEYS.contains(&key.as_str())
                || matches!(key.as_str(), "empty" | "border" | "background" | "text");
            if !known {
                debug!(key = %key, "ignoring unknown theme key");
            }
        }
        Ok(theme)
    }

    /// Colour for a 1-based palette index as stored in board cells.
    #[inline]
    pub fn block_color(&self, index: u8) -> Color {
        let slot = (index as usize).saturating_sub(1) % PALETTE_SIZE;
        self.pieces[slot]
    }
}

fn lookup(map: &HashMap<String, String>, key: &str) -> Result<Option<Color>, ThemeError> {
    map.get(key)
        .map(|v| {
            parse_hex(v).map_err(|e| ThemeError::InvalidKey {
                key: key.to_string(),
                source: Box::new(e),
            })
        })
        .transpose()
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        if let Some(stripped) = line.strip_prefix("theme[") {
            if let Some(end) = stripped.find(']') {
                let key = stripped[..end].trim();
                let rest = stripped[end + 1..].trim();
                if let Some(value) = rest.strip_prefix('=') {
                    let value = value.trim().trim_matches('"').trim_matches('\'').to_string();
                    if !value.is_empty() {
                        map.insert(key.to_string(), value);
                    }
                }
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}
