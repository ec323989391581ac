//! Drawing: board grid, falling piece, game-over overlay.

use crate::board::Cell as BoardCell;
use crate::game::GameState;
use crate::theme::Theme;
use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// One board cell is two terminal columns by one row, which keeps the 30×30 px block roughly square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
/// Left and right edge of a cell, drawn in the border colour over the fill colour.
const CELL_GLYPHS: [&str; CELL_WIDTH as usize] = ["▏", "▕"];

/// Game-over text sits at pixel row 250 of the 600 px window, i.e. board row 8.
const GAME_OVER_ROW: u16 = 250 / 30;
pub const GAME_OVER_TEXT: &str = "Game Over!";

const TITLE: &str = " blockdrop ";
/// On game over the dimmed board fades in from the background colour.
const GAME_OVER_FADE_MS: u32 = 600;

/// Outer size (border included) of the board frame for a board of `width` × `height` cells.
fn board_frame_size(width: usize, height: usize) -> (u16, u16) {
    (
        width as u16 * CELL_WIDTH + 2,
        height as u16 * CELL_HEIGHT + 2,
    )
}

/// Game-over flash state; lives in the app between frames.
#[derive(Default)]
pub struct GameOverFx {
    effect: Option<Effect>,
    last_process: Option<Instant>,
}

impl GameOverFx {
    pub fn reset(&mut self) {
        self.effect = None;
        self.last_process = None;
    }

    fn render(&mut self, frame: &mut Frame, theme: &Theme, area: Rect, now: Instant) {
        let delta = self
            .last_process
            .map(|t| now.saturating_duration_since(t))
            .unwrap_or(std::time::Duration::ZERO);
        let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
        self.last_process = Some(now);

        let effect = self.effect.get_or_insert_with(|| {
            fx::fade_from(
                theme.background,
                theme.background,
                (GAME_OVER_FADE_MS, Interpolation::Linear),
            )
            .with_area(area)
        });
        if !effect.done() {
            frame.render_effect(effect, area, TfxDuration::from_millis(delta_ms));
        }
    }
}

/// Draw one frame: background, board, falling piece, then the game-over overlay if the game has
/// ended. `flash` is `None` when animations are disabled.
pub fn draw(
    frame: &mut Frame,
    state: &GameState,
    theme: &Theme,
    flash: Option<&mut GameOverFx>,
    now: Instant,
) {
    let area = frame.area();
    Block::default()
        .style(Style::default().bg(theme.background))
        .render(area, frame.buffer_mut());

    let board_rect = draw_board(frame.buffer_mut(), state, theme, area);
    draw_piece(frame.buffer_mut(), state, theme, board_rect);

    if state.is_game_over() {
        frame
            .buffer_mut()
            .set_style(board_rect, Style::default().add_modifier(Modifier::DIM));
        if let Some(flash) = flash {
            flash.render(frame, theme, board_rect, now);
        }
        draw_game_over(frame.buffer_mut(), theme, board_rect);
    }
}

/// Board frame centred in `area`. Returns the inner rect the cells are drawn into.
fn draw_board(buf: &mut Buffer, state: &GameState, theme: &Theme, area: Rect) -> Rect {
    let board = &state.board;
    let (fw, fh) = board_frame_size(board.width(), board.height());

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(fw),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(fh),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let outer = vert[1];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.text).bg(theme.background))
        .title(Span::styled(TITLE, Style::default().fg(theme.text)));
    let inner = block.inner(outer);
    block.render(outer, buf);

    for (y, row) in board.rows().iter().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            let fill = match *cell {
                BoardCell::Empty => theme.empty,
                BoardCell::Filled(i) => theme.block_color(i),
            };
            draw_cell(buf, inner, x, y, fill, theme.border);
        }
    }
    inner
}

fn draw_piece(buf: &mut Buffer, state: &GameState, theme: &Theme, board_rect: Rect) {
    let fill = theme.block_color(state.color);
    for (x, y) in state.piece_cells() {
        draw_cell(buf, board_rect, x, y, fill, theme.border);
    }
}

/// Filled cell with thin edges. Anything outside `board_rect` is clipped.
fn draw_cell(buf: &mut Buffer, board_rect: Rect, x: usize, y: usize, fill: Color, border: Color) {
    let style = Style::default().fg(border).bg(fill);
    let ry = board_rect.y + y as u16 * CELL_HEIGHT;
    if ry >= board_rect.bottom() {
        return;
    }
    for (i, glyph) in CELL_GLYPHS.iter().enumerate() {
        let rx = board_rect.x + x as u16 * CELL_WIDTH + i as u16;
        if rx < board_rect.right() {
            buf[(rx, ry)].set_symbol(glyph).set_style(style);
        }
    }
}

/// Text goes at board row 8, or the last visible row when the board is clipped.
fn draw_game_over(buf: &mut Buffer, theme: &Theme, board_rect: Rect) {
    if board_rect.is_empty() {
        return;
    }
    let row = GAME_OVER_ROW.min(board_rect.height - 1);
    let style = Style::default()
        .fg(theme.text)
        .bg(theme.background)
        .remove_modifier(Modifier::DIM);
    let lines = vec![
        Line::from(Span::styled(
            format!(" {GAME_OVER_TEXT} "),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        Line::from(Span::styled(" Q — Quit ", style)),
    ];
    let rect = Rect {
        x: board_rect.x,
        y: board_rect.y + row,
        width: board_rect.width,
        height: (board_rect.height - row).min(3),
    };
    Paragraph::new(lines)
        .alignment(Alignment::Center)
        .render(rect, buf);
}
