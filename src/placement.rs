//! Placement engine: rotation, collision checks, stamping and line clearing.
//!
//! Everything here is stateless; the game loop threads the board through explicitly.

use crate::board::{Board, Cell};
use crate::shapes::{Offset, Shape};

/// Rotate 90° clockwise: transpose, then reverse each resulting row.
pub fn rotate(shape: &Shape) -> Shape {
    let (w, h) = (shape.width(), shape.height());
    let mut cells = Vec::with_capacity(w * h);
    for row in 0..w {
        for col in 0..h {
            cells.push(shape.is_set(row, h - 1 - col));
        }
    }
    Shape::from_cells(h, w, cells)
}

/// True if every occupied cell of `shape` at `offset` lies within the side walls, above the
/// floor, and on an empty board cell. Cells above the top edge are never rejected.
pub fn valid_move(board: &Board, shape: &Shape, offset: Offset) -> bool {
    let (bw, bh) = (board.width() as i64, board.height() as i64);
    shape.occupied().all(|(x, y)| {
        let bx = x as i64 + i64::from(offset.x);
        let by = y as i64 + i64::from(offset.y);
        if bx < 0 || bx >= bw || by >= bh {
            return false;
        }
        by < 0 || !board.is_occupied(bx as usize, by as usize)
    })
}

/// Stamp `shape` into the board with palette index `color`. Cells outside the board are skipped.
pub fn place_shape(board: &mut Board, shape: &Shape, offset: Offset, color: u8) {
    for (x, y) in shape.occupied() {
        let bx = x as i64 + i64::from(offset.x);
        let by = y as i64 + i64::from(offset.y);
        if bx >= 0 && by >= 0 {
            board.set(bx as usize, by as usize, Cell::Filled(color));
        }
    }
}

/// Remove every full row, pushing empty rows in at the top. Returns the number of rows removed.
///
/// Surviving rows keep their relative order, so this single rebuild matches removing full rows
/// one at a time while scanning top to bottom.
pub fn clear_lines(board: &mut Board) -> usize {
    let width = board.width();
    let full: Vec<bool> = (0..board.height()).map(|y| board.is_row_full(y)).collect();
    let rows = board.take_rows();
    let total = rows.len();
    let kept: Vec<Vec<Cell>> = rows
        .into_iter()
        .zip(full)
        .filter_map(|(row, full)| (!full).then_some(row))
        .collect();
    let cleared = total - kept.len();

    let mut rebuilt = Vec::with_capacity(total);
    rebuilt.extend((0..cleared).map(|_| Board::empty_row(width)));
    rebuilt.extend(kept);
    board.replace_rows(rebuilt);
    cleared
}
