//! Board: fixed-size grid of cells. y=0 is the top row.

/// Board columns: 300 px window / 30 px blocks.
pub const BOARD_WIDTH: usize = 10;
/// Board rows: 600 px window / 30 px blocks.
pub const BOARD_HEIGHT: usize = 20;

/// Single cell: empty, or filled with a 1-based palette index (1..=7).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(u8),
}

impl Cell {
    #[inline]
    pub fn is_filled(self) -> bool {
        matches!(self, Self::Filled(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    width: usize,
    height: usize,
    /// rows[y][x] = cell. rows[0] is top.
    rows: Vec<Vec<Cell>>,
}

impl Board {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            rows: (0..height).map(|_| Self::empty_row(width)).collect(),
        }
    }

    pub(crate) fn empty_row(width: usize) -> Vec<Cell> {
        vec![Cell::Empty; width]
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> Option<Cell> {
        self.rows.get(y).and_then(|row| row.get(x)).copied()
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    #[inline]
    pub fn is_occupied(&self, x: usize, y: usize) -> bool {
        self.get(x, y).is_some_and(Cell::is_filled)
    }

    /// True when row `y` has no empty cell. Rows outside the board are never full.
    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|c| c.is_filled()))
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Replace every row at once. Used by line clearing; the row count and width must not change.
    pub(crate) fn replace_rows(&mut self, rows: Vec<Vec<Cell>>) {
        debug_assert_eq!(rows.len(), self.height);
        debug_assert!(rows.iter().all(|r| r.len() == self.width));
        self.rows = rows;
    }

    pub(crate) fn take_rows(&mut self) -> Vec<Vec<Cell>> {
        std::mem::take(&mut self.rows)
    }

    pub fn occupied_count(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|c| c.is_filled())
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new(BOARD_WIDTH, BOARD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_board_is_empty_with_fixed_dims() {
        let board = Board::default();
        assert_eq!((board.width(), board.height()), (BOARD_WIDTH, BOARD_HEIGHT));
        assert_eq!(board.occupied_count(), 0);
        assert!(board.rows().iter().all(|r| r.len() == BOARD_WIDTH));
    }

    #[test]
    fn set_and_get() {
        let mut board = Board::new(4, 3);
        board.set(2, 1, Cell::Filled(3));
        assert_eq!(board.get(2, 1), Some(Cell::Filled(3)));
        assert!(board.is_occupied(2, 1));
        assert!(!board.is_occupied(1, 1));
        assert_eq!(board.occupied_count(), 1);
    }

    #[test]
    fn out_of_range_is_ignored() {
        let mut board = Board::new(4, 3);
        board.set(4, 0, Cell::Filled(1));
        board.set(0, 3, Cell::Filled(1));
        assert_eq!(board.occupied_count(), 0);
        assert_eq!(board.get(4, 0), None);
        assert!(!board.is_occupied(0, 3));
    }

    #[test]
    fn row_full_only_when_every_cell_filled() {
        let mut board = Board::new(3, 2);
        board.set(0, 1, Cell::Filled(1));
        board.set(1, 1, Cell::Filled(2));
        assert!(!board.is_row_full(1));
        board.set(2, 1, Cell::Filled(3));
        assert!(board.is_row_full(1));
        assert!(!board.is_row_full(0));
        assert!(!board.is_row_full(2));
        assert!(!board.is_row_full(usize::MAX));
    }
}
