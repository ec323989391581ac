//! Tetromino catalog: the seven shapes as binary grids, plus the `Shape` and `Offset` types.

use std::fmt;

/// Tetromino kinds (I, O, T, S, Z, L, J), in catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TetrominoKind {
    I,
    O,
    T,
    S,
    Z,
    L,
    J,
}

impl TetrominoKind {
    pub const ALL: [Self; 7] = [Self::I, Self::O, Self::T, Self::S, Self::Z, Self::L, Self::J];

    /// Spawn orientation as rows of 0/1.
    pub fn pattern(&self) -> &'static [&'static [u8]] {
        match self {
            Self::I => &[&[1, 1, 1, 1]],
            Self::O => &[&[1, 1], &[1, 1]],
            Self::T => &[&[0, 1, 0], &[1, 1, 1]],
            Self::S => &[&[1, 1, 0], &[0, 1, 1]],
            Self::Z => &[&[0, 1, 1], &[1, 1, 0]],
            Self::L => &[&[1, 0, 0], &[1, 1, 1]],
            Self::J => &[&[0, 0, 1], &[1, 1, 1]],
        }
    }

    /// Fresh working copy of the spawn orientation.
    pub fn shape(&self) -> Shape {
        Shape::from_rows(self.pattern())
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::I => "I",
            Self::O => "O",
            Self::T => "T",
            Self::S => "S",
            Self::Z => "Z",
            Self::L => "L",
            Self::J => "J",
        }
    }
}

impl fmt::Display for TetrominoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rectangular binary matrix, stored row-major. `cells[y * width + x]` is true when occupied.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape {
    width: usize,
    height: usize,
    cells: Vec<bool>,
}

impl Shape {
    /// Build from rows of 0/1. Rows shorter than the first are padded with empty cells.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len();
        let width = rows.first().map_or(0, |r| r.len());
        let mut cells = vec![false; width * height];
        for (y, row) in rows.iter().enumerate() {
            for (x, &v) in row.iter().take(width).enumerate() {
                cells[y * width + x] = v != 0;
            }
        }
        Self {
            width,
            height,
            cells,
        }
    }

    pub(crate) fn from_cells(width: usize, height: usize, cells: Vec<bool>) -> Self {
        debug_assert_eq!(cells.len(), width * height);
        Self {
            width,
            height,
            cells,
        }
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
    pub fn is_set(&self, x: usize, y: usize) -> bool {
        x < self.width && y < self.height && self.cells[y * self.width + x]
    }

    /// Occupied cells as (x, y) relative to the bounding box, row by row.
    pub fn occupied(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let w = self.width.max(1);
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, set)| **set)
            .map(move |(i, _)| (i % w, i / w))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.iter().filter(|c| **c).count()
    }
}

/// Board coordinate of a shape's bounding-box top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset {
    pub x: i32,
    pub y: i32,
}

impl Offset {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub const fn left(self) -> Self {
        Self::new(self.x - 1, self.y)
    }

    pub const fn right(self) -> Self {
        Self::new(self.x + 1, self.y)
    }

    pub const fn down(self) -> Self {
        Self::new(self.x, self.y + 1)
    }
}
