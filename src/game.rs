//! Game state: board, falling piece, spawn / fall / lock cycle.

use crate::board::Board;
use crate::placement::{clear_lines, place_shape, rotate, valid_move};
use crate::shapes::{Offset, Shape, TetrominoKind};
use crate::theme::PALETTE_SIZE;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

/// Every piece enters with its bounding box at column 5, row 0.
pub const SPAWN_OFFSET: Offset = Offset::new(5, 0);

/// Palette index stamped into the board for every locked cell with `--mono-lock`.
pub const MONO_LOCK_COLOR: u8 = 1;

/// Where the game is in its spawn / fall / lock cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Spawning,
    Falling,
    Locking,
    GameOver,
}

/// Board plus the falling piece. Owned by the app loop; nothing else mutates it.
#[derive(Debug)]
pub struct GameState {
    pub board: Board,
    pub kind: TetrominoKind,
    /// Current orientation of the falling piece.
    pub shape: Shape,
    /// 1-based palette index of the falling piece.
    pub color: u8,
    pub offset: Offset,
    phase: Phase,
    mono_lock: bool,
    rng: SmallRng,
    pieces_locked: u64,
    lines_cleared: u64,
}

impl GameState {
    pub fn new(config: &crate::GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        let kind = TetrominoKind::I;
        let mut state = Self {
            board: Board::default(),
            kind,
            shape: kind.shape(),
            color: 1,
            offset: SPAWN_OFFSET,
            phase: Phase::Spawning,
            mono_lock: config.mono_lock,
            rng,
            pieces_locked: 0,
            lines_cleared: 0,
        };
        state.spawn();
        state
    }

    #[inline]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    #[inline]
    pub fn is_game_over(&self) -> bool {
        self.phase() == Phase::GameOver
    }

    pub fn pieces_locked(&self) -> u64 {
        self.pieces_locked
    }

    pub fn lines_cleared(&self) -> u64 {
        self.lines_cleared
    }

    /// Pick a random shape and, independently, a random colour; place it at the spawn offset.
    /// An immediate collision ends the game.
    fn spawn(&mut self) {
        self.phase = Phase::Spawning;
        let kind = TetrominoKind::ALL[self.rng.random_range(0..TetrominoKind::ALL.len())];
        self.kind = kind;
        self.shape = kind.shape();
        self.color = self.rng.random_range(1..=PALETTE_SIZE as u8);
        self.offset = SPAWN_OFFSET;

        if valid_move(&self.board, &self.shape, self.offset) {
            self.phase = Phase::Falling;
            debug!(kind = %kind, color = self.color, "spawned piece");
        } else {
            self.phase = Phase::GameOver;
            info!(
                kind = %kind,
                pieces = self.pieces_locked,
                lines = self.lines_cleared,
                "spawn blocked, game over"
            );
        }
    }

    /// One fall step. If the piece can't move down it locks, full rows clear and the next piece
    /// spawns, all within this tick.
    pub fn tick(&mut self) {
        if self.phase != Phase::Falling {
            return;
        }
        let down = self.offset.down();
        if valid_move(&self.board, &self.shape, down) {
            self.offset = down;
            return;
        }
        self.phase = Phase::Locking;
        self.lock_piece();
        self.spawn();
    }

    fn lock_piece(&mut self) {
        let color = if self.mono_lock {
            MONO_LOCK_COLOR
        } else {
            self.color
        };
        place_shape(&mut self.board, &self.shape, self.offset, color);
        self.pieces_locked += 1;

        let cleared = clear_lines(&mut self.board);
        self.lines_cleared += cleared as u64;
        trace!(
            kind = %self.kind,
            x = self.offset.x,
            y = self.offset.y,
            cells = self.shape.cell_count(),
            occupied = self.board.occupied_count(),
            "locked piece"
        );
        if cleared > 0 {
            debug!(cleared, total = self.lines_cleared, "cleared lines");
        }
    }

    /// Move or rotate only if the result is valid; otherwise nothing happens.
    fn try_move(&mut self, to: Offset) -> bool {
        if self.phase != Phase::Falling || !valid_move(&self.board, &self.shape, to) {
            return false;
        }
        self.offset = to;
        true
    }

    pub fn move_left(&mut self) -> bool {
        self.try_move(self.offset.left())
    }

    pub fn move_right(&mut self) -> bool {
        self.try_move(self.offset.right())
    }

    /// Soft drop by one row. Never locks; locking only happens on the fall tick.
    pub fn soft_drop(&mut self) -> bool {
        self.try_move(self.offset.down())
    }

    /// Rotate clockwise in place (same offset, no wall kicks).
    pub fn rotate(&mut self) -> bool {
        if self.phase != Phase::Falling {
            return false;
        }
        let rotated = rotate(&self.shape);
        if !valid_move(&self.board, &rotated, self.offset) {
            return false;
        }
        self.shape = rotated;
        true
    }

    /// Board cells covered by the falling piece, clipped to the board.
    pub fn piece_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (w, h) = (self.board.width() as i64, self.board.height() as i64);
        self.shape.occupied().filter_map(move |(x, y)| {
            let bx = x as i64 + i64::from(self.offset.x);
            let by = y as i64 + i64::from(self.offset.y);
            (bx >= 0 && bx < w && by >= 0 && by < h).then_some((bx as usize, by as usize))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GameConfig;
    use crate::board::Cell;

    fn seeded(seed: u64) -> GameState {
        GameState::new(&GameConfig {
            seed: Some(seed),
            ..GameConfig::default()
        })
    }

    fn set_piece(state: &mut GameState, kind: TetrominoKind, offset: Offset) {
        state.kind = kind;
        state.shape = kind.shape();
        state.offset = offset;
    }

    #[test]
    fn spawn_is_valid_on_empty_board_for_every_shape() {
        let board = Board::default();
        for kind in TetrominoKind::ALL {
            assert!(valid_move(&board, &kind.shape(), SPAWN_OFFSET), "{kind}");
        }
        let state = seeded(1);
        assert_eq!(state.phase(), Phase::Falling);
        assert_eq!(state.offset, SPAWN_OFFSET);
        assert!((1..=PALETTE_SIZE as u8).contains(&state.color));
    }

    #[test]
    fn tick_moves_piece_down() {
        let mut state = seeded(2);
        state.tick();
        assert_eq!(state.offset, Offset::new(5, 1));
        assert_eq!(state.board.occupied_count(), 0);
    }

    #[test]
    fn lock_adds_exactly_the_piece_cells() {
        for seed in 0..20 {
            let mut state = seeded(seed);
            let cells = state.shape.cell_count();
            while valid_move(&state.board, &state.shape, state.offset.down()) {
                state.tick();
                assert_eq!(state.board.occupied_count(), 0);
            }
            state.tick();
            assert_eq!(state.board.occupied_count(), cells, "seed {seed}");
            assert_eq!(state.pieces_locked(), 1);
            assert_eq!(state.phase(), Phase::Falling);
            assert_eq!(state.offset, SPAWN_OFFSET);
        }
    }

    #[test]
    fn locked_cells_keep_piece_color() {
        let mut state = seeded(3);
        set_piece(&mut state, TetrominoKind::O, Offset::new(0, 18));
        state.color = 5;
        state.tick();
        assert_eq!(state.board.get(0, 19), Some(Cell::Filled(5)));
        assert_eq!(state.board.get(1, 18), Some(Cell::Filled(5)));
    }

    #[test]
    fn mono_lock_stamps_fixed_index() {
        let mut state = GameState::new(&GameConfig {
            seed: Some(3),
            mono_lock: true,
            ..GameConfig::default()
        });
        set_piece(&mut state, TetrominoKind::O, Offset::new(0, 18));
        state.color = 5;
        state.tick();
        assert_eq!(state.board.get(0, 19), Some(Cell::Filled(MONO_LOCK_COLOR)));
    }

    #[test]
    fn completing_a_row_clears_it() {
        let mut state = seeded(4);
        for x in (0..5).chain(9..10) {
            state.board.set(x, 19, Cell::Filled(2));
        }
        state.board.set(0, 18, Cell::Filled(3));
        set_piece(&mut state, TetrominoKind::I, Offset::new(5, 19));
        state.tick();
        assert_eq!(state.lines_cleared(), 1);
        assert_eq!(state.board.occupied_count(), 1);
        // The lone cell above dropped into the bottom row.
        assert_eq!(state.board.get(0, 19), Some(Cell::Filled(3)));
    }

    #[test]
    fn blocked_spawn_ends_the_game() {
        let mut state = seeded(5);
        for y in 0..2 {
            for x in 5..9 {
                state.board.set(x, y, Cell::Filled(1));
            }
        }
        set_piece(&mut state, TetrominoKind::O, Offset::new(0, 18));
        state.tick();
        assert_eq!(state.phase(), Phase::GameOver);
        assert!(state.is_game_over());

        // Terminal: nothing moves any more.
        let (offset, shape, board) = (state.offset, state.shape.clone(), state.board.clone());
        state.tick();
        assert!(!state.move_left());
        assert!(!state.move_right());
        assert!(!state.soft_drop());
        assert!(!state.rotate());
        assert_eq!(state.offset, offset);
        assert_eq!(state.shape, shape);
        assert_eq!(state.board, board);
    }

    #[test]
    fn invalid_moves_are_discarded() {
        let mut state = seeded(6);
        set_piece(&mut state, TetrominoKind::I, Offset::new(0, 5));
        assert!(!state.move_left());
        assert_eq!(state.offset, Offset::new(0, 5));
        assert!(state.move_right());
        assert_eq!(state.offset, Offset::new(1, 5));

        set_piece(&mut state, TetrominoKind::O, Offset::new(8, 5));
        assert!(!state.move_right());
        assert_eq!(state.offset, Offset::new(8, 5));

        set_piece(&mut state, TetrominoKind::O, Offset::new(3, 18));
        assert!(!state.soft_drop());
        assert_eq!(state.offset, Offset::new(3, 18));
        assert_eq!(state.board.occupied_count(), 0, "soft drop never locks");
    }

    #[test]
    fn rotation_against_wall_is_discarded() {
        let mut state = seeded(7);
        set_piece(&mut state, TetrominoKind::I, Offset::new(9, 5));
        state.shape = rotate(&state.shape);
        let vertical = state.shape.clone();
        assert!(!state.rotate());
        assert_eq!(state.shape, vertical);

        state.offset = Offset::new(4, 5);
        assert!(state.rotate());
        assert_eq!(state.shape, TetrominoKind::I.shape());
    }

    #[test]
    fn seeded_games_are_reproducible() {
        let mut a = seeded(42);
        let mut b = seeded(42);
        for _ in 0..200 {
            assert_eq!((a.kind, a.color, a.offset), (b.kind, b.color, b.offset));
            a.tick();
            b.tick();
        }
        assert_eq!(a.board, b.board);
    }

    #[test]
    fn piece_cells_are_clipped_to_board() {
        let mut state = seeded(8);
        set_piece(&mut state, TetrominoKind::I, Offset::new(2, 0));
        state.shape = rotate(&state.shape);
        state.offset = Offset::new(2, -2);
        let cells: Vec<_> = state.piece_cells().collect();
        assert_eq!(cells, vec![(2, 0), (2, 1)]);
    }
}
