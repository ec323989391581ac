//! App: terminal init, main loop, tick and key handling.

use crate::GameConfig;
use crate::clock::{TICKS_PER_SECOND, TickClock};
use crate::game::GameState;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, GameOverFx};
use anyhow::{Context, Result};
use crossterm::event::{self, Event};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const WINDOW_TITLE: &str = "blockdrop";

pub struct App {
    config: GameConfig,
    theme: Theme,
    state: GameState,
    clock: TickClock,
    game_over_fx: GameOverFx,
    /// Set once the game-over transition has been logged.
    reported_game_over: bool,
}

impl App {
    pub fn new(config: GameConfig, theme: Theme) -> Self {
        let state = GameState::new(&config);
        Self {
            config,
            theme,
            state,
            clock: TickClock::new(TICKS_PER_SECOND, Instant::now()),
            game_over_fx: GameOverFx::default(),
            reported_game_over: false,
        }
    }

    /// Player input. Invalid moves are dropped silently by the game state.
    fn apply_action(&mut self, action: Action) {
        let applied = match action {
            Action::MoveLeft => self.state.move_left(),
            Action::MoveRight => self.state.move_right(),
            Action::SoftDrop => self.state.soft_drop(),
            Action::Rotate => self.state.rotate(),
            Action::Quit | Action::None => return,
        };
        if !applied {
            debug!(?action, "move rejected");
        }
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            cursor::{Hide, Show},
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, SetTitle, disable_raw_mode,
                enable_raw_mode,
            },
        };

        enable_raw_mode()?;
        let stdout = with_rollback(
            || {
                let mut stdout = std::io::stdout();
                execute!(stdout, EnterAlternateScreen, SetTitle(WINDOW_TITLE), Hide)?;
                Ok(stdout)
            },
            || {
                let _ = execute!(std::io::stdout(), Show, LeaveAlternateScreen);
                let _ = disable_raw_mode();
            },
        )
        .context("failed to set up terminal")?;

        let mut terminal =
            DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;
        info!(
            seed = ?self.config.seed,
            tick_ms = self.clock.interval().as_millis() as u64,
            "game started"
        );

        let result = self.run_loop(&mut terminal);

        // Restore
        execute!(std::io::stdout(), Show, LeaveAlternateScreen)?;
        disable_raw_mode()?;
        info!(
            pieces = self.state.pieces_locked(),
            lines = self.state.lines_cleared(),
            "game closed"
        );

        result
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        self.game_over_fx.reset();
        loop {
            let actions = poll_actions()?;
            if self.step(actions) {
                return Ok(());
            }

            let now = Instant::now();
            let flash = (!self.config.no_animation).then_some(&mut self.game_over_fx);
            terminal.draw(|f| ui::draw(f, &self.state, &self.theme, flash, now))?;

            self.clock.wait();
        }
    }

    /// One tick: apply every pending action in order, then the fall step. Returns true when the
    /// player asked to quit; nothing after the quit is applied.
    fn step(&mut self, actions: impl IntoIterator<Item = Action>) -> bool {
        for action in actions {
            if action == Action::Quit {
                debug!("quit requested");
                return true;
            }
            self.apply_action(action);
        }

        self.state.tick();
        if self.state.is_game_over() && !self.reported_game_over {
            self.reported_game_over = true;
            info!(
                pieces = self.state.pieces_locked(),
                lines = self.state.lines_cleared(),
                "game over"
            );
        }
        false
    }
}

/// Drain every pending key event without blocking.
fn poll_actions() -> Result<Vec<Action>> {
    let mut actions = Vec::new();
    while event::poll(Duration::ZERO)? {
        if let Event::Key(key) = event::read()? {
            match key_to_action(key) {
                Action::None => {}
                action => actions.push(action),
            }
        }
    }
    Ok(actions)
}

/// Run `setup`; if it fails, run `rollback` before handing back the error.
fn with_rollback<T>(
    setup: impl FnOnce() -> std::io::Result<T>,
    rollback: impl FnOnce(),
) -> std::io::Result<T> {
    setup().inspect_err(|_| rollback())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Cell;
    use crate::shapes::{Offset, TetrominoKind};

    fn app() -> App {
        App::new(
            GameConfig {
                seed: Some(21),
                ..GameConfig::default()
            },
            Theme::classic(),
        )
    }

    #[test]
    fn actions_reach_the_game_state() {
        let mut app = app();
        app.state.shape = TetrominoKind::O.shape();
        app.state.offset = Offset::new(4, 3);

        app.apply_action(Action::MoveLeft);
        assert_eq!(app.state.offset, Offset::new(3, 3));
        app.apply_action(Action::MoveRight);
        app.apply_action(Action::MoveRight);
        assert_eq!(app.state.offset, Offset::new(5, 3));
        app.apply_action(Action::SoftDrop);
        assert_eq!(app.state.offset, Offset::new(5, 4));
        app.apply_action(Action::None);
        app.apply_action(Action::Quit);
        assert_eq!(app.state.offset, Offset::new(5, 4));
    }

    #[test]
    fn rotate_action_rotates_in_place() {
        let mut app = app();
        app.state.shape = TetrominoKind::I.shape();
        app.state.offset = Offset::new(3, 3);
        app.apply_action(Action::Rotate);
        assert_eq!((app.state.shape.width(), app.state.shape.height()), (1, 4));
        assert_eq!(app.state.offset, Offset::new(3, 3));
    }

    #[test]
    fn input_is_applied_before_the_fall_step() {
        let mut app = app();
        app.state.shape = TetrominoKind::O.shape();
        app.state.offset = Offset::new(4, 3);
        assert!(!app.step([Action::SoftDrop]));
        assert_eq!(app.state.offset, Offset::new(4, 5));
    }

    #[test]
    fn sideways_move_on_lock_tick_changes_where_piece_locks() {
        let mut app = app();
        app.state.shape = TetrominoKind::O.shape();
        app.state.offset = Offset::new(4, 18);
        app.state.color = 2;
        assert!(!app.step([Action::MoveLeft]));

        assert_eq!(app.state.pieces_locked(), 1);
        for (x, y) in [(3, 18), (4, 18), (3, 19), (4, 19)] {
            assert_eq!(app.state.board.get(x, y), Some(Cell::Filled(2)), "({x}, {y})");
        }
        assert!(!app.state.board.is_occupied(5, 19));
    }

    #[test]
    fn quit_stops_the_tick() {
        let mut app = app();
        let offset = app.state.offset;
        assert!(app.step([Action::Quit, Action::SoftDrop]));
        assert_eq!(app.state.offset, offset);
    }

    #[test]
    fn failed_setup_runs_rollback() {
        let mut rolled_back = false;
        let result: std::io::Result<()> =
            with_rollback(|| Err(std::io::Error::other("no tty")), || rolled_back = true);
        assert!(result.is_err());
        assert!(rolled_back);

        let mut rolled_back = false;
        let value = with_rollback(|| Ok(7), || rolled_back = true).unwrap();
        assert_eq!(value, 7);
        assert!(!rolled_back);
    }

    #[test]
    fn clock_runs_at_ten_ticks_per_second() {
        assert_eq!(app().clock.interval(), Duration::from_millis(100));
    }
}
