//! blockdrop — classic falling-block puzzle game in the terminal.

mod app;
mod board;
mod clock;
mod game;
mod input;
mod placement;
mod shapes;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use clap::Parser;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::Level;
use tracing_subscriber::prelude::*;

/// Options derived from CLI that affect game behaviour.
#[derive(Debug, Clone, Default)]
pub struct GameConfig {
    pub seed: Option<u64>,
    pub mono_lock: bool,
    pub no_animation: bool,
}

impl From<&Args> for GameConfig {
    fn from(args: &Args) -> Self {
        Self {
            seed: args.seed,
            mono_lock: args.mono_lock,
            no_animation: args.no_animation,
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_deref(), args.verbose)?;
    let theme = theme::Theme::load(args.theme.as_deref()).context("failed to load theme")?;
    let mut app = App::new(GameConfig::from(&args), theme);
    app.run()?;
    Ok(())
}

/// Logs only go to a file: the terminal belongs to the game while it runs.
fn init_logging(path: Option<&Path>, verbose: u8) -> Result<()> {
    let Some(path) = path else {
        return Ok(());
    };
    let file = File::create(path)
        .with_context(|| format!("failed to create log file {}", path.display()))?;
    let level = match verbose {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
    tracing::info!(level = %level, "logging initialized");
    Ok(())
}

/// Classic falling-block puzzle in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockdrop",
    version,
    about = "Classic falling-block puzzle in the terminal. Fill rows to clear them; the game ends when a new piece has no room.",
    long_about = "blockdrop is a classic falling-block puzzle game in the terminal.\n\n\
        Pieces fall at a fixed speed of ten rows per second. Completed rows are removed and \
        everything above moves down. The game ends when a freshly spawned piece overlaps the stack.\n\n\
        CONTROLS:\n  Left/Right  Move    Up   Rotate    Down   Soft drop    Q / Esc   Quit"
)]
pub struct Args {
    /// Seed for the piece and colour sequence. Random when not set.
    #[arg(long, value_name = "N")]
    pub seed: Option<u64>,

    /// Path to a theme file (btop-style theme[key]=\"#RRGGBB\"). Uses the classic palette if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Locked blocks all take the first palette colour instead of keeping their piece colour.
    #[arg(long)]
    pub mono_lock: bool,

    /// Disable the game-over flash.
    #[arg(long)]
    pub no_animation: bool,

    /// Write logs to this file.
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Log verbosity (-v debug, -vv trace). Needs --log-file.
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
