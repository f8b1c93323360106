#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots a Snake level in a window.

mod game;
mod levels;
mod settings;

use std::{fs::File, path::PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use log::LevelFilter;
use simplelog::{ColorChoice, Config, TermLogger, TerminalMode, WriteLogger};
use snake_core::GAME_TITLE;
use snake_rendering::{Color, Presentation, RenderingBackend};
use snake_rendering_macroquad::MacroquadBackend;
use snake_world::{query, World};

use crate::{game::GameApp, settings::Settings};

/// Command-line arguments for launching a Snake level.
#[derive(Debug, Parser)]
#[command(name = "snake", about = "Steer the snake to eat every piece of food.")]
struct CliArgs {
    /// Level number to play.
    #[arg(long, default_value_t = 1)]
    level: u32,
    /// Directory holding `level-<N>.json` files.
    #[arg(long, value_name = "DIR", default_value = "levels")]
    levels_dir: PathBuf,
    /// File storing player preferences.
    #[arg(long, value_name = "FILE", default_value = "snake-settings.toml")]
    settings: PathBuf,
    /// Overrides and saves the smooth movement preference.
    #[arg(long, value_name = "BOOL")]
    smooth_movement: Option<bool>,
    /// Seeds food placement for reproducible games.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Sprite-sheet manifest.
    #[arg(long, value_name = "FILE", default_value = "assets/sprites.toml")]
    sprites: PathBuf,
    /// Draws flat shapes instead of loading the sprite sheet.
    #[arg(long)]
    no_sprites: bool,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long, value_name = "BOOL", default_value_t = true, action = ArgAction::Set)]
    vsync: bool,
    /// Checks the level file and exits without opening a window.
    #[arg(long)]
    validate: bool,
    /// Maximum level of log messages.
    #[arg(long, value_name = "LEVEL", default_value_t = LevelFilter::Info)]
    log_level: LevelFilter,
    /// Writes logs to a file instead of the terminal.
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

/// Entry point for the Snake command-line interface.
fn main() -> Result<()> {
    let args = CliArgs::parse();
    init_logging(&args)?;

    let level = levels::load_level(&args.levels_dir, args.level)
        .with_context(|| format!("Couldn't start level {}", args.level))?;

    if args.validate {
        let heading = level
            .validate()
            .with_context(|| format!("Couldn't start level {}", args.level))?;
        println!(
            "level {} is valid: {}x{} grid, {} walls, snake of {} heading {heading:?}, tick {}ms",
            args.level,
            level.dimensions.columns(),
            level.dimensions.rows(),
            level.walls.len(),
            level.initial_snake.len(),
            level.tick_interval.as_millis()
        );
        return Ok(());
    }

    let mut settings = Settings::load(&args.settings)?;
    if let Some(smooth_movement) = args.smooth_movement {
        settings.smooth_movement = smooth_movement;
        settings.save(&args.settings)?;
    }

    let world = match args.seed {
        Some(seed) => World::with_seed(&level, seed),
        None => World::new(&level),
    }
    .with_context(|| format!("Couldn't start level {}", args.level))?;
    log::info!(
        "starting level {} with goal {}",
        args.level,
        query::goal(&world)
    );

    let mut app = GameApp::new(world, settings, args.settings.clone());
    let presentation = Presentation::new(
        format!("{GAME_TITLE} - Level {}", args.level),
        Color::from_rgb_u8(0x2b, 0x27, 0x30),
        app.scene()?,
    );

    let sprites = (!args.no_sprites).then_some(args.sprites);
    MacroquadBackend::default()
        .with_vsync(args.vsync)
        .with_sprite_manifest(sprites)
        .run(presentation, move |input, scene| app.frame(input, scene))
}

fn init_logging(args: &CliArgs) -> Result<()> {
    match &args.log_file {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            WriteLogger::init(args.log_level, Config::default(), file)
        }
        None => TermLogger::init(
            args.log_level,
            Config::default(),
            TerminalMode::Stderr,
            ColorChoice::Auto,
        ),
    }
    .context("failed to install the logger")
}
