#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Snake adapters.
//!
//! [`project`] turns a session snapshot into a [`Scene`] of draw commands
//! expressed in cell units. [`present`] lays a scene out on any
//! [`DrawSurface`] once [`SurfaceMetrics`] map cells to pixels, so the whole
//! pipeline runs headlessly in tests.

mod projector;
mod sprites;

use anyhow::Result as AnyResult;
use glam::Vec2;
use snake_core::{CellCoord, GridDimensions};
use snake_system_input::Key;
use std::{error::Error, fmt, time::Duration};

pub use projector::{project, CHECKER_EVEN, CHECKER_ODD, FOOD_SCALE};
pub use sprites::{SpriteId, SpriteSheet};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Opaque white.
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);

    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with a different alpha channel.
    #[must_use]
    pub const fn with_alpha(self, alpha: f32) -> Self {
        Self { alpha, ..self }
    }
}

/// Axis-aligned rectangle in pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    /// Left edge.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Horizontal extent.
    pub width: f32,
    /// Vertical extent.
    pub height: f32,
}

impl Rect {
    /// Creates a rectangle from its top-left corner and size.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Grows the rectangle by `scale` around its centre.
    #[must_use]
    pub fn scaled_about_center(self, scale: f32) -> Self {
        let width = self.width * scale;
        let height = self.height * scale;
        Self {
            x: self.x - (width - self.width) / 2.0,
            y: self.y - (height - self.height) / 2.0,
            width,
            height,
        }
    }

    /// Snaps the origin down and the size up to whole pixels.
    #[must_use]
    pub fn snapped(self) -> Self {
        Self {
            x: self.x.floor(),
            y: self.y.floor(),
            width: self.width.ceil(),
            height: self.height.ceil(),
        }
    }
}

/// Single primitive produced by the projector, positioned in cell units.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DrawCommand {
    /// Solid fill covering one cell.
    Fill {
        /// Cell to cover.
        cell: CellCoord,
        /// Fill color.
        color: Color,
    },
    /// Sprite drawn over one cell-sized square.
    Sprite {
        /// Sprite to draw.
        sprite: SpriteId,
        /// Top-left corner in cell units; fractional while interpolating.
        position: Vec2,
        /// Size multiplier applied around the square's centre.
        scale: f32,
    },
}

impl DrawCommand {
    /// Sprite at `position` drawn at its natural size.
    #[must_use]
    pub const fn sprite(sprite: SpriteId, position: Vec2) -> Self {
        Self::Sprite {
            sprite,
            position,
            scale: 1.0,
        }
    }

    /// Returns the command with its sprite scaled by `scale`. Fills are unchanged.
    #[must_use]
    pub fn scaled(self, scale: f32) -> Self {
        match self {
            Self::Sprite {
                sprite, position, ..
            } => Self::Sprite {
                sprite,
                position,
                scale,
            },
            fill @ Self::Fill { .. } => fill,
        }
    }
}

/// Prompt displayed over the board between levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Banner {
    /// Headline such as "Game over".
    pub title: String,
    /// Instruction or summary shown under the title.
    pub message: String,
}

impl Banner {
    /// Creates a banner from a title and a message.
    #[must_use]
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Layered draw commands describing one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Size of the board in cells.
    pub dimensions: GridDimensions,
    /// Board fills drawn first.
    pub background: Vec<DrawCommand>,
    /// Sprites drawn over the score watermark.
    pub foreground: Vec<DrawCommand>,
    /// Food eaten so far.
    pub score: u32,
    /// Score that wins the level.
    pub goal: u32,
    /// Optional prompt drawn on top of everything.
    pub banner: Option<Banner>,
}

impl Scene {
    /// Creates an empty scene for a board of the provided size.
    #[must_use]
    pub fn new(dimensions: GridDimensions, score: u32, goal: u32) -> Self {
        Self {
            dimensions,
            background: Vec::new(),
            foreground: Vec::new(),
            score,
            goal,
            banner: None,
        }
    }

    /// Attaches a prompt to the scene.
    #[must_use]
    pub fn with_banner(mut self, banner: Option<Banner>) -> Self {
        self.banner = banner;
        self
    }
}

/// Placement of the board inside the available drawing area.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceMetrics {
    /// Top-left corner of the board in pixels.
    pub origin: Vec2,
    /// Board size in pixels.
    pub size: Vec2,
    /// Side length of one cell in pixels.
    pub cell_size: f32,
}

impl SurfaceMetrics {
    /// Fits a board of `dimensions` into the available area.
    ///
    /// The board keeps its aspect ratio, takes the full width unless that
    /// overflows the height, and is centred in the remaining space.
    #[must_use]
    pub fn fit(available_width: f32, available_height: f32, dimensions: GridDimensions) -> Self {
        let columns = dimensions.columns().max(1) as f32;
        let rows = dimensions.rows().max(1) as f32;
        let ratio = columns / rows;

        let mut width = available_width.max(0.0);
        let mut height = width / ratio;
        if height > available_height {
            height = available_height.max(0.0);
            width = height * ratio;
        }

        Self {
            origin: Vec2::new(
                (available_width - width) / 2.0,
                (available_height - height) / 2.0,
            ),
            size: Vec2::new(width, height),
            cell_size: width / columns,
        }
    }

    /// Converts a position in cell units to pixels.
    #[must_use]
    pub fn to_screen(&self, position: Vec2) -> Vec2 {
        self.origin + position * self.cell_size
    }

    /// Pixel rectangle of the cell-sized square whose corner is at `position`.
    #[must_use]
    pub fn cell_rect(&self, position: Vec2) -> Rect {
        let corner = self.to_screen(position);
        Rect::new(corner.x, corner.y, self.cell_size, self.cell_size)
    }
}

/// Minimal set of primitives a backend must provide.
pub trait DrawSurface {
    /// Fills `rect` with a solid color.
    fn fill_rect(&mut self, rect: Rect, color: Color);

    /// Copies the `source` region of the sprite sheet into `destination`.
    fn draw_sprite(&mut self, sprite: SpriteId, source: Rect, destination: Rect);

    /// Draws `text` centred on `center`.
    fn draw_text(&mut self, text: &str, center: Vec2, font_size: f32, color: Color);
}

/// Draws `scene` on `surface`.
///
/// Order: board fills, score watermark, sprites, then the banner if any.
pub fn present<S: DrawSurface>(
    scene: &Scene,
    metrics: &SurfaceMetrics,
    sheet: &SpriteSheet,
    surface: &mut S,
) {
    for command in &scene.background {
        draw_command(command, metrics, sheet, surface);
    }

    let center = metrics.origin + metrics.size / 2.0;
    surface.draw_text(
        &scene.score.to_string(),
        center,
        metrics.size.x / 7.0,
        Color::WHITE.with_alpha(0.5),
    );

    for command in &scene.foreground {
        draw_command(command, metrics, sheet, surface);
    }

    if let Some(banner) = &scene.banner {
        let board = Rect::new(
            metrics.origin.x,
            metrics.origin.y,
            metrics.size.x,
            metrics.size.y,
        );
        surface.fill_rect(board, Color::new(0.0, 0.0, 0.0, 0.6));
        let font_size = metrics.size.x / 12.0;
        surface.draw_text(
            &banner.title,
            center - Vec2::new(0.0, font_size),
            font_size,
            Color::WHITE,
        );
        surface.draw_text(
            &banner.message,
            center + Vec2::new(0.0, font_size * 0.5),
            font_size / 2.0,
            Color::WHITE,
        );
    }
}

fn draw_command<S: DrawSurface>(
    command: &DrawCommand,
    metrics: &SurfaceMetrics,
    sheet: &SpriteSheet,
    surface: &mut S,
) {
    match *command {
        DrawCommand::Fill { cell, color } => {
            let position = Vec2::new(cell.column() as f32, cell.row() as f32);
            surface.fill_rect(metrics.cell_rect(position), color);
        }
        DrawCommand::Sprite {
            sprite,
            position,
            scale,
        } => {
            let destination = metrics
                .cell_rect(position)
                .scaled_about_center(scale)
                .snapped();
            surface.draw_sprite(sprite, sheet.source_rect(sprite), destination);
        }
    }
}

/// Input gathered by the backend before each frame.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Monotonic time at which the frame started.
    pub now: Duration,
    /// Keys pressed since the previous frame.
    ///
    /// Keys pressed within the same frame arrive in an order chosen by the
    /// backend, not necessarily the order they were pressed in.
    pub keys: Vec<Key>,
    /// New drawing area size when the window was resized since the previous frame.
    pub resized: Option<Vec2>,
}

/// Tells the backend whether to keep running after a frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FrameControl {
    /// Keep presenting frames.
    Continue,
    /// Close the window and return from [`RenderingBackend::run`].
    Exit,
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Snake scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the input captured for
    /// the frame and may replace the scene before it is drawn. Returning an
    /// error stops the backend and surfaces the error to the caller.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(FrameInput, &mut Scene) -> AnyResult<FrameControl> + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// A sprite sheet needs at least one column.
    InvalidSheetColumns {
        /// Provided column count that failed validation.
        columns: u32,
    },
    /// Sprite cells must have a positive size.
    InvalidCellSize {
        /// Provided cell width.
        width: f32,
        /// Provided cell height.
        height: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidSheetColumns { columns } => {
                write!(f, "sprite sheet columns must be positive (received {columns})")
            }
            Self::InvalidCellSize { width, height } => {
                write!(
                    f,
                    "sprite cells must have a positive size (received {width}x{height})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
