//! Symbolic sprite identifiers and the fixed-grid sheet they index into.

use snake_core::{Direction, InvariantViolation};

use crate::{Rect, RenderingError};

/// Sprites available in the snake sprite sheet.
///
/// Discriminants are the cell indices of the sprites in the sheet, counted
/// row-major.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpriteId {
    /// Body piece joining the bottom and right edges.
    BodyBottomRight = 0,
    /// Straight horizontal body piece.
    BodyHorizontal = 1,
    /// Body piece joining the bottom and left edges.
    BodyBottomLeft = 2,
    /// Head moving up.
    HeadUp = 3,
    /// Head moving right.
    HeadRight = 4,
    /// Crashed head facing up.
    HeadDeadUp = 5,
    /// Body piece joining the top and right edges.
    BodyTopRight = 6,
    /// Straight vertical body piece.
    BodyVertical = 8,
    /// Head moving left.
    HeadLeft = 9,
    /// Head moving down.
    HeadDown = 10,
    /// Crashed head facing down.
    HeadDeadDown = 11,
    /// Body piece joining the top and left edges.
    BodyTopLeft = 14,
    /// Tail tip pointing down.
    TailDown = 15,
    /// Tail tip pointing left.
    TailLeft = 16,
    /// Crashed head facing right.
    HeadDeadRight = 17,
    /// Food item.
    Food = 18,
    /// Wall block.
    Wall = 20,
    /// Tail tip pointing right.
    TailRight = 21,
    /// Tail tip pointing up.
    TailUp = 22,
    /// Crashed head facing left.
    HeadDeadLeft = 23,
}

impl SpriteId {
    /// Row-major index of the sprite within the sheet.
    #[must_use]
    pub const fn index(self) -> u32 {
        self as u32
    }

    /// Head sprite for the provided heading.
    #[must_use]
    pub const fn head(heading: Direction, dead: bool) -> Self {
        match (heading, dead) {
            (Direction::Up, false) => Self::HeadUp,
            (Direction::Right, false) => Self::HeadRight,
            (Direction::Down, false) => Self::HeadDown,
            (Direction::Left, false) => Self::HeadLeft,
            (Direction::Up, true) => Self::HeadDeadUp,
            (Direction::Right, true) => Self::HeadDeadRight,
            (Direction::Down, true) => Self::HeadDeadDown,
            (Direction::Left, true) => Self::HeadDeadLeft,
        }
    }

    /// Body sprite joining a segment to the one ahead of it.
    ///
    /// `ahead` is the heading of the segment closer to the head and `own`
    /// the heading of the body segment itself.
    pub fn body(ahead: Direction, own: Direction) -> Result<Self, InvariantViolation> {
        use Direction::{Down, Left, Right, Up};

        match (ahead, own) {
            (Up | Down, Up | Down) if ahead == own => Ok(Self::BodyVertical),
            (Left | Right, Left | Right) if ahead == own => Ok(Self::BodyHorizontal),
            (Up, Right) | (Left, Down) => Ok(Self::BodyTopLeft),
            (Up, Left) | (Right, Down) => Ok(Self::BodyTopRight),
            (Down, Left) | (Right, Up) => Ok(Self::BodyBottomRight),
            (Down, Right) | (Left, Up) => Ok(Self::BodyBottomLeft),
            _ => Err(InvariantViolation::UnknownTurn { ahead, own }),
        }
    }

    /// Tail sprite following a segment moving `ahead`.
    #[must_use]
    pub const fn tail(ahead: Direction) -> Self {
        match ahead {
            Direction::Up => Self::TailDown,
            Direction::Right => Self::TailLeft,
            Direction::Down => Self::TailUp,
            Direction::Left => Self::TailRight,
        }
    }
}

/// Fixed grid of equally sized sprites stored in one image.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpriteSheet {
    columns: u32,
    cell_width: f32,
    cell_height: f32,
}

impl SpriteSheet {
    /// Layout of the bundled sheet: six columns of 64 by 64 pixel cells.
    pub const DEFAULT: Self = Self {
        columns: 6,
        cell_width: 64.0,
        cell_height: 64.0,
    };

    /// Creates a sheet layout, rejecting empty rows and degenerate cells.
    pub fn new(columns: u32, cell_width: f32, cell_height: f32) -> Result<Self, RenderingError> {
        if columns == 0 {
            return Err(RenderingError::InvalidSheetColumns { columns });
        }
        if !(cell_width > 0.0 && cell_height > 0.0) {
            return Err(RenderingError::InvalidCellSize {
                width: cell_width,
                height: cell_height,
            });
        }
        Ok(Self {
            columns,
            cell_width,
            cell_height,
        })
    }

    /// Number of sprites per sheet row.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Pixel rectangle holding `sprite` inside the sheet image.
    #[must_use]
    pub fn source_rect(&self, sprite: SpriteId) -> Rect {
        let index = sprite.index();
        let column = index % self.columns;
        let row = index / self.columns;
        Rect::new(
            column as f32 * self.cell_width,
            row as f32 * self.cell_height,
            self.cell_width,
            self.cell_height,
        )
    }
}

impl Default for SpriteSheet {
    fn default() -> Self {
        Self::DEFAULT
    }
}
