#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Snake engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then reports [`Event`] values
//! describing what happened. Presentation code never touches the world
//! directly; it reads the immutable [`SessionSnapshot`] captured after each
//! frame.

use std::{collections::HashSet, time::Duration};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Title used by adapters when naming windows and log lines.
pub const GAME_TITLE: &str = "Snake";

/// Largest number of cells a level grid may hold.
pub const MAX_GRID_CELLS: usize = 1 << 20;

/// Cardinal movement directions available to the snake.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing column indices.
    Right,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
}

impl Direction {
    /// Every direction in clockwise order starting at [`Direction::Up`].
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// Returns the direction pointing the opposite way.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
        }
    }

    /// Column and row delta applied by a single step in this direction.
    #[must_use]
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Right => (1, 0),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
        }
    }

    /// Reports whether the direction moves along the row axis.
    #[must_use]
    pub const fn is_vertical(self) -> bool {
        matches!(self, Self::Up | Self::Down)
    }

    /// Direction of the single step leading from `from` to `to`.
    ///
    /// Returns `None` unless the cells are orthogonally adjacent.
    #[must_use]
    pub fn between(from: CellCoord, to: CellCoord) -> Option<Self> {
        let column_diff = from.column().abs_diff(to.column());
        let row_diff = from.row().abs_diff(to.row());

        if column_diff + row_diff != 1 {
            return None;
        }

        if column_diff == 1 {
            if to.column() > from.column() {
                Some(Self::Right)
            } else {
                Some(Self::Left)
            }
        } else if to.row() > from.row() {
            Some(Self::Down)
        } else {
            Some(Self::Up)
        }
    }
}

/// Location of a single grid cell expressed as column and row coordinates.
///
/// The origin sits in the top-left corner of the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    column: u32,
    row: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> u32 {
        self.row
    }

    /// Computes the Manhattan distance between two cell coordinates.
    #[must_use]
    pub fn manhattan_distance(self, other: CellCoord) -> u32 {
        self.column().abs_diff(other.column()) + self.row().abs_diff(other.row())
    }

    /// Cell reached by moving one step in `direction`.
    ///
    /// Returns `None` when the step would leave the top or left edge. Steps
    /// past the bottom or right edge are detected by [`GridDimensions::contains`].
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<CellCoord> {
        match direction {
            Direction::Up => Some(Self::new(self.column, self.row.checked_sub(1)?)),
            Direction::Right => Some(Self::new(self.column.checked_add(1)?, self.row)),
            Direction::Down => Some(Self::new(self.column, self.row.checked_add(1)?)),
            Direction::Left => Some(Self::new(self.column.checked_sub(1)?, self.row)),
        }
    }
}

/// Width and height of a level measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    columns: u32,
    rows: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of cell columns.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of cell rows.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Reports whether the cell lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.column() < self.columns && cell.row() < self.rows
    }

    /// Total number of cells contained in the grid.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let count = u64::from(self.columns) * u64::from(self.rows);
        usize::try_from(count).unwrap_or(usize::MAX)
    }

    /// Row-major index of the cell, or `None` when it lies outside the grid.
    #[must_use]
    pub fn index(&self, cell: CellCoord) -> Option<usize> {
        if !self.contains(cell) {
            return None;
        }
        let row = usize::try_from(cell.row()).ok()?;
        let column = usize::try_from(cell.column()).ok()?;
        let width = usize::try_from(self.columns).ok()?;
        Some(row * width + column)
    }

    /// Cell stored at the provided row-major index.
    #[must_use]
    pub fn cell_at(&self, index: usize) -> Option<CellCoord> {
        if self.columns == 0 || index >= self.cell_count() {
            return None;
        }
        let width = usize::try_from(self.columns).ok()?;
        let column = u32::try_from(index % width).ok()?;
        let row = u32::try_from(index / width).ok()?;
        Some(CellCoord::new(column, row))
    }
}

/// Occupancy state of a single grid cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Tile {
    /// Nothing occupies the cell.
    Empty,
    /// Impassable wall.
    Wall,
    /// Food item waiting to be eaten.
    Food,
    /// Any snake segment except the head.
    SnakeBody,
    /// The snake's head segment.
    SnakeHead,
}

impl Tile {
    /// Reports whether the tile belongs to the snake.
    #[must_use]
    pub const fn is_snake(self) -> bool {
        matches!(self, Self::SnakeBody | Self::SnakeHead)
    }
}

/// Single link of the snake.
///
/// The heading is the direction the segment was moving in when it arrived at
/// its cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Segment {
    cell: CellCoord,
    heading: Direction,
}

impl Segment {
    /// Creates a segment located at `cell` that arrived moving `heading`.
    #[must_use]
    pub const fn new(cell: CellCoord, heading: Direction) -> Self {
        Self { cell, heading }
    }

    /// Cell occupied by the segment.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        self.cell
    }

    /// Direction of travel when the segment entered its cell.
    #[must_use]
    pub const fn heading(&self) -> Direction {
        self.heading
    }
}

/// Validated description of a level consumed read-only by the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LevelDescriptor {
    /// Size of the grid.
    pub dimensions: GridDimensions,
    /// Time between two simulation ticks.
    pub tick_interval: Duration,
    /// Cells painted as walls.
    pub walls: Vec<CellCoord>,
    /// Initial snake, head first, laid out as a straight contiguous line.
    pub initial_snake: Vec<CellCoord>,
    /// Declared starting direction. Derived from the snake when absent.
    pub direction: Option<Direction>,
}

impl LevelDescriptor {
    /// Creates a level descriptor without a declared starting direction.
    #[must_use]
    pub fn new(
        dimensions: GridDimensions,
        tick_interval: Duration,
        walls: Vec<CellCoord>,
        initial_snake: Vec<CellCoord>,
    ) -> Self {
        Self {
            dimensions,
            tick_interval,
            walls,
            initial_snake,
            direction: None,
        }
    }

    /// Declares the starting direction, which must agree with the snake.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Checks every structural rule of the level and returns the snake's
    /// initial heading.
    pub fn validate(&self) -> Result<Direction, LevelInvalid> {
        let dimensions = self.dimensions;
        if dimensions.columns() == 0
            || dimensions.rows() == 0
            || dimensions.cell_count() > MAX_GRID_CELLS
        {
            return Err(LevelInvalid::Dimensions {
                columns: dimensions.columns(),
                rows: dimensions.rows(),
            });
        }

        if self.tick_interval.is_zero() {
            return Err(LevelInvalid::TickInterval);
        }

        let mut walls = HashSet::with_capacity(self.walls.len());
        for &wall in &self.walls {
            if !dimensions.contains(wall) {
                return Err(LevelInvalid::WallOutOfBounds { cell: wall });
            }
            let _ = walls.insert(wall);
        }

        let snake = &self.initial_snake;
        if snake.len() < 2 {
            return Err(LevelInvalid::SnakeTooShort {
                length: snake.len(),
            });
        }

        for &cell in snake {
            if !dimensions.contains(cell) {
                return Err(LevelInvalid::SnakeOutOfBounds { cell });
            }
            if walls.contains(&cell) {
                return Err(LevelInvalid::SnakeOverlap { cell });
            }
        }

        let heading =
            Direction::between(snake[1], snake[0]).ok_or(LevelInvalid::SnakeNotStraight)?;
        for pair in snake.windows(2) {
            if Direction::between(pair[1], pair[0]) != Some(heading) {
                return Err(LevelInvalid::SnakeNotStraight);
            }
        }

        if let Some(declared) = self.direction {
            if declared != heading {
                return Err(LevelInvalid::DirectionMismatch {
                    declared,
                    derived: heading,
                });
            }
        }

        let occupied = walls.len() + snake.len();
        if dimensions.cell_count() <= occupied {
            return Err(LevelInvalid::NoRoomForFood);
        }

        Ok(heading)
    }
}

/// Reasons a level descriptor is refused before any session exists.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum LevelInvalid {
    /// Both dimensions must be at least one cell and the grid may hold at
    /// most [`MAX_GRID_CELLS`] cells.
    #[error(
        "level dimensions {columns}x{rows} must be positive and hold at most {max} cells",
        max = MAX_GRID_CELLS
    )]
    Dimensions {
        /// Declared number of columns.
        columns: u32,
        /// Declared number of rows.
        rows: u32,
    },
    /// The tick interval must be positive.
    #[error("tick interval must be positive")]
    TickInterval,
    /// A wall lies outside the grid.
    #[error("wall at ({}, {}) is out of bounds", .cell.column(), .cell.row())]
    WallOutOfBounds {
        /// Offending wall cell.
        cell: CellCoord,
    },
    /// The snake needs at least a head and a tail.
    #[error("the snake must have at least a head and a tail (got {length} parts)")]
    SnakeTooShort {
        /// Number of parts declared.
        length: usize,
    },
    /// A snake part lies outside the grid.
    #[error("snake part at ({}, {}) is out of bounds", .cell.column(), .cell.row())]
    SnakeOutOfBounds {
        /// Offending snake cell.
        cell: CellCoord,
    },
    /// The snake parts do not form one straight contiguous line.
    #[error("the snake must be a single straight line in one piece")]
    SnakeNotStraight,
    /// A snake part sits on a cell that is not empty.
    #[error("snake part at ({}, {}) is not on an empty tile", .cell.column(), .cell.row())]
    SnakeOverlap {
        /// Offending snake cell.
        cell: CellCoord,
    },
    /// The declared starting direction contradicts the snake's layout.
    #[error("declared direction {declared:?} does not match the snake heading {derived:?}")]
    DirectionMismatch {
        /// Direction written in the level.
        declared: Direction,
        /// Direction implied by the snake's head and neck.
        derived: Direction,
    },
    /// Walls and snake leave no cell for food.
    #[error("the level leaves no empty tile for food")]
    NoRoomForFood,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Requests that the snake turn on the next tick.
    SetDirection {
        /// Requested heading.
        direction: Direction,
    },
    /// Advances the simulation by exactly one tick.
    Tick,
    /// Moves the food item onto the provided cell.
    PlaceFood {
        /// Destination of the food item.
        cell: CellCoord,
    },
}

/// Events reported by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// A direction change was accepted for the next tick.
    DirectionQueued {
        /// Direction that will be committed by the next tick.
        direction: Direction,
    },
    /// A direction change was ignored.
    DirectionRejected {
        /// Direction that was requested.
        direction: Direction,
        /// Why the request was ignored.
        reason: DirectionRejection,
    },
    /// The head moved onto a new cell.
    SnakeAdvanced {
        /// Cell the head left.
        from: CellCoord,
        /// Cell the head now occupies.
        to: CellCoord,
        /// Direction of travel.
        heading: Direction,
    },
    /// The head ate the food item.
    FoodEaten {
        /// Cell the food occupied.
        cell: CellCoord,
        /// Score after eating.
        score: u32,
    },
    /// A food item appeared on the grid.
    FoodPlaced {
        /// Cell now holding food.
        cell: CellCoord,
    },
    /// A food relocation request was refused.
    FoodPlacementRejected {
        /// Requested destination.
        cell: CellCoord,
        /// Why the request was refused.
        reason: FoodPlacementError,
    },
    /// The score reached the goal.
    LevelWon {
        /// Final score.
        score: u32,
        /// Goal of the level.
        goal: u32,
    },
    /// The snake crashed.
    LevelLost {
        /// What the head ran into.
        reason: LossReason,
        /// Final score.
        score: u32,
        /// Goal of the level.
        goal: u32,
    },
}

/// Reasons a direction change is ignored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DirectionRejection {
    /// Another change was already accepted during the current tick.
    AlreadyPending,
    /// The change would turn the head back into the neck.
    Reversal,
    /// The level already ended.
    GameOver,
}

/// Reasons a food relocation request is refused.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum FoodPlacementError {
    /// The requested cell lies outside the grid.
    #[error("cell is outside the grid")]
    OutOfBounds,
    /// The requested cell is not empty.
    #[error("cell is not empty")]
    Occupied,
    /// The level already ended.
    #[error("the level already ended")]
    GameOver,
}

/// What the head ran into when the level was lost.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LossReason {
    /// A wall or the grid boundary.
    Wall,
    /// One of the snake's own segments.
    SelfCollision,
}

/// Result of a single simulation tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TickOutcome {
    /// The snake moved without eating.
    Continuing,
    /// The snake ate and grew by one segment.
    AteFood,
    /// The score reached the goal.
    Won,
    /// The snake crashed.
    Lost(LossReason),
}

impl TickOutcome {
    /// Reports whether the outcome ends the level.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost(_))
    }
}

/// Lifecycle state of a game session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum GameStatus {
    /// The level is in progress.
    Playing,
    /// The score reached the goal.
    Won,
    /// The snake crashed.
    Lost(LossReason),
}

/// Read-only view into the dense tile grid.
#[derive(Clone, Copy, Debug)]
pub struct TileView<'a> {
    tiles: &'a [Tile],
    dimensions: GridDimensions,
}

impl<'a> TileView<'a> {
    /// Captures a new tile view backed by the provided row-major slice.
    #[must_use]
    pub fn new(tiles: &'a [Tile], dimensions: GridDimensions) -> Self {
        Self { tiles, dimensions }
    }

    /// Dimensions of the underlying grid.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Tile stored at the provided cell, if it lies inside the grid.
    #[must_use]
    pub fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Iterates every cell in row-major order alongside its tile.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Tile)> + 'a {
        let dimensions = self.dimensions;
        let tiles = self.tiles;
        tiles
            .iter()
            .enumerate()
            .filter_map(move |(index, tile)| Some((dimensions.cell_at(index)?, *tile)))
    }

    /// Number of cells holding the provided tile.
    #[must_use]
    pub fn count(&self, tile: Tile) -> usize {
        self.tiles.iter().filter(|candidate| **candidate == tile).count()
    }
}

/// Read-only view of the snake's segments, head first.
///
/// The head is stored apart from the body so a view always has one.
#[derive(Clone, Copy, Debug)]
pub struct ChainView<'a> {
    head: &'a Segment,
    body_front: &'a [Segment],
    body_back: &'a [Segment],
}

impl<'a> ChainView<'a> {
    /// Captures a view over a head and a body stored as two consecutive slices.
    #[must_use]
    pub fn new(head: &'a Segment, body_front: &'a [Segment], body_back: &'a [Segment]) -> Self {
        Self {
            head,
            body_front,
            body_back,
        }
    }

    /// Number of segments including the head.
    #[must_use]
    pub fn len(&self) -> usize {
        1 + self.body_front.len() + self.body_back.len()
    }

    /// Segment at the provided index, where index 0 is the head.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&'a Segment> {
        let Some(body_index) = index.checked_sub(1) else {
            return Some(self.head);
        };
        if body_index < self.body_front.len() {
            self.body_front.get(body_index)
        } else {
            self.body_back.get(body_index - self.body_front.len())
        }
    }

    /// Head segment.
    #[must_use]
    pub fn head(&self) -> &'a Segment {
        self.head
    }

    /// Tail segment. Equals the head for a chain of one.
    #[must_use]
    pub fn tail(&self) -> &'a Segment {
        self.body_back
            .last()
            .or_else(|| self.body_front.last())
            .unwrap_or(self.head)
    }

    /// Index of the segment occupying `cell`.
    #[must_use]
    pub fn position(&self, cell: CellCoord) -> Option<usize> {
        self.iter().position(|segment| segment.cell() == cell)
    }

    /// Iterates segments from head to tail.
    pub fn iter(&self) -> impl Iterator<Item = &'a Segment> + 'a {
        let (head, front, back) = (self.head, self.body_front, self.body_back);
        std::iter::once(head).chain(front.iter()).chain(back.iter())
    }
}

/// Immutable capture of everything presentation needs from a session.
#[derive(Clone, Copy, Debug)]
pub struct SessionSnapshot<'a> {
    /// Grid occupancy.
    pub tiles: TileView<'a>,
    /// Snake segments, head first.
    pub chain: ChainView<'a>,
    /// Food eaten so far.
    pub score: u32,
    /// Score required to win.
    pub goal: u32,
    /// Whether the level is still running.
    pub status: GameStatus,
}

/// Disagreements between the grid and the segment chain.
///
/// These indicate programming errors and abort the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    /// The chain is shorter than a head and a tail.
    #[error("snake chain holds {length} segments, at least 2 required")]
    ChainTooShort {
        /// Observed length.
        length: usize,
    },
    /// A snake tile has no matching segment.
    #[error("snake part not found at ({}, {})", .cell.column(), .cell.row())]
    SegmentMissing {
        /// Cell painted as snake.
        cell: CellCoord,
    },
    /// A segment sits on a tile that does not match its role.
    #[error("expected {expected:?} at ({}, {}), found {found:?}", .cell.column(), .cell.row())]
    TileMismatch {
        /// Cell of the segment.
        cell: CellCoord,
        /// Tile required by the segment's role.
        expected: Tile,
        /// Tile stored in the grid.
        found: Tile,
    },
    /// Two consecutive segments are not grid-adjacent.
    #[error("segments at ({}, {}) and ({}, {}) are not adjacent", .from.column(), .from.row(), .to.column(), .to.row())]
    DisjointSegments {
        /// Segment closer to the head.
        from: CellCoord,
        /// Segment closer to the tail.
        to: CellCoord,
    },
    /// Two segments share a cell.
    #[error("two segments share ({}, {})", .cell.column(), .cell.row())]
    DuplicateSegment {
        /// Shared cell.
        cell: CellCoord,
    },
    /// The number of food tiles differs from one while playing.
    #[error("expected exactly one food tile, found {count}")]
    FoodCount {
        /// Observed number of food tiles.
        count: usize,
    },
    /// A body segment and the segment ahead of it point in opposite directions.
    #[error("no body piece joins heading {own:?} to heading {ahead:?}")]
    UnknownTurn {
        /// Heading of the segment closer to the head.
        ahead: Direction,
        /// Heading of the body segment.
        own: Direction,
    },
}
