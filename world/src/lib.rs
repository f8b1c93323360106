#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game session state for Snake.
//!
//! The [`World`] owns the tile grid and the snake's segment chain. It is only
//! mutated through [`apply`] (or the [`tick`] and [`set_direction`] shortcuts
//! that report their result directly) and is read through the [`query`]
//! module.

mod chain;
mod grid;

use std::collections::HashSet;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use snake_core::{
    CellCoord, Command, Direction, DirectionRejection, Event, FoodPlacementError, GameStatus,
    InvariantViolation, LevelDescriptor, LevelInvalid, LossReason, Segment, Tile, TickOutcome,
};

use self::{chain::SegmentChain, grid::TileGrid};

/// Represents a live Snake game session.
#[derive(Debug)]
pub struct World {
    level: LevelDescriptor,
    initial_heading: Direction,
    grid: TileGrid,
    chain: SegmentChain,
    food: Option<CellCoord>,
    score: u32,
    goal: u32,
    pending_direction: Option<Direction>,
    status: GameStatus,
    rng: ChaCha8Rng,
}

impl World {
    /// Creates a session for the provided level with entropy-seeded food
    /// placement.
    pub fn new(level: &LevelDescriptor) -> Result<Self, LevelInvalid> {
        Self::with_rng(level, ChaCha8Rng::from_entropy())
    }

    /// Creates a session whose food placement is fully determined by `seed`.
    pub fn with_seed(level: &LevelDescriptor, seed: u64) -> Result<Self, LevelInvalid> {
        Self::with_rng(level, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(level: &LevelDescriptor, mut rng: ChaCha8Rng) -> Result<Self, LevelInvalid> {
        let initial_heading = level.validate()?;
        let layout = Layout::build(level, initial_heading, &mut rng)?;
        Ok(Self {
            level: level.clone(),
            initial_heading,
            grid: layout.grid,
            chain: layout.chain,
            food: Some(layout.food),
            score: 0,
            goal: layout.goal,
            pending_direction: None,
            status: GameStatus::Playing,
            rng,
        })
    }

    /// Replaces the session with a fresh one built from the same level.
    ///
    /// The score returns to zero and a new food item is placed.
    pub fn restart(&mut self) -> Result<(), LevelInvalid> {
        let layout = Layout::build(&self.level, self.initial_heading, &mut self.rng)?;
        self.grid = layout.grid;
        self.chain = layout.chain;
        self.food = Some(layout.food);
        self.goal = layout.goal;
        self.score = 0;
        self.pending_direction = None;
        self.status = GameStatus::Playing;
        log::debug!("level restarted");
        Ok(())
    }

    /// Checks that the grid and the segment chain agree.
    pub fn verify_invariants(&self) -> Result<(), InvariantViolation> {
        let chain = self.chain.view();
        if chain.len() < 2 {
            return Err(InvariantViolation::ChainTooShort {
                length: chain.len(),
            });
        }

        let mut seen = HashSet::with_capacity(chain.len());
        let mut previous: Option<CellCoord> = None;
        for (index, segment) in chain.iter().enumerate() {
            let cell = segment.cell();
            if !seen.insert(cell) {
                return Err(InvariantViolation::DuplicateSegment { cell });
            }

            let expected = if index == 0 {
                Tile::SnakeHead
            } else {
                Tile::SnakeBody
            };
            let found = self.grid.tile(cell).unwrap_or(Tile::Empty);
            if found != expected {
                return Err(InvariantViolation::TileMismatch {
                    cell,
                    expected,
                    found,
                });
            }

            if let Some(from) = previous {
                if from.manhattan_distance(cell) != 1 {
                    return Err(InvariantViolation::DisjointSegments { from, to: cell });
                }
            }
            previous = Some(cell);
        }

        for (cell, tile) in self.grid.view().iter() {
            if tile.is_snake() && !seen.contains(&cell) {
                return Err(InvariantViolation::SegmentMissing { cell });
            }
        }

        let food_count = self.grid.count(Tile::Food);
        let expected_food = usize::from(self.status != GameStatus::Won);
        if food_count != expected_food {
            return Err(InvariantViolation::FoodCount { count: food_count });
        }

        Ok(())
    }

    fn committed_direction(&self) -> Direction {
        self.chain.head().heading()
    }

    fn finish(&mut self, outcome: TickOutcome, out_events: &mut Vec<Event>) {
        match outcome {
            TickOutcome::Won => {
                self.status = GameStatus::Won;
                log::info!("level won with {} points", self.score);
                out_events.push(Event::LevelWon {
                    score: self.score,
                    goal: self.goal,
                });
            }
            TickOutcome::Lost(reason) => {
                self.status = GameStatus::Lost(reason);
                log::info!(
                    "level lost ({reason:?}) with {} of {} points",
                    self.score,
                    self.goal
                );
                out_events.push(Event::LevelLost {
                    reason,
                    score: self.score,
                    goal: self.goal,
                });
            }
            TickOutcome::Continuing | TickOutcome::AteFood => {}
        }
    }

    fn advance(&mut self, direction: Direction, out_events: &mut Vec<Event>) -> TickOutcome {
        let head = self.chain.head();
        let Some(candidate) = head
            .cell()
            .step(direction)
            .filter(|cell| self.grid.contains(*cell))
        else {
            return TickOutcome::Lost(LossReason::Wall);
        };

        match self.grid.tile(candidate) {
            None | Some(Tile::Wall) => return TickOutcome::Lost(LossReason::Wall),
            Some(Tile::Food) => return self.eat(head, candidate, direction, out_events),
            Some(Tile::Empty | Tile::SnakeBody | Tile::SnakeHead) => {}
        }

        let vacated = self.chain.pop_tail();
        if let Some(tail) = vacated {
            self.grid.set(tail.cell(), Tile::Empty);
        }

        if self.grid.tile(candidate) == Some(Tile::SnakeBody) {
            if let Some(tail) = vacated {
                self.chain.push_tail(tail);
                self.grid.set(tail.cell(), Tile::SnakeBody);
            }
            return TickOutcome::Lost(LossReason::SelfCollision);
        }

        self.commit_head(head, candidate, direction, out_events);
        TickOutcome::Continuing
    }

    fn eat(
        &mut self,
        head: Segment,
        candidate: CellCoord,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) -> TickOutcome {
        self.score = self.score.saturating_add(1);
        self.food = None;
        out_events.push(Event::FoodEaten {
            cell: candidate,
            score: self.score,
        });
        self.commit_head(head, candidate, direction, out_events);

        if self.score >= self.goal {
            return TickOutcome::Won;
        }

        match place_random_food(&mut self.grid, &mut self.rng) {
            Some(cell) => {
                self.food = Some(cell);
                out_events.push(Event::FoodPlaced { cell });
            }
            None => log::warn!("no empty tile left for food below the goal"),
        }
        TickOutcome::AteFood
    }

    fn commit_head(
        &mut self,
        head: Segment,
        candidate: CellCoord,
        direction: Direction,
        out_events: &mut Vec<Event>,
    ) {
        self.grid.set(head.cell(), Tile::SnakeBody);
        self.grid.set(candidate, Tile::SnakeHead);
        self.chain.push_head(Segment::new(candidate, direction));
        out_events.push(Event::SnakeAdvanced {
            from: head.cell(),
            to: candidate,
            heading: direction,
        });
    }

    fn place_food(&mut self, cell: CellCoord, out_events: &mut Vec<Event>) {
        let rejection = if self.status != GameStatus::Playing {
            Some(FoodPlacementError::GameOver)
        } else {
            match self.grid.tile(cell) {
                None => Some(FoodPlacementError::OutOfBounds),
                Some(Tile::Empty) => None,
                Some(_) => Some(FoodPlacementError::Occupied),
            }
        };

        if let Some(reason) = rejection {
            log::debug!(
                "food placement at ({}, {}) rejected: {reason}",
                cell.column(),
                cell.row()
            );
            out_events.push(Event::FoodPlacementRejected { cell, reason });
            return;
        }

        if let Some(previous) = self.food.take() {
            self.grid.set(previous, Tile::Empty);
        }
        self.grid.set(cell, Tile::Food);
        self.food = Some(cell);
        out_events.push(Event::FoodPlaced { cell });
    }
}

/// Grid, chain and goal painted from a level descriptor.
struct Layout {
    grid: TileGrid,
    chain: SegmentChain,
    food: CellCoord,
    goal: u32,
}

impl Layout {
    fn build(
        level: &LevelDescriptor,
        heading: Direction,
        rng: &mut ChaCha8Rng,
    ) -> Result<Self, LevelInvalid> {
        let mut grid = TileGrid::new(level.dimensions);
        for &wall in &level.walls {
            grid.set(wall, Tile::Wall);
        }

        let segments: Vec<Segment> = level
            .initial_snake
            .iter()
            .map(|&cell| Segment::new(cell, heading))
            .collect();
        let chain = SegmentChain::new(segments).ok_or(LevelInvalid::SnakeTooShort {
            length: level.initial_snake.len(),
        })?;

        for (index, segment) in chain.view().iter().enumerate() {
            let cell = segment.cell();
            if grid.tile(cell) != Some(Tile::Empty) {
                return Err(LevelInvalid::SnakeOverlap { cell });
            }
            let tile = if index == 0 {
                Tile::SnakeHead
            } else {
                Tile::SnakeBody
            };
            grid.set(cell, tile);
        }

        let goal = u32::try_from(grid.count(Tile::Empty)).unwrap_or(u32::MAX);
        let food = place_random_food(&mut grid, rng).ok_or(LevelInvalid::NoRoomForFood)?;

        log::info!(
            "level initialised: {}x{} grid, goal {goal}",
            level.dimensions.columns(),
            level.dimensions.rows()
        );

        Ok(Self {
            grid,
            chain,
            food,
            goal,
        })
    }
}

/// Puts food on a uniformly chosen empty cell.
fn place_random_food(grid: &mut TileGrid, rng: &mut ChaCha8Rng) -> Option<CellCoord> {
    let empty = grid.cells_with(Tile::Empty);
    if empty.is_empty() {
        return None;
    }
    let cell = empty[rng.gen_range(0..empty.len())];
    grid.set(cell, Tile::Food);
    Some(cell)
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetDirection { direction } => {
            let _ = set_direction(world, direction, out_events);
        }
        Command::Tick => {
            let _ = tick(world, out_events);
        }
        Command::PlaceFood { cell } => world.place_food(cell, out_events),
    }
}

/// Records a turn for the next tick.
///
/// The first accepted request of a tick wins: later requests are ignored
/// until a tick consumes it. Requests reversing the committed heading are
/// ignored as well. Returns whether the request was accepted.
pub fn set_direction(world: &mut World, direction: Direction, out_events: &mut Vec<Event>) -> bool {
    let rejection = if world.status != GameStatus::Playing {
        Some(DirectionRejection::GameOver)
    } else if world.pending_direction.is_some() {
        Some(DirectionRejection::AlreadyPending)
    } else if direction == world.committed_direction().reverse() {
        Some(DirectionRejection::Reversal)
    } else {
        None
    };

    match rejection {
        Some(reason) => {
            out_events.push(Event::DirectionRejected { direction, reason });
            false
        }
        None => {
            world.pending_direction = Some(direction);
            out_events.push(Event::DirectionQueued { direction });
            true
        }
    }
}

/// Advances the snake by one cell.
///
/// Once the level has ended the session is frozen and every further tick
/// reports the same terminal outcome without emitting events.
pub fn tick(world: &mut World, out_events: &mut Vec<Event>) -> TickOutcome {
    match world.status {
        GameStatus::Won => return TickOutcome::Won,
        GameStatus::Lost(reason) => return TickOutcome::Lost(reason),
        GameStatus::Playing => {}
    }

    let direction = world
        .pending_direction
        .take()
        .unwrap_or_else(|| world.committed_direction());
    let outcome = world.advance(direction, out_events);
    world.finish(outcome, out_events);
    outcome
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use snake_core::{
        CellCoord, ChainView, Direction, GameStatus, GridDimensions, LevelDescriptor,
        SessionSnapshot, Tile, TileView,
    };

    use super::World;

    /// Level the session was built from.
    #[must_use]
    pub fn level(world: &World) -> &LevelDescriptor {
        &world.level
    }

    /// Size of the grid.
    #[must_use]
    pub fn dimensions(world: &World) -> GridDimensions {
        world.level.dimensions
    }

    /// Time between two ticks.
    #[must_use]
    pub fn tick_interval(world: &World) -> Duration {
        world.level.tick_interval
    }

    /// Read-only view of the tile grid.
    #[must_use]
    pub fn tile_view(world: &World) -> TileView<'_> {
        world.grid.view()
    }

    /// Tile stored at `cell`, if it lies inside the grid.
    #[must_use]
    pub fn tile(world: &World, cell: CellCoord) -> Option<Tile> {
        world.grid.tile(cell)
    }

    /// Read-only view of the snake, head first.
    #[must_use]
    pub fn chain(world: &World) -> ChainView<'_> {
        world.chain.view()
    }

    /// Everything presentation needs, captured in one value.
    #[must_use]
    pub fn snapshot(world: &World) -> SessionSnapshot<'_> {
        SessionSnapshot {
            tiles: world.grid.view(),
            chain: world.chain.view(),
            score: world.score,
            goal: world.goal,
            status: world.status,
        }
    }

    /// Food eaten since the level started.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// Number of empty cells at level start; reaching it wins the level.
    #[must_use]
    pub fn goal(world: &World) -> u32 {
        world.goal
    }

    /// Whether the level is still running.
    #[must_use]
    pub fn status(world: &World) -> GameStatus {
        world.status
    }

    /// Heading of the snake's head.
    #[must_use]
    pub fn committed_direction(world: &World) -> Direction {
        world.committed_direction()
    }

    /// Turn accepted for the next tick, if any.
    #[must_use]
    pub fn pending_direction(world: &World) -> Option<Direction> {
        world.pending_direction
    }

    /// Cell holding food, if any.
    #[must_use]
    pub fn food(world: &World) -> Option<CellCoord> {
        world.food
    }
}
