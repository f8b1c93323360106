//! Projection of a session snapshot into layered draw commands.

use glam::Vec2;
use snake_core::{
    CellCoord, ChainView, GameStatus, InvariantViolation, SessionSnapshot, Tile,
};

use crate::{Color, DrawCommand, Scene, SpriteId};

/// Checkerboard color of cells whose column and row sum to an even number.
pub const CHECKER_EVEN: Color = Color::from_rgb_u8(0x49, 0x43, 0x51);
/// Checkerboard color of the remaining cells.
pub const CHECKER_ODD: Color = Color::from_rgb_u8(0x44, 0x3e, 0x4c);
/// Food is drawn larger than its cell, centred on it.
pub const FOOD_SCALE: f32 = 1.3;

/// Maps the snapshot to draw commands, interpolating the snake by `delta`.
///
/// `delta` lies in `[-1, 0]`: every snake segment is drawn `delta` cells
/// along its heading, so `-1` shows the segment on the cell it came from and
/// `0` on the cell it occupies.
pub fn project(snapshot: &SessionSnapshot<'_>, delta: f32) -> Result<Scene, InvariantViolation> {
    let tiles = snapshot.tiles;
    let dead = matches!(snapshot.status, GameStatus::Lost(_));
    let mut scene = Scene::new(tiles.dimensions(), snapshot.score, snapshot.goal);

    for (cell, tile) in tiles.iter() {
        scene.background.push(DrawCommand::Fill {
            cell,
            color: checker_color(cell),
        });

        match tile {
            Tile::Empty => {}
            Tile::Wall => scene
                .foreground
                .push(DrawCommand::sprite(SpriteId::Wall, cell_origin(cell))),
            Tile::Food => scene.foreground.push(
                DrawCommand::sprite(SpriteId::Food, cell_origin(cell)).scaled(FOOD_SCALE),
            ),
            Tile::SnakeBody | Tile::SnakeHead => {
                let index = snapshot
                    .chain
                    .position(cell)
                    .ok_or(InvariantViolation::SegmentMissing { cell })?;
                let sprite = segment_sprite(&snapshot.chain, index, dead)?;
                let heading = snapshot
                    .chain
                    .get(index)
                    .ok_or(InvariantViolation::SegmentMissing { cell })?
                    .heading();
                let (dx, dy) = heading.offset();
                let offset = Vec2::new(dx as f32, dy as f32) * delta;
                scene
                    .foreground
                    .push(DrawCommand::sprite(sprite, cell_origin(cell) + offset));
            }
        }
    }

    Ok(scene)
}

fn checker_color(cell: CellCoord) -> Color {
    if (cell.column() + cell.row()) % 2 == 0 {
        CHECKER_EVEN
    } else {
        CHECKER_ODD
    }
}

fn cell_origin(cell: CellCoord) -> Vec2 {
    Vec2::new(cell.column() as f32, cell.row() as f32)
}

fn segment_sprite(
    chain: &ChainView<'_>,
    index: usize,
    dead: bool,
) -> Result<SpriteId, InvariantViolation> {
    let length = chain.len();
    let segment = chain.get(index).ok_or(InvariantViolation::ChainTooShort { length })?;
    let Some(ahead_index) = index.checked_sub(1) else {
        return Ok(SpriteId::head(segment.heading(), dead));
    };
    let ahead = chain
        .get(ahead_index)
        .ok_or(InvariantViolation::ChainTooShort { length })?
        .heading();

    if index + 1 == length {
        Ok(SpriteId::tail(ahead))
    } else {
        SpriteId::body(ahead, segment.heading())
    }
}
