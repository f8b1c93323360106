use snake_core::{CellCoord, GridDimensions, Tile, TileView};

/// Dense row-major matrix of tiles owned by the world.
#[derive(Clone, Debug)]
pub(crate) struct TileGrid {
    dimensions: GridDimensions,
    tiles: Vec<Tile>,
}

impl TileGrid {
    pub(crate) fn new(dimensions: GridDimensions) -> Self {
        Self {
            dimensions,
            tiles: vec![Tile::Empty; dimensions.cell_count()],
        }
    }

    pub(crate) fn contains(&self, cell: CellCoord) -> bool {
        self.dimensions.contains(cell)
    }

    pub(crate) fn tile(&self, cell: CellCoord) -> Option<Tile> {
        self.dimensions
            .index(cell)
            .and_then(|index| self.tiles.get(index).copied())
    }

    /// Paints a cell. Cells outside the grid are ignored.
    pub(crate) fn set(&mut self, cell: CellCoord, tile: Tile) {
        if let Some(slot) = self
            .dimensions
            .index(cell)
            .and_then(|index| self.tiles.get_mut(index))
        {
            *slot = tile;
        }
    }

    pub(crate) fn count(&self, tile: Tile) -> usize {
        self.view().count(tile)
    }

    pub(crate) fn cells_with(&self, tile: Tile) -> Vec<CellCoord> {
        self.view()
            .iter()
            .filter(|(_, candidate)| *candidate == tile)
            .map(|(cell, _)| cell)
            .collect()
    }

    pub(crate) fn view(&self) -> TileView<'_> {
        TileView::new(&self.tiles, self.dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_ignores_cells_outside_the_grid() {
        let mut grid = TileGrid::new(GridDimensions::new(3, 2));
        grid.set(CellCoord::new(3, 0), Tile::Wall);
        grid.set(CellCoord::new(2, 1), Tile::Wall);

        assert_eq!(grid.count(Tile::Wall), 1);
        assert_eq!(grid.tile(CellCoord::new(2, 1)), Some(Tile::Wall));
        assert_eq!(grid.tile(CellCoord::new(3, 0)), None);
    }

    #[test]
    fn cells_with_lists_matches_in_row_major_order() {
        let mut grid = TileGrid::new(GridDimensions::new(3, 3));
        grid.set(CellCoord::new(2, 0), Tile::Food);
        grid.set(CellCoord::new(0, 2), Tile::Food);

        assert_eq!(
            grid.cells_with(Tile::Food),
            vec![CellCoord::new(2, 0), CellCoord::new(0, 2)]
        );
        assert_eq!(grid.cells_with(Tile::Empty).len(), 7);
    }
}
