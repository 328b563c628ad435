#![no_std]

extern crate alloc;

use alloc::vec::Vec;
use core::ops::Index;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

pub use board::*;
pub use engine::*;
pub use error::*;
pub use generator::*;
pub use level::*;
pub use tile::*;
pub use types::*;

mod board;
mod engine;
mod error;
mod generator;
mod level;
mod tile;
mod types;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameConfig {
    pub size: Coord2,
    pub mines: CellCount,
}

impl GameConfig {
    pub const fn new_unchecked(size: Coord2, mines: CellCount) -> Self {
        Self { size, mines }
    }

    /// Builds a config, a board must have at least one cell and keep at least one cell free of mines.
    pub fn new(size: Coord2, mines: CellCount) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidLayout);
        }
        let config = Self::new_unchecked(size, mines);
        if mines >= config.total_cells() {
            return Err(GameError::TooManyMines);
        }
        Ok(config)
    }

    pub const fn total_cells(&self) -> CellCount {
        mult(self.size.0, self.size.1)
    }

    pub const fn width(&self) -> Coord {
        self.size.0
    }

    pub const fn height(&self) -> Coord {
        self.size.1
    }
}

/// Fixed mine placement plus the adjacency value of every cell.
///
/// Built once per game, right before the first cell is revealed, and never changed afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MineLayout {
    cells: Array2<CellValue>,
    mines: Vec<Coord2>,
}

impl MineLayout {
    /// Builds a layout from mines in placement order, computing every adjacency value.
    ///
    /// A cell counts a mine as adjacent when their Euclidean distance is strictly below 2, which selects exactly the 8
    /// surrounding cells.
    pub(crate) fn from_placed_mines(size: Coord2, mines: Vec<Coord2>) -> Self {
        let mut cells = Array2::from_elem(size.to_nd_index(), CellValue::Clear(0));

        for &coords in &mines {
            cells[coords.to_nd_index()] = CellValue::Mine;
        }

        for coords in iter_row_major(size) {
            if cells[coords.to_nd_index()].is_mine() {
                continue;
            }
            let adjacent = mines
                .iter()
                .filter(|&&mine| squared_distance(coords, mine) < 4)
                .count();
            // at most the 8 neighbors can be below the threshold
            cells[coords.to_nd_index()] = CellValue::Clear(adjacent as u8);
        }

        Self { cells, mines }
    }

    pub fn from_mine_coords(size: Coord2, mine_coords: &[Coord2]) -> Result<Self> {
        let mines = mine_coords
            .len()
            .try_into()
            .map_err(|_| GameError::TooManyMines)?;
        let config = GameConfig::new(size, mines)?;

        let mut mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in mine_coords {
            if coords.0 >= config.width() || coords.1 >= config.height() {
                return Err(GameError::OutOfBounds);
            }
            if mask[coords.to_nd_index()] {
                return Err(GameError::InvalidLayout);
            }
            mask[coords.to_nd_index()] = true;
        }

        Ok(Self::from_placed_mines(size, mine_coords.to_vec()))
    }

    pub fn game_config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count())
    }

    pub fn size(&self) -> Coord2 {
        let (width, height) = self.cells.dim();
        // the layout is only ever built from a `Coord2`
        (width as Coord, height as Coord)
    }

    pub fn mine_count(&self) -> CellCount {
        self.mines.len() as CellCount
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count()
    }

    pub fn contains_mine(&self, coords: Coord2) -> bool {
        self[coords].is_mine()
    }

    /// Mine coordinates in the order they were placed.
    pub fn mines(&self) -> &[Coord2] {
        &self.mines
    }
}

impl Index<Coord2> for MineLayout {
    type Output = CellValue;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}

fn squared_distance(a: Coord2, b: Coord2) -> i32 {
    let dx = i32::from(a.0) - i32::from(b.0);
    let dy = i32::from(a.1) - i32::from(b.1);
    dx * dx + dy * dy
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_rejects_full_board() {
        assert_eq!(GameConfig::new((2, 2), 4), Err(GameError::TooManyMines));
        assert_eq!(GameConfig::new((0, 2), 0), Err(GameError::InvalidLayout));
        assert!(GameConfig::new((2, 2), 3).is_ok());
    }

    #[test]
    fn adjacency_counts_only_the_eight_neighbors() {
        // (2, 2) is the only mine, cells exactly 2 away must stay at zero
        let layout = MineLayout::from_mine_coords((5, 5), &[(2, 2)]).unwrap();

        for coords in NeighborIter::new((2, 2), (5, 5)) {
            assert_eq!(layout[coords], CellValue::Clear(1), "{coords:?}");
        }
        assert_eq!(layout[(0, 2)], CellValue::Clear(0));
        assert_eq!(layout[(2, 4)], CellValue::Clear(0));
        assert_eq!(layout[(0, 0)], CellValue::Clear(0));
        assert_eq!(layout[(2, 2)], CellValue::Mine);
    }

    #[test]
    fn adjacency_reaches_eight() {
        let ring: Vec<_> = NeighborIter::new((1, 1), (3, 3)).collect();
        let layout = MineLayout::from_mine_coords((3, 3), &ring).unwrap();

        assert_eq!(layout[(1, 1)], CellValue::Clear(8));
        assert_eq!(layout.safe_cell_count(), 1);
    }

    #[test]
    fn from_mine_coords_validates_input() {
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(2, 0)]),
            Err(GameError::OutOfBounds)
        );
        assert_eq!(
            MineLayout::from_mine_coords((2, 2), &[(1, 0), (1, 0)]),
            Err(GameError::InvalidLayout)
        );
        assert_eq!(
            MineLayout::from_mine_coords((1, 2), &[(0, 0), (0, 1)]),
            Err(GameError::TooManyMines)
        );
    }
}
