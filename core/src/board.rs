use alloc::vec::Vec;
use serde::{Deserialize, Serialize};

use crate::*;

/// What an observer is allowed to see of one cell.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TileState {
    /// Only sent as a single-tile update when a flag is removed, a [`Board`] never holds hidden tiles.
    Hidden,
    Flagged,
    Revealed(u8),
    Mine,
    /// The mine whose reveal lost the game.
    Exploded,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tile {
    pub x: Coord,
    pub y: Coord,
    pub state: TileState,
}

impl Tile {
    pub const fn new((x, y): Coord2, state: TileState) -> Self {
        Self { x, y, state }
    }

    pub const fn coords(&self) -> Coord2 {
        (self.x, self.y)
    }
}

/// Snapshot of a game that only contains revealed and flagged cells, in row-major order.
///
/// This is the only view of a [`Game`] that leaves the engine, so the mine layout stays secret until the game is lost.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub width: Coord,
    pub height: Coord,
    pub tiles: Vec<Tile>,
}

impl Board {
    pub fn from_game(game: &Game) -> Self {
        let size = game.size();
        let tiles = iter_row_major(size)
            .filter_map(|coords| game.visible_state(coords).map(|state| Tile::new(coords, state)))
            .collect();

        Self {
            width: size.0,
            height: size.1,
            tiles,
        }
    }

    pub fn tile_at(&self, coords: Coord2) -> Option<&Tile> {
        self.tiles.iter().find(|tile| tile.coords() == coords)
    }

    pub fn revealed_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| !matches!(tile.state, TileState::Flagged | TileState::Hidden))
            .count()
    }

    pub fn flagged_count(&self) -> usize {
        self.tiles
            .iter()
            .filter(|tile| tile.state == TileState::Flagged)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}
