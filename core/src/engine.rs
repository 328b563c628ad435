use alloc::vec::Vec;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// Valid transitions:
/// - Fresh -> Active
/// - Fresh -> Won
/// - Fresh -> Lost
/// - Active -> Won
/// - Active -> Lost
///
/// Only `Lost` is stored, `Won` is recomputed from the revealed count.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameState {
    /// Mines are not placed yet, they will be on the first reveal
    Fresh,
    Active,
    Won,
    Lost,
}

impl GameState {
    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

/// Outcome of revealing a cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RevealOutcome {
    /// Cell already revealed or game already finished
    NoEffect,
    /// A single numbered cell was revealed
    TileRevealed(Tile),
    /// A flood reveal touched many cells, observers should replace their whole board
    BoardChanged(Board),
    Won(Board),
    Lost(Board),
}

impl RevealOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(&self) -> bool {
        !matches!(self, Self::NoEffect)
    }

    pub const fn board(&self) -> Option<&Board> {
        match self {
            Self::BoardChanged(board) | Self::Won(board) | Self::Lost(board) => Some(board),
            Self::NoEffect | Self::TileRevealed(_) => None,
        }
    }
}

/// Outcome of toggling a flag.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FlagOutcome {
    NoEffect,
    Flagged(Coord2),
    Unflagged(Coord2),
}

impl FlagOutcome {
    /// Whether this outcome could have caused an update to the game
    pub const fn has_update(self) -> bool {
        !matches!(self, Self::NoEffect)
    }

    /// The single-tile update to send to observers.
    pub const fn tile(self) -> Option<Tile> {
        match self {
            Self::NoEffect => None,
            Self::Flagged(coords) => Some(Tile::new(coords, TileState::Flagged)),
            Self::Unflagged(coords) => Some(Tile::new(coords, TileState::Hidden)),
        }
    }
}

/// Revealed and flagged marks placed on the board, kept apart from the mine layout.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct PlayerMarks {
    cells: Array2<EngineCell>,
    revealed_count: CellCount,
    flagged_count: CellCount,
}

impl PlayerMarks {
    fn new(size: Coord2) -> Self {
        Self {
            cells: Array2::default(size.to_nd_index()),
            revealed_count: 0,
            flagged_count: 0,
        }
    }

    fn at(&self, coords: Coord2) -> EngineCell {
        self.cells[coords.to_nd_index()]
    }

    /// Marks a cell revealed, dropping its flag. Returns false if it already was.
    fn reveal(&mut self, coords: Coord2) -> bool {
        let cell = &mut self.cells[coords.to_nd_index()];
        match *cell {
            EngineCell::Revealed => return false,
            EngineCell::Flagged => self.flagged_count -= 1,
            EngineCell::Hidden => {}
        }
        *cell = EngineCell::Revealed;
        self.revealed_count += 1;
        true
    }
}

/// One minesweeper game, from the first click to a win or loss.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Game {
    config: GameConfig,
    seed: u64,
    layout: Option<MineLayout>,
    marks: PlayerMarks,
    over: bool,
    triggered_mine: Option<Coord2>,
}

impl Game {
    /// Creates a fresh game, mines are placed from `seed` once the first cell is revealed.
    pub fn new(config: GameConfig, seed: u64) -> Self {
        Self {
            config,
            seed,
            layout: None,
            marks: PlayerMarks::new(config.size),
            over: false,
            triggered_mine: None,
        }
    }

    /// Creates a game over an existing layout, it starts out already generated.
    pub fn with_layout(layout: MineLayout) -> Self {
        let config = layout.game_config();
        Self {
            config,
            seed: 0,
            layout: Some(layout),
            marks: PlayerMarks::new(config.size),
            over: false,
            triggered_mine: None,
        }
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn size(&self) -> Coord2 {
        self.config.size
    }

    pub fn mine_count(&self) -> CellCount {
        self.config.mines
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn is_generated(&self) -> bool {
        self.layout.is_some()
    }

    pub fn is_over(&self) -> bool {
        self.over
    }

    /// All safe cells revealed without hitting a mine.
    pub fn is_won(&self) -> bool {
        !self.over && self.config.total_cells() - self.marks.revealed_count == self.config.mines
    }

    pub fn state(&self) -> GameState {
        if self.over {
            GameState::Lost
        } else if self.is_won() {
            GameState::Won
        } else if self.layout.is_none() {
            GameState::Fresh
        } else {
            GameState::Active
        }
    }

    pub fn revealed_count(&self) -> CellCount {
        self.marks.revealed_count
    }

    pub fn flagged_count(&self) -> CellCount {
        self.marks.flagged_count
    }

    /// How many mines have not been flagged yet
    pub fn mines_left(&self) -> isize {
        (self.config.mines as isize) - (self.marks.flagged_count as isize)
    }

    pub fn cell_at(&self, coords: Coord2) -> EngineCell {
        self.marks.at(coords)
    }

    pub fn triggered_mine(&self) -> Option<Coord2> {
        self.triggered_mine
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let (width, height) = self.size();
        if coords.0 < width && coords.1 < height {
            Ok(coords)
        } else {
            Err(GameError::OutOfBounds)
        }
    }

    pub fn board(&self) -> Board {
        Board::from_game(self)
    }

    /// What observers may see at `coords`, `None` for cells that are neither revealed nor flagged.
    pub fn visible_state(&self, coords: Coord2) -> Option<TileState> {
        let coords = self.validate_coords(coords).ok()?;
        match self.marks.at(coords) {
            EngineCell::Hidden => None,
            EngineCell::Flagged => Some(TileState::Flagged),
            EngineCell::Revealed => Some(match self.layout.as_ref()?[coords] {
                CellValue::Mine if self.triggered_mine == Some(coords) => TileState::Exploded,
                CellValue::Mine => TileState::Mine,
                CellValue::Clear(count) => TileState::Revealed(count),
            }),
        }
    }

    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state().is_finished() || self.marks.at(coords).is_revealed() {
            return Ok(RevealOutcome::NoEffect);
        }

        let (seed, config) = (self.seed, self.config);
        let layout = self.layout.get_or_insert_with(|| {
            log::debug!("First reveal at {:?}, placing mines", coords);
            RandomMinefieldGenerator::new(seed, coords).generate(config)
        });
        let value = layout[coords];

        self.marks.reveal(coords);

        let CellValue::Clear(count) = value else {
            self.lose(coords);
            return Ok(RevealOutcome::Lost(self.board()));
        };

        if count == 0 {
            self.flood_reveal(coords);
        }

        Ok(if self.is_won() {
            log::debug!("Game won after reveal at {:?}", coords);
            RevealOutcome::Won(self.board())
        } else if count == 0 {
            RevealOutcome::BoardChanged(self.board())
        } else {
            RevealOutcome::TileRevealed(Tile::new(coords, TileState::Revealed(count)))
        })
    }

    pub fn flag(&mut self, coords: Coord2) -> Result<FlagOutcome> {
        let coords = self.validate_coords(coords)?;

        if self.state().is_finished() {
            return Ok(FlagOutcome::NoEffect);
        }

        let cell = &mut self.marks.cells[coords.to_nd_index()];
        Ok(match *cell {
            EngineCell::Revealed => FlagOutcome::NoEffect,
            EngineCell::Hidden => {
                *cell = EngineCell::Flagged;
                self.marks.flagged_count += 1;
                FlagOutcome::Flagged(coords)
            }
            EngineCell::Flagged => {
                *cell = EngineCell::Hidden;
                self.marks.flagged_count -= 1;
                FlagOutcome::Unflagged(coords)
            }
        })
    }

    /// Reveals the zero region around `start` and its numbered border, `start` must be revealed already.
    ///
    /// Uses an explicit stack, neighbors are visited clockwise from the top-left. Flags inside the region are cleared.
    fn flood_reveal(&mut self, start: Coord2) {
        let Some(layout) = self.layout.as_ref() else {
            return;
        };
        let size = self.config.size;

        let mut to_visit: Vec<Coord2> = NeighborIter::new(start, size).collect();
        to_visit.reverse();
        let mut opened = 0_u32;

        while let Some(coords) = to_visit.pop() {
            if !self.marks.reveal(coords) {
                continue;
            }
            opened += 1;

            // mines never read zero, so the fill stops at numbered cells before reaching one
            if layout[coords].is_zero() {
                let start_len = to_visit.len();
                to_visit.extend(
                    NeighborIter::new(coords, size).filter(|&pos| !self.marks.at(pos).is_revealed()),
                );
                to_visit[start_len..].reverse();
            }
        }

        log::trace!("Flood reveal from {:?} opened {} cells", start, opened);
    }

    /// Ends the game, every mine becomes revealed.
    fn lose(&mut self, coords: Coord2) {
        self.over = true;
        self.triggered_mine = Some(coords);

        if let Some(layout) = self.layout.as_ref() {
            for &mine in layout.mines() {
                self.marks.reveal(mine);
            }
        }
        log::debug!("Game lost on mine at {:?}", coords);
    }

    #[cfg(test)]
    pub(crate) fn layout(&self) -> Option<&MineLayout> {
        self.layout.as_ref()
    }
}
