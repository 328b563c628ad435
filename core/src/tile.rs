use serde::{Deserialize, Serialize};

/// Hidden value of a cell, fixed once the mine layout is generated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellValue {
    Mine,
    /// Number of mines among the 8 surrounding cells, `0..=8`.
    Clear(u8),
}

impl CellValue {
    pub const fn is_mine(self) -> bool {
        matches!(self, Self::Mine)
    }

    pub const fn is_zero(self) -> bool {
        matches!(self, Self::Clear(0))
    }
}

/// Player-visible state stored by the engine for each cell.
///
/// Revealed and flagged are separate variants, a cell can never be both.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineCell {
    Hidden,
    Revealed,
    Flagged,
}

impl EngineCell {
    pub const fn is_revealed(self) -> bool {
        matches!(self, Self::Revealed)
    }

}

impl Default for EngineCell {
    fn default() -> Self {
        Self::Hidden
    }
}
