use thiserror::Error;

#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Coordinates are outside the board")]
    OutOfBounds,
    #[error("Unrecognized level, expected one of BEGINNER, INTERMEDIATE or EXPERT")]
    InvalidLevel,
    #[error("Too many mines, at least one cell must stay safe")]
    TooManyMines,
    #[error("Mine layout does not fit the board")]
    InvalidLayout,
}

pub type Result<T> = core::result::Result<T, GameError>;
