use chansweep_core::GameError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("Game does not exist for channel {0}")]
    NotFound(String),
    #[error("Game already exists for channel {0}")]
    AlreadyExists(String),
    #[error(transparent)]
    Game(#[from] GameError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
