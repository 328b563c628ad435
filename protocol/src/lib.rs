//! Messages exchanged between a channel dispatcher and its participants.
//!
//! Inbound [`Request`]s carry a channel id, an optional user id and an [`Action`]. Outbound [`ServerMessage`]s are
//! wrapped in an [`Envelope`] telling the dispatcher whether to answer the requesting user or broadcast to the channel.
//! [`Notice`]s are the free-text log lines shown alongside the board.

use chansweep_core::{Board, CellCount, Coord, FlagOutcome, GameState, Level, RevealOutcome, Tile};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use notice::*;

mod notice;

#[derive(Error, Debug)]
pub enum ProtocolError {
    #[error("Malformed message: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ProtocolError>;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    pub channel: String,
    #[serde(default)]
    pub user: Option<String>,
    pub action: Action,
}

impl Request {
    pub fn from_json(line: &str) -> Result<Self> {
        Ok(serde_json::from_str(line)?)
    }
}

/// Something a participant asks to do on the channel's game.
///
/// Coordinates are kept as plain integers, range checks belong to the engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    Start {
        #[serde(default)]
        level: Option<String>,
    },
    Load,
    Reset,
    Reveal {
        x: i64,
        y: i64,
    },
    Flag {
        x: i64,
        y: i64,
    },
    End,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    Started {
        level: Level,
        width: Coord,
        height: Coord,
        mines: CellCount,
    },
    /// Full board, replaces whatever the observer had
    Initial { board: Board },
    /// Single tile changed
    Update { tile: Tile },
    Win { board: Board },
    Loss { board: Board },
    Ended,
    Log { message: String },
    Error { message: String },
}

impl ServerMessage {
    pub fn started(level: Level) -> Self {
        let config = level.config();
        Self::Started {
            level,
            width: config.width(),
            height: config.height(),
            mines: config.mines,
        }
    }

    /// Board sent to someone joining, the kind follows how the game stands.
    pub fn snapshot(board: Board, state: GameState) -> Self {
        match state {
            GameState::Lost => Self::Loss { board },
            GameState::Won => Self::Win { board },
            GameState::Fresh | GameState::Active => Self::Initial { board },
        }
    }

    /// Message to broadcast after a reveal, `None` when nothing changed.
    pub fn from_reveal(outcome: RevealOutcome) -> Option<Self> {
        Some(match outcome {
            RevealOutcome::NoEffect => return None,
            RevealOutcome::TileRevealed(tile) => Self::Update { tile },
            RevealOutcome::BoardChanged(board) => Self::Initial { board },
            RevealOutcome::Won(board) => Self::Win { board },
            RevealOutcome::Lost(board) => Self::Loss { board },
        })
    }

    /// Message to broadcast after a flag toggle, `None` when nothing changed.
    pub fn from_flag(outcome: FlagOutcome) -> Option<Self> {
        outcome.tile().map(|tile| Self::Update { tile })
    }

    pub fn error(err: impl std::fmt::Display) -> Self {
        Self::Error {
            message: err.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "to", content = "id", rename_all = "snake_case")]
pub enum Audience {
    /// Only the user who sent the request
    User(String),
    /// Everyone watching the channel
    Channel(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Envelope {
    pub audience: Audience,
    pub message: ServerMessage,
}

impl Envelope {
    pub fn to_user(user: impl Into<String>, message: ServerMessage) -> Self {
        Self {
            audience: Audience::User(user.into()),
            message,
        }
    }

    pub fn to_channel(channel: impl Into<String>, message: ServerMessage) -> Self {
        Self {
            audience: Audience::Channel(channel.into()),
            message,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
