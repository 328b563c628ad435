use chansweep_core::{Coord2, Level};

use crate::ServerMessage;

/// Something worth telling everyone on the channel, produced next to every state changing action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub channel: String,
    pub actor: Option<String>,
    pub kind: NoticeKind,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum NoticeKind {
    Started(Level),
    Joined,
    Restarted,
    Revealed(Coord2),
    Flagged(Coord2),
    Won,
    Lost,
    Ended,
}

impl Notice {
    pub fn new(channel: impl Into<String>, actor: Option<&str>, kind: NoticeKind) -> Self {
        Self {
            channel: channel.into(),
            actor: actor.map(str::to_owned),
            kind,
        }
    }

    /// Human readable log line.
    pub fn line(&self) -> String {
        let actor = self.actor.as_deref().unwrap_or("Someone");
        match self.kind {
            NoticeKind::Started(level) => format!("{actor} started a new game ({level})."),
            NoticeKind::Joined => format!("{actor} has joined the game."),
            NoticeKind::Restarted => format!("Game restarted by {actor}."),
            NoticeKind::Revealed((x, y)) => format!("{actor} revealed tile at {x},{y}."),
            NoticeKind::Flagged((x, y)) => format!("{actor} flagged tile at {x},{y}."),
            NoticeKind::Won => format!("{actor} won the game!"),
            NoticeKind::Lost => format!("{actor} lost the game!"),
            NoticeKind::Ended => format!("Game ended by {actor}."),
        }
    }

    pub fn to_message(&self) -> ServerMessage {
        ServerMessage::Log {
            message: self.line(),
        }
    }
}
