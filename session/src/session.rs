use chansweep_core::{Board, Coord2, FlagOutcome, Game, GameState, Level, RevealOutcome, checked_coords};
use parking_lot::RwLock;

use crate::Result;

/// Board and state read under the same lock, so they always describe the same moment.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Snapshot {
    pub board: Board,
    pub state: GameState,
}

/// The live game of one channel.
///
/// Reveals, flags and resets take the write lock and run to completion before anyone else touches the game,
/// snapshots share the read lock.
#[derive(Debug)]
pub struct Session {
    channel: String,
    level: Level,
    game: RwLock<Game>,
}

impl Session {
    pub(crate) fn new(channel: &str, level: Level, seed: u64) -> Self {
        Self {
            channel: channel.to_owned(),
            level,
            game: RwLock::new(Game::new(level.config(), seed)),
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn level(&self) -> Level {
        self.level
    }

    /// Checks caller supplied coordinates against this session's board size.
    pub fn coords(&self, x: i64, y: i64) -> Result<Coord2> {
        Ok(checked_coords((x, y), self.level.config().size)?)
    }

    pub fn reveal(&self, coords: Coord2) -> Result<RevealOutcome> {
        let outcome = self.game.write().reveal(coords)?;
        log::trace!("[{}] reveal {:?}: {:?}", self.channel, coords, outcome);
        Ok(outcome)
    }

    pub fn flag(&self, coords: Coord2) -> Result<FlagOutcome> {
        let outcome = self.game.write().flag(coords)?;
        log::trace!("[{}] flag {:?}: {:?}", self.channel, coords, outcome);
        Ok(outcome)
    }

    pub fn board(&self) -> Board {
        self.game.read().board()
    }

    pub fn state(&self) -> GameState {
        self.game.read().state()
    }

    pub fn snapshot(&self) -> Snapshot {
        let game = self.game.read();
        Snapshot {
            board: game.board(),
            state: game.state(),
        }
    }

    /// Runs `f` against the current game under the read lock.
    pub fn with_game<R>(&self, f: impl FnOnce(&Game) -> R) -> R {
        f(&self.game.read())
    }

    /// Discards the current game for a fresh one of the same level.
    pub(crate) fn restart(&self, seed: u64) -> Board {
        let mut game = self.game.write();
        *game = Game::new(self.level.config(), seed);
        game.board()
    }
}
