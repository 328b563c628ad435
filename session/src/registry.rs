use std::sync::Arc;

use chansweep_core::{Board, Level};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::Mutex;
use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::{Result, Session, SessionError};

/// Owns the channel id to [`Session`] mapping.
///
/// Inserts, replacements and removals are linearizable per channel: the map is sharded, so two channels only contend
/// when they hash to the same shard and only for the duration of the map operation itself.
#[derive(Debug)]
pub struct SessionRegistry {
    sessions: DashMap<String, Arc<Session>>,
    seeds: Mutex<ChaCha8Rng>,
}

impl SessionRegistry {
    /// Registry whose games are seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_seed(rand::rng().random())
    }

    /// Registry whose sequence of game seeds is fully determined by `seed`.
    pub fn with_seed(seed: u64) -> Self {
        Self {
            sessions: DashMap::new(),
            seeds: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
        }
    }

    fn next_seed(&self) -> u64 {
        self.seeds.lock().next_u64()
    }

    pub fn exists(&self, channel: &str) -> bool {
        self.sessions.contains_key(channel)
    }

    /// Registers a fresh game for `channel`, exactly one of several concurrent starts wins.
    pub fn start(&self, channel: &str, level: Level) -> Result<Arc<Session>> {
        match self.sessions.entry(channel.to_owned()) {
            Entry::Occupied(_) => Err(SessionError::AlreadyExists(channel.to_owned())),
            Entry::Vacant(entry) => {
                let session = Arc::new(Session::new(channel, level, self.next_seed()));
                entry.insert(Arc::clone(&session));
                log::debug!("[{}] started {} game", channel, level);
                Ok(session)
            }
        }
    }

    pub fn get(&self, channel: &str) -> Result<Arc<Session>> {
        self.sessions
            .get(channel)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SessionError::NotFound(channel.to_owned()))
    }

    /// Replaces the channel's game with a fresh one of the same level.
    ///
    /// The swap happens under the session's write lock, so it is ordered with the reveals and flags of that channel.
    /// The returned board is read under that same lock and is always empty.
    pub fn reset(&self, channel: &str) -> Result<(Arc<Session>, Board)> {
        let session = self.get(channel)?;
        let board = session.restart(self.next_seed());
        log::debug!("[{}] reset {} game", channel, session.level());
        Ok((session, board))
    }

    /// Removes the channel's game, returns whether there was one.
    pub fn end(&self, channel: &str) -> bool {
        let removed = self.sessions.remove(channel).is_some();
        if removed {
            log::debug!("[{}] ended game", channel);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chansweep_core::GameState;
    use std::sync::Barrier;
    use std::thread;

    #[test]
    fn lifecycle() {
        let registry = SessionRegistry::with_seed(1);
        assert!(!registry.exists("C1"));
        assert_eq!(
            registry.get("C1").unwrap_err(),
            SessionError::NotFound("C1".to_owned())
        );

        let session = registry.start("C1", Level::Beginner).unwrap();
        assert!(registry.exists("C1"));
        assert!(Arc::ptr_eq(&session, &registry.get("C1").unwrap()));
        assert_eq!(
            registry.start("C1", Level::Expert).unwrap_err(),
            SessionError::AlreadyExists("C1".to_owned())
        );

        assert!(registry.end("C1"));
        assert!(!registry.exists("C1"));
        assert!(!registry.end("C1"));
        assert!(registry.is_empty());
    }

    #[test]
    fn reset_unknown_channel_fails() {
        let registry = SessionRegistry::with_seed(1);
        assert_eq!(
            registry.reset("nope").unwrap_err(),
            SessionError::NotFound("nope".to_owned())
        );
    }

    #[test]
    fn reset_intermediate_gives_fresh_game_of_same_level() {
        let registry = SessionRegistry::with_seed(3);
        let session = registry.start("C1", Level::Intermediate).unwrap();
        session.reveal((8, 8)).unwrap();
        session.flag((0, 0)).unwrap();
        let old_seed = session.with_game(|game| game.seed());

        let (session, board) = registry.reset("C1").unwrap();

        assert!(board.is_empty());
        assert_eq!((board.width, board.height), (16, 16));
        assert_eq!(session.level(), Level::Intermediate);
        session.with_game(|game| {
            assert_eq!(game.state(), GameState::Fresh);
            assert_eq!(game.size(), (16, 16));
            assert_eq!(game.mine_count(), 40);
            assert_eq!(game.revealed_count(), 0);
            assert_eq!(game.flagged_count(), 0);
            assert!(!game.is_generated());
            assert_ne!(game.seed(), old_seed);
        });
    }

    #[test]
    fn same_registry_seed_same_games() {
        let a = SessionRegistry::with_seed(99);
        let b = SessionRegistry::with_seed(99);
        let first = a.start("C1", Level::Expert).unwrap();
        let second = b.start("other", Level::Expert).unwrap();

        first.reveal((10, 10)).unwrap();
        second.reveal((10, 10)).unwrap();

        assert_eq!(first.board(), second.board());
    }

    #[test]
    fn concurrent_starts_have_one_winner() {
        let registry = SessionRegistry::with_seed(1);
        let barrier = Barrier::new(8);

        let results: Vec<_> = thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| {
                    scope.spawn(|| {
                        barrier.wait();
                        registry.start("C1", Level::Beginner)
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert!(
            results
                .iter()
                .filter_map(|r| r.as_ref().err())
                .all(|err| *err == SessionError::AlreadyExists("C1".to_owned()))
        );
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn concurrent_reveals_of_same_cell_change_state_once() {
        for seed in 0..20 {
            let registry = SessionRegistry::with_seed(seed);
            let session = registry.start("C1", Level::Beginner).unwrap();
            let barrier = Barrier::new(2);

            let outcomes: Vec<_> = thread::scope(|scope| {
                let handles: Vec<_> = (0..2)
                    .map(|_| {
                        scope.spawn(|| {
                            barrier.wait();
                            session.reveal((3, 3)).unwrap()
                        })
                    })
                    .collect();
                handles.into_iter().map(|h| h.join().unwrap()).collect()
            });

            assert_eq!(outcomes.iter().filter(|o| o.has_update()).count(), 1);
            assert_eq!(outcomes.iter().filter(|o| !o.has_update()).count(), 1);
        }
    }

    #[test]
    fn snapshots_never_see_half_a_flood() {
        for seed in 0..20 {
            let registry = SessionRegistry::with_seed(seed);
            let session = registry.start("C1", Level::Expert).unwrap();

            let seen: Vec<_> = thread::scope(|scope| {
                let reader = scope.spawn(|| {
                    let mut seen = Vec::new();
                    loop {
                        let board = session.board();
                        let done = !board.is_empty();
                        seen.push(board);
                        if done {
                            return seen;
                        }
                        thread::yield_now();
                    }
                });
                session.reveal((15, 8)).unwrap();
                reader.join().unwrap()
            });

            // one mutation happened, so there are only two states to observe
            let last = session.board();
            assert!(seen.iter().all(|board| board.is_empty() || *board == last));
        }
    }

    #[test]
    fn channels_are_independent() {
        let registry = SessionRegistry::with_seed(5);
        let first = registry.start("C1", Level::Beginner).unwrap();
        let other = registry.start("C2", Level::Beginner).unwrap();

        // clicking everything ends the first game one way or the other
        for y in 0..8 {
            for x in 0..8 {
                first.reveal((x, y)).unwrap();
            }
        }

        assert!(first.state().is_finished());
        assert_eq!(other.state(), GameState::Fresh);
        assert!(other.reveal((0, 0)).unwrap().has_update());
        assert!(registry.reset("C1").is_ok());
        assert_eq!(registry.get("C2").unwrap().state(), other.state());
    }
}
