use chansweep_core::{Board, FlagOutcome, Level, RevealOutcome};
use chansweep_protocol::{Notice, NoticeKind};

use crate::{Result, SessionRegistry, Snapshot};

/// Result of an operation plus the notices the dispatcher should broadcast to the channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Reply<T> {
    pub value: T,
    pub notices: Vec<Notice>,
}

impl<T> Reply<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            notices: Vec::new(),
        }
    }

    fn notice(mut self, channel: &str, actor: Option<&str>, kind: NoticeKind) -> Self {
        self.notices.push(Notice::new(channel, actor, kind));
        self
    }
}

/// The operations a channel dispatcher exposes to its participants.
///
/// Takes raw dispatcher input (level tokens, signed coordinates), checks it and routes it to the channel's session.
#[derive(Debug)]
pub struct ChannelService {
    registry: SessionRegistry,
    default_level: Level,
}

impl ChannelService {
    pub fn new(registry: SessionRegistry) -> Self {
        Self {
            registry,
            default_level: Level::default(),
        }
    }

    /// Level used by [`Self::start_game`] when the request names none.
    pub fn with_default_level(mut self, level: Level) -> Self {
        self.default_level = level;
        self
    }

    pub fn registry(&self) -> &SessionRegistry {
        &self.registry
    }

    pub fn start_game(
        &self,
        channel: &str,
        actor: Option<&str>,
        level: Option<&str>,
    ) -> Result<Reply<Level>> {
        let level = match level {
            Some(token) => token.parse()?,
            None => self.default_level,
        };
        self.registry.start(channel, level)?;
        Ok(Reply::new(level).notice(channel, actor, NoticeKind::Started(level)))
    }

    /// Current board for someone joining the channel.
    pub fn load_game(&self, channel: &str, actor: Option<&str>) -> Result<Reply<Snapshot>> {
        let snapshot = self.registry.get(channel)?.snapshot();
        Ok(Reply::new(snapshot).notice(channel, actor, NoticeKind::Joined))
    }

    pub fn reset_game(&self, channel: &str, actor: Option<&str>) -> Result<Reply<Board>> {
        let (_, board) = self.registry.reset(channel)?;
        Ok(Reply::new(board).notice(channel, actor, NoticeKind::Restarted))
    }

    pub fn reveal(
        &self,
        channel: &str,
        actor: Option<&str>,
        x: i64,
        y: i64,
    ) -> Result<Reply<RevealOutcome>> {
        let session = self.registry.get(channel)?;
        let coords = session.coords(x, y)?;
        let outcome = session.reveal(coords)?;

        let mut reply = Reply::new(outcome);
        if reply.value.has_update() {
            reply = reply.notice(channel, actor, NoticeKind::Revealed(coords));
        }
        match reply.value {
            RevealOutcome::Lost(_) => Ok(reply.notice(channel, actor, NoticeKind::Lost)),
            RevealOutcome::Won(_) => Ok(reply.notice(channel, actor, NoticeKind::Won)),
            _ => Ok(reply),
        }
    }

    pub fn flag(
        &self,
        channel: &str,
        actor: Option<&str>,
        x: i64,
        y: i64,
    ) -> Result<Reply<FlagOutcome>> {
        let session = self.registry.get(channel)?;
        let coords = session.coords(x, y)?;
        let outcome = session.flag(coords)?;

        let reply = Reply::new(outcome);
        Ok(if outcome.has_update() {
            reply.notice(channel, actor, NoticeKind::Flagged(coords))
        } else {
            reply
        })
    }

    /// Removes the channel's game, ending a channel without one is not an error.
    pub fn end_game(&self, channel: &str, actor: Option<&str>) -> Reply<bool> {
        let removed = self.registry.end(channel);
        let reply = Reply::new(removed);
        if removed {
            reply.notice(channel, actor, NoticeKind::Ended)
        } else {
            reply
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionError;
    use chansweep_core::{GameError, GameState};
    use std::sync::Barrier;
    use std::thread;

    fn service() -> ChannelService {
        ChannelService::new(SessionRegistry::with_seed(12))
    }

    fn kinds<T>(reply: &Reply<T>) -> Vec<NoticeKind> {
        reply.notices.iter().map(|notice| notice.kind).collect()
    }

    #[test]
    fn start_parses_level_and_defaults_to_beginner() {
        let service = service();

        let reply = service.start_game("C1", Some("U1"), None).unwrap();
        assert_eq!(reply.value, Level::Beginner);
        assert_eq!(kinds(&reply), [NoticeKind::Started(Level::Beginner)]);

        let reply = service.start_game("C2", None, Some("EXPERT")).unwrap();
        assert_eq!(reply.value, Level::Expert);
        assert_eq!(service.registry().get("C2").unwrap().level(), Level::Expert);
    }

    #[test]
    fn start_errors() {
        let service = service();

        assert_eq!(
            service.start_game("C1", None, Some("HARD")).unwrap_err(),
            SessionError::Game(GameError::InvalidLevel)
        );
        assert!(!service.registry().exists("C1"));

        service.start_game("C1", None, None).unwrap();
        assert_eq!(
            service.start_game("C1", None, Some("EXPERT")).unwrap_err(),
            SessionError::AlreadyExists("C1".to_owned())
        );
    }

    #[test]
    fn default_level_is_configurable() {
        let service = service().with_default_level(Level::Intermediate);

        assert_eq!(
            service.start_game("C1", None, None).unwrap().value,
            Level::Intermediate
        );
    }

    #[test]
    fn missing_game_is_not_found_everywhere() {
        let service = service();
        let not_found = SessionError::NotFound("C9".to_owned());

        assert_eq!(service.load_game("C9", None).unwrap_err(), not_found);
        assert_eq!(service.reset_game("C9", None).unwrap_err(), not_found);
        assert_eq!(service.reveal("C9", None, 0, 0).unwrap_err(), not_found);
        assert_eq!(service.flag("C9", None, 0, 0).unwrap_err(), not_found);

        let reply = service.end_game("C9", None);
        assert!(!reply.value);
        assert!(reply.notices.is_empty());
    }

    #[test]
    fn out_of_bounds_is_reported() {
        let service = service();
        service.start_game("C1", None, None).unwrap();
        let out_of_bounds = SessionError::Game(GameError::OutOfBounds);

        assert_eq!(service.reveal("C1", None, -1, 0).unwrap_err(), out_of_bounds);
        assert_eq!(service.reveal("C1", None, 0, 8).unwrap_err(), out_of_bounds);
        assert_eq!(service.flag("C1", None, 8, 0).unwrap_err(), out_of_bounds);
        assert_eq!(
            service.load_game("C1", None).unwrap().value.state,
            GameState::Fresh
        );
    }

    #[test]
    fn reveal_reports_notices() {
        let service = service();
        service.start_game("C1", None, None).unwrap();

        let reply = service.reveal("C1", Some("U1"), 4, 4).unwrap();
        assert!(reply.value.has_update());
        assert_eq!(kinds(&reply)[0], NoticeKind::Revealed((4, 4)));
        assert_eq!(reply.notices[0].actor.as_deref(), Some("U1"));

        let reply = service.reveal("C1", Some("U2"), 4, 4).unwrap();
        assert_eq!(reply.value, RevealOutcome::NoEffect);
        assert!(reply.notices.is_empty());
    }

    #[test]
    fn finishing_reveal_reports_outcome() {
        let service = service();
        service.start_game("C1", None, None).unwrap();

        let mut last = None;
        for y in 0..8 {
            for x in 0..8 {
                let reply = service.reveal("C1", Some("U1"), x, y).unwrap();
                if matches!(reply.value, RevealOutcome::Lost(_) | RevealOutcome::Won(_)) {
                    last = Some(reply);
                }
            }
        }

        let reply = last.unwrap();
        let expected = match reply.value {
            RevealOutcome::Lost(_) => NoticeKind::Lost,
            _ => NoticeKind::Won,
        };
        assert_eq!(kinds(&reply).last(), Some(&expected));
        assert_eq!(
            service.load_game("C1", None).unwrap().value.state,
            if expected == NoticeKind::Lost {
                GameState::Lost
            } else {
                GameState::Won
            }
        );
    }

    #[test]
    fn flag_toggle_scenario() {
        let service = service();
        service.start_game("C1", None, None).unwrap();

        let first = service.flag("C1", Some("U1"), 3, 3).unwrap();
        let second = service.flag("C1", Some("U1"), 3, 3).unwrap();
        let third = service.flag("C1", Some("U1"), 3, 3).unwrap();

        assert_eq!(first.value, FlagOutcome::Flagged((3, 3)));
        assert_eq!(second.value, FlagOutcome::Unflagged((3, 3)));
        assert_eq!(third.value, FlagOutcome::Flagged((3, 3)));
        assert_eq!(kinds(&second), [NoticeKind::Flagged((3, 3))]);

        let board = service.load_game("C1", None).unwrap().value.board;
        assert_eq!(board.flagged_count(), 1);
        assert_eq!(board.revealed_count(), 0);
    }

    #[test]
    fn reset_and_end() {
        let service = service();
        service.start_game("C1", None, Some("INTERMEDIATE")).unwrap();
        service.reveal("C1", None, 8, 8).unwrap();

        let reply = service.reset_game("C1", Some("U1")).unwrap();
        assert!(reply.value.is_empty());
        assert_eq!((reply.value.width, reply.value.height), (16, 16));
        assert_eq!(kinds(&reply), [NoticeKind::Restarted]);

        let reply = service.end_game("C1", Some("U1"));
        assert!(reply.value);
        assert_eq!(kinds(&reply), [NoticeKind::Ended]);
        assert!(!service.registry().exists("C1"));
    }

    #[test]
    fn reset_reply_is_fresh_while_others_reveal() {
        for seed in 0..200 {
            let service = ChannelService::new(SessionRegistry::with_seed(seed));
            service.start_game("C1", None, Some("EXPERT")).unwrap();
            let barrier = Barrier::new(2);

            let board = thread::scope(|scope| {
                scope.spawn(|| {
                    barrier.wait();
                    for _ in 0..3 {
                        service.reveal("C1", Some("U2"), 15, 8).unwrap();
                    }
                });
                barrier.wait();
                service.reset_game("C1", Some("U1")).unwrap().value
            });

            assert!(board.is_empty(), "seed {seed}: {board:?}");
        }
    }
}
