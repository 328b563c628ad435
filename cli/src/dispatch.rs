use chansweep_protocol::{Action, Envelope, Notice, Request, ServerMessage};
use chansweep_session::{ChannelService, Reply, Result};

/// Runs one request and returns what to send, in order.
///
/// Notices go out first, then the board or tile update. Failures become an error message for the requester.
pub fn dispatch(service: &ChannelService, request: &Request) -> Vec<Envelope> {
    let channel = request.channel.as_str();
    let actor = request.user.as_deref();

    let result = run(service, channel, actor, &request.action);
    match result {
        Ok(envelopes) => envelopes,
        Err(err) => {
            log::debug!("[{}] {:?} failed: {}", channel, request.action, err);
            vec![reply_to(request, ServerMessage::error(err))]
        }
    }
}

fn run(
    service: &ChannelService,
    channel: &str,
    actor: Option<&str>,
    action: &Action,
) -> Result<Vec<Envelope>> {
    let to_channel = |message: ServerMessage| Envelope::to_channel(channel, message);
    let to_sender = |message: ServerMessage| match actor {
        Some(user) => Envelope::to_user(user, message),
        None => Envelope::to_channel(channel, message),
    };

    Ok(match *action {
        Action::Start { ref level } => {
            let reply = service.start_game(channel, actor, level.as_deref())?;
            let started = ServerMessage::started(reply.value);
            with_notices(&reply, [to_sender(started)])
        }
        Action::Load => {
            let reply = service.load_game(channel, actor)?;
            let snapshot = reply.value.clone();
            with_notices(
                &reply,
                [to_sender(ServerMessage::snapshot(snapshot.board, snapshot.state))],
            )
        }
        Action::Reset => {
            let reply = service.reset_game(channel, actor)?;
            let board = reply.value.clone();
            with_notices(&reply, [to_channel(ServerMessage::Initial { board })])
        }
        Action::Reveal { x, y } => {
            let reply = service.reveal(channel, actor, x, y)?;
            let message = ServerMessage::from_reveal(reply.value.clone());
            with_notices(&reply, message.map(to_channel))
        }
        Action::Flag { x, y } => {
            let reply = service.flag(channel, actor, x, y)?;
            let message = ServerMessage::from_flag(reply.value);
            with_notices(&reply, message.map(to_channel))
        }
        Action::End => {
            let reply = service.end_game(channel, actor);
            with_notices(&reply, [to_sender(ServerMessage::Ended)])
        }
    })
}

fn with_notices<T>(reply: &Reply<T>, messages: impl IntoIterator<Item = Envelope>) -> Vec<Envelope> {
    reply
        .notices
        .iter()
        .map(announce)
        .chain(messages)
        .collect()
}

fn announce(notice: &Notice) -> Envelope {
    Envelope::to_channel(notice.channel.as_str(), notice.to_message())
}

fn reply_to(request: &Request, message: ServerMessage) -> Envelope {
    match &request.user {
        Some(user) => Envelope::to_user(user.as_str(), message),
        None => Envelope::to_channel(request.channel.as_str(), message),
    }
}
