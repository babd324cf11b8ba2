//! Serialized entity actors.
//!
//! Each Game and Room runs as one task draining an mpsc mailbox, so events
//! targeting an entity are totally ordered and non-overlapping. A handler
//! works on a scratch copy of the state: validation and persistence happen
//! under the per-event deadline, the copy is committed only on success, and
//! broadcasts go out after the store has accepted the deltas.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::time::timeout;
use tracing::{debug, error, warn};

use super::game::GameSession;
use super::room::{Room, RoomReply};
use crate::broadcast::{Broadcaster, Topic};
use crate::config::ServerConfig;
use crate::errors::GameError;
use crate::protocol::state::GameStatus;
use crate::protocol::{Command, GameId, ServerEvent, UserId};
use crate::store::Store;

/// Dependencies shared by every actor.
pub struct ActorShared {
    pub store: Arc<dyn Store>,
    pub broadcaster: Arc<dyn Broadcaster>,
    pub config: ServerConfig,
}

#[derive(Debug)]
pub struct GameReply {
    /// Set once the game is finished; the manager releases the actor.
    pub completed: bool,
}

pub enum GameMsg {
    Client {
        actor: UserId,
        seq: Option<u64>,
        command: Command,
        ack: oneshot::Sender<Result<GameReply, GameError>>,
    },
    Drain {
        done: oneshot::Sender<()>,
    },
}

pub enum RoomMsg {
    Client {
        actor: UserId,
        command: Command,
        ack: oneshot::Sender<Result<RoomReply, GameError>>,
    },
    /// Manager confirmation that the game actor for this room exists.
    GameCreated {
        game_id: GameId,
        ack: oneshot::Sender<RoomReply>,
    },
    /// Periodic maintenance: expire invitations, dispose when idle.
    Sweep {
        now: OffsetDateTime,
        ack: oneshot::Sender<RoomReply>,
    },
    Drain {
        done: oneshot::Sender<()>,
    },
}

pub async fn run_game_actor(
    mut game: GameSession,
    mut rx: mpsc::Receiver<GameMsg>,
    shared: Arc<ActorShared>,
) {
    let game_id = game.id;
    while let Some(msg) = rx.recv().await {
        match msg {
            GameMsg::Client {
                actor,
                seq,
                command,
                ack,
            } => {
                let result = handle_game_client(&mut game, &shared, actor, seq, &command).await;
                if let Err(err) = &result {
                    report_error(&shared, actor, err).await;
                }
                let _ = ack.send(result);
            }
            GameMsg::Drain { done } => {
                debug!(game_id = %game_id, "game actor drained");
                let _ = done.send(());
                break;
            }
        }
    }
    debug!(game_id = %game_id, "game actor stopped");
}

async fn handle_game_client(
    game: &mut GameSession,
    shared: &ActorShared,
    actor: UserId,
    seq: Option<u64>,
    command: &Command,
) -> Result<GameReply, GameError> {
    let deadline = shared.config.event_timeout;
    let mut scratch = game.clone();

    let outcome = timeout(deadline, async {
        let outcome = scratch.handle(actor, seq, command)?;
        for delta in &outcome.deltas {
            shared.store.save_game_delta(scratch.id, delta.clone()).await?;
        }
        Ok::<_, GameError>(outcome)
    })
    .await
    .map_err(|_| {
        warn!(game_id = %game.id, "game event exceeded its deadline");
        GameError::timeout(format!("event handling exceeded {deadline:?}"))
    })??;

    // Persisted; commit and announce.
    *game = scratch;
    for (topic, event) in outcome.events {
        shared.broadcaster.send(topic, event).await;
    }
    Ok(GameReply {
        completed: game.status == GameStatus::Completed,
    })
}

pub async fn run_room_actor(mut room: Room, mut rx: mpsc::Receiver<RoomMsg>, shared: Arc<ActorShared>) {
    let room_id = room.id;
    while let Some(msg) = rx.recv().await {
        match msg {
            RoomMsg::Client {
                actor,
                command,
                ack,
            } => {
                let result = handle_room_client(&mut room, &shared, actor, &command).await;
                if let Err(err) = &result {
                    report_error(&shared, actor, err).await;
                }
                let _ = ack.send(result);
            }
            RoomMsg::GameCreated { game_id, ack } => {
                let outcome = room.game_created(game_id);
                let reply = commit_room_outcome(&room, &shared, outcome).await;
                let _ = ack.send(reply);
            }
            RoomMsg::Sweep { now, ack } => {
                let mut outcome = room.expire_invitations(now);
                if room.is_idle(now, shared.config.room_idle_timeout) {
                    let disposed = room.dispose();
                    outcome.deltas.extend(disposed.deltas);
                    outcome.events.extend(disposed.events);
                    outcome.reply = disposed.reply;
                }
                let reply = commit_room_outcome(&room, &shared, outcome).await;
                let _ = ack.send(reply);
            }
            RoomMsg::Drain { done } => {
                debug!(room_id = %room_id, "room actor drained");
                let _ = done.send(());
                break;
            }
        }
    }
    debug!(room_id = %room_id, "room actor stopped");
}

async fn handle_room_client(
    room: &mut Room,
    shared: &ActorShared,
    actor: UserId,
    command: &Command,
) -> Result<RoomReply, GameError> {
    let deadline = shared.config.event_timeout;
    let now = OffsetDateTime::now_utc();
    let mut scratch = room.clone();

    let outcome = timeout(deadline, async {
        let outcome = scratch.handle(actor, command, now)?;
        for delta in &outcome.deltas {
            shared.store.save_room_delta(scratch.id, delta.clone()).await?;
        }
        Ok::<_, GameError>(outcome)
    })
    .await
    .map_err(|_| {
        warn!(room_id = %room.id, "room event exceeded its deadline");
        GameError::timeout(format!("event handling exceeded {deadline:?}"))
    })??;

    *room = scratch;
    for (topic, event) in outcome.events {
        shared.broadcaster.send(topic, event).await;
    }
    Ok(outcome.reply)
}

/// Persist and broadcast a manager-initiated room outcome. These paths have
/// no originator to bounce an error to; persistence failures are logged.
async fn commit_room_outcome(
    room: &Room,
    shared: &ActorShared,
    outcome: super::room::RoomOutcome,
) -> RoomReply {
    let super::room::RoomOutcome {
        deltas,
        events,
        reply,
    } = outcome;
    for delta in deltas {
        if let Err(err) = shared.store.save_room_delta(room.id, delta).await {
            error!(room_id = %room.id, error = %err, "failed to persist room delta");
        }
    }
    for (topic, event) in events {
        shared.broadcaster.send(topic, event).await;
    }
    reply
}

/// Errors are recovered locally and reported to the originator only.
async fn report_error(shared: &ActorShared, actor: UserId, err: &GameError) {
    shared
        .broadcaster
        .send(
            Topic::User(actor),
            ServerEvent::Error {
                code: err.code(),
                detail: err.detail().to_string(),
            },
        )
        .await;
}
