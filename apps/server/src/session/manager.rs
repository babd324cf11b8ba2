//! Process-wide coordinator: owns the registries of live entity actors,
//! routes client events, maintains the join-code and membership indexes,
//! sweeps idle rooms, and orchestrates room-to-game hand-off and shutdown.
//!
//! Only the manager mutates the shared registries; entity state is never
//! shared outside its actor.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use futures::future::join_all;
use parking_lot::Mutex;
use time::OffsetDateTime;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::actor::{run_game_actor, run_room_actor, ActorShared, GameMsg, RoomMsg};
use super::game::GameSession;
use super::room::{Room, RoomReply, StartRequest};
use crate::broadcast::{Broadcaster, Topic};
use crate::config::{GameOptions, ServerConfig};
use crate::errors::GameError;
use crate::protocol::state::RoomSnapshot;
use crate::protocol::{ClientEvent, Command, EntityTarget, GameId, RoomId, ServerEvent, UserId};
use crate::store::Store;
use crate::utils::join_code::generate_join_code;

const MAILBOX_DEPTH: usize = 64;

struct RoomHandle {
    tx: mpsc::Sender<RoomMsg>,
    code: String,
    task: Mutex<Option<JoinHandle<()>>>,
}

struct GameHandle {
    tx: mpsc::Sender<GameMsg>,
    players: [UserId; 4],
    task: Mutex<Option<JoinHandle<()>>>,
}

struct Inner {
    shared: Arc<ActorShared>,
    rooms: DashMap<RoomId, RoomHandle>,
    games: DashMap<GameId, GameHandle>,
    codes: DashMap<String, RoomId>,
    user_rooms: DashMap<UserId, HashSet<RoomId>>,
    user_games: DashMap<UserId, HashSet<GameId>>,
    shutdown: CancellationToken,
}

#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<Inner>,
}

impl SessionManager {
    pub fn new(
        config: ServerConfig,
        store: Arc<dyn Store>,
        broadcaster: Arc<dyn Broadcaster>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                shared: Arc::new(ActorShared {
                    store,
                    broadcaster,
                    config,
                }),
                rooms: DashMap::new(),
                games: DashMap::new(),
                codes: DashMap::new(),
                user_rooms: DashMap::new(),
                user_games: DashMap::new(),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    /// Create a room and its actor; returns the initial snapshot.
    pub async fn create_room(
        &self,
        actor: UserId,
        options: GameOptions,
    ) -> Result<RoomSnapshot, GameError> {
        self.require_running()?;

        // Join codes are unique across live rooms; regenerate on collision.
        let id: RoomId = Uuid::new_v4();
        let mut code = generate_join_code();
        while self.inner.codes.contains_key(&code) {
            code = generate_join_code();
        }

        let now = OffsetDateTime::now_utc();
        let (room, outcome) =
            Room::create(id, code.clone(), actor, options, &self.inner.shared.config, now)?;
        let snapshot = room.snapshot();

        for delta in outcome.deltas {
            self.inner.shared.store.save_room_delta(id, delta).await?;
        }

        let (tx, rx) = mpsc::channel(MAILBOX_DEPTH);
        let task = tokio::spawn(run_room_actor(room, rx, self.inner.shared.clone()));
        self.inner.rooms.insert(
            id,
            RoomHandle {
                tx,
                code: code.clone(),
                task: Mutex::new(Some(task)),
            },
        );
        self.inner.codes.insert(code, id);
        self.inner.user_rooms.entry(actor).or_default().insert(id);

        for (topic, event) in outcome.events {
            self.inner.shared.broadcaster.send(topic, event).await;
        }
        Ok(snapshot)
    }

    /// Route one client event to its entity actor and apply the reply to
    /// the shared indexes. The error, if any, has already been reported to
    /// the originator as an `error` broadcast.
    pub async fn dispatch(&self, event: ClientEvent) -> Result<(), GameError> {
        self.require_running()?;

        match &event.command {
            Command::CreateRoom { options } => {
                self.create_room(event.actor, options.clone()).await?;
                Ok(())
            }
            Command::StartGame => {
                let room_id = self.room_target(&event)?;
                let reply = self
                    .send_room_client(room_id, event.actor, event.command.clone())
                    .await?;
                let start = reply.start.clone();
                self.apply_room_reply(room_id, reply);
                if let Some(start) = start {
                    self.spawn_game_for_room(room_id, start).await?;
                }
                Ok(())
            }
            Command::JoinRoom { .. }
            | Command::LeaveRoom
            | Command::ToggleReady
            | Command::SendMessage { .. }
            | Command::SendInvitation { .. }
            | Command::RespondToInvitation { .. } => {
                let room_id = self.room_target(&event)?;
                let reply = self
                    .send_room_client(room_id, event.actor, event.command.clone())
                    .await?;
                self.apply_room_reply(room_id, reply);
                Ok(())
            }
            Command::BidTrump { .. }
            | Command::PassTrump
            | Command::Declare { .. }
            | Command::AnnounceBelot
            | Command::PlayCard { .. }
            | Command::PlayerLeft { .. } => {
                let Some(EntityTarget::Game(game_id)) = event.target else {
                    return Err(GameError::not_found("game events need a game target"));
                };
                self.send_game_client(game_id, event.actor, event.seq, event.command.clone())
                    .await
            }
        }
    }

    /// Rooms and games a user currently belongs to.
    pub fn memberships(&self, user: UserId) -> (Vec<RoomId>, Vec<GameId>) {
        let rooms = self
            .inner
            .user_rooms
            .get(&user)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        let games = self
            .inner
            .user_games
            .get(&user)
            .map(|s| s.iter().copied().collect())
            .unwrap_or_default();
        (rooms, games)
    }

    pub fn live_rooms(&self) -> usize {
        self.inner.rooms.len()
    }

    pub fn live_games(&self) -> usize {
        self.inner.games.len()
    }

    pub fn find_room_by_code(&self, code: &str) -> Option<RoomId> {
        self.inner.codes.get(code).map(|entry| *entry.value())
    }

    /// Run one maintenance pass: expire invitations, dispose idle rooms.
    pub async fn sweep_once(&self, now: OffsetDateTime) {
        let targets: Vec<(RoomId, mpsc::Sender<RoomMsg>)> = self
            .inner
            .rooms
            .iter()
            .map(|entry| (*entry.key(), entry.tx.clone()))
            .collect();
        for (room_id, tx) in targets {
            let (ack_tx, ack_rx) = oneshot::channel();
            if tx.send(RoomMsg::Sweep { now, ack: ack_tx }).await.is_err() {
                continue;
            }
            if let Ok(reply) = ack_rx.await {
                self.apply_room_reply(room_id, reply);
            }
        }
    }

    /// Spawn the periodic sweeper; it stops at shutdown.
    pub fn spawn_sweeper(&self, interval: Duration) {
        let manager = self.clone();
        let cancel = self.inner.shutdown.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        manager.sweep_once(OffsetDateTime::now_utc()).await;
                    }
                }
            }
        });
    }

    /// Stop accepting events, drain every actor, and announce the shutdown.
    pub async fn shutdown(&self) {
        info!("session manager shutting down");
        self.inner.shutdown.cancel();

        let mut tasks = Vec::new();
        let mut topics = Vec::new();

        let room_ids: Vec<RoomId> = self.inner.rooms.iter().map(|e| *e.key()).collect();
        for id in room_ids {
            if let Some((_, handle)) = self.inner.rooms.remove(&id) {
                let (done_tx, done_rx) = oneshot::channel();
                if handle.tx.send(RoomMsg::Drain { done: done_tx }).await.is_ok() {
                    let _ = done_rx.await;
                }
                if let Some(task) = handle.task.lock().take() {
                    tasks.push(task);
                }
                topics.push(Topic::Room(id));
            }
        }

        let game_ids: Vec<GameId> = self.inner.games.iter().map(|e| *e.key()).collect();
        for id in game_ids {
            if let Some((_, handle)) = self.inner.games.remove(&id) {
                let (done_tx, done_rx) = oneshot::channel();
                if handle.tx.send(GameMsg::Drain { done: done_tx }).await.is_ok() {
                    let _ = done_rx.await;
                }
                if let Some(task) = handle.task.lock().take() {
                    tasks.push(task);
                }
                topics.push(Topic::Game(id));
            }
        }

        let _ = join_all(tasks).await;
        for topic in topics {
            self.inner
                .shared
                .broadcaster
                .send(topic, ServerEvent::ServerShutdown)
                .await;
        }

        self.inner.codes.clear();
        self.inner.user_rooms.clear();
        self.inner.user_games.clear();
        info!("session manager stopped");
    }

    fn require_running(&self) -> Result<(), GameError> {
        if self.inner.shutdown.is_cancelled() {
            return Err(GameError::conflict("server is shutting down"));
        }
        Ok(())
    }

    /// Resolve the room a client event addresses: explicit target first,
    /// join code second.
    fn room_target(&self, event: &ClientEvent) -> Result<RoomId, GameError> {
        match (&event.target, &event.command) {
            (Some(EntityTarget::Room(id)), _) => Ok(*id),
            (None, Command::JoinRoom { code: Some(code) }) => self
                .find_room_by_code(code)
                .ok_or_else(|| GameError::not_found(format!("no open room with code {code}"))),
            _ => Err(GameError::not_found("room events need a room target")),
        }
    }

    async fn send_room_client(
        &self,
        room_id: RoomId,
        actor: UserId,
        command: Command,
    ) -> Result<RoomReply, GameError> {
        let tx = self
            .inner
            .rooms
            .get(&room_id)
            .map(|h| h.tx.clone())
            .ok_or_else(|| GameError::not_found(format!("unknown room {room_id}")))?;
        let (ack_tx, ack_rx) = oneshot::channel();
        tx.send(RoomMsg::Client {
            actor,
            command,
            ack: ack_tx,
        })
        .await
        .map_err(|_| GameError::not_found("room actor is gone"))?;
        ack_rx
            .await
            .map_err(|_| GameError::internal("room actor dropped the event"))?
    }

    async fn send_game_client(
        &self,
        game_id: GameId,
        actor: UserId,
        seq: Option<u64>,
        command: Command,
    ) -> Result<(), GameError> {
        let tx = self
            .inner
            .games
            .get(&game_id)
            .map(|h| h.tx.clone())
            .ok_or_else(|| GameError::not_found(format!("unknown game {game_id}")))?;
        let (ack_tx, ack_rx) = oneshot::channel();
        tx.send(GameMsg::Client {
            actor,
            seq,
            command,
            ack: ack_tx,
        })
        .await
        .map_err(|_| GameError::not_found("game actor is gone"))?;
        let reply = ack_rx
            .await
            .map_err(|_| GameError::internal("game actor dropped the event"))??;

        if reply.completed {
            self.release_game(game_id);
        }
        Ok(())
    }

    /// Build the game entity for a Starting room, then confirm back so the
    /// room can close. Two messages, per the cross-entity protocol.
    async fn spawn_game_for_room(
        &self,
        room_id: RoomId,
        start: StartRequest,
    ) -> Result<(), GameError> {
        let game_id: GameId = Uuid::new_v4();
        let (game, outcome) = GameSession::start(
            game_id,
            start.created_by,
            &start.players,
            start.options,
            Some(room_id),
        )?;

        for delta in outcome.deltas {
            self.inner
                .shared
                .store
                .save_game_delta(game_id, delta)
                .await?;
        }

        let players = game.seats;
        let (tx, rx) = mpsc::channel(MAILBOX_DEPTH);
        let task = tokio::spawn(run_game_actor(game, rx, self.inner.shared.clone()));
        self.inner.games.insert(
            game_id,
            GameHandle {
                tx,
                players,
                task: Mutex::new(Some(task)),
            },
        );
        for player in players {
            self.inner
                .user_games
                .entry(player)
                .or_default()
                .insert(game_id);
        }

        for (topic, event) in outcome.events {
            self.inner.shared.broadcaster.send(topic, event).await;
        }
        info!(room_id = %room_id, game_id = %game_id, "game spawned from room");

        // Confirm so the room transitions Starting -> Closed.
        if let Some(tx) = self.inner.rooms.get(&room_id).map(|h| h.tx.clone()) {
            let (ack_tx, ack_rx) = oneshot::channel();
            if tx
                .send(RoomMsg::GameCreated {
                    game_id,
                    ack: ack_tx,
                })
                .await
                .is_ok()
            {
                if let Ok(reply) = ack_rx.await {
                    self.apply_room_reply(room_id, reply);
                }
            }
        } else {
            warn!(room_id = %room_id, "room vanished before game confirmation");
        }
        Ok(())
    }

    /// Apply a room reply to the shared indexes; a closed room is released.
    fn apply_room_reply(&self, room_id: RoomId, reply: RoomReply) {
        for user in reply.joined {
            self.inner.user_rooms.entry(user).or_default().insert(room_id);
        }
        for user in reply.left {
            if let Some(mut entry) = self.inner.user_rooms.get_mut(&user) {
                entry.remove(&room_id);
            }
        }
        if reply.closed {
            self.release_room(room_id);
        }
    }

    fn release_room(&self, room_id: RoomId) {
        if let Some((_, handle)) = self.inner.rooms.remove(&room_id) {
            self.inner.codes.remove(&handle.code);
            debug!(room_id = %room_id, "room actor released");
            // Dropping the sender ends the actor task.
        }
    }

    /// Completed games release their memory once the final broadcasts are
    /// out; the persisted record stays in the store.
    fn release_game(&self, game_id: GameId) {
        if let Some((_, handle)) = self.inner.games.remove(&game_id) {
            for player in handle.players {
                if let Some(mut entry) = self.inner.user_games.get_mut(&player) {
                    entry.remove(&game_id);
                }
            }
            debug!(game_id = %game_id, "game actor released");
        }
    }
}
