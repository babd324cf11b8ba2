//! Shared fixtures for integration tests: a wired manager over the
//! in-memory store and channel broadcaster, plus drivers that keep a local
//! mirror of a live game so tests can follow turn order.

// Not every test crate uses every helper.
#![allow(dead_code)]

use std::sync::Arc;

use tokio::sync::mpsc::UnboundedReceiver;
use uuid::Uuid;

use belot_server::broadcast::{connection, Topic};
use belot_server::domain::{Card, RoundPhase, Seat};
use belot_server::protocol::{ClientEvent, Command, EntityTarget, GameId, RoomId, UserId};
use belot_server::session::GameSession;
use belot_server::{
    Broadcaster, ChannelBroadcaster, GameError, GameOptions, MemStore, ServerConfig, ServerEvent,
    SessionManager, Store,
};

#[ctor::ctor]
fn init_logging() {
    server_test_support::logging::init();
}

pub struct TestApp {
    pub manager: SessionManager,
    pub store: Arc<MemStore>,
    pub broadcaster: Arc<ChannelBroadcaster>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(ServerConfig::default())
    }

    pub fn with_config(config: ServerConfig) -> Self {
        let store = Arc::new(MemStore::new());
        let broadcaster = Arc::new(ChannelBroadcaster::new());
        let manager = SessionManager::new(config, store.clone(), broadcaster.clone());
        Self {
            manager,
            store,
            broadcaster,
        }
    }

    pub fn listen(&self, topic: Topic) -> UnboundedReceiver<ServerEvent> {
        let (conn, rx) = connection();
        self.broadcaster.subscribe(topic, &conn);
        rx
    }

    /// Dispatch a room-targeted command for a user.
    pub async fn room_event(
        &self,
        room_id: RoomId,
        actor: UserId,
        command: Command,
    ) -> Result<(), GameError> {
        self.manager
            .dispatch(ClientEvent {
                actor,
                target: Some(EntityTarget::Room(room_id)),
                seq: None,
                command,
            })
            .await
    }

    /// Create a room, seat four users, ready them all, and start the game.
    /// Each user's topic is subscribed before the start so the fixture
    /// captures the private deal events.
    pub async fn start_game(&self, options: GameOptions) -> GameFixture {
        let users: Vec<UserId> = (0..4).map(|_| Uuid::new_v4()).collect();
        let user_rx: Vec<UnboundedReceiver<ServerEvent>> = users
            .iter()
            .map(|u| self.listen(Topic::User(*u)))
            .collect();
        let room = self
            .manager
            .create_room(users[0], options)
            .await
            .expect("room creation");
        for user in &users[1..] {
            self.room_event(room.id, *user, Command::JoinRoom { code: None })
                .await
                .expect("join");
        }
        for user in &users {
            self.room_event(room.id, *user, Command::ToggleReady)
                .await
                .expect("ready");
        }
        self.room_event(room.id, users[0], Command::StartGame)
            .await
            .expect("start");

        let (_, games) = self.manager.memberships(users[0]);
        assert_eq!(games.len(), 1, "exactly one game after start");
        let game_id = games[0];

        let record = self
            .store
            .load_game(game_id)
            .await
            .expect("store")
            .expect("game record");
        let mirror = GameSession::replay(&record).expect("replayable record");

        GameFixture {
            room_id: room.id,
            game_id,
            users,
            user_rx,
            mirror,
            next_seq: 1,
        }
    }
}

/// A started game plus a local deterministic mirror of its state, kept in
/// lock-step with every accepted dispatch.
pub struct GameFixture {
    pub room_id: RoomId,
    pub game_id: GameId,
    pub users: Vec<UserId>,
    /// Per-user topic receivers, subscribed before the game started.
    pub user_rx: Vec<UnboundedReceiver<ServerEvent>>,
    pub mirror: GameSession,
    pub next_seq: u64,
}

impl GameFixture {
    pub fn turn(&self) -> Seat {
        self.mirror.round.as_ref().expect("live round").turn
    }

    pub fn phase(&self) -> RoundPhase {
        self.mirror.round.as_ref().expect("live round").phase
    }

    pub fn legal_plays(&self) -> Vec<Card> {
        let round = self.mirror.round.as_ref().expect("live round");
        round.legal_plays(round.turn)
    }

    pub fn user_at(&self, seat: Seat) -> UserId {
        self.mirror.seats[seat as usize]
    }

    /// The user-topic receiver for whoever sits at `seat`.
    pub fn rx_for_seat(&mut self, seat: Seat) -> &mut UnboundedReceiver<ServerEvent> {
        let user = self.mirror.seats[seat as usize];
        let index = self
            .users
            .iter()
            .position(|&u| u == user)
            .expect("seated user");
        &mut self.user_rx[index]
    }

    /// Send a game command for the given seat with the next sequence
    /// number; the mirror replays accepted events.
    pub async fn send(
        &mut self,
        app: &TestApp,
        seat: Seat,
        command: Command,
    ) -> Result<(), GameError> {
        let user = self.user_at(seat);
        let seq = self.next_seq;
        let result = app
            .manager
            .dispatch(ClientEvent {
                actor: user,
                target: Some(EntityTarget::Game(self.game_id)),
                seq: Some(seq),
                command: command.clone(),
            })
            .await;
        if result.is_ok() {
            self.mirror
                .handle(user, Some(seq), &command)
                .expect("mirror accepts what the server accepted");
            self.next_seq += 1;
        }
        result
    }

    /// Raw dispatch without advancing the mirror or the sequence counter.
    pub async fn send_raw(
        &self,
        app: &TestApp,
        seat: Seat,
        seq: Option<u64>,
        command: Command,
    ) -> Result<(), GameError> {
        app.manager
            .dispatch(ClientEvent {
                actor: self.user_at(seat),
                target: Some(EntityTarget::Game(self.game_id)),
                seq,
                command,
            })
            .await
    }

    /// Bid hearts, skip all declarations, and play the round out with the
    /// first legal card each turn.
    pub async fn autoplay_round(&mut self, app: &TestApp) {
        use belot_server::domain::Suit;
        self.send(app, self.turn(), Command::BidTrump { suit: Suit::Hearts })
            .await
            .expect("bid");
        for _ in 0..4 {
            self.send(
                app,
                self.turn(),
                Command::Declare {
                    declarations: Vec::new(),
                },
            )
            .await
            .expect("declare");
        }
        while self
            .mirror
            .round
            .as_ref()
            .map(|r| r.phase == RoundPhase::Playing)
            .unwrap_or(false)
        {
            let card = self.legal_plays()[0];
            let seat = self.turn();
            self.send(app, seat, Command::PlayCard { card })
                .await
                .expect("play");
        }
    }
}

/// Drain everything currently buffered on a receiver.
pub fn drain(rx: &mut UnboundedReceiver<ServerEvent>) -> Vec<ServerEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
