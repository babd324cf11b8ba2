//! Abstract transactional persistence.
//!
//! Entities persist *deltas*: append-only for moves, declarations, chat,
//! and log entries; upsert-keyed for snapshot-shaped data. Each
//! `save_*_delta` call is atomic on its own. Persistence always happens
//! before the corresponding broadcast.

pub mod memory;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::GameOptions;
use crate::domain::{Card, Declaration, RoundScore, Seat, Suit, Team};
use crate::errors::GameError;
use crate::protocol::state::{ChatEntry, EndReason, InvitationView, RoomStatus};
use crate::protocol::{GameId, RoomId, UserId};

pub use memory::MemStore;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("store conflict: {0}")]
    Conflict(String),
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<StoreError> for GameError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(detail) => GameError::conflict(detail),
            StoreError::Unavailable(detail) => GameError::internal(detail),
        }
    }
}

/// Appended mutations of one game. The sequence of deltas plus the
/// `Created` head is sufficient to replay the game move for move.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameDelta {
    Created {
        created_by: UserId,
        seats: [UserId; 4],
        dealer: Seat,
        seed: u64,
        options: GameOptions,
    },
    RoundStarted {
        round: u32,
        dealer: Seat,
        /// Hands as dealt, seat by seat, for replay of the deal.
        initial_hands: [Vec<Card>; 4],
    },
    TrumpPassed {
        round: u32,
        seat: Seat,
    },
    TrumpSelected {
        round: u32,
        seat: Seat,
        suit: Suit,
    },
    Declared {
        round: u32,
        seat: Seat,
        declarations: Vec<Declaration>,
    },
    BelotAnnounced {
        round: u32,
        seat: Seat,
    },
    /// One card play, stored as the 2-character card code.
    MovePlayed {
        round: u32,
        trick: u8,
        order: u8,
        seat: Seat,
        card: String,
    },
    RoundCompleted {
        round: u32,
        score: RoundScore,
        totals: [u32; 2],
    },
    PlayerActive {
        seat: Seat,
        active: bool,
    },
    Completed {
        winner: Team,
        final_scores: [u32; 2],
        end_reason: EndReason,
    },
}

/// Appended mutations of one room.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomDelta {
    Created {
        code: String,
        created_by: UserId,
        options: GameOptions,
    },
    MemberJoined {
        user: UserId,
    },
    MemberLeft {
        user: UserId,
    },
    ReadyChanged {
        user: UserId,
        ready: bool,
    },
    OwnerChanged {
        user: UserId,
    },
    MessageSent {
        message: ChatEntry,
    },
    InvitationSent {
        invitation: InvitationView,
    },
    InvitationResolved {
        invitation: InvitationView,
    },
    StatusChanged {
        status: RoomStatus,
    },
    GameStarted {
        game_id: GameId,
    },
}

/// Everything the store holds for one game.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameRecord {
    pub deltas: Vec<GameDelta>,
}

/// Everything the store holds for one room.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoomRecord {
    pub code: String,
    pub closed: bool,
    pub deltas: Vec<RoomDelta>,
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn load_game(&self, id: GameId) -> Result<Option<GameRecord>, StoreError>;
    async fn save_game_delta(&self, id: GameId, delta: GameDelta) -> Result<(), StoreError>;
    async fn load_room(&self, id: RoomId) -> Result<Option<RoomRecord>, StoreError>;
    async fn save_room_delta(&self, id: RoomId, delta: RoomDelta) -> Result<(), StoreError>;
    /// Look a room up by join code; Closed rooms do not match.
    async fn find_room_by_code(&self, code: &str) -> Result<Option<RoomId>, StoreError>;
}
