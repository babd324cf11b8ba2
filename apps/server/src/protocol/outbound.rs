//! Outbound events pushed through the Broadcaster.
//!
//! Public events go to entity topics; per-player payloads (dealt hands) go
//! to user topics only.

use serde::{Deserialize, Serialize};

use super::state::{ChatEntry, EndReason, GameSnapshot, InvitationView, RoomSnapshot};
use super::{GameId, RoomId};
use crate::domain::{Card, Declaration, RoundScore, Seat, Suit, Team};
use crate::errors::ErrorCode;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    RoomState {
        room: RoomSnapshot,
    },
    ChatMessage {
        room_id: RoomId,
        message: ChatEntry,
    },
    InvitationReceived {
        invitation: InvitationView,
    },
    InvitationResult {
        invitation: InvitationView,
    },
    GameStarted {
        game: GameSnapshot,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        room_id: Option<RoomId>,
    },
    /// Private: one player's dealt hand, addressed to their user topic.
    HandDealt {
        game_id: GameId,
        round: u32,
        cards: Vec<Card>,
    },
    RoundStarted {
        game_id: GameId,
        round: u32,
        dealer: Seat,
        first_bidder: Seat,
    },
    TrumpPassed {
        game_id: GameId,
        round: u32,
        seat: Seat,
        /// Set when every bidder passed and the dealer must now choose.
        dealer_forced: bool,
    },
    TrumpSelected {
        game_id: GameId,
        round: u32,
        seat: Seat,
        suit: Suit,
    },
    DeclarationsAnnounced {
        game_id: GameId,
        round: u32,
        seat: Seat,
        declarations: Vec<Declaration>,
    },
    BelotAnnounced {
        game_id: GameId,
        round: u32,
        seat: Seat,
    },
    CardPlayed {
        game_id: GameId,
        round: u32,
        seat: Seat,
        card: Card,
        next: Seat,
    },
    TrickCompleted {
        game_id: GameId,
        round: u32,
        winner: Seat,
        points: u16,
    },
    RoundCompleted {
        game_id: GameId,
        round: u32,
        scores: [u32; 2],
        breakdown: RoundScore,
    },
    GameCompleted {
        game_id: GameId,
        winner: Team,
        final_scores: [u32; 2],
        end_reason: EndReason,
    },
    PlayerStatus {
        game_id: GameId,
        seat: Seat,
        active: bool,
    },
    Error {
        code: ErrorCode,
        detail: String,
    },
    ServerShutdown,
}
