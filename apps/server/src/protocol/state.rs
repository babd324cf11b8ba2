//! Public state views: entity statuses and the snapshots broadcast to
//! clients. Snapshots never contain private hands; those go out on user
//! topics only.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::{GameId, InvitationId, RoomId, UserId};
use crate::domain::{Card, RoundPhase, Seat, Suit, Team};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Ready,
    InProgress,
    Completed,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    Open,
    Full,
    Starting,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Private,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EndReason {
    Completed,
    PlayerLeft,
    Aborted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InvitationStatus {
    Pending,
    Accepted,
    Declined,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Membership {
    pub user: UserId,
    #[serde(with = "time::serde::timestamp")]
    pub joined_at: OffsetDateTime,
    pub ready: bool,
}

/// One chat entry. System entries (joins, ownership changes) carry no
/// sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender: Option<UserId>,
    pub body: String,
    #[serde(with = "time::serde::timestamp")]
    pub sent_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvitationView {
    pub id: InvitationId,
    pub room_id: RoomId,
    pub from: UserId,
    pub to: UserId,
    pub status: InvitationStatus,
    #[serde(with = "time::serde::timestamp")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub id: RoomId,
    pub code: String,
    pub status: RoomStatus,
    pub visibility: Visibility,
    pub owner: UserId,
    pub points_to_win: u32,
    pub members: Vec<Membership>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_id: Option<GameId>,
}

/// Public facts of the round in progress.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundPublic {
    pub number: u32,
    pub dealer: Seat,
    pub phase: RoundPhase,
    pub turn: Seat,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trump: Option<Suit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caller: Option<Seat>,
    pub current_trick: Vec<(Seat, Card)>,
    pub tricks_taken: [u8; 2],
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameSnapshot {
    pub id: GameId,
    pub status: GameStatus,
    pub seats: [UserId; 4],
    pub active: [bool; 4],
    pub dealer: Seat,
    pub scores: [u32; 2],
    pub points_to_win: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<RoundPublic>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<Team>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;
    use uuid::Uuid;

    #[test]
    fn membership_serializes_timestamp_as_unix_seconds() {
        let membership = Membership {
            user: Uuid::nil(),
            joined_at: datetime!(2024-05-01 12:00 UTC),
            ready: false,
        };
        let json = serde_json::to_value(&membership).unwrap();
        assert!(json["joined_at"].is_i64());
        let back: Membership = serde_json::from_value(json).unwrap();
        assert_eq!(back, membership);
    }

    #[test]
    fn statuses_use_snake_case() {
        assert_eq!(
            serde_json::to_string(&GameStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(
            serde_json::to_string(&EndReason::PlayerLeft).unwrap(),
            "\"player_left\""
        );
        assert_eq!(
            serde_json::to_string(&InvitationStatus::Pending).unwrap(),
            "\"pending\""
        );
    }
}
