//! Inbound event envelope and command payloads.

use serde::{Deserialize, Serialize};

use super::{GameId, InvitationId, RoomId, UserId};
use crate::config::GameOptions;
use crate::domain::{Card, DeclarationKind, Suit};

/// The entity an event is addressed to. Room creation carries no target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum EntityTarget {
    Room(RoomId),
    Game(GameId),
}

/// Envelope for everything a client sends.
///
/// `seq` is required for game events (idempotency) and ignored for rooms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientEvent {
    pub actor: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<EntityTarget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seq: Option<u64>,
    #[serde(flatten)]
    pub command: Command,
}

/// A declaration claim as sent by a client: the category plus the exact
/// cards it covers. The server recomputes detection and accepts or rejects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarationClaim {
    pub kind: DeclarationKind,
    pub cards: Vec<Card>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeaveReason {
    /// Explicit leave; forfeits an in-progress game.
    Voluntary,
    /// Connection drop; marks the seat inactive without ending the game.
    Disconnected,
    /// Escalated by an external scheduler; treated like a voluntary leave.
    TimedOut,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    // Room lifecycle
    CreateRoom {
        options: GameOptions,
    },
    /// Join by target room id, or by join code when no target is given.
    JoinRoom {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<String>,
    },
    LeaveRoom,
    ToggleReady,
    StartGame,
    SendMessage {
        body: String,
    },
    SendInvitation {
        to: UserId,
    },
    RespondToInvitation {
        invitation: InvitationId,
        accept: bool,
    },

    // Game play
    BidTrump {
        suit: Suit,
    },
    PassTrump,
    Declare {
        declarations: Vec<DeclarationClaim>,
    },
    AnnounceBelot,
    PlayCard {
        card: Card,
    },
    PlayerLeft {
        reason: LeaveReason,
    },
}
