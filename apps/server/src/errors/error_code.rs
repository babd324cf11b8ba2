//! Error codes for the Belot server.
//!
//! This module defines all error codes used throughout the application.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear in `error` events sent back to clients.

use core::fmt;

use serde::{Deserialize, Serialize};

/// Centralized error codes for the Belot server.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string that appears
/// in outbound `error` events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Unknown game/room/user id or join code
    NotFound,
    /// Actor is not part of the entity
    NotMember,
    /// Event is not valid in the current state
    WrongPhase,
    /// Actor is not the expected actor
    NotYourTurn,
    /// Card/declaration/bid violates the game rules
    IllegalMove,
    /// Room/game is full
    Capacity,
    /// Event already applied (idempotency replay)
    Duplicate,
    /// Event sequence older than current
    Stale,
    /// Handler exceeded its deadline
    Timeout,
    /// Underlying store rejected the mutation, or sequence gap
    Conflict,
    /// Private-room access without invitation
    Forbidden,
    /// Unhandled bug; logged with full context
    Internal,
}

impl ErrorCode {
    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::NotMember => "NOT_MEMBER",
            Self::WrongPhase => "WRONG_PHASE",
            Self::NotYourTurn => "NOT_YOUR_TURN",
            Self::IllegalMove => "ILLEGAL_MOVE",
            Self::Capacity => "CAPACITY",
            Self::Duplicate => "DUPLICATE",
            Self::Stale => "STALE",
            Self::Timeout => "TIMEOUT",
            Self::Conflict => "CONFLICT",
            Self::Forbidden => "FORBIDDEN",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
