//! Central error type used across the engine, sessions, and the manager.
//!
//! This error type is transport-agnostic. Entity handlers return
//! `Result<T, GameError>`; the actor layer recovers every error locally and
//! reports it to the originator only, as an `error` event carrying the
//! canonical `ErrorCode`.

use thiserror::Error;

use crate::errors::error_code::ErrorCode;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    #[error("not found: {detail}")]
    NotFound { detail: String },
    #[error("not a member: {detail}")]
    NotMember { detail: String },
    #[error("wrong phase: {detail}")]
    WrongPhase { detail: String },
    #[error("not your turn: {detail}")]
    NotYourTurn { detail: String },
    #[error("illegal move: {detail}")]
    IllegalMove { detail: String },
    #[error("capacity exceeded: {detail}")]
    Capacity { detail: String },
    #[error("duplicate event: {detail}")]
    Duplicate { detail: String },
    #[error("stale event: {detail}")]
    Stale { detail: String },
    #[error("deadline exceeded: {detail}")]
    Timeout { detail: String },
    #[error("conflict: {detail}")]
    Conflict { detail: String },
    #[error("forbidden: {detail}")]
    Forbidden { detail: String },
    #[error("internal error: {detail}")]
    Internal { detail: String },
}

impl GameError {
    pub fn code(&self) -> ErrorCode {
        match self {
            GameError::NotFound { .. } => ErrorCode::NotFound,
            GameError::NotMember { .. } => ErrorCode::NotMember,
            GameError::WrongPhase { .. } => ErrorCode::WrongPhase,
            GameError::NotYourTurn { .. } => ErrorCode::NotYourTurn,
            GameError::IllegalMove { .. } => ErrorCode::IllegalMove,
            GameError::Capacity { .. } => ErrorCode::Capacity,
            GameError::Duplicate { .. } => ErrorCode::Duplicate,
            GameError::Stale { .. } => ErrorCode::Stale,
            GameError::Timeout { .. } => ErrorCode::Timeout,
            GameError::Conflict { .. } => ErrorCode::Conflict,
            GameError::Forbidden { .. } => ErrorCode::Forbidden,
            GameError::Internal { .. } => ErrorCode::Internal,
        }
    }

    pub fn detail(&self) -> &str {
        match self {
            GameError::NotFound { detail }
            | GameError::NotMember { detail }
            | GameError::WrongPhase { detail }
            | GameError::NotYourTurn { detail }
            | GameError::IllegalMove { detail }
            | GameError::Capacity { detail }
            | GameError::Duplicate { detail }
            | GameError::Stale { detail }
            | GameError::Timeout { detail }
            | GameError::Conflict { detail }
            | GameError::Forbidden { detail }
            | GameError::Internal { detail } => detail,
        }
    }

    pub fn not_found(detail: impl Into<String>) -> Self {
        Self::NotFound {
            detail: detail.into(),
        }
    }
    pub fn not_member(detail: impl Into<String>) -> Self {
        Self::NotMember {
            detail: detail.into(),
        }
    }
    pub fn wrong_phase(detail: impl Into<String>) -> Self {
        Self::WrongPhase {
            detail: detail.into(),
        }
    }
    pub fn not_your_turn(detail: impl Into<String>) -> Self {
        Self::NotYourTurn {
            detail: detail.into(),
        }
    }
    pub fn illegal_move(detail: impl Into<String>) -> Self {
        Self::IllegalMove {
            detail: detail.into(),
        }
    }
    pub fn capacity(detail: impl Into<String>) -> Self {
        Self::Capacity {
            detail: detail.into(),
        }
    }
    pub fn duplicate(detail: impl Into<String>) -> Self {
        Self::Duplicate {
            detail: detail.into(),
        }
    }
    pub fn stale(detail: impl Into<String>) -> Self {
        Self::Stale {
            detail: detail.into(),
        }
    }
    pub fn timeout(detail: impl Into<String>) -> Self {
        Self::Timeout {
            detail: detail.into(),
        }
    }
    pub fn conflict(detail: impl Into<String>) -> Self {
        Self::Conflict {
            detail: detail.into(),
        }
    }
    pub fn forbidden(detail: impl Into<String>) -> Self {
        Self::Forbidden {
            detail: detail.into(),
        }
    }
    pub fn internal(detail: impl Into<String>) -> Self {
        Self::Internal {
            detail: detail.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_map_one_to_one() {
        let cases = [
            (GameError::not_found("x"), ErrorCode::NotFound),
            (GameError::not_member("x"), ErrorCode::NotMember),
            (GameError::wrong_phase("x"), ErrorCode::WrongPhase),
            (GameError::not_your_turn("x"), ErrorCode::NotYourTurn),
            (GameError::illegal_move("x"), ErrorCode::IllegalMove),
            (GameError::capacity("x"), ErrorCode::Capacity),
            (GameError::duplicate("x"), ErrorCode::Duplicate),
            (GameError::stale("x"), ErrorCode::Stale),
            (GameError::timeout("x"), ErrorCode::Timeout),
            (GameError::conflict("x"), ErrorCode::Conflict),
            (GameError::forbidden("x"), ErrorCode::Forbidden),
            (GameError::internal("x"), ErrorCode::Internal),
        ];
        for (err, code) in cases {
            assert_eq!(err.code(), code);
            assert_eq!(err.detail(), "x");
        }
    }
}
