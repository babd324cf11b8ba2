//! Runtime configuration for the server and per-game options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::errors::GameError;

pub const DEFAULT_POINTS_TO_WIN: u32 = 1001;
pub const MIN_POINTS_TO_WIN: u32 = 501;
pub const MAX_POINTS_TO_WIN: u32 = 2001;

/// What happens when all four bidders pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidAllPassPolicy {
    DealerMustChoose,
}

/// Process-wide settings, shared by the manager and every entity actor.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Hard per-event handling deadline.
    pub event_timeout: Duration,
    /// Rooms with no members for this long are disposed.
    pub room_idle_timeout: Duration,
    /// Pending invitations expire after this long.
    pub invitation_ttl: Duration,
    /// Chat messages retained in memory per room.
    pub max_chat_retained: usize,
    pub bid_all_pass_policy: BidAllPassPolicy,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            event_timeout: Duration::from_millis(5000),
            room_idle_timeout: Duration::from_secs(3600),
            invitation_ttl: Duration::from_secs(86_400),
            max_chat_retained: 200,
            bid_all_pass_policy: BidAllPassPolicy::DealerMustChoose,
        }
    }
}

/// Per-game options supplied at room/game creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameOptions {
    pub points_to_win: u32,
    pub private: bool,
    /// Fixed deck seed for deterministic games; fresh entropy when absent.
    pub deck_seed: Option<u64>,
}

impl Default for GameOptions {
    fn default() -> Self {
        Self {
            points_to_win: DEFAULT_POINTS_TO_WIN,
            private: false,
            deck_seed: None,
        }
    }
}

impl GameOptions {
    /// Validate the win threshold: within [501, 2001] and ending in 1.
    pub fn validate(&self) -> Result<(), GameError> {
        if !(MIN_POINTS_TO_WIN..=MAX_POINTS_TO_WIN).contains(&self.points_to_win) {
            return Err(GameError::illegal_move(format!(
                "points_to_win {} outside [{MIN_POINTS_TO_WIN}, {MAX_POINTS_TO_WIN}]",
                self.points_to_win
            )));
        }
        if self.points_to_win % 10 != 1 {
            return Err(GameError::illegal_move(format!(
                "points_to_win {} must end in 1",
                self.points_to_win
            )));
        }
        Ok(())
    }
}
