#![cfg_attr(
    not(test),
    deny(
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::todo,
        clippy::unimplemented
    )
)]

pub mod broadcast;
pub mod config;
pub mod domain;
pub mod errors;
pub mod protocol;
pub mod session;
pub mod store;
pub mod telemetry;
pub mod utils;

// Re-exports for public API
pub use broadcast::{Broadcaster, ChannelBroadcaster, Topic};
pub use config::{GameOptions, ServerConfig};
pub use errors::{ErrorCode, GameError};
pub use protocol::{ClientEvent, Command, EntityTarget, ServerEvent};
pub use session::{GameSession, Room, SessionManager};
pub use store::{MemStore, Store};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    server_test_support::logging::init();
}
