//! Live entities and their coordination: game sessions, rooms, the
//! per-entity actor runtime, and the process-wide session manager.

pub mod actor;
pub mod game;
pub mod manager;
pub mod room;

pub use game::{GameOutcome, GameSession};
pub use manager::SessionManager;
pub use room::{Room, RoomOutcome, RoomReply, StartRequest, ROOM_CAPACITY};
