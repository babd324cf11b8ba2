//! Wire-level vocabulary: identifiers, inbound commands, public state
//! views, and outbound events.
//!
//! Everything here is plain data with serde derives; transports frame it,
//! entities interpret it.

pub mod events;
pub mod outbound;
pub mod state;

use uuid::Uuid;

pub type UserId = Uuid;
pub type GameId = Uuid;
pub type RoomId = Uuid;
pub type InvitationId = Uuid;

pub use events::{ClientEvent, Command, DeclarationClaim, EntityTarget, LeaveReason};
pub use outbound::ServerEvent;
pub use state::{
    ChatEntry, EndReason, GameSnapshot, GameStatus, InvitationStatus, InvitationView, Membership,
    RoomSnapshot, RoomStatus, RoundPublic, Visibility,
};
