//! Transport-agnostic command and event shapes.

pub mod commands;
pub mod events;
pub mod snapshot;

use uuid::Uuid;

pub type RoomId = i64;
pub type UserId = String;
/// One transport connection; minted by the transport layer.
pub type ConnectionId = Uuid;
pub type SessionId = Uuid;

pub use commands::Command;
pub use events::{Audience, OutboundEvent, RoomEvent};
pub use snapshot::{RoomSnapshot, RoomStatus, SeatPublic};
