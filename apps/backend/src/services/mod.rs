//! Stateful services: rooms, sessions and the command layer that ties them
//! together.

pub mod game_flow;
pub mod room;
pub mod room_manager;
pub mod sessions;
pub mod timers;

pub use game_flow::{Connected, GameFlowService};
pub use room::{Room, RoomSettings};
pub use room_manager::{RoomManager, SharedRoom};
pub use sessions::{ResolvedSession, Session, SessionRegistry};
pub use timers::{spawn_timer_driver, EventSink};
