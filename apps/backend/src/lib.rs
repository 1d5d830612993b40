#![deny(clippy::wildcard_imports)]
#![cfg_attr(test, allow(clippy::wildcard_imports))]

pub mod config;
pub mod domain;
pub mod error;
pub mod errors;
pub mod protocol;
pub mod services;
pub mod telemetry;

#[cfg(test)]
pub mod test_bootstrap;

// Re-exports for public API
pub use config::EngineConfig;
pub use error::AppError;
pub use errors::domain::DomainError;
pub use errors::ErrorCode;
pub use protocol::{Audience, Command, OutboundEvent, RoomEvent, RoomSnapshot};
pub use services::{GameFlowService, Room, RoomManager, RoomSettings, SessionRegistry};

// Auto-initialize logging for unit tests
#[cfg(test)]
#[ctor::ctor]
fn init_test_logging() {
    test_bootstrap::logging::init();
}
