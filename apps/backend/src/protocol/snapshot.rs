//! Per-user room view sent on request and after a reconnect.

use serde::Serialize;

use super::{RoomId, UserId};
use crate::domain::scoring::GameOutcome;
use crate::domain::snapshot::GameView;
use crate::domain::Seat;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RoomStatus {
    Waiting,
    Playing,
    Finished,
}

/// Public info about a single seat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatPublic {
    pub seat: Seat,
    pub user_id: Option<UserId>,
    pub display_name: Option<String>,
    pub ready: bool,
    pub connected: bool,
    pub abandoned: bool,
}

impl SeatPublic {
    pub const fn empty(seat: Seat) -> Self {
        Self {
            seat,
            user_id: None,
            display_name: None,
            ready: false,
            connected: false,
            abandoned: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoomSnapshot {
    pub room_id: RoomId,
    pub status: RoomStatus,
    pub seats: Vec<SeatPublic>,
    /// Seat held by the viewer, if any.
    pub viewer_seat: Option<Seat>,
    pub game: Option<GameView>,
    /// Milliseconds left on the active turn timer.
    pub turn_remaining_ms: Option<u64>,
    pub last_result: Option<GameOutcome>,
    pub games_played: u32,
}
