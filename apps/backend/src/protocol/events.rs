use serde::Serialize;

use super::snapshot::RoomSnapshot;
use super::{RoomId, UserId};
use crate::domain::{Card, ComboKind, Seat};
use crate::errors::ErrorCode;

/// Who receives an event.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum Audience {
    /// Everyone seated in the room.
    Room(RoomId),
    /// A single user (private hands, errors, snapshots).
    User(UserId),
}

#[allow(clippy::large_enum_variant)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomEvent {
    RoomCreated {
        room_id: RoomId,
    },
    RoomJoined {
        room_id: RoomId,
        seat: Seat,
        user_id: UserId,
        display_name: String,
    },
    PlayerLeft {
        room_id: RoomId,
        seat: Seat,
        user_id: UserId,
        /// Seat kept and handed to the autopilot rather than freed.
        abandoned: bool,
    },
    ReadyChanged {
        room_id: RoomId,
        seat: Seat,
        ready: bool,
    },
    CardsDealt {
        room_id: RoomId,
        seat: Seat,
        hand: Vec<Card>,
        hand_size: usize,
        bottom_visible_to_landlord: bool,
    },
    LandlordDeclined {
        room_id: RoomId,
        seat: Seat,
    },
    LandlordSelected {
        room_id: RoomId,
        seat: Seat,
        forced: bool,
    },
    BottomCardsRevealed {
        room_id: RoomId,
        seat: Seat,
        cards: Vec<Card>,
    },
    CardsPlayed {
        room_id: RoomId,
        seat: Seat,
        cards: Vec<Card>,
        combination_kind: ComboKind,
        remaining: usize,
    },
    TurnPassed {
        room_id: RoomId,
        seat: Seat,
        trick_closed: bool,
    },
    TurnChanged {
        room_id: RoomId,
        seat: Seat,
    },
    TurnTimedOut {
        room_id: RoomId,
        seat: Seat,
    },
    SeatConnection {
        room_id: RoomId,
        seat: Seat,
        connected: bool,
        abandoned: bool,
    },
    GameEnded {
        room_id: RoomId,
        winner_seat: Seat,
        landlord_seat: Seat,
        landlord_won: bool,
        multiplier: i32,
        score_delta: [i32; 3],
    },
    RoomReset {
        room_id: RoomId,
        reason: String,
    },
    Snapshot {
        snapshot: RoomSnapshot,
    },
    Error {
        code: ErrorCode,
        message: String,
    },
}

/// An event plus its addressee.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutboundEvent {
    pub audience: Audience,
    pub event: RoomEvent,
}

impl OutboundEvent {
    pub fn to_room(room_id: RoomId, event: RoomEvent) -> Self {
        Self {
            audience: Audience::Room(room_id),
            event,
        }
    }

    pub fn to_user(user_id: impl Into<UserId>, event: RoomEvent) -> Self {
        Self {
            audience: Audience::User(user_id.into()),
            event,
        }
    }

    pub fn error(user_id: impl Into<UserId>, code: ErrorCode, message: impl Into<String>) -> Self {
        Self::to_user(
            user_id,
            RoomEvent::Error {
                code,
                message: message.into(),
            },
        )
    }
}
