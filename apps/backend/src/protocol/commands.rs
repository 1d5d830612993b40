use serde::{Deserialize, Serialize};

use super::{RoomId, UserId};
use crate::domain::Card;

/// Commands accepted from a connection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    CreateRoom,
    JoinRoom {
        room_id: RoomId,
        user_id: UserId,
        display_name: String,
    },
    SetReady {
        room_id: RoomId,
        user_id: UserId,
        ready: bool,
    },
    StartGame {
        room_id: RoomId,
    },
    GrabLandlord {
        room_id: RoomId,
        user_id: UserId,
    },
    PlayCards {
        room_id: RoomId,
        user_id: UserId,
        cards: Vec<Card>,
    },
    PassTurn {
        room_id: RoomId,
        user_id: UserId,
    },
    LeaveRoom {
        room_id: RoomId,
        user_id: UserId,
    },
    Rematch {
        room_id: RoomId,
    },
}

impl Command {
    /// Target room, if the command addresses one.
    pub fn room_id(&self) -> Option<RoomId> {
        match self {
            Command::CreateRoom => None,
            Command::JoinRoom { room_id, .. }
            | Command::SetReady { room_id, .. }
            | Command::StartGame { room_id }
            | Command::GrabLandlord { room_id, .. }
            | Command::PlayCards { room_id, .. }
            | Command::PassTurn { room_id, .. }
            | Command::LeaveRoom { room_id, .. }
            | Command::Rematch { room_id } => Some(*room_id),
        }
    }

    /// User the command claims to act for, if it names one.
    pub fn user_id(&self) -> Option<&str> {
        match self {
            Command::JoinRoom { user_id, .. }
            | Command::SetReady { user_id, .. }
            | Command::GrabLandlord { user_id, .. }
            | Command::PlayCards { user_id, .. }
            | Command::PassTurn { user_id, .. }
            | Command::LeaveRoom { user_id, .. } => Some(user_id),
            Command::CreateRoom | Command::StartGame { .. } | Command::Rematch { .. } => None,
        }
    }

    /// Wire name, for logs.
    pub fn name(&self) -> &'static str {
        match self {
            Command::CreateRoom => "create_room",
            Command::JoinRoom { .. } => "join_room",
            Command::SetReady { .. } => "set_ready",
            Command::StartGame { .. } => "start_game",
            Command::GrabLandlord { .. } => "grab_landlord",
            Command::PlayCards { .. } => "play_cards",
            Command::PassTurn { .. } => "pass_turn",
            Command::LeaveRoom { .. } => "leave_room",
            Command::Rematch { .. } => "rematch",
        }
    }
}
