//! Error codes for the Landlord engine.
//!
//! This module defines all error codes carried by `error` events.
//! Add new codes here; never pass ad-hoc strings as error codes.
//!
//! All error codes are SCREAMING_SNAKE_CASE and map 1:1 to the strings
//! that appear on the wire.

use core::fmt;

use serde::{Serialize, Serializer};

/// Centralized error codes.
///
/// Each variant maps to a canonical SCREAMING_SNAKE_CASE string via
/// [`ErrorCode::as_str`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Rooms & seating
    /// Room id does not refer to a live room
    RoomNotFound,
    /// All three seats are taken
    RoomFull,
    /// Another seated player already uses this display name
    DuplicateName,
    /// User already holds a seat in this room
    AlreadyInRoom,
    /// User holds no seat in this room
    PlayerNotInRoom,
    /// Start requested before three ready seats
    PlayersNotReady,
    /// The landlord may not leave a game in progress
    LandlordCannotLeave,

    // Game phase
    /// Command requires a game in progress
    GameNotStarted,
    /// Command requires a room that is still waiting
    GameAlreadyStarted,
    /// Rematch requested before the game finished
    GameNotFinished,
    /// Card play attempted while bidding is open
    BiddingInProgress,
    /// Grab attempted after bidding resolved
    LandlordAlreadySet,
    /// Seat acted out of turn
    NotYourTurn,

    // Plays
    /// Submitted cards are not all in the player's hand
    CardsNotOwned,
    /// Submitted cards do not form a legal combination
    InvalidCombination,
    /// Combination does not beat the open trick
    CombinationTooSmall,
    /// Trick leader tried to pass
    CannotPassAsLeader,
    /// Card token could not be parsed
    ParseCard,
    /// General validation error
    ValidationError,

    // Sessions
    /// Another connection holds the user's online session
    AuthConflict,
    /// No session exists for the user or id
    SessionNotFound,

    // System
    /// Room failed its integrity check and was reset
    RoomReset,
    /// Configuration error
    ConfigError,
    /// Internal error
    Internal,
}

impl ErrorCode {
    /// Every code, in declaration order.
    pub const ALL: [ErrorCode; 24] = [
        Self::RoomNotFound,
        Self::RoomFull,
        Self::DuplicateName,
        Self::AlreadyInRoom,
        Self::PlayerNotInRoom,
        Self::PlayersNotReady,
        Self::LandlordCannotLeave,
        Self::GameNotStarted,
        Self::GameAlreadyStarted,
        Self::GameNotFinished,
        Self::BiddingInProgress,
        Self::LandlordAlreadySet,
        Self::NotYourTurn,
        Self::CardsNotOwned,
        Self::InvalidCombination,
        Self::CombinationTooSmall,
        Self::CannotPassAsLeader,
        Self::ParseCard,
        Self::ValidationError,
        Self::AuthConflict,
        Self::SessionNotFound,
        Self::RoomReset,
        Self::ConfigError,
        Self::Internal,
    ];

    /// Returns the canonical SCREAMING_SNAKE_CASE string for this error code.
    pub const fn as_str(&self) -> &'static str {
        match self {
            // Rooms & seating
            Self::RoomNotFound => "ROOM_NOT_FOUND",
            Self::RoomFull => "ROOM_FULL",
            Self::DuplicateName => "DUPLICATE_NAME",
            Self::AlreadyInRoom => "ALREADY_IN_ROOM",
            Self::PlayerNotInRoom => "PLAYER_NOT_IN_ROOM",
            Self::PlayersNotReady => "PLAYERS_NOT_READY",
            Self::LandlordCannotLeave => "LANDLORD_CANNOT_LEAVE",

            // Game phase
            Self::GameNotStarted => "GAME_NOT_STARTED",
            Self::GameAlreadyStarted => "GAME_ALREADY_STARTED",
            Self::GameNotFinished => "GAME_NOT_FINISHED",
            Self::BiddingInProgress => "BIDDING_IN_PROGRESS",
            Self::LandlordAlreadySet => "LANDLORD_ALREADY_SET",
            Self::NotYourTurn => "NOT_YOUR_TURN",

            // Plays
            Self::CardsNotOwned => "CARDS_NOT_OWNED",
            Self::InvalidCombination => "INVALID_COMBINATION",
            Self::CombinationTooSmall => "COMBINATION_TOO_SMALL",
            Self::CannotPassAsLeader => "CANNOT_PASS_AS_LEADER",
            Self::ParseCard => "PARSE_CARD",
            Self::ValidationError => "VALIDATION_ERROR",

            // Sessions
            Self::AuthConflict => "AUTH_CONFLICT",
            Self::SessionNotFound => "SESSION_NOT_FOUND",

            // System
            Self::RoomReset => "ROOM_RESET",
            Self::ConfigError => "CONFIG_ERROR",
            Self::Internal => "INTERNAL",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for ErrorCode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}
