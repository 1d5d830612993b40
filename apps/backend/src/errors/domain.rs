//! Domain-level error type used across the rule engine, rooms and sessions.
//!
//! This error type is transport-agnostic. Every rejected command surfaces as a
//! `DomainError`; the command layer turns it into an `error(code, message)`
//! event using [`DomainError::code`].

use std::error::Error;
use std::fmt::{Display, Formatter, Result as FmtResult};

use super::error_code::ErrorCode;

/// Validation / business rule violations.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationKind {
    NotYourTurn,
    GameNotStarted,
    GameAlreadyStarted,
    GameNotFinished,
    BiddingInProgress,
    PlayersNotReady,
    CardsNotOwned,
    InvalidCombination,
    CombinationTooSmall,
    CannotPassAsLeader,
    ParseCard,
    Other(String),
}

/// Domain-level conflict kinds
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConflictKind {
    RoomFull,
    DuplicateName,
    AlreadyInRoom,
    LandlordAlreadySet,
    LandlordCannotLeave,
    AuthConflict,
}

/// Domain-level not found entities
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NotFoundKind {
    Room,
    Player,
    Session,
}

/// Infra error kinds to distinguish operational failures
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum InfraErrorKind {
    /// A room failed its integrity check and was forced back to WAITING.
    RoomInconsistent,
    Other(String),
}

/// Central domain error type
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Input/user validation or business rule violation
    Validation(ValidationKind, String),
    /// Semantic conflict
    Conflict(ConflictKind, String),
    /// Missing resource in domain terms
    NotFound(NotFoundKind, String),
    /// Internal failures
    Infra(InfraErrorKind, String),
}

impl Display for DomainError {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            DomainError::Validation(kind, d) => write!(f, "validation error {kind:?}: {d}"),
            DomainError::Conflict(kind, d) => write!(f, "conflict {kind:?}: {d}"),
            DomainError::NotFound(kind, d) => write!(f, "not found {kind:?}: {d}"),
            DomainError::Infra(kind, d) => write!(f, "infra {kind:?}: {d}"),
        }
    }
}

impl Error for DomainError {}

impl DomainError {
    pub fn validation(kind: ValidationKind, detail: impl Into<String>) -> Self {
        Self::Validation(kind, detail.into())
    }
    pub fn validation_other(detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Validation(ValidationKind::Other(detail.clone()), detail)
    }
    pub fn conflict(kind: ConflictKind, detail: impl Into<String>) -> Self {
        Self::Conflict(kind, detail.into())
    }
    pub fn not_found(kind: NotFoundKind, detail: impl Into<String>) -> Self {
        Self::NotFound(kind, detail.into())
    }
    pub fn infra(kind: InfraErrorKind, detail: impl Into<String>) -> Self {
        Self::Infra(kind, detail.into())
    }

    /// Human-readable detail without the kind prefix.
    pub fn detail(&self) -> &str {
        match self {
            DomainError::Validation(_, d)
            | DomainError::Conflict(_, d)
            | DomainError::NotFound(_, d)
            | DomainError::Infra(_, d) => d,
        }
    }

    /// Wire code for this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            DomainError::Validation(kind, _) => match kind {
                ValidationKind::NotYourTurn => ErrorCode::NotYourTurn,
                ValidationKind::GameNotStarted => ErrorCode::GameNotStarted,
                ValidationKind::GameAlreadyStarted => ErrorCode::GameAlreadyStarted,
                ValidationKind::GameNotFinished => ErrorCode::GameNotFinished,
                ValidationKind::BiddingInProgress => ErrorCode::BiddingInProgress,
                ValidationKind::PlayersNotReady => ErrorCode::PlayersNotReady,
                ValidationKind::CardsNotOwned => ErrorCode::CardsNotOwned,
                ValidationKind::InvalidCombination => ErrorCode::InvalidCombination,
                ValidationKind::CombinationTooSmall => ErrorCode::CombinationTooSmall,
                ValidationKind::CannotPassAsLeader => ErrorCode::CannotPassAsLeader,
                ValidationKind::ParseCard => ErrorCode::ParseCard,
                ValidationKind::Other(_) => ErrorCode::ValidationError,
            },
            DomainError::Conflict(kind, _) => match kind {
                ConflictKind::RoomFull => ErrorCode::RoomFull,
                ConflictKind::DuplicateName => ErrorCode::DuplicateName,
                ConflictKind::AlreadyInRoom => ErrorCode::AlreadyInRoom,
                ConflictKind::LandlordAlreadySet => ErrorCode::LandlordAlreadySet,
                ConflictKind::LandlordCannotLeave => ErrorCode::LandlordCannotLeave,
                ConflictKind::AuthConflict => ErrorCode::AuthConflict,
            },
            DomainError::NotFound(kind, _) => match kind {
                NotFoundKind::Room => ErrorCode::RoomNotFound,
                NotFoundKind::Player => ErrorCode::PlayerNotInRoom,
                NotFoundKind::Session => ErrorCode::SessionNotFound,
            },
            DomainError::Infra(kind, _) => match kind {
                InfraErrorKind::RoomInconsistent => ErrorCode::RoomReset,
                InfraErrorKind::Other(_) => ErrorCode::Internal,
            },
        }
    }
}
