//! Command layer: resolves a connection to its user, dispatches typed
//! commands to rooms and keeps the user ↔ room bindings in step with what the
//! rooms report.
//!
//! Room locks are never held while the session registry is touched; bindings
//! are reconciled from the emitted events after the room guard is dropped.

use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::room::RoomSettings;
use super::room_manager::RoomManager;
use super::sessions::SessionRegistry;
use crate::config::EngineConfig;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::errors::ErrorCode;
use crate::protocol::{
    Command, ConnectionId, OutboundEvent, RoomEvent, RoomId, RoomSnapshot, SessionId,
};

/// Result of attaching a connection to a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Connected {
    pub session_id: SessionId,
    /// Seat restoration events and, when the user sits in a room, a
    /// snapshot addressed to them.
    pub events: Vec<OutboundEvent>,
}

pub struct GameFlowService {
    rooms: Arc<RoomManager>,
    sessions: Arc<SessionRegistry>,
}

impl GameFlowService {
    pub fn new(rooms: Arc<RoomManager>, sessions: Arc<SessionRegistry>) -> Self {
        Self { rooms, sessions }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(
            Arc::new(RoomManager::new(RoomSettings::from(cfg))),
            Arc::new(SessionRegistry::from_config(cfg)),
        )
    }

    pub fn rooms(&self) -> &Arc<RoomManager> {
        &self.rooms
    }

    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// First connect of `user_id` on `connection_id`.
    pub fn connect(
        &self,
        user_id: &str,
        connection_id: ConnectionId,
        nav_token: Option<Uuid>,
        now: Instant,
    ) -> Result<Connected, DomainError> {
        let session_id = self.sessions.bind(user_id, connection_id, nav_token, now)?;
        let events = self.restore_seat(user_id, now);
        Ok(Connected { session_id, events })
    }

    /// Resume an existing session on a new connection and hand the seat back.
    pub fn reconnect(
        &self,
        user_id: &str,
        connection_id: ConnectionId,
        nav_token: Option<Uuid>,
        now: Instant,
    ) -> Result<Connected, DomainError> {
        let session_id = self
            .sessions
            .reconnect(user_id, connection_id, nav_token, now)?;
        let events = self.restore_seat(user_id, now);
        info!(user_id = %user_id, session_id = %session_id, "[GAME FLOW] reconnected");
        Ok(Connected { session_id, events })
    }

    /// Transport lost the connection: the session goes offline and the seat,
    /// if any, starts its abandonment clock.
    pub fn disconnect(&self, connection_id: ConnectionId, now: Instant) -> Vec<OutboundEvent> {
        let resolved = match self.sessions.resolve(connection_id) {
            Ok(r) => r,
            Err(_) => {
                debug!(conn_id = %connection_id, "[GAME FLOW] disconnect for unknown connection");
                return Vec::new();
            }
        };
        if let Err(e) = self.sessions.mark_offline(resolved.session_id, now) {
            warn!(error = %e, "[GAME FLOW] failed to mark session offline");
        }
        self.release_seat(&resolved.user_id, resolved.room_id, now)
    }

    /// End the session for good. A seat in a running game stays with the
    /// autopilot once its abandonment timer runs out.
    pub fn logout(
        &self,
        connection_id: ConnectionId,
        now: Instant,
    ) -> Result<Vec<OutboundEvent>, DomainError> {
        let resolved = self.sessions.resolve(connection_id)?;
        self.sessions.logout(resolved.session_id)?;
        Ok(self.release_seat(&resolved.user_id, resolved.room_id, now))
    }

    pub fn issue_navigation_token(
        &self,
        connection_id: ConnectionId,
        now: Instant,
    ) -> Result<Uuid, DomainError> {
        let resolved = self.sessions.resolve(connection_id)?;
        self.sessions
            .issue_navigation_token(resolved.session_id, now)
    }

    /// Apply one command from `connection_id`.
    ///
    /// Fails only when the connection has no live session; every other
    /// failure comes back as an `error` event addressed to the caller.
    pub fn handle(
        &self,
        connection_id: ConnectionId,
        cmd: Command,
        now: Instant,
    ) -> Result<Vec<OutboundEvent>, DomainError> {
        let resolved = self.sessions.resolve(connection_id)?;
        self.sessions.touch(connection_id, now);
        let user_id = resolved.user_id;

        if let Some(claimed) = cmd.user_id() {
            if claimed != user_id {
                warn!(user_id = %user_id, claimed = %claimed, command = cmd.name(), "[GAME FLOW] command issued for another user");
                return Ok(vec![OutboundEvent::error(
                    user_id.as_str(),
                    ErrorCode::AuthConflict,
                    "Command names a different user",
                )]);
            }
        }

        debug!(user_id = %user_id, command = cmd.name(), "[GAME FLOW] handling command");
        match self.dispatch(&user_id, resolved.room_id, &cmd, now) {
            Ok(events) => Ok(events),
            Err(e) => {
                debug!(user_id = %user_id, command = cmd.name(), code = %e.code(), "[GAME FLOW] command rejected");
                Ok(vec![OutboundEvent::error(user_id.as_str(), e.code(), e.detail())])
            }
        }
    }

    fn dispatch(
        &self,
        user_id: &str,
        bound_room: Option<RoomId>,
        cmd: &Command,
        now: Instant,
    ) -> Result<Vec<OutboundEvent>, DomainError> {
        let Some(room_id) = cmd.room_id() else {
            let room_id = self.rooms.create_room();
            return Ok(vec![OutboundEvent::to_user(
                user_id,
                RoomEvent::RoomCreated { room_id },
            )]);
        };

        if matches!(cmd, Command::JoinRoom { .. }) {
            if let Some(current) = bound_room.filter(|r| *r != room_id) {
                if self.is_seated(user_id, current) {
                    return Err(DomainError::conflict(
                        ConflictKind::AlreadyInRoom,
                        format!("User {user_id} already sits in room {current}"),
                    ));
                }
            }
        }

        let room = self.rooms.require(room_id)?;
        let (mut events, outcome) = {
            let mut guard = room.lock();
            match guard.repair_if_inconsistent() {
                Some(reset) => {
                    let err = reset.to_error();
                    (reset.events, Err(err))
                }
                None => (Vec::new(), guard.apply(user_id, cmd, now)),
            }
        };

        match outcome {
            Ok(applied) => events.extend(applied),
            Err(e) => {
                debug!(room_id, user_id = %user_id, code = %e.code(), "[GAME FLOW] room rejected command");
                events.push(OutboundEvent::error(user_id, e.code(), e.detail()));
            }
        }

        self.reconcile_bindings(&events);
        self.rooms.remove_if_empty(room_id);
        Ok(events)
    }

    /// Current view of the caller's room.
    pub fn snapshot(
        &self,
        connection_id: ConnectionId,
        now: Instant,
    ) -> Result<RoomSnapshot, DomainError> {
        let resolved = self.sessions.resolve(connection_id)?;
        let room_id = resolved.room_id.ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                format!("User {} is not in a room", resolved.user_id),
            )
        })?;
        self.rooms
            .with_room(room_id, |room| room.snapshot_for(Some(&resolved.user_id), now))
    }

    /// Fire due room timers and sweep stale sessions.
    pub fn tick(&self, now: Instant) -> Vec<OutboundEvent> {
        let events = self.rooms.tick(now);
        self.reconcile_bindings(&events);
        self.sessions.sweep(now);
        events
    }

    fn is_seated(&self, user_id: &str, room_id: RoomId) -> bool {
        self.rooms
            .with_room(room_id, |room| room.seat_of(user_id).is_some())
            .unwrap_or(false)
    }

    fn restore_seat(&self, user_id: &str, now: Instant) -> Vec<OutboundEvent> {
        let Some(room_id) = self.sessions.room_of(user_id) else {
            return Vec::new();
        };
        let restored = self.rooms.get(room_id).and_then(|room| {
            let mut room = room.lock();
            room.seat_of(user_id)?;
            let mut events = room.seat_reconnected(user_id, now);
            events.push(OutboundEvent::to_user(
                user_id,
                RoomEvent::Snapshot {
                    snapshot: room.snapshot_for(Some(user_id), now),
                },
            ));
            Some(events)
        });
        match restored {
            Some(events) => events,
            None => {
                debug!(user_id = %user_id, room_id, "[GAME FLOW] stale room binding dropped");
                self.sessions.clear_room(user_id, room_id);
                Vec::new()
            }
        }
    }

    fn release_seat(
        &self,
        user_id: &str,
        room_id: Option<RoomId>,
        now: Instant,
    ) -> Vec<OutboundEvent> {
        let Some(room_id) = room_id else {
            return Vec::new();
        };
        self.rooms
            .with_room(room_id, |room| room.seat_disconnected(user_id, now))
            .unwrap_or_default()
    }

    fn reconcile_bindings(&self, events: &[OutboundEvent]) {
        for out in events {
            match &out.event {
                RoomEvent::RoomJoined {
                    room_id, user_id, ..
                } => self.sessions.bind_room(user_id, *room_id),
                RoomEvent::PlayerLeft {
                    room_id,
                    user_id,
                    abandoned: false,
                    ..
                } => self.sessions.clear_room(user_id, *room_id),
                _ => {}
            }
        }
    }
}
