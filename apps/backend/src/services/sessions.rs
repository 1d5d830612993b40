//! Session continuity: connection ↔ user ↔ room bindings that survive a
//! dropped and resumed connection.
//!
//! Every mutation for a user runs under that user's map entry, so two
//! connections of the same user never race while unrelated users proceed
//! independently. Lock order is user entry first, then the connection and
//! session indexes; lookups that start from an index copy the key out and
//! release the index guard before touching the user map.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::errors::domain::{ConflictKind, DomainError, NotFoundKind};
use crate::protocol::{ConnectionId, RoomId, SessionId, UserId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub session_id: SessionId,
    pub user_id: UserId,
    /// Connection currently carrying the session; `None` while offline.
    pub connection_id: Option<ConnectionId>,
    pub last_activity: Instant,
    pub online: bool,
    pub offline_since: Option<Instant>,
}

impl Session {
    fn online(user_id: &str, connection_id: ConnectionId, now: Instant) -> Self {
        Self {
            session_id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            connection_id: Some(connection_id),
            last_activity: now,
            online: true,
            offline_since: None,
        }
    }
}

/// What a connection resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSession {
    pub session_id: SessionId,
    pub user_id: UserId,
    pub room_id: Option<RoomId>,
}

#[derive(Debug, Clone)]
struct NavToken {
    token: Uuid,
    expires_at: Instant,
}

#[derive(Debug, Default)]
struct UserEntry {
    sessions: Vec<Session>,
    nav_tokens: Vec<NavToken>,
    room: Option<RoomId>,
}

impl UserEntry {
    /// Consume a live navigation token.
    fn take_nav_token(&mut self, token: Uuid, now: Instant) -> bool {
        match self
            .nav_tokens
            .iter()
            .position(|t| t.token == token && t.expires_at > now)
        {
            Some(idx) => {
                self.nav_tokens.swap_remove(idx);
                true
            }
            None => false,
        }
    }

    fn is_disposable(&self) -> bool {
        self.sessions.is_empty() && self.room.is_none()
    }
}

pub struct SessionRegistry {
    users: DashMap<UserId, UserEntry>,
    connections: DashMap<ConnectionId, (UserId, SessionId)>,
    session_owners: DashMap<SessionId, UserId>,
    session_ttl: Duration,
    nav_token_ttl: Duration,
}

fn session_not_found(detail: impl Into<String>) -> DomainError {
    DomainError::not_found(NotFoundKind::Session, detail)
}

impl SessionRegistry {
    pub fn new(session_ttl: Duration, nav_token_ttl: Duration) -> Self {
        Self {
            users: DashMap::new(),
            connections: DashMap::new(),
            session_owners: DashMap::new(),
            session_ttl,
            nav_token_ttl,
        }
    }

    pub fn from_config(cfg: &EngineConfig) -> Self {
        Self::new(cfg.session_ttl, cfg.nav_token_ttl)
    }

    /// First connect for `user_id` on `connection_id`. Revives the user's
    /// offline session when there is one.
    pub fn bind(
        &self,
        user_id: &str,
        connection_id: ConnectionId,
        nav_token: Option<Uuid>,
        now: Instant,
    ) -> Result<SessionId, DomainError> {
        self.attach(user_id, connection_id, nav_token, now, true)
    }

    /// Resume an existing session on a new connection.
    pub fn reconnect(
        &self,
        user_id: &str,
        connection_id: ConnectionId,
        nav_token: Option<Uuid>,
        now: Instant,
    ) -> Result<SessionId, DomainError> {
        self.attach(user_id, connection_id, nav_token, now, false)
    }

    fn attach(
        &self,
        user_id: &str,
        connection_id: ConnectionId,
        nav_token: Option<Uuid>,
        now: Instant,
        create: bool,
    ) -> Result<SessionId, DomainError> {
        let mut entry = if create {
            self.users.entry(user_id.to_string()).or_default()
        } else {
            self.users
                .get_mut(user_id)
                .filter(|e| !e.sessions.is_empty())
                .ok_or_else(|| session_not_found(format!("No session for user {user_id}")))?
        };

        let owner = self
            .connections
            .get(&connection_id)
            .map(|e| e.value().0.clone());
        if owner.as_deref().is_some_and(|owner| owner != user_id) {
            warn!(conn_id = %connection_id, user_id = %user_id, "[SESSIONS] connection owned by another user");
            return Err(DomainError::conflict(
                ConflictKind::AuthConflict,
                "Connection belongs to another user",
            ));
        }

        entry.nav_tokens.retain(|t| t.expires_at > now);

        if let Some(idx) = entry.sessions.iter().position(|s| s.online) {
            let session_id = entry.sessions[idx].session_id;
            let old_connection = entry.sessions[idx].connection_id;
            if old_connection == Some(connection_id) {
                entry.sessions[idx].last_activity = now;
                return Ok(session_id);
            }
            let token_ok = nav_token.is_some_and(|t| entry.take_nav_token(t, now));
            if !token_ok {
                warn!(user_id = %user_id, conn_id = %connection_id, "[SESSIONS] online session elsewhere, refusing");
                return Err(DomainError::conflict(
                    ConflictKind::AuthConflict,
                    format!("User {user_id} is already connected"),
                ));
            }

            let old = &mut entry.sessions[idx];
            old.online = false;
            old.offline_since = Some(now);
            old.connection_id = None;
            if let Some(conn) = old_connection {
                self.connections.remove(&conn);
            }
            info!(user_id = %user_id, old_session = %session_id, "[SESSIONS] session demoted by navigation");
        } else if let Some(session) = entry.sessions.iter_mut().max_by_key(|s| s.last_activity) {
            session.online = true;
            session.offline_since = None;
            session.connection_id = Some(connection_id);
            session.last_activity = now;
            let session_id = session.session_id;
            self.connections
                .insert(connection_id, (user_id.to_string(), session_id));
            info!(user_id = %user_id, session_id = %session_id, conn_id = %connection_id, "[SESSIONS] session resumed");
            return Ok(session_id);
        }

        let session = Session::online(user_id, connection_id, now);
        let session_id = session.session_id;
        entry.sessions.push(session);
        self.connections
            .insert(connection_id, (user_id.to_string(), session_id));
        self.session_owners.insert(session_id, user_id.to_string());
        info!(user_id = %user_id, session_id = %session_id, conn_id = %connection_id, "[SESSIONS] session started");
        Ok(session_id)
    }

    /// Session and room behind a connection.
    pub fn resolve(&self, connection_id: ConnectionId) -> Result<ResolvedSession, DomainError> {
        let (user_id, session_id) = self
            .connections
            .get(&connection_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| session_not_found("Unknown connection"))?;
        let entry = self
            .users
            .get(&user_id)
            .ok_or_else(|| session_not_found("Session owner vanished"))?;
        let live = entry
            .sessions
            .iter()
            .any(|s| s.session_id == session_id && s.online);
        if !live {
            return Err(session_not_found("Session is offline"));
        }
        Ok(ResolvedSession {
            session_id,
            user_id: user_id.clone(),
            room_id: entry.room,
        })
    }

    /// Record activity on a connection's session.
    pub fn touch(&self, connection_id: ConnectionId, now: Instant) {
        let Some((user_id, session_id)) = self.connections.get(&connection_id).map(|e| e.value().clone())
        else {
            return;
        };
        if let Some(mut entry) = self.users.get_mut(&user_id) {
            if let Some(s) = entry.sessions.iter_mut().find(|s| s.session_id == session_id) {
                s.last_activity = now;
            }
        }
    }

    fn owner_of(&self, session_id: SessionId) -> Result<UserId, DomainError> {
        self.session_owners
            .get(&session_id)
            .map(|e| e.value().clone())
            .ok_or_else(|| session_not_found(format!("Session {session_id} not found")))
    }

    /// The session's connection went away; keep the session for a later resume.
    pub fn mark_offline(&self, session_id: SessionId, now: Instant) -> Result<UserId, DomainError> {
        let user_id = self.owner_of(session_id)?;
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| session_not_found("Session owner vanished"))?;
        let session = entry
            .sessions
            .iter_mut()
            .find(|s| s.session_id == session_id)
            .ok_or_else(|| session_not_found(format!("Session {session_id} not found")))?;
        let connection = session.connection_id.take();
        if session.online {
            session.online = false;
            session.offline_since = Some(now);
        }
        if let Some(conn) = connection {
            self.connections.remove(&conn);
        }
        info!(user_id = %user_id, session_id = %session_id, "[SESSIONS] session offline");
        Ok(user_id)
    }

    /// Single-use proof that the session's owner is moving to a new
    /// connection on purpose.
    pub fn issue_navigation_token(&self, session_id: SessionId, now: Instant) -> Result<Uuid, DomainError> {
        let user_id = self.owner_of(session_id)?;
        let mut entry = self
            .users
            .get_mut(&user_id)
            .ok_or_else(|| session_not_found("Session owner vanished"))?;
        let online = entry
            .sessions
            .iter()
            .any(|s| s.session_id == session_id && s.online);
        if !online {
            return Err(session_not_found("Only an online session can issue a navigation token"));
        }
        let token = Uuid::new_v4();
        entry.nav_tokens.push(NavToken {
            token,
            expires_at: now + self.nav_token_ttl,
        });
        debug!(user_id = %user_id, session_id = %session_id, "[SESSIONS] navigation token issued");
        Ok(token)
    }

    /// Remove a session for good.
    pub fn logout(&self, session_id: SessionId) -> Result<UserId, DomainError> {
        let user_id = self.owner_of(session_id)?;
        let disposable = {
            let mut entry = self
                .users
                .get_mut(&user_id)
                .ok_or_else(|| session_not_found("Session owner vanished"))?;
            if let Some(idx) = entry.sessions.iter().position(|s| s.session_id == session_id) {
                let session = entry.sessions.remove(idx);
                if let Some(conn) = session.connection_id {
                    self.connections.remove(&conn);
                }
            }
            self.session_owners.remove(&session_id);
            if entry.sessions.is_empty() {
                entry.nav_tokens.clear();
            }
            entry.is_disposable()
        };
        if disposable {
            self.users.remove_if(&user_id, |_, e| e.is_disposable());
        }
        info!(user_id = %user_id, session_id = %session_id, "[SESSIONS] logout");
        Ok(user_id)
    }

    /// Drop sessions offline for longer than the TTL and expired navigation
    /// tokens. Returns the number of sessions removed.
    pub fn sweep(&self, now: Instant) -> usize {
        let user_ids: Vec<UserId> = self.users.iter().map(|e| e.key().clone()).collect();
        let mut removed = 0;
        for user_id in user_ids {
            let disposable = {
                let Some(mut entry) = self.users.get_mut(&user_id) else {
                    continue;
                };
                let ttl = self.session_ttl;
                let (keep, expired): (Vec<Session>, Vec<Session>) =
                    entry.sessions.drain(..).partition(|s| {
                        s.online || s.offline_since.is_some_and(|since| now < since + ttl)
                    });
                entry.sessions = keep;
                for session in &expired {
                    self.session_owners.remove(&session.session_id);
                    debug!(user_id = %user_id, session_id = %session.session_id, "[SESSIONS] swept");
                }
                removed += expired.len();
                entry.nav_tokens.retain(|t| t.expires_at > now);
                entry.is_disposable()
            };
            if disposable {
                self.users.remove_if(&user_id, |_, e| e.is_disposable());
            }
        }
        if removed > 0 {
            info!(removed, "[SESSIONS] offline sessions swept");
        }
        removed
    }

    pub fn bind_room(&self, user_id: &str, room_id: RoomId) {
        self.users.entry(user_id.to_string()).or_default().room = Some(room_id);
    }

    /// Forget the user's room, but only if it is `room_id`.
    pub fn clear_room(&self, user_id: &str, room_id: RoomId) {
        let disposable = match self.users.get_mut(user_id) {
            Some(mut entry) if entry.room == Some(room_id) => {
                entry.room = None;
                entry.is_disposable()
            }
            _ => false,
        };
        if disposable {
            self.users.remove_if(user_id, |_, e| e.is_disposable());
        }
    }

    pub fn room_of(&self, user_id: &str) -> Option<RoomId> {
        self.users.get(user_id).and_then(|e| e.room)
    }

    pub fn session(&self, session_id: SessionId) -> Option<Session> {
        let user_id = self.owner_of(session_id).ok()?;
        let entry = self.users.get(&user_id)?;
        entry
            .sessions
            .iter()
            .find(|s| s.session_id == session_id)
            .cloned()
    }

    /// The user's online session, if any.
    pub fn online_session(&self, user_id: &str) -> Option<Session> {
        let entry = self.users.get(user_id)?;
        entry.sessions.iter().find(|s| s.online).cloned()
    }

    pub fn session_count(&self) -> usize {
        self.session_owners.len()
    }
}
