//! One room's lifecycle: seating, readiness, bidding, trick play, timers and
//! integrity repair.
//!
//! A `Room` is plain data plus synchronous transitions. Every public
//! transition validates first and only then mutates, so a rejected command
//! leaves the room exactly as it was. Time is always passed in.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::EngineConfig;
use crate::domain::bidding::{decline_landlord, grab_landlord, BidOutcome};
use crate::domain::rules::{is_valid_seat, DECK_SIZE, PLAYERS};
use crate::domain::scoring::{score_game, GameOutcome};
use crate::domain::snapshot::GameView;
use crate::domain::state::{GameState, Phase};
use crate::domain::tricks::{autopilot_action, pass_turn, play_cards, AutoAction};
use crate::domain::{Card, Seat};
use crate::errors::domain::{
    ConflictKind, DomainError, InfraErrorKind, NotFoundKind, ValidationKind,
};
use crate::protocol::{
    Command, OutboundEvent, RoomEvent, RoomId, RoomSnapshot, RoomStatus, SeatPublic, UserId,
};

/// Upper bound on consecutive autopilot actions in one pass.
const AUTOPILOT_STEP_LIMIT: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub user_id: UserId,
    pub display_name: String,
    pub ready: bool,
    pub connected: bool,
    /// Seat is played by the autopilot.
    pub abandoned: bool,
}

impl Player {
    fn new(user_id: &str, display_name: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            display_name: display_name.trim().to_string(),
            ready: false,
            connected: true,
            abandoned: false,
        }
    }
}

/// Per-room timing and bidding settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoomSettings {
    pub turn_timeout: Option<Duration>,
    pub abandon_timeout: Duration,
    pub max_redeals: u8,
}

impl From<&EngineConfig> for RoomSettings {
    fn from(cfg: &EngineConfig) -> Self {
        Self {
            turn_timeout: cfg.turn_timeout,
            abandon_timeout: cfg.abandon_timeout,
            max_redeals: cfg.max_redeals,
        }
    }
}

impl Default for RoomSettings {
    fn default() -> Self {
        Self::from(&EngineConfig::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct TurnTimer {
    seat: Seat,
    deadline: Instant,
}

/// A room that failed its integrity check and was forced back to WAITING.
#[derive(Debug, Clone)]
pub struct IntegrityReset {
    pub reason: String,
    /// Events describing the reset, for the whole room.
    pub events: Vec<OutboundEvent>,
}

impl IntegrityReset {
    pub fn to_error(&self) -> DomainError {
        DomainError::infra(InfraErrorKind::RoomInconsistent, self.reason.clone())
    }
}

#[derive(Debug, Clone)]
pub struct Room {
    id: RoomId,
    status: RoomStatus,
    seats: [Option<Player>; PLAYERS],
    game: Option<GameState>,
    last_result: Option<GameOutcome>,
    rng_seed: u64,
    games_played: u32,
    turn_timer: Option<TurnTimer>,
    abandon_deadlines: [Option<Instant>; PLAYERS],
    settings: RoomSettings,
    /// Someone has sat down at least once.
    hosted: bool,
    /// Detached from the arena; late commands must not land here.
    closed: bool,
}

fn game_of(game: &mut Option<GameState>) -> Result<&mut GameState, DomainError> {
    game.as_mut().ok_or_else(|| {
        DomainError::validation(ValidationKind::GameNotStarted, "No game in progress")
    })
}

/// One private `cards_dealt` per seated user.
fn dealt_events(
    room_id: RoomId,
    seats: &[Option<Player>; PLAYERS],
    game: &GameState,
) -> Vec<OutboundEvent> {
    seats
        .iter()
        .enumerate()
        .filter_map(|(i, p)| {
            p.as_ref().map(|p| {
                let hand = game.hand(i as Seat).to_vec();
                OutboundEvent::to_user(
                    p.user_id.clone(),
                    RoomEvent::CardsDealt {
                        room_id,
                        seat: i as Seat,
                        hand_size: hand.len(),
                        hand,
                        bottom_visible_to_landlord: true,
                    },
                )
            })
        })
        .collect()
}

fn landlord_events(room_id: RoomId, game: &GameState, seat: Seat, forced: bool) -> Vec<OutboundEvent> {
    vec![
        OutboundEvent::to_room(room_id, RoomEvent::LandlordSelected { room_id, seat, forced }),
        OutboundEvent::to_room(
            room_id,
            RoomEvent::BottomCardsRevealed {
                room_id,
                seat,
                cards: game.bottom.clone(),
            },
        ),
        OutboundEvent::to_room(room_id, RoomEvent::TurnChanged { room_id, seat }),
    ]
}

impl Room {
    pub fn new(id: RoomId, rng_seed: u64, settings: RoomSettings) -> Self {
        Self {
            id,
            status: RoomStatus::Waiting,
            seats: Default::default(),
            game: None,
            last_result: None,
            rng_seed,
            games_played: 0,
            turn_timer: None,
            abandon_deadlines: [None; PLAYERS],
            settings,
            hosted: false,
            closed: false,
        }
    }

    pub fn id(&self) -> RoomId {
        self.id
    }

    pub fn status(&self) -> RoomStatus {
        self.status
    }

    pub fn game(&self) -> Option<&GameState> {
        self.game.as_ref()
    }

    pub fn last_result(&self) -> Option<&GameOutcome> {
        self.last_result.as_ref()
    }

    pub fn games_played(&self) -> u32 {
        self.games_played
    }

    pub fn player(&self, seat: Seat) -> Option<&Player> {
        self.seats.get(seat as usize).and_then(Option::as_ref)
    }

    pub fn seat_of(&self, user_id: &str) -> Option<Seat> {
        self.seats
            .iter()
            .position(|p| p.as_ref().is_some_and(|p| p.user_id == user_id))
            .map(|i| i as Seat)
    }

    pub fn occupied(&self) -> usize {
        self.seats.iter().flatten().count()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied() == 0
    }

    pub fn has_hosted(&self) -> bool {
        self.hosted
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Called by the arena while it removes the room.
    pub(crate) fn close(&mut self) {
        self.closed = true;
    }

    /// Seat and deadline of the running turn timer.
    pub fn turn_deadline(&self) -> Option<(Seat, Instant)> {
        self.turn_timer.map(|t| (t.seat, t.deadline))
    }

    pub fn abandon_deadline(&self, seat: Seat) -> Option<Instant> {
        self.abandon_deadlines.get(seat as usize).copied().flatten()
    }

    fn event(&self, event: RoomEvent) -> OutboundEvent {
        OutboundEvent::to_room(self.id, event)
    }

    fn require_seat(&self, user_id: &str) -> Result<Seat, DomainError> {
        self.seat_of(user_id).ok_or_else(|| {
            DomainError::not_found(
                NotFoundKind::Player,
                format!("User {user_id} has no seat in room {}", self.id),
            )
        })
    }

    fn require_waiting(&self) -> Result<(), DomainError> {
        if self.status != RoomStatus::Waiting {
            return Err(DomainError::validation(
                ValidationKind::GameAlreadyStarted,
                format!("Room {} is not waiting for players", self.id),
            ));
        }
        Ok(())
    }

    /// Seat of a user allowed to act in the running game.
    fn acting_seat(&self, user_id: &str) -> Result<Seat, DomainError> {
        let seat = self.require_seat(user_id)?;
        if self.status != RoomStatus::Playing {
            return Err(DomainError::validation(
                ValidationKind::GameNotStarted,
                format!("Room {} has no game in progress", self.id),
            ));
        }
        if self.player(seat).is_some_and(|p| p.abandoned) {
            return Err(DomainError::not_found(
                NotFoundKind::Player,
                format!("Seat {seat} was abandoned"),
            ));
        }
        Ok(seat)
    }

    /// Dispatch a room command issued by `user_id`.
    pub fn apply(
        &mut self,
        user_id: &str,
        cmd: &Command,
        now: Instant,
    ) -> Result<Vec<OutboundEvent>, DomainError> {
        if self.closed {
            return Err(DomainError::not_found(
                NotFoundKind::Room,
                format!("Room {} was closed", self.id),
            ));
        }
        match cmd {
            Command::CreateRoom => Err(DomainError::validation_other(
                "create_room does not target an existing room",
            )),
            Command::JoinRoom { display_name, .. } => self.join(user_id, display_name),
            Command::SetReady { ready, .. } => self.set_ready(user_id, *ready),
            Command::StartGame { .. } => {
                self.require_seat(user_id)?;
                self.start(now)
            }
            Command::GrabLandlord { .. } => self.grab(user_id, now),
            Command::PlayCards { cards, .. } => self.play(user_id, cards, now),
            Command::PassTurn { .. } => self.pass(user_id, now),
            Command::LeaveRoom { .. } => self.leave(user_id, now),
            Command::Rematch { .. } => {
                self.require_seat(user_id)?;
                self.rematch()
            }
        }
    }

    pub fn join(
        &mut self,
        user_id: &str,
        display_name: &str,
    ) -> Result<Vec<OutboundEvent>, DomainError> {
        self.require_waiting()?;
        if self.seat_of(user_id).is_some() {
            return Err(DomainError::conflict(
                ConflictKind::AlreadyInRoom,
                format!("User {user_id} already sits in room {}", self.id),
            ));
        }
        let seat = self
            .seats
            .iter()
            .position(Option::is_none)
            .ok_or_else(|| DomainError::conflict(ConflictKind::RoomFull, "All seats are taken"))?;
        if display_name.trim().is_empty() {
            return Err(DomainError::validation_other("Display name must not be empty"));
        }

        let player = Player::new(user_id, display_name);
        let event = RoomEvent::RoomJoined {
            room_id: self.id,
            seat: seat as Seat,
            user_id: player.user_id.clone(),
            display_name: player.display_name.clone(),
        };
        self.seats[seat] = Some(player);
        self.hosted = true;
        info!(room_id = self.id, seat, user_id = %user_id, "[ROOM] player joined");
        Ok(vec![self.event(event)])
    }

    fn free_seat(&mut self, seat: Seat) -> Option<Player> {
        self.abandon_deadlines[seat as usize] = None;
        self.seats[seat as usize].take()
    }

    /// Leave the room. Outside a game the seat is freed; during a game it is
    /// handed to the autopilot, except for the landlord who may not leave.
    pub fn leave(&mut self, user_id: &str, now: Instant) -> Result<Vec<OutboundEvent>, DomainError> {
        let seat = self.require_seat(user_id)?;
        match self.status {
            RoomStatus::Waiting | RoomStatus::Finished => {
                self.free_seat(seat);
                info!(room_id = self.id, seat, user_id = %user_id, "[ROOM] player left");
                Ok(vec![self.event(RoomEvent::PlayerLeft {
                    room_id: self.id,
                    seat,
                    user_id: user_id.to_string(),
                    abandoned: false,
                })])
            }
            RoomStatus::Playing => {
                if self.game.as_ref().and_then(|g| g.landlord) == Some(seat) {
                    return Err(DomainError::conflict(
                        ConflictKind::LandlordCannotLeave,
                        "The landlord cannot leave a game in progress",
                    ));
                }
                if let Some(p) = self.seats[seat as usize].as_mut() {
                    p.abandoned = true;
                    p.connected = false;
                }
                self.abandon_deadlines[seat as usize] = None;
                info!(room_id = self.id, seat, user_id = %user_id, "[ROOM] seat abandoned mid-game");
                let mut events = vec![self.event(RoomEvent::PlayerLeft {
                    room_id: self.id,
                    seat,
                    user_id: user_id.to_string(),
                    abandoned: true,
                })];
                self.after_action(now, &mut events);
                Ok(events)
            }
        }
    }

    pub fn set_ready(&mut self, user_id: &str, ready: bool) -> Result<Vec<OutboundEvent>, DomainError> {
        let seat = self.require_seat(user_id)?;
        self.require_waiting()?;
        if let Some(p) = self.seats[seat as usize].as_mut() {
            p.ready = ready;
        }
        debug!(room_id = self.id, seat, ready, "[ROOM] ready changed");
        Ok(vec![self.event(RoomEvent::ReadyChanged {
            room_id: self.id,
            seat,
            ready,
        })])
    }

    /// Deal and open bidding. Seat 0 is asked first.
    pub fn start(&mut self, now: Instant) -> Result<Vec<OutboundEvent>, DomainError> {
        self.require_waiting()?;
        let players: Vec<&Player> = self.seats.iter().flatten().collect();
        if players.len() != PLAYERS || players.iter().any(|p| !p.ready) {
            return Err(DomainError::validation(
                ValidationKind::PlayersNotReady,
                "Three ready players are required",
            ));
        }
        let names: HashSet<&str> = players.iter().map(|p| p.display_name.as_str()).collect();
        if names.len() != PLAYERS {
            return Err(DomainError::conflict(
                ConflictKind::DuplicateName,
                "Display names must be unique",
            ));
        }

        let game = GameState::new(self.rng_seed, self.games_played, 0);
        let mut events = dealt_events(self.id, &self.seats, &game);
        events.push(self.event(RoomEvent::TurnChanged {
            room_id: self.id,
            seat: 0,
        }));
        info!(
            room_id = self.id,
            game_no = self.games_played,
            deal_seed = game.deal_seed(),
            "[ROOM] game started"
        );
        self.game = Some(game);
        self.status = RoomStatus::Playing;
        self.last_result = None;
        self.after_action(now, &mut events);
        Ok(events)
    }

    pub fn grab(&mut self, user_id: &str, now: Instant) -> Result<Vec<OutboundEvent>, DomainError> {
        let seat = self.acting_seat(user_id)?;
        let mut events = self.grab_seat(seat)?;
        self.after_action(now, &mut events);
        Ok(events)
    }

    /// Pass: declines the landlord role during bidding, passes on the trick
    /// afterwards.
    pub fn pass(&mut self, user_id: &str, now: Instant) -> Result<Vec<OutboundEvent>, DomainError> {
        let seat = self.acting_seat(user_id)?;
        let mut events = self.pass_seat(seat)?;
        self.after_action(now, &mut events);
        Ok(events)
    }

    pub fn play(
        &mut self,
        user_id: &str,
        cards: &[Card],
        now: Instant,
    ) -> Result<Vec<OutboundEvent>, DomainError> {
        let seat = self.acting_seat(user_id)?;
        let mut events = self.play_seat(seat, cards)?;
        self.after_action(now, &mut events);
        Ok(events)
    }

    /// Back to WAITING after a finished game. Abandoned seats are freed and
    /// every ready flag is cleared.
    pub fn rematch(&mut self) -> Result<Vec<OutboundEvent>, DomainError> {
        if self.status != RoomStatus::Finished {
            return Err(DomainError::validation(
                ValidationKind::GameNotFinished,
                format!("Room {} has not finished a game", self.id),
            ));
        }
        let mut events = Vec::new();
        self.release_seats(&mut events);
        self.game = None;
        self.turn_timer = None;
        self.status = RoomStatus::Waiting;
        info!(room_id = self.id, "[ROOM] rematch");
        Ok(events)
    }

    /// Free every seat the autopilot was holding.
    fn release_abandoned(&mut self, events: &mut Vec<OutboundEvent>) {
        for seat in 0..PLAYERS as Seat {
            if !self.player(seat).is_some_and(|p| p.abandoned) {
                continue;
            }
            if let Some(p) = self.free_seat(seat) {
                info!(room_id = self.id, seat, user_id = %p.user_id, "[ROOM] abandoned seat released");
                events.push(self.event(RoomEvent::PlayerLeft {
                    room_id: self.id,
                    seat,
                    user_id: p.user_id,
                    abandoned: false,
                }));
            }
        }
    }

    /// Free abandoned seats and clear ready flags on the rest.
    fn release_seats(&mut self, events: &mut Vec<OutboundEvent>) {
        self.release_abandoned(events);
        for seat in 0..PLAYERS as Seat {
            if let Some(p) = self.seats[seat as usize].as_mut() {
                p.ready = false;
                events.push(OutboundEvent::to_room(
                    self.id,
                    RoomEvent::ReadyChanged {
                        room_id: self.id,
                        seat,
                        ready: false,
                    },
                ));
            }
        }
    }

    fn grab_seat(&mut self, seat: Seat) -> Result<Vec<OutboundEvent>, DomainError> {
        let room_id = self.id;
        let game = game_of(&mut self.game)?;
        grab_landlord(game, seat)?;
        info!(room_id, seat, "[ROOM] landlord grabbed");
        Ok(landlord_events(room_id, game, seat, false))
    }

    fn decline_seat(&mut self, seat: Seat) -> Result<Vec<OutboundEvent>, DomainError> {
        let room_id = self.id;
        let max_redeals = self.settings.max_redeals;
        let game = game_of(&mut self.game)?;
        let outcome = decline_landlord(game, seat, max_redeals)?;

        let mut events = vec![OutboundEvent::to_room(
            room_id,
            RoomEvent::LandlordDeclined { room_id, seat },
        )];
        match outcome {
            BidOutcome::Declined { next, .. } => {
                events.push(OutboundEvent::to_room(
                    room_id,
                    RoomEvent::TurnChanged { room_id, seat: next },
                ));
            }
            BidOutcome::Redeal {
                redeal_no,
                first_bidder,
            } => {
                info!(room_id, redeal_no, first_bidder, "[ROOM] all declined, redealing");
                events.extend(dealt_events(room_id, &self.seats, game));
                events.push(OutboundEvent::to_room(
                    room_id,
                    RoomEvent::TurnChanged {
                        room_id,
                        seat: first_bidder,
                    },
                ));
            }
            BidOutcome::LandlordChosen { seat, forced } => {
                info!(room_id, seat, forced, "[ROOM] landlord appointed");
                events.extend(landlord_events(room_id, game, seat, forced));
            }
        }
        Ok(events)
    }

    fn pass_seat(&mut self, seat: Seat) -> Result<Vec<OutboundEvent>, DomainError> {
        let room_id = self.id;
        let game = game_of(&mut self.game)?;
        if game.phase == Phase::Bidding {
            return self.decline_seat(seat);
        }
        let res = pass_turn(game, seat)?;
        debug!(room_id, seat, trick_closed = res.trick_closed, "[ROOM] pass");
        Ok(vec![
            OutboundEvent::to_room(
                room_id,
                RoomEvent::TurnPassed {
                    room_id,
                    seat,
                    trick_closed: res.trick_closed,
                },
            ),
            OutboundEvent::to_room(room_id, RoomEvent::TurnChanged { room_id, seat: res.next }),
        ])
    }

    fn play_seat(&mut self, seat: Seat, cards: &[Card]) -> Result<Vec<OutboundEvent>, DomainError> {
        let room_id = self.id;
        let game = game_of(&mut self.game)?;
        let res = play_cards(game, seat, cards)?;
        debug!(
            room_id,
            seat,
            kind = ?res.combination.kind,
            remaining = res.remaining,
            "[ROOM] cards played"
        );
        let mut events = vec![OutboundEvent::to_room(
            room_id,
            RoomEvent::CardsPlayed {
                room_id,
                seat,
                cards: res.combination.cards.clone(),
                combination_kind: res.combination.kind,
                remaining: res.remaining,
            },
        )];
        if res.finished {
            self.finish_game(&mut events);
        } else if let Some(next) = game.turn {
            events.push(OutboundEvent::to_room(
                room_id,
                RoomEvent::TurnChanged { room_id, seat: next },
            ));
        }
        Ok(events)
    }

    fn finish_game(&mut self, events: &mut Vec<OutboundEvent>) {
        let outcome = match self.game.as_ref().and_then(score_game) {
            Some(outcome) => outcome,
            None => {
                error!(room_id = self.id, "[ROOM] finished game could not be scored");
                return;
            }
        };
        info!(
            room_id = self.id,
            winner = outcome.winner_seat,
            landlord = outcome.landlord_seat,
            multiplier = outcome.multiplier,
            "[ROOM] game ended"
        );
        events.push(self.event(RoomEvent::GameEnded {
            room_id: self.id,
            winner_seat: outcome.winner_seat,
            landlord_seat: outcome.landlord_seat,
            landlord_won: outcome.landlord_won,
            multiplier: outcome.multiplier,
            score_delta: outcome.score_delta,
        }));
        self.status = RoomStatus::Finished;
        self.games_played += 1;
        self.last_result = Some(outcome);
        self.turn_timer = None;
        self.release_abandoned(events);
    }

    fn run_autopilot(&mut self, seat: Seat, action: AutoAction) -> Result<Vec<OutboundEvent>, DomainError> {
        match action {
            AutoAction::Decline => self.decline_seat(seat),
            AutoAction::Pass => self.pass_seat(seat),
            AutoAction::Play(cards) => self.play_seat(seat, &cards),
        }
    }

    /// Seat whose turn it is, when that seat is played by the autopilot.
    fn autopilot_seat(&self) -> Option<Seat> {
        if self.status != RoomStatus::Playing {
            return None;
        }
        let seat = self.game.as_ref()?.turn?;
        self.player(seat)
            .is_some_and(|p| p.abandoned)
            .then_some(seat)
    }

    /// Act for abandoned seats until a live seat is up. Returns whether any
    /// action was taken.
    fn drive_autopilot(&mut self, events: &mut Vec<OutboundEvent>) -> bool {
        let mut acted = false;
        for _ in 0..AUTOPILOT_STEP_LIMIT {
            let Some(seat) = self.autopilot_seat() else {
                return acted;
            };
            let Some(action) = self.game.as_ref().and_then(|g| autopilot_action(g, seat)) else {
                return acted;
            };
            match self.run_autopilot(seat, action) {
                Ok(evs) => {
                    events.extend(evs);
                    acted = true;
                }
                Err(err) => {
                    warn!(room_id = self.id, seat, error = %err, "[ROOM] autopilot action rejected");
                    return acted;
                }
            }
        }
        warn!(room_id = self.id, "[ROOM] autopilot step limit reached");
        acted
    }

    /// (Re)start the turn timer for whoever acts now. Replacing the timer is
    /// what cancels the previous seat's deadline.
    fn arm_turn_timer(&mut self, now: Instant) {
        self.turn_timer = match (self.status, self.settings.turn_timeout) {
            (RoomStatus::Playing, Some(timeout)) => self
                .game
                .as_ref()
                .and_then(|g| g.turn)
                .filter(|&seat| self.player(seat).is_some_and(|p| !p.abandoned))
                .map(|seat| TurnTimer {
                    seat,
                    deadline: now + timeout,
                }),
            _ => None,
        };
    }

    fn after_action(&mut self, now: Instant, events: &mut Vec<OutboundEvent>) {
        self.drive_autopilot(events);
        self.arm_turn_timer(now);
    }

    /// The user's connection dropped: start the abandonment clock.
    pub fn seat_disconnected(&mut self, user_id: &str, now: Instant) -> Vec<OutboundEvent> {
        let Some(seat) = self.seat_of(user_id) else {
            return Vec::new();
        };
        let deadline = now + self.settings.abandon_timeout;
        let abandoned = match self.seats[seat as usize].as_mut() {
            Some(p) => {
                p.connected = false;
                p.abandoned
            }
            None => return Vec::new(),
        };
        if !abandoned {
            self.abandon_deadlines[seat as usize] = Some(deadline);
        }
        info!(room_id = self.id, seat, user_id = %user_id, "[ROOM] seat disconnected");
        vec![self.event(RoomEvent::SeatConnection {
            room_id: self.id,
            seat,
            connected: false,
            abandoned,
        })]
    }

    /// The user is back: cancel the abandonment clock and return control of
    /// the seat.
    pub fn seat_reconnected(&mut self, user_id: &str, now: Instant) -> Vec<OutboundEvent> {
        let Some(seat) = self.seat_of(user_id) else {
            return Vec::new();
        };
        self.abandon_deadlines[seat as usize] = None;
        if let Some(p) = self.seats[seat as usize].as_mut() {
            p.connected = true;
            p.abandoned = false;
        }
        if self.turn_timer.is_none() {
            self.arm_turn_timer(now);
        }
        info!(room_id = self.id, seat, user_id = %user_id, "[ROOM] seat reconnected");
        vec![self.event(RoomEvent::SeatConnection {
            room_id: self.id,
            seat,
            connected: true,
            abandoned: false,
        })]
    }

    /// Fire every timer whose deadline is at or before `now`.
    pub fn expire_timers(&mut self, now: Instant) -> Vec<OutboundEvent> {
        let mut events = Vec::new();
        let mut acted = false;

        for seat in 0..PLAYERS as Seat {
            match self.abandon_deadlines[seat as usize] {
                Some(deadline) if deadline <= now => {}
                _ => continue,
            }
            self.abandon_deadlines[seat as usize] = None;
            if self.status == RoomStatus::Playing {
                if let Some(p) = self.seats[seat as usize].as_mut() {
                    p.abandoned = true;
                }
                info!(room_id = self.id, seat, "[ROOM] abandonment timeout, autopilot takes over");
                events.push(self.event(RoomEvent::SeatConnection {
                    room_id: self.id,
                    seat,
                    connected: false,
                    abandoned: true,
                }));
            } else if let Some(p) = self.free_seat(seat) {
                info!(room_id = self.id, seat, "[ROOM] abandonment timeout, seat freed");
                events.push(self.event(RoomEvent::PlayerLeft {
                    room_id: self.id,
                    seat,
                    user_id: p.user_id,
                    abandoned: false,
                }));
            }
        }

        if let Some(timer) = self.turn_timer.filter(|t| t.deadline <= now) {
            self.turn_timer = None;
            let current = self.game.as_ref().and_then(|g| g.turn);
            if self.status == RoomStatus::Playing && current == Some(timer.seat) {
                info!(room_id = self.id, seat = timer.seat, "[ROOM] turn timed out");
                events.push(self.event(RoomEvent::TurnTimedOut {
                    room_id: self.id,
                    seat: timer.seat,
                }));
                let action = self.game.as_ref().and_then(|g| autopilot_action(g, timer.seat));
                if let Some(action) = action {
                    match self.run_autopilot(timer.seat, action) {
                        Ok(evs) => {
                            events.extend(evs);
                            acted = true;
                        }
                        Err(err) => {
                            warn!(room_id = self.id, seat = timer.seat, error = %err, "[ROOM] timeout action rejected");
                        }
                    }
                }
            }
        }

        acted |= self.drive_autopilot(&mut events);
        if acted || self.turn_timer.is_none() {
            self.arm_turn_timer(now);
        }
        events
    }

    fn integrity_violation(&self) -> Option<String> {
        if self.status != RoomStatus::Playing {
            return None;
        }
        let filled = self.occupied();
        if filled != PLAYERS {
            return Some(format!("{filled} seats filled while playing"));
        }
        let Some(game) = self.game.as_ref() else {
            return Some("no game while playing".to_string());
        };
        if game.phase == Phase::Finished {
            return Some("finished game while playing".to_string());
        }
        match game.turn {
            Some(seat) if is_valid_seat(seat) => {}
            other => return Some(format!("invalid turn {other:?}")),
        }
        let cards = game.cards_accounted();
        let unique: HashSet<&Card> = cards.iter().collect();
        if cards.len() != DECK_SIZE || unique.len() != DECK_SIZE {
            return Some(format!(
                "{} cards ({} unique) accounted for",
                cards.len(),
                unique.len()
            ));
        }
        None
    }

    /// Check a playing room and force it back to WAITING when it is broken.
    pub fn repair_if_inconsistent(&mut self) -> Option<IntegrityReset> {
        let reason = self.integrity_violation()?;
        error!(room_id = self.id, reason = %reason, "[ROOM] integrity check failed, resetting");

        let mut events = vec![self.event(RoomEvent::RoomReset {
            room_id: self.id,
            reason: reason.clone(),
        })];
        self.release_seats(&mut events);
        self.game = None;
        self.turn_timer = None;
        self.status = RoomStatus::Waiting;
        Some(IntegrityReset { reason, events })
    }

    /// Room as seen by `viewer` (or a spectator when `None`).
    pub fn snapshot_for(&self, viewer: Option<&str>, now: Instant) -> RoomSnapshot {
        let viewer_seat = viewer.and_then(|u| self.seat_of(u));
        let seats = (0..PLAYERS as Seat)
            .map(|seat| match self.player(seat) {
                Some(p) => SeatPublic {
                    seat,
                    user_id: Some(p.user_id.clone()),
                    display_name: Some(p.display_name.clone()),
                    ready: p.ready,
                    connected: p.connected,
                    abandoned: p.abandoned,
                },
                None => SeatPublic::empty(seat),
            })
            .collect();
        RoomSnapshot {
            room_id: self.id,
            status: self.status,
            seats,
            viewer_seat,
            game: self.game.as_ref().map(|g| GameView::for_seat(g, viewer_seat)),
            turn_remaining_ms: self
                .turn_timer
                .map(|t| t.deadline.saturating_duration_since(now).as_millis() as u64),
            last_result: self.last_result.clone(),
            games_played: self.games_played,
        }
    }
}
