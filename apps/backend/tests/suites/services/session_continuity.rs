//! Connection loss and recovery through the command layer.

use std::time::{Duration, Instant};

use landlord_backend::config::EngineConfig;
use landlord_backend::domain::state::Phase;
use landlord_backend::protocol::{Audience, Command, ConnectionId, OutboundEvent, RoomEvent, RoomId};
use landlord_backend::services::GameFlowService;
use uuid::Uuid;

use crate::support::room_helpers::{drive_to_end, error_codes, NAMES, USERS};

struct Table {
    flow: GameFlowService,
    conns: [ConnectionId; 3],
    room_id: RoomId,
    now: Instant,
}

impl Table {
    fn send(&self, seat: usize, cmd: Command) -> Vec<OutboundEvent> {
        self.flow.handle(self.conns[seat], cmd, self.now).unwrap()
    }
}

/// Three connected users seated and ready in one room, game started.
fn started_table(cfg: EngineConfig) -> Table {
    let flow = GameFlowService::from_config(&cfg);
    let now = Instant::now();
    let conns = [Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4()];
    for (user, conn) in USERS.iter().zip(conns) {
        flow.connect(user, conn, None, now).unwrap();
    }
    let room_id = flow.rooms().create_room_with_seed(77);
    let table = Table {
        flow,
        conns,
        room_id,
        now,
    };
    for seat in 0..3 {
        let joined = table.send(
            seat,
            Command::JoinRoom {
                room_id,
                user_id: USERS[seat].into(),
                display_name: NAMES[seat].into(),
            },
        );
        assert!(error_codes(&joined).is_empty());
        table.send(
            seat,
            Command::SetReady {
                room_id,
                user_id: USERS[seat].into(),
                ready: true,
            },
        );
    }
    let started = table.send(0, Command::StartGame { room_id });
    assert!(error_codes(&started).is_empty());
    table
}

fn cfg() -> EngineConfig {
    EngineConfig {
        turn_timeout: Some(Duration::from_secs(30)),
        abandon_timeout: Duration::from_secs(60),
        ..EngineConfig::default()
    }
}

fn untimed_cfg() -> EngineConfig {
    EngineConfig {
        turn_timeout: None,
        ..cfg()
    }
}

#[test]
fn start_sends_each_player_only_their_hand() {
    let table = started_table(cfg());
    let snap = table.flow.snapshot(table.conns[1], table.now).unwrap();
    assert_eq!(snap.viewer_seat, Some(1));
    assert_eq!(snap.game.unwrap().hand.len(), 17);
    for seat in 0..3 {
        assert_eq!(table.flow.sessions().room_of(USERS[seat]), Some(table.room_id));
    }
}

#[test]
fn reconnect_within_grace_keeps_control() {
    let table = started_table(untimed_cfg());
    let events = table.flow.disconnect(table.conns[0], table.now);
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::SeatConnection {
            seat: 0,
            connected: false,
            abandoned: false,
            ..
        }
    )));

    let later = table.now + Duration::from_secs(20);
    let conn = Uuid::new_v4();
    let connected = table.flow.reconnect("alice", conn, None, later).unwrap();
    let snapshot = connected
        .events
        .iter()
        .find_map(|e| match &e.event {
            RoomEvent::Snapshot { snapshot } => Some((e.audience.clone(), snapshot.clone())),
            _ => None,
        })
        .unwrap();
    assert_eq!(snapshot.0, Audience::User("alice".into()));
    assert_eq!(snapshot.1.viewer_seat, Some(0));
    assert_eq!(snapshot.1.game.unwrap().hand.len(), 17);

    // Past the original abandonment deadline nothing fires.
    let events = table.flow.tick(table.now + Duration::from_secs(61));
    assert!(!events.iter().any(|e| matches!(
        e.event,
        RoomEvent::SeatConnection {
            abandoned: true,
            ..
        }
    )));
    let grabbed = table
        .flow
        .handle(
            conn,
            Command::GrabLandlord {
                room_id: table.room_id,
                user_id: "alice".into(),
            },
            later,
        )
        .unwrap();
    assert!(error_codes(&grabbed).is_empty());
}

#[test]
fn abandoned_seat_is_played_by_autopilot() {
    let table = started_table(untimed_cfg());
    table.flow.disconnect(table.conns[0], table.now);

    // Seat 0 opens bidding; once abandoned the autopilot declines for it.
    let events = table.flow.tick(table.now + Duration::from_secs(60));
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::SeatConnection {
            seat: 0,
            abandoned: true,
            ..
        }
    )));
    assert!(events
        .iter()
        .any(|e| matches!(e.event, RoomEvent::LandlordDeclined { seat: 0, .. })));

    let room = table.flow.rooms().get(table.room_id).unwrap();
    let turn = room.lock().game().and_then(|g| g.turn);
    assert_eq!(turn, Some(1));

    // Coming back returns control of the seat.
    let conn = Uuid::new_v4();
    table
        .flow
        .reconnect("alice", conn, None, table.now + Duration::from_secs(61))
        .unwrap();
    assert!(!room.lock().player(0).unwrap().abandoned);
}

#[test]
fn turn_timeout_acts_once_without_abandoning() {
    let table = started_table(cfg());
    let events = table.flow.tick(table.now + Duration::from_secs(30));
    assert!(events
        .iter()
        .any(|e| matches!(e.event, RoomEvent::TurnTimedOut { seat: 0, .. })));
    assert!(events
        .iter()
        .any(|e| matches!(e.event, RoomEvent::LandlordDeclined { seat: 0, .. })));

    let room = table.flow.rooms().get(table.room_id).unwrap();
    let guard = room.lock();
    assert_eq!(guard.game().unwrap().phase, Phase::Bidding);
    assert_eq!(guard.game().unwrap().turn, Some(1));
    assert!(!guard.player(0).unwrap().abandoned);
}

#[test]
fn navigation_token_moves_session_to_new_connection() {
    let table = started_table(cfg());
    let room = table.flow.rooms().get(table.room_id).unwrap();
    let before = room.lock().clone();
    let token = table
        .flow
        .issue_navigation_token(table.conns[2], table.now)
        .unwrap();

    let fresh = Uuid::new_v4();
    let err = table
        .flow
        .connect("carol", Uuid::new_v4(), None, table.now)
        .unwrap_err();
    assert_eq!(err.code().as_str(), "AUTH_CONFLICT");

    let connected = table
        .flow
        .connect("carol", fresh, Some(token), table.now)
        .unwrap();
    assert!(connected
        .events
        .iter()
        .any(|e| matches!(e.event, RoomEvent::Snapshot { .. })));
    assert!(table.flow.snapshot(table.conns[2], table.now).is_err());
    assert_eq!(
        table.flow.snapshot(fresh, table.now).unwrap().viewer_seat,
        Some(2)
    );

    // The handover leaves the room exactly as it was.
    let after = room.lock().clone();
    for seat in 0..3 {
        assert_eq!(after.player(seat), before.player(seat));
        assert_eq!(after.abandon_deadline(seat), None);
    }
    assert_eq!(after.status(), before.status());
    assert_eq!(after.turn_deadline(), before.turn_deadline());
    let (game_after, game_before) = (after.game().unwrap(), before.game().unwrap());
    assert_eq!(game_after.turn, game_before.turn);
    assert_eq!(game_after.hands, game_before.hands);

    // The retired connection no longer speaks for the seat.
    assert!(table.flow.disconnect(table.conns[2], table.now).is_empty());
    let guard = room.lock();
    assert_eq!(guard.abandon_deadline(2), None);
    assert!(guard.player(2).unwrap().connected);
}

#[test]
fn logout_then_sweep_forgets_session_but_not_seat() {
    let table = started_table(cfg());
    table.flow.logout(table.conns[1], table.now).unwrap();
    assert!(table
        .flow
        .handle(table.conns[1], Command::CreateRoom, table.now)
        .is_err());

    table.flow.tick(table.now + Duration::from_secs(1));
    let err = table
        .flow
        .reconnect("bob", Uuid::new_v4(), None, table.now)
        .unwrap_err();
    assert_eq!(err.code().as_str(), "SESSION_NOT_FOUND");

    // A fresh connect finds the seat again through the room binding.
    let conn = Uuid::new_v4();
    let connected = table.flow.connect("bob", conn, None, table.now).unwrap();
    assert!(connected
        .events
        .iter()
        .any(|e| matches!(e.event, RoomEvent::Snapshot { .. })));
}

#[test]
fn rejected_command_is_addressed_to_caller_only() {
    let table = started_table(cfg());
    let events = table.send(
        2,
        Command::PassTurn {
            room_id: table.room_id,
            user_id: "carol".into(),
        },
    );
    assert_eq!(error_codes(&events), vec!["NOT_YOUR_TURN"]);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].audience, Audience::User("carol".into()));
}

#[test]
fn seat_left_mid_game_is_released_when_game_ends() {
    let table = started_table(untimed_cfg());
    let room_id = table.room_id;
    let grabbed = table.send(
        0,
        Command::GrabLandlord {
            room_id,
            user_id: "alice".into(),
        },
    );
    assert!(error_codes(&grabbed).is_empty());
    let left = table.send(
        1,
        Command::LeaveRoom {
            room_id,
            user_id: "bob".into(),
        },
    );
    assert!(error_codes(&left).is_empty());
    assert_eq!(table.flow.sessions().room_of("bob"), Some(room_id));

    let events = drive_to_end(&table.flow, room_id, USERS, table.conns, table.now);
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::PlayerLeft {
            seat: 1,
            abandoned: false,
            ..
        }
    )));
    assert_eq!(table.flow.sessions().room_of("bob"), None);
    let room = table.flow.rooms().get(room_id).unwrap();
    assert!(room.lock().player(1).is_none());
    drop(room);

    for seat in [0, 2] {
        let out = table.send(
            seat,
            Command::LeaveRoom {
                room_id,
                user_id: USERS[seat].into(),
            },
        );
        assert!(error_codes(&out).is_empty());
    }
    assert!(table.flow.rooms().get(room_id).is_none());
    assert!(table.flow.rooms().is_empty());

    // Bob is free to sit down somewhere else.
    let created = table.send(1, Command::CreateRoom);
    let other = created
        .iter()
        .find_map(|e| match e.event {
            RoomEvent::RoomCreated { room_id } => Some(room_id),
            _ => None,
        })
        .unwrap();
    let joined = table.send(
        1,
        Command::JoinRoom {
            room_id: other,
            user_id: "bob".into(),
            display_name: "Bob".into(),
        },
    );
    assert!(error_codes(&joined).is_empty());
    assert_eq!(table.flow.sessions().room_of("bob"), Some(other));
}
