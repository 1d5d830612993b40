//! Shared services hammered from several threads at once.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Barrier};
use std::thread;
use std::time::{Duration, Instant};

use landlord_backend::config::EngineConfig;
use landlord_backend::domain::rules::DECK_SIZE;
use landlord_backend::domain::Card;
use landlord_backend::protocol::{Command, RoomStatus};
use landlord_backend::services::{GameFlowService, SessionRegistry};
use uuid::Uuid;

use crate::support::room_helpers::{drive_to_end, error_codes};

const TABLES: u64 = 6;

#[test]
fn rooms_played_in_parallel_stay_consistent() {
    let cfg = EngineConfig {
        turn_timeout: None,
        ..EngineConfig::default()
    };
    let flow = Arc::new(GameFlowService::from_config(&cfg));
    let now = Instant::now();
    let stop = Arc::new(AtomicBool::new(false));

    // Timer sweeps contend for the arena while tables play.
    let ticker = {
        let flow = Arc::clone(&flow);
        let stop = Arc::clone(&stop);
        thread::spawn(move || {
            while !stop.load(Ordering::Relaxed) {
                assert!(flow.tick(now).is_empty());
                thread::yield_now();
            }
        })
    };

    let tables: Vec<_> = (0..TABLES)
        .map(|t| {
            let flow = Arc::clone(&flow);
            thread::spawn(move || {
                let users = [0, 1, 2].map(|s| format!("t{t}-p{s}"));
                let conns = [(); 3].map(|_| Uuid::new_v4());
                for (user, conn) in users.iter().zip(conns) {
                    flow.connect(user, conn, None, now).unwrap();
                }
                let room_id = flow.rooms().create_room_with_seed(t);
                for seat in 0..3 {
                    let joined = flow
                        .handle(
                            conns[seat],
                            Command::JoinRoom {
                                room_id,
                                user_id: users[seat].clone(),
                                display_name: format!("P{seat}"),
                            },
                            now,
                        )
                        .unwrap();
                    assert!(error_codes(&joined).is_empty());
                    flow.handle(
                        conns[seat],
                        Command::SetReady {
                            room_id,
                            user_id: users[seat].clone(),
                            ready: true,
                        },
                        now,
                    )
                    .unwrap();
                }
                let started = flow
                    .handle(conns[0], Command::StartGame { room_id }, now)
                    .unwrap();
                assert!(error_codes(&started).is_empty());

                let names = [users[0].as_str(), users[1].as_str(), users[2].as_str()];
                drive_to_end(&flow, room_id, names, conns, now);
                (room_id, users)
            })
        })
        .collect();

    let finished: Vec<_> = tables.into_iter().map(|h| h.join().unwrap()).collect();
    stop.store(true, Ordering::Relaxed);
    ticker.join().unwrap();

    assert_eq!(flow.rooms().len(), TABLES as usize);
    for (room_id, users) in finished {
        let room = flow.rooms().get(room_id).unwrap();
        let room = room.lock();
        assert_eq!(room.status(), RoomStatus::Finished);

        let cards = room.game().unwrap().cards_accounted();
        let unique: HashSet<Card> = cards.iter().copied().collect();
        assert_eq!(cards.len(), DECK_SIZE);
        assert_eq!(unique.len(), DECK_SIZE);
        assert_eq!(room.last_result().unwrap().score_delta.iter().sum::<i32>(), 0);

        for user in &users {
            assert_eq!(flow.sessions().room_of(user), Some(room_id));
            assert!(flow.sessions().online_session(user).is_some());
        }
    }
}

#[test]
fn racing_attaches_leave_at_most_one_online_session() {
    let sessions = Arc::new(SessionRegistry::new(
        Duration::from_secs(300),
        Duration::from_secs(30),
    ));
    let now = Instant::now();
    let conns: Vec<Uuid> = (0..8).map(|_| Uuid::new_v4()).collect();
    let barrier = Arc::new(Barrier::new(conns.len()));

    let handles: Vec<_> = conns
        .iter()
        .copied()
        .map(|conn| {
            let sessions = Arc::clone(&sessions);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for round in 0..200 {
                    let attached = if round % 2 == 0 {
                        sessions.bind("dana", conn, None, now)
                    } else {
                        sessions.reconnect("dana", conn, None, now)
                    };
                    match attached {
                        Ok(session_id) => {
                            if round % 3 == 0 {
                                sessions.mark_offline(session_id, now).unwrap();
                            }
                        }
                        Err(e) => {
                            let code = e.code().as_str();
                            assert!(
                                code == "AUTH_CONFLICT" || code == "SESSION_NOT_FOUND",
                                "unexpected {code}"
                            );
                        }
                    }
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    let live: Vec<Uuid> = conns
        .iter()
        .copied()
        .filter(|c| sessions.resolve(*c).is_ok())
        .collect();
    assert!(live.len() <= 1, "several live connections: {live:?}");
    match sessions.online_session("dana") {
        Some(session) => assert_eq!(session.connection_id, live.first().copied()),
        None => assert!(live.is_empty()),
    }
}
