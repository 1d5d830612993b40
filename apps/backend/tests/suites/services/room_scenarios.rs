//! End-to-end room scenarios driven through the public `Room` API.

use std::time::Instant;

use landlord_backend::domain::state::Phase;
use landlord_backend::domain::{parse_hand, Card, ComboKind, Rank};
use landlord_backend::protocol::{Audience, RoomEvent, RoomStatus};
use landlord_backend::services::Room;

use crate::support::room_helpers::{
    current_seat, play_out, ready_room, settings, started_room, USERS,
};

fn code(err: landlord_backend::DomainError) -> &'static str {
    err.code().as_str()
}

/// Alice (seat 0) grabs with a hand holding a pair of nines.
fn landlord_with_pair_of_nines(now: Instant) -> (Room, Vec<Card>) {
    for seed in 0..500u64 {
        let mut room = started_room(seed, now);
        room.grab("alice", now).unwrap();
        let nines: Vec<Card> = room
            .game()
            .unwrap()
            .hand(0)
            .iter()
            .filter(|c| c.rank == Rank::Nine)
            .take(2)
            .copied()
            .collect();
        if nines.len() == 2 {
            return (room, nines);
        }
    }
    panic!("no seed in range gives seat 0 a pair of nines");
}

#[test]
fn landlord_leads_pair_and_regains_lead_after_two_passes() {
    let now = Instant::now();
    let (mut room, nines) = landlord_with_pair_of_nines(now);

    let game = room.game().unwrap();
    assert_eq!(game.landlord, Some(0));
    assert_eq!(game.hand(0).len(), 20);
    assert_eq!(game.hand(1).len(), 17);
    assert_eq!(game.hand(2).len(), 17);

    let events = room.play("alice", &nines, now).unwrap();
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::CardsPlayed {
            seat: 0,
            combination_kind: ComboKind::Pair,
            remaining: 18,
            ..
        }
    )));
    assert_eq!(current_seat(&room), 1);

    room.pass("bob", now).unwrap();
    let events = room.pass("carol", now).unwrap();
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::TurnPassed {
            seat: 2,
            trick_closed: true,
            ..
        }
    )));

    let game = room.game().unwrap();
    assert_eq!(game.turn, Some(0));
    assert!(game.last_play().is_none());

    // Unconstrained lead: the lowest single is legal even below the nines.
    let lowest = vec![game.hand(0)[0]];
    room.play("alice", &lowest, now).unwrap();
    assert_eq!(current_seat(&room), 1);
}

#[test]
fn start_requires_three_ready_players_with_unique_names() {
    let now = Instant::now();
    let mut room = Room::new(1, 7, settings());
    room.join("alice", "Alice").unwrap();
    room.join("bob", "Bob").unwrap();
    assert_eq!(code(room.start(now).unwrap_err()), "PLAYERS_NOT_READY");

    room.join("carol", "Alice").unwrap();
    for user in USERS {
        room.set_ready(user, true).unwrap();
    }
    assert_eq!(code(room.start(now).unwrap_err()), "DUPLICATE_NAME");
    assert_eq!(room.status(), RoomStatus::Waiting);
}

#[test]
fn seating_rejections() {
    let now = Instant::now();
    let mut room = ready_room(3);
    assert_eq!(code(room.join("dave", "Dave").unwrap_err()), "ROOM_FULL");
    assert_eq!(code(room.join("alice", "Alice").unwrap_err()), "ALREADY_IN_ROOM");

    room.start(now).unwrap();
    room.leave("carol", now).unwrap();
    assert_eq!(
        code(room.join("dave", "Dave").unwrap_err()),
        "GAME_ALREADY_STARTED"
    );
    assert_eq!(code(room.set_ready("bob", false).unwrap_err()), "GAME_ALREADY_STARTED");
}

#[test]
fn bidding_rejections() {
    let now = Instant::now();
    let mut room = started_room(11, now);
    assert_eq!(code(room.grab("bob", now).unwrap_err()), "NOT_YOUR_TURN");

    let hand = room.game().unwrap().hand(0).to_vec();
    assert_eq!(
        code(room.play("alice", &hand[..1], now).unwrap_err()),
        "BIDDING_IN_PROGRESS"
    );

    room.grab("alice", now).unwrap();
    assert_eq!(code(room.grab("alice", now).unwrap_err()), "LANDLORD_ALREADY_SET");
}

#[test]
fn play_rejections_leave_room_unchanged() {
    let now = Instant::now();
    let mut room = started_room(5, now);
    room.grab("alice", now).unwrap();
    let before = room.game().unwrap().hand(0).to_vec();

    assert_eq!(code(room.pass("alice", now).unwrap_err()), "CANNOT_PASS_AS_LEADER");
    assert_eq!(code(room.play("alice", &[], now).unwrap_err()), "INVALID_COMBINATION");

    let foreign = room.game().unwrap().hand(1)[0];
    assert_eq!(code(room.play("alice", &[foreign], now).unwrap_err()), "CARDS_NOT_OWNED");
    assert_eq!(
        code(room.play("bob", &[foreign], now).unwrap_err()),
        "NOT_YOUR_TURN"
    );

    assert_eq!(room.game().unwrap().hand(0), before.as_slice());
    assert_eq!(room.game().unwrap().trick_history.len(), 0);
    assert!(room.repair_if_inconsistent().is_none());
}

#[test]
fn following_play_must_beat_and_match_shape() {
    let now = Instant::now();
    let mut room = started_room(21, now);
    room.grab("alice", now).unwrap();
    let game = room.game().unwrap();
    // Lead the landlord's highest single.
    let lead = game.hand(0)[game.hand(0).len() - 1];
    let bob_low = game.hand(1)[0];
    room.play("alice", &[lead], now).unwrap();

    if lead.rank > bob_low.rank {
        assert_eq!(
            code(room.play("bob", &[bob_low], now).unwrap_err()),
            "COMBINATION_TOO_SMALL"
        );
    }
    let game = room.game().unwrap();
    let pair: Option<Vec<Card>> = game
        .hand(1)
        .windows(2)
        .find(|w| w[0].rank == w[1].rank && !w[0].rank.is_joker())
        .map(|w| w.to_vec());
    if let Some(pair) = pair {
        assert_eq!(
            code(room.play("bob", &pair, now).unwrap_err()),
            "COMBINATION_TOO_SMALL"
        );
    }
}

#[test]
fn three_declines_redeal_then_force_after_limit() {
    let now = Instant::now();
    let mut room = started_room(2, now);

    room.pass("alice", now).unwrap();
    room.pass("bob", now).unwrap();
    let events = room.pass("carol", now).unwrap();
    // Fresh private hands plus the next round opening one seat further on.
    let dealt = events
        .iter()
        .filter(|e| matches!(e.event, RoomEvent::CardsDealt { .. }))
        .count();
    assert_eq!(dealt, 3);
    assert_eq!(current_seat(&room), 1);

    // Keep declining until the limit forces the opening seat.
    let mut forced = None;
    for _ in 0..20 {
        let seat = current_seat(&room);
        let events = room.pass(USERS[seat as usize], now).unwrap();
        if let Some(ev) = events.iter().find_map(|e| match e.event {
            RoomEvent::LandlordSelected { seat, forced, .. } => Some((seat, forced)),
            _ => None,
        }) {
            forced = Some(ev);
            break;
        }
    }
    let (seat, was_forced) = forced.unwrap();
    assert!(was_forced);
    let game = room.game().unwrap();
    assert_eq!(game.landlord, Some(seat));
    assert_eq!(game.phase, Phase::Tricks);
    assert_eq!(game.bidding.redeals, settings().max_redeals);
    assert_eq!(game.hand(seat).len(), 20);
}

#[test]
fn landlord_cannot_leave_but_farmer_is_autopiloted() {
    let now = Instant::now();
    let mut room = started_room(9, now);
    room.grab("alice", now).unwrap();
    assert_eq!(code(room.leave("alice", now).unwrap_err()), "LANDLORD_CANNOT_LEAVE");

    let events = room.leave("bob", now).unwrap();
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::PlayerLeft {
            abandoned: true,
            ..
        }
    )));
    assert!(room.player(1).unwrap().abandoned);
    assert_eq!(code(room.pass("bob", now).unwrap_err()), "PLAYER_NOT_IN_ROOM");

    // Alice leads; the autopilot answers for bob and hands the turn to carol.
    let lead = vec![room.game().unwrap().hand(0)[0]];
    let events = room.play("alice", &lead, now).unwrap();
    assert!(events.iter().any(|e| matches!(
        e.event,
        RoomEvent::TurnPassed { seat: 1, .. } | RoomEvent::CardsPlayed { seat: 1, .. }
    )));
    assert_eq!(current_seat(&room), 2);
}

#[test]
fn full_game_scores_and_rematch_resets() {
    let now = Instant::now();
    let mut room = started_room(42, now);
    let events = play_out(&mut room, now);

    assert_eq!(room.status(), RoomStatus::Finished);
    assert_eq!(room.game().unwrap().phase, Phase::Finished);
    let ended = events
        .iter()
        .find_map(|e| match &e.event {
            RoomEvent::GameEnded { score_delta, landlord_won, multiplier, .. } => {
                Some((*score_delta, *landlord_won, *multiplier))
            }
            _ => None,
        })
        .unwrap();
    let (delta, landlord_won, multiplier) = ended;
    assert_eq!(delta.iter().sum::<i32>(), 0);
    assert_eq!(multiplier, 1);
    let landlord = room.game().unwrap().landlord.unwrap() as usize;
    let expected = if landlord_won { 2 } else { -2 };
    assert_eq!(delta[landlord], expected);
    assert_eq!(room.last_result().unwrap().score_delta, delta);

    assert_eq!(code(room.start(now).unwrap_err()), "GAME_ALREADY_STARTED");
    room.rematch().unwrap();
    assert_eq!(room.status(), RoomStatus::Waiting);
    assert_eq!(room.games_played(), 1);
    assert!((0..3).all(|s| !room.player(s).unwrap().ready));
    assert_eq!(code(room.rematch().unwrap_err()), "GAME_NOT_FINISHED");

    for user in USERS {
        room.set_ready(user, true).unwrap();
    }
    room.start(now).unwrap();
    assert_eq!(room.status(), RoomStatus::Playing);
}

#[test]
fn dealt_hands_are_private() {
    let now = Instant::now();
    let mut room = ready_room(8);
    let events = room.start(now).unwrap();
    for e in &events {
        if let RoomEvent::CardsDealt { seat, hand, .. } = &e.event {
            assert_eq!(e.audience, Audience::User(USERS[*seat as usize].into()));
            assert_eq!(hand.len(), 17);
        }
    }

    let snap = room.snapshot_for(Some("bob"), now);
    let view = snap.game.unwrap();
    assert_eq!(view.hand.len(), 17);
    assert!(view.bottom.is_none());
    let spectator = room.snapshot_for(None, now).game.unwrap();
    assert!(spectator.hand.is_empty());
}

#[test]
fn card_tokens_parse_into_playable_cards() {
    let cards = parse_hand("9C 9D").unwrap();
    assert_eq!(cards.len(), 2);
    assert!(cards.iter().all(|c| c.rank == Rank::Nine));
}
