//! Property tests for turn rotation (pure domain).
//!
//! Properties tested:
//! - After k legal marks the head is the (k mod n)-th player in join order
//! - The turn queue stays a permutation of the roster while in progress
//! - Marks by anyone but the head never change the grid or the queue

use std::time::Instant;

use proptest::prelude::*;

use crate::config::GameOptions;
use crate::domain::ids::{ConnId, GameId, PlayerId};
use crate::domain::session::{Session, SessionState};
use crate::domain::test_prelude;
use crate::domain::test_sinks::RecordingSink;
use crate::errors::GameError;

/// Large board with a run nobody reaches in the generated move counts.
fn started_session(players: usize) -> (Session, Vec<PlayerId>) {
    let options = GameOptions {
        board_size: Some(10),
        win_run_length: 10,
        max_players: players,
        min_players: 2,
    };
    let mut session = Session::new(GameId::new(), options, Instant::now());
    let ids = (0..players)
        .map(|i| {
            session
                .add_player(&format!("p{i}"), ConnId::new(), RecordingSink::default().boxed())
                .unwrap()
        })
        .collect();
    (session, ids)
}

fn same_members(queue: &[PlayerId], roster: &[PlayerId]) -> bool {
    let mut a = queue.to_vec();
    let mut b = roster.to_vec();
    a.sort();
    b.sort();
    a == b
}

proptest! {
    #![proptest_config(test_prelude::proptest_config())]

    #[test]
    fn prop_turns_cycle_in_join_order(players in 2usize..6, moves in 0usize..60) {
        let (mut session, ids) = started_session(players);
        prop_assert_eq!(session.state(), SessionState::InProgress);

        for field in 0..moves {
            let head = session.current_turn().unwrap();
            session.mark(field as i64, head).unwrap();
            prop_assert!(same_members(&session.turn_order(), &ids));
        }
        prop_assert_eq!(session.current_turn(), Some(ids[moves % players]));
    }

    #[test]
    fn prop_out_of_turn_marks_are_inert(
        players in 2usize..6,
        seat in 0usize..5,
        field in 0i64..100,
    ) {
        let (mut session, ids) = started_session(players);
        let intruder = ids[1 + seat % (players - 1)];
        let queue_before = session.turn_order();

        let err = session.mark(field, intruder).unwrap_err();

        prop_assert_eq!(err, GameError::NotYourTurn { current: ids[0] });
        prop_assert_eq!(session.turn_order(), queue_before);
        prop_assert_eq!(session.grid().empty_cells(), 100);
    }
}
