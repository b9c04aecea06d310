use std::sync::Arc;

use super::*;
use crate::game::board::{BoardSettings, Pos};
use crate::game::legality::Action;
use crate::game::session::{GameSession, Seat, TimeControl};
use crate::state::test_helpers::{MemoryStore, connect_client, drain, test_app_state, test_app_state_with_store};

/// Seat a two-player game with clocks running and add it to the directory.
async fn running_game(state: &AppState, identities: [Option<&str>; 2]) -> [Uuid; 2] {
    let sockets = [Uuid::new_v4(), Uuid::new_v4()];
    let seat = |i: usize| {
        Seat::new(
            sockets[i],
            identities[i].map(str::to_string),
            format!("p{i}"),
            "cat".into(),
            RatingRecord::default(),
        )
    };
    let mut s = GameSession::new(
        "fin001".into(),
        seat(0),
        TimeControl { duration: 5, increment: 0 },
        BoardSettings::default(),
        false,
        Side::One,
    )
    .unwrap();
    s.join(seat(1)).unwrap();
    s.commit_move(Side::One, vec![Action::Ground(Pos::new(0, 2))], None)
        .unwrap();
    s.commit_move(Side::Two, vec![Action::Ground(Pos::new(0, 10))], None)
        .unwrap();
    let mut dir = state.directory.lock().await;
    dir.add_unjoined(s);
    dir.move_game_from_unjoined_to_ongoing("fin001").unwrap();
    sockets
}

async fn resign(state: &AppState, side: Side) {
    state
        .directory
        .lock()
        .await
        .find_ongoing_by_code_mut("fin001")
        .unwrap()
        .resign(side)
        .unwrap();
}

#[tokio::test]
async fn unfinished_game_is_not_finalized() {
    let state = test_app_state();
    running_game(&state, [None, None]).await;
    assert!(finalize_game(&state, "fin001").await.is_none());
    assert!(finalize_game(&state, "missing").await.is_none());
}

#[tokio::test]
async fn rated_game_updates_store_and_seats() {
    let store = Arc::new(MemoryStore::default());
    let state = test_app_state_with_store(store.clone());
    running_game(&state, [Some("user-1"), Some("user-2")]).await;
    resign(&state, Side::Two).await;

    let report = finalize_game(&state, "fin001").await.unwrap();
    assert!(report.rated);
    assert!(report.new_ratings[0].rating > 1500.0);
    assert!(report.new_ratings[1].rating < 1500.0);

    assert_eq!(store.games.lock().unwrap().len(), 1);
    assert_eq!(store.rating_of("user-1"), Some(report.new_ratings[0]));
    assert_eq!(store.rating_of("user-2"), Some(report.new_ratings[1]));

    let dir = state.directory.lock().await;
    let s = dir.find_ongoing_by_code("fin001").unwrap();
    assert_eq!(s.seat(Side::One).unwrap().rating, report.new_ratings[0]);
    assert!(!s.is_finalizing());
}

#[tokio::test]
async fn guest_game_is_stored_but_unrated() {
    let store = Arc::new(MemoryStore::default());
    let state = test_app_state_with_store(store.clone());
    running_game(&state, [Some("user-1"), None]).await;
    resign(&state, Side::One).await;

    let report = finalize_game(&state, "fin001").await.unwrap();
    assert!(!report.rated);
    assert_eq!(report.new_ratings, report.old_ratings);
    assert_eq!(store.games.lock().unwrap().len(), 1);
    assert_eq!(store.rating_of("user-1"), None);
}

#[tokio::test]
async fn unavailable_store_still_notifies_both_seats() {
    let state = test_app_state();
    let sockets = running_game(&state, [Some("user-1"), Some("user-2")]).await;
    // Swap the seats' sockets for registered test clients.
    let (c1, mut rx1) = connect_client(&state).await;
    let (c2, mut rx2) = connect_client(&state).await;
    {
        let mut dir = state.directory.lock().await;
        let s = dir.find_ongoing_by_code_mut("fin001").unwrap();
        assert_eq!(s.seat(Side::One).unwrap().socket_id, sockets[0]);
        s.rebind_socket(Side::One, c1);
        s.rebind_socket(Side::Two, c2);
    }
    resign(&state, Side::Two).await;

    let report = finalize_game(&state, "fin001").await.unwrap();
    assert!(report.rated);

    for (rx, idx) in [(&mut rx1, 0), (&mut rx2, 1)] {
        let events = drain(rx);
        assert_eq!(events.len(), 1);
        match &events[0] {
            ServerEvent::NewRatingsNotification { client_idx, new_ratings, .. } => {
                assert_eq!(*client_idx, idx);
                assert_eq!(*new_ratings, report.new_ratings);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }
}

#[tokio::test]
async fn finalizes_only_once() {
    let state = test_app_state();
    running_game(&state, [None, None]).await;
    resign(&state, Side::One).await;
    {
        let mut dir = state.directory.lock().await;
        dir.find_ongoing_by_code_mut("fin001").unwrap().set_finalizing(true);
    }
    assert!(finalize_game(&state, "fin001").await.is_none());
}

#[test]
fn scores_follow_winner() {
    assert_eq!(score_for_side_one(Winner::Side1), Some(1.0));
    assert_eq!(score_for_side_one(Winner::Side2), Some(0.0));
    assert_eq!(score_for_side_one(Winner::Draw), Some(0.5));
    assert_eq!(score_for_side_one(Winner::None), None);
}
