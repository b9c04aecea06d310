use super::*;
use crate::game::board::Pos;
use crate::game::session::Seat;
use crate::protocol::ErrorCode;

fn finished_session() -> GameSession {
    let mut creator = Seat::new(Uuid::new_v4(), Some("ident-one".into()), "ann".into(), "cat".into(), RatingRecord::default());
    creator.rating.rating = 1620.0;
    let joiner = Seat::new(Uuid::new_v4(), None, "bob".into(), "owl".into(), RatingRecord::default());
    let mut s = GameSession::new(
        "code42".into(),
        creator,
        TimeControl { duration: 3, increment: 2 },
        BoardSettings::default(),
        false,
        Side::One,
    )
    .unwrap();
    s.join(joiner).unwrap();
    s.commit_move(Side::One, vec![Action::Ground(Pos::new(0, 2))], None)
        .unwrap();
    s.commit_move(Side::Two, vec![Action::Wall(Pos::new(1, 0))], None)
        .unwrap();
    s.resign(Side::Two).unwrap();
    s
}

#[tokio::test]
async fn null_store_is_always_unavailable() {
    let store = NullStore;
    assert!(matches!(store.get_pseudo_player("abcd").await, Err(StoreError::Unavailable)));
    assert!(matches!(store.get_ranking(10).await, Err(StoreError::Unavailable)));
    assert!(matches!(store.get_random_game().await, Err(StoreError::Unavailable)));
    assert!(matches!(
        store
            .save_pseudo_player("abcd", "ann", RatingRecord::default())
            .await,
        Err(StoreError::Unavailable)
    ));
    assert!(matches!(
        store
            .add_pseudo_player_solved_puzzle("abcd", "ann", "p1")
            .await,
        Err(StoreError::Unavailable)
    ));
}

#[test]
fn stored_game_snapshots_session() {
    let session = finished_session();
    let game = StoredGame::from_session(&session);
    assert_eq!(game.join_code, "code42");
    assert_eq!(game.moves.len(), 2);
    assert_eq!(game.moves[1], vec![Action::Wall(Pos::new(1, 0))]);
    assert_eq!(game.winner, Winner::Side1);
    assert_eq!(game.finish_reason, Some(FinishReason::Resign));
    assert_eq!(game.players[0].identity.as_deref(), Some("ident-one"));
    assert_eq!(game.players[1].identity, None);
    assert!((game.players[0].rating.rating - 1620.0).abs() < f64::EPSILON);
}

#[test]
fn stored_game_json_omits_identities() {
    let game = StoredGame::from_session(&finished_session());
    let json = serde_json::to_string(&game).unwrap();
    assert!(!json.contains("ident-one"));
    assert!(json.contains("\"finishReason\":\"resign\""));

    let restored: StoredGame = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.players[0].identity, None);
    assert_eq!(restored.moves, game.moves);
}

#[test]
fn store_errors_are_retryable() {
    assert_eq!(StoreError::Unavailable.error_code(), "E_STORE_UNAVAILABLE");
    assert!(StoreError::Unavailable.retryable());
}
