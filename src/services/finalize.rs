//! Finalization — persistence and rating updates when a game ends.
//!
//! DESIGN
//! ======
//! Runs once per finished game, with the caller holding the session's
//! command gate so no other command can touch the session meanwhile. The
//! directory lock is taken twice, briefly: once to mark the session as
//! finalizing and snapshot it, and once to write the new ratings back. All
//! store awaits happen with only the gate held.
//!
//! Ratings move only when both seats carry an identity; guest games are
//! stored but leave ratings untouched. Store failures are logged and
//! otherwise ignored, so a missing database never blocks a result.

use tracing::{info, warn};
use uuid::Uuid;

use crate::game::board::Side;
use crate::game::session::{Stage, Winner};
use crate::protocol::ServerEvent;
use crate::services::rating::RatingRecord;
use crate::services::store::StoredGame;
use crate::state::AppState;

/// What finalization did, for callers that log or test it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FinalizeReport {
    pub rated: bool,
    pub old_ratings: [RatingRecord; 2],
    pub new_ratings: [RatingRecord; 2],
}

/// Score for seat one, or `None` for a game with no result.
fn score_for_side_one(winner: Winner) -> Option<f64> {
    match winner {
        Winner::Side1 => Some(1.0),
        Winner::Side2 => Some(0.0),
        Winner::Draw => Some(0.5),
        Winner::None => None,
    }
}

/// Persist the finished session with `code`, update ratings, and notify
/// both seats. Returns `None` if there was nothing to finalize.
///
/// The caller must hold the session's gate.
pub async fn finalize_game(state: &AppState, code: &str) -> Option<FinalizeReport> {
    let (snapshot, identities, names) = {
        let mut dir = state.directory.lock().await;
        let session = dir.find_ongoing_by_code_mut(code)?;
        if session.stage() != Stage::Terminal || session.is_finalizing() {
            return None;
        }
        session.set_finalizing(true);
        let identities = Side::BOTH.map(|s| session.seat(s).and_then(|seat| seat.identity.clone()));
        let names = Side::BOTH.map(|s| session.seat(s).map(|seat| seat.name.clone()).unwrap_or_default());
        (StoredGame::from_session(session), identities, names)
    };

    let old_ratings = [snapshot.players[0].rating, snapshot.players[1].rating];
    let score = score_for_side_one(snapshot.winner);
    let rated = identities.iter().all(Option::is_some) && score.is_some();
    let new_ratings = match score {
        Some(score) if rated => {
            let (a, b) = state.ratings.update_pair(old_ratings[0], old_ratings[1], score);
            [a, b]
        }
        _ => old_ratings,
    };

    if let Err(e) = state.store.store_game(&snapshot).await {
        warn!(%code, error = %e, "finalize: failed to store game");
    }
    if rated {
        for side in Side::BOTH {
            let i = side.index();
            let Some(identity) = identities[i].as_deref() else { continue };
            if let Err(e) = state.store.save_pseudo_player(identity, &names[i], new_ratings[i]).await {
                warn!(%code, ?side, error = %e, "finalize: failed to save rating");
            }
        }
    }

    let recipients: Vec<(usize, Uuid)> = {
        let mut dir = state.directory.lock().await;
        let Some(session) = dir.find_ongoing_by_code_mut(code) else {
            return Some(FinalizeReport { rated, old_ratings, new_ratings });
        };
        for side in Side::BOTH {
            if let Some(seat) = session.seat_mut(side) {
                seat.rating = new_ratings[side.index()];
            }
        }
        session.set_finalizing(false);
        session
            .seats()
            .filter(|(_, seat)| seat.present)
            .map(|(side, seat)| (side.index(), seat.socket_id))
            .collect()
    };

    for (client_idx, socket) in recipients {
        let event = ServerEvent::NewRatingsNotification { client_idx, old_ratings, new_ratings };
        state.send_to(socket, event).await;
    }

    info!(%code, rated, winner = ?snapshot.winner, "finalize: game finalized");
    Some(FinalizeReport { rated, old_ratings, new_ratings })
}

#[cfg(test)]
#[path = "finalize_test.rs"]
mod tests;
