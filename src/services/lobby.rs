//! Lobby service — announcements of public games waiting for an opponent.
//!
//! Subscribers are connection ids. Only public, unjoined sessions are ever
//! listed or announced; private games are reachable by join code alone.

use serde::Serialize;
use tracing::debug;
use uuid::Uuid;

use crate::game::board::{BoardSettings, Side};
use crate::game::session::{GameSession, Stage, TimeControl};
use crate::protocol::ServerEvent;
use crate::state::AppState;

/// Lobby listing for one open game.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OpenGame {
    pub join_code: String,
    pub name: String,
    pub token: String,
    pub rating: f64,
    pub time_control: TimeControl,
    pub board_settings: BoardSettings,
}

impl OpenGame {
    /// Listing for `session`, or `None` if it is private or already joined.
    #[must_use]
    pub fn from_session(session: &GameSession) -> Option<Self> {
        if !session.is_public() || session.stage() != Stage::CreatedUnjoined {
            return None;
        }
        let creator = session.seat(Side::One)?;
        Some(Self {
            join_code: session.join_code().to_string(),
            name: creator.name.clone(),
            token: creator.token.clone(),
            rating: creator.rating.rating,
            time_control: session.time_control(),
            board_settings: session.board_settings().clone(),
        })
    }
}

/// Add `client_id` to the lobby and return the current listing.
pub async fn subscribe(state: &AppState, client_id: Uuid) -> Vec<OpenGame> {
    state.lobby.write().await.insert(client_id);
    state.directory.lock().await.open_games()
}

pub async fn unsubscribe(state: &AppState, client_id: Uuid) {
    state.lobby.write().await.remove(&client_id);
}

/// Send `event` to every lobby subscriber.
pub async fn announce(state: &AppState, event: &ServerEvent) {
    let subscribers: Vec<Uuid> = state.lobby.read().await.iter().copied().collect();
    debug!(event = event.name(), subscribers = subscribers.len(), "lobby: announce");
    for id in subscribers {
        state.send_to(id, event.clone()).await;
    }
}

/// Announce the removal of each listed game in `removed`.
pub async fn announce_removed(state: &AppState, removed: &[GameSession]) {
    for session in removed {
        if session.is_public() && session.stage() == Stage::CreatedUnjoined {
            let event = ServerEvent::OpenGameRemoved { join_code: session.join_code().to_string() };
            announce(state, &event).await;
        }
    }
}

#[cfg(test)]
#[path = "lobby_test.rs"]
mod tests;
