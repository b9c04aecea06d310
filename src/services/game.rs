//! Game service — session lifecycle commands for one connected client.
//!
//! DESIGN
//! ======
//! Functions here find the caller's session, serialize on its gate, and
//! apply one `GameSession` operation. They return typed results; turning
//! those into reply and relay events is the websocket route's job.
//!
//! `with_own_session` hands back an `Applied` that still owns the gate, so
//! the caller delivers events and runs finalization before any other
//! command for the session can start.
//!
//! DEPARTURES
//! ==========
//! Leaving (explicitly, or by creating or joining another game) abandons an
//! unfinished game. A disconnect only marks the seat absent so the player
//! can return with `returnToOngoingGame`, except for guests: they cannot
//! return, so their disconnect counts as leaving.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info};
use uuid::Uuid;

use crate::game::board::{BoardSettings, Side};
use crate::game::session::{Abandonment, GameSession, Seat, SessionError, Stage, TimeControl};
use crate::protocol::{ErrorCode, ServerEvent};
use crate::services::directory::{ClientKey, DirectoryError, is_valid_identity};
use crate::services::finalize;
use crate::services::lobby::{self, OpenGame};
use crate::services::rating::RatingRecord;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

/// One websocket connection, plus the identity it last presented.
#[derive(Debug, Clone)]
pub struct Client {
    pub id: Uuid,
    identity: Option<String>,
}

impl Client {
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self { id, identity: None }
    }

    /// Remember `identity` if it is valid; invalid values are ignored.
    pub fn adopt_identity(&mut self, identity: Option<&str>) {
        if let Some(identity) = identity.filter(|t| is_valid_identity(t)) {
            self.identity = Some(identity.to_string());
        }
    }

    #[must_use]
    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    #[must_use]
    pub fn key(&self) -> ClientKey<'_> {
        ClientKey::new(self.id, self.identity.as_deref())
    }
}

/// Parameters of `createGame`.
#[derive(Debug, Clone)]
pub struct NewGame {
    pub name: String,
    pub token: String,
    pub time_control: TimeControl,
    pub board_settings: Option<BoardSettings>,
    pub is_public: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Departure {
    Leave,
    Disconnect,
}

#[derive(Debug, thiserror::Error)]
pub enum GameError {
    #[error("not seated in a game")]
    NoGame,
    #[error("no open game with code {0}")]
    NotFound(String),
    #[error("cannot join your own game")]
    JoinSelf,
    #[error("identity is missing or invalid")]
    InvalidIdentity,
    #[error("no ongoing game for this identity")]
    OngoingNotFound,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Directory(#[from] DirectoryError),
}

impl ErrorCode for GameError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NoGame => "E_NO_GAME",
            Self::NotFound(_) => "E_GAME_NOT_FOUND",
            Self::JoinSelf => "E_JOIN_SELF",
            Self::InvalidIdentity => "E_INVALID_IDENTITY",
            Self::OngoingNotFound => "E_ONGOING_NOT_FOUND",
            Self::Session(e) => e.error_code(),
            Self::Directory(e) => e.error_code(),
        }
    }
}

/// Result of an operation on the caller's session. Holds the session gate
/// until dropped.
pub struct Applied<T> {
    pub value: T,
    pub code: String,
    pub side: Side,
    /// Opponent's socket, if they are present.
    pub opponent: Option<Uuid>,
    /// Set when this operation ended the game.
    pub game_over: Option<ServerEvent>,
    _gate: OwnedMutexGuard<()>,
}

impl<T> Applied<T> {
    /// Finalize the session if this operation ended it. Consumes `self`, so
    /// the gate is released afterwards.
    pub async fn conclude(self, state: &AppState) {
        if self.game_over.is_some() {
            finalize::finalize_game(state, &self.code).await;
        }
    }
}

/// Joined session snapshot plus the creator's socket for the relay.
#[derive(Debug)]
pub struct Joined {
    pub game: GameSession,
    pub creator: Option<Uuid>,
}

// =============================================================================
// LOOKUP
// =============================================================================

async fn own_session_gate(state: &AppState, key: &ClientKey<'_>) -> Option<(String, Arc<Mutex<()>>)> {
    let dir = state.directory.lock().await;
    let (session, _) = dir.find_ongoing_for_client(key)?;
    let code = session.join_code().to_string();
    let gate = dir.gate(&code)?;
    Some((code, gate))
}

async fn lookup_rating(state: &AppState, identity: Option<&str>) -> RatingRecord {
    let Some(identity) = identity else { return RatingRecord::default() };
    match state.store.get_pseudo_player(identity).await {
        Ok(Some(rating)) => rating,
        Ok(None) => RatingRecord::default(),
        Err(e) => {
            debug!(error = %e, "game: rating lookup failed; using default");
            RatingRecord::default()
        }
    }
}

fn game_over_event(session: &GameSession) -> ServerEvent {
    ServerEvent::GameOver { winner: session.winner(), finish_reason: session.finish_reason() }
}

fn present_socket(session: &GameSession, side: Side) -> Option<Uuid> {
    session
        .seat(side)
        .filter(|seat| seat.present)
        .map(|seat| seat.socket_id)
}

// =============================================================================
// CREATE / JOIN
// =============================================================================

/// Create an unjoined session with `client` in seat one. Any game the
/// client was in is left first.
///
/// # Errors
///
/// Returns `Session(InvalidBoard)` if the board settings are malformed.
pub async fn create_game(state: &AppState, client: &Client, new: NewGame) -> Result<GameSession, GameError> {
    let board_settings = new.board_settings.unwrap_or_default();
    board_settings.validate().map_err(SessionError::InvalidBoard)?;

    depart(state, client, Departure::Leave).await;

    let rating = lookup_rating(state, client.identity()).await;
    let creator = Seat::new(client.id, client.identity.clone(), new.name, new.token, rating);
    let first_mover = if rand::random::<bool>() { Side::One } else { Side::Two };

    let snapshot = {
        let mut dir = state.directory.lock().await;
        let code = dir.generate_join_code();
        let session = GameSession::new(code, creator, new.time_control, board_settings, new.is_public, first_mover)?;
        let snapshot = session.clone();
        dir.add_unjoined(session);
        snapshot
    };

    info!(code = snapshot.join_code(), client_id = %client.id, public = snapshot.is_public(), "game: created");
    if let Some(listing) = OpenGame::from_session(&snapshot) {
        lobby::announce(state, &ServerEvent::OpenGameCreated { game: listing }).await;
    }
    Ok(snapshot)
}

/// Take seat two of the unjoined session with `code`.
///
/// # Errors
///
/// `NotFound` if no unjoined session has the code, `JoinSelf` if the client
/// created it.
pub async fn join_game(
    state: &AppState,
    client: &Client,
    code: &str,
    name: String,
    token: String,
) -> Result<Joined, GameError> {
    {
        let dir = state.directory.lock().await;
        let session = dir
            .find_unjoined_by_code(code)
            .ok_or_else(|| GameError::NotFound(code.to_string()))?;
        if client.key().side_in(session).is_some() {
            return Err(GameError::JoinSelf);
        }
    }

    depart(state, client, Departure::Leave).await;

    let rating = lookup_rating(state, client.identity()).await;
    let joiner = Seat::new(client.id, client.identity.clone(), name, token, rating);

    let joined = {
        let mut dir = state.directory.lock().await;
        let session = dir
            .find_unjoined_by_code_mut(code)
            .ok_or_else(|| GameError::NotFound(code.to_string()))?;
        session.join(joiner)?;
        let joined = Joined { game: session.clone(), creator: present_socket(session, Side::One) };
        dir.move_game_from_unjoined_to_ongoing(code)?;
        joined
    };

    info!(%code, client_id = %client.id, "game: joined");
    if joined.game.is_public() {
        lobby::announce(state, &ServerEvent::OpenGameRemoved { join_code: code.to_string() }).await;
    }
    Ok(joined)
}

// =============================================================================
// SESSION OPERATIONS
// =============================================================================

/// Apply `op` to the ongoing session the client sits in, holding its gate.
///
/// # Errors
///
/// `NoGame` if the client is not seated anywhere; otherwise whatever `op`
/// returns.
pub async fn with_own_session<T>(
    state: &AppState,
    client: &Client,
    op: impl FnOnce(&mut GameSession, Side) -> Result<T, SessionError>,
) -> Result<Applied<T>, GameError> {
    let key = client.key();
    let (code, gate) = own_session_gate(state, &key).await.ok_or(GameError::NoGame)?;
    let guard = gate.lock_owned().await;

    let mut dir = state.directory.lock().await;
    let session = dir.find_ongoing_by_code_mut(&code).ok_or(GameError::NoGame)?;
    let side = key.side_in(session).ok_or(GameError::NoGame)?;
    let was_over = session.stage() == Stage::Terminal;

    let value = op(session, side)?;

    let ended = !was_over && session.stage() == Stage::Terminal;
    Ok(Applied {
        value,
        side,
        opponent: present_socket(session, side.other()),
        game_over: ended.then(|| game_over_event(session)),
        code,
        _gate: guard,
    })
}

/// Take the client out of whatever it is in: unjoined sessions it created
/// are removed, and its ongoing session is left or marked absent according
/// to `kind`.
pub async fn depart(state: &AppState, client: &Client, kind: Departure) {
    let key = client.key();
    // A closing socket only takes down the unjoined games it created itself.
    let unjoined_key = match kind {
        Departure::Leave => client.key(),
        Departure::Disconnect => ClientKey::guest(client.id),
    };
    let removed = state.directory.lock().await.remove_unjoined_for_client(&unjoined_key);
    lobby::announce_removed(state, &removed).await;

    let Some((code, gate)) = own_session_gate(state, &key).await else { return };
    let _guard = gate.lock_owned().await;

    let (event, opponent, ended) = {
        let mut dir = state.directory.lock().await;
        let Some(session) = dir.find_ongoing_by_code_mut(&code) else { return };
        let Some(side) = key.side_in(session) else { return };
        if kind == Departure::Disconnect && session.seat(side).is_some_and(|seat| seat.socket_id != client.id) {
            debug!(%code, client_id = %client.id, "game: stale socket closed; seat already rebound");
            return;
        }
        let opponent = present_socket(session, side.other());
        let guest = session.seat(side).is_some_and(|seat| seat.identity.is_none());
        let walking_away = kind == Departure::Leave || guest;

        if session.stage().is_ongoing() && walking_away {
            match session.abandon(side) {
                Abandonment::Discard => {
                    dir.remove_ongoing_by_code(&code);
                    (Some(ServerEvent::AbandonedGame), opponent, false)
                }
                Abandonment::Finished => (Some(game_over_event(session)), opponent, true),
                Abandonment::Unchanged => (None, opponent, false),
            }
        } else {
            session.set_presence(side, false);
            if session.stage().is_ongoing() {
                (None, None, false)
            } else {
                dir.remove_if_deserted(&code);
                (Some(ServerEvent::LeftGame), opponent, false)
            }
        }
    };

    info!(%code, client_id = %client.id, ?kind, ended, "game: departed");
    if let (Some(event), Some(opponent)) = (event, opponent) {
        state.send_to(opponent, event).await;
    }
    if ended {
        finalize::finalize_game(state, &code).await;
        state.directory.lock().await.remove_if_deserted(&code);
    }
}

// =============================================================================
// RECONNECT
// =============================================================================

/// Point the seat held by `identity` at this connection.
///
/// # Errors
///
/// `InvalidIdentity` for a missing or invalid token, `OngoingNotFound` if
/// the identity holds no seat in an unfinished game.
pub async fn return_to_game(state: &AppState, client: &mut Client, identity: &str) -> Result<(GameSession, Side), GameError> {
    if !is_valid_identity(identity) {
        return Err(GameError::InvalidIdentity);
    }
    let mut dir = state.directory.lock().await;
    let (code, side) = dir
        .rebind_socket(identity, client.id)
        .ok_or(GameError::OngoingNotFound)?;
    let session = dir.find_ongoing_by_code(&code).ok_or(GameError::OngoingNotFound)?;
    client.adopt_identity(Some(identity));
    info!(%code, client_id = %client.id, ?side, "game: returned");
    Ok((session.clone(), side))
}

/// Whether `identity` holds a seat in an unfinished game.
///
/// # Errors
///
/// `InvalidIdentity` for a missing or invalid token.
pub async fn has_ongoing_game(state: &AppState, identity: &str) -> Result<bool, GameError> {
    if !is_valid_identity(identity) {
        return Err(GameError::InvalidIdentity);
    }
    let key = ClientKey::new(Uuid::nil(), Some(identity));
    let dir = state.directory.lock().await;
    Ok(dir
        .find_ongoing_for_client(&key)
        .is_some_and(|(session, _)| session.stage().is_ongoing()))
}

#[cfg(test)]
#[path = "game_test.rs"]
mod tests;
