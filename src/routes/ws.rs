//! WebSocket handler — one game client per connection.
//!
//! DESIGN
//! ======
//! On upgrade, generates a client ID, registers an outbound channel for it,
//! and enters a `select!` loop:
//! - Incoming text messages → parse `ClientCommand` → dispatch
//! - Events queued by other connections and background tasks → forward
//! - Ping interval → websocket ping so idle proxies keep the socket open
//!
//! Handler closures are pure session logic: they mutate a `GameSession` and
//! return an `Outcome`. The dispatch layer owns all outbound concerns: reply
//! to sender, relay to the opponent, `gameOver` on a finishing command, and
//! finalization while the session gate is still held.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register client channel
//! 2. Client sends commands → dispatch → handler returns Outcome
//! 3. Dispatch applies Outcome (reply / relay / both)
//! 4. Close → depart (disconnect) → leave lobby → unregister

use axum::body::Bytes;
use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};
use uuid::Uuid;

use crate::game::board::Side;
use crate::game::session::{GameSession, SessionError};
use crate::protocol::{ClientCommand, ServerEvent};
use crate::services::directory::is_valid_identity;
use crate::services::game::{self, Client, Departure, GameError, NewGame};
use crate::services::lobby;
use crate::state::AppState;

// =============================================================================
// OUTCOME
// =============================================================================

/// Result returned by session handlers. The dispatch layer uses this to
/// decide who receives what; handlers never send events directly.
enum Outcome {
    /// Nothing to send beyond any automatic `gameOver`.
    Done,
    /// Send to the opponent only.
    Relay(ServerEvent),
    /// Same event to the sender and the opponent.
    Both(ServerEvent),
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let mut client = Client::new(Uuid::new_v4());

    // Per-connection channel for events from other connections and tasks.
    let (client_tx, mut client_rx) = mpsc::channel::<ServerEvent>(state.config.client_channel_capacity);
    state.register_client(client.id, client_tx).await;

    let mut ping = tokio::time::interval(state.config.ping_interval);
    ping.set_missed_tick_behavior(MissedTickBehavior::Skip);
    ping.tick().await;

    info!(client_id = %client.id, "ws: client connected");

    'conn: loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(msg) = msg else { break };
                let Ok(msg) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let replies = process_inbound_text(&state, &mut client, &text).await;
                        for event in replies {
                            if send_event(&mut socket, &event).await.is_err() {
                                break 'conn;
                            }
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
            _ = ping.tick() => {
                if socket.send(Message::Ping(Bytes::new())).await.is_err() {
                    break;
                }
            }
        }
    }

    game::depart(&state, &client, Departure::Disconnect).await;
    lobby::unsubscribe(&state, client.id).await;
    state.unregister_client(client.id).await;
    info!(client_id = %client.id, "ws: client disconnected");
}

// =============================================================================
// COMMAND DISPATCH
// =============================================================================

/// Parse and process one inbound text message and return events for the
/// sender.
///
/// Keeps websocket transport concerns separate from command handling, so
/// tests can drive dispatch without a socket.
async fn process_inbound_text(state: &AppState, client: &mut Client, text: &str) -> Vec<ServerEvent> {
    let cmd: ClientCommand = match serde_json::from_str(text) {
        Ok(cmd) => cmd,
        Err(e) => {
            warn!(client_id = %client.id, error = %e, "ws: invalid inbound command");
            return vec![ServerEvent::error("E_INVALID_COMMAND", format!("invalid command: {e}"))];
        }
    };

    if !matches!(cmd, ClientCommand::PingServer) {
        info!(client_id = %client.id, command = cmd.name(), "ws: recv command");
    }

    match cmd {
        ClientCommand::CreateGame { name, token, time_control, board_settings, identity, is_public } => {
            client.adopt_identity(identity.as_deref());
            let params = NewGame { name, token, time_control, board_settings, is_public };
            match game::create_game(state, client, params).await {
                Ok(game) => vec![ServerEvent::GameCreated {
                    join_code: game.join_code().to_string(),
                    game: Box::new(game),
                }],
                Err(e) => error_reply(client, &e),
            }
        }
        ClientCommand::JoinGame { join_code, name, token, identity } => {
            client.adopt_identity(identity.as_deref());
            match game::join_game(state, client, &join_code, name, token).await {
                Ok(joined) => {
                    if let (Some(creator), Some(joiner)) = (joined.creator, joined.game.seat(Side::Two)) {
                        state
                            .send_to(creator, ServerEvent::JoinerJoined { joiner: joiner.clone() })
                            .await;
                    }
                    vec![ServerEvent::GameJoined { game: Box::new(joined.game) }]
                }
                Err(e) => error_reply(client, &e),
            }
        }
        ClientCommand::Move { actions, move_index, .. } => {
            session_command(state, client, move |s, side| {
                let entry = s.commit_move(side, actions, move_index)?;
                Ok(Outcome::Relay(ServerEvent::Moved {
                    actions: entry.actions.clone(),
                    move_index: entry.index,
                    time_left: entry.time_left,
                    distances: entry.distances,
                }))
            })
            .await
        }
        ClientCommand::OfferRematch => {
            session_command(state, client, |s, side| relay(s.offer_rematch(side), ServerEvent::RematchOffered)).await
        }
        ClientCommand::AcceptRematch => {
            session_command(state, client, |s, side| {
                s.accept_rematch(side)?;
                Ok(Outcome::Both(ServerEvent::RematchAccepted { game: Box::new(s.clone()) }))
            })
            .await
        }
        ClientCommand::RejectRematch => {
            session_command(state, client, |s, side| relay(s.reject_rematch(side), ServerEvent::RematchRejected)).await
        }
        ClientCommand::Resign => {
            session_command(state, client, |s, side| relay(s.resign(side), ServerEvent::Resigned)).await
        }
        ClientCommand::OfferDraw => {
            session_command(state, client, |s, side| relay(s.offer_draw(side), ServerEvent::DrawOffered)).await
        }
        ClientCommand::AcceptDraw => {
            session_command(state, client, |s, side| relay(s.accept_draw(side), ServerEvent::DrawAccepted)).await
        }
        ClientCommand::RejectDraw => {
            session_command(state, client, |s, side| relay(s.reject_draw(side), ServerEvent::DrawRejected)).await
        }
        ClientCommand::RequestTakeback => {
            session_command(state, client, |s, side| {
                relay(s.request_takeback(side), ServerEvent::TakebackRequested)
            })
            .await
        }
        ClientCommand::AcceptTakeback => {
            session_command(state, client, |s, side| {
                let move_count = s.accept_takeback(side)?;
                Ok(Outcome::Both(ServerEvent::TakebackAccepted { move_count, time_left: s.time_left() }))
            })
            .await
        }
        ClientCommand::RejectTakeback => {
            session_command(state, client, |s, side| {
                relay(s.reject_takeback(side), ServerEvent::TakebackRejected)
            })
            .await
        }
        ClientCommand::GiveExtraTime => {
            session_command(state, client, |s, side| {
                s.give_extra_time(side)?;
                Ok(Outcome::Both(ServerEvent::ExtraTimeReceived { time_left: s.time_left() }))
            })
            .await
        }
        ClientCommand::PlayerWonOnTime { winner } => {
            session_command(state, client, move |s, _| s.claim_time_win(winner).map(|()| Outcome::Done)).await
        }
        ClientCommand::PlayerReachedGoal { winner } => {
            session_command(state, client, move |s, _| s.claim_goal(winner).map(|()| Outcome::Done)).await
        }
        ClientCommand::LeaveGame => {
            game::depart(state, client, Departure::Leave).await;
            vec![]
        }
        ClientCommand::Disconnect => {
            game::depart(state, client, Departure::Disconnect).await;
            lobby::unsubscribe(state, client.id).await;
            vec![]
        }
        ClientCommand::PingServer => vec![ServerEvent::PongFromServer],
        ClientCommand::GetGame { game_id } => handle_get_game(state, &game_id).await,
        ClientCommand::GetRandomGame => {
            let game = match state.store.get_random_game().await {
                Ok(game) => game,
                Err(e) => {
                    warn!(error = %e, "ws: random game lookup failed");
                    None
                }
            };
            vec![ServerEvent::RequestedRandomGame { game: game.map(Box::new) }]
        }
        ClientCommand::GetRanking { count } => {
            let ranking = state.store.get_ranking(count).await.unwrap_or_else(|e| {
                warn!(error = %e, "ws: ranking lookup failed");
                Vec::new()
            });
            vec![ServerEvent::RequestedRanking { ranking }]
        }
        ClientCommand::CheckHasOngoingGame { identity } => match game::has_ongoing_game(state, &identity).await {
            Ok(res) => vec![ServerEvent::RespondHasOngoingGame { res }],
            Err(e) => error_reply(client, &e),
        },
        ClientCommand::ReturnToOngoingGame { identity } => {
            match game::return_to_game(state, client, &identity).await {
                Ok((game, side)) => vec![ServerEvent::ReturnedToOngoingGame {
                    time_left: game.time_left(),
                    is_creator: side == Side::One,
                    ongoing_game: Box::new(game),
                }],
                Err(e) => error_reply(client, &e),
            }
        }
        ClientCommand::JoinLobby => vec![ServerEvent::OpenGames { games: lobby::subscribe(state, client.id).await }],
        ClientCommand::LeaveLobby => {
            lobby::unsubscribe(state, client.id).await;
            vec![]
        }
        ClientCommand::SolvedPuzzle { identity, name, puzzle_id } => {
            if !is_valid_identity(&identity) {
                return vec![ServerEvent::InvalidIdentityError];
            }
            if let Err(e) = state
                .store
                .add_pseudo_player_solved_puzzle(&identity, &name, &puzzle_id)
                .await
            {
                warn!(%puzzle_id, error = %e, "ws: failed to record solved puzzle");
            }
            vec![]
        }
    }
}

/// Run `op` on the sender's session and apply its outcome.
async fn session_command(
    state: &AppState,
    client: &Client,
    op: impl FnOnce(&mut GameSession, Side) -> Result<Outcome, SessionError>,
) -> Vec<ServerEvent> {
    let applied = match game::with_own_session(state, client, op).await {
        Ok(applied) => applied,
        Err(e) => return error_reply(client, &e),
    };

    let mut replies = Vec::new();
    match &applied.value {
        Outcome::Done => {}
        Outcome::Relay(event) => relay_to(state, applied.opponent, event).await,
        Outcome::Both(event) => {
            replies.push(event.clone());
            relay_to(state, applied.opponent, event).await;
        }
    }
    if let Some(over) = &applied.game_over {
        replies.push(over.clone());
        relay_to(state, applied.opponent, over).await;
    }

    // Finalize before the gate is released.
    applied.conclude(state).await;
    replies
}

fn relay(result: Result<(), SessionError>, event: ServerEvent) -> Result<Outcome, SessionError> {
    result.map(|()| Outcome::Relay(event))
}

async fn relay_to(state: &AppState, opponent: Option<Uuid>, event: &ServerEvent) {
    match opponent {
        Some(socket) => {
            state.send_to(socket, event.clone()).await;
        }
        None => info!(event = event.name(), "ws: opponent absent; relay dropped"),
    }
}

/// Map a game error to the events the sender sees. Desyncs and rejected
/// claims are logged and dropped.
fn error_reply(client: &Client, err: &GameError) -> Vec<ServerEvent> {
    match err {
        GameError::NoGame | GameError::NotFound(_) => vec![ServerEvent::GameNotFoundError],
        GameError::JoinSelf => vec![ServerEvent::JoinSelfGameFailed],
        GameError::InvalidIdentity => vec![ServerEvent::InvalidIdentityError],
        GameError::OngoingNotFound => vec![ServerEvent::OngoingGameNotFound],
        GameError::Session(SessionError::Desync { expected, got }) => {
            warn!(client_id = %client.id, expected, got, "ws: stale move dropped");
            vec![]
        }
        GameError::Session(SessionError::ClaimRejected) => {
            warn!(client_id = %client.id, "ws: claim rejected by server clock");
            vec![]
        }
        other => {
            warn!(client_id = %client.id, error = %other, "ws: command rejected");
            vec![ServerEvent::error_from(other)]
        }
    }
}

async fn handle_get_game(state: &AppState, game_id: &str) -> Vec<ServerEvent> {
    let Ok(id) = game_id.parse::<Uuid>() else {
        return vec![ServerEvent::GameNotFoundError];
    };
    match state.store.get_game(id).await {
        Ok(Some(game)) => vec![ServerEvent::RequestedGame { game: Some(Box::new(game)) }],
        Ok(None) => vec![ServerEvent::GameNotFoundError],
        Err(e) => {
            warn!(%id, error = %e, "ws: game lookup failed");
            vec![ServerEvent::GameNotFoundError]
        }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> Result<(), ()> {
    let json = match serde_json::to_string(event) {
        Ok(j) => j,
        Err(e) => {
            warn!(error = %e, "ws: failed to serialize event");
            return Err(());
        }
    };
    match event {
        ServerEvent::Error { code, message, .. } => warn!(code, message, "ws: send error"),
        ServerEvent::PongFromServer => {}
        _ => info!(event = event.name(), "ws: send event"),
    }
    socket
        .send(Message::Text(json.into()))
        .await
        .map_err(|_| ())
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
