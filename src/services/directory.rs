//! Directory service — the in-memory registry of live game sessions.
//!
//! DESIGN
//! ======
//! Sessions live in exactly one of two lists: `unjoined` (created, waiting
//! for an opponent) or `ongoing` (joined, possibly finished but not yet
//! torn down). The directory owns them; callers borrow through lookups and
//! never hold a reference across an `.await`.
//!
//! A client is matched to a seat by identity token when it has a valid one,
//! and by socket id otherwise. Guests therefore lose their seat when their
//! connection drops; authenticated players can reconnect from a new socket.
//!
//! CONCURRENCY
//! ===========
//! The directory itself sits behind one `tokio::sync::Mutex` in `AppState`.
//! Each join code also has a command gate, an `Arc<Mutex<()>>` handed out by
//! `gate`. Command handlers hold the gate for a session for the whole
//! command, including finalization awaits, so two commands for one session
//! never interleave even though the directory lock is released in between.

use std::collections::HashMap;
use std::sync::Arc;

use rand::Rng;
use uuid::Uuid;

use super::lobby::OpenGame;
use crate::game::board::Side;
use crate::game::session::{GameSession, Stage};

/// Identity value older clients send when no user is signed in.
pub const GUEST_IDENTITY: &str = "guest";

const MIN_IDENTITY_LEN: usize = 4;
const JOIN_CODE_LEN: usize = 6;
const JOIN_CODE_ALPHABET: &[u8] = b"abcdefghjkmnpqrstuvwxyz23456789";

/// Whether `token` can identify a signed-in player.
#[must_use]
pub fn is_valid_identity(token: &str) -> bool {
    !token.is_empty() && token != "undefined" && token != GUEST_IDENTITY && token.len() >= MIN_IDENTITY_LEN
}

/// Who is asking: the connection, plus its identity token if it is valid.
#[derive(Debug, Clone, Copy)]
pub struct ClientKey<'a> {
    pub socket_id: Uuid,
    pub identity: Option<&'a str>,
}

impl<'a> ClientKey<'a> {
    #[must_use]
    pub fn new(socket_id: Uuid, identity: Option<&'a str>) -> Self {
        Self { socket_id, identity: identity.filter(|t| is_valid_identity(t)) }
    }

    #[must_use]
    pub fn guest(socket_id: Uuid) -> Self {
        Self { socket_id, identity: None }
    }

    /// Seat of `session` this client occupies, if any.
    #[must_use]
    pub fn side_in(&self, session: &GameSession) -> Option<Side> {
        if let Some(identity) = self.identity {
            let by_identity = session
                .seats()
                .find(|(_, seat)| seat.identity.as_deref() == Some(identity))
                .map(|(side, _)| side);
            if by_identity.is_some() {
                return by_identity;
            }
        }
        session
            .seats()
            .find(|(_, seat)| seat.socket_id == self.socket_id)
            .map(|(side, _)| side)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DirectoryError {
    #[error("no unjoined game with code {0}")]
    NotFound(String),
    #[error("more than one unjoined game with code {0}")]
    Ambiguous(String),
}

impl crate::protocol::ErrorCode for DirectoryError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_GAME_NOT_FOUND",
            Self::Ambiguous(_) => "E_GAME_AMBIGUOUS",
        }
    }
}

// =============================================================================
// DIRECTORY
// =============================================================================

#[derive(Debug, Default)]
pub struct SessionDirectory {
    unjoined: Vec<GameSession>,
    ongoing: Vec<GameSession>,
    gates: HashMap<String, Arc<tokio::sync::Mutex<()>>>,
}

impl SessionDirectory {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn unjoined_len(&self) -> usize {
        self.unjoined.len()
    }

    #[must_use]
    pub fn ongoing_len(&self) -> usize {
        self.ongoing.len()
    }

    /// Random short code not used by any live session.
    #[must_use]
    pub fn generate_join_code(&self) -> String {
        let mut rng = rand::rng();
        loop {
            let code: String = (0..JOIN_CODE_LEN)
                .map(|_| char::from(JOIN_CODE_ALPHABET[rng.random_range(0..JOIN_CODE_ALPHABET.len())]))
                .collect();
            if !self.contains_code(&code) {
                return code;
            }
        }
    }

    #[must_use]
    pub fn contains_code(&self, code: &str) -> bool {
        self.unjoined
            .iter()
            .chain(self.ongoing.iter())
            .any(|s| s.join_code() == code)
    }

    /// Command gate for the session with `code`.
    #[must_use]
    pub fn gate(&self, code: &str) -> Option<Arc<tokio::sync::Mutex<()>>> {
        self.gates.get(code).cloned()
    }

    fn drop_gate_if_gone(&mut self, code: &str) {
        if !self.contains_code(code) {
            self.gates.remove(code);
        }
    }

    // -------------------------------------------------------------------------
    // unjoined
    // -------------------------------------------------------------------------

    pub fn add_unjoined(&mut self, session: GameSession) {
        self.gates
            .entry(session.join_code().to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(())));
        self.unjoined.push(session);
    }

    #[must_use]
    pub fn find_unjoined_by_code(&self, code: &str) -> Option<&GameSession> {
        self.unjoined.iter().find(|s| s.join_code() == code)
    }

    pub fn find_unjoined_by_code_mut(&mut self, code: &str) -> Option<&mut GameSession> {
        self.unjoined.iter_mut().find(|s| s.join_code() == code)
    }

    #[must_use]
    pub fn find_unjoined_for_client(&self, client: &ClientKey<'_>) -> Option<&GameSession> {
        self.unjoined
            .iter()
            .find(|s| client.side_in(s).is_some())
    }

    /// Remove every unjoined session created by `client`.
    pub fn remove_unjoined_for_client(&mut self, client: &ClientKey<'_>) -> Vec<GameSession> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.unjoined)
            .into_iter()
            .partition(|s| client.side_in(s).is_some());
        self.unjoined = kept;
        for s in &removed {
            self.drop_gate_if_gone(s.join_code());
        }
        removed
    }

    /// Move the single unjoined session with `code` into the ongoing list.
    ///
    /// # Errors
    ///
    /// `NotFound` if no session has the code, `Ambiguous` if several do.
    pub fn move_game_from_unjoined_to_ongoing(&mut self, code: &str) -> Result<(), DirectoryError> {
        let matches: Vec<usize> = self
            .unjoined
            .iter()
            .enumerate()
            .filter(|(_, s)| s.join_code() == code)
            .map(|(i, _)| i)
            .collect();
        match matches.as_slice() {
            [] => Err(DirectoryError::NotFound(code.to_string())),
            [idx] => {
                let session = self.unjoined.remove(*idx);
                self.ongoing.push(session);
                Ok(())
            }
            _ => Err(DirectoryError::Ambiguous(code.to_string())),
        }
    }

    // -------------------------------------------------------------------------
    // ongoing
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn find_ongoing_by_code(&self, code: &str) -> Option<&GameSession> {
        self.ongoing.iter().find(|s| s.join_code() == code)
    }

    pub fn find_ongoing_by_code_mut(&mut self, code: &str) -> Option<&mut GameSession> {
        self.ongoing.iter_mut().find(|s| s.join_code() == code)
    }

    /// The ongoing session `client` sits in, with its side. Unfinished games
    /// win over finished ones still awaiting teardown.
    #[must_use]
    pub fn find_ongoing_for_client(&self, client: &ClientKey<'_>) -> Option<(&GameSession, Side)> {
        let mut finished = None;
        for s in &self.ongoing {
            let Some(side) = client.side_in(s) else { continue };
            if s.stage().is_ongoing() {
                return Some((s, side));
            }
            finished.get_or_insert((s, side));
        }
        finished
    }

    /// Remove every ongoing session `client` sits in.
    pub fn remove_ongoing_for_client(&mut self, client: &ClientKey<'_>) -> Vec<GameSession> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.ongoing)
            .into_iter()
            .partition(|s| client.side_in(s).is_some());
        self.ongoing = kept;
        for s in &removed {
            self.drop_gate_if_gone(s.join_code());
        }
        removed
    }

    /// Remove every ongoing session with `code`.
    pub fn remove_ongoing_by_code(&mut self, code: &str) -> Vec<GameSession> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.ongoing)
            .into_iter()
            .partition(|s| s.join_code() == code);
        self.ongoing = kept;
        self.drop_gate_if_gone(code);
        removed
    }

    /// Remove the finished session `code` once neither seat is present.
    /// Returns whether it was removed.
    pub fn remove_if_deserted(&mut self, code: &str) -> bool {
        let deserted = self
            .find_ongoing_by_code(code)
            .is_some_and(|s| !s.stage().is_ongoing() && s.both_left());
        if deserted {
            self.remove_ongoing_by_code(code);
        }
        deserted
    }

    /// Point the seat held by `identity` in an unfinished ongoing game at
    /// `socket_id`. Returns the game's code and the seat's side. Only the
    /// identity token is matched, never the socket.
    pub fn rebind_socket(&mut self, identity: &str, socket_id: Uuid) -> Option<(String, Side)> {
        if !is_valid_identity(identity) {
            return None;
        }
        let seat_of = |s: &GameSession| {
            s.seats()
                .find(|(_, seat)| seat.identity.as_deref() == Some(identity))
                .map(|(side, _)| side)
        };
        let session = self
            .ongoing
            .iter_mut()
            .find(|s| s.stage().is_ongoing() && seat_of(s).is_some())?;
        let side = seat_of(session)?;
        session.rebind_socket(side, socket_id);
        Some((session.join_code().to_string(), side))
    }

    // -------------------------------------------------------------------------
    // views
    // -------------------------------------------------------------------------

    /// Public sessions waiting for an opponent, for the lobby.
    #[must_use]
    pub fn open_games(&self) -> Vec<OpenGame> {
        self.unjoined
            .iter()
            .filter_map(OpenGame::from_session)
            .collect()
    }

    /// Codes of sessions whose clocks are running.
    #[must_use]
    pub fn stage3_codes(&self) -> Vec<String> {
        self.ongoing
            .iter()
            .filter(|s| s.stage() == Stage::ClocksRunning)
            .map(|s| s.join_code().to_string())
            .collect()
    }
}

#[cfg(test)]
#[path = "directory_test.rs"]
mod tests;
