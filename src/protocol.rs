//! Protocol — the wire vocabulary between game clients and the server.
//!
//! ARCHITECTURE
//! ============
//! Every websocket text message is one JSON object tagged by `type`. Inbound
//! messages parse into the closed `ClientCommand` enum; anything else is a
//! parse error, never a silent no-op. Outbound messages are `ServerEvent`s,
//! queued on a connection's channel and serialized at the socket edge.
//!
//! DESIGN
//! ======
//! - Tag and field names are camelCase on the wire.
//! - Commands carry no session id: the server resolves the session from the
//!   connection's own seat.
//! - Rejected game actions come back as `error` events carrying a grepable
//!   code from the typed error that caused them.

use serde::{Deserialize, Serialize};

use crate::game::board::{BoardSettings, Side};
use crate::game::legality::Action;
use crate::game::session::{FinishReason, GameSession, Seat, TimeControl, Winner};
use crate::services::lobby::OpenGame;
use crate::services::rating::RatingRecord;
use crate::services::store::{RankingEntry, StoredGame};

// =============================================================================
// ERROR CODES
// =============================================================================

/// Grepable error code and retryable flag for structured error events.
pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}

// =============================================================================
// INBOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ClientCommand {
    CreateGame {
        name: String,
        token: String,
        time_control: TimeControl,
        board_settings: Option<BoardSettings>,
        identity: Option<String>,
        #[serde(default)]
        is_public: bool,
    },
    JoinGame {
        join_code: String,
        name: String,
        token: String,
        identity: Option<String>,
    },
    Move {
        actions: Vec<Action>,
        /// Client's view of the clocks. Ignored; the server clock rules.
        remaining_time: Option<serde_json::Value>,
        /// Client-computed distances. Ignored; recomputed on commit.
        distances: Option<serde_json::Value>,
        /// History index this move will create.
        move_index: Option<usize>,
    },
    OfferRematch,
    AcceptRematch,
    RejectRematch,
    Resign,
    OfferDraw,
    AcceptDraw,
    RejectDraw,
    RequestTakeback,
    AcceptTakeback,
    RejectTakeback,
    GiveExtraTime,
    PlayerWonOnTime {
        winner: Side,
    },
    PlayerReachedGoal {
        winner: Side,
    },
    LeaveGame,
    Disconnect,
    PingServer,
    GetGame {
        game_id: String,
    },
    GetRandomGame,
    GetRanking {
        count: u32,
    },
    CheckHasOngoingGame {
        identity: String,
    },
    ReturnToOngoingGame {
        identity: String,
    },
    JoinLobby,
    LeaveLobby,
    SolvedPuzzle {
        identity: String,
        name: String,
        puzzle_id: String,
    },
}

impl ClientCommand {
    /// Wire name, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateGame { .. } => "createGame",
            Self::JoinGame { .. } => "joinGame",
            Self::Move { .. } => "move",
            Self::OfferRematch => "offerRematch",
            Self::AcceptRematch => "acceptRematch",
            Self::RejectRematch => "rejectRematch",
            Self::Resign => "resign",
            Self::OfferDraw => "offerDraw",
            Self::AcceptDraw => "acceptDraw",
            Self::RejectDraw => "rejectDraw",
            Self::RequestTakeback => "requestTakeback",
            Self::AcceptTakeback => "acceptTakeback",
            Self::RejectTakeback => "rejectTakeback",
            Self::GiveExtraTime => "giveExtraTime",
            Self::PlayerWonOnTime { .. } => "playerWonOnTime",
            Self::PlayerReachedGoal { .. } => "playerReachedGoal",
            Self::LeaveGame => "leaveGame",
            Self::Disconnect => "disconnect",
            Self::PingServer => "pingServer",
            Self::GetGame { .. } => "getGame",
            Self::GetRandomGame => "getRandomGame",
            Self::GetRanking { .. } => "getRanking",
            Self::CheckHasOngoingGame { .. } => "checkHasOngoingGame",
            Self::ReturnToOngoingGame { .. } => "returnToOngoingGame",
            Self::JoinLobby => "joinLobby",
            Self::LeaveLobby => "leaveLobby",
            Self::SolvedPuzzle { .. } => "solvedPuzzle",
        }
    }
}

// =============================================================================
// OUTBOUND
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum ServerEvent {
    GameCreated {
        join_code: String,
        game: Box<GameSession>,
    },
    GameJoined {
        game: Box<GameSession>,
    },
    JoinerJoined {
        joiner: Seat,
    },
    Moved {
        actions: Vec<Action>,
        move_index: usize,
        time_left: [u32; 2],
        distances: [Option<u32>; 2],
    },
    RematchOffered,
    RematchAccepted {
        game: Box<GameSession>,
    },
    RematchRejected,
    DrawOffered,
    DrawAccepted,
    DrawRejected,
    TakebackRequested,
    TakebackAccepted {
        move_count: usize,
        time_left: [u32; 2],
    },
    TakebackRejected,
    ExtraTimeReceived {
        time_left: [u32; 2],
    },
    Resigned,
    LeftGame,
    AbandonedGame,
    GameOver {
        winner: Winner,
        finish_reason: Option<FinishReason>,
    },
    NewRatingsNotification {
        client_idx: usize,
        old_ratings: [RatingRecord; 2],
        new_ratings: [RatingRecord; 2],
    },
    GameNotFoundError,
    InvalidIdentityError,
    JoinSelfGameFailed,
    ReturnedToOngoingGame {
        ongoing_game: Box<GameSession>,
        is_creator: bool,
        time_left: [u32; 2],
    },
    RespondHasOngoingGame {
        res: bool,
    },
    OngoingGameNotFound,
    PongFromServer,
    RequestedGame {
        game: Option<Box<StoredGame>>,
    },
    RequestedRandomGame {
        game: Option<Box<StoredGame>>,
    },
    RequestedRanking {
        ranking: Vec<RankingEntry>,
    },
    OpenGames {
        games: Vec<OpenGame>,
    },
    OpenGameCreated {
        game: OpenGame,
    },
    OpenGameRemoved {
        join_code: String,
    },
    Error {
        code: String,
        message: String,
        retryable: bool,
    },
}

impl ServerEvent {
    /// Structured error event from a typed error.
    pub fn error_from(err: &(impl ErrorCode + ?Sized)) -> Self {
        Self::Error { code: err.error_code().to_string(), message: err.to_string(), retryable: err.retryable() }
    }

    /// Unstructured error event, for input that never reached a typed layer.
    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error { code: code.to_string(), message: message.into(), retryable: false }
    }

    /// Wire name, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::GameCreated { .. } => "gameCreated",
            Self::GameJoined { .. } => "gameJoined",
            Self::JoinerJoined { .. } => "joinerJoined",
            Self::Moved { .. } => "moved",
            Self::RematchOffered => "rematchOffered",
            Self::RematchAccepted { .. } => "rematchAccepted",
            Self::RematchRejected => "rematchRejected",
            Self::DrawOffered => "drawOffered",
            Self::DrawAccepted => "drawAccepted",
            Self::DrawRejected => "drawRejected",
            Self::TakebackRequested => "takebackRequested",
            Self::TakebackAccepted { .. } => "takebackAccepted",
            Self::TakebackRejected => "takebackRejected",
            Self::ExtraTimeReceived { .. } => "extraTimeReceived",
            Self::Resigned => "resigned",
            Self::LeftGame => "leftGame",
            Self::AbandonedGame => "abandonedGame",
            Self::GameOver { .. } => "gameOver",
            Self::NewRatingsNotification { .. } => "newRatingsNotification",
            Self::GameNotFoundError => "gameNotFoundError",
            Self::InvalidIdentityError => "invalidIdentityError",
            Self::JoinSelfGameFailed => "joinSelfGameFailed",
            Self::ReturnedToOngoingGame { .. } => "returnedToOngoingGame",
            Self::RespondHasOngoingGame { .. } => "respondHasOngoingGame",
            Self::OngoingGameNotFound => "ongoingGameNotFound",
            Self::PongFromServer => "pongFromServer",
            Self::RequestedGame { .. } => "requestedGame",
            Self::RequestedRandomGame { .. } => "requestedRandomGame",
            Self::RequestedRanking { .. } => "requestedRanking",
            Self::OpenGames { .. } => "openGames",
            Self::OpenGameCreated { .. } => "openGameCreated",
            Self::OpenGameRemoved { .. } => "openGameRemoved",
            Self::Error { .. } => "error",
        }
    }
}

#[cfg(test)]
#[path = "protocol_test.rs"]
mod tests;
