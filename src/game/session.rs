//! Game session — the per-match state machine.
//!
//! DESIGN
//! ======
//! A `GameSession` owns the move history, the live clocks, the result, and
//! the negotiated sub-protocols (draw, takeback, rematch). Every operation
//! validates first and mutates second, so an `Err` always means nothing
//! changed. Operations return plain domain values; the websocket dispatch
//! layer decides who hears about them.
//!
//! LIFECYCLE
//! =========
//! 0 created/unjoined → 1 joined → 2 one side moved → 3 clocks running → 4
//! terminal. Stages -2 and -1 exist only on clients before the server
//! acknowledges a create, and are never held by a server session.
//!
//! CLOCKS
//! ======
//! The last history entry snapshots both remaining times at the moment of
//! that move. `time_left` is the live value, decremented by `tick` only in
//! stage 3. Increments are granted only for moves made while stage 3 was
//! already in effect.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::board::{BoardSettings, Grid, Pos, Side, reachable_within};
use super::legality::{Action, MoveError, apply_move, goal_distances, validate_move};
use crate::protocol::ErrorCode;
use crate::services::rating::RatingRecord;

/// Seconds granted by `giveExtraTime`.
pub const EXTRA_TIME_SECS: u32 = 60;

/// Hop bound for the handicap draw rule.
pub const HANDICAP_HOPS: u32 = 2;

/// A time-win claim is honoured when the loser's server clock is at most
/// this many seconds from zero.
pub const TIME_CLAIM_TOLERANCE_SECS: u32 = 1;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i8", try_from = "i8")]
pub enum Stage {
    AwaitingFirstContact,
    AwaitingServerAck,
    CreatedUnjoined,
    JoinedNoMoves,
    OneSideMoved,
    ClocksRunning,
    Terminal,
}

impl Stage {
    /// Stage implied by the number of committed moves in an unfinished game.
    #[must_use]
    pub fn for_moves(moves: usize) -> Self {
        match moves {
            0 => Stage::JoinedNoMoves,
            1 => Stage::OneSideMoved,
            _ => Stage::ClocksRunning,
        }
    }

    /// Joined and not yet finished.
    #[must_use]
    pub fn is_ongoing(self) -> bool {
        matches!(self, Stage::JoinedNoMoves | Stage::OneSideMoved | Stage::ClocksRunning)
    }
}

impl From<Stage> for i8 {
    fn from(stage: Stage) -> Self {
        match stage {
            Stage::AwaitingFirstContact => -2,
            Stage::AwaitingServerAck => -1,
            Stage::CreatedUnjoined => 0,
            Stage::JoinedNoMoves => 1,
            Stage::OneSideMoved => 2,
            Stage::ClocksRunning => 3,
            Stage::Terminal => 4,
        }
    }
}

impl TryFrom<i8> for Stage {
    type Error = String;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Ok(match value {
            -2 => Stage::AwaitingFirstContact,
            -1 => Stage::AwaitingServerAck,
            0 => Stage::CreatedUnjoined,
            1 => Stage::JoinedNoMoves,
            2 => Stage::OneSideMoved,
            3 => Stage::ClocksRunning,
            4 => Stage::Terminal,
            other => return Err(format!("unknown stage {other}")),
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Winner {
    None,
    Side1,
    Side2,
    Draw,
}

impl Winner {
    #[must_use]
    pub fn side(side: Side) -> Self {
        match side {
            Side::One => Winner::Side1,
            Side::Two => Winner::Side2,
        }
    }

    #[must_use]
    pub fn as_side(self) -> Option<Side> {
        match self {
            Winner::Side1 => Some(Side::One),
            Winner::Side2 => Some(Side::Two),
            Winner::None | Winner::Draw => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FinishReason {
    Goal,
    Time,
    Resign,
    Agreement,
    Abandon,
}

/// Base duration in minutes plus per-move increment in seconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeControl {
    pub duration: u32,
    pub increment: u32,
}

impl TimeControl {
    #[must_use]
    pub fn base_secs(self) -> u32 {
        self.duration.saturating_mul(60)
    }
}

/// One side's participant in a session.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Seat {
    #[serde(skip)]
    pub socket_id: Uuid,
    /// Authenticated identity token; `None` for guests.
    #[serde(skip)]
    pub identity: Option<String>,
    pub name: String,
    pub token: String,
    pub rating: RatingRecord,
    pub present: bool,
}

impl Seat {
    #[must_use]
    pub fn new(socket_id: Uuid, identity: Option<String>, name: String, token: String, rating: RatingRecord) -> Self {
        Self { socket_id, identity, name, token, rating, present: true }
    }
}

/// Cumulative results across rematches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    pub wins: [u32; 2],
    pub draws: u32,
}

/// Snapshot of the board after a committed move. Index 0 is the initial state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveHistoryEntry {
    pub index: usize,
    pub actions: Vec<Action>,
    pub grid: Grid,
    pub positions: [Pos; 2],
    pub time_left: [u32; 2],
    pub distances: [Option<u32>; 2],
    pub wall_counts: [u32; 2],
}

/// What `abandon` did to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Abandonment {
    /// Never got past the first move; drop it from the directory.
    Discard,
    /// Finished with a result; needs finalization.
    Finished,
    /// Already terminal; only presence changed.
    Unchanged,
}

// =============================================================================
// ERRORS
// =============================================================================

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("{op} is not allowed in stage {}", i8::from(*.stage))]
    WrongStage { op: &'static str, stage: Stage },
    #[error("it is not your turn")]
    NotYourTurn,
    #[error("move index {got} does not match expected {expected}")]
    Desync { expected: usize, got: usize },
    #[error("illegal move: {0}")]
    IllegalMove(#[from] MoveError),
    #[error("there is no pending offer to answer")]
    NoPendingOffer,
    #[error("nothing of yours to take back")]
    NothingToTakeBack,
    #[error("opponent has left the game")]
    OpponentAbsent,
    #[error("session already has two players")]
    AlreadyJoined,
    #[error("invalid board settings: {0}")]
    InvalidBoard(&'static str),
    #[error("claim does not match the game state")]
    ClaimRejected,
}

impl ErrorCode for SessionError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::WrongStage { .. } => "E_WRONG_STAGE",
            Self::NotYourTurn => "E_NOT_YOUR_TURN",
            Self::Desync { .. } => "E_DESYNC",
            Self::IllegalMove(e) => e.error_code(),
            Self::NoPendingOffer => "E_NO_PENDING_OFFER",
            Self::NothingToTakeBack => "E_NOTHING_TO_TAKE_BACK",
            Self::OpponentAbsent => "E_OPPONENT_ABSENT",
            Self::AlreadyJoined => "E_ALREADY_JOINED",
            Self::InvalidBoard(_) => "E_INVALID_BOARD",
            Self::ClaimRejected => "E_CLAIM_REJECTED",
        }
    }
}

// =============================================================================
// SESSION
// =============================================================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSession {
    join_code: String,
    seats: [Option<Seat>; 2],
    time_control: TimeControl,
    board_settings: BoardSettings,
    is_public: bool,
    first_mover: Side,
    history: Vec<MoveHistoryEntry>,
    time_left: [u32; 2],
    stage: Stage,
    winner: Winner,
    finish_reason: Option<FinishReason>,
    score: MatchScore,
    draw_offer: Option<Side>,
    takeback_request: Option<Side>,
    rematch_offer: Option<Side>,
    #[serde(skip)]
    finalizing: bool,
}

impl GameSession {
    /// Create an unjoined session (stage 0) with the creator in seat one.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBoard` if the board settings are malformed.
    pub fn new(
        join_code: String,
        creator: Seat,
        time_control: TimeControl,
        board_settings: BoardSettings,
        is_public: bool,
        first_mover: Side,
    ) -> Result<Self, SessionError> {
        board_settings.validate().map_err(SessionError::InvalidBoard)?;
        let time_left = [time_control.base_secs(); 2];
        let initial = initial_entry(&board_settings, time_left);
        Ok(Self {
            join_code,
            seats: [Some(creator), None],
            time_control,
            board_settings,
            is_public,
            first_mover,
            history: vec![initial],
            time_left,
            stage: Stage::CreatedUnjoined,
            winner: Winner::None,
            finish_reason: None,
            score: MatchScore::default(),
            draw_offer: None,
            takeback_request: None,
            rematch_offer: None,
            finalizing: false,
        })
    }

    /// Seat the joiner and start the game (stage 1).
    ///
    /// # Errors
    ///
    /// Returns `AlreadyJoined` if seat two is taken.
    pub fn join(&mut self, joiner: Seat) -> Result<(), SessionError> {
        if self.seats[1].is_some() || self.stage != Stage::CreatedUnjoined {
            return Err(SessionError::AlreadyJoined);
        }
        self.seats[1] = Some(joiner);
        self.stage = Stage::JoinedNoMoves;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // accessors
    // -------------------------------------------------------------------------

    #[must_use]
    pub fn join_code(&self) -> &str {
        &self.join_code
    }

    #[must_use]
    pub fn seat(&self, side: Side) -> Option<&Seat> {
        self.seats[side.index()].as_ref()
    }

    pub fn seat_mut(&mut self, side: Side) -> Option<&mut Seat> {
        self.seats[side.index()].as_mut()
    }

    /// Occupied seats with their sides.
    pub fn seats(&self) -> impl Iterator<Item = (Side, &Seat)> {
        Side::BOTH
            .into_iter()
            .filter_map(|s| self.seat(s).map(|seat| (s, seat)))
    }

    #[must_use]
    pub fn time_control(&self) -> TimeControl {
        self.time_control
    }

    #[must_use]
    pub fn board_settings(&self) -> &BoardSettings {
        &self.board_settings
    }

    #[must_use]
    pub fn is_public(&self) -> bool {
        self.is_public
    }

    #[must_use]
    pub fn first_mover(&self) -> Side {
        self.first_mover
    }

    #[must_use]
    pub fn history(&self) -> &[MoveHistoryEntry] {
        &self.history
    }

    /// The board as of the last committed move.
    #[must_use]
    pub fn current(&self) -> &MoveHistoryEntry {
        // history always holds the initial entry
        &self.history[self.history.len() - 1]
    }

    #[must_use]
    pub fn move_count(&self) -> usize {
        self.history.len() - 1
    }

    #[must_use]
    pub fn time_left(&self) -> [u32; 2] {
        self.time_left
    }

    #[must_use]
    pub fn stage(&self) -> Stage {
        self.stage
    }

    #[must_use]
    pub fn winner(&self) -> Winner {
        self.winner
    }

    #[must_use]
    pub fn finish_reason(&self) -> Option<FinishReason> {
        self.finish_reason
    }

    #[must_use]
    pub fn score(&self) -> MatchScore {
        self.score
    }

    #[must_use]
    pub fn is_finalizing(&self) -> bool {
        self.finalizing
    }

    pub fn set_finalizing(&mut self, finalizing: bool) {
        self.finalizing = finalizing;
    }

    /// Side whose move it is.
    #[must_use]
    pub fn turn(&self) -> Side {
        if self.move_count() % 2 == 0 { self.first_mover } else { self.first_mover.other() }
    }

    /// Number of moves `side` has committed in the current game.
    #[must_use]
    pub fn moves_by(&self, side: Side) -> usize {
        let moves = self.move_count();
        if side == self.first_mover { moves.div_ceil(2) } else { moves / 2 }
    }

    fn goals(&self) -> [Pos; 2] {
        self.board_settings.goal_pos
    }

    fn require_stage(&self, op: &'static str, allowed: &[Stage]) -> Result<(), SessionError> {
        if allowed.contains(&self.stage) {
            Ok(())
        } else {
            Err(SessionError::WrongStage { op, stage: self.stage })
        }
    }

    fn finish(&mut self, winner: Winner, reason: FinishReason) {
        self.winner = winner;
        self.finish_reason = Some(reason);
        self.stage = Stage::Terminal;
        self.draw_offer = None;
        self.takeback_request = None;
        self.rematch_offer = None;
        match winner.as_side() {
            Some(side) => self.score.wins[side.index()] += 1,
            None if winner == Winner::Draw => self.score.draws += 1,
            None => {}
        }
    }

    // -------------------------------------------------------------------------
    // moves and clocks
    // -------------------------------------------------------------------------

    /// Validate and commit a move for `side`.
    ///
    /// `move_index`, when given, is the history index the move will create;
    /// a mismatch means the client is out of sync and the move is dropped.
    ///
    /// # Errors
    ///
    /// Returns an error (and changes nothing) if the game is not ongoing, it
    /// is not `side`'s turn, the index is stale, or the move is illegal.
    pub fn commit_move(
        &mut self,
        side: Side,
        actions: Vec<Action>,
        move_index: Option<usize>,
    ) -> Result<&MoveHistoryEntry, SessionError> {
        if !self.stage.is_ongoing() {
            return Err(SessionError::WrongStage { op: "move", stage: self.stage });
        }
        if let Some(got) = move_index {
            let expected = self.history.len();
            if got != expected {
                return Err(SessionError::Desync { expected, got });
            }
        }
        if side != self.turn() {
            return Err(SessionError::NotYourTurn);
        }

        let goals = self.goals();
        let current = self.current();
        validate_move(&current.grid, &current.positions, &goals, side, &actions)?;

        let mut grid = current.grid.clone();
        let mut positions = current.positions;
        apply_move(&mut grid, &mut positions, side, &actions);

        if self.stage == Stage::ClocksRunning {
            let left = &mut self.time_left[side.index()];
            *left = left.saturating_add(self.time_control.increment);
        }

        let entry = MoveHistoryEntry {
            index: self.history.len(),
            actions,
            distances: goal_distances(&grid, &positions, &goals),
            wall_counts: [grid.wall_count(Side::One), grid.wall_count(Side::Two)],
            grid,
            positions,
            time_left: self.time_left,
        };
        self.history.push(entry);
        self.stage = Stage::for_moves(self.move_count());
        self.draw_offer = None;
        self.takeback_request = None;

        if positions[side.index()] == goals[side.index()] {
            self.finish_on_goal(side);
        }
        Ok(self.current())
    }

    /// Goal result for `side`, including the handicap draw for the first mover.
    fn finish_on_goal(&mut self, side: Side) {
        let other = side.other();
        let current = self.current();
        let other_close = reachable_within(
            &current.grid,
            current.positions[other.index()],
            self.goals()[other.index()],
            HANDICAP_HOPS,
        );
        if side == self.first_mover && other_close {
            self.finish(Winner::Draw, FinishReason::Goal);
        } else {
            self.finish(Winner::side(side), FinishReason::Goal);
        }
    }

    /// Advance the running clock by one second. Returns `true` if this tick
    /// ended the game on time.
    pub fn tick(&mut self) -> bool {
        if self.stage != Stage::ClocksRunning {
            return false;
        }
        let turn = self.turn();
        let left = &mut self.time_left[turn.index()];
        *left = left.saturating_sub(1);
        if *left == 0 {
            self.finish(Winner::side(turn.other()), FinishReason::Time);
            return true;
        }
        false
    }

    /// Add `EXTRA_TIME_SECS` to the opponent's clock.
    ///
    /// # Errors
    ///
    /// Only allowed while clocks are running.
    pub fn give_extra_time(&mut self, side: Side) -> Result<u32, SessionError> {
        self.require_stage("giveExtraTime", &[Stage::ClocksRunning])?;
        let left = &mut self.time_left[side.other().index()];
        *left = left.saturating_add(EXTRA_TIME_SECS);
        Ok(*left)
    }

    /// Honour a client's claim that `winner` won on time, if the server
    /// clock agrees within tolerance.
    ///
    /// # Errors
    ///
    /// `ClaimRejected` when the loser is not on move or still has time.
    pub fn claim_time_win(&mut self, winner: Side) -> Result<(), SessionError> {
        self.require_stage("playerWonOnTime", &[Stage::ClocksRunning])?;
        let loser = winner.other();
        if self.turn() != loser || self.time_left[loser.index()] > TIME_CLAIM_TOLERANCE_SECS {
            return Err(SessionError::ClaimRejected);
        }
        self.time_left[loser.index()] = 0;
        self.finish(Winner::side(winner), FinishReason::Time);
        Ok(())
    }

    /// Honour a client's claim that `winner` reached its goal.
    ///
    /// # Errors
    ///
    /// `ClaimRejected` unless `winner`'s token stands on its goal.
    pub fn claim_goal(&mut self, winner: Side) -> Result<(), SessionError> {
        if !self.stage.is_ongoing() {
            return Err(SessionError::WrongStage { op: "playerReachedGoal", stage: self.stage });
        }
        if self.current().positions[winner.index()] != self.goals()[winner.index()] {
            return Err(SessionError::ClaimRejected);
        }
        self.finish_on_goal(winner);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // resign / draw
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Only allowed while clocks are running.
    pub fn resign(&mut self, side: Side) -> Result<(), SessionError> {
        self.require_stage("resign", &[Stage::ClocksRunning])?;
        self.finish(Winner::side(side.other()), FinishReason::Resign);
        Ok(())
    }

    /// # Errors
    ///
    /// Only allowed while clocks are running.
    pub fn offer_draw(&mut self, side: Side) -> Result<(), SessionError> {
        self.require_stage("offerDraw", &[Stage::ClocksRunning])?;
        self.draw_offer = Some(side);
        Ok(())
    }

    /// # Errors
    ///
    /// Requires a pending offer from the opponent while clocks are running.
    pub fn accept_draw(&mut self, side: Side) -> Result<(), SessionError> {
        self.require_stage("acceptDraw", &[Stage::ClocksRunning])?;
        if self.draw_offer != Some(side.other()) {
            return Err(SessionError::NoPendingOffer);
        }
        self.finish(Winner::Draw, FinishReason::Agreement);
        Ok(())
    }

    /// # Errors
    ///
    /// Requires a pending offer from the opponent.
    pub fn reject_draw(&mut self, side: Side) -> Result<(), SessionError> {
        if self.draw_offer != Some(side.other()) {
            return Err(SessionError::NoPendingOffer);
        }
        self.draw_offer = None;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // takeback
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Allowed in stages 2 and 3, and only once the requester has moved.
    pub fn request_takeback(&mut self, side: Side) -> Result<(), SessionError> {
        self.require_stage("requestTakeback", &[Stage::OneSideMoved, Stage::ClocksRunning])?;
        if self.moves_by(side) == 0 {
            return Err(SessionError::NothingToTakeBack);
        }
        self.takeback_request = Some(side);
        Ok(())
    }

    /// Undo the requester's last move. Removes one entry, or two when the
    /// requester is currently on move, then restores board and clocks from
    /// the surviving last entry.
    ///
    /// # Errors
    ///
    /// Requires a pending request from the opponent in stage 2 or 3.
    pub fn accept_takeback(&mut self, side: Side) -> Result<usize, SessionError> {
        self.require_stage("acceptTakeback", &[Stage::OneSideMoved, Stage::ClocksRunning])?;
        let requester = side.other();
        if self.takeback_request != Some(requester) {
            return Err(SessionError::NoPendingOffer);
        }
        let requester_on_move = self.turn() == requester;
        let undo = if requester_on_move { 2 } else { 1 };
        let keep = self.history.len().saturating_sub(undo).max(1);
        self.history.truncate(keep);

        self.time_left = self.current().time_left;
        self.stage = Stage::for_moves(self.move_count());
        self.takeback_request = None;
        self.draw_offer = None;
        Ok(self.move_count())
    }

    /// # Errors
    ///
    /// Requires a pending request from the opponent.
    pub fn reject_takeback(&mut self, side: Side) -> Result<(), SessionError> {
        if self.takeback_request != Some(side.other()) {
            return Err(SessionError::NoPendingOffer);
        }
        self.takeback_request = None;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // rematch
    // -------------------------------------------------------------------------

    /// # Errors
    ///
    /// Only from a finished game with the opponent still present.
    pub fn offer_rematch(&mut self, side: Side) -> Result<(), SessionError> {
        self.require_stage("offerRematch", &[Stage::Terminal])?;
        if !self.seat(side.other()).is_some_and(|s| s.present) {
            return Err(SessionError::OpponentAbsent);
        }
        self.rematch_offer = Some(side);
        Ok(())
    }

    /// Start a fresh game on the same board. The first mover flips; score
    /// and ratings carry over.
    ///
    /// # Errors
    ///
    /// Requires a pending offer from the opponent in stage 4.
    pub fn accept_rematch(&mut self, side: Side) -> Result<(), SessionError> {
        self.require_stage("acceptRematch", &[Stage::Terminal])?;
        if self.rematch_offer != Some(side.other()) {
            return Err(SessionError::NoPendingOffer);
        }
        self.first_mover = self.first_mover.other();
        self.time_left = [self.time_control.base_secs(); 2];
        self.history = vec![initial_entry(&self.board_settings, self.time_left)];
        self.winner = Winner::None;
        self.finish_reason = None;
        self.stage = Stage::JoinedNoMoves;
        self.rematch_offer = None;
        Ok(())
    }

    /// # Errors
    ///
    /// Requires a pending offer from the opponent.
    pub fn reject_rematch(&mut self, side: Side) -> Result<(), SessionError> {
        if self.rematch_offer != Some(side.other()) {
            return Err(SessionError::NoPendingOffer);
        }
        self.rematch_offer = None;
        Ok(())
    }

    // -------------------------------------------------------------------------
    // presence
    // -------------------------------------------------------------------------

    pub fn set_presence(&mut self, side: Side, present: bool) {
        if let Some(seat) = self.seat_mut(side) {
            seat.present = present;
        }
        if !present && self.rematch_offer.is_some() {
            self.rematch_offer = None;
        }
    }

    /// Point `side` at a new connection after a reconnect and mark it present.
    pub fn rebind_socket(&mut self, side: Side, socket_id: Uuid) {
        if let Some(seat) = self.seat_mut(side) {
            seat.socket_id = socket_id;
            seat.present = true;
        }
    }

    #[must_use]
    pub fn both_left(&self) -> bool {
        Side::BOTH
            .iter()
            .all(|s| self.seat(*s).is_none_or(|seat| !seat.present))
    }

    /// `side` walked away to another game.
    ///
    /// Games that never got past the first move are discarded. Otherwise,
    /// if the side to move still has time the side not on move wins by
    /// abandonment; if not, the side to move loses on time.
    pub fn abandon(&mut self, side: Side) -> Abandonment {
        self.set_presence(side, false);
        if !self.stage.is_ongoing() {
            return Abandonment::Unchanged;
        }
        if self.move_count() <= 1 {
            return Abandonment::Discard;
        }
        let turn = self.turn();
        let reason = if self.time_left[turn.index()] > 0 { FinishReason::Abandon } else { FinishReason::Time };
        self.finish(Winner::side(turn.other()), reason);
        Abandonment::Finished
    }
}

fn initial_entry(settings: &BoardSettings, time_left: [u32; 2]) -> MoveHistoryEntry {
    let grid = settings.empty_grid();
    let positions = settings.start_pos;
    MoveHistoryEntry {
        index: 0,
        actions: Vec::new(),
        distances: goal_distances(&grid, &positions, &settings.goal_pos),
        wall_counts: [0, 0],
        grid,
        positions,
        time_left,
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
