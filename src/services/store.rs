//! Store service — persistence seam for finished games and player records.
//!
//! DESIGN
//! ======
//! Gameplay never depends on the store. Every caller treats a `StoreError`
//! as "unavailable" and degrades: default ratings, not-found replies, empty
//! rankings. `NullStore` is the always-unavailable implementation used when
//! no database is configured; `PgStore` writes through the shared SQLx pool.
//!
//! Finished games are stored as one JSONB document plus the columns the
//! random-game and per-player lookups filter on. Identity tokens are kept in
//! their own columns and never appear in the document sent to clients.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use super::rating::RatingRecord;
use crate::game::board::{BoardSettings, Side};
use crate::game::legality::Action;
use crate::game::session::{FinishReason, GameSession, TimeControl, Winner};

/// Games with at least this many moves are preferred by `get_random_game`.
pub const RANDOM_GAME_MIN_MOVES: i32 = 20;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable")]
    Unavailable,
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::protocol::ErrorCode for StoreError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::Unavailable => "E_STORE_UNAVAILABLE",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        true
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredPlayer {
    #[serde(skip)]
    pub identity: Option<String>,
    pub name: String,
    pub token: String,
    pub rating: RatingRecord,
}

/// A finished game as persisted and as served by `getGame`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredGame {
    pub id: Uuid,
    pub join_code: String,
    pub players: [StoredPlayer; 2],
    pub time_control: TimeControl,
    pub board_settings: BoardSettings,
    pub first_mover: Side,
    pub moves: Vec<Vec<Action>>,
    pub winner: Winner,
    pub finish_reason: Option<FinishReason>,
}

impl StoredGame {
    /// Snapshot a session for storage. Ratings are the pre-game values.
    #[must_use]
    pub fn from_session(session: &GameSession) -> Self {
        let player = |side: Side| {
            session
                .seat(side)
                .map(|seat| StoredPlayer {
                    identity: seat.identity.clone(),
                    name: seat.name.clone(),
                    token: seat.token.clone(),
                    rating: seat.rating,
                })
                .unwrap_or_else(|| StoredPlayer {
                    identity: None,
                    name: String::new(),
                    token: String::new(),
                    rating: RatingRecord::default(),
                })
        };
        Self {
            id: Uuid::new_v4(),
            join_code: session.join_code().to_string(),
            players: [player(Side::One), player(Side::Two)],
            time_control: session.time_control(),
            board_settings: session.board_settings().clone(),
            first_mover: session.first_mover(),
            moves: session
                .history()
                .iter()
                .skip(1)
                .map(|e| e.actions.clone())
                .collect(),
            winner: session.winner(),
            finish_reason: session.finish_reason(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub name: String,
    pub rating: f64,
}

// =============================================================================
// TRAIT
// =============================================================================

/// Persistence collaborator.
#[async_trait::async_trait]
pub trait GameStore: Send + Sync {
    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the write fails.
    async fn store_game(&self, game: &StoredGame) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the read fails.
    async fn get_pseudo_player(&self, identity: &str) -> Result<Option<RatingRecord>, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the write fails.
    async fn save_pseudo_player(&self, identity: &str, name: &str, rating: RatingRecord) -> Result<(), StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the read fails.
    async fn get_game(&self, id: Uuid) -> Result<Option<StoredGame>, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the read fails.
    async fn get_random_game(&self) -> Result<Option<StoredGame>, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the read fails.
    async fn get_ranking(&self, count: u32) -> Result<Vec<RankingEntry>, StoreError>;

    /// # Errors
    ///
    /// Returns a `StoreError` when the store is unavailable or the write fails.
    async fn add_pseudo_player_solved_puzzle(&self, identity: &str, name: &str, puzzle_id: &str)
    -> Result<(), StoreError>;
}

// =============================================================================
// NULL STORE
// =============================================================================

/// Always unavailable. Used when `DATABASE_URL` is unset or unreachable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullStore;

#[async_trait::async_trait]
impl GameStore for NullStore {
    async fn store_game(&self, _game: &StoredGame) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn get_pseudo_player(&self, _identity: &str) -> Result<Option<RatingRecord>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn save_pseudo_player(&self, _identity: &str, _name: &str, _rating: RatingRecord) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn get_game(&self, _id: Uuid) -> Result<Option<StoredGame>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn get_random_game(&self) -> Result<Option<StoredGame>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn get_ranking(&self, _count: u32) -> Result<Vec<RankingEntry>, StoreError> {
        Err(StoreError::Unavailable)
    }

    async fn add_pseudo_player_solved_puzzle(
        &self,
        _identity: &str,
        _name: &str,
        _puzzle_id: &str,
    ) -> Result<(), StoreError> {
        Err(StoreError::Unavailable)
    }
}

// =============================================================================
// POSTGRES STORE
// =============================================================================

pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

type GameRow = (Json<StoredGame>, Option<String>, Option<String>);

fn restore_identities((Json(mut game), identity1, identity2): GameRow) -> StoredGame {
    game.players[0].identity = identity1;
    game.players[1].identity = identity2;
    game
}

#[async_trait::async_trait]
impl GameStore for PgStore {
    async fn store_game(&self, game: &StoredGame) -> Result<(), StoreError> {
        let move_count = i32::try_from(game.moves.len()).unwrap_or(i32::MAX);
        sqlx::query(
            "INSERT INTO games (id, identity1, identity2, move_count, data)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(game.id)
        .bind(game.players[0].identity.as_deref())
        .bind(game.players[1].identity.as_deref())
        .bind(move_count)
        .bind(Json(game))
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_pseudo_player(&self, identity: &str) -> Result<Option<RatingRecord>, StoreError> {
        let row = sqlx::query_as::<_, (f64, f64, f64)>(
            "SELECT rating, deviation, volatility FROM pseudo_players WHERE identity = $1",
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|(rating, deviation, volatility)| RatingRecord { rating, deviation, volatility }))
    }

    async fn save_pseudo_player(&self, identity: &str, name: &str, rating: RatingRecord) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO pseudo_players (identity, name, rating, deviation, volatility)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT (identity) DO UPDATE
             SET name = EXCLUDED.name,
                 rating = EXCLUDED.rating,
                 deviation = EXCLUDED.deviation,
                 volatility = EXCLUDED.volatility,
                 updated_at = now()",
        )
        .bind(identity)
        .bind(name)
        .bind(rating.rating)
        .bind(rating.deviation)
        .bind(rating.volatility)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_game(&self, id: Uuid) -> Result<Option<StoredGame>, StoreError> {
        let row = sqlx::query_as::<_, GameRow>("SELECT data, identity1, identity2 FROM games WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(restore_identities))
    }

    async fn get_random_game(&self) -> Result<Option<StoredGame>, StoreError> {
        let row = sqlx::query_as::<_, GameRow>(
            "SELECT data, identity1, identity2 FROM games
             ORDER BY (move_count >= $1) DESC, random()
             LIMIT 1",
        )
        .bind(RANDOM_GAME_MIN_MOVES)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(restore_identities))
    }

    async fn get_ranking(&self, count: u32) -> Result<Vec<RankingEntry>, StoreError> {
        let rows = sqlx::query_as::<_, (String, f64)>(
            "SELECT name, rating FROM pseudo_players ORDER BY rating DESC LIMIT $1",
        )
        .bind(i64::from(count))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .into_iter()
            .map(|(name, rating)| RankingEntry { name, rating })
            .collect())
    }

    async fn add_pseudo_player_solved_puzzle(
        &self,
        identity: &str,
        name: &str,
        puzzle_id: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO solved_puzzles (identity, name, puzzle_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (identity, puzzle_id) DO NOTHING",
        )
        .bind(identity)
        .bind(name)
        .bind(puzzle_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
