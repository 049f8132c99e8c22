//! Repository for the `watch_progress` table.

use lao_cinema_core::progress::NormalizedProgress;
use lao_cinema_core::rental::Renter;
use lao_cinema_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::watch_progress::WatchProgress;

const COLUMNS: &str =
    "id, user_id, anonymous_id, movie_id, position_secs, duration_secs, completed, updated_at";

pub struct WatchProgressRepo;

impl WatchProgressRepo {
    /// Insert or overwrite the renter's progress for a movie.
    pub async fn upsert(
        pool: &PgPool,
        renter: &Renter,
        movie_id: DbId,
        progress: &NormalizedProgress,
    ) -> Result<WatchProgress, sqlx::Error> {
        let (owner_column, conflict_target) = match renter {
            Renter::User(_) => ("user_id", "(user_id, movie_id) WHERE user_id IS NOT NULL"),
            Renter::Anonymous(_) => (
                "anonymous_id",
                "(anonymous_id, movie_id) WHERE anonymous_id IS NOT NULL",
            ),
        };
        let query = format!(
            "INSERT INTO watch_progress ({owner_column}, movie_id, position_secs, duration_secs, completed)
             VALUES ($1, $2, $3, $4, $5)
             ON CONFLICT {conflict_target} DO UPDATE SET
                position_secs = EXCLUDED.position_secs,
                duration_secs = EXCLUDED.duration_secs,
                completed = EXCLUDED.completed,
                updated_at = NOW()
             RETURNING {COLUMNS}"
        );
        let q = sqlx::query_as::<_, WatchProgress>(&query);
        let q = match renter {
            Renter::User(id) => q.bind(*id),
            Renter::Anonymous(aid) => q.bind(aid.as_str()),
        };
        q.bind(movie_id)
            .bind(progress.position_secs)
            .bind(progress.duration_secs)
            .bind(progress.completed)
            .fetch_one(pool)
            .await
    }

    pub async fn find(
        pool: &PgPool,
        renter: &Renter,
        movie_id: DbId,
    ) -> Result<Option<WatchProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM watch_progress WHERE {} AND movie_id = $2",
            owner_clause(renter)
        );
        let q = sqlx::query_as::<_, WatchProgress>(&query);
        let q = match renter {
            Renter::User(id) => q.bind(*id),
            Renter::Anonymous(aid) => q.bind(aid.as_str()),
        };
        q.bind(movie_id).fetch_optional(pool).await
    }

    /// Unfinished movies, most recently watched first.
    pub async fn continue_watching(
        pool: &PgPool,
        renter: &Renter,
        limit: i64,
    ) -> Result<Vec<WatchProgress>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM watch_progress
             WHERE {} AND NOT completed
             ORDER BY updated_at DESC, id DESC
             LIMIT $2",
            owner_clause(renter)
        );
        let q = sqlx::query_as::<_, WatchProgress>(&query);
        let q = match renter {
            Renter::User(id) => q.bind(*id),
            Renter::Anonymous(aid) => q.bind(aid.as_str()),
        };
        q.bind(limit).fetch_all(pool).await
    }

    /// Fold an anonymous visitor's progress into a user's inside `tx`.
    ///
    /// Returns the number of user rows created or overwritten.
    pub async fn merge_anonymous(
        tx: &mut Transaction<'_, Postgres>,
        anonymous_id: &str,
        user_id: DbId,
    ) -> Result<u64, sqlx::Error> {
        let overwritten = sqlx::query(
            "UPDATE watch_progress u SET
                position_secs = a.position_secs,
                duration_secs = a.duration_secs,
                completed = a.completed,
                updated_at = a.updated_at
             FROM watch_progress a
             WHERE u.user_id = $2
               AND a.anonymous_id = $1
               AND a.movie_id = u.movie_id
               AND a.updated_at > u.updated_at",
        )
        .bind(anonymous_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        sqlx::query(
            "DELETE FROM watch_progress a
             WHERE a.anonymous_id = $1
               AND EXISTS (SELECT 1 FROM watch_progress u
                           WHERE u.user_id = $2 AND u.movie_id = a.movie_id)",
        )
        .bind(anonymous_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?;

        let moved = sqlx::query(
            "UPDATE watch_progress SET user_id = $2, anonymous_id = NULL WHERE anonymous_id = $1",
        )
        .bind(anonymous_id)
        .bind(user_id)
        .execute(&mut **tx)
        .await?
        .rows_affected();

        Ok(overwritten + moved)
    }
}

fn owner_clause(renter: &Renter) -> &'static str {
    match renter {
        Renter::User(_) => "user_id = $1",
        Renter::Anonymous(_) => "anonymous_id = $1",
    }
}
