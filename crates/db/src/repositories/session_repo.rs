//! Refresh-token sessions in `user_sessions`.
//!
//! Only the SHA-256 of a refresh token is stored. A token is single use:
//! [`SessionRepo::claim`] revokes the row in the same statement that finds it.

use lao_cinema_core::types::{DbId, Timestamp};
use sqlx::PgPool;

use crate::models::session::{CreateSession, UserSession};

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, is_revoked, \
                       user_agent, ip_address, created_at, updated_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &PgPool, input: &CreateSession) -> Result<UserSession, sqlx::Error> {
        let query = format!(
            "INSERT INTO user_sessions (user_id, refresh_token_hash, expires_at, user_agent, ip_address)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .bind(&input.user_agent)
            .bind(&input.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Consume a live session by refresh-token hash.
    ///
    /// Returns the now-revoked row, or `None` when the token is unknown,
    /// expired or already used. Of two concurrent claims for the same hash
    /// only one gets a row back.
    pub async fn claim(
        pool: &PgPool,
        refresh_token_hash: &str,
        now: Timestamp,
    ) -> Result<Option<UserSession>, sqlx::Error> {
        let query = format!(
            "UPDATE user_sessions SET is_revoked = true
             WHERE refresh_token_hash = $1 AND NOT is_revoked AND expires_at > $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, UserSession>(&query)
            .bind(refresh_token_hash)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Revoke every live session of a user.
    pub async fn revoke_all_for_user(pool: &PgPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE user_sessions SET is_revoked = true
             WHERE user_id = $1 AND NOT is_revoked",
        )
        .bind(user_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete sessions that expired or were revoked before `cutoff`.
    pub async fn purge_dead(pool: &PgPool, cutoff: Timestamp) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM user_sessions
             WHERE expires_at < $1 OR (is_revoked AND updated_at < $1)",
        )
        .bind(cutoff)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
