//! Repository for the `rentals` table.
//!
//! Every lookup is scoped to one [`Renter`]; only `completed` payments
//! count towards access.

use lao_cinema_core::rental::{blocks_new_rental, Renter};
use lao_cinema_core::types::{DbId, Timestamp};
use sqlx::postgres::PgArguments;
use sqlx::query::QueryAs;
use sqlx::{PgExecutor, PgPool, Postgres};

use crate::models::rental::{CreateRental, MigrationSummary, Rental};
use crate::repositories::watch_progress_repo::WatchProgressRepo;

const COLUMNS: &str = "r.id, r.user_id, r.anonymous_id, r.movie_id, r.pack_id, \
                        r.payment_reference, r.amount_cents, r.currency, r.payment_status, \
                        r.purchased_at, r.expires_at, r.created_at";

pub struct RentalRepo;

impl RentalRepo {
    pub async fn create<'e>(
        executor: impl PgExecutor<'e>,
        input: &CreateRental,
    ) -> Result<Rental, sqlx::Error> {
        let query = format!(
            "INSERT INTO rentals AS r
                (user_id, anonymous_id, movie_id, pack_id, payment_reference,
                 amount_cents, currency, purchased_at, expires_at)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Rental>(&query)
            .bind(input.user_id)
            .bind(&input.anonymous_id)
            .bind(input.movie_id)
            .bind(input.pack_id)
            .bind(&input.payment_reference)
            .bind(input.amount_cents)
            .bind(&input.currency)
            .bind(input.purchased_at)
            .bind(input.expires_at)
            .fetch_one(executor)
            .await
    }

    /// Insert `input` unless `renter` already holds an active rental of the
    /// same movie or pack at `now`. Returns `None` in that case.
    ///
    /// The check and the insert run in one transaction under an advisory
    /// lock on renter and target, so concurrent requests for the same pair
    /// are serialized and at most one of them inserts.
    pub async fn create_if_no_active(
        pool: &PgPool,
        renter: &Renter,
        input: &CreateRental,
        now: Timestamp,
    ) -> Result<Option<Rental>, sqlx::Error> {
        let (target_clause, target_id, lock_key) = match (input.movie_id, input.pack_id) {
            (_, Some(pack_id)) => (
                "r.pack_id = $2",
                pack_id,
                format!("rental:{}:pack:{pack_id}", renter.rate_limit_key()),
            ),
            (movie_id, None) => {
                let movie_id = movie_id.unwrap_or_default();
                (
                    "r.movie_id = $2",
                    movie_id,
                    format!("rental:{}:movie:{movie_id}", renter.rate_limit_key()),
                )
            }
        };

        let mut tx = pool.begin().await?;
        sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
            .bind(&lock_key)
            .execute(&mut *tx)
            .await?;

        let query = format!(
            "SELECT {COLUMNS} FROM rentals r
             WHERE {} AND {target_clause} AND r.payment_status = 'completed'
             ORDER BY r.expires_at DESC
             LIMIT 1",
            owner_clause(renter)
        );
        let latest = bind_renter(sqlx::query_as::<_, Rental>(&query), renter)
            .bind(target_id)
            .fetch_optional(&mut *tx)
            .await?;
        if blocks_new_rental(latest.map(|r| r.window()).as_ref(), now) {
            tx.rollback().await?;
            tracing::debug!(%lock_key, "Active rental already held");
            return Ok(None);
        }

        let rental = Self::create(&mut *tx, input).await?;
        tx.commit().await?;
        Ok(Some(rental))
    }

    /// The direct rental of `movie_id` with the latest expiry.
    pub async fn find_latest_direct(
        pool: &PgPool,
        renter: &Renter,
        movie_id: DbId,
    ) -> Result<Option<Rental>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rentals r
             WHERE {} AND r.movie_id = $2 AND r.payment_status = 'completed'
             ORDER BY r.expires_at DESC
             LIMIT 1",
            owner_clause(renter)
        );
        bind_renter(sqlx::query_as::<_, Rental>(&query), renter)
            .bind(movie_id)
            .fetch_optional(pool)
            .await
    }

    /// The rental, with the latest expiry, of any pack containing `movie_id`.
    pub async fn find_latest_pack_for_movie(
        pool: &PgPool,
        renter: &Renter,
        movie_id: DbId,
    ) -> Result<Option<Rental>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rentals r
             JOIN short_pack_items i ON i.pack_id = r.pack_id
             WHERE {} AND i.movie_id = $2 AND r.payment_status = 'completed'
             ORDER BY r.expires_at DESC
             LIMIT 1",
            owner_clause(renter)
        );
        bind_renter(sqlx::query_as::<_, Rental>(&query), renter)
            .bind(movie_id)
            .fetch_optional(pool)
            .await
    }

    /// The rental of `pack_id` itself with the latest expiry.
    pub async fn find_latest_for_pack(
        pool: &PgPool,
        renter: &Renter,
        pack_id: DbId,
    ) -> Result<Option<Rental>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rentals r
             WHERE {} AND r.pack_id = $2 AND r.payment_status = 'completed'
             ORDER BY r.expires_at DESC
             LIMIT 1",
            owner_clause(renter)
        );
        bind_renter(sqlx::query_as::<_, Rental>(&query), renter)
            .bind(pack_id)
            .fetch_optional(pool)
            .await
    }

    /// All of a renter's rentals, newest purchase first.
    ///
    /// Unless `include_expired` is set, only rentals expiring after
    /// `cutoff` are returned (callers pass `now - grace`).
    pub async fn list_for_renter(
        pool: &PgPool,
        renter: &Renter,
        include_expired: bool,
        cutoff: Timestamp,
    ) -> Result<Vec<Rental>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM rentals r
             WHERE {} AND ($2 OR r.expires_at > $3)
             ORDER BY r.purchased_at DESC, r.id DESC",
            owner_clause(renter)
        );
        bind_renter(sqlx::query_as::<_, Rental>(&query), renter)
            .bind(include_expired)
            .bind(cutoff)
            .fetch_all(pool)
            .await
    }

    /// Re-home an anonymous visitor's rentals and watch progress onto a user.
    ///
    /// Runs in one transaction. Where both identities have progress for the
    /// same movie, the most recently updated row wins.
    pub async fn migrate_anonymous(
        pool: &PgPool,
        anonymous_id: &str,
        user_id: DbId,
    ) -> Result<MigrationSummary, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let rentals = sqlx::query(
            "UPDATE rentals SET user_id = $2, anonymous_id = NULL WHERE anonymous_id = $1",
        )
        .bind(anonymous_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        let watch_progress =
            WatchProgressRepo::merge_anonymous(&mut tx, anonymous_id, user_id).await?;

        tx.commit().await?;
        tracing::info!(user_id, rentals, watch_progress, "Migrated anonymous viewer data");
        Ok(MigrationSummary {
            rentals,
            watch_progress,
        })
    }
}

/// Ownership predicate; the renter is always bound as `$1`.
fn owner_clause(renter: &Renter) -> &'static str {
    match renter {
        Renter::User(_) => "r.user_id = $1",
        Renter::Anonymous(_) => "r.anonymous_id = $1",
    }
}

fn bind_renter<'q, O>(
    q: QueryAs<'q, Postgres, O, PgArguments>,
    renter: &'q Renter,
) -> QueryAs<'q, Postgres, O, PgArguments> {
    match renter {
        Renter::User(id) => q.bind(*id),
        Renter::Anonymous(aid) => q.bind(aid.as_str()),
    }
}
