//! Repository for cast and crew credits and their translated labels.

use lao_cinema_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::credit::{
    CastCredit, CastTranslation, CreateCastCredit, CreateCrewCredit, CreditText, CrewCredit,
    CrewTranslation, UpdateCastCredit, UpdateCrewCredit,
};

const CAST_COLUMNS: &str = "id, movie_id, person_id, display_order, created_at";
const CREW_COLUMNS: &str = "id, movie_id, person_id, department, display_order, created_at";

pub struct CreditRepo;

impl CreditRepo {
    // -----------------------------------------------------------------------
    // Cast
    // -----------------------------------------------------------------------

    pub async fn list_cast(pool: &PgPool, movie_id: DbId) -> Result<Vec<CastCredit>, sqlx::Error> {
        let query = format!(
            "SELECT {CAST_COLUMNS} FROM movie_cast
             WHERE movie_id = $1 ORDER BY display_order, id"
        );
        sqlx::query_as::<_, CastCredit>(&query)
            .bind(movie_id)
            .fetch_all(pool)
            .await
    }

    pub async fn cast_translations(
        pool: &PgPool,
        cast_ids: &[DbId],
    ) -> Result<Vec<CastTranslation>, sqlx::Error> {
        if cast_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CastTranslation>(
            "SELECT cast_id, language, character_name FROM movie_cast_translations
             WHERE cast_id = ANY($1) ORDER BY cast_id, language",
        )
        .bind(cast_ids)
        .fetch_all(pool)
        .await
    }

    /// Add a cast member. Without an explicit `display_order` the credit is
    /// appended after the current last one.
    pub async fn add_cast(
        pool: &PgPool,
        movie_id: DbId,
        input: &CreateCastCredit,
    ) -> Result<CastCredit, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO movie_cast (movie_id, person_id, display_order)
             VALUES ($1, $2, COALESCE($3,
                (SELECT COALESCE(MAX(display_order) + 1, 0) FROM movie_cast WHERE movie_id = $1)))
             RETURNING {CAST_COLUMNS}"
        );
        let credit = sqlx::query_as::<_, CastCredit>(&query)
            .bind(movie_id)
            .bind(input.person_id)
            .bind(input.display_order)
            .fetch_one(&mut *tx)
            .await?;
        Self::replace_cast_names(&mut tx, credit.id, &input.character_names).await?;
        tx.commit().await?;
        Ok(credit)
    }

    /// Returns `None` if the credit does not belong to `movie_id`.
    pub async fn update_cast(
        pool: &PgPool,
        movie_id: DbId,
        cast_id: DbId,
        input: &UpdateCastCredit,
    ) -> Result<Option<CastCredit>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE movie_cast SET display_order = COALESCE($3, display_order)
             WHERE id = $1 AND movie_id = $2
             RETURNING {CAST_COLUMNS}"
        );
        let Some(credit) = sqlx::query_as::<_, CastCredit>(&query)
            .bind(cast_id)
            .bind(movie_id)
            .bind(input.display_order)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        if let Some(names) = &input.character_names {
            Self::replace_cast_names(&mut tx, credit.id, names).await?;
        }
        tx.commit().await?;
        Ok(Some(credit))
    }

    pub async fn remove_cast(pool: &PgPool, movie_id: DbId, cast_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movie_cast WHERE id = $1 AND movie_id = $2")
            .bind(cast_id)
            .bind(movie_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Crew
    // -----------------------------------------------------------------------

    pub async fn list_crew(pool: &PgPool, movie_id: DbId) -> Result<Vec<CrewCredit>, sqlx::Error> {
        let query = format!(
            "SELECT {CREW_COLUMNS} FROM movie_crew
             WHERE movie_id = $1 ORDER BY display_order, id"
        );
        sqlx::query_as::<_, CrewCredit>(&query)
            .bind(movie_id)
            .fetch_all(pool)
            .await
    }

    pub async fn crew_translations(
        pool: &PgPool,
        crew_ids: &[DbId],
    ) -> Result<Vec<CrewTranslation>, sqlx::Error> {
        if crew_ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_as::<_, CrewTranslation>(
            "SELECT crew_id, language, job FROM movie_crew_translations
             WHERE crew_id = ANY($1) ORDER BY crew_id, language",
        )
        .bind(crew_ids)
        .fetch_all(pool)
        .await
    }

    pub async fn add_crew(
        pool: &PgPool,
        movie_id: DbId,
        input: &CreateCrewCredit,
    ) -> Result<CrewCredit, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO movie_crew (movie_id, person_id, department, display_order)
             VALUES ($1, $2, $3, COALESCE($4,
                (SELECT COALESCE(MAX(display_order) + 1, 0) FROM movie_crew WHERE movie_id = $1)))
             RETURNING {CREW_COLUMNS}"
        );
        let credit = sqlx::query_as::<_, CrewCredit>(&query)
            .bind(movie_id)
            .bind(input.person_id)
            .bind(input.department.trim())
            .bind(input.display_order)
            .fetch_one(&mut *tx)
            .await?;
        Self::replace_crew_jobs(&mut tx, credit.id, &input.jobs).await?;
        tx.commit().await?;
        Ok(credit)
    }

    pub async fn update_crew(
        pool: &PgPool,
        movie_id: DbId,
        crew_id: DbId,
        input: &UpdateCrewCredit,
    ) -> Result<Option<CrewCredit>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE movie_crew SET display_order = COALESCE($3, display_order)
             WHERE id = $1 AND movie_id = $2
             RETURNING {CREW_COLUMNS}"
        );
        let Some(credit) = sqlx::query_as::<_, CrewCredit>(&query)
            .bind(crew_id)
            .bind(movie_id)
            .bind(input.display_order)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        if let Some(jobs) = &input.jobs {
            Self::replace_crew_jobs(&mut tx, credit.id, jobs).await?;
        }
        tx.commit().await?;
        Ok(Some(credit))
    }

    pub async fn remove_crew(pool: &PgPool, movie_id: DbId, crew_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM movie_crew WHERE id = $1 AND movie_id = $2")
            .bind(crew_id)
            .bind(movie_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn replace_cast_names(
        tx: &mut Transaction<'_, Postgres>,
        cast_id: DbId,
        names: &[CreditText],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM movie_cast_translations WHERE cast_id = $1")
            .bind(cast_id)
            .execute(&mut **tx)
            .await?;
        for name in names {
            sqlx::query(
                "INSERT INTO movie_cast_translations (cast_id, language, character_name)
                 VALUES ($1, $2, $3)",
            )
            .bind(cast_id)
            .bind(&name.language)
            .bind(name.text.trim())
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn replace_crew_jobs(
        tx: &mut Transaction<'_, Postgres>,
        crew_id: DbId,
        jobs: &[CreditText],
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM movie_crew_translations WHERE crew_id = $1")
            .bind(crew_id)
            .execute(&mut **tx)
            .await?;
        for job in jobs {
            sqlx::query(
                "INSERT INTO movie_crew_translations (crew_id, language, job) VALUES ($1, $2, $3)",
            )
            .bind(crew_id)
            .bind(&job.language)
            .bind(job.text.trim())
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
