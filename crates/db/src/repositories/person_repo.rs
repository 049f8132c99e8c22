//! Repository for `people` and `people_translations`.

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::person::{
    CreatePerson, Person, PersonCredit, PersonTranslation, UpdatePerson, UpsertPersonTranslation,
};
use crate::repositories::filter::like_pattern;

const COLUMNS: &str = "id, known_for_department, gender, birthday, deathday, place_of_birth, \
                        profile_path, created_at, updated_at";

const TRANSLATION_COLUMNS: &str = "person_id, language, name, biography";

pub struct PersonRepo;

impl PersonRepo {
    pub async fn create(pool: &PgPool, input: &CreatePerson) -> Result<Person, sqlx::Error> {
        let query = format!(
            "INSERT INTO people
                (known_for_department, gender, birthday, deathday, place_of_birth, profile_path)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(&input.known_for_department)
            .bind(&input.gender)
            .bind(input.birthday)
            .bind(input.deathday)
            .bind(&input.place_of_birth)
            .bind(&input.profile_path)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Person>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM people WHERE id = $1");
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List people, optionally filtered by a name substring in any language.
    pub async fn list(
        pool: &PgPool,
        search: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Person>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM people p
             WHERE $1::TEXT IS NULL OR EXISTS (
                SELECT 1 FROM people_translations t
                WHERE t.person_id = p.id AND t.name ILIKE $1)
             ORDER BY id
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(search.map(like_pattern))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePerson,
    ) -> Result<Option<Person>, sqlx::Error> {
        let query = format!(
            "UPDATE people SET
                known_for_department = COALESCE($2, known_for_department),
                gender = COALESCE($3, gender),
                birthday = COALESCE($4, birthday),
                deathday = COALESCE($5, deathday),
                place_of_birth = COALESCE($6, place_of_birth),
                profile_path = COALESCE($7, profile_path)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Person>(&query)
            .bind(id)
            .bind(&input.known_for_department)
            .bind(&input.gender)
            .bind(input.birthday)
            .bind(input.deathday)
            .bind(&input.place_of_birth)
            .bind(&input.profile_path)
            .fetch_optional(pool)
            .await
    }

    /// Delete a person. Their credits cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM people WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn translations(
        pool: &PgPool,
        person_id: DbId,
    ) -> Result<Vec<PersonTranslation>, sqlx::Error> {
        let query = format!(
            "SELECT {TRANSLATION_COLUMNS} FROM people_translations
             WHERE person_id = $1 ORDER BY language"
        );
        sqlx::query_as::<_, PersonTranslation>(&query)
            .bind(person_id)
            .fetch_all(pool)
            .await
    }

    /// Translations for several people at once (list pages, credit lists).
    pub async fn translations_for(
        pool: &PgPool,
        person_ids: &[DbId],
    ) -> Result<Vec<PersonTranslation>, sqlx::Error> {
        if person_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {TRANSLATION_COLUMNS} FROM people_translations
             WHERE person_id = ANY($1) ORDER BY person_id, language"
        );
        sqlx::query_as::<_, PersonTranslation>(&query)
            .bind(person_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn upsert_translation(
        pool: &PgPool,
        person_id: DbId,
        language: &str,
        input: &UpsertPersonTranslation,
    ) -> Result<PersonTranslation, sqlx::Error> {
        let query = format!(
            "INSERT INTO people_translations (person_id, language, name, biography)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT ON CONSTRAINT uq_people_translations_person_language DO UPDATE SET
                name = EXCLUDED.name,
                biography = EXCLUDED.biography
             RETURNING {TRANSLATION_COLUMNS}"
        );
        sqlx::query_as::<_, PersonTranslation>(&query)
            .bind(person_id)
            .bind(language)
            .bind(input.name.trim())
            .bind(&input.biography)
            .fetch_one(pool)
            .await
    }

    /// Every movie the person appears on, cast and crew combined.
    ///
    /// Unpublished movies are skipped unless `include_unpublished` is set.
    pub async fn credits(
        pool: &PgPool,
        person_id: DbId,
        include_unpublished: bool,
    ) -> Result<Vec<PersonCredit>, sqlx::Error> {
        sqlx::query_as::<_, PersonCredit>(
            "SELECT m.id AS movie_id, m.slug AS movie_slug, 'cast' AS credit_type,
                    NULL::TEXT AS department, m.release_date
             FROM movie_cast c JOIN movies m ON m.id = c.movie_id
             WHERE c.person_id = $1 AND ($2 OR m.status = 'published')
             UNION ALL
             SELECT m.id, m.slug, 'crew', cr.department, m.release_date
             FROM movie_crew cr JOIN movies m ON m.id = cr.movie_id
             WHERE cr.person_id = $1 AND ($2 OR m.status = 'published')
             ORDER BY release_date DESC NULLS LAST, movie_id",
        )
        .bind(person_id)
        .bind(include_unpublished)
        .fetch_all(pool)
        .await
    }
}
