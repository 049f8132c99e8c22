//! Repository for short-film packs, their translations and items.

use lao_cinema_core::types::DbId;
use sqlx::{PgPool, Postgres, Transaction};

use crate::models::short_pack::{
    AddPackItem, CreateShortPack, PackText, ShortPack, ShortPackItem, ShortPackTranslation,
    UpdateShortPack,
};

const COLUMNS: &str =
    "id, slug, price_cents, currency, poster_path, is_published, created_at, updated_at";

const TRANSLATION_COLUMNS: &str = "pack_id, language, title, description";

pub struct ShortPackRepo;

impl ShortPackRepo {
    /// Insert a pack and its translations in one transaction.
    pub async fn create(pool: &PgPool, input: &CreateShortPack) -> Result<ShortPack, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "INSERT INTO short_packs (slug, price_cents, currency, poster_path, is_published)
             VALUES ($1, $2, COALESCE($3, 'USD'), $4, $5)
             RETURNING {COLUMNS}"
        );
        let pack = sqlx::query_as::<_, ShortPack>(&query)
            .bind(&input.slug)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.poster_path)
            .bind(input.is_published)
            .fetch_one(&mut *tx)
            .await?;
        Self::upsert_translations(&mut tx, pack.id, &input.translations).await?;
        tx.commit().await?;
        Ok(pack)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<ShortPack>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM short_packs WHERE id = $1");
        sqlx::query_as::<_, ShortPack>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool, include_unpublished: bool) -> Result<Vec<ShortPack>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM short_packs
             WHERE $1 OR is_published
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ShortPack>(&query)
            .bind(include_unpublished)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateShortPack,
    ) -> Result<Option<ShortPack>, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let query = format!(
            "UPDATE short_packs SET
                slug = COALESCE($2, slug),
                price_cents = COALESCE($3, price_cents),
                currency = COALESCE($4, currency),
                poster_path = COALESCE($5, poster_path),
                is_published = COALESCE($6, is_published)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let Some(pack) = sqlx::query_as::<_, ShortPack>(&query)
            .bind(id)
            .bind(&input.slug)
            .bind(input.price_cents)
            .bind(&input.currency)
            .bind(&input.poster_path)
            .bind(input.is_published)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };
        if let Some(translations) = &input.translations {
            Self::upsert_translations(&mut tx, pack.id, translations).await?;
        }
        tx.commit().await?;
        Ok(Some(pack))
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM short_packs WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn translations_for(
        pool: &PgPool,
        pack_ids: &[DbId],
    ) -> Result<Vec<ShortPackTranslation>, sqlx::Error> {
        if pack_ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!(
            "SELECT {TRANSLATION_COLUMNS} FROM short_pack_translations
             WHERE pack_id = ANY($1) ORDER BY pack_id, language"
        );
        sqlx::query_as::<_, ShortPackTranslation>(&query)
            .bind(pack_ids)
            .fetch_all(pool)
            .await
    }

    /// Packs that include `movie_id`, newest first.
    pub async fn containing_movie(
        pool: &PgPool,
        movie_id: DbId,
        include_unpublished: bool,
    ) -> Result<Vec<ShortPack>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM short_packs
             WHERE ($2 OR is_published)
               AND id IN (SELECT pack_id FROM short_pack_items WHERE movie_id = $1)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, ShortPack>(&query)
            .bind(movie_id)
            .bind(include_unpublished)
            .fetch_all(pool)
            .await
    }

    // -----------------------------------------------------------------------
    // Items
    // -----------------------------------------------------------------------

    pub async fn items(pool: &PgPool, pack_id: DbId) -> Result<Vec<ShortPackItem>, sqlx::Error> {
        sqlx::query_as::<_, ShortPackItem>(
            "SELECT i.id, i.pack_id, i.movie_id, m.slug AS movie_slug, m.runtime_minutes,
                    i.display_order
             FROM short_pack_items i
             JOIN movies m ON m.id = i.movie_id
             WHERE i.pack_id = $1
             ORDER BY i.display_order, i.id",
        )
        .bind(pack_id)
        .fetch_all(pool)
        .await
    }

    /// Add a movie to a pack, appending it when no order is given.
    pub async fn add_item(
        pool: &PgPool,
        pack_id: DbId,
        input: &AddPackItem,
    ) -> Result<ShortPackItem, sqlx::Error> {
        sqlx::query_as::<_, ShortPackItem>(
            "WITH inserted AS (
                INSERT INTO short_pack_items (pack_id, movie_id, display_order)
                VALUES ($1, $2, COALESCE($3,
                    (SELECT COALESCE(MAX(display_order) + 1, 0)
                     FROM short_pack_items WHERE pack_id = $1)))
                RETURNING id, pack_id, movie_id, display_order
             )
             SELECT i.id, i.pack_id, i.movie_id, m.slug AS movie_slug, m.runtime_minutes,
                    i.display_order
             FROM inserted i JOIN movies m ON m.id = i.movie_id",
        )
        .bind(pack_id)
        .bind(input.movie_id)
        .bind(input.display_order)
        .fetch_one(pool)
        .await
    }

    pub async fn remove_item(pool: &PgPool, pack_id: DbId, movie_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM short_pack_items WHERE pack_id = $1 AND movie_id = $2")
            .bind(pack_id)
            .bind(movie_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn upsert_translations(
        tx: &mut Transaction<'_, Postgres>,
        pack_id: DbId,
        translations: &[PackText],
    ) -> Result<(), sqlx::Error> {
        for t in translations {
            sqlx::query(
                "INSERT INTO short_pack_translations (pack_id, language, title, description)
                 VALUES ($1, $2, $3, $4)
                 ON CONFLICT ON CONSTRAINT uq_short_pack_translations_pack_language DO UPDATE SET
                    title = EXCLUDED.title,
                    description = EXCLUDED.description",
            )
            .bind(pack_id)
            .bind(&t.language)
            .bind(t.title.trim())
            .bind(&t.description)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }
}
