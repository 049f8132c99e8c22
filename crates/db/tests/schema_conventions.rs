//! Schema-wide naming and typing conventions.

use sqlx::PgPool;

/// All `id` columns must be bigint.
#[sqlx::test(migrations = "./migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Unique constraints and indexes carry the `uq_` prefix the API relies on
/// to turn violations into 409 responses.
#[sqlx::test(migrations = "./migrations")]
async fn test_unique_indexes_use_uq_prefix(pool: PgPool) {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT i.relname
         FROM pg_index x
         JOIN pg_class i ON i.oid = x.indexrelid
         JOIN pg_class t ON t.oid = x.indrelid
         JOIN pg_namespace n ON n.oid = t.relnamespace
         WHERE n.nspname = 'public'
           AND x.indisunique
           AND NOT x.indisprimary
           AND t.relname != '_sqlx_migrations'",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (name,) in &rows {
        assert!(name.starts_with("uq_"), "unique index {name} should start with uq_");
    }
}

/// Translation tables only accept the two supported languages.
#[sqlx::test(migrations = "./migrations")]
async fn test_translation_language_is_checked(pool: PgPool) {
    let movie_id: i64 =
        sqlx::query_scalar("INSERT INTO movies (slug) VALUES ('check-lang') RETURNING id")
            .fetch_one(&pool)
            .await
            .unwrap();

    let result = sqlx::query(
        "INSERT INTO movie_translations (movie_id, language, title) VALUES ($1, 'fr', 'Titre')",
    )
    .bind(movie_id)
    .execute(&pool)
    .await;

    let err = result.unwrap_err();
    let db_err = err.as_database_error().unwrap();
    assert_eq!(db_err.constraint(), Some("ck_movie_translations_language"));
}
