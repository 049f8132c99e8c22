//! Repository for the `production_companies` table.

use lao_cinema_core::types::DbId;
use sqlx::PgPool;

use crate::models::production_company::{
    CreateProductionCompany, ProductionCompany, UpdateProductionCompany,
};

const COLUMNS: &str = "id, name, logo_path, origin_country, created_at, updated_at";

pub struct ProductionCompanyRepo;

impl ProductionCompanyRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateProductionCompany,
    ) -> Result<ProductionCompany, sqlx::Error> {
        let query = format!(
            "INSERT INTO production_companies (name, logo_path, origin_country)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductionCompany>(&query)
            .bind(input.name.trim())
            .bind(&input.logo_path)
            .bind(&input.origin_country)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ProductionCompany>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM production_companies WHERE id = $1");
        sqlx::query_as::<_, ProductionCompany>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list(pool: &PgPool) -> Result<Vec<ProductionCompany>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM production_companies ORDER BY name");
        sqlx::query_as::<_, ProductionCompany>(&query)
            .fetch_all(pool)
            .await
    }

    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProductionCompany,
    ) -> Result<Option<ProductionCompany>, sqlx::Error> {
        let query = format!(
            "UPDATE production_companies SET
                name = COALESCE($2, name),
                logo_path = COALESCE($3, logo_path),
                origin_country = COALESCE($4, origin_country)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ProductionCompany>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.logo_path)
            .bind(&input.origin_country)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM production_companies WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
