//! Production company model and DTOs.

use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `production_companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ProductionCompany {
    pub id: DbId,
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateProductionCompany {
    pub name: String,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateProductionCompany {
    pub name: Option<String>,
    pub logo_path: Option<String>,
    pub origin_country: Option<String>,
}
