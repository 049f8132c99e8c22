//! Audit log entity models and DTOs.
//!
//! Audit logs have no `updated_at` field; rows are never modified.

use lao_cinema_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

// ---------------------------------------------------------------------------
// Audit log entity
// ---------------------------------------------------------------------------

/// A single audit log entry.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AuditLog {
    pub id: DbId,
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details_json: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub created_at: Timestamp,
}

/// DTO for inserting a new audit log entry.
#[derive(Debug, Clone, Default)]
pub struct CreateAuditLog {
    pub user_id: Option<DbId>,
    pub action_type: String,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub details_json: Option<serde_json::Value>,
    pub ip_address: Option<String>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

/// Filter parameters for querying audit logs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditQuery {
    pub user_id: Option<DbId>,
    pub action_type: Option<String>,
    pub entity_type: Option<String>,
    pub entity_id: Option<DbId>,
    pub from: Option<Timestamp>,
    pub to: Option<Timestamp>,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}
