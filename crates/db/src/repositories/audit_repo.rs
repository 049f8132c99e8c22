//! Repository for the `audit_logs` table.

use lao_cinema_core::pagination::{clamp_limit, clamp_offset, DEFAULT_LIMIT, MAX_LIMIT};
use sqlx::PgPool;

use crate::models::audit::{AuditLog, AuditQuery, CreateAuditLog};
use crate::repositories::filter::{BindValue, Conditions};

// ---------------------------------------------------------------------------
// Column lists
// ---------------------------------------------------------------------------

/// Column list for `audit_logs` SELECT queries.
const COLUMNS: &str = "\
    id, user_id, action_type, entity_type, entity_id, \
    details_json, ip_address, created_at";

// ---------------------------------------------------------------------------
// AuditLogRepo
// ---------------------------------------------------------------------------

/// Append and query operations for the audit trail.
pub struct AuditLogRepo;

impl AuditLogRepo {
    /// Append one entry.
    pub async fn insert(pool: &PgPool, entry: &CreateAuditLog) -> Result<AuditLog, sqlx::Error> {
        let query = format!(
            "INSERT INTO audit_logs
                (user_id, action_type, entity_type, entity_id, details_json, ip_address)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AuditLog>(&query)
            .bind(entry.user_id)
            .bind(&entry.action_type)
            .bind(&entry.entity_type)
            .bind(entry.entity_id)
            .bind(&entry.details_json)
            .bind(&entry.ip_address)
            .fetch_one(pool)
            .await
    }

    /// Query audit logs with filtering and pagination, newest first.
    pub async fn query(pool: &PgPool, params: &AuditQuery) -> Result<Vec<AuditLog>, sqlx::Error> {
        let limit = clamp_limit(params.limit, DEFAULT_LIMIT, MAX_LIMIT);
        let offset = clamp_offset(params.offset);

        let filter = build_audit_filter(params);
        let idx = filter.next_index();

        let query = format!(
            "SELECT {COLUMNS} FROM audit_logs {} \
             ORDER BY created_at DESC, id DESC \
             LIMIT ${idx} OFFSET ${}",
            filter.where_clause(),
            idx + 1
        );

        filter
            .bind_as(sqlx::query_as::<_, AuditLog>(&query))
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count audit logs matching the given filter (for pagination metadata).
    pub async fn count(pool: &PgPool, params: &AuditQuery) -> Result<i64, sqlx::Error> {
        let filter = build_audit_filter(params);
        let query = format!(
            "SELECT COUNT(*)::BIGINT FROM audit_logs {}",
            filter.where_clause()
        );
        filter
            .bind_scalar(sqlx::query_scalar::<_, i64>(&query))
            .fetch_one(pool)
            .await
    }
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

fn build_audit_filter(params: &AuditQuery) -> Conditions {
    let mut conditions = Conditions::default();
    if let Some(user_id) = params.user_id {
        conditions.push("user_id = ?", BindValue::BigInt(user_id));
    }
    if let Some(ref action_type) = params.action_type {
        conditions.push("action_type = ?", BindValue::Text(action_type.clone()));
    }
    if let Some(ref entity_type) = params.entity_type {
        conditions.push("entity_type = ?", BindValue::Text(entity_type.clone()));
    }
    if let Some(entity_id) = params.entity_id {
        conditions.push("entity_id = ?", BindValue::BigInt(entity_id));
    }
    if let Some(from) = params.from {
        conditions.push("created_at >= ?", BindValue::Timestamp(from));
    }
    if let Some(to) = params.to {
        conditions.push("created_at <= ?", BindValue::Timestamp(to));
    }
    conditions
}
