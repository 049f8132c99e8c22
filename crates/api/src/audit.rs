//! Best-effort audit trail writer.
//!
//! Handlers call [`record`] after a mutation has committed. A failed insert
//! is logged and dropped so it never turns a successful request into an error.

use lao_cinema_core::types::DbId;
use lao_cinema_db::models::audit::CreateAuditLog;
use lao_cinema_db::repositories::AuditLogRepo;
use lao_cinema_db::DbPool;

/// One audit entry, built fluently by handlers.
#[derive(Debug)]
pub struct AuditEntry {
    inner: CreateAuditLog,
}

impl AuditEntry {
    pub fn new(action_type: &str) -> Self {
        Self {
            inner: CreateAuditLog {
                action_type: action_type.to_string(),
                ..Default::default()
            },
        }
    }

    pub fn by(mut self, user_id: Option<DbId>) -> Self {
        self.inner.user_id = user_id;
        self
    }

    pub fn entity(mut self, entity_type: &str, entity_id: DbId) -> Self {
        self.inner.entity_type = Some(entity_type.to_string());
        self.inner.entity_id = Some(entity_id);
        self
    }

    /// For entries that touch a singleton rather than a row.
    pub fn entity_type(mut self, entity_type: &str) -> Self {
        self.inner.entity_type = Some(entity_type.to_string());
        self
    }

    pub fn details(mut self, details: serde_json::Value) -> Self {
        self.inner.details_json = Some(details);
        self
    }

    pub fn ip(mut self, ip_address: Option<String>) -> Self {
        self.inner.ip_address = ip_address;
        self
    }
}

/// Insert `entry`, logging instead of failing on error.
pub async fn record(pool: &DbPool, entry: AuditEntry) {
    let entry = entry.inner;
    if let Err(e) = AuditLogRepo::insert(pool, &entry).await {
        tracing::warn!(
            error = %e,
            action_type = %entry.action_type,
            entity_type = ?entry.entity_type,
            entity_id = ?entry.entity_id,
            "Failed to write audit log entry"
        );
    }
}
