//! Primitive aliases shared by every crate.

/// Primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// UTC instant.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Money in the currency's minor unit, stored as INTEGER.
pub type Cents = i32;
