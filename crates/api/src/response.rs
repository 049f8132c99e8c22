//! Response envelopes.
//!
//! Successful JSON responses are wrapped as `{ "data": ... }`; paginated lists
//! put a [`Page`] inside the envelope.

use serde::Serialize;

/// Standard `{ "data": T }` envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// One page of a list plus the total number of matching rows.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
}
