//! Pagination clamps shared by list endpoints.

/// Default page size when the client does not send `limit`.
pub const DEFAULT_LIMIT: i64 = 20;

/// Largest page size a client may request.
pub const MAX_LIMIT: i64 = 100;

/// Clamp a user-provided limit to `[1, max]`, using `default` when absent.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).max(1).min(max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamp_limit_uses_default_when_none() {
        assert_eq!(clamp_limit(None, DEFAULT_LIMIT, MAX_LIMIT), 20);
    }

    #[test]
    fn clamp_limit_respects_max() {
        assert_eq!(clamp_limit(Some(500), DEFAULT_LIMIT, MAX_LIMIT), 100);
    }

    #[test]
    fn clamp_limit_floors_at_one() {
        assert_eq!(clamp_limit(Some(0), DEFAULT_LIMIT, MAX_LIMIT), 1);
        assert_eq!(clamp_limit(Some(-3), DEFAULT_LIMIT, MAX_LIMIT), 1);
    }

    #[test]
    fn clamp_offset_floors_at_zero() {
        assert_eq!(clamp_offset(None), 0);
        assert_eq!(clamp_offset(Some(-10)), 0);
        assert_eq!(clamp_offset(Some(40)), 40);
    }
}
