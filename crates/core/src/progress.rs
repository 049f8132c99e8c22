//! Watch-progress normalization.

/// Fraction of the runtime after which a movie counts as watched.
pub const COMPLETION_THRESHOLD: f64 = 0.9;

/// A position report after clamping.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedProgress {
    pub position_secs: f64,
    pub duration_secs: f64,
    pub completed: bool,
}

/// Clamp `position` into `[0, duration]` and derive completion.
///
/// Non-finite or non-positive durations yield `None`.
pub fn normalize(position_secs: f64, duration_secs: f64) -> Option<NormalizedProgress> {
    if !duration_secs.is_finite() || duration_secs <= 0.0 || !position_secs.is_finite() {
        return None;
    }
    let position = position_secs.clamp(0.0, duration_secs);
    Some(NormalizedProgress {
        position_secs: position,
        duration_secs,
        completed: position >= duration_secs * COMPLETION_THRESHOLD,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_into_range() {
        let p = normalize(-5.0, 100.0).unwrap();
        assert_eq!(p.position_secs, 0.0);
        let p = normalize(150.0, 100.0).unwrap();
        assert_eq!(p.position_secs, 100.0);
        assert!(p.completed);
    }

    #[test]
    fn completion_threshold() {
        assert!(!normalize(89.9, 100.0).unwrap().completed);
        assert!(normalize(90.0, 100.0).unwrap().completed);
    }

    #[test]
    fn rejects_bad_duration() {
        assert!(normalize(10.0, 0.0).is_none());
        assert!(normalize(10.0, f64::NAN).is_none());
        assert!(normalize(f64::INFINITY, 100.0).is_none());
    }
}
