//! Time and timestamp helpers.

use chrono::{DateTime, Utc};

/// UTC timestamp used for activation instants, event times, etc.
pub type Timestamp = DateTime<Utc>;

/// Return the current UTC time.
#[must_use]
pub fn now() -> Timestamp {
    Utc::now()
}

/// Fractional hours elapsed from `since` to `until`, never negative.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn elapsed_hours(since: Timestamp, until: Timestamp) -> f64 {
    let millis = (until - since).num_milliseconds().max(0);
    millis as f64 / 3_600_000.0
}

/// Round to two decimal places, the precision consumption figures are reported in.
#[must_use]
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn should_return_current_utc_time() {
        let before = Utc::now();
        let ts = now();
        let after = Utc::now();
        assert!(ts >= before);
        assert!(ts <= after);
    }

    #[test]
    fn should_compute_fractional_hours() {
        let start = now();
        let end = start + Duration::minutes(90);
        assert!((elapsed_hours(start, end) - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn should_clamp_negative_elapsed_time_to_zero() {
        let start = now();
        let end = start - Duration::hours(2);
        assert!(elapsed_hours(start, end).abs() < f64::EPSILON);
    }

    #[test]
    fn should_round_to_two_decimals() {
        assert!((round2(12.3456) - 12.35).abs() < 1e-9);
        assert!((round2(199.999) - 200.0).abs() < 1e-9);
    }
}
