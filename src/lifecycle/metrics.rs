//! Reliability metrics: MTBF, MTTR and availability.

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

/// Derived reliability figures for one device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct ReliabilityMetrics {
    /// Mean time between failures, hours
    pub mtbf: f64,
    /// Mean time to repair, hours
    pub mttr: f64,
    /// Percentage of time operational
    pub availability: f64,
}

impl ReliabilityMetrics {
    /// A device without recorded failures is reported fully available.
    pub const NO_FAILURES: ReliabilityMetrics = ReliabilityMetrics {
        mtbf: 0.0,
        mttr: 0.0,
        availability: 100.0,
    };
}

/// Compute metrics from a device's counters.
///
/// The arithmetic is deliberately raw: when repair hours exceed operating
/// hours MTBF goes negative and availability follows, and NaN inputs give NaN
/// outputs. Nothing is clamped.
pub fn compute_metrics(
    total_failures: i32,
    total_operating_hours: f64,
    total_repair_hours: f64,
) -> ReliabilityMetrics {
    if total_failures <= 0 {
        return ReliabilityMetrics::NO_FAILURES;
    }

    let failures = f64::from(total_failures);
    let mttr = total_repair_hours / failures;
    let mtbf = if total_operating_hours > 0.0 {
        (total_operating_hours - total_repair_hours) / failures
    } else {
        0.0
    };
    let availability = if mtbf + mttr > 0.0 {
        mtbf / (mtbf + mttr) * 100.0
    } else {
        100.0
    };

    ReliabilityMetrics {
        mtbf,
        mttr,
        availability,
    }
}

/// Elapsed time between two instants in hours, unrounded.
///
/// An end before the start yields a negative duration.
pub fn repair_hours_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    let elapsed = end - start;
    let seconds = match elapsed.num_microseconds() {
        Some(us) => us as f64 / 1_000_000.0,
        None => elapsed.num_seconds() as f64,
    };
    seconds / 3600.0
}

/// Render hours as `MM:SS`, truncating partial seconds.
///
/// Minutes are not wrapped into hours, so 1.5 h renders as `90:00`.
pub fn format_minutes_seconds(hours: f64) -> String {
    if !hours.is_finite() || hours <= 0.0 {
        return "00:00".to_string();
    }
    let total_seconds = (hours * 3600.0).trunc() as i64;
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use proptest::prelude::*;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_no_failures_is_fully_available() {
        assert_eq!(compute_metrics(0, 8760.0, 0.0), ReliabilityMetrics::NO_FAILURES);
        assert_eq!(compute_metrics(0, 0.0, 500.0), ReliabilityMetrics::NO_FAILURES);
    }

    #[test]
    fn test_two_failures_over_a_year() {
        let m = compute_metrics(2, 8760.0, 8.0);
        assert!(approx(m.mttr, 4.0));
        assert!(approx(m.mtbf, 4376.0));
        assert!(approx(m.availability, 4376.0 / 4380.0 * 100.0));
        assert!(m.availability > 99.90 && m.availability < 99.91);
    }

    #[test]
    fn test_zero_operating_hours_gives_zero_mtbf() {
        let m = compute_metrics(3, 0.0, 6.0);
        assert!(approx(m.mtbf, 0.0));
        assert!(approx(m.mttr, 2.0));
        assert!(approx(m.availability, 0.0));
    }

    #[test]
    fn test_zero_denominator_reports_full_availability() {
        let m = compute_metrics(1, 0.0, 0.0);
        assert!(approx(m.mtbf, 0.0));
        assert!(approx(m.mttr, 0.0));
        assert!(approx(m.availability, 100.0));
    }

    #[test]
    fn test_repair_exceeding_operation_is_not_clamped() {
        let m = compute_metrics(1, 10.0, 20.0);
        assert!(approx(m.mttr, 20.0));
        assert!(approx(m.mtbf, -10.0));
        // -10 / (-10 + 20) * 100
        assert!(approx(m.availability, -100.0));
    }

    #[test]
    fn test_nan_propagates() {
        let m = compute_metrics(1, f64::NAN, 1.0);
        // NaN > 0 is false, so MTBF falls back to zero
        assert!(approx(m.mtbf, 0.0));
        let m = compute_metrics(1, 10.0, f64::NAN);
        assert!(m.mttr.is_nan());
        assert!(m.mtbf.is_nan());
        assert!(approx(m.availability, 100.0));
    }

    #[test]
    fn test_repair_hours_between() {
        let start = Utc::now();
        assert!(approx(repair_hours_between(start, start + Duration::minutes(90)), 1.5));
        assert!(approx(repair_hours_between(start, start + Duration::seconds(36)), 0.01));
        assert!(approx(repair_hours_between(start, start - Duration::minutes(6)), -0.1));
    }

    #[test]
    fn test_format_minutes_seconds() {
        assert_eq!(format_minutes_seconds(0.0), "00:00");
        assert_eq!(format_minutes_seconds(0.5), "30:00");
        assert_eq!(format_minutes_seconds(1.5), "90:00");
        // 0.0125 h = 45 s
        assert_eq!(format_minutes_seconds(0.0125), "00:45");
        // 0.01 h = 36 s, partial seconds dropped
        assert_eq!(format_minutes_seconds(0.010_1), "00:36");
        assert_eq!(format_minutes_seconds(-1.0), "00:00");
        assert_eq!(format_minutes_seconds(f64::NAN), "00:00");
    }

    proptest! {
        #[test]
        fn prop_no_failures_ignores_hours(op in 0.0f64..1e6, rep in 0.0f64..1e6) {
            prop_assert_eq!(compute_metrics(0, op, rep), ReliabilityMetrics::NO_FAILURES);
        }

        #[test]
        fn prop_formulas_hold(n in 1i32..10_000, op in 0.0f64..1e6, rep in 0.0f64..1e6) {
            let m = compute_metrics(n, op, rep);
            let failures = f64::from(n);
            prop_assert_eq!(m.mttr, rep / failures);
            let expected_mtbf = if op > 0.0 { (op - rep) / failures } else { 0.0 };
            prop_assert_eq!(m.mtbf, expected_mtbf);
            let sum = m.mtbf + m.mttr;
            let expected_availability = if sum > 0.0 { m.mtbf / sum * 100.0 } else { 100.0 };
            prop_assert_eq!(m.availability, expected_availability);
        }

        #[test]
        fn prop_sane_counters_stay_in_range(n in 1i32..10_000, op in 1.0f64..1e6, share in 0.0f64..1.0) {
            let m = compute_metrics(n, op, op * share);
            prop_assert!(m.availability >= 0.0 && m.availability <= 100.0 + 1e-9);
        }
    }
}
