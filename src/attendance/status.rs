use chrono::{NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;

use crate::model::attendance::Status;

/// Arrivals strictly after this time of day count as late.
pub static LATE_CUTOFF: Lazy<NaiveTime> =
    Lazy::new(|| NaiveTime::from_hms_opt(9, 30, 0).expect("valid cutoff time"));

/// Hours below this (but above zero) mark the day as half-day, even when the
/// arrival was also late. Half-day wins over late.
pub const HALF_DAY_HOURS: f64 = 4.0;

/// Derive the status for a day from its check-in stamp and worked hours.
///
/// Rules, in precedence order:
/// - no check-in: absent
/// - worked hours in (0, 4): half-day
/// - check-in strictly after 09:30: late
/// - otherwise: present
///
/// `total_hours` is 0.0 until check-out, so an open day classifies purely on
/// the arrival time.
pub fn classify(check_in: Option<NaiveDateTime>, total_hours: f64) -> Status {
    let Some(check_in) = check_in else {
        return Status::Absent;
    };
    if total_hours > 0.0 && total_hours < HALF_DAY_HOURS {
        return Status::HalfDay;
    }
    if check_in.time() > *LATE_CUTOFF {
        return Status::Late;
    }
    Status::Present
}

/// Hours between check-in and check-out, clamped at zero. Sub-minute
/// precision is kept; rounding only happens at the presentation edge.
pub fn worked_hours(check_in: NaiveDateTime, check_out: NaiveDateTime) -> f64 {
    let seconds = (check_out - check_in).num_seconds();
    if seconds <= 0 {
        return 0.0;
    }
    seconds as f64 / 3600.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn no_check_in_is_absent() {
        assert_eq!(classify(None, 0.0), Status::Absent);
        assert_eq!(classify(None, 8.0), Status::Absent);
    }

    #[test]
    fn cutoff_is_strict() {
        assert_eq!(classify(Some(dt("2026-02-02T09:30:00")), 8.0), Status::Present);
        assert_eq!(classify(Some(dt("2026-02-02T09:30:01")), 8.0), Status::Late);
        assert_eq!(classify(Some(dt("2026-02-02T09:29:59")), 8.0), Status::Present);
    }

    #[test]
    fn half_day_overrides_late() {
        // Arrived at 13:00 (late) but worked only 3.5 hours.
        assert_eq!(classify(Some(dt("2026-02-02T13:00:00")), 3.5), Status::HalfDay);
    }

    #[test]
    fn half_day_boundaries() {
        assert_eq!(classify(Some(dt("2026-02-02T09:00:00")), 3.999), Status::HalfDay);
        // Exactly 4 hours is a full day.
        assert_eq!(classify(Some(dt("2026-02-02T09:00:00")), 4.0), Status::Present);
        // Zero hours means no check-out yet; classify on arrival only.
        assert_eq!(classify(Some(dt("2026-02-02T09:00:00")), 0.0), Status::Present);
        assert_eq!(classify(Some(dt("2026-02-02T11:00:00")), 0.0), Status::Late);
    }

    #[test]
    fn worked_hours_fractional() {
        let hours = worked_hours(dt("2026-02-02T09:00:00"), dt("2026-02-02T17:30:00"));
        assert!((hours - 8.5).abs() < 1e-9);
    }

    #[test]
    fn worked_hours_never_negative() {
        let hours = worked_hours(dt("2026-02-02T17:00:00"), dt("2026-02-02T09:00:00"));
        assert_eq!(hours, 0.0);
    }
}
