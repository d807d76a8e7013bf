use chrono::{Datelike, Days, Months, NaiveDate};

use super::error::AttendanceError;

/// Inclusive day range. `end` is never before `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, AttendanceError> {
        if end < start {
            return Err(AttendanceError::InvalidDateRange { start, end });
        }
        Ok(Self { start, end })
    }

    /// Calendar month containing `day`, first through last day.
    pub fn month_of(day: NaiveDate) -> Self {
        let start = day.with_day(1).expect("day 1 always valid");
        let end = start
            .checked_add_months(Months::new(1))
            .and_then(|next| next.checked_sub_days(Days::new(1)))
            .expect("in-range month arithmetic");
        Self { start, end }
    }

    /// Parse a `YYYY-MM` month token into its full range.
    pub fn parse_month(month: &str) -> Result<Self, AttendanceError> {
        let first = NaiveDate::parse_from_str(&format!("{month}-01"), "%Y-%m-%d")
            .map_err(|_| AttendanceError::InvalidMonth(month.to_string()))?;
        Ok(Self::month_of(first))
    }

    /// The `n` days ending at `end`, inclusive on both sides.
    pub fn last_n_days(end: NaiveDate, n: u64) -> Self {
        let start = end
            .checked_sub_days(Days::new(n.saturating_sub(1)))
            .expect("in-range day arithmetic");
        Self { start, end }
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn rejects_inverted_range() {
        assert!(DateRange::new(d("2026-02-10"), d("2026-02-01")).is_err());
        assert!(DateRange::new(d("2026-02-10"), d("2026-02-10")).is_ok());
    }

    #[test]
    fn month_of_handles_leap_february() {
        let range = DateRange::month_of(d("2024-02-15"));
        assert_eq!(range.start, d("2024-02-01"));
        assert_eq!(range.end, d("2024-02-29"));

        let range = DateRange::month_of(d("2026-02-15"));
        assert_eq!(range.end, d("2026-02-28"));
    }

    #[test]
    fn month_of_december_crosses_year() {
        let range = DateRange::month_of(d("2025-12-31"));
        assert_eq!(range.start, d("2025-12-01"));
        assert_eq!(range.end, d("2025-12-31"));
    }

    #[test]
    fn month_of_thirty_day_month() {
        let range = DateRange::month_of(d("2026-04-10"));
        assert_eq!(range.end, d("2026-04-30"));
    }

    #[test]
    fn parse_month_validates() {
        let range = DateRange::parse_month("2026-02").unwrap();
        assert_eq!(range.start, d("2026-02-01"));
        assert_eq!(range.end, d("2026-02-28"));
        assert!(DateRange::parse_month("2026-13").is_err());
        assert!(DateRange::parse_month("not-a-month").is_err());
    }

    #[test]
    fn last_n_days_is_inclusive() {
        let range = DateRange::last_n_days(d("2026-02-07"), 7);
        assert_eq!(range.start, d("2026-02-01"));
        assert_eq!(range.end, d("2026-02-07"));
        assert!(range.contains(d("2026-02-01")));
        assert!(range.contains(d("2026-02-07")));
        assert!(!range.contains(d("2026-01-31")));

        let single = DateRange::last_n_days(d("2026-02-07"), 1);
        assert_eq!(single.start, single.end);
    }
}
