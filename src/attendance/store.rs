use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::dates::DateRange;
use super::error::AttendanceError;
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee, Status};
use crate::model::user::EmployeeLite;

/// Row to create for a user/day pair. Backfill passes no check-in stamp;
/// check-in passes one.
#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub user_id: i64,
    pub day: NaiveDate,
    pub check_in_at: Option<NaiveDateTime>,
    pub status: Status,
}

/// Filters for the manager-facing listings. Unset fields do not constrain.
#[derive(Debug, Clone, Default)]
pub struct RecordFilter {
    pub user_id: Option<i64>,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
    pub status: Option<Status>,
    pub department: Option<String>,
}

/// Persistence for attendance rows. One row per user per day, enforced by
/// the store; writes that lose a race surface as `StorageConflict`.
#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find_by_day(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceError>;

    /// Insert a fresh row. A duplicate (user_id, day) is `StorageConflict`.
    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, AttendanceError>;

    /// Stamp check-in on an existing row that has none yet. Returns
    /// `StorageConflict` if the row was already stamped.
    async fn mark_checked_in(
        &self,
        id: i64,
        at: NaiveDateTime,
        status: Status,
    ) -> Result<AttendanceRecord, AttendanceError>;

    /// Stamp check-out on a row that has none yet. Returns
    /// `StorageConflict` if the row was already stamped.
    async fn mark_checked_out(
        &self,
        id: i64,
        at: NaiveDateTime,
        total_hours: f64,
        status: Status,
    ) -> Result<AttendanceRecord, AttendanceError>;

    /// Create an absent row unless any row already exists for the pair.
    /// Returns whether a row was created.
    async fn insert_absent_if_missing(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<bool, AttendanceError>;

    async fn list_day(&self, day: NaiveDate) -> Result<Vec<AttendanceRecord>, AttendanceError>;

    /// One user's rows inside a range, oldest first.
    async fn list_range(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError>;

    /// One user's full history, newest first, paginated. Also returns the
    /// total row count for the envelope.
    async fn page_history(
        &self,
        user_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceRecord>, i64), AttendanceError>;

    /// Filtered rows joined with employee identity, newest first.
    async fn list_filtered(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError>;

    async fn page_filtered(
        &self,
        filter: &RecordFilter,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceWithEmployee>, i64), AttendanceError>;

    async fn list_day_joined(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError>;

    /// Per-day, per-status row counts inside a range. Days with no rows do
    /// not appear.
    async fn count_by_day_status(
        &self,
        range: DateRange,
    ) -> Result<Vec<(NaiveDate, Status, i64)>, AttendanceError>;

    /// Most recently touched rows, for the activity feed.
    async fn recent_activity(
        &self,
        limit: i64,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError>;
}

/// Read access to the active employee roster. Kept separate from
/// `AttendanceStore` so the attendance side never owns user records.
#[async_trait]
pub trait EmployeeRoster: Send + Sync {
    async fn list_active(&self) -> Result<Vec<EmployeeLite>, AttendanceError>;
}
