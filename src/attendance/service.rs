use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use serde::Serialize;
use utoipa::ToSchema;

use super::clock::Clock;
use super::dates::DateRange;
use super::error::AttendanceError;
use super::status::{classify, worked_hours};
use super::store::{AttendanceStore, EmployeeRoster, NewAttendance, RecordFilter};
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee, Status};
use crate::model::user::EmployeeLite;

/// Per-employee status counts over a date range. Only materialized rows are
/// counted; days without a row contribute to nothing.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct AttendanceSummary {
    #[schema(example = 18)]
    pub present: i64,
    #[schema(example = 1)]
    pub absent: i64,
    #[schema(example = 2)]
    pub late: i64,
    #[schema(example = 1)]
    pub half_day: i64,
    #[schema(example = 168.5)]
    pub total_hours: f64,
    #[schema(example = 22)]
    pub total_days: i64,
}

/// Today's team-wide counts. `absent` is the roster difference, not a row
/// count: employees with no row yet today display as absent even though no
/// absent row exists until the backfill sweeps yesterday.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct TeamSummary {
    #[schema(example = 10)]
    pub total_employees: i64,
    #[schema(example = 6)]
    pub present: i64,
    #[schema(example = 2)]
    pub absent: i64,
    #[schema(example = 1)]
    pub late: i64,
    #[schema(example = 1)]
    pub half_day: i64,
}

/// One day of the weekly trend. Present/late/half-day all bucket as
/// attendance; only absent rows count as absence.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct TrendPoint {
    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 8)]
    pub present: i64,
    #[schema(example = 2)]
    pub absent: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DepartmentStat {
    #[schema(example = "Engineering")]
    pub department: String,
    #[schema(example = 4)]
    pub present: i64,
    #[schema(example = 0)]
    pub absent: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ActivityEntry {
    #[schema(example = "Alice Johnson")]
    pub employee_name: String,
    #[schema(example = "Checked In")]
    pub action: String,
    #[schema(example = "2026-02-02T09:04:12", value_type = String, format = "date-time")]
    pub at: NaiveDateTime,
}

/// Report totals over a filtered record set. `attendance_rate` is
/// (present + late + half-day) / total rows as a percentage, one decimal.
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct ReportSummary {
    #[schema(example = 180)]
    pub total_present: i64,
    #[schema(example = 12)]
    pub total_late: i64,
    #[schema(example = 20)]
    pub total_absent: i64,
    #[schema(example = 8)]
    pub total_half_day: i64,
    #[schema(example = 90.9)]
    pub attendance_rate: f64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DayHours {
    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub day: NaiveDate,
    #[schema(example = 8.5)]
    pub hours: f64,
}

/// Attendance application logic: check-in/check-out state transitions and
/// the aggregations behind summaries, dashboards and reports. Persistence
/// and time come in through the trait seams so the logic tests without a
/// database.
#[derive(Clone)]
pub struct AttendanceService {
    store: Arc<dyn AttendanceStore>,
    roster: Arc<dyn EmployeeRoster>,
    clock: Arc<dyn Clock>,
}

impl AttendanceService {
    pub fn new(
        store: Arc<dyn AttendanceStore>,
        roster: Arc<dyn EmployeeRoster>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self { store, roster, clock }
    }

    /// Record a check-in for today. At most one row per user per day: a
    /// pre-existing backfill row is stamped in place, a lost insert race is
    /// retried once as a stamp.
    pub async fn check_in(&self, user_id: i64) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();
        let today = now.date();

        if let Some(existing) = self.store.find_by_day(user_id, today).await? {
            return self.stamp_check_in(existing, now).await;
        }

        let new = NewAttendance {
            user_id,
            day: today,
            check_in_at: Some(now),
            status: classify(Some(now), 0.0),
        };
        match self.store.insert(new).await {
            Ok(record) => Ok(record),
            Err(AttendanceError::StorageConflict) => {
                // Lost the insert race; the row exists now, stamp it instead.
                match self.store.find_by_day(user_id, today).await? {
                    Some(existing) => self.stamp_check_in(existing, now).await,
                    None => Err(AttendanceError::StorageConflict),
                }
            }
            Err(e) => Err(e),
        }
    }

    async fn stamp_check_in(
        &self,
        existing: AttendanceRecord,
        now: NaiveDateTime,
    ) -> Result<AttendanceRecord, AttendanceError> {
        if existing.check_in_at.is_some() {
            return Err(AttendanceError::AlreadyCheckedIn);
        }
        let status = classify(Some(now), 0.0);
        match self.store.mark_checked_in(existing.id, now, status).await {
            Ok(record) => Ok(record),
            Err(AttendanceError::StorageConflict) => Err(AttendanceError::AlreadyCheckedIn),
            Err(e) => Err(e),
        }
    }

    /// Record a check-out for today, computing worked hours and the final
    /// status. Half-day beats late if the day came in under four hours.
    pub async fn check_out(&self, user_id: i64) -> Result<AttendanceRecord, AttendanceError> {
        let now = self.clock.now();
        let today = now.date();

        let record = self
            .store
            .find_by_day(user_id, today)
            .await?
            .ok_or(AttendanceError::NotCheckedIn)?;
        let check_in_at = record.check_in_at.ok_or(AttendanceError::NotCheckedIn)?;
        if record.check_out_at.is_some() {
            return Err(AttendanceError::AlreadyCheckedOut);
        }

        let hours = worked_hours(check_in_at, now);
        let status = classify(Some(check_in_at), hours);
        match self.store.mark_checked_out(record.id, now, hours, status).await {
            Ok(updated) => Ok(updated),
            Err(AttendanceError::StorageConflict) => Err(AttendanceError::AlreadyCheckedOut),
            Err(e) => Err(e),
        }
    }

    pub async fn today_record(
        &self,
        user_id: i64,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        self.store.find_by_day(user_id, self.clock.today()).await
    }

    pub async fn history(
        &self,
        user_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceRecord>, i64), AttendanceError> {
        self.store.page_history(user_id, page, per_page).await
    }

    /// Summary for a `YYYY-MM` month, defaulting to the current month.
    pub async fn summary_for_month(
        &self,
        user_id: i64,
        month: Option<&str>,
    ) -> Result<AttendanceSummary, AttendanceError> {
        let range = match month {
            Some(m) => DateRange::parse_month(m)?,
            None => DateRange::month_of(self.clock.today()),
        };
        self.summary_in(user_id, range).await
    }

    pub async fn summary_in(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<AttendanceSummary, AttendanceError> {
        let records = self.store.list_range(user_id, range).await?;
        let mut summary = AttendanceSummary::default();
        for record in &records {
            match record.status {
                Status::Present => summary.present += 1,
                Status::Absent => summary.absent += 1,
                Status::Late => summary.late += 1,
                Status::HalfDay => summary.half_day += 1,
            }
            summary.total_hours += record.total_hours;
        }
        summary.total_days = records.len() as i64;
        Ok(summary)
    }

    /// Today's team counts. Rows only exist for today via check-in, so the
    /// absent figure is the roster minus everyone with a row.
    pub async fn team_summary(&self) -> Result<TeamSummary, AttendanceError> {
        let employees = self.roster.list_active().await?;
        let today_records = self.store.list_day(self.clock.today()).await?;

        let total_employees = employees.len() as i64;
        let mut summary = TeamSummary { total_employees, ..Default::default() };
        for record in &today_records {
            match record.status {
                Status::Present => summary.present += 1,
                Status::Late => summary.late += 1,
                Status::HalfDay => summary.half_day += 1,
                Status::Absent => {}
            }
        }
        summary.absent = (total_employees - today_records.len() as i64).max(0);
        Ok(summary)
    }

    /// Last seven days bucketed per day. Days with no rows at all are
    /// omitted rather than emitted as zeros.
    pub async fn weekly_trend(&self) -> Result<Vec<TrendPoint>, AttendanceError> {
        let range = DateRange::last_n_days(self.clock.today(), 7);
        let counts = self.store.count_by_day_status(range).await?;

        let mut days: BTreeMap<NaiveDate, TrendPoint> = BTreeMap::new();
        for (day, status, n) in counts {
            let point = days
                .entry(day)
                .or_insert_with(|| TrendPoint { day, present: 0, absent: 0 });
            match status {
                Status::Present | Status::Late | Status::HalfDay => point.present += n,
                Status::Absent => point.absent += n,
            }
        }
        Ok(days.into_values().collect())
    }

    /// Today's per-department counts. Departments with no rows today do not
    /// appear, and `absent` stays zero: same-day rows cannot be absent.
    pub async fn department_breakdown(&self) -> Result<Vec<DepartmentStat>, AttendanceError> {
        let rows = self.store.list_day_joined(self.clock.today()).await?;
        let mut departments: BTreeMap<String, DepartmentStat> = BTreeMap::new();
        for row in rows {
            let entry = departments.entry(row.department.clone()).or_insert_with(|| {
                DepartmentStat { department: row.department.clone(), present: 0, absent: 0 }
            });
            entry.present += 1;
        }
        Ok(departments.into_values().collect())
    }

    /// Reject a filter whose explicit bounds are inverted.
    fn check_filter(filter: &RecordFilter) -> Result<(), AttendanceError> {
        if let (Some(start), Some(end)) = (filter.start, filter.end) {
            DateRange::new(start, end)?;
        }
        Ok(())
    }

    pub async fn report(
        &self,
        filter: &RecordFilter,
    ) -> Result<(ReportSummary, Vec<AttendanceWithEmployee>), AttendanceError> {
        Self::check_filter(filter)?;
        let rows = self.store.list_filtered(filter).await?;

        let mut summary = ReportSummary::default();
        for row in &rows {
            match row.status {
                Status::Present => summary.total_present += 1,
                Status::Late => summary.total_late += 1,
                Status::Absent => summary.total_absent += 1,
                Status::HalfDay => summary.total_half_day += 1,
            }
        }
        let total = rows.len() as i64;
        if total > 0 {
            let attended = summary.total_present + summary.total_late + summary.total_half_day;
            summary.attendance_rate = (attended as f64 / total as f64 * 1000.0).round() / 10.0;
        }
        Ok((summary, rows))
    }

    pub async fn export_rows(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        Self::check_filter(filter)?;
        self.store.list_filtered(filter).await
    }

    pub async fn list_records(
        &self,
        filter: &RecordFilter,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceWithEmployee>, i64), AttendanceError> {
        Self::check_filter(filter)?;
        self.store.page_filtered(filter, page, per_page).await
    }

    /// Everyone who has actually checked in today.
    pub async fn team_today(&self) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let rows = self.store.list_day_joined(self.clock.today()).await?;
        Ok(rows.into_iter().filter(|r| r.check_in_at.is_some()).collect())
    }

    pub async fn late_arrivals_today(
        &self,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let rows = self.store.list_day_joined(self.clock.today()).await?;
        Ok(rows.into_iter().filter(|r| r.status == Status::Late).collect())
    }

    /// Roster members with no row at all today.
    pub async fn absent_today(&self) -> Result<Vec<EmployeeLite>, AttendanceError> {
        let employees = self.roster.list_active().await?;
        let today_records = self.store.list_day(self.clock.today()).await?;
        let recorded: HashSet<i64> = today_records.iter().map(|r| r.user_id).collect();
        Ok(employees.into_iter().filter(|e| !recorded.contains(&e.id)).collect())
    }

    pub async fn recent_activity(
        &self,
        limit: i64,
    ) -> Result<Vec<ActivityEntry>, AttendanceError> {
        let rows = self.store.recent_activity(limit).await?;
        Ok(rows
            .into_iter()
            .map(|row| ActivityEntry {
                employee_name: row.name,
                action: if row.check_out_at.is_some() { "Checked Out" } else { "Checked In" }
                    .to_string(),
                at: row.updated_at,
            })
            .collect())
    }

    /// Per-day worked hours over the last seven days, oldest first.
    pub async fn last_week_hours(&self, user_id: i64) -> Result<Vec<DayHours>, AttendanceError> {
        let range = DateRange::last_n_days(self.clock.today(), 7);
        let records = self.store.list_range(user_id, range).await?;
        Ok(records
            .into_iter()
            .map(|r| DayHours { day: r.day, hours: r.total_hours })
            .collect())
    }
}
