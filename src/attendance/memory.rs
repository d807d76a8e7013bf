use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};

use super::dates::DateRange;
use super::error::AttendanceError;
use super::store::{AttendanceStore, EmployeeRoster, NewAttendance, RecordFilter};
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee, Status};
use crate::model::user::EmployeeLite;

/// In-memory store + roster for service and backfill tests. Mirrors the
/// Postgres semantics: one row per (user_id, day), conflict on duplicate
/// insert, guarded stamp updates.
pub struct MemoryBackend {
    employees: Vec<EmployeeLite>,
    rows: Mutex<BTreeMap<(i64, NaiveDate), AttendanceRecord>>,
    next_id: AtomicI64,
}

impl MemoryBackend {
    pub fn new(employees: Vec<EmployeeLite>) -> Self {
        Self {
            employees,
            rows: Mutex::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn employee(id: i64, name: &str, department: &str) -> EmployeeLite {
        EmployeeLite {
            id,
            name: name.to_string(),
            email: format!("{}@company.com", name.to_lowercase().replace(' ', ".")),
            employee_code: format!("EMP{id:03}"),
            department: department.to_string(),
        }
    }

    pub fn row_count(&self) -> usize {
        self.rows.lock().unwrap().len()
    }

    fn joined(&self, record: &AttendanceRecord) -> Option<AttendanceWithEmployee> {
        let employee = self.employees.iter().find(|e| e.id == record.user_id)?;
        Some(AttendanceWithEmployee {
            id: record.id,
            user_id: record.user_id,
            day: record.day,
            check_in_at: record.check_in_at,
            check_out_at: record.check_out_at,
            total_hours: record.total_hours,
            status: record.status,
            updated_at: record.updated_at,
            name: employee.name.clone(),
            email: employee.email.clone(),
            employee_code: employee.employee_code.clone(),
            department: employee.department.clone(),
        })
    }

    fn matches(filter: &RecordFilter, row: &AttendanceWithEmployee) -> bool {
        if let Some(user_id) = filter.user_id {
            if row.user_id != user_id {
                return false;
            }
        }
        if let Some(start) = filter.start {
            if row.day < start {
                return false;
            }
        }
        if let Some(end) = filter.end {
            if row.day > end {
                return false;
            }
        }
        if let Some(status) = filter.status {
            if row.status != status {
                return false;
            }
        }
        if let Some(department) = &filter.department {
            if &row.department != department {
                return false;
            }
        }
        true
    }

    fn filtered_sorted(&self, filter: &RecordFilter) -> Vec<AttendanceWithEmployee> {
        let rows = self.rows.lock().unwrap();
        let mut joined: Vec<_> = rows
            .values()
            .filter_map(|r| self.joined(r))
            .filter(|r| Self::matches(filter, r))
            .collect();
        joined.sort_by(|a, b| b.day.cmp(&a.day).then_with(|| a.name.cmp(&b.name)));
        joined
    }
}

fn midnight(day: NaiveDate) -> NaiveDateTime {
    day.and_hms_opt(0, 0, 0).unwrap()
}

#[async_trait]
impl AttendanceStore for MemoryBackend {
    async fn find_by_day(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        Ok(self.rows.lock().unwrap().get(&(user_id, day)).cloned())
    }

    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, AttendanceError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&(new.user_id, new.day)) {
            return Err(AttendanceError::StorageConflict);
        }
        let record = AttendanceRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id: new.user_id,
            day: new.day,
            check_in_at: new.check_in_at,
            check_out_at: None,
            total_hours: 0.0,
            status: new.status,
            updated_at: new.check_in_at.unwrap_or_else(|| midnight(new.day)),
        };
        rows.insert((new.user_id, new.day), record.clone());
        Ok(record)
    }

    async fn mark_checked_in(
        &self,
        id: i64,
        at: NaiveDateTime,
        status: Status,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let mut rows = self.rows.lock().unwrap();
        let record = rows
            .values_mut()
            .find(|r| r.id == id && r.check_in_at.is_none())
            .ok_or(AttendanceError::StorageConflict)?;
        record.check_in_at = Some(at);
        record.status = status;
        record.updated_at = at;
        Ok(record.clone())
    }

    async fn mark_checked_out(
        &self,
        id: i64,
        at: NaiveDateTime,
        total_hours: f64,
        status: Status,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let mut rows = self.rows.lock().unwrap();
        let record = rows
            .values_mut()
            .find(|r| r.id == id && r.check_out_at.is_none())
            .ok_or(AttendanceError::StorageConflict)?;
        record.check_out_at = Some(at);
        record.total_hours = total_hours;
        record.status = status;
        record.updated_at = at;
        Ok(record.clone())
    }

    async fn insert_absent_if_missing(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<bool, AttendanceError> {
        let mut rows = self.rows.lock().unwrap();
        if rows.contains_key(&(user_id, day)) {
            return Ok(false);
        }
        let record = AttendanceRecord {
            id: self.next_id.fetch_add(1, Ordering::SeqCst),
            user_id,
            day,
            check_in_at: None,
            check_out_at: None,
            total_hours: 0.0,
            status: Status::Absent,
            updated_at: midnight(day),
        };
        rows.insert((user_id, day), record);
        Ok(true)
    }

    async fn list_day(&self, day: NaiveDate) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.values().filter(|r| r.day == day).cloned().collect())
    }

    async fn list_range(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let rows = self.rows.lock().unwrap();
        let mut records: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id && range.contains(r.day))
            .cloned()
            .collect();
        records.sort_by_key(|r| r.day);
        Ok(records)
    }

    async fn page_history(
        &self,
        user_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceRecord>, i64), AttendanceError> {
        let rows = self.rows.lock().unwrap();
        let mut records: Vec<_> = rows
            .values()
            .filter(|r| r.user_id == user_id)
            .cloned()
            .collect();
        records.sort_by(|a, b| b.day.cmp(&a.day));
        let total = records.len() as i64;
        let offset = ((page - 1) * per_page).max(0) as usize;
        let page_rows = records
            .into_iter()
            .skip(offset)
            .take(per_page.max(0) as usize)
            .collect();
        Ok((page_rows, total))
    }

    async fn list_filtered(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        Ok(self.filtered_sorted(filter))
    }

    async fn page_filtered(
        &self,
        filter: &RecordFilter,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceWithEmployee>, i64), AttendanceError> {
        let all = self.filtered_sorted(filter);
        let total = all.len() as i64;
        let offset = ((page - 1) * per_page).max(0) as usize;
        let page_rows = all
            .into_iter()
            .skip(offset)
            .take(per_page.max(0) as usize)
            .collect();
        Ok((page_rows, total))
    }

    async fn list_day_joined(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let rows = self.rows.lock().unwrap();
        let mut joined: Vec<_> = rows
            .values()
            .filter(|r| r.day == day)
            .filter_map(|r| self.joined(r))
            .collect();
        joined.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(joined)
    }

    async fn count_by_day_status(
        &self,
        range: DateRange,
    ) -> Result<Vec<(NaiveDate, Status, i64)>, AttendanceError> {
        let rows = self.rows.lock().unwrap();
        let mut counts: BTreeMap<(NaiveDate, String), (Status, i64)> = BTreeMap::new();
        for record in rows.values().filter(|r| range.contains(r.day)) {
            let entry = counts
                .entry((record.day, record.status.to_string()))
                .or_insert((record.status, 0));
            entry.1 += 1;
        }
        Ok(counts
            .into_iter()
            .map(|((day, _), (status, n))| (day, status, n))
            .collect())
    }

    async fn recent_activity(
        &self,
        limit: i64,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let rows = self.rows.lock().unwrap();
        let mut joined: Vec<_> = rows
            .values()
            .filter(|r| r.check_in_at.is_some())
            .filter_map(|r| self.joined(r))
            .collect();
        joined.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        joined.truncate(limit.max(0) as usize);
        Ok(joined)
    }
}

#[async_trait]
impl EmployeeRoster for MemoryBackend {
    async fn list_active(&self) -> Result<Vec<EmployeeLite>, AttendanceError> {
        Ok(self.employees.clone())
    }
}
