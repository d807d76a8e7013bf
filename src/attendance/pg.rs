use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use moka::future::Cache;
use sqlx::PgPool;

use super::dates::DateRange;
use super::error::AttendanceError;
use super::store::{AttendanceStore, EmployeeRoster, NewAttendance, RecordFilter};
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee, Status};
use crate::model::user::EmployeeLite;

const JOINED_COLUMNS: &str = "a.id, a.user_id, a.day, a.check_in_at, a.check_out_at, \
     a.total_hours, a.status, a.updated_at, \
     u.name, u.email, u.employee_code, u.department";

/// Postgres unique_violation, raised by the (user_id, day) key.
fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Bindable filter value for dynamically built WHERE clauses.
#[derive(Debug)]
enum Bind {
    Int(i64),
    Date(NaiveDate),
    Status(Status),
    Text(String),
}

/// Build the WHERE clause for a `RecordFilter` against the joined listing
/// query. Placeholders are numbered in bind order.
fn filter_clause(filter: &RecordFilter) -> (String, Vec<Bind>) {
    let mut conditions = Vec::new();
    let mut binds = Vec::new();

    if let Some(user_id) = filter.user_id {
        binds.push(Bind::Int(user_id));
        conditions.push(format!("a.user_id = ${}", binds.len()));
    }
    if let Some(start) = filter.start {
        binds.push(Bind::Date(start));
        conditions.push(format!("a.day >= ${}", binds.len()));
    }
    if let Some(end) = filter.end {
        binds.push(Bind::Date(end));
        conditions.push(format!("a.day <= ${}", binds.len()));
    }
    if let Some(status) = filter.status {
        binds.push(Bind::Status(status));
        conditions.push(format!("a.status = ${}", binds.len()));
    }
    if let Some(department) = &filter.department {
        binds.push(Bind::Text(department.clone()));
        conditions.push(format!("u.department = ${}", binds.len()));
    }

    let clause = if conditions.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", conditions.join(" AND "))
    };
    (clause, binds)
}

pub struct PgAttendanceStore {
    pool: PgPool,
}

impl PgAttendanceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AttendanceStore for PgAttendanceStore {
    async fn find_by_day(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<Option<AttendanceRecord>, AttendanceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            "SELECT * FROM attendance WHERE user_id = $1 AND day = $2",
        )
        .bind(user_id)
        .bind(day)
        .fetch_optional(&self.pool)
        .await?;
        Ok(record)
    }

    async fn insert(&self, new: NewAttendance) -> Result<AttendanceRecord, AttendanceError> {
        let result = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            INSERT INTO attendance (user_id, day, check_in_at, status)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(new.user_id)
        .bind(new.day)
        .bind(new.check_in_at)
        .bind(new.status)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(record) => Ok(record),
            Err(e) if is_unique_violation(&e) => Err(AttendanceError::StorageConflict),
            Err(e) => Err(e.into()),
        }
    }

    async fn mark_checked_in(
        &self,
        id: i64,
        at: NaiveDateTime,
        status: Status,
    ) -> Result<AttendanceRecord, AttendanceError> {
        // Guarded on check_in_at IS NULL so a concurrent writer loses cleanly.
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance
            SET check_in_at = $1, status = $2, updated_at = $3
            WHERE id = $4 AND check_in_at IS NULL
            RETURNING *
            "#,
        )
        .bind(at)
        .bind(status)
        .bind(at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(AttendanceError::StorageConflict)
    }

    async fn mark_checked_out(
        &self,
        id: i64,
        at: NaiveDateTime,
        total_hours: f64,
        status: Status,
    ) -> Result<AttendanceRecord, AttendanceError> {
        let record = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            UPDATE attendance
            SET check_out_at = $1, total_hours = $2, status = $3, updated_at = $4
            WHERE id = $5 AND check_out_at IS NULL
            RETURNING *
            "#,
        )
        .bind(at)
        .bind(total_hours)
        .bind(status)
        .bind(at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        record.ok_or(AttendanceError::StorageConflict)
    }

    async fn insert_absent_if_missing(
        &self,
        user_id: i64,
        day: NaiveDate,
    ) -> Result<bool, AttendanceError> {
        let result = sqlx::query(
            r#"
            INSERT INTO attendance (user_id, day, status)
            VALUES ($1, $2, 'absent')
            ON CONFLICT (user_id, day) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(day)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_day(&self, day: NaiveDate) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let records =
            sqlx::query_as::<_, AttendanceRecord>("SELECT * FROM attendance WHERE day = $1")
                .bind(day)
                .fetch_all(&self.pool)
                .await?;
        Ok(records)
    }

    async fn list_range(
        &self,
        user_id: i64,
        range: DateRange,
    ) -> Result<Vec<AttendanceRecord>, AttendanceError> {
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance
            WHERE user_id = $1 AND day BETWEEN $2 AND $3
            ORDER BY day ASC
            "#,
        )
        .bind(user_id)
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(records)
    }

    async fn page_history(
        &self,
        user_id: i64,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceRecord>, i64), AttendanceError> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM attendance WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        let offset = (page - 1) * per_page;
        let records = sqlx::query_as::<_, AttendanceRecord>(
            r#"
            SELECT * FROM attendance
            WHERE user_id = $1
            ORDER BY day DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id)
        .bind(per_page)
        .bind(offset)
        .fetch_all(&self.pool)
        .await?;

        Ok((records, total))
    }

    async fn list_filtered(
        &self,
        filter: &RecordFilter,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let (clause, binds) = filter_clause(filter);
        let sql = format!(
            "SELECT {JOINED_COLUMNS} FROM attendance a \
             JOIN users u ON u.id = a.user_id{clause} \
             ORDER BY a.day DESC, u.name ASC"
        );

        let mut query = sqlx::query_as::<_, AttendanceWithEmployee>(&sql);
        for bind in binds {
            query = match bind {
                Bind::Int(v) => query.bind(v),
                Bind::Date(v) => query.bind(v),
                Bind::Status(v) => query.bind(v),
                Bind::Text(v) => query.bind(v),
            };
        }

        Ok(query.fetch_all(&self.pool).await?)
    }

    async fn page_filtered(
        &self,
        filter: &RecordFilter,
        page: i64,
        per_page: i64,
    ) -> Result<(Vec<AttendanceWithEmployee>, i64), AttendanceError> {
        let (clause, binds) = filter_clause(filter);

        let count_sql = format!(
            "SELECT COUNT(*) FROM attendance a JOIN users u ON u.id = a.user_id{clause}"
        );
        let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql);
        for bind in &binds {
            count_query = match bind {
                Bind::Int(v) => count_query.bind(*v),
                Bind::Date(v) => count_query.bind(*v),
                Bind::Status(v) => count_query.bind(*v),
                Bind::Text(v) => count_query.bind(v.clone()),
            };
        }
        let total = count_query.fetch_one(&self.pool).await?;

        let offset = (page - 1) * per_page;
        let rows_sql = format!(
            "SELECT {JOINED_COLUMNS} FROM attendance a \
             JOIN users u ON u.id = a.user_id{clause} \
             ORDER BY a.day DESC, u.name ASC \
             LIMIT ${} OFFSET ${}",
            binds.len() + 1,
            binds.len() + 2
        );
        let mut rows_query = sqlx::query_as::<_, AttendanceWithEmployee>(&rows_sql);
        for bind in binds {
            rows_query = match bind {
                Bind::Int(v) => rows_query.bind(v),
                Bind::Date(v) => rows_query.bind(v),
                Bind::Status(v) => rows_query.bind(v),
                Bind::Text(v) => rows_query.bind(v),
            };
        }
        let records = rows_query
            .bind(per_page)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((records, total))
    }

    async fn list_day_joined(
        &self,
        day: NaiveDate,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} FROM attendance a \
             JOIN users u ON u.id = a.user_id \
             WHERE a.day = $1 \
             ORDER BY u.name ASC"
        );
        let records = sqlx::query_as::<_, AttendanceWithEmployee>(&sql)
            .bind(day)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }

    async fn count_by_day_status(
        &self,
        range: DateRange,
    ) -> Result<Vec<(NaiveDate, Status, i64)>, AttendanceError> {
        let rows = sqlx::query_as::<_, (NaiveDate, Status, i64)>(
            r#"
            SELECT day, status, COUNT(*) FROM attendance
            WHERE day BETWEEN $1 AND $2
            GROUP BY day, status
            ORDER BY day ASC
            "#,
        )
        .bind(range.start)
        .bind(range.end)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn recent_activity(
        &self,
        limit: i64,
    ) -> Result<Vec<AttendanceWithEmployee>, AttendanceError> {
        let sql = format!(
            "SELECT {JOINED_COLUMNS} FROM attendance a \
             JOIN users u ON u.id = a.user_id \
             WHERE a.check_in_at IS NOT NULL \
             ORDER BY a.updated_at DESC \
             LIMIT $1"
        );
        let records = sqlx::query_as::<_, AttendanceWithEmployee>(&sql)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(records)
    }
}

/// Roster reads hit every dashboard request, so the active-employee list is
/// cached for a short TTL. Staleness only delays when a brand-new employee
/// starts counting as absent.
pub struct PgEmployeeRoster {
    pool: PgPool,
    cache: Cache<u8, Arc<Vec<EmployeeLite>>>,
}

const ROSTER_CACHE_KEY: u8 = 0;

impl PgEmployeeRoster {
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(60))
            .build();
        Self { pool, cache }
    }
}

#[async_trait]
impl EmployeeRoster for PgEmployeeRoster {
    async fn list_active(&self) -> Result<Vec<EmployeeLite>, AttendanceError> {
        if let Some(cached) = self.cache.get(&ROSTER_CACHE_KEY).await {
            return Ok(cached.as_ref().clone());
        }

        let employees = sqlx::query_as::<_, EmployeeLite>(
            r#"
            SELECT id, name, email, employee_code, department
            FROM users
            WHERE is_active = TRUE AND role = 'employee'
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        self.cache
            .insert(ROSTER_CACHE_KEY, Arc::new(employees.clone()))
            .await;
        Ok(employees)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn filter_clause_numbers_binds_in_order() {
        let filter = RecordFilter {
            user_id: Some(7),
            start: Some(NaiveDate::from_ymd_opt(2026, 2, 1).unwrap()),
            end: None,
            status: Some(Status::Late),
            department: Some("Engineering".to_string()),
        };
        let (clause, binds) = filter_clause(&filter);
        assert_eq!(
            clause,
            " WHERE a.user_id = $1 AND a.day >= $2 AND a.status = $3 AND u.department = $4"
        );
        assert_eq!(binds.len(), 4);
    }

    #[test]
    fn empty_filter_has_no_clause() {
        let (clause, binds) = filter_clause(&RecordFilter::default());
        assert!(clause.is_empty());
        assert!(binds.is_empty());
    }
}
