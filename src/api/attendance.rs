use crate::attendance::service::{AttendanceService, AttendanceSummary, TeamSummary};
use crate::attendance::store::RecordFilter;
use crate::auth::auth::AuthUser;
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee, Status};
use crate::utils::csv::attendance_csv;
use actix_web::{HttpResponse, Responder, error::ErrorInternalServerError, web};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::error;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct HistoryQuery {
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct SummaryQuery {
    /// Month in `YYYY-MM` form; defaults to the current month.
    #[schema(example = "2026-02")]
    pub month: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AttendanceQuery {
    pub employee_id: Option<i64>,
    #[schema(example = "2026-02-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-02-28", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub status: Option<Status>,
    /// Department name; "all" means no filter.
    pub department: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeRangeQuery {
    #[schema(example = "2026-02-01", value_type = Option<String>, format = "date")]
    pub start_date: Option<NaiveDate>,
    #[schema(example = "2026-02-28", value_type = Option<String>, format = "date")]
    pub end_date: Option<NaiveDate>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct HistoryResponse {
    pub data: Vec<AttendanceRecord>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

#[derive(Serialize, ToSchema)]
pub struct AttendanceListResponse {
    pub data: Vec<AttendanceWithEmployee>,
    #[schema(example = 1)]
    pub page: u32,
    #[schema(example = 20)]
    pub per_page: u32,
    #[schema(example = 42)]
    pub total: i64,
}

fn pagination(page: Option<u32>, per_page: Option<u32>) -> (u32, u32) {
    let page = page.unwrap_or(1).max(1);
    let per_page = per_page.unwrap_or(20).clamp(1, 100);
    (page, per_page)
}

fn filter_from(query: &AttendanceQuery) -> RecordFilter {
    RecordFilter {
        user_id: query.employee_id,
        start: query.start_date,
        end: query.end_date,
        status: query.status,
        department: match query.department.as_deref() {
            None | Some("all") => None,
            Some(d) => Some(d.to_string()),
        },
    }
}

/// Check-in endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-in",
    responses(
        (status = 200, description = "Checked in successfully", body = Object, example = json!({
            "message": "Checked in successfully"
        })),
        (status = 400, description = "Already checked in today", body = Object, example = json!({
            "message": "Already checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_in(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let record = svc.check_in(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked in successfully",
        "data": record,
    })))
}

/// Check-out endpoint
#[utoipa::path(
    post,
    path = "/api/v1/attendance/check-out",
    responses(
        (status = 200, description = "Checked out successfully", body = Object, example = json!({
            "message": "Checked out successfully"
        })),
        (status = 400, description = "Not checked in today", body = Object, example = json!({
            "message": "Not checked in today"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn check_out(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let record = svc.check_out(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({
        "message": "Checked out successfully",
        "data": record,
    })))
}

/// Today's own record, or null before first check-in
#[utoipa::path(
    get,
    path = "/api/v1/attendance/today",
    responses(
        (status = 200, description = "Today's attendance record, null if none", body = Object),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn today_status(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let record = svc.today_record(auth.user_id).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": record })))
}

/// Own attendance history, newest first
#[utoipa::path(
    get,
    path = "/api/v1/attendance/my-history",
    params(
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated attendance history", body = HistoryResponse),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_history(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
    query: web::Query<HistoryQuery>,
) -> actix_web::Result<impl Responder> {
    let (page, per_page) = pagination(query.page, query.per_page);
    let (data, total) = svc.history(auth.user_id, page as i64, per_page as i64).await?;
    Ok(HttpResponse::Ok().json(HistoryResponse { data, page, per_page, total }))
}

/// Own monthly summary
#[utoipa::path(
    get,
    path = "/api/v1/attendance/my-summary",
    params(
        ("month", Query, description = "Month as YYYY-MM, defaults to current month")
    ),
    responses(
        (status = 200, description = "Status counts and hours for the month", body = AttendanceSummary),
        (status = 400, description = "Invalid month"),
        (status = 401, description = "Unauthorized")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn my_summary(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
    query: web::Query<SummaryQuery>,
) -> actix_web::Result<impl Responder> {
    let summary = svc.summary_for_month(auth.user_id, query.month.as_deref()).await?;
    Ok(HttpResponse::Ok().json(json!({ "data": summary })))
}

/// All attendance records with filters (manager)
#[utoipa::path(
    get,
    path = "/api/v1/attendance",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("start_date", Query, description = "Range start, YYYY-MM-DD"),
        ("end_date", Query, description = "Range end, YYYY-MM-DD"),
        ("status", Query, description = "Filter by status"),
        ("department", Query, description = "Filter by department, 'all' for none"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated attendance records", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn list_attendance(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let (page, per_page) = pagination(query.page, query.per_page);
    let filter = filter_from(&query);
    let (data, total) = svc.list_records(&filter, page as i64, per_page as i64).await?;
    Ok(HttpResponse::Ok().json(AttendanceListResponse { data, page, per_page, total }))
}

/// One employee's records (manager)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/employee/{id}",
    params(
        ("id", Path, description = "Employee user id"),
        ("start_date", Query, description = "Range start, YYYY-MM-DD"),
        ("end_date", Query, description = "Range end, YYYY-MM-DD"),
        ("page", Query, description = "Page number"),
        ("per_page", Query, description = "Items per page")
    ),
    responses(
        (status = 200, description = "Paginated attendance records", body = AttendanceListResponse),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn employee_attendance(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
    path: web::Path<i64>,
    query: web::Query<EmployeeRangeQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let (page, per_page) = pagination(query.page, query.per_page);
    let filter = RecordFilter {
        user_id: Some(path.into_inner()),
        start: query.start_date,
        end: query.end_date,
        ..Default::default()
    };
    let (data, total) = svc.list_records(&filter, page as i64, per_page as i64).await?;
    Ok(HttpResponse::Ok().json(AttendanceListResponse { data, page, per_page, total }))
}

/// Today's team summary (manager)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/summary",
    responses(
        (status = 200, description = "Team status counts for today", body = TeamSummary),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn team_summary(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let summary = svc.team_summary().await?;
    Ok(HttpResponse::Ok().json(json!({ "data": summary })))
}

/// Attendance report with totals (manager)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/report",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("start_date", Query, description = "Range start, YYYY-MM-DD"),
        ("end_date", Query, description = "Range end, YYYY-MM-DD"),
        ("status", Query, description = "Filter by status"),
        ("department", Query, description = "Filter by department, 'all' for none")
    ),
    responses(
        (status = 200, description = "Report summary plus matching records", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn report(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let filter = filter_from(&query);
    let (summary, data) = svc.report(&filter).await?;
    Ok(HttpResponse::Ok().json(json!({
        "summary": summary,
        "data": data,
    })))
}

/// CSV export of attendance records (manager)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/export",
    params(
        ("employee_id", Query, description = "Filter by employee"),
        ("start_date", Query, description = "Range start, YYYY-MM-DD"),
        ("end_date", Query, description = "Range end, YYYY-MM-DD"),
        ("status", Query, description = "Filter by status"),
        ("department", Query, description = "Filter by department, 'all' for none")
    ),
    responses(
        (status = 200, description = "CSV file", content_type = "text/csv"),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn export_csv(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
    query: web::Query<AttendanceQuery>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let filter = filter_from(&query);
    let rows = svc.export_rows(&filter).await?;
    let csv = attendance_csv(&rows).map_err(|e| {
        error!(error = %e, "Failed to render attendance CSV");
        ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv")
        .insert_header(("Content-Disposition", "attachment; filename=attendance.csv"))
        .body(csv))
}

/// Everyone who has checked in today (manager)
#[utoipa::path(
    get,
    path = "/api/v1/attendance/team-today",
    responses(
        (status = 200, description = "Today's records with a check-in stamp", body = Object),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Attendance"
)]
pub async fn team_today(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let data = svc.team_today().await?;
    Ok(HttpResponse::Ok().json(json!({ "data": data })))
}
