use crate::attendance::service::AttendanceService;
use crate::auth::auth::AuthUser;
use actix_web::{HttpResponse, Responder, web};
use chrono::NaiveDateTime;
use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

/// A late check-in flattened for the manager dashboard.
#[derive(Serialize, ToSchema)]
pub struct LateArrival {
    #[schema(example = 7)]
    pub user_id: i64,
    #[schema(example = "Bob Smith")]
    pub name: String,
    #[schema(example = "bob.smith@example.com")]
    pub email: String,
    #[schema(example = "EMP002")]
    pub employee_code: String,
    #[schema(example = "Sales")]
    pub department: String,
    #[schema(example = "2026-02-02T09:47:03", value_type = Option<String>, format = "date-time")]
    pub check_in_at: Option<NaiveDateTime>,
}

/// Employee dashboard: today's record, current-month summary and the last
/// week of worked hours
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/employee",
    responses(
        (status = 200, description = "Employee dashboard payload", body = Object, example = json!({
            "data": {
                "today": null,
                "summary": {
                    "present": 18, "absent": 1, "late": 2, "half_day": 1,
                    "total_hours": 168.5, "total_days": 22
                },
                "last_7_days": [{ "day": "2026-02-02", "hours": 8.5 }]
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn employee_dashboard(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    let today = svc.today_record(auth.user_id).await?;
    let summary = svc.summary_for_month(auth.user_id, None).await?;
    let last_7_days = svc.last_week_hours(auth.user_id).await?;

    Ok(HttpResponse::Ok().json(json!({
        "data": {
            "today": today,
            "summary": summary,
            "last_7_days": last_7_days,
        }
    })))
}

/// Manager dashboard: team summary, late arrivals, absentees, weekly trend,
/// department breakdown and recent activity
#[utoipa::path(
    get,
    path = "/api/v1/dashboard/manager",
    responses(
        (status = 200, description = "Manager dashboard payload", body = Object, example = json!({
            "data": {
                "summary": {
                    "total_employees": 10, "present": 6, "absent": 2, "late": 1, "half_day": 1
                },
                "late_arrivals": [],
                "absent_employees": [],
                "weekly_trend": [{ "day": "2026-02-02", "present": 8, "absent": 2 }],
                "department_stats": [{ "department": "Engineering", "present": 4, "absent": 0 }],
                "recent_activity": [{
                    "employee_name": "Alice Johnson",
                    "action": "Checked In",
                    "at": "2026-02-02T09:04:12"
                }]
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "Manager access required"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Dashboard"
)]
pub async fn manager_dashboard(
    auth: AuthUser,
    svc: web::Data<AttendanceService>,
) -> actix_web::Result<impl Responder> {
    auth.require_manager()?;

    let summary = svc.team_summary().await?;
    let late_arrivals: Vec<LateArrival> = svc
        .late_arrivals_today()
        .await?
        .into_iter()
        .map(|row| LateArrival {
            user_id: row.user_id,
            name: row.name,
            email: row.email,
            employee_code: row.employee_code,
            department: row.department,
            check_in_at: row.check_in_at,
        })
        .collect();
    let absent_employees = svc.absent_today().await?;
    let weekly_trend = svc.weekly_trend().await?;
    let department_stats = svc.department_breakdown().await?;
    let recent_activity = svc.recent_activity(5).await?;

    Ok(HttpResponse::Ok().json(json!({
        "data": {
            "summary": summary,
            "late_arrivals": late_arrivals,
            "absent_employees": absent_employees,
            "weekly_trend": weekly_trend,
            "department_stats": department_stats,
            "recent_activity": recent_activity,
        }
    })))
}
