use crate::api::attendance::{
    AttendanceListResponse, AttendanceQuery, EmployeeRangeQuery, HistoryQuery, HistoryResponse,
    SummaryQuery,
};
use crate::api::dashboard::LateArrival;
use crate::attendance::service::{
    ActivityEntry, AttendanceSummary, DayHours, DepartmentStat, ReportSummary, TeamSummary,
    TrendPoint,
};
use crate::model::attendance::{AttendanceRecord, AttendanceWithEmployee, Status};
use crate::model::user::EmployeeLite;
use utoipa::Modify;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{OpenApi, openapi};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Attendance Tracker API",
        version = "1.0.0",
        description = r#"
## Employee Attendance Tracker

This API powers an **employee attendance** backend: daily check-in/check-out,
status classification, and the reporting that sits on top of it.

### 🔹 Key Features
- **Daily Attendance**
  - Check in and check out once per day, with late and half-day detection
- **Personal History**
  - Paginated history and monthly summaries per employee
- **Team Oversight**
  - Team summary, late arrivals, absentees, and CSV exports for managers
- **Dashboards**
  - Employee and manager dashboard payloads in a single call

### 🔐 Security
Endpoints under `/api/v1` are protected with **JWT Bearer authentication**.
Team-wide views require the **manager** role.

### 📦 Response Format
- JSON-based RESTful responses
- Pagination supported for list endpoints

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::attendance::check_in,
        crate::api::attendance::check_out,
        crate::api::attendance::today_status,
        crate::api::attendance::my_history,
        crate::api::attendance::my_summary,
        crate::api::attendance::list_attendance,
        crate::api::attendance::employee_attendance,
        crate::api::attendance::team_summary,
        crate::api::attendance::report,
        crate::api::attendance::export_csv,
        crate::api::attendance::team_today,

        crate::api::dashboard::employee_dashboard,
        crate::api::dashboard::manager_dashboard,
    ),
    components(
        schemas(
            Status,
            AttendanceRecord,
            AttendanceWithEmployee,
            EmployeeLite,
            AttendanceSummary,
            TeamSummary,
            TrendPoint,
            DepartmentStat,
            ActivityEntry,
            ReportSummary,
            DayHours,
            HistoryQuery,
            SummaryQuery,
            AttendanceQuery,
            EmployeeRangeQuery,
            HistoryResponse,
            AttendanceListResponse,
            LateArrival
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Attendance", description = "Check-in/check-out and attendance records"),
        (name = "Dashboard", description = "Employee and manager dashboard APIs"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}
