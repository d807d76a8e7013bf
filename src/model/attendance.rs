use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Attendance status, derived from check-in/check-out times and never set
/// directly by a caller. Stored as the `attendance_status` Postgres enum.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, Display,
    EnumString, ToSchema,
)]
#[serde(rename_all = "kebab-case")]
#[sqlx(type_name = "attendance_status", rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Status {
    Present,
    Absent,
    Late,
    HalfDay,
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
#[schema(
    example = json!({
        "id": 1,
        "user_id": 3,
        "day": "2026-02-02",
        "check_in_at": "2026-02-02T09:04:12",
        "check_out_at": "2026-02-02T17:31:45",
        "total_hours": 8.46,
        "status": "present",
        "updated_at": "2026-02-02T17:31:45"
    })
)]
pub struct AttendanceRecord {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 3)]
    pub user_id: i64,

    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub day: NaiveDate,

    #[schema(example = "2026-02-02T09:04:12", value_type = Option<String>, format = "date-time")]
    pub check_in_at: Option<NaiveDateTime>,

    #[schema(example = "2026-02-02T17:31:45", value_type = Option<String>, format = "date-time")]
    pub check_out_at: Option<NaiveDateTime>,

    #[schema(example = 8.46)]
    pub total_hours: f64,

    #[schema(example = "present")]
    pub status: Status,

    #[schema(example = "2026-02-02T17:31:45", value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,
}

/// Attendance row joined with the employee identity columns, for the
/// manager-facing listings, reports and the CSV export.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct AttendanceWithEmployee {
    #[schema(example = 1)]
    pub id: i64,

    #[schema(example = 3)]
    pub user_id: i64,

    #[schema(example = "2026-02-02", value_type = String, format = "date")]
    pub day: NaiveDate,

    #[schema(example = "2026-02-02T09:04:12", value_type = Option<String>, format = "date-time")]
    pub check_in_at: Option<NaiveDateTime>,

    #[schema(example = "2026-02-02T17:31:45", value_type = Option<String>, format = "date-time")]
    pub check_out_at: Option<NaiveDateTime>,

    #[schema(example = 8.46)]
    pub total_hours: f64,

    #[schema(example = "present")]
    pub status: Status,

    #[schema(example = "2026-02-02T17:31:45", value_type = String, format = "date-time")]
    pub updated_at: NaiveDateTime,

    #[schema(example = "Alice Johnson")]
    pub name: String,

    #[schema(example = "alice.johnson@company.com")]
    pub email: String,

    #[schema(example = "EMP001")]
    pub employee_code: String,

    #[schema(example = "Engineering")]
    pub department: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_serializes_with_hyphenated_half_day() {
        assert_eq!(serde_json::to_string(&Status::HalfDay).unwrap(), "\"half-day\"");
        assert_eq!(serde_json::to_string(&Status::Present).unwrap(), "\"present\"");
        assert_eq!(
            serde_json::from_str::<Status>("\"half-day\"").unwrap(),
            Status::HalfDay
        );
    }

    #[test]
    fn status_display_matches_wire_form() {
        assert_eq!(Status::HalfDay.to_string(), "half-day");
        assert_eq!(Status::Late.to_string(), "late");
        assert_eq!("absent".parse::<Status>().unwrap(), Status::Absent);
    }
}
