use anyhow::Result;

use crate::model::attendance::AttendanceWithEmployee;

/// Render attendance rows as CSV for the export endpoint. Missing stamps
/// become "N/A"; hours are fixed to two decimals.
pub fn attendance_csv(rows: &[AttendanceWithEmployee]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record([
        "Date",
        "EmployeeCode",
        "Name",
        "Department",
        "CheckIn",
        "CheckOut",
        "TotalHours",
        "Status",
    ])?;

    for row in rows {
        let check_in = row
            .check_in_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string());
        let check_out = row
            .check_out_at
            .map(|t| t.format("%H:%M:%S").to_string())
            .unwrap_or_else(|| "N/A".to_string());

        writer.write_record([
            row.day.to_string(),
            row.employee_code.clone(),
            row.name.clone(),
            row.department.clone(),
            check_in,
            check_out,
            format!("{:.2}", row.total_hours),
            row.status.to_string(),
        ])?;
    }

    let bytes = writer
        .into_inner()
        .map_err(|e| anyhow::anyhow!("finish csv: {e}"))?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::attendance::Status;
    use chrono::{NaiveDate, NaiveDateTime};

    fn dt(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    fn row(
        check_in: Option<&str>,
        check_out: Option<&str>,
        total_hours: f64,
        status: Status,
    ) -> AttendanceWithEmployee {
        AttendanceWithEmployee {
            id: 1,
            user_id: 3,
            day: NaiveDate::from_ymd_opt(2026, 2, 2).unwrap(),
            check_in_at: check_in.map(dt),
            check_out_at: check_out.map(dt),
            total_hours,
            status,
            updated_at: dt("2026-02-02T17:30:00"),
            name: "Alice Johnson".to_string(),
            email: "alice.johnson@company.com".to_string(),
            employee_code: "EMP001".to_string(),
            department: "Engineering".to_string(),
        }
    }

    #[test]
    fn formats_full_and_absent_rows() {
        let rows = vec![
            row(
                Some("2026-02-02T09:04:12"),
                Some("2026-02-02T17:30:00"),
                8.43,
                Status::Present,
            ),
            row(None, None, 0.0, Status::Absent),
        ];
        let csv = attendance_csv(&rows).unwrap();
        let mut lines = csv.lines();

        assert_eq!(
            lines.next().unwrap(),
            "Date,EmployeeCode,Name,Department,CheckIn,CheckOut,TotalHours,Status"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2026-02-02,EMP001,Alice Johnson,Engineering,09:04:12,17:30:00,8.43,present"
        );
        assert_eq!(
            lines.next().unwrap(),
            "2026-02-02,EMP001,Alice Johnson,Engineering,N/A,N/A,0.00,absent"
        );
        assert!(lines.next().is_none());
    }

    #[test]
    fn empty_export_is_header_only() {
        let csv = attendance_csv(&[]).unwrap();
        assert_eq!(csv.lines().count(), 1);
    }
}
