use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};
use utoipa::ToSchema;

/// Access role. Managers see the whole team, employees only themselves.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Role {
    Employee,
    Manager,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
pub enum Department {
    Engineering,
    Sales,
    #[strum(serialize = "HR")]
    #[serde(rename = "HR")]
    Hr,
    Marketing,
    Operations,
    Finance,
}

impl Department {
    pub const ALL: [Department; 6] = [
        Department::Engineering,
        Department::Sales,
        Department::Hr,
        Department::Marketing,
        Department::Operations,
        Department::Finance,
    ];
}

/// The roster view of an employee: just the identity columns the attendance
/// side needs, no credentials.
#[derive(Debug, Clone, Serialize, sqlx::FromRow, ToSchema)]
pub struct EmployeeLite {
    #[schema(example = 3)]
    pub id: i64,

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
    use std::str::FromStr;

    #[test]
    fn role_round_trips_lowercase() {
        assert_eq!(Role::Manager.to_string(), "manager");
        assert_eq!(Role::from_str("employee").unwrap(), Role::Employee);
        assert!(Role::from_str("admin").is_err());
    }

    #[test]
    fn department_hr_is_uppercase() {
        assert_eq!(Department::Hr.to_string(), "HR");
        assert_eq!(Department::from_str("HR").unwrap(), Department::Hr);
        assert_eq!(serde_json::to_string(&Department::Hr).unwrap(), "\"HR\"");
        assert!(Department::from_str("Legal").is_err());
    }
}
