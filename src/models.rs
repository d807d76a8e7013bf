use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterReq {
    #[schema(example = "Alice Johnson")]
    pub name: String,
    #[schema(example = "alice.johnson@company.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
    #[schema(example = "EMP001")]
    pub employee_code: String,
    #[schema(example = "Engineering")]
    pub department: String,
    /// Defaults to "employee" when omitted.
    #[schema(example = "employee")]
    pub role: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginReq {
    #[schema(example = "alice.johnson@company.com")]
    pub email: String,
    #[schema(example = "password123")]
    pub password: String,
}

/// Credential row, only ever read by the auth handlers.
#[derive(FromRow)]
pub struct UserSql {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub role: String,
    pub employee_code: String,
    pub department: String,
    pub is_active: bool,
}

/// Public view of a user, returned by auth endpoints. Never carries the
/// password hash.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserProfile {
    #[schema(example = 3)]
    pub id: i64,
    #[schema(example = "Alice Johnson")]
    pub name: String,
    #[schema(example = "alice.johnson@company.com")]
    pub email: String,
    #[schema(example = "employee")]
    pub role: String,
    #[schema(example = "EMP001")]
    pub employee_code: String,
    #[schema(example = "Engineering")]
    pub department: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: i64,
    /// Email address of the bearer.
    pub sub: String,
    pub role: String,
    pub exp: usize,
    pub jti: String,
}
