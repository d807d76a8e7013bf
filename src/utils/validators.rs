use std::str::FromStr;

use crate::model::user::{Department, Role};
use crate::models::RegisterReq;

fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}

/// Validate a registration payload and parse its enum fields. Returns the
/// first failed check's message, mirroring field-by-field validation.
pub fn validate_register(req: &RegisterReq) -> Result<(Role, Department), String> {
    if req.name.trim().is_empty() {
        return Err("Name is required".to_string());
    }
    if !is_valid_email(req.email.trim()) {
        return Err("Invalid email address".to_string());
    }
    if req.password.len() < 6 {
        return Err("Password must be at least 6 characters".to_string());
    }
    if req.employee_code.trim().is_empty() {
        return Err("Employee code is required".to_string());
    }
    let trimmed = req.department.trim();
    if trimmed.is_empty() {
        return Err("Department is required".to_string());
    }
    let department =
        Department::from_str(trimmed).map_err(|_| "Invalid department".to_string())?;

    let role = match req.role.as_deref() {
        None => Role::Employee,
        Some(r) => Role::from_str(r).map_err(|_| "Invalid role".to_string())?,
    };

    Ok((role, department))
}
