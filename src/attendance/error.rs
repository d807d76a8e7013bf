use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use chrono::NaiveDate;
use serde_json::json;
use thiserror::Error;

/// Domain errors for attendance operations. The `ResponseError` impl maps
/// each variant onto the HTTP surface so handlers can just use `?`.
#[derive(Debug, Error)]
pub enum AttendanceError {
    #[error("Already checked in today")]
    AlreadyCheckedIn,

    #[error("Not checked in today")]
    NotCheckedIn,

    #[error("Already checked out today")]
    AlreadyCheckedOut,

    #[error("Invalid date range: {start} to {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Concurrent update conflict")]
    StorageConflict,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for AttendanceError {
    fn status_code(&self) -> StatusCode {
        match self {
            AttendanceError::AlreadyCheckedIn
            | AttendanceError::NotCheckedIn
            | AttendanceError::AlreadyCheckedOut
            | AttendanceError::InvalidDateRange { .. }
            | AttendanceError::InvalidMonth(_) => StatusCode::BAD_REQUEST,
            AttendanceError::StorageConflict => StatusCode::CONFLICT,
            AttendanceError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            AttendanceError::Database(e) => {
                tracing::error!(error = %e, "attendance storage error");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };
        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::ResponseError;

    #[test]
    fn conflict_maps_to_409() {
        assert_eq!(AttendanceError::StorageConflict.status_code(), StatusCode::CONFLICT);
    }

    #[test]
    fn flow_errors_map_to_400() {
        assert_eq!(AttendanceError::AlreadyCheckedIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AttendanceError::NotCheckedIn.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AttendanceError::AlreadyCheckedOut.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn database_error_hides_detail() {
        let err = AttendanceError::Database(sqlx::Error::PoolTimedOut);
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = err.error_response();
        assert_eq!(body.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
