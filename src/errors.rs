use actix_web::{error::ResponseError, HttpResponse};
use std::fmt;
use std::error::Error as StdError;
use serde_json::json;
use log::{warn, error, debug};

use crate::forms::FieldError;

// Custom error handling
#[derive(Debug)]
pub enum ApiError {
    DatabaseError(String),
    ValidationError(String),
    FormInvalid(Vec<FieldError>),
    AuthError(String),
    RoleMismatch(String),
    NotFoundError(String),
    InternalError(String),
}

impl StdError for ApiError {}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ApiError::DatabaseError(msg) => write!(f, "Database error: {}", msg),
            ApiError::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            ApiError::FormInvalid(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field).collect();
                write!(f, "Form validation failed for: {}", fields.join(", "))
            }
            ApiError::AuthError(msg) => write!(f, "Authentication error: {}", msg),
            ApiError::RoleMismatch(msg) => write!(f, "Role mismatch: {}", msg),
            ApiError::NotFoundError(msg) => write!(f, "Not found: {}", msg),
            ApiError::InternalError(msg) => write!(f, "Internal server error: {}", msg),
        }
    }
}

impl ResponseError for ApiError {
    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::DatabaseError(msg) => {
                error!("\x1B[1;31mDATABASE ERROR:\x1B[0m {}", msg);
                HttpResponse::InternalServerError().json(json!({ "error": msg }))
            },
            ApiError::ValidationError(msg) => {
                warn!("\x1B[1;33mVALIDATION ERROR:\x1B[0m {}", msg);
                HttpResponse::BadRequest().json(json!({ "error": msg }))
            },
            ApiError::FormInvalid(errors) => {
                warn!("\x1B[1;33mVALIDATION ERROR:\x1B[0m {}", self);
                HttpResponse::BadRequest().json(json!({
                    "error": "Please correct the highlighted fields",
                    "fields": errors,
                }))
            },
            ApiError::AuthError(msg) => {
                warn!("\x1B[1;33mAUTHENTICATION ERROR:\x1B[0m {}", msg);
                HttpResponse::Unauthorized().json(json!({ "error": msg }))
            },
            ApiError::RoleMismatch(msg) => {
                warn!("\x1B[1;33mROLE MISMATCH:\x1B[0m {}", msg);
                HttpResponse::Forbidden().json(json!({ "error": msg }))
            },
            ApiError::NotFoundError(msg) => {
                debug!("\x1B[1;36mNOT FOUND ERROR:\x1B[0m {}", msg);
                HttpResponse::NotFound().json(json!({ "error": msg }))
            },
            ApiError::InternalError(msg) => {
                error!("\x1B[1;31mINTERNAL SERVER ERROR:\x1B[0m {}", msg);
                HttpResponse::InternalServerError().json(json!({ "error": msg }))
            },
        }
    }

    fn status_code(&self) -> actix_web::http::StatusCode {
        match *self {
            ApiError::DatabaseError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ValidationError(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::FormInvalid(_) => actix_web::http::StatusCode::BAD_REQUEST,
            ApiError::AuthError(_) => actix_web::http::StatusCode::UNAUTHORIZED,
            ApiError::RoleMismatch(_) => actix_web::http::StatusCode::FORBIDDEN,
            ApiError::NotFoundError(_) => actix_web::http::StatusCode::NOT_FOUND,
            ApiError::InternalError(_) => actix_web::http::StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn status_codes_follow_the_taxonomy() {
        assert_eq!(
            ApiError::AuthError("bad credentials".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::RoleMismatch("employer flag".into()).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            ApiError::NotFoundError("job".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::FormInvalid(vec![]).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::DatabaseError("down".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn role_mismatch_is_distinct_from_credential_failure() {
        // Both deny a session, but the caller can tell them apart.
        let creds = ApiError::AuthError("Invalid credentials".into());
        let role = ApiError::RoleMismatch("Employer/Employee status mismatch".into());
        assert_ne!(creds.status_code(), role.status_code());
    }
}
