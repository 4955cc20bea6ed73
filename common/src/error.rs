use actix_web::HttpResponse;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

pub type Res<T> = std::result::Result<T, AppError>;

#[derive(Error, Debug)]
pub enum AppError {
    // === CONVERSION ERRORS ===
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Stripe error: {0}")]
    Stripe(#[from] stripe::StripeError),

    #[error("Reqwest error: {0}")]
    Reqwest(#[from] reqwest::Error),

    // === APPLICATION ERRORS ===
    #[error("Missing or invalid fields: {0}")]
    Validation(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Requested time slot is no longer available")]
    Conflict {
        appointment_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    },

    #[error("Too many attempts. Please try again later.")]
    RateLimited { retry_after_secs: u64 },

    #[error("No pending verification found for this phone number")]
    NoPendingVerification,

    #[error("Verification code has expired")]
    CodeExpired,

    #[error("Incorrect verification code")]
    InvalidCode { attempts_remaining: u32 },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn to_http_response(&self) -> HttpResponse {
        let is_dev = cfg!(debug_assertions);

        let to_internal_json = |err_msg: &str| {
            if is_dev {
                serde_json::json!({ "error": err_msg, "code": "SERVER_ERROR" })
            } else {
                serde_json::json!({ "error": "Internal server error", "code": "SERVER_ERROR" })
            }
        };

        match self {
            // === CONVERSION ERRORS ===
            AppError::Database(error) => {
                log::error!("Database error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Stripe(error) => {
                log::error!("Stripe error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
            AppError::Reqwest(error) => {
                log::error!("Reqwest error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }

            // === APPLICATION ERRORS ===
            AppError::Validation(_) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string(),
                "code": "MISSING_FIELDS",
            })),
            AppError::NotFound(_) => {
                HttpResponse::NotFound().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::Forbidden(_) => {
                HttpResponse::Forbidden().json(serde_json::json!({ "error": self.to_string() }))
            }
            AppError::Conflict {
                appointment_id,
                starts_at,
                ends_at,
            } => HttpResponse::Conflict().json(serde_json::json!({
                "error": self.to_string(),
                "code": "CONFLICT",
                "conflicting_appointment_id": appointment_id,
                "conflicting_starts_at": starts_at,
                "conflicting_ends_at": ends_at,
            })),
            AppError::RateLimited { retry_after_secs } => {
                HttpResponse::TooManyRequests().json(serde_json::json!({
                    "error": self.to_string(),
                    "code": "TOO_MANY_ATTEMPTS",
                    "retry_after": retry_after_secs,
                }))
            }
            AppError::NoPendingVerification => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string(),
                "code": "NO_PENDING_VERIFICATION",
            })),
            AppError::CodeExpired => HttpResponse::BadRequest().json(serde_json::json!({
                "error": self.to_string(),
                "code": "EXPIRED_CODE",
            })),
            AppError::InvalidCode { attempts_remaining } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": self.to_string(),
                    "code": "INVALID_CODE",
                    "attempts_remaining": attempts_remaining,
                }))
            }

            AppError::Internal(error) => {
                log::error!("Internal error: {}", error);
                HttpResponse::InternalServerError().json(to_internal_json(&error.to_string()))
            }
        }
    }
}

impl actix_web::ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        self.to_http_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;

    #[test]
    fn conflict_maps_to_409() {
        let err = AppError::Conflict {
            appointment_id: Uuid::nil(),
            starts_at: Utc::now(),
            ends_at: Utc::now(),
        };
        assert_eq!(err.to_http_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn rate_limited_maps_to_429() {
        let err = AppError::RateLimited {
            retry_after_secs: 900,
        };
        assert_eq!(
            err.to_http_response().status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn verification_failures_map_to_400() {
        for err in [
            AppError::NoPendingVerification,
            AppError::CodeExpired,
            AppError::InvalidCode {
                attempts_remaining: 2,
            },
        ] {
            assert_eq!(err.to_http_response().status(), StatusCode::BAD_REQUEST);
        }
    }
}
