//! Error handling - RFC 7807 responses and auth redirects.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;

use quill_core::DomainError;
use quill_core::form::FieldErrors;
use quill_shared::ErrorResponse;

use super::flash;

/// Application-level error type returned by every handler.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    /// Sign-in needed; `next` is where to come back afterwards.
    #[error("Authentication required")]
    LoginRequired { next: String },

    #[error("Already authenticated")]
    AlreadyAuthenticated,

    /// A rejected form: field errors plus the submitted values to refill it.
    #[error("Validation failed: {errors}")]
    Validation {
        errors: FieldErrors,
        values: serde_json::Value,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Attach the submitted values to a validation error.
    pub fn with_values(self, values: serde_json::Value) -> Self {
        match self {
            AppError::Validation { errors, .. } => AppError::Validation { errors, values },
            other => other,
        }
    }
}

/// Login page URL that returns to `next` afterwards.
pub fn login_url(next: &str) -> String {
    format!("/login/?next={}", urlencoding::encode(next))
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::LoginRequired { .. } | AppError::AlreadyAuthenticated => StatusCode::FOUND,
            AppError::Validation { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let error = match self {
            AppError::LoginRequired { next } => return flash::redirect(&login_url(next)),
            AppError::AlreadyAuthenticated => return flash::redirect("/"),
            AppError::BadRequest(detail) => ErrorResponse::bad_request(detail),
            AppError::NotFound(detail) => ErrorResponse::not_found(detail),
            AppError::Forbidden => ErrorResponse::forbidden(),
            AppError::Validation { errors, values } => {
                ErrorResponse::validation_failed(errors.clone().into_inner())
                    .with_values(values.clone())
            }
            AppError::Internal(detail) => {
                tracing::error!("Internal error: {}", detail);
                ErrorResponse::internal_error()
            }
        };

        HttpResponse::build(self.status_code()).json(error)
    }
}

impl From<DomainError> for AppError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { entity_type, id } => {
                AppError::NotFound(format!("{} {} not found", entity_type, id))
            }
            DomainError::Validation(errors) => AppError::Validation {
                errors,
                values: serde_json::Value::Null,
            },
            DomainError::Duplicate(msg) => {
                let mut errors = FieldErrors::new();
                errors.add(quill_core::form::NON_FIELD_ERRORS, msg);
                AppError::Validation {
                    errors,
                    values: serde_json::Value::Null,
                }
            }
            DomainError::Unauthenticated => AppError::LoginRequired {
                next: "/".to_string(),
            },
            DomainError::AlreadyAuthenticated => AppError::AlreadyAuthenticated,
            DomainError::Forbidden => AppError::Forbidden,
            DomainError::Internal(msg) => AppError::Internal(msg),
        }
    }
}

/// Result type alias for handlers.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_url_encodes_next() {
        assert_eq!(login_url("/post/new/"), "/login/?next=%2Fpost%2Fnew%2F");
    }

    #[test]
    fn test_domain_errors_map_to_status() {
        let not_found: AppError = DomainError::not_found("post", "x").into();
        assert_eq!(not_found.status_code(), StatusCode::NOT_FOUND);

        let forbidden: AppError = DomainError::Forbidden.into();
        assert_eq!(forbidden.status_code(), StatusCode::FORBIDDEN);

        let anonymous = AppError::LoginRequired {
            next: "/profile/".to_string(),
        };
        assert_eq!(anonymous.status_code(), StatusCode::FOUND);
        let response = anonymous.error_response();
        assert_eq!(
            response.headers().get("location").unwrap(),
            "/login/?next=%2Fprofile%2F"
        );
    }
}
