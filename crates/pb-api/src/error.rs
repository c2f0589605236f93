//! HTTP adapter mapping for domain errors.
//!
//! `AppError` stays HTTP-agnostic; this wrapper adds the one piece of request
//! context a denial needs (the path to return to after logging in) and turns
//! the result into a status code.

use actix_web::http::{header, StatusCode};
use actix_web::{HttpResponse, ResponseError};
use pb_core::AppError;
use std::fmt;

pub const LOGIN_PATH: &str = "/auth/login/";

/// Convenient result alias for page handlers.
pub type PageResult = Result<HttpResponse, ApiError>;

#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    /// Path (with query) of the request that failed.
    return_to: Option<String>,
}

impl ApiError {
    pub fn new(error: AppError, return_to: impl Into<String>) -> Self {
        Self { error, return_to: Some(return_to.into()) }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into()).into()
    }

    pub fn inner(&self) -> &AppError {
        &self.error
    }
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        Self { error, return_to: None }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.error.fmt(f)
    }
}

/// `/auth/login/?next=<path>`, keeping slashes readable in the query.
pub fn login_url(next: Option<&str>) -> String {
    match next {
        Some(path) if !path.is_empty() => {
            let encoded = urlencoding::encode(path).replace("%2F", "/");
            format!("{LOGIN_PATH}?next={encoded}")
        }
        _ => LOGIN_PATH.to_string(),
    }
}

/// A 302 to `location`.
pub fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.error {
            AppError::LoginRequired => StatusCode::FOUND,
            AppError::NotFound(..) => StatusCode::NOT_FOUND,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match &self.error {
            AppError::LoginRequired => redirect(&login_url(self.return_to.as_deref())),
            AppError::Internal(detail) => {
                // Do not leak implementation details to clients.
                tracing::error!(error = %detail, "request failed");
                HttpResponse::InternalServerError()
                    .content_type("text/plain; charset=utf-8")
                    .body("Internal server error")
            }
            other => {
                tracing::debug!(error = %other, "request denied");
                HttpResponse::build(self.status_code())
                    .content_type("text/plain; charset=utf-8")
                    .body(self.status_code().canonical_reason().unwrap_or("Error"))
            }
        }
    }
}
