//! Error types and HTTP error contracts for `GeoWeather`

use axum::{
    Json,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Main error type for the `GeoWeather` application
#[derive(Error, Debug)]
pub enum AppError {
    /// User input rejected before any side effect
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// A place name or the caller's address could not be turned into coordinates
    #[error("Location resolution failed: {message}")]
    Resolution { message: String },

    /// Upstream service unreachable or answered with a failure status
    #[error("Network error: {message}")]
    Network { message: String },

    /// Upstream service answered with a body we could not decode
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// A lookup succeeded but produced nothing to return
    #[error("Not found: {message}")]
    NotFound { message: String },

    /// No valid session for a protected resource
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// User store failures
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// HTML template rendering failures
    #[error("Render error: {message}")]
    Render { message: String },
}

impl AppError {
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn resolution<S: Into<String>>(message: S) -> Self {
        Self::Resolution {
            message: message.into(),
        }
    }

    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    pub fn unauthorized<S: Into<String>>(message: S) -> Self {
        Self::Unauthorized {
            message: message.into(),
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    pub fn storage<S: Into<String>>(message: S) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// The bare message without the variant prefix
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            AppError::Validation { message }
            | AppError::Resolution { message }
            | AppError::Network { message }
            | AppError::Parse { message }
            | AppError::NotFound { message }
            | AppError::Unauthorized { message }
            | AppError::Config { message }
            | AppError::Storage { message }
            | AppError::Render { message } => message,
        }
    }

    #[must_use]
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::Unauthorized { .. } => StatusCode::UNAUTHORIZED,
            AppError::NotFound { .. } => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation { message } | AppError::NotFound { message } => message.clone(),
            AppError::Resolution { .. } => {
                "We could not work out where that is. Please try another place.".to_string()
            }
            AppError::Network { .. } | AppError::Parse { .. } => {
                "An external service is unavailable right now. Please try again later.".to_string()
            }
            AppError::Unauthorized { .. } => "Please log in to access this page.".to_string(),
            AppError::Config { .. } => {
                "The server is misconfigured. Please contact the administrator.".to_string()
            }
            AppError::Storage { .. } | AppError::Render { .. } => {
                "Something went wrong on our side. Please try again.".to_string()
            }
        }
    }
}

impl From<fjall::Error> for AppError {
    fn from(err: fjall::Error) -> Self {
        AppError::storage(err.to_string())
    }
}

impl From<postcard::Error> for AppError {
    fn from(err: postcard::Error) -> Self {
        AppError::storage(format!("corrupt record: {err}"))
    }
}

impl From<askama::Error> for AppError {
    fn from(err: askama::Error) -> Self {
        AppError::render(err.to_string())
    }
}

/// Uniform JSON error body of the API layer: `{"error": ..., "details"?: ...}`
#[derive(Debug, Serialize)]
pub struct ApiErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub body: ApiErrorBody,
}

impl ApiError {
    pub fn new<S: Into<String>>(status: StatusCode, error: S) -> Self {
        Self {
            status,
            body: ApiErrorBody {
                error: error.into(),
                details: None,
            },
        }
    }

    #[must_use]
    pub fn with_details<S: Into<String>>(mut self, details: S) -> Self {
        self.body.details = Some(details.into());
        self
    }
}

/// Falls back to the error's own message when a handler has no route-specific text.
impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        ApiError::new(err.status_code(), err.message())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

/// HTML error page for the presentation layer
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status = self.0.status_code();
        tracing::error!(status = status.as_u16(), "Page request failed: {}", self.0);
        let body = crate::pages::render_error_page(status, &self.0.user_message());
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = AppError::resolution("no match for 'Atlantis'");
        assert!(matches!(err, AppError::Resolution { .. }));
        assert_eq!(err.message(), "no match for 'Atlantis'");

        let err = AppError::network("connection refused");
        assert!(matches!(err, AppError::Network { .. }));
        assert!(err.to_string().starts_with("Network error"));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::validation("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::not_found("x").status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::unauthorized("x").status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            AppError::resolution("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::parse("x").status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_user_messages() {
        let err = AppError::network("timeout");
        assert!(err.user_message().contains("unavailable"));

        let err = AppError::validation("Email must contain @.");
        assert_eq!(err.user_message(), "Email must contain @.");
    }

    #[test]
    fn test_api_error_body_omits_missing_details() {
        let body = ApiError::new(StatusCode::NOT_FOUND, "No places found nearby").body;
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json, serde_json::json!({"error": "No places found nearby"}));

        let body = ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, "Failed")
            .with_details("boom")
            .body;
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["details"], "boom");
    }

    #[test]
    fn test_api_error_from_app_error() {
        let api: ApiError = AppError::not_found("nothing").into();
        assert_eq!(api.status, StatusCode::NOT_FOUND);
        assert_eq!(api.body.error, "nothing");
        assert!(api.body.details.is_none());
    }
}
