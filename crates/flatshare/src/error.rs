use crate::config::ConfigError;
use crate::listings::router::error_status;
use crate::listings::{ListingError, ListingImportError};
use crate::telemetry::TelemetryError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Listing(ListingError),
    Import(ListingImportError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Listing(err) => write!(f, "listing error: {}", err),
            AppError::Import(err) => write!(f, "import error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Listing(err) => Some(err),
            AppError::Import(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Listing(err) => error_status(err),
            AppError::Import(_) => StatusCode::BAD_REQUEST,
            AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({ "error": self.to_string() }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<ListingError> for AppError {
    fn from(value: ListingError) -> Self {
        Self::Listing(value)
    }
}

impl From<ListingImportError> for AppError {
    fn from(value: ListingImportError) -> Self {
        Self::Import(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::listings::{AuthorizationError, ListingId};

    #[test]
    fn listing_errors_keep_their_http_status() {
        let not_found = AppError::from(ListingError::NotFound(ListingId("gone".to_string())));
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let anonymous = AppError::from(ListingError::from(AuthorizationError::Anonymous {
            action: "publish a listing",
        }));
        assert_eq!(anonymous.into_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn display_prefixes_the_error_class() {
        let err = AppError::from(ListingError::NotFound(ListingId("lst-9".to_string())));
        assert_eq!(err.to_string(), "listing error: listing lst-9 not found");
    }
}
