use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::cases::access::AccessSettingsError;
use crate::workflows::cases::intake::IntakeError;
use crate::workflows::cases::repository::RepositoryError;
use crate::workflows::cases::AdvisoryServiceError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

/// Top-level failure for the server and CLI entry points.
#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    AccessSettings(AccessSettingsError),
    /// A profile or report could not be read or written as JSON.
    Json(serde_json::Error),
    Intake(IntakeError),
    Advisory(AdvisoryServiceError),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::Json(_) | AppError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Advisory(
                AdvisoryServiceError::Intake(_)
                | AdvisoryServiceError::InvalidComment(_)
                | AdvisoryServiceError::InvalidRequest(_),
            ) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Advisory(AdvisoryServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Advisory(AdvisoryServiceError::Forbidden { .. }) => StatusCode::FORBIDDEN,
            AppError::Advisory(AdvisoryServiceError::AdminRequired) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "invalid configuration: {err}"),
            AppError::Telemetry(err) => write!(f, "logging setup failed: {err}"),
            AppError::Io(err) => write!(f, "io failure: {err}"),
            AppError::Server(err) => write!(f, "http server failed: {err}"),
            AppError::AccessSettings(err) => write!(f, "{err}"),
            AppError::Json(err) => write!(f, "json error: {err}"),
            AppError::Intake(err) => write!(f, "profile rejected: {err}"),
            AppError::Advisory(err) => write!(f, "{err}"),
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
            AppError::AccessSettings(err) => Some(err),
            AppError::Json(err) => Some(err),
            AppError::Intake(err) => Some(err),
            AppError::Advisory(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

macro_rules! app_error_from {
    ($($source:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$source> for AppError {
                fn from(value: $source) -> Self {
                    Self::$variant(value)
                }
            }
        )+
    };
}

app_error_from! {
    ConfigError => Config,
    TelemetryError => Telemetry,
    std::io::Error => Io,
    axum::Error => Server,
    AccessSettingsError => AccessSettings,
    serde_json::Error => Json,
    IntakeError => Intake,
    AdvisoryServiceError => Advisory,
}
