//! API response types

use crate::utils::error::SoleilError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

pub const STATUS_OK: &str = "ok";
pub const STATUS_ERROR: &str = "error";

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}

impl StatusResponse {
    pub fn ok() -> Self {
        Self { status: STATUS_OK }
    }
}

#[derive(Debug, Serialize)]
pub struct PeakResponse {
    pub status: &'static str,
    pub result: String,
}

#[derive(Debug, Serialize)]
pub struct BoundsResponse {
    pub status: &'static str,
    pub start: Option<String>,
    pub end: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ProductionWeatherResponse {
    pub status: &'static str,
    pub weather_data: f64,
    pub clearsky: f64,
    pub ratio: f64,
}

#[derive(Debug, Serialize)]
pub struct DailyProductionResponse {
    pub status: &'static str,
    pub production: Option<f64>,
    pub unit: &'static str,
}

#[derive(Debug, Serialize)]
pub struct TemperatureStatsResponse {
    pub start: String,
    pub end: String,
    pub unit: &'static str,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub stddev: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub status: &'static str,
    pub errors: Vec<String>,
}

/// Failure of an API request, rendered as `{"status":"error","errors":[...]}`.
#[derive(Debug)]
pub enum ApiError {
    BadRequest(Vec<String>),
    Unavailable(String),
    Internal(String),
}

pub const MODEL_UNAVAILABLE: &str = "Model results are not available yet.";
pub const NO_DATA: &str = "No data was found for your request period.";

impl From<SoleilError> for ApiError {
    fn from(error: SoleilError) -> Self {
        match error {
            SoleilError::ModelUnavailable | SoleilError::NoWeatherData => {
                ApiError::Unavailable(MODEL_UNAVAILABLE.to_string())
            }
            SoleilError::NoData => ApiError::BadRequest(vec![NO_DATA.to_string()]),
            SoleilError::Validation { message } => {
                ApiError::BadRequest(vec![format!("Validation error: {}.", message)])
            }
            other => {
                tracing::error!(
                    "❌ Request failed: {} (Category: {:?}, Severity: {:?})",
                    other,
                    other.category(),
                    other.severity()
                );
                ApiError::Internal(other.user_friendly_message())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, errors) = match self {
            ApiError::BadRequest(errors) => (StatusCode::BAD_REQUEST, errors),
            ApiError::Unavailable(message) => (StatusCode::SERVICE_UNAVAILABLE, vec![message]),
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, vec![message]),
        };
        let body = ErrorResponse {
            status: STATUS_ERROR,
            errors,
        };
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            ApiError::from(SoleilError::ModelUnavailable),
            ApiError::Unavailable(_)
        ));
        match ApiError::from(SoleilError::validation("end should be greater than start")) {
            ApiError::BadRequest(errors) => assert_eq!(
                errors,
                vec!["Validation error: end should be greater than start.".to_string()]
            ),
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(matches!(
            ApiError::from(SoleilError::processing("boom")),
            ApiError::Internal(_)
        ));
    }

    #[test]
    fn test_error_status_codes() {
        let response = ApiError::BadRequest(vec![NO_DATA.to_string()]).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let response = ApiError::Unavailable(MODEL_UNAVAILABLE.to_string()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
