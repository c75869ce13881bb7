use axum::extract::rejection::QueryRejection;
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use thiserror::Error;

use crate::external::price_provider::PriceProviderError;
use crate::models::SeriesError;
use crate::services::indicators::SignalError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid ticker: {0}")]
    InvalidTicker(String),
    #[error("No data available for {0} in the selected date range")]
    NoDataAvailable(String),
    #[error("Not enough data for a {required}-day moving average: only {available} price points")]
    InsufficientData { required: usize, available: usize },
    #[error("Network error: {0}")]
    Network(String),
    #[error("Rate limited by external provider")]
    RateLimited,
    #[error("Validation error: {0}")]
    Validation(String),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::InvalidTicker(_) => "invalid_ticker",
            AppError::NoDataAvailable(_) => "no_data",
            AppError::InsufficientData { .. } => "insufficient_data",
            AppError::Network(_) => "network",
            AppError::RateLimited => "rate_limited",
            AppError::Validation(_) => "validation",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidTicker(_) | AppError::NoDataAvailable(_) => StatusCode::NOT_FOUND,
            AppError::InsufficientData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Network(_) => StatusCode::BAD_GATEWAY,
            AppError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let body = Json(json!({
            "error": self.kind(),
            "message": self.to_string(),
        }));

        match self {
            AppError::RateLimited => {
                let mut headers = HeaderMap::new();
                headers.insert("Retry-After", HeaderValue::from_static("60"));
                (StatusCode::TOO_MANY_REQUESTS, headers, body).into_response()
            }
            other => (other.status(), body).into_response(),
        }
    }
}

impl From<SignalError> for AppError {
    fn from(value: SignalError) -> Self {
        match value {
            SignalError::InsufficientData { required, available } => {
                AppError::InsufficientData { required, available }
            }
            SignalError::InvalidWindow(window) => {
                AppError::Validation(format!("Moving average window must be positive, got {}", window))
            }
        }
    }
}

impl From<SeriesError> for AppError {
    fn from(value: SeriesError) -> Self {
        AppError::Network(format!("provider returned an inconsistent series: {}", value))
    }
}

impl From<String> for AppError {
    fn from(value: String) -> Self {
        AppError::Validation(value)
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        AppError::Validation(value.body_text())
    }
}

/// Maps a provider failure for `ticker` to the error shown to the user.
pub fn from_provider(ticker: &str, err: PriceProviderError) -> AppError {
    match err {
        PriceProviderError::NotFound => AppError::InvalidTicker(ticker.to_string()),
        PriceProviderError::RateLimited => AppError::RateLimited,
        PriceProviderError::Network(msg)
        | PriceProviderError::BadResponse(msg)
        | PriceProviderError::Parse(msg) => AppError::Network(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_errors_map_to_user_errors() {
        assert!(matches!(
            from_provider("XYZ", PriceProviderError::NotFound),
            AppError::InvalidTicker(t) if t == "XYZ"
        ));
        assert!(matches!(
            from_provider("XYZ", PriceProviderError::Parse("bad".into())),
            AppError::Network(_)
        ));
        assert!(matches!(
            from_provider("XYZ", PriceProviderError::RateLimited),
            AppError::RateLimited
        ));
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(AppError::InvalidTicker("X".into()).status(), StatusCode::NOT_FOUND);
        assert_eq!(
            AppError::InsufficientData { required: 3, available: 2 }.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(AppError::Network("down".into()).status(), StatusCode::BAD_GATEWAY);
        assert_eq!(AppError::Validation("x".into()).status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AppError::RateLimited.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get("Retry-After").unwrap(), "60");
    }
}
