use axum::Json;
use axum::{
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::llm::LlmError;

pub const RATE_LIMIT_REMAINING_HEADER: &str = "x-ratelimit-remaining";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    InvalidInput(String),

    #[error("Rate limit exceeded. Please try again in an hour.")]
    QuotaExceeded { retry_after: u64 },

    #[error("Rate limit exceeded. Please try again later.")]
    UpstreamRateLimited,

    #[error("API configuration error")]
    Configuration,

    #[error("{0}")]
    Generation(&'static str),

    #[error("Persistence is not configured")]
    PersistenceUnavailable,

    #[error("Not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AppError {
    /// 上游生成失败时按错误类型映射，细节只进日志
    pub fn from_llm(err: LlmError, fallback: &'static str) -> Self {
        match err {
            LlmError::Unauthorized => AppError::Configuration,
            LlmError::RateLimited => AppError::UpstreamRateLimited,
            _ => AppError::Generation(fallback),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(rename = "retryAfter", skip_serializing_if = "Option::is_none")]
    retry_after: Option<u64>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AppError::QuotaExceeded { .. } | AppError::UpstreamRateLimited => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AppError::Configuration | AppError::Generation(_) | AppError::Database(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::PersistenceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::NotFound => StatusCode::NOT_FOUND,
        };

        let error = match &self {
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                "Database operation failed".to_string()
            }
            other => other.to_string(),
        };

        let retry_after = match self {
            AppError::QuotaExceeded { retry_after } => Some(retry_after),
            _ => None,
        };

        let mut response = (status, Json(ErrorResponse { error, retry_after })).into_response();
        if let Some(secs) = retry_after {
            let headers = response.headers_mut();
            headers.insert(header::RETRY_AFTER, HeaderValue::from(secs));
            headers.insert(RATE_LIMIT_REMAINING_HEADER, HeaderValue::from_static("0"));
        }
        response
    }
}
