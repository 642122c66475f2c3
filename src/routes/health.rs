use axum::{Json, http::Method};
use chrono::Utc;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub message: &'static str,
    pub timestamp: String,
    pub method: String,
}

// 连通性检查
pub async fn test(method: Method) -> Json<HealthResponse> {
    Json(HealthResponse {
        message: "Backend API is working!",
        timestamp: Utc::now().to_rfc3339(),
        method: method.to_string(),
    })
}
