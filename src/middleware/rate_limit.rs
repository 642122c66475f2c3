use axum::{
    body::Body,
    extract::State,
    http::{HeaderValue, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    AppState,
    error::{AppError, RATE_LIMIT_REMAINING_HEADER},
    middleware::client_identifier,
};

/// 生成类接口的配额检查，放行时把判定结果放进请求扩展供处理器读取剩余次数
pub async fn rate_limit(State(state): State<AppState>, mut req: Request<Body>, next: Next) -> Response {
    let client_id = client_identifier(&req);
    let decision = state.quota.check(&client_id, Utc::now()).await;

    if !decision.allowed {
        tracing::info!(client_id, "generation request rejected by quota");
        return AppError::QuotaExceeded {
            retry_after: state.quota.window_secs(),
        }
        .into_response();
    }

    req.extensions_mut().insert(decision);
    let mut response = next.run(req).await;
    response.headers_mut().insert(
        RATE_LIMIT_REMAINING_HEADER,
        HeaderValue::from(decision.remaining),
    );
    response
}
