use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde_json::Value;

use crate::{
    AppState,
    error::AppError,
    extract::extract,
    llm::{TextGenerator, remix_prompt, tweet_prompt},
    quota::QuotaDecision,
    routes::generate::model::{GenerateRequest, GenerateResponse, RemixRequest, RemixResponse},
    utils::char_count,
};

pub const MAX_CONTENT_CHARS: usize = 10_000;

fn generator(state: &AppState) -> Result<Arc<dyn TextGenerator>, AppError> {
    state.generator.clone().ok_or_else(|| {
        tracing::error!("ANTHROPIC_API_KEY not found in environment");
        AppError::Configuration
    })
}

fn validate_content(content: Option<&Value>) -> Result<&str, AppError> {
    let content = content
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::InvalidInput("Content is required".into()))?;

    if char_count(content) > MAX_CONTENT_CHARS {
        return Err(AppError::InvalidInput(
            "Content too long (max 10,000 characters)".into(),
        ));
    }
    Ok(content)
}

fn invalid_body(rejection: JsonRejection) -> AppError {
    AppError::InvalidInput(format!("Invalid request body: {}", rejection.body_text()))
}

// 生成推文
pub async fn generate_tweets(
    State(state): State<AppState>,
    Extension(quota): Extension<QuotaDecision>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, AppError> {
    let generator = generator(&state)?;
    let Json(request) = payload.map_err(invalid_body)?;
    let content = validate_content(request.content.as_ref())?;

    tracing::info!("Generating tweets for content length: {}", char_count(content));

    let tweets = generator
        .generate(&tweet_prompt(content))
        .await
        .map_err(|e| {
            tracing::error!("生成推文失败: {}", e);
            AppError::from_llm(e, "Failed to generate tweets")
        })?;

    let extracted = extract(&tweets);
    tracing::info!(count = extracted.len(), "Successfully generated tweets");

    Ok(Json(GenerateResponse {
        tweets,
        remaining: quota.remaining,
        extracted,
    }))
}

// 按指定方式改写内容
pub async fn remix(
    State(state): State<AppState>,
    Extension(quota): Extension<QuotaDecision>,
    payload: Result<Json<RemixRequest>, JsonRejection>,
) -> Result<Json<RemixResponse>, AppError> {
    let generator = generator(&state)?;
    let Json(request) = payload.map_err(invalid_body)?;
    let content = validate_content(request.content.as_ref())?;

    tracing::info!(
        remix_type = ?request.remix_type,
        "Remixing content length: {}",
        char_count(content)
    );

    let output = generator
        .generate(&remix_prompt(request.remix_type, content))
        .await
        .map_err(|e| {
            tracing::error!("改写内容失败: {}", e);
            AppError::from_llm(e, "Failed to remix content")
        })?;

    Ok(Json(RemixResponse {
        output,
        remaining: quota.remaining,
    }))
}
