use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use uuid::Uuid;

use crate::{
    AppState,
    database::{NewSavedTweet, SavedTweet, SavedTweetOperation},
    error::AppError,
    extract::MAX_TWEET_CHARS,
    utils::{char_count, derive_title},
};

fn operations(state: &AppState) -> Result<&SavedTweetOperation, AppError> {
    state.tweets.as_ref().ok_or(AppError::PersistenceUnavailable)
}

// 收藏一条推文
pub async fn save_tweet(
    State(state): State<AppState>,
    payload: Result<Json<NewSavedTweet>, JsonRejection>,
) -> Result<(StatusCode, Json<SavedTweet>), AppError> {
    let ops = operations(&state)?;
    let Json(mut tweet) = payload
        .map_err(|e| AppError::InvalidInput(format!("Invalid request body: {}", e.body_text())))?;

    tweet.tweet_text = tweet.tweet_text.trim().to_string();
    if tweet.tweet_text.is_empty() {
        return Err(AppError::InvalidInput("Tweet text is required".into()));
    }
    if char_count(&tweet.tweet_text) > MAX_TWEET_CHARS {
        return Err(AppError::InvalidInput(format!(
            "Tweet exceeds {MAX_TWEET_CHARS} characters"
        )));
    }
    if tweet.title.is_none() {
        tweet.title = tweet.original_content.as_deref().and_then(derive_title);
    }

    let saved = ops.save(&tweet).await?;
    tracing::info!(id = %saved.id, "Saved tweet");
    Ok((StatusCode::CREATED, Json(saved)))
}

// 收藏列表，最新的在前
pub async fn list_tweets(State(state): State<AppState>) -> Result<Json<Vec<SavedTweet>>, AppError> {
    let tweets = operations(&state)?.list().await?;
    Ok(Json(tweets))
}

// 删除收藏
pub async fn delete_tweet(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let ops = operations(&state)?;
    let id = Uuid::parse_str(&id)
        .map_err(|_| AppError::InvalidInput(format!("Invalid tweet id: {id}")))?;

    if ops.delete(id).await? {
        tracing::info!(%id, "Deleted tweet");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
