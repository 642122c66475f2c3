// 收藏推文实体

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// 收藏推文，对应数据库中的 tweets 表
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SavedTweet {
    pub id: Uuid,
    pub tweet_text: String,
    /// 生成推文所用的原文
    pub original_content: Option<String>,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// 待保存的推文
#[derive(Debug, Clone, Deserialize)]
pub struct NewSavedTweet {
    pub tweet_text: String,
    #[serde(default)]
    pub original_content: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}
