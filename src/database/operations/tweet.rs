// 收藏推文存储库

use crate::database::models::tweet::{NewSavedTweet, SavedTweet};
use sqlx::{Error as SqlxError, PgPool};
use std::sync::Arc;
use uuid::Uuid;

/// 收藏推文存储库，表结构由外部维护
#[derive(Clone)]
pub struct SavedTweetOperation {
    db: Arc<PgPool>,
}

impl SavedTweetOperation {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 保存推文，返回带 id 和创建时间的记录
    pub async fn save(&self, tweet: &NewSavedTweet) -> Result<SavedTweet, SqlxError> {
        sqlx::query_as::<_, SavedTweet>(
            r#"
            INSERT INTO tweets (id, tweet_text, original_content, title)
            VALUES ($1, $2, $3, $4)
            RETURNING id, tweet_text, original_content, title, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&tweet.tweet_text)
        .bind(&tweet.original_content)
        .bind(&tweet.title)
        .fetch_one(&*self.db)
        .await
    }

    /// 按创建时间倒序列出全部收藏
    pub async fn list(&self) -> Result<Vec<SavedTweet>, SqlxError> {
        sqlx::query_as::<_, SavedTweet>(
            r#"
            SELECT id, tweet_text, original_content, title, created_at
            FROM tweets
            ORDER BY created_at DESC
            "#,
        )
        .fetch_all(&*self.db)
        .await
    }

    /// 删除收藏，返回是否存在该记录
    pub async fn delete(&self, id: Uuid) -> Result<bool, SqlxError> {
        let result = sqlx::query(
            r#"
            DELETE FROM tweets
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}
