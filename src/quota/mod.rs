// 请求配额
// 按客户端标识做固定窗口计数，决定生成请求是否放行

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// 单个客户端在当前窗口内的计数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuotaRecord {
    pub count: u32,
    pub window_reset_at: DateTime<Utc>,
}

impl QuotaRecord {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.window_reset_at
    }
}

/// 配额判定结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaDecision {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at: DateTime<Utc>,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("record encoding error: {0}")]
    Encoding(#[from] serde_json::Error),
}

/// 配额记录存储，单实例用内存实现，多实例用 Redis 实现
#[async_trait]
pub trait QuotaStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<QuotaRecord>, StoreError>;

    async fn set(&self, key: &str, record: QuotaRecord) -> Result<(), StoreError>;

    /// 仅当当前值等于 `expected` 时写入 `new`，返回是否写入成功
    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&QuotaRecord>,
        new: QuotaRecord,
    ) -> Result<bool, StoreError>;
}

// 每次 CAS 失败都意味着另一个请求写入成功，正常情况下很快收敛
const MAX_CAS_ATTEMPTS: usize = 1024;

/// 窗口上限，避免重置时间溢出
pub const MAX_WINDOW: Duration = Duration::from_secs(366 * 24 * 3600);

#[derive(Clone)]
pub struct QuotaGate {
    store: Arc<dyn QuotaStore>,
    limit: u32,
    window: chrono::Duration,
}

impl QuotaGate {
    pub fn new(store: Arc<dyn QuotaStore>, limit: u32, window: Duration) -> Self {
        if window > MAX_WINDOW {
            tracing::warn!(
                window_secs = window.as_secs(),
                max_secs = MAX_WINDOW.as_secs(),
                "quota window too long, clamped"
            );
        }
        let window = chrono::Duration::from_std(window.min(MAX_WINDOW))
            .unwrap_or(chrono::Duration::hours(1));
        Self {
            store,
            limit,
            window,
        }
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn window_secs(&self) -> u64 {
        self.window.num_seconds().max(0) as u64
    }

    /// 判定一次请求；存储出错时放行并记录日志，不向调用方抛错
    pub async fn check(&self, client_id: &str, now: DateTime<Utc>) -> QuotaDecision {
        for attempt in 1..=MAX_CAS_ATTEMPTS {
            match self.try_check(client_id, now).await {
                Ok(Some(decision)) => {
                    tracing::debug!(
                        client_id,
                        allowed = decision.allowed,
                        remaining = decision.remaining,
                        "quota decision"
                    );
                    return decision;
                }
                Ok(None) => {
                    tracing::debug!(client_id, attempt, "quota record changed concurrently, retrying");
                    tokio::task::yield_now().await;
                }
                Err(e) => {
                    tracing::warn!(client_id, error = %e, "quota store unavailable, admitting request");
                    return self.fresh_decision(now);
                }
            }
        }

        // 存储始终拒绝写入，按存储故障处理
        tracing::warn!(client_id, "quota record never settled, admitting request");
        self.fresh_decision(now)
    }

    async fn try_check(
        &self,
        client_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<QuotaDecision>, StoreError> {
        let current = self.store.get(client_id).await?;

        let (next, decision) = match &current {
            Some(record) if !record.is_expired(now) => {
                if record.count >= self.limit {
                    tracing::warn!(client_id, limit = self.limit, "quota exceeded");
                    return Ok(Some(QuotaDecision {
                        allowed: false,
                        remaining: 0,
                        reset_at: record.window_reset_at,
                    }));
                }
                let next = QuotaRecord {
                    count: record.count + 1,
                    window_reset_at: record.window_reset_at,
                };
                let decision = QuotaDecision {
                    allowed: true,
                    remaining: self.limit - next.count,
                    reset_at: next.window_reset_at,
                };
                (next, decision)
            }
            // 没有记录或窗口已过期，开启新窗口
            _ => {
                let decision = self.fresh_decision(now);
                let next = QuotaRecord {
                    count: 1,
                    window_reset_at: decision.reset_at,
                };
                (next, decision)
            }
        };

        if self
            .store
            .compare_and_swap(client_id, current.as_ref(), next)
            .await?
        {
            Ok(Some(decision))
        } else {
            Ok(None)
        }
    }

    fn fresh_decision(&self, now: DateTime<Utc>) -> QuotaDecision {
        QuotaDecision {
            allowed: self.limit > 0,
            remaining: self.limit.saturating_sub(1),
            reset_at: self.window_end(now),
        }
    }

    fn window_end(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_signed(self.window)
            .unwrap_or(DateTime::<Utc>::MAX_UTC)
    }
}
