use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use redis::{AsyncCommands, Client as RedisClient, Script};

use crate::cache::keys::quota_key;
use crate::quota::{QuotaRecord, QuotaStore, StoreError};

// 当前值与期望值一致时才写入，空串代表记录不存在
const CAS_SCRIPT: &str = r#"
local current = redis.call('GET', KEYS[1])
if current == false then
    current = ''
end
if current ~= ARGV[1] then
    return 0
end
redis.call('SET', KEYS[1], ARGV[2], 'PX', ARGV[3])
return 1
"#;

/// Redis 配额存储，多个服务实例共享同一份计数
pub struct RedisQuotaStore {
    redis: Arc<RedisClient>,
    cas: Script,
}

impl RedisQuotaStore {
    pub fn new(redis: Arc<RedisClient>) -> Self {
        Self {
            redis,
            cas: Script::new(CAS_SCRIPT),
        }
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, StoreError> {
        Ok(self.redis.get_multiplexed_async_connection().await?)
    }
}

/// 记录随窗口结束自动过期，至少保留 1 毫秒
fn ttl_millis(record: &QuotaRecord, now: DateTime<Utc>) -> u64 {
    (record.window_reset_at - now).num_milliseconds().max(1) as u64
}

/// CAS 脚本中的期望值，记录不存在时为空串
fn encode_expected(expected: Option<&QuotaRecord>) -> Result<String, StoreError> {
    match expected {
        Some(record) => Ok(serde_json::to_string(record)?),
        None => Ok(String::new()),
    }
}

#[async_trait]
impl QuotaStore for RedisQuotaStore {
    async fn get(&self, key: &str) -> Result<Option<QuotaRecord>, StoreError> {
        let mut conn = self.connection().await?;
        let json: Option<String> = conn.get(quota_key(key)).await?;
        match json {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, record: QuotaRecord) -> Result<(), StoreError> {
        let mut conn = self.connection().await?;
        let json = serde_json::to_string(&record)?;
        let _: () = conn
            .pset_ex(quota_key(key), json, ttl_millis(&record, Utc::now()))
            .await?;
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&QuotaRecord>,
        new: QuotaRecord,
    ) -> Result<bool, StoreError> {
        let expected = encode_expected(expected)?;
        let json = serde_json::to_string(&new)?;

        let mut conn = self.connection().await?;
        let swapped: i32 = self
            .cas
            .key(quota_key(key))
            .arg(expected)
            .arg(json)
            .arg(ttl_millis(&new, Utc::now()))
            .invoke_async(&mut conn)
            .await?;

        Ok(swapped == 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn record(count: u32, reset_at: DateTime<Utc>) -> QuotaRecord {
        QuotaRecord {
            count,
            window_reset_at: reset_at,
        }
    }

    #[test]
    fn absent_record_is_empty_expected_value() {
        assert_eq!(encode_expected(None).unwrap(), "");
    }

    #[test]
    fn expected_value_matches_stored_encoding() {
        let stored = record(3, t0());
        let json = serde_json::to_string(&stored).unwrap();

        // get 读出后再编码，必须与写入的字符串逐字节一致，否则 CAS 永远失败
        let decoded: QuotaRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(encode_expected(Some(&decoded)).unwrap(), json);
        assert!(!json.is_empty());
    }

    #[test]
    fn ttl_follows_window_end() {
        let rec = record(1, t0() + chrono::Duration::minutes(5));
        assert_eq!(ttl_millis(&rec, t0()), 300_000);
    }

    #[test]
    fn ttl_has_one_millisecond_floor() {
        let rec = record(1, t0());
        assert_eq!(ttl_millis(&rec, t0()), 1);
        assert_eq!(ttl_millis(&rec, t0() + chrono::Duration::hours(2)), 1);
    }

    // 需要真实 Redis，未设置 TEST_REDIS_URL 时跳过
    #[tokio::test]
    async fn cas_against_live_redis() {
        let Ok(url) = std::env::var("TEST_REDIS_URL") else {
            return;
        };
        let store = RedisQuotaStore::new(Arc::new(RedisClient::open(url).unwrap()));
        let key = format!("test-{}", uuid::Uuid::new_v4());
        let first = record(1, Utc::now() + chrono::Duration::minutes(1));
        let second = record(2, first.window_reset_at);

        assert!(store.compare_and_swap(&key, None, first.clone()).await.unwrap());
        assert!(!store.compare_and_swap(&key, None, second.clone()).await.unwrap());
        assert!(store
            .compare_and_swap(&key, Some(&first), second.clone())
            .await
            .unwrap());
        assert_eq!(store.get(&key).await.unwrap(), Some(second));
    }
}
