use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::quota::{QuotaRecord, QuotaStore, StoreError};

/// 进程内配额存储，重启即清空
#[derive(Debug, Default)]
pub struct MemoryQuotaStore {
    records: Mutex<HashMap<String, QuotaRecord>>,
}

impl MemoryQuotaStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn records(&self) -> MutexGuard<'_, HashMap<String, QuotaRecord>> {
        self.records
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn len(&self) -> usize {
        self.records().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records().is_empty()
    }

    /// 清除已过期的窗口记录，返回清除数量
    pub fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let mut records = self.records();
        let before = records.len();
        records.retain(|_, record| !record.is_expired(now));
        before - records.len()
    }
}

#[async_trait]
impl QuotaStore for MemoryQuotaStore {
    async fn get(&self, key: &str) -> Result<Option<QuotaRecord>, StoreError> {
        Ok(self.records().get(key).cloned())
    }

    async fn set(&self, key: &str, record: QuotaRecord) -> Result<(), StoreError> {
        self.records().insert(key.to_string(), record);
        Ok(())
    }

    async fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&QuotaRecord>,
        new: QuotaRecord,
    ) -> Result<bool, StoreError> {
        let mut records = self.records();
        if records.get(key) != expected {
            return Ok(false);
        }
        records.insert(key.to_string(), new);
        Ok(true)
    }
}
