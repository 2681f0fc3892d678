use async_trait::async_trait;
use moka::future::Cache;
use std::time::Duration;
use tracing::debug;

use crate::cache::{CacheResult, ObjectCache};
use crate::config::AppConfig;
use crate::declare_object_cache_plugin;

declare_object_cache_plugin!("moka", MokaCacheWrapper);

pub struct MokaCacheWrapper {
    inner: Cache<String, String>,
}

impl MokaCacheWrapper {
    pub fn new() -> Result<Self, String> {
        let config = AppConfig::get();
        Ok(Self::with_settings(
            config.cache.memory.max_capacity,
            config.cache.default_ttl,
        ))
    }

    /// 按给定容量与 TTL 构建，不依赖全局配置
    pub fn with_settings(max_capacity: u64, ttl_secs: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs.max(1)))
            .build();

        debug!(
            "MokaCacheWrapper initialized with max capacity: {}, ttl: {}s",
            max_capacity, ttl_secs
        );
        Self { inner }
    }
}

#[async_trait]
impl ObjectCache for MokaCacheWrapper {
    async fn get_raw(&self, key: &str) -> CacheResult<String> {
        match self.inner.get(key).await {
            Some(value) => {
                debug!("Cache hit: {}", key);
                CacheResult::Found(value)
            }
            None => {
                debug!("Cache miss: {}", key);
                CacheResult::NotFound
            }
        }
    }

    async fn insert_raw(&self, key: String, value: String, ttl: u64) {
        // Moka 使用全局 TTL，忽略单条 TTL
        if ttl != 0 {
            debug!("Moka cache ignores per-item TTL, using global TTL configuration");
        }
        self.inner.insert(key, value).await;
    }

    async fn remove(&self, key: &str) {
        self.inner.invalidate(key).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_get_remove() {
        let cache = MokaCacheWrapper::with_settings(100, 60);
        assert_eq!(cache.get_raw("course:1").await, CacheResult::NotFound);

        cache
            .insert_raw("course:1".to_string(), "{\"id\":1}".to_string(), 0)
            .await;
        assert_eq!(
            cache.get_raw("course:1").await,
            CacheResult::Found("{\"id\":1}".to_string())
        );

        cache.remove("course:1").await;
        assert_eq!(cache.get_raw("course:1").await, CacheResult::NotFound);
    }

    #[tokio::test]
    async fn test_typed_json_access() {
        let cache: std::sync::Arc<dyn ObjectCache> =
            std::sync::Arc::new(MokaCacheWrapper::with_settings(100, 60));
        cache
            .insert_json("numbers".to_string(), &vec![1, 2, 3], 0)
            .await;
        let numbers: Option<Vec<i32>> = cache.get_json("numbers").await;
        assert_eq!(numbers, Some(vec![1, 2, 3]));

        // 类型不匹配时丢弃该条目
        let wrong: Option<String> = cache.get_json("numbers").await;
        assert!(wrong.is_none());
        assert_eq!(cache.get_raw("numbers").await, CacheResult::NotFound);
    }
}
