// 旁路缓存操作
// 读穿透、按键失效、按模式清扫；后端不可用时降级为直查

use std::future::Future;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cache::backends::CacheBackend;
use crate::cache::models::entry::CacheEntry;

/// 每页扫描的键数量
const SCAN_PAGE_SIZE: usize = 100;

/// 旁路缓存客户端
///
/// 缓存只是优化：任何后端故障都不会向调用方传播，
/// 只有fetch本身的错误会返回
#[derive(Clone)]
pub struct CacheClient {
    backend: Option<Arc<dyn CacheBackend>>,
}

impl CacheClient {
    pub fn new(backend: Arc<dyn CacheBackend>) -> Self {
        Self {
            backend: Some(backend),
        }
    }

    /// 未配置缓存时的空客户端，所有读取直接回源
    pub fn disabled() -> Self {
        Self { backend: None }
    }

    pub fn is_enabled(&self) -> bool {
        self.backend.is_some()
    }

    /// 读穿透：命中直接返回，未命中回源并带TTL写回
    pub async fn cached<T, E, F, Fut>(&self, key: &str, ttl_secs: u64, fetch: F) -> Result<T, E>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let Some(backend) = &self.backend else {
            return fetch().await;
        };

        match backend.get(key).await {
            Ok(Some(json)) => match serde_json::from_str::<CacheEntry<T>>(&json) {
                Ok(entry) if entry.is_cached => return Ok(entry.value),
                Ok(_) => {
                    tracing::warn!("Cache entry missing tag, treating as miss: {}", key);
                }
                Err(e) => {
                    // 损坏的缓存条目按未命中处理
                    tracing::warn!("Malformed cache entry for {}: {}", key, e);
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Cache read failed for {}: {}", key, e);
            }
        }

        let value = fetch().await?;

        // 写回失败只损失一次命中机会，调用方照常拿到数据
        match serde_json::to_string(&CacheEntry::new(&value)) {
            Ok(json) => {
                if let Err(e) = backend.set(key, json, ttl_secs).await {
                    tracing::warn!("Cache write failed for {}: {}", key, e);
                }
            }
            Err(e) => {
                tracing::warn!("Cache serialize failed for {}: {}", key, e);
            }
        }

        Ok(value)
    }

    /// 删除单个键，失败忽略
    pub async fn invalidate(&self, key: &str) {
        self.invalidate_many(&[key.to_string()]).await;
    }

    /// 删除一批键，失败忽略
    pub async fn invalidate_many(&self, keys: &[String]) {
        let Some(backend) = &self.backend else {
            return;
        };
        if keys.is_empty() {
            return;
        }

        if let Err(e) = backend.del(keys).await {
            tracing::warn!("Cache invalidate failed: {}", e);
        }
    }

    /// 按模式清扫键空间：分页扫描，逐页删除，直到游标归零
    pub async fn invalidate_pattern(&self, pattern: &str) {
        let Some(backend) = &self.backend else {
            return;
        };

        let mut cursor = 0u64;
        loop {
            let (next_cursor, keys) = match backend.scan(cursor, pattern, SCAN_PAGE_SIZE).await {
                Ok(Some(page)) => page,
                // 后端不支持模式扫描
                Ok(None) => return,
                Err(e) => {
                    tracing::warn!("Cache scan failed for {}: {}", pattern, e);
                    return;
                }
            };

            if !keys.is_empty() {
                if let Err(e) = backend.del(&keys).await {
                    tracing::warn!("Cache sweep delete failed: {}", e);
                    return;
                }
            }

            if next_cursor == 0 {
                return;
            }
            cursor = next_cursor;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use super::*;
    use crate::cache::CacheError;
    use crate::cache::backends::MemoryBackend;

    fn memory_client() -> (Arc<MemoryBackend>, CacheClient) {
        let backend = Arc::new(MemoryBackend::new());
        let client = CacheClient::new(backend.clone());
        (backend, client)
    }

    #[tokio::test]
    async fn second_call_is_a_hit() {
        let (_, client) = memory_client();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<String, ()> = client
                .cached("k", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("v".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "v");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn disabled_client_fetches_every_time() {
        let client = CacheClient::disabled();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<String, ()> = client
                .cached("k", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("v".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "v");
        }

        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!client.is_enabled());
    }

    #[tokio::test]
    async fn cached_none_is_a_hit_not_a_miss() {
        let (_, client) = memory_client();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<Option<String>, ()> = client
                .cached("k", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok(None)
                })
                .await;
            assert_eq!(value.unwrap(), None);
        }

        // 缓存的None也算命中，不会反复回源
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn malformed_entry_is_treated_as_miss() {
        let (backend, client) = memory_client();
        backend
            .set("k", "not valid json".to_string(), 60)
            .await
            .unwrap();

        let calls = AtomicUsize::new(0);
        let value: Result<String, ()> = client
            .cached("k", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("fresh".to_string())
            })
            .await;

        assert_eq!(value.unwrap(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // 回源后写回了完好的条目，再读就命中
        let value: Result<String, ()> = client
            .cached("k", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("fresh".to_string())
            })
            .await;
        assert_eq!(value.unwrap(), "fresh");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn fetch_error_propagates() {
        let (_, client) = memory_client();

        let value: Result<String, &str> = client.cached("k", 60, || async { Err("db down") }).await;
        assert_eq!(value.unwrap_err(), "db down");
    }

    #[tokio::test]
    async fn invalidate_forces_refetch() {
        let (_, client) = memory_client();
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let _: Result<String, ()> = client
                .cached("k", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("v".to_string())
                })
                .await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        client.invalidate("k").await;

        let _: Result<String, ()> = client
            .cached("k", 60, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("v".to_string())
            })
            .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn invalidate_many_deletes_all_given_keys() {
        let (backend, client) = memory_client();
        backend.set("a", "1".to_string(), 60).await.unwrap();
        backend.set("b", "2".to_string(), 60).await.unwrap();
        backend.set("c", "3".to_string(), 60).await.unwrap();

        client
            .invalidate_many(&["a".to_string(), "b".to_string()])
            .await;

        assert_eq!(backend.get("a").await.unwrap(), None);
        assert_eq!(backend.get("b").await.unwrap(), None);
        assert_eq!(backend.get("c").await.unwrap(), Some("3".to_string()));
    }

    #[tokio::test]
    async fn pattern_sweep_deletes_across_pages() {
        let (backend, client) = memory_client();

        // 超过一页的键量，覆盖分页路径
        for i in 0..150 {
            backend
                .set(&format!("ws:1:role:u{}", i), "x".to_string(), 60)
                .await
                .unwrap();
        }
        backend.set("ws:2:todos", "x".to_string(), 60).await.unwrap();

        client.invalidate_pattern("ws:1:*").await;

        assert_eq!(backend.len(), 1);
        assert_eq!(
            backend.get("ws:2:todos").await.unwrap(),
            Some("x".to_string())
        );
    }

    struct FailingBackend;

    #[async_trait]
    impl CacheBackend for FailingBackend {
        async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn set(&self, _key: &str, _value: String, _ttl_secs: u64) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn del(&self, _keys: &[String]) -> Result<(), CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }

        async fn scan(
            &self,
            _cursor: u64,
            _pattern: &str,
            _page_size: usize,
        ) -> Result<Option<(u64, Vec<String>)>, CacheError> {
            Err(CacheError::Backend("connection refused".to_string()))
        }
    }

    #[tokio::test]
    async fn backend_failure_never_propagates() {
        let client = CacheClient::new(Arc::new(FailingBackend));
        let calls = AtomicUsize::new(0);

        for _ in 0..2 {
            let value: Result<String, ()> = client
                .cached("k", 60, || async {
                    calls.fetch_add(1, Ordering::SeqCst);
                    Ok("v".to_string())
                })
                .await;
            assert_eq!(value.unwrap(), "v");
        }
        // 读写全失败，每次都回源
        assert_eq!(calls.load(Ordering::SeqCst), 2);

        client.invalidate("k").await;
        client.invalidate_pattern("ws:*").await;
    }

    struct NoScanBackend(MemoryBackend);

    #[async_trait]
    impl CacheBackend for NoScanBackend {
        async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
            self.0.get(key).await
        }

        async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
            self.0.set(key, value, ttl_secs).await
        }

        async fn del(&self, keys: &[String]) -> Result<(), CacheError> {
            self.0.del(keys).await
        }

        async fn scan(
            &self,
            _cursor: u64,
            _pattern: &str,
            _page_size: usize,
        ) -> Result<Option<(u64, Vec<String>)>, CacheError> {
            Ok(None)
        }
    }

    #[tokio::test]
    async fn scanless_backend_makes_pattern_sweep_a_noop() {
        let backend = Arc::new(NoScanBackend(MemoryBackend::new()));
        let client = CacheClient::new(backend.clone());

        backend
            .set("ws:1:todos", "x".to_string(), 60)
            .await
            .unwrap();
        client.invalidate_pattern("ws:1:*").await;

        assert_eq!(
            backend.get("ws:1:todos").await.unwrap(),
            Some("x".to_string())
        );
    }
}
