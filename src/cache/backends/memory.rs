use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::CacheBackend;
use crate::cache::CacheError;

/// 进程内存缓存后端，测试与单机开发用
#[derive(Default)]
pub struct MemoryBackend {
    entries: Mutex<HashMap<String, StoredValue>>,
}

struct StoredValue {
    value: String,
    /// 过期时间（秒级时间戳）
    expires_at: i64,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheBackend for MemoryBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        match entries.get(key) {
            Some(stored) if Utc::now().timestamp() >= stored.expires_at => {
                entries.remove(key);
                Ok(None)
            }
            Some(stored) => Ok(Some(stored.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        entries.insert(
            key.to_string(),
            StoredValue {
                value,
                expires_at: Utc::now().timestamp() + ttl_secs as i64,
            },
        );
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<(), CacheError> {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        for key in keys {
            entries.remove(key);
        }
        Ok(())
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        page_size: usize,
    ) -> Result<Option<(u64, Vec<String>)>, CacheError> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());

        let mut matched: Vec<String> = entries
            .keys()
            .filter(|k| glob_match(pattern, k))
            .cloned()
            .collect();
        matched.sort();

        let page: Vec<String> = matched.iter().take(page_size).cloned().collect();
        // 调用方逐页删除已返回的键，剩余键在下一页重新出现
        let next_cursor = if matched.len() > page.len() {
            cursor + 1
        } else {
            0
        };

        Ok(Some((next_cursor, page)))
    }
}

/// 简化的glob匹配，支持'*'通配
fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }

    let mut pos = 0usize;
    for (i, part) in parts.iter().enumerate() {
        if part.is_empty() {
            continue;
        }
        if i == 0 {
            if !key.starts_with(part) {
                return false;
            }
            pos = part.len();
        } else if i == parts.len() - 1 {
            return key.len() >= pos && key[pos..].ends_with(part);
        } else {
            match key[pos..].find(part) {
                Some(idx) => pos = pos + idx + part.len(),
                None => return false,
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn glob_matches_prefix_pattern() {
        assert!(glob_match("ws:1:*", "ws:1:todos"));
        assert!(glob_match("ws:1:*", "ws:1:role:u1"));
        assert!(!glob_match("ws:1:*", "ws:2:todos"));
    }

    #[test]
    fn glob_matches_suffix_and_exact() {
        assert!(glob_match("*:todos", "ws:9:todos"));
        assert!(!glob_match("*:todos", "ws:9:members"));
        assert!(glob_match("ws:1:info", "ws:1:info"));
        assert!(!glob_match("ws:1:info", "ws:1:infos"));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_miss() {
        let backend = MemoryBackend::new();
        backend.set("k", "v".to_string(), 0).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
    }

    #[tokio::test]
    async fn set_then_get_roundtrip() {
        let backend = MemoryBackend::new();
        backend.set("k", "v".to_string(), 60).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), Some("v".to_string()));

        backend.del(&["k".to_string()]).await.unwrap();
        assert_eq!(backend.get("k").await.unwrap(), None);
    }
}
