// 缓存模块
// 旁路缓存：读穿透与失效操作，后端缺失时整体降级为直查

pub mod backends;
pub mod keys;
pub mod models;
pub mod operations;

pub use backends::{CacheBackend, MemoryBackend, RedisBackend};
pub use models::entry::CacheEntry;
pub use operations::CacheClient;

use std::fmt;

/// 缓存后端错误
#[derive(Debug)]
pub enum CacheError {
    Backend(String),
    Serialize(String),
}

impl fmt::Display for CacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheError::Backend(msg) => write!(f, "cache backend error: {}", msg),
            CacheError::Serialize(msg) => write!(f, "cache serialize error: {}", msg),
        }
    }
}

impl std::error::Error for CacheError {}

impl From<redis::RedisError> for CacheError {
    fn from(e: redis::RedisError) -> Self {
        CacheError::Backend(e.to_string())
    }
}
