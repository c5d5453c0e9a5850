// 缓存后端抽象
// 任意带TTL的键值存储都可以接入；模式扫描是可选能力

pub mod memory;
pub mod redis;

pub use self::memory::MemoryBackend;
pub use self::redis::RedisBackend;

use async_trait::async_trait;

use super::CacheError;

#[async_trait]
pub trait CacheBackend: Send + Sync {
    /// 读取键，未命中返回None
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    /// 写入键并设置过期时间
    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError>;

    /// 删除一批键
    async fn del(&self, keys: &[String]) -> Result<(), CacheError>;

    /// 按模式分页扫描键空间；不支持扫描的后端返回None
    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        page_size: usize,
    ) -> Result<Option<(u64, Vec<String>)>, CacheError>;
}
