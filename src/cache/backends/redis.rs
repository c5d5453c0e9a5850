use async_trait::async_trait;
use redis::{AsyncCommands, Client as RedisClient};

use super::CacheBackend;
use crate::cache::CacheError;

/// Redis缓存后端
pub struct RedisBackend {
    client: RedisClient,
}

impl RedisBackend {
    pub fn new(client: RedisClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let result: Option<String> = conn.get(key).await?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: String, ttl_secs: u64) -> Result<(), CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let _: () = conn.set_ex(key, value, ttl_secs).await?;
        Ok(())
    }

    async fn del(&self, keys: &[String]) -> Result<(), CacheError> {
        if keys.is_empty() {
            return Ok(());
        }
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let _: () = conn.del(keys).await?;
        Ok(())
    }

    async fn scan(
        &self,
        cursor: u64,
        pattern: &str,
        page_size: usize,
    ) -> Result<Option<(u64, Vec<String>)>, CacheError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;

        let (next_cursor, keys): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("MATCH")
            .arg(pattern)
            .arg("COUNT")
            .arg(page_size)
            .query_async(&mut conn)
            .await?;

        Ok(Some((next_cursor, keys)))
    }
}
