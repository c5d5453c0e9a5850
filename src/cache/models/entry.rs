use serde::{Deserialize, Serialize};

/// 带标记的缓存包装
///
/// 标记用来区分"缓存了一个空值"和"缓存未命中"，
/// 否则合法缓存的None会被当成未命中反复回源
#[derive(Debug, Serialize, Deserialize)]
pub struct CacheEntry<T> {
    pub is_cached: bool,
    pub value: T,
}

impl<T> CacheEntry<T> {
    pub fn new(value: T) -> Self {
        Self {
            is_cached: true,
            value,
        }
    }
}
