// 进程内滑动窗口限流器
//
// 仅限本进程内存，不做跨进程协调：水平扩展到N个进程时，
// 实际放行速率会放大N倍，属于已知限制。

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::Utc;
use serde::Serialize;

/// 单次限流判定结果
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitDecision {
    pub success: bool,
    pub remaining: u32,
    /// 窗口重置时间（毫秒时间戳）
    pub reset_at: i64,
}

/// 滑动窗口限流器
///
/// 键与键之间完全独立；被拒绝的请求不计入窗口
pub struct RateLimiter {
    // 键 -> 窗口内的请求时间戳（毫秒，按插入顺序递增）
    entries: Mutex<HashMap<String, Vec<i64>>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// 判定一次请求是否放行
    pub fn attempt(&self, key: &str, max_requests: u32, window_ms: i64) -> RateLimitDecision {
        self.attempt_at(key, max_requests, window_ms, Utc::now().timestamp_millis())
    }

    /// 以显式时间判定，供测试注入可控时钟
    pub fn attempt_at(
        &self,
        key: &str,
        max_requests: u32,
        window_ms: i64,
        now_ms: i64,
    ) -> RateLimitDecision {
        assert!(max_requests > 0, "max_requests must be positive");
        assert!(window_ms > 0, "window_ms must be positive");

        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let window_start = now_ms - window_ms;

        // TODO: 不再访问的键会留下已过期的记录，键空间大时需要定期清扫
        let timestamps = entries.entry(key.to_string()).or_default();
        timestamps.retain(|&ts| ts > window_start);

        if timestamps.len() as u32 >= max_requests {
            // 拒绝的请求不追加时间戳，只保留剪枝后的状态
            return RateLimitDecision {
                success: false,
                remaining: 0,
                reset_at: timestamps[0] + window_ms,
            };
        }

        timestamps.push(now_ms);
        RateLimitDecision {
            success: true,
            remaining: max_requests - timestamps.len() as u32,
            reset_at: timestamps[0] + window_ms,
        }
    }

    /// 清空所有键，仅供测试使用
    pub fn reset_all(&self) {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .clear();
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new()
    }
}
