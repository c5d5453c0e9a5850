use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    /// 未设置时禁用缓存，所有读取直接回源
    pub redis_url: Option<String>,
    pub jwt_secret: String,
    pub rate_limit_window_secs: u64,
    pub rate_limit_requests: u32,
    pub role_cache_ttl_secs: u64,
    pub workspace_cache_ttl_secs: u64,
    pub todo_cache_ttl_secs: u64,
    pub server_host: String,
    pub server_port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            redis_url: env::var("REDIS_URL").ok(),
            jwt_secret: env::var("JWT_SECRET")?,
            server_host: env::var("SERVER_HOST")?,
            server_port: env::var("SERVER_PORT")?.parse().unwrap_or(3000),
            rate_limit_window_secs: env::var("RATE_LIMIT_WINDOW")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            rate_limit_requests: env::var("RATE_LIMIT_REQUESTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(100),
            role_cache_ttl_secs: env::var("ROLE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(60),
            workspace_cache_ttl_secs: env::var("WORKSPACE_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            todo_cache_ttl_secs: env::var("TODO_CACHE_TTL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(30),
        })
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}
