use std::net::SocketAddr;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use crate::{
    AppState,
    utils::{error_codes, error_to_api_response},
};

/// 限流中间件：按客户端IP做滑动窗口限流
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    // 从连接信息获取原始IP
    let remote_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ci| ci.0.ip().to_string());
    // 从请求头中获取IP，或者使用连接信息中的IP作为默认值
    let ip = req
        .headers()
        .get("x-real-ip")
        .and_then(|h| h.to_str().ok())
        .or_else(|| {
            req.headers()
                .get("x-forwarded-for")
                .and_then(|h| h.to_str().ok())
                .and_then(|s| s.split(',').find(|ip| !ip.trim().is_empty()))
        })
        .or_else(|| remote_ip.as_deref())
        .unwrap_or("unknown")
        .trim()
        .to_string();

    let decision = state.limiter.attempt(
        &format!("api:{}", ip),
        state.config.rate_limit_requests,
        state.config.rate_limit_window().as_millis() as i64,
    );

    if !decision.success {
        let wait_secs = ((decision.reset_at - Utc::now().timestamp_millis()).max(0) + 999) / 1000;
        tracing::debug!("Rate limited ip={}, reset in {}s", ip, wait_secs);
        return (
            StatusCode::OK,
            error_to_api_response::<()>(
                error_codes::RATE_LIMIT,
                format!("请求过于频繁，请在{}秒后重试", wait_secs),
            ),
        )
            .into_response();
    }

    next.run(req).await
}
