use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use worklog_backend::{
    AppState,
    cache::{CacheClient, RedisBackend},
    config::Config,
    database::repositories::{MembershipRepository, TodoRepository, WorkspaceRepository},
    middleware::{auth_middleware, log_errors, rate_limit},
    permissions::PermissionEngine,
    rate_limit::RateLimiter,
    routes,
};

#[tokio::main]
async fn main() {
    // 初始化日志
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    // 加载配置
    let config = Config::from_env().expect("Failed to load configuration");

    // 设置数据库连接池
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to Postgres");
    let pool = Arc::new(pool);

    // 设置缓存客户端：未配置REDIS_URL时整体降级为直查
    let cache = match &config.redis_url {
        Some(url) => {
            let client =
                redis::Client::open(url.as_str()).expect("Failed to create Redis client");
            Arc::new(CacheClient::new(Arc::new(RedisBackend::new(client))))
        }
        None => {
            tracing::warn!("REDIS_URL not set, caching disabled");
            Arc::new(CacheClient::disabled())
        }
    };

    // 设置限流器与权限引擎
    let limiter = Arc::new(RateLimiter::new());
    let memberships = MembershipRepository::new(pool.clone());
    let permissions = Arc::new(PermissionEngine::new(
        Arc::new(memberships.clone()),
        cache.clone(),
        config.role_cache_ttl_secs,
    ));

    // 设置应用状态
    let state = AppState {
        config: config.clone(),
        cache,
        limiter,
        permissions,
        workspaces: WorkspaceRepository::new(pool.clone()),
        memberships,
        todos: TodoRepository::new(pool.clone()),
    };

    // 全部业务路由都要求认证
    let protected_routes = Router::new()
        // 工作区路由
        .route("/workspaces/info", get(routes::workspace::get_workspace))
        .route("/workspaces/members", get(routes::workspace::list_members))
        .route("/workspaces/update", put(routes::workspace::update_workspace))
        .route("/workspaces/delete", post(routes::workspace::delete_workspace))
        .route(
            "/workspaces/change-role",
            put(routes::workspace::change_member_role),
        )
        .route(
            "/workspaces/remove-member",
            post(routes::workspace::remove_member),
        )
        // 待办路由
        .route("/todos/list", get(routes::todo::list_todos))
        .route("/todos/create", post(routes::todo::create_todo))
        .route("/todos/update", put(routes::todo::update_todo))
        .route("/todos/delete", post(routes::todo::delete_todo))
        // 应用认证中间件
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    // 添加日志中间件和限流中间件
    let router = Router::new()
        .nest("/api", protected_routes)
        .layer(axum::middleware::from_fn(log_errors))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            rate_limit,
        ));

    // 根据编译模式决定是否添加CORS
    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    // 添加应用状态
    let app = router.with_state(state.clone());

    // 启动服务器
    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
