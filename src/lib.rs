use std::sync::Arc;

use config::Config;

pub mod cache;
pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod permissions;
pub mod rate_limit;
pub mod routes;
pub mod utils;

use cache::CacheClient;
use database::repositories::{MembershipRepository, TodoRepository, WorkspaceRepository};
use permissions::PermissionEngine;
use rate_limit::RateLimiter;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub cache: Arc<CacheClient>,
    pub limiter: Arc<RateLimiter>,
    pub permissions: Arc<PermissionEngine>,
    pub workspaces: WorkspaceRepository,
    pub memberships: MembershipRepository,
    pub todos: TodoRepository,
}
