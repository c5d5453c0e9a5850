use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::CacheClient;
use crate::cache::keys::member_role_key;
use crate::error::AppError;

use super::{Action, Role};

/// 成员关系存储，权限引擎的外部协作方
#[async_trait]
pub trait MembershipStore: Send + Sync {
    /// 查询用户在工作区中的角色，非成员返回None
    async fn find_role(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Option<Role>, sqlx::Error>;
}

/// 权限判定结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionCheck {
    pub allowed: bool,
    pub role: Option<Role>,
}

/// 权限引擎
///
/// 角色查询经过旁路缓存，TTL内的降权可能晚生效；
/// 变更成员关系的调用方必须触发invalidate_role
pub struct PermissionEngine {
    store: Arc<dyn MembershipStore>,
    cache: Arc<CacheClient>,
    role_ttl_secs: u64,
}

impl PermissionEngine {
    pub fn new(store: Arc<dyn MembershipStore>, cache: Arc<CacheClient>, role_ttl_secs: u64) -> Self {
        Self {
            store,
            cache,
            role_ttl_secs,
        }
    }

    /// 解析用户在工作区中的角色，带缓存
    pub async fn get_member_role(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Option<Role>, sqlx::Error> {
        let store = self.store.clone();
        let user = user_id.to_string();
        let workspace = workspace_id.to_string();

        self.cache
            .cached(
                &member_role_key(user_id, workspace_id),
                self.role_ttl_secs,
                move || async move { store.find_role(&user, &workspace).await },
            )
            .await
    }

    /// 判定(用户, 工作区, 操作)三元组
    pub async fn check_permission(
        &self,
        user_id: &str,
        workspace_id: &str,
        action: Action,
    ) -> Result<PermissionCheck, sqlx::Error> {
        match self.get_member_role(user_id, workspace_id).await? {
            None => Ok(PermissionCheck {
                allowed: false,
                role: None,
            }),
            Some(role) => Ok(PermissionCheck {
                allowed: action.allowed_roles().contains(&role),
                role: Some(role),
            }),
        }
    }

    /// 判定并在拒绝时返回携带操作名的授权错误
    pub async fn require_permission(
        &self,
        user_id: &str,
        workspace_id: &str,
        action: Action,
    ) -> Result<Role, AppError> {
        let check = self.check_permission(user_id, workspace_id, action).await?;
        match check {
            PermissionCheck {
                allowed: true,
                role: Some(role),
            } => Ok(role),
            PermissionCheck { role, .. } => {
                tracing::warn!(
                    "Permission denied: user={} workspace={} action={} role={:?}",
                    user_id,
                    workspace_id,
                    action.as_str(),
                    role
                );
                Err(AppError::PermissionDenied(action))
            }
        }
    }

    /// 成员关系变更后的缓存失效钩子
    pub async fn invalidate_role(&self, user_id: &str, workspace_id: &str) {
        self.cache
            .invalidate(&member_role_key(user_id, workspace_id))
            .await;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::cache::backends::MemoryBackend;

    struct MemoryMembershipStore {
        roles: Mutex<HashMap<(String, String), Role>>,
        calls: AtomicUsize,
    }

    impl MemoryMembershipStore {
        fn new() -> Self {
            Self {
                roles: Mutex::new(HashMap::new()),
                calls: AtomicUsize::new(0),
            }
        }

        fn set_role(&self, user_id: &str, workspace_id: &str, role: Role) {
            self.roles
                .lock()
                .unwrap()
                .insert((user_id.to_string(), workspace_id.to_string()), role);
        }

        fn lookups(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MembershipStore for MemoryMembershipStore {
        async fn find_role(
            &self,
            user_id: &str,
            workspace_id: &str,
        ) -> Result<Option<Role>, sqlx::Error> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .roles
                .lock()
                .unwrap()
                .get(&(user_id.to_string(), workspace_id.to_string()))
                .copied())
        }
    }

    fn engine_with_cache() -> (Arc<MemoryMembershipStore>, PermissionEngine) {
        let store = Arc::new(MemoryMembershipStore::new());
        let cache = Arc::new(CacheClient::new(Arc::new(MemoryBackend::new())));
        let engine = PermissionEngine::new(store.clone(), cache, 60);
        (store, engine)
    }

    #[tokio::test]
    async fn non_member_is_denied_with_no_role() {
        let (_, engine) = engine_with_cache();

        let check = engine
            .check_permission("u1", "w1", Action::TodoCreate)
            .await
            .unwrap();
        assert_eq!(
            check,
            PermissionCheck {
                allowed: false,
                role: None
            }
        );
    }

    #[tokio::test]
    async fn owner_passes_every_action() {
        let (store, engine) = engine_with_cache();
        store.set_role("u1", "w1", Role::Owner);

        for action in Action::ALL {
            let check = engine.check_permission("u1", "w1", action).await.unwrap();
            assert!(check.allowed, "owner denied {}", action.as_str());
            assert_eq!(check.role, Some(Role::Owner));
        }
    }

    #[tokio::test]
    async fn member_is_denied_owner_only_action() {
        let (store, engine) = engine_with_cache();
        store.set_role("u1", "w1", Role::Member);

        let check = engine
            .check_permission("u1", "w1", Action::WorkspaceDelete)
            .await
            .unwrap();
        assert!(!check.allowed);
        assert_eq!(check.role, Some(Role::Member));
    }

    #[tokio::test]
    async fn member_cannot_delete_any_todo() {
        let (store, engine) = engine_with_cache();
        store.set_role("u1", "w1", Role::Member);

        let check = engine
            .check_permission("u1", "w1", Action::TodoDeleteAny)
            .await
            .unwrap();
        assert_eq!(
            check,
            PermissionCheck {
                allowed: false,
                role: Some(Role::Member)
            }
        );
    }

    #[tokio::test]
    async fn require_permission_names_denied_action() {
        let (store, engine) = engine_with_cache();
        store.set_role("u1", "w1", Role::Member);

        let err = engine
            .require_permission("u1", "w1", Action::WorkspaceDelete)
            .await
            .unwrap_err();
        match err {
            AppError::PermissionDenied(action) => {
                assert_eq!(action.as_str(), "workspace:delete");
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let role = engine
            .require_permission("u1", "w1", Action::TodoCreate)
            .await
            .unwrap();
        assert_eq!(role, Role::Member);
    }

    #[tokio::test]
    async fn role_change_is_stale_until_invalidated() {
        let (store, engine) = engine_with_cache();
        store.set_role("u1", "w1", Role::Member);

        let role = engine.get_member_role("u1", "w1").await.unwrap();
        assert_eq!(role, Some(Role::Member));
        assert_eq!(store.lookups(), 1);

        // TTL内存储里的变更不可见，仍然返回缓存的旧角色
        store.set_role("u1", "w1", Role::Admin);
        let role = engine.get_member_role("u1", "w1").await.unwrap();
        assert_eq!(role, Some(Role::Member));
        assert_eq!(store.lookups(), 1);

        // 失效钩子触发后立刻看到新角色
        engine.invalidate_role("u1", "w1").await;
        let role = engine.get_member_role("u1", "w1").await.unwrap();
        assert_eq!(role, Some(Role::Admin));
        assert_eq!(store.lookups(), 2);
    }

    #[tokio::test]
    async fn missing_membership_is_cached_too() {
        let (store, engine) = engine_with_cache();

        assert_eq!(engine.get_member_role("u1", "w1").await.unwrap(), None);
        assert_eq!(engine.get_member_role("u1", "w1").await.unwrap(), None);
        // 非成员的查询结果同样被缓存
        assert_eq!(store.lookups(), 1);
    }

    #[tokio::test]
    async fn disabled_cache_hits_store_every_time() {
        let store = Arc::new(MemoryMembershipStore::new());
        let engine = PermissionEngine::new(
            store.clone(),
            Arc::new(CacheClient::disabled()),
            60,
        );
        store.set_role("u1", "w1", Role::Admin);

        engine.get_member_role("u1", "w1").await.unwrap();
        engine.get_member_role("u1", "w1").await.unwrap();
        assert_eq!(store.lookups(), 2);
    }
}
