use serde::{Deserialize, Serialize};

/// 工作区成员角色，闭集
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Owner,
    Admin,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Owner => "owner",
            Role::Admin => "admin",
            Role::Member => "member",
        }
    }

    /// 解析数据库中的角色字段
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "owner" => Some(Role::Owner),
            "admin" => Some(Role::Admin),
            "member" => Some(Role::Member),
            _ => None,
        }
    }
}

/// 受权限保护的操作，闭集
///
/// 新增操作必须同时扩展能力表，否则无法编译
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    WorkspaceUpdate,
    WorkspaceDelete,
    WorkspaceChangeRole,
    WorkspaceRemoveMember,
    TodoCreate,
    TodoEditAny,
    TodoDeleteAny,
}

impl Action {
    /// 全部操作，测试与审计用
    pub const ALL: [Action; 7] = [
        Action::WorkspaceUpdate,
        Action::WorkspaceDelete,
        Action::WorkspaceChangeRole,
        Action::WorkspaceRemoveMember,
        Action::TodoCreate,
        Action::TodoEditAny,
        Action::TodoDeleteAny,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::WorkspaceUpdate => "workspace:update",
            Action::WorkspaceDelete => "workspace:delete",
            Action::WorkspaceChangeRole => "workspace:change_role",
            Action::WorkspaceRemoveMember => "workspace:remove_member",
            Action::TodoCreate => "todo:create",
            Action::TodoEditAny => "todo:edit_any",
            Action::TodoDeleteAny => "todo:delete_any",
        }
    }

    /// 角色能力表：每个操作允许的角色集合
    ///
    /// 表在编译期固定，审计权限直接读这段源码即可
    pub fn allowed_roles(&self) -> &'static [Role] {
        match self {
            Action::WorkspaceUpdate => &[Role::Owner, Role::Admin],
            Action::WorkspaceDelete => &[Role::Owner],
            Action::WorkspaceChangeRole => &[Role::Owner],
            Action::WorkspaceRemoveMember => &[Role::Owner, Role::Admin],
            Action::TodoCreate => &[Role::Owner, Role::Admin, Role::Member],
            Action::TodoEditAny => &[Role::Owner, Role::Admin],
            Action::TodoDeleteAny => &[Role::Owner, Role::Admin],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_is_allowed_everything() {
        for action in Action::ALL {
            assert!(
                action.allowed_roles().contains(&Role::Owner),
                "owner denied {}",
                action.as_str()
            );
        }
    }

    #[test]
    fn member_is_denied_owner_only_actions() {
        assert!(!Action::WorkspaceDelete.allowed_roles().contains(&Role::Member));
        assert!(!Action::WorkspaceChangeRole.allowed_roles().contains(&Role::Member));
        assert!(Action::TodoCreate.allowed_roles().contains(&Role::Member));
    }

    #[test]
    fn role_parse_roundtrip() {
        for role in [Role::Owner, Role::Admin, Role::Member] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("superuser"), None);
    }

    #[test]
    fn role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }
}
