/// 工作区缓存键前缀
const WORKSPACE_PREFIX: &str = "ws:";

/// 生成成员角色缓存键
pub fn member_role_key(user_id: &str, workspace_id: &str) -> String {
    format!("{}{}:role:{}", WORKSPACE_PREFIX, workspace_id, user_id)
}

/// 生成工作区信息缓存键
pub fn workspace_info_key(workspace_id: &str) -> String {
    format!("{}{}:info", WORKSPACE_PREFIX, workspace_id)
}

/// 生成工作区成员列表缓存键
pub fn workspace_members_key(workspace_id: &str) -> String {
    format!("{}{}:members", WORKSPACE_PREFIX, workspace_id)
}

/// 生成覆盖整个工作区的键模式，删除工作区后整区清扫用
pub fn workspace_pattern(workspace_id: &str) -> String {
    format!("{}{}:*", WORKSPACE_PREFIX, workspace_id)
}
