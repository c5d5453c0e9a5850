/// 生成工作区待办列表缓存键
///
/// 挂在所属工作区前缀下，整区清扫时一并失效
pub fn workspace_todos_key(workspace_id: &str) -> String {
    format!("ws:{}:todos", workspace_id)
}
