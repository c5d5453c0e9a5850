use serde::{Deserialize, Serialize};

use crate::database::entities::TodoEntity;

/// 待办状态的合法取值
pub const TODO_STATUSES: [&str; 3] = ["open", "in_progress", "done"];

/// 待办信息响应
#[derive(Debug, Serialize)]
pub struct TodoInfo {
    pub todo_id: String,
    pub workspace_id: String,
    pub title: String,
    pub status: String,
    pub creator_id: String,
    pub assignee_id: Option<String>,
}

impl From<TodoEntity> for TodoInfo {
    fn from(todo: TodoEntity) -> Self {
        Self {
            todo_id: todo.todo_id,
            workspace_id: todo.workspace_id,
            title: todo.title,
            status: todo.status,
            creator_id: todo.creator_id,
            assignee_id: todo.assignee_id,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateTodoRequest {
    pub workspace_id: String,
    pub title: String,
    pub assignee_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTodoRequest {
    pub workspace_id: String,
    pub todo_id: String,
    pub title: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DeleteTodoRequest {
    pub workspace_id: String,
    pub todo_id: String,
}
