use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 待办事项实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TodoEntity {
    pub todo_id: String,
    pub workspace_id: String,
    pub title: String,
    pub status: String,
    pub creator_id: String,
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
