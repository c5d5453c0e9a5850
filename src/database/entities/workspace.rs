use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 工作区实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct WorkspaceEntity {
    pub workspace_id: String,
    pub name: String,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}
