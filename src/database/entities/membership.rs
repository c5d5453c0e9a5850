use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// 工作区成员关系实体
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MembershipEntity {
    pub user_id: String,
    pub workspace_id: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}
