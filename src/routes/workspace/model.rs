use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::database::entities::{MembershipEntity, WorkspaceEntity};

/// 工作区信息响应
#[derive(Debug, Serialize)]
pub struct WorkspaceInfo {
    pub workspace_id: String,
    pub name: String,
    pub owner_id: String,
}

impl From<WorkspaceEntity> for WorkspaceInfo {
    fn from(ws: WorkspaceEntity) -> Self {
        Self {
            workspace_id: ws.workspace_id,
            name: ws.name,
            owner_id: ws.owner_id,
        }
    }
}

/// 成员信息响应
#[derive(Debug, Serialize)]
pub struct MemberInfo {
    pub user_id: String,
    pub role: String,
    pub joined_at: DateTime<Utc>,
}

impl From<MembershipEntity> for MemberInfo {
    fn from(member: MembershipEntity) -> Self {
        Self {
            user_id: member.user_id,
            role: member.role,
            joined_at: member.joined_at,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateWorkspaceRequest {
    pub workspace_id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct DeleteWorkspaceRequest {
    pub workspace_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangeMemberRoleRequest {
    pub workspace_id: String,
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Serialize)]
pub struct ChangeMemberRoleResponse {
    pub user_id: String,
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct RemoveMemberRequest {
    pub workspace_id: String,
    pub user_id: String,
}
