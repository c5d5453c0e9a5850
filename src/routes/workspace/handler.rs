use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    cache::keys::{workspace_info_key, workspace_members_key, workspace_pattern},
    common::EmptyResponse,
    error::AppError,
    permissions::{Action, Role},
    utils::{Claims, success_to_api_response},
};

use super::model::{
    ChangeMemberRoleRequest, ChangeMemberRoleResponse, DeleteWorkspaceRequest, MemberInfo,
    RemoveMemberRequest, UpdateWorkspaceRequest, WorkspaceInfo,
};

#[derive(Debug, Deserialize)]
pub struct WorkspaceQuery {
    pub workspace_id: String,
}

/// 查询工作区信息（成员可见，读穿透缓存）
#[axum::debug_handler]
pub async fn get_workspace(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<impl IntoResponse, AppError> {
    if state
        .permissions
        .get_member_role(&claims.sub, &query.workspace_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotWorkspaceMember);
    }

    let workspaces = state.workspaces.clone();
    let workspace_id = query.workspace_id.clone();
    let workspace = state
        .cache
        .cached(
            &workspace_info_key(&query.workspace_id),
            state.config.workspace_cache_ttl_secs,
            move || async move { workspaces.find_by_id(&workspace_id).await },
        )
        .await?;

    match workspace {
        Some(ws) => Ok((
            StatusCode::OK,
            success_to_api_response(WorkspaceInfo::from(ws)),
        )),
        None => Err(AppError::NotFound("工作区不存在".to_string())),
    }
}

/// 列出工作区成员（成员可见，读穿透缓存）
#[axum::debug_handler]
pub async fn list_members(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<WorkspaceQuery>,
) -> Result<impl IntoResponse, AppError> {
    if state
        .permissions
        .get_member_role(&claims.sub, &query.workspace_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotWorkspaceMember);
    }

    let memberships = state.memberships.clone();
    let workspace_id = query.workspace_id.clone();
    let members = state
        .cache
        .cached(
            &workspace_members_key(&query.workspace_id),
            state.config.workspace_cache_ttl_secs,
            move || async move { memberships.list_members(&workspace_id).await },
        )
        .await?;

    let members: Vec<MemberInfo> = members.into_iter().map(MemberInfo::from).collect();
    Ok((StatusCode::OK, success_to_api_response(members)))
}

/// 更新工作区名称
#[axum::debug_handler]
pub async fn update_workspace(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateWorkspaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permissions
        .require_permission(&claims.sub, &req.workspace_id, Action::WorkspaceUpdate)
        .await?;

    if req.name.trim().is_empty() {
        return Err(AppError::Validation("工作区名称不能为空".to_string()));
    }

    let updated = state
        .workspaces
        .update_name(&req.workspace_id, req.name.trim())
        .await?;
    if !updated {
        return Err(AppError::NotFound("工作区不存在".to_string()));
    }

    state
        .cache
        .invalidate(&workspace_info_key(&req.workspace_id))
        .await;

    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}

/// 删除工作区
#[axum::debug_handler]
pub async fn delete_workspace(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DeleteWorkspaceRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permissions
        .require_permission(&claims.sub, &req.workspace_id, Action::WorkspaceDelete)
        .await?;

    let deleted = state.workspaces.delete(&req.workspace_id).await?;
    if !deleted {
        return Err(AppError::NotFound("工作区不存在".to_string()));
    }

    // 整区清扫：角色、成员列表、待办列表一并失效
    state
        .cache
        .invalidate_pattern(&workspace_pattern(&req.workspace_id))
        .await;

    tracing::info!("Workspace {} deleted by {}", req.workspace_id, claims.sub);
    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}

/// 变更成员角色
#[axum::debug_handler]
pub async fn change_member_role(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ChangeMemberRoleRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permissions
        .require_permission(&claims.sub, &req.workspace_id, Action::WorkspaceChangeRole)
        .await?;

    let Some(new_role) = Role::parse(&req.role) else {
        return Err(AppError::Validation(format!("未知角色: {}", req.role)));
    };
    if new_role == Role::Owner {
        return Err(AppError::Validation(
            "所有者角色不能通过本接口授予".to_string(),
        ));
    }

    match state
        .memberships
        .find_role(&req.user_id, &req.workspace_id)
        .await?
    {
        None => return Err(AppError::NotFound("成员不存在".to_string())),
        Some(Role::Owner) => {
            return Err(AppError::Validation("不能修改所有者的角色".to_string()));
        }
        Some(_) => {}
    }

    state
        .memberships
        .update_role(&req.user_id, &req.workspace_id, new_role)
        .await?;

    // 角色变更立刻失效缓存，否则旧角色还会再生效一个TTL
    state
        .permissions
        .invalidate_role(&req.user_id, &req.workspace_id)
        .await;
    state
        .cache
        .invalidate(&workspace_members_key(&req.workspace_id))
        .await;

    Ok((
        StatusCode::OK,
        success_to_api_response(ChangeMemberRoleResponse {
            user_id: req.user_id,
            role: new_role.as_str().to_string(),
        }),
    ))
}

/// 移除成员
#[axum::debug_handler]
pub async fn remove_member(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RemoveMemberRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permissions
        .require_permission(&claims.sub, &req.workspace_id, Action::WorkspaceRemoveMember)
        .await?;

    match state
        .memberships
        .find_role(&req.user_id, &req.workspace_id)
        .await?
    {
        None => return Err(AppError::NotFound("成员不存在".to_string())),
        Some(Role::Owner) => {
            return Err(AppError::Validation("不能移除所有者".to_string()));
        }
        Some(_) => {}
    }

    state
        .memberships
        .remove_member(&req.user_id, &req.workspace_id)
        .await?;

    state
        .permissions
        .invalidate_role(&req.user_id, &req.workspace_id)
        .await;
    state
        .cache
        .invalidate(&workspace_members_key(&req.workspace_id))
        .await;

    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}
