use axum::{
    extract::{Extension, Json, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use crate::{
    AppState,
    cache::keys::workspace_todos_key,
    common::EmptyResponse,
    error::AppError,
    permissions::Action,
    utils::{Claims, success_to_api_response},
};

use super::model::{
    CreateTodoRequest, DeleteTodoRequest, TODO_STATUSES, TodoInfo, UpdateTodoRequest,
};

#[derive(Debug, Deserialize)]
pub struct TodoListQuery {
    pub workspace_id: String,
}

/// 列出工作区待办（成员可见，读穿透缓存）
#[axum::debug_handler]
pub async fn list_todos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<TodoListQuery>,
) -> Result<impl IntoResponse, AppError> {
    if state
        .permissions
        .get_member_role(&claims.sub, &query.workspace_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotWorkspaceMember);
    }

    let todos = state.todos.clone();
    let workspace_id = query.workspace_id.clone();
    let todos = state
        .cache
        .cached(
            &workspace_todos_key(&query.workspace_id),
            state.config.todo_cache_ttl_secs,
            move || async move { todos.list_by_workspace(&workspace_id).await },
        )
        .await?;

    let todos: Vec<TodoInfo> = todos.into_iter().map(TodoInfo::from).collect();
    Ok((StatusCode::OK, success_to_api_response(todos)))
}

/// 创建待办
#[axum::debug_handler]
pub async fn create_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<impl IntoResponse, AppError> {
    state
        .permissions
        .require_permission(&claims.sub, &req.workspace_id, Action::TodoCreate)
        .await?;

    if req.title.trim().is_empty() {
        return Err(AppError::Validation("标题不能为空".to_string()));
    }

    let todo = state
        .todos
        .create(
            &req.workspace_id,
            req.title.trim(),
            &claims.sub,
            req.assignee_id.as_deref(),
        )
        .await?;

    state
        .cache
        .invalidate(&workspace_todos_key(&req.workspace_id))
        .await;

    Ok((
        StatusCode::CREATED,
        success_to_api_response(TodoInfo::from(todo)),
    ))
}

/// 更新待办（创建者可改自己的，改别人的需要todo:edit_any）
#[axum::debug_handler]
pub async fn update_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Some(status) = &req.status {
        if !TODO_STATUSES.contains(&status.as_str()) {
            return Err(AppError::Validation(format!("未知状态: {}", status)));
        }
    }

    let Some(todo) = state
        .todos
        .find_by_id(&req.todo_id)
        .await?
        .filter(|t| t.workspace_id == req.workspace_id)
    else {
        return Err(AppError::NotFound("待办不存在".to_string()));
    };

    if todo.creator_id != claims.sub {
        state
            .permissions
            .require_permission(&claims.sub, &req.workspace_id, Action::TodoEditAny)
            .await?;
    } else if state
        .permissions
        .get_member_role(&claims.sub, &req.workspace_id)
        .await?
        .is_none()
    {
        // 创建者被移出工作区后也不能再动自己的待办
        return Err(AppError::NotWorkspaceMember);
    }

    let Some(updated) = state
        .todos
        .update(&req.todo_id, req.title.as_deref(), req.status.as_deref())
        .await?
    else {
        return Err(AppError::NotFound("待办不存在".to_string()));
    };

    state
        .cache
        .invalidate(&workspace_todos_key(&req.workspace_id))
        .await;

    Ok((
        StatusCode::OK,
        success_to_api_response(TodoInfo::from(updated)),
    ))
}

/// 删除待办（创建者可删自己的，删别人的需要todo:delete_any）
#[axum::debug_handler]
pub async fn delete_todo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<DeleteTodoRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(todo) = state
        .todos
        .find_by_id(&req.todo_id)
        .await?
        .filter(|t| t.workspace_id == req.workspace_id)
    else {
        return Err(AppError::NotFound("待办不存在".to_string()));
    };

    if todo.creator_id != claims.sub {
        state
            .permissions
            .require_permission(&claims.sub, &req.workspace_id, Action::TodoDeleteAny)
            .await?;
    } else if state
        .permissions
        .get_member_role(&claims.sub, &req.workspace_id)
        .await?
        .is_none()
    {
        return Err(AppError::NotWorkspaceMember);
    }

    state.todos.delete(&req.todo_id).await?;

    state
        .cache
        .invalidate(&workspace_todos_key(&req.workspace_id))
        .await;

    Ok((StatusCode::OK, success_to_api_response(EmptyResponse {})))
}
