use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::common::ApiResponse;
use crate::permissions::Action;
use crate::utils::error_codes;

#[derive(Debug)]
pub enum AppError {
    Unauthorized,
    NotWorkspaceMember,
    PermissionDenied(Action),
    NotFound(String),
    Validation(String),
    InternalServerError,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, msg) = match self {
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                error_codes::AUTH_FAILED,
                "未授权访问".to_string(),
            ),
            AppError::NotWorkspaceMember => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                "不是该工作区的成员".to_string(),
            ),
            AppError::PermissionDenied(action) => (
                StatusCode::FORBIDDEN,
                error_codes::PERMISSION_DENIED,
                format!("无权执行该操作: {}", action.as_str()),
            ),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, error_codes::NOT_FOUND, msg),
            AppError::Validation(msg) => (StatusCode::OK, error_codes::VALIDATION_ERROR, msg),
            AppError::InternalServerError => (
                StatusCode::INTERNAL_SERVER_ERROR,
                error_codes::INTERNAL_ERROR,
                "内部服务器错误".to_string(),
            ),
        };

        let body: Json<ApiResponse<()>> = Json(ApiResponse {
            code,
            msg,
            resp_data: None,
        });

        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        tracing::error!("Database error: {:?}", e);
        AppError::InternalServerError
    }
}
