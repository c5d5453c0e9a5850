// 待办事项存储库

use std::sync::Arc;

use sqlx::PgPool;
use uuid::Uuid;

use crate::database::entities::TodoEntity;

const TODO_COLUMNS: &str =
    "todo_id, workspace_id, title, status, creator_id, assignee_id, created_at, updated_at";

/// 待办事项存储库，处理待办相关的数据库操作
#[derive(Clone)]
pub struct TodoRepository {
    db: Arc<PgPool>,
}

impl TodoRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 列出工作区内全部待办
    pub async fn list_by_workspace(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<TodoEntity>, sqlx::Error> {
        sqlx::query_as::<_, TodoEntity>(&format!(
            r#"
            SELECT {TODO_COLUMNS}
            FROM todos
            WHERE workspace_id = $1
            ORDER BY created_at DESC
            "#
        ))
        .bind(workspace_id)
        .fetch_all(&*self.db)
        .await
    }

    /// 按ID查询待办
    pub async fn find_by_id(&self, todo_id: &str) -> Result<Option<TodoEntity>, sqlx::Error> {
        sqlx::query_as::<_, TodoEntity>(&format!(
            r#"
            SELECT {TODO_COLUMNS}
            FROM todos
            WHERE todo_id = $1
            "#
        ))
        .bind(todo_id)
        .fetch_optional(&*self.db)
        .await
    }

    /// 创建待办
    pub async fn create(
        &self,
        workspace_id: &str,
        title: &str,
        creator_id: &str,
        assignee_id: Option<&str>,
    ) -> Result<TodoEntity, sqlx::Error> {
        let todo_id = Uuid::new_v4().to_string();

        sqlx::query_as::<_, TodoEntity>(&format!(
            r#"
            INSERT INTO todos (todo_id, workspace_id, title, status, creator_id, assignee_id, created_at, updated_at)
            VALUES ($1, $2, $3, 'open', $4, $5, NOW(), NOW())
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(&todo_id)
        .bind(workspace_id)
        .bind(title)
        .bind(creator_id)
        .bind(assignee_id)
        .fetch_one(&*self.db)
        .await
    }

    /// 更新标题或状态，返回更新后的实体
    pub async fn update(
        &self,
        todo_id: &str,
        title: Option<&str>,
        status: Option<&str>,
    ) -> Result<Option<TodoEntity>, sqlx::Error> {
        sqlx::query_as::<_, TodoEntity>(&format!(
            r#"
            UPDATE todos
            SET title = COALESCE($2, title),
                status = COALESCE($3, status),
                updated_at = NOW()
            WHERE todo_id = $1
            RETURNING {TODO_COLUMNS}
            "#
        ))
        .bind(todo_id)
        .bind(title)
        .bind(status)
        .fetch_optional(&*self.db)
        .await
    }

    /// 删除待办，返回该待办是否存在
    pub async fn delete(&self, todo_id: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM todos WHERE todo_id = $1")
            .bind(todo_id)
            .execute(&*self.db)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
