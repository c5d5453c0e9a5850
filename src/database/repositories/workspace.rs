// 工作区存储库

use std::sync::Arc;

use sqlx::PgPool;

use crate::database::entities::WorkspaceEntity;

/// 工作区存储库，处理工作区相关的数据库操作
#[derive(Clone)]
pub struct WorkspaceRepository {
    db: Arc<PgPool>,
}

impl WorkspaceRepository {
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 按ID查询工作区
    pub async fn find_by_id(
        &self,
        workspace_id: &str,
    ) -> Result<Option<WorkspaceEntity>, sqlx::Error> {
        sqlx::query_as::<_, WorkspaceEntity>(
            r#"
            SELECT workspace_id, name, owner_id, created_at
            FROM workspaces
            WHERE workspace_id = $1
            "#,
        )
        .bind(workspace_id)
        .fetch_optional(&*self.db)
        .await
    }

    /// 更新工作区名称，返回该工作区是否存在
    pub async fn update_name(&self, workspace_id: &str, name: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE workspaces SET name = $2
            WHERE workspace_id = $1
            "#,
        )
        .bind(workspace_id)
        .bind(name)
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 删除工作区及其成员与待办，返回该工作区是否存在
    pub async fn delete(&self, workspace_id: &str) -> Result<bool, sqlx::Error> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM todos WHERE workspace_id = $1")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM workspace_members WHERE workspace_id = $1")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;
        let result = sqlx::query("DELETE FROM workspaces WHERE workspace_id = $1")
            .bind(workspace_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}
