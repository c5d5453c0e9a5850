// 成员关系存储库
// 工作区成员相关的数据库操作

use std::sync::Arc;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::entities::MembershipEntity;
use crate::permissions::{MembershipStore, Role};

/// 成员关系存储库，处理工作区成员的数据库操作
#[derive(Clone)]
pub struct MembershipRepository {
    db: Arc<PgPool>,
}

impl MembershipRepository {
    /// 创建新的成员关系存储库实例
    pub fn new(db: Arc<PgPool>) -> Self {
        Self { db }
    }

    /// 查询成员角色，非成员返回None
    pub async fn find_role(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Option<Role>, sqlx::Error> {
        let row: Option<(String,)> = sqlx::query_as(
            r#"
            SELECT role FROM workspace_members
            WHERE user_id = $1 AND workspace_id = $2
            "#,
        )
        .bind(user_id)
        .bind(workspace_id)
        .fetch_optional(&*self.db)
        .await?;

        Ok(row.and_then(|(role,)| Role::parse(&role)))
    }

    /// 列出工作区全部成员
    pub async fn list_members(
        &self,
        workspace_id: &str,
    ) -> Result<Vec<MembershipEntity>, sqlx::Error> {
        sqlx::query_as::<_, MembershipEntity>(
            r#"
            SELECT user_id, workspace_id, role, joined_at
            FROM workspace_members
            WHERE workspace_id = $1
            ORDER BY joined_at
            "#,
        )
        .bind(workspace_id)
        .fetch_all(&*self.db)
        .await
    }

    /// 添加成员
    pub async fn add_member(
        &self,
        user_id: &str,
        workspace_id: &str,
        role: Role,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO workspace_members (user_id, workspace_id, role, joined_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(user_id)
        .bind(workspace_id)
        .bind(role.as_str())
        .execute(&*self.db)
        .await?;

        Ok(())
    }

    /// 更新成员角色，返回该成员是否存在
    pub async fn update_role(
        &self,
        user_id: &str,
        workspace_id: &str,
        role: Role,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE workspace_members SET role = $3
            WHERE user_id = $1 AND workspace_id = $2
            "#,
        )
        .bind(user_id)
        .bind(workspace_id)
        .bind(role.as_str())
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// 移除成员，返回该成员是否存在
    pub async fn remove_member(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM workspace_members
            WHERE user_id = $1 AND workspace_id = $2
            "#,
        )
        .bind(user_id)
        .bind(workspace_id)
        .execute(&*self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[async_trait]
impl MembershipStore for MembershipRepository {
    async fn find_role(
        &self,
        user_id: &str,
        workspace_id: &str,
    ) -> Result<Option<Role>, sqlx::Error> {
        MembershipRepository::find_role(self, user_id, workspace_id).await
    }
}
