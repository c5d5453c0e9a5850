// 数据库模块
// 包含数据库实体定义和存储库操作

pub mod entities;
pub mod repositories;

pub use entities::{MembershipEntity, TodoEntity, WorkspaceEntity};
pub use repositories::{MembershipRepository, TodoRepository, WorkspaceRepository};
