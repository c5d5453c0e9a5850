// 权限模块
// 静态角色能力表 + 带缓存的成员角色解析

mod engine;
mod roles;

pub use engine::{MembershipStore, PermissionCheck, PermissionEngine};
pub use roles::{Action, Role};
