mod handler;
mod model;

pub use handler::{
    change_member_role, delete_workspace, get_workspace, list_members, remove_member,
    update_workspace,
};
