mod handler;
mod model;

pub use handler::{create_todo, delete_todo, list_todos, update_todo};
