pub mod comments;
pub mod crud;
mod helpers;

pub use comments::add_comment;
pub use crud::{create, delete, detail, edit_form, list, new_form, update};
