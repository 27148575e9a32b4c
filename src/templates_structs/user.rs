use askama::Template;

use crate::models::user::UserDisplay;
use super::{PageContext, SelectOption};

#[derive(Template)]
#[template(path = "users/list.html")]
pub struct UserListTemplate {
    pub ctx: PageContext,
    pub users: Vec<UserDisplay>,
}

#[derive(Template)]
#[template(path = "users/form.html")]
pub struct UserFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub user: UserDisplay,
    pub name: String,
    pub role_options: Vec<SelectOption>,
    pub errors: Vec<String>,
}
