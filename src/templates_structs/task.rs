use askama::Template;

use crate::models::comment::TaskComment;
use crate::models::task::{Task, TaskListItem};
use crate::models::user::UserDisplay;
use super::{PageContext, SelectOption};

#[derive(Template)]
#[template(path = "tasks/list.html")]
pub struct TaskListTemplate {
    pub ctx: PageContext,
    pub tasks: Vec<TaskListItem>,
}

#[derive(Template)]
#[template(path = "tasks/form.html")]
pub struct TaskFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub title: String,
    pub description: String,
    pub deadline: String,
    pub status_options: Vec<SelectOption>,
    pub participant_options: Vec<SelectOption>,
    /// Only the create form offers a first comment.
    pub show_first_comment: bool,
    pub first_comment: String,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "tasks/detail.html")]
pub struct TaskDetailTemplate {
    pub ctx: PageContext,
    pub task: Task,
    pub participants: Vec<UserDisplay>,
    pub comments: Vec<TaskComment>,
    pub comment_errors: Vec<String>,
}
