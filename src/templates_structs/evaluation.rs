use askama::Template;

use crate::models::evaluation::EvaluationListItem;
use super::{PageContext, SelectOption};

#[derive(Template)]
#[template(path = "evaluations/list.html")]
pub struct EvaluationListTemplate {
    pub ctx: PageContext,
    pub evaluations: Vec<EvaluationListItem>,
    /// Name of the user the list is filtered to, if any.
    pub filter_name: Option<String>,
    pub average: Option<String>,
}

#[derive(Template)]
#[template(path = "evaluations/form.html")]
pub struct EvaluationFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub score_options: Vec<SelectOption>,
    pub task_options: Vec<SelectOption>,
    pub subject_options: Vec<SelectOption>,
    pub errors: Vec<String>,
}
