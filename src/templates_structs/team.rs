use askama::Template;

use crate::models::team::{Team, TeamListItem};
use crate::models::user::UserDisplay;
use super::{PageContext, SelectOption};

#[derive(Template)]
#[template(path = "teams/list.html")]
pub struct TeamListTemplate {
    pub ctx: PageContext,
    pub teams: Vec<TeamListItem>,
}

#[derive(Template)]
#[template(path = "teams/form.html")]
pub struct TeamFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub title: String,
    pub manager_options: Vec<SelectOption>,
    pub member_options: Vec<SelectOption>,
    pub errors: Vec<String>,
}

#[derive(Template)]
#[template(path = "teams/detail.html")]
pub struct TeamDetailTemplate {
    pub ctx: PageContext,
    pub team: Team,
    pub manager_name: Option<String>,
    pub members: Vec<UserDisplay>,
    pub candidates: Vec<SelectOption>,
}
