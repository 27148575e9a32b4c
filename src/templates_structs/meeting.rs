use askama::Template;

use crate::models::meeting::MeetingListItem;
use super::{PageContext, SelectOption};

#[derive(Template)]
#[template(path = "meetings/list.html")]
pub struct MeetingListTemplate {
    pub ctx: PageContext,
    pub meetings: Vec<MeetingListItem>,
}

#[derive(Template)]
#[template(path = "meetings/form.html")]
pub struct MeetingFormTemplate {
    pub ctx: PageContext,
    pub form_action: String,
    pub form_title: String,
    pub title: String,
    pub scheduled_at: String,
    pub participant_options: Vec<SelectOption>,
    /// Set on the edit form, which also offers delete.
    pub meeting_id: Option<i64>,
    pub errors: Vec<String>,
}
