// Template context structures for Askama templates, organized by domain.

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::identity::CurrentUser;
use crate::auth::session::take_flash;
use crate::models::user::Role;

pub const APP_NAME: &str = "BMS";

pub struct NavItem {
    pub label: &'static str,
    pub href: &'static str,
    pub active: bool,
}

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.username`, `ctx.nav_items`, etc.
pub struct PageContext {
    pub user_id: i64,
    pub username: String,
    pub avatar_initial: String,
    pub role_label: String,
    pub is_admin: bool,
    pub is_staff: bool,
    pub flash: Option<String>,
    pub nav_items: Vec<NavItem>,
    pub app_name: String,
    pub csrf_token: String,
}

impl PageContext {
    pub fn build(session: &Session, user: &CurrentUser, current_path: &str) -> Self {
        let role = user.role();
        let username = user.user.name.clone();
        let avatar_initial = username.chars().next().unwrap_or('?').to_uppercase().to_string();
        Self {
            user_id: user.id(),
            username,
            avatar_initial,
            role_label: role.label().to_string(),
            is_admin: role == Role::Admin,
            is_staff: role != Role::User,
            flash: take_flash(session),
            nav_items: navigation(current_path),
            app_name: APP_NAME.to_string(),
            csrf_token: csrf::get_or_create_token(session),
        }
    }
}

const NAV_ENTRIES: [(&str, &str); 7] = [
    ("Dashboard", "/dashboard"),
    ("Tasks", "/tasks"),
    ("Meetings", "/meetings"),
    ("Evaluations", "/evaluations"),
    ("Teams", "/teams"),
    ("Calendar", "/calendar"),
    ("Users", "/users"),
];

/// Sidebar entries; the one whose prefix matches `current_path` is active.
pub fn navigation(current_path: &str) -> Vec<NavItem> {
    NAV_ENTRIES
        .iter()
        .map(|&(label, href)| NavItem { label, href, active: current_path.starts_with(href) })
        .collect()
}

/// One `<option>` or checkbox in a picker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl ToString, label: impl Into<String>, selected: bool) -> Self {
        Self { value: value.to_string(), label: label.into(), selected }
    }
}

mod api;
mod calendar;
mod common;
mod dashboard;
mod evaluation;
mod meeting;
mod task;
mod team;
mod user;

pub use self::api::{ApiErrorResponse, ApiUserResponse, RegisterRequest, TokenRequest, TokenResponse};
pub use self::calendar::{CalendarDayTemplate, CalendarMonthTemplate};
pub use self::common::LoginTemplate;
pub use self::dashboard::DashboardTemplate;
pub use self::evaluation::{EvaluationFormTemplate, EvaluationListTemplate};
pub use self::meeting::{MeetingFormTemplate, MeetingListTemplate};
pub use self::task::{TaskDetailTemplate, TaskFormTemplate, TaskListTemplate};
pub use self::team::{TeamDetailTemplate, TeamFormTemplate, TeamListTemplate};
pub use self::user::{UserFormTemplate, UserListTemplate};
