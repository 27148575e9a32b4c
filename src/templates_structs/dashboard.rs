use askama::Template;

use crate::models::calendar::CalendarDay;
use crate::models::dashboard::DashboardSummary;
use super::PageContext;

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub summary: DashboardSummary,
    pub today: CalendarDay,
}
