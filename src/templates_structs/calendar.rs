use askama::Template;

use crate::models::calendar::{CalendarDay, CalendarMonth};
use super::PageContext;

#[derive(Template)]
#[template(path = "calendar/day.html")]
pub struct CalendarDayTemplate {
    pub ctx: PageContext,
    pub day: CalendarDay,
    pub heading: String,
    pub prev_link: String,
    pub next_link: String,
    pub month_link: String,
}

#[derive(Template)]
#[template(path = "calendar/month.html")]
pub struct CalendarMonthTemplate {
    pub ctx: PageContext,
    pub month: CalendarMonth,
    pub heading: String,
    pub prev_link: String,
    pub next_link: String,
}
