use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Datelike, Duration, Local, NaiveDate};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::errors::{AppError, render};
use crate::models::calendar::{self, CalendarDay, CalendarMonth};
use crate::templates_structs::{CalendarDayTemplate, CalendarMonthTemplate, PageContext};

/// Staff see every item; users only their own tasks and meetings.
fn participant_filter(user: &CurrentUser) -> Option<i64> {
    if user.subject().is_staff() { None } else { Some(user.id()) }
}

/// Parse `YYYY-MM-DD`; dates the database cannot store are not found.
pub fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .ok()
        .filter(|d| calendar::year_supported(d.year()))
        .ok_or(AppError::NotFound)
}

/// Empty when the neighbouring day falls outside the supported years.
fn day_link(date: Option<NaiveDate>) -> String {
    date.filter(|d| calendar::year_supported(d.year()))
        .map(|d| format!("/calendar/day/{d}"))
        .unwrap_or_default()
}

/// `(year, month)` of the previous and next month.
pub fn adjacent_months(year: i32, month: u32) -> ((i32, u32), (i32, u32)) {
    let prev = if month == 1 { (year - 1, 12) } else { (year, month - 1) };
    let next = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    (prev, next)
}

pub async fn load_day(pool: &PgPool, user: &CurrentUser, raw_date: &str) -> Result<CalendarDay, AppError> {
    let date = parse_date(raw_date)?;
    Ok(calendar::day(pool, date, participant_filter(user)).await?)
}

pub async fn load_month(pool: &PgPool, user: &CurrentUser, year: i32, month: u32) -> Result<CalendarMonth, AppError> {
    calendar::month(pool, year, month, participant_filter(user))
        .await?
        .ok_or(AppError::NotFound)
}

/// GET /calendar: the current month.
pub async fn index(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let today = Local::now().date_naive();
    month_page(&pool, &session, &user, today.year(), today.month()).await
}

pub async fn day(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let day = load_day(&pool, &user, &path).await?;
    let ctx = PageContext::build(&session, &user, "/calendar");
    let tmpl = CalendarDayTemplate {
        ctx,
        heading: day.date.format("%A, %-d %B %Y").to_string(),
        prev_link: day_link(day.date.checked_sub_signed(Duration::days(1))),
        next_link: day_link(day.date.checked_add_signed(Duration::days(1))),
        month_link: format!("/calendar/month/{}/{}", day.date.year(), day.date.month()),
        day,
    };
    render(tmpl)
}

pub async fn month(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    month_page(&pool, &session, &user, year, month).await
}

async fn month_page(
    pool: &PgPool,
    session: &Session,
    user: &CurrentUser,
    year: i32,
    month: u32,
) -> Result<HttpResponse, AppError> {
    let data = load_month(pool, user, year, month).await?;
    let ((py, pm), (ny, nm)) = adjacent_months(year, month);
    let heading = NaiveDate::from_ymd_opt(year, month, 1)
        .map(|d| d.format("%B %Y").to_string())
        .unwrap_or_default();
    let ctx = PageContext::build(session, user, "/calendar");
    render(CalendarMonthTemplate {
        ctx,
        month: data,
        heading,
        prev_link: format!("/calendar/month/{py}/{pm}"),
        next_link: format!("/calendar/month/{ny}/{nm}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn adjacent_months_wrap_years() {
        assert_eq!(adjacent_months(2026, 1), ((2025, 12), (2026, 2)));
        assert_eq!(adjacent_months(2026, 12), ((2026, 11), (2027, 1)));
    }

    #[test]
    fn unparsable_date_is_not_found() {
        assert!(matches!(parse_date("2026-13-01"), Err(AppError::NotFound)));
        assert!(parse_date("2026-02-28").is_ok());
    }

    #[test]
    fn dates_outside_storage_range_are_not_found() {
        for raw in ["-262143-01-01", "0000-12-31", "+262142-12-31"] {
            assert!(matches!(parse_date(raw), Err(AppError::NotFound)), "{raw}");
        }
        assert!(parse_date("0001-01-01").is_ok());
        assert!(parse_date("9999-12-31").is_ok());
    }

    #[test]
    fn day_links_survive_the_edges_of_the_range() {
        let first = parse_date("0001-01-01").unwrap();
        let last = parse_date("9999-12-31").unwrap();
        assert_eq!(day_link(first.checked_add_signed(Duration::days(1))), "/calendar/day/0001-01-02");
        assert_eq!(day_link(first.checked_sub_signed(Duration::days(1))), "");
        assert_eq!(day_link(last.checked_add_signed(Duration::days(1))), "");
        assert_eq!(day_link(NaiveDate::MIN.checked_sub_signed(Duration::days(1))), "");
    }
}
