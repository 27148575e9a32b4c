use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::errors::{AppError, render};
use crate::models::{calendar, dashboard};
use crate::templates_structs::{DashboardTemplate, PageContext};

fn time_greeting(hour: u32, name: &str) -> String {
    let period = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {name}")
}

pub async fn index(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let ctx = PageContext::build(&session, &user, "/dashboard");
    let now = Local::now().naive_local();

    let greeting = time_greeting(now.hour(), &ctx.username);
    let summary = dashboard::summary(&pool, user.id(), now).await?;
    // Today's agenda is always the caller's own items
    let today = calendar::day(&pool, now.date(), Some(user.id())).await?;

    render(DashboardTemplate { ctx, greeting, summary, today })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_follows_hour() {
        assert_eq!(time_greeting(8, "Ada"), "Good morning, Ada");
        assert_eq!(time_greeting(13, "Ada"), "Good afternoon, Ada");
        assert_eq!(time_greeting(23, "Ada"), "Good evening, Ada");
        assert_eq!(time_greeting(3, "Ada"), "Good evening, Ada");
    }
}
