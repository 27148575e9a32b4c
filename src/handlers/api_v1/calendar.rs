use actix_web::{HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::errors::AppError;
use crate::handlers::calendar_handlers::{load_day, load_month};

/// GET /api/v1/calendar/day/{YYYY-MM-DD}
pub async fn day(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<String>,
) -> Result<HttpResponse, AppError> {
    let day = load_day(&pool, &user, &path).await?;
    Ok(HttpResponse::Ok().json(day))
}

/// GET /api/v1/calendar/month/{year}/{month}: days ascending, empty days omitted.
pub async fn month(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    path: web::Path<(i32, u32)>,
) -> Result<HttpResponse, AppError> {
    let (year, month) = path.into_inner();
    let data = load_month(&pool, &user, year, month).await?;
    Ok(HttpResponse::Ok().json(data))
}
