pub mod api_v1;
pub mod auth_handlers;
pub mod calendar_handlers;
pub mod dashboard;
pub mod evaluation_handlers;
pub mod forms;
pub mod meeting_handlers;
pub mod task_handlers;
pub mod team_handlers;
pub mod user_handlers;

use actix_web::{HttpResponse, middleware::from_fn, web};

use crate::auth::middleware::require_auth;
use crate::errors::AppError;

async fn not_found() -> Result<HttpResponse, AppError> {
    Err(AppError::NotFound)
}

/// All application routes. Shared state (`PgPool`, `JwtConfig`,
/// `RateLimiter`) and the session middleware are supplied by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // JSON API: bearer-token authenticated per handler
        .service(web::scope("/api/v1").configure(api_v1::configure))
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/", web::get().to(|| async { forms::see_other("/dashboard") }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(from_fn(require_auth))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/logout", web::post().to(auth_handlers::logout))
                // Users: administration of existing accounts
                .route("/users", web::get().to(user_handlers::list))
                .route("/users/{id}/edit", web::get().to(user_handlers::edit_form))
                .route("/users/{id}", web::post().to(user_handlers::update))
                .route("/users/{id}/delete", web::post().to(user_handlers::delete))
                // Teams: /teams/new BEFORE /teams/{id}
                .route("/teams", web::get().to(team_handlers::list))
                .route("/teams/new", web::get().to(team_handlers::new_form))
                .route("/teams", web::post().to(team_handlers::create))
                .route("/teams/{id}", web::get().to(team_handlers::detail))
                .route("/teams/{id}/edit", web::get().to(team_handlers::edit_form))
                .route("/teams/{id}", web::post().to(team_handlers::update))
                .route("/teams/{id}/delete", web::post().to(team_handlers::delete))
                .route("/teams/{id}/members", web::post().to(team_handlers::add_member))
                .route("/teams/{id}/members/{user_id}/remove", web::post().to(team_handlers::remove_member))
                // Tasks and comments
                .route("/tasks", web::get().to(task_handlers::list))
                .route("/tasks/new", web::get().to(task_handlers::new_form))
                .route("/tasks", web::post().to(task_handlers::create))
                .route("/tasks/{id}", web::get().to(task_handlers::detail))
                .route("/tasks/{id}/edit", web::get().to(task_handlers::edit_form))
                .route("/tasks/{id}", web::post().to(task_handlers::update))
                .route("/tasks/{id}/delete", web::post().to(task_handlers::delete))
                .route("/tasks/{id}/comments", web::post().to(task_handlers::add_comment))
                // Meetings
                .route("/meetings", web::get().to(meeting_handlers::list))
                .route("/meetings/new", web::get().to(meeting_handlers::new_form))
                .route("/meetings", web::post().to(meeting_handlers::create))
                .route("/meetings/{id}/edit", web::get().to(meeting_handlers::edit_form))
                .route("/meetings/{id}", web::post().to(meeting_handlers::update))
                .route("/meetings/{id}/delete", web::post().to(meeting_handlers::delete))
                // Evaluations
                .route("/evaluations", web::get().to(evaluation_handlers::list))
                .route("/evaluations/new", web::get().to(evaluation_handlers::new_form))
                .route("/evaluations", web::post().to(evaluation_handlers::create))
                .route("/evaluations/{id}/edit", web::get().to(evaluation_handlers::edit_form))
                .route("/evaluations/{id}", web::post().to(evaluation_handlers::update))
                .route("/evaluations/{id}/delete", web::post().to(evaluation_handlers::delete))
                // Calendar
                .route("/calendar", web::get().to(calendar_handlers::index))
                .route("/calendar/day/{date}", web::get().to(calendar_handlers::day))
                .route("/calendar/month/{year}/{month}", web::get().to(calendar_handlers::month))
                .default_service(web::to(not_found)),
        );
}
