pub mod calendar;
pub mod users;

use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::{Method, header},
    middleware::{Next, from_fn},
    web,
};

use crate::templates_structs::ApiErrorResponse;

/// CSRF protection for JSON mutation endpoints.
///
/// Browsers cannot send cross-origin JSON with cookies via a simple form
/// POST, so requiring `Content-Type: application/json` stands in for a token.
async fn require_json_content_type(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    if matches!(*req.method(), Method::POST | Method::PUT | Method::DELETE) {
        let content_type = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");

        if !content_type.starts_with("application/json") {
            let response = HttpResponse::BadRequest().json(ApiErrorResponse {
                error: "Content-Type must be application/json".to_string(),
                details: None,
            });
            return Ok(req.into_response(response).map_into_right_body());
        }
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}

/// Configure API v1 routes (mounted under `/api/v1`).
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/users/register")
            .wrap(from_fn(require_json_content_type))
            .route(web::post().to(users::register)),
    )
    // OAuth2-style password grant: form-encoded, not JSON
    .route("/users/token", web::post().to(users::token))
    .route("/users/me", web::get().to(users::me))
    .route("/calendar/day/{date}", web::get().to(calendar::day))
    .route("/calendar/month/{year}/{month}", web::get().to(calendar::month));
}
