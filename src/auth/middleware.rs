use actix_session::SessionExt;
use actix_web::{
    Error, HttpResponse,
    body::MessageBody,
    dev::{ServiceRequest, ServiceResponse},
    http::header,
    middleware::Next,
};

/// Gate for the HTML pages: requests without a session user or a bearer
/// header are redirected to /login. The token itself is validated when the
/// handler extracts `CurrentUser`.
pub async fn require_auth(
    req: ServiceRequest,
    next: Next<impl MessageBody + 'static>,
) -> Result<ServiceResponse<impl MessageBody>, Error> {
    let has_bearer = req.headers().contains_key(header::AUTHORIZATION);
    let has_user = req.get_session().get::<i64>("user_id").unwrap_or(None).is_some();

    if !has_user && !has_bearer {
        let response = HttpResponse::SeeOther()
            .insert_header((header::LOCATION, "/login"))
            .finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(|res| res.map_into_left_body())
}
