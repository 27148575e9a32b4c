use actix_web::{HttpRequest, HttpResponse, web};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::auth::rate_limit::RateLimiter;
use crate::auth::{jwt, password, validate};
use crate::config::JwtConfig;
use crate::errors::{AppError, is_unique_violation};
use crate::handlers::auth_handlers::{BAD_CREDENTIALS, authenticate, client_ip};
use crate::models::user::{self, NewUser, Role, UserDisplay};
use crate::templates_structs::{
    ApiErrorResponse, ApiUserResponse, RegisterRequest, TokenRequest, TokenResponse,
};

pub const DUPLICATE_EMAIL: &str = "Email already registered";

fn bad_request(error: &str, details: Option<String>) -> HttpResponse {
    HttpResponse::BadRequest().json(ApiErrorResponse { error: error.to_string(), details })
}

fn unauthorized(error: &str) -> HttpResponse {
    HttpResponse::Unauthorized()
        .insert_header(("WWW-Authenticate", "Bearer"))
        .json(ApiErrorResponse { error: error.to_string(), details: None })
}

/// POST /api/v1/users/register
///
/// Open registration creates `user` accounts. Requesting `manager` or
/// `admin` requires the caller to be an authenticated admin.
pub async fn register(
    pool: web::Data<PgPool>,
    caller: Option<CurrentUser>,
    body: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_name(&body.name));
    errors.extend(validate::validate_email(&body.email));
    errors.extend(validate::validate_password(&body.password));
    let role = match body.role.as_deref() {
        None | Some("") => Some(Role::User),
        Some(raw) => Role::parse(raw),
    };
    if role.is_none() {
        errors.push("Role must be one of user, manager, admin".to_string());
    }
    if !errors.is_empty() {
        return Ok(bad_request("Validation failed", Some(errors.join("; "))));
    }
    let role = role.unwrap_or(Role::User);

    if role != Role::User && !caller.as_ref().is_some_and(|c| c.role() == Role::Admin) {
        return Err(AppError::PermissionDenied("Only admins can create manager or admin accounts".to_string()));
    }

    if user::find_by_email(&pool, &body.email).await?.is_some() {
        return Ok(bad_request(DUPLICATE_EMAIL, None));
    }

    let new = NewUser {
        name: body.name.trim().to_string(),
        email: body.email.clone(),
        password_hash: password::hash_password(&body.password)?,
        role,
    };
    let id = match user::create(&pool, &new).await {
        Ok(id) => id,
        // Lost a race with a concurrent registration
        Err(e) if is_unique_violation(&e) => return Ok(bad_request(DUPLICATE_EMAIL, None)),
        Err(e) => return Err(e.into()),
    };
    log::info!("user {} registered with role {}", id, role);

    let created = user::find_display_by_id(&pool, id).await?.ok_or(AppError::NotFound)?;
    Ok(HttpResponse::Created().json(ApiUserResponse::from(created)))
}

/// POST /api/v1/users/token: exchange email + password for a bearer token.
pub async fn token(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    config: web::Data<JwtConfig>,
    limiter: web::Data<RateLimiter>,
    form: web::Form<TokenRequest>,
) -> Result<HttpResponse, AppError> {
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        return Ok(HttpResponse::TooManyRequests().json(ApiErrorResponse {
            error: "Too many failed login attempts".to_string(),
            details: None,
        }));
    }

    let Some(found) = authenticate(&pool, &limiter, ip, &form.username, &form.password).await? else {
        return Ok(unauthorized(BAD_CREDENTIALS));
    };

    let access_token = jwt::issue_for(&found, &config)?;
    log::info!("issued token for user {}", found.id);
    Ok(HttpResponse::Ok().json(TokenResponse::bearer(access_token)))
}

/// GET /api/v1/users/me
pub async fn me(user: CurrentUser) -> Result<HttpResponse, AppError> {
    Ok(HttpResponse::Ok().json(ApiUserResponse::from(UserDisplay::from(user.user))))
}
