use std::net::{IpAddr, Ipv4Addr};

use actix_session::Session;
use actix_web::{HttpRequest, HttpResponse, http::StatusCode, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::{csrf, password, rate_limit::RateLimiter, session};
use crate::errors::{AppError, render, render_with_status};
use crate::handlers::forms::see_other;
use crate::models::user::{self, User};
use crate::templates_structs::{APP_NAME, LoginTemplate};

#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub csrf_token: String,
}

#[derive(Deserialize)]
pub struct CsrfOnly {
    #[serde(default)]
    pub csrf_token: String,
}

pub const BAD_CREDENTIALS: &str = "Incorrect email or password";
const TOO_MANY_ATTEMPTS: &str = "Too many failed login attempts. Please try again later.";

pub fn client_ip(req: &HttpRequest) -> IpAddr {
    req.peer_addr()
        .map(|addr| addr.ip())
        .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED))
}

/// Look up `email` and verify `plain`. Failures are counted against `ip`.
pub async fn authenticate(
    pool: &PgPool,
    limiter: &RateLimiter,
    ip: IpAddr,
    email: &str,
    plain: &str,
) -> Result<Option<User>, AppError> {
    let found = user::find_by_email(pool, email).await?;
    match found {
        Some(u) if password::verify_password(plain, &u.password_hash) => {
            limiter.clear(ip);
            Ok(Some(u))
        }
        _ => {
            limiter.record_failure(ip);
            log::warn!("Failed login for '{}' from {ip}", email.trim());
            Ok(None)
        }
    }
}

fn login_template(session: &Session, email: &str, error: Option<&str>) -> LoginTemplate {
    LoginTemplate {
        error: error.map(str::to_string),
        app_name: APP_NAME.to_string(),
        csrf_token: csrf::get_or_create_token(session),
        email: email.to_string(),
    }
}

pub async fn login_page(session: Session) -> Result<HttpResponse, AppError> {
    if session::get_user_id(&session).is_some() {
        return Ok(see_other("/dashboard"));
    }
    render(login_template(&session, "", None))
}

pub async fn login_submit(
    req: HttpRequest,
    pool: web::Data<PgPool>,
    session: Session,
    form: web::Form<LoginForm>,
    limiter: web::Data<RateLimiter>,
) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;

    // Rate-limit check before any database access
    let ip = client_ip(&req);
    if limiter.is_blocked(ip) {
        let tmpl = login_template(&session, &form.email, Some(TOO_MANY_ATTEMPTS));
        return render_with_status(tmpl, StatusCode::TOO_MANY_REQUESTS);
    }

    match authenticate(&pool, &limiter, ip, &form.email, &form.password).await? {
        Some(u) => {
            session::log_in(&session, &u)?;
            log::info!("User {} logged in", u.id);
            Ok(see_other("/dashboard"))
        }
        None => {
            let tmpl = login_template(&session, &form.email, Some(BAD_CREDENTIALS));
            render_with_status(tmpl, StatusCode::UNAUTHORIZED)
        }
    }
}

pub async fn logout(session: Session, form: web::Form<CsrfOnly>) -> Result<HttpResponse, AppError> {
    csrf::validate_csrf(&session, &form.csrf_token)?;
    session::log_out(&session);
    Ok(see_other("/login"))
}
