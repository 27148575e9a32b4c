//! Shared test infrastructure.
//!
//! Every test gets a fresh Postgres database from `#[sqlx::test]` with
//! `./migrations` applied. HTTP tests build the real route table through
//! [`create_app`] and authenticate either with a bearer token (no CSRF
//! needed) or through the login form.
#![allow(dead_code)]

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use chrono::{NaiveDate, NaiveDateTime};
use regex::Regex;
use sqlx::PgPool;

use bms::auth::rate_limit::RateLimiter;
use bms::auth::{jwt, password};
use bms::config::JwtConfig;
use bms::handlers;
use bms::models::user::{self, NewUser, Role, User};

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const TEST_PASSWORD: &str = "secret123";
pub const TEST_SECRET: &str = "integration-test-secret";

pub fn jwt_config() -> JwtConfig {
    JwtConfig::with_secret(TEST_SECRET)
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Insert a user with [`TEST_PASSWORD`] and return the stored row.
pub async fn create_user(pool: &PgPool, name: &str, email: &str, role: Role) -> User {
    let new = NewUser {
        name: name.to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(TEST_PASSWORD).expect("hash"),
        role,
    };
    let id = user::create(pool, &new).await.expect("create user");
    user::find_by_id(pool, id).await.expect("query").expect("user exists")
}

pub async fn admin(pool: &PgPool) -> User {
    create_user(pool, "Ada Admin", "admin@example.com", Role::Admin).await
}

pub async fn manager(pool: &PgPool) -> User {
    create_user(pool, "Max Manager", "manager@example.com", Role::Manager).await
}

pub async fn employee(pool: &PgPool, name: &str, email: &str) -> User {
    create_user(pool, name, email, Role::User).await
}

/// `Authorization` header value for `user`.
pub fn bearer(user: &User) -> String {
    let token = jwt::issue_for(user, &jwt_config()).expect("issue token");
    format!("Bearer {token}")
}

pub fn at(date: &str, time: &str) -> NaiveDateTime {
    let day = NaiveDate::parse_from_str(date, "%Y-%m-%d").expect("date");
    let (h, m) = time.split_once(':').expect("HH:MM");
    day.and_hms_opt(h.parse().expect("hour"), m.parse().expect("minute"), 0)
        .expect("time")
}

// ============================================================================
// APP
// ============================================================================

pub fn create_app(
    pool: PgPool,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_secure(false)
        .build();

    App::new()
        .wrap(session_mw)
        .app_data(web::Data::new(pool))
        .app_data(web::Data::new(jwt_config()))
        .app_data(web::Data::new(RateLimiter::default()))
        .configure(handlers::configure)
}

// ============================================================================
// HTML HELPERS
// ============================================================================

/// The hidden CSRF token rendered into a page.
pub fn csrf_from(body: &str) -> String {
    let re = Regex::new(r#"name="csrf_token" value="([^"]+)""#).expect("regex");
    re.captures(body)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .expect("page has a csrf token")
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response().cookies().next().map(|c| c.into_owned())
}

/// Form body with repeated keys, as browsers send multi-selects.
pub fn form_body(pairs: &[(&str, &str)]) -> String {
    serde_urlencoded::to_string(pairs).expect("encode form")
}
