//! The authenticated caller, resolved per request.
//!
//! A bearer token takes precedence over the session cookie. Either way the
//! user row is reloaded, so role changes and deletions apply immediately.

use std::future::Future;
use std::pin::Pin;

use actix_session::SessionExt;
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use sqlx::PgPool;

use crate::auth::{jwt, policy::Subject, session};
use crate::config::JwtConfig;
use crate::errors::AppError;
use crate::models::user::{self, Role, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    Session,
    Bearer,
}

#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user: User,
    pub method: AuthMethod,
}

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> Role {
        self.user.role
    }

    pub fn subject(&self) -> Subject {
        Subject::new(self.user.id, self.user.role)
    }

    /// Session-authenticated requests must carry a CSRF token.
    pub fn needs_csrf(&self) -> bool {
        self.method == AuthMethod::Session
    }
}

impl FromRequest for CurrentUser {
    type Error = AppError;
    type Future = Pin<Box<dyn Future<Output = Result<Self, Self::Error>>>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let req = req.clone();
        Box::pin(async move { resolve(&req).await })
    }
}

async fn resolve(req: &HttpRequest) -> Result<CurrentUser, AppError> {
    let pool = req
        .app_data::<web::Data<PgPool>>()
        .ok_or_else(|| AppError::Session("Database pool not configured".to_string()))?;

    if let Some(value) = req.headers().get(header::AUTHORIZATION) {
        let raw = value
            .to_str()
            .map_err(|_| AppError::Unauthorized(jwt::INVALID_MESSAGE.to_string()))?;
        let token = jwt::bearer_token(raw)
            .ok_or_else(|| AppError::Unauthorized(jwt::INVALID_MESSAGE.to_string()))?;
        let config = req
            .app_data::<web::Data<JwtConfig>>()
            .ok_or_else(|| AppError::Token("Token settings not configured".to_string()))?;
        let claims = jwt::validate_token(token, config)?;
        let user = user::find_by_id(pool, claims.id)
            .await?
            .filter(|u| u.email == claims.sub)
            .ok_or_else(|| AppError::Unauthorized(jwt::INVALID_MESSAGE.to_string()))?;
        return Ok(CurrentUser { user, method: AuthMethod::Bearer });
    }

    let session = req.get_session();
    let user_id = session::get_user_id(&session)
        .ok_or_else(|| AppError::Unauthorized("Not authenticated".to_string()))?;
    match user::find_by_id(pool, user_id).await? {
        Some(user) => Ok(CurrentUser { user, method: AuthMethod::Session }),
        None => {
            session::log_out(&session);
            Err(AppError::Unauthorized("Not authenticated".to_string()))
        }
    }
}
