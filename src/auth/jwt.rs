//! Bearer tokens for the JSON API.
//!
//! Claims carry the user's email as `sub` together with `id` and `role`, so
//! a token identifies its user without a session. The user is still loaded
//! from the database on every request (see `identity`).

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::errors::AppError;
use crate::models::user::{Role, User};

pub const EXPIRED_MESSAGE: &str = "Token has expired";
pub const INVALID_MESSAGE: &str = "Could not validate credentials";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User email.
    pub sub: String,
    pub id: i64,
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn for_user(user: &User, lifetime: Duration) -> Self {
        let now = Utc::now();
        Self {
            sub: user.email.clone(),
            id: user.id,
            role: user.role,
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
        }
    }
}

/// Sign claims with the configured secret and algorithm.
pub fn create_token(claims: &Claims, config: &JwtConfig) -> Result<String, AppError> {
    encode(
        &Header::new(config.algorithm),
        claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
    .map_err(|e| AppError::Token(format!("Token encoding failed: {e}")))
}

/// Issue an access token for `user` with the configured lifetime.
pub fn issue_for(user: &User, config: &JwtConfig) -> Result<String, AppError> {
    let claims = Claims::for_user(user, Duration::minutes(config.expire_minutes));
    create_token(&claims, config)
}

/// Verify signature and expiry. An expired token maps to
/// [`EXPIRED_MESSAGE`]; anything else to [`INVALID_MESSAGE`].
pub fn validate_token(token: &str, config: &JwtConfig) -> Result<Claims, AppError> {
    let mut validation = Validation::new(config.algorithm);
    validation.leeway = 0;
    validation.set_required_spec_claims(&["exp", "sub"]);

    decode::<Claims>(token, &DecodingKey::from_secret(config.secret.as_bytes()), &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AppError::Token(EXPIRED_MESSAGE.to_string()),
            _ => {
                log::debug!("Rejected bearer token: {e}");
                AppError::Token(INVALID_MESSAGE.to_string())
            }
        })
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header_value: &str) -> Option<&str> {
    let (scheme, token) = header_value.trim().split_once(' ')?;
    if scheme.eq_ignore_ascii_case("bearer") && !token.trim().is_empty() {
        Some(token.trim())
    } else {
        None
    }
}
