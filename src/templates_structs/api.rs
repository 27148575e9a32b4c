use serde::{Deserialize, Serialize};

use crate::models::user::{Role, UserDisplay};

/// User response for the API (no password hash).
#[derive(Serialize, Debug, Clone)]
pub struct ApiUserResponse {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl From<UserDisplay> for ApiUserResponse {
    fn from(u: UserDisplay) -> Self {
        ApiUserResponse { id: u.id, name: u.name, email: u.email, role: u.role }
    }
}

/// JSON body of `POST /api/v1/users/register`.
#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub role: Option<String>,
}

/// Form body of `POST /api/v1/users/token` (`username` carries the email).
#[derive(Deserialize, Debug)]
pub struct TokenRequest {
    pub username: String,
    pub password: String,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self { access_token, token_type: "bearer".to_string() }
    }
}

#[derive(Serialize, Debug)]
pub struct ApiErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}
