use std::env;

use jsonwebtoken::Algorithm;
use rand::Rng;

/// Runtime configuration, read once at start-up from the environment
/// (after `.env` has been loaded by `dotenvy`).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub bind_addr: String,
    /// Cookie-session key material; `None` means a random key per process.
    pub session_key: Option<String>,
    pub jwt: JwtConfig,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

/// Settings for the bearer tokens issued by `/api/v1/users/token`.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub algorithm: Algorithm,
    pub expire_minutes: i64,
}

impl JwtConfig {
    /// Config with a fixed secret and the default HS256 / 30 minute lifetime.
    pub fn with_secret(secret: &str) -> Self {
        Self {
            secret: secret.to_string(),
            algorithm: Algorithm::HS256,
            expire_minutes: DEFAULT_TOKEN_MINUTES,
        }
    }
}

pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";
pub const DEFAULT_TOKEN_MINUTES: i64 = 30;

impl AppConfig {
    pub fn from_env() -> Result<Self, String> {
        let database_url = match env::var("DATABASE_URL") {
            Ok(url) if !url.is_empty() => url,
            _ => database_url_from_parts()?,
        };

        let secret = match non_empty("SECRET_KEY") {
            Some(s) => s,
            None => {
                log::warn!("No SECRET_KEY set, generating a random JWT secret (tokens are lost on restart)");
                random_secret()
            }
        };

        let algorithm = match non_empty("ALGORITHM") {
            Some(name) => parse_algorithm(&name)?,
            None => Algorithm::HS256,
        };

        let expire_minutes = match non_empty("ACCESS_TOKEN_EXPIRE_MINUTES") {
            Some(raw) => raw
                .parse::<i64>()
                .ok()
                .filter(|m| *m > 0)
                .ok_or_else(|| format!("ACCESS_TOKEN_EXPIRE_MINUTES must be a positive integer, got '{raw}'"))?,
            None => DEFAULT_TOKEN_MINUTES,
        };

        Ok(Self {
            database_url,
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            session_key: non_empty("SESSION_KEY"),
            jwt: JwtConfig { secret, algorithm, expire_minutes },
            admin_email: non_empty("ADMIN_EMAIL"),
            admin_password: non_empty("ADMIN_PASSWORD"),
        })
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Assemble a Postgres URL from the `DB_*` variables.
fn database_url_from_parts() -> Result<String, String> {
    let user = non_empty("DB_USER").ok_or("DATABASE_URL or DB_USER must be set")?;
    let password = non_empty("DB_PASSWORD").unwrap_or_default();
    let host = non_empty("DB_HOST").unwrap_or_else(|| "localhost".to_string());
    let port = non_empty("DB_PORT").unwrap_or_else(|| "5432".to_string());
    let name = non_empty("DB_NAME").ok_or("DATABASE_URL or DB_NAME must be set")?;
    Ok(format!("postgres://{user}:{password}@{host}:{port}/{name}"))
}

pub fn parse_algorithm(name: &str) -> Result<Algorithm, String> {
    match name.trim().to_uppercase().as_str() {
        "HS256" => Ok(Algorithm::HS256),
        "HS384" => Ok(Algorithm::HS384),
        "HS512" => Ok(Algorithm::HS512),
        other => Err(format!("Unsupported token algorithm '{other}' (use HS256, HS384 or HS512)")),
    }
}

fn random_secret() -> String {
    let bytes: [u8; 32] = rand::rng().random();
    hex::encode(bytes)
}
