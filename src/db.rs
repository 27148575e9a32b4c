use std::time::Duration;

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::auth::password;
use crate::errors::AppError;
use crate::models::user::{self, NewUser, Role};

pub async fn init_pool(database_url: &str) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(8)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    log::info!("Database migrations complete");
    Ok(())
}

/// Create an admin account from `ADMIN_EMAIL`/`ADMIN_PASSWORD` unless an
/// admin already exists. Returns the new user's id when one was created.
pub async fn seed_admin(pool: &PgPool, email: &str, plain_password: &str) -> Result<Option<i64>, AppError> {
    if user::count_with_role(pool, Role::Admin).await? > 0 {
        return Ok(None);
    }
    if let Some(existing) = user::find_by_email(pool, email).await? {
        log::warn!("ADMIN_EMAIL {email} belongs to a non-admin user (#{}), promoting", existing.id);
        user::update(pool, existing.id, &existing.name, Role::Admin).await?;
        return Ok(Some(existing.id));
    }
    let new = NewUser {
        name: "Administrator".to_string(),
        email: email.to_string(),
        password_hash: password::hash_password(plain_password)?,
        role: Role::Admin,
    };
    let id = user::create(pool, &new).await?;
    log::info!("Seeded admin account {email} (#{id})");
    Ok(Some(id))
}
