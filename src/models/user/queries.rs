use sqlx::PgPool;

use super::types::{NewUser, Role, User, UserDisplay, UserRow};

const SELECT_USER: &str = "SELECT id, name, email, password_hash, role, created_at FROM users";

/// Normalize an email for storage and lookup (the unique index is on LOWER(email)).
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row.map(User::from))
}

pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
    let row = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE LOWER(email) = $1"))
        .bind(normalize_email(email))
        .fetch_optional(pool)
        .await?;
    Ok(row.map(User::from))
}

pub async fn find_display_by_id(pool: &PgPool, id: i64) -> Result<Option<UserDisplay>, sqlx::Error> {
    Ok(find_by_id(pool, id).await?.map(UserDisplay::from))
}

/// All users ordered by name, for lists and participant pickers.
pub async fn find_all(pool: &PgPool) -> Result<Vec<UserDisplay>, sqlx::Error> {
    let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} ORDER BY name, id"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| UserDisplay::from(User::from(r))).collect())
}

/// Users with the given ids, ordered by name. Unknown ids are skipped.
pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<UserDisplay>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let rows = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ANY($1) ORDER BY name, id"))
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(|r| UserDisplay::from(User::from(r))).collect())
}

/// Return the ids from `ids` that do not belong to any user.
pub async fn missing_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<i64>, sqlx::Error> {
    if ids.is_empty() {
        return Ok(vec![]);
    }
    let existing: Vec<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ANY($1)")
        .bind(ids)
        .fetch_all(pool)
        .await?;
    Ok(ids.iter().copied().filter(|id| !existing.contains(id)).collect())
}

/// Insert a user. A duplicate email surfaces as a unique-violation error.
pub async fn create(pool: &PgPool, new: &NewUser) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO users (name, email, password_hash, role) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(new.name.trim())
    .bind(normalize_email(&new.email))
    .bind(&new.password_hash)
    .bind(new.role.as_str())
    .fetch_one(pool)
    .await
}

/// Update name and role. Returns false if the user does not exist.
pub async fn update(pool: &PgPool, id: i64, name: &str, role: Role) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET name = $1, role = $2 WHERE id = $3")
        .bind(name.trim())
        .bind(role.as_str())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Delete a user; memberships, comments and evaluations cascade.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn count_with_role(pool: &PgPool, role: Role) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE role = $1")
        .bind(role.as_str())
        .fetch_one(pool)
        .await
}
