use sqlx::PgPool;

use crate::models::membership::{self, Membership};
use super::types::*;

pub async fn find_all(pool: &PgPool) -> Result<Vec<TeamListItem>, sqlx::Error> {
    sqlx::query_as::<_, TeamListItem>(
        "SELECT t.id, t.title, t.manager_id, m.name AS manager_name, \
                (SELECT COUNT(*) FROM team_members tm WHERE tm.team_id = t.id) AS member_count, \
                t.created_at \
         FROM teams t \
         LEFT JOIN users m ON m.id = t.manager_id \
         ORDER BY t.title, t.id",
    )
    .fetch_all(pool)
    .await
}

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Team>, sqlx::Error> {
    sqlx::query_as::<_, Team>("SELECT id, title, manager_id, created_at FROM teams WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Create a team with its manager and initial members in one transaction.
pub async fn create(pool: &PgPool, input: &TeamInput) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar("INSERT INTO teams (title, manager_id) VALUES ($1, $2) RETURNING id")
        .bind(input.title.trim())
        .bind(input.manager_id)
        .fetch_one(&mut *tx)
        .await?;
    membership::replace(&mut *tx, Membership::TeamMembers, id, &input.member_ids).await?;
    tx.commit().await?;
    Ok(id)
}

/// Update title/manager and replace the member set. Returns false if missing.
pub async fn update(pool: &PgPool, id: i64, input: &TeamInput) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE teams SET title = $1, manager_id = $2 WHERE id = $3")
        .bind(input.title.trim())
        .bind(input.manager_id)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }
    membership::replace(&mut *tx, Membership::TeamMembers, id, &input.member_ids).await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM teams WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Ids of every user belonging to a team managed by `manager_id`.
pub async fn managed_member_ids(pool: &PgPool, manager_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT DISTINCT tm.user_id FROM team_members tm \
         JOIN teams t ON t.id = tm.team_id \
         WHERE t.manager_id = $1 \
         ORDER BY tm.user_id",
    )
    .bind(manager_id)
    .fetch_all(pool)
    .await
}
