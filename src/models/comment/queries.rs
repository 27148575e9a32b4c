use sqlx::{PgConnection, PgPool};

use super::types::TaskComment;

pub const MAX_COMMENT_LEN: usize = 2000;

/// Insert a comment on an open connection (used inside task creation).
pub async fn insert(conn: &mut PgConnection, task_id: i64, author_id: i64, content: &str) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "INSERT INTO task_comments (content, task_id, author_id) VALUES ($1, $2, $3) RETURNING id",
    )
    .bind(content.trim())
    .bind(task_id)
    .bind(author_id)
    .fetch_one(conn)
    .await
}

pub async fn create(pool: &PgPool, task_id: i64, author_id: i64, content: &str) -> Result<i64, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    insert(&mut conn, task_id, author_id, content).await
}

/// Comments on a task, oldest first.
pub async fn find_for_task(pool: &PgPool, task_id: i64) -> Result<Vec<TaskComment>, sqlx::Error> {
    sqlx::query_as::<_, TaskComment>(
        "SELECT c.id, c.content, c.created_at, c.task_id, c.author_id, u.name AS author_name \
         FROM task_comments c \
         JOIN users u ON u.id = c.author_id \
         WHERE c.task_id = $1 \
         ORDER BY c.created_at, c.id",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await
}
