use sqlx::PgPool;

use crate::models::comment;
use crate::models::membership::{self, Membership};
use super::types::*;

const SELECT_TASK_LIST: &str = "\
    SELECT t.id, t.title, t.status, t.deadline, \
           COALESCE(( \
               SELECT STRING_AGG(u.name, ', ' ORDER BY u.name) \
               FROM task_participants tp JOIN users u ON u.id = tp.user_id \
               WHERE tp.task_id = t.id \
           ), '') AS participant_names, \
           (SELECT COUNT(*) FROM task_comments c WHERE c.task_id = t.id) AS comment_count \
    FROM tasks t";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(
        "SELECT id, title, description, status, deadline, created_at FROM tasks WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(Task::from))
}

/// All tasks, nearest deadline first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<TaskListItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskListRow>(&format!("{SELECT_TASK_LIST} ORDER BY t.deadline, t.id"))
        .fetch_all(pool)
        .await?;
    Ok(rows.into_iter().map(TaskListItem::from).collect())
}

/// Tasks the user participates in, nearest deadline first.
pub async fn find_for_participant(pool: &PgPool, user_id: i64) -> Result<Vec<TaskListItem>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskListRow>(&format!(
        "{SELECT_TASK_LIST} \
         WHERE EXISTS (SELECT 1 FROM task_participants tp WHERE tp.task_id = t.id AND tp.user_id = $1) \
         ORDER BY t.deadline, t.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(TaskListItem::from).collect())
}

/// Tasks with the given status, for the evaluation task picker.
pub async fn find_by_status(pool: &PgPool, status: TaskStatus) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(
        "SELECT id, title, description, status, deadline, created_at FROM tasks \
         WHERE status = $1 ORDER BY deadline DESC, id",
    )
    .bind(status.as_str())
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(Task::from).collect())
}

pub async fn participant_ids(pool: &PgPool, task_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    membership::member_ids(pool, Membership::TaskParticipants, task_id).await
}

/// Create a task, its participant links and an optional first comment
/// (`(author_id, content)`) in one transaction.
pub async fn create(
    pool: &PgPool,
    input: &TaskInput,
    first_comment: Option<(i64, &str)>,
) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO tasks (title, description, status, deadline) VALUES ($1, $2, $3, $4) RETURNING id",
    )
    .bind(input.title.trim())
    .bind(input.description.trim())
    .bind(input.status.as_str())
    .bind(input.deadline)
    .fetch_one(&mut *tx)
    .await?;

    membership::replace(&mut *tx, Membership::TaskParticipants, id, &input.participant_ids).await?;

    if let Some((author_id, content)) = first_comment {
        comment::insert(&mut *tx, id, author_id, content).await?;
    }

    tx.commit().await?;
    Ok(id)
}

/// Overwrite the task's fields and replace its participants. Returns false if missing.
pub async fn update(pool: &PgPool, id: i64, input: &TaskInput) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query(
        "UPDATE tasks SET title = $1, description = $2, status = $3, deadline = $4 WHERE id = $5",
    )
    .bind(input.title.trim())
    .bind(input.description.trim())
    .bind(input.status.as_str())
    .bind(input.deadline)
    .bind(id)
    .execute(&mut *tx)
    .await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }
    membership::replace(&mut *tx, Membership::TaskParticipants, id, &input.participant_ids).await?;
    tx.commit().await?;
    Ok(true)
}

/// Delete a task; participants, comments and evaluations cascade.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Count of the user's tasks that are not done yet.
pub async fn count_open_for_participant(pool: &PgPool, user_id: i64) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM tasks t \
         JOIN task_participants tp ON tp.task_id = t.id \
         WHERE tp.user_id = $1 AND t.status <> 'done'",
    )
    .bind(user_id)
    .fetch_one(pool)
    .await
}
