use chrono::NaiveDateTime;
use serde::Serialize;

/// A task comment with its author's display name.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TaskComment {
    pub id: i64,
    pub content: String,
    pub created_at: NaiveDateTime,
    pub task_id: i64,
    pub author_id: i64,
    pub author_name: String,
}
