use chrono::NaiveDateTime;
use serde::Serialize;

/// For the team list page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct TeamListItem {
    pub id: i64,
    pub title: String,
    pub manager_id: Option<i64>,
    pub manager_name: Option<String>,
    pub member_count: i64,
    pub created_at: NaiveDateTime,
}

/// For team detail/edit.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Team {
    pub id: i64,
    pub title: String,
    pub manager_id: Option<i64>,
    pub created_at: NaiveDateTime,
}

/// Validated input for create and edit.
#[derive(Debug, Clone)]
pub struct TeamInput {
    pub title: String,
    pub manager_id: Option<i64>,
    pub member_ids: Vec<i64>,
}
