use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Open,
    InProgress,
    Done,
}

impl TaskStatus {
    pub const ALL: [TaskStatus; 3] = [TaskStatus::Open, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Open => "open",
            TaskStatus::InProgress => "in_progress",
            TaskStatus::Done => "done",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskStatus::Open => "Open",
            TaskStatus::InProgress => "In progress",
            TaskStatus::Done => "Done",
        }
    }

    pub fn parse(s: &str) -> Option<TaskStatus> {
        match s.trim() {
            "open" => Some(TaskStatus::Open),
            "in_progress" => Some(TaskStatus::InProgress),
            "done" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// For the task list page: participants pre-joined as a display string.
#[derive(Debug, Clone, Serialize)]
pub struct TaskListItem {
    pub id: i64,
    pub title: String,
    pub status: TaskStatus,
    pub deadline: NaiveDateTime,
    pub participant_names: String,
    pub comment_count: i64,
}

/// Validated input for create and edit.
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub description: String,
    pub status: TaskStatus,
    pub deadline: NaiveDateTime,
    pub participant_ids: Vec<i64>,
}

#[derive(sqlx::FromRow)]
pub(crate) struct TaskRow {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub status: String,
    pub deadline: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            status: TaskStatus::parse(&row.status).unwrap_or(TaskStatus::Open),
            deadline: row.deadline,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct TaskListRow {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub deadline: NaiveDateTime,
    pub participant_names: String,
    pub comment_count: i64,
}

impl From<TaskListRow> for TaskListItem {
    fn from(row: TaskListRow) -> Self {
        TaskListItem {
            id: row.id,
            title: row.title,
            status: TaskStatus::parse(&row.status).unwrap_or(TaskStatus::Open),
            deadline: row.deadline,
            participant_names: row.participant_names,
            comment_count: row.comment_count,
        }
    }
}
