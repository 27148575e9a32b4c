use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::{evaluation, meeting, task};

/// Per-user counters shown on the dashboard.
#[derive(Debug, Clone, Default)]
pub struct DashboardSummary {
    /// Tasks the user participates in that are not done.
    pub open_tasks: i64,
    /// The user's meetings at or after now.
    pub upcoming_meetings: i64,
    /// Mean evaluation score, formatted to one decimal.
    pub average_score: Option<String>,
}

pub async fn summary(pool: &PgPool, user_id: i64, now: NaiveDateTime) -> Result<DashboardSummary, sqlx::Error> {
    let open_tasks = task::count_open_for_participant(pool, user_id).await?;
    let upcoming_meetings = meeting::count_upcoming_for_participant(pool, user_id, now).await?;
    let average_score = evaluation::average_for_subject(pool, user_id)
        .await?
        .map(|avg| format!("{avg:.1}"));
    Ok(DashboardSummary { open_tasks, upcoming_meetings, average_score })
}
