use chrono::NaiveDateTime;
use sqlx::PgPool;

use crate::models::membership::{self, Membership};
use super::types::*;

const SELECT_MEETING_LIST: &str = "\
    SELECT m.id, m.title, m.scheduled_at, \
           COALESCE(( \
               SELECT STRING_AGG(u.name, ', ' ORDER BY u.name) \
               FROM meeting_participants mp JOIN users u ON u.id = mp.user_id \
               WHERE mp.meeting_id = m.id \
           ), '') AS participant_names, \
           (SELECT COUNT(*) FROM meeting_participants mp WHERE mp.meeting_id = m.id) AS participant_count \
    FROM meetings m";

pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Meeting>, sqlx::Error> {
    sqlx::query_as::<_, Meeting>("SELECT id, title, scheduled_at, created_at FROM meetings WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// All meetings, soonest first.
pub async fn find_all(pool: &PgPool) -> Result<Vec<MeetingListItem>, sqlx::Error> {
    sqlx::query_as::<_, MeetingListItem>(&format!("{SELECT_MEETING_LIST} ORDER BY m.scheduled_at, m.id"))
        .fetch_all(pool)
        .await
}

/// Meetings the user participates in, soonest first.
pub async fn find_for_participant(pool: &PgPool, user_id: i64) -> Result<Vec<MeetingListItem>, sqlx::Error> {
    sqlx::query_as::<_, MeetingListItem>(&format!(
        "{SELECT_MEETING_LIST} \
         WHERE EXISTS (SELECT 1 FROM meeting_participants mp WHERE mp.meeting_id = m.id AND mp.user_id = $1) \
         ORDER BY m.scheduled_at, m.id"
    ))
    .bind(user_id)
    .fetch_all(pool)
    .await
}

pub async fn participant_ids(pool: &PgPool, meeting_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    membership::member_ids(pool, Membership::MeetingParticipants, meeting_id).await
}

/// Insert a meeting with its participants. Callers run the availability
/// check first.
pub async fn create(pool: &PgPool, input: &MeetingInput) -> Result<i64, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let id: i64 = sqlx::query_scalar("INSERT INTO meetings (title, scheduled_at) VALUES ($1, $2) RETURNING id")
        .bind(input.title.trim())
        .bind(input.scheduled_at)
        .fetch_one(&mut *tx)
        .await?;
    membership::replace(&mut *tx, Membership::MeetingParticipants, id, &input.participant_ids).await?;
    tx.commit().await?;
    Ok(id)
}

/// Overwrite title/time and replace participants. Returns false if missing.
pub async fn update(pool: &PgPool, id: i64, input: &MeetingInput) -> Result<bool, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let result = sqlx::query("UPDATE meetings SET title = $1, scheduled_at = $2 WHERE id = $3")
        .bind(input.title.trim())
        .bind(input.scheduled_at)
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Ok(false);
    }
    membership::replace(&mut *tx, Membership::MeetingParticipants, id, &input.participant_ids).await?;
    tx.commit().await?;
    Ok(true)
}

pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM meetings WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Count of the user's meetings at or after `now`.
pub async fn count_upcoming_for_participant(
    pool: &PgPool,
    user_id: i64,
    now: NaiveDateTime,
) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar(
        "SELECT COUNT(*) FROM meetings m \
         JOIN meeting_participants mp ON mp.meeting_id = m.id \
         WHERE mp.user_id = $1 AND m.scheduled_at >= $2",
    )
    .bind(user_id)
    .bind(now)
    .fetch_one(pool)
    .await
}
