//! Scheduling-conflict check for meetings.
//!
//! A conflict is an existing meeting at exactly the same timestamp that
//! shares at least one participant. The check is advisory: it runs before
//! create/edit and is not enforced transactionally.

use chrono::NaiveDateTime;
use sqlx::PgPool;

use super::types::MeetingConflict;

/// Find the first meeting at `scheduled_at` that shares a participant with
/// `participant_ids`.
///
/// `exclude_meeting_id` is the meeting being edited; it is never reported
/// as conflicting with itself.
pub async fn find_conflict(
    pool: &PgPool,
    scheduled_at: NaiveDateTime,
    participant_ids: &[i64],
    exclude_meeting_id: Option<i64>,
) -> Result<Option<MeetingConflict>, sqlx::Error> {
    if participant_ids.is_empty() {
        return Ok(None);
    }
    sqlx::query_as::<_, MeetingConflict>(
        "SELECT m.id AS meeting_id, m.title AS meeting_title, m.scheduled_at, \
                u.id AS user_id, u.name AS user_name \
         FROM meetings m \
         JOIN meeting_participants mp ON mp.meeting_id = m.id \
         JOIN users u ON u.id = mp.user_id \
         WHERE m.scheduled_at = $1 \
           AND mp.user_id = ANY($2) \
           AND ($3::BIGINT IS NULL OR m.id <> $3) \
         ORDER BY m.id, u.id \
         LIMIT 1",
    )
    .bind(scheduled_at)
    .bind(participant_ids)
    .bind(exclude_meeting_id)
    .fetch_optional(pool)
    .await
}

/// `Ok(())` when every participant is free at `scheduled_at`, otherwise the
/// conflict's user-facing message.
pub async fn ensure_available(
    pool: &PgPool,
    scheduled_at: NaiveDateTime,
    participant_ids: &[i64],
    exclude_meeting_id: Option<i64>,
) -> Result<Result<(), String>, sqlx::Error> {
    let conflict = find_conflict(pool, scheduled_at, participant_ids, exclude_meeting_id).await?;
    Ok(match conflict {
        Some(c) => Err(c.message()),
        None => Ok(()),
    })
}
