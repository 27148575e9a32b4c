//! Explicit join-table operations for the many-to-many user links:
//! team members, task participants and meeting participants.

use sqlx::{PgConnection, PgPool};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Membership {
    TeamMembers,
    TaskParticipants,
    MeetingParticipants,
}

impl Membership {
    fn table(&self) -> &'static str {
        match self {
            Membership::TeamMembers => "team_members",
            Membership::TaskParticipants => "task_participants",
            Membership::MeetingParticipants => "meeting_participants",
        }
    }

    fn owner_column(&self) -> &'static str {
        match self {
            Membership::TeamMembers => "team_id",
            Membership::TaskParticipants => "task_id",
            Membership::MeetingParticipants => "meeting_id",
        }
    }
}

/// Sort and de-duplicate a list of user ids.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut out = ids.to_vec();
    out.sort_unstable();
    out.dedup();
    out
}

/// User ids linked to `owner_id`, ascending.
pub async fn member_ids(pool: &PgPool, kind: Membership, owner_id: i64) -> Result<Vec<i64>, sqlx::Error> {
    let sql = format!(
        "SELECT user_id FROM {} WHERE {} = $1 ORDER BY user_id",
        kind.table(),
        kind.owner_column()
    );
    sqlx::query_scalar::<_, i64>(&sql).bind(owner_id).fetch_all(pool).await
}

/// Replace the full participant set of `owner_id` with `user_ids`.
///
/// Runs on a connection so callers can include it in their transaction.
pub async fn replace(
    conn: &mut PgConnection,
    kind: Membership,
    owner_id: i64,
    user_ids: &[i64],
) -> Result<(), sqlx::Error> {
    let delete_sql = format!("DELETE FROM {} WHERE {} = $1", kind.table(), kind.owner_column());
    sqlx::query(&delete_sql).bind(owner_id).execute(&mut *conn).await?;

    let ids = dedup_ids(user_ids);
    if ids.is_empty() {
        return Ok(());
    }
    let insert_sql = format!(
        "INSERT INTO {} ({}, user_id) SELECT $1, UNNEST($2::BIGINT[]) ON CONFLICT DO NOTHING",
        kind.table(),
        kind.owner_column()
    );
    sqlx::query(&insert_sql)
        .bind(owner_id)
        .bind(&ids)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Link one user. Returns false if the link already existed.
pub async fn add(pool: &PgPool, kind: Membership, owner_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "INSERT INTO {} ({}, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        kind.table(),
        kind.owner_column()
    );
    let result = sqlx::query(&sql).bind(owner_id).bind(user_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

/// Unlink one user. Returns false if there was no such link.
pub async fn remove(pool: &PgPool, kind: Membership, owner_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let sql = format!(
        "DELETE FROM {} WHERE {} = $1 AND user_id = $2",
        kind.table(),
        kind.owner_column()
    );
    let result = sqlx::query(&sql).bind(owner_id).bind(user_id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}
