use chrono::NaiveDateTime;
use serde::Serialize;

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Meeting {
    pub id: i64,
    pub title: String,
    pub scheduled_at: NaiveDateTime,
    pub created_at: NaiveDateTime,
}

/// For the meeting list page.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct MeetingListItem {
    pub id: i64,
    pub title: String,
    pub scheduled_at: NaiveDateTime,
    pub participant_names: String,
    pub participant_count: i64,
}

/// Validated input for create and edit.
#[derive(Debug, Clone)]
pub struct MeetingInput {
    pub title: String,
    pub scheduled_at: NaiveDateTime,
    pub participant_ids: Vec<i64>,
}

/// An existing meeting that would double-book a participant.
#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct MeetingConflict {
    pub meeting_id: i64,
    pub meeting_title: String,
    pub scheduled_at: NaiveDateTime,
    pub user_id: i64,
    pub user_name: String,
}

impl MeetingConflict {
    /// User-facing message naming the conflicting meeting.
    pub fn message(&self) -> String {
        format!(
            "{} already has meeting \"{}\" (#{}) at {}",
            self.user_name,
            self.meeting_title,
            self.meeting_id,
            self.scheduled_at.format("%Y-%m-%d %H:%M"),
        )
    }
}
