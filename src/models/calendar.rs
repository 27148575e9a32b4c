//! Calendar aggregation: tasks (by deadline) and meetings (by scheduled time)
//! over a day or a month.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Task,
    Meeting,
}

impl ItemKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemKind::Task => "task",
            ItemKind::Meeting => "meeting",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CalendarItem {
    pub kind: ItemKind,
    pub id: i64,
    pub title: String,
    pub at: NaiveDateTime,
}

impl CalendarItem {
    /// Link to the item's own page.
    pub fn href(&self) -> String {
        match self.kind {
            ItemKind::Task => format!("/tasks/{}", self.id),
            ItemKind::Meeting => format!("/meetings/{}/edit", self.id),
        }
    }
}

/// All items on one calendar date, in time order.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub items: Vec<CalendarItem>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
    pub days: Vec<CalendarDay>,
}

/// Years whose day and month bounds fit in a Postgres `TIMESTAMP`.
pub const YEAR_RANGE: std::ops::RangeInclusive<i32> = 1..=9999;

pub fn year_supported(year: i32) -> bool {
    YEAR_RANGE.contains(&year)
}

/// Half-open `[start, end)` range covering one day.
pub fn day_bounds(date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = date.and_hms_opt(0, 0, 0).unwrap_or_default();
    (start, start + Duration::days(1))
}

/// Half-open range from the first of the month to the first of the next.
/// `None` for a month outside 1..=12 or a year outside `YEAR_RANGE`.
pub fn month_bounds(year: i32, month: u32) -> Option<(NaiveDateTime, NaiveDateTime)> {
    if !(1..=12).contains(&month) || !year_supported(year) {
        return None;
    }
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year.checked_add(1)?, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some((first.and_hms_opt(0, 0, 0)?, next.and_hms_opt(0, 0, 0)?))
}

/// Sort by time (tasks before meetings at the same instant, then id).
pub fn sort_items(items: &mut [CalendarItem]) {
    items.sort_by(|a, b| {
        a.at.cmp(&b.at)
            .then_with(|| a.kind.as_str().cmp(b.kind.as_str()).reverse())
            .then_with(|| a.id.cmp(&b.id))
    });
}

/// Group items by calendar date; days ascending, items time-ordered.
pub fn group_by_day(mut items: Vec<CalendarItem>) -> Vec<CalendarDay> {
    sort_items(&mut items);
    let mut days: BTreeMap<NaiveDate, Vec<CalendarItem>> = BTreeMap::new();
    for item in items {
        days.entry(item.at.date()).or_default().push(item);
    }
    days.into_iter()
        .map(|(date, items)| CalendarDay { date, items })
        .collect()
}

/// Items with `start <= at < end`. With `participant` set, only tasks and
/// meetings that user takes part in are returned.
pub async fn items_between(
    pool: &PgPool,
    start: NaiveDateTime,
    end: NaiveDateTime,
    participant: Option<i64>,
) -> Result<Vec<CalendarItem>, sqlx::Error> {
    let tasks: Vec<(i64, String, NaiveDateTime)> = sqlx::query_as(
        "SELECT t.id, t.title, t.deadline FROM tasks t \
         WHERE t.deadline >= $1 AND t.deadline < $2 \
           AND ($3::BIGINT IS NULL OR EXISTS ( \
               SELECT 1 FROM task_participants tp WHERE tp.task_id = t.id AND tp.user_id = $3))",
    )
    .bind(start)
    .bind(end)
    .bind(participant)
    .fetch_all(pool)
    .await?;

    let meetings: Vec<(i64, String, NaiveDateTime)> = sqlx::query_as(
        "SELECT m.id, m.title, m.scheduled_at FROM meetings m \
         WHERE m.scheduled_at >= $1 AND m.scheduled_at < $2 \
           AND ($3::BIGINT IS NULL OR EXISTS ( \
               SELECT 1 FROM meeting_participants mp WHERE mp.meeting_id = m.id AND mp.user_id = $3))",
    )
    .bind(start)
    .bind(end)
    .bind(participant)
    .fetch_all(pool)
    .await?;

    let mut items: Vec<CalendarItem> = tasks
        .into_iter()
        .map(|(id, title, at)| CalendarItem { kind: ItemKind::Task, id, title, at })
        .chain(
            meetings
                .into_iter()
                .map(|(id, title, at)| CalendarItem { kind: ItemKind::Meeting, id, title, at }),
        )
        .collect();
    sort_items(&mut items);
    Ok(items)
}

pub async fn day(pool: &PgPool, date: NaiveDate, participant: Option<i64>) -> Result<CalendarDay, sqlx::Error> {
    let (start, end) = day_bounds(date);
    let items = items_between(pool, start, end, participant).await?;
    Ok(CalendarDay { date, items })
}

/// `Ok(None)` when the month is invalid.
pub async fn month(
    pool: &PgPool,
    year: i32,
    month: u32,
    participant: Option<i64>,
) -> Result<Option<CalendarMonth>, sqlx::Error> {
    let Some((start, end)) = month_bounds(year, month) else {
        return Ok(None);
    };
    let items = items_between(pool, start, end, participant).await?;
    Ok(Some(CalendarMonth { year, month, days: group_by_day(items) }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M").unwrap()
    }

    fn item(kind: ItemKind, id: i64, when: &str) -> CalendarItem {
        CalendarItem { kind, id, title: format!("#{id}"), at: at(when) }
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let (start, end) = day_bounds(NaiveDate::from_ymd_opt(2026, 3, 31).unwrap());
        assert_eq!(start, at("2026-03-31 00:00"));
        assert_eq!(end, at("2026-04-01 00:00"));
    }

    #[test]
    fn december_rolls_into_next_year() {
        let (start, end) = month_bounds(2025, 12).unwrap();
        assert_eq!(start, at("2025-12-01 00:00"));
        assert_eq!(end, at("2026-01-01 00:00"));
    }

    #[test]
    fn february_leap_year_bounds() {
        let (_, end) = month_bounds(2028, 2).unwrap();
        assert_eq!(end, at("2028-03-01 00:00"));
    }

    #[test]
    fn invalid_month_has_no_bounds() {
        assert!(month_bounds(2026, 0).is_none());
        assert!(month_bounds(2026, 13).is_none());
    }

    #[test]
    fn years_outside_storage_range_have_no_bounds() {
        assert!(month_bounds(0, 1).is_none());
        assert!(month_bounds(300_000, 1).is_none());
        assert!(month_bounds(9999, 12).is_some());
    }

    #[test]
    fn group_by_day_orders_days_and_items() {
        let days = group_by_day(vec![
            item(ItemKind::Meeting, 1, "2026-05-03 10:00"),
            item(ItemKind::Task, 2, "2026-05-01 17:00"),
            item(ItemKind::Task, 3, "2026-05-03 09:00"),
            item(ItemKind::Meeting, 4, "2026-05-01 08:30"),
        ]);
        let dates: Vec<_> = days.iter().map(|d| d.date.to_string()).collect();
        assert_eq!(dates, vec!["2026-05-01", "2026-05-03"]);
        let first: Vec<_> = days[0].items.iter().map(|i| i.id).collect();
        assert_eq!(first, vec![4, 2]);
        let second: Vec<_> = days[1].items.iter().map(|i| i.id).collect();
        assert_eq!(second, vec![3, 1]);
    }

    #[test]
    fn tasks_sort_before_meetings_at_same_instant() {
        let mut items = vec![
            item(ItemKind::Meeting, 1, "2026-05-03 10:00"),
            item(ItemKind::Task, 9, "2026-05-03 10:00"),
        ];
        sort_items(&mut items);
        assert_eq!(items[0].kind, ItemKind::Task);
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_value(item(ItemKind::Meeting, 7, "2026-05-03 10:00")).unwrap();
        assert_eq!(json["kind"], "meeting");
        assert_eq!(json["at"], "2026-05-03T10:00:00");
    }
}
