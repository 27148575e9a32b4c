//! Calendar aggregation over half-open day and month ranges.

use actix_web::http::{StatusCode, header};
use actix_web::test;
use chrono::NaiveDate;
use serde_json::Value;
use sqlx::PgPool;

use bms::models::calendar::{self, ItemKind};
use bms::models::meeting::{self, MeetingInput};
use bms::models::task::{self, TaskInput, TaskStatus};

mod common;
use common::{at, bearer, create_app, employee, manager};

async fn add_task(pool: &PgPool, title: &str, date: &str, time: &str, participants: Vec<i64>) -> i64 {
    let input = TaskInput {
        title: title.to_string(),
        description: String::new(),
        status: TaskStatus::Open,
        deadline: at(date, time),
        participant_ids: participants,
    };
    task::create(pool, &input, None).await.expect("task")
}

async fn add_meeting(pool: &PgPool, title: &str, date: &str, time: &str, participants: Vec<i64>) -> i64 {
    let input = MeetingInput {
        title: title.to_string(),
        scheduled_at: at(date, time),
        participant_ids: participants,
    };
    meeting::create(pool, &input).await.expect("meeting")
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("date")
}

#[sqlx::test]
async fn test_day_includes_midnight_and_excludes_next_midnight(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    add_task(&pool, "Starts the day", "2026-03-15", "00:00", vec![erin.id]).await;
    add_meeting(&pool, "Late call", "2026-03-15", "23:59", vec![erin.id]).await;
    add_task(&pool, "Tomorrow", "2026-03-16", "00:00", vec![erin.id]).await;
    add_meeting(&pool, "Yesterday", "2026-03-14", "23:59", vec![erin.id]).await;

    let day = calendar::day(&pool, date("2026-03-15"), None).await.expect("day");
    let titles: Vec<&str> = day.items.iter().map(|i| i.title.as_str()).collect();
    assert_eq!(titles, vec!["Starts the day", "Late call"]);
    assert_eq!(day.items[0].kind, ItemKind::Task);
    assert_eq!(day.items[1].kind, ItemKind::Meeting);
}

#[sqlx::test]
async fn test_month_groups_days_and_respects_year_rollover(pool: PgPool) {
    add_task(&pool, "First", "2026-12-01", "00:00", vec![]).await;
    add_meeting(&pool, "Party", "2026-12-31", "23:59", vec![]).await;
    add_task(&pool, "Also first", "2026-12-01", "09:00", vec![]).await;
    add_task(&pool, "New year", "2027-01-01", "00:00", vec![]).await;
    add_task(&pool, "November", "2026-11-30", "23:59", vec![]).await;

    let month = calendar::month(&pool, 2026, 12, None).await.expect("query").expect("valid month");
    assert_eq!(month.days.len(), 2);
    assert_eq!(month.days[0].date, date("2026-12-01"));
    assert_eq!(month.days[0].items.len(), 2);
    assert_eq!(month.days[1].date, date("2026-12-31"));
    assert_eq!(month.days[1].items[0].title, "Party");

    assert!(calendar::month(&pool, 2026, 13, None).await.expect("query").is_none());
}

#[sqlx::test]
async fn test_participant_filter_hides_other_peoples_items(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let olaf = employee(&pool, "Olaf", "olaf@example.com").await;
    add_task(&pool, "Erin's task", "2026-03-15", "10:00", vec![erin.id]).await;
    add_meeting(&pool, "Olaf's meeting", "2026-03-15", "11:00", vec![olaf.id]).await;

    let mine = calendar::day(&pool, date("2026-03-15"), Some(erin.id)).await.expect("day");
    assert_eq!(mine.items.len(), 1);
    assert_eq!(mine.items[0].title, "Erin's task");

    let all = calendar::day(&pool, date("2026-03-15"), None).await.expect("day");
    assert_eq!(all.items.len(), 2);
}

#[sqlx::test]
async fn test_calendar_api_day_and_month(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let max = manager(&pool).await;
    let task_id = add_task(&pool, "Review", "2026-03-15", "10:00", vec![erin.id]).await;
    add_meeting(&pool, "Sync", "2026-03-20", "14:30", vec![max.id]).await;
    let app = test::init_service(create_app(pool)).await;

    let req = test::TestRequest::get()
        .uri("/api/v1/calendar/day/2026-03-15")
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["date"], "2026-03-15");
    assert_eq!(body["items"][0]["kind"], "task");
    assert_eq!(body["items"][0]["id"], task_id);

    // Erin only sees her own task; the manager sees both days
    let req = test::TestRequest::get()
        .uri("/api/v1/calendar/month/2026/3")
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["days"].as_array().map(Vec::len), Some(1));

    let req = test::TestRequest::get()
        .uri("/api/v1/calendar/month/2026/3")
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .to_request();
    let body: Value = test::read_body_json(test::call_service(&app, req).await).await;
    assert_eq!(body["days"].as_array().map(Vec::len), Some(2));
    assert_eq!(body["days"][1]["items"][0]["kind"], "meeting");
}

#[sqlx::test]
async fn test_calendar_rejects_bad_dates(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let app = test::init_service(create_app(pool)).await;

    for uri in [
        "/api/v1/calendar/day/2026-02-30",
        "/api/v1/calendar/day/yesterday",
        "/api/v1/calendar/month/2026/13",
        "/calendar/month/2026/0",
        "/calendar/day/-262143-01-01",
        "/api/v1/calendar/day/0000-06-01",
        "/calendar/month/300000/1",
        "/api/v1/calendar/month/-5/1",
    ] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, bearer(&erin)))
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::NOT_FOUND, "{uri}");
    }
}

#[sqlx::test]
async fn test_calendar_pages_render(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    add_task(&pool, "Review", "2026-03-15", "10:00", vec![erin.id]).await;
    let app = test::init_service(create_app(pool)).await;

    for uri in ["/calendar", "/calendar/day/2026-03-15", "/calendar/month/2026/3"] {
        let req = test::TestRequest::get()
            .uri(uri)
            .insert_header((header::AUTHORIZATION, bearer(&erin)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    }

    let req = test::TestRequest::get()
        .uri("/calendar/month/2026/3")
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let html = std::str::from_utf8(&body).expect("utf8");
    assert!(html.contains("Review"));
    assert!(html.contains("/calendar/day/2026-03-15"));
}
