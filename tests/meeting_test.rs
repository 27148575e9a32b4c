//! Meeting scheduling: the conflict check itself and the create/edit flows
//! that depend on it.

use actix_web::http::{StatusCode, header};
use actix_web::test;
use sqlx::PgPool;

use bms::models::meeting::{self, MeetingInput, availability};

mod common;
use common::{at, bearer, create_app, employee, manager};

async fn schedule(pool: &PgPool, title: &str, when: &str, participants: Vec<i64>) -> i64 {
    let (date, time) = when.split_once(' ').expect("date time");
    let input = MeetingInput {
        title: title.to_string(),
        scheduled_at: at(date, time),
        participant_ids: participants,
    };
    meeting::create(pool, &input).await.expect("create meeting")
}

// ---------------------------------------------------------------------------
// Conflict detection
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_conflict_requires_same_instant_and_shared_participant(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let olaf = employee(&pool, "Olaf", "olaf@example.com").await;
    let max = manager(&pool).await;
    let standup = schedule(&pool, "Standup", "2026-03-02 09:00", vec![erin.id, max.id]).await;

    let conflict = availability::find_conflict(&pool, at("2026-03-02", "09:00"), &[olaf.id, erin.id], None)
        .await
        .expect("query")
        .expect("Erin is busy");
    assert_eq!(conflict.meeting_id, standup);
    assert_eq!(conflict.user_id, erin.id);
    assert!(conflict.message().contains("Standup"));

    // Same instant, nobody shared
    let free = availability::find_conflict(&pool, at("2026-03-02", "09:00"), &[olaf.id], None)
        .await
        .expect("query");
    assert!(free.is_none());

    // One minute later is not a conflict
    let later = availability::find_conflict(&pool, at("2026-03-02", "09:01"), &[erin.id], None)
        .await
        .expect("query");
    assert!(later.is_none());

    // Nobody invited, nothing to clash
    let empty = availability::find_conflict(&pool, at("2026-03-02", "09:00"), &[], None)
        .await
        .expect("query");
    assert!(empty.is_none());
}

#[sqlx::test]
async fn test_meeting_never_conflicts_with_itself(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let standup = schedule(&pool, "Standup", "2026-03-02 09:00", vec![erin.id]).await;

    let check = availability::ensure_available(&pool, at("2026-03-02", "09:00"), &[erin.id], Some(standup))
        .await
        .expect("query");
    assert!(check.is_ok());

    let check = availability::ensure_available(&pool, at("2026-03-02", "09:00"), &[erin.id], None)
        .await
        .expect("query");
    assert!(check.is_err());
}

// ---------------------------------------------------------------------------
// HTTP flows
// ---------------------------------------------------------------------------

#[sqlx::test]
async fn test_create_conflicting_meeting_is_rejected(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let max = manager(&pool).await;
    schedule(&pool, "Standup", "2026-03-02 09:00", vec![erin.id]).await;
    let app = test::init_service(create_app(pool.clone())).await;

    let req = test::TestRequest::post()
        .uri("/meetings")
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([
            ("title", "Planning".to_string()),
            ("scheduled_at", "2026-03-02T09:00".to_string()),
            ("user_ids", erin.id.to_string()),
            ("user_ids", max.id.to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).expect("utf8").contains("Scheduling conflict"));
    assert_eq!(meeting::find_all(&pool).await.expect("meetings").len(), 1);

    // Half an hour later is free
    let req = test::TestRequest::post()
        .uri("/meetings")
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([
            ("title", "Planning".to_string()),
            ("scheduled_at", "2026-03-02T09:30".to_string()),
            ("user_ids", erin.id.to_string()),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    assert_eq!(meeting::find_all(&pool).await.expect("meetings").len(), 2);
}

#[sqlx::test]
async fn test_editing_meeting_in_place_is_allowed(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let standup = schedule(&pool, "Standup", "2026-03-02 09:00", vec![erin.id]).await;
    let app = test::init_service(create_app(pool.clone())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/meetings/{standup}"))
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .set_form([
            ("title", "Daily standup".to_string()),
            ("scheduled_at", "2026-03-02T09:00".to_string()),
            ("user_ids", erin.id.to_string()),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    let stored = meeting::find_by_id(&pool, standup).await.expect("query").expect("meeting");
    assert_eq!(stored.title, "Daily standup");
}

#[sqlx::test]
async fn test_user_creator_joins_own_meeting(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let olaf = employee(&pool, "Olaf", "olaf@example.com").await;
    let app = test::init_service(create_app(pool.clone())).await;

    let req = test::TestRequest::post()
        .uri("/meetings")
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .set_form([
            ("title", "Coffee".to_string()),
            ("scheduled_at", "2026-03-03T15:00".to_string()),
            ("user_ids", olaf.id.to_string()),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    let meetings = meeting::find_for_participant(&pool, erin.id).await.expect("meetings");
    assert_eq!(meetings.len(), 1);
    let mut ids = meeting::participant_ids(&pool, meetings[0].id).await.expect("ids");
    ids.sort_unstable();
    let mut expected = vec![erin.id, olaf.id];
    expected.sort_unstable();
    assert_eq!(ids, expected);
}

#[sqlx::test]
async fn test_outsider_cannot_edit_meeting(pool: PgPool) {
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let olaf = employee(&pool, "Olaf", "olaf@example.com").await;
    let standup = schedule(&pool, "Standup", "2026-03-02 09:00", vec![erin.id]).await;
    let app = test::init_service(create_app(pool)).await;

    let req = test::TestRequest::get()
        .uri(&format!("/meetings/{standup}/edit"))
        .insert_header((header::AUTHORIZATION, bearer(&olaf)))
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);
}
