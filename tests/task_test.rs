use actix_web::http::{StatusCode, header};
use actix_web::test;
use sqlx::PgPool;

use bms::models::comment;
use bms::models::task::{self, TaskStatus};

mod common;
use common::{bearer, create_app, employee, manager};

#[sqlx::test]
async fn test_task_lifecycle_with_comments(pool: PgPool) {
    let max = manager(&pool).await;
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let app = test::init_service(create_app(pool.clone())).await;

    // Create with a first comment
    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([
            ("title", "Migrate database".to_string()),
            ("description", "Move to the new cluster".to_string()),
            ("status", "open".to_string()),
            ("deadline", "2026-06-01T12:00".to_string()),
            ("user_ids", max.id.to_string()),
            ("comment", "Kick-off notes".to_string()),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);

    let tasks = task::find_all(&pool).await.expect("tasks");
    assert_eq!(tasks.len(), 1);
    let task_id = tasks[0].id;
    assert_eq!(tasks[0].comment_count, 1);

    // Empty comment is re-rendered on the detail page
    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{task_id}/comments"))
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([("content", "   ")])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    assert!(std::str::from_utf8(&body).expect("utf8").contains("Comment is required"));

    // Non-participant user cannot comment
    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{task_id}/comments"))
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .set_form([("content", "Me too")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{task_id}/comments"))
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([("content", "Cutover scheduled")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);

    let comments = comment::find_for_task(&pool, task_id).await.expect("comments");
    let texts: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
    assert_eq!(texts, vec!["Kick-off notes", "Cutover scheduled"]);
    assert!(comments.iter().all(|c| c.author_id == max.id));

    // Mark done, then delete
    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{task_id}"))
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([
            ("title", "Migrate database".to_string()),
            ("status", "done".to_string()),
            ("deadline", "2026-06-01T12:00".to_string()),
            ("user_ids", max.id.to_string()),
        ])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    let stored = task::find_by_id(&pool, task_id).await.expect("query").expect("task");
    assert_eq!(stored.status, TaskStatus::Done);

    let req = test::TestRequest::post()
        .uri(&format!("/tasks/{task_id}/delete"))
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([("confirm", "yes")])
        .to_request();
    assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    assert!(task::find_by_id(&pool, task_id).await.expect("query").is_none());
    assert!(comment::find_for_task(&pool, task_id).await.expect("comments").is_empty());
}

#[sqlx::test]
async fn test_invalid_task_form_lists_errors(pool: PgPool) {
    let max = manager(&pool).await;
    let app = test::init_service(create_app(pool.clone())).await;

    let req = test::TestRequest::post()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, bearer(&max)))
        .set_form([
            ("title", ""),
            ("status", "paused"),
            ("deadline", "tomorrow"),
            ("user_ids", "999999"),
        ])
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body = test::read_body(resp).await;
    let html = std::str::from_utf8(&body).expect("utf8");
    assert!(html.contains("Title is required"));
    assert!(html.contains("Unknown status"));
    assert!(html.contains("User #999999 does not exist"));
    assert!(task::find_all(&pool).await.expect("tasks").is_empty());
}

#[sqlx::test]
async fn test_users_list_only_their_tasks(pool: PgPool) {
    let max = manager(&pool).await;
    let erin = employee(&pool, "Erin", "erin@example.com").await;
    let app = test::init_service(create_app(pool.clone())).await;

    for (title, participant) in [("Erin job", erin.id), ("Max job", max.id)] {
        let req = test::TestRequest::post()
            .uri("/tasks")
            .insert_header((header::AUTHORIZATION, bearer(&max)))
            .set_form([
                ("title", title.to_string()),
                ("status", "open".to_string()),
                ("deadline", "2026-06-01T12:00".to_string()),
                ("user_ids", participant.to_string()),
            ])
            .to_request();
        assert_eq!(test::call_service(&app, req).await.status(), StatusCode::SEE_OTHER);
    }

    let req = test::TestRequest::get()
        .uri("/tasks")
        .insert_header((header::AUTHORIZATION, bearer(&erin)))
        .to_request();
    let body = test::read_body(test::call_service(&app, req).await).await;
    let html = std::str::from_utf8(&body).expect("utf8");
    assert!(html.contains("Erin job"));
    assert!(!html.contains("Max job"));
}
