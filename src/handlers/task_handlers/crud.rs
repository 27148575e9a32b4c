use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::identity::CurrentUser;
use crate::auth::policy::{self, Action, Resource};
use crate::auth::session::set_flash;
use crate::errors::{AppError, render, render_with_status};
use crate::handlers::forms::{FormFields, see_other};
use crate::models::{comment, task, user};
use crate::templates_structs::{PageContext, TaskDetailTemplate, TaskListTemplate};
use super::helpers::{self, TaskFormValues};

/// Staff see every task; users only those they take part in.
pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let tasks = if user.subject().is_staff() {
        task::find_all(&pool).await?
    } else {
        task::find_for_participant(&pool, user.id()).await?
    };
    let ctx = PageContext::build(&session, &user, "/tasks");
    render(TaskListTemplate { ctx, tasks })
}

pub async fn new_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Task { participants: &[] }, Action::Create)?;
    let ctx = PageContext::build(&session, &user, "/tasks");
    let tmpl = helpers::form_page(&pool, ctx, "/tasks".to_string(), "New Task", &TaskFormValues::empty(), true, vec![]).await?;
    render(tmpl)
}

pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let subject = user.subject();
    policy::require(&subject, &Resource::Task { participants: &[] }, Action::Create)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (values, parsed) = helpers::read_task_form(&pool, &fields).await?;
    let errors = match &parsed {
        Ok(input) => helpers::check_participants(&pool, &subject, &[], &input.participant_ids)
            .await?
            .into_iter()
            .collect(),
        Err(errors) => errors.clone(),
    };
    let input = match parsed {
        Ok(input) if errors.is_empty() => input,
        _ => {
            let ctx = PageContext::build(&session, &user, "/tasks");
            let tmpl = helpers::form_page(&pool, ctx, "/tasks".to_string(), "New Task", &values, true, errors).await?;
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    let first_comment = Some(values.first_comment.as_str())
        .filter(|c| !c.is_empty())
        .map(|c| (user.id(), c));
    let id = task::create(&pool, &input, first_comment).await?;
    log::info!("task {} created by user {}", id, user.id());
    set_flash(&session, "Task created");
    Ok(see_other(&format!("/tasks/{id}")))
}

pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let task = task::find_by_id(&pool, task_id).await?.ok_or(AppError::NotFound)?;
    let participant_ids = task::participant_ids(&pool, task_id).await?;
    policy::require(&user.subject(), &Resource::Task { participants: &participant_ids }, Action::View)?;

    let participants = user::find_by_ids(&pool, &participant_ids).await?;
    let comments = comment::find_for_task(&pool, task_id).await?;
    let ctx = PageContext::build(&session, &user, "/tasks");
    render(TaskDetailTemplate { ctx, task, participants, comments, comment_errors: vec![] })
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let task = task::find_by_id(&pool, task_id).await?.ok_or(AppError::NotFound)?;
    let participant_ids = task::participant_ids(&pool, task_id).await?;
    policy::require(&user.subject(), &Resource::Task { participants: &participant_ids }, Action::Edit)?;

    let input = task::TaskInput {
        title: task.title,
        description: task.description,
        status: task.status,
        deadline: task.deadline,
        participant_ids,
    };
    let ctx = PageContext::build(&session, &user, "/tasks");
    let values = TaskFormValues::from_input(&input);
    let tmpl = helpers::form_page(&pool, ctx, format!("/tasks/{task_id}"), "Edit Task", &values, false, vec![]).await?;
    render(tmpl)
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    task::find_by_id(&pool, task_id).await?.ok_or(AppError::NotFound)?;
    let current = task::participant_ids(&pool, task_id).await?;
    let subject = user.subject();
    policy::require(&subject, &Resource::Task { participants: &current }, Action::Edit)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (values, parsed) = helpers::read_task_form(&pool, &fields).await?;
    let errors = match &parsed {
        Ok(input) => helpers::check_participants(&pool, &subject, &current, &input.participant_ids)
            .await?
            .into_iter()
            .collect(),
        Err(errors) => errors.clone(),
    };
    let input = match parsed {
        Ok(input) if errors.is_empty() => input,
        _ => {
            let ctx = PageContext::build(&session, &user, "/tasks");
            let tmpl = helpers::form_page(&pool, ctx, format!("/tasks/{task_id}"), "Edit Task", &values, false, errors).await?;
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    if !task::update(&pool, task_id, &input).await? {
        return Err(AppError::NotFound);
    }
    log::info!("task {} updated by user {}", task_id, user.id());
    set_flash(&session, "Task updated");
    Ok(see_other(&format!("/tasks/{task_id}")))
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    task::find_by_id(&pool, task_id).await?.ok_or(AppError::NotFound)?;
    let participants = task::participant_ids(&pool, task_id).await?;
    policy::require(&user.subject(), &Resource::Task { participants: &participants }, Action::Delete)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    task::delete(&pool, task_id).await?;
    log::info!("task {} deleted by user {}", task_id, user.id());
    set_flash(&session, "Task deleted");
    Ok(see_other("/tasks"))
}
