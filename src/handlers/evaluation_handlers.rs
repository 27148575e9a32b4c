use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use serde::Deserialize;
use sqlx::PgPool;

use crate::auth::csrf;
use crate::auth::identity::CurrentUser;
use crate::auth::policy::{self, Action, Resource, Subject};
use crate::auth::session::set_flash;
use crate::errors::{AppError, render, render_with_status};
use crate::handlers::forms::{FormFields, see_other};
use crate::models::evaluation::{self, EvaluationInput, MAX_SCORE, MIN_SCORE, validate_evaluation};
use crate::models::task::{self, TaskStatus};
use crate::models::{team, user};
use crate::models::user::Role;
use crate::templates_structs::{EvaluationFormTemplate, EvaluationListTemplate, PageContext, SelectOption};

pub const NOT_DONE: &str = "Only completed tasks can be evaluated";

#[derive(Deserialize)]
pub struct EvaluationQuery {
    pub user_id: Option<i64>,
}

/// Raw form state for re-rendering.
#[derive(Default)]
struct EvaluationFormValues {
    score: Option<i32>,
    task_id: Option<i64>,
    subject_id: Option<i64>,
}

/// Users `subject` may evaluate: everyone but themselves for admins,
/// members of managed teams for managers.
async fn evaluable_user_ids(pool: &PgPool, subject: &Subject) -> Result<Option<Vec<i64>>, AppError> {
    match subject.role {
        Role::Admin => Ok(None),
        _ => Ok(Some(team::managed_member_ids(pool, subject.id).await?)),
    }
}

/// Validate the evaluation form against the task and scope rules.
async fn read_evaluation_form(
    pool: &PgPool,
    fields: &FormFields,
    evaluator: &Subject,
) -> Result<(EvaluationFormValues, Result<EvaluationInput, Vec<String>>), AppError> {
    let values = EvaluationFormValues {
        score: fields.get("score").trim().parse().ok(),
        task_id: fields.optional_id("task_id").ok().flatten(),
        subject_id: fields.optional_id("subject_id").ok().flatten(),
    };

    let (Some(score), Some(task_id), Some(subject_id)) = (values.score, values.task_id, values.subject_id) else {
        let mut errors = Vec::new();
        if values.score.is_none() {
            errors.push(format!("Score must be a number between {MIN_SCORE} and {MAX_SCORE}"));
        }
        if values.task_id.is_none() {
            errors.push("Select a task".to_string());
        }
        if values.subject_id.is_none() {
            errors.push("Select the user being evaluated".to_string());
        }
        return Ok((values, Err(errors)));
    };

    let mut errors = validate_evaluation(score, subject_id, evaluator.id);

    match task::find_by_id(pool, task_id).await? {
        None => errors.push(format!("Task #{task_id} does not exist")),
        Some(t) if t.status != TaskStatus::Done => errors.push(NOT_DONE.to_string()),
        Some(_) => {
            if !task::participant_ids(pool, task_id).await?.contains(&subject_id) {
                errors.push(format!("User #{subject_id} is not a participant of task #{task_id}"));
            }
        }
    }

    if user::find_by_id(pool, subject_id).await?.is_none() {
        errors.push(format!("User #{subject_id} does not exist"));
    } else if subject_id != evaluator.id {
        let managed = evaluable_user_ids(pool, evaluator).await?.unwrap_or_default();
        if let Err(reason) = policy::check_assignment(evaluator, &[subject_id], &managed) {
            errors.push(reason);
        }
    }

    if !errors.is_empty() {
        return Ok((values, Err(errors)));
    }
    Ok((values, Ok(EvaluationInput { score, task_id, subject_id })))
}

async fn form_page(
    pool: &PgPool,
    ctx: PageContext,
    evaluator: &Subject,
    evaluation_id: Option<i64>,
    values: &EvaluationFormValues,
    errors: Vec<String>,
) -> Result<EvaluationFormTemplate, AppError> {
    let score_options = (MIN_SCORE..=MAX_SCORE)
        .map(|s| SelectOption::new(s, s.to_string(), values.score == Some(s)))
        .collect();
    let task_options = task::find_by_status(pool, TaskStatus::Done)
        .await?
        .into_iter()
        .map(|t| SelectOption::new(t.id, t.title, values.task_id == Some(t.id)))
        .collect();
    let scope = evaluable_user_ids(pool, evaluator).await?;
    let subject_options = user::find_all(pool)
        .await?
        .into_iter()
        .filter(|u| u.id != evaluator.id)
        .filter(|u| scope.as_ref().is_none_or(|ids| ids.contains(&u.id)))
        .map(|u| SelectOption::new(u.id, u.name, values.subject_id == Some(u.id)))
        .collect();
    let (form_action, form_title) = match evaluation_id {
        Some(id) => (format!("/evaluations/{id}"), "Edit Evaluation"),
        None => ("/evaluations".to_string(), "New Evaluation"),
    };
    Ok(EvaluationFormTemplate {
        ctx,
        form_action,
        form_title: form_title.to_string(),
        score_options,
        task_options,
        subject_options,
        errors,
    })
}

/// GET /evaluations[?user_id=N]. Users only ever see evaluations about
/// themselves; asking for someone else is denied.
pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    query: web::Query<EvaluationQuery>,
) -> Result<HttpResponse, AppError> {
    let subject = user.subject();
    let filter = match (query.user_id, subject.is_staff()) {
        (Some(id), _) => Some(id),
        (None, true) => None,
        (None, false) => Some(user.id()),
    };

    let (evaluations, filter_name, average) = match filter {
        Some(subject_id) => {
            policy::require(&subject, &Resource::Evaluation { subject_id }, Action::View)?;
            let name = user::find_display_by_id(&pool, subject_id)
                .await?
                .ok_or(AppError::NotFound)?
                .name;
            let average = evaluation::average_for_subject(&pool, subject_id)
                .await?
                .map(|avg| format!("{avg:.1}"));
            (evaluation::find_for_subject(&pool, subject_id).await?, Some(name), average)
        }
        None => (evaluation::find_all(&pool).await?, None, None),
    };

    let ctx = PageContext::build(&session, &user, "/evaluations");
    render(EvaluationListTemplate { ctx, evaluations, filter_name, average })
}

pub async fn new_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let subject = user.subject();
    policy::require(&subject, &Resource::Evaluation { subject_id: 0 }, Action::Create)?;
    let ctx = PageContext::build(&session, &user, "/evaluations");
    let tmpl = form_page(&pool, ctx, &subject, None, &EvaluationFormValues::default(), vec![]).await?;
    render(tmpl)
}

pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let subject = user.subject();
    policy::require(&subject, &Resource::Evaluation { subject_id: 0 }, Action::Create)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (values, parsed) = read_evaluation_form(&pool, &fields, &subject).await?;
    let input = match parsed {
        Ok(input) => input,
        Err(errors) => {
            let ctx = PageContext::build(&session, &user, "/evaluations");
            let tmpl = form_page(&pool, ctx, &subject, None, &values, errors).await?;
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    let id = evaluation::create(&pool, &input, user.id()).await?;
    log::info!("evaluation {} of user {} created by user {}", id, input.subject_id, user.id());
    set_flash(&session, "Evaluation saved");
    Ok(see_other("/evaluations"))
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let evaluation_id = path.into_inner();
    let found = evaluation::find_by_id(&pool, evaluation_id).await?.ok_or(AppError::NotFound)?;
    let subject = user.subject();
    policy::require(&subject, &Resource::Evaluation { subject_id: found.subject_id }, Action::Edit)?;

    let values = EvaluationFormValues {
        score: Some(found.score),
        task_id: Some(found.task_id),
        subject_id: Some(found.subject_id),
    };
    let ctx = PageContext::build(&session, &user, "/evaluations");
    render(form_page(&pool, ctx, &subject, Some(evaluation_id), &values, vec![]).await?)
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let evaluation_id = path.into_inner();
    let found = evaluation::find_by_id(&pool, evaluation_id).await?.ok_or(AppError::NotFound)?;
    let subject = user.subject();
    policy::require(&subject, &Resource::Evaluation { subject_id: found.subject_id }, Action::Edit)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (values, parsed) = read_evaluation_form(&pool, &fields, &subject).await?;
    let input = match parsed {
        Ok(input) => input,
        Err(errors) => {
            let ctx = PageContext::build(&session, &user, "/evaluations");
            let tmpl = form_page(&pool, ctx, &subject, Some(evaluation_id), &values, errors).await?;
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    evaluation::update(&pool, evaluation_id, &input, user.id()).await?;
    log::info!("evaluation {} updated by user {}", evaluation_id, user.id());
    set_flash(&session, "Evaluation updated");
    Ok(see_other("/evaluations"))
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let evaluation_id = path.into_inner();
    let found = evaluation::find_by_id(&pool, evaluation_id).await?.ok_or(AppError::NotFound)?;
    policy::require(&user.subject(), &Resource::Evaluation { subject_id: found.subject_id }, Action::Delete)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    evaluation::delete(&pool, evaluation_id).await?;
    log::info!("evaluation {} deleted by user {}", evaluation_id, user.id());
    set_flash(&session, "Evaluation deleted");
    Ok(see_other("/evaluations"))
}
