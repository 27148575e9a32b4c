use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::auth::policy::{self, Action, Resource};
use crate::auth::session::set_flash;
use crate::auth::{csrf, validate};
use crate::errors::{AppError, render, render_with_status};
use crate::handlers::forms::{FormFields, datetime_input, parse_datetime, see_other, user_options};
use crate::models::meeting::{self, MeetingInput};
use crate::models::user::{self, Role};
use crate::templates_structs::{MeetingFormTemplate, MeetingListTemplate, PageContext};

struct MeetingFormValues {
    title: String,
    scheduled_at: String,
    participant_ids: Vec<i64>,
}

/// Parse the meeting form and run the availability check against every
/// other meeting (`exclude` is the meeting being edited).
async fn read_meeting_form(
    pool: &PgPool,
    fields: &FormFields,
    caller: &CurrentUser,
    exclude: Option<i64>,
) -> Result<(MeetingFormValues, Result<MeetingInput, Vec<String>>), AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(fields.get("title"), "Title", validate::MAX_TITLE_LEN));

    let scheduled_at = parse_datetime(fields.get("scheduled_at"));
    if scheduled_at.is_none() {
        errors.push("Scheduled time must be a valid date and time".to_string());
    }

    let mut participant_ids = fields.ids("user_ids").unwrap_or_else(|e| {
        errors.push(e);
        vec![]
    });
    // A plain user always attends the meetings they create
    if exclude.is_none() && caller.role() == Role::User && !participant_ids.contains(&caller.id()) {
        participant_ids.push(caller.id());
    }
    for missing in user::missing_ids(pool, &participant_ids).await? {
        errors.push(format!("User #{missing} does not exist"));
    }

    let values = MeetingFormValues {
        title: fields.get("title").trim().to_string(),
        scheduled_at: fields.get("scheduled_at").to_string(),
        participant_ids: participant_ids.clone(),
    };

    let Some(scheduled_at) = scheduled_at.filter(|_| errors.is_empty()) else {
        return Ok((values, Err(errors)));
    };
    if let Err(conflict) = meeting::ensure_available(pool, scheduled_at, &participant_ids, exclude).await? {
        log::info!("meeting rejected for user {}: {}", caller.id(), conflict);
        return Ok((values, Err(vec![format!("Scheduling conflict: {conflict}")])));
    }

    let input = MeetingInput { title: values.title.clone(), scheduled_at, participant_ids };
    Ok((values, Ok(input)))
}

async fn form_page(
    pool: &PgPool,
    ctx: PageContext,
    meeting_id: Option<i64>,
    values: &MeetingFormValues,
    errors: Vec<String>,
) -> Result<MeetingFormTemplate, AppError> {
    let users = user::find_all(pool).await?;
    let (form_action, form_title) = match meeting_id {
        Some(id) => (format!("/meetings/{id}"), "Edit Meeting"),
        None => ("/meetings".to_string(), "New Meeting"),
    };
    Ok(MeetingFormTemplate {
        ctx,
        form_action,
        form_title: form_title.to_string(),
        title: values.title.clone(),
        scheduled_at: values.scheduled_at.clone(),
        participant_options: user_options(&users, &values.participant_ids),
        meeting_id,
        errors,
    })
}

/// Staff see every meeting; users only those they attend.
pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    let meetings = if user.subject().is_staff() {
        meeting::find_all(&pool).await?
    } else {
        meeting::find_for_participant(&pool, user.id()).await?
    };
    let ctx = PageContext::build(&session, &user, "/meetings");
    render(MeetingListTemplate { ctx, meetings })
}

pub async fn new_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Meeting { participants: &[] }, Action::Create)?;
    let ctx = PageContext::build(&session, &user, "/meetings");
    let values = MeetingFormValues {
        title: String::new(),
        scheduled_at: String::new(),
        participant_ids: vec![user.id()],
    };
    render(form_page(&pool, ctx, None, &values, vec![]).await?)
}

pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Meeting { participants: &[] }, Action::Create)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (values, parsed) = read_meeting_form(&pool, &fields, &user, None).await?;
    let input = match parsed {
        Ok(input) => input,
        Err(errors) => {
            let ctx = PageContext::build(&session, &user, "/meetings");
            let tmpl = form_page(&pool, ctx, None, &values, errors).await?;
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    let id = meeting::create(&pool, &input).await?;
    log::info!("meeting {} created by user {}", id, user.id());
    set_flash(&session, "Meeting scheduled");
    Ok(see_other("/meetings"))
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let meeting_id = path.into_inner();
    let found = meeting::find_by_id(&pool, meeting_id).await?.ok_or(AppError::NotFound)?;
    let participant_ids = meeting::participant_ids(&pool, meeting_id).await?;
    policy::require(&user.subject(), &Resource::Meeting { participants: &participant_ids }, Action::Edit)?;

    let values = MeetingFormValues {
        title: found.title,
        scheduled_at: datetime_input(&found.scheduled_at),
        participant_ids,
    };
    let ctx = PageContext::build(&session, &user, "/meetings");
    render(form_page(&pool, ctx, Some(meeting_id), &values, vec![]).await?)
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let meeting_id = path.into_inner();
    meeting::find_by_id(&pool, meeting_id).await?.ok_or(AppError::NotFound)?;
    let current = meeting::participant_ids(&pool, meeting_id).await?;
    policy::require(&user.subject(), &Resource::Meeting { participants: &current }, Action::Edit)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (values, parsed) = read_meeting_form(&pool, &fields, &user, Some(meeting_id)).await?;
    let input = match parsed {
        Ok(input) => input,
        Err(errors) => {
            let ctx = PageContext::build(&session, &user, "/meetings");
            let tmpl = form_page(&pool, ctx, Some(meeting_id), &values, errors).await?;
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    if !meeting::update(&pool, meeting_id, &input).await? {
        return Err(AppError::NotFound);
    }
    log::info!("meeting {} updated by user {}", meeting_id, user.id());
    set_flash(&session, "Meeting updated");
    Ok(see_other("/meetings"))
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let meeting_id = path.into_inner();
    meeting::find_by_id(&pool, meeting_id).await?.ok_or(AppError::NotFound)?;
    let participants = meeting::participant_ids(&pool, meeting_id).await?;
    policy::require(&user.subject(), &Resource::Meeting { participants: &participants }, Action::Delete)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    meeting::delete(&pool, meeting_id).await?;
    log::info!("meeting {} deleted by user {}", meeting_id, user.id());
    set_flash(&session, "Meeting deleted");
    Ok(see_other("/meetings"))
}
