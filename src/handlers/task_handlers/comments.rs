use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::auth::policy::{self, Action, Resource};
use crate::auth::session::set_flash;
use crate::auth::{csrf, validate};
use crate::errors::{AppError, render_with_status};
use crate::handlers::forms::{FormFields, see_other};
use crate::models::comment::{self, MAX_COMMENT_LEN};
use crate::models::{task, user};
use crate::templates_structs::{PageContext, TaskDetailTemplate};

/// POST /tasks/{id}/comments
pub async fn add_comment(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let task_id = path.into_inner();
    let task = task::find_by_id(&pool, task_id).await?.ok_or(AppError::NotFound)?;
    let participant_ids = task::participant_ids(&pool, task_id).await?;
    policy::require(&user.subject(), &Resource::Task { participants: &participant_ids }, Action::Comment)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let content = fields.get("content").trim();
    if let Some(error) = validate::validate_required(content, "Comment", MAX_COMMENT_LEN) {
        let participants = user::find_by_ids(&pool, &participant_ids).await?;
        let comments = comment::find_for_task(&pool, task_id).await?;
        let ctx = PageContext::build(&session, &user, "/tasks");
        let tmpl = TaskDetailTemplate { ctx, task, participants, comments, comment_errors: vec![error] };
        return render_with_status(tmpl, StatusCode::BAD_REQUEST);
    }

    let id = comment::create(&pool, task_id, user.id(), content).await?;
    log::info!("comment {} added to task {} by user {}", id, task_id, user.id());
    set_flash(&session, "Comment added");
    Ok(see_other(&format!("/tasks/{task_id}#comments")))
}
