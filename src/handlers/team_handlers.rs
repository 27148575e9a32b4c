use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::auth::policy::{self, Action, Resource};
use crate::auth::{csrf, validate};
use crate::errors::{AppError, render, render_with_status};
use crate::handlers::forms::{FormFields, see_other, user_options};
use crate::auth::session::set_flash;
use crate::models::membership::{self, Membership};
use crate::models::team::{self, TeamInput};
use crate::models::user::{self, UserDisplay};
use crate::templates_structs::{
    PageContext, SelectOption, TeamDetailTemplate, TeamFormTemplate, TeamListTemplate,
};

fn manager_options(users: &[UserDisplay], selected: Option<i64>) -> Vec<SelectOption> {
    let mut options = vec![SelectOption::new("", "(no manager)", selected.is_none())];
    options.extend(
        users
            .iter()
            .map(|u| SelectOption::new(u.id, format!("{} ({})", u.name, u.role.label()), selected == Some(u.id))),
    );
    options
}

/// Parse and check the team form. Unknown user ids are reported by id.
async fn read_team_form(pool: &PgPool, fields: &FormFields) -> Result<(TeamInput, Vec<String>), AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(fields.get("title"), "Title", validate::MAX_TITLE_LEN));

    let manager_id = fields.optional_id("manager_id").unwrap_or_else(|e| {
        errors.push(e);
        None
    });
    let member_ids = fields.ids("user_ids").unwrap_or_else(|e| {
        errors.push(e);
        vec![]
    });

    let mut referenced = member_ids.clone();
    referenced.extend(manager_id);
    for missing in user::missing_ids(pool, &referenced).await? {
        errors.push(format!("User #{missing} does not exist"));
    }

    let input = TeamInput {
        title: fields.get("title").trim().to_string(),
        manager_id,
        member_ids,
    };
    Ok((input, errors))
}

async fn form_page(
    pool: &PgPool,
    ctx: PageContext,
    form_action: String,
    form_title: &str,
    input: &TeamInput,
    errors: Vec<String>,
) -> Result<TeamFormTemplate, AppError> {
    let users = user::find_all(pool).await?;
    Ok(TeamFormTemplate {
        ctx,
        form_action,
        form_title: form_title.to_string(),
        title: input.title.clone(),
        manager_options: manager_options(&users, input.manager_id),
        member_options: user_options(&users, &input.member_ids),
        errors,
    })
}

pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::View)?;
    let ctx = PageContext::build(&session, &user, "/teams");
    let teams = team::find_all(&pool).await?;
    render(TeamListTemplate { ctx, teams })
}

pub async fn new_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Create)?;
    let ctx = PageContext::build(&session, &user, "/teams");
    let empty = TeamInput { title: String::new(), manager_id: None, member_ids: vec![] };
    render(form_page(&pool, ctx, "/teams".to_string(), "New Team", &empty, vec![]).await?)
}

pub async fn create(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Create)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (input, errors) = read_team_form(&pool, &fields).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &user, "/teams");
        let tmpl = form_page(&pool, ctx, "/teams".to_string(), "New Team", &input, errors).await?;
        return render_with_status(tmpl, StatusCode::BAD_REQUEST);
    }

    let id = team::create(&pool, &input).await?;
    log::info!("team {} created by user {}", id, user.id());
    set_flash(&session, "Team created");
    Ok(see_other(&format!("/teams/{id}")))
}

pub async fn detail(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::View)?;
    let team_id = path.into_inner();
    let team = team::find_by_id(&pool, team_id).await?.ok_or(AppError::NotFound)?;

    let member_ids = membership::member_ids(&pool, Membership::TeamMembers, team_id).await?;
    let members = user::find_by_ids(&pool, &member_ids).await?;
    let manager_name = match team.manager_id {
        Some(id) => user::find_display_by_id(&pool, id).await?.map(|u| u.name),
        None => None,
    };
    let candidates = user::find_all(&pool)
        .await?
        .into_iter()
        .filter(|u| !member_ids.contains(&u.id))
        .map(|u| SelectOption::new(u.id, u.name, false))
        .collect();

    let ctx = PageContext::build(&session, &user, "/teams");
    render(TeamDetailTemplate { ctx, team, manager_name, members, candidates })
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Edit)?;
    let team_id = path.into_inner();
    let team = team::find_by_id(&pool, team_id).await?.ok_or(AppError::NotFound)?;
    let input = TeamInput {
        title: team.title,
        manager_id: team.manager_id,
        member_ids: membership::member_ids(&pool, Membership::TeamMembers, team_id).await?,
    };
    let ctx = PageContext::build(&session, &user, "/teams");
    render(form_page(&pool, ctx, format!("/teams/{team_id}"), "Edit Team", &input, vec![]).await?)
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Edit)?;
    let team_id = path.into_inner();
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (input, errors) = read_team_form(&pool, &fields).await?;
    if !errors.is_empty() {
        let ctx = PageContext::build(&session, &user, "/teams");
        let tmpl = form_page(&pool, ctx, format!("/teams/{team_id}"), "Edit Team", &input, errors).await?;
        return render_with_status(tmpl, StatusCode::BAD_REQUEST);
    }

    if !team::update(&pool, team_id, &input).await? {
        return Err(AppError::NotFound);
    }
    log::info!("team {} updated by user {}", team_id, user.id());
    set_flash(&session, "Team updated");
    Ok(see_other(&format!("/teams/{team_id}")))
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Delete)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let team_id = path.into_inner();
    if !team::delete(&pool, team_id).await? {
        return Err(AppError::NotFound);
    }
    log::info!("team {} deleted by user {}", team_id, user.id());
    set_flash(&session, "Team deleted");
    Ok(see_other("/teams"))
}

/// POST /teams/{id}/members: add one user; adding an existing member is a no-op.
pub async fn add_member(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Edit)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let team_id = path.into_inner();
    team::find_by_id(&pool, team_id).await?.ok_or(AppError::NotFound)?;
    let member_id = fields
        .optional_id("user_id")
        .map_err(AppError::BadRequest)?
        .ok_or_else(|| AppError::BadRequest("Select a user to add".to_string()))?;
    if user::find_by_id(&pool, member_id).await?.is_none() {
        return Err(AppError::BadRequest(format!("User #{member_id} does not exist")));
    }

    if membership::add(&pool, Membership::TeamMembers, team_id, member_id).await? {
        log::info!("user {} added to team {} by user {}", member_id, team_id, user.id());
        set_flash(&session, "Member added");
    } else {
        set_flash(&session, "User is already a member");
    }
    Ok(see_other(&format!("/teams/{team_id}")))
}

pub async fn remove_member(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<(i64, i64)>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Team, Action::Edit)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    let (team_id, member_id) = path.into_inner();
    if !membership::remove(&pool, Membership::TeamMembers, team_id, member_id).await? {
        return Err(AppError::NotFound);
    }
    log::info!("user {} removed from team {} by user {}", member_id, team_id, user.id());
    set_flash(&session, "Member removed");
    Ok(see_other(&format!("/teams/{team_id}")))
}
