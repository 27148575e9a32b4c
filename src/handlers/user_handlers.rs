use actix_session::Session;
use actix_web::{HttpResponse, http::StatusCode, web};
use sqlx::PgPool;

use crate::auth::identity::CurrentUser;
use crate::auth::policy::{self, Action, Resource};
use crate::auth::session::set_flash;
use crate::auth::{csrf, validate};
use crate::errors::{AppError, render, render_with_status};
use crate::handlers::forms::{FormFields, see_other};
use crate::models::user::{self, Role, UserDisplay};
use crate::templates_structs::{PageContext, SelectOption, UserFormTemplate, UserListTemplate};

fn role_options(selected: &str) -> Vec<SelectOption> {
    Role::ALL
        .iter()
        .map(|r| SelectOption::new(r.as_str(), r.label(), r.as_str() == selected))
        .collect()
}

fn form_template(ctx: PageContext, target: UserDisplay, name: &str, role: &str, errors: Vec<String>) -> UserFormTemplate {
    UserFormTemplate {
        ctx,
        form_action: format!("/users/{}", target.id),
        user: target,
        name: name.to_string(),
        role_options: role_options(role),
        errors,
    }
}

/// True when demoting `target` would leave no admin.
async fn is_last_admin(pool: &PgPool, target: &UserDisplay) -> Result<bool, AppError> {
    if target.role != Role::Admin {
        return Ok(false);
    }
    Ok(user::count_with_role(pool, Role::Admin).await? <= 1)
}

pub async fn list(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
) -> Result<HttpResponse, AppError> {
    policy::require(&user.subject(), &Resource::Account { user_id: user.id() }, Action::View)?;
    let users = user::find_all(&pool).await?;
    let ctx = PageContext::build(&session, &user, "/users");
    render(UserListTemplate { ctx, users })
}

pub async fn edit_form(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
) -> Result<HttpResponse, AppError> {
    let target_id = path.into_inner();
    policy::require(&user.subject(), &Resource::Account { user_id: target_id }, Action::Edit)?;
    let target = user::find_display_by_id(&pool, target_id).await?.ok_or(AppError::NotFound)?;

    let ctx = PageContext::build(&session, &user, "/users");
    let (name, role) = (target.name.clone(), target.role.as_str());
    render(form_template(ctx, target, &name, role, vec![]))
}

pub async fn update(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let target_id = path.into_inner();
    policy::require(&user.subject(), &Resource::Account { user_id: target_id }, Action::Edit)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;
    let target = user::find_display_by_id(&pool, target_id).await?.ok_or(AppError::NotFound)?;

    let mut errors = Vec::new();
    errors.extend(validate::validate_name(fields.get("name")));
    let role = Role::parse(fields.get("role"));
    match role {
        None => errors.push(format!("Unknown role '{}'", fields.get("role"))),
        Some(r) => {
            if r != Role::Admin && is_last_admin(&pool, &target).await? {
                errors.push("Cannot demote the last admin".to_string());
            }
        }
    }

    let role = match role {
        Some(role) if errors.is_empty() => role,
        _ => {
            let ctx = PageContext::build(&session, &user, "/users");
            let tmpl = form_template(ctx, target, fields.get("name"), fields.get("role"), errors);
            return render_with_status(tmpl, StatusCode::BAD_REQUEST);
        }
    };

    user::update(&pool, target_id, fields.get("name"), role).await?;
    log::info!("user {} updated by user {} (role {})", target_id, user.id(), role);
    set_flash(&session, "User updated");
    Ok(see_other("/users"))
}

pub async fn delete(
    pool: web::Data<PgPool>,
    session: Session,
    user: CurrentUser,
    path: web::Path<i64>,
    form: web::Form<Vec<(String, String)>>,
) -> Result<HttpResponse, AppError> {
    let target_id = path.into_inner();
    policy::require(&user.subject(), &Resource::Account { user_id: target_id }, Action::Delete)?;
    let fields = FormFields::new(form.into_inner());
    csrf::verify(&user, &session, fields.csrf_token())?;

    if !user::delete(&pool, target_id).await? {
        return Err(AppError::NotFound);
    }
    log::info!("user {} deleted by user {}", target_id, user.id());
    set_flash(&session, "User deleted");
    Ok(see_other("/users"))
}
