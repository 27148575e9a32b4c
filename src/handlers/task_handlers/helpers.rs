use sqlx::PgPool;

use crate::auth::policy::{self, Subject};
use crate::auth::validate;
use crate::errors::AppError;
use crate::handlers::forms::{FormFields, datetime_input, parse_datetime, user_options};
use crate::models::comment::MAX_COMMENT_LEN;
use crate::models::task::{TaskInput, TaskStatus};
use crate::models::team;
use crate::models::user::{self, Role};
use crate::templates_structs::{PageContext, SelectOption, TaskFormTemplate};

pub const MAX_DESCRIPTION_LEN: usize = 5000;

/// The form as submitted, kept as text so it can be re-rendered verbatim.
pub struct TaskFormValues {
    pub title: String,
    pub description: String,
    pub status: String,
    pub deadline: String,
    pub participant_ids: Vec<i64>,
    pub first_comment: String,
}

impl TaskFormValues {
    pub fn empty() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            status: TaskStatus::Open.as_str().to_string(),
            deadline: String::new(),
            participant_ids: vec![],
            first_comment: String::new(),
        }
    }

    pub fn from_input(input: &TaskInput) -> Self {
        Self {
            title: input.title.clone(),
            description: input.description.clone(),
            status: input.status.as_str().to_string(),
            deadline: datetime_input(&input.deadline),
            participant_ids: input.participant_ids.clone(),
            first_comment: String::new(),
        }
    }
}

/// Parse the task form. Returns the raw values and, when valid, the input.
pub async fn read_task_form(
    pool: &PgPool,
    fields: &FormFields,
) -> Result<(TaskFormValues, Result<TaskInput, Vec<String>>), AppError> {
    let mut errors = Vec::new();
    errors.extend(validate::validate_required(fields.get("title"), "Title", validate::MAX_TITLE_LEN));
    errors.extend(validate::validate_optional(fields.get("description"), "Description", MAX_DESCRIPTION_LEN));
    errors.extend(validate::validate_optional(fields.get("comment"), "Comment", MAX_COMMENT_LEN));

    let status = match fields.get("status").trim() {
        "" => Some(TaskStatus::Open),
        raw => TaskStatus::parse(raw),
    };
    if status.is_none() {
        errors.push(format!("Unknown status '{}'", fields.get("status")));
    }

    let deadline = parse_datetime(fields.get("deadline"));
    if deadline.is_none() {
        errors.push("Deadline must be a valid date and time".to_string());
    }

    let participant_ids = fields.ids("user_ids").unwrap_or_else(|e| {
        errors.push(e);
        vec![]
    });
    for missing in user::missing_ids(pool, &participant_ids).await? {
        errors.push(format!("User #{missing} does not exist"));
    }

    let values = TaskFormValues {
        title: fields.get("title").trim().to_string(),
        description: fields.get("description").trim().to_string(),
        status: fields.get("status").to_string(),
        deadline: fields.get("deadline").to_string(),
        participant_ids: participant_ids.clone(),
        first_comment: fields.get("comment").trim().to_string(),
    };

    let input = match (status, deadline) {
        (Some(status), Some(deadline)) if errors.is_empty() => Ok(TaskInput {
            title: values.title.clone(),
            description: values.description.clone(),
            status,
            deadline,
            participant_ids,
        }),
        _ => Err(errors),
    };
    Ok((values, input))
}

/// Check that `subject` may move the participant set from `previous` to
/// `next`. Managers are only checked for the users they add.
pub async fn check_participants(
    pool: &PgPool,
    subject: &Subject,
    previous: &[i64],
    next: &[i64],
) -> Result<Option<String>, AppError> {
    let added: Vec<i64> = next.iter().copied().filter(|id| !previous.contains(id)).collect();
    let verdict = match subject.role {
        Role::Admin => Ok(()),
        Role::Manager => {
            let managed = team::managed_member_ids(pool, subject.id).await?;
            policy::check_assignment(subject, &added, &managed)
        }
        Role::User => {
            let removed = previous.iter().any(|id| !next.contains(id));
            if added.is_empty() && !removed {
                Ok(())
            } else {
                Err("Only admins and managers can change participants".to_string())
            }
        }
    };
    Ok(verdict.err().map(|reason| format!("Invalid task assignment: {reason}")))
}

pub async fn form_page(
    pool: &PgPool,
    ctx: PageContext,
    form_action: String,
    form_title: &str,
    values: &TaskFormValues,
    show_first_comment: bool,
    errors: Vec<String>,
) -> Result<TaskFormTemplate, AppError> {
    let users = user::find_all(pool).await?;
    let status_options = TaskStatus::ALL
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), s.as_str() == values.status))
        .collect();
    Ok(TaskFormTemplate {
        ctx,
        form_action,
        form_title: form_title.to_string(),
        title: values.title.clone(),
        description: values.description.clone(),
        deadline: values.deadline.clone(),
        status_options,
        participant_options: user_options(&users, &values.participant_ids),
        show_first_comment,
        first_comment: values.first_comment.clone(),
        errors,
    })
}
