//! Role-based access policy.
//!
//! Every permission decision in the application goes through [`authorize`].
//! Handlers describe *who* is asking ([`Subject`]), *what* they are touching
//! ([`Resource`], carrying whatever data the rule needs) and *how*
//! ([`Action`]); the answer is a [`Decision`].
//!
//! ```text
//!               View                 Create          Edit/Delete              Comment
//! Team          anyone               admin           admin                    -
//! Task          admin|mgr|participant admin|mgr      admin|mgr|participant    admin|mgr|participant
//! Meeting       admin|mgr|participant anyone         admin|mgr|participant    -
//! Evaluation    admin|mgr|subject    admin|mgr       admin|mgr                -
//! Account       anyone               anyone          admin (never own delete) -
//! ```
//!
//! Assignment scope is a separate, data-dependent rule: see
//! [`check_assignment`].

use crate::errors::AppError;
use crate::models::user::Role;

/// The caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subject {
    pub id: i64,
    pub role: Role,
}

impl Subject {
    pub fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Admins and managers see and manage everything except teams.
    pub fn is_staff(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Manager)
    }
}

/// The object of a permission check, with the data its rules depend on.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Team,
    Task { participants: &'a [i64] },
    Meeting { participants: &'a [i64] },
    Evaluation { subject_id: i64 },
    Account { user_id: i64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    View,
    Create,
    Edit,
    Delete,
    Comment,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

fn allow_if(condition: bool, reason: &'static str) -> Decision {
    if condition { Decision::Allow } else { Decision::Deny(reason) }
}

pub fn authorize(subject: &Subject, resource: &Resource<'_>, action: Action) -> Decision {
    use Action::*;

    match (resource, action) {
        (Resource::Team, View) => Decision::Allow,
        (Resource::Team, Create) => allow_if(subject.is_admin(), "Only admins can create teams"),
        (Resource::Team, Edit | Delete) => allow_if(subject.is_admin(), "Only admins can manage teams"),

        (Resource::Task { .. }, Create) => {
            allow_if(subject.is_staff(), "Users cannot create tasks")
        }
        (Resource::Task { participants }, View | Edit | Delete | Comment) => allow_if(
            subject.is_staff() || participants.contains(&subject.id),
            "Only admins, managers and participants can access this task",
        ),

        (Resource::Meeting { .. }, Create) => Decision::Allow,
        (Resource::Meeting { participants }, View | Edit | Delete) => allow_if(
            subject.is_staff() || participants.contains(&subject.id),
            "Only admins, managers and participants can access this meeting",
        ),

        (Resource::Evaluation { subject_id }, View) => allow_if(
            subject.is_staff() || *subject_id == subject.id,
            "You can only view your own evaluations",
        ),
        (Resource::Evaluation { .. }, Create | Edit | Delete) => {
            allow_if(subject.is_staff(), "Users cannot evaluate")
        }

        (Resource::Account { .. }, View | Create) => Decision::Allow,
        (Resource::Account { user_id }, Delete) if *user_id == subject.id => {
            Decision::Deny("You cannot delete your own account")
        }
        (Resource::Account { .. }, Edit | Delete) => {
            allow_if(subject.is_admin(), "Only admins can manage user accounts")
        }

        (_, Comment) => Decision::Deny("Comments are not supported here"),
    }
}

/// Check permission; returns `Err(AppError::PermissionDenied)` if denied.
pub fn require(subject: &Subject, resource: &Resource<'_>, action: Action) -> Result<(), AppError> {
    match authorize(subject, resource, action) {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => {
            log::warn!(
                "Denied {:?} on {:?} for user {} ({})",
                action,
                resource,
                subject.id,
                subject.role
            );
            Err(AppError::PermissionDenied(reason.to_string()))
        }
    }
}

/// Validate that `subject` may assign (or evaluate) every user in `assignees`.
///
/// Admins may pick anyone. Managers may pick themselves and members of the
/// teams they manage (`managed_members`). Returns a user-facing message
/// naming the first out-of-scope user id.
pub fn check_assignment(subject: &Subject, assignees: &[i64], managed_members: &[i64]) -> Result<(), String> {
    match subject.role {
        Role::Admin => Ok(()),
        Role::Manager => {
            match assignees
                .iter()
                .find(|id| **id != subject.id && !managed_members.contains(id))
            {
                Some(outsider) => Err(format!(
                    "User #{outsider} is not a member of any team you manage"
                )),
                None => Ok(()),
            }
        }
        Role::User => Err("Users cannot assign work to others".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ADMIN: Subject = Subject { id: 1, role: Role::Admin };
    const MANAGER: Subject = Subject { id: 2, role: Role::Manager };
    const USER: Subject = Subject { id: 3, role: Role::User };

    #[test]
    fn only_admin_creates_teams() {
        assert!(authorize(&ADMIN, &Resource::Team, Action::Create).is_allowed());
        assert_eq!(
            authorize(&MANAGER, &Resource::Team, Action::Create),
            Decision::Deny("Only admins can create teams")
        );
        assert!(!authorize(&USER, &Resource::Team, Action::Create).is_allowed());
        assert!(authorize(&USER, &Resource::Team, Action::View).is_allowed());
    }

    #[test]
    fn user_role_never_creates_tasks_or_evaluations() {
        let task = Resource::Task { participants: &[3] };
        assert_eq!(authorize(&USER, &task, Action::Create), Decision::Deny("Users cannot create tasks"));
        let eval = Resource::Evaluation { subject_id: 3 };
        assert_eq!(authorize(&USER, &eval, Action::Create), Decision::Deny("Users cannot evaluate"));
        assert!(authorize(&MANAGER, &task, Action::Create).is_allowed());
        assert!(authorize(&ADMIN, &eval, Action::Create).is_allowed());
    }

    #[test]
    fn participants_can_edit_their_task_but_outsiders_cannot() {
        let mine = Resource::Task { participants: &[3, 9] };
        let theirs = Resource::Task { participants: &[9] };
        assert!(authorize(&USER, &mine, Action::Edit).is_allowed());
        assert!(authorize(&USER, &mine, Action::Comment).is_allowed());
        assert!(!authorize(&USER, &theirs, Action::Edit).is_allowed());
        assert!(!authorize(&USER, &theirs, Action::Delete).is_allowed());
        assert!(authorize(&MANAGER, &theirs, Action::Delete).is_allowed());
    }

    #[test]
    fn membership_not_id_equality_decides_task_access() {
        // Task id 3 equals the user's id, but the user is not a participant.
        let task = Resource::Task { participants: &[7] };
        assert!(!authorize(&USER, &task, Action::Edit).is_allowed());
    }

    #[test]
    fn anyone_creates_meetings_but_only_participants_edit() {
        let meeting = Resource::Meeting { participants: &[1] };
        assert!(authorize(&USER, &meeting, Action::Create).is_allowed());
        assert!(!authorize(&USER, &meeting, Action::Edit).is_allowed());
        let own = Resource::Meeting { participants: &[3] };
        assert!(authorize(&USER, &own, Action::Delete).is_allowed());
    }

    #[test]
    fn users_see_only_their_own_evaluations() {
        assert!(authorize(&USER, &Resource::Evaluation { subject_id: 3 }, Action::View).is_allowed());
        assert!(!authorize(&USER, &Resource::Evaluation { subject_id: 4 }, Action::View).is_allowed());
        assert!(!authorize(&USER, &Resource::Evaluation { subject_id: 3 }, Action::Delete).is_allowed());
    }

    #[test]
    fn admin_cannot_delete_own_account() {
        assert_eq!(
            authorize(&ADMIN, &Resource::Account { user_id: 1 }, Action::Delete),
            Decision::Deny("You cannot delete your own account")
        );
        assert!(authorize(&ADMIN, &Resource::Account { user_id: 3 }, Action::Delete).is_allowed());
        assert!(!authorize(&MANAGER, &Resource::Account { user_id: 3 }, Action::Edit).is_allowed());
    }

    #[test]
    fn comments_only_apply_to_tasks() {
        assert!(!authorize(&ADMIN, &Resource::Team, Action::Comment).is_allowed());
        assert!(!authorize(&ADMIN, &Resource::Meeting { participants: &[] }, Action::Comment).is_allowed());
    }

    #[test]
    fn require_maps_denial_to_forbidden() {
        let err = require(&USER, &Resource::Team, Action::Create).unwrap_err();
        assert!(matches!(err, AppError::PermissionDenied(ref m) if m == "Only admins can create teams"));
    }

    #[test]
    fn manager_assignment_limited_to_managed_members() {
        assert!(check_assignment(&MANAGER, &[2, 5, 6], &[5, 6]).is_ok());
        let err = check_assignment(&MANAGER, &[5, 8], &[5, 6]).unwrap_err();
        assert!(err.contains("#8"));
        assert!(check_assignment(&ADMIN, &[8, 9], &[]).is_ok());
        assert!(check_assignment(&USER, &[3], &[]).is_err());
    }
}
