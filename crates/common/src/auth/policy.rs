use crate::auth::DepartmentKeywordMap;
use crate::domain::{Actor, Association, DomainError, DomainResult, Role};

/// Whether `actor` may create, update, delete or duplicate an item with the
/// given association and department.
///
/// Central admins may always write. A network admin may write items tagged
/// with their own association OR items whose department matches one of
/// their association's keywords. Everyone else, including anonymous callers,
/// may not.
pub fn can_mutate(
    actor: Option<&Actor>,
    target_association: Option<Association>,
    target_department: Option<&str>,
    keywords: &DepartmentKeywordMap,
) -> bool {
    let Some(actor) = actor else {
        return false;
    };

    match actor.role {
        Role::SuperAdmin | Role::AdminMorgana => true,
        Role::AdminNetwork => {
            let Some(own) = actor.association else {
                return false;
            };
            target_association == Some(own) || keywords.matches_department(own, target_department)
        }
        Role::User => false,
    }
}

/// Only super admins manage accounts and roles.
pub fn can_manage_users(actor: Option<&Actor>) -> bool {
    matches!(actor, Some(a) if a.role == Role::SuperAdmin)
}

/// Analytics and subscriber lists are visible to central admins.
pub fn can_view_analytics(actor: Option<&Actor>) -> bool {
    matches!(actor, Some(a) if a.role.is_central_admin())
}

/// Access decisions bound to the keyword table in use.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    keywords: DepartmentKeywordMap,
}

impl AccessPolicy {
    pub fn new(keywords: DepartmentKeywordMap) -> Self {
        Self { keywords }
    }

    pub fn keywords(&self) -> &DepartmentKeywordMap {
        &self.keywords
    }

    pub fn can_mutate(
        &self,
        actor: Option<&Actor>,
        target_association: Option<Association>,
        target_department: Option<&str>,
    ) -> bool {
        can_mutate(actor, target_association, target_department, &self.keywords)
    }

    /// Turn a denied mutation into the error surfaced to the caller.
    pub fn require_mutation(
        &self,
        actor: Option<&Actor>,
        target_association: Option<Association>,
        target_department: Option<&str>,
        what: &str,
    ) -> DomainResult<()> {
        let actor = require_actor(actor)?;
        if self.can_mutate(Some(actor), target_association, target_department) {
            return Ok(());
        }
        Err(DomainError::PermissionDenied(format!(
            "{} {} cannot modify {}",
            actor.role, actor.user_id, what
        )))
    }
}

/// Unwrap the actor or fail with `Unauthenticated`.
pub fn require_actor(actor: Option<&Actor>) -> DomainResult<&Actor> {
    actor.ok_or(DomainError::Unauthenticated)
}

/// Require any admin role.
pub fn require_admin(actor: Option<&Actor>) -> DomainResult<&Actor> {
    let actor = require_actor(actor)?;
    if actor.is_admin() {
        Ok(actor)
    } else {
        Err(DomainError::PermissionDenied(format!(
            "user {} is not an administrator",
            actor.user_id
        )))
    }
}
