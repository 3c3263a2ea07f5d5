use crate::auth::can_manage_users;
use crate::domain::{Actor, Association, DomainError, DomainResult, Role};

/// Role and association a user ends up with after a role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleAssignment {
    pub role: Role,
    pub association: Option<Association>,
}

/// Association that follows from assigning `target_role`.
///
/// Central roles are pinned to `MorganaOrum`. Network admins never sit on the
/// central association: `requested` (else `current`) is kept when it is a
/// network association and replaced by [`Association::DEFAULT_NETWORK`]
/// otherwise. Plain users keep whatever was requested, else their current one.
pub fn resolve_association(
    target_role: Role,
    requested: Option<Association>,
    current: Option<Association>,
) -> Option<Association> {
    let candidate = requested.or(current);
    match target_role {
        Role::SuperAdmin | Role::AdminMorgana => Some(Association::MorganaOrum),
        Role::AdminNetwork => match candidate {
            Some(association) if !association.is_central() => Some(association),
            _ => Some(Association::DEFAULT_NETWORK),
        },
        Role::User => candidate,
    }
}

/// Compute the assignment for a role change requested by `actor`.
///
/// Only super admins may change roles; everyone else is refused before
/// anything is computed.
pub fn resolve_role_assignment(
    actor: Option<&Actor>,
    current_association: Option<Association>,
    target_role: Role,
    requested_association: Option<Association>,
) -> DomainResult<RoleAssignment> {
    let Some(actor) = actor else {
        return Err(DomainError::Unauthenticated);
    };
    if !can_manage_users(Some(actor)) {
        return Err(DomainError::PermissionDenied(format!(
            "{} {} cannot change user roles",
            actor.role, actor.user_id
        )));
    }

    Ok(RoleAssignment {
        role: target_role,
        association: resolve_association(target_role, requested_association, current_association),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn super_admin() -> Actor {
        Actor::new("root", Role::SuperAdmin, Some(Association::MorganaOrum))
    }

    #[test]
    fn test_promotion_to_super_admin_forces_central_association() {
        for requested in Association::ALL.map(Some).into_iter().chain([None]) {
            let assignment = resolve_role_assignment(
                Some(&super_admin()),
                Some(Association::Unimhealth),
                Role::SuperAdmin,
                requested,
            )
            .unwrap();
            assert_eq!(assignment.association, Some(Association::MorganaOrum));
        }
    }

    #[test]
    fn test_admin_morgana_is_central() {
        assert_eq!(
            resolve_association(Role::AdminMorgana, Some(Association::Scipog), None),
            Some(Association::MorganaOrum)
        );
    }

    #[test]
    fn test_demotion_to_network_admin_leaves_central_association() {
        let assignment = resolve_role_assignment(
            Some(&super_admin()),
            Some(Association::MorganaOrum),
            Role::AdminNetwork,
            None,
        )
        .unwrap();
        assert_eq!(assignment.association, Some(Association::Unimhealth));
    }

    #[test]
    fn test_network_admin_requesting_central_gets_default() {
        assert_eq!(
            resolve_association(
                Role::AdminNetwork,
                Some(Association::MorganaOrum),
                Some(Association::Scipog)
            ),
            Some(Association::Unimhealth)
        );
    }

    #[test]
    fn test_network_admin_keeps_network_association() {
        assert_eq!(
            resolve_association(Role::AdminNetwork, Some(Association::Economia), None),
            Some(Association::Economia)
        );
        assert_eq!(
            resolve_association(Role::AdminNetwork, None, Some(Association::InsideDicam)),
            Some(Association::InsideDicam)
        );
    }

    #[test]
    fn test_network_admin_without_any_association_gets_default() {
        assert_eq!(
            resolve_association(Role::AdminNetwork, None, None),
            Some(Association::Unimhealth)
        );
    }

    #[test]
    fn test_user_role_passes_association_through() {
        assert_eq!(
            resolve_association(Role::User, None, Some(Association::MorganaOrum)),
            Some(Association::MorganaOrum)
        );
        assert_eq!(
            resolve_association(Role::User, Some(Association::Matricole), None),
            Some(Association::Matricole)
        );
        assert_eq!(resolve_association(Role::User, None, None), None);
    }

    #[test]
    fn test_only_super_admin_may_assign_roles() {
        for role in [Role::User, Role::AdminNetwork, Role::AdminMorgana] {
            let actor = Actor::new("someone", role, Some(Association::MorganaOrum));
            let result = resolve_role_assignment(Some(&actor), None, Role::SuperAdmin, None);
            assert!(matches!(result, Err(DomainError::PermissionDenied(_))));
        }
        assert!(matches!(
            resolve_role_assignment(None, None, Role::User, None),
            Err(DomainError::Unauthenticated)
        ));
    }
}
