use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::DomainError;

/// Account role.
///
/// Roles are not a strict ladder: `AdminNetwork` is scoped to one network
/// association (plus matching departments) rather than being a weaker
/// `AdminMorgana`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    User,
    AdminNetwork,
    AdminMorgana,
    SuperAdmin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::AdminNetwork => "ADMIN_NETWORK",
            Role::AdminMorgana => "ADMIN_MORGANA",
            Role::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Roles with unrestricted access to every association.
    pub fn is_central_admin(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::AdminMorgana)
    }

    /// Parse a role read back from storage.
    ///
    /// Unknown values resolve to `User` so a corrupted row can never widen access.
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_else(|_| {
            warn!(role = %value, "unknown stored role, falling back to USER");
            Role::User
        })
    }
}

impl FromStr for Role {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Role::User),
            "ADMIN_NETWORK" => Ok(Role::AdminNetwork),
            "ADMIN_MORGANA" => Ok(Role::AdminMorgana),
            "SUPER_ADMIN" => Ok(Role::SuperAdmin),
            other => Err(DomainError::ValidationError(format!(
                "unknown role: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Member association of the network. `MorganaOrum` is the central one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Association {
    MorganaOrum,
    Unimhealth,
    Economia,
    Scipog,
    Matricole,
    InsideDicam,
}

impl Association {
    pub const ALL: [Association; 6] = [
        Association::MorganaOrum,
        Association::Unimhealth,
        Association::Economia,
        Association::Scipog,
        Association::Matricole,
        Association::InsideDicam,
    ];

    /// Network association given to network admins that would otherwise land on the central one.
    pub const DEFAULT_NETWORK: Association = Association::Unimhealth;

    pub fn as_str(&self) -> &'static str {
        match self {
            Association::MorganaOrum => "MORGANA_ORUM",
            Association::Unimhealth => "UNIMHEALTH",
            Association::Economia => "ECONOMIA",
            Association::Scipog => "SCIPOG",
            Association::Matricole => "MATRICOLE",
            Association::InsideDicam => "INSIDE_DICAM",
        }
    }

    pub fn is_central(&self) -> bool {
        matches!(self, Association::MorganaOrum)
    }
}

impl FromStr for Association {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase();
        Association::ALL
            .into_iter()
            .find(|association| association.as_str() == normalized)
            .ok_or_else(|| DomainError::ValidationError(format!("unknown association: {}", s)))
    }
}

impl fmt::Display for Association {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated caller of a request, resolved fresh from the session cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Actor {
    pub user_id: String,
    pub role: Role,
    pub association: Option<Association>,
}

impl Actor {
    pub fn new(user_id: impl Into<String>, role: Role, association: Option<Association>) -> Self {
        Self {
            user_id: user_id.into(),
            role,
            association,
        }
    }

    pub fn is_admin(&self) -> bool {
        !matches!(self.role, Role::User)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trips_through_storage_text() {
        for role in [
            Role::User,
            Role::AdminNetwork,
            Role::AdminMorgana,
            Role::SuperAdmin,
        ] {
            assert_eq!(Role::from_stored(role.as_str()), role);
        }
    }

    #[test]
    fn test_unknown_stored_role_is_least_privileged() {
        assert_eq!(Role::from_stored("OWNER"), Role::User);
        assert_eq!(Role::from_stored(""), Role::User);
    }

    #[test]
    fn test_role_parse_is_case_insensitive() {
        assert_eq!("super_admin".parse::<Role>().unwrap(), Role::SuperAdmin);
        assert!("root".parse::<Role>().is_err());
    }

    #[test]
    fn test_association_parse() {
        assert_eq!(
            "inside_dicam".parse::<Association>().unwrap(),
            Association::InsideDicam
        );
        assert!(matches!(
            "unknown".parse::<Association>(),
            Err(DomainError::ValidationError(_))
        ));
    }

    #[test]
    fn test_association_serde_uses_screaming_case() {
        let json = serde_json::to_string(&Association::MorganaOrum).unwrap();
        assert_eq!(json, "\"MORGANA_ORUM\"");
    }

    #[test]
    fn test_only_morgana_orum_is_central() {
        let central: Vec<_> = Association::ALL
            .into_iter()
            .filter(Association::is_central)
            .collect();
        assert_eq!(central, vec![Association::MorganaOrum]);
    }

    #[test]
    fn test_actor_is_admin() {
        assert!(!Actor::new("u1", Role::User, None).is_admin());
        assert!(Actor::new("u1", Role::AdminNetwork, Some(Association::Scipog)).is_admin());
    }
}
