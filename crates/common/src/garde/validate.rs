//! Garde validation helpers shared by service requests.

use std::str::FromStr;

use crate::domain::{Association, DomainError, RepresentativeCategory, Role};
use garde::{Report, Validate};

/// Run garde on a request and map the report to `ValidationError`
pub fn validate_struct<T>(value: &T) -> Result<(), DomainError>
where
    T: Validate,
    T::Context: Default,
{
    value
        .validate()
        .map_err(|report| DomainError::ValidationError(format_validation_errors(&report)))
}

fn format_validation_errors(report: &Report) -> String {
    report
        .iter()
        .map(|(path, error)| {
            if path.to_string().is_empty() {
                error.message().to_string()
            } else {
                format!("{}: {}", path, error.message())
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Rejects strings that are empty after trimming
pub fn not_blank(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        return Err(garde::Error::new("must not be blank"));
    }
    Ok(())
}

/// Site paths recorded by analytics are absolute
pub fn site_path(value: &str, _ctx: &()) -> garde::Result {
    if !value.starts_with('/') {
        return Err(garde::Error::new("must start with '/'"));
    }
    Ok(())
}

/// Optional association code, validated against the known associations
pub fn known_association(value: &Option<String>, _ctx: &()) -> garde::Result {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(()),
        Some(code) => Association::from_str(code)
            .map(|_| ())
            .map_err(|_| garde::Error::new(format!("unknown association '{}'", code))),
    }
}

pub fn known_category(value: &str, _ctx: &()) -> garde::Result {
    RepresentativeCategory::from_str(value)
        .map(|_| ())
        .map_err(|_| garde::Error::new(format!("unknown category '{}'", value)))
}

pub fn known_role(value: &str, _ctx: &()) -> garde::Result {
    Role::from_str(value)
        .map(|_| ())
        .map_err(|_| garde::Error::new(format!("unknown role '{}'", value)))
}
