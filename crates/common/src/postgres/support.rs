use tracing::warn;

use crate::domain::{Association, DomainError};

/// PostgreSQL unique_violation
const UNIQUE_VIOLATION: &str = "23505";

/// Map a failed write, reporting a unique violation as a conflict on `field`
pub(crate) fn write_error(error: tokio_postgres::Error, field: &str) -> DomainError {
    if let Some(db_err) = error.as_db_error() {
        if db_err.code().code() == UNIQUE_VIOLATION {
            return DomainError::already_exists(field);
        }
    }
    DomainError::RepositoryError(error.into())
}

pub(crate) fn read_error(error: tokio_postgres::Error) -> DomainError {
    DomainError::RepositoryError(error.into())
}

/// Stored association code. Unknown codes read as untagged.
pub(crate) fn stored_association(value: Option<String>) -> Option<Association> {
    let value = value?;
    match value.parse() {
        Ok(association) => Some(association),
        Err(_) => {
            warn!(association = %value, "unknown stored association, treating as untagged");
            None
        }
    }
}

pub(crate) fn association_param(value: Option<Association>) -> Option<&'static str> {
    value.map(|a| a.as_str())
}
