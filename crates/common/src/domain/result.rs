use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User not found: {0}")]
    UserNotFound(String),

    #[error("Representative not found: {0}")]
    RepresentativeNotFound(String),

    #[error("Convention not found: {0}")]
    ConventionNotFound(String),

    #[error("Event not found: {0}")]
    EventNotFound(String),

    #[error("News not found: {0}")]
    NewsNotFound(String),

    #[error("Newsletter subscriber not found: {0}")]
    SubscriberNotFound(String),

    #[error("A record with this {field} already exists")]
    AlreadyExists { field: String },

    #[error("Event is full: {0}")]
    EventFull(String),

    #[error("Event is not open for registration: {0}")]
    EventNotOpen(String),

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(String),

    #[error("Password reset token expired")]
    ResetTokenExpired,

    #[error("Password hashing error: {0}")]
    PasswordHashingError(String),

    #[error("Email delivery error: {0}")]
    EmailError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] anyhow::Error),
}

impl DomainError {
    /// Conflict on a unique column, named by the field the caller submitted.
    pub fn already_exists(field: impl Into<String>) -> Self {
        DomainError::AlreadyExists {
            field: field.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            DomainError::UserNotFound(_)
                | DomainError::RepresentativeNotFound(_)
                | DomainError::ConventionNotFound(_)
                | DomainError::EventNotFound(_)
                | DomainError::NewsNotFound(_)
                | DomainError::SubscriberNotFound(_)
        )
    }
}
