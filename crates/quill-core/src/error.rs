//! Domain-level error types.

use thiserror::Error;

/// Content rule violations for post and comment text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    #[error("Text is too long: {length} characters (max {max})")]
    TooLong { length: usize, max: usize },

    #[error("Text contains a word that is too long: {length} characters (max {max})")]
    WordTooLong { length: usize, max: usize },
}

/// Domain errors - business logic failures.
#[derive(Debug, Error)]
pub enum DomainError {
    #[error("Entity not found: {entity_type} {key}")]
    NotFound {
        entity_type: &'static str,
        key: String,
    },

    #[error("Authentication required")]
    Unauthorized,

    #[error("Not the owner of this resource")]
    Forbidden,

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error("Authors cannot follow themselves")]
    SelfFollow,

    #[error("Invalid {field}: {message}")]
    InvalidField {
        field: &'static str,
        message: String,
    },

    #[error("Duplicate entity: {0}")]
    Duplicate(String),

    #[error(transparent)]
    Repo(#[from] RepoError),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity_type,
            key: key.to_string(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Constraint violation: {0}")]
    Constraint(String),
}
