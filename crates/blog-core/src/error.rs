//! Domain-level error types.

use thiserror::Error;
use uuid::Uuid;

/// Domain errors - business rule failures.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("User {0} is not staff and cannot author posts")]
    NotStaff(Uuid),
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

    /// A row captured in a working set was absent from a follow-up aggregate.
    #[error("Lookup failed: no {entity} with id {id} in aggregate result")]
    Lookup { entity: &'static str, id: Uuid },

    #[error(transparent)]
    Invalid(#[from] DomainError),
}
