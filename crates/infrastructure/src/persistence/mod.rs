//! Persistence adapters.

pub mod in_memory;
pub mod postgres;

use talentgrid_domain::shared_kernel::DomainError;

/// Map a sqlx error into the domain taxonomy: unique-constraint and
/// serialization failures become retryable conflicts, everything else is an
/// infrastructure error.
pub(crate) fn map_sqlx_err(err: sqlx::Error) -> DomainError {
    if let sqlx::Error::Database(db) = &err {
        let serialization_failure = db.code().as_deref() == Some("40001");
        if db.is_unique_violation() || serialization_failure {
            return DomainError::Conflict {
                message: db.message().to_string(),
            };
        }
    }
    DomainError::InfrastructureError {
        message: err.to_string(),
    }
}
