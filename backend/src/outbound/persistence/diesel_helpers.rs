//! Shared helpers for the Diesel repository implementations.
//!
//! Diesel and connection errors are reduced to a [`StoreFault`] so each
//! adapter can build its own port error without repeating the kind matching.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::connection::ConnectError;

/// Coarse classification of a failed store operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum StoreFault {
    /// The connection was lost or refused.
    Connection(String),
    /// A constraint rejected the statement.
    Constraint(String),
    /// Any other statement failure.
    Query(String),
}

impl StoreFault {
    /// Message carried by the fault.
    pub(crate) fn into_message(self) -> String {
        match self {
            Self::Connection(message) | Self::Constraint(message) | Self::Query(message) => {
                message
            }
        }
    }
}

/// Extract a readable message from a connect error.
pub(crate) fn map_connect_error_message(error: ConnectError) -> String {
    match error {
        ConnectError::Establish { message } => message,
    }
}

/// Extract a readable message from a Diesel error and emit debug context.
pub(crate) fn map_diesel_error_message(error: &DieselError, operation: &str) -> String {
    let error_message = error.to_string();
    debug!(%error_message, %operation, "diesel operation failed");
    error_message
}

/// Classify a Diesel error.
pub(crate) fn classify_diesel_error(error: &DieselError, operation: &str) -> StoreFault {
    let message = map_diesel_error_message(error, operation);
    match error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, constraint = ?info.constraint_name(), %operation, "database error");
            match kind {
                DatabaseErrorKind::UniqueViolation
                | DatabaseErrorKind::ForeignKeyViolation
                | DatabaseErrorKind::NotNullViolation
                | DatabaseErrorKind::CheckViolation => StoreFault::Constraint(message),
                DatabaseErrorKind::ClosedConnection => StoreFault::Connection(message),
                _ => StoreFault::Query(message),
            }
        }
        DieselError::BrokenTransactionManager => StoreFault::Connection(message),
        _ => StoreFault::Query(message),
    }
}

/// Quote a SQL identifier for PostgreSQL.
///
/// Identifiers reaching this function come from the allow-list or from
/// `information_schema`; quoting keeps mixed-case names intact.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Convert an unsigned row count to the `BIGINT` bound in `LIMIT`.
pub(crate) fn limit_param(limit: u32) -> i64 {
    i64::from(limit)
}

/// Convert a driver row count to the report type.
pub(crate) fn row_count(rows: usize) -> u64 {
    u64::try_from(rows).unwrap_or(u64::MAX)
}
