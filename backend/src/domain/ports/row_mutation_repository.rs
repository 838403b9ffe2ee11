//! Driven port executing single-row mutations.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::RowMutation;

define_port_error! {
    /// Errors raised while executing a mutation.
    pub enum RowMutationRepositoryError {
        /// Connection to the backing store failed or was lost.
        Connection { message: String } =>
            "row mutation connection failed: {message}",
        /// The store rejected the statement on a constraint.
        Constraint { message: String } =>
            "row mutation violated a constraint: {message}",
        /// Statement failed for another reason (type mismatch, syntax).
        Query { message: String } =>
            "row mutation failed: {message}",
    }
}

/// Port running one mutation as a single committed statement.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RowMutationRepository: Send + Sync {
    /// Execute `mutation` and return the number of affected rows.
    async fn execute(&self, mutation: &RowMutation) -> Result<u64, RowMutationRepositoryError>;
}

/// Message reported by the fixture mutation and staging ports.
pub const NO_STORE_MESSAGE: &str = "no store configured";

/// Fixture repository for servers without a database. Nothing can be
/// written, so every mutation fails as not applied.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureRowMutationRepository;

#[async_trait]
impl RowMutationRepository for FixtureRowMutationRepository {
    async fn execute(&self, _mutation: &RowMutation) -> Result<u64, RowMutationRepositoryError> {
        Err(RowMutationRepositoryError::connection(NO_STORE_MESSAGE))
    }
}
