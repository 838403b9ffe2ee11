//! Driven port for the distance staging table and its materialization.

use async_trait::async_trait;

use super::define_port_error;
use super::row_mutation_repository::NO_STORE_MESSAGE;
use crate::domain::{MaterializeReport, StagingPlan, StagingWrite};

define_port_error! {
    /// Errors raised while staging or materializing distances.
    pub enum StagingRepositoryError {
        /// Connection to the backing store failed.
        Connection { message: String } =>
            "staging connection failed: {message}",
        /// A batch insert failed after earlier batches were committed.
        BatchFailed { message: String, committed_rows: u64 } =>
            "staging batch failed after {committed_rows} committed rows: {message}",
        /// Statement failed; nothing from it was committed.
        Query { message: String } =>
            "staging query failed: {message}",
    }
}

/// Port owning the staging table lifecycle.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StagingRepository: Send + Sync {
    /// Truncate the staging table and insert `rows` positionally into
    /// `columns`, batching according to `plan`.
    async fn replace_rows(
        &self,
        columns: &[String],
        rows: &[Vec<Option<String>>],
        plan: StagingPlan,
    ) -> Result<StagingWrite, StagingRepositoryError>;

    /// Upsert name-matched staging rows into the production distance table
    /// in one transaction, reporting at most `sample_limit` unmatched rows.
    async fn materialize(
        &self,
        sample_limit: u32,
    ) -> Result<MaterializeReport, StagingRepositoryError>;
}

/// Fixture repository for servers without a database. Uploads and
/// materialization fail because there is no staging table to write to.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureStagingRepository;

#[async_trait]
impl StagingRepository for FixtureStagingRepository {
    async fn replace_rows(
        &self,
        _columns: &[String],
        _rows: &[Vec<Option<String>>],
        _plan: StagingPlan,
    ) -> Result<StagingWrite, StagingRepositoryError> {
        Err(StagingRepositoryError::connection(NO_STORE_MESSAGE))
    }

    async fn materialize(
        &self,
        _sample_limit: u32,
    ) -> Result<MaterializeReport, StagingRepositoryError> {
        Err(StagingRepositoryError::connection(NO_STORE_MESSAGE))
    }
}
