//! Driving port for the two-phase distance loader.

use async_trait::async_trait;

use crate::domain::{AdminContext, Error, MaterializeReport, StageReport};

/// Stage an uploaded distance file, then materialize it.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DistanceLoadCommand: Send + Sync {
    /// Replace the staging table with the CSV in `upload`.
    async fn stage(&self, admin: &AdminContext, upload: &[u8]) -> Result<StageReport, Error>;

    /// Upsert staged rows into production distances.
    async fn materialize(&self, admin: &AdminContext) -> Result<MaterializeReport, Error>;
}
