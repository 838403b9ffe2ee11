//! Two-phase distance loader: stage an uploaded CSV, then materialize it.
//!
//! Staging replaces the whole staging table with the upload, positionally,
//! after checking the header against the staging table's columns.
//! Materialization joins staged names to lots and buildings and upserts the
//! matches into `lot_building_distance`; see
//! [`crate::domain::ports::StagingRepository`] for the store contract.

use std::num::NonZeroUsize;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use tracing::{info, warn};
use utoipa::ToSchema;

use crate::domain::ports::{
    DistanceLoadCommand, SchemaRepository, StagingRepository, StagingRepositoryError,
};
use crate::domain::{AdminContext, Error, SchemaInspector};

/// Default number of rows per staging insert.
pub const DEFAULT_BATCH_SIZE: usize = 5000;

/// Byte-order mark that spreadsheet exports put before the header.
const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Maximum number of unmatched rows echoed in a materialize report.
pub const UNMATCHED_SAMPLE_LIMIT: u32 = 100;

/// Commit behaviour while staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum StagingMode {
    /// Commit after every batch; a failure keeps earlier batches.
    #[default]
    PerBatch,
    /// Truncate and every batch share one transaction.
    Atomic,
}

/// Batch size and commit mode for one staging run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingPlan {
    /// Rows per insert statement.
    pub batch_size: NonZeroUsize,
    /// Commit behaviour.
    pub mode: StagingMode,
}

impl Default for StagingPlan {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            mode: StagingMode::PerBatch,
        }
    }
}

impl StagingPlan {
    /// Plan with `batch_size` rows per batch; zero falls back to one.
    #[must_use]
    pub fn new(batch_size: usize, mode: StagingMode) -> Self {
        Self {
            batch_size: NonZeroUsize::new(batch_size).unwrap_or(NonZeroUsize::MIN),
            mode,
        }
    }

    /// Number of batches needed for `rows` rows.
    #[must_use]
    pub fn batch_count(&self, rows: usize) -> u64 {
        u64::try_from(rows.div_ceil(self.batch_size.get())).unwrap_or(u64::MAX)
    }
}

/// What the store wrote while staging.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StagingWrite {
    /// Rows inserted.
    pub rows: u64,
    /// Batches committed (or executed, in atomic mode).
    pub batches: u64,
}

/// Outcome of a staging run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StageReport {
    /// Rows now in the staging table.
    pub rows: u64,
    /// Insert batches executed.
    pub batches: u64,
    /// Hex SHA-256 of the uploaded bytes.
    pub sha256: String,
    /// Commit behaviour used.
    pub mode: StagingMode,
}

/// Staged row that matched no lot or no building.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UnmatchedStagingRow {
    /// Raw lot title.
    pub lot_title_raw: Option<String>,
    /// Raw building name.
    pub building_name_raw: Option<String>,
    /// Raw distance text.
    pub distance_sec_raw: Option<String>,
    /// Whether the lot title resolved.
    pub lot_matched: bool,
    /// Whether the building name resolved.
    pub building_matched: bool,
}

/// Outcome of a materialize run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MaterializeReport {
    /// Distance rows inserted or updated.
    pub upserted_rows: u64,
    /// Staged rows dropped because a name did not resolve.
    pub unmatched_rows: u64,
    /// Up to [`UNMATCHED_SAMPLE_LIMIT`] of the dropped rows.
    pub unmatched_sample: Vec<UnmatchedStagingRow>,
}

/// Parsed and header-checked upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagingUpload {
    rows: Vec<Vec<Option<String>>>,
    sha256: String,
}

impl StagingUpload {
    /// Parse `bytes` as CSV whose header must equal `expected_columns`.
    ///
    /// Empty cells become `None`. Any row with a different field count is
    /// rejected with its line number. A leading UTF-8 byte-order mark is
    /// ignored; the digest still covers the bytes as uploaded.
    pub fn parse(bytes: &[u8], expected_columns: &[String]) -> Result<Self, Error> {
        let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body);

        let actual: Vec<String> = reader
            .headers()
            .map_err(|err| Error::invalid_input(format!("upload is not valid CSV: {err}")))?
            .iter()
            .map(|header| header.trim().to_owned())
            .collect();
        if actual != expected_columns {
            return Err(Error::invalid_input(
                "upload header does not match the staging table columns",
            )
            .with_details(json!({ "expected": expected_columns, "actual": actual })));
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record
                .map_err(|err| Error::invalid_input(format!("upload is not valid CSV: {err}")))?;
            if record.len() != expected_columns.len() {
                let line = record.position().map(csv::Position::line);
                return Err(Error::invalid_input(format!(
                    "row has {} fields, expected {}",
                    record.len(),
                    expected_columns.len()
                ))
                .with_details(json!({ "line": line })));
            }
            rows.push(
                record
                    .iter()
                    .map(|cell| (!cell.is_empty()).then(|| cell.to_owned()))
                    .collect(),
            );
        }

        Ok(Self {
            rows,
            sha256: hex::encode(Sha256::digest(bytes)),
        })
    }

    /// Data rows, header excluded.
    #[must_use]
    pub fn rows(&self) -> &[Vec<Option<String>>] {
        &self.rows
    }

    /// Hex SHA-256 of the raw upload.
    #[must_use]
    pub fn sha256(&self) -> &str {
        self.sha256.as_str()
    }
}

fn map_staging_error(error: StagingRepositoryError) -> Error {
    match error {
        StagingRepositoryError::Connection { message } => {
            Error::store_failure(format!("staging store unavailable: {message}"))
                .with_details(json!({ "kind": "connection" }))
        }
        StagingRepositoryError::BatchFailed {
            message,
            committed_rows,
        } => Error::store_failure(format!(
            "staging stopped after {committed_rows} committed rows: {message}"
        ))
        .with_details(json!({ "kind": "query", "committedRows": committed_rows })),
        StagingRepositoryError::Query { message } => {
            Error::store_failure(format!("staging statement failed: {message}"))
                .with_details(json!({ "kind": "query" }))
        }
    }
}

/// Distance loader over a schema source and a staging store.
#[derive(Clone)]
pub struct BulkLoadService<S, R> {
    inspector: SchemaInspector<S>,
    staging: Arc<R>,
    plan: StagingPlan,
}

impl<S, R> BulkLoadService<S, R>
where
    S: SchemaRepository,
    R: StagingRepository,
{
    /// Create a loader using `plan` for every staging run.
    pub fn new(schema: Arc<S>, staging: Arc<R>, plan: StagingPlan) -> Self {
        Self {
            inspector: SchemaInspector::new(schema),
            staging,
            plan,
        }
    }
}

#[async_trait]
impl<S, R> DistanceLoadCommand for BulkLoadService<S, R>
where
    S: SchemaRepository,
    R: StagingRepository,
{
    async fn stage(&self, admin: &AdminContext, upload: &[u8]) -> Result<StageReport, Error> {
        let schema = self.inspector.staging_schema().await?;
        let columns: Vec<String> = schema
            .insertable_columns()
            .map(|column| column.name.clone())
            .collect();
        let parsed = StagingUpload::parse(upload, &columns)?;

        let written = self
            .staging
            .replace_rows(&columns, parsed.rows(), self.plan)
            .await
            .map_err(map_staging_error)?;

        info!(
            operator = admin.operator(),
            rows = written.rows,
            batches = written.batches,
            sha256 = parsed.sha256(),
            mode = ?self.plan.mode,
            "distance staging complete"
        );
        Ok(StageReport {
            rows: written.rows,
            batches: written.batches,
            sha256: parsed.sha256,
            mode: self.plan.mode,
        })
    }

    async fn materialize(&self, admin: &AdminContext) -> Result<MaterializeReport, Error> {
        let report = self
            .staging
            .materialize(UNMATCHED_SAMPLE_LIMIT)
            .await
            .map_err(map_staging_error)?;

        if report.unmatched_rows > 0 {
            warn!(
                unmatched = report.unmatched_rows,
                "staged distance rows did not match a lot or building"
            );
        }
        info!(
            operator = admin.operator(),
            upserted = report.upserted_rows,
            "distance materialize complete"
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests;
