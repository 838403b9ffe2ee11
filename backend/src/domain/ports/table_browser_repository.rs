//! Driven port for browsing allow-listed table contents.

use async_trait::async_trait;
use serde_json::{Map, Value};

use super::define_port_error;
use crate::domain::AllowedTable;

define_port_error! {
    /// Errors raised while reading table rows.
    pub enum TableBrowserRepositoryError {
        /// Connection to the backing store failed.
        Connection { message: String } =>
            "table browser connection failed: {message}",
        /// Query failed during execution or decoding.
        Query { message: String } =>
            "table browser query failed: {message}",
    }
}

/// Read-only row access used to pick rows for update or delete.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableBrowserRepository: Send + Sync {
    /// First `limit` rows of `table` as JSON objects keyed by column.
    async fn preview_rows(
        &self,
        table: AllowedTable,
        limit: u32,
    ) -> Result<Vec<Map<String, Value>>, TableBrowserRepositoryError>;

    /// Distinct non-null values of `column`, ascending, at most `limit`.
    ///
    /// `column` must come from inspected schema metadata.
    async fn distinct_values(
        &self,
        table: AllowedTable,
        column: &str,
        limit: u32,
    ) -> Result<Vec<Value>, TableBrowserRepositoryError>;
}

/// Fixture browser over empty tables.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureTableBrowserRepository;

#[async_trait]
impl TableBrowserRepository for FixtureTableBrowserRepository {
    async fn preview_rows(
        &self,
        _table: AllowedTable,
        _limit: u32,
    ) -> Result<Vec<Map<String, Value>>, TableBrowserRepositoryError> {
        Ok(Vec::new())
    }

    async fn distinct_values(
        &self,
        _table: AllowedTable,
        _column: &str,
        _limit: u32,
    ) -> Result<Vec<Value>, TableBrowserRepositoryError> {
        Ok(Vec::new())
    }
}
