//! PostgreSQL-backed table browser.
//!
//! Rows of arbitrary shape are rendered to JSON by PostgreSQL itself
//! (`row_to_json` / `to_jsonb`) and parsed back with `serde_json`, so the
//! adapter needs no per-table row struct.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::BigInt;
use diesel_async::RunQueryDsl;
use serde_json::{Map, Value};

use crate::domain::AllowedTable;
use crate::domain::ports::{TableBrowserRepository, TableBrowserRepositoryError};

use super::connection::{ConnectError, DbConnector};
use super::diesel_helpers::{
    StoreFault, classify_diesel_error, limit_param, map_connect_error_message, quote_identifier,
};
use super::models::JsonTextRow;

/// Diesel-backed implementation of the table browser port.
#[derive(Debug, Clone)]
pub struct DieselTableBrowserRepository {
    connector: DbConnector,
}

impl DieselTableBrowserRepository {
    /// Create a repository that connects through `connector`.
    pub fn new(connector: DbConnector) -> Self {
        Self { connector }
    }
}

fn map_connect_error(error: ConnectError) -> TableBrowserRepositoryError {
    TableBrowserRepositoryError::connection(map_connect_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> TableBrowserRepositoryError {
    match classify_diesel_error(&error, "table browse") {
        StoreFault::Connection(message) => TableBrowserRepositoryError::connection(message),
        fault => TableBrowserRepositoryError::query(fault.into_message()),
    }
}

fn preview_sql(table: AllowedTable) -> String {
    format!(
        "SELECT row_to_json(t)::text AS json FROM (SELECT * FROM {} LIMIT $1) t",
        quote_identifier(table.as_str())
    )
}

fn distinct_sql(table: AllowedTable, column: &str) -> String {
    let column = quote_identifier(column);
    format!(
        concat!(
            "SELECT to_jsonb(v.value)::text AS json FROM (",
            "SELECT DISTINCT {column} AS value FROM {table} ",
            "WHERE {column} IS NOT NULL ORDER BY 1 LIMIT $1) v"
        ),
        column = column,
        table = quote_identifier(table.as_str()),
    )
}

fn parse_json(row: &JsonTextRow) -> Result<Value, TableBrowserRepositoryError> {
    serde_json::from_str(&row.json)
        .map_err(|err| TableBrowserRepositoryError::query(format!("invalid row json: {err}")))
}

#[async_trait]
impl TableBrowserRepository for DieselTableBrowserRepository {
    async fn preview_rows(
        &self,
        table: AllowedTable,
        limit: u32,
    ) -> Result<Vec<Map<String, Value>>, TableBrowserRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<JsonTextRow> = sql_query(preview_sql(table))
            .bind::<BigInt, _>(limit_param(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.iter()
            .map(|row| match parse_json(row)? {
                Value::Object(object) => Ok(object),
                other => Err(TableBrowserRepositoryError::query(format!(
                    "expected a json object, got {other}"
                ))),
            })
            .collect()
    }

    async fn distinct_values(
        &self,
        table: AllowedTable,
        column: &str,
        limit: u32,
    ) -> Result<Vec<Value>, TableBrowserRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<JsonTextRow> = sql_query(distinct_sql(table, column))
            .bind::<BigInt, _>(limit_param(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        rows.iter().map(parse_json).collect()
    }
}
