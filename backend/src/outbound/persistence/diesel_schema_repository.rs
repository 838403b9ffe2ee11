//! PostgreSQL-backed column metadata adapter.
//!
//! Reads `information_schema.columns` in ordinal order and folds constraint
//! membership into a single key role per column (primary beats unique beats
//! foreign).

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::Text;
use diesel_async::RunQueryDsl;

use crate::domain::ColumnMeta;
use crate::domain::ports::{SchemaRepository, SchemaRepositoryError};

use super::connection::{ConnectError, DbConnector};
use super::diesel_helpers::{StoreFault, classify_diesel_error, map_connect_error_message};
use super::models::ColumnRow;

const COLUMNS_SQL: &str = concat!(
    "SELECT c.column_name::text AS column_name, ",
    "       c.data_type::text AS data_type, ",
    "       (c.is_nullable = 'YES') AS is_nullable, ",
    "       COALESCE(( ",
    "           SELECT CASE ",
    "                      WHEN bool_or(tc.constraint_type = 'PRIMARY KEY') THEN 'PRI' ",
    "                      WHEN bool_or(tc.constraint_type = 'UNIQUE') THEN 'UNI' ",
    "                      WHEN bool_or(tc.constraint_type = 'FOREIGN KEY') THEN 'MUL' ",
    "                      ELSE '' ",
    "                  END ",
    "           FROM information_schema.key_column_usage kcu ",
    "           JOIN information_schema.table_constraints tc ",
    "             ON tc.constraint_schema = kcu.constraint_schema ",
    "            AND tc.constraint_name = kcu.constraint_name ",
    "            AND tc.table_name = kcu.table_name ",
    "           WHERE kcu.table_schema = c.table_schema ",
    "             AND kcu.table_name = c.table_name ",
    "             AND kcu.column_name = c.column_name ",
    "       ), '') AS key_role, ",
    "       CASE ",
    "           WHEN c.is_generated = 'ALWAYS' THEN 'generated' ",
    "           WHEN c.is_identity = 'YES' OR c.column_default LIKE 'nextval(%' ",
    "               THEN 'auto_increment' ",
    "           ELSE '' ",
    "       END AS extra ",
    "FROM information_schema.columns c ",
    "WHERE c.table_schema = current_schema() ",
    "  AND c.table_name = $1 ",
    "ORDER BY c.ordinal_position"
);

/// Diesel-backed implementation of the schema metadata port.
#[derive(Debug, Clone)]
pub struct DieselSchemaRepository {
    connector: DbConnector,
}

impl DieselSchemaRepository {
    /// Create a repository that connects through `connector`.
    pub fn new(connector: DbConnector) -> Self {
        Self { connector }
    }
}

fn map_connect_error(error: ConnectError) -> SchemaRepositoryError {
    SchemaRepositoryError::connection(map_connect_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> SchemaRepositoryError {
    match classify_diesel_error(&error, "schema metadata read") {
        StoreFault::Connection(message) => SchemaRepositoryError::connection(message),
        fault => SchemaRepositoryError::query(fault.into_message()),
    }
}

#[async_trait]
impl SchemaRepository for DieselSchemaRepository {
    async fn load_columns(&self, table: &str) -> Result<Vec<ColumnMeta>, SchemaRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<ColumnRow> = sql_query(COLUMNS_SQL)
            .bind::<Text, _>(table)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(ColumnMeta::from).collect())
    }
}
