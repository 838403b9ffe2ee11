//! Driven port for table column metadata.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{ColumnExtra, ColumnMeta, KeyRole};

define_port_error! {
    /// Errors raised while reading column metadata.
    pub enum SchemaRepositoryError {
        /// Connection to the backing store failed.
        Connection { message: String } =>
            "schema metadata connection failed: {message}",
        /// Introspection query failed.
        Query { message: String } =>
            "schema metadata query failed: {message}",
    }
}

/// Port for reading ordered column metadata for a table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SchemaRepository: Send + Sync {
    /// Columns of `table` in ordinal order. Unknown tables yield an empty list.
    async fn load_columns(&self, table: &str) -> Result<Vec<ColumnMeta>, SchemaRepositoryError>;
}

/// Fixture repository describing the shipped migration schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureSchemaRepository;

#[async_trait]
impl SchemaRepository for FixtureSchemaRepository {
    async fn load_columns(&self, table: &str) -> Result<Vec<ColumnMeta>, SchemaRepositoryError> {
        let columns: &[(&str, &str, bool, KeyRole, ColumnExtra)] = match table {
            "buildings" => &[
                ("building_id", "integer", false, KeyRole::Primary, ColumnExtra::AutoIncrement),
                ("name", "text", false, KeyRole::None, ColumnExtra::None),
                ("latitude", "double precision", false, KeyRole::None, ColumnExtra::None),
                ("longitude", "double precision", false, KeyRole::None, ColumnExtra::None),
            ],
            "lots" => &[
                ("lot_id", "integer", false, KeyRole::Primary, ColumnExtra::AutoIncrement),
                ("title", "text", false, KeyRole::None, ColumnExtra::None),
                ("latitude", "double precision", true, KeyRole::None, ColumnExtra::None),
                ("longitude", "double precision", true, KeyRole::None, ColumnExtra::None),
            ],
            "lot_permit" => &[
                ("lot_id", "integer", false, KeyRole::Primary, ColumnExtra::None),
                ("permit_id", "integer", false, KeyRole::Primary, ColumnExtra::None),
            ],
            "lot_inventory" => &[
                ("lot_id", "integer", false, KeyRole::Primary, ColumnExtra::None),
                ("snapshot_ts", "timestamp without time zone", false, KeyRole::Primary, ColumnExtra::None),
                ("capacity_total", "integer", false, KeyRole::None, ColumnExtra::None),
            ],
            "staging_lot_building_distance" => &[
                ("lot_title_raw", "text", true, KeyRole::None, ColumnExtra::None),
                ("building_name_raw", "text", true, KeyRole::None, ColumnExtra::None),
                ("distance_sec_raw", "text", true, KeyRole::None, ColumnExtra::None),
            ],
            _ => &[],
        };
        Ok(columns
            .iter()
            .map(|&(name, data_type, is_nullable, key_role, extra)| ColumnMeta {
                name: name.to_owned(),
                data_type: data_type.to_owned(),
                is_nullable,
                key_role,
                extra,
            })
            .collect())
    }
}
