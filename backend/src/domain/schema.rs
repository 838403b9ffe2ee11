//! Table allow-list and column metadata.
//!
//! Everything the admin surface does starts from a [`TableSchema`]: which
//! columns exist, their declared types, which form the primary key, and which
//! the store fills in by itself. Identifiers that eventually reach SQL come
//! only from these values, never from request payloads.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;
use crate::domain::ports::{SchemaRepository, SchemaRepositoryError};

/// Staging table fed by the bulk loader. Not part of the CRUD allow-list.
pub const STAGING_TABLE: &str = "staging_lot_building_distance";

/// Tables exposed to the admin CRUD surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum AllowedTable {
    /// Destination buildings.
    Buildings,
    /// Parking lots.
    Lots,
    /// Lot to permit associations.
    LotPermit,
    /// Timestamped lot capacity snapshots.
    LotInventory,
}

impl AllowedTable {
    /// Every allow-listed table, in display order.
    pub const ALL: [Self; 4] = [Self::Buildings, Self::Lots, Self::LotPermit, Self::LotInventory];

    /// Resolve a requested table name against the allow-list.
    ///
    /// Matching is exact; anything else fails with
    /// [`crate::domain::ErrorCode::SchemaUnavailable`] before any metadata
    /// lookup happens.
    ///
    /// # Examples
    /// ```
    /// use smartpark::domain::AllowedTable;
    ///
    /// assert_eq!(AllowedTable::parse("lots").ok(), Some(AllowedTable::Lots));
    /// assert!(AllowedTable::parse("permits").is_err());
    /// ```
    pub fn parse(name: &str) -> Result<Self, Error> {
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == name)
            .ok_or_else(|| {
                Error::schema_unavailable(format!("table {name:?} is not available for editing"))
                    .with_details(serde_json::json!({ "table": name }))
            })
    }

    /// Table name as stored.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Buildings => "buildings",
            Self::Lots => "lots",
            Self::LotPermit => "lot_permit",
            Self::LotInventory => "lot_inventory",
        }
    }
}

impl fmt::Display for AllowedTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Key participation of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum KeyRole {
    /// Part of the primary key.
    #[serde(rename = "PRI")]
    Primary,
    /// Covered by a unique constraint.
    #[serde(rename = "UNI")]
    Unique,
    /// Part of a foreign key.
    #[serde(rename = "MUL")]
    Foreign,
    /// No key role.
    #[serde(rename = "")]
    None,
}

impl KeyRole {
    /// Parse the short code used by the introspection query.
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "PRI" => Self::Primary,
            "UNI" => Self::Unique,
            "MUL" => Self::Foreign,
            _ => Self::None,
        }
    }
}

/// How the store populates a column on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub enum ColumnExtra {
    /// Sequence default or identity column.
    #[serde(rename = "auto_increment")]
    AutoIncrement,
    /// Generated (computed) column.
    #[serde(rename = "generated")]
    Generated,
    /// Plain column.
    #[serde(rename = "")]
    None,
}

impl ColumnExtra {
    /// Parse the flag emitted by the introspection query.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "auto_increment" => Self::AutoIncrement,
            "generated" => Self::Generated,
            _ => Self::None,
        }
    }
}

/// Metadata for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMeta {
    /// Column name.
    pub name: String,
    /// Declared type as reported by the store.
    pub data_type: String,
    /// Whether `NULL` is accepted.
    pub is_nullable: bool,
    /// Key participation.
    pub key_role: KeyRole,
    /// Store-side population.
    pub extra: ColumnExtra,
}

impl ColumnMeta {
    /// True when the store fills the column itself.
    #[must_use]
    pub fn is_auto_generated(&self) -> bool {
        !matches!(self.extra, ColumnExtra::None)
    }

    /// True when the column is part of the primary key.
    #[must_use]
    pub fn is_primary_key(&self) -> bool {
        self.key_role == KeyRole::Primary
    }
}

/// Ordered column metadata for one table.
///
/// ## Invariants
/// - At least one column.
/// - Columns keep the store's ordinal order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TableSchema {
    table: String,
    columns: Vec<ColumnMeta>,
}

impl TableSchema {
    /// Wrap introspected columns, rejecting an empty result.
    pub fn new(table: impl Into<String>, columns: Vec<ColumnMeta>) -> Result<Self, Error> {
        let table = table.into();
        if columns.is_empty() {
            return Err(
                Error::schema_unavailable(format!("no column metadata found for {table}"))
                    .with_details(serde_json::json!({ "table": table })),
            );
        }
        Ok(Self { table, columns })
    }

    /// Table the metadata belongs to.
    #[must_use]
    pub fn table(&self) -> &str {
        self.table.as_str()
    }

    /// All columns in ordinal order.
    #[must_use]
    pub fn columns(&self) -> &[ColumnMeta] {
        &self.columns
    }

    /// Look up a column by exact name.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnMeta> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Primary-key column names in ordinal order.
    #[must_use]
    pub fn primary_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .filter(|column| column.is_primary_key())
            .map(|column| column.name.as_str())
            .collect()
    }

    /// Columns an insert supplies values for.
    pub fn insertable_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns.iter().filter(|column| !column.is_auto_generated())
    }

    /// Columns an update may change.
    pub fn updatable_columns(&self) -> impl Iterator<Item = &ColumnMeta> {
        self.columns
            .iter()
            .filter(|column| !column.is_primary_key() && !column.is_auto_generated())
    }
}

/// Reads table metadata through a [`SchemaRepository`].
#[derive(Clone)]
pub struct SchemaInspector<R> {
    repository: Arc<R>,
}

impl<R> SchemaInspector<R>
where
    R: SchemaRepository,
{
    /// Create an inspector over `repository`.
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Metadata for an allow-listed table.
    pub async fn get_schema(&self, table: AllowedTable) -> Result<TableSchema, Error> {
        self.load(table.as_str()).await
    }

    /// Metadata for the bulk loader's staging table.
    pub async fn staging_schema(&self) -> Result<TableSchema, Error> {
        self.load(STAGING_TABLE).await
    }

    async fn load(&self, table: &str) -> Result<TableSchema, Error> {
        let columns = self
            .repository
            .load_columns(table)
            .await
            .map_err(map_schema_error)?;
        TableSchema::new(table, columns)
    }
}

fn map_schema_error(error: SchemaRepositoryError) -> Error {
    match error {
        SchemaRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("schema metadata unavailable: {message}"))
        }
        SchemaRepositoryError::Query { message } => {
            Error::store_failure(format!("schema metadata query failed: {message}"))
                .with_details(serde_json::json!({ "kind": "query" }))
        }
    }
}
