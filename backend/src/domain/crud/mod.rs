//! Schema-driven insert, update and delete for allow-listed tables.
//!
//! An operation moves through typed states:
//!
//! ```text
//! LoadedTable --select_row--> SelectedRow --update_form/delete--> SubmittedMutation
//!      \--insert_form-----------------------------------------------/
//! ```
//!
//! Every transition validates against the inspected schema, so coercion and
//! key problems surface before a statement exists. A [`SubmittedMutation`]
//! is consumed by [`TableAdminService`] when it executes.

mod form;
mod service;

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AllowedTable, Error, RawValue, SqlValue, TableSchema, coerce};

pub use form::{FormAction, FormField};
pub use service::{KEY_OPTION_LIMIT, KeyOptions, PREVIEW_ROW_LIMIT, RowPreview, TableAdminService};

/// Raw form input keyed by column name.
pub type RawRow = BTreeMap<String, RawValue>;

/// One coerced column assignment or key predicate.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnValue {
    /// Column name taken from schema metadata.
    pub column: String,
    /// Coerced value.
    pub value: SqlValue,
}

/// Structured single-row statement.
#[derive(Debug, Clone, PartialEq)]
pub enum RowMutation {
    /// `INSERT INTO table (cols) VALUES (...)`.
    Insert {
        /// Target table.
        table: AllowedTable,
        /// One value per insertable column, in ordinal order.
        values: Vec<ColumnValue>,
    },
    /// `UPDATE table SET ... WHERE key`.
    Update {
        /// Target table.
        table: AllowedTable,
        /// Changed columns.
        set: Vec<ColumnValue>,
        /// Every primary-key column.
        key: Vec<ColumnValue>,
    },
    /// `DELETE FROM table WHERE key`.
    Delete {
        /// Target table.
        table: AllowedTable,
        /// Every primary-key column.
        key: Vec<ColumnValue>,
    },
}

impl RowMutation {
    /// Table the statement targets.
    #[must_use]
    pub fn table(&self) -> AllowedTable {
        match self {
            Self::Insert { table, .. } | Self::Update { table, .. } | Self::Delete { table, .. } => {
                *table
            }
        }
    }

    /// Short verb for logs.
    #[must_use]
    pub fn verb(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Update { .. } => "update",
            Self::Delete { .. } => "delete",
        }
    }
}

/// A validated mutation awaiting execution.
///
/// Only the state transitions in this module construct it.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmittedMutation(RowMutation);

impl SubmittedMutation {
    /// The statement to execute.
    #[must_use]
    pub fn mutation(&self) -> &RowMutation {
        &self.0
    }
}

/// Result of submitting an update form.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateSubmission {
    /// At least one column changed.
    Mutation(SubmittedMutation),
    /// Every non-key input was blank; nothing to execute.
    NoChanges,
}

/// Outcome reported to the client after a CRUD request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CrudOutcome {
    /// The statement ran and was committed.
    Executed {
        /// Rows the statement touched.
        #[serde(rename = "affectedRows")]
        affected_rows: u64,
    },
    /// Update skipped because no column had input.
    NoChanges {
        /// Warning for display.
        warning: String,
    },
}

impl CrudOutcome {
    fn no_changes() -> Self {
        Self::NoChanges {
            warning: "no columns changed; update skipped".to_owned(),
        }
    }
}

/// Schema for an allow-listed table, the root of every CRUD operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedTable {
    table: AllowedTable,
    schema: TableSchema,
}

impl LoadedTable {
    /// Pair an allow-listed table with its inspected schema.
    #[must_use]
    pub fn new(table: AllowedTable, schema: TableSchema) -> Self {
        Self { table, schema }
    }

    /// Table being edited.
    #[must_use]
    pub fn table(&self) -> AllowedTable {
        self.table
    }

    /// Inspected schema.
    #[must_use]
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Build an insert from `values`.
    ///
    /// Absent insertable columns are inserted as null. Naming a column that
    /// does not exist or is store-generated fails with `InvalidInput`.
    pub fn insert_form(&self, values: &RawRow) -> Result<SubmittedMutation, Error> {
        reject_unknown_columns(values, |name| {
            self.schema
                .insertable_columns()
                .any(|column| column.name == name)
        })?;

        let values = self
            .schema
            .insertable_columns()
            .map(|column| {
                let raw = values.get(&column.name).unwrap_or(&RawValue::Null);
                coerce_column(&column.name, &column.data_type, raw)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(SubmittedMutation(RowMutation::Insert {
            table: self.table,
            values,
        }))
    }

    /// Select a row by primary-key values.
    ///
    /// Fails with `MissingKey` when the table has no primary key, and with
    /// `InvalidInput` when `key` misses a key column, leaves one blank, or
    /// names a non-key column.
    pub fn select_row(self, key: &RawRow) -> Result<SelectedRow, Error> {
        let key_columns = self.schema.primary_keys();
        if key_columns.is_empty() {
            return Err(Error::missing_key(format!(
                "table {} has no primary key; update and delete are unavailable",
                self.table
            ))
            .with_details(json!({ "table": self.table })));
        }

        reject_unknown_columns(key, |name| key_columns.iter().any(|column| *column == name))?;

        let mut predicates = Vec::with_capacity(key_columns.len());
        for column in self
            .schema
            .columns()
            .iter()
            .filter(|column| column.is_primary_key())
        {
            let raw = key
                .get(&column.name)
                .filter(|raw| !raw.is_blank())
                .ok_or_else(|| {
                    Error::invalid_input(format!("missing value for key column {}", column.name))
                        .with_details(json!({ "column": column.name }))
                })?;
            predicates.push(coerce_column(&column.name, &column.data_type, raw)?);
        }

        Ok(SelectedRow {
            loaded: self,
            key: predicates,
        })
    }
}

/// A row chosen by its full primary key.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedRow {
    loaded: LoadedTable,
    key: Vec<ColumnValue>,
}

impl SelectedRow {
    /// Key predicates identifying the row.
    #[must_use]
    pub fn key(&self) -> &[ColumnValue] {
        &self.key
    }

    /// Build an update from `values`.
    ///
    /// Blank inputs leave their column unchanged. When nothing remains the
    /// result is [`UpdateSubmission::NoChanges`].
    pub fn update_form(&self, values: &RawRow) -> Result<UpdateSubmission, Error> {
        let schema = self.loaded.schema();
        reject_unknown_columns(values, |name| {
            schema.updatable_columns().any(|column| column.name == name)
        })?;

        let set = schema
            .updatable_columns()
            .filter_map(|column| {
                values
                    .get(&column.name)
                    .filter(|raw| !raw.is_blank())
                    .map(|raw| coerce_column(&column.name, &column.data_type, raw))
            })
            .collect::<Result<Vec<_>, _>>()?;

        if set.is_empty() {
            return Ok(UpdateSubmission::NoChanges);
        }
        Ok(UpdateSubmission::Mutation(SubmittedMutation(
            RowMutation::Update {
                table: self.loaded.table(),
                set,
                key: self.key.clone(),
            },
        )))
    }

    /// Build a delete of the selected row.
    #[must_use]
    pub fn delete(self) -> SubmittedMutation {
        SubmittedMutation(RowMutation::Delete {
            table: self.loaded.table(),
            key: self.key,
        })
    }
}

fn reject_unknown_columns<F>(values: &RawRow, mut allowed: F) -> Result<(), Error>
where
    F: FnMut(&str) -> bool,
{
    match values.keys().find(|name| !allowed(name.as_str())) {
        Some(name) => Err(
            Error::invalid_input(format!("column {name} cannot be set here"))
                .with_details(json!({ "column": name })),
        ),
        None => Ok(()),
    }
}

fn coerce_column(column: &str, data_type: &str, raw: &RawValue) -> Result<ColumnValue, Error> {
    coerce(data_type, raw)
        .map(|value| ColumnValue {
            column: column.to_owned(),
            value,
        })
        .map_err(|err| {
            Error::invalid_input(format!("column {column}: {err}")).with_details(json!({
                "column": column,
                "dataType": data_type,
                "value": err.value,
            }))
        })
}
