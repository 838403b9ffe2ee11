//! Driving port for the admin table editor.
//!
//! Every operation takes an [`AdminContext`]; table names arrive already
//! resolved against the allow-list.

use async_trait::async_trait;

use crate::domain::{
    AdminContext, AllowedTable, CrudOutcome, Error, FormAction, FormField, KeyOptions, RawRow,
    RowPreview, TableSchema,
};

/// Schema-driven CRUD over allow-listed tables.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TableAdminCommand: Send + Sync {
    /// Column metadata for `table`.
    async fn schema(&self, admin: &AdminContext, table: AllowedTable)
    -> Result<TableSchema, Error>;

    /// Input fields for an insert or update form.
    async fn form(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        action: FormAction,
    ) -> Result<Vec<FormField>, Error>;

    /// First rows of `table` (at most 200).
    async fn preview_rows(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        limit: u32,
    ) -> Result<RowPreview, Error>;

    /// Selectable values for each primary-key column.
    async fn key_options(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
    ) -> Result<Vec<KeyOptions>, Error>;

    /// Insert one row built from `values`.
    async fn insert(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        values: RawRow,
    ) -> Result<CrudOutcome, Error>;

    /// Update the row selected by `key` with the non-blank `values`.
    async fn update(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        key: RawRow,
        values: RawRow,
    ) -> Result<CrudOutcome, Error>;

    /// Delete the row selected by `key`.
    async fn delete(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        key: RawRow,
    ) -> Result<CrudOutcome, Error>;
}
