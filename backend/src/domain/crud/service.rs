//! CRUD and table-browsing service behind [`TableAdminCommand`].

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value, json};
use tracing::{debug, info, warn};
use utoipa::ToSchema;

use super::{CrudOutcome, FormAction, FormField, LoadedTable, RawRow, SubmittedMutation, UpdateSubmission};
use crate::domain::ports::{
    RowMutationRepository, RowMutationRepositoryError, SchemaRepository, TableAdminCommand,
    TableBrowserRepository, TableBrowserRepositoryError,
};
use crate::domain::{AdminContext, AllowedTable, Error, SchemaInspector, TableSchema};

/// Upper bound for row previews.
pub const PREVIEW_ROW_LIMIT: u32 = 200;

/// Upper bound for distinct values listed per key column.
pub const KEY_OPTION_LIMIT: u32 = 10_000;

/// First rows of a table.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RowPreview {
    /// Table previewed.
    pub table: AllowedTable,
    /// Row cap applied.
    pub limit: u32,
    /// Rows as column-keyed objects.
    #[schema(value_type = Vec<Object>)]
    pub rows: Vec<Map<String, Value>>,
}

/// Selectable values for one primary-key column.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct KeyOptions {
    /// Key column.
    pub column: String,
    /// Distinct non-null values, ascending.
    #[schema(value_type = Vec<Object>)]
    pub values: Vec<Value>,
}

/// Schema-driven table editor.
#[derive(Clone)]
pub struct TableAdminService<S, M, B> {
    inspector: SchemaInspector<S>,
    mutations: Arc<M>,
    browser: Arc<B>,
}

impl<S, M, B> TableAdminService<S, M, B>
where
    S: SchemaRepository,
    M: RowMutationRepository,
    B: TableBrowserRepository,
{
    /// Create the service from its driven ports.
    pub fn new(schema: Arc<S>, mutations: Arc<M>, browser: Arc<B>) -> Self {
        Self {
            inspector: SchemaInspector::new(schema),
            mutations,
            browser,
        }
    }

    async fn load(&self, table: AllowedTable) -> Result<LoadedTable, Error> {
        let schema = self.inspector.get_schema(table).await?;
        Ok(LoadedTable::new(table, schema))
    }

    /// Run a validated mutation and report the affected row count.
    pub async fn execute(
        &self,
        admin: &AdminContext,
        submitted: SubmittedMutation,
    ) -> Result<CrudOutcome, Error> {
        let mutation = submitted.mutation();
        let affected_rows = self
            .mutations
            .execute(mutation)
            .await
            .map_err(map_mutation_error)?;
        info!(
            operator = admin.operator(),
            table = %mutation.table(),
            operation = mutation.verb(),
            affected_rows,
            "row mutation committed"
        );
        Ok(CrudOutcome::Executed { affected_rows })
    }
}

fn map_mutation_error(error: RowMutationRepositoryError) -> Error {
    debug!(%error, "row mutation failed");
    let (kind, message) = match error {
        RowMutationRepositoryError::Connection { message } => ("connection", message),
        RowMutationRepositoryError::Constraint { message } => ("constraint", message),
        RowMutationRepositoryError::Query { message } => ("query", message),
    };
    Error::store_failure(format!("statement was not applied: {message}"))
        .with_details(json!({ "kind": kind }))
}

fn map_browser_error(error: TableBrowserRepositoryError) -> Error {
    match error {
        TableBrowserRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("table rows unavailable: {message}"))
        }
        TableBrowserRepositoryError::Query { message } => {
            Error::store_failure(format!("table rows query failed: {message}"))
                .with_details(json!({ "kind": "query" }))
        }
    }
}

#[async_trait]
impl<S, M, B> TableAdminCommand for TableAdminService<S, M, B>
where
    S: SchemaRepository,
    M: RowMutationRepository,
    B: TableBrowserRepository,
{
    async fn schema(
        &self,
        _admin: &AdminContext,
        table: AllowedTable,
    ) -> Result<TableSchema, Error> {
        self.inspector.get_schema(table).await
    }

    async fn form(
        &self,
        _admin: &AdminContext,
        table: AllowedTable,
        action: FormAction,
    ) -> Result<Vec<FormField>, Error> {
        let loaded = self.load(table).await?;
        if action == FormAction::Update && loaded.schema().primary_keys().is_empty() {
            return Err(Error::missing_key(format!("table {table} has no primary key"))
                .with_details(json!({ "table": table })));
        }
        Ok(action.fields(loaded.schema()))
    }

    async fn preview_rows(
        &self,
        _admin: &AdminContext,
        table: AllowedTable,
        limit: u32,
    ) -> Result<RowPreview, Error> {
        let limit = limit.min(PREVIEW_ROW_LIMIT);
        let rows = self
            .browser
            .preview_rows(table, limit)
            .await
            .map_err(map_browser_error)?;
        Ok(RowPreview { table, limit, rows })
    }

    async fn key_options(
        &self,
        _admin: &AdminContext,
        table: AllowedTable,
    ) -> Result<Vec<KeyOptions>, Error> {
        let loaded = self.load(table).await?;
        let key_columns = loaded.schema().primary_keys();
        if key_columns.is_empty() {
            return Err(Error::missing_key(format!("table {table} has no primary key"))
                .with_details(json!({ "table": table })));
        }

        let mut options = Vec::with_capacity(key_columns.len());
        for column in key_columns {
            let values = self
                .browser
                .distinct_values(table, column, KEY_OPTION_LIMIT)
                .await
                .map_err(map_browser_error)?;
            options.push(KeyOptions {
                column: column.to_owned(),
                values,
            });
        }
        Ok(options)
    }

    async fn insert(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        values: RawRow,
    ) -> Result<CrudOutcome, Error> {
        let submitted = self.load(table).await?.insert_form(&values)?;
        self.execute(admin, submitted).await
    }

    async fn update(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        key: RawRow,
        values: RawRow,
    ) -> Result<CrudOutcome, Error> {
        let selected = self.load(table).await?.select_row(&key)?;
        match selected.update_form(&values)? {
            UpdateSubmission::Mutation(submitted) => self.execute(admin, submitted).await,
            UpdateSubmission::NoChanges => {
                warn!(operator = admin.operator(), %table, "update skipped: no columns changed");
                Ok(CrudOutcome::no_changes())
            }
        }
    }

    async fn delete(
        &self,
        admin: &AdminContext,
        table: AllowedTable,
        key: RawRow,
    ) -> Result<CrudOutcome, Error> {
        let submitted = self.load(table).await?.select_row(&key)?.delete();
        self.execute(admin, submitted).await
    }
}
