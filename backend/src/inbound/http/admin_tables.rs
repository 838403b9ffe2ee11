//! Admin table editor endpoints.
//!
//! Every route requires an admin session and resolves `{table}` against the
//! allow-list before the domain sees it.
//!
//! ```text
//! GET    /api/v1/admin/tables
//! GET    /api/v1/admin/tables/{table}/schema
//! GET    /api/v1/admin/tables/{table}/form?action=insert
//! GET    /api/v1/admin/tables/{table}/rows?limit=50
//! GET    /api/v1/admin/tables/{table}/keys
//! POST   /api/v1/admin/tables/{table}/rows   {"values":{...}}
//! PATCH  /api/v1/admin/tables/{table}/rows   {"key":{...},"values":{...}}
//! DELETE /api/v1/admin/tables/{table}/rows   {"key":{...}}
//! ```

use actix_web::{HttpResponse, delete, get, patch, post, web};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use utoipa::{IntoParams, ToSchema};

use crate::domain::crud::PREVIEW_ROW_LIMIT;
use crate::domain::{
    AllowedTable, CrudOutcome, Error, FormAction, FormField, KeyOptions, RawRow, RawValue,
    RowPreview, TableSchema,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::admin_no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_bounded_u32};

/// Query string for the form descriptor.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FormQuery {
    /// `insert` (default) or `update`.
    #[param(example = "insert")]
    pub action: Option<String>,
}

/// Query string for the row preview.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct RowsQuery {
    /// Maximum rows, 1 to 200 (default 200).
    #[param(example = "50")]
    pub limit: Option<String>,
}

/// Insert request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct InsertRowRequest {
    /// Column values; absent columns insert as null.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub values: Map<String, Value>,
}

/// Update request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRowRequest {
    /// Primary-key values selecting the row.
    #[schema(value_type = Object)]
    pub key: Map<String, Value>,
    /// New values; blank entries keep the stored value.
    #[serde(default)]
    #[schema(value_type = Object)]
    pub values: Map<String, Value>,
}

/// Delete request body.
#[derive(Debug, Deserialize, ToSchema)]
pub struct DeleteRowRequest {
    /// Primary-key values selecting the row.
    #[schema(value_type = Object)]
    pub key: Map<String, Value>,
}

fn parse_action(raw: Option<&str>) -> Result<FormAction, Error> {
    match raw.map(str::trim) {
        None | Some("") | Some("insert") => Ok(FormAction::Insert),
        Some("update") => Ok(FormAction::Update),
        Some(other) => Err(
            Error::invalid_request("action must be \"insert\" or \"update\"")
                .with_details(json!({ "field": "action", "value": other })),
        ),
    }
}

/// Convert a JSON object into raw form input.
///
/// Arrays and nested objects are rejected as `invalid_input`.
fn raw_row(object: Map<String, Value>, field: &str) -> Result<RawRow, Error> {
    object
        .into_iter()
        .map(|(column, value)| match RawValue::from_json(&value) {
            Some(raw) => Ok((column, raw)),
            None => Err(
                Error::invalid_input(format!("{column} must be a scalar value"))
                    .with_details(json!({ "field": field, "column": column })),
            ),
        })
        .collect()
}

fn resolve(table: &str) -> Result<AllowedTable, Error> {
    AllowedTable::parse(table)
}

/// List the tables open for editing.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tables",
    responses(
        (status = 200, description = "Allow-listed tables", body = [AllowedTable]),
        (status = 401, description = "Admin login required", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listAdminTables",
    security(("SessionCookie" = []))
)]
#[get("/admin/tables")]
pub async fn list_tables(session: SessionContext) -> ApiResult<HttpResponse> {
    session.require_admin()?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(AllowedTable::ALL))
}

/// Inspect a table's columns and keys.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tables/{table}/schema",
    params(("table" = String, Path, description = "Allow-listed table name")),
    responses(
        (status = 200, description = "Table schema", body = TableSchema),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 502, description = "Store failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getTableSchema",
    security(("SessionCookie" = []))
)]
#[get("/admin/tables/{table}/schema")]
pub async fn table_schema(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let schema = state.table_admin.schema(&admin, table).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(schema))
}

/// Describe the insert or update form for a table.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tables/{table}/form",
    params(("table" = String, Path, description = "Allow-listed table name"), FormQuery),
    responses(
        (status = 200, description = "Form fields", body = [FormField]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 409, description = "Table has no primary key", body = Error)
    ),
    tags = ["admin"],
    operation_id = "getTableForm",
    security(("SessionCookie" = []))
)]
#[get("/admin/tables/{table}/form")]
pub async fn table_form(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<FormQuery>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let action = parse_action(query.action.as_deref())?;
    let fields = state.table_admin.form(&admin, table, action).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(fields))
}

/// Preview the first rows of a table.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tables/{table}/rows",
    params(("table" = String, Path, description = "Allow-listed table name"), RowsQuery),
    responses(
        (status = 200, description = "Row preview", body = RowPreview),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 502, description = "Store failure", body = Error)
    ),
    tags = ["admin"],
    operation_id = "previewTableRows",
    security(("SessionCookie" = []))
)]
#[get("/admin/tables/{table}/rows")]
pub async fn table_rows(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    query: web::Query<RowsQuery>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let limit = parse_bounded_u32(
        query.limit.as_deref(),
        FieldName::new("limit"),
        1..=PREVIEW_ROW_LIMIT,
        PREVIEW_ROW_LIMIT,
    )?;
    let preview = state.table_admin.preview_rows(&admin, table, limit).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(preview))
}

/// List selectable primary-key values.
#[utoipa::path(
    get,
    path = "/api/v1/admin/tables/{table}/keys",
    params(("table" = String, Path, description = "Allow-listed table name")),
    responses(
        (status = 200, description = "Key options", body = [KeyOptions]),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 409, description = "Table has no primary key", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listTableKeys",
    security(("SessionCookie" = []))
)]
#[get("/admin/tables/{table}/keys")]
pub async fn table_keys(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let options = state.table_admin.key_options(&admin, table).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(options))
}

/// Insert one row.
#[utoipa::path(
    post,
    path = "/api/v1/admin/tables/{table}/rows",
    params(("table" = String, Path, description = "Allow-listed table name")),
    request_body = InsertRowRequest,
    responses(
        (status = 200, description = "Insert outcome", body = CrudOutcome),
        (status = 400, description = "Invalid input", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 502, description = "Store rejected the statement", body = Error)
    ),
    tags = ["admin"],
    operation_id = "insertTableRow",
    security(("SessionCookie" = []))
)]
#[post("/admin/tables/{table}/rows")]
pub async fn insert_row(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<InsertRowRequest>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let values = raw_row(payload.into_inner().values, "values")?;
    let outcome = state.table_admin.insert(&admin, table, values).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(outcome))
}

/// Update the row selected by its primary key.
#[utoipa::path(
    patch,
    path = "/api/v1/admin/tables/{table}/rows",
    params(("table" = String, Path, description = "Allow-listed table name")),
    request_body = UpdateRowRequest,
    responses(
        (status = 200, description = "Update outcome", body = CrudOutcome),
        (status = 400, description = "Invalid input", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 409, description = "Table has no primary key", body = Error),
        (status = 502, description = "Store rejected the statement", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateTableRow",
    security(("SessionCookie" = []))
)]
#[patch("/admin/tables/{table}/rows")]
pub async fn update_row(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<UpdateRowRequest>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let UpdateRowRequest { key, values } = payload.into_inner();
    let key = raw_row(key, "key")?;
    let values = raw_row(values, "values")?;
    let outcome = state.table_admin.update(&admin, table, key, values).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(outcome))
}

/// Delete the row selected by its primary key.
#[utoipa::path(
    delete,
    path = "/api/v1/admin/tables/{table}/rows",
    params(("table" = String, Path, description = "Allow-listed table name")),
    request_body = DeleteRowRequest,
    responses(
        (status = 200, description = "Delete outcome", body = CrudOutcome),
        (status = 400, description = "Invalid input", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 404, description = "Table not available", body = Error),
        (status = 409, description = "Table has no primary key", body = Error),
        (status = 502, description = "Store rejected the statement", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteTableRow",
    security(("SessionCookie" = []))
)]
#[delete("/admin/tables/{table}/rows")]
pub async fn delete_row(
    state: web::Data<HttpState>,
    session: SessionContext,
    path: web::Path<String>,
    payload: web::Json<DeleteRowRequest>,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let table = resolve(&path)?;
    let key = raw_row(payload.into_inner().key, "key")?;
    let outcome = state.table_admin.delete(&admin, table, key).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(outcome))
}

#[cfg(test)]
#[path = "admin_tables_tests.rs"]
mod tests;
