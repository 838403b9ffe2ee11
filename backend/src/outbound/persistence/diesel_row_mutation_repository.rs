//! PostgreSQL-backed single-row mutation adapter.
//!
//! Statements are rendered from a [`RowMutation`] with quoted identifiers
//! and positional placeholders; every value travels as a typed bind
//! parameter.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::query_builder::{BoxedSqlQuery, SqlQuery};
use diesel::sql_query;
use diesel::sql_types::{BigInt, Date, Double, Nullable, Text, Timestamp};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{RowMutationRepository, RowMutationRepositoryError};
use crate::domain::{ColumnValue, RowMutation, SqlValue, TypeFamily};

use super::connection::{ConnectError, DbConnector};
use super::diesel_helpers::{
    StoreFault, classify_diesel_error, map_connect_error_message, quote_identifier, row_count,
};

/// SQL text plus the values for its placeholders, in order.
#[derive(Debug, Clone, PartialEq)]
struct RenderedStatement<'a> {
    sql: String,
    binds: Vec<&'a SqlValue>,
}

#[derive(Default)]
struct Placeholders(usize);

impl Placeholders {
    fn next(&mut self) -> String {
        self.0 += 1;
        format!("${}", self.0)
    }
}

fn assignments<'a>(
    columns: &'a [ColumnValue],
    placeholders: &mut Placeholders,
    binds: &mut Vec<&'a SqlValue>,
) -> Vec<String> {
    columns
        .iter()
        .map(|column| {
            binds.push(&column.value);
            format!("{} = {}", quote_identifier(&column.column), placeholders.next())
        })
        .collect()
}

fn render(mutation: &RowMutation) -> RenderedStatement<'_> {
    let table = quote_identifier(mutation.table().as_str());
    let mut placeholders = Placeholders::default();
    let mut binds = Vec::new();
    let sql = match mutation {
        RowMutation::Insert { values, .. } if values.is_empty() => {
            format!("INSERT INTO {table} DEFAULT VALUES")
        }
        RowMutation::Insert { values, .. } => {
            let columns: Vec<_> = values
                .iter()
                .map(|value| quote_identifier(&value.column))
                .collect();
            let params: Vec<_> = values
                .iter()
                .map(|value| {
                    binds.push(&value.value);
                    placeholders.next()
                })
                .collect();
            format!(
                "INSERT INTO {table} ({}) VALUES ({})",
                columns.join(", "),
                params.join(", ")
            )
        }
        RowMutation::Update { set, key, .. } => {
            let set_clause = assignments(set, &mut placeholders, &mut binds).join(", ");
            let where_clause = assignments(key, &mut placeholders, &mut binds).join(" AND ");
            format!("UPDATE {table} SET {set_clause} WHERE {where_clause}")
        }
        RowMutation::Delete { key, .. } => {
            let where_clause = assignments(key, &mut placeholders, &mut binds).join(" AND ");
            format!("DELETE FROM {table} WHERE {where_clause}")
        }
    };
    RenderedStatement { sql, binds }
}

fn bind_value<'f>(
    query: BoxedSqlQuery<'f, Pg, SqlQuery>,
    value: &SqlValue,
) -> BoxedSqlQuery<'f, Pg, SqlQuery> {
    match value {
        SqlValue::Null(TypeFamily::Integer) => query.bind::<Nullable<BigInt>, _>(None::<i64>),
        SqlValue::Null(TypeFamily::Decimal) => query.bind::<Nullable<Double>, _>(None::<f64>),
        SqlValue::Null(TypeFamily::Date) => {
            query.bind::<Nullable<Date>, _>(None::<chrono::NaiveDate>)
        }
        SqlValue::Null(TypeFamily::DateTime) => {
            query.bind::<Nullable<Timestamp>, _>(None::<chrono::NaiveDateTime>)
        }
        SqlValue::Null(TypeFamily::Text) => query.bind::<Nullable<Text>, _>(None::<String>),
        SqlValue::Integer(number) => query.bind::<BigInt, _>(*number),
        SqlValue::Decimal(number) => query.bind::<Double, _>(*number),
        SqlValue::Date(date) => query.bind::<Date, _>(*date),
        SqlValue::DateTime(timestamp) => query.bind::<Timestamp, _>(*timestamp),
        SqlValue::Text(text) => query.bind::<Text, _>(text.clone()),
    }
}

/// Diesel-backed implementation of the row mutation port.
#[derive(Debug, Clone)]
pub struct DieselRowMutationRepository {
    connector: DbConnector,
}

impl DieselRowMutationRepository {
    /// Create a repository that connects through `connector`.
    pub fn new(connector: DbConnector) -> Self {
        Self { connector }
    }
}

fn map_connect_error(error: ConnectError) -> RowMutationRepositoryError {
    RowMutationRepositoryError::connection(map_connect_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RowMutationRepositoryError {
    match classify_diesel_error(&error, "row mutation") {
        StoreFault::Connection(message) => RowMutationRepositoryError::connection(message),
        StoreFault::Constraint(message) => RowMutationRepositoryError::constraint(message),
        StoreFault::Query(message) => RowMutationRepositoryError::query(message),
    }
}

#[async_trait]
impl RowMutationRepository for DieselRowMutationRepository {
    async fn execute(&self, mutation: &RowMutation) -> Result<u64, RowMutationRepositoryError> {
        let rendered = render(mutation);
        debug!(
            table = %mutation.table(),
            verb = mutation.verb(),
            params = rendered.binds.len(),
            "executing row mutation"
        );

        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let query = rendered
            .binds
            .iter()
            .fold(sql_query(rendered.sql.as_str()).into_boxed::<Pg>(), |query, value| {
                bind_value(query, value)
            });
        let affected = query.execute(&mut conn).await.map_err(map_diesel_error)?;
        Ok(row_count(affected))
    }
}
