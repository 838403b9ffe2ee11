//! PostgreSQL-backed distance staging and materialization adapter.
//!
//! Staging truncates the raw table and inserts rows in batches through
//! `unnest` over one text array per column. In per-batch mode each insert
//! commits on its own; in atomic mode the truncate and every batch share one
//! transaction. Materialization always runs in a single transaction.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::sql_query;
use diesel::sql_types::{Array, BigInt, Nullable, Text};
use diesel_async::{AsyncPgConnection, RunQueryDsl};
use tracing::{debug, warn};

use crate::domain::ports::{StagingRepository, StagingRepositoryError};
use crate::domain::{
    MaterializeReport, STAGING_TABLE, StagingMode, StagingPlan, StagingWrite,
    UnmatchedStagingRow,
};

use super::connection::{ConnectError, DbConnector};
use super::diesel_helpers::{
    StoreFault, classify_diesel_error, limit_param, map_connect_error_message, quote_identifier,
    row_count,
};
use super::models::UnmatchedRow;

/// Upsert matched staging rows into the distance table.
///
/// Names match case-insensitively after trimming. Rows with a blank raw
/// distance are left to the unmatched audit. Duplicate pairs keep the
/// smallest rounded distance; negatives clamp to zero.
const MATERIALIZE_SQL: &str = concat!(
    "WITH matched AS ( ",
    "    SELECT l.lot_id, b.building_id, ",
    "           MIN(GREATEST(ROUND(CAST(TRIM(s.distance_sec_raw) AS NUMERIC)), 0))::INTEGER ",
    "               AS distance ",
    "    FROM staging_lot_building_distance s ",
    "    JOIN lots l ON LOWER(TRIM(l.title)) = LOWER(TRIM(s.lot_title_raw)) ",
    "    JOIN buildings b ON LOWER(TRIM(b.name)) = LOWER(TRIM(s.building_name_raw)) ",
    "    WHERE NULLIF(TRIM(s.distance_sec_raw), '') IS NOT NULL ",
    "    GROUP BY l.lot_id, b.building_id ",
    ") ",
    "INSERT INTO lot_building_distance (lot_id, building_id, distance) ",
    "SELECT lot_id, building_id, distance FROM matched ",
    "ON CONFLICT (lot_id, building_id) DO UPDATE SET distance = EXCLUDED.distance"
);

/// Staging rows that the upsert dropped, with a total count on every row.
const UNMATCHED_SQL: &str = concat!(
    "SELECT flagged.lot_title_raw, flagged.building_name_raw, flagged.distance_sec_raw, ",
    "       flagged.lot_matched, flagged.building_matched, ",
    "       COUNT(*) OVER () AS unmatched_total ",
    "FROM ( ",
    "    SELECT s.lot_title_raw, s.building_name_raw, s.distance_sec_raw, ",
    "           EXISTS (SELECT 1 FROM lots l ",
    "                   WHERE LOWER(TRIM(l.title)) = LOWER(TRIM(s.lot_title_raw))) ",
    "               AS lot_matched, ",
    "           EXISTS (SELECT 1 FROM buildings b ",
    "                   WHERE LOWER(TRIM(b.name)) = LOWER(TRIM(s.building_name_raw))) ",
    "               AS building_matched ",
    "    FROM staging_lot_building_distance s ",
    ") flagged ",
    "WHERE NOT (flagged.lot_matched AND flagged.building_matched ",
    "           AND NULLIF(TRIM(flagged.distance_sec_raw), '') IS NOT NULL) ",
    "LIMIT $1"
);

/// Diesel-backed implementation of the staging port.
#[derive(Debug, Clone)]
pub struct DieselStagingRepository {
    connector: DbConnector,
}

impl DieselStagingRepository {
    /// Create a repository that connects through `connector`.
    pub fn new(connector: DbConnector) -> Self {
        Self { connector }
    }
}

fn map_connect_error(error: ConnectError) -> StagingRepositoryError {
    StagingRepositoryError::connection(map_connect_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error, operation: &str) -> StagingRepositoryError {
    match classify_diesel_error(&error, operation) {
        StoreFault::Connection(message) => StagingRepositoryError::connection(message),
        fault => StagingRepositoryError::query(fault.into_message()),
    }
}

fn truncate_sql() -> String {
    format!("TRUNCATE TABLE {}", quote_identifier(STAGING_TABLE))
}

fn insert_sql(columns: &[String]) -> String {
    let names: Vec<_> = columns.iter().map(|column| quote_identifier(column)).collect();
    let arrays: Vec<_> = (1..=columns.len())
        .map(|index| format!("${index}::text[]"))
        .collect();
    format!(
        "INSERT INTO {} ({}) SELECT * FROM unnest({})",
        quote_identifier(STAGING_TABLE),
        names.join(", "),
        arrays.join(", ")
    )
}

/// Turn a batch of rows into one array per column.
fn columnar(width: usize, batch: &[Vec<Option<String>>]) -> Vec<Vec<Option<String>>> {
    (0..width)
        .map(|index| {
            batch
                .iter()
                .map(|row| row.get(index).cloned().flatten())
                .collect()
        })
        .collect()
}

async fn insert_batch(
    conn: &mut AsyncPgConnection,
    sql: &str,
    width: usize,
    batch: &[Vec<Option<String>>],
) -> diesel::QueryResult<usize> {
    let query = columnar(width, batch)
        .into_iter()
        .fold(sql_query(sql).into_boxed::<Pg>(), |query, column| {
            query.bind::<Array<Nullable<Text>>, _>(column)
        });
    query.execute(conn).await
}

impl DieselStagingRepository {
    async fn replace_atomically(
        conn: &mut AsyncPgConnection,
        insert: &str,
        width: usize,
        rows: &[Vec<Option<String>>],
        plan: StagingPlan,
    ) -> Result<(), StagingRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        conn.transaction::<_, diesel::result::Error, _>(|conn| {
            async move {
                sql_query(truncate_sql()).execute(conn).await?;
                for batch in rows.chunks(plan.batch_size.get()) {
                    insert_batch(conn, insert, width, batch).await?;
                }
                Ok(())
            }
            .scope_boxed()
        })
        .await
        .map_err(|err| map_diesel_error(err, "atomic staging"))
    }

    async fn replace_per_batch(
        conn: &mut AsyncPgConnection,
        insert: &str,
        width: usize,
        rows: &[Vec<Option<String>>],
        plan: StagingPlan,
    ) -> Result<(), StagingRepositoryError> {
        sql_query(truncate_sql())
            .execute(conn)
            .await
            .map_err(|err| map_diesel_error(err, "staging truncate"))?;

        let mut committed_rows = 0_u64;
        for (index, batch) in rows.chunks(plan.batch_size.get()).enumerate() {
            if let Err(err) = insert_batch(conn, insert, width, batch).await {
                let message = classify_diesel_error(&err, "staging batch").into_message();
                warn!(batch = index + 1, committed_rows, "staging batch failed");
                return Err(StagingRepositoryError::batch_failed(message, committed_rows));
            }
            committed_rows += row_count(batch.len());
            debug!(batch = index + 1, committed_rows, "staging batch committed");
        }
        Ok(())
    }
}

#[async_trait]
impl StagingRepository for DieselStagingRepository {
    async fn replace_rows(
        &self,
        columns: &[String],
        rows: &[Vec<Option<String>>],
        plan: StagingPlan,
    ) -> Result<StagingWrite, StagingRepositoryError> {
        let insert = insert_sql(columns);
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        match plan.mode {
            StagingMode::Atomic => {
                Self::replace_atomically(&mut conn, &insert, columns.len(), rows, plan).await?;
            }
            StagingMode::PerBatch => {
                Self::replace_per_batch(&mut conn, &insert, columns.len(), rows, plan).await?;
            }
        }
        Ok(StagingWrite {
            rows: row_count(rows.len()),
            batches: plan.batch_count(rows.len()),
        })
    }

    async fn materialize(
        &self,
        sample_limit: u32,
    ) -> Result<MaterializeReport, StagingRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let (upserted, unmatched) = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    let upserted = sql_query(MATERIALIZE_SQL).execute(conn).await?;
                    let unmatched: Vec<UnmatchedRow> = sql_query(UNMATCHED_SQL)
                        .bind::<BigInt, _>(limit_param(sample_limit))
                        .load(conn)
                        .await?;
                    Ok((upserted, unmatched))
                }
                .scope_boxed()
            })
            .await
            .map_err(|err| map_diesel_error(err, "materialize distances"))?;

        let unmatched_rows = unmatched
            .as_slice()
            .first()
            .map_or(0, |row| u64::try_from(row.unmatched_total).unwrap_or(0));
        Ok(MaterializeReport {
            upserted_rows: row_count(upserted),
            unmatched_rows,
            unmatched_sample: unmatched.into_iter().map(UnmatchedStagingRow::from).collect(),
        })
    }
}
