//! PostgreSQL-backed lot ranking adapter.
//!
//! One set-based query joins distances, lots, the latest inventory snapshot
//! per lot and the aggregated permit names, then filters by walking budget
//! and optional permit before ordering and limiting.

use async_trait::async_trait;
use diesel::sql_query;
use diesel::sql_types::{BigInt, Integer, Nullable};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{RecommendationRepository, RecommendationRepositoryError};
use crate::domain::{LotCandidate, PermitFilter, RecommendationRequest};

use super::connection::{ConnectError, DbConnector};
use super::diesel_helpers::{
    StoreFault, classify_diesel_error, limit_param, map_connect_error_message,
};
use super::models::CandidateRow;

const RANK_LOTS_SQL: &str = concat!(
    "SELECT l.lot_id, l.title, l.latitude, l.longitude, ",
    "       d.distance AS distance_seconds, ",
    "       inv.capacity_total, inv.snapshot_ts, ",
    "       COALESCE(STRING_AGG(DISTINCT p.name, ', ' ORDER BY p.name), '') AS parking_types ",
    "FROM lot_building_distance d ",
    "JOIN lots l ON l.lot_id = d.lot_id ",
    "JOIN ( ",
    "    SELECT li.lot_id, li.capacity_total, li.snapshot_ts ",
    "    FROM lot_inventory li ",
    "    JOIN ( ",
    "        SELECT lot_id, MAX(snapshot_ts) AS max_ts ",
    "        FROM lot_inventory ",
    "        GROUP BY lot_id ",
    "    ) latest ON latest.lot_id = li.lot_id AND latest.max_ts = li.snapshot_ts ",
    ") inv ON inv.lot_id = l.lot_id ",
    "LEFT JOIN lot_permit lp ON lp.lot_id = l.lot_id ",
    "LEFT JOIN permits p ON p.permit_id = lp.permit_id ",
    "WHERE d.building_id = $1 ",
    "  AND d.distance <= $2 ",
    "  AND ($3::integer IS NULL OR EXISTS ( ",
    "      SELECT 1 FROM lot_permit f WHERE f.lot_id = l.lot_id AND f.permit_id = $3 ",
    "  )) ",
    "GROUP BY l.lot_id, l.title, l.latitude, l.longitude, d.distance, ",
    "         inv.capacity_total, inv.snapshot_ts ",
    "ORDER BY d.distance ASC, inv.capacity_total DESC, l.lot_id ASC ",
    "LIMIT $4"
);

/// Diesel-backed implementation of the recommendation port.
#[derive(Debug, Clone)]
pub struct DieselRecommendationRepository {
    connector: DbConnector,
}

impl DieselRecommendationRepository {
    /// Create a repository that connects through `connector`.
    pub fn new(connector: DbConnector) -> Self {
        Self { connector }
    }
}

fn map_connect_error(error: ConnectError) -> RecommendationRepositoryError {
    RecommendationRepositoryError::connection(map_connect_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> RecommendationRepositoryError {
    match classify_diesel_error(&error, "rank lots") {
        StoreFault::Connection(message) => RecommendationRepositoryError::connection(message),
        fault => RecommendationRepositoryError::query(fault.into_message()),
    }
}

fn permit_param(filter: PermitFilter) -> Option<i32> {
    match filter {
        PermitFilter::Any => None,
        PermitFilter::Permit(permit_id) => Some(permit_id),
    }
}

#[async_trait]
impl RecommendationRepository for DieselRecommendationRepository {
    async fn rank_lots(
        &self,
        request: &RecommendationRequest,
    ) -> Result<Vec<LotCandidate>, RecommendationRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<CandidateRow> = sql_query(RANK_LOTS_SQL)
            .bind::<Integer, _>(request.building_id())
            .bind::<BigInt, _>(request.max_distance_seconds())
            .bind::<Nullable<Integer>, _>(permit_param(request.permit()))
            .bind::<BigInt, _>(limit_param(request.limit()))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(LotCandidate::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(PermitFilter::Any, None)]
    #[case(PermitFilter::Permit(7), Some(7))]
    fn permit_filter_binds_as_nullable_integer(
        #[case] filter: PermitFilter,
        #[case] expected: Option<i32>,
    ) {
        assert_eq!(permit_param(filter), expected);
    }

    #[rstest]
    fn ranking_query_orders_and_limits_in_sql() {
        assert!(RANK_LOTS_SQL.contains("ORDER BY d.distance ASC, inv.capacity_total DESC"));
        assert!(RANK_LOTS_SQL.ends_with("LIMIT $4"));
    }
}
