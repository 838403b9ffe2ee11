//! Lot recommendation and reference catalogue services.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;

use crate::domain::ports::{
    CatalogueRepository, CatalogueRepositoryError, LotRecommendationQuery, ParkingCatalogueQuery,
    RecommendationRepository, RecommendationRepositoryError,
};
use crate::domain::{
    Building, Error, LotCandidate, LotRecommendation, LotSummary, MapMarker, PermitFilter,
    PermitOption, RecommendationRequest, RecommendationResponse,
};

/// Upper bound for the lots preview.
pub const LOTS_PREVIEW_LIMIT: u32 = 200;

fn map_catalogue_error(error: CatalogueRepositoryError) -> Error {
    match error {
        CatalogueRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("catalogue unavailable: {message}"))
        }
        CatalogueRepositoryError::Query { message } => {
            Error::store_failure(format!("catalogue query failed: {message}"))
                .with_details(json!({ "kind": "query" }))
        }
    }
}

fn map_recommendation_error(error: RecommendationRepositoryError) -> Error {
    match error {
        RecommendationRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("recommendations unavailable: {message}"))
        }
        RecommendationRepositoryError::Query { message } => {
            Error::store_failure(format!("recommendation query failed: {message}"))
                .with_details(json!({ "kind": "query" }))
        }
    }
}

/// Read-only catalogue of buildings, permits and lots.
#[derive(Clone)]
pub struct CatalogueService<C> {
    catalogue: Arc<C>,
}

impl<C> CatalogueService<C> {
    /// Create a catalogue service over `catalogue`.
    pub fn new(catalogue: Arc<C>) -> Self {
        Self { catalogue }
    }
}

#[async_trait]
impl<C> ParkingCatalogueQuery for CatalogueService<C>
where
    C: CatalogueRepository,
{
    async fn list_buildings(&self) -> Result<Vec<Building>, Error> {
        self.catalogue
            .list_buildings()
            .await
            .map_err(map_catalogue_error)
    }

    async fn list_permit_options(&self) -> Result<Vec<PermitOption>, Error> {
        let permits = self
            .catalogue
            .list_permits()
            .await
            .map_err(map_catalogue_error)?;
        Ok(std::iter::once(PermitOption::any())
            .chain(permits.into_iter().map(PermitOption::from))
            .collect())
    }

    async fn lots_preview(&self, limit: u32) -> Result<Vec<LotSummary>, Error> {
        self.catalogue
            .lots_preview(limit.min(LOTS_PREVIEW_LIMIT))
            .await
            .map_err(map_catalogue_error)
    }
}

/// Ranks lots for a destination building.
///
/// The store performs the join and ranking; this service validates the
/// request against the catalogue and re-applies the budget, ordering and
/// limit so the contract holds whatever adapter is plugged in.
#[derive(Clone)]
pub struct RecommendationService<C, R> {
    catalogue: Arc<C>,
    ranking: Arc<R>,
}

impl<C, R> RecommendationService<C, R> {
    /// Create a recommendation service.
    pub fn new(catalogue: Arc<C>, ranking: Arc<R>) -> Self {
        Self { catalogue, ranking }
    }
}

impl<C, R> RecommendationService<C, R>
where
    C: CatalogueRepository,
    R: RecommendationRepository,
{
    async fn destination(&self, building_id: i32) -> Result<Building, Error> {
        let buildings = self
            .catalogue
            .list_buildings()
            .await
            .map_err(map_catalogue_error)?;
        if buildings.is_empty() {
            return Err(Error::empty_catalog("no buildings are configured")
                .with_details(json!({ "catalog": "buildings" })));
        }
        buildings
            .into_iter()
            .find(|building| building.id == building_id)
            .ok_or_else(|| {
                Error::not_found(format!("building {building_id} does not exist"))
                    .with_details(json!({ "buildingId": building_id }))
            })
    }

    async fn check_permit(&self, filter: PermitFilter) -> Result<(), Error> {
        let PermitFilter::Permit(permit_id) = filter else {
            return Ok(());
        };
        let permits = self
            .catalogue
            .list_permits()
            .await
            .map_err(map_catalogue_error)?;
        if permits.is_empty() {
            return Err(Error::empty_catalog("no permits are configured")
                .with_details(json!({ "catalog": "permits" })));
        }
        if permits.iter().any(|permit| permit.id == permit_id) {
            Ok(())
        } else {
            Err(Error::not_found(format!("permit {permit_id} does not exist"))
                .with_details(json!({ "permitId": permit_id })))
        }
    }
}

/// Apply the ranking contract to store rows.
///
/// Drops rows beyond the budget, sorts by distance ascending then capacity
/// descending (stable for ties), and truncates to the limit.
#[must_use]
pub fn rank_candidates(
    request: &RecommendationRequest,
    mut candidates: Vec<LotCandidate>,
) -> Vec<LotRecommendation> {
    let budget = request.max_distance_seconds();
    candidates.retain(|candidate| i64::from(candidate.distance_seconds) <= budget);
    candidates.sort_by(|a, b| {
        a.distance_seconds
            .cmp(&b.distance_seconds)
            .then_with(|| b.capacity_total.cmp(&a.capacity_total))
            .then_with(|| a.lot_id.cmp(&b.lot_id))
    });
    candidates.truncate(usize::try_from(request.limit()).unwrap_or(usize::MAX));
    candidates.into_iter().map(LotRecommendation::from).collect()
}

#[async_trait]
impl<C, R> LotRecommendationQuery for RecommendationService<C, R>
where
    C: CatalogueRepository,
    R: RecommendationRepository,
{
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, Error> {
        let destination = self.destination(request.building_id()).await?;
        self.check_permit(request.permit()).await?;

        let candidates = self
            .ranking
            .rank_lots(request)
            .await
            .map_err(map_recommendation_error)?;
        let lots = rank_candidates(request, candidates);
        let map_markers = lots.iter().filter_map(MapMarker::for_recommendation).collect();

        debug!(
            building_id = request.building_id(),
            permit = ?request.permit(),
            results = lots.len(),
            "recommendations computed"
        );
        Ok(RecommendationResponse {
            destination,
            lots,
            map_markers,
        })
    }
}
