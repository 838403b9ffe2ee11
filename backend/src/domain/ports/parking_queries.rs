//! Driving ports for the public parking endpoints.
//!
//! HTTP handlers call these use-cases; the domain services in
//! [`crate::domain::CatalogueService`] and
//! [`crate::domain::RecommendationService`] implement them.

use async_trait::async_trait;

use crate::domain::{
    Building, Error, LotSummary, PermitOption, RecommendationRequest, RecommendationResponse,
};

/// Reference data used to fill the recommendation form.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ParkingCatalogueQuery: Send + Sync {
    /// Buildings ordered by name.
    async fn list_buildings(&self) -> Result<Vec<Building>, Error>;

    /// Permit selector options, `any` first, then permits by name.
    async fn list_permit_options(&self) -> Result<Vec<PermitOption>, Error>;

    /// Lots ordered by title, at most `limit` (capped at 200).
    async fn lots_preview(&self, limit: u32) -> Result<Vec<LotSummary>, Error>;
}

/// Ranked lot recommendations for a destination.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LotRecommendationQuery: Send + Sync {
    /// Rank lots for `request`.
    async fn recommend(
        &self,
        request: &RecommendationRequest,
    ) -> Result<RecommendationResponse, Error>;
}
