//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{
    DistanceLoadCommand, LotRecommendationQuery, ParkingCatalogueQuery, TableAdminCommand,
};

/// Parameter object bundling all port implementations for HTTP handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub catalogue: Arc<dyn ParkingCatalogueQuery>,
    pub recommendations: Arc<dyn LotRecommendationQuery>,
    pub table_admin: Arc<dyn TableAdminCommand>,
    pub distance_loader: Arc<dyn DistanceLoadCommand>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub catalogue: Arc<dyn ParkingCatalogueQuery>,
    pub recommendations: Arc<dyn LotRecommendationQuery>,
    pub table_admin: Arc<dyn TableAdminCommand>,
    pub distance_loader: Arc<dyn DistanceLoadCommand>,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state from a ports bundle.
    ///
    /// # Examples
    /// ```no_run
    /// use std::sync::Arc;
    ///
    /// use smartpark::domain::ports::{
    ///     FixtureCatalogueRepository, FixtureRecommendationRepository,
    ///     FixtureRowMutationRepository, FixtureSchemaRepository, FixtureStagingRepository,
    ///     FixtureTableBrowserRepository,
    /// };
    /// use smartpark::domain::{
    ///     BulkLoadService, CatalogueService, RecommendationService, StagingPlan,
    ///     TableAdminService,
    /// };
    /// use smartpark::inbound::http::state::{HttpState, HttpStatePorts};
    ///
    /// let catalogue = Arc::new(FixtureCatalogueRepository);
    /// let schema = Arc::new(FixtureSchemaRepository);
    /// let state = HttpState::new(HttpStatePorts {
    ///     catalogue: Arc::new(CatalogueService::new(catalogue.clone())),
    ///     recommendations: Arc::new(RecommendationService::new(
    ///         catalogue,
    ///         Arc::new(FixtureRecommendationRepository),
    ///     )),
    ///     table_admin: Arc::new(TableAdminService::new(
    ///         schema.clone(),
    ///         Arc::new(FixtureRowMutationRepository),
    ///         Arc::new(FixtureTableBrowserRepository),
    ///     )),
    ///     distance_loader: Arc::new(BulkLoadService::new(
    ///         schema,
    ///         Arc::new(FixtureStagingRepository),
    ///         StagingPlan::default(),
    ///     )),
    /// });
    /// let _catalogue = state.catalogue.clone();
    /// ```
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            catalogue,
            recommendations,
            table_admin,
            distance_loader,
        } = ports;
        Self {
            catalogue,
            recommendations,
            table_admin,
            distance_loader,
        }
    }
}
