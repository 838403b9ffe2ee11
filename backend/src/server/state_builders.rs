//! Builders for HTTP state ports.
//!
//! Domain services are generic over their repositories; this module picks
//! Diesel adapters when a database URL is configured and fixtures otherwise,
//! then erases the services behind the driving-port trait objects.

use std::sync::Arc;

use actix_web::web;
use tracing::warn;

use smartpark::domain::ports::{
    CatalogueRepository, FixtureCatalogueRepository, FixtureRecommendationRepository,
    FixtureRowMutationRepository, FixtureSchemaRepository, FixtureStagingRepository,
    FixtureTableBrowserRepository, RecommendationRepository, RowMutationRepository,
    SchemaRepository, StagingRepository, TableBrowserRepository,
};
use smartpark::domain::{
    BulkLoadService, CatalogueService, RecommendationService, StagingPlan, TableAdminService,
};
use smartpark::inbound::http::state::{HttpState, HttpStatePorts};
use smartpark::outbound::persistence::{
    DbConnector, DieselCatalogueRepository, DieselRecommendationRepository,
    DieselRowMutationRepository, DieselSchemaRepository, DieselStagingRepository,
    DieselTableBrowserRepository,
};

use super::ServerConfig;

/// One repository per driven port.
struct Repositories<C, R, S, M, B, G> {
    catalogue: Arc<C>,
    ranking: Arc<R>,
    schema: Arc<S>,
    mutations: Arc<M>,
    browser: Arc<B>,
    staging: Arc<G>,
}

fn assemble<C, R, S, M, B, G>(
    repos: Repositories<C, R, S, M, B, G>,
    plan: StagingPlan,
) -> HttpStatePorts
where
    C: CatalogueRepository + 'static,
    R: RecommendationRepository + 'static,
    S: SchemaRepository + 'static,
    M: RowMutationRepository + 'static,
    B: TableBrowserRepository + 'static,
    G: StagingRepository + 'static,
{
    let Repositories {
        catalogue,
        ranking,
        schema,
        mutations,
        browser,
        staging,
    } = repos;
    HttpStatePorts {
        catalogue: Arc::new(CatalogueService::new(catalogue.clone())),
        recommendations: Arc::new(RecommendationService::new(catalogue, ranking)),
        table_admin: Arc::new(TableAdminService::new(schema.clone(), mutations, browser)),
        distance_loader: Arc::new(BulkLoadService::new(schema, staging, plan)),
    }
}

fn diesel_ports(connector: &DbConnector, plan: StagingPlan) -> HttpStatePorts {
    assemble(
        Repositories {
            catalogue: Arc::new(DieselCatalogueRepository::new(connector.clone())),
            ranking: Arc::new(DieselRecommendationRepository::new(connector.clone())),
            schema: Arc::new(DieselSchemaRepository::new(connector.clone())),
            mutations: Arc::new(DieselRowMutationRepository::new(connector.clone())),
            browser: Arc::new(DieselTableBrowserRepository::new(connector.clone())),
            staging: Arc::new(DieselStagingRepository::new(connector.clone())),
        },
        plan,
    )
}

fn fixture_ports(plan: StagingPlan) -> HttpStatePorts {
    assemble(
        Repositories {
            catalogue: Arc::new(FixtureCatalogueRepository),
            ranking: Arc::new(FixtureRecommendationRepository),
            schema: Arc::new(FixtureSchemaRepository),
            mutations: Arc::new(FixtureRowMutationRepository),
            browser: Arc::new(FixtureTableBrowserRepository),
            staging: Arc::new(FixtureStagingRepository),
        },
        plan,
    )
}

/// Build the shared HTTP state for `config`.
pub(crate) fn build_http_state(config: &ServerConfig) -> web::Data<HttpState> {
    let ports = match &config.database_url {
        Some(url) => diesel_ports(&DbConnector::new(url.clone()), config.staging_plan),
        None => {
            warn!("no database configured; serving fixture data and refusing writes");
            fixture_ports(config.staging_plan)
        }
    };
    web::Data::new(HttpState::new(ports))
}
