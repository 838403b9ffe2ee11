//! Domain ports for the hexagonal boundary.
//!
//! Driving ports (`*Query`, `*Command`) are implemented by domain services and
//! called by inbound adapters. Driven ports (`*Repository`) are implemented
//! by outbound adapters.

mod macros;
pub(crate) use macros::define_port_error;

mod catalogue_repository;
mod distance_load_command;
mod parking_queries;
mod recommendation_repository;
mod row_mutation_repository;
mod schema_repository;
mod staging_repository;
mod table_admin_command;
mod table_browser_repository;

#[cfg(test)]
pub use catalogue_repository::MockCatalogueRepository;
pub use catalogue_repository::{
    CatalogueRepository, CatalogueRepositoryError, FixtureCatalogueRepository,
};
#[cfg(test)]
pub use distance_load_command::MockDistanceLoadCommand;
pub use distance_load_command::DistanceLoadCommand;
#[cfg(test)]
pub use parking_queries::{MockLotRecommendationQuery, MockParkingCatalogueQuery};
pub use parking_queries::{LotRecommendationQuery, ParkingCatalogueQuery};
#[cfg(test)]
pub use recommendation_repository::MockRecommendationRepository;
pub use recommendation_repository::{
    FixtureRecommendationRepository, RecommendationRepository, RecommendationRepositoryError,
};
#[cfg(test)]
pub use row_mutation_repository::MockRowMutationRepository;
pub use row_mutation_repository::{
    FixtureRowMutationRepository, NO_STORE_MESSAGE, RowMutationRepository,
    RowMutationRepositoryError,
};
#[cfg(test)]
pub use schema_repository::MockSchemaRepository;
pub use schema_repository::{FixtureSchemaRepository, SchemaRepository, SchemaRepositoryError};
#[cfg(test)]
pub use staging_repository::MockStagingRepository;
pub use staging_repository::{
    FixtureStagingRepository, StagingRepository, StagingRepositoryError,
};
#[cfg(test)]
pub use table_admin_command::MockTableAdminCommand;
pub use table_admin_command::TableAdminCommand;
#[cfg(test)]
pub use table_browser_repository::MockTableBrowserRepository;
pub use table_browser_repository::{
    FixtureTableBrowserRepository, TableBrowserRepository, TableBrowserRepositoryError,
};

#[cfg(test)]
mod tests;
