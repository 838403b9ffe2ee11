//! Driven port for the parking reference catalogue.

use async_trait::async_trait;

use super::define_port_error;
use crate::domain::{Building, LotSummary, Permit};

define_port_error! {
    /// Errors raised while reading reference data.
    pub enum CatalogueRepositoryError {
        /// Connection to the backing store failed.
        Connection { message: String } =>
            "catalogue connection failed: {message}",
        /// Query failed during execution or decoding.
        Query { message: String } =>
            "catalogue query failed: {message}",
    }
}

/// Read access to buildings, permits and lots.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogueRepository: Send + Sync {
    /// All buildings ordered by name.
    async fn list_buildings(&self) -> Result<Vec<Building>, CatalogueRepositoryError>;

    /// All permits ordered by name.
    async fn list_permits(&self) -> Result<Vec<Permit>, CatalogueRepositoryError>;

    /// Up to `limit` lots ordered by title.
    async fn lots_preview(&self, limit: u32) -> Result<Vec<LotSummary>, CatalogueRepositoryError>;
}

/// Fixture catalogue with one building and no permits or lots.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureCatalogueRepository;

#[async_trait]
impl CatalogueRepository for FixtureCatalogueRepository {
    async fn list_buildings(&self) -> Result<Vec<Building>, CatalogueRepositoryError> {
        Ok(vec![Building {
            id: 1,
            name: "Library".to_owned(),
            location: crate::domain::GeoPoint {
                latitude: 40.0,
                longitude: -75.0,
            },
        }])
    }

    async fn list_permits(&self) -> Result<Vec<Permit>, CatalogueRepositoryError> {
        Ok(Vec::new())
    }

    async fn lots_preview(&self, _limit: u32) -> Result<Vec<LotSummary>, CatalogueRepositoryError> {
        Ok(Vec::new())
    }
}
