//! PostgreSQL-backed reference catalogue adapter.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{CatalogueRepository, CatalogueRepositoryError};
use crate::domain::{Building, LotSummary, Permit};

use super::connection::{ConnectError, DbConnector};
use super::diesel_helpers::{
    StoreFault, classify_diesel_error, limit_param, map_connect_error_message,
};
use super::models::{BuildingRow, LotRow, PermitRow};
use super::schema::{buildings, lots, permits};

/// Diesel-backed implementation of the catalogue read port.
#[derive(Debug, Clone)]
pub struct DieselCatalogueRepository {
    connector: DbConnector,
}

impl DieselCatalogueRepository {
    /// Create a repository that connects through `connector`.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// let repo = DieselCatalogueRepository::new(DbConnector::new("postgres://localhost/smartpark"));
    /// ```
    pub fn new(connector: DbConnector) -> Self {
        Self { connector }
    }
}

fn map_connect_error(error: ConnectError) -> CatalogueRepositoryError {
    CatalogueRepositoryError::connection(map_connect_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> CatalogueRepositoryError {
    match classify_diesel_error(&error, "catalogue read") {
        StoreFault::Connection(message) => CatalogueRepositoryError::connection(message),
        fault => CatalogueRepositoryError::query(fault.into_message()),
    }
}

#[async_trait]
impl CatalogueRepository for DieselCatalogueRepository {
    async fn list_buildings(&self) -> Result<Vec<Building>, CatalogueRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<BuildingRow> = buildings::table
            .select(BuildingRow::as_select())
            .order_by((buildings::name, buildings::building_id))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Building::from).collect())
    }

    async fn list_permits(&self) -> Result<Vec<Permit>, CatalogueRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<PermitRow> = permits::table
            .select(PermitRow::as_select())
            .order_by(permits::name)
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(Permit::from).collect())
    }

    async fn lots_preview(&self, limit: u32) -> Result<Vec<LotSummary>, CatalogueRepositoryError> {
        let mut conn = self.connector.connect().await.map_err(map_connect_error)?;
        let rows: Vec<LotRow> = lots::table
            .select(LotRow::as_select())
            .order_by((lots::title, lots::lot_id))
            .limit(limit_param(limit))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(LotSummary::from).collect())
    }
}
