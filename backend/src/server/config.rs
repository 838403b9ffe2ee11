//! HTTP server configuration object and helpers.

use std::net::SocketAddr;

use actix_web::cookie::{Key, SameSite};
use smartpark::domain::StagingPlan;

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) key: Key,
    pub(crate) cookie_secure: bool,
    pub(crate) same_site: SameSite,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) database_url: Option<String>,
    pub(crate) staging_plan: StagingPlan,
}

impl ServerConfig {
    /// Construct a server configuration using application preferences.
    #[must_use]
    pub fn new(key: Key, cookie_secure: bool, same_site: SameSite, bind_addr: SocketAddr) -> Self {
        Self {
            key,
            cookie_secure,
            same_site,
            bind_addr,
            database_url: None,
            staging_plan: StagingPlan::default(),
        }
    }

    /// Attach a database URL for the persistence adapters.
    ///
    /// Without one, every port is served by its fixture implementation.
    #[must_use]
    pub fn with_database_url(mut self, database_url: impl Into<String>) -> Self {
        self.database_url = Some(database_url.into());
        self
    }

    /// Override how distance uploads are batched.
    #[must_use]
    pub fn with_staging_plan(mut self, plan: StagingPlan) -> Self {
        self.staging_plan = plan;
        self
    }

    /// Return the socket address the server will bind to.
    #[must_use]
    pub fn bind_addr(&self) -> SocketAddr {
        self.bind_addr
    }
}
