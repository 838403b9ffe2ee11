//! PostgreSQL persistence adapters using Diesel.
//!
//! Concrete implementations of the driven ports backed by PostgreSQL through
//! `diesel-async`.
//!
//! # Architecture
//!
//! - **Thin adapters**: repositories only translate between rows and domain
//!   types. Validation and ranking rules live in the domain services.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Per-operation connections**: each port call opens its own connection
//!   through [`DbConnector`] and releases it when done.
//! - **Typed binds only**: dynamic statements quote identifiers taken from the
//!   allow-list or `information_schema` and pass every value as a parameter.
//!
//! # Example
//!
//! ```ignore
//! use smartpark::outbound::persistence::{DbConnector, DieselCatalogueRepository};
//!
//! let connector = DbConnector::new("postgres://localhost/smartpark");
//! let repo = DieselCatalogueRepository::new(connector);
//! ```

mod connection;
pub(crate) mod diesel_helpers;
mod diesel_catalogue_repository;
mod diesel_recommendation_repository;
mod diesel_row_mutation_repository;
mod diesel_schema_repository;
mod diesel_staging_repository;
mod diesel_table_browser_repository;
mod migrations;
mod models;
mod schema;

pub use connection::{ConnectError, DbConnector};
pub use diesel_catalogue_repository::DieselCatalogueRepository;
pub use diesel_recommendation_repository::DieselRecommendationRepository;
pub use diesel_row_mutation_repository::DieselRowMutationRepository;
pub use diesel_schema_repository::DieselSchemaRepository;
pub use diesel_staging_repository::DieselStagingRepository;
pub use diesel_table_browser_repository::DieselTableBrowserRepository;
pub use migrations::{MIGRATIONS, MigrationError, run_pending as run_pending_migrations};
