//! Parking recommendation and reference-data administration backend.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the rules and
//! ports, [`inbound`] adapts HTTP onto the driving ports, and [`outbound`]
//! implements the driven ports against PostgreSQL.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
