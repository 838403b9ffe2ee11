//! HTTP inbound adapter exposing REST endpoints.

pub mod admin;
pub mod admin_distances;
pub mod admin_tables;
pub mod cache_control;
pub mod catalogue;
pub mod error;
pub mod health;
pub mod recommendations;
pub mod session;
pub mod state;
#[cfg(test)]
pub mod test_utils;
pub mod validation;

pub use error::ApiResult;
