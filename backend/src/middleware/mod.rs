//! Actix middleware shared by every route.
//!
//! [`Trace`] gives each request a correlation id that errors and log lines
//! pick up.

pub mod trace;

pub use trace::Trace;
