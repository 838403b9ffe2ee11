//! Runtime settings loaded via OrthoConfig.
//!
//! Every field can come from the command line, a configuration file, or a
//! `SMARTPARK_*` environment variable.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use smartpark::domain::{DEFAULT_BATCH_SIZE, StagingMode, StagingPlan};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_SESSION_KEY_FILE: &str = "/var/run/secrets/session_key";

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SMARTPARK")]
pub struct AppSettings {
    /// PostgreSQL URL; without it the server runs on fixture data.
    pub database_url: Option<String>,
    /// Listen address, `host:port`.
    pub bind_addr: Option<String>,
    /// Rows per staging insert batch.
    pub staging_batch_size: Option<usize>,
    /// Stage uploads in one transaction instead of per batch.
    #[ortho_config(default = false)]
    pub staging_atomic: bool,
    /// Apply embedded migrations before serving.
    #[ortho_config(default = false)]
    pub run_migrations: bool,
    /// File holding the session signing key material.
    pub session_key_file: Option<PathBuf>,
    /// Mark the session cookie `Secure`.
    #[ortho_config(default = true)]
    pub session_cookie_secure: bool,
    /// Allow a generated session key when the key file is unreadable.
    #[ortho_config(default = false)]
    pub session_allow_ephemeral: bool,
}

impl AppSettings {
    /// Listen address, falling back to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns the parse error when the configured address is malformed.
    pub fn bind_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
    }

    /// Session key path, falling back to the mounted secret location.
    pub fn session_key_file(&self) -> PathBuf {
        self.session_key_file
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SESSION_KEY_FILE))
    }

    /// Batch size and commit mode for distance uploads.
    pub fn staging_plan(&self) -> StagingPlan {
        let mode = if self.staging_atomic {
            StagingMode::Atomic
        } else {
            StagingMode::PerBatch
        };
        StagingPlan::new(
            self.staging_batch_size.unwrap_or(DEFAULT_BATCH_SIZE),
            mode,
        )
    }
}
