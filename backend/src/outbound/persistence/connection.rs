//! Per-operation PostgreSQL connections for the Diesel adapters.
//!
//! Every store operation opens a fresh `AsyncPgConnection`, runs its
//! statements and drops the connection. There is no pool: the admin portal
//! serves one operator at a time and the loader is a one-shot process.

use std::fmt;
use std::sync::Arc;

use diesel_async::{AsyncConnection, AsyncPgConnection};

/// Errors raised while opening a connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConnectError {
    /// The server refused or could not be reached.
    #[error("failed to connect to database: {message}")]
    Establish { message: String },
}

impl ConnectError {
    /// Create an establish error with the given message.
    pub fn establish(message: impl Into<String>) -> Self {
        Self::Establish {
            message: message.into(),
        }
    }
}

/// Opens connections to a single database URL.
///
/// Cloning is cheap; clones share the URL.
#[derive(Clone)]
pub struct DbConnector {
    database_url: Arc<str>,
}

impl DbConnector {
    /// Create a connector for `database_url`.
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: Arc::from(database_url.into()),
        }
    }

    /// Open a new connection.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::Establish`] when the connection cannot be
    /// opened.
    pub async fn connect(&self) -> Result<AsyncPgConnection, ConnectError> {
        AsyncPgConnection::establish(&self.database_url)
            .await
            .map_err(|err| ConnectError::establish(err.to_string()))
    }
}

impl fmt::Debug for DbConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // The URL may carry credentials.
        f.debug_struct("DbConnector")
            .field("database_url", &"<redacted>")
            .finish()
    }
}
