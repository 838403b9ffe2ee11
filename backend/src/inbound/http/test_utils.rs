//! Test helpers for inbound HTTP components.

use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};

use crate::domain::ports::{
    DistanceLoadCommand, LotRecommendationQuery, ParkingCatalogueQuery, TableAdminCommand,
};
use crate::domain::ports::{
    MockDistanceLoadCommand, MockLotRecommendationQuery, MockParkingCatalogueQuery,
    MockTableAdminCommand,
};
use crate::inbound::http::state::{HttpState, HttpStatePorts};

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

/// Mock ports for handler tests; unset ports reject any call.
#[derive(Default)]
pub struct MockPorts {
    pub catalogue: Option<MockParkingCatalogueQuery>,
    pub recommendations: Option<MockLotRecommendationQuery>,
    pub table_admin: Option<MockTableAdminCommand>,
    pub distance_loader: Option<MockDistanceLoadCommand>,
}

impl MockPorts {
    /// Assemble HTTP state from the configured mocks.
    pub fn into_state(self) -> HttpState {
        let catalogue: Arc<dyn ParkingCatalogueQuery> =
            Arc::new(self.catalogue.unwrap_or_default());
        let recommendations: Arc<dyn LotRecommendationQuery> =
            Arc::new(self.recommendations.unwrap_or_default());
        let table_admin: Arc<dyn TableAdminCommand> =
            Arc::new(self.table_admin.unwrap_or_default());
        let distance_loader: Arc<dyn DistanceLoadCommand> =
            Arc::new(self.distance_loader.unwrap_or_default());
        HttpState::new(HttpStatePorts {
            catalogue,
            recommendations,
            table_admin,
            distance_loader,
        })
    }
}

/// Extract the session cookie from a login response.
pub fn session_cookie(res: &actix_web::dev::ServiceResponse) -> Cookie<'static> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
