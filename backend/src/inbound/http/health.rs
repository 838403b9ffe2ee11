//! Liveness and readiness probes.
//!
//! Both probes answer with `{"status": "ok"}` or `{"status": "unavailable"}`
//! and are never cached. Readiness flips once the listener is bound;
//! liveness drops when the process starts draining.

use std::sync::atomic::{AtomicBool, Ordering};

use actix_web::{HttpResponse, get, http::header, web};
use serde_json::json;

/// Process health flags shared with the probe handlers.
#[derive(Debug)]
pub struct HealthState {
    ready: AtomicBool,
    live: AtomicBool,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            ready: AtomicBool::new(false),
            live: AtomicBool::new(true),
        }
    }
}

impl HealthState {
    /// Live but not yet ready.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that the listener is bound.
    pub fn mark_ready(&self) {
        self.ready.store(true, Ordering::Release);
    }

    /// Record that the process is draining.
    pub fn mark_unhealthy(&self) {
        self.live.store(false, Ordering::Release);
    }

    /// Whether the readiness probe passes.
    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::Acquire)
    }

    /// Whether the liveness probe passes.
    pub fn is_alive(&self) -> bool {
        self.live.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy)]
enum Probe {
    Ok,
    Unavailable,
}

impl Probe {
    fn from_flag(passing: bool) -> Self {
        if passing { Self::Ok } else { Self::Unavailable }
    }

    fn into_response(self) -> HttpResponse {
        let (mut builder, status) = match self {
            Self::Ok => (HttpResponse::Ok(), "ok"),
            Self::Unavailable => (HttpResponse::ServiceUnavailable(), "unavailable"),
        };
        builder
            .insert_header((header::CACHE_CONTROL, "no-store"))
            .json(json!({ "status": status }))
    }
}

/// Readiness probe.
#[utoipa::path(
    get,
    path = "/health/ready",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Listener bound; traffic accepted"),
        (status = 503, description = "Still starting")
    )
)]
#[get("/health/ready")]
pub async fn ready(state: web::Data<HealthState>) -> HttpResponse {
    Probe::from_flag(state.is_ready()).into_response()
}

/// Liveness probe.
#[utoipa::path(
    get,
    path = "/health/live",
    tags = ["health"],
    security([]),
    responses(
        (status = 200, description = "Process healthy"),
        (status = 503, description = "Process draining")
    )
)]
#[get("/health/live")]
pub async fn live(state: web::Data<HealthState>) -> HttpResponse {
    Probe::from_flag(state.is_alive()).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    async fn probe(state: web::Data<HealthState>, uri: &str) -> (StatusCode, Value) {
        let app =
            test::init_service(App::new().app_data(state).service(ready).service(live)).await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        assert_eq!(
            res.headers()
                .get(header::CACHE_CONTROL)
                .and_then(|v| v.to_str().ok()),
            Some("no-store")
        );
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn readiness_waits_for_bind() {
        let state = web::Data::new(HealthState::new());
        let (status, body) = probe(state.clone(), "/health/ready").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unavailable");

        state.mark_ready();
        let (status, body) = probe(state, "/health/ready").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[rstest]
    #[actix_web::test]
    async fn liveness_drops_while_draining() {
        let state = web::Data::new(HealthState::new());
        assert_eq!(probe(state.clone(), "/health/live").await.0, StatusCode::OK);

        state.mark_unhealthy();
        assert_eq!(
            probe(state, "/health/live").await.0,
            StatusCode::SERVICE_UNAVAILABLE
        );
    }
}
