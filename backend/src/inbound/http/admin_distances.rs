//! Distance loader endpoints.
//!
//! ```text
//! POST /api/v1/admin/distances/staging      (text/csv body)
//! POST /api/v1/admin/distances/materialize
//! ```

use actix_web::{HttpResponse, post, web};

use crate::domain::{Error, MaterializeReport, StageReport};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::admin_no_store_header;
use crate::inbound::http::session::SessionContext;
use crate::inbound::http::state::HttpState;

/// Largest accepted CSV upload.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Replace the staging table with an uploaded distance file.
///
/// The body is the raw CSV; its header must name the three staging columns.
#[utoipa::path(
    post,
    path = "/api/v1/admin/distances/staging",
    request_body(content = String, content_type = "text/csv",
        description = "Header row then lot_title_raw,building_name_raw,distance_sec_raw rows"),
    responses(
        (status = 200, description = "Staging report", body = StageReport),
        (status = 400, description = "Unreadable file or header mismatch", body = Error),
        (status = 401, description = "Admin login required", body = Error),
        (status = 502, description = "Store rejected a batch", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "stageDistances",
    security(("SessionCookie" = []))
)]
#[post("/admin/distances/staging")]
pub async fn stage_distances(
    state: web::Data<HttpState>,
    session: SessionContext,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let report = state.distance_loader.stage(&admin, &body).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(report))
}

/// Upsert staged rows into the distance table.
#[utoipa::path(
    post,
    path = "/api/v1/admin/distances/materialize",
    responses(
        (status = 200, description = "Materialize report", body = MaterializeReport),
        (status = 401, description = "Admin login required", body = Error),
        (status = 502, description = "Store failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["admin"],
    operation_id = "materializeDistances",
    security(("SessionCookie" = []))
)]
#[post("/admin/distances/materialize")]
pub async fn materialize_distances(
    state: web::Data<HttpState>,
    session: SessionContext,
) -> ApiResult<HttpResponse> {
    let admin = session.require_admin()?;
    let report = state.distance_loader.materialize(&admin).await?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockDistanceLoadCommand;
    use crate::domain::{StagingMode, UnmatchedStagingRow};
    use crate::inbound::http::admin::{LoginRequest, login};
    use crate::inbound::http::test_utils::{MockPorts, session_cookie, test_session_middleware};
    use actix_http::Request;
    use actix_web::cookie::Cookie;
    use actix_web::dev::{Service, ServiceResponse};
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use serde_json::Value;

    const CSV: &str = "lot_title_raw,building_name_raw,distance_sec_raw\nLot A,Library,300\n";

    fn test_app(
        loader: MockDistanceLoadCommand,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        let state = MockPorts {
            distance_loader: Some(loader),
            ..MockPorts::default()
        }
        .into_state();
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/api/v1")
                    .service(login)
                    .service(stage_distances)
                    .service(materialize_distances),
            )
    }

    async fn login_and_get_cookie<S>(app: &S) -> Cookie<'static>
    where
        S: Service<Request, Response = ServiceResponse, Error = actix_web::Error>,
    {
        let res = test::call_service(
            app,
            test::TestRequest::post()
                .uri("/api/v1/admin/login")
                .set_json(&LoginRequest {
                    username: "ops".into(),
                    password: "secret".into(),
                })
                .to_request(),
        )
        .await;
        session_cookie(&res)
    }

    #[actix_web::test]
    async fn staging_requires_admin() {
        let mut loader = MockDistanceLoadCommand::new();
        loader.expect_stage().never();
        let app = test::init_service(test_app(loader)).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/distances/staging")
                .insert_header(("content-type", "text/csv"))
                .set_payload(CSV)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn staging_forwards_the_raw_upload() {
        let mut loader = MockDistanceLoadCommand::new();
        loader
            .expect_stage()
            .withf(|admin, upload| admin.operator() == "ops" && upload == CSV.as_bytes())
            .return_once(|_, _| {
                Ok(StageReport {
                    rows: 1,
                    batches: 1,
                    sha256: "ab".repeat(32),
                    mode: StagingMode::PerBatch,
                })
            });
        let app = test::init_service(test_app(loader)).await;
        let cookie = login_and_get_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/distances/staging")
                .cookie(cookie)
                .insert_header(("content-type", "text/csv"))
                .set_payload(CSV)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["rows"], 1);
        assert_eq!(body["batches"], 1);
        assert_eq!(body["sha256"].as_str().map(str::len), Some(64));
    }

    #[actix_web::test]
    async fn header_mismatch_is_a_bad_request() {
        let mut loader = MockDistanceLoadCommand::new();
        loader.expect_stage().return_once(|_, _| {
            Err(Error::invalid_request("staging header does not match"))
        });
        let app = test::init_service(test_app(loader)).await;
        let cookie = login_and_get_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/distances/staging")
                .cookie(cookie)
                .set_payload("a,b\n1,2\n")
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn materialize_reports_unmatched_rows() {
        let mut loader = MockDistanceLoadCommand::new();
        loader.expect_materialize().return_once(|_| {
            Ok(MaterializeReport {
                upserted_rows: 4,
                unmatched_rows: 1,
                unmatched_sample: vec![UnmatchedStagingRow {
                    lot_title_raw: Some("Lot Q".to_owned()),
                    building_name_raw: Some("Library".to_owned()),
                    distance_sec_raw: Some("120".to_owned()),
                    lot_matched: false,
                    building_matched: true,
                }],
            })
        });
        let app = test::init_service(test_app(loader)).await;
        let cookie = login_and_get_cookie(&app).await;

        let res = test::call_service(
            &app,
            test::TestRequest::post()
                .uri("/api/v1/admin/distances/materialize")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let body: Value = test::read_body_json(res).await;
        assert_eq!(body["upsertedRows"], 4);
        assert_eq!(body["unmatchedRows"], 1);
        assert_eq!(body["unmatchedSample"][0]["lotMatched"], false);
    }
}
