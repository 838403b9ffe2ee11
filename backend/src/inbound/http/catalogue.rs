//! Public reference catalogue endpoints.
//!
//! ```text
//! GET /api/v1/buildings
//! GET /api/v1/permits
//! GET /api/v1/lots/preview?limit=50
//! ```

use actix_web::{HttpResponse, get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::recommendation::LOTS_PREVIEW_LIMIT;
use crate::domain::{Building, Error, LotSummary, PermitOption};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::catalogue_revalidate_header;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_bounded_u32};

const LIMIT_FIELD: FieldName = FieldName::new("limit");

/// Query string for the lots preview.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct LotsPreviewQuery {
    /// Maximum number of lots, 1 to 200 (default 200).
    #[param(example = "50")]
    pub limit: Option<String>,
}

/// List destination buildings ordered by name.
#[utoipa::path(
    get,
    path = "/api/v1/buildings",
    responses(
        (status = 200, description = "Buildings", body = [Building]),
        (status = 502, description = "Store failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listBuildings",
    security([])
)]
#[get("/buildings")]
pub async fn list_buildings(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let buildings = state.catalogue.list_buildings().await?;
    Ok(HttpResponse::Ok()
        .insert_header(catalogue_revalidate_header())
        .json(buildings))
}

/// List permit options, `any` first.
#[utoipa::path(
    get,
    path = "/api/v1/permits",
    responses(
        (status = 200, description = "Permit options", body = [PermitOption]),
        (status = 502, description = "Store failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "listPermits",
    security([])
)]
#[get("/permits")]
pub async fn list_permits(state: web::Data<HttpState>) -> ApiResult<HttpResponse> {
    let options = state.catalogue.list_permit_options().await?;
    Ok(HttpResponse::Ok()
        .insert_header(catalogue_revalidate_header())
        .json(options))
}

/// Preview lots ordered by title.
#[utoipa::path(
    get,
    path = "/api/v1/lots/preview",
    params(LotsPreviewQuery),
    responses(
        (status = 200, description = "Lots", body = [LotSummary]),
        (status = 400, description = "Invalid request", body = Error),
        (status = 502, description = "Store failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["catalogue"],
    operation_id = "previewLots",
    security([])
)]
#[get("/lots/preview")]
pub async fn lots_preview(
    state: web::Data<HttpState>,
    query: web::Query<LotsPreviewQuery>,
) -> ApiResult<HttpResponse> {
    let limit = parse_bounded_u32(
        query.limit.as_deref(),
        LIMIT_FIELD,
        1..=LOTS_PREVIEW_LIMIT,
        LOTS_PREVIEW_LIMIT,
    )?;
    let lots = state.catalogue.lots_preview(limit).await?;
    Ok(HttpResponse::Ok()
        .insert_header(catalogue_revalidate_header())
        .json(lots))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockParkingCatalogueQuery;
    use crate::domain::{GeoPoint, LotSummary};
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    async fn call(catalogue: MockParkingCatalogueQuery, uri: &str) -> (StatusCode, Value) {
        let state = MockPorts {
            catalogue: Some(catalogue),
            ..MockPorts::default()
        }
        .into_state();
        let app = test::init_service(
            App::new().app_data(web::Data::new(state)).service(
                web::scope("/api/v1")
                    .service(list_buildings)
                    .service(list_permits)
                    .service(lots_preview),
            ),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn buildings_serialise_with_location() {
        let mut catalogue = MockParkingCatalogueQuery::new();
        catalogue.expect_list_buildings().return_once(|| {
            Ok(vec![Building {
                id: 1,
                name: "Library".to_owned(),
                location: GeoPoint {
                    latitude: 40.0,
                    longitude: -75.0,
                },
            }])
        });

        let (status, body) = call(catalogue, "/api/v1/buildings").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["name"], "Library");
        assert_eq!(body[0]["location"]["latitude"], 40.0);
    }

    #[rstest]
    #[actix_web::test]
    async fn permits_list_any_first() {
        let mut catalogue = MockParkingCatalogueQuery::new();
        catalogue
            .expect_list_permit_options()
            .return_once(|| Ok(vec![PermitOption::any()]));

        let (status, body) = call(catalogue, "/api/v1/permits").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["value"], "any");
        assert_eq!(body[0]["label"], "Any");
    }

    #[rstest]
    #[case("/api/v1/lots/preview", 200)]
    #[case("/api/v1/lots/preview?limit=25", 25)]
    #[actix_web::test]
    async fn lots_preview_passes_limit(#[case] uri: &str, #[case] expected: u32) {
        let mut catalogue = MockParkingCatalogueQuery::new();
        catalogue
            .expect_lots_preview()
            .withf(move |limit| *limit == expected)
            .return_once(|_| {
                Ok(vec![LotSummary {
                    id: 10,
                    title: "Lot A".to_owned(),
                    location: None,
                }])
            });

        let (status, body) = call(catalogue, uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["title"], "Lot A");
        assert!(body[0]["location"].is_null());
    }

    #[rstest]
    #[actix_web::test]
    async fn oversized_preview_is_rejected() {
        let mut catalogue = MockParkingCatalogueQuery::new();
        catalogue.expect_lots_preview().never();

        let (status, body) = call(catalogue, "/api/v1/lots/preview?limit=500").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], "limit");
    }

    #[rstest]
    #[actix_web::test]
    async fn store_outage_is_service_unavailable() {
        let mut catalogue = MockParkingCatalogueQuery::new();
        catalogue
            .expect_list_buildings()
            .return_once(|| Err(Error::service_unavailable("catalogue unavailable")));

        let (status, body) = call(catalogue, "/api/v1/buildings").await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "service_unavailable");
    }
}
