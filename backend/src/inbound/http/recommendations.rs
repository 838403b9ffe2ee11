//! Lot recommendation endpoint.
//!
//! ```text
//! GET /api/v1/recommendations?buildingId=1&permit=any&maxWalkMinutes=10&limit=5
//! ```

use actix_web::{get, web};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::domain::{Error, PermitFilter, RecommendationRequest, RecommendationResponse};
use crate::inbound::http::ApiResult;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, parse_bounded_u32, parse_required_i32};

/// Walking budget bounds offered to users, in minutes.
pub const WALK_MINUTES_BOUNDS: std::ops::RangeInclusive<u32> = 1..=30;
/// Result count bounds offered to users.
pub const LIMIT_BOUNDS: std::ops::RangeInclusive<u32> = 3..=20;
const DEFAULT_WALK_MINUTES: u32 = 10;
const DEFAULT_LIMIT: u32 = 10;

/// Query string for `GET /recommendations`.
///
/// Values arrive as text so malformed numbers produce the JSON error payload.
#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query, rename_all = "camelCase")]
pub struct RecommendationQuery {
    /// Destination building id.
    #[param(example = "1")]
    pub building_id: Option<String>,
    /// `any` (default, case-insensitive) or a permit id.
    #[param(example = "any")]
    pub permit: Option<String>,
    /// Walking budget in minutes, 1 to 30 (default 10).
    #[param(example = "10")]
    pub max_walk_minutes: Option<String>,
    /// Number of lots, 3 to 20 (default 10).
    #[param(example = "5")]
    pub limit: Option<String>,
}

impl RecommendationQuery {
    fn into_request(self) -> Result<RecommendationRequest, Error> {
        let building_id =
            parse_required_i32(self.building_id.as_deref(), FieldName::new("buildingId"))?;
        let permit = match self.permit.as_deref().map(str::trim) {
            None | Some("") => PermitFilter::Any,
            Some(raw) => PermitFilter::parse(raw)?,
        };
        let max_walk_minutes = parse_bounded_u32(
            self.max_walk_minutes.as_deref(),
            FieldName::new("maxWalkMinutes"),
            WALK_MINUTES_BOUNDS,
            DEFAULT_WALK_MINUTES,
        )?;
        let limit = parse_bounded_u32(
            self.limit.as_deref(),
            FieldName::new("limit"),
            LIMIT_BOUNDS,
            DEFAULT_LIMIT,
        )?;
        RecommendationRequest::try_new(building_id, permit, max_walk_minutes, limit)
    }
}

/// Rank lots within walking distance of a building.
#[utoipa::path(
    get,
    path = "/api/v1/recommendations",
    params(RecommendationQuery),
    responses(
        (status = 200, description = "Ranked lots and map markers", body = RecommendationResponse),
        (status = 400, description = "Invalid request", body = Error),
        (status = 404, description = "Unknown building or permit", body = Error),
        (status = 409, description = "Reference catalogue is empty", body = Error),
        (status = 502, description = "Store failure", body = Error),
        (status = 503, description = "Service unavailable", body = Error)
    ),
    tags = ["recommendations"],
    operation_id = "recommendLots",
    security([])
)]
#[get("/recommendations")]
pub async fn recommend_lots(
    state: web::Data<HttpState>,
    query: web::Query<RecommendationQuery>,
) -> ApiResult<web::Json<RecommendationResponse>> {
    let request = query.into_inner().into_request()?;
    let response = state.recommendations.recommend(&request).await?;
    Ok(web::Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLotRecommendationQuery;
    use crate::domain::{Building, GeoPoint};
    use crate::inbound::http::test_utils::MockPorts;
    use actix_web::http::StatusCode;
    use actix_web::{App, test};
    use rstest::rstest;
    use serde_json::Value;

    fn library_response() -> RecommendationResponse {
        RecommendationResponse {
            destination: Building {
                id: 1,
                name: "Library".to_owned(),
                location: GeoPoint {
                    latitude: 40.0,
                    longitude: -75.0,
                },
            },
            lots: Vec::new(),
            map_markers: Vec::new(),
        }
    }

    async fn call(recommendations: MockLotRecommendationQuery, uri: &str) -> (StatusCode, Value) {
        let state = MockPorts {
            recommendations: Some(recommendations),
            ..MockPorts::default()
        }
        .into_state();
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .service(web::scope("/api/v1").service(recommend_lots)),
        )
        .await;
        let res = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        let status = res.status();
        (status, test::read_body_json(res).await)
    }

    #[rstest]
    #[actix_web::test]
    async fn defaults_apply_when_parameters_are_omitted() {
        let mut port = MockLotRecommendationQuery::new();
        port.expect_recommend()
            .withf(|req| {
                req.building_id() == 1
                    && req.permit() == PermitFilter::Any
                    && req.max_walk_minutes() == 10
                    && req.limit() == 10
            })
            .return_once(|_| Ok(library_response()));

        let (status, body) = call(port, "/api/v1/recommendations?buildingId=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["destination"]["name"], "Library");
        assert_eq!(body["lots"], Value::Array(Vec::new()));
    }

    #[rstest]
    #[actix_web::test]
    async fn explicit_parameters_reach_the_port() {
        let mut port = MockLotRecommendationQuery::new();
        port.expect_recommend()
            .withf(|req| {
                req.permit() == PermitFilter::Permit(2)
                    && req.max_walk_minutes() == 30
                    && req.limit() == 3
            })
            .return_once(|_| Ok(library_response()));

        let (status, _) = call(
            port,
            "/api/v1/recommendations?buildingId=1&permit=2&maxWalkMinutes=30&limit=3",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[rstest]
    #[case("/api/v1/recommendations", "buildingId")]
    #[case("/api/v1/recommendations?buildingId=x", "buildingId")]
    #[case("/api/v1/recommendations?buildingId=1&maxWalkMinutes=0", "maxWalkMinutes")]
    #[case("/api/v1/recommendations?buildingId=1&maxWalkMinutes=31", "maxWalkMinutes")]
    #[case("/api/v1/recommendations?buildingId=1&limit=2", "limit")]
    #[case("/api/v1/recommendations?buildingId=1&limit=21", "limit")]
    #[actix_web::test]
    async fn out_of_bounds_parameters_are_rejected(#[case] uri: &str, #[case] field: &str) {
        let mut port = MockLotRecommendationQuery::new();
        port.expect_recommend().never();

        let (status, body) = call(port, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "invalid_request");
        assert_eq!(body["details"]["field"], field);
    }

    #[rstest]
    #[actix_web::test]
    async fn unknown_building_is_not_found() {
        let mut port = MockLotRecommendationQuery::new();
        port.expect_recommend()
            .return_once(|_| Err(Error::not_found("building 99 does not exist")));

        let (status, body) = call(port, "/api/v1/recommendations?buildingId=99").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["code"], "not_found");
    }
}
