//! OpenAPI documentation configuration.
//!
//! [`ApiDoc`] registers every REST endpoint of the inbound layer, the domain
//! payload schemas, and the session cookie security scheme used by the admin
//! routes. Swagger UI serves it in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::domain::{
    AllowedTable, Building, ColumnMeta, CrudOutcome, Error, ErrorCode, FormField, KeyOptions,
    LotRecommendation, LotSummary, MapMarker, MaterializeReport, PermitOption,
    RecommendationResponse, RowPreview, StageReport, TableSchema, UnmatchedStagingRow,
};
use crate::inbound::http::admin::{AdminSessionResponse, LoginRequest};
use crate::inbound::http::admin_tables::{DeleteRowRequest, InsertRowRequest, UpdateRowRequest};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /api/v1/admin/login.",
            ))),
        );
    }
}

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "SmartPark API",
        description = "Parking lot recommendations and reference-data administration.",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::catalogue::list_buildings,
        crate::inbound::http::catalogue::list_permits,
        crate::inbound::http::catalogue::lots_preview,
        crate::inbound::http::recommendations::recommend_lots,
        crate::inbound::http::admin::login,
        crate::inbound::http::admin::logout,
        crate::inbound::http::admin_tables::list_tables,
        crate::inbound::http::admin_tables::table_schema,
        crate::inbound::http::admin_tables::table_form,
        crate::inbound::http::admin_tables::table_rows,
        crate::inbound::http::admin_tables::table_keys,
        crate::inbound::http::admin_tables::insert_row,
        crate::inbound::http::admin_tables::update_row,
        crate::inbound::http::admin_tables::delete_row,
        crate::inbound::http::admin_distances::stage_distances,
        crate::inbound::http::admin_distances::materialize_distances,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        Error,
        ErrorCode,
        Building,
        PermitOption,
        LotSummary,
        LotRecommendation,
        MapMarker,
        RecommendationResponse,
        AllowedTable,
        ColumnMeta,
        TableSchema,
        FormField,
        RowPreview,
        KeyOptions,
        CrudOutcome,
        StageReport,
        MaterializeReport,
        UnmatchedStagingRow,
        LoginRequest,
        AdminSessionResponse,
        InsertRowRequest,
        UpdateRowRequest,
        DeleteRowRequest,
    )),
    tags(
        (name = "catalogue", description = "Reference data for the recommendation form"),
        (name = "recommendations", description = "Ranked parking lots"),
        (name = "admin", description = "Session-protected table editor and distance loader"),
        (name = "health", description = "Endpoints for health checks")
    )
)]
pub struct ApiDoc;
