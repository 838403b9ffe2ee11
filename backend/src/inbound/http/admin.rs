//! Admin gate endpoints.
//!
//! ```text
//! POST /api/v1/admin/login {"username":"ops","password":"secret"}
//! POST /api/v1/admin/logout
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};
use serde_json::json;
use utoipa::ToSchema;

use crate::domain::{AdminGate, Error, LoginCredentials, LoginValidationError};
use crate::inbound::http::ApiResult;
use crate::inbound::http::cache_control::admin_no_store_header;
use crate::inbound::http::session::SessionContext;

/// Login request body for `POST /api/v1/admin/login`.
///
/// Example JSON:
/// `{"username":"ops","password":"secret"}`
#[derive(Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.username, &value.password)
    }
}

/// Body returned after a successful login.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AdminSessionResponse {
    /// Operator recorded in the session.
    pub operator: String,
}

fn map_login_validation_error(err: LoginValidationError) -> Error {
    match err {
        LoginValidationError::EmptyUsername => Error::invalid_request("username must not be empty")
            .with_details(json!({ "field": "username", "code": "empty_username" })),
        LoginValidationError::EmptyPassword => Error::invalid_request("password must not be empty")
            .with_details(json!({ "field": "password", "code": "empty_password" })),
    }
}

/// Pass the admin gate and establish a session.
///
/// Any non-blank username and password are accepted.
#[utoipa::path(
    post,
    path = "/api/v1/admin/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login success", body = AdminSessionResponse,
            headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "adminLogin",
    security([])
)]
#[post("/admin/login")]
pub async fn login(
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let credentials =
        LoginCredentials::try_from(payload.into_inner()).map_err(map_login_validation_error)?;
    let admin = AdminGate.login(&credentials);
    session.persist_admin(&admin)?;
    Ok(HttpResponse::Ok()
        .insert_header(admin_no_store_header())
        .json(AdminSessionResponse {
            operator: admin.operator().to_owned(),
        }))
}

/// End the admin session.
#[utoipa::path(
    post,
    path = "/api/v1/admin/logout",
    responses((status = 204, description = "Session cleared")),
    tags = ["admin"],
    operation_id = "adminLogout",
    security(("SessionCookie" = []))
)]
#[post("/admin/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    HttpResponse::NoContent()
        .insert_header(admin_no_store_header())
        .finish()
}
