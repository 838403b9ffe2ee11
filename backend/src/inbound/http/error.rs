//! Renders domain errors as JSON HTTP responses.
//!
//! Every failure leaves the API as the `Error` payload with the status chosen
//! by [`status_for`]. Store failures keep their message so an operator can
//! see why a statement was rejected; internal errors are redacted.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::{error, warn};

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::InvalidRequest | ErrorCode::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
        ErrorCode::NotFound | ErrorCode::SchemaUnavailable => StatusCode::NOT_FOUND,
        ErrorCode::MissingKey | ErrorCode::EmptyCatalog => StatusCode::CONFLICT,
        ErrorCode::StoreFailure => StatusCode::BAD_GATEWAY,
        ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn redact_if_internal(error: &Error) -> Error {
    match (error.code(), error.trace_id()) {
        (ErrorCode::InternalError, Some(id)) => Error::internal(REDACTED_MESSAGE).with_trace_id(id),
        (ErrorCode::InternalError, None) => Error::internal(REDACTED_MESSAGE),
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            warn!(
                code = ?self.code(),
                trace_id = self.trace_id(),
                message = self.message(),
                "request failed on the server side"
            );
        }

        let mut builder = HttpResponse::build(status);
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }
        builder.json(redact_if_internal(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "framework error surfaced in a handler");
        Self::internal(REDACTED_MESSAGE)
    }
}

#[cfg(test)]
mod tests;
