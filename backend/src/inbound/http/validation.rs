//! Shared validation helpers for inbound HTTP adapters.
//!
//! Query strings are accepted as raw text and parsed here so malformed
//! parameters produce the JSON error payload rather than Actix's plain-text
//! rejection.

use std::ops::RangeInclusive;

use actix_web::web;
use serde_json::json;

use crate::domain::Error;

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    NotAnInteger,
    OutOfRange,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::NotAnInteger => "not_an_integer",
            ErrorCode::OutOfRange => "out_of_range",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

/// Builder for validation errors with field context.
struct ValidationError {
    field: String,
    message: String,
}

impl ValidationError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }

    fn with_code(self, code: ErrorCode) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "code": code.as_str(),
        }))
    }

    fn with_value(self, code: ErrorCode, value: impl Into<String>) -> Error {
        Error::invalid_request(self.message).with_details(json!({
            "field": self.field,
            "value": value.into(),
            "code": code.as_str(),
        }))
    }
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("missing required field: {field}"))
        .with_code(ErrorCode::MissingField)
}

pub(crate) fn not_an_integer_error(field: FieldName, value: &str) -> Error {
    let field = field.as_str();
    ValidationError::new(field, format!("{field} must be an integer"))
        .with_value(ErrorCode::NotAnInteger, value)
}

pub(crate) fn out_of_range_error(
    field: FieldName,
    value: &str,
    bounds: &RangeInclusive<u32>,
) -> Error {
    let field = field.as_str();
    ValidationError::new(
        field,
        format!(
            "{field} must be between {} and {}",
            bounds.start(),
            bounds.end()
        ),
    )
    .with_value(ErrorCode::OutOfRange, value)
}

/// Parse a required integer identifier.
pub(crate) fn parse_required_i32(value: Option<&str>, field: FieldName) -> Result<i32, Error> {
    let raw = value
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .ok_or_else(|| missing_field_error(field))?;
    raw.parse().map_err(|_| not_an_integer_error(field, raw))
}

/// Parse an optional bounded count, falling back to `default` when absent.
pub(crate) fn parse_bounded_u32(
    value: Option<&str>,
    field: FieldName,
    bounds: RangeInclusive<u32>,
    default: u32,
) -> Result<u32, Error> {
    let Some(raw) = value.map(str::trim).filter(|raw| !raw.is_empty()) else {
        return Ok(default);
    };
    let parsed: u32 = raw.parse().map_err(|_| not_an_integer_error(field, raw))?;
    if bounds.contains(&parsed) {
        Ok(parsed)
    } else {
        Err(out_of_range_error(field, raw, &bounds))
    }
}

/// JSON body settings that reject malformed payloads with `invalid_request`.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed JSON body: {err}")).into()
    })
}

/// Query string settings that reject malformed parameters with `invalid_request`.
pub fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        Error::invalid_request(format!("malformed query string: {err}")).into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode as DomainCode;
    use rstest::rstest;

    const FIELD: FieldName = FieldName::new("limit");

    #[rstest]
    #[case(None, 10)]
    #[case(Some(""), 10)]
    #[case(Some("3"), 3)]
    #[case(Some(" 20 "), 20)]
    fn bounded_values_default_and_parse(#[case] raw: Option<&str>, #[case] expected: u32) {
        assert_eq!(
            parse_bounded_u32(raw, FIELD, 3..=20, 10).expect("valid"),
            expected
        );
    }

    #[rstest]
    #[case("2", "out_of_range")]
    #[case("21", "out_of_range")]
    #[case("-1", "not_an_integer")]
    #[case("ten", "not_an_integer")]
    fn bounded_values_reject_bad_input(#[case] raw: &str, #[case] code: &str) {
        let err = parse_bounded_u32(Some(raw), FIELD, 3..=20, 10).expect_err("rejected");
        assert_eq!(err.code(), DomainCode::InvalidRequest);
        let details = err.details().expect("details");
        assert_eq!(details["field"], "limit");
        assert_eq!(details["code"], code);
    }

    #[rstest]
    fn required_identifier_must_be_present() {
        let err = parse_required_i32(None, FieldName::new("buildingId")).expect_err("missing");
        assert_eq!(
            err.details().and_then(|d| d.get("code")),
            Some(&json!("missing_field"))
        );
        assert_eq!(
            parse_required_i32(Some("7"), FieldName::new("buildingId")).expect("valid"),
            7
        );
    }
}
