//! Value coercion from raw form input to typed store values.
//!
//! Coercion is driven by [`RULES`]: each entry maps a family of declared
//! column types to the form input kind and the conversion applied to raw
//! input. Types that no rule claims are treated as text.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde::Serialize;
use serde_json::Value;
use utoipa::ToSchema;

/// Family of declared column types sharing one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum TypeFamily {
    /// Whole numbers.
    Integer,
    /// Fixed or floating point numbers.
    Decimal,
    /// Calendar dates.
    Date,
    /// Timestamps without zone (offsets are normalised to UTC).
    DateTime,
    /// Everything else, kept verbatim.
    Text,
}

/// Input widget a form should render for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum InputKind {
    /// Whole-number entry.
    Integer,
    /// Number entry allowing fractions.
    Decimal,
    /// Date picker.
    Date,
    /// Date and time picker.
    DateTime,
    /// Free text.
    Text,
}

/// Raw value as submitted by a client.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// Absent or explicit null.
    Null,
    /// Text input.
    Text(String),
    /// Native integer.
    Integer(i64),
    /// Native floating point number.
    Float(f64),
    /// Native date.
    Date(NaiveDate),
    /// Native timestamp.
    DateTime(NaiveDateTime),
}

impl RawValue {
    /// Convert a JSON scalar into a raw value.
    ///
    /// Arrays and objects are not valid column input and yield `None`.
    /// Booleans are passed on as their text form.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => Some(Self::Null),
            Value::String(text) => Some(Self::Text(text.clone())),
            Value::Bool(flag) => Some(Self::Text(flag.to_string())),
            Value::Number(number) => number
                .as_i64()
                .map(Self::Integer)
                .or_else(|| number.as_f64().map(Self::Float)),
            Value::Array(_) | Value::Object(_) => None,
        }
    }

    /// True for null input and for empty text.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Null => true,
            Self::Text(text) => text.is_empty(),
            _ => false,
        }
    }

    /// True for null input and for text that is blank once trimmed.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            other => other.is_empty(),
        }
    }

    fn describe(&self) -> String {
        match self {
            Self::Null => "null".to_owned(),
            Self::Text(text) => text.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Float(value) => value.to_string(),
            Self::Date(value) => value.to_string(),
            Self::DateTime(value) => value.to_string(),
        }
    }
}

/// Typed value ready to bind as a statement parameter.
///
/// Nulls keep their family so adapters can bind a correctly typed `NULL`.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    /// Typed null.
    Null(TypeFamily),
    /// 64-bit integer.
    Integer(i64),
    /// Finite double.
    Decimal(f64),
    /// Date.
    Date(NaiveDate),
    /// Timestamp without zone.
    DateTime(NaiveDateTime),
    /// Text.
    Text(String),
}

impl SqlValue {
    /// Family the value binds as.
    #[must_use]
    pub fn family(&self) -> TypeFamily {
        match self {
            Self::Null(family) => *family,
            Self::Integer(_) => TypeFamily::Integer,
            Self::Decimal(_) => TypeFamily::Decimal,
            Self::Date(_) => TypeFamily::Date,
            Self::DateTime(_) => TypeFamily::DateTime,
            Self::Text(_) => TypeFamily::Text,
        }
    }
}

/// Conversion failure for one raw value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{value:?} is not a valid {expected} value")]
pub struct CoercionError {
    /// Family the value was coerced towards.
    pub family: TypeFamily,
    /// Human-readable name of the expected type.
    pub expected: &'static str,
    /// Offending input rendered as text.
    pub value: String,
}

type CoerceFn = fn(&RawValue) -> Result<SqlValue, CoercionError>;

/// One entry of the dispatch table.
pub struct CoercionRule {
    /// Family handled by the rule.
    pub family: TypeFamily,
    /// Declared type names (lower case, without parameters) in the family.
    pub type_names: &'static [&'static str],
    /// Form input kind for the family.
    pub input_kind: InputKind,
    coerce: CoerceFn,
}

/// Dispatch table consulted by [`coerce`] and the form generator.
pub static RULES: [CoercionRule; 4] = [
    CoercionRule {
        family: TypeFamily::Integer,
        type_names: &[
            "smallint",
            "integer",
            "int",
            "bigint",
            "int2",
            "int4",
            "int8",
            "tinyint",
            "mediumint",
            "serial",
            "bigserial",
        ],
        input_kind: InputKind::Integer,
        coerce: coerce_integer,
    },
    CoercionRule {
        family: TypeFamily::Decimal,
        type_names: &[
            "decimal",
            "numeric",
            "real",
            "float",
            "float4",
            "float8",
            "double",
            "double precision",
        ],
        input_kind: InputKind::Decimal,
        coerce: coerce_decimal,
    },
    CoercionRule {
        family: TypeFamily::Date,
        type_names: &["date"],
        input_kind: InputKind::Date,
        coerce: coerce_date,
    },
    CoercionRule {
        family: TypeFamily::DateTime,
        type_names: &[
            "timestamp",
            "timestamp without time zone",
            "timestamp with time zone",
            "timestamptz",
            "datetime",
        ],
        input_kind: InputKind::DateTime,
        coerce: coerce_datetime,
    },
];

fn normalise_type_name(data_type: &str) -> String {
    let lowered = data_type.trim().to_ascii_lowercase();
    let base = lowered.split('(').next().unwrap_or_default();
    base.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn rule_for(data_type: &str) -> Option<&'static CoercionRule> {
    let name = normalise_type_name(data_type);
    RULES
        .iter()
        .find(|rule| rule.type_names.contains(&name.as_str()))
}

/// Type family of a declared column type.
#[must_use]
pub fn family_for(data_type: &str) -> TypeFamily {
    rule_for(data_type).map_or(TypeFamily::Text, |rule| rule.family)
}

/// Form input kind for a declared column type.
#[must_use]
pub fn input_kind_for(data_type: &str) -> InputKind {
    rule_for(data_type).map_or(InputKind::Text, |rule| rule.input_kind)
}

/// Convert `raw` into a value of the family `data_type` belongs to.
///
/// Null and empty input yield a typed null without attempting conversion.
///
/// # Examples
/// ```
/// use smartpark::domain::{coerce, RawValue, SqlValue, TypeFamily};
///
/// assert_eq!(coerce("int", &RawValue::Text("42".into())), Ok(SqlValue::Integer(42)));
/// assert_eq!(coerce("date", &RawValue::Text(String::new())), Ok(SqlValue::Null(TypeFamily::Date)));
/// assert!(coerce("decimal", &RawValue::Text("abc".into())).is_err());
/// ```
pub fn coerce(data_type: &str, raw: &RawValue) -> Result<SqlValue, CoercionError> {
    let rule = rule_for(data_type);
    if raw.is_empty() {
        return Ok(SqlValue::Null(rule.map_or(TypeFamily::Text, |r| r.family)));
    }
    match rule {
        Some(rule) => (rule.coerce)(raw),
        None => Ok(coerce_text(raw)),
    }
}

fn failure(family: TypeFamily, expected: &'static str, raw: &RawValue) -> CoercionError {
    CoercionError {
        family,
        expected,
        value: raw.describe(),
    }
}

fn coerce_integer(raw: &RawValue) -> Result<SqlValue, CoercionError> {
    let fail = || failure(TypeFamily::Integer, "integer", raw);
    match raw {
        RawValue::Integer(value) => Ok(SqlValue::Integer(*value)),
        RawValue::Text(text) => text.trim().parse().map(SqlValue::Integer).map_err(|_| fail()),
        // Whole floats only; the textual round trip rejects values outside i64.
        RawValue::Float(value) if value.is_finite() && value.fract() == 0.0 => format!("{value}")
            .parse()
            .map(SqlValue::Integer)
            .map_err(|_| fail()),
        _ => Err(fail()),
    }
}

#[expect(
    clippy::cast_precision_loss,
    reason = "integers feeding decimal columns tolerate f64 rounding"
)]
fn coerce_decimal(raw: &RawValue) -> Result<SqlValue, CoercionError> {
    let fail = || failure(TypeFamily::Decimal, "decimal", raw);
    let value = match raw {
        RawValue::Integer(value) => *value as f64,
        RawValue::Float(value) => *value,
        RawValue::Text(text) => text.trim().parse::<f64>().map_err(|_| fail())?,
        _ => return Err(fail()),
    };
    if value.is_finite() {
        Ok(SqlValue::Decimal(value))
    } else {
        Err(fail())
    }
}

fn coerce_date(raw: &RawValue) -> Result<SqlValue, CoercionError> {
    match raw {
        RawValue::Date(date) => Ok(SqlValue::Date(*date)),
        RawValue::DateTime(timestamp) => Ok(SqlValue::Date(timestamp.date())),
        RawValue::Text(text) => parse_iso_date(text.trim())
            .map(SqlValue::Date)
            .ok_or_else(|| failure(TypeFamily::Date, "date (YYYY-MM-DD)", raw)),
        _ => Err(failure(TypeFamily::Date, "date (YYYY-MM-DD)", raw)),
    }
}

fn coerce_datetime(raw: &RawValue) -> Result<SqlValue, CoercionError> {
    match raw {
        RawValue::DateTime(timestamp) => Ok(SqlValue::DateTime(*timestamp)),
        RawValue::Date(date) => Ok(SqlValue::DateTime(date.and_time(NaiveTime::MIN))),
        RawValue::Text(text) => parse_iso_datetime(text.trim())
            .map(SqlValue::DateTime)
            .ok_or_else(|| failure(TypeFamily::DateTime, "ISO-8601 datetime", raw)),
        _ => Err(failure(TypeFamily::DateTime, "ISO-8601 datetime", raw)),
    }
}

fn coerce_text(raw: &RawValue) -> SqlValue {
    match raw {
        RawValue::Null => SqlValue::Null(TypeFamily::Text),
        RawValue::Text(text) => SqlValue::Text(text.clone()),
        RawValue::DateTime(timestamp) => {
            SqlValue::Text(timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        other => SqlValue::Text(other.describe()),
    }
}

fn parse_iso_date(text: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

const OFFSET_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f%:z",
    "%Y-%m-%d %H:%M:%S%.f%:z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
];

fn parse_iso_datetime(text: &str) -> Option<NaiveDateTime> {
    if let Some(date) = parse_iso_date(text) {
        return Some(date.and_time(NaiveTime::MIN));
    }
    if let Some(found) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
    {
        return Some(found);
    }
    let with_offset = match text.strip_suffix(['Z', 'z']) {
        Some(stripped) => format!("{stripped}+00:00"),
        None => text.to_owned(),
    };
    OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::<FixedOffset>::parse_from_str(&with_offset, format).ok())
        .map(|timestamp| timestamp.naive_utc())
}
