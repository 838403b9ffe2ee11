//! Parking reference entities and recommendation values.

use chrono::NaiveDateTime;
use serde::Serialize;
use utoipa::ToSchema;

use crate::domain::Error;

/// Geographic coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct GeoPoint {
    /// Latitude.
    #[schema(example = 40.0)]
    pub latitude: f64,
    /// Longitude.
    #[schema(example = -75.0)]
    pub longitude: f64,
}

impl GeoPoint {
    /// Pair two optional coordinates; either being absent makes the point absent.
    #[must_use]
    pub fn from_parts(latitude: Option<f64>, longitude: Option<f64>) -> Option<Self> {
        Some(Self {
            latitude: latitude?,
            longitude: longitude?,
        })
    }
}

/// Destination building.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Building {
    /// Identifier.
    pub id: i32,
    /// Display name.
    #[schema(example = "Library")]
    pub name: String,
    /// Location used as the map center.
    pub location: GeoPoint,
}

/// Permit category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Permit {
    /// Identifier.
    pub id: i32,
    /// Display name.
    #[schema(example = "Commuter")]
    pub name: String,
}

/// Entry in the permit selector, including the `any` sentinel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PermitOption {
    /// Value to pass back as the `permit` query parameter.
    #[schema(example = "any")]
    pub value: String,
    /// Display label.
    #[schema(example = "Any")]
    pub label: String,
}

impl PermitOption {
    /// The sentinel option matching every lot.
    #[must_use]
    pub fn any() -> Self {
        Self {
            value: "any".to_owned(),
            label: "Any".to_owned(),
        }
    }
}

impl From<Permit> for PermitOption {
    fn from(permit: Permit) -> Self {
        Self {
            value: permit.id.to_string(),
            label: permit.name,
        }
    }
}

/// Lot as shown in the catalogue preview.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LotSummary {
    /// Identifier.
    pub id: i32,
    /// Display title.
    pub title: String,
    /// Location when both coordinates are known.
    pub location: Option<GeoPoint>,
}

/// Permit restriction applied to a recommendation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PermitFilter {
    /// Every lot qualifies.
    #[default]
    Any,
    /// Only lots accepting this permit id qualify.
    Permit(i32),
}

impl PermitFilter {
    /// Parse `any` (case-insensitive) or a numeric permit id.
    ///
    /// # Examples
    /// ```
    /// use smartpark::domain::PermitFilter;
    ///
    /// assert_eq!(PermitFilter::parse("ANY").ok(), Some(PermitFilter::Any));
    /// assert_eq!(PermitFilter::parse("3").ok(), Some(PermitFilter::Permit(3)));
    /// ```
    pub fn parse(value: &str) -> Result<Self, Error> {
        let trimmed = value.trim();
        if trimmed.eq_ignore_ascii_case("any") {
            return Ok(Self::Any);
        }
        trimmed.parse().map(Self::Permit).map_err(|_| {
            Error::invalid_request(format!("permit must be \"any\" or a permit id, got {value:?}"))
                .with_details(serde_json::json!({ "field": "permit" }))
        })
    }
}

/// Validated recommendation parameters.
///
/// ## Invariants
/// - `max_walk_minutes > 0`
/// - `limit > 0`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecommendationRequest {
    building_id: i32,
    permit: PermitFilter,
    max_walk_minutes: u32,
    limit: u32,
}

impl RecommendationRequest {
    /// Validate and build a request.
    pub fn try_new(
        building_id: i32,
        permit: PermitFilter,
        max_walk_minutes: u32,
        limit: u32,
    ) -> Result<Self, Error> {
        if max_walk_minutes == 0 {
            return Err(Error::invalid_request("maxWalkMinutes must be positive")
                .with_details(serde_json::json!({ "field": "maxWalkMinutes" })));
        }
        if limit == 0 {
            return Err(Error::invalid_request("limit must be positive")
                .with_details(serde_json::json!({ "field": "limit" })));
        }
        Ok(Self {
            building_id,
            permit,
            max_walk_minutes,
            limit,
        })
    }

    /// Destination building.
    #[must_use]
    pub fn building_id(&self) -> i32 {
        self.building_id
    }

    /// Permit restriction.
    #[must_use]
    pub fn permit(&self) -> PermitFilter {
        self.permit
    }

    /// Walk budget in minutes.
    #[must_use]
    pub fn max_walk_minutes(&self) -> u32 {
        self.max_walk_minutes
    }

    /// Maximum number of rows returned.
    #[must_use]
    pub fn limit(&self) -> u32 {
        self.limit
    }

    /// Walk budget in seconds.
    #[must_use]
    pub fn max_distance_seconds(&self) -> i64 {
        i64::from(self.max_walk_minutes) * 60
    }
}

/// Ranked row as produced by the store.
#[derive(Debug, Clone, PartialEq)]
pub struct LotCandidate {
    /// Lot identifier.
    pub lot_id: i32,
    /// Lot title.
    pub title: String,
    /// Location when both coordinates are known.
    pub location: Option<GeoPoint>,
    /// Walk distance in seconds.
    pub distance_seconds: i32,
    /// Capacity from the latest snapshot.
    pub capacity_total: i32,
    /// Timestamp of the latest snapshot.
    pub snapshot_ts: NaiveDateTime,
    /// Comma-joined permit names; empty when the lot has none.
    pub parking_types: String,
}

/// Recommendation row returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LotRecommendation {
    /// Lot identifier.
    pub lot_id: i32,
    /// Lot title.
    #[schema(example = "Lot A")]
    pub title: String,
    /// Location; absent lots are listed but not plotted.
    pub location: Option<GeoPoint>,
    /// Walk distance in seconds.
    #[schema(example = 300)]
    pub distance_seconds: i32,
    /// Walk distance in minutes, one decimal.
    #[schema(example = 5.0)]
    pub walk_minutes: f64,
    /// Capacity from the latest snapshot.
    #[schema(example = 50)]
    pub capacity_total: i32,
    /// Timestamp of the latest snapshot.
    #[schema(value_type = String, example = "2024-01-15T08:00:00")]
    pub snapshot_ts: NaiveDateTime,
    /// Comma-joined permit names.
    #[schema(example = "Commuter, Resident")]
    pub parking_types: String,
}

impl From<LotCandidate> for LotRecommendation {
    fn from(candidate: LotCandidate) -> Self {
        Self {
            lot_id: candidate.lot_id,
            walk_minutes: walk_minutes(candidate.distance_seconds),
            title: candidate.title,
            location: candidate.location,
            distance_seconds: candidate.distance_seconds,
            capacity_total: candidate.capacity_total,
            snapshot_ts: candidate.snapshot_ts,
            parking_types: candidate.parking_types,
        }
    }
}

/// Seconds to minutes, rounded to one decimal place.
#[must_use]
pub fn walk_minutes(distance_seconds: i32) -> f64 {
    (f64::from(distance_seconds) / 6.0).round() / 10.0
}

/// Popup content for one plotted lot.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MapMarker {
    /// Lot identifier.
    pub lot_id: i32,
    /// Marker position.
    pub location: GeoPoint,
    /// Lot title.
    pub title: String,
    /// Comma-joined permit names.
    pub parking_types: String,
    /// Walk distance in minutes.
    pub walk_minutes: f64,
    /// Capacity from the latest snapshot.
    pub capacity_total: i32,
    /// Timestamp of the latest snapshot.
    #[schema(value_type = String)]
    pub snapshot_ts: NaiveDateTime,
}

impl MapMarker {
    /// Marker for a plottable recommendation.
    #[must_use]
    pub fn for_recommendation(row: &LotRecommendation) -> Option<Self> {
        Some(Self {
            lot_id: row.lot_id,
            location: row.location?,
            title: row.title.clone(),
            parking_types: row.parking_types.clone(),
            walk_minutes: row.walk_minutes,
            capacity_total: row.capacity_total,
            snapshot_ts: row.snapshot_ts,
        })
    }
}

/// Ranked lots together with the map layer.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationResponse {
    /// Destination building; its location is the map center.
    pub destination: Building,
    /// Ranked lots, closest first.
    pub lots: Vec<LotRecommendation>,
    /// Markers for the ranked lots that have coordinates.
    pub map_markers: Vec<MapMarker>,
}
