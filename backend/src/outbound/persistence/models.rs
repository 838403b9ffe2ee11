//! Internal Diesel row structs for database reads.
//!
//! These types never leave the persistence layer.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Bool, Double, Integer, Nullable, Text, Timestamp};

use crate::domain::{
    Building, ColumnExtra, ColumnMeta, GeoPoint, KeyRole, LotCandidate, LotSummary, Permit,
    UnmatchedStagingRow,
};

use super::schema::{buildings, lots, permits};

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = buildings)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct BuildingRow {
    pub building_id: i32,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<BuildingRow> for Building {
    fn from(row: BuildingRow) -> Self {
        Self {
            id: row.building_id,
            name: row.name,
            location: GeoPoint {
                latitude: row.latitude,
                longitude: row.longitude,
            },
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = permits)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct PermitRow {
    pub permit_id: i32,
    pub name: String,
}

impl From<PermitRow> for Permit {
    fn from(row: PermitRow) -> Self {
        Self {
            id: row.permit_id,
            name: row.name,
        }
    }
}

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = lots)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct LotRow {
    pub lot_id: i32,
    pub title: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl From<LotRow> for LotSummary {
    fn from(row: LotRow) -> Self {
        Self {
            id: row.lot_id,
            title: row.title,
            location: GeoPoint::from_parts(row.latitude, row.longitude),
        }
    }
}

/// One ranked lot from the recommendation query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct CandidateRow {
    #[diesel(sql_type = Integer)]
    pub lot_id: i32,
    #[diesel(sql_type = Text)]
    pub title: String,
    #[diesel(sql_type = Nullable<Double>)]
    pub latitude: Option<f64>,
    #[diesel(sql_type = Nullable<Double>)]
    pub longitude: Option<f64>,
    #[diesel(sql_type = Integer)]
    pub distance_seconds: i32,
    #[diesel(sql_type = Integer)]
    pub capacity_total: i32,
    #[diesel(sql_type = Timestamp)]
    pub snapshot_ts: NaiveDateTime,
    #[diesel(sql_type = Text)]
    pub parking_types: String,
}

impl From<CandidateRow> for LotCandidate {
    fn from(row: CandidateRow) -> Self {
        Self {
            lot_id: row.lot_id,
            title: row.title,
            location: GeoPoint::from_parts(row.latitude, row.longitude),
            distance_seconds: row.distance_seconds,
            capacity_total: row.capacity_total,
            snapshot_ts: row.snapshot_ts,
            parking_types: row.parking_types,
        }
    }
}

/// Column metadata as reported by `information_schema`.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct ColumnRow {
    #[diesel(sql_type = Text)]
    pub column_name: String,
    #[diesel(sql_type = Text)]
    pub data_type: String,
    #[diesel(sql_type = Bool)]
    pub is_nullable: bool,
    #[diesel(sql_type = Text)]
    pub key_role: String,
    #[diesel(sql_type = Text)]
    pub extra: String,
}

impl From<ColumnRow> for ColumnMeta {
    fn from(row: ColumnRow) -> Self {
        Self {
            name: row.column_name,
            data_type: row.data_type,
            is_nullable: row.is_nullable,
            key_role: KeyRole::from_code(&row.key_role),
            extra: ColumnExtra::from_flag(&row.extra),
        }
    }
}

/// A row rendered to JSON text by PostgreSQL.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct JsonTextRow {
    #[diesel(sql_type = Text)]
    pub json: String,
}

/// A staging row that did not reach the distance table.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct UnmatchedRow {
    #[diesel(sql_type = Nullable<Text>)]
    pub lot_title_raw: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub building_name_raw: Option<String>,
    #[diesel(sql_type = Nullable<Text>)]
    pub distance_sec_raw: Option<String>,
    #[diesel(sql_type = Bool)]
    pub lot_matched: bool,
    #[diesel(sql_type = Bool)]
    pub building_matched: bool,
    #[diesel(sql_type = BigInt)]
    pub unmatched_total: i64,
}

impl From<UnmatchedRow> for UnmatchedStagingRow {
    fn from(row: UnmatchedRow) -> Self {
        Self {
            lot_title_raw: row.lot_title_raw,
            building_name_raw: row.building_name_raw,
            distance_sec_raw: row.distance_sec_raw,
            lot_matched: row.lot_matched,
            building_matched: row.building_matched,
        }
    }
}
