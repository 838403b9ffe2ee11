//! Domain types, services and ports.
//!
//! Purpose: hold the parking and admin rules independent of HTTP and
//! PostgreSQL. Inbound adapters call the driving ports in [`ports`]; outbound
//! adapters implement the driven ones.
//!
//! Public surface:
//! - Error and ErrorCode: transport-agnostic failure payload.
//! - Schema, coercion and CRUD state types for the table editor.
//! - Recommendation and catalogue services.
//! - The two-phase distance loader.

pub mod auth;
pub mod bulk_load;
pub mod coercion;
pub mod crud;
pub mod error;
pub mod parking;
pub mod ports;
pub mod recommendation;
pub mod schema;
pub mod trace_id;

pub use self::auth::{AdminContext, AdminGate, LoginCredentials, LoginValidationError};
pub use self::bulk_load::{
    BulkLoadService, DEFAULT_BATCH_SIZE, MaterializeReport, StageReport, StagingMode, StagingPlan,
    StagingUpload, StagingWrite, UnmatchedStagingRow,
};
pub use self::coercion::{
    CoercionError, InputKind, RawValue, SqlValue, TypeFamily, coerce, family_for, input_kind_for,
};
pub use self::crud::{
    ColumnValue, CrudOutcome, FormAction, FormField, KeyOptions, LoadedTable, RawRow, RowMutation,
    RowPreview, SelectedRow, SubmittedMutation, TableAdminService, UpdateSubmission,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError, TRACE_ID_HEADER};
pub use self::parking::{
    Building, GeoPoint, LotCandidate, LotRecommendation, LotSummary, MapMarker, Permit,
    PermitFilter, PermitOption, RecommendationRequest, RecommendationResponse, walk_minutes,
};
pub use self::recommendation::{CatalogueService, RecommendationService, rank_candidates};
pub use self::schema::{
    AllowedTable, ColumnExtra, ColumnMeta, KeyRole, STAGING_TABLE, SchemaInspector, TableSchema,
};
pub use self::trace_id::TraceId;
