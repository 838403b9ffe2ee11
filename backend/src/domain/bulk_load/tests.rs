//! Tests for upload parsing and the distance loader service.

use super::*;
use crate::domain::ErrorCode;
use crate::domain::ports::{
    FixtureSchemaRepository, FixtureStagingRepository, MockSchemaRepository,
    MockStagingRepository, NO_STORE_MESSAGE,
};
use rstest::{fixture, rstest};

const HEADER: &str = "lot_title_raw,building_name_raw,distance_sec_raw";

fn staging_columns() -> Vec<String> {
    HEADER.split(',').map(str::to_owned).collect()
}

#[fixture]
fn admin() -> AdminContext {
    AdminContext::restore("ops").expect("non-empty operator")
}

fn service(staging: MockStagingRepository, plan: StagingPlan) -> BulkLoadService<FixtureSchemaRepository, MockStagingRepository> {
    BulkLoadService::new(Arc::new(FixtureSchemaRepository), Arc::new(staging), plan)
}

#[rstest]
fn parses_rows_and_maps_empty_cells_to_null() {
    let csv = format!("{HEADER}\nLot A,Library,300\n Lot B ,,\n");
    let upload = StagingUpload::parse(csv.as_bytes(), &staging_columns()).expect("valid upload");

    assert_eq!(
        upload.rows(),
        &[
            vec![Some("Lot A".to_owned()), Some("Library".to_owned()), Some("300".to_owned())],
            vec![Some(" Lot B ".to_owned()), None, None],
        ]
    );
    assert_eq!(upload.sha256().len(), 64);
}

#[rstest]
#[case("building_name_raw,lot_title_raw,distance_sec_raw\n")]
#[case("lot_title_raw,building_name_raw\n")]
#[case("")]
fn header_mismatch_reports_expected_and_actual(#[case] csv: &str) {
    let err = StagingUpload::parse(csv.as_bytes(), &staging_columns()).expect_err("bad header");

    assert_eq!(err.code(), ErrorCode::InvalidInput);
    let details = err.details().expect("details attached");
    assert_eq!(details["expected"][0], "lot_title_raw");
    assert!(details["actual"].is_array());
}

#[rstest]
fn ragged_rows_are_rejected_with_their_line() {
    let csv = format!("{HEADER}\nLot A,Library,300\nLot B,Library\n");
    let err = StagingUpload::parse(csv.as_bytes(), &staging_columns()).expect_err("ragged");

    assert_eq!(err.code(), ErrorCode::InvalidInput);
    assert_eq!(err.details().map(|d| d["line"].clone()), Some(serde_json::json!(3)));
}

#[rstest]
fn spreadsheet_byte_order_mark_is_ignored() {
    let plain = format!("{HEADER}\nLot A,Library,300\n");
    let marked = format!("\u{feff}{plain}");

    let with_bom = StagingUpload::parse(marked.as_bytes(), &staging_columns()).expect("valid");
    let without = StagingUpload::parse(plain.as_bytes(), &staging_columns()).expect("valid");

    assert_eq!(with_bom.rows(), without.rows());
    assert_ne!(with_bom.sha256(), without.sha256());
}

#[rstest]
fn digest_is_deterministic() {
    let csv = format!("{HEADER}\nLot A,Library,300\n");
    let first = StagingUpload::parse(csv.as_bytes(), &staging_columns()).expect("valid");
    let second = StagingUpload::parse(csv.as_bytes(), &staging_columns()).expect("valid");
    assert_eq!(first.sha256(), second.sha256());
}

#[rstest]
#[case(0, 5000, 0)]
#[case(1, 5000, 1)]
#[case(5000, 5000, 1)]
#[case(5001, 5000, 2)]
#[case(7, 0, 7)]
fn batch_count_rounds_up(#[case] rows: usize, #[case] size: usize, #[case] expected: u64) {
    assert_eq!(StagingPlan::new(size, StagingMode::PerBatch).batch_count(rows), expected);
}

#[rstest]
#[tokio::test]
async fn stage_hands_rows_to_the_store(admin: AdminContext) {
    let mut staging = MockStagingRepository::new();
    staging
        .expect_replace_rows()
        .withf(|columns, rows, plan| {
            columns.len() == 3 && rows.len() == 2 && plan.mode == StagingMode::Atomic
        })
        .times(1)
        .return_once(|_, _, _| Ok(StagingWrite { rows: 2, batches: 1 }));

    let plan = StagingPlan::new(5000, StagingMode::Atomic);
    let csv = format!("{HEADER}\nLot A,Library,300\nLot B,Library,420\n");
    let report = service(staging, plan)
        .stage(&admin, csv.as_bytes())
        .await
        .expect("staging succeeds");

    assert_eq!(report.rows, 2);
    assert_eq!(report.batches, 1);
    assert_eq!(report.mode, StagingMode::Atomic);
}

#[rstest]
#[tokio::test]
async fn invalid_upload_never_touches_the_store(admin: AdminContext) {
    let mut staging = MockStagingRepository::new();
    staging.expect_replace_rows().never();

    let err = service(staging, StagingPlan::default())
        .stage(&admin, b"wrong,header\n")
        .await
        .expect_err("header mismatch");
    assert_eq!(err.code(), ErrorCode::InvalidInput);
}

#[rstest]
#[tokio::test]
async fn partial_batch_failure_reports_committed_rows(admin: AdminContext) {
    let mut staging = MockStagingRepository::new();
    staging
        .expect_replace_rows()
        .return_once(|_, _, _| Err(StagingRepositoryError::batch_failed("timeout", 5000_u64)));

    let csv = format!("{HEADER}\nLot A,Library,300\n");
    let err = service(staging, StagingPlan::default())
        .stage(&admin, csv.as_bytes())
        .await
        .expect_err("batch fails");

    assert_eq!(err.code(), ErrorCode::StoreFailure);
    assert_eq!(
        err.details().map(|d| d["committedRows"].clone()),
        Some(serde_json::json!(5000))
    );
}

#[rstest]
#[tokio::test]
async fn stage_fails_when_staging_table_is_missing(admin: AdminContext) {
    let mut schema = MockSchemaRepository::new();
    schema.expect_load_columns().return_once(|_| Ok(Vec::new()));
    let mut staging = MockStagingRepository::new();
    staging.expect_replace_rows().never();

    let loader = BulkLoadService::new(Arc::new(schema), Arc::new(staging), StagingPlan::default());
    let err = loader
        .stage(&admin, HEADER.as_bytes())
        .await
        .expect_err("no staging table");
    assert_eq!(err.code(), ErrorCode::SchemaUnavailable);
}

#[rstest]
#[tokio::test]
async fn materialize_returns_the_store_report(admin: AdminContext) {
    let mut staging = MockStagingRepository::new();
    staging
        .expect_materialize()
        .withf(|limit| *limit == UNMATCHED_SAMPLE_LIMIT)
        .return_once(|_| {
            Ok(MaterializeReport {
                upserted_rows: 4,
                unmatched_rows: 1,
                unmatched_sample: vec![UnmatchedStagingRow {
                    lot_title_raw: Some("Lot Z".to_owned()),
                    building_name_raw: Some("Library".to_owned()),
                    distance_sec_raw: Some("60".to_owned()),
                    lot_matched: false,
                    building_matched: true,
                }],
            })
        });

    let report = service(staging, StagingPlan::default())
        .materialize(&admin)
        .await
        .expect("materialize succeeds");

    assert_eq!(report.upserted_rows, 4);
    assert_eq!(report.unmatched_sample.len(), 1);
}

#[rstest]
#[tokio::test]
async fn materialize_failures_are_store_failures(admin: AdminContext) {
    let mut staging = MockStagingRepository::new();
    staging
        .expect_materialize()
        .return_once(|_| Err(StagingRepositoryError::query("invalid input syntax for type numeric")));

    let err = service(staging, StagingPlan::default())
        .materialize(&admin)
        .await
        .expect_err("non-numeric distance");
    assert_eq!(err.code(), ErrorCode::StoreFailure);
}

#[rstest]
#[tokio::test]
async fn loads_without_a_store_are_reported_as_failures(admin: AdminContext) {
    let loader = BulkLoadService::new(
        Arc::new(FixtureSchemaRepository),
        Arc::new(FixtureStagingRepository),
        StagingPlan::default(),
    );
    let csv = format!("{HEADER}\nLot A,Library,300\n");

    let staged = loader
        .stage(&admin, csv.as_bytes())
        .await
        .expect_err("nothing can be staged");
    let materialized = loader
        .materialize(&admin)
        .await
        .expect_err("nothing can be materialized");

    for err in [staged, materialized] {
        assert_eq!(err.code(), ErrorCode::StoreFailure);
        assert!(err.message().contains(NO_STORE_MESSAGE));
    }
}
