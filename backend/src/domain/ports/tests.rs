use super::*;
use crate::domain::{AllowedTable, KeyRole, STAGING_TABLE, StagingMode, StagingPlan};
use actix_rt::System;
use rstest::rstest;

#[rstest]
#[case(AllowedTable::Buildings, &["building_id"])]
#[case(AllowedTable::Lots, &["lot_id"])]
#[case(AllowedTable::LotPermit, &["lot_id", "permit_id"])]
#[case(AllowedTable::LotInventory, &["lot_id", "snapshot_ts"])]
fn fixture_schema_mirrors_migration_keys(#[case] table: AllowedTable, #[case] keys: &[&str]) {
    let columns = System::new()
        .block_on(FixtureSchemaRepository.load_columns(table.as_str()))
        .expect("fixture never fails");
    let primary: Vec<_> = columns
        .iter()
        .filter(|c| c.key_role == KeyRole::Primary)
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(primary, keys);
}

#[rstest]
#[tokio::test]
async fn fixture_schema_knows_staging_and_nothing_else() {
    let staging = FixtureSchemaRepository
        .load_columns(STAGING_TABLE)
        .await
        .expect("fixture never fails");
    assert_eq!(staging.len(), 3);

    let unknown = FixtureSchemaRepository
        .load_columns("permits")
        .await
        .expect("fixture never fails");
    assert!(unknown.is_empty());
}

#[rstest]
#[tokio::test]
async fn fixture_staging_refuses_writes() {
    let rows = vec![vec![None, None, None]; 3];
    let staged = FixtureStagingRepository
        .replace_rows(&[], &rows, StagingPlan::new(2, StagingMode::PerBatch))
        .await;
    assert_eq!(
        staged,
        Err(StagingRepositoryError::connection(NO_STORE_MESSAGE))
    );
    let materialized = FixtureStagingRepository.materialize(100).await;
    assert_eq!(
        materialized,
        Err(StagingRepositoryError::connection(NO_STORE_MESSAGE))
    );
}

#[rstest]
#[tokio::test]
async fn fixture_catalogue_has_one_building() {
    let buildings = FixtureCatalogueRepository
        .list_buildings()
        .await
        .expect("fixture never fails");
    assert_eq!(buildings.len(), 1);
    assert!(
        FixtureRecommendationRepository
            .rank_lots(
                &crate::domain::RecommendationRequest::try_new(
                    1,
                    crate::domain::PermitFilter::Any,
                    10,
                    10
                )
                .expect("valid request")
            )
            .await
            .expect("fixture never fails")
            .is_empty()
    );
}
