//! PostgreSQL store tests
//!
//! These need a running PostgreSQL and `DATABASE_URL` pointing at a user that
//! may create databases; each test gets a fresh migrated database.
//!
//! Run with: `cargo test -p echoes-ingest --test postgres_store_tests -- --ignored`

use chrono::{NaiveDate, NaiveTime, Utc};
use echoes_common::types::{ObservationRecord, SpeciesKey};
use echoes_ingest::store::{ObservationStore, PgStore, ReferenceStore, SpeciesUpsert, UpsertOutcome};
use sqlx::PgPool;

fn upsert(scientific_name: &str, common_name: &str, region: &str) -> SpeciesUpsert {
    SpeciesUpsert {
        scientific_name: scientific_name.to_string(),
        common_name: common_name.to_string(),
        localized_name: None,
        region: region.to_string(),
    }
}

fn observation(scientific_name: &str, batch: &str) -> ObservationRecord {
    ObservationRecord {
        bird_name: scientific_name.to_string(),
        scientific_name: Some(scientific_name.to_string()),
        sound_url: None,
        latitude: 56.15,
        longitude: 10.21,
        observation_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        observation_time: NaiveTime::from_hms_opt(7, 30, 0).unwrap(),
        observer_id: Some(3),
        quantity: 2,
        is_test_data: true,
        test_batch_id: Some(batch.to_string()),
    }
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_outcomes(pool: PgPool) {
    let store = PgStore::new(pool);
    let blackbird = upsert("Turdus merula", "Blackbird", "Denmark");

    assert_eq!(store.upsert_species(&blackbird).await.unwrap(), UpsertOutcome::Inserted);
    assert_eq!(store.upsert_species(&blackbird).await.unwrap(), UpsertOutcome::Unchanged);

    let renamed = upsert("Turdus merula", "Common Blackbird", "Denmark");
    assert_eq!(store.upsert_species(&renamed).await.unwrap(), UpsertOutcome::Updated);

    let species = store.list_species(Some("Denmark")).await.unwrap();
    assert_eq!(species.len(), 1);
    assert_eq!(species[0].common_name, "Common Blackbird");
    assert!(species[0].is_common);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_upsert_keeps_last_observed(pool: PgPool) {
    let store = PgStore::new(pool);
    let key = SpeciesKey::new("Parus major", "Denmark");

    store.upsert_species(&upsert("Parus major", "Great Tit", "Denmark")).await.unwrap();
    assert!(store.mark_observed(&key, Utc::now()).await.unwrap());

    store
        .upsert_species(&upsert("Parus major", "Great Tit (renamed)", "Denmark"))
        .await
        .unwrap();

    let species = store.list_species(Some("Denmark")).await.unwrap();
    assert!(species[0].last_observed.is_some());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_mark_observed_unknown_species(pool: PgPool) {
    let store = PgStore::new(pool);

    let matched = store
        .mark_observed(&SpeciesKey::new("Emberiza citrinella", "Denmark"), Utc::now())
        .await
        .unwrap();

    assert!(!matched);
    assert!(store.list_species(None).await.unwrap().is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_regions_are_separate_rows(pool: PgPool) {
    let store = PgStore::new(pool);
    store.upsert_species(&upsert("Turdus merula", "Blackbird", "Denmark")).await.unwrap();
    store.upsert_species(&upsert("Turdus merula", "Blackbird", "Sweden")).await.unwrap();

    assert_eq!(store.list_species(None).await.unwrap().len(), 2);
    assert_eq!(store.list_species(Some("Sweden")).await.unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../migrations")]
#[ignore = "requires DATABASE_URL"]
async fn test_observation_batch(pool: PgPool) {
    let store = PgStore::new(pool);
    store.upsert_species(&upsert("Turdus merula", "Blackbird", "Denmark")).await.unwrap();
    store.upsert_species(&upsert("Parus major", "Great Tit", "Denmark")).await.unwrap();

    let batch = "TEST_BATCH_20250301_073000";
    let inserted = store
        .insert_observations(&[observation("Turdus merula", batch), observation("Turdus merula", batch)])
        .await
        .unwrap();
    assert_eq!(inserted, 2);

    let marked = store.mark_batch_observed(batch, Utc::now()).await.unwrap();
    assert_eq!(marked, 1);

    let species = store.list_species(Some("Denmark")).await.unwrap();
    let tit = species.iter().find(|s| s.scientific_name == "Parus major").unwrap();
    assert!(tit.last_observed.is_none());
}
