//! PostgreSQL reference store
//!
//! Every statement runs on the pool and commits on its own; a failed run
//! leaves whatever was written before the failure in place.

use super::{ObservationStore, ReferenceStore, SpeciesUpsert, UpsertOutcome};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use echoes_common::types::{ObservationRecord, SpeciesKey, SpeciesRecord};
use sqlx::{FromRow, PgPool};
use tracing::debug;

#[derive(Debug, FromRow)]
struct SpeciesRow {
    id: i32,
    scientific_name: String,
    common_name: String,
    localized_name: Option<String>,
    region: String,
    is_common: bool,
    last_observed: Option<DateTime<Utc>>,
}

impl From<SpeciesRow> for SpeciesRecord {
    fn from(row: SpeciesRow) -> Self {
        Self {
            id: row.id,
            scientific_name: row.scientific_name,
            common_name: row.common_name,
            localized_name: row.localized_name,
            region: row.region,
            is_common: row.is_common,
            last_observed: row.last_observed,
        }
    }
}

/// Reference store over the `birds` and `bird_observations` tables
#[derive(Clone)]
pub struct PgStore {
    db: PgPool,
}

impl PgStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub fn pool(&self) -> &PgPool {
        &self.db
    }
}

#[async_trait]
impl ReferenceStore for PgStore {
    async fn upsert_species(&self, species: &SpeciesUpsert) -> Result<UpsertOutcome> {
        // The WHERE clause skips rows that would not change, which then return nothing.
        // xmax = 0 only on freshly inserted tuples.
        let inserted = sqlx::query_scalar::<_, bool>(
            r#"
            INSERT INTO birds (scientific_name, common_name, localized_name, region, is_common)
            VALUES ($1, $2, $3, $4, TRUE)
            ON CONFLICT (scientific_name, region) DO UPDATE SET
                common_name = EXCLUDED.common_name,
                localized_name = EXCLUDED.localized_name,
                is_common = TRUE
            WHERE birds.common_name IS DISTINCT FROM EXCLUDED.common_name
               OR birds.localized_name IS DISTINCT FROM EXCLUDED.localized_name
               OR birds.is_common IS NOT TRUE
            RETURNING (xmax = 0)
            "#,
        )
        .bind(&species.scientific_name)
        .bind(&species.common_name)
        .bind(&species.localized_name)
        .bind(&species.region)
        .fetch_optional(&self.db)
        .await?;

        let outcome = match inserted {
            Some(true) => UpsertOutcome::Inserted,
            Some(false) => UpsertOutcome::Updated,
            None => UpsertOutcome::Unchanged,
        };

        debug!(key = %species.key(), ?outcome, "Upserted species");
        Ok(outcome)
    }

    async fn mark_observed(&self, key: &SpeciesKey, at: DateTime<Utc>) -> Result<bool> {
        let result = sqlx::query(
            "UPDATE birds SET last_observed = $1 WHERE scientific_name = $2 AND region = $3",
        )
        .bind(at)
        .bind(&key.scientific_name)
        .bind(&key.region)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn list_species(&self, region: Option<&str>) -> Result<Vec<SpeciesRecord>> {
        let rows = sqlx::query_as::<_, SpeciesRow>(
            r#"
            SELECT id, scientific_name, common_name, localized_name, region, is_common, last_observed
            FROM birds
            WHERE $1::TEXT IS NULL OR region = $1
            ORDER BY scientific_name, region
            "#,
        )
        .bind(region)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(SpeciesRecord::from).collect())
    }
}

#[async_trait]
impl ObservationStore for PgStore {
    async fn insert_observations(&self, observations: &[ObservationRecord]) -> Result<u64> {
        let mut tx = self.db.begin().await?;
        let mut inserted = 0;

        for obs in observations {
            let result = sqlx::query(
                r#"
                INSERT INTO bird_observations (
                    bird_name, scientific_name, sound_url, latitude, longitude,
                    observation_date, observation_time, observer_id, quantity,
                    is_test_data, test_batch_id
                )
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
                "#,
            )
            .bind(&obs.bird_name)
            .bind(&obs.scientific_name)
            .bind(&obs.sound_url)
            .bind(obs.latitude)
            .bind(obs.longitude)
            .bind(obs.observation_date)
            .bind(obs.observation_time)
            .bind(obs.observer_id)
            .bind(obs.quantity)
            .bind(obs.is_test_data)
            .bind(&obs.test_batch_id)
            .execute(&mut *tx)
            .await?;

            inserted += result.rows_affected();
        }

        tx.commit().await?;
        Ok(inserted)
    }

    async fn mark_batch_observed(&self, test_batch_id: &str, at: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE birds
            SET last_observed = $1
            WHERE scientific_name IN (
                SELECT DISTINCT scientific_name
                FROM bird_observations
                WHERE test_batch_id = $2 AND scientific_name IS NOT NULL
            )
            "#,
        )
        .bind(at)
        .bind(test_batch_id)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected())
    }
}
