//! Synthetic observation batches
//!
//! Seeds `bird_observations` with plausible test sightings drawn from the
//! reference table, so the app has data to show before real users report any.
//! Every generated row is flagged `is_test_data` and tagged with a batch id
//! that can be used to find or remove the batch later.

use crate::error::{IngestError, Result};
use crate::store::ObservationStore;
use chrono::{DateTime, NaiveDate, NaiveTime, TimeDelta, Utc};
use echoes_common::types::{ObservationRecord, SpeciesRecord};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::info;

/// Aarhus city centre.
pub const AARHUS_CENTER: (f64, f64) = (56.1517, 10.2107);

/// Default number of observations per batch.
pub const DEFAULT_SAMPLE_COUNT: usize = 100;

/// Maximum offset from the centre in degrees, per axis.
pub const DEFAULT_SPREAD_DEGREES: f64 = 0.1;

/// Observations are dated within this many days before today.
pub const DEFAULT_HISTORY_DAYS: i64 = 30;

/// Daylight hours during which synthetic sightings happen (inclusive).
const FIRST_HOUR: u32 = 5;
const LAST_HOUR: u32 = 20;

/// Random generator for test observations
pub struct SampleGenerator {
    rng: StdRng,
    center: (f64, f64),
    spread_degrees: f64,
    history_days: i64,
}

impl Default for SampleGenerator {
    fn default() -> Self {
        Self::from_rng(StdRng::from_entropy())
    }
}

impl SampleGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reproducible generator
    pub fn seeded(seed: u64) -> Self {
        Self::from_rng(StdRng::seed_from_u64(seed))
    }

    fn from_rng(rng: StdRng) -> Self {
        Self {
            rng,
            center: AARHUS_CENTER,
            spread_degrees: DEFAULT_SPREAD_DEGREES,
            history_days: DEFAULT_HISTORY_DAYS,
        }
    }

    pub fn with_center(mut self, latitude: f64, longitude: f64) -> Self {
        self.center = (latitude, longitude);
        self
    }

    /// Batch id for a batch created at `now`, e.g. `TEST_BATCH_20250301_141500`
    pub fn batch_id(now: DateTime<Utc>) -> String {
        format!("TEST_BATCH_{}", now.format("%Y%m%d_%H%M%S"))
    }

    /// Build `count` observations of randomly chosen species, dated relative to `today`
    pub fn generate(
        &mut self,
        species: &[SpeciesRecord],
        count: usize,
        batch_id: &str,
        today: NaiveDate,
    ) -> Result<Vec<ObservationRecord>> {
        let eligible: Vec<&SpeciesRecord> = species
            .iter()
            .filter(|record| !record.scientific_name.trim().is_empty())
            .collect();

        if eligible.is_empty() {
            return Err(IngestError::no_species(None));
        }

        let mut observations = Vec::with_capacity(count);
        for _ in 0..count {
            let Some(record) = eligible.choose(&mut self.rng).copied() else {
                break;
            };
            observations.push(self.observation_of(record, batch_id, today));
        }

        Ok(observations)
    }

    fn observation_of(
        &mut self,
        record: &SpeciesRecord,
        batch_id: &str,
        today: NaiveDate,
    ) -> ObservationRecord {
        let (lat, lon) = self.center;
        let spread = self.spread_degrees;
        let days_ago = self.rng.gen_range(0..=self.history_days);
        let hour = self.rng.gen_range(FIRST_HOUR..=LAST_HOUR);
        let minute = self.rng.gen_range(0..60);

        ObservationRecord {
            bird_name: record.display_name().to_string(),
            scientific_name: Some(record.scientific_name.clone()),
            sound_url: None,
            latitude: lat + self.rng.gen_range(-spread..=spread),
            longitude: lon + self.rng.gen_range(-spread..=spread),
            observation_date: today - TimeDelta::days(days_ago),
            observation_time: NaiveTime::from_hms_opt(hour, minute, 0).unwrap_or(NaiveTime::MIN),
            observer_id: Some(self.rng.gen_range(1..=10)),
            quantity: self.rng.gen_range(1..=10),
            is_test_data: true,
            test_batch_id: Some(batch_id.to_string()),
        }
    }
}

/// Result of seeding one batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SampleBatch {
    pub batch_id: String,
    pub inserted: u64,
    /// Reference rows whose `last_observed` was refreshed from the batch
    pub species_marked: u64,
}

/// Generate a batch, store it, and mark its species as recently observed
pub async fn seed_observations<S>(
    store: &S,
    generator: &mut SampleGenerator,
    species: &[SpeciesRecord],
    count: usize,
) -> Result<SampleBatch>
where
    S: ObservationStore,
{
    let now = Utc::now();
    let batch_id = SampleGenerator::batch_id(now);
    let observations = generator.generate(species, count, &batch_id, now.date_naive())?;

    info!(batch_id = %batch_id, count = observations.len(), "Inserting sample observations");
    let inserted = store.insert_observations(&observations).await?;
    let species_marked = store.mark_batch_observed(&batch_id, now).await?;

    info!(
        batch_id = %batch_id,
        inserted,
        species_marked,
        "Sample observations populated"
    );

    Ok(SampleBatch {
        batch_id,
        inserted,
        species_marked,
    })
}
