//! Reference store interface
//!
//! The reconciler writes through [`ReferenceStore`]; the sample generator
//! through [`ObservationStore`]. [`MemoryStore`] backs tests and dry runs,
//! [`PgStore`] the production database.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use echoes_common::types::{ObservationRecord, SpeciesKey, SpeciesRecord};
use serde::{Deserialize, Serialize};

/// Identity and display fields written by an upsert
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeciesUpsert {
    pub scientific_name: String,
    pub common_name: String,
    pub localized_name: Option<String>,
    pub region: String,
}

impl SpeciesUpsert {
    pub fn key(&self) -> SpeciesKey {
        SpeciesKey::new(&self.scientific_name, &self.region)
    }

    /// True when applying this upsert to `record` would change nothing
    pub fn matches(&self, record: &SpeciesRecord) -> bool {
        record.common_name == self.common_name
            && record.localized_name == self.localized_name
            && record.is_common
    }
}

/// What an upsert did to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UpsertOutcome {
    Inserted,
    Updated,
    /// The row existed with identical fields; nothing was written
    Unchanged,
}

/// Species reference table keyed by `(scientific_name, region)`
#[async_trait]
pub trait ReferenceStore: Send + Sync {
    /// Insert as common and never observed, or refresh names and force `is_common`.
    /// `last_observed` is never touched.
    async fn upsert_species(&self, species: &SpeciesUpsert) -> Result<UpsertOutcome>;

    /// Set `last_observed` on an existing row. Returns false if no row matched; never inserts.
    async fn mark_observed(&self, key: &SpeciesKey, at: DateTime<Utc>) -> Result<bool>;

    /// Species of one region (or all regions), ordered by scientific name then region
    async fn list_species(&self, region: Option<&str>) -> Result<Vec<SpeciesRecord>>;
}

/// Downstream `bird_observations` table
#[async_trait]
pub trait ObservationStore: Send + Sync {
    /// Append observations, returning how many were written
    async fn insert_observations(&self, observations: &[ObservationRecord]) -> Result<u64>;

    /// Set `last_observed` on every species row whose scientific name appears in the batch
    async fn mark_batch_observed(&self, test_batch_id: &str, at: DateTime<Utc>) -> Result<u64>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upsert() -> SpeciesUpsert {
        SpeciesUpsert {
            scientific_name: "Turdus merula".to_string(),
            common_name: "Eurasian Blackbird".to_string(),
            localized_name: Some("Solsort".to_string()),
            region: "Denmark".to_string(),
        }
    }

    #[test]
    fn test_matches_identical_record() {
        let record = SpeciesRecord::new("Turdus merula", "Eurasian Blackbird", "Denmark")
            .with_localized_name("Solsort");
        assert!(upsert().matches(&record));
    }

    #[test]
    fn test_matches_detects_changes() {
        let mut record = SpeciesRecord::new("Turdus merula", "Blackbird", "Denmark")
            .with_localized_name("Solsort");
        assert!(!upsert().matches(&record));

        record.common_name = "Eurasian Blackbird".to_string();
        record.is_common = false;
        assert!(!upsert().matches(&record));
    }
}
