//! In-memory reference store

use super::{ObservationStore, ReferenceStore, SpeciesUpsert, UpsertOutcome};
use crate::error::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use echoes_common::types::{ObservationRecord, SpeciesKey, SpeciesRecord};
use std::collections::{BTreeMap, HashSet};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Tables {
    species: BTreeMap<SpeciesKey, SpeciesRecord>,
    observations: Vec<ObservationRecord>,
    next_id: i32,
}

/// Store holding both tables in process memory
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing rows (ids are reassigned)
    pub async fn with_species(records: impl IntoIterator<Item = SpeciesRecord>) -> Self {
        let store = Self::new();
        {
            let mut tables = store.tables.write().await;
            for mut record in records {
                tables.next_id += 1;
                record.id = tables.next_id;
                tables.species.insert(record.key(), record);
            }
        }
        store
    }

    pub async fn get(&self, key: &SpeciesKey) -> Option<SpeciesRecord> {
        self.tables.read().await.species.get(key).cloned()
    }

    pub async fn species_count(&self) -> usize {
        self.tables.read().await.species.len()
    }

    pub async fn observations(&self) -> Vec<ObservationRecord> {
        self.tables.read().await.observations.clone()
    }
}

#[async_trait]
impl ReferenceStore for MemoryStore {
    async fn upsert_species(&self, species: &SpeciesUpsert) -> Result<UpsertOutcome> {
        let mut tables = self.tables.write().await;

        if let Some(existing) = tables.species.get_mut(&species.key()) {
            if species.matches(existing) {
                return Ok(UpsertOutcome::Unchanged);
            }
            existing.common_name = species.common_name.clone();
            existing.localized_name = species.localized_name.clone();
            existing.is_common = true;
            return Ok(UpsertOutcome::Updated);
        }

        tables.next_id += 1;
        let record = SpeciesRecord {
            id: tables.next_id,
            scientific_name: species.scientific_name.clone(),
            common_name: species.common_name.clone(),
            localized_name: species.localized_name.clone(),
            region: species.region.clone(),
            is_common: true,
            last_observed: None,
        };
        tables.species.insert(species.key(), record);

        Ok(UpsertOutcome::Inserted)
    }

    async fn mark_observed(&self, key: &SpeciesKey, at: DateTime<Utc>) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.species.get_mut(key) {
            Some(record) => {
                record.last_observed = Some(at);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_species(&self, region: Option<&str>) -> Result<Vec<SpeciesRecord>> {
        let tables = self.tables.read().await;
        Ok(tables
            .species
            .values()
            .filter(|record| region.is_none_or(|r| record.region == r))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ObservationStore for MemoryStore {
    async fn insert_observations(&self, observations: &[ObservationRecord]) -> Result<u64> {
        let mut tables = self.tables.write().await;
        tables.observations.extend_from_slice(observations);
        Ok(observations.len() as u64)
    }

    async fn mark_batch_observed(&self, test_batch_id: &str, at: DateTime<Utc>) -> Result<u64> {
        let mut tables = self.tables.write().await;

        let names: HashSet<String> = tables
            .observations
            .iter()
            .filter(|obs| obs.test_batch_id.as_deref() == Some(test_batch_id))
            .filter_map(|obs| obs.scientific_name.clone())
            .collect();

        let mut updated = 0;
        for record in tables.species.values_mut() {
            if names.contains(&record.scientific_name) {
                record.last_observed = Some(at);
                updated += 1;
            }
        }

        Ok(updated)
    }
}
