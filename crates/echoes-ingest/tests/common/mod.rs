//! Shared fixtures for reconciler integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use echoes_ingest::provider::{RecentObservation, TaxonomyEntry, TaxonomyProvider};
use echoes_ingest::reconciler::ReconcilerConfig;
use echoes_ingest::{IngestError, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Request counters, shared between a provider and the test holding it
#[derive(Debug, Default)]
pub struct Calls {
    pub species_codes: AtomicUsize,
    pub taxonomy: AtomicUsize,
    pub recent: AtomicUsize,
}

impl Calls {
    pub fn species_codes(&self) -> usize {
        self.species_codes.load(Ordering::SeqCst)
    }

    pub fn taxonomy(&self) -> usize {
        self.taxonomy.load(Ordering::SeqCst)
    }

    pub fn recent(&self) -> usize {
        self.recent.load(Ordering::SeqCst)
    }
}

/// In-process provider serving canned data
#[derive(Debug, Clone, Default)]
pub struct FakeProvider {
    pub codes: Vec<String>,
    pub taxonomy: Vec<TaxonomyEntry>,
    pub recent: Vec<RecentObservation>,
    pub fail_species_codes: bool,
    pub fail_taxonomy: bool,
    pub fail_recent: bool,
    pub calls: Arc<Calls>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a taxonomy entry whose code is also in the region list
    pub fn with_species(mut self, code: &str, common_name: &str, scientific_name: &str) -> Self {
        self.codes.push(code.to_string());
        self.taxonomy
            .push(TaxonomyEntry::new(code, common_name, scientific_name));
        self
    }

    /// Add a taxonomy entry that does not occur in the region
    pub fn with_foreign_species(
        mut self,
        code: &str,
        common_name: &str,
        scientific_name: &str,
    ) -> Self {
        self.taxonomy
            .push(TaxonomyEntry::new(code, common_name, scientific_name));
        self
    }

    pub fn with_entry(mut self, entry: TaxonomyEntry, in_region: bool) -> Self {
        if in_region {
            self.codes.push(entry.species_code.clone());
        }
        self.taxonomy.push(entry);
        self
    }

    pub fn with_recent(mut self, scientific_name: &str) -> Self {
        self.recent.push(RecentObservation::new(scientific_name));
        self
    }

    pub fn with_recent_observation(mut self, observation: RecentObservation) -> Self {
        self.recent.push(observation);
        self
    }

    fn unavailable(endpoint: &str) -> IngestError {
        IngestError::ProviderStatus {
            endpoint: endpoint.to_string(),
            status: 503,
        }
    }
}

#[async_trait]
impl TaxonomyProvider for FakeProvider {
    async fn list_species_codes(&self, _region_code: &str) -> Result<HashSet<String>> {
        self.calls.species_codes.fetch_add(1, Ordering::SeqCst);
        if self.fail_species_codes {
            return Err(Self::unavailable("spplist"));
        }
        Ok(self.codes.iter().cloned().collect())
    }

    async fn get_taxonomy(&self, _locale: &str) -> Result<Vec<TaxonomyEntry>> {
        self.calls.taxonomy.fetch_add(1, Ordering::SeqCst);
        if self.fail_taxonomy {
            return Err(Self::unavailable("taxonomy"));
        }
        Ok(self.taxonomy.clone())
    }

    async fn list_recent_observations(
        &self,
        _latitude: f64,
        _longitude: f64,
        max_results: u32,
    ) -> Result<Vec<RecentObservation>> {
        self.calls.recent.fetch_add(1, Ordering::SeqCst);
        if self.fail_recent {
            return Err(Self::unavailable("recent"));
        }
        Ok(self
            .recent
            .iter()
            .take(max_results as usize)
            .cloned()
            .collect())
    }
}

/// Denmark as configured by default
pub fn denmark() -> ReconcilerConfig {
    ReconcilerConfig::default()
}

/// A small Danish species list with the usual junk mixed in
pub fn danish_provider() -> FakeProvider {
    FakeProvider::new()
        .with_species("eurbla", "Eurasian Blackbird", "Turdus merula")
        .with_species("gretit1", "Great Tit", "Parus major")
        .with_species("mallar3", "Mallard", "Anas platyrhynchos")
        .with_species("x00004", "Mallard x American Black Duck (hybrid)", "Anas x platyrhynchos")
        .with_species("domduc", "Domestic Duck", "Anas platyrhynchos domesticus")
        .with_species("larus", "Larus sp.", "Larus sp.")
        .with_foreign_species("amerob", "American Robin", "Turdus migratorius")
}
