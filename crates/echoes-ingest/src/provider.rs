//! Taxonomy provider interface
//!
//! The reconciler only needs three read operations from the outside world.
//! [`crate::ebird::EbirdClient`] implements them over HTTP; tests substitute
//! an in-process fake.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One entry of the provider's full species catalogue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyEntry {
    /// Provider species code, e.g. "eurbla"
    pub species_code: String,
    pub common_name: String,
    /// Missing on malformed entries, which the reconciler skips
    pub scientific_name: Option<String>,
    pub localized_name: Option<String>,
}

impl TaxonomyEntry {
    pub fn new(
        species_code: impl Into<String>,
        common_name: impl Into<String>,
        scientific_name: impl Into<String>,
    ) -> Self {
        Self {
            species_code: species_code.into(),
            common_name: common_name.into(),
            scientific_name: Some(scientific_name.into()),
            localized_name: None,
        }
    }

    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    /// Scientific name if present and not blank
    pub fn scientific_name(&self) -> Option<&str> {
        self.scientific_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A time-stamped sighting near the configured coordinates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentObservation {
    pub scientific_name: Option<String>,
    /// Provider's local timestamp text (e.g. "2025-03-01 14:05"); informational only
    pub observed_at: Option<String>,
}

impl RecentObservation {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: Some(scientific_name.into()),
            observed_at: None,
        }
    }

    pub fn scientific_name(&self) -> Option<&str> {
        self.scientific_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// Read-only access to an external taxonomy and observation service
#[async_trait]
pub trait TaxonomyProvider: Send + Sync {
    /// Species codes known to occur in `region_code`
    async fn list_species_codes(&self, region_code: &str) -> Result<HashSet<String>>;

    /// The full taxonomy, with localized names in `locale` where available
    async fn get_taxonomy(&self, locale: &str) -> Result<Vec<TaxonomyEntry>>;

    /// Recent sightings around a point, at most `max_results`
    async fn list_recent_observations(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: u32,
    ) -> Result<Vec<RecentObservation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_scientific_name_is_missing() {
        let mut entry = TaxonomyEntry::new("x", "Mystery", "  ");
        assert_eq!(entry.scientific_name(), None);

        entry.scientific_name = None;
        assert_eq!(entry.scientific_name(), None);
    }

    #[test]
    fn test_scientific_name_is_trimmed() {
        let observation = RecentObservation::new(" Parus major ");
        assert_eq!(observation.scientific_name(), Some("Parus major"));
    }
}
