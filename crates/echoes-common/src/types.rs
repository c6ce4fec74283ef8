//! Domain types shared across the Urban Echoes crates
//!
//! These mirror the rows of the two tables the mobile app reads:
//! `birds` (species reference) and `bird_observations`.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Species Reference
// ============================================================================

/// Unique key of a species reference row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SpeciesKey {
    pub scientific_name: String,
    pub region: String,
}

impl SpeciesKey {
    pub fn new(scientific_name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
            region: region.into(),
        }
    }
}

impl std::fmt::Display for SpeciesKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.scientific_name, self.region)
    }
}

/// A row of the `birds` reference table.
///
/// `(scientific_name, region)` is unique. Rows are created and refreshed by
/// the taxonomy reconciler and are never deleted by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeciesRecord {
    /// Surrogate key assigned by the database (0 when not persisted there)
    pub id: i32,
    pub scientific_name: String,
    /// English common name, e.g. "Eurasian Blackbird"
    pub common_name: String,
    /// Name in the region's locale, e.g. "Solsort"
    pub localized_name: Option<String>,
    /// Human-readable region, e.g. "Denmark"
    pub region: String,
    pub is_common: bool,
    pub last_observed: Option<DateTime<Utc>>,
}

impl SpeciesRecord {
    /// A record as first written by the reconciler: common, never observed.
    pub fn new(
        scientific_name: impl Into<String>,
        common_name: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            scientific_name: scientific_name.into(),
            common_name: common_name.into(),
            localized_name: None,
            region: region.into(),
            is_common: true,
            last_observed: None,
        }
    }

    pub fn with_localized_name(mut self, name: impl Into<String>) -> Self {
        self.localized_name = Some(name.into());
        self
    }

    pub fn key(&self) -> SpeciesKey {
        SpeciesKey::new(&self.scientific_name, &self.region)
    }

    /// Name shown to users: the localized name when there is one, else the common name.
    pub fn display_name(&self) -> &str {
        match self.localized_name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => &self.common_name,
        }
    }
}

// ============================================================================
// Observations
// ============================================================================

/// A row of the `bird_observations` table.
///
/// `scientific_name` is the join key back to [`SpeciesRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationRecord {
    pub bird_name: String,
    pub scientific_name: Option<String>,
    /// Location of the recording in blob storage, if one was attached
    pub sound_url: Option<String>,
    pub latitude: f64,
    pub longitude: f64,
    pub observation_date: NaiveDate,
    pub observation_time: NaiveTime,
    pub observer_id: Option<i32>,
    pub quantity: i32,
    pub is_test_data: bool,
    pub test_batch_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_is_common_and_unobserved() {
        let record = SpeciesRecord::new("Parus major", "Great Tit", "Denmark");
        assert!(record.is_common);
        assert!(record.last_observed.is_none());
        assert_eq!(record.key(), SpeciesKey::new("Parus major", "Denmark"));
    }

    #[test]
    fn test_display_name_prefers_localized() {
        let record =
            SpeciesRecord::new("Turdus merula", "Eurasian Blackbird", "Denmark").with_localized_name("Solsort");
        assert_eq!(record.display_name(), "Solsort");
    }

    #[test]
    fn test_display_name_falls_back_on_blank_localized() {
        let record = SpeciesRecord::new("Turdus merula", "Eurasian Blackbird", "Denmark").with_localized_name("  ");
        assert_eq!(record.display_name(), "Eurasian Blackbird");
    }

    #[test]
    fn test_species_key_ordering_groups_by_name() {
        let a = SpeciesKey::new("Anas crecca", "Denmark");
        let b = SpeciesKey::new("Anas platyrhynchos", "Denmark");
        assert!(a < b);
        assert_eq!(a.to_string(), "Anas crecca (Denmark)");
    }
}
