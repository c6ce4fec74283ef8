//! eBird wire types
//!
//! Only the fields the ingestion uses are declared; everything else in the
//! responses is ignored.

use crate::provider::{RecentObservation, TaxonomyEntry};
use serde::Deserialize;

/// Element of `/ref/taxonomy/ebird?fmt=json`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbirdTaxon {
    /// Empty when missing; such entries never match a region's code list
    #[serde(default)]
    pub species_code: String,
    #[serde(default)]
    pub com_name: String,
    #[serde(default)]
    pub sci_name: Option<String>,
    /// Localized name, present on some locale-specific exports
    #[serde(default)]
    pub name: Option<String>,
}

impl From<EbirdTaxon> for TaxonomyEntry {
    fn from(taxon: EbirdTaxon) -> Self {
        Self {
            species_code: taxon.species_code,
            common_name: taxon.com_name,
            scientific_name: taxon.sci_name,
            localized_name: taxon.name.filter(|name| !name.trim().is_empty()),
        }
    }
}

/// Element of `/data/obs/geo/recent`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EbirdObservation {
    #[serde(default)]
    pub sci_name: Option<String>,
    #[serde(default)]
    pub obs_dt: Option<String>,
}

impl From<EbirdObservation> for RecentObservation {
    fn from(observation: EbirdObservation) -> Self {
        Self {
            scientific_name: observation.sci_name,
            observed_at: observation.obs_dt,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_taxon_deserializes_and_converts() {
        let json = r#"{
            "sciName": "Turdus merula",
            "comName": "Eurasian Blackbird",
            "speciesCode": "eurbla",
            "category": "species",
            "taxonOrder": 28711.0,
            "name": "Solsort"
        }"#;

        let taxon: EbirdTaxon = serde_json::from_str(json).unwrap();
        let entry = TaxonomyEntry::from(taxon);

        assert_eq!(entry.species_code, "eurbla");
        assert_eq!(entry.common_name, "Eurasian Blackbird");
        assert_eq!(entry.scientific_name.as_deref(), Some("Turdus merula"));
        assert_eq!(entry.localized_name.as_deref(), Some("Solsort"));
    }

    #[test]
    fn test_taxon_without_scientific_name_still_parses() {
        let json = r#"{"speciesCode": "broken", "comName": "Broken entry"}"#;
        let entry = TaxonomyEntry::from(serde_json::from_str::<EbirdTaxon>(json).unwrap());

        assert!(entry.scientific_name.is_none());
        assert!(entry.localized_name.is_none());
    }

    #[test]
    fn test_taxon_without_species_code_still_parses() {
        let json = r#"[
            {"comName": "Orphan", "sciName": "Nullus nullus"},
            {"speciesCode": "grtit1", "comName": "Great Tit", "sciName": "Parus major"}
        ]"#;
        let taxa: Vec<EbirdTaxon> = serde_json::from_str(json).unwrap();

        assert_eq!(taxa.len(), 2);
        assert_eq!(TaxonomyEntry::from(taxa[0].clone()).species_code, "");
        assert_eq!(taxa[1].species_code, "grtit1");
    }

    #[test]
    fn test_empty_localized_name_is_dropped() {
        let json = r#"{"speciesCode": "grtit1", "comName": "Great Tit", "sciName": "Parus major", "name": ""}"#;
        let entry = TaxonomyEntry::from(serde_json::from_str::<EbirdTaxon>(json).unwrap());

        assert!(entry.localized_name.is_none());
    }

    #[test]
    fn test_observation_converts() {
        let json = r#"{
            "speciesCode": "grtit1",
            "comName": "Great Tit",
            "sciName": "Parus major",
            "obsDt": "2025-03-01 08:15",
            "howMany": 2,
            "lat": 56.15,
            "lng": 10.2
        }"#;

        let observation = RecentObservation::from(serde_json::from_str::<EbirdObservation>(json).unwrap());
        assert_eq!(observation.scientific_name.as_deref(), Some("Parus major"));
        assert_eq!(observation.observed_at.as_deref(), Some("2025-03-01 08:15"));
    }
}
