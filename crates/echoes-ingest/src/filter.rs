//! Species filtering policy
//!
//! Hybrids, unresolved identifications ("Larus sp.") and domestic, escaped or
//! feral forms are not species a listener can look up, so they never enter the
//! reference table.

use serde::{Deserialize, Serialize};

/// Qualifiers in a common name that mark a non-wild form.
pub const DEFAULT_DENYLIST: &[&str] = &["domestic", "escaped", "feral"];

/// Cross notation between two species in a scientific name.
const HYBRID_SCIENTIFIC_MARKER: &str = " x ";
const HYBRID_COMMON_MARKER: &str = "hybrid";

/// Abbreviation suffix for an undetermined species.
const UNDETERMINED_SCIENTIFIC_MARKER: &str = " sp.";
const UNDETERMINED_COMMON_MARKER: &str = "sp.";

/// Why an entry was kept out of the reference table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    Hybrid,
    Undetermined,
    Denylisted,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rejection::Hybrid => write!(f, "hybrid"),
            Rejection::Undetermined => write!(f, "undetermined"),
            Rejection::Denylisted => write!(f, "denylisted"),
        }
    }
}

/// Accept/reject policy applied to every taxonomy entry before upsert
#[derive(Debug, Clone)]
pub struct SpeciesFilter {
    denylist: Vec<String>,
}

impl Default for SpeciesFilter {
    fn default() -> Self {
        Self::with_denylist(DEFAULT_DENYLIST.iter().copied())
    }
}

impl SpeciesFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom set of common-name qualifiers (matched case-insensitively)
    pub fn with_denylist<I, S>(terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            denylist: terms
                .into_iter()
                .map(|term| term.as_ref().trim().to_lowercase())
                .filter(|term| !term.is_empty())
                .collect(),
        }
    }

    pub fn denylist(&self) -> &[String] {
        &self.denylist
    }

    /// `Ok(())` when the entry may be upserted, otherwise the first rule it breaks
    pub fn check(&self, scientific_name: &str, common_name: &str) -> Result<(), Rejection> {
        let scientific_lower = scientific_name.to_lowercase();
        let common_lower = common_name.to_lowercase();

        if scientific_lower.contains(HYBRID_SCIENTIFIC_MARKER)
            || common_lower.contains(HYBRID_COMMON_MARKER)
        {
            return Err(Rejection::Hybrid);
        }

        if scientific_name.contains(UNDETERMINED_SCIENTIFIC_MARKER)
            || common_name.contains(UNDETERMINED_COMMON_MARKER)
        {
            return Err(Rejection::Undetermined);
        }

        if self
            .denylist
            .iter()
            .any(|term| common_lower.contains(term.as_str()))
        {
            return Err(Rejection::Denylisted);
        }

        Ok(())
    }

    pub fn accepts(&self, scientific_name: &str, common_name: &str) -> bool {
        self.check(scientific_name, common_name).is_ok()
    }
}

/// Scientific-name-only check used for recent sightings, which carry no trusted common name
pub fn is_valid_observation_name(scientific_name: &str) -> bool {
    !scientific_name.to_lowercase().contains(HYBRID_SCIENTIFIC_MARKER)
        && !scientific_name.contains(UNDETERMINED_SCIENTIFIC_MARKER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accepts_plain_species() {
        let filter = SpeciesFilter::new();
        assert!(filter.accepts("Turdus merula", "Eurasian Blackbird"));
        assert!(filter.accepts("Parus major", "Great Tit"));
    }

    #[test]
    fn test_rejects_hybrid_scientific_name() {
        let filter = SpeciesFilter::new();
        assert_eq!(
            filter.check("Anas x platyrhynchos", "Mallard x Teal"),
            Err(Rejection::Hybrid)
        );
        assert_eq!(
            filter.check("Anas platyrhynchos X Anas acuta", "Mallard x Northern Pintail"),
            Err(Rejection::Hybrid)
        );
    }

    #[test]
    fn test_rejects_hybrid_common_name() {
        let filter = SpeciesFilter::new();
        assert_eq!(
            filter.check("Aythya fuligula/marila", "Tufted Duck/Scaup Hybrid"),
            Err(Rejection::Hybrid)
        );
    }

    #[test]
    fn test_rejects_undetermined() {
        let filter = SpeciesFilter::new();
        assert_eq!(filter.check("Larus sp.", "gull sp."), Err(Rejection::Undetermined));
        assert_eq!(filter.check("Larus", "large gull sp."), Err(Rejection::Undetermined));
    }

    #[test]
    fn test_rejects_denylisted_common_name() {
        let filter = SpeciesFilter::new();
        assert_eq!(
            filter.check("Anas platyrhynchos (Domestic type)", "Domestic Duck"),
            Err(Rejection::Denylisted)
        );
        assert_eq!(
            filter.check("Columba livia", "Rock Pigeon (Feral Pigeon)"),
            Err(Rejection::Denylisted)
        );
        assert_eq!(
            filter.check("Melopsittacus undulatus", "Budgerigar (Escaped)"),
            Err(Rejection::Denylisted)
        );
    }

    #[test]
    fn test_hybrid_wins_over_denylist() {
        let filter = SpeciesFilter::new();
        assert_eq!(
            filter.check("Anas x platyrhynchos", "Domestic Duck"),
            Err(Rejection::Hybrid)
        );
    }

    #[test]
    fn test_custom_denylist() {
        let filter = SpeciesFilter::with_denylist(["Introduced", " "]);
        assert_eq!(filter.denylist(), ["introduced".to_string()]);
        assert!(filter.accepts("Columba livia", "Feral Pigeon"));
        assert!(!filter.accepts("Phasianus colchicus", "Common Pheasant (introduced)"));
    }

    #[test]
    fn test_words_containing_x_are_not_hybrids() {
        let filter = SpeciesFilter::new();
        assert!(filter.accepts("Loxia curvirostra", "Red Crossbill"));
        assert!(filter.accepts("Anser anser", "Greylag Goose"));
    }

    #[test]
    fn test_observation_name_validity() {
        assert!(is_valid_observation_name("Parus major"));
        assert!(!is_valid_observation_name("Anas x platyrhynchos"));
        assert!(!is_valid_observation_name("Larus sp."));
    }
}
