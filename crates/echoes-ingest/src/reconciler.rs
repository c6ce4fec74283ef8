//! Taxonomy reconciler
//!
//! Brings the species reference table in line with the provider for one region:
//!
//! 1. **Upsert**: fetch the region's species codes and the full taxonomy, drop
//!    out-of-region, malformed and filtered entries, and upsert the rest keyed
//!    by `(scientific_name, region)`.
//! 2. **Recent observations**: fetch sightings near the configured point and
//!    refresh `last_observed` on matching rows. Unknown names are ignored.
//!
//! Phases run sequentially and each fetch is tried once. A failure before or
//! during phase 1 aborts with nothing (or only whole statements) written; a
//! failure in phase 2 keeps phase 1's writes. Re-running with the same
//! provider data changes nothing, so the job is safe to schedule.
//!
//! Two runs must not target the same region concurrently; nothing here locks.
//! Rows missing from the region feed are never demoted or deleted.
//!
//! # Example
//!
//! ```no_run
//! use echoes_ingest::config::IngestConfig;
//! use echoes_ingest::ebird::EbirdClient;
//! use echoes_ingest::reconciler::{Reconciler, ReconcilerConfig};
//! use echoes_ingest::store::MemoryStore;
//!
//! # async fn example() -> echoes_ingest::Result<()> {
//! let config = IngestConfig::load()?;
//! let provider = EbirdClient::new(&config.ebird)?;
//! let reconciler = Reconciler::new(
//!     provider,
//!     MemoryStore::new(),
//!     ReconcilerConfig::from_region(&config.region),
//! );
//!
//! let report = reconciler.run().await?;
//! println!("{} inserted, {} marked", report.inserted, report.marked);
//! # Ok(())
//! # }
//! ```

use crate::config::RegionConfig;
use crate::error::{IngestError, Result};
use crate::filter::{is_valid_observation_name, Rejection, SpeciesFilter};
use crate::provider::{RecentObservation, TaxonomyEntry, TaxonomyProvider};
use crate::store::{ReferenceStore, SpeciesUpsert, UpsertOutcome};
use chrono::Utc;
use echoes_common::types::SpeciesKey;
use indicatif::{ProgressBar, ProgressStyle};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{debug, info, instrument, warn};

/// Explicit inputs of one reconciliation run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Provider region code for the species list, e.g. "DK"
    pub region_code: String,
    /// Value written to `birds.region`, e.g. "Denmark"
    pub region_name: String,
    /// Locale for localized names, e.g. "da"
    pub locale: String,
    pub latitude: f64,
    pub longitude: f64,
    pub max_results: u32,
    /// Draw progress bars for the write loops
    pub show_progress: bool,
}

impl ReconcilerConfig {
    pub fn from_region(region: &RegionConfig) -> Self {
        Self {
            region_code: region.region_code.clone(),
            region_name: region.region_name.clone(),
            locale: region.locale.clone(),
            latitude: region.latitude,
            longitude: region.longitude,
            max_results: region.max_results,
            show_progress: false,
        }
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self::from_region(&RegionConfig::default())
    }
}

/// Counters describing what a run did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconcileReport {
    // Phase 1
    pub species_codes: usize,
    pub taxonomy_entries: usize,
    pub out_of_region: usize,
    pub malformed: usize,
    /// Later entries repeating a scientific name already selected
    pub duplicates: usize,
    pub rejected_hybrid: usize,
    pub rejected_undetermined: usize,
    pub rejected_denylisted: usize,
    pub inserted: usize,
    pub updated: usize,
    pub unchanged: usize,

    // Phase 2
    pub observations_fetched: usize,
    /// Missing name, filtered name, or a repeat of a name already handled
    pub observations_skipped: usize,
    pub marked: usize,
    pub unmatched: usize,
}

impl ReconcileReport {
    pub fn rejected(&self) -> usize {
        self.rejected_hybrid + self.rejected_undetermined + self.rejected_denylisted
    }

    /// Rows whose identity or display fields were written
    pub fn changed(&self) -> usize {
        self.inserted + self.updated
    }

    fn record_rejection(&mut self, rejection: Rejection) {
        match rejection {
            Rejection::Hybrid => self.rejected_hybrid += 1,
            Rejection::Undetermined => self.rejected_undetermined += 1,
            Rejection::Denylisted => self.rejected_denylisted += 1,
        }
    }

    fn record_upsert(&mut self, outcome: UpsertOutcome) {
        match outcome {
            UpsertOutcome::Inserted => self.inserted += 1,
            UpsertOutcome::Updated => self.updated += 1,
            UpsertOutcome::Unchanged => self.unchanged += 1,
        }
    }
}

/// Reconciles the species reference table against a taxonomy provider
pub struct Reconciler<P, S> {
    provider: P,
    store: S,
    filter: SpeciesFilter,
    config: ReconcilerConfig,
}

impl<P, S> Reconciler<P, S>
where
    P: TaxonomyProvider,
    S: ReferenceStore,
{
    pub fn new(provider: P, store: S, config: ReconcilerConfig) -> Self {
        Self {
            provider,
            store,
            filter: SpeciesFilter::default(),
            config,
        }
    }

    pub fn with_filter(mut self, filter: SpeciesFilter) -> Self {
        self.filter = filter;
        self
    }

    pub fn config(&self) -> &ReconcilerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Run both phases
    #[instrument(skip(self), fields(region = %self.config.region_name))]
    pub async fn run(&self) -> Result<ReconcileReport> {
        let mut report = ReconcileReport::default();

        info!("Phase 1: Upserting region species");
        self.upsert_species(&mut report).await?;

        info!(
            inserted = report.inserted,
            updated = report.updated,
            unchanged = report.unchanged,
            rejected = report.rejected(),
            malformed = report.malformed,
            duplicates = report.duplicates,
            "Species upsert completed"
        );

        info!("Phase 2: Refreshing recent observations");
        if let Err(e) = self.refresh_recent(&mut report).await {
            warn!(
                error = %e,
                upserted = report.changed(),
                "Recent observation refresh failed; species upserts are kept"
            );
            return Err(e);
        }

        info!(
            fetched = report.observations_fetched,
            marked = report.marked,
            unmatched = report.unmatched,
            skipped = report.observations_skipped,
            "Recent observation refresh completed"
        );

        Ok(report)
    }

    /// Phase 1. Both fetches complete before the first write.
    pub async fn upsert_species(&self, report: &mut ReconcileReport) -> Result<()> {
        let codes = self
            .provider
            .list_species_codes(&self.config.region_code)
            .await?;

        if codes.is_empty() {
            return Err(IngestError::EmptySpeciesList(self.config.region_code.clone()));
        }
        report.species_codes = codes.len();

        let taxonomy = self.provider.get_taxonomy(&self.config.locale).await?;
        report.taxonomy_entries = taxonomy.len();

        let candidates = self.select_candidates(&taxonomy, &codes, report);
        debug!(
            candidates = candidates.len(),
            out_of_region = report.out_of_region,
            "Selected taxonomy entries for upsert"
        );

        let progress = self.progress_bar(candidates.len() as u64, "Upserting species");
        for upsert in &candidates {
            let outcome = self.store.upsert_species(upsert).await?;
            report.record_upsert(outcome);
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(())
    }

    /// Phase 2. One timestamp is used for every row marked in the run.
    pub async fn refresh_recent(&self, report: &mut ReconcileReport) -> Result<()> {
        let observations = self
            .provider
            .list_recent_observations(
                self.config.latitude,
                self.config.longitude,
                self.config.max_results,
            )
            .await?;
        report.observations_fetched = observations.len();

        let names = self.select_observed_names(&observations, report);
        let observed_at = Utc::now();

        let progress = self.progress_bar(names.len() as u64, "Updating recent observations");
        for name in names {
            let key = SpeciesKey::new(name, &self.config.region_name);
            if self.store.mark_observed(&key, observed_at).await? {
                report.marked += 1;
            } else {
                debug!(scientific_name = name, "Observed species not in reference table");
                report.unmatched += 1;
            }
            progress.inc(1);
        }
        progress.finish_and_clear();

        Ok(())
    }

    fn select_candidates(
        &self,
        taxonomy: &[TaxonomyEntry],
        codes: &HashSet<String>,
        report: &mut ReconcileReport,
    ) -> Vec<SpeciesUpsert> {
        let mut candidates = Vec::new();
        let mut selected = HashSet::new();

        for entry in taxonomy {
            if !codes.contains(&entry.species_code) {
                report.out_of_region += 1;
                continue;
            }

            let Some(scientific_name) = entry.scientific_name() else {
                warn!(
                    species_code = %entry.species_code,
                    "Taxonomy entry has no scientific name, skipping"
                );
                report.malformed += 1;
                continue;
            };

            if let Err(rejection) = self.filter.check(scientific_name, &entry.common_name) {
                debug!(
                    scientific_name,
                    common_name = %entry.common_name,
                    %rejection,
                    "Skipping filtered taxonomy entry"
                );
                report.record_rejection(rejection);
                continue;
            }

            let upsert = SpeciesUpsert {
                scientific_name: scientific_name.to_string(),
                common_name: entry.common_name.clone(),
                localized_name: entry.localized_name.clone(),
                region: self.config.region_name.clone(),
            };

            // First entry in feed order wins
            if !selected.insert(upsert.key()) {
                debug!(
                    scientific_name,
                    species_code = %entry.species_code,
                    common_name = %entry.common_name,
                    "Skipping repeated scientific name"
                );
                report.duplicates += 1;
                continue;
            }

            candidates.push(upsert);
        }

        candidates
    }

    fn select_observed_names<'a>(
        &self,
        observations: &'a [RecentObservation],
        report: &mut ReconcileReport,
    ) -> Vec<&'a str> {
        let mut seen = HashSet::new();
        let mut names = Vec::new();

        for observation in observations {
            let Some(name) = observation.scientific_name() else {
                warn!(
                    observed_at = ?observation.observed_at,
                    "Recent observation has no scientific name, skipping"
                );
                report.observations_skipped += 1;
                continue;
            };

            if !is_valid_observation_name(name) {
                debug!(scientific_name = name, "Skipping hybrid or undetermined observation");
                report.observations_skipped += 1;
                continue;
            }

            if !seen.insert(name) {
                report.observations_skipped += 1;
                continue;
            }

            names.push(name);
        }

        names
    }

    fn progress_bar(&self, len: u64, message: &'static str) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{msg}\n{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})")
        {
            pb.set_style(style.progress_chars("#>-"));
        }
        pb.set_message(message);
        pb
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_region() {
        let config = ReconcilerConfig::from_region(&RegionConfig::default()).with_progress(true);
        assert_eq!(config.region_code, "DK");
        assert_eq!(config.region_name, "Denmark");
        assert_eq!(config.max_results, 500);
        assert!(config.show_progress);
    }

    #[test]
    fn test_report_totals() {
        let mut report = ReconcileReport::default();
        report.record_rejection(Rejection::Hybrid);
        report.record_rejection(Rejection::Denylisted);
        report.record_upsert(UpsertOutcome::Inserted);
        report.record_upsert(UpsertOutcome::Unchanged);

        assert_eq!(report.rejected(), 2);
        assert_eq!(report.changed(), 1);
        assert_eq!(report.unchanged, 1);
    }
}
