//! HTTP client for the eBird API

use super::endpoints;
use super::types::{EbirdObservation, EbirdTaxon};
use crate::config::EbirdConfig;
use crate::error::{IngestError, Result};
use crate::provider::{RecentObservation, TaxonomyEntry, TaxonomyProvider};
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info};

/// Header carrying the eBird API key.
pub const TOKEN_HEADER: &str = "X-eBirdApiToken";

/// API client for eBird
pub struct EbirdClient {
    client: Client,
    base_url: String,
    api_token: String,
}

impl EbirdClient {
    /// Create a client from configuration; the API token must be set
    pub fn new(config: &EbirdConfig) -> Result<Self> {
        let api_token = config
            .api_token
            .clone()
            .ok_or_else(|| IngestError::config("EBIRD_API_KEY is required to query eBird"))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            api_token,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// GET `url` with the token header and decode the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        debug!(url = %url, "Requesting eBird endpoint");

        let response = self
            .client
            .get(url)
            .header(TOKEN_HEADER, &self.api_token)
            .query(query)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(IngestError::ProviderStatus {
                endpoint: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.json().await?)
    }
}

#[async_trait]
impl TaxonomyProvider for EbirdClient {
    async fn list_species_codes(&self, region_code: &str) -> Result<HashSet<String>> {
        let url = endpoints::species_list_url(&self.base_url, region_code);
        let codes: Vec<String> = self.get_json(&url, &[]).await?;

        info!(region_code, count = codes.len(), "Fetched region species list");
        Ok(codes.into_iter().collect())
    }

    async fn get_taxonomy(&self, locale: &str) -> Result<Vec<TaxonomyEntry>> {
        let url = endpoints::taxonomy_url(&self.base_url);
        let query = [("fmt", "json".to_string()), ("locale", locale.to_string())];
        let taxa: Vec<EbirdTaxon> = self.get_json(&url, &query).await?;

        info!(locale, count = taxa.len(), "Fetched eBird taxonomy");
        Ok(taxa.into_iter().map(TaxonomyEntry::from).collect())
    }

    async fn list_recent_observations(
        &self,
        latitude: f64,
        longitude: f64,
        max_results: u32,
    ) -> Result<Vec<RecentObservation>> {
        let url = endpoints::recent_observations_url(&self.base_url);
        let query = [
            ("lat", latitude.to_string()),
            ("lng", longitude.to_string()),
            ("maxResults", max_results.to_string()),
        ];
        let observations: Vec<EbirdObservation> = self.get_json(&url, &query).await?;

        info!(
            latitude,
            longitude,
            count = observations.len(),
            "Fetched recent observations"
        );
        Ok(observations.into_iter().map(RecentObservation::from).collect())
    }
}
