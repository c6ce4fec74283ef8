//! Configuration management
//!
//! Values come from the process environment (after loading `.env`), falling
//! back to the constants below. CLI flags are applied on top by the binary.

use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

// ============================================================================
// eBird Constants
// ============================================================================

/// Base URL of the eBird API v2.
pub const DEFAULT_EBIRD_BASE_URL: &str = "https://api.ebird.org/v2";

/// Request timeout for eBird calls in seconds.
pub const DEFAULT_EBIRD_TIMEOUT_SECS: u64 = 30;

// ============================================================================
// Region Constants
// ============================================================================

/// eBird region code used for the species list.
pub const DEFAULT_REGION_CODE: &str = "DK";

/// Region name stored in the `birds.region` column.
pub const DEFAULT_REGION_NAME: &str = "Denmark";

/// Locale requested for localized species names.
pub const DEFAULT_LOCALE: &str = "da";

/// Centre of Denmark, used for the recent-observations query.
pub const DEFAULT_RECENT_LATITUDE: f64 = 56.2639;
pub const DEFAULT_RECENT_LONGITUDE: f64 = 9.5018;

/// Cap on recent observations fetched per run.
pub const DEFAULT_RECENT_MAX_RESULTS: u32 = 500;

/// Largest `maxResults` the eBird recent-observations endpoint accepts.
pub const MAX_RECENT_RESULTS: u32 = 10_000;

/// eBird API access settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EbirdConfig {
    /// Value of the `X-eBirdApiToken` header; required to talk to eBird
    pub api_token: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for EbirdConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: DEFAULT_EBIRD_BASE_URL.to_string(),
            timeout_secs: DEFAULT_EBIRD_TIMEOUT_SECS,
        }
    }
}

/// Which region is reconciled and where "recently seen" is measured
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub region_code: String,
    pub region_name: String,
    pub locale: String,
    pub latitude: f64,
    pub longitude: f64,
    pub max_results: u32,
}

impl Default for RegionConfig {
    fn default() -> Self {
        Self {
            region_code: DEFAULT_REGION_CODE.to_string(),
            region_name: DEFAULT_REGION_NAME.to_string(),
            locale: DEFAULT_LOCALE.to_string(),
            latitude: DEFAULT_RECENT_LATITUDE,
            longitude: DEFAULT_RECENT_LONGITUDE,
            max_results: DEFAULT_RECENT_MAX_RESULTS,
        }
    }
}

/// Ingestion configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IngestConfig {
    pub ebird: EbirdConfig,
    pub region: RegionConfig,
}

impl IngestConfig {
    /// Load configuration from `.env`, the environment and defaults
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    /// Load configuration from the environment and defaults, without reading `.env`
    pub fn from_env() -> Result<Self> {
        let config = IngestConfig {
            ebird: EbirdConfig {
                api_token: std::env::var("EBIRD_API_KEY")
                    .ok()
                    .filter(|token| !token.trim().is_empty()),
                base_url: env_or("EBIRD_BASE_URL", DEFAULT_EBIRD_BASE_URL.to_string())?,
                timeout_secs: env_or("EBIRD_TIMEOUT_SECS", DEFAULT_EBIRD_TIMEOUT_SECS)?,
            },
            region: RegionConfig {
                region_code: env_or("ECHOES_REGION_CODE", DEFAULT_REGION_CODE.to_string())?,
                region_name: env_or("ECHOES_REGION_NAME", DEFAULT_REGION_NAME.to_string())?,
                locale: env_or("ECHOES_LOCALE", DEFAULT_LOCALE.to_string())?,
                latitude: env_or("ECHOES_RECENT_LAT", DEFAULT_RECENT_LATITUDE)?,
                longitude: env_or("ECHOES_RECENT_LNG", DEFAULT_RECENT_LONGITUDE)?,
                max_results: env_or("ECHOES_RECENT_MAX_RESULTS", DEFAULT_RECENT_MAX_RESULTS)?,
            },
        };

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        let region = &self.region;

        if region.region_code.trim().is_empty() {
            return Err(IngestError::config("Region code cannot be empty"));
        }

        if region.region_name.trim().is_empty() {
            return Err(IngestError::config("Region name cannot be empty"));
        }

        if !(-90.0..=90.0).contains(&region.latitude) {
            return Err(IngestError::config(format!(
                "Latitude {} is outside [-90, 90]",
                region.latitude
            )));
        }

        if !(-180.0..=180.0).contains(&region.longitude) {
            return Err(IngestError::config(format!(
                "Longitude {} is outside [-180, 180]",
                region.longitude
            )));
        }

        if region.max_results == 0 || region.max_results > MAX_RECENT_RESULTS {
            return Err(IngestError::config(format!(
                "Recent observation cap must be between 1 and {}, got {}",
                MAX_RECENT_RESULTS, region.max_results
            )));
        }

        if self.ebird.base_url.trim().is_empty() {
            return Err(IngestError::config("eBird base URL cannot be empty"));
        }

        if self.ebird.api_token.is_none() {
            tracing::warn!("EBIRD_API_KEY is not set - reconciliation will be unavailable");
        }

        Ok(())
    }
}

/// Read and parse `key`, using `default` when it is unset. A set but unparsable value is an error.
pub(crate) fn env_or<T: FromStr>(key: &str, default: T) -> Result<T> {
    match std::env::var(key) {
        Ok(raw) => match raw.trim().parse() {
            Ok(value) => Ok(value),
            Err(_) => Err(echoes_common::EchoesError::invalid_value(key, raw).into()),
        },
        Err(_) => Ok(default),
    }
}
