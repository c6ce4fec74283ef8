//! Error types for species ingestion
//!
//! Every fetch from the provider is attempted once; any [`IngestError::Provider`]
//! or [`IngestError::ProviderStatus`] aborts the phase it occurs in.

use thiserror::Error;

/// Result type alias for ingestion operations
pub type Result<T> = std::result::Result<T, IngestError>;

#[derive(Error, Debug)]
pub enum IngestError {
    /// Transport, timeout or body decoding failure talking to the taxonomy provider
    #[error("Taxonomy provider request failed: {0}")]
    Provider(#[from] reqwest::Error),

    /// Provider answered with a non-success status
    #[error("Taxonomy provider returned {status} for {endpoint}")]
    ProviderStatus { endpoint: String, status: u16 },

    /// Reference store query failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    /// The region species list came back empty; nothing is written
    #[error("Species list for region '{0}' is empty; refusing to reconcile")]
    EmptySpeciesList(String),

    /// No reference species to build observations from
    #[error("No species found in the reference table{0}")]
    NoSpecies(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Common(#[from] echoes_common::EchoesError),
}

impl IngestError {
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    pub fn no_species(region: Option<&str>) -> Self {
        match region {
            Some(region) => Self::NoSpecies(format!(" for region '{}'", region)),
            None => Self::NoSpecies(String::new()),
        }
    }
}
