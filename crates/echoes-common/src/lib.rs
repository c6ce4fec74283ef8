//! Urban Echoes Common Library
//!
//! Shared types, logging and error handling for the Urban Echoes ingestion tools.
//!
//! # Overview
//!
//! - **Error Handling**: [`EchoesError`] and the [`Result`] alias
//! - **Logging**: tracing subscriber setup driven by [`logging::LogConfig`]
//! - **Types**: rows of the `birds` and `bird_observations` tables
//!
//! # Example
//!
//! ```no_run
//! use echoes_common::logging::{init_logging, LogConfig};
//! use echoes_common::types::SpeciesRecord;
//!
//! fn main() -> echoes_common::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     let blackbird = SpeciesRecord::new("Turdus merula", "Eurasian Blackbird", "Denmark");
//!     tracing::info!(name = %blackbird.display_name(), "Loaded species");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod error;
pub mod logging;
pub mod types;

// Re-export commonly used types
pub use error::{EchoesError, Result};
