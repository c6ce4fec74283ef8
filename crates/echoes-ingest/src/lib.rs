//! Urban Echoes Ingest Library
//!
//! Keeps the `birds` species reference table in step with eBird and seeds
//! synthetic observations for development.
//!
//! # Components
//!
//! - **Reconciler**: upserts a region's species and refreshes `last_observed`
//!   from recent sightings ([`reconciler`])
//! - **eBird client**: the production [`provider::TaxonomyProvider`] ([`ebird`])
//! - **Stores**: PostgreSQL and in-memory implementations of the table
//!   interfaces ([`store`])
//! - **Sample data**: random test observations around Aarhus ([`sample`])
//!
//! # Example
//!
//! ```no_run
//! use echoes_ingest::db::{create_pool, run_migrations, DbConfig};
//! use echoes_ingest::store::{PgStore, ReferenceStore};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let pool = create_pool(&DbConfig::from_env()?).await?;
//!     run_migrations(&pool).await?;
//!
//!     let store = PgStore::new(pool);
//!     for bird in store.list_species(Some("Denmark")).await? {
//!         println!("{}", bird.display_name());
//!     }
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod config;
pub mod db;
pub mod ebird;
pub mod error;
pub mod filter;
pub mod provider;
pub mod reconciler;
pub mod sample;
pub mod store;

pub use error::{IngestError, Result};
