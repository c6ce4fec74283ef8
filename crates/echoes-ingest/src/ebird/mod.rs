//! eBird API client
//!
//! Production [`TaxonomyProvider`](crate::provider::TaxonomyProvider) backed by
//! the eBird API v2. Requests are authenticated with the `X-eBirdApiToken`
//! header and attempted exactly once.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::EbirdClient;
