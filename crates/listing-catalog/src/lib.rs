//! listing-catalog
//!
//! In-process [`CatalogClient`](listing_core::traits::CatalogClient) over a
//! loaded catalog snapshot. Used by the CLI and by tests; production deployments
//! plug their own store in behind the same trait.

pub mod memory;

pub use memory::InMemoryCatalog;
