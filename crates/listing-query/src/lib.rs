//! listing-query
//!
//! Turns facet state into catalog requests and catalog rows into the two
//! result partitions. Everything here is synchronous except facet-name
//! resolution, which needs the catalog.

pub mod composer;
pub mod filter;
pub mod partition;

pub use composer::{resolve_facets, QueryComposer, ResolvedFacets};
pub use filter::{apply_edit, encode_filters, FacetEdit};
pub use partition::{into_result, partition, DisplayWindow, Partition};
