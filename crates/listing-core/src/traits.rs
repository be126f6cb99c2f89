use async_trait::async_trait;

use crate::error::Result;
use crate::predicate::{Predicate, SortKey};
use crate::types::{CatalogPage, EntityKind, TrendingRows};

/// The listing store. Implementations are read-only from the engine's side.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    async fn filtered_search(&self, predicate: &Predicate, order: &[SortKey], limit: usize) -> Result<CatalogPage>;

    /// Display names in `namespace` containing `text`, at most `limit`.
    async fn lookup_by_prefix(&self, namespace: EntityKind, text: &str, limit: usize) -> Result<Vec<String>>;

    async fn trending_snapshot(&self) -> Result<TrendingRows>;

    /// Identifier for an exact, case-insensitive display-name match.
    async fn resolve_name(&self, namespace: EntityKind, name: &str) -> Result<Option<String>>;
}

/// Receives the encoded filters when the user explicitly submits a search.
pub trait Navigator: Send + Sync {
    fn navigate(&self, encoded_filters: &str);
}
