use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use listing_core::error::Result as CatalogResult;
use listing_core::fixtures::CatalogSnapshot;
use listing_core::predicate::{sort_listings, Predicate, SortKey};
use listing_core::traits::CatalogClient;
use listing_core::types::{CatalogPage, EntityKind, Listing, TrendingRows};

pub struct InMemoryCatalog {
    snapshot: CatalogSnapshot,
}

impl InMemoryCatalog {
    pub fn new(snapshot: CatalogSnapshot) -> Self { Self { snapshot } }

    pub fn open(path: &Path) -> Result<Self> {
        let snapshot = CatalogSnapshot::load(path)?;
        info!(
            listings = snapshot.listings.len(),
            categories = snapshot.categories.len(),
            villages = snapshot.villages.len(),
            "loaded catalog from {}",
            path.display()
        );
        Ok(Self::new(snapshot))
    }

    pub fn listings(&self) -> &[Listing] { &self.snapshot.listings }

    /// `(id, display name)` pairs for a namespace. Unverified listings are
    /// not exposed by name.
    fn names(&self, namespace: EntityKind) -> Vec<(&str, &str)> {
        match namespace {
            EntityKind::Listing => self.snapshot.listings.iter().filter(|l| l.verified).map(|l| (l.id.as_str(), l.name.as_str())).collect(),
            EntityKind::Category => self.snapshot.categories.iter().map(|c| (c.id.as_str(), c.name.as_str())).collect(),
            EntityKind::Village => self.snapshot.villages.iter().map(|v| (v.id.as_str(), v.name.as_str())).collect(),
        }
    }
}

#[async_trait]
impl CatalogClient for InMemoryCatalog {
    async fn filtered_search(&self, predicate: &Predicate, order: &[SortKey], limit: usize) -> CatalogResult<CatalogPage> {
        let mut rows: Vec<Listing> = self.snapshot.listings.iter().filter(|l| predicate.matches(l)).cloned().collect();
        sort_listings(&mut rows, order);
        let total_count = rows.len();
        rows.truncate(limit);
        debug!(total_count, returned = rows.len(), "filtered search");
        Ok(CatalogPage { rows, total_count })
    }

    async fn lookup_by_prefix(&self, namespace: EntityKind, text: &str, limit: usize) -> CatalogResult<Vec<String>> {
        let needle = text.trim().to_lowercase();
        let mut names: Vec<&str> = self
            .names(namespace)
            .into_iter()
            .map(|(_, name)| name)
            .filter(|name| name.to_lowercase().contains(&needle))
            .collect();
        names.sort_by_key(|n| n.to_lowercase());
        Ok(names.into_iter().take(limit).map(str::to_string).collect())
    }

    async fn trending_snapshot(&self) -> CatalogResult<TrendingRows> {
        let mut promoted_listings: Vec<Listing> = self.snapshot.listings.iter().filter(|l| l.promoted && l.verified).cloned().collect();
        sort_listings(&mut promoted_listings, &[SortKey::NameAsc]);
        let mut categories = self.snapshot.categories.clone();
        categories.sort_by_key(|c| c.name.to_lowercase());
        let mut villages = self.snapshot.villages.clone();
        villages.sort_by_key(|v| v.name.to_lowercase());
        Ok(TrendingRows { promoted_listings, categories, villages })
    }

    async fn resolve_name(&self, namespace: EntityKind, name: &str) -> CatalogResult<Option<String>> {
        let wanted = name.trim().to_lowercase();
        Ok(self
            .names(namespace)
            .into_iter()
            .find(|(_, n)| n.to_lowercase() == wanted)
            .map(|(id, _)| id.to_string()))
    }
}
