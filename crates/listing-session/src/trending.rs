//! Default view for the empty search bar, cached for a freshness window.

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{info, warn};

use listing_core::config::{RetrySettings, TrendingSettings};
use listing_core::error::Error;
use listing_core::traits::CatalogClient;
use listing_core::types::{Category, Listing, Village};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrendingView {
    pub listings: Vec<Listing>,
    pub categories: Vec<Category>,
    pub villages: Vec<Village>,
    pub terms: Vec<String>,
}

struct Cached {
    fetched_at: Instant,
    view: Arc<TrendingView>,
}

pub struct TrendingAggregator {
    settings: TrendingSettings,
    refresh_timeout: Duration,
    cache: Mutex<Option<Cached>>,
}

impl TrendingAggregator {
    pub fn new(settings: &TrendingSettings) -> Self {
        Self { settings: settings.clone(), refresh_timeout: RetrySettings::default().timeout(), cache: Mutex::new(None) }
    }

    /// Bound on one refresh. An elapsed refresh counts as a failed one.
    pub fn with_timeout(mut self, refresh_timeout: Duration) -> Self {
        self.refresh_timeout = refresh_timeout;
        self
    }

    /// Cached view, refreshed lazily once older than the TTL. Callers racing
    /// a refresh wait for it instead of issuing their own.
    pub async fn snapshot(&self, client: &dyn CatalogClient, now: Instant) -> Arc<TrendingView> {
        let mut cache = self.cache.lock().await;
        if let Some(hit) = cache.as_ref().filter(|c| now.saturating_duration_since(c.fetched_at) < self.settings.ttl()) {
            return Arc::clone(&hit.view);
        }
        let refreshed = tokio::time::timeout(self.refresh_timeout, client.trending_snapshot())
            .await
            .unwrap_or_else(|_| Err(Error::Timeout(self.refresh_timeout.as_millis() as u64)));
        match refreshed {
            Ok(rows) => {
                let view = Arc::new(TrendingView {
                    listings: rows.promoted_listings.into_iter().filter(|l| l.promoted && l.verified).take(self.settings.listing_cap).collect(),
                    categories: rows.categories.into_iter().take(self.settings.category_cap).collect(),
                    villages: rows.villages.into_iter().take(self.settings.village_cap).collect(),
                    terms: self.settings.terms.clone(),
                });
                info!(listings = view.listings.len(), categories = view.categories.len(), villages = view.villages.len(), "trending snapshot refreshed");
                *cache = Some(Cached { fetched_at: now, view: Arc::clone(&view) });
                view
            }
            Err(e) => {
                warn!(error = %e, "trending refresh failed");
                match cache.as_ref() {
                    Some(stale) => Arc::clone(&stale.view),
                    None => Arc::new(TrendingView { terms: self.settings.terms.clone(), ..TrendingView::default() }),
                }
            }
        }
    }
}
