//! Autocomplete candidates for searches that matched nothing.

use std::collections::HashSet;
use std::time::Duration;

use listing_core::config::{RetrySettings, SuggestionSettings};
use listing_core::error::Error;
use listing_core::traits::CatalogClient;
use listing_core::types::EntityKind;
use tracing::debug;

/// Outcome of one namespace lookup. A degraded lookup contributes nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Ok(Vec<String>),
    Degraded { cause: Error },
}

impl Lookup {
    fn from_result(result: Result<Vec<String>, Error>) -> Self {
        match result {
            Ok(names) => Lookup::Ok(names),
            Err(cause) => Lookup::Degraded { cause },
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SuggestionSet {
    pub suggestions: Vec<String>,
    /// Namespaces whose lookup failed, with the cause. Never user-visible.
    pub degraded: Vec<(EntityKind, Error)>,
}

#[derive(Debug, Clone)]
pub struct SuggestionGenerator {
    settings: SuggestionSettings,
    lookup_timeout: Duration,
}

impl SuggestionGenerator {
    pub fn new(settings: &SuggestionSettings) -> Self {
        Self { settings: settings.clone(), lookup_timeout: RetrySettings::default().timeout() }
    }

    /// Bound on each namespace lookup; an elapsed lookup degrades that namespace.
    pub fn with_timeout(mut self, lookup_timeout: Duration) -> Self {
        self.lookup_timeout = lookup_timeout;
        self
    }

    /// Settled text long enough to be worth suggesting for.
    pub fn eligible(&self, settled_text: &str) -> bool {
        settled_text.trim().chars().count() >= self.settings.min_chars
    }

    pub async fn generate(&self, client: &dyn CatalogClient, text: &str) -> SuggestionSet {
        let text = text.trim();
        if !self.eligible(text) {
            return SuggestionSet::default();
        }
        let s = &self.settings;
        let (listings, categories, villages) = futures::join!(
            self.lookup(client, EntityKind::Listing, text, s.listing_cap),
            self.lookup(client, EntityKind::Category, text, s.category_cap),
            self.lookup(client, EntityKind::Village, text, s.village_cap),
        );
        self.merge([(EntityKind::Listing, listings), (EntityKind::Category, categories), (EntityKind::Village, villages)])
    }

    async fn lookup(&self, client: &dyn CatalogClient, kind: EntityKind, text: &str, limit: usize) -> Lookup {
        match tokio::time::timeout(self.lookup_timeout, client.lookup_by_prefix(kind, text, limit)).await {
            Ok(result) => Lookup::from_result(result),
            Err(_) => Lookup::Degraded { cause: Error::Timeout(self.lookup_timeout.as_millis() as u64) },
        }
    }

    /// Concatenate in namespace order, drop exact duplicates, cap the total.
    pub fn merge(&self, lookups: [(EntityKind, Lookup); 3]) -> SuggestionSet {
        let mut out = SuggestionSet::default();
        let mut seen = HashSet::new();
        for (kind, lookup) in lookups {
            match lookup {
                Lookup::Ok(names) => {
                    let cap = self.cap_for(kind);
                    for name in names.into_iter().take(cap) {
                        if seen.insert(name.clone()) { out.suggestions.push(name); }
                    }
                }
                Lookup::Degraded { cause } => {
                    debug!(namespace = kind.as_str(), error = %cause, "suggestion lookup degraded");
                    out.degraded.push((kind, cause));
                }
            }
        }
        out.suggestions.truncate(self.settings.total_cap);
        out
    }

    fn cap_for(&self, kind: EntityKind) -> usize {
        match kind {
            EntityKind::Listing => self.settings.listing_cap,
            EntityKind::Category => self.settings.category_cap,
            EntityKind::Village => self.settings.village_cap,
        }
    }
}
