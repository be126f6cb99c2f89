use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info, warn};

use listing_core::config::{RetrySettings, SearchSettings};
use listing_core::error::{Error, Result};
use listing_core::traits::{CatalogClient, Navigator};
use listing_core::types::{CatalogPage, RequestKey};
use listing_query::{resolve_facets, QueryComposer, ResolvedFacets};

use crate::session::{Completion, Effect, SearchSession};
use crate::suggest::SuggestionGenerator;
use crate::trending::TrendingAggregator;

/// Performs session effects against injected collaborators. One driver per
/// mounted search bar; nothing here is process-global.
pub struct SessionDriver {
    client: Arc<dyn CatalogClient>,
    navigator: Arc<dyn Navigator>,
    composer: QueryComposer,
    suggester: SuggestionGenerator,
    trending: TrendingAggregator,
    retry: RetrySettings,
}

impl SessionDriver {
    pub fn new(client: Arc<dyn CatalogClient>, navigator: Arc<dyn Navigator>, settings: &SearchSettings) -> Self {
        Self {
            client,
            navigator,
            composer: QueryComposer::new(settings),
            suggester: SuggestionGenerator::new(&settings.suggestions).with_timeout(settings.retry.timeout()),
            trending: TrendingAggregator::new(&settings.trending).with_timeout(settings.retry.timeout()),
            retry: settings.retry,
        }
    }

    /// Run one effect. Navigation completes synchronously and yields nothing.
    pub async fn perform(&self, effect: Effect) -> Option<Completion> {
        match effect {
            Effect::FetchResults(pending) => {
                let outcome = self.fetch_results(pending.generation, &pending.key).await;
                Some(Completion::Results { generation: pending.generation, outcome })
            }
            Effect::FetchSuggestions(pending) => {
                let set = self.suggester.generate(self.client.as_ref(), &pending.text).await;
                Some(Completion::Suggestions { generation: pending.generation, set })
            }
            Effect::FetchTrending => Some(Completion::Trending(self.trending.snapshot(self.client.as_ref(), Instant::now()).await)),
            Effect::Navigate(encoded) => {
                info!(filters = %encoded, "navigating to results page");
                self.navigator.navigate(&encoded);
                None
            }
        }
    }

    /// Perform effects concurrently, applying each completion as it lands so
    /// a slow suggestion lookup never holds back a finished results page.
    pub async fn dispatch(&self, session: &mut SearchSession, effects: Vec<Effect>) {
        let mut in_flight: FuturesUnordered<_> = effects.into_iter().map(|e| self.perform(e)).collect();
        while let Some(completion) = in_flight.next().await {
            if let Some(completion) = completion {
                session.apply(completion);
            }
        }
    }

    /// Resolve, compose and execute one request key, retrying failed or
    /// timed-out attempts with doubling backoff.
    pub async fn fetch_results(&self, generation: u64, key: &RequestKey) -> Result<CatalogPage> {
        let filter = key.to_filter();
        let resolved = match tokio::time::timeout(self.retry.timeout(), resolve_facets(self.client.as_ref(), &filter)).await {
            Ok(resolved) => resolved,
            Err(_) => {
                warn!(generation, timeout_ms = self.retry.timeout_ms, "facet resolution timed out; dropping facets");
                ResolvedFacets::default()
            }
        };
        let Some(plan) = self.composer.compose(&filter, &resolved) else {
            debug!(generation, "neutral filters; nothing to fetch");
            return Ok(CatalogPage::default());
        };

        let mut attempt = 1;
        loop {
            let call = self.client.filtered_search(&plan.predicate, &plan.order, plan.limit);
            let outcome = match tokio::time::timeout(self.retry.timeout(), call).await {
                Ok(outcome) => outcome,
                Err(_) => Err(Error::Timeout(self.retry.timeout_ms)),
            };
            match outcome {
                Ok(page) => {
                    debug!(generation, key = key.fingerprint(), total = page.total_count, "search completed");
                    return Ok(page);
                }
                Err(e) if attempt < self.retry.max_attempts => {
                    let delay = self.retry.backoff(attempt);
                    warn!(generation, attempt, error = %e, delay_ms = delay.as_millis() as u64, "search attempt failed; retrying");
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    warn!(generation, attempt, error = %e, "search failed");
                    return Err(e);
                }
            }
        }
    }
}
