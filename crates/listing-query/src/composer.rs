//! FilterState -> catalog request.
//!
//! Facets are AND-composed. The text facet and the season facet each expand
//! to an OR over several substring tests. Every request additionally requires
//! `verified = true`; the public search bar never shows unverified listings.
//!
//! `min_rating` makes a filter state "active" (so a request is issued) but no
//! rating is stored on listings, so it contributes no clause.

use listing_core::config::{SearchSettings, SeasonSynonyms};
use listing_core::predicate::{Predicate, QueryPlan, SortKey, TextField};
use listing_core::traits::CatalogClient;
use listing_core::types::{EntityKind, FilterState, Season};
use tracing::{debug, warn};

pub const RESULT_ORDER: [SortKey; 3] = [SortKey::PromotedDesc, SortKey::VerifiedDesc, SortKey::NameAsc];

/// Catalog identifiers for the name-valued facets. `None` means the facet
/// is unset or did not resolve; either way it is dropped from the predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedFacets {
    pub category_id: Option<String>,
    pub village_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct QueryComposer {
    synonyms: SeasonSynonyms,
    row_limit: usize,
}

impl QueryComposer {
    pub fn new(settings: &SearchSettings) -> Self {
        Self { synonyms: settings.seasons.clone(), row_limit: settings.row_limit }
    }

    /// True when at least one facet deviates from its neutral value.
    pub fn needs_query(filter: &FilterState) -> bool {
        !filter.text.trim().is_empty() || filter.has_active_facets()
    }

    pub fn compose(&self, filter: &FilterState, resolved: &ResolvedFacets) -> Option<QueryPlan> {
        if !Self::needs_query(filter) {
            return None;
        }
        let mut clauses = vec![Predicate::Verified(true)];

        let text = filter.text.trim();
        if !text.is_empty() {
            clauses.push(Predicate::Or(
                [TextField::Name, TextField::Description, TextField::Tags, TextField::Features]
                    .into_iter()
                    .map(|field| Predicate::contains(field, text))
                    .collect(),
            ));
        }
        if let Some(id) = &resolved.category_id {
            clauses.push(Predicate::CategoryIs(id.clone()));
        }
        if let Some(id) = &resolved.village_id {
            clauses.push(Predicate::VillageIs(id.clone()));
        }
        if let Some(range) = filter.price.filter(|r| !r.is_full()) {
            clauses.push(Predicate::PriceTierIn(range.tiers()));
        }
        if let Some(season) = self.season_clause(filter.season) {
            clauses.push(season);
        }

        Some(QueryPlan { predicate: Predicate::And(clauses), order: RESULT_ORDER.to_vec(), limit: self.row_limit })
    }

    fn season_clause(&self, season: Season) -> Option<Predicate> {
        let words = self.synonyms.for_season(season);
        if words.is_empty() {
            return None;
        }
        Some(Predicate::Or(words.iter().map(|w| Predicate::contains(TextField::Season, w)).collect()))
    }
}

/// Resolve category and village names to identifiers. Misses and lookup
/// failures both leave the facet unresolved.
pub async fn resolve_facets(client: &dyn CatalogClient, filter: &FilterState) -> ResolvedFacets {
    ResolvedFacets {
        category_id: resolve_one(client, EntityKind::Category, filter.category.as_deref()).await,
        village_id: resolve_one(client, EntityKind::Village, filter.village.as_deref()).await,
    }
}

async fn resolve_one(client: &dyn CatalogClient, kind: EntityKind, name: Option<&str>) -> Option<String> {
    let name = name?;
    match client.resolve_name(kind, name).await {
        Ok(Some(id)) => Some(id),
        Ok(None) => {
            debug!(namespace = kind.as_str(), name, "facet name did not resolve; dropping facet");
            None
        }
        Err(e) => {
            warn!(namespace = kind.as_str(), name, error = %e, "facet resolution failed; dropping facet");
            None
        }
    }
}
