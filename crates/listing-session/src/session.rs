//! Search bar state machine.
//!
//! All transitions are synchronous and return the [`Effect`]s they need
//! performed. Completions come back through [`SearchSession::apply`] tagged
//! with the generation they were issued under; anything but the latest
//! generation of its kind is dropped. There is no cancellation of in-flight
//! catalog calls, only suppression of their results.
//!
//! Phases:
//! - `Idle`: not focused, nothing rendered.
//! - `Browsing`: focused with no active query, trending view shown.
//! - `Typing`: text edited, debounce window still open; the previous view stays.
//! - `Loading`: a results fetch for the current key is outstanding.
//! - `Suggesting`: the settled query matched nothing and suggestions exist.
//! - `ShowingResults`: settled results (possibly empty, possibly an error).

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use listing_core::config::SearchSettings;
use listing_core::error::Error;
use listing_core::types::{CatalogPage, EntityKind, FilterState, RequestKey, SearchResult};
use listing_query::{apply_edit, encode_filters, into_result, FacetEdit, QueryComposer};

use crate::debounce::Debouncer;
use crate::suggest::{SuggestionGenerator, SuggestionSet};
use crate::trending::TrendingView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Browsing,
    Typing,
    Loading,
    Suggesting,
    ShowingResults,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingQuery {
    pub generation: u64,
    pub key: RequestKey,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingSuggestions {
    pub generation: u64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchResults(PendingQuery),
    FetchSuggestions(PendingSuggestions),
    FetchTrending,
    /// Hand the encoded filters to the navigation collaborator.
    Navigate(String),
}

#[derive(Debug, Clone)]
pub enum Completion {
    Results { generation: u64, outcome: Result<CatalogPage, Error> },
    Suggestions { generation: u64, set: SuggestionSet },
    Trending(Arc<TrendingView>),
}

/// What the rendering layer should draw.
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Hidden,
    Trending(Arc<TrendingView>),
    Results(Arc<SearchResult>),
}

pub struct SearchSession {
    filter: FilterState,
    settled_text: String,
    debouncer: Debouncer<String>,
    suggester: SuggestionGenerator,
    focused: bool,
    mounted: bool,
    generation: u64,
    results_generation: u64,
    suggestions_generation: u64,
    current_key: Option<RequestKey>,
    result: Arc<SearchResult>,
    /// Suggestions for the current settled text, once they have arrived.
    suggestions: Option<SuggestionSet>,
    trending: Option<Arc<TrendingView>>,
}

impl SearchSession {
    pub fn new(settings: &SearchSettings) -> Self {
        Self {
            filter: FilterState::default(),
            settled_text: String::new(),
            debouncer: Debouncer::new(settings.debounce()),
            suggester: SuggestionGenerator::new(&settings.suggestions),
            focused: false,
            mounted: true,
            generation: 0,
            results_generation: 0,
            suggestions_generation: 0,
            current_key: None,
            result: Arc::new(SearchResult::default()),
            suggestions: None,
            trending: None,
        }
    }

    pub fn filter(&self) -> &FilterState { &self.filter }
    pub fn settled_text(&self) -> &str { &self.settled_text }
    pub fn result(&self) -> Arc<SearchResult> { Arc::clone(&self.result) }
    pub fn current_key(&self) -> Option<&RequestKey> { self.current_key.as_ref() }
    pub fn is_focused(&self) -> bool { self.focused }
    pub fn is_mounted(&self) -> bool { self.mounted }
    pub fn active_facet_count(&self) -> usize { self.filter.active_facet_count() }

    /// Degraded lookups seen for the current suggestions, if any arrived.
    pub fn degraded_lookups(&self) -> &[(EntityKind, Error)] {
        self.suggestions.as_ref().map_or(&[], |s| s.degraded.as_slice())
    }

    /// When the pending debounce, if any, will settle.
    pub fn next_deadline(&self) -> Option<Instant> { self.debouncer.deadline() }

    pub fn phase(&self) -> Phase {
        if !self.focused {
            return Phase::Idle;
        }
        if self.debouncer.is_pending() {
            return Phase::Typing;
        }
        if self.current_key.is_none() {
            return Phase::Browsing;
        }
        if self.result.loading {
            Phase::Loading
        } else if self.result.total_count == 0 && !self.result.suggestions.is_empty() {
            Phase::Suggesting
        } else {
            Phase::ShowingResults
        }
    }

    pub fn view(&self) -> View {
        match self.phase() {
            Phase::Idle => View::Hidden,
            _ if self.current_key.is_none() => View::Trending(self.trending.clone().unwrap_or_default()),
            _ => View::Results(self.result()),
        }
    }

    pub fn focus(&mut self) -> Vec<Effect> {
        if !self.mounted {
            return Vec::new();
        }
        self.focused = true;
        if self.current_key.is_none() { vec![Effect::FetchTrending] } else { Vec::new() }
    }

    /// Blur outside the search bar, or explicit dismiss.
    pub fn dismiss(&mut self) { self.focused = false; }

    /// Leaves the typed text in place.
    pub fn escape(&mut self) { self.focused = false; }

    /// The single entry point for facet changes. Text goes through the
    /// debouncer; every other facet takes effect immediately.
    pub fn edit(&mut self, edit: FacetEdit, now: Instant) -> Vec<Effect> {
        if !self.mounted {
            return Vec::new();
        }
        self.focused = true;
        let next = apply_edit(&self.filter, edit.clone());
        if edit.is_text() {
            if next.text != self.filter.text {
                self.debouncer.submit(next.text.clone(), now);
            }
            self.filter = next;
            return Vec::new();
        }
        self.filter = next;
        self.refresh()
    }

    /// Advance the clock; settles the debounced text once quiet long enough.
    pub fn tick(&mut self, now: Instant) -> Vec<Effect> {
        if !self.mounted {
            return Vec::new();
        }
        match self.debouncer.poll(now) {
            Some(text) => {
                self.settled_text = text;
                self.refresh()
            }
            None => Vec::new(),
        }
    }

    /// Explicit submit: settle immediately, then hand the filters to navigation.
    pub fn submit(&mut self) -> Vec<Effect> {
        if !self.mounted {
            return Vec::new();
        }
        if let Some(text) = self.debouncer.flush() {
            self.settled_text = text;
        }
        let mut effects = self.refresh();
        effects.push(Effect::Navigate(encode_filters(&self.filter)));
        effects
    }

    pub fn select_suggestion(&mut self, suggestion: &str) -> Vec<Effect> { self.replace_text(suggestion) }

    pub fn select_trending(&mut self, term: &str) -> Vec<Effect> { self.replace_text(term) }

    fn replace_text(&mut self, text: &str) -> Vec<Effect> {
        if !self.mounted {
            return Vec::new();
        }
        self.focused = true;
        self.debouncer.cancel();
        self.filter = apply_edit(&self.filter, FacetEdit::Text(text.to_string()));
        self.settled_text = self.filter.text.clone();
        self.refresh()
    }

    /// Release the pending timer and invalidate everything in flight.
    pub fn unmount(&mut self) {
        self.debouncer.cancel();
        self.mounted = false;
        self.focused = false;
        self.results_generation = self.next_generation();
        self.suggestions_generation = self.next_generation();
    }

    fn next_generation(&mut self) -> u64 {
        self.generation += 1;
        self.generation
    }

    /// Recompute the request key and issue whatever it requires. Repeats of
    /// the current key are coalesced unless the last attempt failed.
    fn refresh(&mut self) -> Vec<Effect> {
        let key = RequestKey::new(&self.filter, &self.settled_text);
        let mut effects = Vec::new();

        if !QueryComposer::needs_query(&key.to_filter()) {
            if self.current_key.take().is_some() {
                debug!("query cleared; falling back to trending");
                self.results_generation = self.next_generation();
                self.suggestions_generation = self.next_generation();
                self.suggestions = None;
                self.result = Arc::new(SearchResult::default());
            }
            if self.focused { effects.push(Effect::FetchTrending); }
            return effects;
        }

        let same_key = self.current_key.as_ref() == Some(&key);
        if same_key && self.result.error_message.is_none() {
            return effects;
        }

        let text_changed = self.current_key.as_ref().map(|k| k.text.as_str()) != Some(key.text.as_str());
        if text_changed || self.suggestions.is_none() {
            self.suggestions = None;
            self.suggestions_generation = self.next_generation();
            if self.suggester.eligible(&key.text) {
                effects.push(Effect::FetchSuggestions(PendingSuggestions {
                    generation: self.suggestions_generation,
                    text: key.text.clone(),
                }));
            }
        }

        self.results_generation = self.next_generation();
        info!(generation = self.results_generation, key = key.fingerprint(), text = %key.text, "issuing search");
        self.current_key = Some(key.clone());
        self.result = Arc::new(SearchResult::loading());
        effects.insert(0, Effect::FetchResults(PendingQuery { generation: self.results_generation, key }));
        effects
    }

    /// Apply a completed effect. Returns `false` when it was stale and dropped.
    pub fn apply(&mut self, completion: Completion) -> bool {
        if !self.mounted {
            return false;
        }
        match completion {
            Completion::Results { generation, outcome } => {
                if generation != self.results_generation {
                    debug!(generation, current = self.results_generation, "discarding stale search response");
                    return false;
                }
                let next = match outcome {
                    Ok(page) => self.with_suggestions(into_result(page)),
                    Err(e) => SearchResult::failed(format!("Search failed: {e}")),
                };
                self.result = Arc::new(next);
                true
            }
            Completion::Suggestions { generation, set } => {
                if generation != self.suggestions_generation {
                    debug!(generation, current = self.suggestions_generation, "discarding stale suggestions");
                    return false;
                }
                self.suggestions = Some(set);
                if !self.result.loading && self.result.error_message.is_none() {
                    let updated = self.with_suggestions((*self.result).clone());
                    if updated != *self.result {
                        self.result = Arc::new(updated);
                    }
                }
                true
            }
            Completion::Trending(view) => {
                self.trending = Some(view);
                true
            }
        }
    }

    /// Attach suggestions when the settled query matched nothing.
    fn with_suggestions(&self, mut result: SearchResult) -> SearchResult {
        let eligible = result.total_count == 0 && self.current_key.as_ref().is_some_and(|k| self.suggester.eligible(&k.text));
        result.suggestions = match (&self.suggestions, eligible) {
            (Some(set), true) => set.suggestions.clone(),
            _ => Vec::new(),
        };
        result
    }
}
