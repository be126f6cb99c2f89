//! listing-session
//!
//! The live search bar: a synchronous [`SearchSession`] state machine that
//! emits [`Effect`]s, and a [`SessionDriver`] that performs them against the
//! catalog and feeds [`Completion`]s back.

pub mod debounce;
pub mod driver;
pub mod session;
pub mod suggest;
pub mod trending;

pub use debounce::Debouncer;
pub use driver::SessionDriver;
pub use session::{Completion, Effect, PendingQuery, PendingSuggestions, Phase, SearchSession, View};
pub use suggest::{Lookup, SuggestionGenerator, SuggestionSet};
pub use trending::{TrendingAggregator, TrendingView};
