use listing_core::config::DisplaySettings;
use listing_core::types::{CatalogPage, Listing, SearchResult};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Partition {
    pub promoted: Vec<Listing>,
    pub organic: Vec<Listing>,
}

/// Split by the promoted flag, keeping the incoming order inside each half.
pub fn partition(rows: Vec<Listing>) -> Partition {
    let (promoted, organic): (Vec<Listing>, Vec<Listing>) = rows.into_iter().partition(|l| l.promoted);
    Partition { promoted, organic }
}

/// Settled (non-loading) result for one catalog page.
pub fn into_result(page: CatalogPage) -> SearchResult {
    let Partition { promoted, organic } = partition(page.rows);
    SearchResult { organic, promoted, total_count: page.total_count, ..SearchResult::default() }
}

/// How much of a result the search bar shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayWindow {
    pub promoted: usize,
    pub organic: usize,
}

impl Default for DisplayWindow {
    fn default() -> Self { Self::from(DisplaySettings::default()) }
}

impl From<DisplaySettings> for DisplayWindow {
    fn from(s: DisplaySettings) -> Self { Self { promoted: s.promoted, organic: s.organic } }
}

impl DisplayWindow {
    /// `(promoted, organic)` slices to render. `show_all` widens organic to
    /// `total_count`, bounded by what was actually fetched.
    pub fn visible<'a>(&self, result: &'a SearchResult, show_all: bool) -> (&'a [Listing], &'a [Listing]) {
        let organic_cap = if show_all { result.total_count } else { self.organic };
        let promoted = &result.promoted[..self.promoted.min(result.promoted.len())];
        let organic = &result.organic[..organic_cap.min(result.organic.len())];
        (promoted, organic)
    }
}
