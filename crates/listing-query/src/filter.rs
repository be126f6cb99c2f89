use listing_core::types::{FilterState, MinRating, PriceRange, Season};

/// One change to the search bar's facets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetEdit {
    Text(String),
    Category(Option<String>),
    Village(Option<String>),
    Price(PriceRange),
    MinRating(MinRating),
    Season(Season),
    VerifiedOnly(bool),
    /// Resets every facet except the text.
    ClearAll,
}

impl FacetEdit {
    pub fn is_text(&self) -> bool { matches!(self, FacetEdit::Text(_)) }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Returns the state after `edit`. Blank names and the full price window
/// are stored as "unset".
pub fn apply_edit(filter: &FilterState, edit: FacetEdit) -> FilterState {
    let mut next = filter.clone();
    match edit {
        FacetEdit::Text(text) => next.text = text,
        FacetEdit::Category(name) => next.category = non_blank(name),
        FacetEdit::Village(name) => next.village = non_blank(name),
        FacetEdit::Price(range) => next.price = (!range.is_full()).then_some(range),
        FacetEdit::MinRating(rating) => next.min_rating = rating,
        FacetEdit::Season(season) => next.season = season,
        FacetEdit::VerifiedOnly(flag) => next.verified_only = flag,
        FacetEdit::ClearAll => next = FilterState { text: filter.text.clone(), ..FilterState::default() },
    }
    next
}

/// Query-string encoding handed to navigation. Default facets are omitted.
pub fn encode_filters(filter: &FilterState) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    let text = filter.text.trim();
    if !text.is_empty() { pairs.push(("text", text.to_string())); }
    if let Some(c) = &filter.category { pairs.push(("category", c.clone())); }
    if let Some(v) = &filter.village { pairs.push(("village", v.clone())); }
    if filter.min_rating != MinRating::Any { pairs.push(("rating", filter.min_rating.value().to_string())); }
    if filter.season != Season::Any { pairs.push(("season", filter.season.as_str().to_string())); }
    if let Some(range) = filter.price.filter(|r| !r.is_full()) { pairs.push(("priceRange", range.to_string())); }
    pairs
        .into_iter()
        .map(|(k, v)| format!("{}={}", k, urlencoding::encode(&v)))
        .collect::<Vec<_>>()
        .join("&")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_price_window_is_stored_as_unset() {
        let f = apply_edit(&FilterState::default(), FacetEdit::Price(PriceRange::full()));
        assert_eq!(f.price, None);
        let f = apply_edit(&f, FacetEdit::Price(PriceRange::new(2, 3).unwrap()));
        assert_eq!(f.price, Some(PriceRange::new(2, 3).unwrap()));
    }

    #[test]
    fn blank_category_clears_the_facet() {
        let f = apply_edit(&FilterState::default(), FacetEdit::Category(Some("Crafts".into())));
        assert_eq!(f.category.as_deref(), Some("Crafts"));
        let f = apply_edit(&f, FacetEdit::Category(Some("  ".into())));
        assert_eq!(f.category, None);
    }

    #[test]
    fn clear_all_keeps_text() {
        let f = FilterState {
            text: "honey".into(),
            season: Season::Summer,
            min_rating: MinRating::Five,
            ..FilterState::default()
        };
        let cleared = apply_edit(&f, FacetEdit::ClearAll);
        assert_eq!(cleared.text, "honey");
        assert_eq!(cleared.active_facet_count(), 0);
    }

    #[test]
    fn encoding_orders_keys_and_escapes_values() {
        let f = FilterState {
            text: " wine tasting ".into(),
            village: Some("Melnik".into()),
            min_rating: MinRating::Four,
            season: Season::SpringFall,
            price: Some(PriceRange::new(1, 2).unwrap()),
            ..FilterState::default()
        };
        assert_eq!(encode_filters(&f), "text=wine%20tasting&village=Melnik&rating=4&season=spring-fall&priceRange=1-2");
        assert_eq!(encode_filters(&FilterState::default()), "");
    }
}
