//! Domain types shared by the composer, the catalog and the session.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;
use twox_hash::XxHash64;

use crate::error::{Error, Result};

pub type ListingId = String;

/// Ordinal price tier, always within `1..=4`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PriceTier(u8);

impl PriceTier {
    pub const MIN: PriceTier = PriceTier(1);
    pub const MAX: PriceTier = PriceTier(4);

    pub fn new(value: u8) -> Result<Self> {
        if (Self::MIN.0..=Self::MAX.0).contains(&value) {
            Ok(Self(value))
        } else {
            Err(Error::InvalidFacet(format!("price tier {value} outside 1..=4")))
        }
    }

    pub fn get(self) -> u8 { self.0 }

    /// Rendered form, one currency glyph per tier step.
    pub fn glyphs(self) -> String { "€".repeat(usize::from(self.0)) }
}

impl TryFrom<u8> for PriceTier {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self> { Self::new(value) }
}

impl From<PriceTier> for u8 {
    fn from(tier: PriceTier) -> u8 { tier.0 }
}

/// Inclusive price window. Only narrower-than-full windows are kept on a
/// [`FilterState`]; the full window is represented by `None`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PriceRange {
    lo: PriceTier,
    hi: PriceTier,
}

impl PriceRange {
    pub fn new(lo: u8, hi: u8) -> Result<Self> {
        let (lo, hi) = (PriceTier::new(lo)?, PriceTier::new(hi)?);
        if lo > hi {
            return Err(Error::InvalidFacet(format!("price range {}-{} is inverted", lo.0, hi.0)));
        }
        Ok(Self { lo, hi })
    }

    pub fn full() -> Self { Self { lo: PriceTier::MIN, hi: PriceTier::MAX } }

    pub fn lo(&self) -> PriceTier { self.lo }
    pub fn hi(&self) -> PriceTier { self.hi }

    pub fn is_full(&self) -> bool { self.lo == PriceTier::MIN && self.hi == PriceTier::MAX }

    /// Every tier inside the window, ascending.
    pub fn tiers(&self) -> Vec<PriceTier> {
        (self.lo.0..=self.hi.0).map(PriceTier).collect()
    }
}

impl fmt::Display for PriceRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "{}-{}", self.lo.0, self.hi.0) }
}

impl FromStr for PriceRange {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        let (lo, hi) = s
            .split_once('-')
            .ok_or_else(|| Error::InvalidFacet(format!("price range '{s}' is not lo-hi")))?;
        let parse = |v: &str| v.trim().parse::<u8>().map_err(|_| Error::InvalidFacet(format!("price range '{s}' is not numeric")));
        Self::new(parse(lo)?, parse(hi)?)
    }
}

/// Minimum rating facet. Accepted and counted as active, but listings carry
/// no rating so the composer never turns it into a predicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum MinRating {
    #[default]
    Any,
    Three,
    Four,
    Five,
}

impl MinRating {
    pub fn value(self) -> u8 {
        match self {
            MinRating::Any => 0,
            MinRating::Three => 3,
            MinRating::Four => 4,
            MinRating::Five => 5,
        }
    }
}

impl TryFrom<u8> for MinRating {
    type Error = Error;
    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(MinRating::Any),
            3 => Ok(MinRating::Three),
            4 => Ok(MinRating::Four),
            5 => Ok(MinRating::Five),
            other => Err(Error::InvalidFacet(format!("rating {other} not one of 0, 3, 4, 5"))),
        }
    }
}

impl From<MinRating> for u8 {
    fn from(r: MinRating) -> u8 { r.value() }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Season {
    #[default]
    Any,
    YearRound,
    Summer,
    SpringFall,
}

impl Season {
    pub fn as_str(self) -> &'static str {
        match self {
            Season::Any => "any",
            Season::YearRound => "year-round",
            Season::Summer => "summer",
            Season::SpringFall => "spring-fall",
        }
    }
}

impl FromStr for Season {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "" | "any" => Ok(Season::Any),
            "year-round" => Ok(Season::YearRound),
            "summer" => Ok(Season::Summer),
            "spring-fall" => Ok(Season::SpringFall),
            other => Err(Error::InvalidFacet(format!("unknown season '{other}'"))),
        }
    }
}

/// A catalog entry. Category and village are held by reference only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Listing {
    pub id: ListingId,
    pub name: String,
    pub slug: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category_id: Option<String>,
    #[serde(default)]
    pub village_id: Option<String>,
    pub price_tier: PriceTier,
    #[serde(default)]
    pub season: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub verified: bool,
    #[serde(default)]
    pub promoted: bool,
    #[serde(default)]
    pub photos: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub slug: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Village {
    pub id: String,
    pub name: String,
    pub slug: String,
}

/// Lookup namespace for suggestions and name resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Listing,
    Category,
    Village,
}

impl EntityKind {
    pub fn as_str(self) -> &'static str {
        match self {
            EntityKind::Listing => "listing",
            EntityKind::Category => "category",
            EntityKind::Village => "village",
        }
    }
}

/// The facets currently set on the search bar. `text` is the raw, undebounced
/// value; sessions pair it with the settled text when deriving a [`RequestKey`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterState {
    pub text: String,
    pub category: Option<String>,
    pub village: Option<String>,
    pub price: Option<PriceRange>,
    pub min_rating: MinRating,
    pub season: Season,
    pub verified_only: bool,
}

impl FilterState {
    /// Number of non-text facets deviating from their neutral value.
    pub fn active_facet_count(&self) -> usize {
        [
            self.category.is_some(),
            self.village.is_some(),
            self.price.is_some_and(|p| !p.is_full()),
            self.min_rating != MinRating::Any,
            self.season != Season::Any,
            self.verified_only,
        ]
        .into_iter()
        .filter(|active| *active)
        .count()
    }

    pub fn has_active_facets(&self) -> bool { self.active_facet_count() > 0 }
}

/// Identity of one query: every facet, with the settled text in place of the
/// raw keystrokes.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub text: String,
    pub category: Option<String>,
    pub village: Option<String>,
    pub price: Option<PriceRange>,
    pub min_rating: MinRating,
    pub season: Season,
    pub verified_only: bool,
}

impl RequestKey {
    pub fn new(filter: &FilterState, settled_text: &str) -> Self {
        Self {
            text: settled_text.trim().to_string(),
            category: filter.category.clone(),
            village: filter.village.clone(),
            price: filter.price,
            min_rating: filter.min_rating,
            season: filter.season,
            verified_only: filter.verified_only,
        }
    }

    /// Filter state this key was derived from, with the settled text.
    pub fn to_filter(&self) -> FilterState {
        FilterState {
            text: self.text.clone(),
            category: self.category.clone(),
            village: self.village.clone(),
            price: self.price,
            min_rating: self.min_rating,
            season: self.season,
            verified_only: self.verified_only,
        }
    }

    /// Stable 64-bit digest, used to correlate log lines.
    pub fn fingerprint(&self) -> u64 {
        let mut hasher = XxHash64::with_seed(0);
        self.hash(&mut hasher);
        hasher.finish()
    }
}

/// The single read model published to the rendering layer. Replaced
/// wholesale on every change, never patched.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SearchResult {
    pub organic: Vec<Listing>,
    pub promoted: Vec<Listing>,
    pub total_count: usize,
    pub loading: bool,
    pub error_message: Option<String>,
    pub suggestions: Vec<String>,
}

impl SearchResult {
    pub fn loading() -> Self { Self { loading: true, ..Self::default() } }

    pub fn failed(message: impl Into<String>) -> Self {
        Self { error_message: Some(message.into()), ..Self::default() }
    }
}

/// Rows returned by a filtered search. `total_count` may exceed `rows.len()`
/// when the row limit truncated the match set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogPage {
    pub rows: Vec<Listing>,
    pub total_count: usize,
}

/// Raw material for the trending view, before caps are applied.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrendingRows {
    pub promoted_listings: Vec<Listing>,
    pub categories: Vec<Category>,
    pub villages: Vec<Village>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn price_tier_rejects_out_of_domain() {
        assert!(PriceTier::new(0).is_err());
        assert!(PriceTier::new(5).is_err());
        assert_eq!(PriceTier::new(3).unwrap().glyphs(), "€€€");
    }

    #[test]
    fn price_range_parses_and_expands() {
        let r: PriceRange = "2-3".parse().unwrap();
        assert_eq!(r.tiers().iter().map(|t| t.get()).collect::<Vec<_>>(), vec![2, 3]);
        assert_eq!(r.to_string(), "2-3");
        assert!(PriceRange::new(4, 1).is_err());
        assert!(PriceRange::full().is_full());
    }

    #[test]
    fn rating_only_accepts_known_steps() {
        assert_eq!(MinRating::try_from(4).unwrap(), MinRating::Four);
        assert!(MinRating::try_from(2).is_err());
    }

    #[test]
    fn active_facets_ignore_text() {
        let mut f = FilterState { text: "pottery".into(), ..FilterState::default() };
        assert_eq!(f.active_facet_count(), 0);
        f.min_rating = MinRating::Four;
        f.season = Season::Summer;
        assert_eq!(f.active_facet_count(), 2);
    }

    #[test]
    fn request_key_uses_settled_text() {
        let f = FilterState { text: "potte".into(), ..FilterState::default() };
        let a = RequestKey::new(&f, " pottery ");
        assert_eq!(a.text, "pottery");
        let b = RequestKey::new(&FilterState::default(), "pottery");
        assert_eq!(a, b);
        assert_eq!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn season_round_trips_through_serde_names() {
        let json = serde_json::to_string(&Season::SpringFall).unwrap();
        assert_eq!(json, "\"spring-fall\"");
        assert_eq!("Year-Round".parse::<Season>().unwrap(), Season::YearRound);
    }
}
