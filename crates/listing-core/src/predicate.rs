//! Catalog query predicates and the fixed result ordering.
//!
//! A [`Predicate`] is a small boolean tree over listing fields. Catalog
//! backends may translate it into their own query language; [`Predicate::matches`]
//! is the reference evaluation used by in-process catalogs and tests.

use std::cmp::Ordering;

use crate::types::{Listing, PriceTier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Name,
    Description,
    Tags,
    Features,
    Season,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    /// Case-insensitive substring match; `needle` is stored lowercased.
    Contains { field: TextField, needle: String },
    CategoryIs(String),
    VillageIs(String),
    PriceTierIn(Vec<PriceTier>),
    Verified(bool),
}

impl Predicate {
    pub fn contains(field: TextField, needle: &str) -> Self {
        Predicate::Contains { field, needle: needle.to_lowercase() }
    }

    pub fn matches(&self, listing: &Listing) -> bool {
        match self {
            Predicate::And(parts) => parts.iter().all(|p| p.matches(listing)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(listing)),
            Predicate::Contains { field, needle } => field_contains(listing, *field, needle),
            Predicate::CategoryIs(id) => listing.category_id.as_deref() == Some(id.as_str()),
            Predicate::VillageIs(id) => listing.village_id.as_deref() == Some(id.as_str()),
            Predicate::PriceTierIn(tiers) => tiers.contains(&listing.price_tier),
            Predicate::Verified(flag) => listing.verified == *flag,
        }
    }
}

fn field_contains(listing: &Listing, field: TextField, needle: &str) -> bool {
    let hit = |s: &str| s.to_lowercase().contains(needle);
    match field {
        TextField::Name => hit(&listing.name),
        TextField::Description => hit(&listing.description),
        TextField::Tags => listing.tags.iter().any(|t| hit(t)),
        TextField::Features => listing.features.iter().any(|f| hit(f)),
        TextField::Season => hit(&listing.season),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    PromotedDesc,
    VerifiedDesc,
    NameAsc,
}

impl SortKey {
    pub fn compare(self, a: &Listing, b: &Listing) -> Ordering {
        match self {
            SortKey::PromotedDesc => b.promoted.cmp(&a.promoted),
            SortKey::VerifiedDesc => b.verified.cmp(&a.verified),
            SortKey::NameAsc => a.name.to_lowercase().cmp(&b.name.to_lowercase()).then_with(|| a.name.cmp(&b.name)),
        }
    }
}

/// Stable multi-key sort; earlier keys dominate.
pub fn sort_listings(rows: &mut [Listing], order: &[SortKey]) {
    rows.sort_by(|a, b| {
        order
            .iter()
            .map(|k| k.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    });
}

/// A fully composed catalog request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryPlan {
    pub predicate: Predicate,
    pub order: Vec<SortKey>,
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(name: &str, promoted: bool, verified: bool) -> Listing {
        Listing {
            id: name.to_lowercase(),
            name: name.to_string(),
            slug: name.to_lowercase(),
            description: String::new(),
            category_id: Some("c1".into()),
            village_id: None,
            price_tier: PriceTier::MIN,
            season: "June to August".into(),
            tags: vec!["Clay".into()],
            features: vec![],
            verified,
            promoted,
            photos: vec![],
        }
    }

    #[test]
    fn contains_is_case_insensitive_across_list_fields() {
        let l = listing("Studio", false, true);
        assert!(Predicate::contains(TextField::Tags, "CLAY").matches(&l));
        assert!(Predicate::contains(TextField::Season, "august").matches(&l));
        assert!(!Predicate::contains(TextField::Features, "clay").matches(&l));
    }

    #[test]
    fn reference_predicates_compare_ids() {
        let l = listing("Studio", false, true);
        assert!(Predicate::CategoryIs("c1".into()).matches(&l));
        assert!(!Predicate::VillageIs("v1".into()).matches(&l));
        assert!(Predicate::And(vec![]).matches(&l));
        assert!(!Predicate::Or(vec![]).matches(&l));
    }

    #[test]
    fn ordering_is_promoted_then_verified_then_name() {
        let mut rows = vec![
            listing("beta", false, true),
            listing("Alpha", false, false),
            listing("gamma", true, false),
            listing("alpha", false, true),
        ];
        sort_listings(&mut rows, &[SortKey::PromotedDesc, SortKey::VerifiedDesc, SortKey::NameAsc]);
        let names: Vec<_> = rows.iter().map(|l| l.name.as_str()).collect();
        assert_eq!(names, vec!["gamma", "alpha", "beta", "Alpha"]);
    }
}
