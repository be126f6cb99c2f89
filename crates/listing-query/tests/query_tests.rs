use async_trait::async_trait;
use proptest::prelude::*;

use listing_core::config::SearchSettings;
use listing_core::error::{Error, Result};
use listing_core::predicate::{sort_listings, Predicate, SortKey};
use listing_core::traits::CatalogClient;
use listing_core::types::{CatalogPage, EntityKind, FilterState, Listing, PriceTier, Season, TrendingRows};
use listing_query::{into_result, partition, resolve_facets, DisplayWindow, QueryComposer, ResolvedFacets};

fn listing(id: &str, name: &str, promoted: bool) -> Listing {
    Listing {
        id: id.to_string(),
        name: name.to_string(),
        slug: id.to_string(),
        description: String::new(),
        category_id: None,
        village_id: None,
        price_tier: PriceTier::MIN,
        season: String::new(),
        tags: vec![],
        features: vec![],
        verified: true,
        promoted,
        photos: vec![],
    }
}

fn run(filter: &FilterState, rows: &[Listing]) -> Vec<Listing> {
    let plan = QueryComposer::new(&SearchSettings::default())
        .compose(filter, &ResolvedFacets::default())
        .expect("plan");
    let mut hits: Vec<Listing> = rows.iter().filter(|l| plan.predicate.matches(l)).cloned().collect();
    sort_listings(&mut hits, &plan.order);
    hits.truncate(plan.limit);
    hits
}

#[test]
fn pottery_scenario_splits_one_promoted_one_organic() {
    let mut a = listing("a", "Old Kiln", true);
    a.description = "Hands-on POTTERY classes".into();
    let mut b = listing("b", "River Studio", false);
    b.tags = vec!["pottery".into()];
    let mut unverified = listing("c", "Pottery Barn", false);
    unverified.verified = false;
    let unrelated = listing("d", "Honey Farm", false);

    let filter = FilterState { text: "pottery".into(), ..FilterState::default() };
    let hits = run(&filter, &[a, b, unverified, unrelated]);
    let total_count = hits.len();
    let result = into_result(CatalogPage { rows: hits, total_count });

    assert_eq!(result.promoted.len(), 1);
    assert_eq!(result.organic.len(), 1);
    assert_eq!(result.promoted[0].id, "a");
    assert_eq!(result.organic[0].id, "b");
}

#[test]
fn summer_matches_month_and_native_tokens() {
    let mut english = listing("e", "Lake Camp", false);
    english.season = "Open in August only".into();
    let mut native = listing("n", "Планинска хижа", false);
    native.season = "Юли".into();
    let mut winter = listing("w", "Ski Lodge", false);
    winter.season = "December to March".into();

    let filter = FilterState { season: Season::Summer, ..FilterState::default() };
    let ids: Vec<_> = run(&filter, &[english, native, winter]).into_iter().map(|l| l.id).collect();
    assert_eq!(ids, vec!["e", "n"]);
}

#[test]
fn rating_filter_returns_whole_verified_catalog() {
    let rows = vec![listing("a", "A", false), listing("b", "B", true)];
    let filter = FilterState { min_rating: listing_core::types::MinRating::Four, ..FilterState::default() };
    assert_eq!(run(&filter, &rows).len(), 2);
}

#[test]
fn display_window_caps_and_expands() {
    let rows: Vec<Listing> = (0..3)
        .map(|i| listing(&format!("p{i}"), "P", true))
        .chain((0..7).map(|i| listing(&format!("o{i}"), "O", false)))
        .collect();
    let result = into_result(CatalogPage { rows, total_count: 10 });
    let window = DisplayWindow::default();
    let (p, o) = window.visible(&result, false);
    assert_eq!((p.len(), o.len()), (2, 4));
    let (_, o) = window.visible(&result, true);
    assert_eq!(o.len(), 7);
}

struct Directory;

#[async_trait]
impl CatalogClient for Directory {
    async fn filtered_search(&self, _: &Predicate, _: &[SortKey], _: usize) -> Result<CatalogPage> {
        Ok(CatalogPage::default())
    }
    async fn lookup_by_prefix(&self, _: EntityKind, _: &str, _: usize) -> Result<Vec<String>> { Ok(vec![]) }
    async fn trending_snapshot(&self) -> Result<TrendingRows> { Ok(TrendingRows::default()) }
    async fn resolve_name(&self, namespace: EntityKind, name: &str) -> Result<Option<String>> {
        match (namespace, name.to_lowercase().as_str()) {
            (EntityKind::Category, "crafts") => Ok(Some("c1".into())),
            (EntityKind::Village, _) => Err(Error::Query("village table offline".into())),
            _ => Ok(None),
        }
    }
}

#[tokio::test]
async fn resolution_is_lenient() {
    let filter = FilterState {
        category: Some("CRAFTS".into()),
        village: Some("Melnik".into()),
        ..FilterState::default()
    };
    let resolved = resolve_facets(&Directory, &filter).await;
    assert_eq!(resolved.category_id.as_deref(), Some("c1"));
    assert_eq!(resolved.village_id, None);

    let missing = FilterState { category: Some("Unknown".into()), ..FilterState::default() };
    assert_eq!(resolve_facets(&Directory, &missing).await, ResolvedFacets::default());
}

proptest! {
    #[test]
    fn partition_is_disjoint_and_order_preserving(flags in proptest::collection::vec(any::<bool>(), 0..40)) {
        let rows: Vec<Listing> = flags.iter().enumerate().map(|(i, p)| listing(&i.to_string(), "x", *p)).collect();
        let part = partition(rows.clone());
        prop_assert!(part.promoted.iter().all(|l| l.promoted));
        prop_assert!(part.organic.iter().all(|l| !l.promoted));
        prop_assert_eq!(part.promoted.len() + part.organic.len(), rows.len());
        let expected: Vec<_> = rows.iter().filter(|l| l.promoted).map(|l| l.id.clone()).collect();
        prop_assert_eq!(part.promoted.iter().map(|l| l.id.clone()).collect::<Vec<_>>(), expected);
    }
}
