use std::fs;
use tempfile::TempDir;

use listing_core::fixtures::CatalogSnapshot;

const ONE: &str = r#"{
  "listings": [
    {"id": "l1", "name": "Clay House", "slug": "clay-house", "price_tier": 2, "verified": true, "tags": ["pottery"]}
  ],
  "categories": [{"id": "c1", "name": "Crafts", "slug": "crafts"}]
}"#;

const TWO: &str = r#"{
  "listings": [
    {"id": "l1", "name": "Duplicate", "slug": "dup", "price_tier": 1},
    {"id": "l2", "name": "Hill Winery", "slug": "hill-winery", "price_tier": 4, "promoted": true}
  ],
  "villages": [{"id": "v1", "name": "Zheravna", "slug": "zheravna"}]
}"#;

#[test]
fn load_file_fills_missing_fields_with_defaults() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("catalog.json");
    fs::write(&path, ONE).unwrap();

    let snap = CatalogSnapshot::load(&path).expect("load");
    assert_eq!(snap.listings.len(), 1);
    assert!(snap.listings[0].features.is_empty());
    assert!(!snap.listings[0].promoted);
    assert_eq!(snap.categories[0].name, "Crafts");
}

#[test]
fn load_dir_merges_and_keeps_first_id() {
    let tmp = TempDir::new().unwrap();
    fs::create_dir(tmp.path().join("nested")).unwrap();
    fs::write(tmp.path().join("a.json"), ONE).unwrap();
    fs::write(tmp.path().join("nested/b.json"), TWO).unwrap();
    fs::write(tmp.path().join("notes.txt"), "ignored").unwrap();

    let snap = CatalogSnapshot::load(tmp.path()).expect("load dir");
    let names: Vec<_> = snap.listings.iter().map(|l| l.name.as_str()).collect();
    assert_eq!(names, vec!["Clay House", "Hill Winery"]);
    assert_eq!(snap.villages.len(), 1);
}

#[test]
fn out_of_range_price_tier_is_a_parse_error() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("bad.json");
    fs::write(&path, r#"{"listings": [{"id": "x", "name": "X", "slug": "x", "price_tier": 9}]}"#).unwrap();
    assert!(CatalogSnapshot::load(&path).is_err());
}
