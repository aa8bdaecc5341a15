//! End-to-end scenarios over small product catalogs.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use standout_query::{Constraint, Pipeline, PipelineEvent, ScanPath};

#[derive(Debug, Clone, PartialEq)]
struct Product {
    id: usize,
    name: String,
    price: u32,
    tags: Vec<String>,
}

fn priced(prices: &[u32]) -> Vec<Product> {
    prices
        .iter()
        .enumerate()
        .map(|(id, &price)| Product {
            id,
            name: format!("Product {id}"),
            price,
            tags: Vec::new(),
        })
        .collect()
}

fn named(names: &[&str]) -> Vec<Product> {
    names
        .iter()
        .enumerate()
        .map(|(id, name)| Product {
            id,
            name: name.to_string(),
            price: 0,
            tags: Vec::new(),
        })
        .collect()
}

fn tagged(tags: &[&[&str]]) -> Vec<Product> {
    tags.iter()
        .enumerate()
        .map(|(id, tags)| Product {
            id,
            name: format!("Product {id}"),
            price: 0,
            tags: tags.iter().map(|t| t.to_string()).collect(),
        })
        .collect()
}

fn prices(results: &[&Product]) -> Vec<u32> {
    results.iter().map(|p| p.price).collect()
}

fn ids(results: &[&Product]) -> Vec<usize> {
    results.iter().map(|p| p.id).collect()
}

fn search_by_name(p: &Product) -> [String; 1] {
    [p.name.clone()]
}

#[tokio::test]
async fn cheap_products_sorted_ascending() {
    let items = priced(&[10, 200, 50]);
    let pipeline = Pipeline::builder(search_by_name)
        .constraint(Constraint::lt(100, |p: &Product| p.price))
        .sort_by(|p: &Product| p.price)
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(prices(&results), vec![10, 50]);
}

#[tokio::test]
async fn top_two_by_price_descending() {
    let items = priced(&[10, 200, 50]);
    let pipeline = Pipeline::builder(search_by_name)
        .sort_by(|p: &Product| p.price)
        .descending()
        .limit(2)
        .offset(0)
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(prices(&results), vec![200, 50]);
}

#[tokio::test]
async fn search_matches_name_substring() {
    let items = named(&["Red Shoe", "Blue Hat"]);
    let pipeline = Pipeline::builder(search_by_name)
        .search("shoe")
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].name, "Red Shoe");
}

#[tokio::test]
async fn contains_any_matches_tagged_items() {
    let items = tagged(&[&["sale"], &["new"], &["sale", "new"]]);
    let pipeline = Pipeline::builder(search_by_name)
        .constraint(Constraint::contains_any(
            ["sale".to_string()],
            |p: &Product| p.tags.clone(),
        ))
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(ids(&results), vec![0, 2]);
}

#[tokio::test]
async fn contains_requires_the_single_value() {
    let items = tagged(&[&["sale"], &["new"], &["sale", "new"]]);
    let pipeline = Pipeline::builder(search_by_name)
        .constraint(Constraint::contains("new".to_string(), |p: &Product| {
            p.tags.clone()
        }))
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(ids(&results), vec![1, 2]);
}

#[tokio::test]
async fn fast_path_stops_once_page_is_full() {
    let items = priced(&vec![1; 10_000]);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let pipeline = Pipeline::builder(search_by_name)
        .constraint(Constraint::custom(move |p: &Product| {
            counter.fetch_add(1, Ordering::SeqCst);
            p.id < 5
        }))
        .limit(5)
        .build()
        .unwrap();
    assert_eq!(pipeline.scan_path(), ScanPath::Fast);

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(ids(&results), vec![0, 1, 2, 3, 4]);
    assert!(calls.load(Ordering::SeqCst) <= 5 + 1);
}

#[tokio::test]
async fn fast_path_skips_offset_then_stops() {
    let items = priced(&vec![1; 10_000]);
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let pipeline = Pipeline::builder(search_by_name)
        .constraint(Constraint::custom(move |_: &Product| {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        }))
        .offset(7)
        .limit(3)
        .build()
        .unwrap();
    assert_eq!(pipeline.scan_path(), ScanPath::Fast);

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(ids(&results), vec![7, 8, 9]);
    assert_eq!(calls.load(Ordering::SeqCst), 7 + 3);
}

#[tokio::test]
async fn large_scan_yields_at_fixed_cadence() {
    let items = priced(&vec![1; 2_000]);
    let yields = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&yields);

    let pipeline = Pipeline::builder(search_by_name)
        .observer(move |event| {
            if matches!(event, PipelineEvent::Yielded { .. }) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        })
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(results.len(), 2_000);
    // at items 500, 1000 and 1500
    assert_eq!(yields.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn nested_compound_tree() {
    let items = vec![
        Product {
            id: 0,
            name: "Red Shoe".into(),
            price: 40,
            tags: vec!["sale".into()],
        },
        Product {
            id: 1,
            name: "Blue Shoe".into(),
            price: 140,
            tags: vec!["sale".into()],
        },
        Product {
            id: 2,
            name: "Red Hat".into(),
            price: 20,
            tags: vec!["new".into()],
        },
        Product {
            id: 3,
            name: "Gold Hat".into(),
            price: 900,
            tags: vec![],
        },
    ];

    // (price in [0, 100] OR tagged sale) AND NOT name ends with "Hat"
    let tree = Constraint::and(vec![
        Constraint::or(vec![
            Constraint::range(0, 100, |p: &Product| p.price).unwrap(),
            Constraint::contains("sale".to_string(), |p: &Product| p.tags.clone()),
        ])
        .unwrap(),
        Constraint::not(Constraint::pattern("Hat$", |p: &Product| p.name.clone()).unwrap()),
    ])
    .unwrap();

    let pipeline = Pipeline::builder(search_by_name)
        .constraint(tree)
        .sort_by(|p: &Product| p.price)
        .descending()
        .build()
        .unwrap();

    let results = pipeline.filter_and_sort(&items).await.unwrap();
    assert_eq!(ids(&results), vec![1, 0]);
}

#[tokio::test]
async fn input_is_left_untouched() {
    let items = priced(&[30, 10, 20]);
    let snapshot = items.clone();
    let pipeline = Pipeline::builder(search_by_name)
        .sort_by(|p: &Product| p.price)
        .build()
        .unwrap();

    let owned = pipeline.filter_and_sort_cloned(&items).await.unwrap();
    assert_eq!(owned.iter().map(|p| p.price).collect::<Vec<_>>(), vec![10, 20, 30]);
    assert_eq!(items, snapshot);
}
