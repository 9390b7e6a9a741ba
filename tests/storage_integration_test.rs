mod common;

use common::{fixture_path, seed_abc};
use donor_roster::{
    config::{RosterConfig, StateBackend, StateConfig},
    models::{DonorProfile, PageRequest, SortField, SortSpec},
    roster::{RosterService, SearchPredicate},
    state::{create_store, DonorStore, DonorWriter, InMemoryStore, SledStore, StoreError},
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tempfile::TempDir;

/// Test suite that runs against any store implementation
async fn test_store_operations<S: DonorStore + DonorWriter>(store: &S) {
    seed_abc(store).await;

    // Primary fetch returns every donor with a matching count
    let all = store.fetch_primary(&SearchPredicate::MatchAll).await.unwrap();
    assert_eq!(all.matched_count, 3);
    assert_eq!(all.records.len(), 3);

    // Filtered fetch is case-insensitive
    let filtered = store
        .fetch_primary(&SearchPredicate::from_query(Some("C@X.COM")))
        .await
        .unwrap();
    assert_eq!(filtered.matched_count, 1);
    assert_eq!(filtered.records[0].id, "c");

    // Keyed lookups omit ids without rows
    let ids: Vec<String> = ["a", "b", "c", "missing"].iter().map(|s| s.to_string()).collect();
    let counts = store.fetch_counts(&ids).await.unwrap();
    assert_eq!(counts.len(), 2);
    assert_eq!(counts["b"], 2);
    assert_eq!(counts["c"], 5);

    let totals = store.fetch_totals(&ids).await.unwrap();
    assert_eq!(totals.len(), 2);
    assert_eq!(totals["c"], Decimal::new(7550, 2));

    // Updating a donor keeps one row per id
    let renamed = DonorProfile::with_id("a", "a@x.com").with_name("Ann", "Archer");
    store.upsert_donor(&renamed).await.unwrap();
    let all = store.fetch_primary(&SearchPredicate::MatchAll).await.unwrap();
    assert_eq!(all.matched_count, 3);
    let a = all.records.iter().find(|p| p.id == "a").unwrap();
    assert_eq!(a.first_name.as_deref(), Some("Ann"));

    // Email stays unique
    let clash = store
        .upsert_donor(&DonorProfile::with_id("d", "b@x.com"))
        .await;
    assert!(matches!(clash, Err(StoreError::Conflict(_))));

    // Removing a donor drops its statistics
    store.remove_donor("c").await.unwrap();
    let all = store.fetch_primary(&SearchPredicate::MatchAll).await.unwrap();
    assert_eq!(all.matched_count, 2);
    let counts = store.fetch_counts(&ids).await.unwrap();
    assert!(!counts.contains_key("c"));
}

#[tokio::test]
async fn test_in_memory_store() {
    let store = InMemoryStore::new();
    test_store_operations(&store).await;
}

#[tokio::test]
async fn test_sled_store() {
    let temp_dir = TempDir::new().unwrap();
    let store = SledStore::new(temp_dir.path()).unwrap();
    test_store_operations(&store).await;
}

#[tokio::test]
async fn test_stores_agree_on_roster_pages() {
    let temp_dir = TempDir::new().unwrap();
    let sled = SledStore::new(temp_dir.path()).unwrap();
    let memory = InMemoryStore::new();
    seed_abc(&sled).await;
    seed_abc(&memory).await;

    let sled_service = RosterService::new(Arc::new(sled), RosterConfig::default());
    let memory_service = RosterService::new(Arc::new(memory), RosterConfig::default());

    for field in SortField::ALL {
        let request = PageRequest::new(1, 2).with_sort(SortSpec::asc(field));
        let from_sled = sled_service.get_donor_page(&request).await.unwrap();
        let from_memory = memory_service.get_donor_page(&request).await.unwrap();

        let sled_ids: Vec<&str> = from_sled.items.iter().map(|r| r.id()).collect();
        let memory_ids: Vec<&str> = from_memory.items.iter().map(|r| r.id()).collect();
        assert_eq!(sled_ids, memory_ids, "{}", field);
        assert_eq!(from_sled.total_count, from_memory.total_count);
    }
}

#[tokio::test]
async fn test_seeded_sled_store_survives_restart() {
    let temp_dir = TempDir::new().unwrap();
    let config = StateConfig {
        backend: StateBackend::Sled,
        path: Some(temp_dir.path().join("roster")),
        seed_file: Some(fixture_path()),
    };

    {
        let store = create_store(&config).await.unwrap();
        let fetch = store.fetch_primary(&SearchPredicate::MatchAll).await.unwrap();
        assert_eq!(fetch.matched_count, 5);
    }

    let reopened = SledStore::new(temp_dir.path().join("roster")).unwrap();
    let fetch = reopened
        .fetch_primary(&SearchPredicate::from_query(Some("hopper")))
        .await
        .unwrap();
    assert_eq!(fetch.matched_count, 1);

    let totals = reopened
        .fetch_totals(&[fetch.records[0].id.clone()])
        .await
        .unwrap();
    assert_eq!(totals.values().next(), Some(&Decimal::new(30050, 2)));
}
