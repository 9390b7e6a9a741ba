//! Shared fixtures for the integration tests

#![allow(dead_code)]

use donor_roster::{
    config::RosterConfig,
    models::DonorProfile,
    roster::RosterService,
    state::{DonorWriter, InMemoryStore},
};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

/// Path of the sample seed fixture shipped with the crate
pub fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("fixtures/donors.json")
}

/// Write the three-donor roster used throughout the tests:
/// A has no statistics, B has 2 pledges totalling 150.00, C has 5 totalling 75.50
pub async fn seed_abc<W: DonorWriter + ?Sized>(writer: &W) {
    for id in ["a", "b", "c"] {
        writer
            .upsert_donor(&DonorProfile::with_id(id, format!("{}@x.com", id)))
            .await
            .unwrap();
    }
    writer.set_pledge_count("b", 2).await.unwrap();
    writer
        .set_pledge_total("b", Decimal::new(15000, 2))
        .await
        .unwrap();
    writer.set_pledge_count("c", 5).await.unwrap();
    writer
        .set_pledge_total("c", Decimal::new(7550, 2))
        .await
        .unwrap();
}

pub async fn abc_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    seed_abc(&store).await;
    store
}

pub fn service_for(store: InMemoryStore) -> RosterService {
    RosterService::new(Arc::new(store), RosterConfig::default())
}

/// Helper function to parse Prometheus exposition format
/// Returns a map of metric name to its HELP/TYPE and sample lines
pub fn parse_prometheus_output(output: &str) -> HashMap<String, Vec<String>> {
    let mut metrics = HashMap::new();
    let mut current_metric = String::new();

    for line in output.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("# HELP") || line.starts_with("# TYPE") {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() >= 3 {
                current_metric = parts[2].to_string();
                metrics
                    .entry(current_metric.clone())
                    .or_insert_with(Vec::new)
                    .push(line.to_string());
            }
        } else if !line.starts_with('#') && !current_metric.is_empty() {
            metrics
                .entry(current_metric.clone())
                .or_insert_with(Vec::new)
                .push(line.to_string());
        }
    }

    metrics
}
