pub mod store;
pub mod sled_store;
pub mod factory;
pub mod seed;

pub use store::*;
pub use sled_store::SledStore;
pub use factory::{create_store, create_in_memory_store};
pub use seed::{load_seed, load_seed_file, RosterSeed, SeedReport};

use crate::models::{DonorId, DonorProfile};
use crate::roster::SearchPredicate;
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use thiserror::Error;

/// Errors raised by record store backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Store unavailable: {0}")]
    Unavailable(String),
    #[error("Store backend error: {0}")]
    Backend(String),
    #[error("Store serialization error: {0}")]
    Serialization(String),
    #[error("Store configuration error: {0}")]
    Configuration(String),
    #[error("Constraint violation: {0}")]
    Conflict(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Donors matching a predicate, with the store's count of matches
#[derive(Debug, Clone, Default)]
pub struct PrimaryFetch {
    pub records: Vec<DonorProfile>,
    pub matched_count: u64,
}

/// Read interface over the donor profile table and the two pledge
/// statistic tables.
///
/// No joins and no pagination: the roster pipeline fetches every match and
/// does the rest in memory.
#[async_trait]
pub trait DonorStore: Send + Sync {
    /// All donors matching `predicate`
    async fn fetch_primary(&self, predicate: &SearchPredicate) -> StoreResult<PrimaryFetch>;

    /// Pledge counts for `ids`; donors without a row are absent
    async fn fetch_counts(&self, ids: &[DonorId]) -> StoreResult<HashMap<DonorId, u64>>;

    /// Pledge totals for `ids`; donors without a row are absent
    async fn fetch_totals(&self, ids: &[DonorId]) -> StoreResult<HashMap<DonorId, Decimal>>;
}

/// Write side used to load donors and statistics into a store
#[async_trait]
pub trait DonorWriter: Send + Sync {
    /// Insert or replace a donor profile
    async fn upsert_donor(&self, profile: &DonorProfile) -> StoreResult<()>;

    /// Remove a donor and its statistics
    async fn remove_donor(&self, id: &str) -> StoreResult<()>;

    async fn set_pledge_count(&self, id: &str, count: u64) -> StoreResult<()>;

    async fn set_pledge_total(&self, id: &str, total: Decimal) -> StoreResult<()>;
}
