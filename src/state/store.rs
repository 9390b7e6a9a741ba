use crate::models::{DonorId, DonorProfile};
use crate::roster::SearchPredicate;
use crate::state::{DonorStore, DonorWriter, PrimaryFetch, StoreError, StoreResult};
use async_trait::async_trait;
use dashmap::{mapref::entry::Entry, DashMap};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

/// In-memory donor store (for development and testing)
#[derive(Clone)]
pub struct InMemoryStore {
    donors: Arc<DashMap<DonorId, DonorProfile>>,
    email_index: Arc<DashMap<String, DonorId>>,
    pledge_counts: Arc<DashMap<DonorId, u64>>,
    pledge_totals: Arc<DashMap<DonorId, Decimal>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            donors: Arc::new(DashMap::new()),
            email_index: Arc::new(DashMap::new()),
            pledge_counts: Arc::new(DashMap::new()),
            pledge_totals: Arc::new(DashMap::new()),
        }
    }

    /// Number of donor profiles held
    pub fn donor_count(&self) -> usize {
        self.donors.len()
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DonorStore for InMemoryStore {
    async fn fetch_primary(&self, predicate: &SearchPredicate) -> StoreResult<PrimaryFetch> {
        let mut records: Vec<DonorProfile> = self
            .donors
            .iter()
            .filter(|entry| predicate.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        // Map iteration order is arbitrary; hand rows out in id order
        records.sort_by(|a, b| a.id.cmp(&b.id));

        let matched_count = records.len() as u64;
        tracing::debug!(matched = matched_count, predicate = %predicate, "Donors fetched");

        Ok(PrimaryFetch {
            records,
            matched_count,
        })
    }

    async fn fetch_counts(&self, ids: &[DonorId]) -> StoreResult<HashMap<DonorId, u64>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.pledge_counts.get(id).map(|count| (id.clone(), *count)))
            .collect())
    }

    async fn fetch_totals(&self, ids: &[DonorId]) -> StoreResult<HashMap<DonorId, Decimal>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.pledge_totals.get(id).map(|total| (id.clone(), *total)))
            .collect())
    }
}

#[async_trait]
impl DonorWriter for InMemoryStore {
    async fn upsert_donor(&self, profile: &DonorProfile) -> StoreResult<()> {
        // Claim the email under the shard lock so concurrent writers cannot both win
        match self.email_index.entry(profile.email.clone()) {
            Entry::Occupied(owner) if *owner.get() != profile.id => {
                return Err(StoreError::Conflict(format!(
                    "email {} already belongs to donor {}",
                    profile.email,
                    owner.get()
                )));
            }
            Entry::Occupied(_) => {}
            Entry::Vacant(slot) => {
                slot.insert(profile.id.clone());
            }
        }

        if let Some(previous) = self.donors.insert(profile.id.clone(), profile.clone()) {
            if previous.email != profile.email {
                self.email_index
                    .remove_if(&previous.email, |_, owner| *owner == profile.id);
            }
        }

        tracing::debug!(donor_id = %profile.id, "Donor saved");
        Ok(())
    }

    async fn remove_donor(&self, id: &str) -> StoreResult<()> {
        match self.donors.remove(id) {
            Some((_, profile)) => {
                self.email_index.remove(&profile.email);
                self.pledge_counts.remove(id);
                self.pledge_totals.remove(id);
                tracing::debug!(donor_id = %id, "Donor removed");
                Ok(())
            }
            None => Err(StoreError::Backend(format!("Donor {} not found", id))),
        }
    }

    async fn set_pledge_count(&self, id: &str, count: u64) -> StoreResult<()> {
        self.pledge_counts.insert(id.to_string(), count);
        Ok(())
    }

    async fn set_pledge_total(&self, id: &str, total: Decimal) -> StoreResult<()> {
        if total.is_sign_negative() && !total.is_zero() {
            return Err(StoreError::Conflict(format!(
                "pledge total for {} must not be negative",
                id
            )));
        }
        self.pledge_totals.insert(id.to_string(), total);
        Ok(())
    }
}
