use crate::models::{DonorId, DonorProfile};
use crate::roster::SearchPredicate;
use crate::state::{DonorStore, DonorWriter, PrimaryFetch, StoreError, StoreResult};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sled::Db;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Persistent donor store using the Sled embedded database.
///
/// Each logical source lives in its own tree, so the store has the same
/// join-less shape as the hosted backend: profiles, an email index, and the
/// two pledge statistic tables keyed by donor id.
#[derive(Clone)]
pub struct SledStore {
    db: Arc<Db>,
    donors_tree: sled::Tree,
    emails_tree: sled::Tree,
    counts_tree: sled::Tree,
    totals_tree: sled::Tree,
}

impl SledStore {
    /// Open (or create) a Sled store at the specified path
    pub fn new<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let db = sled::open(path.as_ref()).map_err(|e| {
            StoreError::Unavailable(format!("Failed to open Sled database: {}", e))
        })?;

        let open_tree = |name: &str| {
            db.open_tree(name).map_err(|e| {
                StoreError::Unavailable(format!("Failed to open {} tree: {}", name, e))
            })
        };

        let donors_tree = open_tree("donors")?;
        let emails_tree = open_tree("donor_emails")?;
        let counts_tree = open_tree("pledge_counts")?;
        let totals_tree = open_tree("pledge_totals")?;

        tracing::info!("Initialized Sled donor store at {:?}", path.as_ref());

        Ok(Self {
            db: Arc::new(db),
            donors_tree,
            emails_tree,
            counts_tree,
            totals_tree,
        })
    }

    fn serialize_donor(profile: &DonorProfile) -> StoreResult<Vec<u8>> {
        bincode::serialize(profile).map_err(|e| {
            StoreError::Serialization(format!("Failed to serialize donor: {}", e))
        })
    }

    fn deserialize_donor(bytes: &[u8]) -> StoreResult<DonorProfile> {
        bincode::deserialize(bytes).map_err(|e| {
            StoreError::Serialization(format!("Failed to deserialize donor: {}", e))
        })
    }

    fn decode_count(bytes: &[u8]) -> StoreResult<u64> {
        let raw: [u8; 8] = bytes.try_into().map_err(|_| {
            StoreError::Serialization(format!("Pledge count has {} bytes, expected 8", bytes.len()))
        })?;
        Ok(u64::from_be_bytes(raw))
    }

    fn decode_total(bytes: &[u8]) -> StoreResult<Decimal> {
        let raw: [u8; 16] = bytes.try_into().map_err(|_| {
            StoreError::Serialization(format!("Pledge total has {} bytes, expected 16", bytes.len()))
        })?;
        Ok(Decimal::deserialize(raw))
    }

    fn backend_error(context: &str, e: sled::Error) -> StoreError {
        StoreError::Backend(format!("{}: {}", context, e))
    }

    /// Keyed bulk lookup returning at most one value per id
    fn lookup<T>(
        tree: &sled::Tree,
        ids: &[DonorId],
        decode: fn(&[u8]) -> StoreResult<T>,
    ) -> StoreResult<HashMap<DonorId, T>> {
        let mut found = HashMap::with_capacity(ids.len());
        for id in ids {
            if let Some(bytes) = tree
                .get(id.as_bytes())
                .map_err(|e| Self::backend_error("Failed to read statistic", e))?
            {
                found.insert(id.clone(), decode(&bytes)?);
            }
        }
        Ok(found)
    }

    /// Flush pending writes to disk
    pub async fn flush(&self) -> StoreResult<()> {
        self.db
            .flush_async()
            .await
            .map_err(|e| Self::backend_error("Failed to flush database", e))?;
        Ok(())
    }
}

#[async_trait]
impl DonorStore for SledStore {
    async fn fetch_primary(&self, predicate: &SearchPredicate) -> StoreResult<PrimaryFetch> {
        let mut records = Vec::new();

        // Keys are donor ids, so iteration is already in id order
        for result in self.donors_tree.iter() {
            let (_, value) =
                result.map_err(|e| Self::backend_error("Failed to iterate donors", e))?;

            let profile = Self::deserialize_donor(&value)?;
            if predicate.matches(&profile) {
                records.push(profile);
            }
        }

        let matched_count = records.len() as u64;
        tracing::debug!(matched = matched_count, predicate = %predicate, "Donors fetched from Sled");

        Ok(PrimaryFetch {
            records,
            matched_count,
        })
    }

    async fn fetch_counts(&self, ids: &[DonorId]) -> StoreResult<HashMap<DonorId, u64>> {
        Self::lookup(&self.counts_tree, ids, Self::decode_count)
    }

    async fn fetch_totals(&self, ids: &[DonorId]) -> StoreResult<HashMap<DonorId, Decimal>> {
        Self::lookup(&self.totals_tree, ids, Self::decode_total)
    }
}

#[async_trait]
impl DonorWriter for SledStore {
    async fn upsert_donor(&self, profile: &DonorProfile) -> StoreResult<()> {
        let email_key = profile.email.as_bytes();
        let id_key = profile.id.as_bytes();

        // Claim the email only if it is free; an existing owner must be this donor
        let claim = self
            .emails_tree
            .compare_and_swap(email_key, None as Option<&[u8]>, Some(id_key))
            .map_err(|e| Self::backend_error("Failed to update email index", e))?;
        if let Err(taken) = claim {
            if let Some(owner) = taken.current.filter(|owner| owner.as_ref() != id_key) {
                return Err(StoreError::Conflict(format!(
                    "email {} already belongs to donor {}",
                    profile.email,
                    String::from_utf8_lossy(&owner)
                )));
            }
        }

        let value = Self::serialize_donor(profile)?;
        let previous = self
            .donors_tree
            .insert(id_key, value)
            .map_err(|e| Self::backend_error("Failed to save donor", e))?;

        if let Some(previous) = previous {
            let previous = Self::deserialize_donor(&previous)?;
            if previous.email != profile.email {
                // Release the old address only while this donor still holds it
                let _ = self
                    .emails_tree
                    .compare_and_swap(previous.email.as_bytes(), Some(id_key), None as Option<&[u8]>)
                    .map_err(|e| Self::backend_error("Failed to update email index", e))?;
            }
        }

        tracing::debug!(donor_id = %profile.id, "Donor saved to Sled");
        Ok(())
    }

    async fn remove_donor(&self, id: &str) -> StoreResult<()> {
        let removed = self
            .donors_tree
            .remove(id.as_bytes())
            .map_err(|e| Self::backend_error("Failed to delete donor", e))?;

        let Some(bytes) = removed else {
            return Err(StoreError::Backend(format!("Donor {} not found", id)));
        };

        let profile = Self::deserialize_donor(&bytes)?;
        self.emails_tree
            .remove(profile.email.as_bytes())
            .map_err(|e| Self::backend_error("Failed to update email index", e))?;
        self.counts_tree
            .remove(id.as_bytes())
            .map_err(|e| Self::backend_error("Failed to delete pledge count", e))?;
        self.totals_tree
            .remove(id.as_bytes())
            .map_err(|e| Self::backend_error("Failed to delete pledge total", e))?;

        tracing::debug!(donor_id = %id, "Donor deleted from Sled");
        Ok(())
    }

    async fn set_pledge_count(&self, id: &str, count: u64) -> StoreResult<()> {
        self.counts_tree
            .insert(id.as_bytes(), &count.to_be_bytes()[..])
            .map_err(|e| Self::backend_error("Failed to save pledge count", e))?;
        Ok(())
    }

    async fn set_pledge_total(&self, id: &str, total: Decimal) -> StoreResult<()> {
        if total.is_sign_negative() && !total.is_zero() {
            return Err(StoreError::Conflict(format!(
                "pledge total for {} must not be negative",
                id
            )));
        }

        self.totals_tree
            .insert(id.as_bytes(), &total.serialize()[..])
            .map_err(|e| Self::backend_error("Failed to save pledge total", e))?;
        Ok(())
    }
}
