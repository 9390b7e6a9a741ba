use crate::error::{AppError, Result};
use crate::models::{DonorId, DonorProfile};
use crate::state::DonorWriter;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Donors and pledge statistics loaded into a store in one go
///
/// ```json
/// {
///   "donors": [{ "id": "d-1", "email": "ada@example.org" }],
///   "pledge_counts": { "d-1": 3 },
///   "pledge_totals": { "d-1": "120.50" }
/// }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterSeed {
    pub donors: Vec<DonorProfile>,

    #[serde(default)]
    pub pledge_counts: HashMap<DonorId, u64>,

    #[serde(default)]
    pub pledge_totals: HashMap<DonorId, Decimal>,
}

/// Summary of a completed seed run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub donors: usize,
    pub pledge_counts: usize,
    pub pledge_totals: usize,
}

/// Parse a seed fixture from disk
pub fn load_seed_file<P: AsRef<Path>>(path: P) -> Result<RosterSeed> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let seed: RosterSeed = serde_json::from_str(&raw)?;

    tracing::debug!(
        path = ?path.as_ref(),
        donors = seed.donors.len(),
        "Parsed roster seed file"
    );
    Ok(seed)
}

/// Write every donor and statistic of `seed` into `writer`
///
/// Statistics are written as given; the store does not require a matching
/// donor row for them.
pub async fn load_seed(writer: &dyn DonorWriter, seed: &RosterSeed) -> Result<SeedReport> {
    for profile in &seed.donors {
        writer
            .upsert_donor(profile)
            .await
            .map_err(|e| AppError::Configuration(format!("Failed to seed donor {}: {}", profile.id, e)))?;
    }

    for (id, count) in &seed.pledge_counts {
        writer
            .set_pledge_count(id, *count)
            .await
            .map_err(|e| AppError::Configuration(format!("Failed to seed pledge count for {}: {}", id, e)))?;
    }

    for (id, total) in &seed.pledge_totals {
        writer
            .set_pledge_total(id, *total)
            .await
            .map_err(|e| AppError::Configuration(format!("Failed to seed pledge total for {}: {}", id, e)))?;
    }

    let report = SeedReport {
        donors: seed.donors.len(),
        pledge_counts: seed.pledge_counts.len(),
        pledge_totals: seed.pledge_totals.len(),
    };

    tracing::info!(
        donors = report.donors,
        pledge_counts = report.pledge_counts,
        pledge_totals = report.pledge_totals,
        "Roster seed loaded"
    );
    Ok(report)
}
