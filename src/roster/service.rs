use crate::config::RosterConfig;
use crate::error::{AppError, Result};
use crate::metrics;
use crate::models::{DonorId, PageRequest, PageResult, StatisticSource};
use crate::roster::{merge_statistics, paginate, total_pages, RosterComparator, SearchPredicate};
use crate::state::{DonorStore, StoreResult};
use futures::future::join;
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{debug, error, info, warn};
use validator::Validate;

/// Assembles searchable, sorted, paginated donor pages from a join-less store
pub struct RosterService {
    store: Arc<dyn DonorStore>,
    config: RosterConfig,
}

impl RosterService {
    pub fn new(store: Arc<dyn DonorStore>, config: RosterConfig) -> Self {
        Self { store, config }
    }

    pub fn config(&self) -> &RosterConfig {
        &self.config
    }

    /// Build one page of the donor roster.
    ///
    /// Every donor matching the search is fetched, enriched with both pledge
    /// statistics, sorted, and only then sliced. A failed primary fetch fails
    /// the request; a failed or slow statistic lookup only defaults that
    /// statistic to zero and is listed in `degraded_sources`.
    pub async fn get_donor_page(&self, request: &PageRequest) -> Result<PageResult> {
        let start = Instant::now();

        if let Err(e) = self.validate(request) {
            debug!(error = %e, "Rejected roster request");
            metrics::record_roster_request("invalid_request", start.elapsed(), None);
            return Err(e);
        }

        let predicate = SearchPredicate::from_query(request.search_query.as_deref());

        let primary = match self.store.fetch_primary(&predicate).await {
            Ok(primary) => primary,
            Err(e) => {
                error!(error = %e, predicate = %predicate, "Primary donor fetch failed");
                metrics::record_roster_request("fatal_fetch", start.elapsed(), None);
                return Err(AppError::FatalFetch(e.to_string()));
            }
        };

        if primary.matched_count != primary.records.len() as u64 {
            error!(
                matched_count = primary.matched_count,
                returned = primary.records.len(),
                "Primary fetch count disagrees with returned records"
            );
            metrics::record_roster_request("fatal_fetch", start.elapsed(), None);
            return Err(AppError::FatalFetch(format!(
                "store reported {} matches but returned {} records",
                primary.matched_count,
                primary.records.len()
            )));
        }

        let total_count = primary.matched_count;
        let ids: Vec<DonorId> = primary.records.iter().map(|p| p.id.clone()).collect();

        let mut degraded_sources = Vec::new();
        let (counts, totals) = if ids.is_empty() {
            (HashMap::new(), HashMap::new())
        } else {
            let (counts, totals) = join(
                self.fetch_statistic(StatisticSource::PledgeCount, self.store.fetch_counts(&ids)),
                self.fetch_statistic(StatisticSource::PledgeTotal, self.store.fetch_totals(&ids)),
            )
            .await;

            let counts = counts.unwrap_or_else(|| {
                degraded_sources.push(StatisticSource::PledgeCount);
                HashMap::new()
            });
            let totals = totals.unwrap_or_else(|| {
                degraded_sources.push(StatisticSource::PledgeTotal);
                HashMap::new()
            });
            (counts, totals)
        };

        let rows = merge_statistics(primary.records, &counts, &totals);
        let sorted = RosterComparator::new(request.sort).sort(rows);
        let items = paginate(sorted, request.page, request.page_size);

        let elapsed = start.elapsed();
        info!(
            page = request.page,
            page_size = request.page_size,
            sort = %request.sort,
            total_count,
            returned = items.len(),
            degraded = degraded_sources.len(),
            duration_ms = elapsed.as_millis() as u64,
            "Donor page assembled"
        );

        let outcome = if degraded_sources.is_empty() { "success" } else { "degraded" };
        metrics::record_roster_request(outcome, elapsed, Some(total_count));

        Ok(PageResult {
            items,
            total_count,
            page: request.page,
            page_size: request.page_size,
            total_pages: total_pages(total_count, request.page_size),
            degraded_sources,
        })
    }

    fn validate(&self, request: &PageRequest) -> Result<()> {
        request.validate()?;

        match self.config.max_page_size {
            Some(max) if request.page_size > max => Err(AppError::InvalidRequest(format!(
                "page_size must be at most {}",
                max
            ))),
            _ => Ok(()),
        }
    }

    /// Await one statistic lookup within the configured budget; `None` means
    /// the source is degraded for this request
    async fn fetch_statistic<T, F>(
        &self,
        source: StatisticSource,
        fetch: F,
    ) -> Option<HashMap<DonorId, T>>
    where
        F: Future<Output = StoreResult<HashMap<DonorId, T>>>,
    {
        let budget = Duration::from_millis(self.config.stats_timeout_ms);

        match timeout(budget, fetch).await {
            Ok(Ok(values)) => {
                debug!(source = %source, found = values.len(), "Statistic lookup succeeded");
                Some(values)
            }
            Ok(Err(e)) => {
                warn!(source = %source, error = %e, "Statistic lookup failed, using defaults");
                metrics::record_degradation(&source.to_string(), "error");
                None
            }
            Err(_) => {
                warn!(
                    source = %source,
                    timeout_ms = self.config.stats_timeout_ms,
                    "Statistic lookup timed out, using defaults"
                );
                metrics::record_degradation(&source.to_string(), "timeout");
                None
            }
        }
    }
}
