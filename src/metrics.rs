//! Prometheus metrics for the roster service.
//!
//! Collectors are process-wide statics registered into [`PROMETHEUS_REGISTRY`]
//! by [`init_metrics`] and exported in text format by [`gather_metrics`].

use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use prometheus::{CounterVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry};
use std::time::{Duration, Instant};

const NAMESPACE: &str = "donor_roster";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    /// Roster page requests by outcome
    ///
    /// Labels: outcome (success, degraded, invalid_request, fatal_fetch)
    pub static ref ROSTER_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("roster_requests_total", "Total number of donor roster page requests")
            .namespace(NAMESPACE),
        &["outcome"]
    ).expect("Failed to create ROSTER_REQUESTS_TOTAL metric");

    /// End-to-end duration of a roster page request
    pub static ref ROSTER_REQUEST_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "roster_request_duration_seconds",
            "Donor roster aggregation duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0])
    ).expect("Failed to create ROSTER_REQUEST_DURATION_SECONDS metric");

    /// Number of donors matched by the search predicate, per request
    pub static ref ROSTER_MATCHED_RECORDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "roster_matched_records",
            "Donors matching the search predicate per request"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.0, 1.0, 10.0, 100.0, 1000.0, 10000.0, 100000.0])
    ).expect("Failed to create ROSTER_MATCHED_RECORDS metric");

    /// Statistic lookups that fell back to defaults
    ///
    /// Labels: source (pledge_count, pledge_total), reason (error, timeout)
    pub static ref ROSTER_ENRICHMENT_DEGRADED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(
            "roster_enrichment_degraded_total",
            "Statistic lookups that degraded to default values"
        )
        .namespace(NAMESPACE),
        &["source", "reason"]
    ).expect("Failed to create ROSTER_ENRICHMENT_DEGRADED_TOTAL metric");
}

/// Register all collectors with the global registry.
///
/// Safe to call more than once; collectors already registered are skipped.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
    register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;
    register(Box::new(ROSTER_REQUESTS_TOTAL.clone()))?;
    register(Box::new(ROSTER_REQUEST_DURATION_SECONDS.clone()))?;
    register(Box::new(ROSTER_MATCHED_RECORDS.clone()))?;
    register(Box::new(ROSTER_ENRICHMENT_DEGRADED_TOTAL.clone()))?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

fn register(collector: Box<dyn prometheus::core::Collector>) -> Result<(), prometheus::Error> {
    match PROMETHEUS_REGISTRY.register(collector) {
        Ok(()) | Err(prometheus::Error::AlreadyReg) => Ok(()),
        Err(e) => Err(e),
    }
}

/// Generate Prometheus text format metrics
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

/// Record the outcome of one roster request
pub fn record_roster_request(outcome: &str, duration: Duration, matched: Option<u64>) {
    ROSTER_REQUESTS_TOTAL.with_label_values(&[outcome]).inc();
    ROSTER_REQUEST_DURATION_SECONDS.observe(duration.as_secs_f64());
    if let Some(matched) = matched {
        ROSTER_MATCHED_RECORDS.observe(matched as f64);
    }
}

/// Record a statistic lookup that fell back to defaults
pub fn record_degradation(source: &str, reason: &str) {
    ROSTER_ENRICHMENT_DEGRADED_TOTAL
        .with_label_values(&[source, reason])
        .inc();
}

/// Axum middleware counting requests and timing them per matched route
///
/// ```no_run
/// use axum::{middleware, Router};
/// use donor_roster::metrics::track_metrics;
///
/// let app: Router = Router::new().layer(middleware::from_fn(track_metrics));
/// ```
pub async fn track_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;

    let status = response.status().as_u16().to_string();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(start.elapsed().as_secs_f64());

    response
}
