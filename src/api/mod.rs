pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::roster::RosterService;
use std::sync::Arc;
use std::time::Instant;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub roster: Arc<RosterService>,
    pub started_at: Instant,
    pub metrics_enabled: bool,
}

impl AppState {
    pub fn new(roster: Arc<RosterService>) -> Self {
        Self {
            roster,
            started_at: Instant::now(),
            metrics_enabled: true,
        }
    }

    /// Toggle the `/metrics` endpoint
    pub fn with_metrics(mut self, enabled: bool) -> Self {
        self.metrics_enabled = enabled;
        self
    }
}
