use crate::api::AppState;
use crate::error::Result;
use crate::metrics::gather_metrics;
use crate::models::{DonorPageParams, PageRequest, PageResult};
use axum::{
    extract::{Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Result<Json<HealthResponse>> {
    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
    }))
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_seconds: u64,
}

/// One page of the donor roster
///
/// `GET /v1/donors?page=1&page_size=25&search=ada&sort_field=last_login&sort_direction=asc`
pub async fn list_donors(
    State(state): State<AppState>,
    Query(params): Query<DonorPageParams>,
) -> Result<Json<PageResult>> {
    let request = PageRequest::from_params(&params, state.roster.config().default_page_size)?;
    let page = state.roster.get_donor_page(&request).await?;
    Ok(Json(page))
}

/// Prometheus text exposition
pub async fn metrics(State(state): State<AppState>) -> Response {
    if !state.metrics_enabled {
        return StatusCode::NOT_FOUND.into_response();
    }

    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        gather_metrics(),
    )
        .into_response()
}
