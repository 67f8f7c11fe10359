//! Owner dashboard overview endpoint
//!
//! GET /api/dashboard/overview - all causes regardless of flags, with
//! aggregate totals for the dashboard cards.

use axum::{extract::State, http::StatusCode, Json};

use crate::handlers::causes::aggregation_error_response;
use crate::models::responses::{ErrorResponse, OverviewResponse};
use crate::services::filters::{overview_stats, ViewFilter};
use crate::AppState;

pub async fn dashboard_overview(
    State(state): State<AppState>,
) -> Result<Json<OverviewResponse>, (StatusCode, Json<ErrorResponse>)> {
    let snapshot = state
        .aggregator
        .snapshot()
        .await
        .map_err(aggregation_error_response)?;

    let causes = ViewFilter::OwnerOverview.apply(&snapshot.causes);
    let stats = overview_stats(&causes);

    Ok(Json(OverviewResponse {
        status: "ready".to_string(),
        causes,
        total_raised_eth: stats.total_raised_eth,
        total_donors: stats.total_donors,
        total_causes: stats.total_causes,
        partial_failures: snapshot.partial_failures,
        fetched_at: snapshot.fetched_at,
    }))
}
