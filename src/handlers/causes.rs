//! Public cause read endpoints
//!
//! GET /api/causes - active causes filtered by search/category, featured first
//! GET /api/causes/featured - active featured causes for the carousel
//! GET /api/causes/categories - category values for the listing dropdown
//! GET /api/causes/{id} - single derived cause view

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};

use crate::models::cause::CauseView;
use crate::models::responses::{CausesQuery, CausesResponse, ErrorResponse};
use crate::services::aggregator::AggregationError;
use crate::services::filters::{categories, ViewFilter, ALL_CATEGORIES};
use crate::AppState;

/// Map a pipeline failure to a retryable error response
pub(crate) fn aggregation_error_response(
    err: AggregationError,
) -> (StatusCode, Json<ErrorResponse>) {
    tracing::error!(error = %err, "Cause aggregation failed");
    match err {
        AggregationError::Discovery(_) => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Could not fetch cause data from the registry. Please try again."
                    .to_string(),
                code: Some("DISCOVERY_FAILED".to_string()),
            }),
        ),
    }
}

pub async fn list_causes(
    State(state): State<AppState>,
    Query(query): Query<CausesQuery>,
) -> Result<Json<CausesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let filter = ViewFilter::PublicListing {
        query: query.q.unwrap_or_default(),
        category: query
            .category
            .unwrap_or_else(|| ALL_CATEGORIES.to_string()),
    };

    let snapshot = state
        .aggregator
        .snapshot()
        .await
        .map_err(aggregation_error_response)?;
    let causes = filter.apply(&snapshot.causes);

    Ok(Json(CausesResponse {
        status: "ready".to_string(),
        total: causes.len(),
        causes,
        partial_failures: snapshot.partial_failures,
        fetched_at: snapshot.fetched_at,
    }))
}

pub async fn featured_causes(
    State(state): State<AppState>,
) -> Result<Json<CausesResponse>, (StatusCode, Json<ErrorResponse>)> {
    let snapshot = state
        .aggregator
        .snapshot()
        .await
        .map_err(aggregation_error_response)?;
    let causes = ViewFilter::FeaturedOnly.apply(&snapshot.causes);

    Ok(Json(CausesResponse {
        status: "ready".to_string(),
        total: causes.len(),
        causes,
        partial_failures: snapshot.partial_failures,
        fetched_at: snapshot.fetched_at,
    }))
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, (StatusCode, Json<ErrorResponse>)> {
    let snapshot = state
        .aggregator
        .snapshot()
        .await
        .map_err(aggregation_error_response)?;
    Ok(Json(categories(&snapshot.causes)))
}

pub async fn get_cause(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<CauseView>, (StatusCode, Json<ErrorResponse>)> {
    // The on-chain client folds failed reads into "absent" (404 below);
    // this branch handles readers that report detail failures as errors.
    let view = state.aggregator.cause_detail(id).await.map_err(|e| {
        tracing::error!(cause_id = id, error = %e, "Cause detail fetch failed");
        (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: "Could not fetch cause data from the registry. Please try again."
                    .to_string(),
                code: Some("DETAIL_FETCH_FAILED".to_string()),
            }),
        )
    })?;

    match view {
        Some(view) => Ok(Json(view)),
        None => Err((
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Cause {} not found", id),
                code: Some("CAUSE_NOT_FOUND".to_string()),
            }),
        )),
    }
}
