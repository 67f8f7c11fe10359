//! Donation relay endpoint
//!
//! POST /api/causes/{id}/donate submits donateToCause through the configured
//! signer. End-user donations normally go straight from wallet to contract;
//! this relay exists for operational and test flows.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::handlers::admin::registry_error_response;
use crate::models::responses::{DonateRequest, ErrorResponse, TxResponse};
use crate::services::derive::eth_to_wei;
use crate::services::registry::RegistryError;
use crate::AppState;

pub async fn donate(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    Json(payload): Json<DonateRequest>,
) -> Result<Json<TxResponse>, (StatusCode, Json<ErrorResponse>)> {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        cause_id = id,
        amount_eth = %payload.amount_eth,
        "Donation request received"
    );

    // Mirrors the contract's DonationMustBeGreaterThanZero check so obviously
    // bad requests never reach the chain.
    if payload.amount_eth <= Decimal::ZERO {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Donation must be greater than zero".to_string(),
                code: Some("INVALID_AMOUNT".to_string()),
            }),
        ));
    }
    if id == 0 {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "cause id must be positive".to_string(),
                code: Some("INVALID_REQUEST".to_string()),
            }),
        ));
    }

    let amount_wei = eth_to_wei(payload.amount_eth).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Invalid amount: {}", e),
                code: Some("INVALID_AMOUNT".to_string()),
            }),
        )
    })?;

    let writer = state.writer.clone().ok_or_else(|| {
        registry_error_response(RegistryError::InvalidConfig(
            "No signer configured; set REGISTRY_SIGNER_PRIVATE_KEY to enable writes".to_string(),
        ))
    })?;

    let tx = writer.donate(id, amount_wei).await.map_err(|e| {
        warn!(correlation_id = %correlation_id, error = %e, "Donation failed");
        registry_error_response(e)
    })?;

    info!(correlation_id = %correlation_id, tx_hash = %tx.tx_hash, "Donation confirmed");

    Ok(Json(TxResponse {
        tx_hash: tx.tx_hash,
        confirmed_at_block: tx.confirmed_at_block,
        status: "confirmed".to_string(),
    }))
}
