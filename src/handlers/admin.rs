//! Owner write relays
//!
//! POST /api/causes and PUT /api/causes/{id} submit addCause/updateCause
//! through the configured signer. Admin-only, protected by API key in the
//! X-API-Key header. The contract still enforces ownership on-chain; the
//! API key only gates the relay itself.

use axum::{
    extract::{Path, State},
    http::{header::HeaderMap, StatusCode},
    Json,
};
use std::str::FromStr;
use tracing::{info, warn};

use crate::models::cause::CauseParams;
use crate::models::responses::{ErrorResponse, TxResponse};
use crate::services::registry::RegistryError;
use crate::AppState;

/// Max cause name length
const MAX_NAME_LENGTH: usize = 100;

/// Max short description length
const MAX_DESCRIPTION_LENGTH: usize = 500;

/// Sanitize input string by removing control characters, null bytes, and normalizing whitespace
fn sanitize_input(input: &str) -> String {
    input
        .chars()
        .filter(|c| !c.is_control() || *c == ' ')
        .filter(|c| !matches!(c, '\u{0000}'..='\u{001F}' | '\u{007F}'..='\u{009F}' | '\u{200B}'..='\u{200F}' | '\u{2028}'..='\u{202F}' | '\u{FEFF}'))
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
        .trim()
        .to_string()
}

/// Check the X-API-Key header against the configured admin key
pub(crate) fn check_admin_auth(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let expected = state.admin_api_key.as_deref().ok_or((
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "Admin endpoints are disabled; ADMIN_API_KEY is not configured".to_string(),
            code: Some("ADMIN_DISABLED".to_string()),
        }),
    ))?;

    let provided = headers
        .get("X-API-Key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if provided != expected {
        warn!("Rejected admin request with missing or invalid API key");
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid or missing X-API-Key header".to_string(),
                code: Some("UNAUTHORIZED".to_string()),
            }),
        ));
    }

    Ok(())
}

fn bad_request(message: String) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message,
            code: Some("INVALID_REQUEST".to_string()),
        }),
    )
}

/// Sanitize and validate cause parameters before they go on chain
fn prepare_params(payload: &CauseParams) -> Result<CauseParams, (StatusCode, Json<ErrorResponse>)> {
    let params = CauseParams {
        name: sanitize_input(&payload.name),
        description: sanitize_input(&payload.description),
        long_description: sanitize_input(&payload.long_description),
        image_src: payload.image_src.trim().to_string(),
        category: sanitize_input(&payload.category),
        goal_eth: payload.goal_eth,
        website: payload.website.trim().to_string(),
        wallet_address: payload.wallet_address.trim().to_string(),
        is_active: payload.is_active,
        featured: payload.featured,
    };

    if params.name.is_empty() || params.name.len() > MAX_NAME_LENGTH {
        return Err(bad_request(format!(
            "name must be 1-{} characters",
            MAX_NAME_LENGTH
        )));
    }
    if params.description.is_empty() || params.description.len() > MAX_DESCRIPTION_LENGTH {
        return Err(bad_request(format!(
            "description must be 1-{} characters",
            MAX_DESCRIPTION_LENGTH
        )));
    }
    if params.category.is_empty() {
        return Err(bad_request("category must not be empty".to_string()));
    }
    if params.goal_eth.is_sign_negative() {
        return Err(bad_request("goal must not be negative".to_string()));
    }
    if alloy::primitives::Address::from_str(&params.wallet_address).is_err() {
        return Err(bad_request("wallet_address is not a valid address".to_string()));
    }

    Ok(params)
}

/// Map a write-path registry failure to a response
pub(crate) fn registry_error_response(err: RegistryError) -> (StatusCode, Json<ErrorResponse>) {
    match err {
        RegistryError::InvalidInput(msg) => bad_request(msg),
        RegistryError::InvalidConfig(msg) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ErrorResponse {
                error: msg,
                code: Some("WRITES_DISABLED".to_string()),
            }),
        ),
        other => (
            StatusCode::BAD_GATEWAY,
            Json(ErrorResponse {
                error: other.to_string(),
                code: Some("TRANSACTION_FAILED".to_string()),
            }),
        ),
    }
}

pub async fn add_cause(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CauseParams>,
) -> Result<(StatusCode, Json<TxResponse>), (StatusCode, Json<ErrorResponse>)> {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        name = %payload.name,
        category = %payload.category,
        "addCause request received"
    );

    check_admin_auth(&headers, &state)?;
    let params = prepare_params(&payload)?;

    let writer = state.writer.clone().ok_or_else(|| {
        registry_error_response(RegistryError::InvalidConfig(
            "No signer configured; set REGISTRY_SIGNER_PRIVATE_KEY to enable writes".to_string(),
        ))
    })?;

    let tx = writer.add_cause(&params).await.map_err(|e| {
        warn!(correlation_id = %correlation_id, error = %e, "addCause failed");
        registry_error_response(e)
    })?;

    info!(correlation_id = %correlation_id, tx_hash = %tx.tx_hash, "addCause confirmed");

    Ok((
        StatusCode::CREATED,
        Json(TxResponse {
            tx_hash: tx.tx_hash,
            confirmed_at_block: tx.confirmed_at_block,
            status: "confirmed".to_string(),
        }),
    ))
}

pub async fn update_cause(
    State(state): State<AppState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
    Json(payload): Json<CauseParams>,
) -> Result<Json<TxResponse>, (StatusCode, Json<ErrorResponse>)> {
    let correlation_id = uuid::Uuid::new_v4().to_string();
    info!(
        correlation_id = %correlation_id,
        cause_id = id,
        name = %payload.name,
        "updateCause request received"
    );

    check_admin_auth(&headers, &state)?;
    if id == 0 {
        return Err(bad_request("cause id must be positive".to_string()));
    }
    let params = prepare_params(&payload)?;

    let writer = state.writer.clone().ok_or_else(|| {
        registry_error_response(RegistryError::InvalidConfig(
            "No signer configured; set REGISTRY_SIGNER_PRIVATE_KEY to enable writes".to_string(),
        ))
    })?;

    let tx = writer.update_cause(id, &params).await.map_err(|e| {
        warn!(correlation_id = %correlation_id, error = %e, "updateCause failed");
        registry_error_response(e)
    })?;

    info!(correlation_id = %correlation_id, tx_hash = %tx.tx_hash, "updateCause confirmed");

    Ok(Json(TxResponse {
        tx_hash: tx.tx_hash,
        confirmed_at_block: tx.confirmed_at_block,
        status: "confirmed".to_string(),
    }))
}
