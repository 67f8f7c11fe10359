//! HTTP request/response models for the cause endpoints

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::models::cause::CauseView;

/// Generic error response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
    /// Error code for programmatic handling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

/// Query params for GET /api/causes
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CausesQuery {
    /// Free-text search over name and description (case-insensitive)
    #[serde(default)]
    pub q: Option<String>,
    /// Category filter; omitted or "All" keeps every category
    #[serde(default)]
    pub category: Option<String>,
}

/// Response for the public listing and featured endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CausesResponse {
    /// Pipeline status for this snapshot; always "ready" on a 200
    pub status: String,
    pub causes: Vec<CauseView>,
    pub total: usize,
    /// Individual detail fetches that failed or returned absent and were
    /// dropped from the snapshot
    pub partial_failures: usize,
    /// When the underlying snapshot was taken
    pub fetched_at: DateTime<Utc>,
}

/// Response for GET /api/dashboard/overview
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OverviewResponse {
    pub status: String,
    /// All causes regardless of active/featured flags
    pub causes: Vec<CauseView>,
    /// Sum of raised amounts in ETH across all causes
    pub total_raised_eth: Decimal,
    /// Sum of donor counters across all causes
    pub total_donors: u64,
    pub total_causes: usize,
    pub partial_failures: usize,
    pub fetched_at: DateTime<Utc>,
}

/// Request body for POST /api/causes/{id}/donate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DonateRequest {
    /// Donation amount in ETH; must be greater than zero
    pub amount_eth: Decimal,
}

/// Response for write relays (add/update/donate)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxResponse {
    /// Transaction hash on the registry chain
    pub tx_hash: String,
    /// Block number where the transaction was confirmed
    pub confirmed_at_block: u64,
    /// Current status
    pub status: String,
}
