//! Cause data types
//!
//! `CauseRecord` is the raw registry record as read from chain; `CauseView`
//! is the derived, display-ready shape. Views are ephemeral and recomputed on
//! every fetch, never persisted.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Raw cause record as stored in the CauseRegistry contract
#[derive(Debug, Clone)]
pub struct CauseRecord {
    /// Registry-assigned identifier; 0 marks a slot that was never populated
    pub id: u64,
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub image_src: String,
    pub category: String,
    pub website: String,
    /// Funding goal in wei
    pub goal: U256,
    /// Amount raised so far in wei; only the contract mutates this
    pub raised: U256,
    /// Opaque donation counter maintained by the contract
    pub donors_count: u64,
    /// Destination address for donated funds
    pub wallet_address: String,
    pub is_active: bool,
    pub featured: bool,
}

/// Derived, display-ready cause view
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseView {
    pub id: u64,
    pub name: String,
    pub description: String,
    pub long_description: String,
    pub image_src: String,
    pub category: String,
    pub website: String,
    /// Funding goal in ETH
    pub goal_eth: Decimal,
    /// Amount raised in ETH
    pub raised_eth: Decimal,
    pub donors_count: u64,
    pub wallet_address: String,
    pub is_active: bool,
    pub featured: bool,
    /// round(raised / goal * 100); 100 when the goal is zero. Deliberately
    /// unclamped, so an over-funded cause reports more than 100.
    pub funded_percentage: u64,
}

/// Parameters for creating or updating a cause on the registry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CauseParams {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub long_description: String,
    #[serde(default)]
    pub image_src: String,
    pub category: String,
    /// Funding goal in ETH (converted to wei at the contract boundary)
    pub goal_eth: Decimal,
    #[serde(default)]
    pub website: String,
    /// Destination address for donated funds
    pub wallet_address: String,
    #[serde(default = "default_is_active")]
    pub is_active: bool,
    #[serde(default)]
    pub featured: bool,
}

fn default_is_active() -> bool {
    true
}

/// Reference to a submitted registry transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TxRef {
    /// Transaction hash
    pub tx_hash: String,
    /// Block number where the transaction was confirmed
    pub confirmed_at_block: u64,
}
