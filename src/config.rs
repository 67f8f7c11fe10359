//! Startup configuration for the CharityOne backend
//!
//! All registry settings are resolved once here and passed into the services
//! at construction. A missing RPC URL or registry address is a configuration
//! error with its own message, not a network failure.

use alloy::primitives::Address;
use std::env;
use std::str::FromStr;

/// Default HTTP bind address
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

/// Default snapshot cache TTL in seconds
const DEFAULT_SNAPSHOT_TTL_SECS: u64 = 30;

/// Default registry event poll interval in seconds (roughly one ETH block)
const DEFAULT_EVENT_POLL_SECS: u64 = 12;

/// Error types for configuration loading
#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
    InvalidVar { var: &'static str, message: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(var) => {
                write!(f, "Missing required environment variable: {}", var)
            }
            ConfigError::InvalidVar { var, message } => {
                write!(f, "Invalid value for {}: {}", var, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Resolved backend configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// JSON-RPC endpoint of the chain the registry lives on
    pub rpc_url: String,
    /// CauseRegistry contract address
    pub registry_address: Address,
    /// HTTP bind address
    pub bind_addr: String,
    /// How long an aggregated snapshot stays fresh
    pub snapshot_ttl_secs: u64,
    /// Interval between registry event log polls
    pub event_poll_secs: u64,
    /// Private key for write relays (hex string with 0x prefix); reads work without it
    pub signer_private_key: Option<String>,
    /// API key required on admin write endpoints
    pub admin_api_key: Option<String>,
}

impl AppConfig {
    /// Load configuration from the environment.
    ///
    /// `CAUSE_REGISTRY_RPC_URL` and `CAUSE_REGISTRY_ADDRESS` are required;
    /// everything else has a default or is optional.
    pub fn from_env() -> Result<Self, ConfigError> {
        let rpc_url = env::var("CAUSE_REGISTRY_RPC_URL")
            .map_err(|_| ConfigError::MissingVar("CAUSE_REGISTRY_RPC_URL"))?;

        let address_str = env::var("CAUSE_REGISTRY_ADDRESS")
            .map_err(|_| ConfigError::MissingVar("CAUSE_REGISTRY_ADDRESS"))?;
        let registry_address = Address::from_str(&address_str).map_err(|e| {
            ConfigError::InvalidVar {
                var: "CAUSE_REGISTRY_ADDRESS",
                message: e.to_string(),
            }
        })?;

        let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());

        let snapshot_ttl_secs = parse_secs("SNAPSHOT_TTL_SECS", DEFAULT_SNAPSHOT_TTL_SECS)?;
        let event_poll_secs = parse_secs("EVENT_POLL_SECS", DEFAULT_EVENT_POLL_SECS)?;

        let signer_private_key = env::var("REGISTRY_SIGNER_PRIVATE_KEY").ok();
        let admin_api_key = env::var("ADMIN_API_KEY").ok();

        Ok(Self {
            rpc_url,
            registry_address,
            bind_addr,
            snapshot_ttl_secs,
            event_poll_secs,
            signer_private_key,
            admin_api_key,
        })
    }
}

fn parse_secs(var: &'static str, default: u64) -> Result<u64, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidVar {
            var,
            message: e.to_string(),
        }),
        Err(_) => Ok(default),
    }
}
