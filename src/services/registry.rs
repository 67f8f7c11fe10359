//! CauseRegistry contract client
//!
//! Typed read/write access to the on-chain CauseRegistry. Reads go through
//! the `CauseReader` trait and writes through `CauseWriter`, so everything
//! above this layer can be exercised against in-process fakes.
//!
//! Ownership checks, donation accounting and parameter validation live in
//! the contract itself; this client only shapes calls and decodes results.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    signers::local::PrivateKeySigner,
    sol,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use std::str::FromStr;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::models::cause::{CauseParams, CauseRecord, TxRef};
use crate::services::derive::eth_to_wei;

// CauseRegistry contract interface, field order matching the deployed ABI
sol! {
    #[sol(rpc)]
    interface ICauseRegistry {
        struct SolCauseParams {
            string name;
            string description;
            string longDescription;
            string imageSrc;
            string category;
            uint256 goal;
            string website;
            address walletAddress;
            bool isActive;
            bool featured;
        }

        struct SolCause {
            string name;
            string description;
            string longDescription;
            string imageSrc;
            string category;
            string website;
            uint256 id;
            uint256 goal;
            uint256 raised;
            uint256 donorsCount;
            address walletAddress;
            bool isActive;
            bool featured;
        }

        function getAllCauseIds() external view returns (uint256[] memory);
        function getCause(uint256 _id) external view returns (SolCause memory);
        function hasDonated(uint256 _id, address _donor) external view returns (bool);
        function owner() external view returns (address);
        function addCause(SolCauseParams calldata _params) external;
        function updateCause(uint256 _id, SolCauseParams calldata _params) external;
        function donateToCause(uint256 _id) external payable;

        event CauseAdded(uint256 indexed id, string name);
        event CauseUpdated(uint256 indexed id, string name);
        event DonationMade(uint256 indexed causeId, address indexed donor, uint256 amount);
    }
}

/// Error types for registry access
#[derive(Debug)]
pub enum RegistryError {
    ProviderError(String),
    ContractCallError(String),
    TransactionError(String),
    InvalidConfig(String),
    InvalidInput(String),
}

impl std::fmt::Display for RegistryError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryError::ProviderError(msg) => write!(f, "Provider error: {}", msg),
            RegistryError::ContractCallError(msg) => write!(f, "Contract call error: {}", msg),
            RegistryError::TransactionError(msg) => write!(f, "Transaction error: {}", msg),
            RegistryError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            RegistryError::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for RegistryError {}

/// Read side of the registry, side-effect-free
#[async_trait]
pub trait CauseReader: Send + Sync {
    /// All currently registered cause identifiers, in registry order
    async fn list_cause_ids(&self) -> Result<Vec<u64>, RegistryError>;

    /// Full record for one cause; `None` when the slot is absent or the
    /// read failed (the caller decides whether that degrades or not)
    async fn get_cause(&self, id: u64) -> Result<Option<CauseRecord>, RegistryError>;
}

/// Write side of the registry; every call returns a transaction reference
#[async_trait]
pub trait CauseWriter: Send + Sync {
    async fn add_cause(&self, params: &CauseParams) -> Result<TxRef, RegistryError>;
    async fn update_cause(&self, id: u64, params: &CauseParams) -> Result<TxRef, RegistryError>;
    async fn donate(&self, id: u64, amount_wei: U256) -> Result<TxRef, RegistryError>;
}

/// alloy-backed registry client
pub struct RegistryClient {
    provider: RootProvider<Http<Client>>,
    registry_address: Address,
    rpc_url: String,
    wallet: Option<EthereumWallet>,
}

impl RegistryClient {
    /// Connect to the configured RPC endpoint and verify it is reachable.
    ///
    /// The registry address comes from config, never from ambient state.
    pub async fn connect(config: &AppConfig) -> Result<Self, RegistryError> {
        info!(
            rpc_url = %config.rpc_url,
            registry = %config.registry_address,
            "Initializing RegistryClient"
        );

        let provider = ProviderBuilder::new().on_http(config.rpc_url.parse().map_err(|e| {
            RegistryError::InvalidConfig(format!("Invalid RPC URL: {}", e))
        })?);

        // Verify connection
        let chain_id = provider.get_chain_id().await.map_err(|e| {
            error!(error = %e, "Failed to connect to registry RPC");
            RegistryError::ProviderError(format!("Connection failed: {}", e))
        })?;

        let wallet = match &config.signer_private_key {
            Some(key) => {
                let signer: PrivateKeySigner = key.parse().map_err(|e| {
                    RegistryError::InvalidConfig(format!("Invalid signer private key: {}", e))
                })?;
                info!(signer = %signer.address(), "Registry write relay enabled");
                Some(EthereumWallet::from(signer))
            }
            None => {
                info!("No signer configured, registry client is read-only");
                None
            }
        };

        info!(chain_id = chain_id, "RegistryClient initialized");

        Ok(Self {
            provider,
            registry_address: config.registry_address,
            rpc_url: config.rpc_url.clone(),
            wallet,
        })
    }

    /// Build sol-level params from the API shape, converting the goal to wei
    fn sol_params(params: &CauseParams) -> Result<ICauseRegistry::SolCauseParams, RegistryError> {
        let wallet_address = Address::from_str(&params.wallet_address).map_err(|e| {
            RegistryError::InvalidInput(format!("Invalid wallet address: {}", e))
        })?;
        let goal = eth_to_wei(params.goal_eth)
            .map_err(|e| RegistryError::InvalidInput(format!("Invalid goal: {}", e)))?;

        Ok(ICauseRegistry::SolCauseParams {
            name: params.name.clone(),
            description: params.description.clone(),
            longDescription: params.long_description.clone(),
            imageSrc: params.image_src.clone(),
            category: params.category.clone(),
            goal,
            website: params.website.clone(),
            walletAddress: wallet_address,
            isActive: params.is_active,
            featured: params.featured,
        })
    }

    /// Wallet-backed provider for a single write, or an error when no
    /// signer is configured
    fn write_wallet(&self) -> Result<EthereumWallet, RegistryError> {
        self.wallet.clone().ok_or_else(|| {
            RegistryError::InvalidConfig(
                "No signer configured; set REGISTRY_SIGNER_PRIVATE_KEY to enable writes"
                    .to_string(),
            )
        })
    }
}

/// Convert a raw sol cause into the internal record shape.
///
/// Ids and donor counts beyond u64 are collapsed to 0 / saturated; the
/// registry assigns small sequential ids so this only matters for corrupt
/// reads, which derivation then rejects.
fn record_from_sol(raw: ICauseRegistry::SolCause) -> CauseRecord {
    CauseRecord {
        id: u64::try_from(raw.id).unwrap_or(0),
        name: raw.name,
        description: raw.description,
        long_description: raw.longDescription,
        image_src: raw.imageSrc,
        category: raw.category,
        website: raw.website,
        goal: raw.goal,
        raised: raw.raised,
        donors_count: u64::try_from(raw.donorsCount).unwrap_or(u64::MAX),
        wallet_address: format!("{:?}", raw.walletAddress),
        is_active: raw.isActive,
        featured: raw.featured,
    }
}

#[async_trait]
impl CauseReader for RegistryClient {
    async fn list_cause_ids(&self) -> Result<Vec<u64>, RegistryError> {
        let registry = ICauseRegistry::new(self.registry_address, &self.provider);

        let raw_ids = registry
            .getAllCauseIds()
            .call()
            .await
            .map(|r| r._0)
            .map_err(|e| {
                error!(error = %e, "getAllCauseIds call failed");
                RegistryError::ContractCallError(format!("getAllCauseIds failed: {}", e))
            })?;

        let ids = raw_ids
            .into_iter()
            .filter_map(|id| match u64::try_from(id) {
                Ok(id) => Some(id),
                Err(_) => {
                    warn!(id = %id, "Cause id exceeds u64, skipping");
                    None
                }
            })
            .collect();

        Ok(ids)
    }

    async fn get_cause(&self, id: u64) -> Result<Option<CauseRecord>, RegistryError> {
        let registry = ICauseRegistry::new(self.registry_address, &self.provider);

        // The contract reverts with CauseNotFound for unknown ids; absent and
        // failed reads are the same "no record" outcome on this path.
        match registry.getCause(U256::from(id)).call().await {
            Ok(r) => Ok(Some(record_from_sol(r._0))),
            Err(e) => {
                warn!(cause_id = id, error = %e, "getCause failed, treating as absent");
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl CauseWriter for RegistryClient {
    async fn add_cause(&self, params: &CauseParams) -> Result<TxRef, RegistryError> {
        let wallet = self.write_wallet()?;
        let sol_params = Self::sol_params(params)?;

        info!(name = %params.name, category = %params.category, "Submitting addCause");

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().map_err(|e| {
                RegistryError::ProviderError(format!("RPC URL error: {}", e))
            })?);
        let registry = ICauseRegistry::new(self.registry_address, &provider);

        let pending_tx = registry.addCause(sol_params).send().await.map_err(|e| {
            error!(error = %e, "Failed to send addCause transaction");
            RegistryError::TransactionError(format!("Send failed: {}", e))
        })?;

        let tx_hash = format!("{:?}", pending_tx.tx_hash());
        info!(tx_hash = %tx_hash, "Transaction sent, waiting for confirmation");

        let receipt = pending_tx.get_receipt().await.map_err(|e| {
            error!(error = %e, "Failed to get transaction receipt");
            RegistryError::TransactionError(format!("Receipt failed: {}", e))
        })?;

        if !receipt.status() {
            return Err(RegistryError::TransactionError(
                "Transaction reverted".to_string(),
            ));
        }

        Ok(TxRef {
            tx_hash,
            confirmed_at_block: receipt.block_number.unwrap_or(0),
        })
    }

    async fn update_cause(&self, id: u64, params: &CauseParams) -> Result<TxRef, RegistryError> {
        let wallet = self.write_wallet()?;
        let sol_params = Self::sol_params(params)?;

        info!(cause_id = id, name = %params.name, "Submitting updateCause");

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().map_err(|e| {
                RegistryError::ProviderError(format!("RPC URL error: {}", e))
            })?);
        let registry = ICauseRegistry::new(self.registry_address, &provider);

        let pending_tx = registry
            .updateCause(U256::from(id), sol_params)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send updateCause transaction");
                RegistryError::TransactionError(format!("Send failed: {}", e))
            })?;

        let tx_hash = format!("{:?}", pending_tx.tx_hash());
        info!(tx_hash = %tx_hash, "Transaction sent, waiting for confirmation");

        let receipt = pending_tx.get_receipt().await.map_err(|e| {
            error!(error = %e, "Failed to get transaction receipt");
            RegistryError::TransactionError(format!("Receipt failed: {}", e))
        })?;

        if !receipt.status() {
            return Err(RegistryError::TransactionError(
                "Transaction reverted".to_string(),
            ));
        }

        Ok(TxRef {
            tx_hash,
            confirmed_at_block: receipt.block_number.unwrap_or(0),
        })
    }

    async fn donate(&self, id: u64, amount_wei: U256) -> Result<TxRef, RegistryError> {
        let wallet = self.write_wallet()?;

        info!(cause_id = id, amount_wei = %amount_wei, "Submitting donateToCause");

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet)
            .on_http(self.rpc_url.parse().map_err(|e| {
                RegistryError::ProviderError(format!("RPC URL error: {}", e))
            })?);
        let registry = ICauseRegistry::new(self.registry_address, &provider);

        let pending_tx = registry
            .donateToCause(U256::from(id))
            .value(amount_wei)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to send donateToCause transaction");
                RegistryError::TransactionError(format!("Send failed: {}", e))
            })?;

        let tx_hash = format!("{:?}", pending_tx.tx_hash());
        info!(tx_hash = %tx_hash, "Transaction sent, waiting for confirmation");

        let receipt = pending_tx.get_receipt().await.map_err(|e| {
            error!(error = %e, "Failed to get transaction receipt");
            RegistryError::TransactionError(format!("Receipt failed: {}", e))
        })?;

        if !receipt.status() {
            return Err(RegistryError::TransactionError(
                "Transaction reverted".to_string(),
            ));
        }

        Ok(TxRef {
            tx_hash,
            confirmed_at_block: receipt.block_number.unwrap_or(0),
        })
    }
}
