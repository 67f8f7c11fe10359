//! Shared test fixtures: an in-process fake registry and router builder

use alloy::primitives::U256;
use async_trait::async_trait;
use axum::Router;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use charityone_backend::models::cause::{CauseParams, CauseRecord, TxRef};
use charityone_backend::services::aggregator::CauseAggregator;
use charityone_backend::services::registry::{CauseReader, CauseWriter, RegistryError};
use charityone_backend::{build_router, AppState};

const WEI_PER_ETH: u128 = 1_000_000_000_000_000_000;

/// Fake CauseRegistry backed by in-memory records
#[derive(Default)]
pub struct FakeRegistry {
    pub ids: Vec<u64>,
    pub records: HashMap<u64, CauseRecord>,
    /// Ids whose detail fetch fails
    pub failing_ids: HashSet<u64>,
    /// When set, the id listing call itself fails
    pub fail_discovery: bool,
    /// Write relay log: one entry per accepted write
    pub writes: Mutex<Vec<String>>,
}

impl FakeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cause(mut self, record: CauseRecord) -> Self {
        self.ids.push(record.id);
        self.records.insert(record.id, record);
        self
    }

    /// Register an id whose detail fetch fails
    pub fn with_failing_id(mut self, id: u64) -> Self {
        self.ids.push(id);
        self.failing_ids.insert(id);
        self
    }
}

#[async_trait]
impl CauseReader for FakeRegistry {
    async fn list_cause_ids(&self) -> Result<Vec<u64>, RegistryError> {
        if self.fail_discovery {
            return Err(RegistryError::ContractCallError(
                "rpc unreachable".to_string(),
            ));
        }
        Ok(self.ids.clone())
    }

    async fn get_cause(&self, id: u64) -> Result<Option<CauseRecord>, RegistryError> {
        if self.failing_ids.contains(&id) {
            return Err(RegistryError::ContractCallError("read failed".to_string()));
        }
        Ok(self.records.get(&id).cloned())
    }
}

#[async_trait]
impl CauseWriter for FakeRegistry {
    async fn add_cause(&self, params: &CauseParams) -> Result<TxRef, RegistryError> {
        self.writes
            .lock()
            .unwrap()
            .push(format!("addCause:{}", params.name));
        Ok(TxRef {
            tx_hash: "0xadd".to_string(),
            confirmed_at_block: 100,
        })
    }

    async fn update_cause(&self, id: u64, params: &CauseParams) -> Result<TxRef, RegistryError> {
        self.writes
            .lock()
            .unwrap()
            .push(format!("updateCause:{}:{}", id, params.name));
        Ok(TxRef {
            tx_hash: "0xupdate".to_string(),
            confirmed_at_block: 101,
        })
    }

    async fn donate(&self, id: u64, amount_wei: U256) -> Result<TxRef, RegistryError> {
        self.writes
            .lock()
            .unwrap()
            .push(format!("donate:{}:{}", id, amount_wei));
        Ok(TxRef {
            tx_hash: "0xdonate".to_string(),
            confirmed_at_block: 102,
        })
    }
}

/// Cause record with ETH-denominated goal/raised for readable fixtures
pub fn cause(id: u64, name: &str, goal_eth: u128, raised_milli_eth: u128) -> CauseRecord {
    CauseRecord {
        id,
        name: name.to_string(),
        description: format!("{} description", name),
        long_description: format!("Long story of {}", name),
        image_src: format!("https://img.example/{}.png", id),
        category: "Other".to_string(),
        website: String::new(),
        goal: U256::from(goal_eth * WEI_PER_ETH),
        raised: U256::from(raised_milli_eth * (WEI_PER_ETH / 1000)),
        donors_count: 1,
        wallet_address: "0x00000000000000000000000000000000000000aa".to_string(),
        is_active: true,
        featured: false,
    }
}

pub fn make_state(registry: FakeRegistry, writes_enabled: bool, admin_api_key: Option<&str>) -> AppState {
    let registry = Arc::new(registry);
    let aggregator = Arc::new(CauseAggregator::new(registry.clone(), 60));

    AppState {
        aggregator,
        writer: writes_enabled.then(|| registry as Arc<dyn CauseWriter>),
        admin_api_key: admin_api_key.map(|k| k.to_string()),
    }
}

pub fn test_router(registry: FakeRegistry) -> Router {
    build_router(make_state(registry, false, None))
}
