//! Registry change notifications
//!
//! `EventWatcher::subscribe` returns a cancellable handle yielding registry
//! change events (`CauseAdded`, `CauseUpdated`, `DonationMade`) as they land
//! on chain, polled via `eth_getLogs` filtered by event signature. Dropping
//! the subscription aborts the poll task, so results still in flight are
//! discarded silently instead of reaching a consumer that no longer exists.
//!
//! The sequence is infinite and restartable: a new subscription starts fresh
//! from the current chain head.

use alloy::{
    eips::BlockNumberOrTag,
    primitives::{Address, B256, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::{Filter, Log},
    sol_types::SolEvent,
    transports::http::{Client, Http},
};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::AppConfig;
use crate::services::registry::{ICauseRegistry, RegistryError};

/// Buffered events per subscription before the poll task blocks
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Kinds of registry change events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistryEventKind {
    CauseAdded,
    CauseUpdated,
    DonationMade,
}

impl RegistryEventKind {
    /// keccak256 event signature hash, taken from the sol-generated events
    pub fn signature_hash(&self) -> B256 {
        match self {
            RegistryEventKind::CauseAdded => ICauseRegistry::CauseAdded::SIGNATURE_HASH,
            RegistryEventKind::CauseUpdated => ICauseRegistry::CauseUpdated::SIGNATURE_HASH,
            RegistryEventKind::DonationMade => ICauseRegistry::DonationMade::SIGNATURE_HASH,
        }
    }
}

impl std::fmt::Display for RegistryEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RegistryEventKind::CauseAdded => write!(f, "CauseAdded"),
            RegistryEventKind::CauseUpdated => write!(f, "CauseUpdated"),
            RegistryEventKind::DonationMade => write!(f, "DonationMade"),
        }
    }
}

/// One registry change notification
#[derive(Debug, Clone)]
pub struct RegistryEvent {
    pub kind: RegistryEventKind,
    /// Cause the event refers to (first indexed topic)
    pub cause_id: u64,
    pub block_number: u64,
    pub tx_hash: String,
    /// Donor address, present on `DonationMade`
    pub donor: Option<String>,
    /// Donation amount in wei, present on `DonationMade`
    pub amount_wei: Option<U256>,
}

/// Cancellable handle to an event subscription.
///
/// Dropping the handle tears the poll task down.
pub struct EventSubscription {
    rx: mpsc::Receiver<RegistryEvent>,
    handle: JoinHandle<()>,
}

impl EventSubscription {
    /// Next change notification; `None` once the watcher task has stopped
    pub async fn recv(&mut self) -> Option<RegistryEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventSubscription {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Log-poll watcher over the CauseRegistry contract
pub struct EventWatcher {
    provider: RootProvider<Http<Client>>,
    registry_address: Address,
    poll_interval: Duration,
}

impl EventWatcher {
    pub fn connect(config: &AppConfig) -> Result<Self, RegistryError> {
        let provider = ProviderBuilder::new().on_http(config.rpc_url.parse().map_err(|e| {
            RegistryError::InvalidConfig(format!("Invalid RPC URL: {}", e))
        })?);

        Ok(Self {
            provider,
            registry_address: config.registry_address,
            poll_interval: Duration::from_secs(config.event_poll_secs.max(1)),
        })
    }

    /// Start watching for one event kind from the current chain head
    pub fn subscribe(&self, kind: RegistryEventKind) -> EventSubscription {
        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let provider = self.provider.clone();
        let address = self.registry_address;
        let poll_interval = self.poll_interval;

        info!(kind = %kind, registry = %address, "Starting registry event subscription");

        let handle = tokio::spawn(async move {
            poll_loop(provider, address, kind, poll_interval, tx).await;
        });

        EventSubscription { rx, handle }
    }
}

async fn poll_loop(
    provider: RootProvider<Http<Client>>,
    address: Address,
    kind: RegistryEventKind,
    poll_interval: Duration,
    tx: mpsc::Sender<RegistryEvent>,
) {
    // Anchor at the current head; a fresh subscription does not replay
    // historical events.
    let mut last_block = loop {
        match provider.get_block_number().await {
            Ok(block) => break block,
            Err(e) => {
                error!(error = %e, "Failed to get chain head, retrying");
                tokio::time::sleep(poll_interval).await;
            }
        }
    };

    loop {
        tokio::time::sleep(poll_interval).await;

        let current_block = match provider.get_block_number().await {
            Ok(block) => block,
            Err(e) => {
                warn!(error = %e, "Failed to get chain head, skipping poll");
                continue;
            }
        };
        if current_block <= last_block {
            continue;
        }

        let filter = Filter::new()
            .address(address)
            .event_signature(kind.signature_hash())
            .from_block(BlockNumberOrTag::Number(last_block + 1))
            .to_block(BlockNumberOrTag::Number(current_block));

        let logs = match provider.get_logs(&filter).await {
            Ok(logs) => logs,
            Err(e) => {
                warn!(error = %e, "eth_getLogs failed, skipping poll");
                continue;
            }
        };

        debug!(
            kind = %kind,
            from_block = last_block + 1,
            to_block = current_block,
            log_count = logs.len(),
            "Polled registry logs"
        );

        for log in &logs {
            if let Some(event) = parse_registry_log(kind, log) {
                if tx.send(event).await.is_err() {
                    // Subscriber torn down; stop quietly
                    return;
                }
            }
        }

        last_block = current_block;
    }
}

/// Decode one raw log into a `RegistryEvent`; malformed logs are skipped
fn parse_registry_log(kind: RegistryEventKind, log: &Log) -> Option<RegistryEvent> {
    let topics = log.inner.topics();
    if topics.len() < 2 {
        warn!(kind = %kind, "Registry log with insufficient topics, skipping");
        return None;
    }

    // topic[0] = event signature, topic[1] = cause id
    let cause_id = match u64::try_from(U256::from_be_slice(topics[1].as_slice())) {
        Ok(id) => id,
        Err(_) => {
            warn!(kind = %kind, "Registry log with oversized cause id, skipping");
            return None;
        }
    };

    let (donor, amount_wei) = if kind == RegistryEventKind::DonationMade {
        // topic[2] = donor address, data = amount
        let donor = topics
            .get(2)
            .map(|t| format!("{:?}", Address::from_slice(&t[12..32])));
        let data = log.inner.data.data.as_ref();
        let amount = (data.len() >= 32).then(|| U256::from_be_slice(&data[..32]));
        (donor, amount)
    } else {
        (None, None)
    };

    Some(RegistryEvent {
        kind,
        cause_id,
        block_number: log.block_number.unwrap_or(0),
        tx_hash: log
            .transaction_hash
            .map(|h| format!("{:?}", h))
            .unwrap_or_default(),
        donor,
        amount_wei,
    })
}
