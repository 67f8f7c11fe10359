//! Cause aggregation pipeline
//!
//! Three sequential stages per cycle: discover all cause ids, fetch the
//! detail records (concurrently within the stage), derive display views.
//! Discovery failure aborts the cycle; individual detail failures degrade
//! gracefully and are only counted. Snapshots are cached briefly and
//! invalidated when the registry emits a change event, so one snapshot feeds
//! every filter policy.

use chrono::{DateTime, Utc};
use futures_util::future::join_all;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::models::cause::CauseView;
use crate::services::derive::derive_view;
use crate::services::filters::ViewFilter;
use crate::services::registry::{CauseReader, RegistryError};

/// Lifecycle of one aggregation cycle.
///
/// `Idle → DiscoveringIds → FetchingDetails → Ready | Error`; the detail
/// stage is skipped entirely when discovery yields no ids. `Error` ends the
/// cycle; the next snapshot request starts a fresh one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelinePhase {
    Idle,
    DiscoveringIds,
    FetchingDetails,
    Ready,
    Error,
}

/// Error types for the aggregation pipeline
#[derive(Debug, Clone)]
pub enum AggregationError {
    /// The id listing call failed; the whole cycle fails and is retryable
    Discovery(String),
}

impl std::fmt::Display for AggregationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AggregationError::Discovery(msg) => write!(f, "Discovery error: {}", msg),
        }
    }
}

impl std::error::Error for AggregationError {}

/// One aggregated, derived view of the registry
#[derive(Debug, Clone)]
pub struct CauseSnapshot {
    /// Derived views in discovery order
    pub causes: Vec<CauseView>,
    /// Detail fetches that failed, returned absent, or produced an invalid
    /// record, and were dropped
    pub partial_failures: usize,
    pub fetched_at: DateTime<Utc>,
}

impl CauseSnapshot {
    /// Discovery succeeded but the registry holds no causes
    pub fn is_empty(&self) -> bool {
        self.causes.is_empty()
    }
}

/// Cause aggregation service
pub struct CauseAggregator {
    reader: Arc<dyn CauseReader>,
    cache: Cache<(), Arc<CauseSnapshot>>,
    phase_tx: watch::Sender<PipelinePhase>,
}

impl CauseAggregator {
    /// `snapshot_ttl_secs` bounds how stale a served snapshot can be between
    /// registry events.
    pub fn new(reader: Arc<dyn CauseReader>, snapshot_ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(1)
            .time_to_live(Duration::from_secs(snapshot_ttl_secs.max(1)))
            .build();
        let (phase_tx, _) = watch::channel(PipelinePhase::Idle);

        Self {
            reader,
            cache,
            phase_tx,
        }
    }

    /// Current pipeline phase
    pub fn phase(&self) -> PipelinePhase {
        *self.phase_tx.borrow()
    }

    /// Watch the pipeline lifecycle
    pub fn phase_watch(&self) -> watch::Receiver<PipelinePhase> {
        self.phase_tx.subscribe()
    }

    /// The current snapshot, running a fresh cycle when the cached one has
    /// expired. Concurrent callers share a single in-flight cycle; failed
    /// cycles are never cached.
    pub async fn snapshot(&self) -> Result<Arc<CauseSnapshot>, AggregationError> {
        let reader = self.reader.clone();
        let phase_tx = self.phase_tx.clone();

        self.cache
            .try_get_with((), async move {
                run_cycle(reader, phase_tx).await.map(Arc::new)
            })
            .await
            .map_err(|e: Arc<AggregationError>| (*e).clone())
    }

    /// Snapshot filtered through one view policy
    pub async fn view(&self, filter: &ViewFilter) -> Result<Vec<CauseView>, AggregationError> {
        let snapshot = self.snapshot().await?;
        Ok(filter.apply(&snapshot.causes))
    }

    /// Derived view for a single cause, bypassing the snapshot cache
    pub async fn cause_detail(&self, id: u64) -> Result<Option<CauseView>, RegistryError> {
        let record = self.reader.get_cause(id).await?;
        Ok(record.as_ref().and_then(derive_view))
    }

    /// Drop the cached snapshot so the next request runs a fresh cycle.
    /// Wired to registry change events in `main`.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }
}

/// Run one full aggregation cycle
async fn run_cycle(
    reader: Arc<dyn CauseReader>,
    phase_tx: watch::Sender<PipelinePhase>,
) -> Result<CauseSnapshot, AggregationError> {
    phase_tx.send_replace(PipelinePhase::DiscoveringIds);

    let ids = match reader.list_cause_ids().await {
        Ok(ids) => ids,
        Err(e) => {
            phase_tx.send_replace(PipelinePhase::Error);
            return Err(AggregationError::Discovery(e.to_string()));
        }
    };

    // Zero ids is the valid "ready, empty" terminal state; the detail
    // stage must not be issued at all.
    if ids.is_empty() {
        info!("Registry holds no causes");
        phase_tx.send_replace(PipelinePhase::Ready);
        return Ok(CauseSnapshot {
            causes: Vec::new(),
            partial_failures: 0,
            fetched_at: Utc::now(),
        });
    }

    phase_tx.send_replace(PipelinePhase::FetchingDetails);
    debug!(id_count = ids.len(), "Fetching cause details");

    // Per-id fetches run concurrently; the cycle waits for all of them
    // before deriving anything.
    let results = join_all(ids.iter().map(|id| reader.get_cause(*id))).await;

    let mut causes = Vec::with_capacity(results.len());
    let mut partial_failures = 0usize;

    for (id, result) in ids.iter().zip(results) {
        match result {
            Ok(Some(record)) => match derive_view(&record) {
                Some(view) => causes.push(view),
                None => partial_failures += 1,
            },
            Ok(None) => {
                partial_failures += 1;
            }
            Err(e) => {
                warn!(cause_id = id, error = %e, "Detail fetch failed, dropping record");
                partial_failures += 1;
            }
        }
    }

    info!(
        causes = causes.len(),
        partial_failures = partial_failures,
        "Aggregation cycle complete"
    );
    phase_tx.send_replace(PipelinePhase::Ready);

    Ok(CauseSnapshot {
        causes,
        partial_failures,
        fetched_at: Utc::now(),
    })
}
