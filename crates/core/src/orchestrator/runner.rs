//! Transfer orchestrator implementation.
//!
//! Owns the item queue and the event log, and moves items through
//! `pending -> acquiring -> publishing -> completed | failed`:
//! - Transfers are single-flight: a gate is held for the whole transfer, so
//!   manual and automatic triggers are serialized.
//! - The auto-cycle picks the first pending item in discovery order, waits
//!   for it, then picks the next.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, Mutex, Notify, RwLock};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::destination::DestinationClient;
use crate::error::{ErrorKind, PlatformError};
use crate::events::{EventLog, TransferEvent};
use crate::item::{
    DestinationCredentials, Item, ItemStatus, SessionConfig, SourceCredentials, TransferFailure,
};
use crate::metrics::{
    DISCOVERY_RUNS, ITEMS_DISCOVERED, PHASE_DURATION, TRANSFERS_TOTAL, TRANSFER_FAILURES,
};
use crate::source::SourceClient;

use super::config::OrchestratorConfig;
use super::queue::ItemQueue;
use super::retry::RetryPolicy;
use super::types::{OrchestratorError, OrchestratorStatus, OrchestratorUpdate, TransferOutcome};

/// Callback invoked for every orchestrator update (events, start/stop,
/// discovery). Must not block.
pub type OrchestratorUpdateCallback = Arc<dyn Fn(&OrchestratorUpdate) + Send + Sync>;

/// The transfer orchestrator.
pub struct TransferOrchestrator {
    config: OrchestratorConfig,
    retry: RetryPolicy,
    source: Arc<dyn SourceClient>,
    destination: Arc<dyn DestinationClient>,
    update_callback: Option<OrchestratorUpdateCallback>,

    queue: RwLock<ItemQueue>,
    events: RwLock<EventLog>,
    last_discovery_at: RwLock<Option<DateTime<Utc>>>,

    // Runtime state
    transfer_gate: Arc<Mutex<()>>,
    active_item: RwLock<Option<String>>,
    running: AtomicBool,
    /// Bumped on every start; a cycle exits once it no longer owns the
    /// current run.
    generation: AtomicU64,
    shutdown_tx: broadcast::Sender<()>,
    discovered: Notify,
    /// Cycle tasks that may still be finishing a transfer after a stop.
    cycle_handles: Mutex<Vec<JoinHandle<()>>>,
}

impl TransferOrchestrator {
    /// Create a new orchestrator with an empty queue.
    pub fn new(
        config: OrchestratorConfig,
        source: Arc<dyn SourceClient>,
        destination: Arc<dyn DestinationClient>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        Self {
            retry: RetryPolicy::new(&config.retry),
            events: RwLock::new(EventLog::new(config.event_log_capacity)),
            config,
            source,
            destination,
            update_callback: None,
            queue: RwLock::new(ItemQueue::default()),
            last_discovery_at: RwLock::new(None),
            transfer_gate: Arc::new(Mutex::new(())),
            active_item: RwLock::new(None),
            running: AtomicBool::new(false),
            generation: AtomicU64::new(0),
            shutdown_tx,
            discovered: Notify::new(),
            cycle_handles: Mutex::new(Vec::new()),
        }
    }

    /// Set a callback invoked on every update.
    pub fn with_update_callback(mut self, callback: OrchestratorUpdateCallback) -> Self {
        self.update_callback = Some(callback);
        self
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn source(&self) -> &Arc<dyn SourceClient> {
        &self.source
    }

    pub fn destination(&self) -> &Arc<dyn DestinationClient> {
        &self.destination
    }

    // =========================================================================
    // Discovery
    // =========================================================================

    /// Fetch the trending list and append unseen items as `pending`.
    ///
    /// Existing items are never touched. Returns the fetched items as they
    /// now exist in the queue, in upstream order.
    pub async fn discover(
        &self,
        credentials: &SourceCredentials,
    ) -> Result<Vec<Item>, PlatformError> {
        credentials.validate()?;

        let timeout = self.call_timeout();
        let fetched = match self
            .retry
            .run("list_trending", timeout, || {
                self.source.list_trending(credentials)
            })
            .await
        {
            Ok(items) => items,
            Err(e) => {
                warn!("Discovery from {} failed: {}", self.source.name(), e);
                DISCOVERY_RUNS.with_label_values(&[e.kind().as_str()]).inc();
                return Err(e);
            }
        };

        let ids: Vec<String> = fetched.iter().map(|item| item.id.clone()).collect();
        let (added, items) = {
            let mut queue = self.queue.write().await;
            let added = queue.append_unseen(&fetched);
            (added, queue.select(&ids))
        };
        *self.last_discovery_at.write().await = Some(Utc::now());

        DISCOVERY_RUNS.with_label_values(&["success"]).inc();
        ITEMS_DISCOVERED.inc_by(added as u64);
        info!(
            "Discovered {} trending items from {} ({} new)",
            fetched.len(),
            self.source.name(),
            added
        );

        if added > 0 {
            self.discovered.notify_one();
            self.notify(OrchestratorUpdate::ItemsDiscovered { added });
        }

        Ok(items)
    }

    // =========================================================================
    // Transfers
    // =========================================================================

    /// Run one transfer attempt for `item_id`.
    ///
    /// Waits for any in-flight transfer to finish first. Items that are not
    /// `pending` or `failed` are skipped without an event. Platform failures
    /// are folded into [`TransferOutcome::Failed`]; the errors are an
    /// unknown id, blank credentials, or a panicked attempt task.
    ///
    /// Once the item has left `pending`/`failed` the attempt runs on its own
    /// task, so dropping the returned future never strands the item in an
    /// intermediate status.
    pub async fn transfer(
        self: &Arc<Self>,
        item_id: &str,
        credentials: &DestinationCredentials,
    ) -> Result<TransferOutcome, OrchestratorError> {
        credentials
            .validate()
            .map_err(|e| OrchestratorError::InvalidCredentials(e.detail().to_string()))?;

        let gate = Arc::clone(&self.transfer_gate).lock_owned().await;

        let item = {
            let mut queue = self.queue.write().await;
            let status = queue
                .get(item_id)
                .ok_or_else(|| OrchestratorError::ItemNotFound(item_id.to_string()))?
                .status;

            if !status.can_start_transfer() {
                debug!("Skipping transfer of {}: item is {}", item_id, status);
                TRANSFERS_TOTAL.with_label_values(&["skipped"]).inc();
                return Ok(TransferOutcome::Skipped {
                    item_id: item_id.to_string(),
                    status,
                });
            }

            let item = queue.transition(item_id, ItemStatus::Acquiring)?;
            item.last_error = None;
            item.clone()
        };

        // No await between the transition above and the spawn.
        let this = Arc::clone(self);
        let credentials = credentials.clone();
        let attempt = tokio::spawn(async move {
            let _gate = gate;
            *this.active_item.write().await = Some(item.id.clone());
            let outcome = this.run_phases(&item, &credentials).await;
            *this.active_item.write().await = None;

            if let Ok(outcome) = &outcome {
                TRANSFERS_TOTAL.with_label_values(&[outcome.as_str()]).inc();
            }
            outcome
        });

        attempt
            .await
            .map_err(|e| OrchestratorError::TaskFailed(e.to_string()))?
    }

    async fn run_phases(
        &self,
        item: &Item,
        credentials: &DestinationCredentials,
    ) -> Result<TransferOutcome, OrchestratorError> {
        let timeout = self.call_timeout();

        info!("Acquiring asset for {} ({})", item.id, item.title);
        self.emit(
            item,
            ItemStatus::Acquiring,
            format!("Resolving asset from {}", self.source.name()),
            None,
        )
        .await;

        let started = Instant::now();
        let resolved = self
            .retry
            .run("resolve_asset", timeout, || self.source.resolve_asset(item))
            .await;
        PHASE_DURATION
            .with_label_values(&["acquiring"])
            .observe(started.elapsed().as_secs_f64());

        let asset = match resolved {
            Ok(asset) => asset,
            Err(e) => return self.fail(item, ItemStatus::Acquiring, e).await,
        };

        self.queue
            .write()
            .await
            .transition(&item.id, ItemStatus::Publishing)?;
        self.emit(
            item,
            ItemStatus::Publishing,
            format!(
                "Publishing {} asset to {}",
                asset.format,
                self.destination.name()
            ),
            None,
        )
        .await;

        let started = Instant::now();
        let published = self
            .retry
            .run("publish", timeout, || {
                self.destination.publish(&asset, credentials)
            })
            .await;
        PHASE_DURATION
            .with_label_values(&["publishing"])
            .observe(started.elapsed().as_secs_f64());

        let result = match published {
            Ok(result) => result,
            Err(e) => return self.fail(item, ItemStatus::Publishing, e).await,
        };

        {
            let mut queue = self.queue.write().await;
            let stored = queue.transition(&item.id, ItemStatus::Completed)?;
            stored.publish_result = Some(result.clone());
        }
        info!(
            "Transfer of {} completed: {} ({})",
            item.id, result.remote_id, result.share_url
        );
        self.emit(
            item,
            ItemStatus::Completed,
            format!("Published as {} ({})", result.remote_id, result.share_url),
            None,
        )
        .await;

        Ok(TransferOutcome::Completed {
            item_id: item.id.clone(),
            result,
        })
    }

    async fn fail(
        &self,
        item: &Item,
        phase: ItemStatus,
        error: PlatformError,
    ) -> Result<TransferOutcome, OrchestratorError> {
        let failure = TransferFailure::from(&error);

        {
            let mut queue = self.queue.write().await;
            let stored = queue.transition(&item.id, ItemStatus::Failed)?;
            stored.last_error = Some(failure.clone());
        }

        warn!("Transfer of {} failed while {}: {}", item.id, phase, error);
        TRANSFER_FAILURES
            .with_label_values(&[phase.as_str(), failure.kind.as_str()])
            .inc();
        self.emit(
            item,
            ItemStatus::Failed,
            failure.message.clone(),
            Some(failure.kind),
        )
        .await;

        Ok(TransferOutcome::Failed {
            item_id: item.id.clone(),
            failure,
            retry_after_secs: error.retry_after().map(|d| d.as_secs()),
        })
    }

    // =========================================================================
    // Auto-cycle
    // =========================================================================

    /// Start the auto-cycle with the given session credentials.
    ///
    /// Returns `Ok(false)` if it was already running. The session is held by
    /// the cycle until it stops.
    pub async fn start(self: &Arc<Self>, session: SessionConfig) -> Result<bool, OrchestratorError> {
        session
            .destination
            .validate()
            .map_err(|e| OrchestratorError::InvalidCredentials(e.detail().to_string()))?;
        if let Some(source) = &session.source {
            source
                .validate()
                .map_err(|e| OrchestratorError::InvalidCredentials(e.detail().to_string()))?;
        }

        if self.running.swap(true, Ordering::SeqCst) {
            warn!("Auto-cycle already running");
            return Ok(false);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        info!("Starting auto-cycle");

        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            this.cycle(session, generation).await;
        });
        {
            let mut handles = self.cycle_handles.lock().await;
            handles.retain(|h| !h.is_finished());
            handles.push(handle);
        }

        self.notify(OrchestratorUpdate::RunningChanged { running: true });
        Ok(true)
    }

    /// Stop the auto-cycle. The in-flight transfer, if any, runs to
    /// completion; idle waits and cooldowns are interrupted.
    ///
    /// Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        if !self.running.swap(false, Ordering::SeqCst) {
            debug!("Auto-cycle not running");
            return false;
        }

        info!("Stopping auto-cycle");
        let _ = self.shutdown_tx.send(());
        self.notify(OrchestratorUpdate::RunningChanged { running: false });
        true
    }

    /// Stop the auto-cycle and wait for every cycle task to exit, including
    /// ones left over from an earlier stop that are still mid-transfer.
    pub async fn shutdown(&self) {
        self.stop();
        let handles = std::mem::take(&mut *self.cycle_handles.lock().await);
        for handle in handles {
            if let Err(e) = handle.await {
                error!("Auto-cycle task panicked: {}", e);
            }
        }
    }

    /// Enable or disable the auto-cycle. Enabling requires a session.
    pub async fn set_auto_run(
        self: &Arc<Self>,
        enabled: bool,
        session: Option<SessionConfig>,
    ) -> Result<bool, OrchestratorError> {
        if !enabled {
            return Ok(self.stop());
        }
        let session = session.ok_or_else(|| {
            OrchestratorError::InvalidCredentials(
                "session credentials are required to start".to_string(),
            )
        })?;
        self.start(session).await
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Run the auto-cycle in the current task until stopped.
    ///
    /// [`start`](Self::start) spawns this; calling it directly only does
    /// something while the running flag is set.
    pub async fn run_auto_cycle(self: &Arc<Self>, session: SessionConfig) {
        let generation = self.generation.load(Ordering::SeqCst);
        self.cycle(session, generation).await;
    }

    fn owns_run(&self, generation: u64) -> bool {
        self.running.load(Ordering::SeqCst)
            && self.generation.load(Ordering::SeqCst) == generation
    }

    async fn cycle(self: &Arc<Self>, session: SessionConfig, generation: u64) {
        let mut shutdown_rx = self.shutdown_tx.subscribe();
        let poll_interval = Duration::from_millis(self.config.auto_poll_interval_ms);
        let discovery_interval = Duration::from_secs(self.config.discovery_interval_secs);
        let mut last_discovery: Option<Instant> = None;

        info!("Auto-cycle started");
        while self.owns_run(generation) {
            if let Some(source) = &session.source {
                let due = !discovery_interval.is_zero()
                    && last_discovery
                        .map(|at| at.elapsed() >= discovery_interval)
                        .unwrap_or(true);
                if due {
                    last_discovery = Some(Instant::now());
                    if let Err(e) = self.discover(source).await {
                        warn!("Periodic discovery failed: {}", e);
                    }
                    continue;
                }
            }

            let next = self.queue.read().await.first_pending();
            let Some(item_id) = next else {
                tokio::select! {
                    _ = shutdown_rx.recv() => break,
                    _ = self.discovered.notified() => {}
                    _ = tokio::time::sleep(poll_interval) => {}
                }
                continue;
            };

            match self.transfer(&item_id, &session.destination).await {
                Ok(TransferOutcome::Failed {
                    failure,
                    retry_after_secs,
                    ..
                }) if failure.kind.needs_cooldown() => {
                    let cooldown = retry_after_secs
                        .map(Duration::from_secs)
                        .unwrap_or(Duration::from_secs(self.config.rate_limit_cooldown_secs));
                    info!(
                        "{} from platform, cooling down for {}s",
                        failure.kind,
                        cooldown.as_secs()
                    );
                    tokio::select! {
                        _ = shutdown_rx.recv() => break,
                        _ = tokio::time::sleep(cooldown) => {}
                    }
                }
                Ok(_) => {}
                Err(OrchestratorError::ItemNotFound(id)) => {
                    debug!("Item {} left the queue before its transfer", id);
                }
                Err(e) => {
                    error!("Auto-cycle stopping after orchestration error: {}", e);
                    if self.generation.load(Ordering::SeqCst) == generation {
                        self.stop();
                    }
                    break;
                }
            }
        }
        info!("Auto-cycle stopped");
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Snapshot of the queue in discovery order.
    pub async fn items(&self) -> Vec<Item> {
        self.queue.read().await.snapshot()
    }

    pub async fn item(&self, item_id: &str) -> Option<Item> {
        self.queue.read().await.get(item_id).cloned()
    }

    /// Retained events, newest first.
    pub async fn events(&self) -> Vec<TransferEvent> {
        self.events.read().await.snapshot()
    }

    /// At most `limit` newest events.
    pub async fn recent_events(&self, limit: usize) -> Vec<TransferEvent> {
        self.events.read().await.latest(limit)
    }

    /// Retained events for one item, newest first.
    pub async fn item_events(&self, item_id: &str) -> Vec<TransferEvent> {
        self.events.read().await.for_item(item_id)
    }

    pub async fn status(&self) -> OrchestratorStatus {
        let (total_items, pending, acquiring, publishing, completed, failed) = {
            let queue = self.queue.read().await;
            (
                queue.len(),
                queue.count(ItemStatus::Pending),
                queue.count(ItemStatus::Acquiring),
                queue.count(ItemStatus::Publishing),
                queue.count(ItemStatus::Completed),
                queue.count(ItemStatus::Failed),
            )
        };

        OrchestratorStatus {
            running: self.is_running(),
            active_item: self.active_item.read().await.clone(),
            total_items,
            pending_count: pending,
            acquiring_count: acquiring,
            publishing_count: publishing,
            completed_count: completed,
            failed_count: failed,
            events_recorded: self.events.read().await.total_recorded(),
            last_discovery_at: *self.last_discovery_at.read().await,
        }
    }

    /// Drop completed items from the queue. Returns how many were removed.
    pub async fn clear_finished(&self) -> usize {
        let removed = self.queue.write().await.remove_completed();
        if removed > 0 {
            info!("Cleared {} completed items", removed);
        }
        removed
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.config.call_timeout_secs)
    }

    async fn emit(
        &self,
        item: &Item,
        phase: ItemStatus,
        message: String,
        error_kind: Option<ErrorKind>,
    ) {
        let event = self
            .events
            .write()
            .await
            .record(&item.id, &item.title, phase, message, error_kind);
        debug!("Event {} for {}: {} {}", event.id, event.item_id, event.phase, event.message);
        self.notify(OrchestratorUpdate::Event(event));
    }

    fn notify(&self, update: OrchestratorUpdate) {
        if let Some(callback) = &self.update_callback {
            callback(&update);
        }
    }
}
