/// Interval poller for the metals backend
///
/// Owns the interval task, an in-flight guard that turns overlapping ticks into
/// no-ops, and a monotonic sequence counter stamped on every update so the UI
/// can drop responses that resolve out of order.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local};
use futures::future::join;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::shared::api::MarketDataSource;
use crate::shared::error::ApiError;
use crate::shared::types::{InventorySnapshot, PriceSnapshot};

/// Which endpoints a poll cycle reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollTarget {
    /// Prices plus latest COMEX/LME inventory
    Terminal,
    /// Prices plus inventory aggregated across COMEX, LME and SHFE
    Monitor,
}

/// Poller configuration
#[derive(Debug, Clone)]
pub struct PollerConfig {
    /// Interval between cycles
    pub period: Duration,
    /// Maximum number of undelivered updates
    pub channel_buffer_size: usize,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            period: Duration::from_secs(1),
            channel_buffer_size: 16,
        }
    }
}

impl PollerConfig {
    /// Create a new configuration with a custom period
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ..Default::default()
        }
    }

    /// Set channel buffer size
    pub fn with_channel_buffer_size(mut self, size: usize) -> Self {
        self.channel_buffer_size = size;
        self
    }
}

/// Result of one poll cycle
#[derive(Debug, Clone)]
pub struct PollUpdate {
    /// Monotonic cycle number, starting at 1
    pub seq: u64,
    pub target: PollTarget,
    pub received_at: DateTime<Local>,
    pub prices: Result<PriceSnapshot, ApiError>,
    pub inventory: Result<InventorySnapshot, ApiError>,
}

impl PollUpdate {
    /// Both reads succeeded
    pub fn is_healthy(&self) -> bool {
        self.prices.is_ok() && self.inventory.is_ok()
    }

    pub fn first_error(&self) -> Option<&ApiError> {
        self.prices
            .as_ref()
            .err()
            .or_else(|| self.inventory.as_ref().err())
    }
}

/// What a call to [`Poller::refresh_now`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Cycle ran and its update was sent
    Delivered(u64),
    /// A previous cycle was still in flight
    Skipped,
    /// Update receiver dropped
    Closed,
}

/// Drops updates that are not newer than the last applied one
#[derive(Debug, Default)]
pub struct SequenceGate {
    latest: u64,
}

impl SequenceGate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn admit(&mut self, seq: u64) -> bool {
        if seq <= self.latest {
            debug!("Dropping stale update #{} (latest #{})", seq, self.latest);
            return false;
        }
        self.latest = seq;
        true
    }

    pub fn latest(&self) -> u64 {
        self.latest
    }
}

struct Shared {
    source: Arc<dyn MarketDataSource>,
    target: PollTarget,
    in_flight: AtomicBool,
    issued: AtomicU64,
    update_tx: mpsc::Sender<PollUpdate>,
}

/// Clears the in-flight flag however the cycle ends
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl Shared {
    async fn run_cycle(&self) -> PollOutcome {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Poll cycle still in flight, skipping");
            return PollOutcome::Skipped;
        }
        let _guard = InFlightGuard(&self.in_flight);

        let seq = self.issued.fetch_add(1, Ordering::Relaxed) + 1;
        let source = self.source.as_ref();

        let (prices, inventory) = match self.target {
            PollTarget::Terminal => {
                join(source.get_latest_prices(), source.get_latest_inventory()).await
            }
            PollTarget::Monitor => {
                join(source.get_latest_prices(), source.get_aggregated_inventory()).await
            }
        };

        if let Err(e) = &prices {
            warn!("Price refresh #{} failed: {}", seq, e);
        }
        if let Err(e) = &inventory {
            warn!("Inventory refresh #{} failed: {}", seq, e);
        }

        let update = PollUpdate {
            seq,
            target: self.target,
            received_at: Local::now(),
            prices,
            inventory,
        };

        if self.update_tx.send(update).await.is_err() {
            debug!("Update receiver dropped, discarding #{}", seq);
            return PollOutcome::Closed;
        }
        PollOutcome::Delivered(seq)
    }
}

/// Interval-driven poller with start/stop/refresh-now controls
pub struct Poller {
    shared: Arc<Shared>,
    config: PollerConfig,
    handle: Option<JoinHandle<()>>,
}

impl Poller {
    /// Create a stopped poller
    ///
    /// Returns the poller and the receiver for its updates
    pub fn new(
        source: Arc<dyn MarketDataSource>,
        target: PollTarget,
        config: PollerConfig,
    ) -> (Self, mpsc::Receiver<PollUpdate>) {
        let (update_tx, update_rx) = mpsc::channel(config.channel_buffer_size.max(1));
        let shared = Arc::new(Shared {
            source,
            target,
            in_flight: AtomicBool::new(false),
            issued: AtomicU64::new(0),
            update_tx,
        });

        (
            Self {
                shared,
                config,
                handle: None,
            },
            update_rx,
        )
    }

    /// Start ticking; the first cycle fires immediately
    pub fn start(&mut self) {
        if self.is_running() {
            return;
        }

        let shared = Arc::clone(&self.shared);
        let period = self.config.period;
        info!("Starting {:?} poller every {:?}", shared.target, period);

        self.handle = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                // Cycles run detached so a slow response cannot delay the timer;
                // the in-flight guard drops ticks that land while one is pending
                let shared = Arc::clone(&shared);
                tokio::spawn(async move {
                    shared.run_cycle().await;
                });
            }
        }));
    }

    /// Stop ticking; an in-flight cycle still completes and delivers
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            info!("Stopped {:?} poller", self.shared.target);
        }
    }

    /// Flip auto refresh, returning whether it is now running
    pub fn toggle(&mut self) -> bool {
        if self.is_running() {
            self.stop();
        } else {
            self.start();
        }
        self.is_running()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    /// Whether a cycle is currently awaiting responses
    pub fn is_in_flight(&self) -> bool {
        self.shared.in_flight.load(Ordering::Acquire)
    }

    pub fn period(&self) -> Duration {
        self.config.period
    }

    /// Run one cycle now, subject to the in-flight guard
    pub async fn refresh_now(&self) -> PollOutcome {
        self.shared.run_cycle().await
    }

    /// Fire-and-forget [`refresh_now`](Self::refresh_now) for key handlers
    pub fn trigger(&self) {
        let shared = Arc::clone(&self.shared);
        tokio::spawn(async move {
            shared.run_cycle().await;
        });
    }
}

impl Drop for Poller {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::types::DebugRecord;
    use async_trait::async_trait;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct MockSource {
        gated: bool,
        fail: AtomicBool,
        price_calls: AtomicUsize,
        latest_inventory_calls: AtomicUsize,
        aggregated_calls: AtomicUsize,
        entered: Notify,
        release: Notify,
    }

    impl MockSource {
        fn gated() -> Self {
            Self {
                gated: true,
                ..Default::default()
            }
        }

        fn price_calls(&self) -> usize {
            self.price_calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl MarketDataSource for MockSource {
        async fn get_latest_prices(&self) -> Result<PriceSnapshot, ApiError> {
            self.price_calls.fetch_add(1, Ordering::SeqCst);
            if self.gated {
                self.entered.notify_one();
                self.release.notified().await;
            }
            if self.fail.load(Ordering::SeqCst) {
                return Err(ApiError::Transport("connection refused".to_string()));
            }
            Ok(PriceSnapshot::default())
        }

        async fn get_latest_inventory(&self) -> Result<InventorySnapshot, ApiError> {
            self.latest_inventory_calls.fetch_add(1, Ordering::SeqCst);
            Ok(InventorySnapshot::default())
        }

        async fn get_aggregated_inventory(&self) -> Result<InventorySnapshot, ApiError> {
            self.aggregated_calls.fetch_add(1, Ordering::SeqCst);
            Ok(InventorySnapshot::default())
        }

        async fn get_debug_raw(&self, _key: &str) -> Result<DebugRecord, ApiError> {
            Ok(DebugRecord::default())
        }
    }

    #[tokio::test]
    async fn test_overlapping_refresh_is_skipped() {
        let source = Arc::new(MockSource::gated());
        let (poller, mut update_rx) =
            Poller::new(source.clone(), PollTarget::Terminal, PollerConfig::default());
        let poller = Arc::new(poller);

        let first = {
            let poller = Arc::clone(&poller);
            tokio::spawn(async move { poller.refresh_now().await })
        };

        // First cycle is now parked inside get_latest_prices
        source.entered.notified().await;
        assert!(poller.is_in_flight());

        assert_eq!(poller.refresh_now().await, PollOutcome::Skipped);
        assert_eq!(poller.refresh_now().await, PollOutcome::Skipped);
        assert_eq!(source.price_calls(), 1);

        source.release.notify_one();
        assert_eq!(first.await.unwrap(), PollOutcome::Delivered(1));
        assert!(!poller.is_in_flight());

        let update = update_rx.recv().await.unwrap();
        assert_eq!(update.seq, 1);
        assert!(update.is_healthy());
    }

    #[tokio::test]
    async fn test_guard_released_after_failure() {
        let source = Arc::new(MockSource::default());
        source.fail.store(true, Ordering::SeqCst);
        let (poller, mut update_rx) =
            Poller::new(source.clone(), PollTarget::Monitor, PollerConfig::default());

        assert_eq!(poller.refresh_now().await, PollOutcome::Delivered(1));
        let update = update_rx.recv().await.unwrap();
        assert!(!update.is_healthy());
        assert!(update.first_error().unwrap().is_connectivity());
        assert!(update.inventory.is_ok());

        source.fail.store(false, Ordering::SeqCst);
        assert_eq!(poller.refresh_now().await, PollOutcome::Delivered(2));
        assert!(update_rx.recv().await.unwrap().is_healthy());
    }

    #[tokio::test]
    async fn test_target_selects_inventory_endpoint() {
        let source = Arc::new(MockSource::default());

        let (terminal, _terminal_rx) =
            Poller::new(source.clone(), PollTarget::Terminal, PollerConfig::default());
        terminal.refresh_now().await;
        assert_eq!(source.latest_inventory_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.aggregated_calls.load(Ordering::SeqCst), 0);

        let (monitor, _monitor_rx) =
            Poller::new(source.clone(), PollTarget::Monitor, PollerConfig::default());
        monitor.refresh_now().await;
        assert_eq!(source.latest_inventory_calls.load(Ordering::SeqCst), 1);
        assert_eq!(source.aggregated_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_closed_receiver() {
        let source = Arc::new(MockSource::default());
        let (poller, update_rx) =
            Poller::new(source, PollTarget::Terminal, PollerConfig::default());
        drop(update_rx);
        assert_eq!(poller.refresh_now().await, PollOutcome::Closed);
        assert!(!poller.is_in_flight());
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let source = Arc::new(MockSource::default());
        let (mut poller, mut update_rx) = Poller::new(
            source,
            PollTarget::Terminal,
            PollerConfig::new(Duration::from_millis(10)),
        );

        poller.start();
        assert!(poller.is_running());

        let mut seqs = Vec::new();
        for _ in 0..2 {
            let update = tokio::time::timeout(Duration::from_secs(2), update_rx.recv())
                .await
                .expect("poller did not tick")
                .unwrap();
            seqs.push(update.seq);
        }
        assert!(seqs[1] > seqs[0]);

        assert!(!poller.toggle());
        assert!(!poller.is_running());
        assert!(poller.toggle());
        poller.stop();
        assert!(!poller.is_running());
    }

    #[test]
    fn test_sequence_gate_drops_stale_updates() {
        let mut gate = SequenceGate::new();
        assert!(gate.admit(1));
        assert!(gate.admit(3));
        assert!(!gate.admit(2));
        assert!(!gate.admit(3));
        assert!(gate.admit(4));
        assert_eq!(gate.latest(), 4);
    }
}
