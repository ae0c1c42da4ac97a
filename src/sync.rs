use crate::error::StoreError;
use crate::gateway::FeedbackGateway;
use crate::store::HistoryStore;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tokio::time::{self, Duration};
use tokio_util::sync::CancellationToken;

/// What one sync cycle accomplished.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CycleReport {
    /// Items confirmed by the collector and removed from the store.
    pub delivered: usize,
    /// Items left pending for the next cycle.
    pub failed: usize,
    /// True when the trigger was a no-op because a cycle was already
    /// running.
    pub skipped: bool,
}

impl CycleReport {
    fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }
}

/// Recurring, single-flight background drain of the pending queue.
///
/// One long-lived scheduler owns the "cycle active" flag and the recurring
/// timer; there is no process-global interval handle. Items are delivered
/// sequentially to bound outbound load, and a failed item simply stays
/// pending for the next cycle — indefinitely, with no backoff. That is the
/// documented retry policy, not an accident.
pub struct SyncScheduler {
    store: Arc<HistoryStore>,
    gateway: Arc<FeedbackGateway>,
    interval: Duration,
    cycle_active: AtomicBool,
    cancel: CancellationToken,
}

impl SyncScheduler {
    pub fn new(store: Arc<HistoryStore>, gateway: FeedbackGateway, interval_ms: u64) -> Self {
        Self {
            store,
            gateway: Arc::new(gateway),
            interval: Duration::from_millis(interval_ms),
            cycle_active: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        }
    }

    /// Start the recurring drain. The first cycle runs immediately, then
    /// once per interval. Returns the driving task's handle.
    pub fn spawn(self: &Arc<Self>) -> JoinHandle<()> {
        let scheduler = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = time::interval(scheduler.interval);
            loop {
                tokio::select! {
                    () = scheduler.cancel.cancelled() => break,
                    _ = ticker.tick() => match scheduler.run_cycle().await {
                        Ok(report) if report.skipped => {}
                        Ok(report) if report.delivered + report.failed > 0 => {
                            tracing::info!(
                                delivered = report.delivered,
                                failed = report.failed,
                                "sync cycle finished"
                            );
                        }
                        Ok(_) => {}
                        Err(e) => tracing::warn!("sync cycle aborted: {e}"),
                    },
                }
            }
            tracing::debug!("sync scheduler stopped");
        })
    }

    /// Stop future cycles. An in-flight cycle runs to completion.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Attempt delivery of every currently-pending item, exactly once each.
    ///
    /// Single-flight: an overlapping trigger returns a skipped report
    /// without touching the store or the network.
    pub async fn run_cycle(&self) -> Result<CycleReport, StoreError> {
        if self
            .cycle_active
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            tracing::debug!("sync cycle already in progress; skipping trigger");
            return Ok(CycleReport::skipped());
        }

        let result = self.drain().await;
        self.cycle_active.store(false, Ordering::SeqCst);
        result
    }

    async fn drain(&self) -> Result<CycleReport, StoreError> {
        let pending = self.store.read_pending().await?;
        if pending.is_empty() {
            return Ok(CycleReport::default());
        }

        let mut report = CycleReport::default();
        for item in &pending {
            match self.gateway.submit(item).await {
                Ok(()) => {
                    if !self.store.remove(&item.id).await? {
                        // Evicted between scan and confirmation.
                        tracing::debug!(id = %item.id, "delivered item no longer in store");
                    }
                    report.delivered += 1;
                }
                Err(e) => {
                    tracing::warn!(
                        id = %item.id,
                        transient = e.is_transient(),
                        "feedback delivery failed, will retry next cycle: {e}"
                    );
                    report.failed += 1;
                }
            }
        }

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EvictionPolicy;

    async fn scheduler_with_empty_store() -> SyncScheduler {
        let store = Arc::new(
            HistoryStore::in_memory(50, EvictionPolicy::Oldest)
                .await
                .unwrap(),
        );
        // No cycle ever reaches the network in these tests.
        let gateway = FeedbackGateway::new("http://127.0.0.1:9/feedback", 1);
        SyncScheduler::new(store, gateway, 30_000)
    }

    #[tokio::test]
    async fn empty_scan_ends_cycle_without_network() {
        let scheduler = scheduler_with_empty_store().await;
        let report = scheduler.run_cycle().await.unwrap();
        assert_eq!(report, CycleReport::default());
    }

    #[tokio::test]
    async fn overlapping_trigger_is_skipped() {
        let scheduler = scheduler_with_empty_store().await;
        scheduler.cycle_active.store(true, Ordering::SeqCst);

        let report = scheduler.run_cycle().await.unwrap();
        assert!(report.skipped);
        // The skipped trigger must not clear the running cycle's guard.
        assert!(scheduler.cycle_active.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn guard_clears_after_cycle() {
        let scheduler = scheduler_with_empty_store().await;
        scheduler.run_cycle().await.unwrap();
        assert!(!scheduler.cycle_active.load(Ordering::SeqCst));

        // A later trigger is accepted again.
        assert!(!scheduler.run_cycle().await.unwrap().skipped);
    }

    #[tokio::test]
    async fn stop_cancels_future_cycles() {
        let scheduler = Arc::new(scheduler_with_empty_store().await);
        let handle = scheduler.spawn();
        scheduler.stop();
        handle.await.unwrap();
    }
}
