use crate::repo::pending_payments_repo::PendingPaymentStore;
use anyhow::Result;
use chrono::{DateTime, Duration, TimeZone, Utc};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;

pub const STALE_AFTER_HOURS: i64 = 24;

const NEVER: i64 = i64::MIN;

/// Shared lifecycle of the sweep loop. Clones observe the same flags.
#[derive(Clone)]
pub struct SweepState {
    running: Arc<AtomicBool>,
    last_run_millis: Arc<AtomicI64>,
    last_cancelled: Arc<AtomicU64>,
}

impl Default for SweepState {
    fn default() -> Self {
        Self {
            running: Arc::new(AtomicBool::new(false)),
            last_run_millis: Arc::new(AtomicI64::new(NEVER)),
            last_cancelled: Arc::new(AtomicU64::new(0)),
        }
    }
}

impl SweepState {
    /// Returns `false` if a loop already owns this state.
    pub fn try_start(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn last_run_at(&self) -> Option<DateTime<Utc>> {
        match self.last_run_millis.load(Ordering::Acquire) {
            NEVER => None,
            millis => Utc.timestamp_millis_opt(millis).single(),
        }
    }

    /// Rows cancelled by the most recent sweep.
    pub fn last_cancelled(&self) -> u64 {
        self.last_cancelled.load(Ordering::Acquire)
    }

    pub fn record(&self, at: DateTime<Utc>, cancelled: u64) {
        self.last_cancelled.store(cancelled, Ordering::Release);
        self.last_run_millis.store(at.timestamp_millis(), Ordering::Release);
    }
}

#[derive(Clone)]
pub struct SweepJob {
    pub payments: Arc<dyn PendingPaymentStore>,
    pub interval: std::time::Duration,
    pub stale_after: Duration,
}

impl SweepJob {
    pub fn new(payments: Arc<dyn PendingPaymentStore>, interval: std::time::Duration) -> Self {
        Self {
            payments,
            interval,
            stale_after: Duration::hours(STALE_AFTER_HOURS),
        }
    }

    /// Cancels every still-pending payment older than the staleness window.
    /// No notifications are emitted for swept rows.
    pub async fn sweep(&self) -> Result<u64> {
        self.sweep_at(Utc::now()).await
    }

    pub async fn sweep_at(&self, now: DateTime<Utc>) -> Result<u64> {
        let cutoff = now - self.stale_after;
        let cancelled = self.payments.bulk_cancel_stale(cutoff).await?;
        if cancelled > 0 {
            tracing::info!(cancelled, cutoff = %cutoff, "cancelled stale pending payments");
        }
        Ok(cancelled)
    }

    pub async fn run(self, state: SweepState) {
        if !state.try_start() {
            tracing::warn!("sweep loop already running");
            return;
        }

        while state.is_running() {
            match self.sweep().await {
                Ok(cancelled) => state.record(Utc::now(), cancelled),
                Err(err) => tracing::error!("pending payment sweep error: {}", err),
            }
            tokio::time::sleep(self.interval).await;
        }

        tracing::info!("sweep loop stopped");
    }
}
