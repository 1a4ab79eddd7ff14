//! Poller/Scheduler
//!
//! Single sequential loop: list pending requests, drive each through the
//! pipeline with pacing in between, sleep, repeat. Resilient to
//! single-cycle failures; stops cleanly between requests when asked.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Notify, RwLock};
use tracing::{debug, error, info};

use super::pipeline::{Outcome, Pipeline};
use crate::store::{RequestStore, StoreError};

/// Fixed pause between requests, pacing against downstream rate limits
pub const REQUEST_PACING: Duration = Duration::from_secs(2);

/// What one poll cycle did
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CycleResult {
    pub listed: usize,
    pub completed: usize,
    pub failed: usize,
    pub skipped: usize,
}

impl CycleResult {
    pub fn has_activity(&self) -> bool {
        self.listed > 0
    }
}

impl std::fmt::Display for CycleResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "listed: {}, completed: {}, failed: {}, skipped: {}",
            self.listed, self.completed, self.failed, self.skipped
        )
    }
}

/// Cumulative counters across the worker's lifetime
#[derive(Debug, Default, Clone)]
pub struct PollerStats {
    pub cycles: u64,
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
}

impl std::fmt::Display for PollerStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "cycles: {} | completed: {} | failed: {} | skipped: {}",
            self.cycles, self.completed, self.failed, self.skipped
        )
    }
}

pub struct Poller {
    store: Arc<dyn RequestStore>,
    pipeline: Pipeline,
    poll_interval: Duration,
    pacing: Duration,
    running: Arc<RwLock<bool>>,
    shutdown: Arc<Notify>,
    stats: Arc<RwLock<PollerStats>>,
}

impl Poller {
    pub fn new(store: Arc<dyn RequestStore>, pipeline: Pipeline, poll_interval: Duration) -> Self {
        Self {
            store,
            pipeline,
            poll_interval,
            pacing: REQUEST_PACING,
            running: Arc::new(RwLock::new(true)),
            shutdown: Arc::new(Notify::new()),
            stats: Arc::new(RwLock::new(PollerStats::default())),
        }
    }

    /// Override pacing (tests)
    #[cfg(test)]
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    /// Run one cycle: list pending requests and pipeline each in turn.
    ///
    /// A listing failure abandons the cycle; per-request outcomes never
    /// surface here as errors.
    pub async fn run_cycle(&self) -> Result<CycleResult, StoreError> {
        let pending = self.store.list_pending().await?;
        let mut result = CycleResult {
            listed: pending.len(),
            ..CycleResult::default()
        };

        if pending.is_empty() {
            debug!("no pending withdrawals");
            return Ok(result);
        }
        info!(count = pending.len(), "found pending withdrawals");

        let mut first = true;
        for request in &pending {
            // Honor a stop request between requests, never mid-transfer.
            if !*self.running.read().await {
                info!("stop requested, abandoning remainder of cycle");
                break;
            }
            if !first {
                tokio::time::sleep(self.pacing).await;
            }
            first = false;

            match self.pipeline.process(request).await {
                Outcome::Completed { .. } => result.completed += 1,
                Outcome::Failed { .. } => result.failed += 1,
                Outcome::Skipped => result.skipped += 1,
            }
        }

        let mut stats = self.stats.write().await;
        stats.cycles += 1;
        stats.completed += result.completed as u64;
        stats.failed += result.failed as u64;
        stats.skipped += result.skipped as u64;

        Ok(result)
    }

    /// Run the poll loop until [`stop`](Self::stop) is called.
    pub async fn run(&self) {
        *self.running.write().await = true;
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "poller started"
        );

        loop {
            if !*self.running.read().await {
                break;
            }

            match self.run_cycle().await {
                Ok(result) if result.has_activity() => info!("[cycle] {}", result),
                Ok(_) => {}
                // Store unreachable or listing rejected: log and try again
                // next interval.
                Err(e) => error!(error = %e, "poll cycle failed"),
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                _ = self.shutdown.notified() => break,
            }
        }

        let stats = self.stats.read().await;
        info!(%stats, "poller stopped");
    }

    /// Request a stop; takes effect between requests or cycles.
    pub async fn stop(&self) {
        *self.running.write().await = false;
        self.shutdown.notify_waiters();
    }

    /// Cumulative statistics
    pub async fn stats(&self) -> PollerStats {
        self.stats.read().await.clone()
    }
}
