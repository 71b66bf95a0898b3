//! The drain task.
//!
//! One task per spool. Cycles run back to back on the blocking pool and are
//! awaited inside the loop, so two cycles never overlap: a slow sink delays
//! the next tick instead of racing it.

use std::sync::Arc;

use tokio::time::{self, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use super::config::DrainConfig;
use crate::spool::{DrainLease, DrainOutcome, Spool, SpoolResult};
use crate::sink::Sink;

/// Totals over the lifetime of one [`DrainLoop::run`]
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DrainSummary {
    /// Cycles run, recovery and shutdown cycles included
    pub cycles: u64,
    pub delivered: u64,
    pub corrupt_lines: u64,
    pub sink_failures: u64,
    pub storage_errors: u64,
}

impl DrainSummary {
    fn record(&mut self, result: &CycleResult) {
        self.cycles += 1;
        match result {
            CycleResult::Outcome(outcome) => {
                self.delivered += outcome.delivered() as u64;
                self.corrupt_lines += outcome.corrupt_lines() as u64;
                if outcome.is_sink_failure() {
                    self.sink_failures += 1;
                }
            }
            CycleResult::Failed => self.storage_errors += 1,
        }
    }
}

/// Result of one cycle as seen by the loop
#[derive(Debug)]
pub enum CycleResult {
    Outcome(DrainOutcome),
    /// Storage error or a panicked blocking task; already logged
    Failed,
}

/// Periodic drainer of one spool into one sink.
pub struct DrainLoop {
    spool: Arc<Spool>,
    sink: Arc<dyn Sink>,
    config: DrainConfig,
    _lease: DrainLease,
}

impl DrainLoop {
    /// Creates the loop and takes the spool's drain lease.
    ///
    /// # Errors
    ///
    /// `DrainerBusy` if another drainer already holds the lease.
    pub fn new(spool: Arc<Spool>, sink: Arc<dyn Sink>, config: DrainConfig) -> SpoolResult<Self> {
        let lease = DrainLease::acquire(spool.layout())?;
        Ok(Self {
            spool,
            sink,
            config,
            _lease: lease,
        })
    }

    pub fn config(&self) -> &DrainConfig {
        &self.config
    }

    /// Delivers a processing file left by a previous run, if any.
    pub async fn recover(&self) -> CycleResult {
        let spool = Arc::clone(&self.spool);
        let sink = Arc::clone(&self.sink);
        let result = tokio::task::spawn_blocking(move || spool.recover(sink.as_ref())).await;
        Self::settle("recovery", result)
    }

    /// Runs one drain cycle to completion.
    pub async fn run_cycle(&self) -> CycleResult {
        let spool = Arc::clone(&self.spool);
        let sink = Arc::clone(&self.sink);
        let result = tokio::task::spawn_blocking(move || spool.drain(sink.as_ref())).await;
        Self::settle("drain", result)
    }

    fn settle(
        phase: &'static str,
        result: Result<SpoolResult<DrainOutcome>, tokio::task::JoinError>,
    ) -> CycleResult {
        match result {
            Ok(Ok(outcome)) => {
                match &outcome {
                    DrainOutcome::Idle => debug!(phase, "nothing to drain"),
                    DrainOutcome::Delivered(report) => info!(
                        phase,
                        delivered = report.delivered,
                        corrupt = report.corrupt_lines,
                        recovered = report.recovered_batches,
                        "drain cycle complete"
                    ),
                    DrainOutcome::SinkFailed { retained, .. } => warn!(
                        phase,
                        retained = *retained,
                        "sink failed; batch retained for next cycle"
                    ),
                }
                CycleResult::Outcome(outcome)
            }
            Ok(Err(e)) => {
                error!(phase, code = e.code(), error = %e, "drain cycle failed");
                CycleResult::Failed
            }
            Err(e) => {
                error!(phase, error = %e, "drain task panicked");
                CycleResult::Failed
            }
        }
    }

    /// Runs until `cancel` fires.
    ///
    /// Recovery runs first. Cancellation is only observed between cycles,
    /// so an in-flight cycle always finishes. With `drain_on_shutdown`, one
    /// final cycle runs after the stop signal.
    pub async fn run(self, cancel: CancellationToken) -> DrainSummary {
        let mut summary = DrainSummary::default();

        info!(
            data_dir = %self.spool.layout().data_dir().display(),
            sink = self.sink.name(),
            interval_ms = self.config.interval_ms,
            "drain loop started"
        );

        let recovery = self.recover().await;
        summary.record(&recovery);

        let mut ticker = time::interval(self.config.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately; recovery already covered it.
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                _ = ticker.tick() => {
                    let result = self.run_cycle().await;
                    summary.record(&result);
                }
            }
        }

        if self.config.drain_on_shutdown {
            debug!("running final drain before shutdown");
            let result = self.run_cycle().await;
            summary.record(&result);
        }

        info!(
            cycles = summary.cycles,
            delivered = summary.delivered,
            sink_failures = summary.sink_failures,
            "drain loop stopped"
        );
        summary
    }
}
