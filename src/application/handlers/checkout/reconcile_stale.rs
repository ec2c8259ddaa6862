//! ReconcileStaleTransactionsHandler - background sweep for lost callbacks.
//!
//! Transactions stuck in `AwaitingGatewayResult` longer than the configured
//! age are polled, least recently checked first. Each inquiry is recorded
//! before it is sent, so a transaction the gateway never answers waits
//! another `stale_after` before it is asked again and cannot hold the batch.
//! A failed poll is logged and left for a later sweep.
//!
//! ## Graceful Shutdown
//!
//! [`run`](ReconcileStaleTransactionsHandler::run) finishes the batch in
//! progress before returning.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time;

use super::{PollTransactionStatusCommand, PollTransactionStatusHandler};
use crate::domain::checkout::{CheckoutError, TransactionStatus};
use crate::domain::foundation::Timestamp;
use crate::ports::TransactionRepository;

#[derive(Debug, Clone, Copy)]
pub struct StaleSweepConfig {
    /// Age after which an awaiting transaction is polled.
    pub stale_after: Duration,
    pub interval: Duration,
    pub batch_size: u32,
}

/// Tally of one sweep.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub examined: usize,
    pub settled: usize,
    pub still_awaiting: usize,
    pub failed: usize,
}

pub struct ReconcileStaleTransactionsHandler {
    repository: Arc<dyn TransactionRepository>,
    poller: Arc<PollTransactionStatusHandler>,
    config: StaleSweepConfig,
}

impl ReconcileStaleTransactionsHandler {
    pub fn new(
        repository: Arc<dyn TransactionRepository>,
        poller: Arc<PollTransactionStatusHandler>,
        config: StaleSweepConfig,
    ) -> Self {
        Self {
            repository,
            poller,
            config,
        }
    }

    /// Sweeps on every interval tick until `shutdown` flips to `true`.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.interval);
        interval.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = shutdown.changed() => {
                    if *shutdown.borrow() {
                        tracing::info!("Stale transaction sweep stopped");
                        return;
                    }
                }
                _ = interval.tick() => {
                    if let Err(e) = self.sweep_once().await {
                        tracing::error!(error = %e, "Stale transaction sweep failed");
                    }
                }
            }
        }
    }

    /// Polls one batch of stale transactions.
    pub async fn sweep_once(&self) -> Result<SweepReport, CheckoutError> {
        let cutoff = Timestamp::now().minus_secs(self.config.stale_after.as_secs());
        let ids = self
            .repository
            .find_awaiting_since(cutoff, self.config.batch_size)
            .await?;

        let mut report = SweepReport {
            examined: ids.len(),
            ..SweepReport::default()
        };

        for id in ids {
            if let Err(e) = self.repository.mark_polled(&id).await {
                tracing::warn!(transaction_id = %id, error = %e, "Could not record status inquiry");
            }
            match self.poller.handle(PollTransactionStatusCommand { transaction_id: id }).await {
                Ok(result) if result.status == TransactionStatus::AwaitingGatewayResult => {
                    report.still_awaiting += 1;
                }
                Ok(_) => report.settled += 1,
                Err(e) => {
                    tracing::warn!(transaction_id = %id, error = %e, "Stale transaction poll failed");
                    report.failed += 1;
                }
            }
        }

        if report.examined > 0 {
            tracing::info!(
                examined = report.examined,
                settled = report.settled,
                still_awaiting = report.still_awaiting,
                failed = report.failed,
                "Stale transaction sweep finished"
            );
        }
        Ok(report)
    }
}
