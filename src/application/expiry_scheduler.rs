//! License expiry scheduler.
//!
//! A background task that sweeps licenses once on start and then on every
//! interval tick:
//!
//! - the warn sweep emits a warning event for licenses expiring in
//!   `warning_days`, without changing them
//! - the expire sweep moves overdue Pending or Verified licenses to Expired and
//!   re-derives store KYC
//!
//! Each license is handled in its own transaction. A failure stops the current
//! sweep but not the other one; remaining licenses are picked up on the next
//! tick.

use chrono::{Days, NaiveDate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use crate::application::outbox::emit_event;
use crate::domain::foundation::{Actor, DomainError, LicenseId, Timestamp};
use crate::domain::license::{License, LicenseStatusChanged, EXPIRED_BY_SCHEDULER};
use crate::ports::{settle, ComplianceTx, KycReconciliation, LicenseReader, TransactionManager};

/// Scheduler timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpirySchedulerConfig {
    pub interval: Duration,
    /// Days ahead of expiry at which the warning is emitted.
    pub warning_days: u32,
}

impl Default for ExpirySchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(24 * 60 * 60),
            warning_days: 14,
        }
    }
}

/// Outcome of one pass over both sweeps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SweepReport {
    pub warned: usize,
    pub expired: usize,
    /// Candidates that were deleted or finalized before their transaction.
    pub skipped: usize,
}

pub struct ExpiryScheduler {
    reader: Arc<dyn LicenseReader>,
    transactions: Arc<dyn TransactionManager>,
    kyc: Arc<dyn KycReconciliation>,
    config: ExpirySchedulerConfig,
}

impl ExpiryScheduler {
    pub fn new(
        reader: Arc<dyn LicenseReader>,
        transactions: Arc<dyn TransactionManager>,
        kyc: Arc<dyn KycReconciliation>,
        config: ExpirySchedulerConfig,
    ) -> Self {
        Self {
            reader,
            transactions,
            kyc,
            config,
        }
    }

    /// Runs [`Self::run`] on a new tokio task.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }

    /// Sweeps immediately, then on every tick, until `shutdown` turns true or
    /// its sender is dropped. Shutdown is observed between sweeps only.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            interval_secs = self.config.interval.as_secs(),
            warning_days = self.config.warning_days,
            "License expiry scheduler started"
        );

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                _ = ticker.tick() => {
                    match self.run_once(Timestamp::now()).await {
                        Ok(report) => info!(
                            warned = report.warned,
                            expired = report.expired,
                            skipped = report.skipped,
                            "License expiry sweep finished"
                        ),
                        Err(e) => warn!(error = %e, "License expiry sweep failed"),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        info!("License expiry scheduler stopped");
    }

    /// Runs the warn sweep and then the expire sweep as of `now`.
    ///
    /// The expire sweep runs even when the warn sweep fails; the first error
    /// is returned.
    pub async fn run_once(&self, now: Timestamp) -> Result<SweepReport, DomainError> {
        let today = now.utc_date();
        let warned = self.warn_sweep(today, now).await;
        let expired = self.expire_sweep(today, now).await;

        if let (Err(_), Err(e)) = (&warned, &expired) {
            warn!(error = %e, "License expire sweep failed");
        }
        let warned = warned?;
        let (expired, skipped) = expired?;
        Ok(SweepReport {
            warned,
            expired,
            skipped,
        })
    }

    async fn warn_sweep(&self, today: NaiveDate, now: Timestamp) -> Result<usize, DomainError> {
        let target = today
            .checked_add_days(Days::new(u64::from(self.config.warning_days)))
            .ok_or_else(|| DomainError::internal("warning date out of range"))?;

        let candidates = self
            .reader
            .find_expiring_on(target)
            .await
            .map_err(|e| e.in_operation("find_expiring_licenses"))?;

        for license in &candidates {
            let mut tx = self
                .transactions
                .begin()
                .await
                .map_err(|e| e.in_operation("warn_expiring_license"))?;
            let result = emit_event(
                &mut *tx,
                &LicenseStatusChanged::expiry_warning(license, now),
                &Actor::System,
                license.store_id,
            )
            .await;
            settle(tx, result)
                .await
                .map_err(|e| e.in_operation("warn_expiring_license"))?;
            debug!(license_id = %license.id, expires_on = %target, "Expiry warning emitted");
        }

        Ok(candidates.len())
    }

    async fn expire_sweep(&self, today: NaiveDate, now: Timestamp) -> Result<(usize, usize), DomainError> {
        let candidates = self
            .reader
            .find_due_for_expiry(today)
            .await
            .map_err(|e| e.in_operation("find_due_licenses"))?;

        let mut expired = 0;
        let mut skipped = 0;
        for candidate in &candidates {
            let mut tx = self
                .transactions
                .begin()
                .await
                .map_err(|e| e.in_operation("expire_license"))?;
            let result = self.expire_one(&mut *tx, candidate.id, today, now).await;
            let outcome = settle(tx, result)
                .await
                .map_err(|e| e.in_operation("expire_license"))?;

            match outcome {
                Some(license) => {
                    expired += 1;
                    info!(license_id = %license.id, store_id = %license.store_id, "License expired");
                }
                None => {
                    skipped += 1;
                    debug!(license_id = %candidate.id, "Expiry candidate no longer due");
                }
            }
        }

        Ok((expired, skipped))
    }

    async fn expire_one(
        &self,
        tx: &mut dyn ComplianceTx,
        license_id: LicenseId,
        today: NaiveDate,
        now: Timestamp,
    ) -> Result<Option<License>, DomainError> {
        let Some(mut license) = tx.find_license_for_update(license_id).await? else {
            return Ok(None);
        };
        if !license.is_due_for_expiry(today) {
            return Ok(None);
        }

        let previous = license.expire(now)?;
        tx.update_license(&license).await?;
        self.kyc.reconcile_in(tx, license.store_id).await?;

        let event = LicenseStatusChanged::transitioned(&license, previous, Some(EXPIRED_BY_SCHEDULER.to_string()));
        emit_event(tx, &event, &Actor::System, license.store_id).await?;
        Ok(Some(license))
    }
}
