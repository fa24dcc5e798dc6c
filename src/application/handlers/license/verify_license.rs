//! VerifyLicenseHandler - Command handler for reviewer decisions.

use std::sync::Arc;
use tracing::info;

use crate::application::outbox::emit_event;
use crate::domain::foundation::{Actor, DomainError, ErrorCode, EventId, LicenseId, Timestamp, UserId};
use crate::domain::license::{License, LicenseStatus, LicenseStatusChanged};
use crate::ports::{settle, ComplianceTx, KycOutcome, KycReconciliation, TransactionManager};

/// Command to verify or reject a Pending license.
#[derive(Debug, Clone)]
pub struct VerifyLicenseCommand {
    pub license_id: LicenseId,
    pub decision: LicenseStatus,
    pub reason: Option<String>,
    /// Reviewer identity, when the reviewing system supplies one.
    pub reviewer: Option<UserId>,
}

#[derive(Debug, Clone)]
pub struct VerifyLicenseResult {
    pub license: License,
    pub kyc: KycOutcome,
    pub event_id: EventId,
}

/// Handler for reviewer decisions.
///
/// The license transition, the store KYC re-derivation and the status event
/// commit together or not at all.
pub struct VerifyLicenseHandler {
    transactions: Arc<dyn TransactionManager>,
    kyc: Arc<dyn KycReconciliation>,
}

impl VerifyLicenseHandler {
    pub fn new(transactions: Arc<dyn TransactionManager>, kyc: Arc<dyn KycReconciliation>) -> Self {
        Self { transactions, kyc }
    }

    pub async fn handle(&self, cmd: VerifyLicenseCommand) -> Result<VerifyLicenseResult, DomainError> {
        if !matches!(cmd.decision, LicenseStatus::Verified | LicenseStatus::Rejected) {
            return Err(DomainError::new(
                ErrorCode::InvalidDecision,
                format!("Decision must be verified or rejected, got {}", cmd.decision),
            )
            .with_detail("field", "decision"));
        }

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(|e| e.in_operation("verify_license"))?;
        let result = self.apply(&mut *tx, &cmd).await;
        let result = settle(tx, result)
            .await
            .map_err(|e| e.in_operation("verify_license"))?;

        info!(
            license_id = %result.license.id,
            store_id = %result.license.store_id,
            status = %result.license.status,
            kyc_status = %result.kyc.current,
            "License reviewed"
        );

        Ok(result)
    }

    async fn apply(
        &self,
        tx: &mut dyn ComplianceTx,
        cmd: &VerifyLicenseCommand,
    ) -> Result<VerifyLicenseResult, DomainError> {
        let mut license = tx.find_license_for_update(cmd.license_id).await?.ok_or_else(|| {
            DomainError::new(
                ErrorCode::LicenseNotFound,
                format!("License {} not found", cmd.license_id),
            )
        })?;

        let previous = license.decide(cmd.decision, Timestamp::now())?;
        tx.update_license(&license).await?;

        let kyc = self.kyc.reconcile_in(tx, license.store_id).await?;

        let reason = cmd
            .reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string);
        let event = LicenseStatusChanged::transitioned(&license, previous, reason);
        let event_id = emit_event(tx, &event, &Actor::Reviewer(cmd.reviewer.clone()), license.store_id).await?;

        Ok(VerifyLicenseResult {
            license,
            kyc,
            event_id,
        })
    }
}
