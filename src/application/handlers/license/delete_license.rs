//! DeleteLicenseHandler - Command handler for removing terminal licenses.

use std::sync::Arc;
use tracing::{info, warn};

use crate::domain::foundation::{DomainError, ErrorCode, LicenseId, StoreId, UserId};
use crate::domain::license::LicenseStatus;
use crate::domain::media::AttachmentTarget;
use crate::domain::store::{KycStatus, LicensePolicy};
use crate::ports::{settle, ComplianceTx, MembershipChecker, TransactionManager};

/// Command to delete a Rejected or Expired license.
#[derive(Debug, Clone)]
pub struct DeleteLicenseCommand {
    pub user_id: UserId,
    pub store_id: StoreId,
    pub license_id: LicenseId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteLicenseResult {
    pub license_id: LicenseId,
    /// True when the follow-up reset KYC to PendingVerification.
    pub kyc_reset: bool,
}

/// Handler for license deletion.
///
/// Deletion and attachment unlinking commit together. Afterwards, if the store
/// has no Verified license left, its KYC is reset to PendingVerification in a
/// separate best-effort transaction. No event is emitted.
pub struct DeleteLicenseHandler {
    transactions: Arc<dyn TransactionManager>,
    memberships: Arc<dyn MembershipChecker>,
    policy: LicensePolicy,
}

impl DeleteLicenseHandler {
    pub fn new(
        transactions: Arc<dyn TransactionManager>,
        memberships: Arc<dyn MembershipChecker>,
        policy: LicensePolicy,
    ) -> Self {
        Self {
            transactions,
            memberships,
            policy,
        }
    }

    pub async fn handle(&self, cmd: DeleteLicenseCommand) -> Result<DeleteLicenseResult, DomainError> {
        let allowed = self
            .memberships
            .has_any_role(&cmd.user_id, cmd.store_id, &self.policy.delete_roles)
            .await
            .map_err(|e| e.in_operation("delete_license"))?;
        if !allowed {
            return Err(DomainError::forbidden(format!(
                "Deleting licenses requires one of: {}",
                self.policy.delete_roles
            )));
        }

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(|e| e.in_operation("delete_license"))?;
        let result = remove(&mut *tx, &cmd).await;
        settle(tx, result)
            .await
            .map_err(|e| e.in_operation("delete_license"))?;

        info!(license_id = %cmd.license_id, store_id = %cmd.store_id, "License deleted");

        let kyc_reset = match self.reset_kyc_if_unverified(cmd.store_id).await {
            Ok(reset) => reset,
            Err(e) => {
                warn!(
                    store_id = %cmd.store_id,
                    error = %e,
                    "KYC follow-up after license deletion failed"
                );
                false
            }
        };

        Ok(DeleteLicenseResult {
            license_id: cmd.license_id,
            kyc_reset,
        })
    }

    async fn reset_kyc_if_unverified(&self, store_id: StoreId) -> Result<bool, DomainError> {
        let mut tx = self.transactions.begin().await?;
        let result = reset_in(&mut *tx, store_id).await;
        settle(tx, result).await
    }
}

async fn remove(tx: &mut dyn ComplianceTx, cmd: &DeleteLicenseCommand) -> Result<(), DomainError> {
    let license = tx
        .find_license_for_update(cmd.license_id)
        .await?
        .filter(|l| l.store_id == cmd.store_id)
        .ok_or_else(|| {
            DomainError::new(
                ErrorCode::LicenseNotFound,
                format!("License {} not found", cmd.license_id),
            )
        })?;
    license.ensure_deletable()?;

    tx.unlink_attachments(AttachmentTarget::license(license.id, license.store_id))
        .await?;
    if !tx.delete_license(license.id).await? {
        return Err(DomainError::new(
            ErrorCode::LicenseNotFound,
            format!("License {} not found", license.id),
        ));
    }
    Ok(())
}

async fn reset_in(tx: &mut dyn ComplianceTx, store_id: StoreId) -> Result<bool, DomainError> {
    let Some(current) = tx.store_kyc_status(store_id).await? else {
        return Ok(false);
    };
    let statuses = tx.license_statuses(store_id).await?;
    if statuses.contains(&LicenseStatus::Verified) || current == KycStatus::PendingVerification {
        return Ok(false);
    }
    tx.set_store_kyc_status(store_id, KycStatus::PendingVerification)
        .await?;
    Ok(true)
}
