//! CreateLicenseHandler - Command handler for submitting a license.

use chrono::NaiveDate;
use std::sync::Arc;
use tracing::info;

use crate::application::outbox::emit_event;
use crate::domain::foundation::{Actor, DomainError, ErrorCode, EventId, MediaId, StoreId, Timestamp, UserId};
use crate::domain::license::{License, LicenseDetails, LicenseStatusChanged};
use crate::domain::media::AttachmentTarget;
use crate::domain::store::LicensePolicy;
use crate::ports::{settle, ComplianceTx, MediaRepository, MembershipChecker, TransactionManager};

/// Command to submit a new license for review.
#[derive(Debug, Clone)]
pub struct CreateLicenseCommand {
    pub user_id: UserId,
    pub store_id: StoreId,
    pub media_id: Option<MediaId>,
    pub issuing_jurisdiction: String,
    pub license_type: String,
    pub license_number: String,
    pub issued_on: Option<NaiveDate>,
    pub expires_on: Option<NaiveDate>,
}

#[derive(Debug, Clone)]
pub struct CreateLicenseResult {
    pub license: License,
    pub event_id: EventId,
}

/// Handler for license submission.
///
/// Creates the license Pending, links its document and emits
/// `LicenseStatusChanged` in one transaction. Store KYC is not touched:
/// a Pending license never changes the derived status.
pub struct CreateLicenseHandler {
    transactions: Arc<dyn TransactionManager>,
    memberships: Arc<dyn MembershipChecker>,
    media: Arc<dyn MediaRepository>,
    policy: LicensePolicy,
}

impl CreateLicenseHandler {
    pub fn new(
        transactions: Arc<dyn TransactionManager>,
        memberships: Arc<dyn MembershipChecker>,
        media: Arc<dyn MediaRepository>,
        policy: LicensePolicy,
    ) -> Self {
        Self {
            transactions,
            memberships,
            media,
            policy,
        }
    }

    pub async fn handle(&self, cmd: CreateLicenseCommand) -> Result<CreateLicenseResult, DomainError> {
        let allowed = self
            .memberships
            .has_any_role(&cmd.user_id, cmd.store_id, &self.policy.create_roles)
            .await
            .map_err(|e| e.in_operation("create_license"))?;
        if !allowed {
            return Err(DomainError::forbidden(format!(
                "Creating licenses requires one of: {}",
                self.policy.create_roles
            )));
        }

        let details = LicenseDetails::new(
            cmd.media_id,
            &cmd.issuing_jurisdiction,
            &cmd.license_type,
            &cmd.license_number,
            cmd.issued_on,
            cmd.expires_on,
        )?;

        let media = self
            .media
            .find_by_id(details.media_id)
            .await
            .map_err(|e| e.in_operation("create_license"))?
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::MediaNotFound,
                    format!("Media {} not found", details.media_id),
                )
            })?;
        media.ensure_license_document(cmd.store_id)?;

        let license = License::submit(cmd.store_id, cmd.user_id.clone(), details, Timestamp::now());
        let actor = Actor::User {
            user_id: cmd.user_id,
            store_id: cmd.store_id,
        };

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(|e| e.in_operation("create_license"))?;
        let result = persist(&mut *tx, &license, &actor).await;
        let event_id = settle(tx, result)
            .await
            .map_err(|e| e.in_operation("create_license"))?;

        info!(
            license_id = %license.id,
            store_id = %license.store_id,
            license_type = %license.details.license_type,
            "License submitted"
        );

        Ok(CreateLicenseResult { license, event_id })
    }
}

async fn persist(tx: &mut dyn ComplianceTx, license: &License, actor: &Actor) -> Result<EventId, DomainError> {
    tx.insert_license(license).await?;
    tx.link_attachments(
        AttachmentTarget::license(license.id, license.store_id),
        &[license.details.media_id],
    )
    .await?;
    emit_event(tx, &LicenseStatusChanged::created(license), actor, license.store_id).await
}
