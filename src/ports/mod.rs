//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Transactional Ports
//!
//! - `TransactionManager` / `ComplianceTx` - Unit of work over licenses, stores,
//!   subscriptions, attachments and the outbox
//! - `OutboxWriter` - Event append through an open transaction
//! - `KycReconciliation` - Store KYC re-derivation inside a transaction
//!
//! ## Read Ports
//!
//! - `LicenseReader` - Listing and scheduler candidate selection
//! - `MediaRepository` - Uploaded document lookups
//! - `MembershipChecker` - Store role checks
//!
//! ## External Service Ports
//!
//! - `DocumentUrlSigner` - Signed download URLs
//! - `PaymentProvider` - Subscription lookups
//! - `IdempotencyStore` - Set-if-absent keys for webhook dedupe

mod document_url_signer;
mod idempotency_store;
mod kyc_reconciliation;
mod license_reader;
mod media_repository;
mod membership_checker;
mod outbox_writer;
mod payment_provider;
mod transaction;

pub use document_url_signer::DocumentUrlSigner;
pub use idempotency_store::IdempotencyStore;
pub use kyc_reconciliation::{KycOutcome, KycReconciliation};
pub use license_reader::{LicenseReader, Page, PageRequest};
pub use media_repository::MediaRepository;
pub use membership_checker::MembershipChecker;
pub use outbox_writer::{OutboxEntry, OutboxWriter};
pub use payment_provider::{PaymentError, PaymentErrorCode, PaymentProvider};
pub use transaction::{
    settle, AttachmentTx, ComplianceTx, LicenseTx, StoreTx, SubscriptionTx, TransactionManager,
};
