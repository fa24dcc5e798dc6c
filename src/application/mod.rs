//! Application layer - Commands, Queries, and Handlers.
//!
//! Orchestrates domain operations over the ports. Every mutation runs inside
//! one transaction that also carries its outbox entries.

pub mod expiry_scheduler;
pub mod handlers;
pub mod outbox;

pub use expiry_scheduler::{ExpiryScheduler, ExpirySchedulerConfig, SweepReport};
pub use handlers::{
    CreateLicenseCommand, CreateLicenseHandler, CreateLicenseResult, DeleteLicenseCommand,
    DeleteLicenseHandler, DeleteLicenseResult, HandlePaymentWebhookCommand,
    HandlePaymentWebhookHandler, HandlePaymentWebhookResult, IdempotencyCheck, IdempotencyGuard,
    KycReconciler, LicenseListItem, ListLicensesHandler, ListLicensesQuery, PaymentEventOutcome,
    PaymentEventReconciler, VerifyLicenseCommand, VerifyLicenseHandler, VerifyLicenseResult,
};
pub use outbox::emit_event;
