//! Application handlers.
//!
//! Command and query handlers that orchestrate domain operations.

pub mod billing;
pub mod license;
pub mod store;

pub use billing::{
    HandlePaymentWebhookCommand, HandlePaymentWebhookHandler, HandlePaymentWebhookResult,
    IdempotencyCheck, IdempotencyGuard, PaymentEventOutcome, PaymentEventReconciler,
};
pub use license::{
    CreateLicenseCommand, CreateLicenseHandler, CreateLicenseResult, DeleteLicenseCommand,
    DeleteLicenseHandler, DeleteLicenseResult, LicenseListItem, ListLicensesHandler,
    ListLicensesQuery, VerifyLicenseCommand, VerifyLicenseHandler, VerifyLicenseResult,
};
pub use store::KycReconciler;
