//! Store handlers.

mod reconcile_kyc;

pub use reconcile_kyc::KycReconciler;
