//! Store compliance view.
//!
//! # Module Structure
//!
//! - `kyc` - KycStatus and its derivation from license statuses
//! - `roles` - Store roles and per-operation role sets

mod kyc;
mod roles;

pub use kyc::{derive_kyc_status, KycStatus};
pub use roles::{LicensePolicy, RoleSet, StoreRole};
