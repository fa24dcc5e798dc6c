//! License domain module.
//!
//! # Module Structure
//!
//! - `aggregate` - License aggregate and validated submission details
//! - `status` - LicenseStatus state machine
//! - `license_type` - Recognized license types
//! - `events` - LicenseStatusChanged outbox event

mod aggregate;
mod events;
mod license_type;
mod status;

pub use aggregate::{License, LicenseDetails};
pub use events::{LicenseStatusChanged, EXPIRED_BY_SCHEDULER};
pub use license_type::LicenseType;
pub use status::LicenseStatus;
