//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, timestamps, events, errors)
//! - `license` - License aggregate, status state machine and events
//! - `store` - Store KYC derivation and membership roles
//! - `media` - Media read model and license-document rules
//! - `billing` - Subscription mirror and webhook verification

pub mod billing;
pub mod foundation;
pub mod license;
pub mod media;
pub mod store;
