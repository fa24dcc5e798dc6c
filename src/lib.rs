//! Store Compliance - License lifecycle and KYC reconciliation for vendor stores
//!
//! This crate keeps a store's compliance (KYC) status consistent with its
//! licenses as they are created, verified, rejected, deleted or expire, emits
//! a domain event for every transition through a transactional outbox, and
//! mirrors payment-provider subscriptions into the store's active flag with
//! idempotent webhook handling.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
