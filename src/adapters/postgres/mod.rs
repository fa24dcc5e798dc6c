//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresTransactionManager` - Transactional writes, including the outbox
//! - `PostgresLicenseReader` - Listing and expiry candidate queries
//! - `PostgresMediaRepository` - Uploaded document lookups
//! - `PostgresMembershipChecker` - Store role checks
//!
//! The schema lives in `migrations/`.

mod compliance_tx;
mod license_reader;
mod media_repository;
mod membership_checker;
mod rows;

pub use compliance_tx::{PgComplianceTx, PostgresTransactionManager};
pub use license_reader::PostgresLicenseReader;
pub use media_repository::PostgresMediaRepository;
pub use membership_checker::PostgresMembershipChecker;
