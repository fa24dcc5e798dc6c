//! Stripe payment provider adapter.
//!
//! Implements the `PaymentProvider` port for subscription lookups.
//!
//! # Security
//!
//! - The API key is held as a `secrecy::SecretString` and only exposed when
//!   building the request
//! - Webhook signatures are verified in the billing domain, not here
//!
//! # Configuration
//!
//! See `PaymentConfig`: `STORE_COMPLIANCE__PAYMENT__STRIPE_API_KEY` and
//! `STORE_COMPLIANCE__PAYMENT__API_BASE_URL`.

mod mock_payment_provider;
mod stripe_adapter;

pub use mock_payment_provider::MockPaymentProvider;
pub use stripe_adapter::{StripeConfig, StripePaymentAdapter, DEFAULT_STRIPE_API_BASE};
