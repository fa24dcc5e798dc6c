//! Storage Adapters
//!
//! Implementations of the DocumentUrlSigner port for license documents.
//!
//! ## Available Adapters
//!
//! - **HmacUrlSigner** - Time-limited download URLs signed with a shared key
//!
//! ## Usage
//!
//! ```ignore
//! use adapters::storage::HmacUrlSigner;
//!
//! let signer = HmacUrlSigner::new("https://files.example.com", SecretString::new(key));
//! let url = signer.sign_download_url("stores/42/license.pdf", ttl).await?;
//! ```

mod hmac_url_signer;

pub use hmac_url_signer::HmacUrlSigner;
