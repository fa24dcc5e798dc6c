//! HMAC-signed download URLs.
//!
//! URL shape: `{base_url}/{storage_key}?expires={unix_secs}&signature={hex}`.
//! The signature covers `"{storage_key}:{expires}"` with HMAC-SHA256, so the
//! file server can check it with the same key and no database lookup.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use std::time::Duration;
use subtle::ConstantTimeEq;

use crate::domain::foundation::{DomainError, ErrorCode};
use crate::ports::DocumentUrlSigner;

pub struct HmacUrlSigner {
    base_url: String,
    key: SecretString,
}

impl HmacUrlSigner {
    pub fn new(base_url: impl Into<String>, key: SecretString) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { base_url, key }
    }

    /// Signs a URL that expires `ttl` after `now`.
    pub fn sign_at(&self, storage_key: &str, ttl: Duration, now: DateTime<Utc>) -> Result<String, DomainError> {
        validate_key(storage_key)?;

        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|_| storage_error("URL lifetime out of range"))?;
        let expires = (now + ttl).timestamp();
        let signature = hex::encode(self.mac(storage_key, expires)?);

        Ok(format!(
            "{}/{}?expires={}&signature={}",
            self.base_url, storage_key, expires, signature
        ))
    }

    /// Checks a signature produced by this signer. Expired URLs fail.
    pub fn verify(&self, storage_key: &str, expires: i64, signature: &str, now: DateTime<Utc>) -> bool {
        if now.timestamp() > expires {
            return false;
        }
        let Ok(provided) = hex::decode(signature) else {
            return false;
        };
        match self.mac(storage_key, expires) {
            Ok(expected) => expected.len() == provided.len() && bool::from(expected.ct_eq(&provided)),
            Err(_) => false,
        }
    }

    fn mac(&self, storage_key: &str, expires: i64) -> Result<Vec<u8>, DomainError> {
        let mut mac = Hmac::<Sha256>::new_from_slice(self.key.expose_secret().as_bytes())
            .map_err(|_| storage_error("Invalid signing key"))?;
        mac.update(storage_key.as_bytes());
        mac.update(b":");
        mac.update(expires.to_string().as_bytes());
        Ok(mac.finalize().into_bytes().to_vec())
    }
}

#[async_trait]
impl DocumentUrlSigner for HmacUrlSigner {
    async fn sign_download_url(&self, storage_key: &str, ttl: Duration) -> Result<String, DomainError> {
        self.sign_at(storage_key, ttl, Utc::now())
    }
}

fn validate_key(storage_key: &str) -> Result<(), DomainError> {
    let bad = storage_key.is_empty()
        || storage_key.starts_with('/')
        || storage_key.contains("..")
        || storage_key
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '?' | '#' | '%'));
    if bad {
        return Err(storage_error(format!("Unsignable storage key: {:?}", storage_key)));
    }
    Ok(())
}

fn storage_error(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::StorageError, message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn signer() -> HmacUrlSigner {
        HmacUrlSigner::new("https://files.test/", SecretString::new("k3y".to_string()))
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()
    }

    fn query_param<'a>(url: &'a str, name: &str) -> &'a str {
        let query = url.split_once('?').unwrap().1;
        query
            .split('&')
            .find_map(|pair| pair.strip_prefix(&format!("{}=", name)))
            .unwrap()
    }

    #[test]
    fn signed_url_has_path_and_expiry() {
        let url = signer()
            .sign_at("stores/1/license.pdf", Duration::from_secs(900), now())
            .unwrap();

        assert!(url.starts_with("https://files.test/stores/1/license.pdf?expires="));
        assert_eq!(query_param(&url, "expires"), (now().timestamp() + 900).to_string());
    }

    #[test]
    fn signature_verifies_until_expiry() {
        let signer = signer();
        let url = signer.sign_at("a/b.png", Duration::from_secs(60), now()).unwrap();
        let expires: i64 = query_param(&url, "expires").parse().unwrap();
        let signature = query_param(&url, "signature");

        assert!(signer.verify("a/b.png", expires, signature, now()));
        assert!(!signer.verify("a/c.png", expires, signature, now()));
        assert!(!signer.verify("a/b.png", expires, signature, now() + chrono::Duration::seconds(61)));
    }

    #[test]
    fn different_key_does_not_verify() {
        let url = signer().sign_at("a/b.png", Duration::from_secs(60), now()).unwrap();
        let other = HmacUrlSigner::new("https://files.test", SecretString::new("other".to_string()));
        let expires: i64 = query_param(&url, "expires").parse().unwrap();

        assert!(!other.verify("a/b.png", expires, query_param(&url, "signature"), now()));
    }

    #[test]
    fn rejects_unsafe_keys() {
        for key in ["", "/abs", "../etc/passwd", "a b", "a?x=1"] {
            let err = signer().sign_at(key, Duration::from_secs(60), now()).unwrap_err();
            assert_eq!(err.code, ErrorCode::StorageError, "key {:?}", key);
        }
    }

    #[test]
    fn garbage_signature_is_rejected() {
        assert!(!signer().verify("a", now().timestamp() + 10, "zz", now()));
    }
}
