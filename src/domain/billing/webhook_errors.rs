//! Webhook verification errors.

use thiserror::Error;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Errors raised before a webhook payload is trusted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebhookError {
    /// Webhook signature verification failed.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Webhook timestamp is outside the acceptable window (5 minutes).
    #[error("Timestamp out of range")]
    TimestampOutOfRange,

    /// Event timestamp is in the future beyond clock skew tolerance.
    #[error("Invalid timestamp")]
    InvalidTimestamp,

    /// Failed to parse webhook payload or signature header.
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<WebhookError> for DomainError {
    fn from(err: WebhookError) -> Self {
        match err {
            WebhookError::InvalidSignature | WebhookError::TimestampOutOfRange => {
                DomainError::forbidden(err.to_string())
            }
            WebhookError::InvalidTimestamp | WebhookError::ParseError(_) => {
                DomainError::new(ErrorCode::ValidationFailed, err.to_string())
            }
        }
    }
}
