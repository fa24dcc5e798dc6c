//! Error types for the domain layer.

use std::collections::HashMap;
use std::error::Error;
use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Returns the name of the offending field.
    pub fn field(&self) -> &str {
        match self {
            ValidationError::EmptyField { field } => field,
            ValidationError::InvalidFormat { field, .. } => field,
        }
    }
}

/// Coarse error taxonomy exposed to callers.
///
/// Every [`ErrorCode`] belongs to exactly one kind; callers branch on the kind,
/// diagnostics use the code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Malformed or missing input. Never retried automatically.
    Validation,
    /// The actor lacks the required role.
    Forbidden,
    /// A referenced aggregate does not exist.
    NotFound,
    /// A state-machine precondition was violated.
    Conflict,
    /// A collaborator (database, cache, provider, signer) failed.
    Dependency,
    /// An invariant of this crate was violated.
    Internal,
}

impl ErrorKind {
    /// Returns true if the caller's delivery mechanism may retry the operation.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ErrorKind::Dependency)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Dependency => "dependency",
            ErrorKind::Internal => "internal",
        };
        write!(f, "{}", s)
    }
}

/// Error codes organized by category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation errors
    ValidationFailed,
    InvalidDecision,
    MediaKindInvalid,
    ContentTypeNotAllowed,
    MissingStoreReference,

    // Authorization errors
    Forbidden,
    MediaOwnedByOtherStore,

    // Not found errors
    LicenseNotFound,
    MediaNotFound,
    StoreNotFound,
    SubscriptionNotFound,

    // State errors
    LicenseAlreadyFinalized,
    LicenseNotDeletable,
    MediaNotReady,
    SubscriptionStoreMismatch,

    // Infrastructure errors
    DatabaseError,
    CacheError,
    PaymentProviderError,
    StorageError,

    // Invariant violations
    InternalError,
}

impl ErrorCode {
    /// Returns the taxonomy kind this code belongs to.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidDecision
            | ErrorCode::MediaKindInvalid
            | ErrorCode::ContentTypeNotAllowed
            | ErrorCode::MissingStoreReference => ErrorKind::Validation,
            ErrorCode::Forbidden | ErrorCode::MediaOwnedByOtherStore => ErrorKind::Forbidden,
            ErrorCode::LicenseNotFound
            | ErrorCode::MediaNotFound
            | ErrorCode::StoreNotFound
            | ErrorCode::SubscriptionNotFound => ErrorKind::NotFound,
            ErrorCode::LicenseAlreadyFinalized
            | ErrorCode::LicenseNotDeletable
            | ErrorCode::MediaNotReady
            | ErrorCode::SubscriptionStoreMismatch => ErrorKind::Conflict,
            ErrorCode::DatabaseError
            | ErrorCode::CacheError
            | ErrorCode::PaymentProviderError
            | ErrorCode::StorageError => ErrorKind::Dependency,
            ErrorCode::InternalError => ErrorKind::Internal,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::InvalidDecision => "INVALID_DECISION",
            ErrorCode::MediaKindInvalid => "MEDIA_KIND_INVALID",
            ErrorCode::ContentTypeNotAllowed => "CONTENT_TYPE_NOT_ALLOWED",
            ErrorCode::MissingStoreReference => "MISSING_STORE_REFERENCE",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::MediaOwnedByOtherStore => "MEDIA_OWNED_BY_OTHER_STORE",
            ErrorCode::LicenseNotFound => "LICENSE_NOT_FOUND",
            ErrorCode::MediaNotFound => "MEDIA_NOT_FOUND",
            ErrorCode::StoreNotFound => "STORE_NOT_FOUND",
            ErrorCode::SubscriptionNotFound => "SUBSCRIPTION_NOT_FOUND",
            ErrorCode::LicenseAlreadyFinalized => "LICENSE_ALREADY_FINALIZED",
            ErrorCode::LicenseNotDeletable => "LICENSE_NOT_DELETABLE",
            ErrorCode::MediaNotReady => "MEDIA_NOT_READY",
            ErrorCode::SubscriptionStoreMismatch => "SUBSCRIPTION_STORE_MISMATCH",
            ErrorCode::DatabaseError => "DATABASE_ERROR",
            ErrorCode::CacheError => "CACHE_ERROR",
            ErrorCode::PaymentProviderError => "PAYMENT_PROVIDER_ERROR",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

/// Standard domain error with code, message, and optional details.
#[derive(Debug, Clone)]
pub struct DomainError {
    pub code: ErrorCode,
    pub message: String,
    pub details: HashMap<String, String>,
}

impl DomainError {
    /// Creates a new domain error.
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: HashMap::new(),
        }
    }

    /// Creates a validation error for a specific field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message).with_detail("field", field.into())
    }

    /// Creates a forbidden error.
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    /// Creates a database error wrapping the underlying cause.
    pub fn database(cause: impl fmt::Display) -> Self {
        Self::new(ErrorCode::DatabaseError, cause.to_string())
    }

    /// Creates an internal invariant-violation error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Adds a detail to the error.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }

    /// Tags a dependency failure with the operation that observed it.
    ///
    /// Other kinds pass through untouched; they already describe the caller's
    /// problem precisely.
    pub fn in_operation(mut self, operation: &str) -> Self {
        if self.kind() == ErrorKind::Dependency && !self.details.contains_key("operation") {
            self.message = format!("{}: {}", operation, self.message);
            self.details.insert("operation".to_string(), operation.to_string());
        }
        self
    }

    /// Returns the taxonomy kind of this error.
    pub fn kind(&self) -> ErrorKind {
        self.code.kind()
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl Error for DomainError {}

impl From<ValidationError> for DomainError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().to_string();
        DomainError::validation(field, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_empty_field_displays_correctly() {
        let err = ValidationError::empty_field("license_number");
        assert_eq!(format!("{}", err), "Field 'license_number' cannot be empty");
    }

    #[test]
    fn validation_error_invalid_format_displays_correctly() {
        let err = ValidationError::invalid_format("license_type", "unknown type 'x'");
        assert_eq!(
            format!("{}", err),
            "Field 'license_type' has invalid format: unknown type 'x'"
        );
    }

    #[test]
    fn domain_error_displays_code_and_message() {
        let err = DomainError::new(ErrorCode::LicenseNotFound, "License not found");
        assert_eq!(format!("{}", err), "[LICENSE_NOT_FOUND] License not found");
    }

    #[test]
    fn validation_error_converts_with_field_detail() {
        let err: DomainError = ValidationError::empty_field("media_id").into();

        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.details.get("field"), Some(&"media_id".to_string()));
    }

    #[test]
    fn every_code_maps_to_expected_kind() {
        assert_eq!(ErrorCode::MediaNotReady.kind(), ErrorKind::Conflict);
        assert_eq!(ErrorCode::MediaOwnedByOtherStore.kind(), ErrorKind::Forbidden);
        assert_eq!(ErrorCode::PaymentProviderError.kind(), ErrorKind::Dependency);
        assert_eq!(ErrorCode::SubscriptionNotFound.kind(), ErrorKind::NotFound);
        assert_eq!(ErrorCode::InternalError.kind(), ErrorKind::Internal);
    }

    #[test]
    fn in_operation_prefixes_dependency_errors_once() {
        let err = DomainError::database("connection reset")
            .in_operation("verify_license")
            .in_operation("outer");

        assert_eq!(err.message, "verify_license: connection reset");
        assert_eq!(err.details.get("operation"), Some(&"verify_license".to_string()));
    }

    #[test]
    fn in_operation_leaves_conflicts_untouched() {
        let err = DomainError::new(ErrorCode::LicenseAlreadyFinalized, "already finalized")
            .in_operation("verify_license");

        assert_eq!(err.message, "already finalized");
        assert!(err.details.get("operation").is_none());
    }

    #[test]
    fn only_dependency_errors_are_retryable() {
        assert!(ErrorKind::Dependency.is_retryable());
        assert!(!ErrorKind::Conflict.is_retryable());
        assert!(!ErrorKind::Validation.is_retryable());
    }
}
