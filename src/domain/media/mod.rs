//! Media documents referenced by licenses.
//!
//! Media is owned by an external upload collaborator; this module only holds the
//! read model and the rules a document must satisfy to back a license.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, LicenseId, MediaId, StoreId};

/// Content types accepted for license documents.
pub const ALLOWED_LICENSE_CONTENT_TYPES: &[&str] = &[
    "application/pdf",
    "image/jpeg",
    "image/png",
    "image/webp",
    "image/heic",
];

/// What an upload is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaKind {
    LicenseDocument,
    ProductImage,
    StoreLogo,
    Other,
}

impl MediaKind {
    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "license_document" => Some(MediaKind::LicenseDocument),
            "product_image" => Some(MediaKind::ProductImage),
            "store_logo" => Some(MediaKind::StoreLogo),
            "other" => Some(MediaKind::Other),
            _ => None,
        }
    }
}

/// Upload processing state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MediaStatus {
    Uploading,
    Ready,
    Failed,
}

impl MediaStatus {
    /// Parses the storage representation.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "uploading" => Some(MediaStatus::Uploading),
            "ready" => Some(MediaStatus::Ready),
            "failed" => Some(MediaStatus::Failed),
            _ => None,
        }
    }
}

/// Read model of an uploaded document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: MediaId,
    pub store_id: StoreId,
    pub kind: MediaKind,
    pub status: MediaStatus,
    pub content_type: String,
    pub storage_key: String,
}

impl MediaRecord {
    /// Checks that this document may back a license owned by `store_id`.
    ///
    /// Checks run in order: ownership, kind, readiness, content type.
    pub fn ensure_license_document(&self, store_id: StoreId) -> Result<(), DomainError> {
        if self.store_id != store_id {
            return Err(DomainError::new(
                ErrorCode::MediaOwnedByOtherStore,
                format!("Media {} does not belong to store {}", self.id, store_id),
            ));
        }
        if self.kind != MediaKind::LicenseDocument {
            return Err(DomainError::new(
                ErrorCode::MediaKindInvalid,
                format!("Media {} is not a license document", self.id),
            )
            .with_detail("field", "media_id"));
        }
        if self.status != MediaStatus::Ready {
            return Err(DomainError::new(
                ErrorCode::MediaNotReady,
                format!("Media {} is not ready", self.id),
            ));
        }
        if !is_allowed_content_type(&self.content_type) {
            return Err(DomainError::new(
                ErrorCode::ContentTypeNotAllowed,
                format!("Content type '{}' is not allowed", self.content_type),
            )
            .with_detail("field", "media_id"));
        }
        Ok(())
    }
}

/// Aggregate kinds that own attachments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttachmentKind {
    License,
}

impl AttachmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttachmentKind::License => "license",
        }
    }
}

/// The aggregate a set of media is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AttachmentTarget {
    pub kind: AttachmentKind,
    pub aggregate_id: Uuid,
    pub store_id: StoreId,
}

impl AttachmentTarget {
    pub fn license(license_id: LicenseId, store_id: StoreId) -> Self {
        Self {
            kind: AttachmentKind::License,
            aggregate_id: *license_id.as_uuid(),
            store_id,
        }
    }
}

/// Returns true if `content_type` (ignoring parameters and case) is allowed.
pub fn is_allowed_content_type(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    ALLOWED_LICENSE_CONTENT_TYPES.contains(&essence.as_str())
}
