//! ListLicensesHandler - Query handler for a store's licenses.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::domain::foundation::{DomainError, StoreId};
use crate::domain::license::License;
use crate::ports::{DocumentUrlSigner, LicenseReader, MediaRepository, Page, PageRequest};

/// Default lifetime of signed document links.
pub const DEFAULT_DOCUMENT_URL_TTL: Duration = Duration::from_secs(15 * 60);

/// Query to list licenses of a store, newest first.
#[derive(Debug, Clone)]
pub struct ListLicensesQuery {
    pub store_id: StoreId,
    pub page: PageRequest,
}

impl ListLicensesQuery {
    /// First page with the default page size.
    pub fn first_page(store_id: StoreId) -> Self {
        Self {
            store_id,
            page: PageRequest::default(),
        }
    }
}

/// A license with a signed link to its document.
///
/// `document_url` is empty when the document could not be resolved or signed.
#[derive(Debug, Clone)]
pub struct LicenseListItem {
    pub license: License,
    pub document_url: String,
}

/// Handler for listing licenses.
pub struct ListLicensesHandler {
    reader: Arc<dyn LicenseReader>,
    media: Arc<dyn MediaRepository>,
    signer: Arc<dyn DocumentUrlSigner>,
    url_ttl: Duration,
}

impl ListLicensesHandler {
    pub fn new(
        reader: Arc<dyn LicenseReader>,
        media: Arc<dyn MediaRepository>,
        signer: Arc<dyn DocumentUrlSigner>,
    ) -> Self {
        Self {
            reader,
            media,
            signer,
            url_ttl: DEFAULT_DOCUMENT_URL_TTL,
        }
    }

    pub fn with_url_ttl(mut self, ttl: Duration) -> Self {
        self.url_ttl = ttl;
        self
    }

    pub async fn handle(&self, query: ListLicensesQuery) -> Result<Page<LicenseListItem>, DomainError> {
        let page = self
            .reader
            .list_by_store(query.store_id, query.page)
            .await
            .map_err(|e| e.in_operation("list_licenses"))?;

        let mut items = Vec::with_capacity(page.items.len());
        for license in page.items {
            let document_url = self.document_url(&license).await;
            items.push(LicenseListItem { license, document_url });
        }

        Ok(Page {
            items,
            has_more: page.has_more,
        })
    }

    async fn document_url(&self, license: &License) -> String {
        let media_id = license.details.media_id;
        let record = match self.media.find_by_id(media_id).await {
            Ok(Some(record)) => record,
            Ok(None) => {
                debug!(license_id = %license.id, media_id = %media_id, "License document missing");
                return String::new();
            }
            Err(e) => {
                debug!(license_id = %license.id, error = %e, "License document lookup failed");
                return String::new();
            }
        };

        self.signer
            .sign_download_url(&record.storage_key, self.url_ttl)
            .await
            .unwrap_or_else(|e| {
                debug!(license_id = %license.id, error = %e, "Signing document url failed");
                String::new()
            })
    }
}
