//! License handlers.

mod create_license;
mod delete_license;
mod list_licenses;
mod verify_license;

pub use create_license::{CreateLicenseCommand, CreateLicenseHandler, CreateLicenseResult};
pub use delete_license::{DeleteLicenseCommand, DeleteLicenseHandler, DeleteLicenseResult};
pub use list_licenses::{
    LicenseListItem, ListLicensesHandler, ListLicensesQuery, DEFAULT_DOCUMENT_URL_TTL,
};
pub use verify_license::{VerifyLicenseCommand, VerifyLicenseHandler, VerifyLicenseResult};
