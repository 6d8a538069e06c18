//! Abstract licensing platform interface.

use crate::error::ClientResult;
use crate::models::{ClientPage, ClientSearch, InvoiceDraft, LicensePage, LicenseRecord, LicenseSearch};
use async_trait::async_trait;
use serde_json::Value;

/// Operations the resolution and account-management layers need from the
/// remote licensing platform. Authentication is the implementor's concern.
#[async_trait]
pub trait LicensePlatform: Send + Sync {
    /// Paged free-text license search.
    async fn search_licenses(&self, query: &LicenseSearch) -> ClientResult<LicensePage>;

    /// Direct lookup by hardware identifier. A missing record is
    /// [`ClientError::NotFound`](crate::ClientError::NotFound).
    async fn license_by_ehwid(&self, ehwid: &str) -> ClientResult<LicenseRecord>;

    /// Paged client search.
    async fn search_clients(&self, query: &ClientSearch) -> ClientResult<ClientPage>;

    /// Creates an invoice; the remote confirmation is returned as-is.
    async fn create_invoice(&self, invoice: &InvoiceDraft) -> ClientResult<Value>;

    /// Moves the license `license_id` onto `des_license_id`; the remote
    /// confirmation is returned as-is.
    async fn swap_licenses(&self, license_id: i64, des_license_id: i64) -> ClientResult<Value>;
}
