//! Shared test helpers: an in-memory licensing platform.

#![allow(dead_code)]

use async_trait::async_trait;
use sas4_client::{
    ClientError, ClientPage, ClientRecord, ClientResult, ClientSearch, InvoiceDraft,
    LicensePage, LicensePlatform, LicenseRecord, LicenseSearch, EHWID_NOT_FOUND_SERVER_ERROR,
};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Builds a license record the way the remote renders one.
pub fn license(id: i64, ehwid: &str, email: &str) -> LicenseRecord {
    serde_json::from_value(json!({
        "id": id,
        "ehwid": ehwid,
        "expiration": "2027-01-01 00:00:00",
        "max_users": 100,
        "status": 1,
        "client_details": { "email": email }
    }))
    .unwrap()
}

pub fn client(id: i64, email: &str) -> ClientRecord {
    serde_json::from_value(json!({ "id": id, "email": email, "company": "ACME" })).unwrap()
}

/// In-memory platform. Search returns the configured page regardless of the
/// query; direct lookup scans `licenses` by exact hardware id.
#[derive(Default)]
pub struct FakePlatform {
    pub licenses: Vec<LicenseRecord>,
    pub page: Option<LicensePage>,
    pub clients: Vec<ClientRecord>,
    pub search_error: Option<String>,
    pub swap_error: Option<String>,

    pub search_calls: AtomicUsize,
    pub lookup_calls: AtomicUsize,
    pub client_calls: AtomicUsize,
    pub swap_calls: AtomicUsize,

    pub searches: Mutex<Vec<LicenseSearch>>,
    pub invoices: Mutex<Vec<InvoiceDraft>>,
    pub swaps: Mutex<Vec<(i64, i64)>>,
}

impl FakePlatform {
    pub fn with_licenses(licenses: Vec<LicenseRecord>) -> Self {
        Self {
            licenses,
            ..Default::default()
        }
    }

    /// Search results come from `page` instead of `licenses`.
    pub fn with_page(page: LicensePage) -> Self {
        Self {
            page: Some(page),
            ..Default::default()
        }
    }

    pub fn remote_calls(&self) -> usize {
        self.search_calls.load(Ordering::SeqCst)
            + self.lookup_calls.load(Ordering::SeqCst)
            + self.client_calls.load(Ordering::SeqCst)
            + self.swap_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LicensePlatform for FakePlatform {
    async fn search_licenses(&self, query: &LicenseSearch) -> ClientResult<LicensePage> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        self.searches.lock().unwrap().push(query.clone());

        if let Some(msg) = &self.search_error {
            return Err(ClientError::Remote(msg.clone()));
        }
        Ok(self.page.clone().unwrap_or_else(|| LicensePage {
            data: self.licenses.clone(),
            total: self.licenses.len() as u64,
            current_page: 1,
            last_page: 1,
        }))
    }

    async fn license_by_ehwid(&self, ehwid: &str) -> ClientResult<LicenseRecord> {
        self.lookup_calls.fetch_add(1, Ordering::SeqCst);
        self.licenses
            .iter()
            .find(|l| l.ehwid.as_deref() == Some(ehwid))
            .cloned()
            .ok_or_else(|| ClientError::NotFound(EHWID_NOT_FOUND_SERVER_ERROR.to_string()))
    }

    async fn search_clients(&self, query: &ClientSearch) -> ClientResult<ClientPage> {
        self.client_calls.fetch_add(1, Ordering::SeqCst);
        let needle = query.search.to_lowercase();
        let data: Vec<ClientRecord> = self
            .clients
            .iter()
            .filter(|c| {
                c.email
                    .as_deref()
                    .is_some_and(|e| e.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect();
        Ok(ClientPage {
            total: data.len() as u64,
            data,
            current_page: 1,
            last_page: 1,
        })
    }

    async fn create_invoice(&self, invoice: &InvoiceDraft) -> ClientResult<Value> {
        self.invoices.lock().unwrap().push(invoice.clone());
        Ok(json!({ "status": 200, "invoice_id": 1001 }))
    }

    async fn swap_licenses(&self, license_id: i64, des_license_id: i64) -> ClientResult<Value> {
        self.swap_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = &self.swap_error {
            return Err(ClientError::Remote(msg.clone()));
        }
        self.swaps.lock().unwrap().push((license_id, des_license_id));
        Ok(json!({ "status": 200, "message": "License swapped successfully" }))
    }
}
