//! Renewal pricing and invoice creation.

use crate::error::{LicenseError, LicenseResult};
use crate::swap::validate_ehwid;
use chrono::TimeDelta;
use sas4_client::{ClientSearch, Clock, InvoiceDraft, InvoiceItem, LicensePlatform};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// Days between invoice date and due date.
const PAYMENT_TERM_DAYS: i64 = 7;

/// Price of renewing a license of up to `max_users` users for `months` months.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceEntry {
    pub max_users: i64,
    pub months: u32,
    pub price_cents: u64,
}

/// Renewal prices by user tier and term.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PricingTable {
    entries: Vec<PriceEntry>,
}

impl Default for PricingTable {
    fn default() -> Self {
        // monthly price per tier; a 12-month term is billed as 10 months
        const MONTHLY: [(i64, u64); 5] = [
            (50, 1_000),
            (100, 1_500),
            (250, 2_500),
            (500, 4_000),
            (1000, 6_000),
        ];
        let entries = MONTHLY
            .iter()
            .flat_map(|&(max_users, monthly)| {
                [1u32, 3, 6, 12].into_iter().map(move |months| PriceEntry {
                    max_users,
                    months,
                    price_cents: if months == 12 {
                        monthly * 10
                    } else {
                        monthly * u64::from(months)
                    },
                })
            })
            .collect();
        Self { entries }
    }
}

impl PricingTable {
    pub fn new(entries: Vec<PriceEntry>) -> Self {
        Self { entries }
    }

    /// Parses a JSON array of [`PriceEntry`].
    pub fn from_json(json: &str) -> LicenseResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| LicenseError::Validation(format!("invalid pricing table: {e}")))
    }

    pub fn entries(&self) -> &[PriceEntry] {
        &self.entries
    }

    /// The cheapest tier covering `users` for exactly `months`.
    pub fn price_for(&self, users: i64, months: u32) -> LicenseResult<&PriceEntry> {
        self.entries
            .iter()
            .filter(|e| e.months == months && e.max_users >= users)
            .min_by_key(|e| e.max_users)
            .ok_or_else(|| {
                LicenseError::Validation(format!(
                    "No price configured for {users} users / {months} month(s)"
                ))
            })
    }
}

/// Renders cents as a two-place decimal: `12050` -> `"120.50"`.
pub fn format_amount(cents: u64) -> String {
    format!("{}.{:02}", cents / 100, cents % 100)
}

/// A created renewal invoice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenewalInvoice {
    pub license_id: i64,
    pub client_id: i64,
    pub item: InvoiceItem,
    /// The remote's confirmation, unmodified.
    pub remote_response: Value,
}

pub struct InvoiceService {
    platform: Arc<dyn LicensePlatform>,
    pricing: PricingTable,
    clock: Arc<dyn Clock>,
}

impl InvoiceService {
    pub fn new(
        platform: Arc<dyn LicensePlatform>,
        pricing: PricingTable,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            platform,
            pricing,
            clock,
        }
    }

    pub fn pricing(&self) -> &PricingTable {
        &self.pricing
    }

    /// Bills the owner of the license bound to `ehwid` for a `months` renewal
    /// at the license's current user count.
    pub async fn create_renewal(&self, ehwid: &str, months: u32) -> LicenseResult<RenewalInvoice> {
        let ehwid = ehwid.trim();
        validate_ehwid("ehwid", ehwid)?;
        if months == 0 {
            return Err(LicenseError::Validation(
                "months must be at least 1".to_string(),
            ));
        }

        let license = self.platform.license_by_ehwid(ehwid).await?;
        let users = license.max_users.ok_or_else(|| {
            LicenseError::Validation(format!(
                "License #{} has no max_users; cannot price a renewal",
                license.id
            ))
        })?;
        let price = self.pricing.price_for(users, months)?;

        let email = license.client_email().ok_or_else(|| {
            LicenseError::not_found(format!("License #{} has no client email", license.id))
        })?;
        let clients = self
            .platform
            .search_clients(&ClientSearch::keyword(email))
            .await?;
        let needle = email.to_lowercase();
        let client = clients
            .data
            .iter()
            .find(|c| c.email.as_deref().is_some_and(|e| e.to_lowercase() == needle))
            .ok_or_else(|| LicenseError::not_found(format!("Client not found for email {email}")))?;

        let item = InvoiceItem {
            description: format!(
                "License renewal #{} ({}): {} users, {} month(s)",
                license.id, ehwid, users, months
            ),
            amount: format_amount(price.price_cents),
            quantity: 1,
        };

        let today = self.clock.now().date_naive();
        let draft = InvoiceDraft {
            client_id: client.id,
            date: today.format("%Y-%m-%d").to_string(),
            due_date: (today + TimeDelta::days(PAYMENT_TERM_DAYS))
                .format("%Y-%m-%d")
                .to_string(),
            items: vec![item.clone()],
            comments: String::new(),
        };

        let remote_response = self.platform.create_invoice(&draft).await?;
        info!(
            "Renewal invoice for license #{} billed to client #{}: {}",
            license.id, client.id, item.amount
        );

        Ok(RenewalInvoice {
            license_id: license.id,
            client_id: client.id,
            item,
            remote_response,
        })
    }
}
