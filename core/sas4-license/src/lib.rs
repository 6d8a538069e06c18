//! License lookup and account operations for the SAS4 platform.
//!
//! This crate handles:
//! - Classifying free-form search terms (license id, email, hardware id)
//! - Resolving a term to one license (or one client's licenses), with
//!   ranked suggestions when nothing matches exactly
//! - Swapping one machine's license onto another
//! - Pricing and issuing renewal invoices
//!
//! # Resolution order
//!
//! A hardware id goes straight to the indexed direct lookup. Anything else is
//! a single first-page search followed by, in order: exact license id,
//! exact client email (all matches), exact hardware id. Every failure points
//! the caller at hardware-id search, the cheapest and most precise path.

pub mod classify;
mod error;
mod invoice;
mod resolver;
mod swap;

pub use classify::{classify, is_email, is_hardware_id, parse_license_id, IdentifierKind};
pub use error::{LicenseError, LicenseResult, Suggestion, SwapSide};
pub use invoice::{format_amount, InvoiceService, PriceEntry, PricingTable, RenewalInvoice};
pub use resolver::{
    KeywordResolver, LicenseMatch, MatchKind, MISSING_KEYWORD, NO_LICENSES, SEARCH_PAGE_SIZE,
};
pub use swap::{LicenseSummary, LicenseSwapper, SwapOutcome};
