//! Keyword resolution: one search term in, one authoritative match out.

use crate::classify::{is_email, is_hardware_id, parse_license_id};
use crate::error::{LicenseError, LicenseResult, Suggestion};
use sas4_client::{LicensePage, LicensePlatform, LicenseRecord, LicenseSearch};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

/// Page size of the single search round trip.
pub const SEARCH_PAGE_SIZE: u32 = 50;

pub const MISSING_KEYWORD: &str =
    "Missing required field: keyword and this could be license id, email, or ehwid (Hardware Id)";

pub const NO_LICENSES: &str =
    "License not found. Please try searching by EHWID (Hardware ID) for more accurate results.";

/// Which strategy produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    LicenseId,
    Email,
    Ehwid,
}

/// A successful resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum LicenseMatch {
    /// The term was a license id present in the results.
    LicenseId(LicenseRecord),
    /// Every license owned by the client with this email (at least one).
    Email(Vec<LicenseRecord>),
    /// The license bound to this hardware id.
    Ehwid(LicenseRecord),
}

impl LicenseMatch {
    pub fn kind(&self) -> MatchKind {
        match self {
            Self::LicenseId(_) => MatchKind::LicenseId,
            Self::Email(_) => MatchKind::Email,
            Self::Ehwid(_) => MatchKind::Ehwid,
        }
    }

    /// Matched records; a single element except for email matches.
    pub fn records(&self) -> &[LicenseRecord] {
        match self {
            Self::LicenseId(record) | Self::Ehwid(record) => std::slice::from_ref(record),
            Self::Email(records) => records,
        }
    }

    /// Number of matches, reported only for email matches.
    pub fn total(&self) -> Option<usize> {
        match self {
            Self::Email(records) => Some(records.len()),
            _ => None,
        }
    }
}

/// Resolves search terms against the licensing platform.
pub struct KeywordResolver {
    platform: Arc<dyn LicensePlatform>,
}

impl KeywordResolver {
    pub fn new(platform: Arc<dyn LicensePlatform>) -> Self {
        Self { platform }
    }

    /// Resolves `keyword` to a license match.
    ///
    /// A hardware id is looked up directly. Anything else costs exactly one
    /// search request for the first [`SEARCH_PAGE_SIZE`] results; further
    /// pages are never fetched.
    pub async fn resolve(&self, keyword: &str) -> LicenseResult<LicenseMatch> {
        let term = keyword.trim();
        if term.is_empty() {
            return Err(LicenseError::Validation(MISSING_KEYWORD.to_string()));
        }

        if is_hardware_id(term) {
            info!("EHWID detected: {}, using direct lookup", term);
            let record = self.platform.license_by_ehwid(term).await?;
            return Ok(LicenseMatch::Ehwid(record));
        }

        let page = self
            .platform
            .search_licenses(&LicenseSearch::keyword(term, SEARCH_PAGE_SIZE))
            .await?;
        debug!(
            "Search for {:?} returned {} of {} license(s), page {}/{}",
            term,
            page.data.len(),
            page.total,
            page.current_page,
            page.last_page
        );

        select_match(term, page)
    }
}

/// Applies the exact-match strategies to one page of search results.
fn select_match(term: &str, page: LicensePage) -> LicenseResult<LicenseMatch> {
    let partial = page.is_partial();
    let mut licenses = page.data;

    if licenses.is_empty() {
        return Err(LicenseError::not_found(NO_LICENSES));
    }

    if let Some(id) = parse_license_id(term) {
        if let Some(pos) = licenses.iter().position(|l| l.id == id) {
            return Ok(LicenseMatch::LicenseId(licenses.swap_remove(pos)));
        }
    }

    let needle = term.to_lowercase();

    if is_email(term) {
        let owned: Vec<LicenseRecord> = licenses
            .iter()
            .filter(|l| l.client_email().is_some_and(|e| e.to_lowercase() == needle))
            .cloned()
            .collect();
        if !owned.is_empty() {
            return Ok(LicenseMatch::Email(owned));
        }
    }

    if let Some(pos) = licenses.iter().position(|l| {
        l.ehwid
            .as_deref()
            .is_some_and(|h| h.to_lowercase() == needle)
    }) {
        return Ok(LicenseMatch::Ehwid(licenses.swap_remove(pos)));
    }

    let message = if partial {
        format!(
            "Found {} license(s) on first page, but no exact match. Please search by EHWID (Hardware ID) for more accurate results.",
            licenses.len()
        )
    } else {
        format!(
            "Found {} license(s), but no exact match found. Please search by EHWID (Hardware ID) for more accurate results.",
            licenses.len()
        )
    };

    Err(LicenseError::NotFound {
        message,
        suggestions: licenses.iter().map(suggestion).collect(),
    })
}

fn suggestion(record: &LicenseRecord) -> Suggestion {
    Suggestion {
        id: record.id,
        ehwid: record.ehwid.clone(),
        email: record
            .client_email()
            .filter(|e| !e.is_empty())
            .unwrap_or("N/A")
            .to_string(),
    }
}
