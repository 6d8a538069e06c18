//! Identifier classification for free-form search terms.
//!
//! The predicates are independent; the resolver decides the order in which
//! they are consulted. All of them trim their input first.

use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Loose `local@domain.tld` shape; not RFC validation.
static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern"));

/// Four groups of five ASCII alphanumerics, e.g. `Q46I5-BEAAO-RQA4R-EBQDT`.
static HARDWARE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9]{5}-[A-Za-z0-9]{5}-[A-Za-z0-9]{5}-[A-Za-z0-9]{5}$")
        .expect("hardware id pattern")
});

/// What a search term looks like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierKind {
    HardwareId,
    LicenseId,
    Email,
    Text,
}

pub fn is_email(s: &str) -> bool {
    EMAIL.is_match(s.trim())
}

pub fn is_hardware_id(s: &str) -> bool {
    HARDWARE_ID.is_match(s.trim())
}

/// Parses a license id, accepting only the canonical decimal rendering:
/// `"12"` yes, `"012"`, `"12a"`, `"+12"` no.
pub fn parse_license_id(s: &str) -> Option<i64> {
    let trimmed = s.trim();
    let id: i64 = trimmed.parse().ok()?;
    (id.to_string() == trimmed).then_some(id)
}

/// Classifies `s`, checking hardware id, then license id, then email.
pub fn classify(s: &str) -> IdentifierKind {
    if is_hardware_id(s) {
        IdentifierKind::HardwareId
    } else if parse_license_id(s).is_some() {
        IdentifierKind::LicenseId
    } else if is_email(s) {
        IdentifierKind::Email
    } else {
        IdentifierKind::Text
    }
}
