//! Error types for license resolution and account operations.

use sas4_client::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A candidate license offered when a search had no exact match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestion {
    pub id: i64,
    pub ehwid: Option<String>,
    /// Owning client's email, `"N/A"` when the record has none.
    pub email: String,
}

/// Which identifier of a swap an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwapSide {
    Old,
    New,
}

impl std::fmt::Display for SwapSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Old => f.write_str("old"),
            Self::New => f.write_str("new"),
        }
    }
}

/// Failures surfaced to callers of the resolver, swapper and invoicer.
///
/// `Display` is the human-readable message shown to end users.
#[derive(Debug, Error)]
pub enum LicenseError {
    /// Operator login was rejected; not retried.
    #[error("Authentication failed: {0}")]
    Authentication(String),

    /// Network or remote-side failure with no structured message.
    #[error("{0}")]
    Transport(String),

    /// The remote rejected the request with a message.
    #[error("{0}")]
    RemoteRejection(String),

    /// Nothing matched exactly; `suggestions` may help refine the query.
    #[error("{message}")]
    NotFound {
        message: String,
        suggestions: Vec<Suggestion>,
    },

    /// Malformed local input; never reaches the remote.
    #[error("{0}")]
    Validation(String),

    /// Both swap identifiers resolved to the same license.
    #[error("Cannot swap a license with itself: both EHWIDs resolve to license #{license_id}")]
    SelfSwap { license_id: i64 },

    /// One side of a swap could not be resolved.
    #[error("Failed to resolve {side} license {ehwid}: {source}")]
    Lookup {
        side: SwapSide,
        ehwid: String,
        #[source]
        source: Box<LicenseError>,
    },

    #[error("internal error: {0}")]
    Internal(String),
}

/// Result type for license operations.
pub type LicenseResult<T> = Result<T, LicenseError>;

impl LicenseError {
    /// A not-found failure without suggestions.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
            suggestions: Vec::new(),
        }
    }

    /// Suggestions carried by a not-found failure (empty otherwise).
    pub fn suggestions(&self) -> &[Suggestion] {
        match self {
            Self::NotFound { suggestions, .. } => suggestions,
            _ => &[],
        }
    }

    /// True for not-found failures, including a swap side that was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } => true,
            Self::Lookup { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<ClientError> for LicenseError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Authentication(msg) => Self::Authentication(msg),
            ClientError::Transport(msg) => Self::Transport(msg),
            ClientError::Remote(msg) => Self::RemoteRejection(msg),
            ClientError::NotFound(msg) => Self::not_found(msg),
            other @ (ClientError::Config(_)
            | ClientError::Serialization(_)
            | ClientError::Crypto(_)) => Self::Internal(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_errors_map_to_taxonomy() {
        let auth: LicenseError = ClientError::Authentication("nope".into()).into();
        assert_eq!(auth.to_string(), "Authentication failed: nope");

        let remote: LicenseError = ClientError::Remote("Invalid license".into()).into();
        assert!(matches!(remote, LicenseError::RemoteRejection(ref m) if m == "Invalid license"));

        let transport: LicenseError = ClientError::Transport("connection reset".into()).into();
        assert_eq!(transport.to_string(), "connection reset");

        let missing: LicenseError = ClientError::NotFound("gone".into()).into();
        assert!(missing.is_not_found());
        assert!(missing.suggestions().is_empty());

        let config: LicenseError = ClientError::Config("bad".into()).into();
        assert!(matches!(config, LicenseError::Internal(_)));
    }

    #[test]
    fn lookup_wraps_source_message() {
        let err = LicenseError::Lookup {
            side: SwapSide::New,
            ehwid: "AAAAA-BBBBB-CCCCC-DDDDD".into(),
            source: Box::new(LicenseError::not_found("License not found for this EHWID")),
        };
        assert_eq!(
            err.to_string(),
            "Failed to resolve new license AAAAA-BBBBB-CCCCC-DDDDD: License not found for this EHWID"
        );
        assert!(err.is_not_found());
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn self_swap_is_not_not_found() {
        let err = LicenseError::SelfSwap { license_id: 5 };
        assert!(!err.is_not_found());
        assert!(err.to_string().contains("itself"));
        assert!(err.to_string().contains("#5"));
    }

    #[test]
    fn swap_side_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&SwapSide::Old).unwrap(), "\"old\"");
    }
}
