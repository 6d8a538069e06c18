//! Moving a license from one machine to another.

use crate::classify::is_hardware_id;
use crate::error::{LicenseError, LicenseResult, SwapSide};
use sas4_client::{LicensePlatform, LicenseRecord};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;

/// The fields of a license worth echoing back after a swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseSummary {
    pub email: Option<String>,
    pub expiration: Option<String>,
    pub status: Option<Value>,
}

impl From<&LicenseRecord> for LicenseSummary {
    fn from(record: &LicenseRecord) -> Self {
        Self {
            email: record.client_email().map(str::to_string),
            expiration: record.expiration.clone(),
            status: record.status.clone(),
        }
    }
}

/// A completed swap.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub old_ehwid: String,
    pub new_ehwid: String,
    pub old_license_id: i64,
    pub new_license_id: i64,
    pub old_details: LicenseSummary,
    pub new_details: LicenseSummary,
    /// The remote's confirmation, unmodified.
    pub remote_response: Value,
}

pub struct LicenseSwapper {
    platform: Arc<dyn LicensePlatform>,
}

impl LicenseSwapper {
    pub fn new(platform: Arc<dyn LicensePlatform>) -> Self {
        Self { platform }
    }

    /// Swaps the license bound to `old_ehwid` onto the one bound to `new_ehwid`.
    ///
    /// Both identifiers are shape-checked before any remote call. Each is then
    /// resolved by direct lookup; a failure names the side that failed.
    pub async fn swap(&self, old_ehwid: &str, new_ehwid: &str) -> LicenseResult<SwapOutcome> {
        let old_ehwid = old_ehwid.trim();
        let new_ehwid = new_ehwid.trim();
        validate_ehwid("old_ehwid", old_ehwid)?;
        validate_ehwid("new_ehwid", new_ehwid)?;

        let old = self.lookup(SwapSide::Old, old_ehwid).await?;
        let new = self.lookup(SwapSide::New, new_ehwid).await?;

        if old.id == new.id {
            return Err(LicenseError::SelfSwap { license_id: old.id });
        }

        info!(
            "Swapping license #{} ({}) -> #{} ({})",
            old.id, old_ehwid, new.id, new_ehwid
        );
        let remote_response = self.platform.swap_licenses(old.id, new.id).await?;

        Ok(SwapOutcome {
            old_ehwid: old_ehwid.to_string(),
            new_ehwid: new_ehwid.to_string(),
            old_license_id: old.id,
            new_license_id: new.id,
            old_details: LicenseSummary::from(&old),
            new_details: LicenseSummary::from(&new),
            remote_response,
        })
    }

    async fn lookup(&self, side: SwapSide, ehwid: &str) -> LicenseResult<LicenseRecord> {
        self.platform
            .license_by_ehwid(ehwid)
            .await
            .map_err(|e| LicenseError::Lookup {
                side,
                ehwid: ehwid.to_string(),
                source: Box::new(e.into()),
            })
    }
}

/// Rejects anything that is not `XXXXX-XXXXX-XXXXX-XXXXX`.
pub(crate) fn validate_ehwid(field: &str, value: &str) -> LicenseResult<()> {
    if is_hardware_id(value) {
        Ok(())
    } else {
        Err(LicenseError::Validation(format!(
            "Invalid {field} format: expected XXXXX-XXXXX-XXXXX-XXXXX, got '{value}'"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_names_the_field() {
        let err = validate_ehwid("new_ehwid", "ABCDE-FG").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid new_ehwid format: expected XXXXX-XXXXX-XXXXX-XXXXX, got 'ABCDE-FG'"
        );
        assert!(validate_ehwid("old_ehwid", "Q46I5-BEAAO-RQA4R-EBQDT").is_ok());
    }

    #[test]
    fn summary_from_record() {
        let record: LicenseRecord = serde_json::from_value(serde_json::json!({
            "id": 1,
            "expiration": "2027-01-01 00:00:00",
            "status": 1,
            "client_details": { "email": "a@b.com" }
        }))
        .unwrap();
        let summary = LicenseSummary::from(&record);
        assert_eq!(summary.email.as_deref(), Some("a@b.com"));
        assert_eq!(summary.expiration.as_deref(), Some("2027-01-01 00:00:00"));
        assert_eq!(summary.status, Some(serde_json::json!(1)));
    }
}
