//! Remote platform configuration.

use crate::error::{ClientError, ClientResult};
use crate::session::MAX_SAFETY_MARGIN_SECS;
use serde::{Deserialize, Serialize};

/// Production API root of the SAS4 client area.
pub const DEFAULT_BASE_URL: &str = "https://client.snono-systems.com/backend/index.php/api";

/// Connection and operator-credential settings for the licensing platform.
#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// API root, without trailing slash (e.g. `https://host/backend/index.php/api`).
    pub base_url: String,
    /// Operator account email used for login.
    pub email: String,
    /// Operator account password.
    pub password: String,
    /// Static passphrase for request payload encryption.
    pub encryption_key: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// A cached token is treated as expired this many seconds before its real expiry.
    pub safety_margin_secs: i64,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            email: String::new(),
            password: String::new(),
            encryption_key: String::new(),
            timeout_secs: 30,
            safety_margin_secs: 60,
        }
    }
}

impl RemoteConfig {
    /// Checks that credentials and the payload key are present.
    pub fn validate(&self) -> ClientResult<()> {
        if self.base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url is empty".to_string()));
        }
        if self.email.trim().is_empty() || self.password.is_empty() {
            return Err(ClientError::Config(
                "operator email and password are required".to_string(),
            ));
        }
        if self.encryption_key.is_empty() {
            return Err(ClientError::Config("encryption_key is empty".to_string()));
        }
        if self.safety_margin_secs < 0 {
            return Err(ClientError::Config(
                "safety_margin_secs must not be negative".to_string(),
            ));
        }
        if self.safety_margin_secs > MAX_SAFETY_MARGIN_SECS {
            return Err(ClientError::Config(format!(
                "safety_margin_secs must not exceed {MAX_SAFETY_MARGIN_SECS}"
            )));
        }
        Ok(())
    }

    /// Joins `path` onto the base URL.
    pub(crate) fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for RemoteConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteConfig")
            .field("base_url", &self.base_url)
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("encryption_key", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .field("safety_margin_secs", &self.safety_margin_secs)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> RemoteConfig {
        RemoteConfig {
            email: "ops@example.com".to_string(),
            password: "pw".to_string(),
            encryption_key: "key".to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn defaults() {
        let cfg = RemoteConfig::default();
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.safety_margin_secs, 60);
        assert_eq!(cfg.timeout_secs, 30);
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn valid_config_passes() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn missing_key_rejected() {
        let cfg = RemoteConfig {
            encryption_key: String::new(),
            ..valid()
        };
        assert!(matches!(cfg.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn oversized_safety_margin_rejected() {
        let cfg = RemoteConfig {
            safety_margin_secs: MAX_SAFETY_MARGIN_SECS + 1,
            ..valid()
        };
        assert!(matches!(cfg.validate(), Err(ClientError::Config(_))));
    }

    #[test]
    fn endpoint_joins_slashes() {
        let cfg = RemoteConfig {
            base_url: "http://host/api/".to_string(),
            ..valid()
        };
        assert_eq!(cfg.endpoint("/login"), "http://host/api/login");
        assert_eq!(cfg.endpoint("license/index"), "http://host/api/license/index");
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", valid());
        assert!(!debug.contains("pw\""));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: RemoteConfig =
            serde_json::from_str(r#"{"email":"ops@example.com"}"#).unwrap();
        assert_eq!(cfg.email, "ops@example.com");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
    }
}
