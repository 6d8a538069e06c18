//! Request and response shapes of the licensing platform API.
//!
//! Records keep every field they don't model in `extra`, so a record fetched
//! from the remote can be handed back to callers unchanged.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// `POST /login` body (encrypted).
#[derive(Clone, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /login` response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
}

/// `POST /license/index` body (encrypted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseSearch {
    pub page: u32,
    pub count: u32,
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    pub direction: String,
    pub search: String,
    pub owner: Option<i64>,
}

impl Default for LicenseSearch {
    fn default() -> Self {
        Self {
            page: 1,
            count: 500,
            sort_by: "id".to_string(),
            direction: "asc".to_string(),
            search: String::new(),
            owner: None,
        }
    }
}

impl LicenseSearch {
    /// First page of `count` results for a free-text filter.
    pub fn keyword(search: impl Into<String>, count: u32) -> Self {
        Self {
            search: search.into(),
            count,
            ..Default::default()
        }
    }
}

/// Owner details embedded in a license record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientDetails {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A license as returned by the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicenseRecord {
    pub id: i64,
    /// Hardware identifier of the licensed machine.
    #[serde(default)]
    pub ehwid: Option<String>,
    #[serde(default)]
    pub expiration: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub max_users: Option<i64>,
    #[serde(default)]
    pub status: Option<Value>,
    #[serde(default)]
    pub client_details: Option<ClientDetails>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LicenseRecord {
    /// Email of the owning client, if the record carries one.
    pub fn client_email(&self) -> Option<&str> {
        self.client_details
            .as_ref()
            .and_then(|d| d.email.as_deref())
    }
}

/// Paged `POST /license/index` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LicensePage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<LicenseRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub current_page: u64,
    #[serde(default = "first_page")]
    pub last_page: u64,
}

impl LicensePage {
    /// True if this page did not contain every matching record.
    pub fn is_partial(&self) -> bool {
        self.current_page < self.last_page || (self.data.len() as u64) < self.total
    }
}

/// `GET /license/{ehwid}` response.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct LicenseEnvelope {
    #[serde(default, deserialize_with = "lenient_i64")]
    pub status: Option<i64>,
    #[serde(default)]
    pub data: Option<LicenseRecord>,
}

/// `POST /client/index` body (encrypted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientSearch {
    pub page: u32,
    pub count: u32,
    #[serde(rename = "sortBy")]
    pub sort_by: String,
    pub direction: String,
    pub search: String,
}

impl Default for ClientSearch {
    fn default() -> Self {
        Self {
            page: 1,
            count: 50,
            sort_by: "id".to_string(),
            direction: "asc".to_string(),
            search: String::new(),
        }
    }
}

impl ClientSearch {
    pub fn keyword(search: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            ..Default::default()
        }
    }
}

/// A client account as returned by the remote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: i64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Paged `POST /client/index` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientPage {
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: Vec<ClientRecord>,
    #[serde(default)]
    pub total: u64,
    #[serde(default = "first_page")]
    pub current_page: u64,
    #[serde(default = "first_page")]
    pub last_page: u64,
}

/// One invoice line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceItem {
    pub description: String,
    /// Decimal amount with two places, e.g. `"120.00"`.
    pub amount: String,
    pub quantity: u32,
}

/// `POST /invoice/create` body (encrypted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    pub client_id: i64,
    /// `YYYY-MM-DD`.
    pub date: String,
    /// `YYYY-MM-DD`.
    pub due_date: String,
    pub items: Vec<InvoiceItem>,
    #[serde(default)]
    pub comments: String,
}

/// `POST /licenses/swap` body (encrypted).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapRequest {
    pub license_id: i64,
    pub des_license_id: i64,
}

/// Error body the remote sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteErrorBody {
    pub message: String,
}

fn first_page() -> u64 {
    1
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `5`, `5.0`, `"5"` or `null`.
fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => Ok(n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && (i64::MIN as f64..i64::MAX as f64).contains(f))
                .map(|f| f as i64)
        })),
        Some(Value::String(s)) => Ok(s.trim().parse().ok()),
        Some(_) => Ok(None),
    }
}
