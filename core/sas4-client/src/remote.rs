//! HTTP client for the SAS4 licensing platform.
//!
//! Every call except login obtains a token from the [`SessionCache`] first,
//! encrypts its body with the [`PayloadCipher`] and sends the token as a
//! bearer credential. Responses are mapped uniformly:
//!
//! - 2xx with a parsable body: success
//! - non-2xx with a JSON `message`: [`ClientError::Remote`], message verbatim
//! - anything else: [`ClientError::Transport`] with the transport's text

use crate::clock::{Clock, SystemClock};
use crate::config::RemoteConfig;
use crate::error::{ClientError, ClientResult};
use crate::models::{
    ClientPage, ClientSearch, InvoiceDraft, LicenseEnvelope, LicensePage, LicenseRecord,
    LicenseSearch, LoginRequest, LoginResponse, RemoteErrorBody, SwapRequest,
};
use crate::platform::LicensePlatform;
use crate::session::SessionCache;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use sas4_crypto::PayloadCipher;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Message for a direct lookup that came back without a license.
pub const EHWID_NOT_FOUND: &str = "License not found for this EHWID";

/// Message for a direct lookup the remote answered with HTTP 500.
///
/// The remote fails with a server error when the identifier is unknown, so a
/// 500 on this endpoint is folded into "not found".
pub const EHWID_NOT_FOUND_SERVER_ERROR: &str = "License not found for this EHWID (Hardware ID)";

/// Authenticated client for the licensing platform.
pub struct RemoteClient {
    config: RemoteConfig,
    http: Client,
    cipher: PayloadCipher,
    session: SessionCache,
}

impl RemoteClient {
    /// Creates a client using wall-clock time for token expiry.
    pub fn new(config: RemoteConfig) -> ClientResult<Self> {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a client with an explicit time source.
    pub fn with_clock(config: RemoteConfig, clock: Arc<dyn Clock>) -> ClientResult<Self> {
        config.validate()?;

        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ClientError::Config(format!("failed to create HTTP client: {e}")))?;
        let cipher = PayloadCipher::new(config.encryption_key.clone())?;
        let session = SessionCache::new(clock, config.safety_margin_secs);

        Ok(Self {
            config,
            http,
            cipher,
            session,
        })
    }

    /// The shared token cache.
    pub fn session(&self) -> &SessionCache {
        &self.session
    }

    /// Logs in with the operator credentials. Does not touch the cache; use
    /// [`ensure_authenticated`](Self::ensure_authenticated) for that.
    pub async fn login(&self) -> ClientResult<LoginResponse> {
        let body = self.cipher.envelope(&LoginRequest {
            email: &self.config.email,
            password: &self.config.password,
        })?;

        let response = self
            .http
            .post(self.config.endpoint("login"))
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        read_json(response).await
    }

    /// Returns a usable bearer token, logging in if the cached one is missing
    /// or about to expire.
    pub async fn ensure_authenticated(&self) -> ClientResult<String> {
        self.session.ensure_authenticated(|| self.login()).await
    }

    /// Paged free-text license search.
    pub async fn search_licenses(&self, query: &LicenseSearch) -> ClientResult<LicensePage> {
        debug!(search = %query.search, page = query.page, count = query.count, "Searching licenses");
        self.post_authenticated("license/index", query).await
    }

    /// Direct lookup by hardware identifier.
    pub async fn get_license_by_ehwid(&self, ehwid: &str) -> ClientResult<LicenseRecord> {
        let token = self.ensure_authenticated().await?;
        debug!("Looking up license by EHWID {}", ehwid);

        let response = self
            .http
            .get(self.config.endpoint(&format!("license/{}", urlencoding::encode(ehwid))))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(transport_error)?;

        if response.status() == StatusCode::INTERNAL_SERVER_ERROR {
            debug!("EHWID lookup for {} answered 500, treating as not found", ehwid);
            return Err(ClientError::NotFound(EHWID_NOT_FOUND_SERVER_ERROR.to_string()));
        }
        self.note_unauthorized(&response).await;

        let envelope: LicenseEnvelope = read_json(response).await?;
        match envelope {
            LicenseEnvelope {
                status: Some(200),
                data: Some(record),
            } => Ok(record),
            _ => Err(ClientError::NotFound(EHWID_NOT_FOUND.to_string())),
        }
    }

    /// Paged client search.
    pub async fn search_clients(&self, query: &ClientSearch) -> ClientResult<ClientPage> {
        debug!(search = %query.search, "Searching clients");
        self.post_authenticated("client/index", query).await
    }

    /// Creates an invoice.
    pub async fn create_invoice(&self, invoice: &InvoiceDraft) -> ClientResult<Value> {
        let result = self.post_authenticated("invoice/create", invoice).await;
        match &result {
            Ok(_) => info!(client_id = invoice.client_id, "Invoice created"),
            Err(e) => warn!(client_id = invoice.client_id, "Invoice creation failed: {}", e),
        }
        result
    }

    /// Swaps license `license_id` onto `des_license_id`.
    pub async fn swap_licenses(&self, license_id: i64, des_license_id: i64) -> ClientResult<Value> {
        let body = SwapRequest {
            license_id,
            des_license_id,
        };
        let result = self.post_authenticated("licenses/swap", &body).await;
        match &result {
            Ok(_) => info!("Swapped license {} -> {}", license_id, des_license_id),
            Err(e) => warn!("Swap {} -> {} failed: {}", license_id, des_license_id, e),
        }
        result
    }

    async fn post_authenticated<B, T>(&self, path: &str, body: &B) -> ClientResult<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.ensure_authenticated().await?;
        let envelope = self.cipher.envelope(body)?;

        let response = self
            .http
            .post(self.config.endpoint(path))
            .bearer_auth(&token)
            .json(&envelope)
            .send()
            .await
            .map_err(transport_error)?;

        self.note_unauthorized(&response).await;
        read_json(response).await
    }

    /// A 401 means the remote revoked or expired our token early. Drop it so
    /// the next call logs in; the current call still fails.
    async fn note_unauthorized(&self, response: &Response) {
        if response.status() == StatusCode::UNAUTHORIZED {
            self.session.invalidate().await;
        }
    }
}

#[async_trait]
impl LicensePlatform for RemoteClient {
    async fn search_licenses(&self, query: &LicenseSearch) -> ClientResult<LicensePage> {
        RemoteClient::search_licenses(self, query).await
    }

    async fn license_by_ehwid(&self, ehwid: &str) -> ClientResult<LicenseRecord> {
        self.get_license_by_ehwid(ehwid).await
    }

    async fn search_clients(&self, query: &ClientSearch) -> ClientResult<ClientPage> {
        RemoteClient::search_clients(self, query).await
    }

    async fn create_invoice(&self, invoice: &InvoiceDraft) -> ClientResult<Value> {
        RemoteClient::create_invoice(self, invoice).await
    }

    async fn swap_licenses(&self, license_id: i64, des_license_id: i64) -> ClientResult<Value> {
        RemoteClient::swap_licenses(self, license_id, des_license_id).await
    }
}

impl std::fmt::Debug for RemoteClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteClient")
            .field("config", &self.config)
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

fn transport_error(e: reqwest::Error) -> ClientError {
    ClientError::Transport(e.to_string())
}

async fn read_json<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to parse response: {e}")));
    }

    let body = response.text().await.unwrap_or_default();
    Err(error_from_body(status, &body))
}

fn error_from_body(status: StatusCode, body: &str) -> ClientError {
    match serde_json::from_str::<RemoteErrorBody>(body) {
        Ok(err) if !err.message.is_empty() => ClientError::Remote(err.message),
        _ => ClientError::Transport(format!(
            "Request failed with status code {}",
            status.as_u16()
        )),
    }
}
