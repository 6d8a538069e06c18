//! HTTP API for license search, swap and renewal invoicing.

use std::{fs, path::Path, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use chrono::{SecondsFormat, Utc};
use sas4_client::{Clock, LicensePlatform, LicenseRecord};
use sas4_license::{
    InvoiceService, KeywordResolver, LicenseError, LicenseMatch, LicenseSwapper, MatchKind,
    PricingTable, RenewalInvoice, Suggestion, SwapOutcome, MISSING_KEYWORD,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

pub const SERVICE_NAME: &str = "SAS4 License Search Server";

/// Services shared by every request handler.
pub struct AppState {
    pub resolver: KeywordResolver,
    pub swapper: LicenseSwapper,
    pub invoices: InvoiceService,
}

impl AppState {
    pub fn new(
        platform: Arc<dyn LicensePlatform>,
        pricing: PricingTable,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            resolver: KeywordResolver::new(platform.clone()),
            swapper: LicenseSwapper::new(platform.clone()),
            invoices: InvoiceService::new(platform, pricing, clock),
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub timestamp: String,
}

#[derive(Deserialize)]
struct SearchRequest {
    #[serde(default)]
    keyword: Option<Value>,
}

#[derive(Deserialize)]
struct SwapRequest {
    #[serde(default)]
    old_ehwid: Option<String>,
    #[serde(default)]
    new_ehwid: Option<String>,
}

#[derive(Deserialize)]
struct InvoiceRequest {
    #[serde(default)]
    ehwid: Option<String>,
    #[serde(default)]
    months: Option<u32>,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MatchData {
    One(LicenseRecord),
    Many(Vec<LicenseRecord>),
}

#[derive(Serialize)]
struct SearchResponse {
    success: bool,
    data: MatchData,
    match_type: MatchKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    total: Option<usize>,
}

impl From<LicenseMatch> for SearchResponse {
    fn from(found: LicenseMatch) -> Self {
        let match_type = found.kind();
        let total = found.total();
        let data = match found {
            LicenseMatch::LicenseId(record) | LicenseMatch::Ehwid(record) => MatchData::One(record),
            LicenseMatch::Email(records) => MatchData::Many(records),
        };
        Self {
            success: true,
            data,
            match_type,
            total,
        }
    }
}

#[derive(Serialize)]
struct Success<T> {
    success: bool,
    data: T,
}

impl<T> Success<T> {
    fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: String,
    #[serde(skip_serializing_if = "<[Suggestion]>::is_empty")]
    suggestions: &'a [Suggestion],
}

/// A failed request, rendered as `{success: false, error, suggestions?}`.
#[derive(Debug)]
pub struct ApiError(pub LicenseError);

impl From<LicenseError> for ApiError {
    fn from(err: LicenseError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = status_for(&self.0);
        if status.is_server_error() {
            warn!("Request failed ({}): {}", status, self.0);
        } else {
            debug!("Request rejected ({}): {}", status, self.0);
        }
        let body = ErrorBody {
            success: false,
            error: self.0.to_string(),
            suggestions: self.0.suggestions(),
        };
        (status, Json(body)).into_response()
    }
}

/// HTTP status for a failed operation.
pub fn status_for(err: &LicenseError) -> StatusCode {
    match err {
        LicenseError::Validation(_) | LicenseError::SelfSwap { .. } => StatusCode::BAD_REQUEST,
        LicenseError::NotFound { .. } => StatusCode::NOT_FOUND,
        LicenseError::Lookup { source, .. } => status_for(source),
        LicenseError::Authentication(_)
        | LicenseError::Transport(_)
        | LicenseError::RemoteRejection(_) => StatusCode::BAD_GATEWAY,
        LicenseError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Parses a JSON body; anything unparseable is reported with `missing`.
fn parse_body<T: DeserializeOwned>(body: &[u8], missing: &str) -> Result<T, ApiError> {
    serde_json::from_slice(body).map_err(|e| {
        debug!("Unparseable request body: {}", e);
        ApiError(LicenseError::Validation(missing.to_string()))
    })
}

/// Keywords may arrive as strings or bare numbers. A zero counts as absent.
fn keyword_text(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s),
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: SERVICE_NAME.to_string(),
        timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<SearchResponse>, ApiError> {
    let request: SearchRequest = parse_body(&body, MISSING_KEYWORD)?;
    let keyword = keyword_text(request.keyword)
        .ok_or_else(|| LicenseError::Validation(MISSING_KEYWORD.to_string()))?;

    info!("Searching license for keyword: {}", keyword);
    let found = state.resolver.resolve(&keyword).await?;
    Ok(Json(found.into()))
}

async fn swap_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Success<SwapOutcome>>, ApiError> {
    const MISSING: &str = "Missing required fields: old_ehwid and new_ehwid";

    let request: SwapRequest = parse_body(&body, MISSING)?;
    let (Some(old_ehwid), Some(new_ehwid)) = (request.old_ehwid, request.new_ehwid) else {
        return Err(LicenseError::Validation(MISSING.to_string()).into());
    };

    let outcome = state.swapper.swap(&old_ehwid, &new_ehwid).await?;
    Ok(Json(Success::new(outcome)))
}

async fn invoice_handler(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Json<Success<RenewalInvoice>>, ApiError> {
    const MISSING: &str = "Missing required fields: ehwid and months";

    let request: InvoiceRequest = parse_body(&body, MISSING)?;
    let (Some(ehwid), Some(months)) = (request.ehwid, request.months) else {
        return Err(LicenseError::Validation(MISSING.to_string()).into());
    };

    let invoice = state.invoices.create_renewal(&ehwid, months).await?;
    Ok(Json(Success::new(invoice)))
}

/// Reads a JSON pricing table, or the built-in one when no path is given.
pub fn load_pricing(path: Option<&Path>) -> anyhow::Result<PricingTable> {
    let Some(path) = path else {
        return Ok(PricingTable::default());
    };
    info!("Loading pricing table from {:?}", path);
    let json = fs::read_to_string(path).context("Failed to read pricing file")?;
    let table = PricingTable::from_json(&json).context("Failed to parse pricing file")?;
    Ok(table)
}

/// Build the HTTP API router over the given services.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/search-license", post(search_handler))
        .route("/api/swap-license", post(swap_handler))
        .route("/api/create-invoice", post(invoice_handler))
        .with_state(state)
}
