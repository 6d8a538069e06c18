//! Client for the SAS4 licensing platform.
//!
//! This crate handles:
//! - Operator login and a shared bearer token with expiry-aware renewal
//! - Encrypted request bodies (see `sas4-crypto`)
//! - The remote license, client, invoice and swap endpoints
//!
//! Higher layers depend on the [`LicensePlatform`] trait rather than on
//! [`RemoteClient`] directly, so resolution logic can run against a fake.

pub mod clock;
pub mod config;
mod error;
pub mod models;
mod platform;
mod remote;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::RemoteConfig;
pub use error::{ClientError, ClientResult};
pub use models::{
    ClientDetails, ClientPage, ClientRecord, ClientSearch, InvoiceDraft, InvoiceItem,
    LicensePage, LicenseRecord, LicenseSearch, LoginResponse,
};
pub use platform::LicensePlatform;
pub use remote::{
    RemoteClient, EHWID_NOT_FOUND, EHWID_NOT_FOUND_SERVER_ERROR,
};
pub use session::SessionCache;
