//! Shared bearer-token cache with expiry-aware renewal.
//!
//! One token is shared by every request. It is considered usable until
//! `safety_margin` before the expiry the remote reported, so a token cannot
//! lapse between the validity check and its use on the wire.
//!
//! Renewal is single-writer: callers that find the token unusable queue on a
//! mutex, and each re-checks the cache after acquiring it. A burst of
//! concurrent requests against an expired token therefore triggers exactly one
//! login, and every caller ends up with the token that login produced.

use crate::clock::Clock;
use crate::error::{ClientError, ClientResult};
use crate::models::LoginResponse;
use chrono::{DateTime, TimeDelta, Utc};
use std::future::Future;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Largest safety margin honored; larger settings are clamped to this.
pub const MAX_SAFETY_MARGIN_SECS: i64 = 86_400;

const INVALID_EXPIRES_IN: &str = "login response carried an invalid expires_in";

/// Token and the absolute instant the remote said it stops working.
#[derive(Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

pub struct SessionCache {
    clock: Arc<dyn Clock>,
    safety_margin: TimeDelta,
    current: RwLock<Option<CachedToken>>,
    renewal: Mutex<()>,
}

impl SessionCache {
    /// Creates an empty cache. Nothing is fetched until the first
    /// [`ensure_authenticated`](Self::ensure_authenticated).
    pub fn new(clock: Arc<dyn Clock>, safety_margin_secs: i64) -> Self {
        Self {
            clock,
            safety_margin: TimeDelta::seconds(
                safety_margin_secs.clamp(0, MAX_SAFETY_MARGIN_SECS),
            ),
            current: RwLock::new(None),
            renewal: Mutex::new(()),
        }
    }

    /// True iff a token is cached and `now` is more than the safety margin
    /// before its expiry.
    pub async fn is_valid(&self) -> bool {
        self.usable_token().await.is_some()
    }

    /// Expiry of the cached token, if any.
    pub async fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.current.read().await.as_ref().map(|t| t.expires_at)
    }

    /// Drops the cached token; the next caller logs in again.
    pub async fn invalidate(&self) {
        if self.current.write().await.take().is_some() {
            warn!("Cached token invalidated");
        }
    }

    /// Replaces the cached session with a freshly issued token.
    ///
    /// A lifetime that is not positive, or whose expiry instant cannot be
    /// represented, is rejected and leaves the cache untouched.
    pub async fn store(&self, token: String, expires_in_secs: i64) -> ClientResult<()> {
        let expires_at = TimeDelta::try_seconds(expires_in_secs)
            .filter(|lifetime| *lifetime > TimeDelta::zero())
            .and_then(|lifetime| self.clock.now().checked_add_signed(lifetime))
            .ok_or_else(|| ClientError::Authentication(INVALID_EXPIRES_IN.to_string()))?;
        *self.current.write().await = Some(CachedToken { token, expires_at });
        Ok(())
    }

    /// Returns a usable token, calling `login` first if the cached one is
    /// missing or inside the safety margin.
    ///
    /// Any failure from `login` is reported as [`ClientError::Authentication`].
    pub async fn ensure_authenticated<F, Fut>(&self, login: F) -> ClientResult<String>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = ClientResult<LoginResponse>>,
    {
        if let Some((token, remaining)) = self.usable_token().await {
            debug!("Using cached token, expires in {} seconds", remaining);
            return Ok(token);
        }

        let _renewal = self.renewal.lock().await;

        // Another caller may have renewed while we waited for the lock.
        if let Some((token, remaining)) = self.usable_token().await {
            debug!("Token renewed concurrently, expires in {} seconds", remaining);
            return Ok(token);
        }

        info!("Token expired or missing, logging in...");
        let response = login().await.map_err(|e| match e {
            ClientError::Authentication(_) => e,
            other => ClientError::Authentication(other.to_string()),
        })?;

        if response.access_token.is_empty() {
            return Err(ClientError::Authentication(
                "login response carried no access token".to_string(),
            ));
        }

        self.store(response.access_token.clone(), response.expires_in)
            .await?;
        info!(
            "Token refreshed, expires in {} seconds",
            response.expires_in
        );

        Ok(response.access_token)
    }

    async fn usable_token(&self) -> Option<(String, i64)> {
        let guard = self.current.read().await;
        let cached = guard.as_ref()?;
        let now = self.clock.now();
        let renew_at = cached.expires_at.checked_sub_signed(self.safety_margin)?;
        if now < renew_at {
            Some((cached.token.clone(), (cached.expires_at - now).num_seconds()))
        } else {
            None
        }
    }
}

impl std::fmt::Debug for SessionCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionCache")
            .field("safety_margin", &self.safety_margin)
            .finish_non_exhaustive()
    }
}
