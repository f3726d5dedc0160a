//! Realm-keyed access token cache.
//!
//! Readers take a shared lock over the realm map and clone out an `Arc`
//! entry. A miss or a stale entry enters one async mutex, re-checks, and only
//! then exchanges credentials, so concurrent callers for a stale realm
//! trigger a single exchange.
//!
//! The refresh mutex is global: a slow exchange for one realm delays
//! refreshes (not fast-path reads) for every other realm.

use crate::auth::clock::{Clock, SystemClock};
use crate::auth::credentials::CredentialSource;
use crate::auth::endpoint::TokenEndpoint;
use crate::types::{non_blank, Result};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

/// One installed token. Replaced whole, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedToken {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl CachedToken {
    /// Usable while `now < expires_at - buffer`.
    fn is_fresh(&self, now: DateTime<Utc>, buffer: chrono::Duration) -> bool {
        match self.expires_at.checked_sub_signed(buffer) {
            Some(deadline) => now < deadline,
            None => false,
        }
    }
}

#[derive(Debug)]
pub struct TokenCache {
    entries: RwLock<HashMap<String, Arc<CachedToken>>>,
    refresh: tokio::sync::Mutex<()>,
    refresh_buffer: Duration,
    clock: Arc<dyn Clock>,
    source: Arc<dyn CredentialSource>,
    endpoint: Arc<dyn TokenEndpoint>,
}

impl TokenCache {
    pub fn new(
        source: Arc<dyn CredentialSource>,
        endpoint: Arc<dyn TokenEndpoint>,
        refresh_buffer: Duration,
    ) -> Self {
        Self::with_clock(source, endpoint, refresh_buffer, Arc::new(SystemClock))
    }

    pub fn with_clock(
        source: Arc<dyn CredentialSource>,
        endpoint: Arc<dyn TokenEndpoint>,
        refresh_buffer: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            refresh: tokio::sync::Mutex::new(()),
            refresh_buffer,
            clock,
            source,
            endpoint,
        }
    }

    fn buffer(&self) -> chrono::Duration {
        chrono::Duration::from_std(self.refresh_buffer).unwrap_or(chrono::Duration::MAX)
    }

    fn fresh_entry(&self, key: &str) -> Option<Arc<CachedToken>> {
        let now = self.clock.now();
        let buffer = self.buffer();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .filter(|entry| entry.is_fresh(now, buffer))
            .cloned()
    }

    /// Currently installed entry for `realm`, fresh or not.
    pub fn entry(&self, realm: Option<&str>) -> Option<Arc<CachedToken>> {
        let key = non_blank(realm).unwrap_or_default();
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }

    /// Access token for `realm`, exchanging credentials when the cached one
    /// is missing or inside the refresh buffer.
    ///
    /// `Ok(None)` when no credentials resolve for the realm.
    pub async fn token(&self, realm: Option<&str>) -> Result<Option<String>> {
        let realm = non_blank(realm);
        let key = realm.unwrap_or_default();

        if let Some(entry) = self.fresh_entry(key) {
            return Ok(Some(entry.token.clone()));
        }

        let _guard = self.refresh.lock().await;
        if let Some(entry) = self.fresh_entry(key) {
            return Ok(Some(entry.token.clone()));
        }

        let Some(credentials) = self.source.credentials(realm) else {
            tracing::debug!(realm = key, "no client credentials for realm");
            return Ok(None);
        };

        let issued = self.endpoint.exchange(realm, &credentials).await?;
        let ttl = issued
            .expires_in
            .max(self.refresh_buffer.as_secs_f64())
            .max(0.0);
        let expires_at = Duration::try_from_secs_f64(ttl)
            .ok()
            .and_then(|ttl| chrono::Duration::from_std(ttl).ok())
            .and_then(|ttl| self.clock.now().checked_add_signed(ttl))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        let entry = Arc::new(CachedToken {
            token: issued.access_token,
            expires_at,
        });
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.to_string(), Arc::clone(&entry));

        tracing::info!(realm = key, ttl_secs = ttl, %expires_at, "access token refreshed");
        Ok(Some(entry.token.clone()))
    }
}
