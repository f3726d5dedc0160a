//! Authorization for outgoing Polaris requests.
//!
//! Three providers share one trait: no header, a fixed bearer token, or OAuth
//! client credentials backed by a realm-keyed [`TokenCache`].

pub mod clock;
pub mod credentials;
pub mod endpoint;
pub mod token_cache;

pub use clock::{Clock, ManualClock, SystemClock};
pub use credentials::{CredentialSource, Credentials, EnvCredentialSource};
pub use endpoint::{parse_token_response, HttpTokenEndpoint, IssuedToken, TokenEndpoint};
pub use token_cache::{CachedToken, TokenCache};

use crate::types::{non_blank, AuthMode, Config, Result};
use async_trait::async_trait;
use std::sync::Arc;

/// Supplies the `Authorization` header value for a realm.
#[async_trait]
pub trait AuthorizationProvider: std::fmt::Debug + Send + Sync {
    /// `Bearer <token>`, or `None` when requests go out unauthenticated.
    async fn authorization_header(&self, realm: Option<&str>) -> Result<Option<String>>;
}

/// Never adds a header.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoAuth;

#[async_trait]
impl AuthorizationProvider for NoAuth {
    async fn authorization_header(&self, _realm: Option<&str>) -> Result<Option<String>> {
        Ok(None)
    }
}

/// Fixed bearer token for every realm.
#[derive(Clone)]
pub struct StaticTokenAuth {
    header: Option<String>,
}

impl StaticTokenAuth {
    /// A blank token yields no header.
    pub fn new(token: &str) -> Self {
        Self {
            header: non_blank(Some(token)).map(|token| format!("Bearer {token}")),
        }
    }
}

impl std::fmt::Debug for StaticTokenAuth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticTokenAuth")
            .field("configured", &self.header.is_some())
            .finish()
    }
}

#[async_trait]
impl AuthorizationProvider for StaticTokenAuth {
    async fn authorization_header(&self, _realm: Option<&str>) -> Result<Option<String>> {
        Ok(self.header.clone())
    }
}

/// OAuth client credentials through a shared token cache.
#[derive(Debug, Clone)]
pub struct ClientCredentialsAuth {
    cache: Arc<TokenCache>,
}

impl ClientCredentialsAuth {
    pub fn new(cache: Arc<TokenCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl AuthorizationProvider for ClientCredentialsAuth {
    async fn authorization_header(&self, realm: Option<&str>) -> Result<Option<String>> {
        Ok(self
            .cache
            .token(realm)
            .await?
            .map(|token| format!("Bearer {token}")))
    }
}

/// Build the provider selected by `config.auth.mode`.
///
/// Client credentials are read from `source`; the token exchange shares
/// `client`.
pub fn provider_from_config(
    config: &Config,
    client: reqwest::Client,
    source: Arc<dyn CredentialSource>,
) -> Result<Arc<dyn AuthorizationProvider>> {
    let provider: Arc<dyn AuthorizationProvider> = match &config.auth.mode {
        AuthMode::None => Arc::new(NoAuth),
        AuthMode::Static { token } => Arc::new(StaticTokenAuth::new(token)),
        AuthMode::ClientCredentials => {
            let endpoint = HttpTokenEndpoint::new(
                client,
                config.default_token_url()?,
                config.auth.realm_header_name.clone(),
            );
            let cache = TokenCache::new(source, Arc::new(endpoint), config.auth.refresh_buffer);
            Arc::new(ClientCredentialsAuth::new(Arc::new(cache)))
        }
    };
    tracing::debug!(provider = ?provider, "authorization provider ready");
    Ok(provider)
}
