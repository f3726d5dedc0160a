//! OAuth client-credentials token exchange.

use crate::auth::credentials::Credentials;
use crate::types::{Error, Result};
use async_trait::async_trait;
use serde_json::Value;

const DEFAULT_EXPIRES_IN: f64 = 3600.0;

/// Token returned by the authorization server.
#[derive(Debug, Clone, PartialEq)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds.
    pub expires_in: f64,
}

/// Exchanges client credentials for an access token.
#[async_trait]
pub trait TokenEndpoint: std::fmt::Debug + Send + Sync {
    async fn exchange(&self, realm: Option<&str>, credentials: &Credentials)
        -> Result<IssuedToken>;
}

/// Form-encoded `POST` to the token URL.
#[derive(Debug, Clone)]
pub struct HttpTokenEndpoint {
    client: reqwest::Client,
    default_token_url: String,
    realm_header_name: String,
}

impl HttpTokenEndpoint {
    pub fn new(
        client: reqwest::Client,
        default_token_url: impl Into<String>,
        realm_header_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            default_token_url: default_token_url.into(),
            realm_header_name: realm_header_name.into(),
        }
    }
}

#[async_trait]
impl TokenEndpoint for HttpTokenEndpoint {
    async fn exchange(
        &self,
        realm: Option<&str>,
        credentials: &Credentials,
    ) -> Result<IssuedToken> {
        let token_url = credentials
            .token_url
            .as_deref()
            .unwrap_or(&self.default_token_url);

        let mut form = vec![
            ("grant_type", "client_credentials"),
            ("client_id", credentials.client_id.as_str()),
            ("client_secret", credentials.client_secret.as_str()),
        ];
        if let Some(scope) = credentials.scope.as_deref() {
            form.push(("scope", scope));
        }

        let mut request = self.client.post(token_url).form(&form);
        if let Some(realm) = realm {
            request = request.header(self.realm_header_name.as_str(), realm);
        }

        tracing::debug!(token_url, realm = realm.unwrap_or_default(), "requesting access token");
        let response = request.send().await?;
        let status = response.status();
        let body = response.bytes().await?;
        if !status.is_success() {
            return Err(Error::TokenEndpointStatus {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        parse_token_response(&body)
    }
}

/// Parse a token endpoint response body.
///
/// `access_token` must be a non-empty string. `expires_in` may be a number or
/// a numeric string; anything else means one hour.
pub fn parse_token_response(body: &[u8]) -> Result<IssuedToken> {
    let document: Value = serde_json::from_slice(body)
        .map_err(|_| Error::token_exchange("OAuth token endpoint returned invalid JSON"))?;

    let access_token = document
        .get("access_token")
        .and_then(Value::as_str)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::token_exchange("OAuth token response missing access_token"))?
        .to_string();

    let expires_in = match document.get("expires_in") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|v| v.is_finite())
    .unwrap_or(DEFAULT_EXPIRES_IN);

    Ok(IssuedToken {
        access_token,
        expires_in,
    })
}
