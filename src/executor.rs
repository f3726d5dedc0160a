//! REST execution of compiled requests.
//!
//! ```text
//! RequestDescriptor ──► URL (base + API prefix + path, query pairs)
//!                   ──► headers (caller, Authorization, realm)
//!                   ──► send, retrying configured statuses with backoff
//!                   ──► ToolResult { text, isError, meta }
//! ```

use crate::compiler::{ApiSurface, RequestDescriptor};
use crate::types::{Config, Error, HttpConfig, Result};
use async_trait::async_trait;
use reqwest::{Method, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

/// Outcome of one tool call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub text: String,
    #[serde(rename = "isError")]
    pub is_error: bool,
    #[serde(rename = "meta", default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

impl ToolResult {
    pub fn success(text: impl Into<String>, metadata: Option<Value>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
            metadata,
        }
    }

    pub fn error(text: impl Into<String>, metadata: Option<Value>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
            metadata,
        }
    }

    /// `{isError, meta?}` without the text.
    pub fn structured(&self) -> Value {
        let mut structured = json!({ "isError": self.is_error });
        if let (Some(meta), Value::Object(map)) = (&self.metadata, &mut structured) {
            map.insert("meta".to_string(), meta.clone());
        }
        structured
    }
}

/// A compiled request plus everything needed to send it.
#[derive(Debug, Clone)]
pub struct AuthorizedRequest {
    pub api: ApiSurface,
    pub request: RequestDescriptor,
    /// Full `Authorization` header value.
    pub authorization: Option<String>,
    pub realm: Option<String>,
}

/// Sends authorized requests.
#[async_trait]
pub trait RequestExecutor: std::fmt::Debug + Send + Sync {
    /// Transport failures are errors; HTTP error statuses are
    /// `is_error` results.
    async fn execute(&self, request: AuthorizedRequest) -> Result<ToolResult>;
}

/// Build the shared HTTP client with the configured timeouts.
pub fn build_client(http: &HttpConfig) -> Result<reqwest::Client> {
    Ok(reqwest::Client::builder()
        .connect_timeout(http.connect_timeout)
        .timeout(http.read_timeout)
        .build()?)
}

/// [`RequestExecutor`] over `reqwest`.
#[derive(Debug, Clone)]
pub struct RestExecutor {
    client: reqwest::Client,
    base_url: Url,
    http: HttpConfig,
    realm_header_name: String,
}

impl RestExecutor {
    pub fn new(
        client: reqwest::Client,
        base_url: Url,
        http: HttpConfig,
        realm_header_name: impl Into<String>,
    ) -> Self {
        Self {
            client,
            base_url,
            http,
            realm_header_name: realm_header_name.into(),
        }
    }

    pub fn from_config(config: &Config, client: reqwest::Client) -> Result<Self> {
        Ok(Self::new(
            client,
            config.base_url()?,
            config.http.clone(),
            config.auth.realm_header_name.clone(),
        ))
    }

    /// Absolute URL of `path` on `api`, without the query string.
    pub fn url_for(&self, api: ApiSurface, path: &str) -> Result<Url> {
        let relative = format!("{}{}", api.prefix(), path.trim_start_matches('/'));
        self.base_url
            .join(&relative)
            .map_err(|e| Error::validation(format!("Invalid request path '{relative}': {e}")))
    }

    fn build(&self, url: &Url, request: &AuthorizedRequest) -> Result<reqwest::RequestBuilder> {
        let descriptor = &request.request;
        let method = Method::from_bytes(descriptor.method.as_str().as_bytes())
            .map_err(|e| Error::validation(format!("Invalid HTTP method: {e}")))?;

        let query: Vec<(&str, &str)> = descriptor
            .query
            .iter()
            .flat_map(|(key, value)| value.values().map(move |v| (key.as_str(), v)))
            .collect();

        let mut builder = self.client.request(method, url.clone());
        if !query.is_empty() {
            builder = builder.query(&query);
        }
        for (name, value) in &descriptor.headers {
            for v in value.values() {
                builder = builder.header(name.as_str(), v);
            }
        }
        if let Some(authorization) = &request.authorization {
            builder = builder.header(reqwest::header::AUTHORIZATION, authorization.as_str());
        }
        if let Some(realm) = &request.realm {
            let caller_set = descriptor
                .headers
                .keys()
                .any(|name| name.eq_ignore_ascii_case(&self.realm_header_name));
            if !caller_set {
                builder = builder.header(self.realm_header_name.as_str(), realm.as_str());
            }
        }
        if let Some(body) = &descriptor.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    fn backoff(&self, attempt: u32) -> Duration {
        self.http
            .backoff_factor
            .saturating_mul(1u32.checked_shl(attempt).unwrap_or(u32::MAX))
    }
}

#[async_trait]
impl RequestExecutor for RestExecutor {
    async fn execute(&self, request: AuthorizedRequest) -> Result<ToolResult> {
        let url = self.url_for(request.api, &request.request.path)?;
        let method = request.request.method;

        let mut attempt = 0u32;
        let response = loop {
            let response = self.build(&url, &request)?.send().await?;
            let status = response.status().as_u16();
            if attempt < self.http.retries_total && self.http.retry_statuses.contains(&status) {
                let delay = self.backoff(attempt);
                tracing::warn!(
                    %method,
                    url = %url,
                    status,
                    attempt = attempt + 1,
                    delay_ms = delay.as_millis() as u64,
                    "retrying Polaris request"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }
            break response;
        };

        let status = response.status();
        let final_url = response.url().to_string();
        let bytes = response.bytes().await?;
        let parsed: Option<Value> = serde_json::from_slice(&bytes).ok();

        tracing::debug!(%method, url = %final_url, status = status.as_u16(), "Polaris request completed");

        let text = match &parsed {
            Some(value) => serde_json::to_string_pretty(value)?,
            None if bytes.is_empty() => format!(
                "{} {}",
                status.as_u16(),
                status.canonical_reason().unwrap_or_default()
            )
            .trim_end()
            .to_string(),
            None => String::from_utf8_lossy(&bytes).into_owned(),
        };
        let metadata = json!({
            "method": method.as_str(),
            "url": final_url,
            "status": status.as_u16(),
            "response": parsed,
        });

        Ok(if status.is_success() {
            ToolResult::success(text, Some(metadata))
        } else {
            ToolResult::error(text, Some(metadata))
        })
    }
}
