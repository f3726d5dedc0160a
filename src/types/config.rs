//! Configuration structures.
//!
//! Configuration is loaded from `POLARIS_*` environment variables, optionally
//! supplemented by a dotenv-style config file. Loading works on a snapshot of
//! variables so tests never touch the process environment.

use crate::types::{Error, Result};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Variable naming an explicit config file.
pub const CONFIG_FILE_VAR: &str = "POLARIS_CONFIG_FILE";
/// File searched for in the working directory and its ancestors.
pub const DEFAULT_CONFIG_FILE: &str = ".polaris_mcp.env";

pub const DEFAULT_BASE_URL: &str = "http://localhost:8181/";
pub const DEFAULT_REALM_HEADER: &str = "Polaris-Realm";

const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_REFRESH_BUFFER: Duration = Duration::from_secs(60);
const DEFAULT_RETRIES_TOTAL: u32 = 3;
const DEFAULT_BACKOFF: Duration = Duration::from_millis(500);
const DEFAULT_RETRY_STATUSES: [u16; 3] = [401, 409, 429];

const TOKEN_VARS: [&str; 3] = ["POLARIS_API_TOKEN", "POLARIS_BEARER_TOKEN", "POLARIS_TOKEN"];
const REALM_PREFIX: &str = "POLARIS_REALM_";

/// Global tool configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Polaris base URL, always ending with `/`.
    pub base_url: String,

    /// Outbound HTTP configuration.
    #[serde(default)]
    pub http: HttpConfig,

    /// Authorization configuration.
    #[serde(default)]
    pub auth: AuthConfig,

    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            http: HttpConfig::default(),
            auth: AuthConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Outbound HTTP configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Connect timeout.
    #[serde(with = "humantime_serde")]
    pub connect_timeout: Duration,

    /// Read timeout, applied to the whole request.
    #[serde(with = "humantime_serde")]
    pub read_timeout: Duration,

    /// Maximum retries on a retryable status.
    pub retries_total: u32,

    /// Base backoff; attempt `n` waits `backoff_factor * 2^n`.
    #[serde(with = "humantime_serde")]
    pub backoff_factor: Duration,

    /// Statuses that trigger a retry.
    pub retry_statuses: Vec<u16>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: DEFAULT_HTTP_TIMEOUT,
            read_timeout: DEFAULT_HTTP_TIMEOUT,
            retries_total: DEFAULT_RETRIES_TOTAL,
            backoff_factor: DEFAULT_BACKOFF,
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        }
    }
}

/// How outgoing requests are authorized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AuthMode {
    /// No Authorization header.
    #[default]
    None,
    /// Fixed bearer token.
    Static { token: String },
    /// OAuth client-credentials with per-realm token caching.
    ClientCredentials,
}

/// Authorization configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    #[serde(default)]
    pub mode: AuthMode,

    /// Safety margin subtracted from token expiry.
    #[serde(with = "humantime_serde")]
    pub refresh_buffer: Duration,

    /// Header carrying the realm on token and catalog requests.
    pub realm_header_name: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            mode: AuthMode::None,
            refresh_buffer: DEFAULT_REFRESH_BUFFER,
            realm_header_name: DEFAULT_REALM_HEADER.to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Tracing filter used when `RUST_LOG` is unset.
    pub log_level: String,

    /// Enable JSON log formatting.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

impl Config {
    /// Load configuration from the process environment and config file.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(&env_snapshot()?)
    }

    /// Load configuration from a snapshot of environment variables.
    ///
    /// Unparsable numeric values fall back to their defaults; an invalid base
    /// URL is an error.
    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let lookup = |key: &str| non_blank(vars.get(key).map(String::as_str));

        let base_url = lookup("POLARIS_BASE_URL")
            .or_else(|| lookup("POLARIS_REST_BASE_URL"))
            .unwrap_or(DEFAULT_BASE_URL);
        let base_url = validate_base_url(base_url)?;

        let default_timeout = lookup("POLARIS_HTTP_TIMEOUT_SECONDS").and_then(parse_seconds);
        let http = HttpConfig {
            connect_timeout: lookup("POLARIS_HTTP_CONNECT_TIMEOUT_SECONDS")
                .and_then(parse_seconds)
                .or(default_timeout)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            read_timeout: lookup("POLARIS_HTTP_READ_TIMEOUT_SECONDS")
                .and_then(parse_seconds)
                .or(default_timeout)
                .unwrap_or(DEFAULT_HTTP_TIMEOUT),
            retries_total: lookup("POLARIS_HTTP_RETRIES_TOTAL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRIES_TOTAL),
            backoff_factor: lookup("POLARIS_HTTP_RETRIES_BACKOFF_FACTOR")
                .and_then(parse_non_negative_seconds)
                .unwrap_or(DEFAULT_BACKOFF),
            retry_statuses: DEFAULT_RETRY_STATUSES.to_vec(),
        };

        let refresh_buffer = lookup("POLARIS_TOKEN_REFRESH_BUFFER_SECONDS")
            .and_then(|v| v.parse::<f64>().ok())
            .and_then(|v| Duration::try_from_secs_f64(v.max(0.0)).ok())
            .unwrap_or(DEFAULT_REFRESH_BUFFER);

        let auth = AuthConfig {
            mode: resolve_auth_mode(vars),
            refresh_buffer,
            realm_header_name: lookup("POLARIS_REALM_CONTEXT_HEADER_NAME")
                .unwrap_or(DEFAULT_REALM_HEADER)
                .to_string(),
        };

        let observability = ObservabilityConfig {
            log_level: lookup("RUST_LOG").unwrap_or("info").to_string(),
            json_logs: lookup("POLARIS_LOG_FORMAT")
                .map(|v| v.eq_ignore_ascii_case("json"))
                .unwrap_or(false),
        };

        Ok(Self {
            base_url,
            http,
            auth,
            observability,
        })
    }

    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Url::parse(&self.base_url)
            .map_err(|e| Error::config(format!("Invalid Polaris base URL: {e}")))
    }

    /// Default OAuth token endpoint, relative to the base URL.
    pub fn default_token_url(&self) -> Result<String> {
        let url = self
            .base_url()?
            .join("api/catalog/v1/oauth/tokens")
            .map_err(|e| Error::config(format!("Invalid token URL: {e}")))?;
        Ok(url.to_string())
    }
}

/// Static token first; then client credentials when global credentials or
/// any realm-scoped key exist; otherwise none.
fn resolve_auth_mode(vars: &HashMap<String, String>) -> AuthMode {
    let lookup = |key: &str| non_blank(vars.get(key).map(String::as_str));

    if let Some(token) = TOKEN_VARS.iter().find_map(|key| lookup(key)) {
        return AuthMode::Static {
            token: token.to_string(),
        };
    }

    let has_global = lookup("POLARIS_CLIENT_ID").is_some() && lookup("POLARIS_CLIENT_SECRET").is_some();
    let has_realm = vars.keys().any(|key| key.starts_with(REALM_PREFIX));
    if has_global || has_realm {
        AuthMode::ClientCredentials
    } else {
        AuthMode::None
    }
}

fn validate_base_url(raw: &str) -> Result<String> {
    let url = Url::parse(raw)
        .map_err(|e| Error::config(format!("Invalid Polaris base URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::config("Polaris base URL must use http or https."));
    }
    if url.host_str().map_or(true, str::is_empty) {
        return Err(Error::config("Polaris base URL must include a hostname."));
    }
    let mut normalized = url.to_string();
    if !normalized.ends_with('/') {
        normalized.push('/');
    }
    Ok(normalized)
}

fn parse_seconds(raw: &str) -> Option<Duration> {
    parse_non_negative_seconds(raw).filter(|d| !d.is_zero())
}

fn parse_non_negative_seconds(raw: &str) -> Option<Duration> {
    raw.parse::<f64>()
        .ok()
        .filter(|v| *v >= 0.0)
        .and_then(|v| Duration::try_from_secs_f64(v).ok())
}

/// Process environment merged with the config file, if one is found.
pub fn env_snapshot() -> Result<HashMap<String, String>> {
    let cwd = std::env::current_dir()?;
    with_config_file(std::env::vars().collect(), &cwd)
}

/// Merge config file values under `env`.
///
/// The file is named by `POLARIS_CONFIG_FILE`, or else is the nearest
/// `.polaris_mcp.env` in `cwd` or its ancestors. Variables already present in
/// `env` keep their values. A named file that does not exist loads nothing.
pub fn with_config_file(
    env: HashMap<String, String>,
    cwd: &Path,
) -> Result<HashMap<String, String>> {
    let Some(path) = config_file_path(&env, cwd) else {
        return Ok(env);
    };
    let mut merged = read_config_file(&path)?;
    tracing::debug!(path = %path.display(), keys = merged.len(), "Loaded config file");
    merged.extend(env);
    Ok(merged)
}

fn config_file_path(env: &HashMap<String, String>, cwd: &Path) -> Option<PathBuf> {
    if let Some(path) = non_blank(env.get(CONFIG_FILE_VAR).map(String::as_str)) {
        return Some(PathBuf::from(path));
    }
    cwd.ancestors()
        .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
        .find(|candidate| candidate.is_file())
}

fn read_config_file(path: &Path) -> Result<HashMap<String, String>> {
    let entries = match dotenvy::from_path_iter(path) {
        Ok(entries) => entries,
        Err(dotenvy::Error::Io(e)) if e.kind() == std::io::ErrorKind::NotFound => {
            return Ok(HashMap::new());
        }
        Err(e) => return Err(config_file_error(path, e)),
    };
    entries
        .map(|entry| entry.map_err(|e| config_file_error(path, e)))
        .collect()
}

fn config_file_error(path: &Path, error: dotenvy::Error) -> Error {
    match error {
        dotenvy::Error::Io(e) => Error::Io(e),
        other => Error::config(format!("Invalid config file '{}': {other}", path.display())),
    }
}

pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_without_variables() {
        let config = Config::from_vars(&HashMap::new()).unwrap();
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.http.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.http.retries_total, 3);
        assert_eq!(config.http.retry_statuses, vec![401, 409, 429]);
        assert_eq!(config.auth.mode, AuthMode::None);
        assert_eq!(config.auth.refresh_buffer, Duration::from_secs(60));
        assert_eq!(config.auth.realm_header_name, "Polaris-Realm");
    }

    #[test]
    fn base_url_precedence_and_trailing_slash() {
        let config = Config::from_vars(&vars(&[
            ("POLARIS_BASE_URL", "  "),
            ("POLARIS_REST_BASE_URL", "https://polaris.example.com/root"),
        ]))
        .unwrap();
        assert_eq!(config.base_url, "https://polaris.example.com/root/");
        assert_eq!(
            config.default_token_url().unwrap(),
            "https://polaris.example.com/root/api/catalog/v1/oauth/tokens"
        );
    }

    #[test]
    fn base_url_must_be_http() {
        let err = Config::from_vars(&vars(&[("POLARIS_BASE_URL", "ftp://example.com/")]))
            .unwrap_err();
        assert!(err.to_string().contains("must use http or https"));
    }

    #[test]
    fn timeouts_fall_back_through_shared_value() {
        let config = Config::from_vars(&vars(&[
            ("POLARIS_HTTP_TIMEOUT_SECONDS", "12"),
            ("POLARIS_HTTP_READ_TIMEOUT_SECONDS", "2.5"),
            ("POLARIS_HTTP_CONNECT_TIMEOUT_SECONDS", "not-a-number"),
        ]))
        .unwrap();
        assert_eq!(config.http.connect_timeout, Duration::from_secs(12));
        assert_eq!(config.http.read_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn negative_refresh_buffer_clamps_to_zero() {
        let config = Config::from_vars(&vars(&[(
            "POLARIS_TOKEN_REFRESH_BUFFER_SECONDS",
            "-5",
        )]))
        .unwrap();
        assert_eq!(config.auth.refresh_buffer, Duration::ZERO);
    }

    #[test]
    fn zero_backoff_disables_retry_delay() {
        let config =
            Config::from_vars(&vars(&[("POLARIS_HTTP_RETRIES_BACKOFF_FACTOR", "0")])).unwrap();
        assert_eq!(config.http.backoff_factor, Duration::ZERO);

        let config =
            Config::from_vars(&vars(&[("POLARIS_HTTP_RETRIES_BACKOFF_FACTOR", "-1")])).unwrap();
        assert_eq!(config.http.backoff_factor, Duration::from_millis(500));

        let config = Config::from_vars(&vars(&[("POLARIS_HTTP_TIMEOUT_SECONDS", "0")])).unwrap();
        assert_eq!(config.http.read_timeout, Duration::from_secs(30));
    }

    #[test]
    fn static_token_wins_over_client_credentials() {
        let config = Config::from_vars(&vars(&[
            ("POLARIS_BEARER_TOKEN", " abc "),
            ("POLARIS_CLIENT_ID", "id"),
            ("POLARIS_CLIENT_SECRET", "secret"),
        ]))
        .unwrap();
        assert_eq!(
            config.auth.mode,
            AuthMode::Static {
                token: "abc".to_string()
            }
        );
    }

    #[test]
    fn realm_keys_enable_client_credentials() {
        let config = Config::from_vars(&vars(&[("POLARIS_REALM_west_CLIENT_ID", "id")])).unwrap();
        assert_eq!(config.auth.mode, AuthMode::ClientCredentials);

        let config = Config::from_vars(&vars(&[("POLARIS_CLIENT_ID", "id")])).unwrap();
        assert_eq!(config.auth.mode, AuthMode::None);
    }

    #[test]
    fn default_config_file_found_in_ancestor() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "POLARIS_CLIENT_ID=file-id\n")
            .unwrap();

        assert_eq!(
            config_file_path(&HashMap::new(), &nested),
            Some(dir.path().join(DEFAULT_CONFIG_FILE))
        );
        let snapshot = with_config_file(HashMap::new(), &nested).unwrap();
        assert_eq!(snapshot["POLARIS_CLIENT_ID"], "file-id");
    }

    #[test]
    fn custom_config_file_replaces_search() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(DEFAULT_CONFIG_FILE), "POLARIS_CLIENT_ID=default\n")
            .unwrap();
        let custom = dir.path().join("custom.env");
        std::fs::write(&custom, "POLARIS_CLIENT_ID=custom\n").unwrap();

        let env = vars(&[(CONFIG_FILE_VAR, custom.to_str().unwrap())]);
        assert_eq!(config_file_path(&env, dir.path()), Some(custom.clone()));
        let snapshot = with_config_file(env, dir.path()).unwrap();
        assert_eq!(snapshot["POLARIS_CLIENT_ID"], "custom");
    }

    #[test]
    fn environment_wins_over_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("polaris.env");
        std::fs::write(
            &file,
            "POLARIS_BASE_URL=http://remote:8181/\nPOLARIS_CLIENT_ID=file-client-id\n",
        )
        .unwrap();

        let env = vars(&[
            (CONFIG_FILE_VAR, file.to_str().unwrap()),
            ("POLARIS_BASE_URL", "http://localhost:8181/"),
        ]);
        let snapshot = with_config_file(env, dir.path()).unwrap();
        assert_eq!(snapshot["POLARIS_CLIENT_ID"], "file-client-id");

        let config = Config::from_vars(&snapshot).unwrap();
        assert_eq!(config.base_url, "http://localhost:8181/");
    }

    #[test]
    fn missing_config_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let env = vars(&[
            (CONFIG_FILE_VAR, "/nonexistent/polaris.env"),
            ("POLARIS_CLIENT_ID", "env-id"),
        ]);
        let snapshot = with_config_file(env.clone(), dir.path()).unwrap();
        assert_eq!(snapshot, env);
    }

    #[test]
    fn unreadable_config_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let env = vars(&[(CONFIG_FILE_VAR, dir.path().to_str().unwrap())]);
        let err = with_config_file(env, dir.path()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert_eq!(err.kind(), "INTERNAL");
    }

    #[test]
    fn config_serializes_durations_as_humantime() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["http"]["connect_timeout"], "30s");
        assert_eq!(json["auth"]["mode"]["type"], "none");
    }
}
