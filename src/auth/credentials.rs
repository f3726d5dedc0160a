//! Client credentials resolved per realm.

use crate::types::non_blank;
use std::collections::HashMap;
use std::fmt;

/// OAuth client credentials for one realm.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
    pub scope: Option<String>,
    /// Token endpoint override; the configured default is used when absent.
    pub token_url: Option<String>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("scope", &self.scope)
            .field("token_url", &self.token_url)
            .finish()
    }
}

/// Looks up credentials for a realm. `None` for the default realm.
pub trait CredentialSource: fmt::Debug + Send + Sync {
    fn credentials(&self, realm: Option<&str>) -> Option<Credentials>;
}

/// Credentials from `POLARIS_*` variables.
///
/// A realm reads `POLARIS_REALM_<realm>_CLIENT_ID` and friends first and
/// falls back to the global `POLARIS_CLIENT_ID` set. A set lacking either the
/// id or the secret does not count.
#[derive(Clone, Default)]
pub struct EnvCredentialSource {
    vars: HashMap<String, String>,
}

impl EnvCredentialSource {
    pub fn new(vars: HashMap<String, String>) -> Self {
        Self { vars }
    }

    fn load(&self, prefix: &str) -> Option<Credentials> {
        let get = |key: &str| {
            non_blank(self.vars.get(&format!("{prefix}{key}")).map(String::as_str))
                .map(str::to_string)
        };
        Some(Credentials {
            client_id: get("CLIENT_ID")?,
            client_secret: get("CLIENT_SECRET")?,
            scope: get("TOKEN_SCOPE"),
            token_url: get("TOKEN_URL"),
        })
    }
}

impl fmt::Debug for EnvCredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnvCredentialSource")
            .field("vars", &self.vars.len())
            .finish()
    }
}

impl CredentialSource for EnvCredentialSource {
    fn credentials(&self, realm: Option<&str>) -> Option<Credentials> {
        non_blank(realm)
            .and_then(|realm| self.load(&format!("POLARIS_REALM_{realm}_")))
            .or_else(|| self.load("POLARIS_"))
    }
}
