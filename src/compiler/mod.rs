//! Operation-to-request compilers.
//!
//! Each entity kind turns loosely typed tool arguments into a
//! [`RequestDescriptor`]:
//!
//! ```text
//!   arguments ──► alias table ──► validation ──► method + path ──► descriptor
//!                 (operation)     (namespace,     (percent-       (copied query,
//!                                  names, body)    encoded)        headers, body)
//! ```
//!
//! Compilation is pure and synchronous; nothing here performs I/O.

pub mod operation;

pub mod arguments;
pub mod encoding;
pub mod request;

mod catalog;
mod catalog_role;
mod namespace;
mod policy;
mod principal;
mod principal_role;
mod table;

pub use arguments::{NameField, ToolArguments};
pub use catalog::{CatalogCompiler, CatalogOperation};
pub use catalog_role::{CatalogRoleCompiler, CatalogRoleOperation};
pub use encoding::{encode_namespace, encode_segment, Namespace, NAMESPACE_SEPARATOR};
pub use namespace::{NamespaceCompiler, NamespaceOperation};
pub use operation::{resolve_operation, Operation};
pub use policy::{PolicyCompiler, PolicyOperation};
pub use principal::{PrincipalCompiler, PrincipalOperation};
pub use principal_role::{PrincipalRoleCompiler, PrincipalRoleOperation};
pub use request::{HttpMethod, ParamMap, ParamValue, RequestDescriptor};
pub use table::{TableCompiler, TableOperation};

use crate::types::Result;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Entity kinds administered through the tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Table,
    Namespace,
    Principal,
    PrincipalRole,
    CatalogRole,
    Policy,
    Catalog,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Table => "table",
            EntityKind::Namespace => "namespace",
            EntityKind::Principal => "principal",
            EntityKind::PrincipalRole => "principal role",
            EntityKind::CatalogRole => "catalog role",
            EntityKind::Policy => "policy",
            EntityKind::Catalog => "catalog",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Polaris REST surface a compiled path is relative to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiSurface {
    /// Iceberg REST catalog API.
    Catalog,
    /// Polaris management API.
    Management,
    /// Polaris policy API.
    Policy,
}

impl ApiSurface {
    /// Path prefix relative to the base URL.
    pub fn prefix(&self) -> &'static str {
        match self {
            ApiSurface::Catalog => "api/catalog/v1/",
            ApiSurface::Management => "api/management/v1/",
            ApiSurface::Policy => "api/catalog/polaris/v1/",
        }
    }
}

/// Compiles tool arguments for one entity kind.
pub trait RequestCompiler: fmt::Debug + Send + Sync {
    fn kind(&self) -> EntityKind;

    fn api(&self) -> ApiSurface;

    /// Validate `arguments` and build the request. Never mutates or retains
    /// the caller's value.
    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor>;
}
