//! Tool infrastructure: catalog metadata and the Polaris tool registry.

pub mod catalog;
pub mod registry;

pub use catalog::{ParamDef, ParamType, ToolCatalog, ToolEntry};
pub use registry::{
    ToolRegistry, CATALOG_ROLE_TOOL, CATALOG_TOOL, NAMESPACE_TOOL, POLICY_TOOL,
    PRINCIPAL_ROLE_TOOL, PRINCIPAL_TOOL, TABLE_TOOL,
};
