//! Tool registry: routes tool calls by name through compile, authorize,
//! execute.

use crate::auth::{provider_from_config, AuthorizationProvider, CredentialSource};
use crate::compiler::{
    ApiSurface, CatalogCompiler, CatalogRoleCompiler, NamespaceCompiler, PolicyCompiler,
    PrincipalCompiler, PrincipalRoleCompiler, RequestCompiler, RequestDescriptor, TableCompiler,
    ToolArguments,
};
use crate::executor::{build_client, AuthorizedRequest, RequestExecutor, RestExecutor, ToolResult};
use crate::tools::catalog::{ParamDef, ParamType, ToolCatalog, ToolEntry};
use crate::types::{Config, Error, Result};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;

pub const TABLE_TOOL: &str = "polaris-iceberg-table";
pub const NAMESPACE_TOOL: &str = "polaris-namespace-request";
pub const PRINCIPAL_TOOL: &str = "polaris-principal-request";
pub const PRINCIPAL_ROLE_TOOL: &str = "polaris-principal-role-request";
pub const CATALOG_ROLE_TOOL: &str = "polaris-catalog-role-request";
pub const POLICY_TOOL: &str = "polaris-policy-request";
pub const CATALOG_TOOL: &str = "polaris-catalog-request";

/// The seven Polaris tools wired to their compilers and a shared executor.
#[derive(Debug)]
pub struct ToolRegistry {
    catalog: ToolCatalog,
    compilers: HashMap<String, Arc<dyn RequestCompiler>>,
    auth: Arc<dyn AuthorizationProvider>,
    executor: Arc<dyn RequestExecutor>,
}

impl ToolRegistry {
    pub fn new(auth: Arc<dyn AuthorizationProvider>, executor: Arc<dyn RequestExecutor>) -> Result<Self> {
        let mut registry = Self {
            catalog: ToolCatalog::new(),
            compilers: HashMap::new(),
            auth,
            executor,
        };
        for (entry, compiler) in builtin_tools() {
            registry.compilers.insert(entry.name.clone(), compiler);
            registry.catalog.register(entry)?;
        }
        Ok(registry)
    }

    /// Registry over a real HTTP executor, authorizing per `config.auth`.
    pub fn from_config(config: &Config, credentials: Arc<dyn CredentialSource>) -> Result<Self> {
        let client = build_client(&config.http)?;
        let auth = provider_from_config(config, client.clone(), credentials)?;
        let executor = RestExecutor::from_config(config, client)?;
        Self::new(auth, Arc::new(executor))
    }

    pub fn catalog(&self) -> &ToolCatalog {
        &self.catalog
    }

    /// Tool definitions (`name`, `description`, `inputSchema`), sorted by name.
    pub fn list_tools(&self) -> Vec<Value> {
        self.catalog
            .list_entries()
            .into_iter()
            .map(ToolEntry::definition)
            .collect()
    }

    /// Validate and compile without sending anything.
    pub fn compile(&self, tool: &str, arguments: &Value) -> Result<(ApiSurface, RequestDescriptor)> {
        let errors = self.catalog.validate_params(tool, arguments)?;
        if !errors.is_empty() {
            return Err(Error::validation(format!(
                "Invalid arguments for {}: {}",
                tool,
                errors.join("; ")
            )));
        }
        let compiler = self
            .compilers
            .get(tool)
            .ok_or_else(|| Error::not_found(format!("Unknown tool: {}", tool)))?;
        Ok((compiler.api(), compiler.compile(arguments)?))
    }

    /// Run one tool call end to end.
    pub async fn call_tool(&self, tool: &str, arguments: &Value) -> Result<ToolResult> {
        let (api, request) = self.compile(tool, arguments)?;
        let realm = ToolArguments::new(arguments)?.realm().map(str::to_string);
        let authorization = self.auth.authorization_header(realm.as_deref()).await?;

        let result = self
            .executor
            .execute(AuthorizedRequest {
                api,
                request,
                authorization,
                realm,
            })
            .await?;

        tracing::info!(tool, is_error = result.is_error, "tool call result");
        Ok(result)
    }

    /// Like [`call_tool`](Self::call_tool), folding failures into an error
    /// result tagged with the error kind.
    pub async fn call_tool_result(&self, tool: &str, arguments: &Value) -> ToolResult {
        match self.call_tool(tool, arguments).await {
            Ok(result) => result,
            Err(e) => {
                tracing::info!(tool, is_error = true, kind = e.kind(), "tool call failed: {}", e);
                ToolResult::error(e.to_string(), Some(json!({ "kind": e.kind() })))
            }
        }
    }
}

// =============================================================================
// Built-in tools
// =============================================================================

fn operation(kind: &str) -> ParamDef {
    ParamDef::required(
        "operation",
        ParamType::String,
        &format!("{kind} operation to perform; aliases are accepted case-insensitively"),
    )
}

fn name(param: &str, description: &str, required: bool) -> ParamDef {
    if required {
        ParamDef::required(param, ParamType::String, description)
    } else {
        ParamDef::optional(param, ParamType::String, description)
    }
}

fn namespace(required: bool) -> ParamDef {
    let description =
        "Namespace as a single name or an array of levels, e.g. [\"analytics\", \"daily\"]";
    if required {
        ParamDef::required("namespace", ParamType::StringOrList, description)
    } else {
        ParamDef::optional("namespace", ParamType::StringOrList, description)
    }
}

fn request_params() -> [ParamDef; 4] {
    [
        ParamDef::optional("query", ParamType::Object, "Additional query parameters"),
        ParamDef::optional("headers", ParamType::Object, "Additional request headers"),
        ParamDef::optional("body", ParamType::Any, "JSON request body"),
        ParamDef::optional("realm", ParamType::String, "Polaris realm to address"),
    ]
}

fn tool(
    name: &str,
    description: &str,
    compiler: Arc<dyn RequestCompiler>,
    mut parameters: Vec<ParamDef>,
) -> (ToolEntry, Arc<dyn RequestCompiler>) {
    parameters.extend(request_params());
    let entry = ToolEntry {
        name: name.to_string(),
        description: description.to_string(),
        parameters,
        kind: compiler.kind(),
    };
    (entry, compiler)
}

fn builtin_tools() -> Vec<(ToolEntry, Arc<dyn RequestCompiler>)> {
    let principal_role = || {
        name("principalRole", "Principal role name", false).with_alias("principal_role")
    };
    let catalog_role = || name("catalogRole", "Catalog role name", false).with_alias("catalog_role");

    vec![
        tool(
            TABLE_TOOL,
            "List, load, create, commit to, or drop Iceberg tables in a Polaris catalog.",
            Arc::new(TableCompiler),
            vec![
                operation("Table"),
                name("catalog", "Catalog name", true),
                namespace(true),
                name("table", "Table name", false),
            ],
        ),
        tool(
            NAMESPACE_TOOL,
            "List, load, create, update properties of, or drop namespaces in a Polaris catalog.",
            Arc::new(NamespaceCompiler),
            vec![
                operation("Namespace"),
                name("catalog", "Catalog name", true),
                namespace(false),
            ],
        ),
        tool(
            PRINCIPAL_TOOL,
            "Manage Polaris principals, their credentials, and their principal role assignments.",
            Arc::new(PrincipalCompiler),
            vec![
                operation("Principal"),
                name("principal", "Principal name", false),
                principal_role(),
            ],
        ),
        tool(
            PRINCIPAL_ROLE_TOOL,
            "Manage principal roles and the catalog roles assigned to them.",
            Arc::new(PrincipalRoleCompiler),
            vec![
                operation("Principal role"),
                principal_role(),
                name("catalog", "Catalog name", false),
                catalog_role(),
            ],
        ),
        tool(
            CATALOG_ROLE_TOOL,
            "Manage catalog roles and their grants within a Polaris catalog.",
            Arc::new(CatalogRoleCompiler),
            vec![
                operation("Catalog role"),
                name("catalog", "Catalog name", true),
                catalog_role(),
            ],
        ),
        tool(
            POLICY_TOOL,
            "Manage Polaris policies, their attachments, and applicable-policy lookups.",
            Arc::new(PolicyCompiler),
            vec![
                operation("Policy"),
                name("catalog", "Catalog name", true),
                namespace(false),
                name("policy", "Policy name", false),
            ],
        ),
        tool(
            CATALOG_TOOL,
            "List, load, create, update, or drop Polaris catalogs.",
            Arc::new(CatalogCompiler),
            vec![operation("Catalog"), name("catalog", "Catalog name", false)],
        ),
    ]
}
