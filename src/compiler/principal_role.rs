//! Principal role requests on the management API.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{ApiSurface, EntityKind, HttpMethod, RequestCompiler, RequestDescriptor};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical principal role operations.
    PrincipalRoleOperation for EntityKind::PrincipalRole => {
        List => ["list", "ls"],
        Create => ["create"],
        Get => ["get", "fetch", "load", "describe"],
        Update => ["update"],
        Delete => ["delete", "drop", "remove"],
        ListPrincipals => ["list-principals", "list-assignees"],
        ListCatalogRoles => ["list-catalog-roles"],
        AssignCatalogRole => ["assign-catalog-role", "grant-catalog-role"],
        RevokeCatalogRole => ["revoke-catalog-role"],
    }
}

/// `principal-roles[/{principalRole}[/...]]`.
///
/// Catalog role assignments are scoped by catalog:
/// `principal-roles/{principalRole}/catalog-roles/{catalog}[/{catalogRole}]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrincipalRoleCompiler;

impl RequestCompiler for PrincipalRoleCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::PrincipalRole
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Management
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = PrincipalRoleOperation::parse(args.operation()?)?;

        let role_path = || -> Result<String> {
            let role = args.require_name(NameField::PrincipalRole)?;
            Ok(format!("principal-roles/{}", encode_segment(role)))
        };
        let catalog_roles_path = || -> Result<String> {
            let base = role_path()?;
            let catalog = args.require_name(NameField::Catalog)?;
            Ok(format!("{base}/catalog-roles/{}", encode_segment(catalog)))
        };

        let (method, path, body) = match operation {
            PrincipalRoleOperation::List => (HttpMethod::Get, "principal-roles".to_string(), None),
            PrincipalRoleOperation::Create => (
                HttpMethod::Post,
                "principal-roles".to_string(),
                Some(args.require_body("Create")?),
            ),
            PrincipalRoleOperation::Get => (HttpMethod::Get, role_path()?, None),
            PrincipalRoleOperation::Update => {
                let path = role_path()?;
                (HttpMethod::Put, path, Some(args.require_body("Update")?))
            }
            PrincipalRoleOperation::Delete => (HttpMethod::Delete, role_path()?, None),
            PrincipalRoleOperation::ListPrincipals => {
                (HttpMethod::Get, format!("{}/principals", role_path()?), None)
            }
            PrincipalRoleOperation::ListCatalogRoles => {
                (HttpMethod::Get, catalog_roles_path()?, None)
            }
            PrincipalRoleOperation::AssignCatalogRole => {
                let path = catalog_roles_path()?;
                (HttpMethod::Put, path, Some(args.require_body("Assign")?))
            }
            PrincipalRoleOperation::RevokeCatalogRole => {
                let base = catalog_roles_path()?;
                let catalog_role = args.require_name(NameField::CatalogRole)?;
                let path = format!("{base}/{}", encode_segment(catalog_role));
                (HttpMethod::Delete, path, None)
            }
        };

        tracing::trace!(
            operation = operation.name(),
            %method,
            %path,
            "compiled principal role request"
        );
        args.descriptor(method, path, body)
    }
}
