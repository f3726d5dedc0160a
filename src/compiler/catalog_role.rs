//! Catalog role requests on the management API.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{ApiSurface, EntityKind, HttpMethod, RequestCompiler, RequestDescriptor};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical catalog role operations.
    CatalogRoleOperation for EntityKind::CatalogRole => {
        List => ["list", "ls"],
        Create => ["create"],
        Get => ["get", "fetch", "load", "describe"],
        Update => ["update"],
        Delete => ["delete", "drop", "remove"],
        ListPrincipalRoles => ["list-principal-roles"],
        ListGrants => ["list-grants", "grants"],
        AddGrant => ["add-grant", "grant"],
        RevokeGrant => ["revoke-grant", "revoke"],
    }
}

/// `catalogs/{catalog}/catalog-roles[/{catalogRole}[/...]]`.
#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogRoleCompiler;

impl RequestCompiler for CatalogRoleCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::CatalogRole
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Management
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = CatalogRoleOperation::parse(args.operation()?)?;
        let catalog = args.require_name(NameField::Catalog)?;
        let roles = format!("catalogs/{}/catalog-roles", encode_segment(catalog));

        let role_path = |suffix: &str| -> Result<String> {
            let role = args.require_name(NameField::CatalogRole)?;
            Ok(format!("{roles}/{}{suffix}", encode_segment(role)))
        };

        let (method, path, body) = match operation {
            CatalogRoleOperation::List => (HttpMethod::Get, roles.clone(), None),
            CatalogRoleOperation::Create => {
                (HttpMethod::Post, roles.clone(), Some(args.require_body("Create")?))
            }
            CatalogRoleOperation::Get => (HttpMethod::Get, role_path("")?, None),
            CatalogRoleOperation::Update => {
                let path = role_path("")?;
                (HttpMethod::Put, path, Some(args.require_body("Update")?))
            }
            CatalogRoleOperation::Delete => (HttpMethod::Delete, role_path("")?, None),
            CatalogRoleOperation::ListPrincipalRoles => {
                (HttpMethod::Get, role_path("/principal-roles")?, None)
            }
            CatalogRoleOperation::ListGrants => (HttpMethod::Get, role_path("/grants")?, None),
            CatalogRoleOperation::AddGrant => {
                let path = role_path("/grants")?;
                (HttpMethod::Put, path, Some(args.require_body("Grant")?))
            }
            CatalogRoleOperation::RevokeGrant => {
                let path = role_path("/grants")?;
                (HttpMethod::Post, path, Some(args.require_body("Revoke")?))
            }
        };

        tracing::trace!(
            operation = operation.name(),
            %method,
            %path,
            "compiled catalog role request"
        );
        args.descriptor(method, path, body)
    }
}
