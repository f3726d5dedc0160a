//! Principal requests on the management API.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{ApiSurface, EntityKind, HttpMethod, RequestCompiler, RequestDescriptor};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical principal operations.
    PrincipalOperation for EntityKind::Principal => {
        List => ["list", "ls"],
        Create => ["create"],
        Get => ["get", "fetch", "load", "describe"],
        Update => ["update"],
        Delete => ["delete", "drop", "remove"],
        RotateCredentials => ["rotate-credentials", "rotate"],
        ResetCredentials => ["reset-credentials", "reset"],
        ListPrincipalRoles => ["list-principal-roles", "list-roles"],
        AssignPrincipalRole => ["assign-principal-role", "assign-role", "grant-role"],
        RevokePrincipalRole => ["revoke-principal-role", "revoke-role"],
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PrincipalCompiler;

impl RequestCompiler for PrincipalCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::Principal
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Management
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = PrincipalOperation::parse(args.operation()?)?;

        let principal_path = |suffix: &str| -> Result<String> {
            let principal = args.require_name(NameField::Principal)?;
            Ok(format!("principals/{}{suffix}", encode_segment(principal)))
        };

        let (method, path, body) = match operation {
            PrincipalOperation::List => (HttpMethod::Get, "principals".to_string(), None),
            PrincipalOperation::Create => (
                HttpMethod::Post,
                "principals".to_string(),
                Some(args.require_body("Create")?),
            ),
            PrincipalOperation::Get => (HttpMethod::Get, principal_path("")?, None),
            PrincipalOperation::Update => {
                let path = principal_path("")?;
                (HttpMethod::Put, path, Some(args.require_body("Update")?))
            }
            PrincipalOperation::Delete => (HttpMethod::Delete, principal_path("")?, None),
            PrincipalOperation::RotateCredentials => {
                (HttpMethod::Post, principal_path("/rotate")?, None)
            }
            PrincipalOperation::ResetCredentials => {
                (HttpMethod::Post, principal_path("/reset")?, args.body())
            }
            PrincipalOperation::ListPrincipalRoles => {
                (HttpMethod::Get, principal_path("/principal-roles")?, None)
            }
            PrincipalOperation::AssignPrincipalRole => {
                let path = principal_path("/principal-roles")?;
                (HttpMethod::Put, path, Some(args.require_body("Assign")?))
            }
            PrincipalOperation::RevokePrincipalRole => {
                let base = principal_path("/principal-roles")?;
                let role = args.require_name(NameField::PrincipalRole)?;
                (HttpMethod::Delete, format!("{base}/{}", encode_segment(role)), None)
            }
        };

        tracing::trace!(operation = operation.name(), %method, %path, "compiled principal request");
        args.descriptor(method, path, body)
    }
}
