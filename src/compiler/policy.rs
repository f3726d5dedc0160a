//! Policy requests on the Polaris policy API.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{
    ApiSurface, EntityKind, HttpMethod, ParamValue, RequestCompiler, RequestDescriptor,
};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical policy operations.
    PolicyOperation for EntityKind::Policy => {
        List => ["list", "ls"],
        Create => ["create"],
        Get => ["get", "fetch", "load", "describe"],
        Update => ["update"],
        Delete => ["delete", "drop", "remove"],
        Attach => ["attach"],
        Detach => ["detach"],
        ListApplicable => ["list-applicable", "applicable"],
    }
}

/// `{catalog}/namespaces/{namespace}/policies[/{policy}[/mappings]]`, plus
/// `{catalog}/applicable-policies`.
#[derive(Debug, Default, Clone, Copy)]
pub struct PolicyCompiler;

impl RequestCompiler for PolicyCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::Policy
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Policy
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = PolicyOperation::parse(args.operation()?)?;

        let namespace = match operation {
            PolicyOperation::ListApplicable => return applicable_policies(&args),
            _ => args.namespace()?,
        };
        let catalog = args.require_name(NameField::Catalog)?;
        let policies = format!(
            "{}/namespaces/{}/policies",
            encode_segment(catalog),
            namespace.encoded()
        );
        let policy_path = |suffix: &str| -> Result<String> {
            let policy = args.require_name(NameField::Policy)?;
            Ok(format!("{policies}/{}{suffix}", encode_segment(policy)))
        };

        let (method, path, body) = match operation {
            PolicyOperation::List => (HttpMethod::Get, policies.clone(), None),
            PolicyOperation::Create => {
                (HttpMethod::Post, policies.clone(), Some(args.require_body("Create")?))
            }
            PolicyOperation::Get => (HttpMethod::Get, policy_path("")?, None),
            PolicyOperation::Update => {
                let path = policy_path("")?;
                (HttpMethod::Put, path, Some(args.require_body("Update")?))
            }
            PolicyOperation::Delete => (HttpMethod::Delete, policy_path("")?, None),
            PolicyOperation::Attach => {
                let path = policy_path("/mappings")?;
                (HttpMethod::Put, path, Some(args.require_body("Attach")?))
            }
            PolicyOperation::Detach => {
                let path = policy_path("/mappings")?;
                (HttpMethod::Post, path, Some(args.require_body("Detach")?))
            }
            PolicyOperation::ListApplicable => return applicable_policies(&args),
        };

        tracing::trace!(operation = operation.name(), %method, %path, "compiled policy request");
        args.descriptor(method, path, body)
    }
}

/// `GET {catalog}/applicable-policies`, optionally scoped by `namespace`.
fn applicable_policies(args: &ToolArguments<'_>) -> Result<RequestDescriptor> {
    let namespace = args.optional_namespace()?;
    let catalog = args.require_name(NameField::Catalog)?;
    let path = format!("{}/applicable-policies", encode_segment(catalog));
    let mut descriptor = args.descriptor(HttpMethod::Get, path, None)?;
    if let Some(namespace) = namespace {
        descriptor
            .query
            .entry("namespace".to_string())
            .or_insert_with(|| ParamValue::Single(namespace.joined()));
    }
    tracing::trace!(path = %descriptor.path, "compiled applicable policies request");
    Ok(descriptor)
}
