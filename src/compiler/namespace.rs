//! Namespace requests on the catalog API.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{
    ApiSurface, EntityKind, HttpMethod, ParamValue, RequestCompiler, RequestDescriptor,
};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical namespace operations.
    NamespaceOperation for EntityKind::Namespace => {
        List => ["list", "ls"],
        Get => ["get", "fetch", "load", "describe"],
        Create => ["create"],
        UpdateProperties => ["update-properties", "update", "set-properties"],
        Delete => ["delete", "drop", "remove"],
    }
}

/// `{catalog}/namespaces[/{namespace}[/properties]]`.
///
/// Listing takes an optional parent namespace, sent as the `parent` query
/// parameter. Creating takes the namespace either inside the body or as the
/// `namespace` argument.
#[derive(Debug, Default, Clone, Copy)]
pub struct NamespaceCompiler;

impl RequestCompiler for NamespaceCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::Namespace
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Catalog
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = NamespaceOperation::parse(args.operation()?)?;
        let namespace = match operation {
            NamespaceOperation::List | NamespaceOperation::Create => args.optional_namespace()?,
            _ => Some(args.namespace()?),
        };
        let catalog = args.require_name(NameField::Catalog)?;
        let namespaces = format!("{}/namespaces", encode_segment(catalog));
        let item = |suffix: &str| match &namespace {
            Some(namespace) => format!("{namespaces}/{}{suffix}", namespace.encoded()),
            None => namespaces.clone(),
        };

        let descriptor = match operation {
            NamespaceOperation::List => {
                let mut descriptor = args.descriptor(HttpMethod::Get, namespaces.clone(), None)?;
                if let Some(parent) = &namespace {
                    descriptor
                        .query
                        .entry("parent".to_string())
                        .or_insert_with(|| ParamValue::Single(parent.joined()));
                }
                descriptor
            }
            NamespaceOperation::Create => {
                let mut body = args.require_body("Create")?;
                if let (Some(namespace), Value::Object(map)) = (&namespace, &mut body) {
                    map.entry("namespace")
                        .or_insert_with(|| Value::from(namespace.segments().to_vec()));
                }
                args.descriptor(HttpMethod::Post, namespaces.clone(), Some(body))?
            }
            NamespaceOperation::Get => args.descriptor(HttpMethod::Get, item(""), None)?,
            NamespaceOperation::UpdateProperties => {
                let body = args.require_body("Update")?;
                args.descriptor(HttpMethod::Post, item("/properties"), Some(body))?
            }
            NamespaceOperation::Delete => args.descriptor(HttpMethod::Delete, item(""), None)?,
        };

        tracing::trace!(
            operation = operation.name(),
            method = %descriptor.method,
            path = %descriptor.path,
            "compiled namespace request"
        );
        Ok(descriptor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(arguments: Value) -> Result<RequestDescriptor> {
        NamespaceCompiler.compile(&arguments)
    }

    #[test]
    fn test_list_without_parent() {
        let descriptor = compile(json!({"operation": "list", "catalog": "prod"})).unwrap();
        assert_eq!(descriptor.method, HttpMethod::Get);
        assert_eq!(descriptor.path, "prod/namespaces");
        assert!(descriptor.query.is_empty());
    }

    #[test]
    fn test_list_with_parent_sets_query() {
        let descriptor = compile(json!({
            "operation": "ls",
            "catalog": "prod",
            "namespace": ["a", " b "],
        }))
        .unwrap();
        assert_eq!(descriptor.query["parent"], ParamValue::from("a\u{1F}b"));
    }

    #[test]
    fn test_list_keeps_explicit_parent_query() {
        let descriptor = compile(json!({
            "operation": "list",
            "catalog": "prod",
            "namespace": "a",
            "query": {"parent": "explicit"},
        }))
        .unwrap();
        assert_eq!(descriptor.query["parent"], ParamValue::from("explicit"));
    }

    #[test]
    fn test_get_and_delete_paths() {
        let get = compile(json!({"operation": "load", "catalog": "prod", "namespace": ["a", "b"]}))
            .unwrap();
        assert_eq!(get.method, HttpMethod::Get);
        assert_eq!(get.path, "prod/namespaces/a%1Fb");

        let delete = compile(json!({"operation": "DROP", "catalog": "prod", "namespace": "a"}))
            .unwrap();
        assert_eq!(delete.method, HttpMethod::Delete);
        assert_eq!(delete.path, "prod/namespaces/a");
    }

    #[test]
    fn test_get_requires_namespace() {
        let err = compile(json!({"operation": "get", "catalog": "prod"})).unwrap_err();
        assert_eq!(err.to_string(), "Namespace must be provided");
    }

    #[test]
    fn test_create_fills_namespace_into_body() {
        let descriptor = compile(json!({
            "operation": "create",
            "catalog": "prod",
            "namespace": ["a", "b"],
            "body": {"properties": {"owner": "data"}},
        }))
        .unwrap();
        assert_eq!(descriptor.method, HttpMethod::Post);
        assert_eq!(descriptor.path, "prod/namespaces");
        assert_eq!(
            descriptor.body.unwrap(),
            json!({"namespace": ["a", "b"], "properties": {"owner": "data"}})
        );
    }

    #[test]
    fn test_create_keeps_body_namespace() {
        let descriptor = compile(json!({
            "operation": "create",
            "catalog": "prod",
            "namespace": "ignored",
            "body": {"namespace": ["kept"]},
        }))
        .unwrap();
        assert_eq!(descriptor.body.unwrap(), json!({"namespace": ["kept"]}));
    }

    #[test]
    fn test_create_requires_body() {
        let err = compile(json!({"operation": "create", "catalog": "prod", "namespace": "a"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Create operations require a request body");
    }

    #[test]
    fn test_update_properties() {
        let descriptor = compile(json!({
            "operation": "update",
            "catalog": "prod",
            "namespace": "a",
            "body": {"updates": {"k": "v"}, "removals": []},
        }))
        .unwrap();
        assert_eq!(descriptor.method, HttpMethod::Post);
        assert_eq!(descriptor.path, "prod/namespaces/a/properties");

        let err = compile(json!({"operation": "update", "catalog": "prod", "namespace": "a"}))
            .unwrap_err();
        assert_eq!(err.to_string(), "Update operations require a request body");
    }
}
