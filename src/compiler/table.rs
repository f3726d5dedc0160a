//! Iceberg table requests.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{ApiSurface, EntityKind, HttpMethod, RequestCompiler, RequestDescriptor};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical table operations.
    TableOperation for EntityKind::Table => {
        List => ["list", "ls"],
        Get => ["get", "fetch", "load", "describe"],
        Create => ["create"],
        Commit => ["commit", "update"],
        Delete => ["delete", "drop", "remove"],
    }
}

/// `{catalog}/namespaces/{namespace}/tables[/{table}]` on the catalog API.
#[derive(Debug, Default, Clone, Copy)]
pub struct TableCompiler;

impl RequestCompiler for TableCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::Table
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Catalog
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = TableOperation::parse(args.operation()?)?;
        let namespace = args.namespace()?;
        let catalog = args.require_name(NameField::Catalog)?;

        let tables = format!(
            "{}/namespaces/{}/tables",
            encode_segment(catalog),
            namespace.encoded()
        );
        let table_path = || -> Result<String> {
            let table = args.require_name(NameField::Table)?;
            Ok(format!("{tables}/{}", encode_segment(table)))
        };

        let (method, path, body) = match operation {
            TableOperation::List => (HttpMethod::Get, tables.clone(), None),
            TableOperation::Get => (HttpMethod::Get, table_path()?, None),
            TableOperation::Create => {
                (HttpMethod::Post, tables.clone(), Some(args.require_body("Create")?))
            }
            TableOperation::Commit => {
                let path = table_path()?;
                (HttpMethod::Post, path, Some(args.require_body("Commit")?))
            }
            TableOperation::Delete => (HttpMethod::Delete, table_path()?, None),
        };

        tracing::trace!(operation = operation.name(), %method, %path, "compiled table request");
        args.descriptor(method, path, body)
    }
}
