//! Catalog requests on the management API.

use crate::compiler::arguments::{NameField, ToolArguments};
use crate::compiler::encoding::encode_segment;
use crate::compiler::operation::{define_operations, Operation};
use crate::compiler::{ApiSurface, EntityKind, HttpMethod, RequestCompiler, RequestDescriptor};
use crate::types::Result;
use serde_json::Value;

define_operations! {
    /// Canonical catalog operations.
    CatalogOperation for EntityKind::Catalog => {
        List => ["list", "ls"],
        Create => ["create"],
        Get => ["get", "fetch", "load", "describe"],
        Update => ["update"],
        Delete => ["delete", "drop", "remove"],
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CatalogCompiler;

impl RequestCompiler for CatalogCompiler {
    fn kind(&self) -> EntityKind {
        EntityKind::Catalog
    }

    fn api(&self) -> ApiSurface {
        ApiSurface::Management
    }

    fn compile(&self, arguments: &Value) -> Result<RequestDescriptor> {
        let args = ToolArguments::new(arguments)?;
        let operation = CatalogOperation::parse(args.operation()?)?;

        let catalog_path = || -> Result<String> {
            let catalog = args.require_name(NameField::Catalog)?;
            Ok(format!("catalogs/{}", encode_segment(catalog)))
        };

        let (method, path, body) = match operation {
            CatalogOperation::List => (HttpMethod::Get, "catalogs".to_string(), None),
            CatalogOperation::Create => (
                HttpMethod::Post,
                "catalogs".to_string(),
                Some(args.require_body("Create")?),
            ),
            CatalogOperation::Get => (HttpMethod::Get, catalog_path()?, None),
            CatalogOperation::Update => {
                let path = catalog_path()?;
                (HttpMethod::Put, path, Some(args.require_body("Update")?))
            }
            CatalogOperation::Delete => (HttpMethod::Delete, catalog_path()?, None),
        };

        tracing::trace!(operation = operation.name(), %method, %path, "compiled catalog request");
        args.descriptor(method, path, body)
    }
}
