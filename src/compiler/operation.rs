//! Operation alias resolution.
//!
//! Each entity kind owns one static alias table. Matching is
//! case-insensitive after trimming; the first alias listed for an operation
//! is its canonical name.

use crate::compiler::EntityKind;
use crate::types::{Error, Result};

/// Canonical operation set of one entity kind.
pub trait Operation: Copy + Eq + std::fmt::Debug + 'static {
    const KIND: EntityKind;

    /// Alias table, canonical spelling first for every operation.
    fn aliases() -> &'static [(&'static str, Self)];

    /// Resolve a raw operation string.
    fn parse(raw: &str) -> Result<Self> {
        resolve_operation(Self::KIND, raw, Self::aliases())
    }

    /// Canonical spelling of this operation.
    fn name(self) -> &'static str {
        Self::aliases()
            .iter()
            .find(|(_, op)| *op == self)
            .map(|(alias, _)| *alias)
            .unwrap_or_default()
    }
}

/// Look `raw` up in `aliases`, ignoring case and surrounding whitespace.
pub fn resolve_operation<Op: Copy>(
    kind: EntityKind,
    raw: &str,
    aliases: &[(&str, Op)],
) -> Result<Op> {
    let wanted = raw.trim();
    aliases
        .iter()
        .find(|(alias, _)| alias.eq_ignore_ascii_case(wanted))
        .map(|(_, op)| *op)
        .ok_or_else(|| Error::unsupported_operation(kind, raw))
}

/// Define an operation enum together with its static alias table.
///
/// ```text
/// define_operations! {
///     TableOperation for EntityKind::Table => {
///         List => ["list", "ls"],
///         Get => ["get", "fetch"],
///     }
/// }
/// ```
macro_rules! define_operations {
    (
        $(#[$meta:meta])*
        $name:ident for $kind:expr => {
            $($variant:ident => [$($alias:literal),+ $(,)?]),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $crate::compiler::operation::Operation for $name {
            const KIND: $crate::compiler::EntityKind = $kind;

            fn aliases() -> &'static [(&'static str, Self)] {
                &[$($(($alias, $name::$variant)),+),+]
            }
        }
    };
}

pub(crate) use define_operations;

#[cfg(test)]
mod tests {
    use super::*;

    define_operations! {
        /// Test-only operation set.
        SampleOperation for EntityKind::Catalog => {
            List => ["list", "ls"],
            Delete => ["delete", "drop"],
        }
    }

    #[test]
    fn test_resolve_is_case_insensitive() {
        assert_eq!(SampleOperation::parse("LS").unwrap(), SampleOperation::List);
        assert_eq!(SampleOperation::parse(" Drop ").unwrap(), SampleOperation::Delete);
    }

    #[test]
    fn test_unknown_operation_names_kind() {
        let err = SampleOperation::parse("truncate").unwrap_err();
        assert_eq!(err.to_string(), "Unsupported catalog operation: truncate");
    }

    #[test]
    fn test_canonical_name_is_first_alias() {
        assert_eq!(SampleOperation::List.name(), "list");
        assert_eq!(SampleOperation::Delete.name(), "delete");
    }
}
