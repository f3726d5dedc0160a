//! Path segment and namespace encoding.
//!
//! Multi-level namespaces travel as a single path segment: segments are joined
//! with the unit separator (U+001F) and the joined string is percent-encoded
//! as a whole, so `["db", "schema"]` becomes `db%1Fschema`.

use crate::types::{Error, Result};

/// Separator placed between namespace segments before encoding.
pub const NAMESPACE_SEPARATOR: &str = "\u{1F}";

pub const NAMESPACE_REQUIRED: &str = "Namespace must be provided";
pub const NAMESPACE_EMPTY: &str = "Namespace array must contain at least one segment";
pub const NAMESPACE_BLANK_SEGMENT: &str = "Namespace array elements must not be blank";
pub const NAMESPACE_DOT_SEGMENT: &str = "Namespace segments must not be '.' or '..'";

/// Percent-encode one path component.
///
/// Everything outside the unreserved set is escaped (space becomes `%20`)
/// except `/`, which callers never pass inside a pre-split component.
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).replace("%2F", "/")
}

/// Whether any `/`-separated piece of `name` is `.` or `..`.
///
/// Such pieces survive [`encode_segment`] unescaped and are collapsed when the
/// request path is resolved against the base URL.
pub fn has_dot_segment(name: &str) -> bool {
    name.split('/').any(|piece| piece == "." || piece == "..")
}

/// Trim, validate and encode namespace segments as one path segment.
pub fn encode_namespace<I, S>(segments: I) -> Result<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Ok(Namespace::from_segments(segments)?.encoded())
}

/// Normalized namespace: at least one segment, none blank, all trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Namespace(Vec<String>);

impl Namespace {
    /// Build from an explicit sequence of segments.
    pub fn from_segments<I, S>(segments: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let trimmed: Vec<String> = segments
            .into_iter()
            .map(|s| s.as_ref().trim().to_string())
            .collect();

        if trimmed.is_empty() {
            return Err(Error::validation(NAMESPACE_EMPTY));
        }
        if trimmed.iter().any(String::is_empty) {
            return Err(Error::validation(NAMESPACE_BLANK_SEGMENT));
        }
        if trimmed.iter().any(|s| has_dot_segment(s)) {
            return Err(Error::validation(NAMESPACE_DOT_SEGMENT));
        }
        Ok(Self(trimmed))
    }

    /// Build the implicit one-segment namespace of a plain string.
    pub fn single(name: &str) -> Result<Self> {
        let name = name.trim();
        if name.is_empty() {
            return Err(Error::validation(NAMESPACE_REQUIRED));
        }
        if has_dot_segment(name) {
            return Err(Error::validation(NAMESPACE_DOT_SEGMENT));
        }
        Ok(Self(vec![name.to_string()]))
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// Segments joined by the unit separator, unencoded.
    ///
    /// This is the form used for query parameters such as `parent`.
    pub fn joined(&self) -> String {
        self.0.join(NAMESPACE_SEPARATOR)
    }

    /// The namespace as one percent-encoded path segment.
    pub fn encoded(&self) -> String {
        encode_segment(&self.joined())
    }
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}
