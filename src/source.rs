//! Provenance annotations tying Avro fields back to the XML constructs they
//! were derived from.
//!
//! Sanitizing and collision suffixing can rename a field away from its XML
//! name, so every generated field carries a `source` property recording the
//! original local name and whether it came from an attribute or a child
//! element. The datum builder routes XML content through these annotations,
//! never through the Avro field names.

use std::fmt;

/// Property key under which provenance is stored on records and fields.
pub const SOURCE: &str = "source";

/// Sentinel `source` value of the synthetic record that wraps multiple
/// global root elements.
pub const DOCUMENT: &str = "document";

/// Reserved field name of the map that collects elements matched by
/// `xs:any`.
pub const WILDCARD: &str = "others";

/// XML origin of a single Avro field: the original local name plus the
/// attribute-vs-element flag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Source {
    name: String,
    attribute: bool,
}

impl Source {
    pub fn new(name: impl Into<String>, attribute: bool) -> Self {
        Self {
            name: name.into(),
            attribute,
        }
    }

    /// Provenance of a field populated from a child element.
    pub fn element(name: impl Into<String>) -> Self {
        Self::new(name, false)
    }

    /// Provenance of a field populated from an attribute.
    pub fn attribute(name: impl Into<String>) -> Self {
        Self::new(name, true)
    }

    /// The original XML local name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_attribute(&self) -> bool {
        self.attribute
    }

    /// Parse the string form produced by [`Display`](fmt::Display).
    pub fn parse(value: &str) -> Option<Self> {
        let (kind, name) = value.split_once(' ')?;
        match kind {
            "element" => Some(Self::element(name)),
            "attribute" => Some(Self::attribute(name)),
            _ => None,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.attribute { "attribute" } else { "element" };
        write!(f, "{kind} {}", self.name)
    }
}
