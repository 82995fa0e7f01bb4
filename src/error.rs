use thiserror::Error;

use crate::common::xml::XSD_NAMESPACE;

/// Error raised when an XSD or XML conversion fails.
///
/// A single error family covers the whole pipeline; the message carries the
/// failing construct, field, or value. All failures are fatal to the
/// in-progress conversion and leave no partial result.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ConverterError {
    message: String,
}

impl ConverterError {
    pub(crate) fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// The schema root is not in the XSD namespace.
    pub(crate) fn missing_namespace(found: Option<&str>) -> Self {
        let found = found.unwrap_or("no namespace");
        Self::new(format!(
            "expected the schema root in namespace {XSD_NAMESPACE}, found {found}"
        ))
    }

    /// An XSD construct outside the supported subset.
    pub(crate) fn unsupported(construct: impl std::fmt::Display) -> Self {
        Self::new(format!("unsupported XSD construct: {construct}"))
    }

    /// XML content that cannot be mapped onto the translated schema.
    pub(crate) fn datum(message: impl std::fmt::Display) -> Self {
        Self::new(format!("cannot build datum: {message}"))
    }

    /// The human-readable diagnostic for this failure.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<roxmltree::Error> for ConverterError {
    fn from(err: roxmltree::Error) -> Self {
        Self::new(format!("XML parse error: {err}"))
    }
}

impl From<apache_avro::Error> for ConverterError {
    fn from(err: apache_avro::Error) -> Self {
        Self::new(format!("Avro schema validation error: {err}"))
    }
}

impl From<serde_json::Error> for ConverterError {
    fn from(err: serde_json::Error) -> Self {
        Self::new(format!("JSON serialization error: {err}"))
    }
}

impl From<std::io::Error> for ConverterError {
    fn from(err: std::io::Error) -> Self {
        Self::new(format!("I/O error: {err}"))
    }
}
