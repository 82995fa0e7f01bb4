pub mod complex;
pub mod datum;
pub mod roots;
pub mod scalars;
pub mod simple;
pub mod state;

use std::fs;

use apache_avro::types::Value as AvroValue;
use apache_avro::{Schema, Writer};
use serde_json::Value;
use tracing::debug;

use crate::error::ConverterError;
use state::SchemaBuilder;

/// Cap on type-derivation and content-model nesting. Named-type recursion
/// is broken by the registry, so only a pathological XSD gets near this.
pub(crate) const MAX_TYPE_DEPTH: usize = 64;

/// Translate XSD text into an Avro schema.
///
/// Records and fields carry a `source` property with the provenance of
/// their XML construct; [`create_datum`] relies on it.
pub fn create_schema(xsd: &str) -> Result<Schema, ConverterError> {
    let json = schema_json(xsd)?;
    Ok(Schema::parse_str(&json.to_string())?)
}

/// Translate XSD text into the Avro schema JSON that [`create_schema`]
/// parses. Named types are defined at their first use; later references
/// are plain name strings, which is how the JSON form expresses recursion.
pub fn schema_json(xsd: &str) -> Result<Value, ConverterError> {
    let doc = roxmltree::Document::parse(xsd)?;
    let mut builder = SchemaBuilder::new(doc.root_element())?;
    let json = roots::schema_json(&mut builder)?;
    debug!(schema = %json, "translated XSD");
    Ok(json)
}

/// Build the Avro datum for an XML instance of a translated schema.
///
/// Returns a primitive for a primitive root schema, otherwise a record
/// whose shape matches the schema.
pub fn create_datum(schema: &Schema, xml: &str) -> Result<AvroValue, ConverterError> {
    datum::create_datum(schema, xml)
}

/// Read XSD from a path or an `http(s)` URL.
fn fetch(location: &str) -> Result<String, ConverterError> {
    if location.starts_with("http") {
        let response = reqwest::blocking::get(location)
            .map_err(|e| ConverterError::new(format!("HTTP fetch failed: {e}")))?;
        response
            .text()
            .map_err(|e| ConverterError::new(format!("Invalid response body: {e}")))
    } else {
        Ok(fs::read_to_string(location)?)
    }
}

/// Convert an XSD file into an Avro schema file.
///
/// Reads the XSD from a path or URL, verifies the translation parses as a
/// standard Avro schema, and writes pretty-printed `.avsc` JSON.
pub fn convert_xsd_to_avro(xsd_path: &str, avsc_path: &str) -> Result<(), ConverterError> {
    let content = fetch(xsd_path)?;
    let json = schema_json(&content)?;
    Schema::parse_str(&json.to_string())?;
    fs::write(avsc_path, serde_json::to_string_pretty(&json)?)?;
    Ok(())
}

/// Convert an XML instance into a single-datum Avro object-container file,
/// using the schema translated from the given XSD.
pub fn convert_xml_to_avro(
    xsd_path: &str,
    xml_path: &str,
    avro_path: &str,
) -> Result<(), ConverterError> {
    let schema = create_schema(&fetch(xsd_path)?)?;
    let datum = create_datum(&schema, &fs::read_to_string(xml_path)?)?;
    let mut writer = Writer::new(&schema, Vec::new());
    writer.append(datum)?;
    fs::write(avro_path, writer.into_inner()?)?;
    Ok(())
}
