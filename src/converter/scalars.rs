use apache_avro::types::Value as AvroValue;
use apache_avro::Schema;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

use crate::error::ConverterError;

/// Parse element or attribute text into an Avro scalar of the given schema.
///
/// Numeric lexical values are trimmed before parsing; strings are taken
/// verbatim. `what` names the receiving field or element for diagnostics.
pub fn parse_scalar(
    schema: &Schema,
    text: &str,
    what: &str,
) -> Result<AvroValue, ConverterError> {
    match schema {
        Schema::Boolean => match text.trim() {
            "true" | "1" => Ok(AvroValue::Boolean(true)),
            "false" | "0" => Ok(AvroValue::Boolean(false)),
            other => Err(bad_value("boolean", other, what)),
        },
        Schema::Int => text
            .trim()
            .parse::<i32>()
            .map(AvroValue::Int)
            .map_err(|_| bad_value("int", text, what)),
        Schema::Long => text
            .trim()
            .parse::<i64>()
            .map(AvroValue::Long)
            .map_err(|_| bad_value("long", text, what)),
        Schema::Float => text
            .trim()
            .parse::<f32>()
            .map(AvroValue::Float)
            .map_err(|_| bad_value("float", text, what)),
        Schema::Double => text
            .trim()
            .parse::<f64>()
            .map(AvroValue::Double)
            .map_err(|_| bad_value("double", text, what)),
        Schema::Bytes => decode_binary(text.trim())
            .map(AvroValue::Bytes)
            .ok_or_else(|| bad_value("bytes", text, what)),
        Schema::String => Ok(AvroValue::String(text.to_string())),
        other => Err(ConverterError::datum(format!(
            "'{what}' maps to non-scalar Avro type {other:?}"
        ))),
    }
}

fn bad_value(kind: &str, text: &str, what: &str) -> ConverterError {
    ConverterError::datum(format!("'{what}' holds '{text}', which is not a valid {kind}"))
}

/// Decode an XSD binary lexical value. The translated schema no longer
/// records whether the source type was `hexBinary` or `base64Binary`, so an
/// even run of hex digits is read as hex and anything else as base64.
fn decode_binary(text: &str) -> Option<Vec<u8>> {
    if !text.is_empty() && text.len() % 2 == 0 && text.bytes().all(|b| b.is_ascii_hexdigit()) {
        return (0..text.len())
            .step_by(2)
            .map(|i| u8::from_str_radix(&text[i..i + 2], 16).ok())
            .collect();
    }
    BASE64.decode(text).ok()
}
