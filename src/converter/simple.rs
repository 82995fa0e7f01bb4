use roxmltree::Node;
use serde_json::{json, Value};
use tracing::warn;

use crate::common::names::{sanitize, UniqueNames};
use crate::common::xml::{first_xsd_child, prefix_is_xsd, split_qname, xsd_children};
use crate::converter::state::SchemaBuilder;
use crate::converter::MAX_TYPE_DEPTH;
use crate::error::ConverterError;

/// Map an XSD builtin simple type to its Avro primitive.
///
/// Anything not listed (strings, date/time types, `anyURI`, …) degrades to
/// `string`.
pub fn primitive_for(local: &str) -> &'static str {
    match local {
        "boolean" => "boolean",
        "byte" | "short" | "int" | "unsignedByte" | "unsignedShort" => "int",
        "long" | "unsignedInt" => "long",
        "float" => "float",
        "double" | "decimal" => "double",
        "hexBinary" | "base64Binary" => "bytes",
        _ => "string",
    }
}

/// Translate an `xs:simpleType` node into an Avro type.
///
/// A restriction carrying `xs:enumeration` facets becomes an Avro enum,
/// named after the simple type (or `enumN` when anonymous). Every other
/// restriction degrades to its base primitive.
pub fn translate_simple_type(
    builder: &mut SchemaBuilder,
    node: Node,
    depth: usize,
) -> Result<Value, ConverterError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ConverterError::unsupported(
            "simple type derivation chain too deep",
        ));
    }

    if let Some(name) = node.attribute("name") {
        if let Some(known) = builder.registry.resolve_named(name) {
            return Ok(Value::String(known));
        }
    }

    let Some(restriction) = first_xsd_child(node, "restriction") else {
        warn!("simple type without xs:restriction degrades to string");
        return Ok(json!("string"));
    };

    let values: Vec<&str> = xsd_children(restriction, "enumeration")
        .filter_map(|e| e.attribute("value"))
        .collect();
    if !values.is_empty() {
        let avro_name = match node.attribute("name") {
            Some(n) => builder.registry.register_named(n),
            None => builder.registry.anonymous_enum(),
        };
        let mut pool = UniqueNames::new();
        let symbols: Vec<String> = values
            .iter()
            .map(|v| {
                let s = sanitize(v);
                if s.is_empty() {
                    pool.claim("_")
                } else {
                    pool.claim(&s)
                }
            })
            .collect();
        return Ok(json!({
            "type": "enum",
            "name": avro_name,
            "symbols": symbols
        }));
    }

    base_of_restriction(builder, restriction, depth)
}

/// Resolve the base of a non-enumerated restriction down to a primitive.
fn base_of_restriction(
    builder: &mut SchemaBuilder,
    restriction: Node,
    depth: usize,
) -> Result<Value, ConverterError> {
    if let Some(base) = restriction.attribute("base") {
        let (prefix, local) = split_qname(base);
        if prefix_is_xsd(restriction, prefix) {
            return Ok(json!(primitive_for(local)));
        }
        let named = builder.simple_types.get(local).copied();
        if let Some(st) = named {
            return translate_simple_type(builder, st, depth + 1);
        }
        return Err(ConverterError::unsupported(format!(
            "restriction base '{base}' is not a known simple type"
        )));
    }
    if let Some(inline) = first_xsd_child(restriction, "simpleType") {
        return translate_simple_type(builder, inline, depth + 1);
    }
    Ok(json!("string"))
}

/// Resolve a `type=` QName that must name a simple type (attribute types,
/// restriction bases).
pub fn resolve_simple_ref(
    builder: &mut SchemaBuilder,
    context: Node,
    qname: &str,
    depth: usize,
) -> Result<Value, ConverterError> {
    let (prefix, local) = split_qname(qname);
    if prefix_is_xsd(context, prefix) {
        return Ok(json!(primitive_for(local)));
    }
    let named = builder.simple_types.get(local).copied();
    if let Some(st) = named {
        return translate_simple_type(builder, st, depth + 1);
    }
    Err(ConverterError::unsupported(format!(
        "'{qname}' does not name a simple type"
    )))
}
