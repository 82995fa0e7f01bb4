use roxmltree::Node;
use serde_json::{json, Value};
use tracing::debug;

use crate::common::names::UniqueNames;
use crate::common::xml::{
    element_children, first_xsd_child, is_xsd, max_occurs, min_occurs, prefix_is_xsd, split_qname,
    xsd_children, XSD_NAMESPACE,
};
use crate::converter::simple::{primitive_for, resolve_simple_ref, translate_simple_type};
use crate::converter::state::SchemaBuilder;
use crate::converter::MAX_TYPE_DEPTH;
use crate::error::ConverterError;
use crate::source::{Source, WILDCARD};

/// Translate an `xs:complexType` into an Avro record.
///
/// A named type already in the registry resolves to a plain name reference;
/// that is what turns recursive XSD types into cycles in the schema graph.
pub fn translate_complex_type(
    builder: &mut SchemaBuilder,
    node: Node,
    depth: usize,
) -> Result<Value, ConverterError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ConverterError::unsupported("type nesting too deep"));
    }

    let avro_name = match node.attribute("name") {
        Some(name) => {
            if let Some(known) = builder.registry.resolve_named(name) {
                return Ok(Value::String(known));
            }
            builder.registry.register_named(name)
        }
        None => builder.registry.anonymous_type(),
    };
    debug!(name = %avro_name, "translating complex type");

    let mut fields = Vec::new();
    let mut names = UniqueNames::new();
    let mut has_wildcard = false;
    record_fields(
        builder,
        node,
        &mut fields,
        &mut names,
        &mut has_wildcard,
        depth,
    )?;

    Ok(json!({
        "type": "record",
        "name": avro_name,
        "fields": fields
    }))
}

/// Collect the fields of a complex type body: attributes first, then the
/// content particle. Handles `xs:simpleContent` and `xs:complexContent`
/// derivation.
fn record_fields(
    builder: &mut SchemaBuilder,
    type_node: Node,
    fields: &mut Vec<Value>,
    names: &mut UniqueNames,
    has_wildcard: &mut bool,
    depth: usize,
) -> Result<(), ConverterError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ConverterError::unsupported("type derivation chain too deep"));
    }

    if let Some(complex_content) = first_xsd_child(type_node, "complexContent") {
        let Some(derivation) = first_xsd_child(complex_content, "extension")
            .or_else(|| first_xsd_child(complex_content, "restriction"))
        else {
            return Err(ConverterError::unsupported(
                "xs:complexContent without extension or restriction",
            ));
        };
        // An extension inlines the base type's fields ahead of its own.
        if is_xsd(derivation, "extension") {
            if let Some(base) = derivation.attribute("base") {
                let (prefix, local) = split_qname(base);
                if !prefix_is_xsd(derivation, prefix) {
                    let base_type = builder.complex_types.get(local).copied().ok_or_else(|| {
                        ConverterError::unsupported(format!(
                            "extension base '{base}' is not a known complex type"
                        ))
                    })?;
                    record_fields(builder, base_type, fields, names, has_wildcard, depth + 1)?;
                }
            }
        }
        attribute_fields(builder, derivation, fields, names, depth)?;
        content_particle(builder, derivation, fields, names, has_wildcard, depth)?;
        return Ok(());
    }

    if let Some(simple_content) = first_xsd_child(type_node, "simpleContent") {
        let Some(derivation) = first_xsd_child(simple_content, "extension")
            .or_else(|| first_xsd_child(simple_content, "restriction"))
        else {
            return Err(ConverterError::unsupported(
                "xs:simpleContent without extension or restriction",
            ));
        };
        return attribute_fields(builder, derivation, fields, names, depth);
    }

    attribute_fields(builder, type_node, fields, names, depth)?;
    content_particle(builder, type_node, fields, names, has_wildcard, depth)
}

/// Walk the first model group child (`xs:sequence`, `xs:all`, `xs:choice`)
/// of a complex type body.
fn content_particle(
    builder: &mut SchemaBuilder,
    parent: Node,
    fields: &mut Vec<Value>,
    names: &mut UniqueNames,
    has_wildcard: &mut bool,
    depth: usize,
) -> Result<(), ConverterError> {
    for child in element_children(parent) {
        if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
            continue;
        }
        if matches!(child.tag_name().name(), "sequence" | "all" | "choice") {
            let optional = is_xsd(child, "choice") || min_occurs(child) == 0;
            let repeated = max_occurs(child) > 1;
            return walk_particle(
                builder,
                child,
                optional,
                repeated,
                fields,
                names,
                has_wildcard,
                depth,
            );
        }
    }
    Ok(())
}

/// Translate the element particles of a model group into fields.
///
/// `optional` and `repeated` accumulate the effect of enclosing particles:
/// a choice (or a `minOccurs=0` group) makes every branch nullable, a
/// `maxOccurs>1` group makes every branch an array.
#[allow(clippy::too_many_arguments)]
fn walk_particle(
    builder: &mut SchemaBuilder,
    group: Node,
    optional: bool,
    repeated: bool,
    fields: &mut Vec<Value>,
    names: &mut UniqueNames,
    has_wildcard: &mut bool,
    depth: usize,
) -> Result<(), ConverterError> {
    if depth > MAX_TYPE_DEPTH {
        return Err(ConverterError::unsupported("content model nesting too deep"));
    }
    for child in element_children(group) {
        if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
            continue;
        }
        match child.tag_name().name() {
            "element" => element_field(builder, child, optional, repeated, fields, names, depth)?,
            "sequence" | "all" | "choice" => {
                let nested_optional =
                    optional || is_xsd(child, "choice") || min_occurs(child) == 0;
                let nested_repeated = repeated || max_occurs(child) > 1;
                walk_particle(
                    builder,
                    child,
                    nested_optional,
                    nested_repeated,
                    fields,
                    names,
                    has_wildcard,
                    depth + 1,
                )?;
            }
            "any" => wildcard_field(fields, names, has_wildcard),
            "annotation" => {}
            other => {
                return Err(ConverterError::unsupported(format!(
                    "xs:{other} inside a content model"
                )))
            }
        }
    }
    Ok(())
}

/// Append the field for one element particle, applying cardinality:
/// `maxOccurs>1` wraps in an array, `minOccurs=0` (or an enclosing choice)
/// wraps in a `[T, null]` union.
fn element_field(
    builder: &mut SchemaBuilder,
    particle: Node,
    optional: bool,
    repeated: bool,
    fields: &mut Vec<Value>,
    names: &mut UniqueNames,
    depth: usize,
) -> Result<(), ConverterError> {
    let (decl, raw_name) = if let Some(reference) = particle.attribute("ref") {
        let (_, local) = split_qname(reference);
        let target = builder.elements_by_name.get(local).copied().ok_or_else(|| {
            ConverterError::unsupported(format!("element ref '{reference}' has no global target"))
        })?;
        (target, target.attribute("name").unwrap_or(local))
    } else {
        let name = particle.attribute("name").ok_or_else(|| {
            ConverterError::unsupported("xs:element without a name or ref")
        })?;
        (particle, name)
    };

    let translated = element_type(builder, decl, depth + 1)?;
    let schema = if repeated || max_occurs(particle) > 1 {
        json!({ "type": "array", "items": translated })
    } else if optional || min_occurs(particle) == 0 {
        json!([translated, "null"])
    } else {
        translated
    };

    let field_name = {
        let base = builder.registry.valid_name(raw_name);
        names.claim(&base)
    };
    fields.push(json!({
        "name": field_name,
        "type": schema,
        "source": Source::element(raw_name).to_string()
    }));
    Ok(())
}

/// The Avro type of an element declaration: its `type=` reference, an
/// inline type child, or `string` when neither is given.
pub fn element_type(
    builder: &mut SchemaBuilder,
    decl: Node,
    depth: usize,
) -> Result<Value, ConverterError> {
    if let Some(qname) = decl.attribute("type") {
        let (prefix, local) = split_qname(qname);
        if prefix_is_xsd(decl, prefix) {
            return Ok(json!(primitive_for(local)));
        }
        let complex = builder.complex_types.get(local).copied();
        if let Some(ct) = complex {
            return translate_complex_type(builder, ct, depth + 1);
        }
        let simple = builder.simple_types.get(local).copied();
        if let Some(st) = simple {
            return translate_simple_type(builder, st, depth + 1);
        }
        return Err(ConverterError::unsupported(format!(
            "unknown type '{qname}'"
        )));
    }
    if let Some(inline) = first_xsd_child(decl, "complexType") {
        return translate_complex_type(builder, inline, depth + 1);
    }
    if let Some(inline) = first_xsd_child(decl, "simpleType") {
        return translate_simple_type(builder, inline, depth + 1);
    }
    Ok(json!("string"))
}

/// Append the attribute-derived fields of a node in declaration order.
/// `use='prohibited'` attributes produce nothing; anything not `required`
/// becomes a `[T, null]` union.
fn attribute_fields(
    builder: &mut SchemaBuilder,
    parent: Node,
    fields: &mut Vec<Value>,
    names: &mut UniqueNames,
    depth: usize,
) -> Result<(), ConverterError> {
    for attr in xsd_children(parent, "attribute") {
        if let Some(field) = attribute_field(builder, attr, names, depth)? {
            fields.push(field);
        }
    }
    Ok(())
}

fn attribute_field(
    builder: &mut SchemaBuilder,
    attr: Node,
    names: &mut UniqueNames,
    depth: usize,
) -> Result<Option<Value>, ConverterError> {
    if attr.attribute("use") == Some("prohibited") {
        return Ok(None);
    }

    let (decl, raw_name) = if let Some(reference) = attr.attribute("ref") {
        let (_, local) = split_qname(reference);
        let target = builder
            .global_attributes
            .get(local)
            .copied()
            .ok_or_else(|| {
                ConverterError::unsupported(format!(
                    "attribute ref '{reference}' has no global target"
                ))
            })?;
        (target, target.attribute("name").unwrap_or(local))
    } else {
        let name = attr.attribute("name").ok_or_else(|| {
            ConverterError::unsupported("xs:attribute without a name or ref")
        })?;
        (attr, name)
    };

    let translated = if let Some(qname) = decl.attribute("type") {
        resolve_simple_ref(builder, decl, qname, depth)?
    } else if let Some(inline) = first_xsd_child(decl, "simpleType") {
        translate_simple_type(builder, inline, depth + 1)?
    } else {
        json!("string")
    };
    let is_string = translated == json!("string");

    let schema = if attr.attribute("use") == Some("required") {
        translated
    } else {
        json!([translated, "null"])
    };

    let field_name = {
        let base = builder.registry.valid_name(raw_name);
        names.claim(&base)
    };
    let mut field = json!({
        "name": field_name,
        "type": schema,
        "source": Source::attribute(raw_name).to_string()
    });
    // An XSD default is only expressible for string-typed fields: the Avro
    // default of a [T, null] union must match T.
    if is_string {
        if let Some(default) = decl.attribute("default").or(attr.attribute("default")) {
            field["default"] = json!(default);
        }
    }
    Ok(Some(field))
}

/// Append the single wildcard map field. Additional `xs:any` siblings
/// collapse into the first.
fn wildcard_field(fields: &mut Vec<Value>, names: &mut UniqueNames, has_wildcard: &mut bool) {
    if *has_wildcard {
        return;
    }
    *has_wildcard = true;
    let field_name = names.claim(WILDCARD);
    fields.push(json!({
        "name": field_name,
        "type": { "type": "map", "values": "string" }
    }));
}
