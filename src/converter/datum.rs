use std::collections::HashMap;

use apache_avro::schema::{RecordField, RecordSchema};
use apache_avro::types::Value as AvroValue;
use apache_avro::Schema;
use roxmltree::Node;
use tracing::debug;

use crate::common::names::sanitize;
use crate::common::xml::{element_children, text_content};
use crate::converter::scalars::parse_scalar;
use crate::error::ConverterError;
use crate::source::{Source, DOCUMENT, SOURCE};

/// Build an Avro generic value for an XML instance of the translated
/// schema.
///
/// The root schema decides the dispatch: a `document`-annotated record
/// matches the XML root element against its per-root fields, any other
/// record is populated from the root element, and a primitive parses the
/// root element's text.
pub fn create_datum(schema: &Schema, xml: &str) -> Result<AvroValue, ConverterError> {
    let doc = roxmltree::Document::parse(xml)?;
    let root = doc.root_element();

    let mut named = HashMap::new();
    collect_named(schema, &mut named);

    match schema {
        Schema::Record(record) if is_document(record) => document_datum(record, root, &named),
        _ => value_from_element(schema, root, &named),
    }
}

fn is_document(record: &RecordSchema) -> bool {
    record.attributes.get(SOURCE).and_then(|v| v.as_str()) == Some(DOCUMENT)
}

/// Index every named schema so `Schema::Ref` nodes resolve during the
/// traversal. Cyclic schemas terminate because a reference is never a
/// definition.
fn collect_named(schema: &Schema, named: &mut HashMap<String, Schema>) {
    match schema {
        Schema::Record(record) => {
            if named
                .insert(record.name.name.clone(), schema.clone())
                .is_none()
            {
                for field in &record.fields {
                    collect_named(&field.schema, named);
                }
            }
        }
        Schema::Enum(inner) => {
            named.insert(inner.name.name.clone(), schema.clone());
        }
        Schema::Array(inner) => collect_named(&inner.items, named),
        Schema::Map(inner) => collect_named(&inner.types, named),
        Schema::Union(inner) => {
            for variant in inner.variants() {
                collect_named(variant, named);
            }
        }
        _ => {}
    }
}

/// The provenance annotation of a field, if it carries one.
fn field_source(field: &RecordField) -> Option<Source> {
    field
        .custom_attributes
        .get(SOURCE)
        .and_then(|v| v.as_str())
        .and_then(Source::parse)
}

/// The wildcard field is the map-typed field without provenance.
fn is_wildcard(field: &RecordField) -> bool {
    field.custom_attributes.get(SOURCE).is_none() && matches!(field.schema, Schema::Map(_))
}

/// Fill the synthetic multi-root record: the XML root element populates the
/// field whose provenance matches its local name, every other field is
/// null.
fn document_datum(
    record: &RecordSchema,
    root: Node,
    named: &HashMap<String, Schema>,
) -> Result<AvroValue, ConverterError> {
    let root_name = root.tag_name().name();
    let mut out = Vec::with_capacity(record.fields.len());
    for field in &record.fields {
        let matches = field_source(field)
            .map(|s| !s.is_attribute() && s.name() == root_name)
            .unwrap_or(false);
        let value = if matches {
            populated(&field.schema, root, named, &field.name)?
        } else {
            empty_value(&field.schema, &field.name)?
        };
        out.push((field.name.clone(), value));
    }
    Ok(AvroValue::Record(out))
}

/// Build the value of a non-array field from one XML element, entering the
/// non-null branch of `[T, null]` unions.
fn populated(
    schema: &Schema,
    element: Node,
    named: &HashMap<String, Schema>,
    what: &str,
) -> Result<AvroValue, ConverterError> {
    match schema {
        Schema::Union(union) => {
            let inner = union
                .variants()
                .first()
                .ok_or_else(|| ConverterError::datum(format!("empty union for '{what}'")))?;
            Ok(AvroValue::Union(
                0,
                Box::new(value_from_element(inner, element, named)?),
            ))
        }
        _ => value_from_element(schema, element, named),
    }
}

/// The value of a field that received no XML content: empty array, empty
/// map, or the null branch. Anything else is missing required content.
fn empty_value(schema: &Schema, what: &str) -> Result<AvroValue, ConverterError> {
    match schema {
        Schema::Array(_) => Ok(AvroValue::Array(Vec::new())),
        Schema::Map(_) => Ok(AvroValue::Map(HashMap::new())),
        Schema::Union(union) => {
            let null_index = union
                .variants()
                .iter()
                .position(|v| matches!(v, Schema::Null))
                .ok_or_else(|| {
                    ConverterError::datum(format!("no null branch to default for '{what}'"))
                })?;
            Ok(AvroValue::Union(null_index as u32, Box::new(AvroValue::Null)))
        }
        _ => Err(ConverterError::datum(format!(
            "missing required content for '{what}'"
        ))),
    }
}

/// Convert one XML element into a value of the given schema.
fn value_from_element(
    schema: &Schema,
    element: Node,
    named: &HashMap<String, Schema>,
) -> Result<AvroValue, ConverterError> {
    match schema {
        Schema::Ref { name } => {
            let resolved = named.get(&name.name).ok_or_else(|| {
                ConverterError::datum(format!("unresolved schema reference '{}'", name.name))
            })?;
            value_from_element(resolved, element, named)
        }
        Schema::Record(record) => record_datum(record, element, named),
        Schema::Union(_) => populated(schema, element, named, element.tag_name().name()),
        Schema::Enum(inner) => {
            let text = text_content(element);
            let symbol = sanitize(&text);
            let index = inner
                .symbols
                .iter()
                .position(|s| *s == symbol || *s == text)
                .ok_or_else(|| {
                    ConverterError::datum(format!(
                        "'{}' is not a symbol of enum {} for '{}'",
                        text,
                        inner.name.name,
                        element.tag_name().name()
                    ))
                })?;
            Ok(AvroValue::Enum(index as u32, inner.symbols[index].clone()))
        }
        Schema::Array(_) | Schema::Map(_) => Err(ConverterError::datum(format!(
            "'{}' cannot be read from a single element",
            element.tag_name().name()
        ))),
        primitive => parse_scalar(primitive, &text_content(element), element.tag_name().name()),
    }
}

/// Populate a record from an XML element: attributes first, then child
/// elements in document order, then defaults for whatever never matched.
fn record_datum(
    record: &RecordSchema,
    element: Node,
    named: &HashMap<String, Schema>,
) -> Result<AvroValue, ConverterError> {
    let sources: Vec<Option<Source>> = record.fields.iter().map(field_source).collect();
    let mut slots: Vec<Option<AvroValue>> = vec![None; record.fields.len()];

    for attr in element.attributes() {
        let position = sources.iter().position(|s| {
            s.as_ref()
                .map(|s| s.is_attribute() && s.name() == attr.name())
                .unwrap_or(false)
        });
        let Some(index) = position else {
            debug!(attribute = attr.name(), "no field for attribute");
            continue;
        };
        let field = &record.fields[index];
        let value = match &field.schema {
            Schema::Union(union) => {
                let inner = union.variants().first().ok_or_else(|| {
                    ConverterError::datum(format!("empty union for '{}'", field.name))
                })?;
                AvroValue::Union(
                    0,
                    Box::new(parse_scalar(inner, attr.value(), &field.name)?),
                )
            }
            schema => parse_scalar(schema, attr.value(), &field.name)?,
        };
        slots[index] = Some(value);
    }

    let wildcard = record.fields.iter().position(is_wildcard);
    for child in element_children(element) {
        let local = child.tag_name().name();
        let position = sources.iter().position(|s| {
            s.as_ref()
                .map(|s| !s.is_attribute() && s.name() == local)
                .unwrap_or(false)
        });
        match position {
            Some(index) => {
                let field = &record.fields[index];
                match &field.schema {
                    Schema::Array(array) => {
                        let item = value_from_element(&array.items, child, named)?;
                        match slots[index].get_or_insert(AvroValue::Array(Vec::new())) {
                            AvroValue::Array(items) => items.push(item),
                            _ => unreachable!("array slot holds a non-array"),
                        }
                    }
                    schema => {
                        slots[index] = Some(populated(schema, child, named, &field.name)?);
                    }
                }
            }
            None => match wildcard {
                Some(index) => {
                    let Schema::Map(map) = &record.fields[index].schema else {
                        unreachable!("wildcard field is not a map");
                    };
                    let value = value_from_element(&map.types, child, named)?;
                    match slots[index].get_or_insert(AvroValue::Map(HashMap::new())) {
                        AvroValue::Map(entries) => {
                            entries.insert(local.to_string(), value);
                        }
                        _ => unreachable!("wildcard slot holds a non-map"),
                    }
                }
                None => debug!(element = local, "no field for element"),
            },
        }
    }

    let mut out = Vec::with_capacity(record.fields.len());
    for (index, field) in record.fields.iter().enumerate() {
        let value = match slots[index].take() {
            Some(value) => value,
            None => empty_value(&field.schema, &field.name)?,
        };
        out.push((field.name.clone(), value));
    }
    Ok(AvroValue::Record(out))
}
