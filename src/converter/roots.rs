use serde_json::{json, Value};

use crate::common::names::UniqueNames;
use crate::converter::complex::element_type;
use crate::converter::state::SchemaBuilder;
use crate::error::ConverterError;
use crate::source::{Source, DOCUMENT, SOURCE};

/// Shape the schema root from the global element declarations.
///
/// One global element yields its type directly (a primitive, an enum, or a
/// record). Two or more yield a synthetic record whose `source` property is
/// the `document` sentinel, with one nullable field per global element in
/// declaration order.
pub fn schema_json(builder: &mut SchemaBuilder) -> Result<Value, ConverterError> {
    let globals = builder.global_elements.clone();
    match globals.len() {
        0 => Err(ConverterError::unsupported(
            "schema declares no global elements",
        )),
        1 => element_type(builder, globals[0], 0),
        _ => {
            let record_name = builder.registry.anonymous_type();
            let mut names = UniqueNames::new();
            let mut fields = Vec::with_capacity(globals.len());
            for element in globals {
                let raw_name = element.attribute("name").ok_or_else(|| {
                    ConverterError::unsupported("global xs:element without a name")
                })?;
                let translated = element_type(builder, element, 0)?;
                let field_name = {
                    let base = builder.registry.valid_name(raw_name);
                    names.claim(&base)
                };
                fields.push(json!({
                    "name": field_name,
                    "type": [translated, "null"],
                    "source": Source::element(raw_name).to_string()
                }));
            }
            let mut record = json!({
                "type": "record",
                "name": record_name,
                "fields": fields
            });
            record[SOURCE] = json!(DOCUMENT);
            Ok(record)
        }
    }
}
