use std::collections::HashMap;

use roxmltree::Node;
use tracing::{debug, warn};

use crate::common::names::{is_reserved, sanitize, UniqueNames};
use crate::common::xml::{element_children, XSD_NAMESPACE};
use crate::error::ConverterError;

/// Holds the state for one XSD → Avro translation.
///
/// Indexes the global XSD components by local name and owns the
/// [`TypeRegistry`]. Discarded when the translation returns.
pub struct SchemaBuilder<'a, 'input> {
    pub global_elements: Vec<Node<'a, 'input>>,
    pub elements_by_name: HashMap<&'a str, Node<'a, 'input>>,
    pub complex_types: HashMap<&'a str, Node<'a, 'input>>,
    pub simple_types: HashMap<&'a str, Node<'a, 'input>>,
    pub global_attributes: HashMap<&'a str, Node<'a, 'input>>,
    pub registry: TypeRegistry,
}

impl<'a, 'input> SchemaBuilder<'a, 'input> {
    /// Index the children of an `xs:schema` root.
    ///
    /// Fails when the root element is not `schema` in the XSD namespace.
    pub fn new(root: Node<'a, 'input>) -> Result<Self, ConverterError> {
        if root.tag_name().namespace() != Some(XSD_NAMESPACE) {
            return Err(ConverterError::missing_namespace(
                root.tag_name().namespace(),
            ));
        }
        if root.tag_name().name() != "schema" {
            return Err(ConverterError::unsupported(format!(
                "expected xs:schema as the document root, found xs:{}",
                root.tag_name().name()
            )));
        }

        let mut builder = Self {
            global_elements: Vec::new(),
            elements_by_name: HashMap::new(),
            complex_types: HashMap::new(),
            simple_types: HashMap::new(),
            global_attributes: HashMap::new(),
            registry: TypeRegistry::new(),
        };

        for child in element_children(root) {
            if child.tag_name().namespace() != Some(XSD_NAMESPACE) {
                continue;
            }
            let name = child.attribute("name");
            match (child.tag_name().name(), name) {
                ("element", _) => {
                    builder.global_elements.push(child);
                    if let Some(n) = name {
                        builder.elements_by_name.insert(n, child);
                    }
                }
                ("complexType", Some(n)) => {
                    builder.complex_types.insert(n, child);
                }
                ("simpleType", Some(n)) => {
                    builder.simple_types.insert(n, child);
                }
                ("attribute", Some(n)) => {
                    builder.global_attributes.insert(n, child);
                }
                ("annotation", _) => {}
                (other, _) => {
                    warn!(construct = other, "skipping unsupported global construct");
                }
            }
        }

        Ok(builder)
    }
}

/// Interns the named Avro schemas of one translation.
///
/// A named XSD type is registered here before its fields are walked, so a
/// self-reference (direct or transitive) resolves to the name that is being
/// defined and becomes a plain name reference in the emitted schema. Also
/// hands out generated `typeN`/`enumN` names and keeps record/enum names
/// unique across the whole output.
pub struct TypeRegistry {
    named: HashMap<String, String>,
    type_names: UniqueNames,
    next_type: usize,
    next_enum: usize,
    reserved_bump: usize,
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            named: HashMap::new(),
            type_names: UniqueNames::new(),
            next_type: 0,
            next_enum: 0,
            reserved_bump: 0,
        }
    }

    /// Sanitize a raw XML name, steering clear of the reserved Avro type
    /// names with a monotonic suffix: within one translation `string`
    /// becomes `string0`, a later `record` becomes `record1`.
    pub fn valid_name(&mut self, raw: &str) -> String {
        let mut name = sanitize(raw);
        while is_reserved(&name) {
            name = format!("{name}{}", self.reserved_bump);
            self.reserved_bump += 1;
        }
        name
    }

    /// The Avro name of an already-registered XSD type, if any.
    pub fn resolve_named(&self, xsd_name: &str) -> Option<String> {
        self.named.get(xsd_name).cloned()
    }

    /// Register a named XSD type and return its Avro name. Must be called
    /// before the type's children are translated so recursion resolves.
    pub fn register_named(&mut self, xsd_name: &str) -> String {
        let base = self.valid_name(xsd_name);
        let avro_name = self.type_names.claim(&base);
        debug!(xsd = xsd_name, avro = %avro_name, "registered named type");
        self.named.insert(xsd_name.to_string(), avro_name.clone());
        avro_name
    }

    /// Generated name for an anonymous complex type, in first-encounter
    /// order: `type0`, `type1`, …
    pub fn anonymous_type(&mut self) -> String {
        let name = format!("type{}", self.next_type);
        self.next_type += 1;
        self.type_names.claim(&name)
    }

    /// Generated name for an anonymous enumeration: `enum0`, `enum1`, …
    pub fn anonymous_enum(&mut self) -> String {
        let name = format!("enum{}", self.next_enum);
        self.next_enum += 1;
        self.type_names.claim(&name)
    }
}
