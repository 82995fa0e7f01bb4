//! # xsd2avro
//!
//! Convert [XML Schema (XSD)](https://www.w3.org/TR/xmlschema-1/) documents
//! into [Apache Avro](https://avro.apache.org/) schemas, and XML instances
//! of those schemas into Avro data.
//!
//! ## Features
//!
//! - Maps XSD builtin simple types to Avro primitives
//! - Generates records, enums, arrays, maps, and `[T, null]` unions
//! - `minOccurs=0` and `xs:choice` branches become nullable fields,
//!   `maxOccurs>1` becomes an array
//! - `xs:any` wildcards collect unmatched elements into a map field
//! - Resolves recursive complex types through named references
//! - Every field carries a `source` property recording its XML origin
//!   (element vs attribute, original name), so data conversion survives
//!   renaming
//! - CLI tool `xsd2avro` for batch conversion
//!
//! ## Example (Programmatic Usage)
//!
//! ```no_run
//! use xsd2avro::converter::{create_datum, create_schema};
//!
//! let xsd = r#"<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
//!   <xs:element name='root'>
//!     <xs:complexType>
//!       <xs:sequence>
//!         <xs:element name='i' type='xs:int'/>
//!         <xs:element name='s' type='xs:string'/>
//!       </xs:sequence>
//!     </xs:complexType>
//!   </xs:element>
//! </xs:schema>"#;
//!
//! let schema = create_schema(xsd)?;
//! let datum = create_datum(&schema, "<root><i>1</i><s>s</s></root>")?;
//! println!("{datum:?}");
//! # Ok::<(), xsd2avro::error::ConverterError>(())
//! ```
//!
//! ## Example (CLI)
//!
//! ```bash
//! xsd2avro schema.xsd out.avsc
//! ```
//!
//! Or to also convert an XML instance into an Avro data file:
//!
//! ```bash
//! xsd2avro schema.xsd out.avsc --xml instance.xml --data-out instance.avro
//! ```
//!
//! ## Crate Layout
//!
//! - [`converter`] — XSD → Avro schema and XML → Avro datum conversion
//! - [`source`] — provenance annotations tying fields to XML constructs
//! - [`common`] — name sanitizing and XML tree helpers
//! - [`error`] — the conversion error type
//!
//! The CLI binary is enabled with the `cli` feature.
pub mod common;
pub mod converter;
pub mod error;
pub mod source;
