use apache_avro::schema::{RecordField, RecordSchema};
use apache_avro::types::Value;
use apache_avro::Schema;
use pretty_assertions::assert_eq;
use rstest::rstest;

use xsd2avro::converter::{create_datum, create_schema};

fn record(schema: &Schema) -> &RecordSchema {
    match schema {
        Schema::Record(record) => record,
        other => panic!("expected a record schema, got {other:?}"),
    }
}

fn field<'a>(record: &'a RecordSchema, name: &str) -> &'a RecordField {
    record
        .fields
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no field named '{name}'"))
}

fn source(field: &RecordField) -> Option<&str> {
    field.custom_attributes.get("source").and_then(|v| v.as_str())
}

fn entries(datum: Value) -> Vec<(String, Value)> {
    match datum {
        Value::Record(entries) => entries,
        other => panic!("expected a record datum, got {other:?}"),
    }
}

fn some(value: Value) -> Value {
    Value::Union(0, Box::new(value))
}

fn none() -> Value {
    Value::Union(1, Box::new(Value::Null))
}

#[test]
fn basic() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root' type='xs:string'/>
     </xs:schema>";
    create_schema(xsd).unwrap();

    // no namespace
    let message = create_schema("<schema/>").unwrap_err().to_string();
    assert!(message.contains("namespace"), "{message}");
    assert!(
        message.contains("http://www.w3.org/2001/XMLSchema"),
        "{message}"
    );
}

#[test]
fn root_primitive() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='i' type='xs:int'/>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    assert_eq!(schema, Schema::Int);

    assert_eq!(create_datum(&schema, "<i>1</i>").unwrap(), Value::Int(1));
}

#[rstest]
#[case("xs:boolean", Schema::Boolean)]
#[case("xs:byte", Schema::Int)]
#[case("xs:short", Schema::Int)]
#[case("xs:int", Schema::Int)]
#[case("xs:unsignedByte", Schema::Int)]
#[case("xs:unsignedShort", Schema::Int)]
#[case("xs:long", Schema::Long)]
#[case("xs:unsignedInt", Schema::Long)]
#[case("xs:float", Schema::Float)]
#[case("xs:double", Schema::Double)]
#[case("xs:decimal", Schema::Double)]
#[case("xs:hexBinary", Schema::Bytes)]
#[case("xs:base64Binary", Schema::Bytes)]
#[case("xs:string", Schema::String)]
#[case("xs:dateTime", Schema::String)]
#[case("xs:anyURI", Schema::String)]
fn primitive_mapping(#[case] xsd_type: &str, #[case] expected: Schema) {
    let xsd = format!(
        "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
           <xs:element name='v' type='{xsd_type}'/>
         </xs:schema>"
    );
    assert_eq!(create_schema(&xsd).unwrap(), expected);
}

#[test]
fn several_roots() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='i' type='xs:int'/>
       <xs:element name='r'>
         <xs:complexType>
           <xs:sequence>
             <xs:element name='s' type='xs:string'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(
        root.attributes.get("source").and_then(|v| v.as_str()),
        Some("document")
    );
    assert_eq!(root.fields.len(), 2);

    let i = &root.fields[0];
    assert_eq!(source(i), Some("element i"));
    let Schema::Union(union) = &i.schema else {
        panic!("expected a union, got {:?}", i.schema);
    };
    assert!(matches!(union.variants(), [Schema::Int, Schema::Null]));

    let r = &root.fields[1];
    assert_eq!(source(r), Some("element r"));
    let Schema::Union(union) = &r.schema else {
        panic!("expected a union, got {:?}", r.schema);
    };
    assert!(matches!(union.variants(), [Schema::Record(_), Schema::Null]));

    let datum = entries(create_datum(&schema, "<i>5</i>").unwrap());
    assert_eq!(datum[0], ("i".to_string(), some(Value::Int(5))));
    assert_eq!(datum[1], ("r".to_string(), none()));

    let datum = entries(create_datum(&schema, "<r><s>s</s></r>").unwrap());
    assert_eq!(datum[0], ("i".to_string(), none()));
    assert_eq!(
        datum[1],
        (
            "r".to_string(),
            some(Value::Record(vec![(
                "s".to_string(),
                Value::String("s".to_string())
            )]))
        )
    );
}

#[test]
fn root_record() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:element name='i' type='xs:int'/>
             <xs:element name='s' type='xs:string'/>
             <xs:element name='d' type='xs:double'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.name.name, "type0");
    assert_eq!(root.fields.len(), 3);

    assert_eq!(field(root, "i").schema, Schema::Int);
    assert_eq!(field(root, "s").schema, Schema::String);
    assert_eq!(field(root, "d").schema, Schema::Double);

    let xml = "<root>
       <i>1</i>
       <s>s</s>
       <d>1.0</d>
     </root>";
    let datum = entries(create_datum(&schema, xml).unwrap());
    assert_eq!(
        datum,
        vec![
            ("i".to_string(), Value::Int(1)),
            ("s".to_string(), Value::String("s".to_string())),
            ("d".to_string(), Value::Double(1.0)),
        ]
    );
}

#[test]
fn nested_recursive_records() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:complexType name='type'>
         <xs:sequence>
           <xs:element name='node' type='type' minOccurs='0'/>
         </xs:sequence>
       </xs:complexType>
       <xs:element name='root' type='type'/>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);

    let node = field(root, "node");
    let Schema::Union(union) = &node.schema else {
        panic!("expected a union, got {:?}", node.schema);
    };
    match &union.variants()[0] {
        Schema::Ref { name } => assert_eq!(name.name, root.name.name),
        other => panic!("recursive field should reference the root record, got {other:?}"),
    }

    let datum = entries(create_datum(&schema, "<root><node></node></root>").unwrap());
    assert_eq!(
        datum,
        vec![(
            "node".to_string(),
            some(Value::Record(vec![("node".to_string(), none())]))
        )]
    );
}

#[test]
fn attributes() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:attribute name='required' use='required'/>
           <xs:attribute name='prohibited' use='prohibited'/>
           <xs:attribute name='optional' use='optional'/>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);

    assert_eq!(field(root, "required").schema, Schema::String);
    assert!(!root.fields.iter().any(|f| f.name == "prohibited"));

    let optional = field(root, "optional");
    let Schema::Union(union) = &optional.schema else {
        panic!("expected a union, got {:?}", optional.schema);
    };
    assert!(matches!(union.variants(), [Schema::String, Schema::Null]));

    let xml = "<root required='required' optional='optional'/>";
    let datum = entries(create_datum(&schema, xml).unwrap());
    assert_eq!(
        datum,
        vec![
            (
                "required".to_string(),
                Value::String("required".to_string())
            ),
            (
                "optional".to_string(),
                some(Value::String("optional".to_string()))
            ),
        ]
    );

    let datum = entries(create_datum(&schema, "<root required='required'/>").unwrap());
    assert_eq!(datum[1], ("optional".to_string(), none()));
}

#[test]
fn unique_field_names() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:complexType name='type'>
         <xs:sequence>
           <xs:element name='field' type='xs:string'/>
         </xs:sequence>
         <xs:attribute name='field' type='xs:string'/>
       </xs:complexType>
       <xs:element name='root' type='type'/>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.fields.len(), 2);

    assert_eq!(source(field(root, "field")), Some("attribute field"));
    assert_eq!(source(field(root, "field0")), Some("element field"));

    let xml = "<root field='value'><field>value0</field></root>";
    let datum = entries(create_datum(&schema, xml).unwrap());
    assert_eq!(
        datum,
        vec![
            ("field".to_string(), some(Value::String("value".to_string()))),
            ("field0".to_string(), Value::String("value0".to_string())),
        ]
    );
}

#[test]
fn record_with_wildcard_field() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:complexType name='type'>
         <xs:sequence>
           <xs:element name='field' type='xs:string'/>
           <xs:any/>
         </xs:sequence>
       </xs:complexType>
       <xs:element name='root' type='type'/>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.fields.len(), 2);

    let wildcard = field(root, "others");
    let Schema::Map(map) = &wildcard.schema else {
        panic!("expected a map, got {:?}", wildcard.schema);
    };
    assert_eq!(*map.types, Schema::String);

    // Two wildcard-matched elements
    let xml = "<root>
       <field>field</field>
       <field0>field0</field0>
       <field1>field1</field1>
     </root>";
    let datum = entries(create_datum(&schema, xml).unwrap());
    assert_eq!(
        datum[0],
        ("field".to_string(), Value::String("field".to_string()))
    );
    let Value::Map(others) = &datum[1].1 else {
        panic!("expected a map datum, got {:?}", datum[1].1);
    };
    assert_eq!(others.len(), 2);
    assert_eq!(
        others.get("field0"),
        Some(&Value::String("field0".to_string()))
    );
    assert_eq!(
        others.get("field1"),
        Some(&Value::String("field1".to_string()))
    );

    // No wildcard-matched element
    let datum = entries(create_datum(&schema, "<root><field>field</field></root>").unwrap());
    assert_eq!(
        datum[0],
        ("field".to_string(), Value::String("field".to_string()))
    );
    assert_eq!(datum[1], ("others".to_string(), Value::Map(Default::default())));
}

#[test]
fn several_wildcards() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:any/>
             <xs:any/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.fields.len(), 1);

    let wildcard = field(root, "others");
    assert_eq!(source(wildcard), None);
}

#[test]
fn optional_element_values() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:element name='required' type='xs:string'/>
             <xs:element name='optional' type='xs:string' minOccurs='0'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.fields.len(), 2);

    assert_eq!(field(root, "required").schema, Schema::String);

    let optional = field(root, "optional");
    let Schema::Union(union) = &optional.schema else {
        panic!("expected a union, got {:?}", optional.schema);
    };
    assert!(matches!(union.variants(), [Schema::String, Schema::Null]));

    let datum = entries(create_datum(&schema, "<root><required>required</required></root>").unwrap());
    assert_eq!(
        datum,
        vec![
            (
                "required".to_string(),
                Value::String("required".to_string())
            ),
            ("optional".to_string(), none()),
        ]
    );

    let xml = "<root>
       <required>required</required>
       <optional>optional</optional>
     </root>";
    let datum = entries(create_datum(&schema, xml).unwrap());
    assert_eq!(
        datum[1],
        (
            "optional".to_string(),
            some(Value::String("optional".to_string()))
        )
    );
}

#[test]
fn array() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:element name='value' type='xs:string' maxOccurs='unbounded'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    let value = field(root, "value");
    let Schema::Array(array) = &value.schema else {
        panic!("expected an array, got {:?}", value.schema);
    };
    assert_eq!(*array.items, Schema::String);

    let xml = "<root>
       <value>1</value>
       <value>2</value>
       <value>3</value>
     </root>";
    let datum = entries(create_datum(&schema, xml).unwrap());
    assert_eq!(
        datum,
        vec![(
            "value".to_string(),
            Value::Array(vec![
                Value::String("1".to_string()),
                Value::String("2".to_string()),
                Value::String("3".to_string()),
            ])
        )]
    );

    // A conforming document always carries at least one value, but an
    // absent repetition still reads back as an empty array.
    let datum = entries(create_datum(&schema, "<root/>").unwrap());
    assert_eq!(datum, vec![("value".to_string(), Value::Array(Vec::new()))]);
}

#[test]
fn choice_elements() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:choice>
             <xs:element name='s' type='xs:string'/>
             <xs:element name='i' type='xs:int'/>
           </xs:choice>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.fields.len(), 2);

    let s = field(root, "s");
    let Schema::Union(union) = &s.schema else {
        panic!("expected a union, got {:?}", s.schema);
    };
    assert!(matches!(union.variants(), [Schema::String, Schema::Null]));

    let i = field(root, "i");
    let Schema::Union(union) = &i.schema else {
        panic!("expected a union, got {:?}", i.schema);
    };
    assert!(matches!(union.variants(), [Schema::Int, Schema::Null]));

    let datum = entries(create_datum(&schema, "<root><s>s</s></root>").unwrap());
    assert_eq!(
        datum,
        vec![
            ("s".to_string(), some(Value::String("s".to_string()))),
            ("i".to_string(), none()),
        ]
    );

    let datum = entries(create_datum(&schema, "<root><i>1</i></root>").unwrap());
    assert_eq!(
        datum,
        vec![
            ("s".to_string(), none()),
            ("i".to_string(), some(Value::Int(1))),
        ]
    );
}

#[test]
fn enumeration_restriction() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:simpleType name='suit'>
         <xs:restriction base='xs:string'>
           <xs:enumeration value='SPADES'/>
           <xs:enumeration value='HEARTS'/>
         </xs:restriction>
       </xs:simpleType>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:element name='card' type='suit'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    let card = field(root, "card");
    let Schema::Enum(suit) = &card.schema else {
        panic!("expected an enum, got {:?}", card.schema);
    };
    assert_eq!(suit.name.name, "suit");
    assert_eq!(suit.symbols, vec!["SPADES", "HEARTS"]);

    let datum = entries(create_datum(&schema, "<root><card>HEARTS</card></root>").unwrap());
    assert_eq!(
        datum,
        vec![("card".to_string(), Value::Enum(1, "HEARTS".to_string()))]
    );

    let err = create_datum(&schema, "<root><card>CLUBS</card></root>").unwrap_err();
    assert!(err.to_string().contains("CLUBS"), "{err}");
}

#[test]
fn non_enum_restriction_degrades_to_base() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:simpleType name='percent'>
         <xs:restriction base='xs:int'/>
       </xs:simpleType>
       <xs:element name='p' type='percent'/>
     </xs:schema>";

    assert_eq!(create_schema(xsd).unwrap(), Schema::Int);
}

#[test]
fn simple_content_extension_attributes() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='price'>
         <xs:complexType>
           <xs:simpleContent>
             <xs:extension base='xs:decimal'>
               <xs:attribute name='currency' type='xs:string' use='required'/>
             </xs:extension>
           </xs:simpleContent>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.fields.len(), 1);
    assert_eq!(field(root, "currency").schema, Schema::String);
    assert_eq!(source(field(root, "currency")), Some("attribute currency"));

    let datum = entries(create_datum(&schema, "<price currency='EUR'>1.0</price>").unwrap());
    assert_eq!(
        datum,
        vec![("currency".to_string(), Value::String("EUR".to_string()))]
    );
}

#[test]
fn complex_content_extension_inlines_base_fields() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:complexType name='base'>
         <xs:sequence>
           <xs:element name='a' type='xs:string'/>
         </xs:sequence>
       </xs:complexType>
       <xs:complexType name='derived'>
         <xs:complexContent>
           <xs:extension base='base'>
             <xs:sequence>
               <xs:element name='b' type='xs:string'/>
             </xs:sequence>
           </xs:extension>
         </xs:complexContent>
       </xs:complexType>
       <xs:element name='root' type='derived'/>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(root.name.name, "derived");
    assert_eq!(root.fields[0].name, "a");
    assert_eq!(root.fields[1].name, "b");

    let datum = entries(create_datum(&schema, "<root><a>x</a><b>y</b></root>").unwrap());
    assert_eq!(
        datum,
        vec![
            ("a".to_string(), Value::String("x".to_string())),
            ("b".to_string(), Value::String("y".to_string())),
        ]
    );
}

#[test]
fn element_references_resolve_to_global_targets() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='item' type='xs:string'/>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:element ref='item' maxOccurs='unbounded'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(
        root.attributes.get("source").and_then(|v| v.as_str()),
        Some("document")
    );

    let datum = entries(create_datum(&schema, "<root><item>a</item><item>b</item></root>").unwrap());
    assert_eq!(datum[0], ("item".to_string(), none()));
    assert_eq!(
        datum[1],
        (
            "root".to_string(),
            some(Value::Record(vec![(
                "item".to_string(),
                Value::Array(vec![
                    Value::String("a".to_string()),
                    Value::String("b".to_string()),
                ])
            )]))
        )
    );
}

#[test]
fn attribute_default_becomes_field_default() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:attribute name='lang' type='xs:string' default='en'/>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let root = record(&schema);
    assert_eq!(
        field(root, "lang").default,
        Some(serde_json::json!("en"))
    );
}

#[test]
fn optional_group_distributes_over_elements() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence minOccurs='0'>
             <xs:element name='a' type='xs:string'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let a = field(record(&schema), "a");
    let Schema::Union(union) = &a.schema else {
        panic!("expected a union, got {:?}", a.schema);
    };
    assert!(matches!(union.variants(), [Schema::String, Schema::Null]));
}

#[rstest]
#[case("xs:int", "<i>x</i>", "x")]
#[case("xs:long", "<i>12.5</i>", "12.5")]
#[case("xs:boolean", "<i>yes</i>", "yes")]
#[case("xs:double", "<i>1,5</i>", "1,5")]
fn scalar_parse_failures_name_the_value(
    #[case] xsd_type: &str,
    #[case] xml: &str,
    #[case] offending: &str,
) {
    let xsd = format!(
        "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
           <xs:element name='i' type='{xsd_type}'/>
         </xs:schema>"
    );
    let schema = create_schema(&xsd).unwrap();
    let message = create_datum(&schema, xml).unwrap_err().to_string();
    assert!(message.contains(offending), "{message}");
    assert!(message.contains("'i'"), "{message}");
}

#[test]
fn binary_lexical_forms() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='b' type='xs:hexBinary'/>
     </xs:schema>";
    let schema = create_schema(xsd).unwrap();
    assert_eq!(
        create_datum(&schema, "<b>0A1b</b>").unwrap(),
        Value::Bytes(vec![0x0a, 0x1b])
    );

    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='b' type='xs:base64Binary'/>
     </xs:schema>";
    let schema = create_schema(xsd).unwrap();
    assert_eq!(
        create_datum(&schema, "<b>aGk=</b>").unwrap(),
        Value::Bytes(b"hi".to_vec())
    );
}

#[test]
fn missing_required_content_fails() {
    let xsd = "<xs:schema xmlns:xs='http://www.w3.org/2001/XMLSchema'>
       <xs:element name='root'>
         <xs:complexType>
           <xs:sequence>
             <xs:element name='required' type='xs:string'/>
           </xs:sequence>
         </xs:complexType>
       </xs:element>
     </xs:schema>";

    let schema = create_schema(xsd).unwrap();
    let message = create_datum(&schema, "<root/>").unwrap_err().to_string();
    assert!(message.contains("required"), "{message}");
}
