use std::collections::HashMap;

use proptest::prelude::*;
use prost::Message;
use prost_types::{
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FileDescriptorProto, MessageOptions,
};

use crate::{
    DynamicMessage, MapKey, MessageDescriptor, MessageFactory, SetFieldError, TypeRegistry,
    UnknownField, ValidationErrorKind, Value,
};

fn field(name: &str, number: i32, label: Label, r#type: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(r#type as i32),
        ..Default::default()
    }
}

fn typed_field(
    name: &str,
    number: i32,
    label: Label,
    r#type: Type,
    type_name: &str,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        type_name: Some(type_name.to_owned()),
        ..field(name, number, label, r#type)
    }
}

fn map_entry_message(name: &str, value: FieldDescriptorProto) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        field: vec![field("key", 1, Label::Optional, Type::String), value],
        ..Default::default()
    }
}

fn test_registry() -> TypeRegistry {
    let registry = TypeRegistry::new();
    registry
        .register_file_descriptor_proto(FileDescriptorProto {
            name: Some("test.proto".to_owned()),
            package: Some("test".to_owned()),
            syntax: Some("proto3".to_owned()),
            enum_type: vec![EnumDescriptorProto {
                name: Some("Color".to_owned()),
                value: vec![
                    EnumValueDescriptorProto {
                        name: Some("COLOR_UNSPECIFIED".to_owned()),
                        number: Some(0),
                        ..Default::default()
                    },
                    EnumValueDescriptorProto {
                        name: Some("COLOR_RED".to_owned()),
                        number: Some(1),
                        ..Default::default()
                    },
                    EnumValueDescriptorProto {
                        name: Some("COLOR_GREEN".to_owned()),
                        number: Some(2),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
            message_type: vec![
                DescriptorProto {
                    name: Some("Basic".to_owned()),
                    field: vec![
                        field("id", 1, Label::Optional, Type::Int32),
                        field("name", 2, Label::Optional, Type::String),
                    ],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("Partial".to_owned()),
                    field: vec![field("id", 1, Label::Optional, Type::Int32)],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("Scalars".to_owned()),
                    field: vec![
                        field("f_double", 1, Label::Optional, Type::Double),
                        field("f_float", 2, Label::Optional, Type::Float),
                        field("f_int32", 3, Label::Optional, Type::Int32),
                        field("f_int64", 4, Label::Optional, Type::Int64),
                        field("f_uint32", 5, Label::Optional, Type::Uint32),
                        field("f_uint64", 6, Label::Optional, Type::Uint64),
                        field("f_sint32", 7, Label::Optional, Type::Sint32),
                        field("f_sint64", 8, Label::Optional, Type::Sint64),
                        field("f_fixed32", 9, Label::Optional, Type::Fixed32),
                        field("f_fixed64", 10, Label::Optional, Type::Fixed64),
                        field("f_sfixed32", 11, Label::Optional, Type::Sfixed32),
                        field("f_sfixed64", 12, Label::Optional, Type::Sfixed64),
                        field("f_bool", 13, Label::Optional, Type::Bool),
                        field("f_string", 14, Label::Optional, Type::String),
                        field("f_bytes", 15, Label::Optional, Type::Bytes),
                    ],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("Packed".to_owned()),
                    field: vec![field("values", 1, Label::Repeated, Type::Int32)],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("Unpacked".to_owned()),
                    field: vec![field("values", 1, Label::Repeated, Type::String)],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("MapHolder".to_owned()),
                    field: vec![typed_field(
                        "values",
                        1,
                        Label::Repeated,
                        Type::Message,
                        "ValuesEntry",
                    )],
                    nested_type: vec![map_entry_message(
                        "ValuesEntry",
                        field("value", 2, Label::Optional, Type::Int32),
                    )],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("Nested".to_owned()),
                    field: vec![
                        typed_field("inner", 1, Label::Optional, Type::Message, ".test.Basic"),
                        typed_field("items", 2, Label::Repeated, Type::Message, ".test.Basic"),
                    ],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("WithEnum".to_owned()),
                    field: vec![
                        typed_field("color", 1, Label::Optional, Type::Enum, ".test.Color"),
                        typed_field("colors", 2, Label::Repeated, Type::Enum, ".test.Color"),
                    ],
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
        .unwrap();
    registry
        .register_file_descriptor_proto(FileDescriptorProto {
            name: Some("test2.proto".to_owned()),
            package: Some("test2".to_owned()),
            syntax: Some("proto2".to_owned()),
            message_type: vec![
                DescriptorProto {
                    name: Some("Named".to_owned()),
                    field: vec![field("name", 1, Label::Required, Type::String)],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("ReqHolder".to_owned()),
                    field: vec![field("id", 1, Label::Required, Type::Int32)],
                    ..Default::default()
                },
                DescriptorProto {
                    name: Some("Outer".to_owned()),
                    field: vec![
                        typed_field("one", 1, Label::Optional, Type::Message, ".test2.ReqHolder"),
                        typed_field("many", 2, Label::Repeated, Type::Message, ".test2.ReqHolder"),
                        typed_field("by_key", 3, Label::Repeated, Type::Message, "ByKeyEntry"),
                    ],
                    nested_type: vec![map_entry_message(
                        "ByKeyEntry",
                        typed_field("value", 2, Label::Optional, Type::Message, ".test2.ReqHolder"),
                    )],
                    ..Default::default()
                },
            ],
            ..Default::default()
        })
        .unwrap();
    registry
}

fn message_desc(registry: &TypeRegistry, name: &str) -> MessageDescriptor {
    registry.find_message(name).unwrap()
}

#[test]
fn encode_singular_scalars() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    let mut message = DynamicMessage::new(desc.clone());
    message.try_set_field_by_name("id", Value::I32(42)).unwrap();
    message
        .try_set_field_by_name("name", Value::String("Test Name".to_owned()))
        .unwrap();

    let mut expected = vec![0x08, 0x2A, 0x12, 0x09];
    expected.extend_from_slice(b"Test Name");
    assert_eq!(message.encode_to_vec(), expected);

    // Encoding is deterministic, and decoding yields an equal message.
    assert_eq!(message.encode_to_vec(), expected);
    let decoded = DynamicMessage::decode(desc, expected.as_slice()).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn empty_message_roundtrip() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    let message = DynamicMessage::new(desc.clone());
    assert_eq!(message.encode_to_vec(), b"");

    let decoded = DynamicMessage::decode(desc, b"".as_ref()).unwrap();
    assert!(!decoded.has_field_by_name("id"));
    assert!(!decoded.has_field_by_name("name"));
    assert_eq!(
        decoded.get_field_by_name("id").unwrap().as_ref(),
        &Value::I32(0)
    );
}

#[test]
fn presence_is_tracked_independently_of_value() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    let mut message = DynamicMessage::new(desc.clone());
    message.try_set_field_by_name("id", Value::I32(0)).unwrap();
    assert!(message.has_field_by_name("id"));

    // A field explicitly set to its default value is still emitted.
    assert_eq!(message.encode_to_vec(), [0x08, 0x00]);
    let decoded = DynamicMessage::decode(desc, [0x08, 0x00].as_slice()).unwrap();
    assert!(decoded.has_field_by_name("id"));
    assert_eq!(decoded, message);

    assert_eq!(message.take_field_by_name("id"), Some(Value::I32(0)));
    assert!(!message.has_field_by_name("id"));
    assert_eq!(message.encode_to_vec(), b"");
    assert_eq!(message.take_field_by_name("id"), None);
}

#[test]
fn packed_repeated_encoding() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Packed");

    let mut message = DynamicMessage::new(desc.clone());
    message
        .try_set_field_by_name(
            "values",
            Value::List(vec![Value::I32(1), Value::I32(2), Value::I32(300)]),
        )
        .unwrap();

    let expected = [0x0A, 0x04, 0x01, 0x02, 0xAC, 0x02];
    assert_eq!(message.encode_to_vec(), expected);
    assert_eq!(
        DynamicMessage::decode(desc.clone(), expected.as_slice()).unwrap(),
        message
    );

    // The decoder accepts the unpacked form of a packable field.
    let unpacked = [0x08, 0x01, 0x08, 0x02, 0x08, 0xAC, 0x02];
    assert_eq!(
        DynamicMessage::decode(desc, unpacked.as_slice()).unwrap(),
        message
    );
}

#[test]
fn unpacked_repeated_encoding() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Unpacked");

    let mut message = DynamicMessage::new(desc.clone());
    message
        .try_set_field_by_name(
            "values",
            Value::List(vec![
                Value::String("a".to_owned()),
                Value::String("".to_owned()),
                Value::String("bc".to_owned()),
            ]),
        )
        .unwrap();

    let expected = [0x0A, 0x01, b'a', 0x0A, 0x00, 0x0A, 0x02, b'b', b'c'];
    assert_eq!(message.encode_to_vec(), expected);
    assert_eq!(
        DynamicMessage::decode(desc, expected.as_slice()).unwrap(),
        message
    );
}

#[test]
fn map_entry_encoding() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.MapHolder");

    let mut message = DynamicMessage::new(desc.clone());
    message.set_map_entry(
        &desc.get_field_by_name("values").unwrap(),
        MapKey::String("k".to_owned()),
        Value::I32(7),
    );

    let expected = [0x0A, 0x05, 0x0A, 0x01, b'k', 0x10, 0x07];
    assert_eq!(message.encode_to_vec(), expected);
    assert_eq!(
        DynamicMessage::decode(desc, expected.as_slice()).unwrap(),
        message
    );
}

#[test]
fn map_entry_decode_applies_wire_defaults() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.MapHolder");

    // An empty entry message yields the default key and value.
    let decoded = DynamicMessage::decode(desc, [0x0A, 0x00].as_slice()).unwrap();
    let values = decoded.get_field_by_name("values").unwrap();
    let values = values.as_map().unwrap();
    assert_eq!(values.len(), 1);
    assert_eq!(values[&MapKey::String(String::new())], Value::I32(0));
}

#[test]
fn singular_fields_use_last_value_on_wire() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    let decoded = DynamicMessage::decode(desc, [0x08, 0x01, 0x08, 0x05].as_slice()).unwrap();
    assert_eq!(
        decoded.get_field_by_name("id").unwrap().as_ref(),
        &Value::I32(5)
    );
}

#[test]
fn decode_rejects_wire_type_mismatch() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    // Field 1 is int32 but arrives with the fixed32 wire type.
    let err = DynamicMessage::decode(desc, [0x0D, 0x01, 0x00, 0x00, 0x00].as_slice()).unwrap_err();
    assert!(err.to_string().contains("invalid wire type"));
}

#[test]
fn decode_rejects_truncated_input() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    // A tag with no value.
    assert!(DynamicMessage::decode(desc.clone(), [0x08].as_slice()).is_err());
    // A length prefix pointing past the end of the buffer.
    assert!(DynamicMessage::decode(desc, [0x12, 0x05, b'a'].as_slice()).is_err());
}

#[test]
fn zigzag_and_fixed_encodings() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Scalars");

    let mut message = DynamicMessage::new(desc.clone());
    message
        .try_set_field_by_name("f_sint32", Value::I32(-1))
        .unwrap();
    // Field 7, varint wire type, zigzag encoded.
    assert_eq!(message.encode_to_vec(), [0x38, 0x01]);

    let mut message = DynamicMessage::new(desc.clone());
    message
        .try_set_field_by_name("f_fixed32", Value::U32(1))
        .unwrap();
    // Field 9, fixed 32-bit little endian.
    assert_eq!(message.encode_to_vec(), [0x4D, 0x01, 0x00, 0x00, 0x00]);

    let mut message = DynamicMessage::new(desc);
    message
        .try_set_field_by_name("f_double", Value::F64(1.0))
        .unwrap();
    assert_eq!(
        message.encode_to_vec(),
        [0x09, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xF0, 0x3F]
    );
}

#[test]
fn scalar_fields_roundtrip() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Scalars");

    let factory = MessageFactory::new();
    let message = factory
        .create_from_names(
            &desc,
            [
                ("f_double", Value::F64(1.5)),
                ("f_float", Value::F32(-2.5)),
                ("f_int32", Value::I32(-3)),
                ("f_int64", Value::I64(i64::MIN)),
                ("f_uint32", Value::U32(u32::MAX)),
                ("f_uint64", Value::U64(u64::MAX)),
                ("f_sint32", Value::I32(i32::MIN)),
                ("f_sint64", Value::I64(-64)),
                ("f_fixed32", Value::U32(9)),
                ("f_fixed64", Value::U64(10)),
                ("f_sfixed32", Value::I32(-11)),
                ("f_sfixed64", Value::I64(-12)),
                ("f_bool", Value::Bool(true)),
                ("f_string", Value::String("héllo".to_owned())),
                ("f_bytes", Value::Bytes(b"\x00\x01\xFF".as_ref().into())),
            ],
        )
        .unwrap();

    let bytes = message.encode_to_vec();
    let decoded = DynamicMessage::decode(desc, bytes.as_slice()).unwrap();
    assert_eq!(decoded, message);
    assert_eq!(decoded.encode_to_vec(), bytes);
}

#[test]
fn enum_fields_roundtrip() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.WithEnum");
    let color = registry.find_enum("test.Color").unwrap();

    let mut message = DynamicMessage::new(desc.clone());
    message
        .try_set_field_by_name(
            "color",
            Value::from(&color.get_value_by_name("COLOR_RED").unwrap()),
        )
        .unwrap();
    message
        .try_set_field_by_name(
            "colors",
            Value::List(vec![Value::EnumNumber(2), Value::EnumNumber(0)]),
        )
        .unwrap();

    // Singular enum as a varint, repeated enum packed.
    assert_eq!(message.encode_to_vec(), [0x08, 0x01, 0x12, 0x02, 0x02, 0x00]);
    let decoded = DynamicMessage::decode(desc, message.encode_to_vec().as_slice()).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn nested_message_roundtrip() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Nested");
    let basic = message_desc(&registry, "test.Basic");

    let factory = MessageFactory::new();
    let mut inner = factory.create(&basic);
    inner.try_set_field_by_name("id", Value::I32(7)).unwrap();

    let mut message = factory.create(&desc);
    message
        .try_set_field_by_name("inner", Value::Message(inner.clone()))
        .unwrap();
    message
        .try_set_field_by_name(
            "items",
            Value::List(vec![
                Value::Message(factory.create(&basic)),
                Value::Message(inner),
            ]),
        )
        .unwrap();

    let bytes = message.encode_to_vec();
    assert_eq!(bytes, [0x0A, 0x02, 0x08, 0x07, 0x12, 0x00, 0x12, 0x02, 0x08, 0x07]);
    let decoded = DynamicMessage::decode(desc, bytes.as_slice()).unwrap();
    assert_eq!(decoded, message);
}

#[test]
fn set_field_type_checking() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Nested");
    let basic = message_desc(&registry, "test.Basic");
    let partial = message_desc(&registry, "test.Partial");

    let mut message = DynamicMessage::new(desc.clone());

    assert_eq!(
        message.try_set_field_by_name("no_such_field", Value::I32(1)),
        Err(SetFieldError::NotFound)
    );
    assert_eq!(
        message.try_set_field_by_number(99, Value::I32(1)),
        Err(SetFieldError::NotFound)
    );

    // A message value must have the exact target type.
    let err = message
        .try_set_field_by_name("inner", Value::Message(DynamicMessage::new(partial)))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));
    message
        .try_set_field_by_name("inner", Value::Message(DynamicMessage::new(basic)))
        .unwrap();

    // Scalar kind mismatches are rejected, including inside lists.
    let basic_desc = message_desc(&registry, "test.Basic");
    let mut basic_message = DynamicMessage::new(basic_desc);
    let err = basic_message
        .try_set_field_by_name("id", Value::String("42".to_owned()))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));
    let err = basic_message
        .try_set_field_by_name("id", Value::List(vec![Value::I32(1)]))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));
}

#[test]
fn set_map_entry_type_checking() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.MapHolder");
    let mut message = DynamicMessage::new(desc.clone());
    let values = desc.get_field_by_name("values").unwrap();

    message
        .try_set_map_entry(&values, MapKey::String("a".to_owned()), Value::I32(1))
        .unwrap();
    message
        .try_set_map_entry(&values, MapKey::String("a".to_owned()), Value::I32(2))
        .unwrap();

    let err = message
        .try_set_map_entry(&values, MapKey::I32(1), Value::I32(1))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));
    let err = message
        .try_set_map_entry(&values, MapKey::String("b".to_owned()), Value::Bool(true))
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));

    // Later inserts win.
    let stored = message.get_field(&values);
    assert_eq!(
        stored.as_map().unwrap()[&MapKey::String("a".to_owned())],
        Value::I32(2)
    );

    // Non-map fields reject entry insertion.
    let basic = message_desc(&registry, "test.Basic");
    let mut basic_message = DynamicMessage::new(basic.clone());
    let err = basic_message
        .try_set_map_entry(
            &basic.get_field_by_name("id").unwrap(),
            MapKey::String("a".to_owned()),
            Value::I32(1),
        )
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));
}

#[test]
fn unknown_fields_are_preserved() {
    let registry = test_registry();
    let basic = message_desc(&registry, "test.Basic");
    let partial = message_desc(&registry, "test.Partial");

    let factory = MessageFactory::new();
    let original = factory
        .create_from_names(
            &basic,
            [
                ("id", Value::I32(42)),
                ("name", Value::String("Test Name".to_owned())),
            ],
        )
        .unwrap();
    let bytes = original.encode_to_vec();

    // Decode with a descriptor that does not know field 2.
    let narrowed = DynamicMessage::decode(partial, bytes.as_slice()).unwrap();
    assert_eq!(
        narrowed.get_field_by_name("id").unwrap().as_ref(),
        &Value::I32(42)
    );
    let unknown: Vec<_> = narrowed.unknown_fields().collect();
    assert_eq!(unknown.len(), 1);
    assert_eq!(unknown[0].0, 2);
    assert!(matches!(unknown[0].1, UnknownField::LengthDelimited(_)));

    // Re-encoding emits the unknown field, so the full descriptor sees the
    // same values as a direct decode.
    let reencoded = narrowed.encode_to_vec();
    let widened = DynamicMessage::decode(basic, reencoded.as_slice()).unwrap();
    assert_eq!(widened, original);
}

#[test]
fn clone_is_deep() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Nested");
    let basic = message_desc(&registry, "test.Basic");

    let factory = MessageFactory::new();
    let mut inner = factory.create(&basic);
    inner.try_set_field_by_name("id", Value::I32(1)).unwrap();
    let mut original = factory.create(&desc);
    original
        .try_set_field_by_name("inner", Value::Message(inner))
        .unwrap();

    let mut copy = factory.clone_message(&original);
    assert_eq!(copy, original);
    assert_eq!(copy.has_field_by_name("inner"), original.has_field_by_name("inner"));

    copy.get_field_by_name_mut("inner")
        .unwrap()
        .as_message_mut()
        .unwrap()
        .try_set_field_by_name("id", Value::I32(99))
        .unwrap();

    assert_eq!(
        original
            .get_field_by_name("inner")
            .unwrap()
            .as_message()
            .unwrap()
            .get_field_by_name("id")
            .unwrap()
            .as_ref(),
        &Value::I32(1)
    );
    assert_ne!(copy, original);
}

#[test]
fn factory_aborts_on_first_error() {
    let registry = test_registry();
    let desc = message_desc(&registry, "test.Basic");

    let factory = MessageFactory::new();
    let err = factory
        .create_from_names(
            &desc,
            [
                ("id", Value::I32(1)),
                ("name", Value::I32(2)),
                ("id", Value::I32(3)),
            ],
        )
        .unwrap_err();
    assert!(matches!(err, SetFieldError::InvalidType { .. }));

    let message = factory
        .create_from_numbers(&desc, [(1, Value::I32(5))])
        .unwrap();
    assert_eq!(
        message.get_field_by_number(1).unwrap().as_ref(),
        &Value::I32(5)
    );
    assert_eq!(
        factory.create_from_numbers(&desc, [(9, Value::I32(5))]),
        Err(SetFieldError::NotFound)
    );
}

#[test]
fn validate_reports_missing_required_fields() {
    let registry = test_registry();
    let named = message_desc(&registry, "test2.Named");

    let message = DynamicMessage::new(named.clone());
    let result = message.validate();
    assert!(!result.is_ok());
    assert_eq!(result.errors().len(), 1);
    assert_eq!(result.errors()[0].path(), "name");
    assert_eq!(
        result.errors()[0].kind(),
        ValidationErrorKind::MissingRequiredField
    );

    let mut message = DynamicMessage::new(named);
    message
        .try_set_field_by_name("name", Value::String("x".to_owned()))
        .unwrap();
    assert!(message.validate().is_ok());
}

#[test]
fn validate_recurses_with_paths() {
    let registry = test_registry();
    let outer = message_desc(&registry, "test2.Outer");
    let holder = message_desc(&registry, "test2.ReqHolder");

    let factory = MessageFactory::new();
    let empty_holder = || Value::Message(factory.create(&holder));
    let mut filled_holder = factory.create(&holder);
    filled_holder
        .try_set_field_by_name("id", Value::I32(1))
        .unwrap();

    let mut message = factory.create(&outer);
    message
        .try_set_field_by_name("one", empty_holder())
        .unwrap();
    message
        .try_set_field_by_name(
            "many",
            Value::List(vec![Value::Message(filled_holder), empty_holder()]),
        )
        .unwrap();
    message
        .try_set_field_by_name(
            "by_key",
            Value::Map(HashMap::from_iter([(
                MapKey::String("k".to_owned()),
                empty_holder(),
            )])),
        )
        .unwrap();

    let result = message.validate();
    assert!(!result.is_ok());
    let mut paths: Vec<_> = result.errors().iter().map(|e| e.path().to_owned()).collect();
    paths.sort();
    assert_eq!(paths, ["by_key[\"k\"].id", "many[1].id", "one.id"]);
}

#[test]
fn transcode_through_static_messages() {
    let registry = TypeRegistry::with_well_known_types();
    let desc = registry.find_message("google.protobuf.Duration").unwrap();

    let duration = prost_types::Duration {
        seconds: 3,
        nanos: 500,
    };

    let mut message = DynamicMessage::new(desc);
    message.transcode_from(&duration).unwrap();
    assert_eq!(
        message.get_field_by_name("seconds").unwrap().as_ref(),
        &Value::I64(3)
    );
    assert_eq!(
        message.get_field_by_name("nanos").unwrap().as_ref(),
        &Value::I32(500)
    );

    let roundtripped: prost_types::Duration = message.transcode_to().unwrap();
    assert_eq!(roundtripped, duration);
}

proptest! {
    #[test]
    fn scalar_wire_roundtrip(
        (f_double, f_float, f_int32, f_int64, f_uint32, f_uint64, f_sint32, f_sint64) in (
            any::<f64>(), any::<f32>(), any::<i32>(), any::<i64>(),
            any::<u32>(), any::<u64>(), any::<i32>(), any::<i64>(),
        ),
        (f_fixed32, f_fixed64, f_sfixed32, f_sfixed64, f_bool, f_string, f_bytes) in (
            any::<u32>(), any::<u64>(), any::<i32>(), any::<i64>(),
            any::<bool>(), any::<String>(), any::<Vec<u8>>(),
        ),
    ) {
        let registry = test_registry();
        let desc = message_desc(&registry, "test.Scalars");

        let message = MessageFactory::new()
            .create_from_names(
                &desc,
                [
                    ("f_double", Value::F64(f_double)),
                    ("f_float", Value::F32(f_float)),
                    ("f_int32", Value::I32(f_int32)),
                    ("f_int64", Value::I64(f_int64)),
                    ("f_uint32", Value::U32(f_uint32)),
                    ("f_uint64", Value::U64(f_uint64)),
                    ("f_sint32", Value::I32(f_sint32)),
                    ("f_sint64", Value::I64(f_sint64)),
                    ("f_fixed32", Value::U32(f_fixed32)),
                    ("f_fixed64", Value::U64(f_fixed64)),
                    ("f_sfixed32", Value::I32(f_sfixed32)),
                    ("f_sfixed64", Value::I64(f_sfixed64)),
                    ("f_bool", Value::Bool(f_bool)),
                    ("f_string", Value::String(f_string)),
                    ("f_bytes", Value::Bytes(f_bytes.into())),
                ],
            )
            .unwrap();

        let bytes = message.encode_to_vec();
        prop_assert_eq!(&message.encode_to_vec(), &bytes);
        let decoded = DynamicMessage::decode(desc, bytes.as_slice()).unwrap();
        // NaN values compare unequal, so compare the canonical bytes instead.
        prop_assert_eq!(decoded.encode_to_vec(), bytes);
    }
}
