//! In-code descriptor protos for the well-known types.
//!
//! The engine ships no embedded descriptor-set blobs; instead the files
//! bundled with the protobuf compiler are reconstructed here and registered
//! by [`TypeRegistry::with_well_known_types`][crate::TypeRegistry::with_well_known_types].

use once_cell::sync::Lazy;
use prost_types::{
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, EnumValueDescriptorProto, FieldDescriptorProto,
    FieldOptions, FileDescriptorProto, FileDescriptorSet, MessageOptions, OneofDescriptorProto,
};

static WELL_KNOWN_TYPES: Lazy<FileDescriptorSet> = Lazy::new(|| FileDescriptorSet {
    file: vec![
        any_proto(),
        duration_proto(),
        empty_proto(),
        field_mask_proto(),
        struct_proto(),
        timestamp_proto(),
        wrappers_proto(),
        descriptor_proto(),
    ],
});

pub(crate) fn file_descriptor_set() -> FileDescriptorSet {
    WELL_KNOWN_TYPES.clone()
}

fn file(
    name: &str,
    syntax: &str,
    message_type: Vec<DescriptorProto>,
    enum_type: Vec<EnumDescriptorProto>,
) -> FileDescriptorProto {
    FileDescriptorProto {
        name: Some(name.to_owned()),
        package: Some("google.protobuf".to_owned()),
        message_type,
        enum_type,
        syntax: Some(syntax.to_owned()),
        ..Default::default()
    }
}

fn message(name: &str, field: Vec<FieldDescriptorProto>) -> DescriptorProto {
    DescriptorProto {
        name: Some(name.to_owned()),
        field,
        ..Default::default()
    }
}

fn field(
    name: &str,
    number: i32,
    label: Label,
    r#type: Type,
    type_name: Option<&str>,
) -> FieldDescriptorProto {
    FieldDescriptorProto {
        name: Some(name.to_owned()),
        number: Some(number),
        label: Some(label as i32),
        r#type: Some(r#type as i32),
        type_name: type_name.map(str::to_owned),
        ..Default::default()
    }
}

fn opt(name: &str, number: i32, r#type: Type) -> FieldDescriptorProto {
    field(name, number, Label::Optional, r#type, None)
}

fn req(name: &str, number: i32, r#type: Type) -> FieldDescriptorProto {
    field(name, number, Label::Required, r#type, None)
}

fn rep(name: &str, number: i32, r#type: Type) -> FieldDescriptorProto {
    field(name, number, Label::Repeated, r#type, None)
}

fn opt_t(name: &str, number: i32, r#type: Type, type_name: &str) -> FieldDescriptorProto {
    field(name, number, Label::Optional, r#type, Some(type_name))
}

fn rep_t(name: &str, number: i32, r#type: Type, type_name: &str) -> FieldDescriptorProto {
    field(name, number, Label::Repeated, r#type, Some(type_name))
}

fn packed_rep(name: &str, number: i32, r#type: Type) -> FieldDescriptorProto {
    FieldDescriptorProto {
        options: Some(FieldOptions {
            packed: Some(true),
            ..Default::default()
        }),
        ..rep(name, number, r#type)
    }
}

fn enum_proto(name: &str, values: &[(&str, i32)]) -> EnumDescriptorProto {
    EnumDescriptorProto {
        name: Some(name.to_owned()),
        value: values
            .iter()
            .map(|&(name, number)| EnumValueDescriptorProto {
                name: Some(name.to_owned()),
                number: Some(number),
                ..Default::default()
            })
            .collect(),
        ..Default::default()
    }
}

fn any_proto() -> FileDescriptorProto {
    file(
        "google/protobuf/any.proto",
        "proto3",
        vec![message(
            "Any",
            vec![opt("type_url", 1, Type::String), opt("value", 2, Type::Bytes)],
        )],
        vec![],
    )
}

fn duration_proto() -> FileDescriptorProto {
    file(
        "google/protobuf/duration.proto",
        "proto3",
        vec![message(
            "Duration",
            vec![opt("seconds", 1, Type::Int64), opt("nanos", 2, Type::Int32)],
        )],
        vec![],
    )
}

fn empty_proto() -> FileDescriptorProto {
    file(
        "google/protobuf/empty.proto",
        "proto3",
        vec![message("Empty", vec![])],
        vec![],
    )
}

fn field_mask_proto() -> FileDescriptorProto {
    file(
        "google/protobuf/field_mask.proto",
        "proto3",
        vec![message("FieldMask", vec![rep("paths", 1, Type::String)])],
        vec![],
    )
}

fn struct_proto() -> FileDescriptorProto {
    let fields_entry = DescriptorProto {
        options: Some(MessageOptions {
            map_entry: Some(true),
            ..Default::default()
        }),
        ..message(
            "FieldsEntry",
            vec![
                opt("key", 1, Type::String),
                opt_t("value", 2, Type::Message, ".google.protobuf.Value"),
            ],
        )
    };

    let value = DescriptorProto {
        oneof_decl: vec![OneofDescriptorProto {
            name: Some("kind".to_owned()),
            ..Default::default()
        }],
        ..message(
            "Value",
            vec![
                with_oneof(opt_t(
                    "null_value",
                    1,
                    Type::Enum,
                    ".google.protobuf.NullValue",
                )),
                with_oneof(opt("number_value", 2, Type::Double)),
                with_oneof(opt("string_value", 3, Type::String)),
                with_oneof(opt("bool_value", 4, Type::Bool)),
                with_oneof(opt_t(
                    "struct_value",
                    5,
                    Type::Message,
                    ".google.protobuf.Struct",
                )),
                with_oneof(opt_t(
                    "list_value",
                    6,
                    Type::Message,
                    ".google.protobuf.ListValue",
                )),
            ],
        )
    };

    file(
        "google/protobuf/struct.proto",
        "proto3",
        vec![
            DescriptorProto {
                nested_type: vec![fields_entry],
                ..message(
                    "Struct",
                    vec![rep_t(
                        "fields",
                        1,
                        Type::Message,
                        ".google.protobuf.Struct.FieldsEntry",
                    )],
                )
            },
            value,
            message(
                "ListValue",
                vec![rep_t("values", 1, Type::Message, ".google.protobuf.Value")],
            ),
        ],
        vec![enum_proto("NullValue", &[("NULL_VALUE", 0)])],
    )
}

fn with_oneof(field: FieldDescriptorProto) -> FieldDescriptorProto {
    FieldDescriptorProto {
        oneof_index: Some(0),
        ..field
    }
}

fn timestamp_proto() -> FileDescriptorProto {
    file(
        "google/protobuf/timestamp.proto",
        "proto3",
        vec![message(
            "Timestamp",
            vec![opt("seconds", 1, Type::Int64), opt("nanos", 2, Type::Int32)],
        )],
        vec![],
    )
}

fn wrappers_proto() -> FileDescriptorProto {
    let wrapper = |name: &str, r#type: Type| message(name, vec![opt("value", 1, r#type)]);
    file(
        "google/protobuf/wrappers.proto",
        "proto3",
        vec![
            wrapper("DoubleValue", Type::Double),
            wrapper("FloatValue", Type::Float),
            wrapper("Int64Value", Type::Int64),
            wrapper("UInt64Value", Type::Uint64),
            wrapper("Int32Value", Type::Int32),
            wrapper("UInt32Value", Type::Uint32),
            wrapper("BoolValue", Type::Bool),
            wrapper("StringValue", Type::String),
            wrapper("BytesValue", Type::Bytes),
        ],
        vec![],
    )
}

fn descriptor_proto() -> FileDescriptorProto {
    let gp = |name: &str| format!(".google.protobuf.{}", name);

    let uninterpreted = |number: i32| {
        rep_t(
            "uninterpreted_option",
            number,
            Type::Message,
            &gp("UninterpretedOption"),
        )
    };

    file(
        "google/protobuf/descriptor.proto",
        "proto2",
        vec![
            message(
                "FileDescriptorSet",
                vec![rep_t("file", 1, Type::Message, &gp("FileDescriptorProto"))],
            ),
            message(
                "FileDescriptorProto",
                vec![
                    opt("name", 1, Type::String),
                    opt("package", 2, Type::String),
                    rep("dependency", 3, Type::String),
                    rep("public_dependency", 10, Type::Int32),
                    rep("weak_dependency", 11, Type::Int32),
                    rep_t("message_type", 4, Type::Message, &gp("DescriptorProto")),
                    rep_t("enum_type", 5, Type::Message, &gp("EnumDescriptorProto")),
                    rep_t("service", 6, Type::Message, &gp("ServiceDescriptorProto")),
                    rep_t("extension", 7, Type::Message, &gp("FieldDescriptorProto")),
                    opt_t("options", 8, Type::Message, &gp("FileOptions")),
                    opt_t("source_code_info", 9, Type::Message, &gp("SourceCodeInfo")),
                    opt("syntax", 12, Type::String),
                ],
            ),
            DescriptorProto {
                nested_type: vec![
                    message(
                        "ExtensionRange",
                        vec![
                            opt("start", 1, Type::Int32),
                            opt("end", 2, Type::Int32),
                            opt_t("options", 3, Type::Message, &gp("ExtensionRangeOptions")),
                        ],
                    ),
                    message(
                        "ReservedRange",
                        vec![opt("start", 1, Type::Int32), opt("end", 2, Type::Int32)],
                    ),
                ],
                ..message(
                    "DescriptorProto",
                    vec![
                        opt("name", 1, Type::String),
                        rep_t("field", 2, Type::Message, &gp("FieldDescriptorProto")),
                        rep_t("extension", 6, Type::Message, &gp("FieldDescriptorProto")),
                        rep_t("nested_type", 3, Type::Message, &gp("DescriptorProto")),
                        rep_t("enum_type", 4, Type::Message, &gp("EnumDescriptorProto")),
                        rep_t(
                            "extension_range",
                            5,
                            Type::Message,
                            &gp("DescriptorProto.ExtensionRange"),
                        ),
                        rep_t(
                            "oneof_decl",
                            8,
                            Type::Message,
                            &gp("OneofDescriptorProto"),
                        ),
                        opt_t("options", 7, Type::Message, &gp("MessageOptions")),
                        rep_t(
                            "reserved_range",
                            9,
                            Type::Message,
                            &gp("DescriptorProto.ReservedRange"),
                        ),
                        rep("reserved_name", 10, Type::String),
                    ],
                )
            },
            message("ExtensionRangeOptions", vec![uninterpreted(999)]),
            DescriptorProto {
                enum_type: vec![
                    enum_proto(
                        "Type",
                        &[
                            ("TYPE_DOUBLE", 1),
                            ("TYPE_FLOAT", 2),
                            ("TYPE_INT64", 3),
                            ("TYPE_UINT64", 4),
                            ("TYPE_INT32", 5),
                            ("TYPE_FIXED64", 6),
                            ("TYPE_FIXED32", 7),
                            ("TYPE_BOOL", 8),
                            ("TYPE_STRING", 9),
                            ("TYPE_GROUP", 10),
                            ("TYPE_MESSAGE", 11),
                            ("TYPE_BYTES", 12),
                            ("TYPE_UINT32", 13),
                            ("TYPE_ENUM", 14),
                            ("TYPE_SFIXED32", 15),
                            ("TYPE_SFIXED64", 16),
                            ("TYPE_SINT32", 17),
                            ("TYPE_SINT64", 18),
                        ],
                    ),
                    enum_proto(
                        "Label",
                        &[
                            ("LABEL_OPTIONAL", 1),
                            ("LABEL_REQUIRED", 2),
                            ("LABEL_REPEATED", 3),
                        ],
                    ),
                ],
                ..message(
                    "FieldDescriptorProto",
                    vec![
                        opt("name", 1, Type::String),
                        opt("number", 3, Type::Int32),
                        opt_t("label", 4, Type::Enum, &gp("FieldDescriptorProto.Label")),
                        opt_t("type", 5, Type::Enum, &gp("FieldDescriptorProto.Type")),
                        opt("type_name", 6, Type::String),
                        opt("extendee", 2, Type::String),
                        opt("default_value", 7, Type::String),
                        opt("oneof_index", 9, Type::Int32),
                        opt("json_name", 10, Type::String),
                        opt_t("options", 8, Type::Message, &gp("FieldOptions")),
                        opt("proto3_optional", 17, Type::Bool),
                    ],
                )
            },
            message(
                "OneofDescriptorProto",
                vec![
                    opt("name", 1, Type::String),
                    opt_t("options", 2, Type::Message, &gp("OneofOptions")),
                ],
            ),
            DescriptorProto {
                nested_type: vec![message(
                    "EnumReservedRange",
                    vec![opt("start", 1, Type::Int32), opt("end", 2, Type::Int32)],
                )],
                ..message(
                    "EnumDescriptorProto",
                    vec![
                        opt("name", 1, Type::String),
                        rep_t("value", 2, Type::Message, &gp("EnumValueDescriptorProto")),
                        opt_t("options", 3, Type::Message, &gp("EnumOptions")),
                        rep_t(
                            "reserved_range",
                            4,
                            Type::Message,
                            &gp("EnumDescriptorProto.EnumReservedRange"),
                        ),
                        rep("reserved_name", 5, Type::String),
                    ],
                )
            },
            message(
                "EnumValueDescriptorProto",
                vec![
                    opt("name", 1, Type::String),
                    opt("number", 2, Type::Int32),
                    opt_t("options", 3, Type::Message, &gp("EnumValueOptions")),
                ],
            ),
            message(
                "ServiceDescriptorProto",
                vec![
                    opt("name", 1, Type::String),
                    rep_t("method", 2, Type::Message, &gp("MethodDescriptorProto")),
                    opt_t("options", 3, Type::Message, &gp("ServiceOptions")),
                ],
            ),
            message(
                "MethodDescriptorProto",
                vec![
                    opt("name", 1, Type::String),
                    opt("input_type", 2, Type::String),
                    opt("output_type", 3, Type::String),
                    opt_t("options", 4, Type::Message, &gp("MethodOptions")),
                    opt("client_streaming", 5, Type::Bool),
                    opt("server_streaming", 6, Type::Bool),
                ],
            ),
            DescriptorProto {
                enum_type: vec![enum_proto(
                    "OptimizeMode",
                    &[("SPEED", 1), ("CODE_SIZE", 2), ("LITE_RUNTIME", 3)],
                )],
                ..message(
                    "FileOptions",
                    vec![
                        opt("java_package", 1, Type::String),
                        opt("java_outer_classname", 8, Type::String),
                        opt("java_multiple_files", 10, Type::Bool),
                        opt("java_generate_equals_and_hash", 20, Type::Bool),
                        opt("java_string_check_utf8", 27, Type::Bool),
                        opt_t(
                            "optimize_for",
                            9,
                            Type::Enum,
                            &gp("FileOptions.OptimizeMode"),
                        ),
                        opt("go_package", 11, Type::String),
                        opt("cc_generic_services", 16, Type::Bool),
                        opt("java_generic_services", 17, Type::Bool),
                        opt("py_generic_services", 18, Type::Bool),
                        opt("deprecated", 23, Type::Bool),
                        opt("cc_enable_arenas", 31, Type::Bool),
                        opt("objc_class_prefix", 36, Type::String),
                        opt("csharp_namespace", 37, Type::String),
                        opt("swift_prefix", 39, Type::String),
                        opt("php_class_prefix", 40, Type::String),
                        opt("php_namespace", 41, Type::String),
                        opt("php_metadata_namespace", 44, Type::String),
                        opt("ruby_package", 45, Type::String),
                        uninterpreted(999),
                    ],
                )
            },
            message(
                "MessageOptions",
                vec![
                    opt("message_set_wire_format", 1, Type::Bool),
                    opt("no_standard_descriptor_accessor", 2, Type::Bool),
                    opt("deprecated", 3, Type::Bool),
                    opt("map_entry", 7, Type::Bool),
                    uninterpreted(999),
                ],
            ),
            DescriptorProto {
                enum_type: vec![
                    enum_proto(
                        "CType",
                        &[("STRING", 0), ("CORD", 1), ("STRING_PIECE", 2)],
                    ),
                    enum_proto(
                        "JSType",
                        &[("JS_NORMAL", 0), ("JS_STRING", 1), ("JS_NUMBER", 2)],
                    ),
                ],
                ..message(
                    "FieldOptions",
                    vec![
                        opt_t("ctype", 1, Type::Enum, &gp("FieldOptions.CType")),
                        opt("packed", 2, Type::Bool),
                        opt_t("jstype", 6, Type::Enum, &gp("FieldOptions.JSType")),
                        opt("lazy", 5, Type::Bool),
                        opt("deprecated", 3, Type::Bool),
                        opt("weak", 10, Type::Bool),
                        uninterpreted(999),
                    ],
                )
            },
            message("OneofOptions", vec![uninterpreted(999)]),
            message(
                "EnumOptions",
                vec![
                    opt("allow_alias", 2, Type::Bool),
                    opt("deprecated", 3, Type::Bool),
                    uninterpreted(999),
                ],
            ),
            message(
                "EnumValueOptions",
                vec![opt("deprecated", 1, Type::Bool), uninterpreted(999)],
            ),
            message(
                "ServiceOptions",
                vec![opt("deprecated", 33, Type::Bool), uninterpreted(999)],
            ),
            DescriptorProto {
                enum_type: vec![enum_proto(
                    "IdempotencyLevel",
                    &[
                        ("IDEMPOTENCY_UNKNOWN", 0),
                        ("NO_SIDE_EFFECTS", 1),
                        ("IDEMPOTENT", 2),
                    ],
                )],
                ..message(
                    "MethodOptions",
                    vec![
                        opt("deprecated", 33, Type::Bool),
                        opt_t(
                            "idempotency_level",
                            34,
                            Type::Enum,
                            &gp("MethodOptions.IdempotencyLevel"),
                        ),
                        uninterpreted(999),
                    ],
                )
            },
            DescriptorProto {
                nested_type: vec![message(
                    "NamePart",
                    vec![
                        req("name_part", 1, Type::String),
                        req("is_extension", 2, Type::Bool),
                    ],
                )],
                ..message(
                    "UninterpretedOption",
                    vec![
                        rep_t(
                            "name",
                            2,
                            Type::Message,
                            &gp("UninterpretedOption.NamePart"),
                        ),
                        opt("identifier_value", 3, Type::String),
                        opt("positive_int_value", 4, Type::Uint64),
                        opt("negative_int_value", 5, Type::Int64),
                        opt("double_value", 6, Type::Double),
                        opt("string_value", 7, Type::Bytes),
                        opt("aggregate_value", 8, Type::String),
                    ],
                )
            },
            DescriptorProto {
                nested_type: vec![message(
                    "Location",
                    vec![
                        packed_rep("path", 1, Type::Int32),
                        packed_rep("span", 2, Type::Int32),
                        opt("leading_comments", 3, Type::String),
                        opt("trailing_comments", 4, Type::String),
                        rep("leading_detached_comments", 6, Type::String),
                    ],
                )],
                ..message(
                    "SourceCodeInfo",
                    vec![rep_t(
                        "location",
                        1,
                        Type::Message,
                        &gp("SourceCodeInfo.Location"),
                    )],
                )
            },
            DescriptorProto {
                nested_type: vec![message(
                    "Annotation",
                    vec![
                        packed_rep("path", 1, Type::Int32),
                        opt("source_file", 2, Type::String),
                        opt("begin", 3, Type::Int32),
                        opt("end", 4, Type::Int32),
                    ],
                )],
                ..message(
                    "GeneratedCodeInfo",
                    vec![rep_t(
                        "annotation",
                        1,
                        Type::Message,
                        &gp("GeneratedCodeInfo.Annotation"),
                    )],
                )
            },
        ],
        vec![],
    )
}
