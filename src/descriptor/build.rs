use std::collections::{hash_map, HashMap};

use prost_types::{
    field_descriptor_proto::{Label, Type},
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    ServiceDescriptorProto,
};

use crate::descriptor::{
    to_index, Cardinality, Definition, DefinitionKind, DescriptorError, EnumDescriptorInner,
    EnumIndex, EnumValueDescriptorInner, FieldDescriptorInner, FieldIndex, FileDescriptorInner,
    FileIndex, Identity, KindIndex, MessageDescriptorInner, MessageIndex, MethodDescriptorInner,
    RegistryInner, ServiceDescriptorInner, Syntax, MAP_ENTRY_KEY_NUMBER, MAP_ENTRY_VALUE_NUMBER,
    RESERVED_MESSAGE_FIELD_NUMBERS, VALID_MESSAGE_FIELD_NUMBERS,
};

/// Builds `files` into `inner`, in order.
///
/// The caller passes a scratch copy of the registry state and publishes it
/// only on success, so errors here never leave partial state observable.
pub(crate) fn build_files<I>(inner: &mut RegistryInner, files: I) -> Result<(), DescriptorError>
where
    I: IntoIterator<Item = FileDescriptorProto>,
{
    for file in files {
        build_file(inner, file)?;
    }
    Ok(())
}

pub(crate) fn build_file(
    inner: &mut RegistryInner,
    file: FileDescriptorProto,
) -> Result<FileIndex, DescriptorError> {
    if file.name().is_empty() {
        return Err(DescriptorError::invalid_descriptor_structure(
            "file name is missing",
        ));
    }
    if inner.file_names.contains_key(file.name()) {
        return Err(DescriptorError::duplicate_file(file.name()));
    }

    let syntax = match file.syntax.as_deref() {
        None | Some("") | Some("proto2") => Syntax::Proto2,
        Some("proto3") => Syntax::Proto3,
        Some(syntax) => {
            return Err(DescriptorError::invalid_descriptor_structure(format!(
                "the syntax '{}' is not recognized",
                syntax
            )))
        }
    };

    let file_index = to_index(inner.files.len());

    add_package_names(inner, file_index, file.package())?;

    // Collect pass: intern every name and build the parts that do not require
    // type resolution.
    let mut collected = CollectedFile::default();

    let mut top_messages = Vec::with_capacity(file.message_type.len());
    for (i, message) in file.message_type.iter().enumerate() {
        let index = collect_message(
            inner,
            &mut collected,
            file_index,
            file.package(),
            None,
            vec![i as u32],
            message,
        )?;
        top_messages.push(index);
    }

    let mut top_enums = Vec::with_capacity(file.enum_type.len());
    for (i, enum_proto) in file.enum_type.iter().enumerate() {
        top_enums.push(collect_enum(
            inner,
            file_index,
            file.package(),
            None,
            i as u32,
            enum_proto,
        )?);
    }

    let mut top_services = Vec::with_capacity(file.service.len());
    for (i, service) in file.service.iter().enumerate() {
        let index = collect_service(inner, file_index, file.package(), i as u32, service)?;
        collected.services.push((index, service));
        top_services.push(index);
    }

    // Resolve pass: field types and method signatures, then the shape checks
    // that depend on them.
    for &(index, proto) in &collected.messages {
        resolve_message_fields(inner, file_index, syntax, index, proto)?;
    }
    for &(index, _) in &collected.messages {
        check_map_entry(inner, index)?;
    }
    for &(index, proto) in &collected.services {
        resolve_service_methods(inner, file_index, index, proto)?;
    }

    inner.file_names.insert(file.name().into(), file_index);
    inner.files.push(FileDescriptorInner {
        syntax,
        raw: file,
        messages: top_messages,
        enums: top_enums,
        services: top_services,
    });

    Ok(file_index)
}

#[derive(Default)]
struct CollectedFile<'a> {
    messages: Vec<(MessageIndex, &'a DescriptorProto)>,
    services: Vec<(u32, &'a ServiceDescriptorProto)>,
}

fn add_package_names(
    inner: &mut RegistryInner,
    file: FileIndex,
    package: &str,
) -> Result<(), DescriptorError> {
    if package.is_empty() {
        return Ok(());
    }
    for (i, _) in package.match_indices('.').chain([(package.len(), "")]) {
        let prefix = &package[..i];
        match inner.names.entry(prefix.into()) {
            hash_map::Entry::Occupied(entry) => {
                if !matches!(entry.get().kind, DefinitionKind::Package) {
                    return Err(DescriptorError::duplicate_symbol(prefix));
                }
            }
            hash_map::Entry::Vacant(entry) => {
                entry.insert(Definition {
                    file,
                    kind: DefinitionKind::Package,
                });
            }
        }
    }
    Ok(())
}

fn add_name(
    inner: &mut RegistryInner,
    file: FileIndex,
    full_name: &str,
    kind: DefinitionKind,
) -> Result<(), DescriptorError> {
    match inner.names.entry(full_name.into()) {
        hash_map::Entry::Occupied(_) => Err(DescriptorError::duplicate_symbol(full_name)),
        hash_map::Entry::Vacant(entry) => {
            entry.insert(Definition { file, kind });
            Ok(())
        }
    }
}

fn collect_message<'a>(
    inner: &mut RegistryInner,
    collected: &mut CollectedFile<'a>,
    file: FileIndex,
    namespace: &str,
    parent: Option<MessageIndex>,
    proto_path: Vec<u32>,
    proto: &'a DescriptorProto,
) -> Result<MessageIndex, DescriptorError> {
    if proto.name().is_empty() {
        return Err(DescriptorError::invalid_descriptor_structure(
            "message name is missing",
        ));
    }
    let full_name = join_name(namespace, proto.name());
    let index = to_index(inner.messages.len());
    add_name(inner, file, &full_name, DefinitionKind::Message(index))?;

    let is_map_entry = proto
        .options
        .as_ref()
        .map(|options| options.map_entry())
        .unwrap_or(false);

    inner.messages.push(MessageDescriptorInner {
        id: Identity::new(file, &full_name, proto.name()),
        parent,
        proto_path: proto_path.clone().into_boxed_slice(),
        fields: Vec::new(),
        field_numbers: HashMap::new(),
        field_names: HashMap::new(),
        field_json_names: HashMap::new(),
        nested_messages: Vec::new(),
        nested_enums: Vec::new(),
        is_map_entry,
    });
    collected.messages.push((index, proto));

    for (i, field) in proto.field.iter().enumerate() {
        if field.name().is_empty() {
            return Err(DescriptorError::invalid_descriptor_structure(format!(
                "field {} of message '{}' has no name",
                i, full_name
            )));
        }
        let field_full_name = join_name(&full_name, field.name());
        add_name(
            inner,
            file,
            &field_full_name,
            DefinitionKind::Field(index, i as FieldIndex),
        )?;
    }

    let mut nested_messages = Vec::with_capacity(proto.nested_type.len());
    for (i, nested) in proto.nested_type.iter().enumerate() {
        let mut nested_path = proto_path.clone();
        nested_path.push(i as u32);
        nested_messages.push(collect_message(
            inner,
            collected,
            file,
            &full_name,
            Some(index),
            nested_path,
            nested,
        )?);
    }

    let mut nested_enums = Vec::with_capacity(proto.enum_type.len());
    for (i, nested) in proto.enum_type.iter().enumerate() {
        nested_enums.push(collect_enum(
            inner,
            file,
            &full_name,
            Some(index),
            i as u32,
            nested,
        )?);
    }

    let message = &mut inner.messages[index as usize];
    message.nested_messages = nested_messages;
    message.nested_enums = nested_enums;
    Ok(index)
}

fn collect_enum(
    inner: &mut RegistryInner,
    file: FileIndex,
    namespace: &str,
    parent: Option<MessageIndex>,
    proto_index: u32,
    proto: &EnumDescriptorProto,
) -> Result<EnumIndex, DescriptorError> {
    if proto.name().is_empty() {
        return Err(DescriptorError::invalid_descriptor_structure(
            "enum name is missing",
        ));
    }
    let full_name = join_name(namespace, proto.name());
    let index = to_index(inner.enums.len());
    add_name(inner, file, &full_name, DefinitionKind::Enum(index))?;

    if proto.value.is_empty() {
        return Err(DescriptorError::invalid_descriptor_structure(format!(
            "enum '{}' must have at least one value",
            full_name
        )));
    }

    let allow_alias = proto
        .options
        .as_ref()
        .map(|options| options.allow_alias())
        .unwrap_or(false);

    let mut values = Vec::with_capacity(proto.value.len());
    let mut value_numbers = Vec::with_capacity(proto.value.len());
    let mut value_names = HashMap::with_capacity(proto.value.len());
    for (i, value) in proto.value.iter().enumerate() {
        let value_index = i as u32;
        // Enum values are scoped to the namespace enclosing the enum itself.
        let value_full_name = join_name(namespace, value.name());
        add_name(
            inner,
            file,
            &value_full_name,
            DefinitionKind::EnumValue(index, value_index),
        )?;

        if !allow_alias && value_numbers.iter().any(|&(n, _)| n == value.number()) {
            return Err(DescriptorError::invalid_descriptor_structure(format!(
                "the number {} is used by multiple values of enum '{}', which does not allow aliases",
                value.number(),
                full_name
            )));
        }

        values.push(EnumValueDescriptorInner {
            id: Identity::new(file, &value_full_name, value.name()),
            number: value.number(),
        });
        value_numbers.push((value.number(), value_index));
        value_names.insert(value.name().into(), value_index);
    }
    value_numbers.sort();

    inner.enums.push(EnumDescriptorInner {
        id: Identity::new(file, &full_name, proto.name()),
        parent,
        proto_index,
        values,
        value_numbers,
        value_names,
        allow_alias,
    });
    Ok(index)
}

fn collect_service(
    inner: &mut RegistryInner,
    file: FileIndex,
    namespace: &str,
    proto_index: u32,
    proto: &ServiceDescriptorProto,
) -> Result<u32, DescriptorError> {
    if proto.name().is_empty() {
        return Err(DescriptorError::invalid_descriptor_structure(
            "service name is missing",
        ));
    }
    let full_name = join_name(namespace, proto.name());
    let index = to_index(inner.services.len());
    add_name(inner, file, &full_name, DefinitionKind::Service(index))?;

    for (i, method) in proto.method.iter().enumerate() {
        let method_full_name = join_name(&full_name, method.name());
        add_name(
            inner,
            file,
            &method_full_name,
            DefinitionKind::Method(index, i as u32),
        )?;
    }

    inner.services.push(ServiceDescriptorInner {
        id: Identity::new(file, &full_name, proto.name()),
        proto_index,
        methods: Vec::new(),
    });
    Ok(index)
}

fn resolve_message_fields(
    inner: &mut RegistryInner,
    file: FileIndex,
    syntax: Syntax,
    index: MessageIndex,
    proto: &DescriptorProto,
) -> Result<(), DescriptorError> {
    let scope = inner.messages[index as usize].id.full_name().to_owned();

    let mut fields = Vec::with_capacity(proto.field.len());
    let mut field_numbers = HashMap::with_capacity(proto.field.len());
    let mut field_names = HashMap::with_capacity(proto.field.len());
    let mut field_json_names = HashMap::with_capacity(proto.field.len());
    for (i, field) in proto.field.iter().enumerate() {
        let number = field.number();
        if !VALID_MESSAGE_FIELD_NUMBERS.contains(&number)
            || RESERVED_MESSAGE_FIELD_NUMBERS.contains(&number)
        {
            return Err(DescriptorError::invalid_descriptor_structure(format!(
                "the number {} of field '{}.{}' is outside the valid range",
                number,
                scope,
                field.name()
            )));
        }
        let number = number as u32;
        if field_numbers.insert(number, i as FieldIndex).is_some() {
            return Err(DescriptorError::invalid_descriptor_structure(format!(
                "the number {} is used by multiple fields of message '{}'",
                number, scope
            )));
        }

        let kind = resolve_field_kind(inner, &scope, field)?;

        let cardinality = match field.label() {
            Label::Optional => Cardinality::Optional,
            Label::Required => Cardinality::Required,
            Label::Repeated => Cardinality::Repeated,
        };

        let is_packed = kind.is_packable()
            && cardinality == Cardinality::Repeated
            && field
                .options
                .as_ref()
                .and_then(|options| options.packed)
                .unwrap_or(syntax == Syntax::Proto3);

        let json_name: Box<str> = match &field.json_name {
            Some(json_name) => json_name.as_str().into(),
            None => to_json_name(field.name()).into(),
        };

        let full_name = join_name(&scope, field.name());
        field_names.insert(field.name().into(), i as FieldIndex);
        field_json_names.insert(json_name.clone(), i as FieldIndex);
        fields.push(FieldDescriptorInner {
            id: Identity::new(file, &full_name, field.name()),
            number,
            json_name,
            kind,
            cardinality,
            is_packed,
        });
    }

    let message = &mut inner.messages[index as usize];
    message.fields = fields;
    message.field_numbers = field_numbers;
    message.field_names = field_names;
    message.field_json_names = field_json_names;
    Ok(())
}

fn resolve_field_kind(
    inner: &RegistryInner,
    scope: &str,
    field: &FieldDescriptorProto,
) -> Result<KindIndex, DescriptorError> {
    let type_value = match field.r#type {
        Some(type_value) => match Type::try_from(type_value) {
            Ok(ty) => Some(ty),
            Err(_) => return Err(DescriptorError::unsupported_field_type(type_value)),
        },
        None => None,
    };

    match type_value {
        Some(Type::Double) => Ok(KindIndex::Double),
        Some(Type::Float) => Ok(KindIndex::Float),
        Some(Type::Int32) => Ok(KindIndex::Int32),
        Some(Type::Int64) => Ok(KindIndex::Int64),
        Some(Type::Uint32) => Ok(KindIndex::Uint32),
        Some(Type::Uint64) => Ok(KindIndex::Uint64),
        Some(Type::Sint32) => Ok(KindIndex::Sint32),
        Some(Type::Sint64) => Ok(KindIndex::Sint64),
        Some(Type::Fixed32) => Ok(KindIndex::Fixed32),
        Some(Type::Fixed64) => Ok(KindIndex::Fixed64),
        Some(Type::Sfixed32) => Ok(KindIndex::Sfixed32),
        Some(Type::Sfixed64) => Ok(KindIndex::Sfixed64),
        Some(Type::Bool) => Ok(KindIndex::Bool),
        Some(Type::String) => Ok(KindIndex::String),
        Some(Type::Bytes) => Ok(KindIndex::Bytes),
        Some(Type::Message) | Some(Type::Enum) | Some(Type::Group) | None => {
            if field.type_name().is_empty() {
                return Err(DescriptorError::invalid_descriptor_structure(format!(
                    "field '{}.{}' has no type",
                    scope,
                    field.name()
                )));
            }
            let def = resolve_type_name(inner, scope, field.type_name())?;
            match (type_value, def.kind) {
                (Some(Type::Group), DefinitionKind::Message(index)) => Ok(KindIndex::Group(index)),
                (Some(Type::Message) | None, DefinitionKind::Message(index)) => {
                    Ok(KindIndex::Message(index))
                }
                (Some(Type::Enum) | None, DefinitionKind::Enum(index)) => {
                    Ok(KindIndex::Enum(index))
                }
                _ => Err(DescriptorError::invalid_descriptor_structure(format!(
                    "'{}' referenced by field '{}.{}' is not a message or enum type",
                    field.type_name(),
                    scope,
                    field.name()
                ))),
            }
        }
    }
}

fn resolve_service_methods(
    inner: &mut RegistryInner,
    file: FileIndex,
    index: u32,
    proto: &ServiceDescriptorProto,
) -> Result<(), DescriptorError> {
    let scope = inner.services[index as usize].id.full_name().to_owned();

    let mut methods = Vec::with_capacity(proto.method.len());
    for method in &proto.method {
        let full_name = join_name(&scope, method.name());
        let input = resolve_message_name(inner, &scope, method.input_type(), &full_name)?;
        let output = resolve_message_name(inner, &scope, method.output_type(), &full_name)?;
        methods.push(MethodDescriptorInner {
            id: Identity::new(file, &full_name, method.name()),
            input,
            output,
        });
    }

    inner.services[index as usize].methods = methods;
    Ok(())
}

fn resolve_message_name(
    inner: &RegistryInner,
    scope: &str,
    name: &str,
    referrer: &str,
) -> Result<MessageIndex, DescriptorError> {
    match resolve_type_name(inner, scope, name)?.kind {
        DefinitionKind::Message(index) => Ok(index),
        _ => Err(DescriptorError::invalid_descriptor_structure(format!(
            "'{}' referenced by '{}' is not a message type",
            name, referrer
        ))),
    }
}

/// Resolves a possibly-relative type name the way protoc does: try the
/// innermost scope first, then each enclosing scope, then the root.
fn resolve_type_name<'a>(
    inner: &'a RegistryInner,
    scope: &str,
    name: &str,
) -> Result<&'a Definition, DescriptorError> {
    if let Some(full_name) = name.strip_prefix('.') {
        return lookup_type(inner, full_name).ok_or_else(|| DescriptorError::type_not_found(name));
    }

    let mut candidate_scope = scope;
    loop {
        let candidate = join_name(candidate_scope, name);
        if let Some(def) = lookup_type(inner, &candidate) {
            return Ok(def);
        }
        match candidate_scope.rsplit_once('.') {
            Some((parent, _)) => candidate_scope = parent,
            None if !candidate_scope.is_empty() => candidate_scope = "",
            None => return Err(DescriptorError::type_not_found(name)),
        }
    }
}

fn lookup_type<'a>(inner: &'a RegistryInner, name: &str) -> Option<&'a Definition> {
    inner.names.get(name).filter(|def| {
        matches!(
            def.kind,
            DefinitionKind::Message(_) | DefinitionKind::Enum(_)
        )
    })
}

fn check_map_entry(inner: &RegistryInner, index: MessageIndex) -> Result<(), DescriptorError> {
    let message = &inner.messages[index as usize];
    if !message.is_map_entry {
        return Ok(());
    }

    let field = |number: u32| {
        message
            .field_numbers
            .get(&number)
            .map(|&i| &message.fields[i as usize])
    };
    let key = field(MAP_ENTRY_KEY_NUMBER);
    let value = field(MAP_ENTRY_VALUE_NUMBER);

    let valid = message.fields.len() == 2
        && key.map_or(false, |f| {
            f.id.name() == "key"
                && f.cardinality == Cardinality::Optional
                && is_valid_map_key_kind(f.kind)
        })
        && value.map_or(false, |f| {
            f.id.name() == "value" && f.cardinality == Cardinality::Optional
        });
    if valid {
        Ok(())
    } else {
        Err(DescriptorError::invalid_descriptor_structure(format!(
            "the map entry message '{}' is invalid",
            message.id.full_name()
        )))
    }
}

fn is_valid_map_key_kind(kind: KindIndex) -> bool {
    matches!(
        kind,
        KindIndex::Int32
            | KindIndex::Int64
            | KindIndex::Uint32
            | KindIndex::Uint64
            | KindIndex::Sint32
            | KindIndex::Sint64
            | KindIndex::Fixed32
            | KindIndex::Fixed64
            | KindIndex::Sfixed32
            | KindIndex::Sfixed64
            | KindIndex::Bool
            | KindIndex::String
    )
}

fn join_name(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_owned()
    } else {
        format!("{}.{}", namespace, name)
    }
}

fn to_json_name(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut uppercase_next = false;

    for ch in name.chars() {
        if ch == '_' {
            uppercase_next = true
        } else if uppercase_next {
            result.push(ch.to_ascii_uppercase());
            uppercase_next = false;
        } else {
            result.push(ch);
        }
    }

    result
}
