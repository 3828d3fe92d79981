mod api;
pub(crate) mod build;
mod error;

pub use self::error::DescriptorError;

use std::{collections::HashMap, fmt, ops::Range, sync::Arc};

use prost_types::FileDescriptorProto;

pub(crate) const MAP_ENTRY_KEY_NUMBER: u32 = 1;
pub(crate) const MAP_ENTRY_VALUE_NUMBER: u32 = 2;

pub(crate) const RESERVED_MESSAGE_FIELD_NUMBERS: Range<i32> = 19_000..20_000;
pub(crate) const VALID_MESSAGE_FIELD_NUMBERS: Range<i32> = 1..536_870_912;

/// Cardinality determines whether a field is optional, required, or repeated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Cardinality {
    /// The field appears zero or one times.
    Optional,
    /// The field appears exactly one time. This cardinality is invalid with Proto3.
    Required,
    /// The field appears zero or more times.
    Repeated,
}

/// The syntax of a proto file.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// The `proto2` syntax.
    Proto2,
    /// The `proto3` syntax.
    Proto3,
}

/// The type of a protobuf message field.
#[derive(Clone, PartialEq, Eq)]
pub enum Kind {
    /// The protobuf `double` type.
    Double,
    /// The protobuf `float` type.
    Float,
    /// The protobuf `int32` type.
    Int32,
    /// The protobuf `int64` type.
    Int64,
    /// The protobuf `uint32` type.
    Uint32,
    /// The protobuf `uint64` type.
    Uint64,
    /// The protobuf `sint32` type.
    Sint32,
    /// The protobuf `sint64` type.
    Sint64,
    /// The protobuf `fixed32` type.
    Fixed32,
    /// The protobuf `fixed64` type.
    Fixed64,
    /// The protobuf `sfixed32` type.
    Sfixed32,
    /// The protobuf `sfixed64` type.
    Sfixed64,
    /// The protobuf `bool` type.
    Bool,
    /// The protobuf `string` type.
    String,
    /// The protobuf `bytes` type.
    Bytes,
    /// A protobuf message type.
    Message(MessageDescriptor),
    /// A protobuf enum type.
    Enum(EnumDescriptor),
}

#[derive(Copy, Clone)]
pub(crate) enum KindIndex {
    Double,
    Float,
    Int32,
    Int64,
    Uint32,
    Uint64,
    Sint32,
    Sint64,
    Fixed32,
    Fixed64,
    Sfixed32,
    Sfixed64,
    Bool,
    String,
    Bytes,
    Message(MessageIndex),
    Enum(EnumIndex),
    Group(MessageIndex),
}

type DescriptorIndex = u32;
pub(crate) type FileIndex = DescriptorIndex;
pub(crate) type MessageIndex = DescriptorIndex;
pub(crate) type FieldIndex = DescriptorIndex;
pub(crate) type EnumIndex = DescriptorIndex;
pub(crate) type EnumValueIndex = DescriptorIndex;
pub(crate) type ServiceIndex = DescriptorIndex;
pub(crate) type MethodIndex = DescriptorIndex;

/// An immutable snapshot of every descriptor known to a
/// [`TypeRegistry`][crate::TypeRegistry] at some point in time.
///
/// Descriptor handles keep the snapshot they were created from alive, so they
/// remain usable after the registry moves on (for example after the owning
/// file is removed).
#[derive(Clone, Default)]
pub(crate) struct RegistryInner {
    pub(crate) names: HashMap<Box<str>, Definition>,
    pub(crate) file_names: HashMap<Box<str>, FileIndex>,
    pub(crate) files: Vec<FileDescriptorInner>,
    pub(crate) messages: Vec<MessageDescriptorInner>,
    pub(crate) enums: Vec<EnumDescriptorInner>,
    pub(crate) services: Vec<ServiceDescriptorInner>,
}

/// A cheaply cloneable reference to a registry snapshot, compared by identity.
#[derive(Clone)]
pub(crate) struct RegistryRef(pub(crate) Arc<RegistryInner>);

#[derive(Clone, Debug)]
pub(crate) struct Definition {
    pub(crate) file: FileIndex,
    pub(crate) kind: DefinitionKind,
}

#[derive(Copy, Clone, Debug)]
pub(crate) enum DefinitionKind {
    Package,
    Message(MessageIndex),
    Field(MessageIndex, FieldIndex),
    Enum(EnumIndex),
    EnumValue(EnumIndex, EnumValueIndex),
    Service(ServiceIndex),
    Method(ServiceIndex, MethodIndex),
}

/// A single source file containing protobuf messages and services.
#[derive(Clone, PartialEq, Eq)]
pub struct FileDescriptor {
    registry: RegistryRef,
    index: FileIndex,
}

#[derive(Clone)]
pub(crate) struct FileDescriptorInner {
    pub(crate) syntax: Syntax,
    pub(crate) raw: FileDescriptorProto,
    pub(crate) messages: Vec<MessageIndex>,
    pub(crate) enums: Vec<EnumIndex>,
    pub(crate) services: Vec<ServiceIndex>,
}

/// A protobuf message definition.
#[derive(Clone, PartialEq, Eq)]
pub struct MessageDescriptor {
    registry: RegistryRef,
    index: MessageIndex,
}

#[derive(Clone)]
pub(crate) struct MessageDescriptorInner {
    pub(crate) id: Identity,
    pub(crate) parent: Option<MessageIndex>,
    /// Chain of indices into `message_type` then `nested_type` lists of the
    /// owning file's retained proto.
    pub(crate) proto_path: Box<[u32]>,
    pub(crate) fields: Vec<FieldDescriptorInner>,
    pub(crate) field_numbers: HashMap<u32, FieldIndex>,
    pub(crate) field_names: HashMap<Box<str>, FieldIndex>,
    pub(crate) field_json_names: HashMap<Box<str>, FieldIndex>,
    pub(crate) nested_messages: Vec<MessageIndex>,
    pub(crate) nested_enums: Vec<EnumIndex>,
    pub(crate) is_map_entry: bool,
}

/// A field of a protobuf message.
#[derive(Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    message: MessageDescriptor,
    index: FieldIndex,
}

#[derive(Clone)]
pub(crate) struct FieldDescriptorInner {
    pub(crate) id: Identity,
    pub(crate) number: u32,
    pub(crate) json_name: Box<str>,
    pub(crate) kind: KindIndex,
    pub(crate) cardinality: Cardinality,
    pub(crate) is_packed: bool,
}

/// A protobuf enum type.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumDescriptor {
    registry: RegistryRef,
    index: EnumIndex,
}

#[derive(Clone)]
pub(crate) struct EnumDescriptorInner {
    pub(crate) id: Identity,
    pub(crate) parent: Option<MessageIndex>,
    /// Index into the `enum_type` list of the owning file or parent message.
    pub(crate) proto_index: u32,
    pub(crate) values: Vec<EnumValueDescriptorInner>,
    pub(crate) value_numbers: Vec<(i32, EnumValueIndex)>,
    pub(crate) value_names: HashMap<Box<str>, EnumValueIndex>,
    pub(crate) allow_alias: bool,
}

/// A value in a protobuf enum type.
#[derive(Clone, PartialEq, Eq)]
pub struct EnumValueDescriptor {
    parent: EnumDescriptor,
    index: EnumValueIndex,
}

#[derive(Clone)]
pub(crate) struct EnumValueDescriptorInner {
    pub(crate) id: Identity,
    pub(crate) number: i32,
}

/// A protobuf service definition.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceDescriptor {
    registry: RegistryRef,
    index: ServiceIndex,
}

#[derive(Clone)]
pub(crate) struct ServiceDescriptorInner {
    pub(crate) id: Identity,
    pub(crate) proto_index: u32,
    pub(crate) methods: Vec<MethodDescriptorInner>,
}

/// A method definition for a [`ServiceDescriptor`].
#[derive(Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    service: ServiceDescriptor,
    index: MethodIndex,
}

#[derive(Clone)]
pub(crate) struct MethodDescriptorInner {
    pub(crate) id: Identity,
    pub(crate) input: MessageIndex,
    pub(crate) output: MessageIndex,
}

#[derive(Clone)]
pub(crate) struct Identity {
    file: FileIndex,
    full_name: Box<str>,
    name_index: usize,
}

impl Identity {
    pub(crate) fn new(file: FileIndex, full_name: &str, name: &str) -> Identity {
        debug_assert!(full_name.ends_with(name));
        let name_index = full_name.len() - name.len();
        debug_assert!(name_index == 0 || full_name.as_bytes()[name_index - 1] == b'.');
        Identity {
            file,
            full_name: full_name.into(),
            name_index,
        }
    }

    pub(crate) fn full_name(&self) -> &str {
        &self.full_name
    }

    pub(crate) fn name(&self) -> &str {
        &self.full_name[self.name_index..]
    }
}

impl PartialEq for RegistryRef {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for RegistryRef {}

impl std::ops::Deref for RegistryRef {
    type Target = RegistryInner;

    fn deref(&self) -> &RegistryInner {
        &self.0
    }
}

impl KindIndex {
    pub(crate) fn is_packable(&self) -> bool {
        match self {
            KindIndex::Double
            | KindIndex::Float
            | KindIndex::Int32
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
            | KindIndex::Enum(_) => true,
            KindIndex::String | KindIndex::Bytes | KindIndex::Message(_) | KindIndex::Group(_) => {
                false
            }
        }
    }
}

impl fmt::Debug for KindIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KindIndex::Double => write!(f, "double"),
            KindIndex::Float => write!(f, "float"),
            KindIndex::Int32 => write!(f, "int32"),
            KindIndex::Int64 => write!(f, "int64"),
            KindIndex::Uint32 => write!(f, "uint32"),
            KindIndex::Uint64 => write!(f, "uint64"),
            KindIndex::Sint32 => write!(f, "sint32"),
            KindIndex::Sint64 => write!(f, "sint64"),
            KindIndex::Fixed32 => write!(f, "fixed32"),
            KindIndex::Fixed64 => write!(f, "fixed64"),
            KindIndex::Sfixed32 => write!(f, "sfixed32"),
            KindIndex::Sfixed64 => write!(f, "sfixed64"),
            KindIndex::Bool => write!(f, "bool"),
            KindIndex::String => write!(f, "string"),
            KindIndex::Bytes => write!(f, "bytes"),
            KindIndex::Message(_) | KindIndex::Group(_) => write!(f, "message"),
            KindIndex::Enum(_) => write!(f, "enum"),
        }
    }
}

impl RegistryInner {
    pub(crate) fn get_by_name(&self, name: &str) -> Option<&Definition> {
        let name = name.strip_prefix('.').unwrap_or(name);
        self.names.get(name)
    }
}

pub(crate) fn to_index(i: usize) -> DescriptorIndex {
    i.try_into().expect("index too large")
}

#[test]
fn assert_descriptor_send_sync() {
    fn test_send_sync<T: Send + Sync>() {}

    test_send_sync::<FileDescriptor>();
    test_send_sync::<MessageDescriptor>();
    test_send_sync::<Kind>();
    test_send_sync::<DescriptorError>();
}
