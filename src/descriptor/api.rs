use std::fmt;

use prost::{bytes::BufMut, encoding::WireType, EncodeError, Message};
use prost_types::{
    DescriptorProto, EnumDescriptorProto, FieldDescriptorProto, FileDescriptorProto,
    MethodDescriptorProto, ServiceDescriptorProto,
};

use crate::descriptor::{
    Cardinality, EnumDescriptor, EnumDescriptorInner, EnumValueDescriptor,
    EnumValueDescriptorInner, FieldDescriptor, FieldDescriptorInner, FileDescriptor,
    FileDescriptorInner, Kind, KindIndex, MessageDescriptor,
    MessageDescriptorInner, MethodDescriptor, MethodDescriptorInner, RegistryRef,
    ServiceDescriptor, ServiceDescriptorInner, Syntax, MAP_ENTRY_KEY_NUMBER,
    MAP_ENTRY_VALUE_NUMBER,
};

impl fmt::Debug for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Syntax::Proto2 => write!(f, "proto2"),
            Syntax::Proto3 => write!(f, "proto3"),
        }
    }
}

impl Kind {
    pub(crate) fn new(registry: &RegistryRef, kind: KindIndex) -> Self {
        match kind {
            KindIndex::Double => Kind::Double,
            KindIndex::Float => Kind::Float,
            KindIndex::Int32 => Kind::Int32,
            KindIndex::Int64 => Kind::Int64,
            KindIndex::Uint32 => Kind::Uint32,
            KindIndex::Uint64 => Kind::Uint64,
            KindIndex::Sint32 => Kind::Sint32,
            KindIndex::Sint64 => Kind::Sint64,
            KindIndex::Fixed32 => Kind::Fixed32,
            KindIndex::Fixed64 => Kind::Fixed64,
            KindIndex::Sfixed32 => Kind::Sfixed32,
            KindIndex::Sfixed64 => Kind::Sfixed64,
            KindIndex::Bool => Kind::Bool,
            KindIndex::String => Kind::String,
            KindIndex::Bytes => Kind::Bytes,
            KindIndex::Message(index) | KindIndex::Group(index) => {
                Kind::Message(MessageDescriptor::new(registry.clone(), index))
            }
            KindIndex::Enum(index) => Kind::Enum(EnumDescriptor::new(registry.clone(), index)),
        }
    }

    /// Gets a reference to the [`MessageDescriptor`] if this is a message type,
    /// or `None` otherwise.
    pub fn as_message(&self) -> Option<&MessageDescriptor> {
        match self {
            Kind::Message(desc) => Some(desc),
            _ => None,
        }
    }

    /// Gets a reference to the [`EnumDescriptor`] if this is an enum type,
    /// or `None` otherwise.
    pub fn as_enum(&self) -> Option<&EnumDescriptor> {
        match self {
            Kind::Enum(desc) => Some(desc),
            _ => None,
        }
    }

    /// Returns the [`WireType`] used to encode this type.
    ///
    /// [`Kind::Message`] returns [`WireType::LengthDelimited`]; the legacy
    /// group encoding is selected by the field, not the type.
    pub fn wire_type(&self) -> WireType {
        match self {
            Kind::Double | Kind::Fixed64 | Kind::Sfixed64 => WireType::SixtyFourBit,
            Kind::Float | Kind::Fixed32 | Kind::Sfixed32 => WireType::ThirtyTwoBit,
            Kind::Enum(_)
            | Kind::Int32
            | Kind::Int64
            | Kind::Uint32
            | Kind::Uint64
            | Kind::Sint32
            | Kind::Sint64
            | Kind::Bool => WireType::Varint,
            Kind::String | Kind::Bytes | Kind::Message(_) => WireType::LengthDelimited,
        }
    }
}

impl fmt::Debug for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Double => write!(f, "double"),
            Self::Float => write!(f, "float"),
            Self::Int32 => write!(f, "int32"),
            Self::Int64 => write!(f, "int64"),
            Self::Uint32 => write!(f, "uint32"),
            Self::Uint64 => write!(f, "uint64"),
            Self::Sint32 => write!(f, "sint32"),
            Self::Sint64 => write!(f, "sint64"),
            Self::Fixed32 => write!(f, "fixed32"),
            Self::Fixed64 => write!(f, "fixed64"),
            Self::Sfixed32 => write!(f, "sfixed32"),
            Self::Sfixed64 => write!(f, "sfixed64"),
            Self::Bool => write!(f, "bool"),
            Self::String => write!(f, "string"),
            Self::Bytes => write!(f, "bytes"),
            Self::Message(m) => write!(f, "{}", m.full_name()),
            Self::Enum(e) => write!(f, "{}", e.full_name()),
        }
    }
}

impl FileDescriptor {
    pub(crate) fn new(registry: RegistryRef, index: u32) -> Self {
        FileDescriptor { registry, index }
    }

    /// Gets the unique name of this file relative to the root of the source
    /// tree, e.g. `path/to/my_package.proto`.
    pub fn name(&self) -> &str {
        self.inner().raw.name()
    }

    /// Gets the name of the package specifier for the file, e.g. `my.package`.
    ///
    /// If no package name is set, an empty string is returned.
    pub fn package_name(&self) -> &str {
        self.inner().raw.package()
    }

    /// Gets the syntax of this protobuf file.
    pub fn syntax(&self) -> Syntax {
        self.inner().syntax
    }

    /// Gets the names of the files this file declares a dependency on.
    ///
    /// The list is informational; symbol resolution goes through the registry.
    pub fn dependencies(&self) -> impl ExactSizeIterator<Item = &str> + '_ {
        self.inner().raw.dependency.iter().map(|name| name.as_str())
    }

    /// Gets the top-level message types defined within this file.
    ///
    /// This does not include nested messages defined within another message.
    pub fn messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        self.inner()
            .messages
            .iter()
            .map(|&index| MessageDescriptor::new(self.registry.clone(), index))
    }

    /// Gets the top-level enum types defined within this file.
    pub fn enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        self.inner()
            .enums
            .iter()
            .map(|&index| EnumDescriptor::new(self.registry.clone(), index))
    }

    /// Gets the services defined within this file.
    pub fn services(&self) -> impl ExactSizeIterator<Item = ServiceDescriptor> + '_ {
        self.inner()
            .services
            .iter()
            .map(|&index| ServiceDescriptor::new(self.registry.clone(), index))
    }

    /// Gets a reference to the raw [`FileDescriptorProto`] this file was
    /// registered from.
    pub fn file_descriptor_proto(&self) -> &FileDescriptorProto {
        &self.inner().raw
    }

    /// Encodes this file descriptor to its canonical byte representation.
    pub fn encode<B>(&self, buf: B) -> Result<(), EncodeError>
    where
        B: BufMut,
    {
        let mut buf = buf;
        self.inner().raw.encode(&mut buf)
    }

    /// Encodes this file descriptor to a newly allocated buffer.
    pub fn encode_to_vec(&self) -> Vec<u8> {
        self.inner().raw.encode_to_vec()
    }

    fn inner(&self) -> &FileDescriptorInner {
        &self.registry.files[self.index as usize]
    }
}

impl fmt::Debug for FileDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileDescriptor")
            .field("name", &self.name())
            .field("package_name", &self.package_name())
            .finish()
    }
}

impl MessageDescriptor {
    pub(crate) fn new(registry: RegistryRef, index: u32) -> Self {
        MessageDescriptor { registry, index }
    }

    /// Gets the [`FileDescriptor`] this message is defined in.
    pub fn parent_file(&self) -> FileDescriptor {
        FileDescriptor::new(self.registry.clone(), self.inner().id.file)
    }

    /// Gets the parent message type if this message type is nested inside
    /// another message, or `None` otherwise.
    pub fn parent_message(&self) -> Option<MessageDescriptor> {
        self.inner()
            .parent
            .map(|index| MessageDescriptor::new(self.registry.clone(), index))
    }

    /// Gets the short name of the message type, e.g. `MyMessage`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// Gets the full name of the message type, e.g. `my.package.MyMessage`.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets the name of the package this message type is defined in, e.g.
    /// `my.package`, or an empty string for files without a package.
    pub fn package_name(&self) -> &str {
        self.raw_file().package()
    }

    /// Gets an iterator yielding a [`FieldDescriptor`] for each field defined
    /// in this message, in declaration order.
    pub fn fields(&self) -> impl ExactSizeIterator<Item = FieldDescriptor> + '_ {
        (0..self.inner().fields.len()).map(|index| FieldDescriptor {
            message: self.clone(),
            index: index as u32,
        })
    }

    /// Gets a [`FieldDescriptor`] with the given number, or `None` if no such
    /// field exists.
    pub fn get_field(&self, number: u32) -> Option<FieldDescriptor> {
        self.inner()
            .field_numbers
            .get(&number)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Gets a [`FieldDescriptor`] with the given name, or `None` if no such
    /// field exists.
    pub fn get_field_by_name(&self, name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_names
            .get(name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Gets a [`FieldDescriptor`] with the given JSON name, or `None` if no
    /// such field exists.
    pub fn get_field_by_json_name(&self, json_name: &str) -> Option<FieldDescriptor> {
        self.inner()
            .field_json_names
            .get(json_name)
            .map(|&index| FieldDescriptor {
                message: self.clone(),
                index,
            })
    }

    /// Gets the nested message types defined within this message.
    pub fn child_messages(&self) -> impl ExactSizeIterator<Item = MessageDescriptor> + '_ {
        self.inner()
            .nested_messages
            .iter()
            .map(|&index| MessageDescriptor::new(self.registry.clone(), index))
    }

    /// Gets the nested enum types defined within this message.
    pub fn child_enums(&self) -> impl ExactSizeIterator<Item = EnumDescriptor> + '_ {
        self.inner()
            .nested_enums
            .iter()
            .map(|&index| EnumDescriptor::new(self.registry.clone(), index))
    }

    /// Returns `true` if this message is the synthetic two-field entry type
    /// generated for a map field.
    ///
    /// Entry types always carry a `key` field numbered 1 and a `value` field
    /// numbered 2; [`map_entry_key_field`][Self::map_entry_key_field] and
    /// [`map_entry_value_field`][Self::map_entry_value_field] retrieve them
    /// directly.
    pub fn is_map_entry(&self) -> bool {
        self.inner().is_map_entry
    }

    /// The `key` field of a map entry type.
    ///
    /// # Panics
    ///
    /// Panics if this message is not a [map entry](Self::is_map_entry).
    pub fn map_entry_key_field(&self) -> FieldDescriptor {
        self.entry_field(MAP_ENTRY_KEY_NUMBER)
    }

    /// The `value` field of a map entry type.
    ///
    /// # Panics
    ///
    /// Panics if this message is not a [map entry](Self::is_map_entry).
    pub fn map_entry_value_field(&self) -> FieldDescriptor {
        self.entry_field(MAP_ENTRY_VALUE_NUMBER)
    }

    fn entry_field(&self, number: u32) -> FieldDescriptor {
        assert!(
            self.is_map_entry(),
            "'{}' is not a map entry type",
            self.full_name()
        );
        self.get_field(number)
            .expect("map entry shape is checked at registration")
    }

    /// Gets a reference to the raw [`DescriptorProto`] this message was
    /// registered from.
    pub fn descriptor_proto(&self) -> &DescriptorProto {
        find_message_proto(self.raw_file(), &self.inner().proto_path)
    }

    pub(crate) fn registry(&self) -> &RegistryRef {
        &self.registry
    }

    pub(crate) fn index(&self) -> u32 {
        self.index
    }

    fn raw_file(&self) -> &FileDescriptorProto {
        &self.registry.files[self.inner().id.file as usize].raw
    }

    fn inner(&self) -> &MessageDescriptorInner {
        &self.registry.messages[self.index as usize]
    }
}

impl fmt::Debug for MessageDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageDescriptor")
            .field("full_name", &self.full_name())
            .field("is_map_entry", &self.is_map_entry())
            .finish()
    }
}

impl FieldDescriptor {
    pub(crate) fn new(message: MessageDescriptor, index: u32) -> Self {
        FieldDescriptor { message, index }
    }

    /// Gets a reference to the [`MessageDescriptor`] this field belongs to.
    pub fn parent_message(&self) -> &MessageDescriptor {
        &self.message
    }

    /// Gets the short name of the field, e.g. `my_field`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// Gets the full name of the field, e.g. `my.package.MyMessage.my_field`.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets the unique number for this field within its message.
    pub fn number(&self) -> u32 {
        self.inner().number
    }

    /// Gets the name used for JSON serialization.
    ///
    /// This is usually the camel-cased form of the field name.
    pub fn json_name(&self) -> &str {
        &self.inner().json_name
    }

    /// Gets the [`Kind`] of this field.
    pub fn kind(&self) -> Kind {
        Kind::new(self.message.registry(), self.inner().kind)
    }

    /// The cardinality of this field.
    pub fn cardinality(&self) -> Cardinality {
        self.inner().cardinality
    }

    /// Whether values of this field are carried as a list.
    ///
    /// True for `repeated` fields that are not maps. A map field is also
    /// repeated on the wire, so code dispatching on a field's shape must
    /// test [`is_map`][Self::is_map] first.
    pub fn is_list(&self) -> bool {
        self.cardinality() == Cardinality::Repeated && !self.is_map()
    }

    /// Whether values of this field are carried as a map.
    ///
    /// True when the field is `repeated` and its type is a
    /// [map entry](MessageDescriptor::is_map_entry) message.
    pub fn is_map(&self) -> bool {
        if self.cardinality() != Cardinality::Repeated {
            return false;
        }
        match self.inner().kind {
            KindIndex::Message(index) => {
                self.message.registry().messages[index as usize].is_map_entry
            }
            _ => false,
        }
    }

    /// Whether a repeated field of this type is written as a single
    /// length-delimited record rather than one tagged record per element.
    pub fn is_packed(&self) -> bool {
        self.inner().is_packed
    }

    /// Whether the elements of this field can use packed encoding: all
    /// numeric, bool and enum types.
    pub fn is_packable(&self) -> bool {
        self.inner().kind.is_packable()
    }

    /// Whether this field is encoded using the legacy proto2 group encoding.
    pub fn is_group(&self) -> bool {
        matches!(self.inner().kind, KindIndex::Group(_))
    }

    /// Gets a reference to the raw [`FieldDescriptorProto`] this field was
    /// registered from.
    pub fn field_descriptor_proto(&self) -> &FieldDescriptorProto {
        &self.message.descriptor_proto().field[self.index as usize]
    }

    fn inner(&self) -> &FieldDescriptorInner {
        &self.message.registry().messages[self.message.index() as usize].fields
            [self.index as usize]
    }
}

impl fmt::Debug for FieldDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("full_name", &self.full_name())
            .field("number", &self.number())
            .field("kind", &self.inner().kind)
            .field("cardinality", &self.cardinality())
            .finish()
    }
}

impl EnumDescriptor {
    pub(crate) fn new(registry: RegistryRef, index: u32) -> Self {
        EnumDescriptor { registry, index }
    }

    /// Gets the [`FileDescriptor`] this enum type is defined in.
    pub fn parent_file(&self) -> FileDescriptor {
        FileDescriptor::new(self.registry.clone(), self.inner().id.file)
    }

    /// Gets the parent message type if this enum is nested inside a message,
    /// or `None` otherwise.
    pub fn parent_message(&self) -> Option<MessageDescriptor> {
        self.inner()
            .parent
            .map(|index| MessageDescriptor::new(self.registry.clone(), index))
    }

    /// Gets the short name of the enum type, e.g. `MyEnum`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// Gets the full name of the enum, e.g. `my.package.MyEnum`.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Whether values of this enum may share a number.
    pub fn allow_alias(&self) -> bool {
        self.inner().allow_alias
    }

    /// Gets the default value for the enum type: its first declared value.
    pub fn default_value(&self) -> EnumValueDescriptor {
        EnumValueDescriptor {
            parent: self.clone(),
            index: 0,
        }
    }

    /// Gets a [`EnumValueDescriptor`] for the enum value with the given name,
    /// or `None` if no such value exists.
    pub fn get_value_by_name(&self, name: &str) -> Option<EnumValueDescriptor> {
        self.inner()
            .value_names
            .get(name)
            .map(|&index| EnumValueDescriptor {
                parent: self.clone(),
                index,
            })
    }

    /// Gets a [`EnumValueDescriptor`] for the enum value with the given
    /// number, or `None` if no such value exists.
    ///
    /// If the enum allows aliases, the first value declared with the number
    /// is returned.
    pub fn get_value(&self, number: i32) -> Option<EnumValueDescriptor> {
        let values = &self.inner().value_numbers;
        let index = values.partition_point(|&(n, _)| n < number);
        match values.get(index) {
            Some(&(n, value_index)) if n == number => Some(EnumValueDescriptor {
                parent: self.clone(),
                index: value_index,
            }),
            _ => None,
        }
    }

    /// Gets an iterator yielding a [`EnumValueDescriptor`] for each value in
    /// this enum, in declaration order.
    pub fn values(&self) -> impl ExactSizeIterator<Item = EnumValueDescriptor> + '_ {
        (0..self.inner().values.len()).map(|index| EnumValueDescriptor {
            parent: self.clone(),
            index: index as u32,
        })
    }

    /// Gets a reference to the raw [`EnumDescriptorProto`] this enum was
    /// registered from.
    pub fn enum_descriptor_proto(&self) -> &EnumDescriptorProto {
        let inner = self.inner();
        let raw_file = &self.registry.files[inner.id.file as usize].raw;
        match inner.parent {
            Some(parent) => {
                let parent = &self.registry.messages[parent as usize];
                &find_message_proto(raw_file, &parent.proto_path).enum_type
                    [inner.proto_index as usize]
            }
            None => &raw_file.enum_type[inner.proto_index as usize],
        }
    }

    fn inner(&self) -> &EnumDescriptorInner {
        &self.registry.enums[self.index as usize]
    }
}

impl fmt::Debug for EnumDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl EnumValueDescriptor {
    /// Gets a reference to the [`EnumDescriptor`] this enum value is defined
    /// in.
    pub fn parent_enum(&self) -> &EnumDescriptor {
        &self.parent
    }

    /// Gets the short name of the enum value, e.g. `MY_VALUE`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// Gets the full name of the enum value, e.g. `my.package.MY_VALUE`.
    ///
    /// Enum values are scoped to the namespace enclosing the enum itself.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets the number representing this enum value.
    pub fn number(&self) -> i32 {
        self.inner().number
    }

    fn inner(&self) -> &EnumValueDescriptorInner {
        &self.parent.registry.enums[self.parent.index as usize].values[self.index as usize]
    }
}

impl fmt::Debug for EnumValueDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EnumValueDescriptor")
            .field("full_name", &self.full_name())
            .field("number", &self.number())
            .finish()
    }
}

impl ServiceDescriptor {
    pub(crate) fn new(registry: RegistryRef, index: u32) -> Self {
        ServiceDescriptor { registry, index }
    }

    /// Gets the [`FileDescriptor`] this service is defined in.
    pub fn parent_file(&self) -> FileDescriptor {
        FileDescriptor::new(self.registry.clone(), self.inner().id.file)
    }

    /// Gets the short name of the service, e.g. `MyService`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// Gets the full name of the service, e.g. `my.package.MyService`.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets an iterator yielding a [`MethodDescriptor`] for each method
    /// defined in this service, in declaration order.
    pub fn methods(&self) -> impl ExactSizeIterator<Item = MethodDescriptor> + '_ {
        (0..self.inner().methods.len()).map(|index| MethodDescriptor {
            service: self.clone(),
            index: index as u32,
        })
    }

    /// Gets a reference to the raw [`ServiceDescriptorProto`] this service
    /// was registered from.
    pub fn service_descriptor_proto(&self) -> &ServiceDescriptorProto {
        let inner = self.inner();
        &self.registry.files[inner.id.file as usize].raw.service[inner.proto_index as usize]
    }

    fn inner(&self) -> &ServiceDescriptorInner {
        &self.registry.services[self.index as usize]
    }
}

impl fmt::Debug for ServiceDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

impl MethodDescriptor {
    /// Gets a reference to the [`ServiceDescriptor`] this method is defined
    /// in.
    pub fn parent_service(&self) -> &ServiceDescriptor {
        &self.service
    }

    /// Gets the short name of the method, e.g. `my_method`.
    pub fn name(&self) -> &str {
        self.inner().id.name()
    }

    /// Gets the full name of the method, e.g. `my.package.MyService.my_method`.
    pub fn full_name(&self) -> &str {
        self.inner().id.full_name()
    }

    /// Gets the [`MessageDescriptor`] for the input type of this method.
    pub fn input(&self) -> MessageDescriptor {
        MessageDescriptor::new(self.service.registry.clone(), self.inner().input)
    }

    /// Gets the [`MessageDescriptor`] for the output type of this method.
    pub fn output(&self) -> MessageDescriptor {
        MessageDescriptor::new(self.service.registry.clone(), self.inner().output)
    }

    /// Whether the client streams multiple messages.
    pub fn is_client_streaming(&self) -> bool {
        self.method_descriptor_proto().client_streaming()
    }

    /// Whether the server streams multiple messages.
    pub fn is_server_streaming(&self) -> bool {
        self.method_descriptor_proto().server_streaming()
    }

    /// Gets a reference to the raw [`MethodDescriptorProto`] this method was
    /// registered from.
    pub fn method_descriptor_proto(&self) -> &MethodDescriptorProto {
        &self.service.service_descriptor_proto().method[self.index as usize]
    }

    fn inner(&self) -> &MethodDescriptorInner {
        &self.service.registry.services[self.service.index as usize].methods[self.index as usize]
    }
}

impl fmt::Debug for MethodDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MethodDescriptor")
            .field("full_name", &self.full_name())
            .finish()
    }
}

/// Walks a chain of `message_type` / `nested_type` indices to the proto a
/// message was built from.
fn find_message_proto<'a>(file: &'a FileDescriptorProto, path: &[u32]) -> &'a DescriptorProto {
    debug_assert!(!path.is_empty());
    let mut message = &file.message_type[path[0] as usize];
    for &part in &path[1..] {
        message = &message.nested_type[part as usize];
    }
    message
}
