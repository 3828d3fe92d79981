use std::{
    collections::{BTreeSet, HashSet},
    fmt,
    sync::{Arc, PoisonError, RwLock},
};

use prost::{bytes::Buf, Message};
use prost_types::{FileDescriptorProto, FileDescriptorSet};

use crate::descriptor::{
    build, DefinitionKind, DescriptorError, EnumDescriptor, FieldDescriptor, FileDescriptor,
    KindIndex, MessageDescriptor, MessageIndex, RegistryInner, RegistryRef, ServiceDescriptor,
};

/// A process-level index of protobuf descriptors, keyed by fully-qualified
/// name.
///
/// Files enter the registry as [`FileDescriptorProto`] values (typically
/// produced by the protobuf compiler with `--descriptor_set_out`); every
/// message, field, enum, enum value, service and method they transitively
/// contain is indexed under its fully-qualified name. Descriptors handed out
/// by lookups are cheap handles into an immutable snapshot of the registry,
/// so they remain valid when the registry is later mutated; only fresh
/// lookups observe registration and removal.
///
/// All methods take `&self`: any number of threads may read concurrently,
/// and mutations swap in a fully-built replacement snapshot, so a concurrent
/// reader sees the registry either before or after a mutation, never in
/// between.
pub struct TypeRegistry {
    inner: RwLock<Arc<RegistryInner>>,
}

impl TypeRegistry {
    /// Creates a new, empty `TypeRegistry`.
    pub fn new() -> Self {
        TypeRegistry {
            inner: RwLock::new(Arc::new(RegistryInner::default())),
        }
    }

    /// Creates a `TypeRegistry` pre-populated with descriptors for the
    /// well-known types (`google.protobuf.Any`, `Timestamp`, `Duration`,
    /// `Empty`, `FieldMask`, `Struct`, the wrapper messages) and the
    /// descriptor-proto self-description file.
    pub fn with_well_known_types() -> Self {
        let registry = TypeRegistry::new();
        registry
            .register_file_descriptor_set(crate::wkt::file_descriptor_set())
            .expect("well-known type descriptors are valid");
        registry
    }

    fn snapshot(&self) -> RegistryRef {
        RegistryRef(
            self.inner
                .read()
                .unwrap_or_else(PoisonError::into_inner)
                .clone(),
        )
    }

    /// Registers a single file, indexing every descriptor it transitively
    /// owns, and returns a descriptor for it.
    ///
    /// All types referenced by the file must be defined either in the file
    /// itself or in a file registered earlier.
    ///
    /// # Errors
    ///
    /// Fails if a file with the same name is already registered, if any
    /// contained fully-qualified name collides with a registered symbol, if a
    /// type reference cannot be resolved, or if the descriptor is
    /// structurally invalid (bad field numbers, malformed map entries, enum
    /// aliasing without `allow_alias`). On error the registry is unchanged.
    pub fn register_file_descriptor_proto(
        &self,
        file: FileDescriptorProto,
    ) -> Result<FileDescriptor, DescriptorError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = (**guard).clone();
        let index = build::build_file(&mut next, file)?;
        let next = Arc::new(next);
        *guard = next.clone();
        Ok(FileDescriptor::new(RegistryRef(next), index))
    }

    /// Registers every file of a [`FileDescriptorSet`], in order.
    ///
    /// The whole set is registered atomically: if any file fails, the
    /// registry is unchanged.
    pub fn register_file_descriptor_set(
        &self,
        file_descriptor_set: FileDescriptorSet,
    ) -> Result<(), DescriptorError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = (**guard).clone();
        build::build_files(&mut next, file_descriptor_set.file)?;
        *guard = Arc::new(next);
        Ok(())
    }

    /// Decodes a [`FileDescriptorSet`] from its binary form and registers
    /// every file it contains.
    pub fn register_encoded_file_descriptor_set<B>(&self, bytes: B) -> Result<(), DescriptorError>
    where
        B: Buf,
    {
        let file_descriptor_set = FileDescriptorSet::decode(bytes)
            .map_err(DescriptorError::decode_file_descriptor_set)?;
        self.register_file_descriptor_set(file_descriptor_set)
    }

    /// Gets a file descriptor by its name, or `None` if no such file is
    /// registered.
    pub fn find_file(&self, name: &str) -> Option<FileDescriptor> {
        let registry = self.snapshot();
        let index = *registry.file_names.get(name)?;
        Some(FileDescriptor::new(registry, index))
    }

    /// Gets a [`MessageDescriptor`] by its fully-qualified name, for example
    /// `my.package.MyMessage`.
    pub fn find_message(&self, full_name: &str) -> Option<MessageDescriptor> {
        let registry = self.snapshot();
        match registry.get_by_name(full_name)?.kind {
            DefinitionKind::Message(index) => Some(MessageDescriptor::new(registry, index)),
            _ => None,
        }
    }

    /// Gets an [`EnumDescriptor`] by its fully-qualified name, for example
    /// `my.package.MyEnum`.
    pub fn find_enum(&self, full_name: &str) -> Option<EnumDescriptor> {
        let registry = self.snapshot();
        match registry.get_by_name(full_name)?.kind {
            DefinitionKind::Enum(index) => Some(EnumDescriptor::new(registry, index)),
            _ => None,
        }
    }

    /// Gets a [`ServiceDescriptor`] by its fully-qualified name, for example
    /// `my.package.MyService`.
    pub fn find_service(&self, full_name: &str) -> Option<ServiceDescriptor> {
        let registry = self.snapshot();
        match registry.get_by_name(full_name)?.kind {
            DefinitionKind::Service(index) => Some(ServiceDescriptor::new(registry, index)),
            _ => None,
        }
    }

    /// Gets a [`FieldDescriptor`] by its fully-qualified name, for example
    /// `my.package.MyMessage.my_field`.
    pub fn find_field(&self, full_name: &str) -> Option<FieldDescriptor> {
        let registry = self.snapshot();
        match registry.get_by_name(full_name)?.kind {
            DefinitionKind::Field(message, field) => Some(FieldDescriptor::new(
                MessageDescriptor::new(registry, message),
                field,
            )),
            _ => None,
        }
    }

    /// Gets the [`FileDescriptor`] of the file that defines the given
    /// fully-qualified symbol, or `None` if the symbol is not registered.
    pub fn find_file_containing_symbol(&self, full_name: &str) -> Option<FileDescriptor> {
        let registry = self.snapshot();
        let file = registry.get_by_name(full_name)?.file;
        Some(FileDescriptor::new(registry, file))
    }

    /// Gets an iterator over all registered files, in registration order.
    pub fn files(&self) -> impl ExactSizeIterator<Item = FileDescriptor> {
        let registry = self.snapshot();
        (0..registry.files.len() as u32).map(move |index| {
            FileDescriptor::new(registry.clone(), index)
        })
    }

    /// Computes the set of fully-qualified names transitively referenced by
    /// the given symbol, excluding the symbol itself.
    ///
    /// References are field types, method input and output types, and nested
    /// types.
    ///
    /// # Errors
    ///
    /// Fails if the root symbol is not registered.
    pub fn resolve_dependencies(&self, full_name: &str) -> Result<BTreeSet<String>, DescriptorError> {
        let registry = self.snapshot();
        let root = full_name.strip_prefix('.').unwrap_or(full_name);
        let def = registry
            .names
            .get(root)
            .ok_or_else(|| DescriptorError::type_not_found(full_name))?;

        let mut result = BTreeSet::new();
        let mut stack: Vec<MessageIndex> = Vec::new();
        match def.kind {
            DefinitionKind::Message(index) => stack.push(index),
            DefinitionKind::Enum(_) | DefinitionKind::EnumValue(_, _) => {}
            DefinitionKind::Field(message, field) => {
                push_field_target(&registry, &mut result, &mut stack, {
                    registry.messages[message as usize].fields[field as usize].kind
                });
            }
            DefinitionKind::Service(index) => {
                for method in &registry.services[index as usize].methods {
                    stack.push(method.input);
                    stack.push(method.output);
                }
            }
            DefinitionKind::Method(service, method) => {
                let method = &registry.services[service as usize].methods[method as usize];
                stack.push(method.input);
                stack.push(method.output);
            }
            DefinitionKind::Package => {
                return Err(DescriptorError::type_not_found(full_name))
            }
        }

        let mut seen = HashSet::new();
        while let Some(index) = stack.pop() {
            if !seen.insert(index) {
                continue;
            }
            let message = &registry.messages[index as usize];
            result.insert(message.id.full_name().to_owned());
            for field in &message.fields {
                push_field_target(&registry, &mut result, &mut stack, field.kind);
            }
            stack.extend(message.nested_messages.iter().copied());
            for &nested in &message.nested_enums {
                result.insert(registry.enums[nested as usize].id.full_name().to_owned());
            }
        }

        result.remove(root);
        Ok(result)
    }

    /// Removes a file and every symbol it owns, returning whether a file with
    /// the given name was registered.
    ///
    /// The removal is transactional: the surviving files are rebuilt into a
    /// fresh snapshot, and if one of them references a symbol owned by the
    /// removed file the call fails and the registry is unchanged.
    /// Descriptors and messages created before the removal keep working; only
    /// fresh lookups observe it.
    pub fn remove_file(&self, name: &str) -> Result<bool, DescriptorError> {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        if !guard.file_names.contains_key(name) {
            return Ok(false);
        }

        let survivors: Vec<FileDescriptorProto> = guard
            .files
            .iter()
            .filter(|file| file.raw.name() != name)
            .map(|file| file.raw.clone())
            .collect();

        let mut next = RegistryInner::default();
        build::build_files(&mut next, survivors)?;
        *guard = Arc::new(next);
        Ok(true)
    }

    /// Removes every registered file and symbol.
    pub fn clear(&self) {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        *guard = Arc::new(RegistryInner::default());
    }
}

fn push_field_target(
    registry: &RegistryRef,
    result: &mut BTreeSet<String>,
    stack: &mut Vec<MessageIndex>,
    kind: KindIndex,
) {
    match kind {
        KindIndex::Message(index) | KindIndex::Group(index) => stack.push(index),
        KindIndex::Enum(index) => {
            result.insert(registry.enums[index as usize].id.full_name().to_owned());
        }
        _ => {}
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        TypeRegistry::new()
    }
}

impl fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.snapshot();
        f.debug_struct("TypeRegistry")
            .field(
                "files",
                &registry
                    .files
                    .iter()
                    .map(|file| file.raw.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}
