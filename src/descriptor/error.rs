use std::fmt;

/// An error that may occur while building descriptors or mutating a
/// [`TypeRegistry`][crate::TypeRegistry].
#[derive(Debug)]
pub struct DescriptorError {
    kind: DescriptorErrorKind,
}

#[derive(Debug)]
enum DescriptorErrorKind {
    DecodeFileDescriptorSet {
        err: prost::DecodeError,
    },
    DuplicateFile {
        name: String,
    },
    DuplicateSymbol {
        name: String,
    },
    TypeNotFound {
        name: String,
    },
    InvalidDescriptorStructure {
        detail: String,
    },
    UnsupportedFieldType {
        value: i32,
    },
}

impl DescriptorError {
    pub(crate) fn decode_file_descriptor_set(err: prost::DecodeError) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DecodeFileDescriptorSet { err },
        }
    }

    pub(crate) fn duplicate_file(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DuplicateFile {
                name: name.to_string(),
            },
        }
    }

    pub(crate) fn duplicate_symbol(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::DuplicateSymbol {
                name: name.to_string(),
            },
        }
    }

    pub(crate) fn type_not_found(name: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::TypeNotFound {
                name: name.to_string(),
            },
        }
    }

    pub(crate) fn invalid_descriptor_structure(detail: impl ToString) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::InvalidDescriptorStructure {
                detail: detail.to_string(),
            },
        }
    }

    pub(crate) fn unsupported_field_type(value: i32) -> Self {
        DescriptorError {
            kind: DescriptorErrorKind::UnsupportedFieldType { value },
        }
    }

    /// Returns `true` if this error was caused by a file or symbol name
    /// colliding with one already present in the registry.
    pub fn is_duplicate(&self) -> bool {
        matches!(
            self.kind,
            DescriptorErrorKind::DuplicateFile { .. } | DescriptorErrorKind::DuplicateSymbol { .. }
        )
    }

    /// Returns `true` if this error was caused by a reference to a type that
    /// is not registered.
    pub fn is_type_not_found(&self) -> bool {
        matches!(self.kind, DescriptorErrorKind::TypeNotFound { .. })
    }
}

impl std::error::Error for DescriptorError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match &self.kind {
            DescriptorErrorKind::DecodeFileDescriptorSet { err } => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for DescriptorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DescriptorErrorKind::DecodeFileDescriptorSet { .. } => {
                write!(f, "failed to decode file descriptor set")
            }
            DescriptorErrorKind::DuplicateFile { name } => {
                write!(f, "a file named '{}' is already registered", name)
            }
            DescriptorErrorKind::DuplicateSymbol { name } => {
                write!(f, "the symbol '{}' is defined multiple times", name)
            }
            DescriptorErrorKind::TypeNotFound { name } => {
                write!(f, "the message or enum type '{}' was not found", name)
            }
            DescriptorErrorKind::InvalidDescriptorStructure { detail } => {
                write!(f, "invalid descriptor: {}", detail)
            }
            DescriptorErrorKind::UnsupportedFieldType { value } => {
                write!(f, "the field type '{}' is not recognized", value)
            }
        }
    }
}
