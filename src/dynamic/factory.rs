use std::fmt;

use crate::{descriptor::Cardinality, DynamicMessage, MapKey, MessageDescriptor, SetFieldError, Value};

/// Constructs [`DynamicMessage`] instances from descriptors and bulk field
/// values.
#[derive(Debug, Default, Clone, Copy)]
pub struct MessageFactory;

impl MessageFactory {
    /// Creates a new `MessageFactory`.
    pub fn new() -> Self {
        MessageFactory
    }

    /// Creates an empty message conforming to the given descriptor.
    pub fn create(&self, desc: &MessageDescriptor) -> DynamicMessage {
        DynamicMessage::new(desc.clone())
    }

    /// Creates a message and populates it from `(field name, value)` pairs,
    /// applied in iteration order.
    ///
    /// The first unknown field name or incompatible value aborts construction
    /// and is returned as an error.
    pub fn create_from_names<'a, I>(
        &self,
        desc: &MessageDescriptor,
        values: I,
    ) -> Result<DynamicMessage, SetFieldError>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut message = self.create(desc);
        for (name, value) in values {
            message.try_set_field_by_name(name, value)?;
        }
        Ok(message)
    }

    /// Creates a message and populates it from `(field number, value)` pairs,
    /// applied in iteration order.
    ///
    /// The first unknown field number or incompatible value aborts
    /// construction and is returned as an error.
    pub fn create_from_numbers<I>(
        &self,
        desc: &MessageDescriptor,
        values: I,
    ) -> Result<DynamicMessage, SetFieldError>
    where
        I: IntoIterator<Item = (u32, Value)>,
    {
        let mut message = self.create(desc);
        for (number, value) in values {
            message.try_set_field_by_number(number, value)?;
        }
        Ok(message)
    }

    /// Returns a deep copy of the given message.
    ///
    /// Scalars are copied by value, containers are copied to fresh containers
    /// and nested messages are cloned recursively, so the copy shares no
    /// ownership with the source. The copy has the same set of present fields
    /// as the source.
    pub fn clone_message(&self, message: &DynamicMessage) -> DynamicMessage {
        message.clone()
    }
}

/// The aggregate outcome of validating a [`DynamicMessage`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    /// Returns `true` if validation produced no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// The validation errors, in field declaration order.
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }
}

/// A single structural problem found while validating a [`DynamicMessage`].
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError {
    path: String,
    kind: ValidationErrorKind,
}

/// The category of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationErrorKind {
    /// A field declared `required` has no value.
    MissingRequiredField,
}

impl ValidationError {
    /// The path of the offending field from the message root, e.g.
    /// `outer.items[2].name`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The category of the error.
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            ValidationErrorKind::MissingRequiredField => {
                write!(f, "missing required field '{}'", self.path)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl DynamicMessage {
    /// Checks this message for structural validity: every field declared
    /// `required` must be present, recursively through nested messages,
    /// repeated elements and map values.
    ///
    /// Errors are aggregated rather than returned one at a time, and fields
    /// beyond those declared by the descriptor are never reported.
    pub fn validate(&self) -> ValidationResult {
        let mut errors = Vec::new();
        validate_message(self, "", &mut errors);
        ValidationResult { errors }
    }
}

fn validate_message(message: &DynamicMessage, path: &str, errors: &mut Vec<ValidationError>) {
    for field_desc in message.descriptor().fields() {
        let field_path = if path.is_empty() {
            field_desc.name().to_owned()
        } else {
            format!("{}.{}", path, field_desc.name())
        };

        if !message.has_field(&field_desc) {
            if field_desc.cardinality() == Cardinality::Required {
                errors.push(ValidationError {
                    path: field_path,
                    kind: ValidationErrorKind::MissingRequiredField,
                });
            }
            continue;
        }

        match &*message.get_field(&field_desc) {
            Value::Message(nested) => validate_message(nested, &field_path, errors),
            Value::List(values) => {
                for (index, value) in values.iter().enumerate() {
                    if let Value::Message(nested) = value {
                        validate_message(nested, &format!("{}[{}]", field_path, index), errors);
                    }
                }
            }
            Value::Map(values) => {
                for (key, value) in values {
                    if let Value::Message(nested) = value {
                        validate_message(
                            nested,
                            &format!("{}[{}]", field_path, fmt_map_key(key)),
                            errors,
                        );
                    }
                }
            }
            _ => {}
        }
    }
}

fn fmt_map_key(key: &MapKey) -> String {
    match key {
        MapKey::Bool(value) => value.to_string(),
        MapKey::I32(value) => value.to_string(),
        MapKey::I64(value) => value.to_string(),
        MapKey::U32(value) => value.to_string(),
        MapKey::U64(value) => value.to_string(),
        MapKey::String(value) => format!("\"{}\"", value),
    }
}
