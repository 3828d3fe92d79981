//! A dynamic Protocol Buffers reflection engine.
//!
//! `protodyn` lets a program describe, build, read, serialize and deserialize
//! protobuf messages at runtime, without generated code for the message types
//! involved. It is intended for tools that cannot know message shapes at
//! compile time: API gateways, configuration systems, generic RPC clients,
//! debugging shells and data pipelines that accept arbitrary schemas.
//!
//! The building blocks are:
//!
//! * [`TypeRegistry`] — a process-level, thread-safe index that ingests
//!   descriptor protos (the canonical schema representation produced by the
//!   protobuf compiler) and resolves fully-qualified names to descriptors.
//! * The descriptor model ([`FileDescriptor`], [`MessageDescriptor`],
//!   [`FieldDescriptor`], [`EnumDescriptor`], [`ServiceDescriptor`], …) —
//!   immutable handles describing a schema element, cheap to clone, valid for
//!   as long as any clone is held.
//! * [`DynamicMessage`] — a mutable value conforming to a
//!   [`MessageDescriptor`], with type-checked field access. It implements
//!   [`prost::Message`], so encoding and decoding use the standard wire
//!   format and interoperate with any generated message type.
//! * [`MessageFactory`] and [`DynamicMessage::validate`] — bulk construction
//!   and structural validation.
//!
//! # Example
//!
//! ```
//! use prost::Message;
//! use prost_types::{
//!     field_descriptor_proto::{Label, Type},
//!     DescriptorProto, FieldDescriptorProto, FileDescriptorProto,
//! };
//! use protodyn::{DynamicMessage, TypeRegistry, Value};
//!
//! let registry = TypeRegistry::new();
//! registry.register_file_descriptor_proto(FileDescriptorProto {
//!     name: Some("example.proto".to_owned()),
//!     package: Some("example".to_owned()),
//!     syntax: Some("proto3".to_owned()),
//!     message_type: vec![DescriptorProto {
//!         name: Some("Person".to_owned()),
//!         field: vec![FieldDescriptorProto {
//!             name: Some("id".to_owned()),
//!             number: Some(1),
//!             label: Some(Label::Optional as i32),
//!             r#type: Some(Type::Int32 as i32),
//!             ..Default::default()
//!         }],
//!         ..Default::default()
//!     }],
//!     ..Default::default()
//! })?;
//!
//! let desc = registry.find_message("example.Person").unwrap();
//! let mut person = DynamicMessage::new(desc.clone());
//! person.try_set_field_by_name("id", Value::I32(42))?;
//!
//! let bytes = person.encode_to_vec();
//! assert_eq!(bytes, b"\x08\x2a");
//! assert_eq!(DynamicMessage::decode(desc, bytes.as_slice())?, person);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
#![warn(missing_debug_implementations, missing_docs)]
#![deny(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc(html_root_url = "https://docs.rs/protodyn/0.3.1/")]

mod descriptor;
mod dynamic;
mod registry;
mod wkt;

pub use {prost, prost::bytes, prost_types};

pub use self::descriptor::{
    Cardinality, DescriptorError, EnumDescriptor, EnumValueDescriptor, FieldDescriptor,
    FileDescriptor, Kind, MessageDescriptor, MethodDescriptor, ServiceDescriptor, Syntax,
};
pub use self::dynamic::{
    DynamicMessage, MapKey, MessageFactory, SetFieldError, UnknownField, UnknownFieldSet,
    ValidationError, ValidationErrorKind, ValidationResult, Value,
};
pub use self::registry::TypeRegistry;
