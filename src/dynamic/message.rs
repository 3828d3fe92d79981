use prost::{
    bytes::{Buf, BufMut},
    encoding::{self, DecodeContext, WireType},
    DecodeError, Message,
};

use crate::{
    descriptor::{FieldDescriptor, Kind, MAP_ENTRY_KEY_NUMBER, MAP_ENTRY_VALUE_NUMBER},
    DynamicMessage, Value,
};

use super::unknown::UnknownField;

impl Message for DynamicMessage {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        for (field_desc, value) in self.fields() {
            value.encode_field(&field_desc, buf);
        }
        self.fields.unknown().encode_raw(buf);
    }

    fn merge_field(
        &mut self,
        number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        Self: Sized,
    {
        if let Some(field_desc) = self.desc.get_field(number) {
            self.get_field_mut(&field_desc)
                .merge_field(&field_desc, wire_type, buf, ctx)
        } else {
            let field = UnknownField::capture(number, wire_type, buf, ctx)?;
            self.fields.add_unknown(number, field);
            Ok(())
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        for (field_desc, value) in self.fields() {
            len += value.encoded_len(&field_desc);
        }
        len + self.fields.unknown().encoded_len()
    }

    fn clear(&mut self) {
        self.fields.clear_all();
    }
}

impl Value {
    pub(super) fn encode_field<B>(&self, field_desc: &FieldDescriptor, buf: &mut B)
    where
        B: BufMut,
    {
        let number = field_desc.number();
        match (self, field_desc.kind()) {
            (Value::Bool(value), Kind::Bool) => encoding::bool::encode(number, value, buf),
            (Value::I32(value), Kind::Int32) => encoding::int32::encode(number, value, buf),
            (Value::I32(value), Kind::Sint32) => encoding::sint32::encode(number, value, buf),
            (Value::I32(value), Kind::Sfixed32) => encoding::sfixed32::encode(number, value, buf),
            (Value::I64(value), Kind::Int64) => encoding::int64::encode(number, value, buf),
            (Value::I64(value), Kind::Sint64) => encoding::sint64::encode(number, value, buf),
            (Value::I64(value), Kind::Sfixed64) => encoding::sfixed64::encode(number, value, buf),
            (Value::U32(value), Kind::Uint32) => encoding::uint32::encode(number, value, buf),
            (Value::U32(value), Kind::Fixed32) => encoding::fixed32::encode(number, value, buf),
            (Value::U64(value), Kind::Uint64) => encoding::uint64::encode(number, value, buf),
            (Value::U64(value), Kind::Fixed64) => encoding::fixed64::encode(number, value, buf),
            (Value::F32(value), Kind::Float) => encoding::float::encode(number, value, buf),
            (Value::F64(value), Kind::Double) => encoding::double::encode(number, value, buf),
            (Value::String(value), Kind::String) => encoding::string::encode(number, value, buf),
            (Value::Bytes(value), Kind::Bytes) => encoding::bytes::encode(number, value, buf),
            (Value::EnumNumber(value), Kind::Enum(_)) => {
                encoding::int32::encode(number, value, buf)
            }
            (Value::Message(message), Kind::Message(_)) => {
                if field_desc.is_group() {
                    encoding::group::encode(number, message, buf)
                } else {
                    encoding::message::encode(number, message, buf)
                }
            }
            (Value::Map(entries), Kind::Message(entry_desc)) if field_desc.is_map() => {
                let key_desc = entry_desc.map_entry_key_field();
                let value_desc = entry_desc.map_entry_value_field();

                // Map keys share the scalar codec with values through their
                // Value form.
                for (key, value) in entries {
                    let key = Value::from(key.clone());
                    let len = key.encoded_len_inside_entry(&key_desc)
                        + value.encoded_len_inside_entry(&value_desc);

                    encoding::encode_key(number, WireType::LengthDelimited, buf);
                    encoding::encode_varint(len as u64, buf);

                    key.encode_inside_entry(&key_desc, buf);
                    value.encode_inside_entry(&value_desc, buf);
                }
            }
            (Value::List(values), kind) if field_desc.is_list() => {
                if field_desc.is_packed() {
                    let len = values
                        .iter()
                        .map(|value| value.packed_len(&kind))
                        .sum::<usize>();
                    encoding::encode_key(number, WireType::LengthDelimited, buf);
                    encoding::encode_varint(len as u64, buf);
                    for value in values {
                        value.encode_packed(&kind, buf);
                    }
                } else {
                    for value in values {
                        value.encode_field(field_desc, buf);
                    }
                }
            }
            (value, ty) => panic!(
                "mismatch between DynamicMessage value {:?} and type {:?}",
                value, ty
            ),
        }
    }

    pub(super) fn merge_field<B>(
        &mut self,
        field_desc: &FieldDescriptor,
        wire_type: WireType,
        buf: &mut B,
        ctx: DecodeContext,
    ) -> Result<(), DecodeError>
    where
        B: Buf,
    {
        match (self, field_desc.kind()) {
            (Value::Bool(value), Kind::Bool) => encoding::bool::merge(wire_type, value, buf, ctx),
            (Value::I32(value), Kind::Int32) => encoding::int32::merge(wire_type, value, buf, ctx),
            (Value::I32(value), Kind::Sint32) => {
                encoding::sint32::merge(wire_type, value, buf, ctx)
            }
            (Value::I32(value), Kind::Sfixed32) => {
                encoding::sfixed32::merge(wire_type, value, buf, ctx)
            }
            (Value::I64(value), Kind::Int64) => encoding::int64::merge(wire_type, value, buf, ctx),
            (Value::I64(value), Kind::Sint64) => {
                encoding::sint64::merge(wire_type, value, buf, ctx)
            }
            (Value::I64(value), Kind::Sfixed64) => {
                encoding::sfixed64::merge(wire_type, value, buf, ctx)
            }
            (Value::U32(value), Kind::Uint32) => {
                encoding::uint32::merge(wire_type, value, buf, ctx)
            }
            (Value::U32(value), Kind::Fixed32) => {
                encoding::fixed32::merge(wire_type, value, buf, ctx)
            }
            (Value::U64(value), Kind::Uint64) => {
                encoding::uint64::merge(wire_type, value, buf, ctx)
            }
            (Value::U64(value), Kind::Fixed64) => {
                encoding::fixed64::merge(wire_type, value, buf, ctx)
            }
            (Value::F32(value), Kind::Float) => encoding::float::merge(wire_type, value, buf, ctx),
            (Value::F64(value), Kind::Double) => {
                encoding::double::merge(wire_type, value, buf, ctx)
            }
            (Value::String(value), Kind::String) => {
                encoding::string::merge(wire_type, value, buf, ctx)
            }
            (Value::Bytes(value), Kind::Bytes) => {
                encoding::bytes::merge(wire_type, value, buf, ctx)
            }
            (Value::EnumNumber(value), Kind::Enum(_)) => {
                encoding::int32::merge(wire_type, value, buf, ctx)
            }
            (Value::Message(message), Kind::Message(_)) => {
                if field_desc.is_group() {
                    encoding::group::merge(field_desc.number(), wire_type, message, buf, ctx)
                } else {
                    encoding::message::merge(wire_type, message, buf, ctx)
                }
            }
            (Value::Map(entries), Kind::Message(entry_desc)) if field_desc.is_map() => {
                let key_desc = entry_desc.map_entry_key_field();
                let value_desc = entry_desc.map_entry_value_field();

                let mut key = Value::default_value(&key_desc.kind());
                let mut value = Value::default_value_for_field(&value_desc);
                encoding::merge_loop(
                    &mut (&mut key, &mut value),
                    buf,
                    ctx,
                    |(key, value), buf, ctx| {
                        let (number, wire_type) = encoding::decode_key(buf)?;
                        match number {
                            MAP_ENTRY_KEY_NUMBER => key.merge_field(&key_desc, wire_type, buf, ctx),
                            MAP_ENTRY_VALUE_NUMBER => {
                                value.merge_field(&value_desc, wire_type, buf, ctx)
                            }
                            _ => encoding::skip_field(wire_type, number, buf, ctx),
                        }
                    },
                )?;
                let key = key
                    .into_map_key()
                    .ok_or_else(|| DecodeError::new("invalid map key type"))?;
                entries.insert(key, value);

                Ok(())
            }
            (Value::List(values), field_kind) if field_desc.is_list() => {
                if wire_type == WireType::LengthDelimited && field_desc.is_packable() {
                    encoding::merge_loop(values, buf, ctx, |values, buf, ctx| {
                        let mut value = Value::default_value(&field_kind);
                        value.merge_field(field_desc, field_kind.wire_type(), buf, ctx)?;
                        values.push(value);
                        Ok(())
                    })
                } else {
                    let mut value = Value::default_value(&field_kind);
                    value.merge_field(field_desc, wire_type, buf, ctx)?;
                    values.push(value);
                    Ok(())
                }
            }
            (value, ty) => panic!(
                "mismatch between DynamicMessage value {:?} and type {:?}",
                value, ty
            ),
        }
    }

    pub(super) fn encoded_len(&self, field_desc: &FieldDescriptor) -> usize {
        let number = field_desc.number();
        match (self, field_desc.kind()) {
            (Value::Bool(value), Kind::Bool) => encoding::bool::encoded_len(number, value),
            (Value::I32(value), Kind::Int32) => encoding::int32::encoded_len(number, value),
            (Value::I32(value), Kind::Sint32) => encoding::sint32::encoded_len(number, value),
            (Value::I32(value), Kind::Sfixed32) => encoding::sfixed32::encoded_len(number, value),
            (Value::I64(value), Kind::Int64) => encoding::int64::encoded_len(number, value),
            (Value::I64(value), Kind::Sint64) => encoding::sint64::encoded_len(number, value),
            (Value::I64(value), Kind::Sfixed64) => encoding::sfixed64::encoded_len(number, value),
            (Value::U32(value), Kind::Uint32) => encoding::uint32::encoded_len(number, value),
            (Value::U32(value), Kind::Fixed32) => encoding::fixed32::encoded_len(number, value),
            (Value::U64(value), Kind::Uint64) => encoding::uint64::encoded_len(number, value),
            (Value::U64(value), Kind::Fixed64) => encoding::fixed64::encoded_len(number, value),
            (Value::F32(value), Kind::Float) => encoding::float::encoded_len(number, value),
            (Value::F64(value), Kind::Double) => encoding::double::encoded_len(number, value),
            (Value::String(value), Kind::String) => encoding::string::encoded_len(number, value),
            (Value::Bytes(value), Kind::Bytes) => encoding::bytes::encoded_len(number, value),
            (Value::EnumNumber(value), Kind::Enum(_)) => {
                encoding::int32::encoded_len(number, value)
            }
            (Value::Message(message), Kind::Message(_)) => {
                if field_desc.is_group() {
                    encoding::group::encoded_len(number, message)
                } else {
                    encoding::message::encoded_len(number, message)
                }
            }
            (Value::Map(entries), Kind::Message(entry_desc)) if field_desc.is_map() => {
                let key_desc = entry_desc.map_entry_key_field();
                let value_desc = entry_desc.map_entry_value_field();

                entries
                    .iter()
                    .map(|(key, value)| {
                        let len = Value::from(key.clone()).encoded_len_inside_entry(&key_desc)
                            + value.encoded_len_inside_entry(&value_desc);

                        encoding::key_len(number) + encoding::encoded_len_varint(len as u64) + len
                    })
                    .sum::<usize>()
            }
            (Value::List(values), kind) if field_desc.is_list() => {
                if field_desc.is_packed() {
                    let len = values
                        .iter()
                        .map(|value| value.packed_len(&kind))
                        .sum::<usize>();
                    encoding::key_len(number) + encoding::encoded_len_varint(len as u64) + len
                } else {
                    values
                        .iter()
                        .map(|value| value.encoded_len(field_desc))
                        .sum()
                }
            }
            (value, ty) => panic!(
                "mismatch between DynamicMessage value {:?} and type {:?}",
                value, ty
            ),
        }
    }

    /// Encodes a map entry field, eliding the wire default like the canonical
    /// map encoding does.
    fn encode_inside_entry<B>(&self, field_desc: &FieldDescriptor, buf: &mut B)
    where
        B: BufMut,
    {
        if !self.is_default(&field_desc.kind()) {
            self.encode_field(field_desc, buf);
        }
    }

    fn encoded_len_inside_entry(&self, field_desc: &FieldDescriptor) -> usize {
        if self.is_default(&field_desc.kind()) {
            0
        } else {
            self.encoded_len(field_desc)
        }
    }

    /// Writes the bare element of a packed record: no tag, varint or
    /// fixed-width only.
    fn encode_packed(&self, kind: &Kind, buf: &mut impl BufMut) {
        match (self, kind) {
            (Value::F64(value), Kind::Double) => buf.put_f64_le(*value),
            (Value::F32(value), Kind::Float) => buf.put_f32_le(*value),
            (Value::U32(value), Kind::Fixed32) => buf.put_u32_le(*value),
            (Value::U64(value), Kind::Fixed64) => buf.put_u64_le(*value),
            (Value::I32(value), Kind::Sfixed32) => buf.put_i32_le(*value),
            (Value::I64(value), Kind::Sfixed64) => buf.put_i64_le(*value),
            _ => encoding::encode_varint(self.to_packed_varint(kind), buf),
        }
    }

    fn packed_len(&self, kind: &Kind) -> usize {
        match kind.wire_type() {
            WireType::ThirtyTwoBit => 4,
            WireType::SixtyFourBit => 8,
            WireType::Varint => encoding::encoded_len_varint(self.to_packed_varint(kind)),
            _ => panic!("field type {:?} has no packed representation", kind),
        }
    }

    /// The varint image of a packed element, zigzag-mapped for the sint
    /// types and sign-extended for the plain signed ones.
    fn to_packed_varint(&self, kind: &Kind) -> u64 {
        match (self, kind) {
            (Value::Bool(value), Kind::Bool) => *value as u64,
            (Value::I32(value), Kind::Int32) => *value as u64,
            (Value::I32(value), Kind::Sint32) => {
                u64::from((value << 1) as u32 ^ (value >> 31) as u32)
            }
            (Value::I64(value), Kind::Int64) => *value as u64,
            (Value::I64(value), Kind::Sint64) => ((value << 1) ^ (value >> 63)) as u64,
            (Value::U32(value), Kind::Uint32) => u64::from(*value),
            (Value::U64(value), Kind::Uint64) => *value,
            (Value::EnumNumber(value), Kind::Enum(_)) => *value as u64,
            (value, kind) => panic!("value {:?} cannot appear in a packed {:?} list", value, kind),
        }
    }
}
