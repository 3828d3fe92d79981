use prost::{
    bytes::{Buf, BufMut, Bytes},
    encoding::{self, DecodeContext, WireType},
    DecodeError, Message,
};

/// Fields captured during a decode whose numbers the descriptor does not
/// declare.
///
/// Entries keep their arrival order, and re-encoding the owning message
/// writes them back byte-for-byte after the known fields.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct UnknownFieldSet {
    fields: Vec<(u32, UnknownField)>,
}

/// The payload of a field the decoder had no descriptor entry for, kept in
/// the shape it arrived in.
#[derive(Debug, Clone, PartialEq)]
pub enum UnknownField {
    /// A varint payload.
    Varint(u64),
    /// An eight-byte fixed-width payload.
    Fixed64([u8; 8]),
    /// A length-prefixed payload.
    LengthDelimited(Bytes),
    /// The fields enclosed by a start-group/end-group pair.
    Group(UnknownFieldSet),
    /// A four-byte fixed-width payload.
    Fixed32([u8; 4]),
}

impl UnknownFieldSet {
    /// Returns `true` if the set contains no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of fields in the set.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Gets an iterator over the fields of the set as `(number, field)`
    /// pairs, in the order they were decoded.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &'_ UnknownField)> {
        self.fields.iter().map(|(number, field)| (*number, field))
    }

    pub(super) fn insert(&mut self, number: u32, field: UnknownField) {
        self.fields.push((number, field));
    }

    pub(super) fn clear_fields(&mut self) {
        self.fields.clear();
    }
}

impl Message for UnknownFieldSet {
    fn encode_raw(&self, buf: &mut impl BufMut)
    where
        Self: Sized,
    {
        for (number, field) in &self.fields {
            field.encode(*number, buf);
        }
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
        let field = UnknownField::capture(number, wire_type, buf, ctx)?;
        self.insert(number, field);
        Ok(())
    }

    fn encoded_len(&self) -> usize {
        self.fields
            .iter()
            .map(|(number, field)| field.encoded_len(*number))
            .sum()
    }

    fn clear(&mut self) {
        self.fields.clear();
    }
}

impl UnknownField {
    /// The wire shape this field was captured with.
    pub fn wire_type(&self) -> WireType {
        match self {
            UnknownField::Varint(_) => WireType::Varint,
            UnknownField::Fixed64(_) => WireType::SixtyFourBit,
            UnknownField::LengthDelimited(_) => WireType::LengthDelimited,
            UnknownField::Group(_) => WireType::StartGroup,
            UnknownField::Fixed32(_) => WireType::ThirtyTwoBit,
        }
    }

    fn encode(&self, number: u32, buf: &mut impl BufMut) {
        encoding::encode_key(number, self.wire_type(), buf);
        match self {
            UnknownField::Varint(value) => encoding::encode_varint(*value, buf),
            UnknownField::Fixed64(bytes) => buf.put_slice(bytes),
            UnknownField::LengthDelimited(bytes) => {
                encoding::encode_varint(bytes.len() as u64, buf);
                buf.put_slice(bytes);
            }
            UnknownField::Group(fields) => {
                fields.encode_raw(buf);
                encoding::encode_key(number, WireType::EndGroup, buf);
            }
            UnknownField::Fixed32(bytes) => buf.put_slice(bytes),
        }
    }

    fn encoded_len(&self, number: u32) -> usize {
        encoding::key_len(number)
            + match self {
                UnknownField::Varint(value) => encoding::encoded_len_varint(*value),
                UnknownField::Fixed64(_) => 8,
                UnknownField::LengthDelimited(bytes) => {
                    encoding::encoded_len_varint(bytes.len() as u64) + bytes.len()
                }
                UnknownField::Group(fields) => fields.encoded_len() + encoding::key_len(number),
                UnknownField::Fixed32(_) => 4,
            }
    }

    /// Reads one value off the wire, keeping exactly the bytes needed to
    /// reproduce it later.
    pub(super) fn capture(
        number: u32,
        wire_type: WireType,
        buf: &mut impl Buf,
        ctx: DecodeContext,
    ) -> Result<Self, DecodeError> {
        match wire_type {
            WireType::Varint => Ok(UnknownField::Varint(encoding::decode_varint(buf)?)),
            WireType::SixtyFourBit => Ok(UnknownField::Fixed64(take_array(buf)?)),
            WireType::ThirtyTwoBit => Ok(UnknownField::Fixed32(take_array(buf)?)),
            WireType::LengthDelimited => {
                let len = encoding::decode_varint(buf)?;
                if len > buf.remaining() as u64 {
                    return Err(DecodeError::new("length delimiter exceeds input"));
                }
                Ok(UnknownField::LengthDelimited(buf.copy_to_bytes(len as usize)))
            }
            WireType::StartGroup => {
                let mut fields = UnknownFieldSet::default();
                encoding::group::merge(number, wire_type, &mut fields, buf, ctx)?;
                Ok(UnknownField::Group(fields))
            }
            WireType::EndGroup => Err(DecodeError::new("group end without matching start")),
        }
    }
}

fn take_array<const N: usize>(buf: &mut impl Buf) -> Result<[u8; N], DecodeError> {
    if buf.remaining() < N {
        return Err(DecodeError::new("input ends inside a fixed-width value"));
    }
    let mut bytes = [0; N];
    buf.copy_to_slice(&mut bytes);
    Ok(bytes)
}
