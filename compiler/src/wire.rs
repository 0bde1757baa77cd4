//! The wire layout every target renders from.
//!
//! A message is written as `(varuint tag, value)` pairs in ascending tag order
//! followed by a varuint `0`. Repeated values are prefixed with a varuint
//! count. Generators never decide encodings on their own: they walk a
//! [`WireMessage`] plan, which is what keeps Go and JavaScript output
//! byte-compatible.

use ango_schema::{EnumId, Field, Message, MessageId, Modifier, Primitive, Schema, TypeRef};

/// Encoding of a single value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WireKind {
    /// One byte, `0` or `1`.
    Bool,
    /// One raw byte.
    Uint8,
    /// One byte, two's complement.
    Int8,
    /// Zigzag varint; the primitive is `int16`, `int32` or `int64`.
    SignedVarint(Primitive),
    /// LEB128 varint; the primitive is `uint16`, `uint32` or `uint64`.
    UnsignedVarint(Primitive),
    /// Four bytes, little endian.
    Float32,
    /// Eight bytes, little endian.
    Float64,
    /// Varuint byte length, then UTF-8.
    String,
    /// Varuint byte length, then the bytes.
    Bytes,
    /// Zigzag varint of the variant value.
    Enum(EnumId),
    /// A nested message, including its terminator.
    Message(MessageId),
}

impl WireKind {
    pub fn of(ty: TypeRef) -> WireKind {
        match ty {
            TypeRef::Enum(id)    => WireKind::Enum(id),
            TypeRef::Message(id) => WireKind::Message(id),
            TypeRef::Primitive(p) => match p {
                Primitive::Bool    => WireKind::Bool,
                Primitive::Uint8   => WireKind::Uint8,
                Primitive::Int8    => WireKind::Int8,
                Primitive::Int16 | Primitive::Int32 | Primitive::Int64 => WireKind::SignedVarint(p),
                Primitive::Uint16 | Primitive::Uint32 | Primitive::Uint64 => {
                    WireKind::UnsignedVarint(p)
                }
                Primitive::Float32 => WireKind::Float32,
                Primitive::Float64 => WireKind::Float64,
                Primitive::String  => WireKind::String,
                Primitive::Bytes   => WireKind::Bytes,
            },
        }
    }

    /// True if values of this kind need 64-bit integer arithmetic.
    pub fn is_64_bit(self) -> bool {
        match self {
            WireKind::SignedVarint(p) | WireKind::UnsignedVarint(p) => p.is_64_bit_integer(),
            _ => false,
        }
    }
}

/// When a field is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Written on every encode, using the zero value when unset.
    Always,
    /// Written only when the target value is set (non-null).
    WhenSet,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireField<'a> {
    pub field:    &'a Field,
    pub kind:     WireKind,
    pub repeated: bool,
    pub presence: Presence,
}

impl WireField<'_> {
    pub fn tag(&self) -> u32 {
        self.field.tag
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WireMessage<'a> {
    pub id:      MessageId,
    pub message: &'a Message,
    /// Ascending by tag.
    pub fields:  Vec<WireField<'a>>,
}

pub fn wire_field(field: &Field) -> WireField<'_> {
    let kind = WireKind::of(field.ty);
    let presence = match (field.modifier, kind) {
        (Modifier::Repeated, _)                   => Presence::Always,
        (Modifier::Optional, _)                   => Presence::WhenSet,
        (Modifier::Single, WireKind::Message(_))  => Presence::WhenSet,
        (Modifier::Single, _)                     => Presence::Always,
    };
    WireField {
        field,
        kind,
        repeated: field.is_repeated(),
        presence,
    }
}

/// Lays out every message of `schema`, in declaration order.
pub fn plan(schema: &Schema) -> Vec<WireMessage<'_>> {
    schema
        .messages
        .iter()
        .enumerate()
        .map(|(i, message)| WireMessage {
            id: MessageId(i),
            message,
            fields: message.fields_by_tag().into_iter().map(wire_field).collect(),
        })
        .collect()
}
