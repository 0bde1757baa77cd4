use serde::Serialize;
use std::fmt;

/// A 1-based position in the schema source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
pub struct Location {
    pub line:   usize,
    pub column: usize,
}

impl Location {
    pub fn new(line: usize, column: usize) -> Self {
        Location { line, column }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}, column {}", self.line, self.column)
    }
}

/// The built-in scalar kinds of the schema language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Primitive {
    Bool,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    String,
    Bytes,
}

impl Primitive {
    pub const ALL: [Primitive; 13] = [
        Primitive::Bool,
        Primitive::Int8,
        Primitive::Int16,
        Primitive::Int32,
        Primitive::Int64,
        Primitive::Uint8,
        Primitive::Uint16,
        Primitive::Uint32,
        Primitive::Uint64,
        Primitive::Float32,
        Primitive::Float64,
        Primitive::String,
        Primitive::Bytes,
    ];

    /// The keyword used for this kind in schema text.
    pub fn name(self) -> &'static str {
        match self {
            Primitive::Bool    => "bool",
            Primitive::Int8    => "int8",
            Primitive::Int16   => "int16",
            Primitive::Int32   => "int32",
            Primitive::Int64   => "int64",
            Primitive::Uint8   => "uint8",
            Primitive::Uint16  => "uint16",
            Primitive::Uint32  => "uint32",
            Primitive::Uint64  => "uint64",
            Primitive::Float32 => "float32",
            Primitive::Float64 => "float64",
            Primitive::String  => "string",
            Primitive::Bytes   => "bytes",
        }
    }

    pub fn from_name(name: &str) -> Option<Primitive> {
        Primitive::ALL.iter().copied().find(|p| p.name() == name)
    }

    /// Inclusive value range for integer kinds, `None` otherwise.
    pub fn integer_range(self) -> Option<(i128, i128)> {
        let range = match self {
            Primitive::Int8   => (i8::MIN as i128, i8::MAX as i128),
            Primitive::Int16  => (i16::MIN as i128, i16::MAX as i128),
            Primitive::Int32  => (i32::MIN as i128, i32::MAX as i128),
            Primitive::Int64  => (i64::MIN as i128, i64::MAX as i128),
            Primitive::Uint8  => (0, u8::MAX as i128),
            Primitive::Uint16 => (0, u16::MAX as i128),
            Primitive::Uint32 => (0, u32::MAX as i128),
            Primitive::Uint64 => (0, u64::MAX as i128),
            _ => return None,
        };
        Some(range)
    }

    pub fn is_integer(self) -> bool {
        self.integer_range().is_some()
    }

    pub fn is_float(self) -> bool {
        matches!(self, Primitive::Float32 | Primitive::Float64)
    }

    /// True for the kinds whose values do not fit an IEEE double exactly.
    pub fn is_64_bit_integer(self) -> bool {
        matches!(self, Primitive::Int64 | Primitive::Uint64)
    }
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Index of a message in [`Schema::messages`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MessageId(pub usize);

/// Index of an enum in [`Schema::enums`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EnumId(pub usize);

/// A resolved field type. User types are referenced by index, never by
/// nesting, so a message may refer to itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "ref", rename_all = "lowercase")]
pub enum TypeRef {
    Primitive(Primitive),
    Message(MessageId),
    Enum(EnumId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Modifier {
    Single,
    Optional,
    Repeated,
}

impl Modifier {
    pub fn name(self) -> &'static str {
        match self {
            Modifier::Single   => "single",
            Modifier::Optional => "optional",
            Modifier::Repeated => "repeated",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Field {
    pub name:     String,
    pub ty:       TypeRef,
    pub tag:      u32,
    pub modifier: Modifier,
    pub location: Location,
}

impl Field {
    pub fn is_repeated(&self) -> bool {
        self.modifier == Modifier::Repeated
    }

    pub fn is_optional(&self) -> bool {
        self.modifier == Modifier::Optional
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub name:     String,
    pub fields:   Vec<Field>,
    pub location: Location,
}

impl Message {
    /// Fields in ascending tag order, the order they appear on the wire.
    pub fn fields_by_tag(&self) -> Vec<&Field> {
        let mut fields: Vec<&Field> = self.fields.iter().collect();
        fields.sort_by_key(|f| f.tag);
        fields
    }

    pub fn field_by_tag(&self, tag: u32) -> Option<&Field> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EnumVariant {
    pub label:    String,
    pub value:    i32,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Enum {
    pub name:     String,
    pub variants: Vec<EnumVariant>,
    pub location: Location,
}

impl Enum {
    pub fn variants_by_value(&self) -> Vec<&EnumVariant> {
        let mut variants: Vec<&EnumVariant> = self.variants.iter().collect();
        variants.sort_by_key(|v| v.value);
        variants
    }
}

/// The literal value of a named constant, already checked against its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ConstValue {
    Bool(bool),
    Integer(i128),
    Float(f64),
    String(String),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Constant {
    pub name:     String,
    pub ty:       Primitive,
    pub value:    ConstValue,
    pub location: Location,
}

/// A parsed and validated schema. Built once by the compiler and never
/// mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Schema {
    pub name:      String,
    pub messages:  Vec<Message>,
    pub enums:     Vec<Enum>,
    pub constants: Vec<Constant>,
}

impl Default for Schema {
    fn default() -> Self {
        Schema::new(Schema::DEFAULT_NAME)
    }
}

impl Schema {
    /// Protocol name used when the schema has no `name` declaration.
    pub const DEFAULT_NAME: &'static str = "protocol";

    pub fn new(name: impl Into<String>) -> Self {
        Schema {
            name:      name.into(),
            messages:  Vec::new(),
            enums:     Vec::new(),
            constants: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.enums.is_empty() && self.constants.is_empty()
    }

    pub fn message(&self, id: MessageId) -> &Message {
        &self.messages[id.0]
    }

    pub fn enum_(&self, id: EnumId) -> &Enum {
        &self.enums[id.0]
    }

    pub fn message_id(&self, name: &str) -> Option<MessageId> {
        self.messages.iter().position(|m| m.name == name).map(MessageId)
    }

    pub fn enum_id(&self, name: &str) -> Option<EnumId> {
        self.enums.iter().position(|e| e.name == name).map(EnumId)
    }

    /// The schema-level spelling of a resolved type.
    pub fn type_name(&self, ty: TypeRef) -> &str {
        match ty {
            TypeRef::Primitive(p) => p.name(),
            TypeRef::Message(id)  => &self.message(id).name,
            TypeRef::Enum(id)     => &self.enum_(id).name,
        }
    }
}
