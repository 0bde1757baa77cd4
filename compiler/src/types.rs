//! Declarations as written in the source, before names are resolved.

use ango_schema::Location;

#[derive(Debug, Clone, PartialEq)]
pub struct RawSchema {
    pub declarations: Vec<Declaration>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Declaration {
    Name(RawName),
    Const(RawConst),
    Enum(RawEnum),
    Message(RawMessage),
}

impl Declaration {
    pub fn location(&self) -> Location {
        match self {
            Declaration::Name(d)    => d.location,
            Declaration::Const(d)   => d.location,
            Declaration::Enum(d)    => d.location,
            Declaration::Message(d) => d.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawName {
    pub name:     String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Integer(i128),
    Float(f64),
    String(String),
    Bool(bool),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawConst {
    pub name:     String,
    pub type_:    String,
    pub value:    Literal,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawVariant {
    pub label:    String,
    pub value:    i128,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawEnum {
    pub name:     String,
    pub variants: Vec<RawVariant>,
    pub location: Location,
}

/// A `repeated` or `optional` word in front of a field type.
#[derive(Debug, Clone, PartialEq)]
pub struct RawModifier {
    pub word:     String,
    pub location: Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawField {
    pub name:      String,
    pub modifiers: Vec<RawModifier>,
    pub type_:     String,
    pub type_at:   Location,
    pub tag:       i128,
    pub tag_at:    Location,
    pub location:  Location,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawMessage {
    pub name:     String,
    pub fields:   Vec<RawField>,
    pub location: Location,
}
