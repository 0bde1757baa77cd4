use ango_schema::Location;
use std::fmt;
use thiserror::Error;

/// A malformed token sequence.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyntaxErrorKind {
    #[error("unexpected character {0}")]
    InvalidCharacter(String),

    #[error("unterminated string literal")]
    UnterminatedString,

    #[error("unterminated block comment")]
    UnterminatedComment,

    #[error("invalid escape sequence {0}")]
    InvalidEscape(String),

    #[error("expected {expected} but found {found}")]
    UnexpectedToken { expected: String, found: String },

    #[error("invalid integer {0}")]
    InvalidInteger(String),

    #[error("invalid number {0}")]
    InvalidFloat(String),
}

/// Well-formed syntax describing an invalid schema.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticErrorKind {
    #[error("the name {name} is declared twice (first declared at {first})")]
    DuplicateDeclaration { name: String, first: Location },

    #[error("the name {0} is reserved")]
    ReservedName(String),

    #[error("the protocol name is declared twice")]
    DuplicateProtocolName,

    #[error("the tag {tag} of field {field} in message {message} is already used by field {other}")]
    DuplicateTag {
        message: String,
        field:   String,
        other:   String,
        tag:     i128,
    },

    #[error("the field {field} is declared twice in message {message}")]
    DuplicateField { message: String, field: String },

    #[error("the tag of field {field} in message {message} must be between 1 and {max}, found {tag}")]
    InvalidTag {
        message: String,
        field:   String,
        tag:     i128,
        max:     u32,
    },

    #[error("the label {label} is declared twice in enum {name}")]
    DuplicateEnumLabel { name: String, label: String },

    #[error("the value {value} of {label} in enum {name} is already used by {other}")]
    DuplicateEnumValue {
        name:  String,
        label: String,
        other: String,
        value: i128,
    },

    #[error("the value of {label} in enum {name} must fit in 32 bits, found {value}")]
    EnumValueOutOfRange { name: String, label: String, value: i128 },

    #[error("the type {type_name} of field {field} in message {message} is not defined")]
    UnresolvedType {
        message:   String,
        field:     String,
        type_name: String,
    },

    #[error("the field {field} in message {message} combines the modifiers {first} and {second}")]
    ConflictingModifiers {
        message: String,
        field:   String,
        first:   String,
        second:  String,
    },

    #[error("the constant {name} of type {ty} cannot hold {value}")]
    InvalidConstant { name: String, ty: String, value: String },
}

/// A schema that failed to parse, with the position of the offending text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("Syntax error at {location}: {kind}")]
    Syntax {
        kind:     SyntaxErrorKind,
        location: Location,
    },

    #[error("Semantic error at {location}: {kind}")]
    Semantic {
        kind:     SemanticErrorKind,
        location: Location,
    },
}

impl ParseError {
    pub fn syntax(kind: SyntaxErrorKind, location: Location) -> Self {
        ParseError::Syntax { kind, location }
    }

    pub fn semantic(kind: SemanticErrorKind, location: Location) -> Self {
        ParseError::Semantic { kind, location }
    }

    pub fn location(&self) -> Location {
        match self {
            ParseError::Syntax { location, .. } | ParseError::Semantic { location, .. } => {
                *location
            }
        }
    }

    pub fn is_syntax(&self) -> bool {
        matches!(self, ParseError::Syntax { .. })
    }
}

/// Every diagnostic gathered while parsing. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrors(Vec<ParseError>);

impl ParseErrors {
    pub(crate) fn new(errors: Vec<ParseError>) -> Self {
        debug_assert!(!errors.is_empty());
        ParseErrors(errors)
    }

    pub fn first(&self) -> &ParseError {
        &self.0[0]
    }

    pub fn errors(&self) -> &[ParseError] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn into_vec(self) -> Vec<ParseError> {
        self.0
    }
}

impl From<ParseError> for ParseErrors {
    fn from(err: ParseError) -> Self {
        ParseErrors(vec![err])
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, err) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for ParseErrors {}

/// Why a schema construct has no rendering for a target.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationErrorKind {
    #[error("{what} cannot be represented: {reason}")]
    UnsupportedType { what: String, reason: String },

    #[error("{first} and {second} both map to the identifier {ident}")]
    NameCollision {
        first:  String,
        second: String,
        ident:  String,
    },

    #[error("{0} does not map to a valid identifier")]
    InvalidIdentifier(String),
}

/// A failure to render one target. Other targets are unaffected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot generate {target} for {declaration}: {kind}")]
pub struct GenerationError {
    pub target:      &'static str,
    pub declaration: String,
    pub kind:        GenerationErrorKind,
}

impl GenerationError {
    pub fn new(target: &'static str, declaration: impl Into<String>, kind: GenerationErrorKind) -> Self {
        GenerationError {
            target,
            declaration: declaration.into(),
            kind,
        }
    }
}
