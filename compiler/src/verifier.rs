//! Second pass: binds type names to declarations and checks the schema
//! invariants, producing the immutable [`Schema`] model.

use std::collections::{HashMap, HashSet};

use ango_schema::{
    ConstValue, Constant, Enum, EnumId, EnumVariant, Field, Location, Message, MessageId,
    Modifier, Primitive, Schema, TypeRef,
};

use crate::{
    compiler::ErrorMode,
    error::{ParseError, ParseErrors, SemanticErrorKind},
    types::{Declaration, Literal, RawConst, RawEnum, RawField, RawMessage, RawSchema},
    utils::quote,
};

/// Largest field tag accepted by the compiler.
pub const MAX_TAG: u32 = (1 << 29) - 1;

#[derive(Clone, Copy)]
enum TypeSlot {
    Message(MessageId),
    Enum(EnumId),
    Constant,
}

struct Verifier {
    errors: Vec<ParseError>,
}

impl Verifier {
    fn report(&mut self, kind: SemanticErrorKind, location: Location) {
        self.errors.push(ParseError::semantic(kind, location));
    }
}

/// Resolves `raw` into a [`Schema`]. In [`ErrorMode::FailFast`] only the first
/// problem is returned; otherwise every problem found is.
pub fn verify_schema(raw: &RawSchema, mode: ErrorMode) -> Result<Schema, ParseErrors> {
    let mut verifier = Verifier { errors: Vec::new() };
    let schema = verifier.resolve(raw);

    if verifier.errors.is_empty() {
        return Ok(schema);
    }
    if mode == ErrorMode::FailFast {
        verifier.errors.truncate(1);
    }
    Err(ParseErrors::new(verifier.errors))
}

impl Verifier {
    fn resolve(&mut self, raw: &RawSchema) -> Schema {
        let mut schema = Schema::default();
        let mut protocol_name: Option<&str> = None;

        // 1) Declaration table. Messages, enums and constants share one namespace.
        let mut names: HashMap<&str, (Location, TypeSlot)> = HashMap::new();
        let mut messages: Vec<&RawMessage> = Vec::new();
        let mut enums: Vec<&RawEnum> = Vec::new();
        let mut constants: Vec<&RawConst> = Vec::new();

        for declaration in &raw.declarations {
            let (name, slot) = match declaration {
                Declaration::Name(n) => {
                    if protocol_name.is_some() {
                        self.report(SemanticErrorKind::DuplicateProtocolName, n.location);
                    } else {
                        protocol_name = Some(n.name.as_str());
                    }
                    continue;
                }
                Declaration::Message(m) => (&m.name, TypeSlot::Message(MessageId(messages.len()))),
                Declaration::Enum(e)    => (&e.name, TypeSlot::Enum(EnumId(enums.len()))),
                Declaration::Const(c)   => (&c.name, TypeSlot::Constant),
            };
            let location = declaration.location();

            if Primitive::from_name(name).is_some() {
                self.report(SemanticErrorKind::ReservedName(quote(name)), location);
                continue;
            }
            if let Some((first, _)) = names.get(name.as_str()) {
                self.report(
                    SemanticErrorKind::DuplicateDeclaration {
                        name:  quote(name),
                        first: *first,
                    },
                    location,
                );
                continue;
            }
            names.insert(name.as_str(), (location, slot));

            match declaration {
                Declaration::Message(m) => messages.push(m),
                Declaration::Enum(e)    => enums.push(e),
                Declaration::Const(c)   => constants.push(c),
                Declaration::Name(_)    => {}
            }
        }

        if let Some(name) = protocol_name {
            schema.name = name.to_string();
        }

        // 2) Enums.
        for raw_enum in enums {
            schema.enums.push(self.resolve_enum(raw_enum));
        }

        // 3) Messages. Types are bound by index, so self reference is a plain id.
        for raw_message in messages {
            let message = self.resolve_message(raw_message, &names);
            schema.messages.push(message);
        }

        // 4) Constants.
        for raw_const in constants {
            if let Some(constant) = self.resolve_const(raw_const) {
                schema.constants.push(constant);
            }
        }

        schema
    }

    fn resolve_enum(&mut self, raw: &RawEnum) -> Enum {
        let mut labels: HashSet<&str> = HashSet::new();
        let mut values: HashMap<i32, &str> = HashMap::new();
        let mut variants = Vec::with_capacity(raw.variants.len());

        for variant in &raw.variants {
            if !labels.insert(variant.label.as_str()) {
                self.report(
                    SemanticErrorKind::DuplicateEnumLabel {
                        name:  quote(&raw.name),
                        label: quote(&variant.label),
                    },
                    variant.location,
                );
                continue;
            }
            let Ok(value) = i32::try_from(variant.value) else {
                self.report(
                    SemanticErrorKind::EnumValueOutOfRange {
                        name:  quote(&raw.name),
                        label: quote(&variant.label),
                        value: variant.value,
                    },
                    variant.location,
                );
                continue;
            };
            if let Some(other) = values.get(&value) {
                self.report(
                    SemanticErrorKind::DuplicateEnumValue {
                        name:  quote(&raw.name),
                        label: quote(&variant.label),
                        other: quote(other),
                        value: variant.value,
                    },
                    variant.location,
                );
                continue;
            }
            values.insert(value, &variant.label);
            variants.push(EnumVariant {
                label:    variant.label.clone(),
                value,
                location: variant.location,
            });
        }

        Enum {
            name: raw.name.clone(),
            variants,
            location: raw.location,
        }
    }

    fn resolve_message(
        &mut self,
        raw: &RawMessage,
        names: &HashMap<&str, (Location, TypeSlot)>,
    ) -> Message {
        let mut tags: HashMap<u32, &str> = HashMap::new();
        let mut field_names: HashSet<&str> = HashSet::new();
        let mut fields = Vec::with_capacity(raw.fields.len());

        for raw_field in &raw.fields {
            let tag = match u32::try_from(raw_field.tag) {
                Ok(tag) if (1..=MAX_TAG).contains(&tag) => tag,
                _ => {
                    self.report(
                        SemanticErrorKind::InvalidTag {
                            message: quote(&raw.name),
                            field:   quote(&raw_field.name),
                            tag:     raw_field.tag,
                            max:     MAX_TAG,
                        },
                        raw_field.tag_at,
                    );
                    continue;
                }
            };
            if let Some(other) = tags.get(&tag) {
                self.report(
                    SemanticErrorKind::DuplicateTag {
                        message: quote(&raw.name),
                        field:   quote(&raw_field.name),
                        other:   quote(other),
                        tag:     raw_field.tag,
                    },
                    raw_field.tag_at,
                );
                continue;
            }
            tags.insert(tag, &raw_field.name);

            if !field_names.insert(raw_field.name.as_str()) {
                self.report(
                    SemanticErrorKind::DuplicateField {
                        message: quote(&raw.name),
                        field:   quote(&raw_field.name),
                    },
                    raw_field.location,
                );
                continue;
            }

            let Some(modifier) = self.resolve_modifier(raw, raw_field) else {
                continue;
            };
            let Some(ty) = self.resolve_type(raw, raw_field, names) else {
                continue;
            };

            fields.push(Field {
                name: raw_field.name.clone(),
                ty,
                tag,
                modifier,
                location: raw_field.location,
            });
        }

        Message {
            name: raw.name.clone(),
            fields,
            location: raw.location,
        }
    }

    fn resolve_modifier(&mut self, message: &RawMessage, field: &RawField) -> Option<Modifier> {
        match field.modifiers.as_slice() {
            [] => Some(Modifier::Single),
            [only] if only.word == "repeated" => Some(Modifier::Repeated),
            [_] => Some(Modifier::Optional),
            [first, second, ..] => {
                self.report(
                    SemanticErrorKind::ConflictingModifiers {
                        message: quote(&message.name),
                        field:   quote(&field.name),
                        first:   quote(&first.word),
                        second:  quote(&second.word),
                    },
                    second.location,
                );
                None
            }
        }
    }

    fn resolve_type(
        &mut self,
        message: &RawMessage,
        field: &RawField,
        names: &HashMap<&str, (Location, TypeSlot)>,
    ) -> Option<TypeRef> {
        if let Some(primitive) = Primitive::from_name(&field.type_) {
            return Some(TypeRef::Primitive(primitive));
        }
        match names.get(field.type_.as_str()) {
            Some((_, TypeSlot::Message(id))) => Some(TypeRef::Message(*id)),
            Some((_, TypeSlot::Enum(id)))    => Some(TypeRef::Enum(*id)),
            Some((_, TypeSlot::Constant)) | None => {
                self.report(
                    SemanticErrorKind::UnresolvedType {
                        message:   quote(&message.name),
                        field:     quote(&field.name),
                        type_name: quote(&field.type_),
                    },
                    field.type_at,
                );
                None
            }
        }
    }

    fn resolve_const(&mut self, raw: &RawConst) -> Option<Constant> {
        let invalid = |value: String| SemanticErrorKind::InvalidConstant {
            name:  quote(&raw.name),
            ty:    quote(&raw.type_),
            value,
        };

        let Some(ty) = Primitive::from_name(&raw.type_) else {
            self.report(invalid(describe_literal(&raw.value)), raw.location);
            return None;
        };

        let value = match (&raw.value, ty) {
            (Literal::Bool(b), Primitive::Bool) => Some(ConstValue::Bool(*b)),
            (Literal::String(s), Primitive::String) => Some(ConstValue::String(s.clone())),
            (Literal::Integer(i), Primitive::Float32 | Primitive::Float64) => {
                Some(ConstValue::Float(*i as f64))
            }
            (Literal::Float(f), Primitive::Float32) if f.abs() <= f32::MAX as f64 => {
                Some(ConstValue::Float(*f))
            }
            (Literal::Float(f), Primitive::Float64) if f.is_finite() => Some(ConstValue::Float(*f)),
            (Literal::Integer(i), _) => match ty.integer_range() {
                Some((min, max)) if (min..=max).contains(i) => Some(ConstValue::Integer(*i)),
                _ => None,
            },
            _ => None,
        };

        match value {
            Some(value) => Some(Constant {
                name: raw.name.clone(),
                ty,
                value,
                location: raw.location,
            }),
            None => {
                self.report(invalid(describe_literal(&raw.value)), raw.location);
                None
            }
        }
    }
}

fn describe_literal(literal: &Literal) -> String {
    match literal {
        Literal::Integer(i) => i.to_string(),
        Literal::Float(f)   => f.to_string(),
        Literal::String(s)  => quote(s),
        Literal::Bool(b)    => b.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{parser::parse_schema, tokenizer::tokenize_schema};

    fn verify(text: &str, mode: ErrorMode) -> Result<Schema, ParseErrors> {
        let tokens = tokenize_schema(text).unwrap();
        let raw = parse_schema(&tokens, mode).unwrap();
        verify_schema(&raw, mode)
    }

    fn semantic_kinds(text: &str) -> Vec<SemanticErrorKind> {
        verify(text, ErrorMode::Collect)
            .unwrap_err()
            .into_vec()
            .into_iter()
            .map(|e| match e {
                ParseError::Semantic { kind, .. } => kind,
                other => panic!("unexpected {:?}", other),
            })
            .collect()
    }

    #[test]
    fn resolves_references_by_index() {
        let schema = verify(
            "name shapes;\n\
             enum Color { RED = 0; BLUE = 2; }\n\
             message Node { color: Color = 1; next: optional Node = 2; kids: repeated Node = 3; }",
            ErrorMode::FailFast,
        )
        .unwrap();
        assert_eq!(schema.name, "shapes");
        let node = &schema.messages[0];
        assert_eq!(node.fields[0].ty, TypeRef::Enum(EnumId(0)));
        assert_eq!(node.fields[1].ty, TypeRef::Message(MessageId(0)));
        assert_eq!(node.fields[1].modifier, Modifier::Optional);
        assert_eq!(node.fields[2].modifier, Modifier::Repeated);
    }

    #[test]
    fn forward_references_resolve() {
        let schema = verify(
            "message A { b: B = 1; } message B { a: A = 1; }",
            ErrorMode::FailFast,
        )
        .unwrap();
        assert_eq!(schema.messages[0].fields[0].ty, TypeRef::Message(MessageId(1)));
        assert_eq!(schema.messages[1].fields[0].ty, TypeRef::Message(MessageId(0)));
    }

    #[test]
    fn duplicate_tag_is_reported_before_duplicate_name() {
        let err = verify(
            "message Point { x: int32 = 1; x: int32 = 1; }",
            ErrorMode::FailFast,
        )
        .unwrap_err();
        assert_eq!(err.len(), 1);
        match err.first() {
            ParseError::Semantic { kind: SemanticErrorKind::DuplicateTag { tag, .. }, location } => {
                assert_eq!(*tag, 1);
                assert_eq!(*location, Location::new(1, 42));
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn collects_every_semantic_problem() {
        let kinds = semantic_kinds(
            "name a;\n\
             name b;\n\
             message int32 { }\n\
             message M { a: Missing = 1; b: string = 0; c: optional repeated bool = 2; c: bool = 3; }\n\
             enum M { X = 1; }\n\
             enum E { A = 1; A = 2; B = 1; C = 5000000000; }\n\
             const Big: uint8 = 256;\n\
             const Typed: E = 1;",
        );
        assert!(matches!(kinds[0], SemanticErrorKind::DuplicateProtocolName));
        assert!(matches!(kinds[1], SemanticErrorKind::ReservedName(_)));
        assert!(matches!(kinds[2], SemanticErrorKind::DuplicateDeclaration { .. }));
        assert!(matches!(kinds[3], SemanticErrorKind::DuplicateEnumLabel { .. }));
        assert!(matches!(kinds[4], SemanticErrorKind::DuplicateEnumValue { .. }));
        assert!(matches!(kinds[5], SemanticErrorKind::EnumValueOutOfRange { .. }));
        assert!(matches!(kinds[6], SemanticErrorKind::UnresolvedType { .. }));
        assert!(matches!(kinds[7], SemanticErrorKind::InvalidTag { .. }));
        assert!(matches!(kinds[8], SemanticErrorKind::ConflictingModifiers { .. }));
        assert!(matches!(kinds[9], SemanticErrorKind::DuplicateField { .. }));
        assert!(matches!(kinds[10], SemanticErrorKind::InvalidConstant { .. }));
        assert!(matches!(kinds[11], SemanticErrorKind::InvalidConstant { .. }));
        assert_eq!(kinds.len(), 12);
    }

    #[test]
    fn duplicate_declaration_points_at_first() {
        let kinds = semantic_kinds("message A { }\nenum A { }");
        assert_eq!(
            kinds,
            vec![SemanticErrorKind::DuplicateDeclaration {
                name:  "\"A\"".into(),
                first: Location::new(1, 9),
            }]
        );
    }

    #[test]
    fn constants_are_not_types() {
        let kinds = semantic_kinds("const Limit: int32 = 5; message M { x: Limit = 1; }");
        assert!(matches!(kinds[0], SemanticErrorKind::UnresolvedType { .. }));
    }

    #[test]
    fn constant_values_are_typed() {
        let schema = verify(
            "const A: float64 = 2;\nconst B: float32 = 1.5;\nconst C: int64 = -9223372036854775808;\n\
             const D: bool = true;\nconst E: string = \"e\";",
            ErrorMode::FailFast,
        )
        .unwrap();
        let values: Vec<&ConstValue> = schema.constants.iter().map(|c| &c.value).collect();
        assert_eq!(
            values,
            vec![
                &ConstValue::Float(2.0),
                &ConstValue::Float(1.5),
                &ConstValue::Integer(i64::MIN as i128),
                &ConstValue::Bool(true),
                &ConstValue::String("e".into()),
            ]
        );
        assert!(verify("const X: bytes = \"x\";", ErrorMode::FailFast).is_err());
        assert!(verify("const X: string = 1;", ErrorMode::FailFast).is_err());
    }

    #[test]
    fn empty_schema_is_valid() {
        let schema = verify("", ErrorMode::FailFast).unwrap();
        assert!(schema.is_empty());
        assert_eq!(schema.name, Schema::DEFAULT_NAME);
    }
}
