//! Go output: one file of types and one file of wire codec.
//!
//! Message-typed fields are pointers so that self-referencing messages stay
//! representable; `nil` means "not set" and the field is left off the wire.

use std::path::PathBuf;

use ango_schema::{ConstValue, Constant, Enum, Fingerprint, Message, Primitive, Schema, TypeRef};

use crate::{
    error::{GenerationError, GenerationErrorKind},
    naming::{is_identifier, to_pascal_case, to_snake_case, Scope, GO_KEYWORDS},
    target::GeneratedFile,
    traits::CodeGenerator,
    utils::quote,
    wire::{plan, wire_field, Presence, WireField, WireKind, WireMessage},
};

const TARGET: &str = "Go";
const VERSION_CONST: &str = "ProtocolVersion";
/// Methods every generated struct carries.
const MESSAGE_METHODS: [&str; 2] = ["MarshalAngo", "UnmarshalAngo"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoOptions {
    /// Package clause of both generated files.
    pub package: String,
}

impl Default for GoOptions {
    fn default() -> Self {
        GoOptions { package: "main".to_string() }
    }
}

#[derive(Debug, Clone, Default)]
pub struct GoGenerator {
    options: GoOptions,
}

impl GoGenerator {
    pub fn new(options: GoOptions) -> Self {
        GoGenerator { options }
    }
}

impl CodeGenerator for GoGenerator {
    const TARGET: &'static str = TARGET;

    fn generate(&self, schema: &Schema, version: &Fingerprint) -> Result<Vec<GeneratedFile>, GenerationError> {
        let package = &self.options.package;
        if !is_identifier(package) || package == "_" || GO_KEYWORDS.contains(&package.as_str()) {
            return Err(GenerationError::new(
                TARGET,
                format!("package {}", package),
                GenerationErrorKind::InvalidIdentifier(format!("package {}", package)),
            ));
        }
        check_names(schema)?;

        let stem = file_stem(&schema.name);
        Ok(vec![
            GeneratedFile::new(PathBuf::from(format!("{}_ango.go", stem)), types_file(schema, version, package)),
            GeneratedFile::new(PathBuf::from(format!("{}_ango_codec.go", stem)), codec_file(schema, package)),
        ])
    }
}

fn file_stem(protocol: &str) -> String {
    let stem = to_snake_case(protocol);
    if stem.is_empty() {
        Schema::DEFAULT_NAME.to_string()
    } else {
        stem
    }
}

/// Rejects schemas whose Go identifiers would clash.
fn check_names(schema: &Schema) -> Result<(), GenerationError> {
    let mut top = Scope::new(TARGET);
    top.reserve(VERSION_CONST);
    for constant in &schema.constants {
        top.claim(&format!("const {}", constant.name), &to_pascal_case(&constant.name))?;
    }
    for e in &schema.enums {
        let type_name = to_pascal_case(&e.name);
        top.claim(&format!("enum {}", e.name), &type_name)?;
        for variant in &e.variants {
            let ident = format!("{}{}", type_name, to_pascal_case(&variant.label));
            top.claim(&format!("enum value {}.{}", e.name, variant.label), &ident)?;
        }
    }
    for message in &schema.messages {
        top.claim(&format!("message {}", message.name), &to_pascal_case(&message.name))?;

        let mut members = Scope::new(TARGET);
        for method in MESSAGE_METHODS {
            members.reserve(method);
        }
        for field in &message.fields {
            members.claim(&format!("field {}.{}", message.name, field.name), &to_pascal_case(&field.name))?;
        }
    }
    Ok(())
}

fn header(lines: &mut Vec<String>, schema: &Schema, package: &str) {
    lines.push(format!("// Code generated by ango from schema {}. DO NOT EDIT.", schema.name));
    lines.push(String::new());
    lines.push(format!("package {}", package));
    lines.push(String::new());
}

fn primitive_type(p: Primitive) -> &'static str {
    match p {
        Primitive::Bytes => "[]byte",
        other => other.name(),
    }
}

/// Go type of one element, before modifiers are applied.
fn element_type(schema: &Schema, ty: TypeRef) -> String {
    match ty {
        TypeRef::Primitive(p) => primitive_type(p).to_string(),
        TypeRef::Enum(id)     => to_pascal_case(&schema.enum_(id).name),
        TypeRef::Message(id)  => format!("*{}", to_pascal_case(&schema.message(id).name)),
    }
}

fn field_type(schema: &Schema, wire: &WireField) -> String {
    let element = element_type(schema, wire.field.ty);
    if wire.repeated {
        format!("[]{}", element)
    } else if wire.field.is_optional() && !matches!(wire.kind, WireKind::Message(_)) {
        format!("*{}", element)
    } else {
        element
    }
}

/// Lines of a struct or const block, one `\t`-indented row per entry. Every
/// cell but the last is padded to its column width plus one space, which is
/// how gofmt lays these blocks out.
fn aligned(rows: &[[String; 3]]) -> Vec<String> {
    let name_width = rows.iter().map(|row| row[0].len()).max().unwrap_or(0);
    let type_width = rows.iter().map(|row| row[1].len()).max().unwrap_or(0);
    rows.iter()
        .map(|[name, ty, rest]| format!("\t{:<nw$} {:<tw$} {}", name, ty, rest, nw = name_width, tw = type_width))
        .collect()
}

fn constant_literal(constant: &Constant) -> String {
    match &constant.value {
        ConstValue::Bool(b)    => b.to_string(),
        ConstValue::Integer(i) => i.to_string(),
        ConstValue::Float(f)   => f.to_string(),
        ConstValue::String(s)  => quote(s),
    }
}

fn types_file(schema: &Schema, version: &Fingerprint, package: &str) -> String {
    let mut lines = Vec::new();
    header(&mut lines, schema, package);
    if !schema.enums.is_empty() {
        lines.push("import \"fmt\"".to_string());
        lines.push(String::new());
    }

    lines.push(format!("// {} identifies the wire shape of schema {}.", VERSION_CONST, schema.name));
    lines.push(format!("const {} = {}", VERSION_CONST, quote(version.as_str())));

    if !schema.constants.is_empty() {
        lines.push(String::new());
        lines.push("const (".to_string());
        let rows: Vec<[String; 3]> = schema
            .constants
            .iter()
            .map(|constant| {
                [
                    to_pascal_case(&constant.name),
                    primitive_type(constant.ty).to_string(),
                    format!("= {}", constant_literal(constant)),
                ]
            })
            .collect();
        lines.extend(aligned(&rows));
        lines.push(")".to_string());
    }

    for e in &schema.enums {
        lines.push(String::new());
        enum_type(&mut lines, e);
    }

    for wire in plan(schema) {
        lines.push(String::new());
        struct_type(&mut lines, schema, wire.message);
    }

    lines.push(String::new());
    lines.join("\n")
}

fn enum_type(lines: &mut Vec<String>, e: &Enum) {
    let name = to_pascal_case(&e.name);
    lines.push(format!("type {} int32", name));
    if !e.variants.is_empty() {
        lines.push(String::new());
        lines.push("const (".to_string());
        let rows: Vec<[String; 3]> = e
            .variants
            .iter()
            .map(|variant| {
                [
                    format!("{}{}", name, to_pascal_case(&variant.label)),
                    name.clone(),
                    format!("= {}", variant.value),
                ]
            })
            .collect();
        lines.extend(aligned(&rows));
        lines.push(")".to_string());
    }
    lines.push(String::new());
    lines.push(format!("func (v {}) String() string {{", name));
    lines.push("\tswitch v {".to_string());
    for variant in e.variants_by_value() {
        lines.push(format!("\tcase {}{}:", name, to_pascal_case(&variant.label)));
        lines.push(format!("\t\treturn {}", quote(&variant.label)));
    }
    lines.push("\t}".to_string());
    lines.push(format!("\treturn fmt.Sprintf(\"{}(%d)\", int32(v))", name));
    lines.push("}".to_string());
}

fn struct_type(lines: &mut Vec<String>, schema: &Schema, message: &Message) {
    lines.push(format!("type {} struct {{", to_pascal_case(&message.name)));
    let rows: Vec<[String; 3]> = message
        .fields
        .iter()
        .map(|field| {
            [
                to_pascal_case(&field.name),
                field_type(schema, &wire_field(field)),
                format!("`ango:\"{}\" json:\"{}\"`", field.tag, field.name),
            ]
        })
        .collect();
    lines.extend(aligned(&rows));
    lines.push("}".to_string());
}

const CODEC_RUNTIME: &str = r#"import (
	"encoding/binary"
	"errors"
	"fmt"
	"math"
	"unicode/utf8"
)

var errAngoTruncated = errors.New("ango: unexpected end of data")

type angoWriter struct {
	buf []byte
}

func (w *angoWriter) writeByte(v byte) {
	w.buf = append(w.buf, v)
}

func (w *angoWriter) writeBool(v bool) {
	if v {
		w.buf = append(w.buf, 1)
	} else {
		w.buf = append(w.buf, 0)
	}
}

func (w *angoWriter) writeVarUint(v uint64) {
	for v >= 0x80 {
		w.buf = append(w.buf, byte(v)|0x80)
		v >>= 7
	}
	w.buf = append(w.buf, byte(v))
}

func (w *angoWriter) writeVarInt(v int64) {
	w.writeVarUint(uint64(v<<1) ^ uint64(v>>63))
}

func (w *angoWriter) writeFloat32(v float32) {
	w.buf = binary.LittleEndian.AppendUint32(w.buf, math.Float32bits(v))
}

func (w *angoWriter) writeFloat64(v float64) {
	w.buf = binary.LittleEndian.AppendUint64(w.buf, math.Float64bits(v))
}

func (w *angoWriter) writeBytes(v []byte) {
	w.writeVarUint(uint64(len(v)))
	w.buf = append(w.buf, v...)
}

func (w *angoWriter) writeString(v string) {
	w.writeVarUint(uint64(len(v)))
	w.buf = append(w.buf, v...)
}

type angoReader struct {
	buf []byte
	pos int
}

func (r *angoReader) remaining() int {
	return len(r.buf) - r.pos
}

func (r *angoReader) readByte() (byte, error) {
	if r.pos >= len(r.buf) {
		return 0, errAngoTruncated
	}
	v := r.buf[r.pos]
	r.pos++
	return v, nil
}

func (r *angoReader) readBool() (bool, error) {
	v, err := r.readByte()
	return v != 0, err
}

func (r *angoReader) readVarUint() (uint64, error) {
	var v uint64
	for shift := uint(0); shift < 64; shift += 7 {
		b, err := r.readByte()
		if err != nil {
			return 0, err
		}
		v |= uint64(b&0x7f) << shift
		if b < 0x80 {
			return v, nil
		}
	}
	return 0, errors.New("ango: varint overflows 64 bits")
}

func (r *angoReader) readVarInt() (int64, error) {
	u, err := r.readVarUint()
	return int64(u>>1) ^ -int64(u&1), err
}

func (r *angoReader) readFloat32() (float32, error) {
	if r.remaining() < 4 {
		return 0, errAngoTruncated
	}
	v := math.Float32frombits(binary.LittleEndian.Uint32(r.buf[r.pos:]))
	r.pos += 4
	return v, nil
}

func (r *angoReader) readFloat64() (float64, error) {
	if r.remaining() < 8 {
		return 0, errAngoTruncated
	}
	v := math.Float64frombits(binary.LittleEndian.Uint64(r.buf[r.pos:]))
	r.pos += 8
	return v, nil
}

// readLength reads a length or element count. Every encoded element takes
// at least one byte, so a count past the end of the input is truncated data.
func (r *angoReader) readLength() (int, error) {
	n, err := r.readVarUint()
	if err != nil {
		return 0, err
	}
	if n > uint64(r.remaining()) {
		return 0, errAngoTruncated
	}
	return int(n), nil
}

func (r *angoReader) readBytes() ([]byte, error) {
	n, err := r.readLength()
	if err != nil {
		return nil, err
	}
	v := make([]byte, n)
	copy(v, r.buf[r.pos:r.pos+n])
	r.pos += n
	return v, nil
}

func (r *angoReader) readString() (string, error) {
	n, err := r.readLength()
	if err != nil {
		return "", err
	}
	raw := r.buf[r.pos : r.pos+n]
	if !utf8.Valid(raw) {
		return "", errors.New("ango: string is not valid UTF-8")
	}
	r.pos += n
	return string(raw), nil
}

func angoUnknownTag(message string, tag uint64) error {
	return fmt.Errorf("ango: unknown tag %d in %s", tag, message)
}"#;

fn codec_file(schema: &Schema, package: &str) -> String {
    let mut lines = Vec::new();
    header(&mut lines, schema, package);
    lines.push(CODEC_RUNTIME.to_string());
    for wire in plan(schema) {
        lines.push(String::new());
        message_codec(&mut lines, schema, &wire);
    }
    lines.push(String::new());
    lines.join("\n")
}

fn message_codec(lines: &mut Vec<String>, schema: &Schema, wire: &WireMessage) {
    let name = to_pascal_case(&wire.message.name);

    lines.push(format!("// MarshalAngo encodes m. A nil m encodes as an empty {}.", name));
    lines.push(format!("func (m *{}) MarshalAngo() []byte {{", name));
    lines.push("\tw := &angoWriter{}".to_string());
    lines.push("\tm.encodeTo(w)".to_string());
    lines.push("\treturn w.buf".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push("// UnmarshalAngo replaces m with the message encoded in data, which must".to_string());
    lines.push("// hold exactly one message.".to_string());
    lines.push(format!("func (m *{}) UnmarshalAngo(data []byte) error {{", name));
    lines.push("\tr := &angoReader{buf: data}".to_string());
    lines.push(format!("\t*m = {}{{}}", name));
    lines.push("\tif err := m.decodeFrom(r); err != nil {".to_string());
    lines.push("\t\treturn err".to_string());
    lines.push("\t}".to_string());
    lines.push("\tif r.remaining() != 0 {".to_string());
    lines.push(format!("\t\treturn errors.New(\"ango: trailing data after {}\")", name));
    lines.push("\t}".to_string());
    lines.push("\treturn nil".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("func (m *{}) encodeTo(w *angoWriter) {{", name));
    lines.push("\tif m == nil {".to_string());
    lines.push("\t\tw.writeVarUint(0)".to_string());
    lines.push("\t\treturn".to_string());
    lines.push("\t}".to_string());
    for field in &wire.fields {
        encode_field(lines, field);
    }
    lines.push("\tw.writeVarUint(0)".to_string());
    lines.push("}".to_string());
    lines.push(String::new());

    lines.push(format!("func (m *{}) decodeFrom(r *angoReader) error {{", name));
    lines.push("\tfor {".to_string());
    lines.push("\t\ttag, err := r.readVarUint()".to_string());
    lines.push("\t\tif err != nil {".to_string());
    lines.push("\t\t\treturn err".to_string());
    lines.push("\t\t}".to_string());
    lines.push("\t\tswitch tag {".to_string());
    lines.push("\t\tcase 0:".to_string());
    lines.push("\t\t\treturn nil".to_string());
    for field in &wire.fields {
        lines.push(format!("\t\tcase {}:", field.tag()));
        decode_field(lines, schema, field);
    }
    lines.push("\t\tdefault:".to_string());
    lines.push(format!("\t\t\treturn angoUnknownTag({}, tag)", quote(&name)));
    lines.push("\t\t}".to_string());
    lines.push("\t}".to_string());
    lines.push("}".to_string());
}

/// Statement writing one value held in `expr`.
fn encode_value(kind: WireKind, expr: &str) -> String {
    match kind {
        WireKind::Bool              => format!("w.writeBool({})", expr),
        WireKind::Uint8             => format!("w.writeByte({})", expr),
        WireKind::Int8              => format!("w.writeByte(byte({}))", expr),
        WireKind::SignedVarint(_)   => format!("w.writeVarInt(int64({}))", expr),
        WireKind::UnsignedVarint(_) => format!("w.writeVarUint(uint64({}))", expr),
        WireKind::Float32           => format!("w.writeFloat32({})", expr),
        WireKind::Float64           => format!("w.writeFloat64({})", expr),
        WireKind::String            => format!("w.writeString({})", expr),
        WireKind::Bytes             => format!("w.writeBytes({})", expr),
        WireKind::Enum(_)           => format!("w.writeVarInt(int64({}))", expr),
        WireKind::Message(_)        => format!("{}.encodeTo(w)", expr),
    }
}

fn encode_field(lines: &mut Vec<String>, wire: &WireField) {
    let member = format!("m.{}", to_pascal_case(&wire.field.name));
    let tag = wire.tag();
    if wire.repeated {
        lines.push(format!("\tw.writeVarUint({})", tag));
        lines.push(format!("\tw.writeVarUint(uint64(len({})))", member));
        lines.push(format!("\tfor _, v := range {} {{", member));
        lines.push(format!("\t\t{}", encode_value(wire.kind, "v")));
        lines.push("\t}".to_string());
        return;
    }
    match wire.presence {
        Presence::Always => {
            lines.push(format!("\tw.writeVarUint({})", tag));
            lines.push(format!("\t{}", encode_value(wire.kind, &member)));
        }
        Presence::WhenSet => {
            let value = match wire.kind {
                WireKind::Message(_) => member.clone(),
                _ => format!("*{}", member),
            };
            lines.push(format!("\tif {} != nil {{", member));
            lines.push(format!("\t\tw.writeVarUint({})", tag));
            lines.push(format!("\t\t{}", encode_value(wire.kind, &value)));
            lines.push("\t}".to_string());
        }
    }
}

fn push_err_check(lines: &mut Vec<String>, indent: &str) {
    lines.push(format!("{}if err != nil {{", indent));
    lines.push(format!("{}\treturn err", indent));
    lines.push(format!("{}}}", indent));
}

/// Statements that leave one decoded value in `val`.
fn decode_value(lines: &mut Vec<String>, schema: &Schema, kind: WireKind, indent: &str) {
    let (read, convert) = match kind {
        WireKind::Bool    => ("readBool", None),
        WireKind::Uint8   => ("readByte", None),
        WireKind::Int8    => ("readByte", Some("int8".to_string())),
        WireKind::SignedVarint(Primitive::Int64)    => ("readVarInt", None),
        WireKind::SignedVarint(p)                   => ("readVarInt", Some(p.name().to_string())),
        WireKind::UnsignedVarint(Primitive::Uint64) => ("readVarUint", None),
        WireKind::UnsignedVarint(p)                 => ("readVarUint", Some(p.name().to_string())),
        WireKind::Float32 => ("readFloat32", None),
        WireKind::Float64 => ("readFloat64", None),
        WireKind::String  => ("readString", None),
        WireKind::Bytes   => ("readBytes", None),
        WireKind::Enum(id) => ("readVarInt", Some(to_pascal_case(&schema.enum_(id).name))),
        WireKind::Message(id) => {
            let name = to_pascal_case(&schema.message(id).name);
            lines.push(format!("{}val := &{}{{}}", indent, name));
            lines.push(format!("{}if err := val.decodeFrom(r); err != nil {{", indent));
            lines.push(format!("{}\treturn err", indent));
            lines.push(format!("{}}}", indent));
            return;
        }
    };
    match convert {
        None => {
            lines.push(format!("{}val, err := r.{}()", indent, read));
            push_err_check(lines, indent);
        }
        Some(go_type) => {
            lines.push(format!("{}raw, err := r.{}()", indent, read));
            push_err_check(lines, indent);
            lines.push(format!("{}val := {}(raw)", indent, go_type));
        }
    }
}

fn decode_field(lines: &mut Vec<String>, schema: &Schema, wire: &WireField) {
    let member = format!("m.{}", to_pascal_case(&wire.field.name));
    if wire.repeated {
        lines.push("\t\t\tn, err := r.readLength()".to_string());
        push_err_check(lines, "\t\t\t");
        let element = element_type(schema, wire.field.ty);
        lines.push(format!("\t\t\t{} = make([]{}, 0, n)", member, element));
        lines.push("\t\t\tfor i := 0; i < n; i++ {".to_string());
        decode_value(lines, schema, wire.kind, "\t\t\t\t");
        lines.push(format!("\t\t\t\t{} = append({}, val)", member, member));
        lines.push("\t\t\t}".to_string());
        return;
    }
    decode_value(lines, schema, wire.kind, "\t\t\t");
    let boxed = wire.field.is_optional() && !matches!(wire.kind, WireKind::Message(_));
    if boxed {
        lines.push(format!("\t\t\t{} = &val", member));
    } else {
        lines.push(format!("\t\t\t{} = val", member));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile_schema;
    use crate::compiler::ParseOptions;

    fn generate(text: &str) -> Result<Vec<GeneratedFile>, GenerationError> {
        let compiled = compile_schema(text, &ParseOptions::default()).unwrap();
        GoGenerator::default().generate(&compiled.schema, &compiled.fingerprint)
    }

    #[test]
    fn point_struct_and_codec() {
        let files = generate("name geo; message Point { x: int32 = 1; y: int32 = 2; }").unwrap();
        assert_eq!(files[0].path, PathBuf::from("geo_ango.go"));
        assert_eq!(files[1].path, PathBuf::from("geo_ango_codec.go"));

        let types = &files[0].contents;
        assert!(types.starts_with("// Code generated by ango from schema geo. DO NOT EDIT.\n\npackage main\n"));
        assert!(types.contains("type Point struct {\n\tX int32 `ango:\"1\" json:\"x\"`\n\tY int32 `ango:\"2\" json:\"y\"`\n}"));
        assert!(!types.contains("import \"fmt\""));

        let codec = &files[1].contents;
        assert!(codec.contains("func (m *Point) MarshalAngo() []byte {"));
        assert!(codec.contains("\tw.writeVarUint(1)\n\tw.writeVarInt(int64(m.X))\n\tw.writeVarUint(2)\n\tw.writeVarInt(int64(m.Y))\n"));
        assert!(codec.contains("\t\tcase 2:\n\t\t\traw, err := r.readVarInt()"));
    }

    #[test]
    fn version_constant_is_the_fingerprint() {
        let compiled = compile_schema("message A { a: bool = 1; }", &ParseOptions::default()).unwrap();
        let files = GoGenerator::default().generate(&compiled.schema, &compiled.fingerprint).unwrap();
        let expected = format!("const ProtocolVersion = \"{}\"", compiled.fingerprint);
        assert!(files[0].contents.contains(&expected));
    }

    #[test]
    fn modifiers_map_to_pointers_and_slices() {
        let files = generate(
            "enum Mood { HAPPY = 1; SAD = -1; }\n\
             message Node { next: Node = 1; kids: repeated Node = 2; label: optional string = 3; \
             mood: Mood = 4; blob: bytes = 5; tags: repeated string = 6; }",
        )
        .unwrap();
        let types = &files[0].contents;
        assert!(types.contains("\tNext  *Node    `ango:\"1\" json:\"next\""));
        assert!(types.contains("\tKids  []*Node  `ango:\"2\" json:\"kids\""));
        assert!(types.contains("\tLabel *string  `ango:\"3\" json:\"label\""));
        assert!(types.contains("\tMood  Mood     `ango:\"4\" json:\"mood\""));
        assert!(types.contains("\tBlob  []byte   `ango:\"5\" json:\"blob\""));
        assert!(types.contains("\tTags  []string `ango:\"6\" json:\"tags\""));
        assert!(types.contains("import \"fmt\""));
        assert!(types.contains("\tMoodHappy Mood = 1\n\tMoodSad   Mood = -1\n"));
        assert!(types.contains("\tcase MoodSad:\n\t\treturn \"SAD\"\n\tcase MoodHappy:"));

        let codec = &files[1].contents;
        assert!(codec.contains("\tif m.Next != nil {\n\t\tw.writeVarUint(1)\n\t\tm.Next.encodeTo(w)\n\t}"));
        assert!(codec.contains("\tif m.Label != nil {\n\t\tw.writeVarUint(3)\n\t\tw.writeString(*m.Label)\n\t}"));
        assert!(codec.contains("\t\t\tm.Kids = make([]*Node, 0, n)"));
        assert!(codec.contains("\t\t\tm.Label = &val"));
        assert!(codec.contains("\t\t\tval := Mood(raw)"));
    }

    #[test]
    fn constants_are_typed() {
        let files = generate(
            "const max_users: uint16 = 100; const greeting: string = \"hi\\n\"; const ratio: float32 = 1.5;",
        )
        .unwrap();
        let types = &files[0].contents;
        assert!(types.contains("\tMaxUsers uint16  = 100\n"));
        assert!(types.contains("\tGreeting string  = \"hi\\n\"\n"));
        assert!(types.contains("\tRatio    float32 = 1.5\n"));
    }

    #[test]
    fn rejects_colliding_names() {
        let err = generate("message user_name { a: bool = 1; } enum UserName { A = 0; }").unwrap_err();
        assert!(matches!(err.kind, GenerationErrorKind::NameCollision { .. }));

        let err = generate("message M { user_name: bool = 1; userName: bool = 2; }").unwrap_err();
        assert_eq!(err.declaration, "field M.userName");

        let err = generate("message M { marshal_ango: bool = 1; }").unwrap_err();
        assert!(matches!(err.kind, GenerationErrorKind::NameCollision { .. }));

        let err = generate("const protocol_version: bool = true;").unwrap_err();
        assert_eq!(err.target, "Go");
    }

    #[test]
    fn rejects_invalid_package() {
        let compiled = compile_schema("", &ParseOptions::default()).unwrap();
        for package in ["type", "my-pkg", "", "_"] {
            let generator = GoGenerator::new(GoOptions { package: package.to_string() });
            let err = generator.generate(&compiled.schema, &compiled.fingerprint).unwrap_err();
            assert!(matches!(err.kind, GenerationErrorKind::InvalidIdentifier(_)));
        }
    }

    #[test]
    fn empty_schema_still_generates() {
        let files = generate("").unwrap();
        assert_eq!(files[0].path, PathBuf::from("protocol_ango.go"));
        assert!(files[0].contents.contains("const ProtocolVersion = "));
        assert!(files[1].contents.contains("type angoReader struct"));
    }
}
