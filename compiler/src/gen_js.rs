//! JavaScript output: a single ES module.
//!
//! Integers up to 32 bits are plain numbers; 64-bit integers are `BigInt`.
//! The varint helpers avoid bitwise operators on numbers, which would
//! truncate to 32 bits.

use std::path::PathBuf;

use ango_schema::{ConstValue, Constant, Fingerprint, Primitive, Schema};

use crate::{
    error::{GenerationError, GenerationErrorKind},
    naming::{to_camel_case, to_pascal_case, to_screaming_snake_case, to_snake_case, Scope},
    target::GeneratedFile,
    traits::CodeGenerator,
    utils::quote,
    wire::{plan, wire_field, Presence, WireField, WireKind, WireMessage},
};

const TARGET: &str = "JavaScript";
const VERSION_CONST: &str = "PROTOCOL_VERSION";
const WRITER: &str = "AngoWriter";
const READER: &str = "AngoReader";
/// Globals the generated runtime refers to; a module-level declaration with
/// one of these names would shadow it.
const RUNTIME_GLOBALS: [&str; 10] = [
    "ArrayBuffer", "BigInt", "DataView", "Error", "Math", "Number", "Object",
    "TextDecoder", "TextEncoder", "Uint8Array",
];
/// Instance members a field property would shadow.
const CLASS_MEMBERS: [&str; 2] = ["encode", "constructor"];
/// An object-literal key that sets the prototype instead of a property.
const PROTO_KEY: &str = "__proto__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JsOptions {
    /// Map 64-bit integers to `BigInt`. When off, schemas using them are
    /// rejected.
    pub bigint: bool,
}

impl Default for JsOptions {
    fn default() -> Self {
        JsOptions { bigint: true }
    }
}

#[derive(Debug, Clone, Default)]
pub struct JsGenerator {
    options: JsOptions,
}

impl JsGenerator {
    pub fn new(options: JsOptions) -> Self {
        JsGenerator { options }
    }
}

impl CodeGenerator for JsGenerator {
    const TARGET: &'static str = TARGET;

    fn generate(&self, schema: &Schema, version: &Fingerprint) -> Result<Vec<GeneratedFile>, GenerationError> {
        if !self.options.bigint {
            reject_64_bit(schema)?;
        }
        check_names(schema)?;

        let mut stem = to_snake_case(&schema.name);
        if stem.is_empty() {
            stem = Schema::DEFAULT_NAME.to_string();
        }
        let contents = module(schema, version, self.options.bigint);
        Ok(vec![GeneratedFile::new(PathBuf::from(format!("{}.js", stem)), contents)])
    }
}

fn unsupported_64_bit(declaration: String) -> GenerationError {
    GenerationError::new(
        TARGET,
        declaration.clone(),
        GenerationErrorKind::UnsupportedType {
            what:   declaration,
            reason: "64-bit integers need BigInt, which is disabled".to_string(),
        },
    )
}

fn reject_64_bit(schema: &Schema) -> Result<(), GenerationError> {
    for constant in &schema.constants {
        if constant.ty.is_64_bit_integer() {
            return Err(unsupported_64_bit(format!("const {}", constant.name)));
        }
    }
    for wire in plan(schema) {
        if let Some(field) = wire.fields.iter().find(|f| f.kind.is_64_bit()) {
            return Err(unsupported_64_bit(format!("field {}.{}", wire.message.name, field.field.name)));
        }
    }
    Ok(())
}

fn check_names(schema: &Schema) -> Result<(), GenerationError> {
    let mut top = Scope::new(TARGET);
    for reserved in [VERSION_CONST, WRITER, READER].into_iter().chain(RUNTIME_GLOBALS) {
        top.reserve(reserved);
    }
    for constant in &schema.constants {
        top.claim(&format!("const {}", constant.name), &to_screaming_snake_case(&constant.name))?;
    }
    for e in &schema.enums {
        top.claim(&format!("enum {}", e.name), &to_pascal_case(&e.name))?;

        let mut labels = Scope::new(TARGET);
        labels.reserve(PROTO_KEY);
        for variant in &e.variants {
            labels.claim(&format!("enum value {}.{}", e.name, variant.label), &variant.label)?;
        }
    }
    for message in &schema.messages {
        top.claim(&format!("message {}", message.name), &to_pascal_case(&message.name))?;

        let mut members = Scope::new(TARGET);
        for member in CLASS_MEMBERS {
            members.reserve(member);
        }
        for field in &message.fields {
            members.claim(&format!("field {}.{}", message.name, field.name), &to_camel_case(&field.name))?;
        }
    }
    Ok(())
}

fn constant_literal(constant: &Constant) -> String {
    match &constant.value {
        ConstValue::Bool(b) => b.to_string(),
        ConstValue::Integer(i) if constant.ty.is_64_bit_integer() => format!("{}n", i),
        ConstValue::Integer(i) => i.to_string(),
        ConstValue::Float(f)  => f.to_string(),
        ConstValue::String(s) => quote(s),
    }
}

fn module(schema: &Schema, version: &Fingerprint, bigint: bool) -> String {
    let mut lines = Vec::new();
    lines.push(format!("// Code generated by ango from schema {}. DO NOT EDIT.", schema.name));
    lines.push(String::new());
    lines.push(format!("export const {} = {};", VERSION_CONST, quote(version.as_str())));

    if !schema.constants.is_empty() {
        lines.push(String::new());
        for constant in &schema.constants {
            lines.push(format!(
                "export const {} = {};",
                to_screaming_snake_case(&constant.name),
                constant_literal(constant)
            ));
        }
    }

    for e in &schema.enums {
        lines.push(String::new());
        lines.push(format!("export const {} = Object.freeze({{", to_pascal_case(&e.name)));
        for variant in &e.variants {
            lines.push(format!("  {}: {},", variant.label, variant.value));
        }
        lines.push("});".to_string());
    }

    for wire in plan(schema) {
        lines.push(String::new());
        message_class(&mut lines, schema, &wire);
    }

    lines.push(String::new());
    lines.push(runtime(bigint));
    lines.join("\n")
}

fn default_value(wire: &WireField) -> &'static str {
    if wire.repeated {
        return "[]";
    }
    if wire.presence == Presence::WhenSet {
        return "null";
    }
    match wire.kind {
        WireKind::Bool => "false",
        WireKind::String => "\"\"",
        WireKind::Bytes => "new Uint8Array(0)",
        kind if kind.is_64_bit() => "0n",
        _ => "0",
    }
}

fn message_class(lines: &mut Vec<String>, schema: &Schema, wire: &WireMessage) {
    let name = to_pascal_case(&wire.message.name);

    lines.push(format!("export class {} {{", name));
    lines.push("  constructor(init = {}) {".to_string());
    for field in &wire.message.fields {
        let prop = to_camel_case(&field.name);
        lines.push(format!("    this.{} = init.{} ?? {};", prop, prop, default_value(&wire_field(field))));
    }
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  encode() {".to_string());
    lines.push(format!("    const w = new {}();", WRITER));
    lines.push(format!("    {}._write(w, this);", name));
    lines.push("    return w.finish();".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  static decode(bytes) {".to_string());
    lines.push(format!("    const r = new {}(bytes);", READER));
    lines.push(format!("    const m = {}._read(r);", name));
    lines.push(format!("    r.expectEnd({});", quote(&name)));
    lines.push("    return m;".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  static _write(w, m) {".to_string());
    lines.push("    if (m == null) {".to_string());
    lines.push("      w.writeVarUint(0);".to_string());
    lines.push("      return;".to_string());
    lines.push("    }".to_string());
    for field in &wire.fields {
        write_field(lines, schema, field);
    }
    lines.push("    w.writeVarUint(0);".to_string());
    lines.push("  }".to_string());
    lines.push(String::new());

    lines.push("  static _read(r) {".to_string());
    lines.push(format!("    const m = new {}();", name));
    lines.push("    for (;;) {".to_string());
    lines.push("      const tag = r.readVarUint();".to_string());
    lines.push("      switch (tag) {".to_string());
    lines.push("        case 0:".to_string());
    lines.push("          return m;".to_string());
    for field in &wire.fields {
        read_field(lines, schema, field);
    }
    lines.push("        default:".to_string());
    lines.push(format!("          throw new Error(`ango: unknown tag ${{tag}} in {}`);", name));
    lines.push("      }".to_string());
    lines.push("    }".to_string());
    lines.push("  }".to_string());
    lines.push("}".to_string());
}

/// Statement writing one value held in `expr`.
fn write_value(schema: &Schema, kind: WireKind, expr: &str) -> String {
    match kind {
        WireKind::Bool  => format!("w.writeBool({});", expr),
        WireKind::Uint8 | WireKind::Int8 => format!("w.writeByte({});", expr),
        WireKind::SignedVarint(Primitive::Int64)    => format!("w.writeVarInt64({});", expr),
        WireKind::SignedVarint(_)                   => format!("w.writeVarInt({});", expr),
        WireKind::UnsignedVarint(Primitive::Uint64) => format!("w.writeVarUint64({});", expr),
        WireKind::UnsignedVarint(_)                 => format!("w.writeVarUint({});", expr),
        WireKind::Float32 => format!("w.writeFloat32({});", expr),
        WireKind::Float64 => format!("w.writeFloat64({});", expr),
        WireKind::String  => format!("w.writeString({});", expr),
        WireKind::Bytes   => format!("w.writeBytes({});", expr),
        WireKind::Enum(_) => format!("w.writeVarInt({});", expr),
        WireKind::Message(id) => {
            format!("{}._write(w, {});", to_pascal_case(&schema.message(id).name), expr)
        }
    }
}

/// Expression reading one value.
fn read_value(schema: &Schema, kind: WireKind) -> String {
    match kind {
        WireKind::Bool  => "r.readBool()".to_string(),
        WireKind::Uint8 => "r.readByte()".to_string(),
        WireKind::Int8  => "r.readInt8()".to_string(),
        WireKind::SignedVarint(Primitive::Int64)    => "r.readVarInt64()".to_string(),
        WireKind::SignedVarint(_)                   => "r.readVarInt()".to_string(),
        WireKind::UnsignedVarint(Primitive::Uint64) => "r.readVarUint64()".to_string(),
        WireKind::UnsignedVarint(_)                 => "r.readVarUint()".to_string(),
        WireKind::Float32 => "r.readFloat32()".to_string(),
        WireKind::Float64 => "r.readFloat64()".to_string(),
        WireKind::String  => "r.readString()".to_string(),
        WireKind::Bytes   => "r.readBytes()".to_string(),
        WireKind::Enum(_) => "r.readVarInt()".to_string(),
        WireKind::Message(id) => format!("{}._read(r)", to_pascal_case(&schema.message(id).name)),
    }
}

fn write_field(lines: &mut Vec<String>, schema: &Schema, wire: &WireField) {
    let member = format!("m.{}", to_camel_case(&wire.field.name));
    let tag = wire.tag();
    if wire.repeated {
        lines.push(format!("    w.writeVarUint({});", tag));
        lines.push(format!("    w.writeVarUint({}.length);", member));
        lines.push(format!("    for (const v of {}) {{", member));
        lines.push(format!("      {}", write_value(schema, wire.kind, "v")));
        lines.push("    }".to_string());
        return;
    }
    match wire.presence {
        Presence::Always => {
            lines.push(format!("    w.writeVarUint({});", tag));
            lines.push(format!("    {}", write_value(schema, wire.kind, &member)));
        }
        Presence::WhenSet => {
            lines.push(format!("    if ({} != null) {{", member));
            lines.push(format!("      w.writeVarUint({});", tag));
            lines.push(format!("      {}", write_value(schema, wire.kind, &member)));
            lines.push("    }".to_string());
        }
    }
}

fn read_field(lines: &mut Vec<String>, schema: &Schema, wire: &WireField) {
    let member = format!("m.{}", to_camel_case(&wire.field.name));
    if wire.repeated {
        lines.push(format!("        case {}: {{", wire.tag()));
        lines.push("          const n = r.readLength();".to_string());
        lines.push("          const items = [];".to_string());
        lines.push("          for (let i = 0; i < n; i++) {".to_string());
        lines.push(format!("            items.push({});", read_value(schema, wire.kind)));
        lines.push("          }".to_string());
        lines.push(format!("          {} = items;", member));
        lines.push("          break;".to_string());
        lines.push("        }".to_string());
    } else {
        lines.push(format!("        case {}:", wire.tag()));
        lines.push(format!("          {} = {};", member, read_value(schema, wire.kind)));
        lines.push("          break;".to_string());
    }
}

const RUNTIME_HEAD: &str = r#"const angoTextEncoder = new TextEncoder();
const angoTextDecoder = new TextDecoder("utf-8", { fatal: true });

class AngoWriter {
  constructor() {
    this.bytes = [];
  }

  finish() {
    return Uint8Array.from(this.bytes);
  }

  writeByte(v) {
    this.bytes.push(v & 0xff);
  }

  writeBool(v) {
    this.bytes.push(v ? 1 : 0);
  }

  writeVarUint(v) {
    while (v >= 0x80) {
      this.bytes.push((v % 0x80) + 0x80);
      v = Math.floor(v / 0x80);
    }
    this.bytes.push(v);
  }

  writeVarInt(v) {
    this.writeVarUint(v >= 0 ? v * 2 : -v * 2 - 1);
  }

  writeFloat32(v) {
    const view = new DataView(new ArrayBuffer(4));
    view.setFloat32(0, v, true);
    this.bytes.push(...new Uint8Array(view.buffer));
  }

  writeFloat64(v) {
    const view = new DataView(new ArrayBuffer(8));
    view.setFloat64(0, v, true);
    this.bytes.push(...new Uint8Array(view.buffer));
  }

  writeBytes(v) {
    this.writeVarUint(v.length);
    for (const b of v) {
      this.bytes.push(b);
    }
  }

  writeString(v) {
    this.writeBytes(angoTextEncoder.encode(v));
  }"#;

const WRITER_64: &str = r#"
  writeVarUint64(v) {
    v = BigInt.asUintN(64, BigInt(v));
    while (v >= 0x80n) {
      this.bytes.push(Number(v & 0x7fn) + 0x80);
      v >>= 7n;
    }
    this.bytes.push(Number(v));
  }

  writeVarInt64(v) {
    v = BigInt.asIntN(64, BigInt(v));
    this.writeVarUint64(v >= 0n ? v * 2n : -v * 2n - 1n);
  }"#;

const READER_HEAD: &str = r#"}

class AngoReader {
  constructor(bytes) {
    this.bytes = bytes instanceof Uint8Array ? bytes : new Uint8Array(bytes);
    this.view = new DataView(this.bytes.buffer, this.bytes.byteOffset, this.bytes.byteLength);
    this.pos = 0;
  }

  remaining() {
    return this.bytes.length - this.pos;
  }

  need(n) {
    if (this.remaining() < n) {
      throw new Error("ango: unexpected end of data");
    }
  }

  expectEnd(name) {
    if (this.remaining() !== 0) {
      throw new Error(`ango: trailing data after ${name}`);
    }
  }

  readByte() {
    this.need(1);
    return this.bytes[this.pos++];
  }

  readInt8() {
    return (this.readByte() << 24) >> 24;
  }

  readBool() {
    return this.readByte() !== 0;
  }

  readVarUint() {
    let v = 0;
    let scale = 1;
    for (let i = 0; i < 10; i++) {
      const b = this.readByte();
      v += (b % 0x80) * scale;
      if (b < 0x80) {
        return v;
      }
      scale *= 0x80;
    }
    throw new Error("ango: varint overflows 64 bits");
  }

  readVarInt() {
    const u = this.readVarUint();
    return u % 2 === 0 ? u / 2 : -(u + 1) / 2;
  }

  readFloat32() {
    this.need(4);
    const v = this.view.getFloat32(this.pos, true);
    this.pos += 4;
    return v;
  }

  readFloat64() {
    this.need(8);
    const v = this.view.getFloat64(this.pos, true);
    this.pos += 8;
    return v;
  }

  // Every encoded element takes at least one byte, so a count past the end
  // of the input is truncated data.
  readLength() {
    const n = this.readVarUint();
    this.need(n);
    return n;
  }

  readBytes() {
    const n = this.readLength();
    const v = this.bytes.slice(this.pos, this.pos + n);
    this.pos += n;
    return v;
  }

  readString() {
    return angoTextDecoder.decode(this.readBytes());
  }"#;

const READER_64: &str = r#"
  readVarUint64() {
    let v = 0n;
    for (let shift = 0n; shift < 70n; shift += 7n) {
      const b = this.readByte();
      v |= BigInt(b & 0x7f) << shift;
      if (b < 0x80) {
        return BigInt.asUintN(64, v);
      }
    }
    throw new Error("ango: varint overflows 64 bits");
  }

  readVarInt64() {
    const u = this.readVarUint64();
    return (u >> 1n) ^ -(u & 1n);
  }"#;

/// The private reader and writer. The 64-bit helpers use `BigInt` literals,
/// so they are only emitted when `bigint` is on.
fn runtime(bigint: bool) -> String {
    let mut out = String::from(RUNTIME_HEAD);
    if bigint {
        out.push('\n');
        out.push_str(WRITER_64);
    }
    out.push('\n');
    out.push_str(READER_HEAD);
    if bigint {
        out.push('\n');
        out.push_str(READER_64);
    }
    out.push_str("\n}\n");
    out
}
