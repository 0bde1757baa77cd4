#![cfg(test)]

//! Golden wire bytes. A reference codec that walks the shared wire plan pins
//! the bytes; the generated JavaScript and Go codecs are checked against the
//! same vectors when `node` or `go` is on PATH.

use std::{collections::BTreeMap, fs, path::Path, process::Command};

use ango_compiler::{
    compile_schema,
    wire::{plan, Presence, WireKind, WireMessage},
    GeneratedFile, GoOptions, JsOptions, ParseOptions, Target,
};
use ango_schema::{MessageId, Schema};
use tempfile::TempDir;

const VECTORS: &str = r#"
name vectors;

enum Kind {
  ZERO = 0;
  NEG = -3;
}

message Point {
  x: int32 = 1;
  y: int32 = 2;
}

message Wide {
  lo: int64 = 1;
  hi: uint64 = 2;
}

message Shape {
  label: optional string = 1;
  points: repeated Point = 2;
  kind: Kind = 3;
  origin: Point = 4;
}
"#;

/// A decoded value, shaped the way the wire plan describes it.
#[derive(Debug, Clone, PartialEq)]
enum Value {
    Bool(bool),
    Int(i64),
    Uint(u64),
    F32(f32),
    F64(f64),
    Str(String),
    Bytes(Vec<u8>),
    Message(Record),
    List(Vec<Value>),
}

/// Field values keyed by tag.
type Record = BTreeMap<u32, Value>;

struct Vector {
    message: &'static str,
    record:  Record,
    hex:     &'static str,
}

/// Input every decoder must reject, decoded as a `Point`.
const MALFORMED: [&str; 3] = [
    "0101",         // truncated before the terminator
    "0101020400ff", // trailing byte
    "0501",         // unknown tag
];

fn point(x: i64, y: i64) -> Record {
    BTreeMap::from([(1, Value::Int(x)), (2, Value::Int(y))])
}

fn vectors() -> Vec<Vector> {
    vec![
        Vector {
            message: "Point",
            record:  point(-1, 2),
            hex:     "0101020400",
        },
        Vector {
            message: "Wide",
            record:  BTreeMap::from([(1, Value::Int(i64::MIN)), (2, Value::Uint(u64::MAX))]),
            hex:     "01ffffffffffffffffff0102ffffffffffffffffff0100",
        },
        Vector {
            message: "Wide",
            record:  BTreeMap::from([(1, Value::Int(i64::MAX)), (2, Value::Uint(0))]),
            hex:     "01feffffffffffffffff01020000",
        },
        // Unset optional and message fields are left off the wire.
        Vector {
            message: "Shape",
            record:  BTreeMap::from([
                (2, Value::List(vec![Value::Message(point(1, 2)), Value::Message(point(0, 0))])),
                (3, Value::Int(-3)),
            ]),
            hex:     "020201020204000100020000030500",
        },
        Vector {
            message: "Shape",
            record:  BTreeMap::from([
                (1, Value::Str("hi".to_string())),
                (2, Value::List(Vec::new())),
                (3, Value::Int(0)),
                (4, Value::Message(point(0, 0))),
            ]),
            hex:     "010268690200030004010002000000",
        },
    ]
}

fn put_varuint(out: &mut Vec<u8>, mut v: u64) {
    while v >= 0x80 {
        out.push((v as u8 & 0x7f) | 0x80);
        v >>= 7;
    }
    out.push(v as u8);
}

fn zigzag(v: i64) -> u64 {
    ((v << 1) ^ (v >> 63)) as u64
}

fn unzigzag(u: u64) -> i64 {
    ((u >> 1) as i64) ^ -((u & 1) as i64)
}

struct Input<'b> {
    bytes: &'b [u8],
    pos:   usize,
}

impl<'b> Input<'b> {
    fn take(&mut self, n: usize) -> Result<&'b [u8], String> {
        let bytes = self.bytes;
        if bytes.len() - self.pos < n {
            return Err("unexpected end of data".to_string());
        }
        let slice = &bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn byte(&mut self) -> Result<u8, String> {
        Ok(self.take(1)?[0])
    }

    fn varuint(&mut self) -> Result<u64, String> {
        let mut v = 0u64;
        for shift in (0..64).step_by(7) {
            let b = self.byte()?;
            v |= u64::from(b & 0x7f) << shift;
            if b < 0x80 {
                return Ok(v);
            }
        }
        Err("varint overflows 64 bits".to_string())
    }

    fn length(&mut self) -> Result<usize, String> {
        let n = self.varuint()?;
        usize::try_from(n).map_err(|_| "length out of range".to_string())
    }
}

/// Encodes and decodes records by walking the wire plan, the same plan both
/// generators render from.
struct Reference<'a> {
    plan: Vec<WireMessage<'a>>,
}

impl<'a> Reference<'a> {
    fn new(schema: &'a Schema) -> Self {
        Reference { plan: plan(schema) }
    }

    fn encode(&self, id: MessageId, record: &Record, out: &mut Vec<u8>) {
        for field in &self.plan[id.0].fields {
            let Some(value) = record.get(&field.tag()) else {
                assert_eq!(field.presence, Presence::WhenSet, "field {} needs a value", field.field.name);
                continue;
            };
            put_varuint(out, u64::from(field.tag()));
            match value {
                Value::List(items) => {
                    assert!(field.repeated, "field {} is not repeated", field.field.name);
                    put_varuint(out, items.len() as u64);
                    for item in items {
                        self.encode_value(field.kind, item, out);
                    }
                }
                single => self.encode_value(field.kind, single, out),
            }
        }
        out.push(0);
    }

    fn encode_value(&self, kind: WireKind, value: &Value, out: &mut Vec<u8>) {
        match (kind, value) {
            (WireKind::Bool, Value::Bool(b)) => out.push(u8::from(*b)),
            (WireKind::Uint8, Value::Uint(v)) => out.push(*v as u8),
            (WireKind::Int8, Value::Int(v)) => out.push(*v as i8 as u8),
            (WireKind::SignedVarint(_) | WireKind::Enum(_), Value::Int(v)) => put_varuint(out, zigzag(*v)),
            (WireKind::UnsignedVarint(_), Value::Uint(v)) => put_varuint(out, *v),
            (WireKind::Float32, Value::F32(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (WireKind::Float64, Value::F64(v)) => out.extend_from_slice(&v.to_le_bytes()),
            (WireKind::String, Value::Str(s)) => {
                put_varuint(out, s.len() as u64);
                out.extend_from_slice(s.as_bytes());
            }
            (WireKind::Bytes, Value::Bytes(b)) => {
                put_varuint(out, b.len() as u64);
                out.extend_from_slice(b);
            }
            (WireKind::Message(id), Value::Message(record)) => self.encode(id, record, out),
            (kind, value) => panic!("{:?} cannot hold {:?}", kind, value),
        }
    }

    fn decode(&self, id: MessageId, bytes: &[u8]) -> Result<Record, String> {
        let mut input = Input { bytes, pos: 0 };
        let record = self.decode_from(id, &mut input)?;
        if input.pos != bytes.len() {
            return Err("trailing data".to_string());
        }
        Ok(record)
    }

    fn decode_from(&self, id: MessageId, input: &mut Input) -> Result<Record, String> {
        let message = &self.plan[id.0];
        let mut record = Record::new();
        loop {
            let tag = input.varuint()?;
            if tag == 0 {
                return Ok(record);
            }
            let field = message
                .fields
                .iter()
                .find(|f| u64::from(f.tag()) == tag)
                .ok_or_else(|| format!("unknown tag {} in {}", tag, message.message.name))?;
            let value = if field.repeated {
                let n = input.length()?;
                let mut items = Vec::new();
                for _ in 0..n {
                    items.push(self.decode_value(field.kind, input)?);
                }
                Value::List(items)
            } else {
                self.decode_value(field.kind, input)?
            };
            record.insert(field.tag(), value);
        }
    }

    fn decode_value(&self, kind: WireKind, input: &mut Input) -> Result<Value, String> {
        Ok(match kind {
            WireKind::Bool => Value::Bool(input.byte()? != 0),
            WireKind::Uint8 => Value::Uint(u64::from(input.byte()?)),
            WireKind::Int8 => Value::Int(i64::from(input.byte()? as i8)),
            WireKind::SignedVarint(_) | WireKind::Enum(_) => Value::Int(unzigzag(input.varuint()?)),
            WireKind::UnsignedVarint(_) => Value::Uint(input.varuint()?),
            WireKind::Float32 => {
                let raw = input.take(4)?;
                Value::F32(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
            }
            WireKind::Float64 => {
                let mut raw = [0u8; 8];
                raw.copy_from_slice(input.take(8)?);
                Value::F64(f64::from_le_bytes(raw))
            }
            WireKind::String => {
                let n = input.length()?;
                let raw = input.take(n)?;
                Value::Str(String::from_utf8(raw.to_vec()).map_err(|e| e.to_string())?)
            }
            WireKind::Bytes => {
                let n = input.length()?;
                Value::Bytes(input.take(n)?.to_vec())
            }
            WireKind::Message(id) => Value::Message(self.decode_from(id, input)?),
        })
    }
}

fn compiled() -> ango_compiler::Compiled {
    compile_schema(VECTORS, &ParseOptions::default()).unwrap()
}

#[test]
fn reference_codec_matches_vectors() {
    let compiled = compiled();
    let reference = Reference::new(&compiled.schema);

    for vector in vectors() {
        let id = compiled.schema.message_id(vector.message).unwrap();
        let mut out = Vec::new();
        reference.encode(id, &vector.record, &mut out);
        assert_eq!(hex::encode(&out), vector.hex, "encoding {}", vector.message);

        let bytes = hex::decode(vector.hex).unwrap();
        assert_eq!(reference.decode(id, &bytes).unwrap(), vector.record, "decoding {}", vector.hex);
    }

    let point = compiled.schema.message_id("Point").unwrap();
    for bad in MALFORMED {
        assert!(reference.decode(point, &hex::decode(bad).unwrap()).is_err(), "accepted {}", bad);
    }
}

#[test]
fn every_scalar_kind_survives_the_reference_codec() {
    let compiled = compile_schema(
        "message All { a: bool = 1; b: uint8 = 2; c: int8 = 3; d: int16 = 4; e: uint16 = 5; \
         f: uint32 = 6; g: float32 = 7; h: float64 = 8; i: bytes = 9; j: repeated string = 10; }",
        &ParseOptions::default(),
    )
    .unwrap();
    let reference = Reference::new(&compiled.schema);
    let record = BTreeMap::from([
        (1, Value::Bool(true)),
        (2, Value::Uint(255)),
        (3, Value::Int(-128)),
        (4, Value::Int(i64::from(i16::MIN))),
        (5, Value::Uint(u64::from(u16::MAX))),
        (6, Value::Uint(u64::from(u32::MAX))),
        (7, Value::F32(1.5)),
        (8, Value::F64(-0.25)),
        (9, Value::Bytes(vec![0, 0xff])),
        (10, Value::List(vec![Value::Str("é".to_string()), Value::Str(String::new())])),
    ]);

    let id = compiled.schema.message_id("All").unwrap();
    let mut out = Vec::new();
    reference.encode(id, &record, &mut out);
    assert_eq!(
        hex::encode(&out),
        "010102ff038004ffff0305ffff0306ffffffff0f070000c03f08000000000000d0bf090200ff0a0202c3a90000"
    );
    assert_eq!(reference.decode(id, &out).unwrap(), record);
}

fn available(program: &str, arg: &str) -> bool {
    Command::new(program)
        .arg(arg)
        .output()
        .map(|out| out.status.success())
        .unwrap_or(false)
}

fn write_all(dir: &Path, files: &[GeneratedFile]) {
    for file in files {
        fs::write(dir.join(&file.path), &file.contents).unwrap();
    }
}

/// Lines a driver prints: each vector encoded from a hand-built value, each
/// vector decoded and encoded again, then `error` for each malformed input.
fn expected_lines() -> Vec<String> {
    let vectors = vectors();
    let mut lines: Vec<String> = vectors.iter().map(|v| v.hex.to_string()).collect();
    lines.extend(vectors.iter().map(|v| v.hex.to_string()));
    lines.extend(MALFORMED.iter().map(|_| "error".to_string()));
    lines
}

fn driver_args() -> Vec<String> {
    vectors()
        .iter()
        .map(|v| v.hex)
        .chain(MALFORMED)
        .map(str::to_string)
        .collect()
}

fn assert_driver_output(output: std::process::Output) {
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        output.status.success(),
        "driver failed\nstdout:\n{}\nstderr:\n{}",
        stdout,
        String::from_utf8_lossy(&output.stderr)
    );
    let lines: Vec<&str> = stdout.lines().collect();
    assert_eq!(lines, expected_lines());
}

const JS_DRIVER: &str = r#"import { Kind, Point, Shape, Wide } from "./vectors.js";

const hex = (bytes) => Buffer.from(bytes).toString("hex");

const values = [
  new Point({ x: -1, y: 2 }),
  new Wide({ lo: -(2n ** 63n), hi: 2n ** 64n - 1n }),
  new Wide({ lo: 2n ** 63n - 1n }),
  new Shape({ points: [new Point({ x: 1, y: 2 }), new Point()], kind: Kind.NEG }),
  new Shape({ label: "hi", origin: new Point() }),
];
for (const v of values) {
  console.log(hex(v.encode()));
}

const types = [Point, Wide, Wide, Shape, Shape, Point, Point, Point];
process.argv.slice(2).forEach((arg, i) => {
  try {
    console.log(hex(types[i].decode(Buffer.from(arg, "hex")).encode()));
  } catch (e) {
    console.log("error");
  }
});
"#;

#[test]
fn javascript_module_matches_vectors() {
    if !available("node", "--version") {
        eprintln!("node not found, skipping");
        return;
    }
    let compiled = compiled();
    let files = Target::JavaScript(JsOptions::default())
        .generate(&compiled.schema, &compiled.fingerprint)
        .unwrap();

    let dir = TempDir::new().unwrap();
    write_all(dir.path(), &files);
    fs::write(dir.path().join("package.json"), "{ \"type\": \"module\" }\n").unwrap();
    fs::write(dir.path().join("driver.js"), JS_DRIVER).unwrap();

    let output = Command::new("node")
        .current_dir(dir.path())
        .arg("driver.js")
        .args(driver_args())
        .output()
        .unwrap();
    assert_driver_output(output);
}

const GO_DRIVER: &str = r#"package main

import (
	"encoding/hex"
	"fmt"
	"math"
	"os"
)

type codec interface {
	MarshalAngo() []byte
	UnmarshalAngo(data []byte) error
}

func main() {
	label := "hi"
	values := []codec{
		&Point{X: -1, Y: 2},
		&Wide{Lo: math.MinInt64, Hi: math.MaxUint64},
		&Wide{Lo: math.MaxInt64},
		&Shape{Points: []*Point{{X: 1, Y: 2}, {}}, Kind: KindNeg},
		&Shape{Label: &label, Origin: &Point{}},
	}
	for _, v := range values {
		fmt.Println(hex.EncodeToString(v.MarshalAngo()))
	}

	targets := []codec{&Point{}, &Wide{}, &Wide{}, &Shape{}, &Shape{}, &Point{}, &Point{}, &Point{}}
	for i, arg := range os.Args[1:] {
		data, err := hex.DecodeString(arg)
		if err == nil {
			err = targets[i].UnmarshalAngo(data)
		}
		if err != nil {
			fmt.Println("error")
			continue
		}
		fmt.Println(hex.EncodeToString(targets[i].MarshalAngo()))
	}
}
"#;

#[test]
fn go_codec_matches_vectors() {
    if !available("go", "version") {
        eprintln!("go not found, skipping");
        return;
    }
    let compiled = compiled();
    let files = Target::Go(GoOptions::default())
        .generate(&compiled.schema, &compiled.fingerprint)
        .unwrap();

    let dir = TempDir::new().unwrap();
    write_all(dir.path(), &files);
    fs::write(dir.path().join("go.mod"), "module vectors\n\ngo 1.19\n").unwrap();
    fs::write(dir.path().join("driver.go"), GO_DRIVER).unwrap();

    let generated: Vec<_> = files.iter().map(|f| dir.path().join(&f.path)).collect();
    if let Ok(out) = Command::new("gofmt").arg("-l").args(&generated).output() {
        assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
        assert_eq!(String::from_utf8_lossy(&out.stdout), "", "gofmt would reformat these files");
    }

    let output = Command::new("go")
        .current_dir(dir.path())
        .env("GOTOOLCHAIN", "local")
        .args(["run", "."])
        .args(driver_args())
        .output()
        .unwrap();
    assert_driver_output(output);
}
