//! Protocol fingerprint.
//!
//! The fingerprint is derived from a canonical text rendering of the
//! wire-relevant parts of a [`Schema`]. Messages and enums are listed by name,
//! fields by tag and enum variants by value, so neither formatting nor the
//! order of declarations in the source changes the result. Constants never
//! reach the wire and are left out.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;
use std::fmt::Write as _;

use crate::schema::{Schema, TypeRef};

/// Version tag of the canonical form. Bump it whenever the rendering below
/// changes, so old and new compilers never agree by accident.
pub const CANONICAL_FORM_VERSION: &str = "ango-schema/1";

/// Number of digest bytes kept in the printable fingerprint.
const FINGERPRINT_BYTES: usize = 8;

/// A short hex string identifying the wire shape of a schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Computes the protocol version of `schema`.
pub fn fingerprint(schema: &Schema) -> Fingerprint {
    let canonical = canonical_form(schema);
    let digest = Sha256::digest(canonical.as_bytes());
    Fingerprint(hex::encode(&digest[..FINGERPRINT_BYTES]))
}

fn type_label(schema: &Schema, ty: TypeRef) -> String {
    match ty {
        TypeRef::Primitive(p) => p.name().to_string(),
        TypeRef::Message(id)  => format!("message {}", schema.message(id).name),
        TypeRef::Enum(id)     => format!("enum {}", schema.enum_(id).name),
    }
}

/// The exact text that is hashed by [`fingerprint`].
pub fn canonical_form(schema: &Schema) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "{}", CANONICAL_FORM_VERSION);
    let _ = writeln!(out, "name {}", schema.name);

    let mut enums: Vec<_> = schema.enums.iter().collect();
    enums.sort_by(|a, b| a.name.cmp(&b.name));
    for e in enums {
        let _ = write!(out, "enum {} {{", e.name);
        for variant in e.variants_by_value() {
            let _ = write!(out, " {}={};", variant.value, variant.label);
        }
        out.push_str(" }\n");
    }

    let mut messages: Vec<_> = schema.messages.iter().collect();
    messages.sort_by(|a, b| a.name.cmp(&b.name));
    for m in messages {
        let _ = write!(out, "message {} {{", m.name);
        for field in m.fields_by_tag() {
            let _ = write!(
                out,
                " {}:{}:{}:{};",
                field.tag,
                field.name,
                field.modifier.name(),
                type_label(schema, field.ty)
            );
        }
        out.push_str(" }\n");
    }

    out
}
