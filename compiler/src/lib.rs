//! ango-compiler
//!
//! This crate implements:
//!  1) A tokenizer + parser for `.ango` schema files,
//!  2) A verifier that resolves names and checks tags, enum values and constants,
//!  3) The shared wire plan (`wire`) that every target encodes from,
//!  4) Go and JavaScript code generation behind the closed `Target` enum,
//!  5) Error types (`ParseError`, `ParseErrors`, `GenerationError`).
//!
//! ```
//! use ango_compiler::{compile_schema, ParseOptions, Target, GoOptions};
//!
//! let compiled = compile_schema("message Point { x: int32 = 1; y: int32 = 2; }", &ParseOptions::default()).unwrap();
//! let files = Target::Go(GoOptions::default()).generate(&compiled.schema, &compiled.fingerprint).unwrap();
//! assert_eq!(files.len(), 2);
//! ```

pub mod error;
pub mod types;
pub mod utils;
pub mod tokenizer;
pub mod parser;
pub mod verifier;
pub mod compiler;
pub mod naming;
pub mod wire;
pub mod traits;
pub mod gen_go;
pub mod gen_js;
pub mod target;

pub use compiler::{compile_schema, parse, parse_with, Compiled, ErrorMode, ParseOptions};
pub use error::{GenerationError, GenerationErrorKind, ParseError, ParseErrors, SemanticErrorKind, SyntaxErrorKind};
pub use gen_go::GoOptions;
pub use gen_js::JsOptions;
pub use target::{GeneratedFile, Target};
