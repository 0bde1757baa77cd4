use ango_schema::{fingerprint, Fingerprint, Schema};

use crate::{
    error::{ParseError, ParseErrors},
    parser::parse_schema,
    tokenizer::tokenize_schema,
    verifier::verify_schema,
};

/// How the parser reacts to a bad schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorMode {
    /// Stop at the first diagnostic.
    #[default]
    FailFast,
    /// Keep going and report every diagnostic found.
    Collect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ParseOptions {
    pub errors: ErrorMode,
}

impl ParseOptions {
    pub fn collect_errors() -> Self {
        ParseOptions { errors: ErrorMode::Collect }
    }
}

/// A validated schema together with its protocol version.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled {
    pub schema:      Schema,
    pub fingerprint: Fingerprint,
}

/// Parses and validates schema text, stopping at the first error.
pub fn parse(text: &str) -> Result<Schema, ParseError> {
    parse_with(text, &ParseOptions::default()).map_err(|errors| errors.first().clone())
}

/// Parses and validates schema text according to `options`.
///
/// Lexical errors end the run before parsing starts; syntax errors end it
/// before names are resolved.
pub fn parse_with(text: &str, options: &ParseOptions) -> Result<Schema, ParseErrors> {
    let tokens = tokenize_schema(text).map_err(|errors| truncate(errors, options.errors))?;
    let raw = parse_schema(&tokens, options.errors)?;
    verify_schema(&raw, options.errors)
}

/// Runs the front half of the pipeline: parse, validate, fingerprint.
pub fn compile_schema(text: &str, options: &ParseOptions) -> Result<Compiled, ParseErrors> {
    let schema = parse_with(text, options)?;
    let fingerprint = fingerprint(&schema);
    Ok(Compiled { schema, fingerprint })
}

fn truncate(errors: ParseErrors, mode: ErrorMode) -> ParseErrors {
    match mode {
        ErrorMode::FailFast => ParseErrors::from(errors.first().clone()),
        ErrorMode::Collect  => errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fail_fast_returns_one_lexical_error() {
        let err = parse_with("a # b $", &ParseOptions::default()).unwrap_err();
        assert_eq!(err.len(), 1);
        let err = parse_with("a # b $", &ParseOptions::collect_errors()).unwrap_err();
        assert_eq!(err.len(), 2);
    }

    #[test]
    fn compile_fingerprints_the_schema() {
        let compiled = compile_schema("message A { x: bool = 1; }", &ParseOptions::default()).unwrap();
        assert_eq!(compiled.fingerprint, fingerprint(&compiled.schema));
    }

    #[test]
    fn parse_returns_the_first_error() {
        let err = parse("message A { x: Nope = 1; y: Nada = 2; }").unwrap_err();
        assert!(!err.is_syntax());
        assert!(err.to_string().contains("Nope"));
    }
}
