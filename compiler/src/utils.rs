use ango_schema::Location;

use crate::error::{ParseError, SyntaxErrorKind};

/// Renders `text` as a double-quoted, escaped literal. The output is valid
/// in diagnostics as well as in generated Go and JavaScript source.
pub fn quote(text: &str) -> String {
    serde_json::to_string(text).unwrap_or_else(|_| format!("\"{}\"", text))
}

pub fn syntax_error(kind: SyntaxErrorKind, line: usize, column: usize) -> ParseError {
    ParseError::syntax(kind, Location::new(line, column))
}
