//! Identifier conventions shared by the code generators.

use std::collections::HashMap;

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{GenerationError, GenerationErrorKind};

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap();
}

pub const GO_KEYWORDS: [&str; 25] = [
    "break", "case", "chan", "const", "continue", "default", "defer", "else",
    "fallthrough", "for", "func", "go", "goto", "if", "import", "interface",
    "map", "package", "range", "return", "select", "struct", "switch", "type",
    "var",
];

/// True if `s` is a plain ASCII identifier in both Go and JavaScript.
pub fn is_identifier(s: &str) -> bool {
    IDENTIFIER.is_match(s)
}

fn capitalize(word: &str, lower_rest: bool) -> String {
    let mut chars = word.chars();
    match chars.next() {
        None => String::new(),
        Some(first) if lower_rest => first.to_uppercase().to_string() + &chars.as_str().to_lowercase(),
        Some(first) => first.to_uppercase().to_string() + chars.as_str(),
    }
}

/// Converts a string to PascalCase.
/// - Underscore-separated words are capitalized and the rest of each word lowercased.
/// - A fully uppercase word keeps only its first letter uppercase.
/// - Otherwise only the first letter changes, so `clientID` becomes `ClientID`.
pub fn to_pascal_case(s: &str) -> String {
    if s.contains('_') {
        s.split('_')
            .filter(|word| !word.is_empty())
            .map(|word| capitalize(word, true))
            .collect()
    } else {
        capitalize(s, s == s.to_uppercase())
    }
}

/// Converts a string to camelCase. A leading acronym is lowercased as a
/// whole: `URLPath` becomes `urlPath`.
pub fn to_camel_case(s: &str) -> String {
    let pascal: Vec<char> = to_pascal_case(s).chars().collect();
    let mut out = String::with_capacity(pascal.len());
    let mut leading = true;
    for (i, &c) in pascal.iter().enumerate() {
        if leading && c.is_uppercase() {
            let next_is_lower = pascal.get(i + 1).is_some_and(|n| n.is_lowercase());
            if i > 0 && next_is_lower {
                leading = false;
                out.push(c);
            } else {
                out.extend(c.to_lowercase());
            }
        } else {
            leading = false;
            out.push(c);
        }
    }
    out
}

/// Converts a string to snake_case.
/// Consecutive uppercase letters stay together, so `sessionID` becomes `session_id`.
pub fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut snake = String::new();
    for i in 0..chars.len() {
        let c = chars[i];
        if c.is_uppercase() {
            if i > 0 && !snake.ends_with('_') {
                let prev = chars[i - 1];
                // Break before an uppercase letter that starts a new word.
                if !prev.is_uppercase() || (i + 1 < chars.len() && chars[i + 1].is_lowercase()) {
                    snake.push('_');
                }
            }
            snake.extend(c.to_lowercase());
        } else if c == '_' {
            if !snake.is_empty() && !snake.ends_with('_') {
                snake.push('_');
            }
        } else {
            snake.push(c);
        }
    }
    snake.trim_end_matches('_').to_string()
}

pub fn to_screaming_snake_case(s: &str) -> String {
    to_snake_case(s).to_uppercase()
}

/// The identifiers already taken in one output namespace, each mapped to
/// the declaration that produced it.
#[derive(Debug)]
pub struct Scope {
    target: &'static str,
    taken:  HashMap<String, String>,
}

impl Scope {
    pub fn new(target: &'static str) -> Self {
        Scope {
            target,
            taken: HashMap::new(),
        }
    }

    /// Marks `ident` as generated code's own name.
    pub fn reserve(&mut self, ident: &str) {
        self.taken.insert(ident.to_string(), format!("generated {}", ident));
    }

    /// Claims `ident` on behalf of `declaration`, failing if it is not an
    /// identifier or if another declaration already maps to it.
    pub fn claim(&mut self, declaration: &str, ident: &str) -> Result<(), GenerationError> {
        if !is_identifier(ident) {
            return Err(GenerationError::new(
                self.target,
                declaration,
                GenerationErrorKind::InvalidIdentifier(declaration.to_string()),
            ));
        }
        if let Some(first) = self.taken.get(ident) {
            return Err(GenerationError::new(
                self.target,
                declaration,
                GenerationErrorKind::NameCollision {
                    first:  first.clone(),
                    second: declaration.to_string(),
                    ident:  ident.to_string(),
                },
            ));
        }
        self.taken.insert(ident.to_string(), declaration.to_string());
        Ok(())
    }
}
