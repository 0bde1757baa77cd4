use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{ParseErrors, SyntaxErrorKind};
use crate::utils::{quote, syntax_error};

lazy_static! {
    pub static ref TOKEN_REGEX: Regex = Regex::new(
        r#"(?x)^(?:
          (?P<space>\s+)
        | (?P<comment>//[^\n]*|/\*(?s:.*?)\*/)
        | (?P<string>"(?:[^"\\\n]|\\.)*")
        | (?P<float>-?\d+\.\d+(?:[eE][+-]?\d+)?)
        | (?P<integer>-?\d+)
        | (?P<identifier>[A-Za-z_][A-Za-z0-9_]*)
        | (?P<symbol>[{}:;=])
        )"#
    )
    .unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Identifier,
    Integer,
    Float,
    String,
    Symbol,
    Eof,
}

impl TokenKind {
    pub fn describe(self) -> &'static str {
        match self {
            TokenKind::Identifier => "identifier",
            TokenKind::Integer    => "integer",
            TokenKind::Float      => "number",
            TokenKind::String     => "string",
            TokenKind::Symbol     => "symbol",
            TokenKind::Eof        => "end of file",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind:   TokenKind,
    pub text:   String,
    pub line:   usize,
    pub column: usize,
}

impl Token {
    /// How the token is shown in diagnostics.
    pub fn display(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of file".to_string(),
            TokenKind::String => self.text.clone(),
            _ => quote(&self.text),
        }
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        self.kind == TokenKind::Symbol && self.text == symbol
    }
}

struct Cursor {
    line:   usize,
    column: usize,
}

impl Cursor {
    fn advance(&mut self, part: &str) {
        let newline_count = part.matches('\n').count();
        if newline_count > 0 {
            self.line += newline_count;
            if let Some(last_line_part) = part.split('\n').last() {
                self.column = last_line_part.chars().count() + 1;
            }
        } else {
            self.column += part.chars().count();
        }
    }
}

/// Splits schema text into tokens, dropping whitespace and comments. The
/// returned list always ends with an `Eof` token.
///
/// Lexing continues past bad input so that every lexical error is reported.
pub fn tokenize_schema(text: &str) -> Result<Vec<Token>, ParseErrors> {
    let mut tokens = Vec::new();
    let mut errors = Vec::new();
    let mut cursor = Cursor { line: 1, column: 1 };
    let mut pos = 0;

    while pos < text.len() {
        let rest = &text[pos..];

        let Some(caps) = TOKEN_REGEX.captures(rest) else {
            // Nothing matches here. Report, then skip past the bad input.
            let (kind, skipped) = if rest.starts_with('"') {
                let end = rest.find('\n').unwrap_or(rest.len());
                (SyntaxErrorKind::UnterminatedString, end)
            } else if rest.starts_with("/*") {
                (SyntaxErrorKind::UnterminatedComment, rest.len())
            } else {
                let ch = rest.chars().next().map_or(1, char::len_utf8);
                (SyntaxErrorKind::InvalidCharacter(quote(&rest[..ch])), ch)
            };
            errors.push(syntax_error(kind, cursor.line, cursor.column));
            cursor.advance(&rest[..skipped]);
            pos += skipped;
            continue;
        };

        let part = caps.get(0).map_or("", |m| m.as_str());
        let kind = if caps.name("space").is_some() || caps.name("comment").is_some() {
            None
        } else if caps.name("string").is_some() {
            Some(TokenKind::String)
        } else if caps.name("float").is_some() {
            Some(TokenKind::Float)
        } else if caps.name("integer").is_some() {
            Some(TokenKind::Integer)
        } else if caps.name("identifier").is_some() {
            Some(TokenKind::Identifier)
        } else {
            Some(TokenKind::Symbol)
        };

        if let Some(kind) = kind {
            tokens.push(Token {
                kind,
                text:   part.to_string(),
                line:   cursor.line,
                column: cursor.column,
            });
        }

        cursor.advance(part);
        pos += part.len();
    }

    if !errors.is_empty() {
        return Err(ParseErrors::new(errors));
    }

    tokens.push(Token {
        kind:   TokenKind::Eof,
        text:   String::new(),
        line:   cursor.line,
        column: cursor.column,
    });
    Ok(tokens)
}
