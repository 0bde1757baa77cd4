use ango_schema::Location;
use lazy_static::lazy_static;
use regex::Regex;

use crate::{
    compiler::ErrorMode,
    error::{ParseError, ParseErrors, SyntaxErrorKind},
    tokenizer::{Token, TokenKind},
    types::{
        Declaration, Literal, RawConst, RawEnum, RawField, RawMessage, RawModifier, RawName,
        RawSchema, RawVariant,
    },
    utils::{quote, syntax_error},
};

lazy_static! {
    static ref NAME_KEYWORD:     Regex = Regex::new(r"^(?i:name)$").unwrap();
    static ref CONST_KEYWORD:    Regex = Regex::new(r"^(?i:const)$").unwrap();
    static ref ENUM_KEYWORD:     Regex = Regex::new(r"^(?i:enum)$").unwrap();
    static ref MESSAGE_KEYWORD:  Regex = Regex::new(r"^(?i:message)$").unwrap();
    static ref MODIFIER_KEYWORD: Regex = Regex::new(r"^(repeated|optional)$").unwrap();
    static ref BOOL_LITERAL:     Regex = Regex::new(r"^(true|false)$").unwrap();
}

fn is_declaration_keyword(tok: &Token) -> bool {
    tok.kind == TokenKind::Identifier
        && [&*NAME_KEYWORD, &*CONST_KEYWORD, &*ENUM_KEYWORD, &*MESSAGE_KEYWORD]
            .iter()
            .any(|re| re.is_match(&tok.text))
}

fn location(tok: &Token) -> Location {
    Location::new(tok.line, tok.column)
}

/// Builds the raw declaration list from a token stream ending in `Eof`.
///
/// With [`ErrorMode::Collect`] a broken declaration is skipped up to its
/// closing brace or semicolon and parsing carries on with the next one.
pub fn parse_schema(tokens: &[Token], mode: ErrorMode) -> Result<RawSchema, ParseErrors> {
    let mut parser = Parser { tokens, index: 0 };
    let mut declarations = Vec::new();
    let mut errors = Vec::new();

    while !parser.at_eof() {
        let start = parser.index;
        match parser.declaration() {
            Ok(declaration) => declarations.push(declaration),
            Err(err) => {
                errors.push(err);
                if mode == ErrorMode::FailFast {
                    break;
                }
                parser.recover(start);
            }
        }
    }

    if errors.is_empty() {
        Ok(RawSchema { declarations })
    } else {
        Err(ParseErrors::new(errors))
    }
}

struct Parser<'a> {
    tokens: &'a [Token],
    index:  usize,
}

impl<'a> Parser<'a> {
    fn current(&self) -> &'a Token {
        // The stream always ends with Eof, and `advance` never moves past it.
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[self.index.min(last)]
    }

    fn peek(&self, offset: usize) -> &'a Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.index + offset).min(last)]
    }

    fn at_eof(&self) -> bool {
        self.current().kind == TokenKind::Eof
    }

    fn advance(&mut self) -> &'a Token {
        let tok = self.current();
        if tok.kind != TokenKind::Eof {
            self.index += 1;
        }
        tok
    }

    fn eat_symbol(&mut self, symbol: &str) -> bool {
        if self.current().is_symbol(symbol) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn eat_keyword(&mut self, test: &Regex) -> bool {
        let tok = self.current();
        if tok.kind == TokenKind::Identifier && test.is_match(&tok.text) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        let tok = self.current();
        syntax_error(
            SyntaxErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found:    tok.display(),
            },
            tok.line,
            tok.column,
        )
    }

    fn expect_symbol(&mut self, symbol: &str) -> Result<(), ParseError> {
        if self.eat_symbol(symbol) {
            Ok(())
        } else {
            Err(self.unexpected(&quote(symbol)))
        }
    }

    fn expect_identifier(&mut self) -> Result<&'a Token, ParseError> {
        if self.current().kind == TokenKind::Identifier {
            Ok(self.advance())
        } else {
            Err(self.unexpected("identifier"))
        }
    }

    fn expect_integer(&mut self) -> Result<(i128, Location), ParseError> {
        let tok = self.current();
        if tok.kind != TokenKind::Integer {
            return Err(self.unexpected("integer"));
        }
        let value = tok.text.parse::<i128>().map_err(|_| {
            syntax_error(SyntaxErrorKind::InvalidInteger(quote(&tok.text)), tok.line, tok.column)
        })?;
        self.advance();
        Ok((value, location(tok)))
    }

    fn declaration(&mut self) -> Result<Declaration, ParseError> {
        let keyword = self.current();
        if self.eat_keyword(&NAME_KEYWORD) {
            let name = self.expect_identifier()?;
            self.expect_symbol(";")?;
            Ok(Declaration::Name(RawName {
                name:     name.text.clone(),
                location: location(keyword),
            }))
        } else if self.eat_keyword(&CONST_KEYWORD) {
            self.constant(keyword).map(Declaration::Const)
        } else if self.eat_keyword(&ENUM_KEYWORD) {
            self.enumeration().map(Declaration::Enum)
        } else if self.eat_keyword(&MESSAGE_KEYWORD) {
            self.message().map(Declaration::Message)
        } else {
            Err(self.unexpected("\"message\", \"enum\", \"const\" or \"name\""))
        }
    }

    fn constant(&mut self, keyword: &Token) -> Result<RawConst, ParseError> {
        let name = self.expect_identifier()?;
        self.expect_symbol(":")?;
        let type_ = self.expect_identifier()?;
        self.expect_symbol("=")?;
        let value = self.literal()?;
        self.expect_symbol(";")?;
        Ok(RawConst {
            name:     name.text.clone(),
            type_:    type_.text.clone(),
            value,
            location: location(keyword),
        })
    }

    fn literal(&mut self) -> Result<Literal, ParseError> {
        let tok = self.current();
        let value = match tok.kind {
            TokenKind::Integer => return self.expect_integer().map(|(v, _)| Literal::Integer(v)),
            TokenKind::Float => {
                let value = tok.text.parse::<f64>().map_err(|_| {
                    syntax_error(SyntaxErrorKind::InvalidFloat(quote(&tok.text)), tok.line, tok.column)
                })?;
                Literal::Float(value)
            }
            TokenKind::String => Literal::String(unescape(tok)?),
            TokenKind::Identifier if BOOL_LITERAL.is_match(&tok.text) => {
                Literal::Bool(tok.text == "true")
            }
            _ => return Err(self.unexpected("literal")),
        };
        self.advance();
        Ok(value)
    }

    fn enumeration(&mut self) -> Result<RawEnum, ParseError> {
        let name = self.expect_identifier()?;
        self.expect_symbol("{")?;

        let mut variants = Vec::new();
        while !self.eat_symbol("}") {
            let label = self.expect_identifier()?;
            self.expect_symbol("=")?;
            let (value, _) = self.expect_integer()?;
            self.expect_symbol(";")?;
            variants.push(RawVariant {
                label:    label.text.clone(),
                value,
                location: location(label),
            });
        }
        self.eat_symbol(";");

        Ok(RawEnum {
            name: name.text.clone(),
            variants,
            location: location(name),
        })
    }

    fn message(&mut self) -> Result<RawMessage, ParseError> {
        let name = self.expect_identifier()?;
        self.expect_symbol("{")?;

        let mut fields = Vec::new();
        while !self.eat_symbol("}") {
            fields.push(self.field()?);
        }
        self.eat_symbol(";");

        Ok(RawMessage {
            name: name.text.clone(),
            fields,
            location: location(name),
        })
    }

    fn field(&mut self) -> Result<RawField, ParseError> {
        let name = self.expect_identifier()?;
        self.expect_symbol(":")?;

        // A modifier word is only a modifier when a type name follows it.
        let mut modifiers = Vec::new();
        while self.current().kind == TokenKind::Identifier
            && MODIFIER_KEYWORD.is_match(&self.current().text)
            && self.peek(1).kind == TokenKind::Identifier
        {
            let word = self.advance();
            modifiers.push(RawModifier {
                word:     word.text.clone(),
                location: location(word),
            });
        }

        let type_ = self.expect_identifier()?;
        self.expect_symbol("=")?;
        let (tag, tag_at) = self.expect_integer()?;
        self.expect_symbol(";")?;

        Ok(RawField {
            name: name.text.clone(),
            modifiers,
            type_: type_.text.clone(),
            type_at: location(type_),
            tag,
            tag_at,
            location: location(name),
        })
    }

    /// Skips the rest of a broken declaration that started at `start`.
    fn recover(&mut self, start: usize) {
        if self.index == start {
            self.advance();
        }
        let mut depth: i32 = self.tokens[start..self.index]
            .iter()
            .map(|t| {
                if t.is_symbol("{") {
                    1
                } else if t.is_symbol("}") {
                    -1
                } else {
                    0
                }
            })
            .sum();
        if depth < 0 {
            return;
        }

        while !self.at_eof() {
            let tok = self.current();
            if depth == 0 {
                if tok.is_symbol(";") {
                    self.advance();
                    return;
                }
                if is_declaration_keyword(tok) && self.peek(1).kind == TokenKind::Identifier {
                    return;
                }
            }
            self.advance();
            if tok.is_symbol("{") {
                depth += 1;
            } else if tok.is_symbol("}") {
                depth -= 1;
                if depth <= 0 {
                    self.eat_symbol(";");
                    return;
                }
            }
        }
    }
}

/// Decodes the body of a string literal token.
fn unescape(tok: &Token) -> Result<String, ParseError> {
    let body = &tok.text[1..tok.text.len() - 1];
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"')  => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n')  => out.push('\n'),
            Some('t')  => out.push('\t'),
            Some('r')  => out.push('\r'),
            other => {
                let seq = format!("\\{}", other.map(String::from).unwrap_or_default());
                return Err(syntax_error(SyntaxErrorKind::InvalidEscape(quote(&seq)), tok.line, tok.column));
            }
        }
    }
    Ok(out)
}
