//! Hand-written tokenizer for preprocessed BOS source (spec §4.2).
//!
//! Grounded on the token set implied by `original_source/bos/bos_loader.py`
//! and the ANTLR grammar it drives. There is no ANTLR-equivalent lexer
//! generator in this pipeline's dependency stack, so tokens are produced by
//! a direct hand-rolled scan; `#line N "file"` markers emitted by
//! [`crate::preprocessor::Preprocessor`] are consumed here and folded
//! directly into each token's [`CodeLocation`], which is the forward
//! equivalent of the backward-channel search spec §4.7 describes: the lexer
//! tracks `current_file` and `line_offset` such that
//! `effective_line = physical_line + line_offset`, updating
//! `line_offset = N - marker_line - 1` every time it passes a marker.

use crate::location::CodeLocation;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Ident(String),
    IntLiteral(i64),
    FloatLiteral(f64),
    /// `[...]` linear-scaled literal; payload is the raw inner text.
    LinearLiteral(String),
    /// `<...>` angular-scaled literal; payload is the raw inner text.
    AngularLiteral(String),
    StringLiteral(String),
    Symbol(&'static str),
    Eof,
}

#[derive(Debug, Clone)]
pub struct Token {
    pub kind: TokenKind,
    pub location: CodeLocation,
}

const SYMBOLS_2: &[&str] = &["==", "!=", "<=", ">=", "&&", "||", "+=", "-="];
const SYMBOLS_1: &[char] = &[
    '{', '}', '(', ')', '[', ']', '<', '>', ';', ',', '=', '+', '-', '*', '/', '%', '&', '|', '^',
    '!',
];

pub struct Lexer<'a> {
    chars: Vec<char>,
    pos: usize,
    source: &'a str,
    current_file: String,
    physical_line: u32,
    line_offset: i64,
    column: u32,
}

impl<'a> Lexer<'a> {
    pub fn new(preprocessed_text: &'a str, initial_file: impl Into<String>) -> Self {
        Lexer {
            chars: preprocessed_text.chars().collect(),
            pos: 0,
            source: preprocessed_text,
            current_file: initial_file.into(),
            physical_line: 1,
            line_offset: 0,
            column: 1,
        }
    }

    fn effective_line(&self) -> u32 {
        (self.physical_line as i64 + self.line_offset).max(1) as u32
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn advance(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += 1;
        if c == '\n' {
            self.physical_line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn loc(&self, start_line: u32, start_col: u32) -> CodeLocation {
        CodeLocation::new(self.current_file.clone(), start_line, start_col)
    }

    /// Skips whitespace and `#line N "file"` markers, folding each marker
    /// into `current_file`/`line_offset` per spec §4.7's forward-tracking
    /// equivalent.
    fn skip_trivia(&mut self) {
        loop {
            while matches!(self.peek(), Some(c) if c.is_whitespace()) {
                self.advance();
            }
            if self.peek() == Some('#') && self.at_line_directive() {
                self.consume_line_directive();
                continue;
            }
            break;
        }
    }

    fn at_line_directive(&self) -> bool {
        let rest: String = self.chars[self.pos..].iter().take(6).collect();
        rest.starts_with("#line ")
    }

    fn consume_line_directive(&mut self) {
        let marker_line = self.physical_line;
        // consume to end of line
        let mut text = String::new();
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.advance();
        }
        if self.peek() == Some('\n') {
            self.advance();
        }

        let rest = text.trim_start_matches('#').trim_start();
        let rest = rest.strip_prefix("line").unwrap_or(rest).trim_start();
        let mut parts = rest.splitn(2, char::is_whitespace);
        let n: i64 = parts.next().and_then(|s| s.parse().ok()).unwrap_or(1);
        if let Some(file_part) = parts.next() {
            let file = file_part.trim().trim_matches('"');
            if !file.is_empty() {
                self.current_file = file.to_string();
            }
        }
        self.line_offset = n - marker_line as i64 - 1;
    }

    fn skip_comment_or_trivia(&mut self) {
        loop {
            self.skip_trivia();
            if self.peek() == Some('/') && self.peek_at(1) == Some('/') {
                while matches!(self.peek(), Some(c) if c != '\n') {
                    self.advance();
                }
                continue;
            }
            if self.peek() == Some('/') && self.peek_at(1) == Some('*') {
                self.advance();
                self.advance();
                while self.peek().is_some() && !(self.peek() == Some('*') && self.peek_at(1) == Some('/')) {
                    self.advance();
                }
                self.advance();
                self.advance();
                continue;
            }
            break;
        }
    }

    pub fn next_token(&mut self) -> crate::errors::Result<Token> {
        self.skip_comment_or_trivia();

        let start_line = self.effective_line();
        let start_col = self.column;

        let c = match self.peek() {
            None => return Ok(Token { kind: TokenKind::Eof, location: self.loc(start_line, start_col) }),
            Some(c) => c,
        };

        if c == '"' {
            return self.lex_string(start_line, start_col);
        }
        if c == '[' {
            return self.lex_bracketed(start_line, start_col, ']', true);
        }
        if c.is_ascii_digit() {
            return self.lex_number(start_line, start_col);
        }
        // `<` is ambiguous between angular-literal and comparison; treat as
        // angular literal only when it looks like `<digits...>` with no
        // intervening operator characters.
        if c == '<' && self.looks_like_angular_literal() {
            return self.lex_bracketed(start_line, start_col, '>', false);
        }
        if c.is_alphabetic() || c == '_' {
            return self.lex_ident(start_line, start_col);
        }

        for sym in SYMBOLS_2 {
            if self.source[self.byte_pos()..].starts_with(sym) {
                self.advance();
                self.advance();
                return Ok(Token { kind: TokenKind::Symbol(sym), location: self.loc(start_line, start_col) });
            }
        }
        if SYMBOLS_1.contains(&c) {
            self.advance();
            let sym = SYMBOLS_1.iter().find(|s| **s == c).unwrap();
            let sym_str: &'static str = match sym {
                '{' => "{", '}' => "}", '(' => "(", ')' => ")", '[' => "[", ']' => "]",
                '<' => "<", '>' => ">", ';' => ";", ',' => ",", '=' => "=", '+' => "+",
                '-' => "-", '*' => "*", '/' => "/", '%' => "%", '&' => "&", '|' => "|",
                '^' => "^", '!' => "!", _ => unreachable!(),
            };
            return Ok(Token { kind: TokenKind::Symbol(sym_str), location: self.loc(start_line, start_col) });
        }

        Err(crate::errors::ErrorKind::Syntax(
            format!("unexpected character '{}'", c),
            Some(self.loc(start_line, start_col)),
        )
        .into())
    }

    fn byte_pos(&self) -> usize {
        self.chars[..self.pos].iter().collect::<String>().len()
    }

    fn looks_like_angular_literal(&self) -> bool {
        let mut i = 1;
        let mut saw_digit = false;
        loop {
            match self.peek_at(i) {
                Some(c) if c.is_ascii_digit() || c == '.' || c == '-' => {
                    saw_digit = true;
                    i += 1;
                }
                Some('>') => return saw_digit,
                _ => return false,
            }
        }
    }

    fn lex_bracketed(
        &mut self,
        start_line: u32,
        start_col: u32,
        close: char,
        linear: bool,
    ) -> crate::errors::Result<Token> {
        self.advance();
        let mut inner = String::new();
        while let Some(c) = self.peek() {
            if c == close {
                break;
            }
            inner.push(c);
            self.advance();
        }
        if self.peek() != Some(close) {
            return Err(crate::errors::ErrorKind::Syntax(
                format!("unterminated '{}...{}' literal", if linear { '[' } else { '<' }, close),
                Some(self.loc(start_line, start_col)),
            )
            .into());
        }
        self.advance();
        let kind = if linear {
            TokenKind::LinearLiteral(inner.trim().to_string())
        } else {
            TokenKind::AngularLiteral(inner.trim().to_string())
        };
        Ok(Token { kind, location: self.loc(start_line, start_col) })
    }

    fn lex_string(&mut self, start_line: u32, start_col: u32) -> crate::errors::Result<Token> {
        self.advance();
        let mut s = String::new();
        while let Some(c) = self.peek() {
            if c == '"' {
                break;
            }
            s.push(c);
            self.advance();
        }
        if self.peek() != Some('"') {
            return Err(crate::errors::ErrorKind::Syntax(
                "unterminated string literal".to_string(),
                Some(self.loc(start_line, start_col)),
            )
            .into());
        }
        self.advance();
        Ok(Token { kind: TokenKind::StringLiteral(s), location: self.loc(start_line, start_col) })
    }

    fn lex_number(&mut self, start_line: u32, start_col: u32) -> crate::errors::Result<Token> {
        let mut s = String::new();
        let mut is_float = false;
        while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
            s.push(self.advance().unwrap());
        }
        if self.peek() == Some('.') && matches!(self.peek_at(1), Some(c) if c.is_ascii_digit()) {
            is_float = true;
            s.push(self.advance().unwrap());
            while matches!(self.peek(), Some(c) if c.is_ascii_digit()) {
                s.push(self.advance().unwrap());
            }
        }
        let loc = self.loc(start_line, start_col);
        if is_float {
            let value: f64 = s.parse().map_err(|_| {
                crate::errors::Error::from(crate::errors::ErrorKind::Syntax(
                    format!("malformed float literal '{}'", s),
                    Some(loc.clone()),
                ))
            })?;
            Ok(Token { kind: TokenKind::FloatLiteral(value), location: loc })
        } else {
            let value: i64 = s.parse().map_err(|_| {
                crate::errors::Error::from(crate::errors::ErrorKind::Syntax(
                    format!("malformed integer literal '{}'", s),
                    Some(loc.clone()),
                ))
            })?;
            Ok(Token { kind: TokenKind::IntLiteral(value), location: loc })
        }
    }

    /// BOS keywords are kebab-case (`static-var`, `wait-for-turn`), so a `-`
    /// continues an identifier when immediately followed by a letter; `-`
    /// before a digit or whitespace is left for the grammar to see as
    /// subtraction.
    fn lex_ident(&mut self, start_line: u32, start_col: u32) -> crate::errors::Result<Token> {
        let mut s = String::new();
        loop {
            while matches!(self.peek(), Some(c) if c.is_alphanumeric() || c == '_') {
                s.push(self.advance().unwrap());
            }
            if self.peek() == Some('-') && matches!(self.peek_at(1), Some(c) if c.is_alphabetic()) {
                s.push(self.advance().unwrap());
                continue;
            }
            break;
        }
        Ok(Token { kind: TokenKind::Ident(s), location: self.loc(start_line, start_col) })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(src: &str) -> Vec<TokenKind> {
        let mut lexer = Lexer::new(src, "t.bos");
        let mut out = Vec::new();
        loop {
            let tok = lexer.next_token().unwrap();
            if tok.kind == TokenKind::Eof {
                break;
            }
            out.push(tok.kind);
        }
        out
    }

    #[test]
    fn lexes_basic_statement() {
        let toks = tokens("x = 5 + y;");
        assert_eq!(
            toks,
            vec![
                TokenKind::Ident("x".to_string()),
                TokenKind::Symbol("="),
                TokenKind::IntLiteral(5),
                TokenKind::Symbol("+"),
                TokenKind::Ident("y".to_string()),
                TokenKind::Symbol(";"),
            ]
        );
    }

    #[test]
    fn lexes_linear_literal() {
        let toks = tokens("move piece to x-axis [1.5];");
        assert!(toks.contains(&TokenKind::LinearLiteral("1.5".to_string())));
    }

    #[test]
    fn line_directive_adjusts_location() {
        let src = "piece a;\n#line 10 \"other.bos\"\nstatic-var b;\n";
        let mut lexer = Lexer::new(src, "t.bos");
        let first = lexer.next_token().unwrap();
        assert_eq!(first.location.source_file, "t.bos");
        assert_eq!(first.location.start_line, 1);

        for _ in 0..2 {
            lexer.next_token().unwrap();
        }
        let after_directive = lexer.next_token().unwrap();
        assert_eq!(after_directive.location.source_file, "other.bos");
        assert_eq!(after_directive.location.start_line, 10);
    }
}
