//! The Nebula scanner/lexer.
//!
//! Converts source text into a flat token list terminated by an
//! end-of-file token. Trivia (whitespace and comments) is skipped. Problems
//! are reported and scanning always runs to the end of the text.

use crate::token::{SyntaxKind, Token, TokenValue};
use bumpalo::Bump;
use nebula_core::{SourceText, TextSpan};
use nebula_diagnostics::{messages, Report};

/// The scanner converts Nebula source text into tokens.
pub struct Scanner<'a, 's> {
    arena: &'a Bump,
    source: &'s SourceText,
    bytes: &'s [u8],
    /// Current position in the text.
    pos: usize,
    /// Start of the current token (after leading trivia).
    token_start: usize,
    report: Report,
}

impl<'a, 's> Scanner<'a, 's> {
    pub fn new(arena: &'a Bump, source: &'s SourceText) -> Self {
        Self {
            arena,
            source,
            bytes: source.text().as_bytes(),
            pos: 0,
            token_start: 0,
            report: Report::new(),
        }
    }

    /// Scan the whole text. The last token is always `EndOfFile`.
    pub fn scan_all(mut self) -> (Vec<Token<'a>>, Report) {
        let mut tokens = Vec::new();
        loop {
            let token = self.scan();
            let done = token.kind == SyntaxKind::EndOfFile;
            tokens.push(token);
            if done {
                break;
            }
        }
        (tokens, self.report)
    }

    /// Scan the next token.
    pub fn scan(&mut self) -> Token<'a> {
        self.skip_trivia();
        self.token_start = self.pos;

        let Some(&byte) = self.bytes.get(self.pos) else {
            return self.make(SyntaxKind::EndOfFile);
        };

        match byte {
            b'"' => self.scan_string(),
            b'0'..=b'9' => self.scan_number(),
            b'a'..=b'z' | b'A'..=b'Z' | b'_' => self.scan_identifier(),
            _ => self.scan_punctuation(byte),
        }
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek_byte(0) {
                Some(b' ' | b'\t' | b'\r' | b'\n') => self.pos += 1,
                Some(b'/') if self.peek_byte(1) == Some(b'/') => {
                    while let Some(b) = self.peek_byte(0) {
                        if b == b'\n' {
                            break;
                        }
                        self.pos += 1;
                    }
                }
                Some(b'/') if self.peek_byte(1) == Some(b'*') => self.skip_block_comment(),
                _ => return,
            }
        }
    }

    fn skip_block_comment(&mut self) {
        let start = self.pos;
        self.pos += 2;
        loop {
            match self.peek_byte(0) {
                None => {
                    self.report.report(
                        self.source,
                        TextSpan::new(start as u32, 2),
                        &messages::UNTERMINATED_COMMENT,
                        &[],
                    );
                    return;
                }
                Some(b'*') if self.peek_byte(1) == Some(b'/') => {
                    self.pos += 2;
                    return;
                }
                Some(_) => self.pos += 1,
            }
        }
    }

    fn scan_string(&mut self) -> Token<'a> {
        // Skip opening quote
        self.pos += 1;
        let mut value = String::new();
        let mut segment_start = self.pos;
        loop {
            match self.peek_byte(0) {
                None | Some(b'\n') | Some(b'\r') => {
                    value.push_str(self.text_between(segment_start, self.pos));
                    let span = TextSpan::from_bounds(self.token_start as u32, self.pos as u32);
                    self.report
                        .report(self.source, span, &messages::UNTERMINATED_STRING, &[]);
                    break;
                }
                Some(b'"') if self.peek_byte(1) == Some(b'"') => {
                    // `""` escapes a quote
                    value.push_str(self.text_between(segment_start, self.pos));
                    value.push('"');
                    self.pos += 2;
                    segment_start = self.pos;
                }
                Some(b'"') => {
                    value.push_str(self.text_between(segment_start, self.pos));
                    self.pos += 1;
                    break;
                }
                Some(_) => self.pos += 1,
            }
        }
        let value = self.arena.alloc_str(&value);
        self.make(SyntaxKind::StringLiteral)
            .with_value(TokenValue::Str(value))
    }

    fn scan_number(&mut self) -> Token<'a> {
        while matches!(self.peek_byte(0), Some(b'0'..=b'9')) {
            self.pos += 1;
        }
        let text = self.text_between(self.token_start, self.pos);
        let value = match text.parse::<i32>() {
            Ok(v) => v,
            Err(_) => {
                let span = TextSpan::from_bounds(self.token_start as u32, self.pos as u32);
                self.report
                    .report(self.source, span, &messages::INVALID_NUMBER, &[text]);
                0
            }
        };
        self.make(SyntaxKind::NumberLiteral)
            .with_value(TokenValue::Int(value))
    }

    fn scan_identifier(&mut self) -> Token<'a> {
        while matches!(
            self.peek_byte(0),
            Some(b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'_')
        ) {
            self.pos += 1;
        }
        let text = self.text_between(self.token_start, self.pos);
        let kind = SyntaxKind::keyword(text).unwrap_or(SyntaxKind::Identifier);
        self.make(kind)
    }

    fn scan_punctuation(&mut self, byte: u8) -> Token<'a> {
        let next = self.peek_byte(1);
        let (kind, len) = match (byte, next) {
            (b'(', _) => (SyntaxKind::OpenParen, 1),
            (b')', _) => (SyntaxKind::CloseParen, 1),
            (b'{', _) => (SyntaxKind::OpenBrace, 1),
            (b'}', _) => (SyntaxKind::CloseBrace, 1),
            (b'[', _) => (SyntaxKind::OpenBracket, 1),
            (b']', _) => (SyntaxKind::CloseBracket, 1),
            (b',', _) => (SyntaxKind::Comma, 1),
            (b';', _) => (SyntaxKind::Semicolon, 1),
            (b'.', _) => (SyntaxKind::Dot, 1),
            (b':', Some(b':')) => (SyntaxKind::ColonColon, 2),
            (b':', _) => (SyntaxKind::Colon, 1),
            (b'+', Some(b'=')) => (SyntaxKind::PlusEquals, 2),
            (b'+', _) => (SyntaxKind::Plus, 1),
            (b'-', Some(b'=')) => (SyntaxKind::MinusEquals, 2),
            (b'-', _) => (SyntaxKind::Minus, 1),
            (b'*', Some(b'=')) => (SyntaxKind::StarEquals, 2),
            (b'*', _) => (SyntaxKind::Star, 1),
            (b'/', Some(b'=')) => (SyntaxKind::SlashEquals, 2),
            (b'/', _) => (SyntaxKind::Slash, 1),
            (b'%', _) => (SyntaxKind::Percent, 1),
            (b'~', _) => (SyntaxKind::Tilde, 1),
            (b'!', Some(b'=')) => (SyntaxKind::BangEquals, 2),
            (b'!', _) => (SyntaxKind::Bang, 1),
            (b'&', Some(b'&')) => (SyntaxKind::AmpersandAmpersand, 2),
            (b'&', Some(b'=')) => (SyntaxKind::AmpersandEquals, 2),
            (b'&', _) => (SyntaxKind::Ampersand, 1),
            (b'|', Some(b'|')) => (SyntaxKind::PipePipe, 2),
            (b'|', Some(b'=')) => (SyntaxKind::PipeEquals, 2),
            (b'|', _) => (SyntaxKind::Pipe, 1),
            (b'^', Some(b'=')) => (SyntaxKind::CaretEquals, 2),
            (b'^', _) => (SyntaxKind::Caret, 1),
            (b'=', Some(b'=')) => (SyntaxKind::EqualsEquals, 2),
            (b'=', _) => (SyntaxKind::Equals, 1),
            (b'<', Some(b'=')) => (SyntaxKind::LessEquals, 2),
            (b'<', _) => (SyntaxKind::Less, 1),
            (b'>', Some(b'=')) => (SyntaxKind::GreaterEquals, 2),
            (b'>', _) => (SyntaxKind::Greater, 1),
            _ => return self.scan_bad_character(),
        };
        self.pos += len;
        self.make(kind)
    }

    fn scan_bad_character(&mut self) -> Token<'a> {
        let ch = self.source.text()[self.pos..]
            .chars()
            .next()
            .unwrap_or('\u{FFFD}');
        self.pos += ch.len_utf8().max(1);
        let span = TextSpan::from_bounds(self.token_start as u32, self.pos as u32);
        let text = ch.to_string();
        self.report
            .report(self.source, span, &messages::BAD_CHARACTER, &[&text]);
        self.make(SyntaxKind::BadToken)
    }

    #[inline]
    fn peek_byte(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    fn text_between(&self, start: usize, end: usize) -> &'s str {
        let text: &'s str = self.source.text();
        text.get(start..end).unwrap_or("")
    }

    fn make(&self, kind: SyntaxKind) -> Token<'a> {
        let span = TextSpan::from_bounds(self.token_start as u32, self.pos as u32);
        let text = self.arena.alloc_str(self.text_between(self.token_start, self.pos));
        Token::new(kind, span, text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(text: &str) -> Vec<SyntaxKind> {
        let arena = Bump::new();
        let source = SourceText::new("test.nebula", text);
        let (tokens, _) = Scanner::new(&arena, &source).scan_all();
        tokens.iter().map(|t| t.kind).collect()
    }

    #[test]
    fn test_compound_operators() {
        assert_eq!(
            kinds("+= -= &&= ||"),
            vec![
                SyntaxKind::PlusEquals,
                SyntaxKind::MinusEquals,
                SyntaxKind::AmpersandAmpersand,
                SyntaxKind::Equals,
                SyntaxKind::PipePipe,
                SyntaxKind::EndOfFile,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("func waittill notify_me"),
            vec![
                SyntaxKind::FuncKeyword,
                SyntaxKind::WaitTillKeyword,
                SyntaxKind::Identifier,
                SyntaxKind::EndOfFile,
            ]
        );
    }
}
