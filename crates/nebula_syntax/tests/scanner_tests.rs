//! Scanner integration tests.
//!
//! Verifies token kinds, literal values and lexical diagnostics.

use bumpalo::Bump;
use nebula_core::SourceText;
use nebula_diagnostics::messages;
use nebula_syntax::{Scanner, SyntaxKind, TokenValue};

fn kinds(text: &str) -> Vec<SyntaxKind> {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", text);
    let (tokens, _) = Scanner::new(&arena, &source).scan_all();
    tokens.iter().map(|t| t.kind).collect()
}

// ============================================================================
// Tokens
// ============================================================================

#[test]
fn test_empty_source_is_end_of_file() {
    assert_eq!(kinds(""), vec![SyntaxKind::EndOfFile]);
    assert_eq!(kinds("   \r\n\t "), vec![SyntaxKind::EndOfFile]);
}

#[test]
fn test_comments_are_skipped() {
    assert_eq!(
        kinds("// line comment\nint /* block\ncomment */ x"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFile
        ]
    );
}

#[test]
fn test_namespace_qualifier() {
    assert_eq!(
        kinds("other::Point"),
        vec![
            SyntaxKind::Identifier,
            SyntaxKind::ColonColon,
            SyntaxKind::Identifier,
            SyntaxKind::EndOfFile
        ]
    );
}

#[test]
fn test_comparison_operators() {
    assert_eq!(
        kinds("< <= > >= == != ="),
        vec![
            SyntaxKind::Less,
            SyntaxKind::LessEquals,
            SyntaxKind::Greater,
            SyntaxKind::GreaterEquals,
            SyntaxKind::EqualsEquals,
            SyntaxKind::BangEquals,
            SyntaxKind::Equals,
            SyntaxKind::EndOfFile
        ]
    );
}

#[test]
fn test_token_spans() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", "wait  100;");
    let (tokens, _) = Scanner::new(&arena, &source).scan_all();
    assert_eq!(tokens[0].span.start, 0);
    assert_eq!(tokens[0].span.length, 4);
    assert_eq!(tokens[1].span.start, 6);
    assert_eq!(tokens[1].text, "100");
    assert_eq!(tokens[2].kind, SyntaxKind::Semicolon);
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_number_value() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", "2147483647");
    let (tokens, report) = Scanner::new(&arena, &source).scan_all();
    assert!(report.is_empty());
    assert_eq!(tokens[0].value, TokenValue::Int(i32::MAX));
}

#[test]
fn test_number_overflow_is_reported() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", "99999999999");
    let (tokens, report) = Scanner::new(&arena, &source).scan_all();
    assert_eq!(tokens[0].kind, SyntaxKind::NumberLiteral);
    assert_eq!(report.count(&messages::INVALID_NUMBER), 1);
}

#[test]
fn test_string_doubled_quote_escape() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", r#""say ""hi""""#);
    let (tokens, report) = Scanner::new(&arena, &source).scan_all();
    assert!(report.is_empty());
    assert_eq!(tokens[0].kind, SyntaxKind::StringLiteral);
    assert_eq!(tokens[0].value, TokenValue::Str("say \"hi\""));
}

#[test]
fn test_unterminated_string() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", "\"abc\nx");
    let (tokens, report) = Scanner::new(&arena, &source).scan_all();
    assert_eq!(report.count(&messages::UNTERMINATED_STRING), 1);
    assert_eq!(tokens[0].value, TokenValue::Str("abc"));
    assert_eq!(tokens[1].kind, SyntaxKind::Identifier);
}

// ============================================================================
// Diagnostics
// ============================================================================

#[test]
fn test_bad_character() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", "a @ b");
    let (tokens, report) = Scanner::new(&arena, &source).scan_all();
    assert_eq!(tokens[1].kind, SyntaxKind::BadToken);
    assert_eq!(tokens[2].kind, SyntaxKind::Identifier);
    assert_eq!(report.count(&messages::BAD_CHARACTER), 1);
}

#[test]
fn test_unterminated_comment() {
    let arena = Bump::new();
    let source = SourceText::new("test.nebula", "x /* never closed");
    let (tokens, report) = Scanner::new(&arena, &source).scan_all();
    assert_eq!(tokens.len(), 2);
    assert_eq!(report.count(&messages::UNTERMINATED_COMMENT), 1);
}
