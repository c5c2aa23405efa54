//! Token kinds and scanned tokens.

use nebula_core::TextSpan;
use std::fmt;

/// Every kind of token the scanner can produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyntaxKind {
    BadToken,
    EndOfFile,

    Identifier,
    NumberLiteral,
    StringLiteral,

    // Punctuation
    OpenParen,
    CloseParen,
    OpenBrace,
    CloseBrace,
    OpenBracket,
    CloseBracket,
    Comma,
    Semicolon,
    Dot,
    Colon,
    ColonColon,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    Tilde,
    Ampersand,
    AmpersandAmpersand,
    Pipe,
    PipePipe,
    Caret,
    Equals,
    EqualsEquals,
    BangEquals,
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    PlusEquals,
    MinusEquals,
    StarEquals,
    SlashEquals,
    AmpersandEquals,
    PipeEquals,
    CaretEquals,

    // Keywords
    FuncKeyword,
    BundleKeyword,
    ReturnKeyword,
    NamespaceKeyword,
    AsyncKeyword,
    WaitKeyword,
    WaitTillKeyword,
    NotifyKeyword,
    EndOnKeyword,
    ConstKeyword,
    NativeKeyword,
    BreakKeyword,
    ContinueKeyword,
    IfKeyword,
    ElseKeyword,
    TrueKeyword,
    FalseKeyword,
    WhileKeyword,
    DoKeyword,
    ForKeyword,
    ImportKeyword,
}

impl SyntaxKind {
    /// Look up a keyword by its source text.
    pub fn keyword(text: &str) -> Option<SyntaxKind> {
        let kind = match text {
            "func" => SyntaxKind::FuncKeyword,
            "bundle" => SyntaxKind::BundleKeyword,
            "return" => SyntaxKind::ReturnKeyword,
            "namespace" => SyntaxKind::NamespaceKeyword,
            "async" => SyntaxKind::AsyncKeyword,
            "wait" => SyntaxKind::WaitKeyword,
            "waittill" => SyntaxKind::WaitTillKeyword,
            "notify" => SyntaxKind::NotifyKeyword,
            "endon" => SyntaxKind::EndOnKeyword,
            "const" => SyntaxKind::ConstKeyword,
            "native" => SyntaxKind::NativeKeyword,
            "break" => SyntaxKind::BreakKeyword,
            "continue" => SyntaxKind::ContinueKeyword,
            "if" => SyntaxKind::IfKeyword,
            "else" => SyntaxKind::ElseKeyword,
            "true" => SyntaxKind::TrueKeyword,
            "false" => SyntaxKind::FalseKeyword,
            "while" => SyntaxKind::WhileKeyword,
            "do" => SyntaxKind::DoKeyword,
            "for" => SyntaxKind::ForKeyword,
            "import" => SyntaxKind::ImportKeyword,
            _ => return None,
        };
        Some(kind)
    }

    /// The fixed source text of punctuation, operators and keywords.
    pub fn text(self) -> Option<&'static str> {
        let text = match self {
            SyntaxKind::OpenParen => "(",
            SyntaxKind::CloseParen => ")",
            SyntaxKind::OpenBrace => "{",
            SyntaxKind::CloseBrace => "}",
            SyntaxKind::OpenBracket => "[",
            SyntaxKind::CloseBracket => "]",
            SyntaxKind::Comma => ",",
            SyntaxKind::Semicolon => ";",
            SyntaxKind::Dot => ".",
            SyntaxKind::Colon => ":",
            SyntaxKind::ColonColon => "::",
            SyntaxKind::Plus => "+",
            SyntaxKind::Minus => "-",
            SyntaxKind::Star => "*",
            SyntaxKind::Slash => "/",
            SyntaxKind::Percent => "%",
            SyntaxKind::Bang => "!",
            SyntaxKind::Tilde => "~",
            SyntaxKind::Ampersand => "&",
            SyntaxKind::AmpersandAmpersand => "&&",
            SyntaxKind::Pipe => "|",
            SyntaxKind::PipePipe => "||",
            SyntaxKind::Caret => "^",
            SyntaxKind::Equals => "=",
            SyntaxKind::EqualsEquals => "==",
            SyntaxKind::BangEquals => "!=",
            SyntaxKind::Less => "<",
            SyntaxKind::LessEquals => "<=",
            SyntaxKind::Greater => ">",
            SyntaxKind::GreaterEquals => ">=",
            SyntaxKind::PlusEquals => "+=",
            SyntaxKind::MinusEquals => "-=",
            SyntaxKind::StarEquals => "*=",
            SyntaxKind::SlashEquals => "/=",
            SyntaxKind::AmpersandEquals => "&=",
            SyntaxKind::PipeEquals => "|=",
            SyntaxKind::CaretEquals => "^=",
            SyntaxKind::FuncKeyword => "func",
            SyntaxKind::BundleKeyword => "bundle",
            SyntaxKind::ReturnKeyword => "return",
            SyntaxKind::NamespaceKeyword => "namespace",
            SyntaxKind::AsyncKeyword => "async",
            SyntaxKind::WaitKeyword => "wait",
            SyntaxKind::WaitTillKeyword => "waittill",
            SyntaxKind::NotifyKeyword => "notify",
            SyntaxKind::EndOnKeyword => "endon",
            SyntaxKind::ConstKeyword => "const",
            SyntaxKind::NativeKeyword => "native",
            SyntaxKind::BreakKeyword => "break",
            SyntaxKind::ContinueKeyword => "continue",
            SyntaxKind::IfKeyword => "if",
            SyntaxKind::ElseKeyword => "else",
            SyntaxKind::TrueKeyword => "true",
            SyntaxKind::FalseKeyword => "false",
            SyntaxKind::WhileKeyword => "while",
            SyntaxKind::DoKeyword => "do",
            SyntaxKind::ForKeyword => "for",
            SyntaxKind::ImportKeyword => "import",
            SyntaxKind::BadToken
            | SyntaxKind::EndOfFile
            | SyntaxKind::Identifier
            | SyntaxKind::NumberLiteral
            | SyntaxKind::StringLiteral => return None,
        };
        Some(text)
    }

    /// Precedence of a prefix operator, 0 if the token is not one.
    pub fn unary_precedence(self) -> u8 {
        match self {
            SyntaxKind::Plus | SyntaxKind::Minus | SyntaxKind::Bang | SyntaxKind::Tilde => 6,
            _ => 0,
        }
    }

    /// Precedence of an infix operator, 0 if the token is not one.
    pub fn binary_precedence(self) -> u8 {
        match self {
            SyntaxKind::Star | SyntaxKind::Slash | SyntaxKind::Percent => 5,
            SyntaxKind::Plus | SyntaxKind::Minus => 4,
            SyntaxKind::EqualsEquals
            | SyntaxKind::BangEquals
            | SyntaxKind::Less
            | SyntaxKind::LessEquals
            | SyntaxKind::Greater
            | SyntaxKind::GreaterEquals => 3,
            SyntaxKind::Ampersand | SyntaxKind::AmpersandAmpersand => 2,
            SyntaxKind::Pipe | SyntaxKind::PipePipe | SyntaxKind::Caret => 1,
            _ => 0,
        }
    }

    /// Whether the token starts an assignment (`=` or a compound form).
    pub fn is_assignment_operator(self) -> bool {
        self == SyntaxKind::Equals || self.compound_operator().is_some()
    }

    /// The binary operator a compound assignment applies, e.g. `+=` to `+`.
    pub fn compound_operator(self) -> Option<SyntaxKind> {
        match self {
            SyntaxKind::PlusEquals => Some(SyntaxKind::Plus),
            SyntaxKind::MinusEquals => Some(SyntaxKind::Minus),
            SyntaxKind::StarEquals => Some(SyntaxKind::Star),
            SyntaxKind::SlashEquals => Some(SyntaxKind::Slash),
            SyntaxKind::AmpersandEquals => Some(SyntaxKind::Ampersand),
            SyntaxKind::PipeEquals => Some(SyntaxKind::Pipe),
            SyntaxKind::CaretEquals => Some(SyntaxKind::Caret),
            _ => None,
        }
    }
}

impl fmt::Display for SyntaxKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.text() {
            Some(text) => f.write_str(text),
            None => match self {
                SyntaxKind::Identifier => f.write_str("identifier"),
                SyntaxKind::NumberLiteral => f.write_str("number"),
                SyntaxKind::StringLiteral => f.write_str("string"),
                SyntaxKind::EndOfFile => f.write_str("end of file"),
                _ => f.write_str("bad token"),
            },
        }
    }
}

/// Decoded value of a literal token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValue<'a> {
    None,
    Int(i32),
    Str(&'a str),
}

/// A scanned token. Text is arena-allocated.
#[derive(Debug, Clone, Copy)]
pub struct Token<'a> {
    pub kind: SyntaxKind,
    pub span: TextSpan,
    /// Raw source text of the token.
    pub text: &'a str,
    pub value: TokenValue<'a>,
}

impl<'a> Token<'a> {
    pub fn new(kind: SyntaxKind, span: TextSpan, text: &'a str) -> Self {
        Self {
            kind,
            span,
            text,
            value: TokenValue::None,
        }
    }

    /// A zero-width token inserted by the parser in place of a missing one.
    pub fn missing(kind: SyntaxKind, pos: u32) -> Self {
        Self::new(kind, TextSpan::empty(pos), "")
    }

    pub fn with_value(mut self, value: TokenValue<'a>) -> Self {
        self.value = value;
        self
    }

    /// Whether the token was synthesized rather than scanned.
    pub fn is_missing(&self) -> bool {
        self.span.is_empty() && self.kind != SyntaxKind::EndOfFile
    }
}
