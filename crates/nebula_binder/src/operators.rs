//! Operator tables.
//!
//! Resolution scans a static table in order and takes the first entry whose
//! operator token and operand types match exactly.

use crate::symbols::TypeSymbol;
use nebula_syntax::SyntaxKind;

/// The operand types operators are defined over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveType {
    Bool,
    Int,
    String,
}

impl PrimitiveType {
    pub fn of(ty: &TypeSymbol) -> Option<PrimitiveType> {
        match ty {
            TypeSymbol::Bool => Some(PrimitiveType::Bool),
            TypeSymbol::Int => Some(PrimitiveType::Int),
            TypeSymbol::String => Some(PrimitiveType::String),
            _ => None,
        }
    }

    pub fn to_type(self) -> TypeSymbol {
        match self {
            PrimitiveType::Bool => TypeSymbol::Bool,
            PrimitiveType::Int => TypeSymbol::Int,
            PrimitiveType::String => TypeSymbol::String,
        }
    }
}

// ============================================================================
// Binary operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperatorKind {
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Remainder,
    BitwiseAnd,
    BitwiseOr,
    BitwiseXor,
    LogicalAnd,
    LogicalOr,
    Equals,
    NotEquals,
    Less,
    LessOrEquals,
    Greater,
    GreaterOrEquals,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundBinaryOperator {
    pub syntax: SyntaxKind,
    pub kind: BinaryOperatorKind,
    pub left: PrimitiveType,
    pub right: PrimitiveType,
    pub result: PrimitiveType,
}

impl BoundBinaryOperator {
    const fn same(syntax: SyntaxKind, kind: BinaryOperatorKind, ty: PrimitiveType) -> Self {
        Self {
            syntax,
            kind,
            left: ty,
            right: ty,
            result: ty,
        }
    }

    const fn compare(syntax: SyntaxKind, kind: BinaryOperatorKind, ty: PrimitiveType) -> Self {
        Self {
            syntax,
            kind,
            left: ty,
            right: ty,
            result: PrimitiveType::Bool,
        }
    }

    /// Find the operator for `left <syntax> right`.
    pub fn bind(syntax: SyntaxKind, left: &TypeSymbol, right: &TypeSymbol) -> Option<Self> {
        let left = PrimitiveType::of(left)?;
        let right = PrimitiveType::of(right)?;
        BINARY_OPERATORS
            .iter()
            .find(|op| op.syntax == syntax && op.left == left && op.right == right)
            .copied()
    }

    pub fn result_type(&self) -> TypeSymbol {
        self.result.to_type()
    }
}

use BinaryOperatorKind as B;
use PrimitiveType::{Bool as TBool, Int as TInt, String as TString};

static BINARY_OPERATORS: &[BoundBinaryOperator] = &[
    BoundBinaryOperator::same(SyntaxKind::Plus, B::Addition, TInt),
    BoundBinaryOperator::same(SyntaxKind::Minus, B::Subtraction, TInt),
    BoundBinaryOperator::same(SyntaxKind::Star, B::Multiplication, TInt),
    BoundBinaryOperator::same(SyntaxKind::Slash, B::Division, TInt),
    BoundBinaryOperator::same(SyntaxKind::Percent, B::Remainder, TInt),
    BoundBinaryOperator::same(SyntaxKind::Ampersand, B::BitwiseAnd, TInt),
    BoundBinaryOperator::same(SyntaxKind::Pipe, B::BitwiseOr, TInt),
    BoundBinaryOperator::same(SyntaxKind::Caret, B::BitwiseXor, TInt),
    BoundBinaryOperator::compare(SyntaxKind::EqualsEquals, B::Equals, TInt),
    BoundBinaryOperator::compare(SyntaxKind::BangEquals, B::NotEquals, TInt),
    BoundBinaryOperator::compare(SyntaxKind::Less, B::Less, TInt),
    BoundBinaryOperator::compare(SyntaxKind::LessEquals, B::LessOrEquals, TInt),
    BoundBinaryOperator::compare(SyntaxKind::Greater, B::Greater, TInt),
    BoundBinaryOperator::compare(SyntaxKind::GreaterEquals, B::GreaterOrEquals, TInt),
    BoundBinaryOperator::same(SyntaxKind::Ampersand, B::BitwiseAnd, TBool),
    BoundBinaryOperator::same(SyntaxKind::AmpersandAmpersand, B::LogicalAnd, TBool),
    BoundBinaryOperator::same(SyntaxKind::Pipe, B::BitwiseOr, TBool),
    BoundBinaryOperator::same(SyntaxKind::PipePipe, B::LogicalOr, TBool),
    BoundBinaryOperator::same(SyntaxKind::Caret, B::BitwiseXor, TBool),
    BoundBinaryOperator::same(SyntaxKind::EqualsEquals, B::Equals, TBool),
    BoundBinaryOperator::same(SyntaxKind::BangEquals, B::NotEquals, TBool),
    BoundBinaryOperator::same(SyntaxKind::Plus, B::Addition, TString),
    BoundBinaryOperator::compare(SyntaxKind::EqualsEquals, B::Equals, TString),
    BoundBinaryOperator::compare(SyntaxKind::BangEquals, B::NotEquals, TString),
];

// ============================================================================
// Unary operators
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperatorKind {
    Identity,
    Negation,
    LogicalNegation,
    OnesComplement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundUnaryOperator {
    pub syntax: SyntaxKind,
    pub kind: UnaryOperatorKind,
    pub operand: PrimitiveType,
    pub result: PrimitiveType,
}

impl BoundUnaryOperator {
    const fn new(syntax: SyntaxKind, kind: UnaryOperatorKind, ty: PrimitiveType) -> Self {
        Self {
            syntax,
            kind,
            operand: ty,
            result: ty,
        }
    }

    pub fn bind(syntax: SyntaxKind, operand: &TypeSymbol) -> Option<Self> {
        let operand = PrimitiveType::of(operand)?;
        UNARY_OPERATORS
            .iter()
            .find(|op| op.syntax == syntax && op.operand == operand)
            .copied()
    }

    pub fn result_type(&self) -> TypeSymbol {
        self.result.to_type()
    }
}

static UNARY_OPERATORS: &[BoundUnaryOperator] = &[
    BoundUnaryOperator::new(SyntaxKind::Bang, UnaryOperatorKind::LogicalNegation, TBool),
    BoundUnaryOperator::new(SyntaxKind::Plus, UnaryOperatorKind::Identity, TInt),
    BoundUnaryOperator::new(SyntaxKind::Minus, UnaryOperatorKind::Negation, TInt),
    BoundUnaryOperator::new(SyntaxKind::Tilde, UnaryOperatorKind::OnesComplement, TInt),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_comparison_yields_bool() {
        let op = BoundBinaryOperator::bind(SyntaxKind::LessEquals, &TypeSymbol::Int, &TypeSymbol::Int)
            .unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::LessOrEquals);
        assert_eq!(op.result_type(), TypeSymbol::Bool);
    }

    #[test]
    fn test_string_concatenation_only() {
        assert!(BoundBinaryOperator::bind(SyntaxKind::Plus, &TypeSymbol::String, &TypeSymbol::String).is_some());
        assert!(BoundBinaryOperator::bind(SyntaxKind::Minus, &TypeSymbol::String, &TypeSymbol::String).is_none());
        assert!(BoundBinaryOperator::bind(SyntaxKind::Plus, &TypeSymbol::String, &TypeSymbol::Int).is_none());
    }

    #[test]
    fn test_logical_and_requires_bool() {
        assert!(BoundBinaryOperator::bind(SyntaxKind::AmpersandAmpersand, &TypeSymbol::Int, &TypeSymbol::Int).is_none());
        let op = BoundBinaryOperator::bind(SyntaxKind::AmpersandAmpersand, &TypeSymbol::Bool, &TypeSymbol::Bool)
            .unwrap();
        assert_eq!(op.kind, BinaryOperatorKind::LogicalAnd);
    }

    #[test]
    fn test_unary_table() {
        assert_eq!(
            BoundUnaryOperator::bind(SyntaxKind::Bang, &TypeSymbol::Bool).map(|op| op.kind),
            Some(UnaryOperatorKind::LogicalNegation)
        );
        assert!(BoundUnaryOperator::bind(SyntaxKind::Bang, &TypeSymbol::Int).is_none());
        assert!(BoundUnaryOperator::bind(SyntaxKind::Minus, &TypeSymbol::Error).is_none());
    }
}
