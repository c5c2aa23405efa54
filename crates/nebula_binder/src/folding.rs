//! Constant folding for operators over constant operands.

use crate::operators::{BinaryOperatorKind, BoundBinaryOperator, BoundUnaryOperator, UnaryOperatorKind};
use crate::symbols::ConstantValue;

pub fn fold_unary(operator: &BoundUnaryOperator, operand: Option<&ConstantValue>) -> Option<ConstantValue> {
    let value = match (operator.kind, operand?) {
        (UnaryOperatorKind::Identity, ConstantValue::Int(v)) => ConstantValue::Int(*v),
        (UnaryOperatorKind::Negation, ConstantValue::Int(v)) => ConstantValue::Int(v.wrapping_neg()),
        (UnaryOperatorKind::OnesComplement, ConstantValue::Int(v)) => ConstantValue::Int(!v),
        (UnaryOperatorKind::LogicalNegation, ConstantValue::Bool(v)) => ConstantValue::Bool(!v),
        _ => return None,
    };
    Some(value)
}

/// Fold `left <op> right`. Both operands must be constant; division and
/// remainder by zero are left for the runtime.
pub fn fold_binary(
    left: Option<&ConstantValue>,
    operator: &BoundBinaryOperator,
    right: Option<&ConstantValue>,
) -> Option<ConstantValue> {
    match (left?, right?) {
        (ConstantValue::Int(l), ConstantValue::Int(r)) => fold_int(*l, operator.kind, *r),
        (ConstantValue::Bool(l), ConstantValue::Bool(r)) => fold_bool(*l, operator.kind, *r),
        (ConstantValue::String(l), ConstantValue::String(r)) => fold_string(l, operator.kind, r),
        _ => None,
    }
}

fn fold_int(l: i32, kind: BinaryOperatorKind, r: i32) -> Option<ConstantValue> {
    use BinaryOperatorKind::*;
    let value = match kind {
        Addition => ConstantValue::Int(l.wrapping_add(r)),
        Subtraction => ConstantValue::Int(l.wrapping_sub(r)),
        Multiplication => ConstantValue::Int(l.wrapping_mul(r)),
        Division if r != 0 => ConstantValue::Int(l.wrapping_div(r)),
        Remainder if r != 0 => ConstantValue::Int(l.wrapping_rem(r)),
        BitwiseAnd => ConstantValue::Int(l & r),
        BitwiseOr => ConstantValue::Int(l | r),
        BitwiseXor => ConstantValue::Int(l ^ r),
        Equals => ConstantValue::Bool(l == r),
        NotEquals => ConstantValue::Bool(l != r),
        Less => ConstantValue::Bool(l < r),
        LessOrEquals => ConstantValue::Bool(l <= r),
        Greater => ConstantValue::Bool(l > r),
        GreaterOrEquals => ConstantValue::Bool(l >= r),
        _ => return None,
    };
    Some(value)
}

fn fold_bool(l: bool, kind: BinaryOperatorKind, r: bool) -> Option<ConstantValue> {
    use BinaryOperatorKind::*;
    let value = match kind {
        BitwiseAnd | LogicalAnd => l & r,
        BitwiseOr | LogicalOr => l | r,
        BitwiseXor => l ^ r,
        Equals => l == r,
        NotEquals => l != r,
        _ => return None,
    };
    Some(ConstantValue::Bool(value))
}

fn fold_string(l: &str, kind: BinaryOperatorKind, r: &str) -> Option<ConstantValue> {
    let value = match kind {
        BinaryOperatorKind::Addition => ConstantValue::String(format!("{l}{r}")),
        BinaryOperatorKind::Equals => ConstantValue::Bool(l == r),
        BinaryOperatorKind::NotEquals => ConstantValue::Bool(l != r),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::TypeSymbol;
    use nebula_syntax::SyntaxKind;

    fn binary(kind: SyntaxKind, ty: TypeSymbol) -> BoundBinaryOperator {
        BoundBinaryOperator::bind(kind, &ty, &ty).unwrap()
    }

    #[test]
    fn test_int_arithmetic_wraps() {
        let add = binary(SyntaxKind::Plus, TypeSymbol::Int);
        let result = fold_binary(Some(&ConstantValue::Int(i32::MAX)), &add, Some(&ConstantValue::Int(1)));
        assert_eq!(result, Some(ConstantValue::Int(i32::MIN)));
    }

    #[test]
    fn test_division_by_zero_is_not_folded() {
        let div = binary(SyntaxKind::Slash, TypeSymbol::Int);
        assert_eq!(fold_binary(Some(&ConstantValue::Int(4)), &div, Some(&ConstantValue::Int(0))), None);
        let rem = binary(SyntaxKind::Percent, TypeSymbol::Int);
        assert_eq!(
            fold_binary(Some(&ConstantValue::Int(7)), &rem, Some(&ConstantValue::Int(3))),
            Some(ConstantValue::Int(1))
        );
    }

    #[test]
    fn test_requires_both_operands() {
        let or = binary(SyntaxKind::PipePipe, TypeSymbol::Bool);
        assert_eq!(fold_binary(Some(&ConstantValue::Bool(true)), &or, None), None);
    }

    #[test]
    fn test_string_concatenation() {
        let add = binary(SyntaxKind::Plus, TypeSymbol::String);
        let result = fold_binary(
            Some(&ConstantValue::String("ab".into())),
            &add,
            Some(&ConstantValue::String("cd".into())),
        );
        assert_eq!(result, Some(ConstantValue::String("abcd".into())));
    }

    #[test]
    fn test_unary() {
        let not = BoundUnaryOperator::bind(SyntaxKind::Tilde, &TypeSymbol::Int).unwrap();
        assert_eq!(fold_unary(&not, Some(&ConstantValue::Int(0))), Some(ConstantValue::Int(-1)));
        let neg = BoundUnaryOperator::bind(SyntaxKind::Bang, &TypeSymbol::Bool).unwrap();
        assert_eq!(fold_unary(&neg, Some(&ConstantValue::Bool(false))), Some(ConstantValue::Bool(true)));
    }
}
