//! The bound tree.
//!
//! Bound nodes are typed and refer to resolved symbols. Every node keeps the
//! span of the syntax it was bound from; only jumps introduced by lowering
//! may lack one.

use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::symbols::{
    BundleField, BundleSymbol, ConstantValue, FunctionSymbol, ParameterSymbol, TypeSymbol,
    VariableSymbol,
};
use nebula_core::TextSpan;
use std::fmt;
use std::rc::Rc;

/// A jump target, unique within one function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LabelId(pub u32);

impl fmt::Display for LabelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "label{}", self.0)
    }
}

/// A storage location a name resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum VariableRef {
    Local(Rc<VariableSymbol>),
    Parameter(Rc<ParameterSymbol>),
}

impl VariableRef {
    pub fn name(&self) -> &str {
        match self {
            VariableRef::Local(v) => &v.name,
            VariableRef::Parameter(p) => &p.name,
        }
    }

    pub fn ty(&self) -> &TypeSymbol {
        match self {
            VariableRef::Local(v) => &v.ty,
            VariableRef::Parameter(p) => &p.ty,
        }
    }

    pub fn is_readonly(&self) -> bool {
        match self {
            VariableRef::Local(v) => v.is_readonly,
            VariableRef::Parameter(_) => false,
        }
    }

    pub fn constant(&self) -> Option<&ConstantValue> {
        match self {
            VariableRef::Local(v) => v.constant.as_ref(),
            VariableRef::Parameter(_) => None,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone)]
pub enum BoundExpression {
    Error {
        span: TextSpan,
    },
    Literal {
        value: ConstantValue,
        span: TextSpan,
    },
    Unary {
        operator: BoundUnaryOperator,
        operand: Box<BoundExpression>,
        constant: Option<ConstantValue>,
        span: TextSpan,
    },
    Binary {
        left: Box<BoundExpression>,
        operator: BoundBinaryOperator,
        right: Box<BoundExpression>,
        constant: Option<ConstantValue>,
        span: TextSpan,
    },
    Variable {
        variable: VariableRef,
        span: TextSpan,
    },
    Assignment {
        variable: VariableRef,
        value: Box<BoundExpression>,
        span: TextSpan,
    },
    /// `x op= value`; rewritten to an assignment by lowering.
    CompoundAssignment {
        variable: VariableRef,
        operator: BoundBinaryOperator,
        value: Box<BoundExpression>,
        span: TextSpan,
    },
    FieldAccess {
        variable: VariableRef,
        bundle: Rc<BundleSymbol>,
        field: BundleField,
        span: TextSpan,
    },
    FieldAssignment {
        variable: VariableRef,
        bundle: Rc<BundleSymbol>,
        field: BundleField,
        value: Box<BoundExpression>,
        span: TextSpan,
    },
    ArrayAccess {
        variable: VariableRef,
        indices: Vec<BoundExpression>,
        element_type: TypeSymbol,
        span: TextSpan,
    },
    ArrayAssignment {
        variable: VariableRef,
        indices: Vec<BoundExpression>,
        value: Box<BoundExpression>,
        span: TextSpan,
    },
    Call {
        function: Rc<FunctionSymbol>,
        /// Set only when the callee lives in another namespace.
        namespace: Option<String>,
        arguments: Vec<BoundExpression>,
        is_async: bool,
        span: TextSpan,
    },
    Conversion {
        ty: TypeSymbol,
        expression: Box<BoundExpression>,
        span: TextSpan,
    },
    /// A fresh array.
    ObjectAllocation {
        ty: TypeSymbol,
        span: TextSpan,
    },
}

impl BoundExpression {
    pub fn error(span: TextSpan) -> Self {
        BoundExpression::Error { span }
    }

    pub fn ty(&self) -> TypeSymbol {
        match self {
            BoundExpression::Error { .. } => TypeSymbol::Error,
            BoundExpression::Literal { value, .. } => value.ty(),
            BoundExpression::Unary { operator, .. } => operator.result_type(),
            BoundExpression::Binary { operator, .. } => operator.result_type(),
            BoundExpression::CompoundAssignment { operator, .. } => operator.result_type(),
            BoundExpression::Variable { variable, .. }
            | BoundExpression::Assignment { variable, .. } => variable.ty().clone(),
            BoundExpression::FieldAccess { field, .. }
            | BoundExpression::FieldAssignment { field, .. } => field.ty.clone(),
            BoundExpression::ArrayAccess { element_type, .. } => element_type.clone(),
            BoundExpression::ArrayAssignment { value, .. } => value.ty(),
            BoundExpression::Call { function, .. } => function.return_type.clone(),
            BoundExpression::Conversion { ty, .. } | BoundExpression::ObjectAllocation { ty, .. } => {
                ty.clone()
            }
        }
    }

    /// The compile-time value of the expression, if it has one.
    pub fn constant_value(&self) -> Option<&ConstantValue> {
        match self {
            BoundExpression::Literal { value, .. } => Some(value),
            BoundExpression::Unary { constant, .. } | BoundExpression::Binary { constant, .. } => {
                constant.as_ref()
            }
            BoundExpression::Variable { variable, .. } => variable.constant(),
            _ => None,
        }
    }

    pub fn span(&self) -> TextSpan {
        match self {
            BoundExpression::Error { span }
            | BoundExpression::Literal { span, .. }
            | BoundExpression::Unary { span, .. }
            | BoundExpression::Binary { span, .. }
            | BoundExpression::Variable { span, .. }
            | BoundExpression::Assignment { span, .. }
            | BoundExpression::CompoundAssignment { span, .. }
            | BoundExpression::FieldAccess { span, .. }
            | BoundExpression::FieldAssignment { span, .. }
            | BoundExpression::ArrayAccess { span, .. }
            | BoundExpression::ArrayAssignment { span, .. }
            | BoundExpression::Call { span, .. }
            | BoundExpression::Conversion { span, .. }
            | BoundExpression::ObjectAllocation { span, .. } => *span,
        }
    }
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone)]
pub struct BoundVariableDeclaration {
    pub variable: Rc<VariableSymbol>,
    pub initializer: BoundExpression,
    pub span: TextSpan,
}

#[derive(Debug, Clone)]
pub enum BoundStatement {
    Block {
        statements: Vec<BoundStatement>,
        span: TextSpan,
    },
    Expression {
        expression: BoundExpression,
        span: TextSpan,
    },
    VariableDeclaration(BoundVariableDeclaration),
    /// `int a, b;`; flattened by lowering.
    VariableDeclarationCollection {
        declarations: Vec<BoundVariableDeclaration>,
        span: TextSpan,
    },
    Wait {
        time: BoundExpression,
        span: TextSpan,
    },
    WaitNotification {
        target: BoundExpression,
        channel: BoundExpression,
        span: TextSpan,
    },
    Notify {
        target: BoundExpression,
        channel: BoundExpression,
        span: TextSpan,
    },
    If {
        condition: BoundExpression,
        then_statement: Box<BoundStatement>,
        else_statement: Option<Box<BoundStatement>>,
        span: TextSpan,
    },
    While {
        condition: BoundExpression,
        body: Box<BoundStatement>,
        break_label: LabelId,
        continue_label: LabelId,
        span: TextSpan,
    },
    DoWhile {
        body: Box<BoundStatement>,
        condition: BoundExpression,
        break_label: LabelId,
        continue_label: LabelId,
        span: TextSpan,
    },
    For {
        initializer: Option<Box<BoundStatement>>,
        /// `None` loops until a break or return.
        condition: Option<BoundExpression>,
        step: Option<BoundExpression>,
        body: Box<BoundStatement>,
        break_label: LabelId,
        continue_label: LabelId,
        span: TextSpan,
    },
    ConditionalGoto {
        label: LabelId,
        condition: BoundExpression,
        jump_if_true: bool,
        span: TextSpan,
    },
    Goto {
        label: LabelId,
        span: Option<TextSpan>,
    },
    Label {
        label: LabelId,
    },
    Return {
        value: Option<BoundExpression>,
        span: TextSpan,
    },
    Nop {
        span: TextSpan,
    },
}

impl BoundStatement {
    /// The statement's span; `None` for labels and synthesized jumps.
    pub fn span(&self) -> Option<TextSpan> {
        match self {
            BoundStatement::VariableDeclaration(declaration) => Some(declaration.span),
            BoundStatement::Goto { span, .. } => *span,
            BoundStatement::Label { .. } => None,
            BoundStatement::Block { span, .. }
            | BoundStatement::Expression { span, .. }
            | BoundStatement::VariableDeclarationCollection { span, .. }
            | BoundStatement::Wait { span, .. }
            | BoundStatement::WaitNotification { span, .. }
            | BoundStatement::Notify { span, .. }
            | BoundStatement::If { span, .. }
            | BoundStatement::While { span, .. }
            | BoundStatement::DoWhile { span, .. }
            | BoundStatement::For { span, .. }
            | BoundStatement::ConditionalGoto { span, .. }
            | BoundStatement::Return { span, .. }
            | BoundStatement::Nop { span } => Some(*span),
        }
    }
}
