//! Concrete syntax tree for Nebula compilation units.
//!
//! All nodes are allocated in a `bumpalo` arena and borrow from it for
//! `'a`. Every node keeps the span it was parsed from so later stages can
//! report diagnostics and map instructions back to lines.

use crate::token::SyntaxKind;
use nebula_core::{SourceText, TextSpan};
use std::rc::Rc;

/// A name with its location.
#[derive(Debug, Clone, Copy)]
pub struct Identifier<'a> {
    pub text: &'a str,
    pub span: TextSpan,
}

/// An operator token.
#[derive(Debug, Clone, Copy)]
pub struct Operator {
    pub kind: SyntaxKind,
    pub span: TextSpan,
}

/// One parsed source file.
#[derive(Debug)]
pub struct CompilationUnit<'a> {
    pub source: Rc<SourceText>,
    pub namespace: Option<NamespaceDeclaration<'a>>,
    pub imports: &'a [ImportDeclaration<'a>],
    pub functions: &'a [FunctionDeclaration<'a>],
    pub native_functions: &'a [NativeFunctionDeclaration<'a>],
    pub bundles: &'a [BundleDeclaration<'a>],
}

impl<'a> CompilationUnit<'a> {
    /// The declared namespace, or the file stem when none was declared.
    pub fn namespace_name(&self) -> &str {
        match &self.namespace {
            Some(ns) => ns.name,
            None => self.source.file_stem(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct NamespaceDeclaration<'a> {
    pub name: &'a str,
    pub name_span: TextSpan,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct ImportDeclaration<'a> {
    pub name: &'a str,
    pub name_span: TextSpan,
    pub span: TextSpan,
}

/// `name`, `ns::name`, optionally followed by a rank such as `[,]`.
#[derive(Debug, Clone, Copy)]
pub struct TypeClause<'a> {
    pub namespace: Option<Identifier<'a>>,
    pub name: Identifier<'a>,
    /// Number of array dimensions, 0 for non-array types.
    pub rank: u32,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct Parameter<'a> {
    pub ty: TypeClause<'a>,
    pub name: Identifier<'a>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct FunctionDeclaration<'a> {
    pub return_type: TypeClause<'a>,
    pub name: Identifier<'a>,
    pub parameters: &'a [Parameter<'a>],
    pub attributes: &'a [Identifier<'a>],
    pub body: BlockStatement<'a>,
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct NativeFunctionDeclaration<'a> {
    pub return_type: TypeClause<'a>,
    pub name: Identifier<'a>,
    pub parameters: &'a [Parameter<'a>],
    pub span: TextSpan,
}

#[derive(Debug)]
pub struct BundleDeclaration<'a> {
    pub name: Identifier<'a>,
    pub fields: &'a [FieldDeclaration<'a>],
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct FieldDeclaration<'a> {
    pub ty: TypeClause<'a>,
    pub name: Identifier<'a>,
    pub span: TextSpan,
}

// ============================================================================
// Statements
// ============================================================================

#[derive(Debug, Clone, Copy)]
pub struct BlockStatement<'a> {
    pub statements: &'a [Statement<'a>],
    pub span: TextSpan,
}

/// `[const] type a [= e], b [= e];`
#[derive(Debug, Clone, Copy)]
pub struct VariableDeclarationList<'a> {
    pub is_const: bool,
    pub ty: TypeClause<'a>,
    pub declarators: &'a [VariableDeclarator<'a>],
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub struct VariableDeclarator<'a> {
    pub name: Identifier<'a>,
    pub initializer: Option<&'a Expression<'a>>,
    pub span: TextSpan,
}

#[derive(Debug, Clone, Copy)]
pub enum Statement<'a> {
    Block(BlockStatement<'a>),
    VariableDeclaration(VariableDeclarationList<'a>),
    Expression {
        expression: &'a Expression<'a>,
        span: TextSpan,
    },
    Wait {
        time: &'a Expression<'a>,
        span: TextSpan,
    },
    /// `target waittill channel;`
    WaitNotification {
        target: &'a Expression<'a>,
        channel: &'a Expression<'a>,
        span: TextSpan,
    },
    /// `target notify channel;`
    Notify {
        target: &'a Expression<'a>,
        channel: &'a Expression<'a>,
        span: TextSpan,
    },
    Return {
        value: Option<&'a Expression<'a>>,
        span: TextSpan,
    },
    Break {
        span: TextSpan,
    },
    Continue {
        span: TextSpan,
    },
    If {
        condition: &'a Expression<'a>,
        then_statement: &'a Statement<'a>,
        else_statement: Option<&'a Statement<'a>>,
        span: TextSpan,
    },
    While {
        condition: &'a Expression<'a>,
        body: &'a Statement<'a>,
        span: TextSpan,
    },
    DoWhile {
        body: &'a Statement<'a>,
        condition: &'a Expression<'a>,
        span: TextSpan,
    },
    For {
        initializer: Option<VariableDeclarationList<'a>>,
        condition: Option<&'a Expression<'a>>,
        step: Option<&'a Expression<'a>>,
        body: &'a Statement<'a>,
        span: TextSpan,
    },
}

impl<'a> Statement<'a> {
    pub fn span(&self) -> TextSpan {
        match self {
            Statement::Block(block) => block.span,
            Statement::VariableDeclaration(list) => list.span,
            Statement::Expression { span, .. }
            | Statement::Wait { span, .. }
            | Statement::WaitNotification { span, .. }
            | Statement::Notify { span, .. }
            | Statement::Return { span, .. }
            | Statement::Break { span }
            | Statement::Continue { span }
            | Statement::If { span, .. }
            | Statement::While { span, .. }
            | Statement::DoWhile { span, .. }
            | Statement::For { span, .. } => *span,
        }
    }
}

// ============================================================================
// Expressions
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralValue<'a> {
    Int(i32),
    Bool(bool),
    String(&'a str),
}

#[derive(Debug, Clone, Copy)]
pub enum Expression<'a> {
    Literal {
        value: LiteralValue<'a>,
        span: TextSpan,
    },
    /// `[]`, the default value of the declared type.
    DefaultInitializer {
        span: TextSpan,
    },
    Name(Identifier<'a>),
    /// `bundle.field`
    FieldAccess {
        target: Identifier<'a>,
        field: Identifier<'a>,
        span: TextSpan,
    },
    /// `array[i, j]`
    ArrayAccess {
        target: Identifier<'a>,
        indices: &'a [Expression<'a>],
        span: TextSpan,
    },
    Parenthesized {
        inner: &'a Expression<'a>,
        span: TextSpan,
    },
    Unary {
        operator: Operator,
        operand: &'a Expression<'a>,
        span: TextSpan,
    },
    Binary {
        left: &'a Expression<'a>,
        operator: Operator,
        right: &'a Expression<'a>,
        span: TextSpan,
    },
    /// `target = value` or a compound form such as `target += value`.
    Assignment {
        target: &'a Expression<'a>,
        operator: Operator,
        value: &'a Expression<'a>,
        span: TextSpan,
    },
    Call {
        is_async: bool,
        namespace: Option<Identifier<'a>>,
        name: Identifier<'a>,
        arguments: &'a [Expression<'a>],
        span: TextSpan,
    },
}

impl<'a> Expression<'a> {
    pub fn span(&self) -> TextSpan {
        match self {
            Expression::Name(ident) => ident.span,
            Expression::Literal { span, .. }
            | Expression::DefaultInitializer { span }
            | Expression::FieldAccess { span, .. }
            | Expression::ArrayAccess { span, .. }
            | Expression::Parenthesized { span, .. }
            | Expression::Unary { span, .. }
            | Expression::Binary { span, .. }
            | Expression::Assignment { span, .. }
            | Expression::Call { span, .. } => *span,
        }
    }
}
