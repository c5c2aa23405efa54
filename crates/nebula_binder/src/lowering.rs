//! Lowering of structured statements.
//!
//! Loops become labels and gotos, blocks and declaration collections are
//! flattened, and compound assignments become plain assignments of a binary
//! expression. `if` stays structured; its branches are lowered in place.
//!
//! ```text
//! while (C) B       continue: if !C goto break; B; goto continue; break:
//! do B while (C)    top: B; continue: if C goto top; break:
//! for (I; C; S) B   I; top: if !C goto break; B; continue: S; goto top; break:
//! ```

use crate::bound::{BoundExpression, BoundStatement, BoundVariableDeclaration, LabelId};
use crate::symbols::ConstantValue;
use nebula_core::TextSpan;

/// Lower a function body. `next_label` continues the function's label
/// numbering so new labels never collide with the binder's.
pub fn lower(body: BoundStatement, next_label: u32) -> Vec<BoundStatement> {
    let mut lowerer = Lowerer { next_label };
    let mut statements = Vec::new();
    lowerer.lower_statement(body, &mut statements);
    statements
}

struct Lowerer {
    next_label: u32,
}

impl Lowerer {
    fn new_label(&mut self) -> LabelId {
        let label = LabelId(self.next_label);
        self.next_label += 1;
        label
    }

    fn lower_statement(&mut self, statement: BoundStatement, out: &mut Vec<BoundStatement>) {
        match statement {
            BoundStatement::Block { statements, .. } => {
                for statement in statements {
                    self.lower_statement(statement, out);
                }
            }
            BoundStatement::VariableDeclaration(declaration) => {
                out.push(BoundStatement::VariableDeclaration(self.lower_declaration(declaration)));
            }
            BoundStatement::VariableDeclarationCollection { declarations, .. } => {
                for declaration in declarations {
                    out.push(BoundStatement::VariableDeclaration(self.lower_declaration(declaration)));
                }
            }
            BoundStatement::Expression { expression, span } => {
                out.push(BoundStatement::Expression {
                    expression: self.lower_expression(expression),
                    span,
                });
            }
            BoundStatement::Wait { time, span } => {
                out.push(BoundStatement::Wait {
                    time: self.lower_expression(time),
                    span,
                });
            }
            BoundStatement::WaitNotification { target, channel, span } => {
                out.push(BoundStatement::WaitNotification {
                    target: self.lower_expression(target),
                    channel: self.lower_expression(channel),
                    span,
                });
            }
            BoundStatement::Notify { target, channel, span } => {
                out.push(BoundStatement::Notify {
                    target: self.lower_expression(target),
                    channel: self.lower_expression(channel),
                    span,
                });
            }
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
                span,
            } => {
                let then_statement = Box::new(self.lower_branch(*then_statement));
                let else_statement = else_statement.map(|s| Box::new(self.lower_branch(*s)));
                out.push(BoundStatement::If {
                    condition: self.lower_expression(condition),
                    then_statement,
                    else_statement,
                    span,
                });
            }
            BoundStatement::While {
                condition,
                body,
                break_label,
                continue_label,
                ..
            } => {
                out.push(BoundStatement::Label { label: continue_label });
                self.push_conditional_goto(break_label, condition, false, out);
                self.lower_statement(*body, out);
                out.push(BoundStatement::Goto { label: continue_label, span: None });
                out.push(BoundStatement::Label { label: break_label });
            }
            BoundStatement::DoWhile {
                body,
                condition,
                break_label,
                continue_label,
                ..
            } => {
                let top = self.new_label();
                out.push(BoundStatement::Label { label: top });
                self.lower_statement(*body, out);
                out.push(BoundStatement::Label { label: continue_label });
                self.push_conditional_goto(top, condition, true, out);
                out.push(BoundStatement::Label { label: break_label });
            }
            BoundStatement::For {
                initializer,
                condition,
                step,
                body,
                break_label,
                continue_label,
                ..
            } => {
                if let Some(initializer) = initializer {
                    self.lower_statement(*initializer, out);
                }
                let top = self.new_label();
                out.push(BoundStatement::Label { label: top });
                if let Some(condition) = condition {
                    self.push_conditional_goto(break_label, condition, false, out);
                }
                self.lower_statement(*body, out);
                out.push(BoundStatement::Label { label: continue_label });
                if let Some(step) = step {
                    let span = step.span();
                    out.push(BoundStatement::Expression {
                        expression: self.lower_expression(step),
                        span,
                    });
                }
                out.push(BoundStatement::Goto { label: top, span: None });
                out.push(BoundStatement::Label { label: break_label });
            }
            BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
                ..
            } => self.push_conditional_goto(label, condition, jump_if_true, out),
            BoundStatement::Return { value, span } => {
                out.push(BoundStatement::Return {
                    value: value.map(|v| self.lower_expression(v)),
                    span,
                });
            }
            statement @ (BoundStatement::Goto { .. }
            | BoundStatement::Label { .. }
            | BoundStatement::Nop { .. }) => out.push(statement),
        }
    }

    /// Lower an `if` branch into a single block.
    fn lower_branch(&mut self, statement: BoundStatement) -> BoundStatement {
        let span = statement.span().unwrap_or_else(|| TextSpan::empty(0));
        let mut statements = Vec::new();
        self.lower_statement(statement, &mut statements);
        BoundStatement::Block { statements, span }
    }

    /// Push a conditional jump, or a plain/no jump when the condition is
    /// constant.
    fn push_conditional_goto(
        &mut self,
        label: LabelId,
        condition: BoundExpression,
        jump_if_true: bool,
        out: &mut Vec<BoundStatement>,
    ) {
        let span = condition.span();
        let condition = self.lower_expression(condition);
        match condition.constant_value() {
            Some(ConstantValue::Bool(value)) if *value == jump_if_true => {
                out.push(BoundStatement::Goto { label, span: Some(span) });
            }
            Some(ConstantValue::Bool(_)) => {}
            _ => out.push(BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
                span,
            }),
        }
    }

    fn lower_declaration(&mut self, declaration: BoundVariableDeclaration) -> BoundVariableDeclaration {
        BoundVariableDeclaration {
            initializer: self.lower_expression(declaration.initializer),
            ..declaration
        }
    }

    fn lower_expression(&mut self, expression: BoundExpression) -> BoundExpression {
        match expression {
            BoundExpression::CompoundAssignment {
                variable,
                operator,
                value,
                span,
            } => {
                let left = BoundExpression::Variable {
                    variable: variable.clone(),
                    span,
                };
                let right = self.lower_expression(*value);
                BoundExpression::Assignment {
                    variable,
                    value: Box::new(BoundExpression::Binary {
                        left: Box::new(left),
                        operator,
                        right: Box::new(right),
                        constant: None,
                        span,
                    }),
                    span,
                }
            }
            BoundExpression::Unary {
                operator,
                operand,
                constant,
                span,
            } => BoundExpression::Unary {
                operator,
                operand: Box::new(self.lower_expression(*operand)),
                constant,
                span,
            },
            BoundExpression::Binary {
                left,
                operator,
                right,
                constant,
                span,
            } => BoundExpression::Binary {
                left: Box::new(self.lower_expression(*left)),
                operator,
                right: Box::new(self.lower_expression(*right)),
                constant,
                span,
            },
            BoundExpression::Assignment { variable, value, span } => BoundExpression::Assignment {
                variable,
                value: Box::new(self.lower_expression(*value)),
                span,
            },
            BoundExpression::FieldAssignment {
                variable,
                bundle,
                field,
                value,
                span,
            } => BoundExpression::FieldAssignment {
                variable,
                bundle,
                field,
                value: Box::new(self.lower_expression(*value)),
                span,
            },
            BoundExpression::ArrayAccess {
                variable,
                indices,
                element_type,
                span,
            } => BoundExpression::ArrayAccess {
                variable,
                indices: self.lower_expressions(indices),
                element_type,
                span,
            },
            BoundExpression::ArrayAssignment {
                variable,
                indices,
                value,
                span,
            } => BoundExpression::ArrayAssignment {
                variable,
                indices: self.lower_expressions(indices),
                value: Box::new(self.lower_expression(*value)),
                span,
            },
            BoundExpression::Call {
                function,
                namespace,
                arguments,
                is_async,
                span,
            } => BoundExpression::Call {
                function,
                namespace,
                arguments: self.lower_expressions(arguments),
                is_async,
                span,
            },
            BoundExpression::Conversion { ty, expression, span } => BoundExpression::Conversion {
                ty,
                expression: Box::new(self.lower_expression(*expression)),
                span,
            },
            expression @ (BoundExpression::Error { .. }
            | BoundExpression::Literal { .. }
            | BoundExpression::Variable { .. }
            | BoundExpression::FieldAccess { .. }
            | BoundExpression::ObjectAllocation { .. }) => expression,
        }
    }

    fn lower_expressions(&mut self, expressions: Vec<BoundExpression>) -> Vec<BoundExpression> {
        expressions
            .into_iter()
            .map(|e| self.lower_expression(e))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::VariableRef;
    use crate::operators::BoundBinaryOperator;
    use crate::symbols::{TypeSymbol, VariableId, VariableSymbol};
    use nebula_syntax::SyntaxKind;
    use std::rc::Rc;

    fn span() -> TextSpan {
        TextSpan::new(0, 1)
    }

    fn local(name: &str) -> VariableRef {
        VariableRef::Local(Rc::new(VariableSymbol {
            id: VariableId(0),
            name: name.into(),
            ty: TypeSymbol::Int,
            is_readonly: false,
            constant: None,
        }))
    }

    #[test]
    fn test_compound_assignment_becomes_binary() {
        let operator = BoundBinaryOperator::bind(SyntaxKind::Plus, &TypeSymbol::Int, &TypeSymbol::Int).unwrap();
        let statement = BoundStatement::Expression {
            expression: BoundExpression::CompoundAssignment {
                variable: local("a"),
                operator,
                value: Box::new(BoundExpression::Literal { value: ConstantValue::Int(2), span: span() }),
                span: span(),
            },
            span: span(),
        };
        let lowered = lower(statement, 0);
        let [BoundStatement::Expression { expression, .. }] = lowered.as_slice() else {
            panic!("expected one expression statement, got {lowered:?}");
        };
        let BoundExpression::Assignment { value, .. } = expression else {
            panic!("expected assignment");
        };
        assert!(matches!(**value, BoundExpression::Binary { .. }));
    }

    #[test]
    fn test_constant_true_while_drops_exit_jump() {
        let statement = BoundStatement::While {
            condition: BoundExpression::Literal { value: ConstantValue::Bool(true), span: span() },
            body: Box::new(BoundStatement::Block { statements: vec![], span: span() }),
            break_label: LabelId(0),
            continue_label: LabelId(1),
            span: span(),
        };
        let lowered = lower(statement, 2);
        assert!(!lowered
            .iter()
            .any(|s| matches!(s, BoundStatement::ConditionalGoto { .. })));
        assert_eq!(lowered.len(), 3);
    }

    #[test]
    fn test_do_while_allocates_top_label() {
        let statement = BoundStatement::DoWhile {
            body: Box::new(BoundStatement::Block { statements: vec![], span: span() }),
            condition: BoundExpression::Variable { variable: local("c"), span: span() },
            break_label: LabelId(0),
            continue_label: LabelId(1),
            span: span(),
        };
        let lowered = lower(statement, 2);
        assert!(matches!(lowered[0], BoundStatement::Label { label: LabelId(2) }));
        assert!(matches!(
            lowered[2],
            BoundStatement::ConditionalGoto { label: LabelId(2), jump_if_true: true, .. }
        ));
    }
}
