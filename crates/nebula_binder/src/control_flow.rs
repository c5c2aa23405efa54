//! Reachability over lowered statement lists.
//!
//! The statements are flattened into a sequence of flow operations; `if`
//! statements contribute synthetic targets for their branches. A worklist
//! walk from the first operation then decides whether control can fall off
//! the end of the function.

use crate::bound::{BoundStatement, LabelId};
use crate::symbols::ConstantValue;
use rustc_hash::{FxHashMap, FxHashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Target {
    Label(LabelId),
    Synthetic(u32),
}

#[derive(Debug, Clone, Copy)]
enum Flow {
    Step,
    Return,
    Jump(Target),
    Branch(Target),
    Mark(Target),
}

struct Linearizer {
    ops: Vec<Flow>,
    next_synthetic: u32,
}

impl Linearizer {
    fn synthetic(&mut self) -> Target {
        let target = Target::Synthetic(self.next_synthetic);
        self.next_synthetic += 1;
        target
    }

    fn statements(&mut self, statements: &[BoundStatement]) {
        for statement in statements {
            self.statement(statement);
        }
    }

    fn statement(&mut self, statement: &BoundStatement) {
        match statement {
            BoundStatement::Block { statements, .. } => self.statements(statements),
            BoundStatement::Return { .. } => self.ops.push(Flow::Return),
            BoundStatement::Goto { label, .. } => self.ops.push(Flow::Jump(Target::Label(*label))),
            BoundStatement::Label { label } => self.ops.push(Flow::Mark(Target::Label(*label))),
            BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
                ..
            } => match condition.constant_value() {
                Some(ConstantValue::Bool(value)) if value == jump_if_true => {
                    self.ops.push(Flow::Jump(Target::Label(*label)));
                }
                Some(ConstantValue::Bool(_)) => self.ops.push(Flow::Step),
                _ => self.ops.push(Flow::Branch(Target::Label(*label))),
            },
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
                ..
            } => {
                let else_target = self.synthetic();
                let end_target = self.synthetic();
                match condition.constant_value() {
                    Some(ConstantValue::Bool(true)) => {}
                    Some(ConstantValue::Bool(false)) => self.ops.push(Flow::Jump(else_target)),
                    _ => self.ops.push(Flow::Branch(else_target)),
                }
                self.statement(then_statement);
                self.ops.push(Flow::Jump(end_target));
                self.ops.push(Flow::Mark(else_target));
                if let Some(else_statement) = else_statement {
                    self.statement(else_statement);
                }
                self.ops.push(Flow::Mark(end_target));
            }
            _ => self.ops.push(Flow::Step),
        }
    }
}

/// Whether control can reach the end of `statements` without returning.
pub fn end_is_reachable(statements: &[BoundStatement]) -> bool {
    let mut linearizer = Linearizer {
        ops: Vec::new(),
        next_synthetic: 0,
    };
    linearizer.statements(statements);
    let ops = linearizer.ops;

    let marks: FxHashMap<Target, usize> = ops
        .iter()
        .enumerate()
        .filter_map(|(index, op)| match op {
            Flow::Mark(target) => Some((*target, index)),
            _ => None,
        })
        .collect();
    let resolve = |target: &Target, fallthrough: usize| marks.get(target).copied().unwrap_or(fallthrough);

    let mut visited = FxHashSet::default();
    let mut worklist = vec![0usize];
    while let Some(index) = worklist.pop() {
        if !visited.insert(index) {
            continue;
        }
        let Some(op) = ops.get(index) else {
            return true;
        };
        match op {
            Flow::Step | Flow::Mark(_) => worklist.push(index + 1),
            Flow::Return => {}
            Flow::Jump(target) => worklist.push(resolve(target, index + 1)),
            Flow::Branch(target) => {
                worklist.push(index + 1);
                worklist.push(resolve(target, index + 1));
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bound::BoundExpression;
    use nebula_core::TextSpan;

    fn span() -> TextSpan {
        TextSpan::new(0, 1)
    }

    fn ret() -> BoundStatement {
        BoundStatement::Return {
            value: Some(BoundExpression::Literal { value: ConstantValue::Int(1), span: span() }),
            span: span(),
        }
    }

    fn unknown_condition() -> BoundExpression {
        BoundExpression::Error { span: span() }
    }

    #[test]
    fn test_empty_body_reaches_end() {
        assert!(end_is_reachable(&[]));
        assert!(!end_is_reachable(&[ret()]));
    }

    #[test]
    fn test_if_without_else_falls_through() {
        let body = [BoundStatement::If {
            condition: unknown_condition(),
            then_statement: Box::new(ret()),
            else_statement: None,
            span: span(),
        }];
        assert!(end_is_reachable(&body));
    }

    #[test]
    fn test_if_else_both_return() {
        let body = [BoundStatement::If {
            condition: unknown_condition(),
            then_statement: Box::new(ret()),
            else_statement: Some(Box::new(ret())),
            span: span(),
        }];
        assert!(!end_is_reachable(&body));
    }

    #[test]
    fn test_infinite_loop_never_reaches_end() {
        let body = [
            BoundStatement::Label { label: LabelId(0) },
            BoundStatement::Nop { span: span() },
            BoundStatement::Goto { label: LabelId(0), span: None },
            BoundStatement::Label { label: LabelId(1) },
        ];
        assert!(!end_is_reachable(&body));
    }

    #[test]
    fn test_conditional_exit_reaches_end() {
        let body = [
            BoundStatement::Label { label: LabelId(0) },
            BoundStatement::ConditionalGoto {
                label: LabelId(1),
                condition: unknown_condition(),
                jump_if_true: false,
                span: span(),
            },
            BoundStatement::Goto { label: LabelId(0), span: None },
            BoundStatement::Label { label: LabelId(1) },
        ];
        assert!(end_is_reachable(&body));
    }
}
