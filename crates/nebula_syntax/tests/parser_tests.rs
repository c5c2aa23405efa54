//! Parser integration tests.
//!
//! Verifies that the parser builds the expected syntax tree from Nebula
//! source and reports structural problems.

use bumpalo::Bump;
use nebula_core::SourceText;
use nebula_diagnostics::{messages, Report};
use nebula_syntax::ast::*;
use nebula_syntax::{parse_compilation_unit, SyntaxKind};
use std::rc::Rc;

/// Helper: parse `text` as `file` and hand the unit to `check`.
fn with_unit(file: &str, text: &str, check: impl FnOnce(&CompilationUnit<'_>, &Report)) {
    let arena = Bump::new();
    let source = Rc::new(SourceText::new(file, text));
    let (unit, report) = parse_compilation_unit(&arena, source);
    check(&unit, &report);
}

/// Helper: parse the statements of a single `void` function body.
fn with_body(body: &str, check: impl FnOnce(&[Statement<'_>], &Report)) {
    let text = format!("namespace \"test\";\nfunc void f() {{\n{}\n}}", body);
    with_unit("test.nebula", &text, |unit, report| {
        assert_eq!(unit.functions.len(), 1);
        check(unit.functions[0].body.statements, report);
    });
}

// ============================================================================
// Global statements
// ============================================================================

#[test]
fn test_parse_full_unit() {
    let text = r#"
namespace "game";
import "utils";
native int random(int max);
bundle Point { int x; int y; }
func int main() { return 0; }
"#;
    with_unit("game.nebula", text, |unit, report| {
        assert!(report.is_empty(), "{:?}", report);
        assert_eq!(unit.namespace_name(), "game");
        assert_eq!(unit.imports.len(), 1);
        assert_eq!(unit.imports[0].name, "utils");
        assert_eq!(unit.native_functions.len(), 1);
        assert_eq!(unit.native_functions[0].parameters.len(), 1);
        assert_eq!(unit.bundles.len(), 1);
        assert_eq!(unit.bundles[0].name.text, "Point");
        assert_eq!(unit.bundles[0].fields.len(), 2);
        assert_eq!(unit.bundles[0].fields[1].name.text, "y");
        assert_eq!(unit.functions.len(), 1);
        assert_eq!(unit.functions[0].return_type.name.text, "int");
    });
}

#[test]
fn test_missing_namespace_uses_file_stem() {
    with_unit("utils.nebula", "func void f() { }", |unit, report| {
        assert_eq!(unit.namespace_name(), "utils");
        assert_eq!(report.count(&messages::NAMESPACE_NOT_SET), 1);
        assert!(!report.has_errors());
    });
}

#[test]
fn test_namespace_must_be_first() {
    let text = "func void f() { }\nnamespace \"late\";";
    with_unit("a.nebula", text, |unit, report| {
        assert_eq!(report.count(&messages::NAMESPACE_MUST_BE_FIRST), 1);
        assert!(unit.namespace.is_none());
    });
}

#[test]
fn test_namespace_already_set() {
    let text = "namespace \"a\";\nnamespace \"b\";";
    with_unit("a.nebula", text, |unit, report| {
        assert_eq!(report.count(&messages::NAMESPACE_ALREADY_SET), 1);
        assert_eq!(unit.namespace_name(), "a");
    });
}

#[test]
fn test_unexpected_global_statement() {
    with_unit("a.nebula", "namespace \"a\";\n42 func void f() { }", |unit, report| {
        assert_eq!(report.count(&messages::UNEXPECTED_GLOBAL_STATEMENT), 1);
        assert_eq!(unit.functions.len(), 1);
    });
}

#[test]
fn test_function_attributes() {
    with_unit("a.nebula", "namespace \"a\";\nfunc void start() autoexec { }", |unit, report| {
        assert!(report.is_empty());
        let attributes = unit.functions[0].attributes;
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].text, "autoexec");
    });
}

#[test]
fn test_missing_semicolon_is_reported_once() {
    with_body("int x = 1", |statements, report| {
        assert_eq!(statements.len(), 1);
        assert_eq!(report.count(&messages::UNEXPECTED_TOKEN), 1);
    });
}

#[test]
fn test_garbage_body_terminates() {
    with_body(") ) ;", |_, report| {
        assert!(report.has_errors());
    });
}

// ============================================================================
// Statements
// ============================================================================

#[test]
fn test_variable_declarations() {
    with_body("int[,] grid = [];\nother::Point p;\nconst int a = 1, b;", |statements, report| {
        assert!(report.is_empty(), "{:?}", report);
        assert_eq!(statements.len(), 3);

        let Statement::VariableDeclaration(grid) = &statements[0] else {
            panic!("expected declaration");
        };
        assert_eq!(grid.ty.rank, 2);
        assert!(matches!(
            grid.declarators[0].initializer,
            Some(Expression::DefaultInitializer { .. })
        ));

        let Statement::VariableDeclaration(point) = &statements[1] else {
            panic!("expected declaration");
        };
        assert_eq!(point.ty.namespace.map(|ns| ns.text), Some("other"));
        assert!(point.declarators[0].initializer.is_none());

        let Statement::VariableDeclaration(consts) = &statements[2] else {
            panic!("expected declaration");
        };
        assert!(consts.is_const);
        assert_eq!(consts.declarators.len(), 2);
    });
}

#[test]
fn test_notification_statements() {
    with_body("p waittill \"done\";\np notify \"done\";\nwait 10;", |statements, report| {
        assert!(report.is_empty());
        assert!(matches!(statements[0], Statement::WaitNotification { .. }));
        assert!(matches!(statements[1], Statement::Notify { .. }));
        assert!(matches!(statements[2], Statement::Wait { .. }));
    });
}

#[test]
fn test_for_statement_parts() {
    with_body("for (int i = 0; i < 10; i += 1) { }\nfor (;;) { }", |statements, report| {
        assert!(report.is_empty(), "{:?}", report);
        let Statement::For { initializer, condition, step, .. } = &statements[0] else {
            panic!("expected for");
        };
        assert!(initializer.is_some());
        assert!(condition.is_some());
        assert!(step.is_some());

        let Statement::For { initializer, condition, step, .. } = &statements[1] else {
            panic!("expected for");
        };
        assert!(initializer.is_none());
        assert!(condition.is_none());
        assert!(step.is_none());
    });
}

#[test]
fn test_loops_and_branches() {
    let body = "while (true) { break; }\ndo { continue; } while (false);\nif (true) return; else { }";
    with_body(body, |statements, report| {
        assert!(report.is_empty(), "{:?}", report);
        assert!(matches!(statements[0], Statement::While { .. }));
        assert!(matches!(statements[1], Statement::DoWhile { .. }));
        let Statement::If { else_statement, .. } = &statements[2] else {
            panic!("expected if");
        };
        assert!(else_statement.is_some());
    });
}

// ============================================================================
// Expressions
// ============================================================================

fn expression_of<'a>(statement: &Statement<'a>) -> &'a Expression<'a> {
    match statement {
        Statement::Expression { expression, .. } => *expression,
        other => panic!("expected expression statement, found {:?}", other),
    }
}

#[test]
fn test_binary_precedence() {
    with_body("x = 1 + 2 * 3;", |statements, _| {
        let Expression::Assignment { value, .. } = expression_of(&statements[0]) else {
            panic!("expected assignment");
        };
        let Expression::Binary { operator, right, .. } = value else {
            panic!("expected binary");
        };
        assert_eq!(operator.kind, SyntaxKind::Plus);
        assert!(matches!(
            right,
            Expression::Binary { operator: Operator { kind: SyntaxKind::Star, .. }, .. }
        ));
    });
}

#[test]
fn test_unary_binds_tighter_than_binary() {
    with_body("x = -a + b;", |statements, _| {
        let Expression::Assignment { value, .. } = expression_of(&statements[0]) else {
            panic!("expected assignment");
        };
        let Expression::Binary { left, .. } = value else {
            panic!("expected binary");
        };
        assert!(matches!(left, Expression::Unary { .. }));
    });
}

#[test]
fn test_field_and_array_assignment() {
    with_body("p.x = 3;\na[1, 2] += 4;", |statements, report| {
        assert!(report.is_empty(), "{:?}", report);
        let Expression::Assignment { target, .. } = expression_of(&statements[0]) else {
            panic!("expected assignment");
        };
        assert!(matches!(target, Expression::FieldAccess { .. }));

        let Expression::Assignment { target, operator, .. } = expression_of(&statements[1]) else {
            panic!("expected assignment");
        };
        assert_eq!(operator.kind, SyntaxKind::PlusEquals);
        let Expression::ArrayAccess { indices, .. } = target else {
            panic!("expected array access");
        };
        assert_eq!(indices.len(), 2);
    });
}

#[test]
fn test_calls() {
    with_body("async other::run(1, \"a\");\nlocal();", |statements, report| {
        assert!(report.is_empty(), "{:?}", report);
        let Expression::Call { is_async, namespace, name, arguments, .. } =
            expression_of(&statements[0])
        else {
            panic!("expected call");
        };
        assert!(*is_async);
        assert_eq!(namespace.map(|ns| ns.text), Some("other"));
        assert_eq!(name.text, "run");
        assert_eq!(arguments.len(), 2);

        let Expression::Call { is_async, namespace, arguments, .. } = expression_of(&statements[1])
        else {
            panic!("expected call");
        };
        assert!(!*is_async);
        assert!(namespace.is_none());
        assert!(arguments.is_empty());
    });
}
