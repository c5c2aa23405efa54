//! The Nebula parser implementation.
//!
//! A recursive descent parser over the scanned token list. Missing tokens
//! are synthesized with an "unexpected token" diagnostic so that parsing
//! always produces a complete tree.

use crate::ast::*;
use crate::scanner::Scanner;
use crate::token::{SyntaxKind, Token, TokenValue};
use bumpalo::collections::Vec as BumpVec;
use bumpalo::Bump;
use nebula_core::{SourceText, TextSpan};
use nebula_diagnostics::{messages, Report};
use std::rc::Rc;

/// Parse one source file into a compilation unit.
///
/// Scanner and parser diagnostics are returned together, in source order.
pub fn parse_compilation_unit<'a>(
    arena: &'a Bump,
    source: Rc<SourceText>,
) -> (CompilationUnit<'a>, Report) {
    let parser = Parser::new(arena, &source);
    let (globals, report) = parser.parse_global_statements();
    let unit = CompilationUnit {
        source,
        namespace: globals.namespace,
        imports: globals.imports,
        functions: globals.functions,
        native_functions: globals.native_functions,
        bundles: globals.bundles,
    };
    (unit, report)
}

/// Top-level declarations collected from one file.
struct GlobalStatements<'a> {
    namespace: Option<NamespaceDeclaration<'a>>,
    imports: &'a [ImportDeclaration<'a>],
    functions: &'a [FunctionDeclaration<'a>],
    native_functions: &'a [NativeFunctionDeclaration<'a>],
    bundles: &'a [BundleDeclaration<'a>],
}

pub struct Parser<'a, 's> {
    arena: &'a Bump,
    source: &'s SourceText,
    tokens: Vec<Token<'a>>,
    position: usize,
    report: Report,
}

impl<'a, 's> Parser<'a, 's> {
    pub fn new(arena: &'a Bump, source: &'s SourceText) -> Self {
        let (tokens, report) = Scanner::new(arena, source).scan_all();
        Self {
            arena,
            source,
            tokens,
            position: 0,
            report,
        }
    }

    // ========================================================================
    // Token management
    // ========================================================================

    #[inline]
    fn current(&self) -> Token<'a> {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> Token<'a> {
        let last = self.tokens.len() - 1;
        self.tokens[(self.position + offset).min(last)]
    }

    fn advance(&mut self) -> Token<'a> {
        let token = self.current();
        if self.position < self.tokens.len() - 1 {
            self.position += 1;
        }
        token
    }

    fn match_token(&mut self, kind: SyntaxKind) -> Token<'a> {
        let current = self.current();
        if current.kind == kind {
            return self.advance();
        }
        let found = if current.text.is_empty() {
            current.kind.to_string()
        } else {
            current.text.to_string()
        };
        let expected = kind.to_string();
        self.report.report(
            self.source,
            current.span,
            &messages::UNEXPECTED_TOKEN,
            &[&found, &expected],
        );
        Token::missing(kind, current.span.start)
    }

    fn previous_end(&self) -> u32 {
        if self.position == 0 {
            return 0;
        }
        self.tokens[self.position - 1].span.end()
    }

    fn span_from(&self, start: u32) -> TextSpan {
        TextSpan::from_bounds(start, self.previous_end().max(start))
    }

    fn alloc<T>(&self, value: T) -> &'a T {
        self.arena.alloc(value)
    }

    fn parse_expression_ref(&mut self) -> &'a Expression<'a> {
        let expression = self.parse_expression();
        self.alloc(expression)
    }

    fn parse_name_expression_ref(&mut self) -> &'a Expression<'a> {
        let expression = self.parse_name_expression();
        self.alloc(expression)
    }

    fn parse_binary_expression_ref(&mut self, precedence: u8) -> &'a Expression<'a> {
        let expression = self.parse_binary_expression(precedence);
        self.alloc(expression)
    }

    fn parse_statement_ref(&mut self) -> &'a Statement<'a> {
        let statement = self.parse_statement();
        self.alloc(statement)
    }

    fn identifier(token: Token<'a>) -> Identifier<'a> {
        Identifier {
            text: token.text,
            span: token.span,
        }
    }

    fn string_value(token: Token<'a>) -> &'a str {
        match token.value {
            TokenValue::Str(value) => value,
            _ => token.text,
        }
    }

    // ========================================================================
    // Global statements
    // ========================================================================

    fn parse_global_statements(mut self) -> (GlobalStatements<'a>, Report) {
        let mut namespace: Option<NamespaceDeclaration<'a>> = None;
        let mut imports = BumpVec::new_in(self.arena);
        let mut functions = BumpVec::new_in(self.arena);
        let mut native_functions = BumpVec::new_in(self.arena);
        let mut bundles = BumpVec::new_in(self.arena);

        while self.current().kind != SyntaxKind::EndOfFile {
            let start = self.position;
            match self.current().kind {
                SyntaxKind::NamespaceKeyword => {
                    let decl = self.parse_namespace();
                    if let Some(existing) = namespace {
                        self.report.report(
                            self.source,
                            decl.name_span,
                            &messages::NAMESPACE_ALREADY_SET,
                            &[existing.name],
                        );
                    } else if !functions.is_empty()
                        || !native_functions.is_empty()
                        || !bundles.is_empty()
                    {
                        self.report.report(
                            self.source,
                            decl.name_span,
                            &messages::NAMESPACE_MUST_BE_FIRST,
                            &[],
                        );
                    } else {
                        namespace = Some(decl);
                    }
                }
                SyntaxKind::ImportKeyword => imports.push(self.parse_import()),
                SyntaxKind::FuncKeyword => functions.push(self.parse_function()),
                SyntaxKind::NativeKeyword => native_functions.push(self.parse_native_function()),
                SyntaxKind::BundleKeyword => bundles.push(self.parse_bundle()),
                _ => {
                    let token = self.advance();
                    let text = if token.text.is_empty() {
                        token.kind.to_string()
                    } else {
                        token.text.to_string()
                    };
                    self.report.report(
                        self.source,
                        token.span,
                        &messages::UNEXPECTED_GLOBAL_STATEMENT,
                        &[&text],
                    );
                }
            }

            // Don't get stuck on a token nothing could consume
            if self.position == start {
                self.advance();
            }
        }

        if namespace.is_none() {
            let stem = self.source.file_stem().to_string();
            self.report.report(
                self.source,
                TextSpan::empty(0),
                &messages::NAMESPACE_NOT_SET,
                &[&stem],
            );
        }

        let globals = GlobalStatements {
            namespace,
            imports: imports.into_bump_slice(),
            functions: functions.into_bump_slice(),
            native_functions: native_functions.into_bump_slice(),
            bundles: bundles.into_bump_slice(),
        };
        (globals, self.report)
    }

    fn parse_namespace(&mut self) -> NamespaceDeclaration<'a> {
        let keyword = self.match_token(SyntaxKind::NamespaceKeyword);
        let name = self.match_token(SyntaxKind::StringLiteral);
        self.match_token(SyntaxKind::Semicolon);
        NamespaceDeclaration {
            name: Self::string_value(name),
            name_span: name.span,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_import(&mut self) -> ImportDeclaration<'a> {
        let keyword = self.match_token(SyntaxKind::ImportKeyword);
        let name = self.match_token(SyntaxKind::StringLiteral);
        self.match_token(SyntaxKind::Semicolon);
        ImportDeclaration {
            name: Self::string_value(name),
            name_span: name.span,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_bundle(&mut self) -> BundleDeclaration<'a> {
        let keyword = self.match_token(SyntaxKind::BundleKeyword);
        let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
        self.match_token(SyntaxKind::OpenBrace);

        let mut fields = BumpVec::new_in(self.arena);
        while !matches!(
            self.current().kind,
            SyntaxKind::CloseBrace | SyntaxKind::EndOfFile
        ) {
            let start = self.position;
            let ty = self.parse_type_clause();
            let field_name = Self::identifier(self.match_token(SyntaxKind::Identifier));
            self.match_token(SyntaxKind::Semicolon);
            fields.push(FieldDeclaration {
                ty,
                name: field_name,
                span: self.span_from(ty.span.start),
            });

            if self.position == start {
                self.advance();
            }
        }

        self.match_token(SyntaxKind::CloseBrace);
        BundleDeclaration {
            name,
            fields: fields.into_bump_slice(),
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_function(&mut self) -> FunctionDeclaration<'a> {
        let keyword = self.match_token(SyntaxKind::FuncKeyword);
        let return_type = self.parse_type_clause();
        let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
        self.match_token(SyntaxKind::OpenParen);
        let parameters = self.parse_parameter_list();
        self.match_token(SyntaxKind::CloseParen);
        let attributes = self.parse_attribute_list();
        let body = self.parse_block();
        FunctionDeclaration {
            return_type,
            name,
            parameters,
            attributes,
            body,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_native_function(&mut self) -> NativeFunctionDeclaration<'a> {
        let keyword = self.match_token(SyntaxKind::NativeKeyword);
        let return_type = self.parse_type_clause();
        let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
        self.match_token(SyntaxKind::OpenParen);
        let parameters = self.parse_parameter_list();
        self.match_token(SyntaxKind::CloseParen);
        self.match_token(SyntaxKind::Semicolon);
        NativeFunctionDeclaration {
            return_type,
            name,
            parameters,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_type_clause(&mut self) -> TypeClause<'a> {
        let first = Self::identifier(self.match_token(SyntaxKind::Identifier));
        let (namespace, name) = if self.current().kind == SyntaxKind::ColonColon {
            self.advance();
            let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
            (Some(first), name)
        } else {
            (None, first)
        };

        let mut rank = 0;
        if self.current().kind == SyntaxKind::OpenBracket {
            self.advance();
            rank = 1;
            while self.current().kind == SyntaxKind::Comma {
                self.advance();
                rank += 1;
            }
            self.match_token(SyntaxKind::CloseBracket);
        }

        TypeClause {
            namespace,
            name,
            rank,
            span: self.span_from(first.span.start),
        }
    }

    fn parse_parameter_list(&mut self) -> &'a [Parameter<'a>] {
        let mut parameters = BumpVec::new_in(self.arena);
        while !matches!(
            self.current().kind,
            SyntaxKind::CloseParen | SyntaxKind::EndOfFile
        ) {
            let ty = self.parse_type_clause();
            let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
            parameters.push(Parameter {
                ty,
                name,
                span: self.span_from(ty.span.start),
            });

            if self.current().kind != SyntaxKind::Comma {
                break;
            }
            self.advance();
        }
        parameters.into_bump_slice()
    }

    fn parse_attribute_list(&mut self) -> &'a [Identifier<'a>] {
        let mut attributes = BumpVec::new_in(self.arena);
        while self.current().kind == SyntaxKind::Identifier {
            attributes.push(Self::identifier(self.advance()));
            if self.current().kind != SyntaxKind::Comma {
                break;
            }
            self.advance();
        }
        attributes.into_bump_slice()
    }

    // ========================================================================
    // Statements
    // ========================================================================

    fn parse_block(&mut self) -> BlockStatement<'a> {
        let open = self.match_token(SyntaxKind::OpenBrace);
        let mut statements = BumpVec::new_in(self.arena);
        while !matches!(
            self.current().kind,
            SyntaxKind::CloseBrace | SyntaxKind::EndOfFile
        ) {
            let start = self.position;
            statements.push(self.parse_statement());

            if self.position == start {
                self.advance();
            }
        }
        self.match_token(SyntaxKind::CloseBrace);
        BlockStatement {
            statements: statements.into_bump_slice(),
            span: self.span_from(open.span.start),
        }
    }

    fn parse_statement(&mut self) -> Statement<'a> {
        match self.current().kind {
            SyntaxKind::OpenBrace => Statement::Block(self.parse_block()),
            SyntaxKind::ConstKeyword => {
                Statement::VariableDeclaration(self.parse_variable_declarations())
            }
            SyntaxKind::WaitKeyword => self.parse_wait(),
            SyntaxKind::ReturnKeyword => self.parse_return(),
            SyntaxKind::BreakKeyword => {
                let keyword = self.advance();
                self.match_token(SyntaxKind::Semicolon);
                Statement::Break {
                    span: self.span_from(keyword.span.start),
                }
            }
            SyntaxKind::ContinueKeyword => {
                let keyword = self.advance();
                self.match_token(SyntaxKind::Semicolon);
                Statement::Continue {
                    span: self.span_from(keyword.span.start),
                }
            }
            SyntaxKind::IfKeyword => self.parse_if(),
            SyntaxKind::WhileKeyword => self.parse_while(),
            SyntaxKind::DoKeyword => self.parse_do_while(),
            SyntaxKind::ForKeyword => self.parse_for(),
            _ => {
                if self.is_variable_declaration_start() {
                    return Statement::VariableDeclaration(self.parse_variable_declarations());
                }

                if self.current().kind == SyntaxKind::Identifier {
                    match self.peek(1).kind {
                        SyntaxKind::WaitTillKeyword | SyntaxKind::NotifyKeyword => {
                            return self.parse_notification_statement();
                        }
                        _ => {}
                    }
                }

                let start = self.current().span.start;
                let expression = self.parse_expression_ref();
                self.match_token(SyntaxKind::Semicolon);
                Statement::Expression {
                    expression,
                    span: self.span_from(start),
                }
            }
        }
    }

    fn is_variable_declaration_start(&self) -> bool {
        if self.current().kind != SyntaxKind::Identifier {
            return false;
        }

        match self.peek(1).kind {
            SyntaxKind::Identifier => true,
            SyntaxKind::OpenBracket => matches!(
                self.peek(2).kind,
                SyntaxKind::Comma | SyntaxKind::CloseBracket
            ),
            // Type from another namespace, `ns::Type name`
            SyntaxKind::ColonColon => {
                self.peek(2).kind == SyntaxKind::Identifier
                    && self.peek(3).kind != SyntaxKind::OpenParen
            }
            _ => false,
        }
    }

    fn parse_variable_declarations(&mut self) -> VariableDeclarationList<'a> {
        let start = self.current().span.start;
        let is_const = if self.current().kind == SyntaxKind::ConstKeyword {
            self.advance();
            true
        } else {
            false
        };

        let ty = self.parse_type_clause();
        let mut declarators = BumpVec::new_in(self.arena);
        while !matches!(
            self.current().kind,
            SyntaxKind::Semicolon | SyntaxKind::EndOfFile
        ) {
            let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
            let initializer = if self.current().kind == SyntaxKind::Equals {
                self.advance();
                Some(self.parse_expression_ref())
            } else {
                None
            };
            declarators.push(VariableDeclarator {
                name,
                initializer,
                span: self.span_from(name.span.start),
            });

            if self.current().kind != SyntaxKind::Comma {
                break;
            }
            self.advance();
        }
        self.match_token(SyntaxKind::Semicolon);

        VariableDeclarationList {
            is_const,
            ty,
            declarators: declarators.into_bump_slice(),
            span: self.span_from(start),
        }
    }

    fn parse_wait(&mut self) -> Statement<'a> {
        let keyword = self.match_token(SyntaxKind::WaitKeyword);
        let time = self.parse_expression_ref();
        self.match_token(SyntaxKind::Semicolon);
        Statement::Wait {
            time,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_notification_statement(&mut self) -> Statement<'a> {
        let start = self.current().span.start;
        let target = self.parse_name_expression_ref();
        let keyword = self.advance();
        let channel = self.parse_expression_ref();
        self.match_token(SyntaxKind::Semicolon);
        let span = self.span_from(start);
        if keyword.kind == SyntaxKind::NotifyKeyword {
            Statement::Notify {
                target,
                channel,
                span,
            }
        } else {
            Statement::WaitNotification {
                target,
                channel,
                span,
            }
        }
    }

    fn parse_return(&mut self) -> Statement<'a> {
        let keyword = self.match_token(SyntaxKind::ReturnKeyword);
        let value = if self.current().kind != SyntaxKind::Semicolon {
            Some(self.parse_expression_ref())
        } else {
            None
        };
        self.match_token(SyntaxKind::Semicolon);
        Statement::Return {
            value,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_if(&mut self) -> Statement<'a> {
        let keyword = self.match_token(SyntaxKind::IfKeyword);
        self.match_token(SyntaxKind::OpenParen);
        let condition = self.parse_expression_ref();
        self.match_token(SyntaxKind::CloseParen);
        let then_statement = self.parse_statement_ref();
        let else_statement = if self.current().kind == SyntaxKind::ElseKeyword {
            self.advance();
            Some(self.parse_statement_ref())
        } else {
            None
        };
        Statement::If {
            condition,
            then_statement,
            else_statement,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_while(&mut self) -> Statement<'a> {
        let keyword = self.match_token(SyntaxKind::WhileKeyword);
        self.match_token(SyntaxKind::OpenParen);
        let condition = self.parse_expression_ref();
        self.match_token(SyntaxKind::CloseParen);
        let body = self.parse_statement_ref();
        Statement::While {
            condition,
            body,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_do_while(&mut self) -> Statement<'a> {
        let keyword = self.match_token(SyntaxKind::DoKeyword);
        let body = self.parse_statement_ref();
        self.match_token(SyntaxKind::WhileKeyword);
        self.match_token(SyntaxKind::OpenParen);
        let condition = self.parse_expression_ref();
        self.match_token(SyntaxKind::CloseParen);
        self.match_token(SyntaxKind::Semicolon);
        Statement::DoWhile {
            body,
            condition,
            span: self.span_from(keyword.span.start),
        }
    }

    fn parse_for(&mut self) -> Statement<'a> {
        let keyword = self.match_token(SyntaxKind::ForKeyword);
        self.match_token(SyntaxKind::OpenParen);

        let initializer = if self.current().kind == SyntaxKind::Semicolon {
            self.advance();
            None
        } else {
            Some(self.parse_variable_declarations())
        };

        let condition = if self.current().kind == SyntaxKind::Semicolon {
            None
        } else {
            Some(self.parse_expression_ref())
        };
        self.match_token(SyntaxKind::Semicolon);

        let step = if self.current().kind == SyntaxKind::CloseParen {
            None
        } else {
            Some(self.parse_expression_ref())
        };
        self.match_token(SyntaxKind::CloseParen);

        let body = self.parse_statement_ref();
        Statement::For {
            initializer,
            condition,
            step,
            body,
            span: self.span_from(keyword.span.start),
        }
    }

    // ========================================================================
    // Expressions
    // ========================================================================

    fn parse_expression(&mut self) -> Expression<'a> {
        if self.current().kind == SyntaxKind::Identifier
            && self.peek_after_name_expression().kind.is_assignment_operator()
        {
            let start = self.current().span.start;
            let target = self.parse_name_expression_ref();
            let op = self.advance();
            let value = self.parse_expression_ref();
            return Expression::Assignment {
                target,
                operator: Operator {
                    kind: op.kind,
                    span: op.span,
                },
                value,
                span: self.span_from(start),
            };
        }

        self.parse_binary_expression(0)
    }

    /// The token following `name`, `name.field` or `name[...]`.
    fn peek_after_name_expression(&self) -> Token<'a> {
        match self.peek(1).kind {
            SyntaxKind::Dot => self.peek(3),
            SyntaxKind::OpenBracket => {
                let mut offset = 2;
                let mut depth = 1;
                loop {
                    match self.peek(offset).kind {
                        SyntaxKind::OpenBracket => depth += 1,
                        SyntaxKind::CloseBracket => {
                            depth -= 1;
                            if depth == 0 {
                                return self.peek(offset + 1);
                            }
                        }
                        SyntaxKind::EndOfFile => return self.peek(offset),
                        _ => {}
                    }
                    offset += 1;
                }
            }
            _ => self.peek(1),
        }
    }

    fn parse_binary_expression(&mut self, parent_precedence: u8) -> Expression<'a> {
        let start = self.current().span.start;
        let unary_precedence = self.current().kind.unary_precedence();
        let mut left = if unary_precedence != 0 && unary_precedence >= parent_precedence {
            let op = self.advance();
            let operand = self.parse_binary_expression_ref(unary_precedence);
            Expression::Unary {
                operator: Operator {
                    kind: op.kind,
                    span: op.span,
                },
                operand,
                span: self.span_from(start),
            }
        } else {
            self.parse_primary_expression()
        };

        loop {
            let precedence = self.current().kind.binary_precedence();
            if precedence == 0 || precedence <= parent_precedence {
                break;
            }
            let op = self.advance();
            let right = self.parse_binary_expression_ref(precedence);
            left = Expression::Binary {
                left: self.alloc(left),
                operator: Operator {
                    kind: op.kind,
                    span: op.span,
                },
                right,
                span: self.span_from(start),
            };
        }

        left
    }

    fn parse_primary_expression(&mut self) -> Expression<'a> {
        let current = self.current();
        match current.kind {
            SyntaxKind::OpenParen => {
                self.advance();
                let inner = self.parse_expression_ref();
                self.match_token(SyntaxKind::CloseParen);
                Expression::Parenthesized {
                    inner,
                    span: self.span_from(current.span.start),
                }
            }
            SyntaxKind::TrueKeyword | SyntaxKind::FalseKeyword => {
                self.advance();
                Expression::Literal {
                    value: LiteralValue::Bool(current.kind == SyntaxKind::TrueKeyword),
                    span: current.span,
                }
            }
            SyntaxKind::NumberLiteral => {
                self.advance();
                let value = match current.value {
                    TokenValue::Int(v) => v,
                    _ => 0,
                };
                Expression::Literal {
                    value: LiteralValue::Int(value),
                    span: current.span,
                }
            }
            SyntaxKind::StringLiteral => {
                self.advance();
                Expression::Literal {
                    value: LiteralValue::String(Self::string_value(current)),
                    span: current.span,
                }
            }
            SyntaxKind::OpenBracket => {
                self.advance();
                self.match_token(SyntaxKind::CloseBracket);
                Expression::DefaultInitializer {
                    span: self.span_from(current.span.start),
                }
            }
            _ => self.parse_name_or_call(),
        }
    }

    fn parse_name_or_call(&mut self) -> Expression<'a> {
        let is_async = self.current().kind == SyntaxKind::AsyncKeyword;
        let offset = usize::from(is_async);

        let is_local_call = self.peek(offset).kind == SyntaxKind::Identifier
            && self.peek(offset + 1).kind == SyntaxKind::OpenParen;
        let is_external_call = self.peek(offset).kind == SyntaxKind::Identifier
            && self.peek(offset + 1).kind == SyntaxKind::ColonColon
            && self.peek(offset + 2).kind == SyntaxKind::Identifier
            && self.peek(offset + 3).kind == SyntaxKind::OpenParen;

        if !is_local_call && !is_external_call {
            return self.parse_name_expression();
        }

        let start = self.current().span.start;
        if is_async {
            self.advance();
        }
        let namespace = if is_external_call {
            let ns = Self::identifier(self.advance());
            self.advance();
            Some(ns)
        } else {
            None
        };
        let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
        self.match_token(SyntaxKind::OpenParen);
        let arguments = self.parse_arguments(SyntaxKind::CloseParen);
        self.match_token(SyntaxKind::CloseParen);

        Expression::Call {
            is_async,
            namespace,
            name,
            arguments,
            span: self.span_from(start),
        }
    }

    fn parse_arguments(&mut self, terminator: SyntaxKind) -> &'a [Expression<'a>] {
        let mut arguments = BumpVec::new_in(self.arena);
        while self.current().kind != terminator && self.current().kind != SyntaxKind::EndOfFile {
            arguments.push(self.parse_expression());
            if self.current().kind != SyntaxKind::Comma {
                break;
            }
            self.advance();
        }
        arguments.into_bump_slice()
    }

    fn parse_name_expression(&mut self) -> Expression<'a> {
        let name = Self::identifier(self.match_token(SyntaxKind::Identifier));
        match self.current().kind {
            SyntaxKind::Dot => {
                self.advance();
                let field = Self::identifier(self.match_token(SyntaxKind::Identifier));
                Expression::FieldAccess {
                    target: name,
                    field,
                    span: self.span_from(name.span.start),
                }
            }
            SyntaxKind::OpenBracket => {
                self.advance();
                let indices = self.parse_arguments(SyntaxKind::CloseBracket);
                self.match_token(SyntaxKind::CloseBracket);
                Expression::ArrayAccess {
                    target: name,
                    indices,
                    span: self.span_from(name.span.start),
                }
            }
            _ => Expression::Name(name),
        }
    }
}
