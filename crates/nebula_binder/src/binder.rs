//! The binder.
//!
//! Binds every unit of a compilation together in three passes:
//!
//! 1. collect each unit's namespace, imports and bundle names so types can
//!    refer to bundles declared anywhere;
//! 2. bind declarations (bundles, native functions, function signatures)
//!    and freeze them so sibling units can resolve against them;
//! 3. bind, lower and flow-check each function body.
//!
//! Problems are reported and replaced with error nodes so one pass surfaces
//! as many diagnostics as possible. A corrupt reference script is the only
//! condition that stops binding with an `Err`.

use crate::bound::{BoundExpression, BoundStatement, BoundVariableDeclaration, LabelId, VariableRef};
use crate::control_flow;
use crate::conversion::Conversion;
use crate::folding;
use crate::lowering;
use crate::operators::{BoundBinaryOperator, BoundUnaryOperator};
use crate::program::{BoundFunction, BoundNamespace, BoundProgram, ProgramDeclarations};
use crate::references::{materialize_bundle, ProgramReferences, ReferenceError};
use crate::scope::Scope;
use crate::script::Script;
use crate::symbols::{
    Attribute, BundleField, BundleSymbol, ConstantValue, Declaration, FunctionSymbol,
    ParameterSymbol, Symbol, TypeSymbol, VariableId, VariableSymbol,
};
use indexmap::IndexMap;
use nebula_core::{SourceText, TextSpan};
use nebula_diagnostics::{messages, DiagnosticMessage, Report};
use nebula_syntax::ast::{
    BlockStatement, CompilationUnit, Expression, FunctionDeclaration, Identifier, LiteralValue,
    Operator, Parameter, Statement, TypeClause, VariableDeclarationList, VariableDeclarator,
};
use nebula_syntax::SyntaxKind;
use rustc_hash::{FxHashMap, FxHashSet};
use std::rc::Rc;
use thiserror::Error;

/// The result of binding a set of units.
#[derive(Debug)]
pub struct BoundUnits {
    /// One program per unit, in input order.
    pub programs: Vec<BoundProgram>,
    pub report: Report,
}

impl BoundUnits {
    pub fn has_errors(&self) -> bool {
        self.report.has_errors()
    }
}

/// Binding stopped on a corrupt reference. The report holds every diagnostic
/// collected up to that point, including the reference error itself.
#[derive(Debug, Error)]
#[error("binding halted: {source}")]
pub struct FatalBindError {
    pub source: ReferenceError,
    pub report: Report,
}

/// Bind `units` together, resolving imports against each other and against
/// the compiled `scripts`.
pub fn bind(units: &[CompilationUnit<'_>], scripts: &[Rc<Script>]) -> Result<BoundUnits, FatalBindError> {
    tracing::debug!(units = units.len(), scripts = scripts.len(), "binding units");
    let builtins = Scope::builtins();
    let mut report = Report::new();

    let scripts: FxHashMap<String, Rc<Script>> = scripts
        .iter()
        .map(|script| (script.namespace.clone(), Rc::clone(script)))
        .collect();

    // Pass 1: namespaces, bundle names and imports.
    let mut bundle_names: FxHashMap<String, FxHashSet<String>> = FxHashMap::default();
    for unit in units {
        let names = bundle_names.entry(unit.namespace_name().to_string()).or_default();
        names.extend(unit.bundles.iter().map(|b| b.name.text.to_string()));
    }
    let imports: Vec<Vec<String>> = units
        .iter()
        .map(|unit| resolve_imports(unit, &bundle_names, &scripts, &mut report))
        .collect();

    // Pass 2: declarations.
    let mut declared = Vec::with_capacity(units.len());
    for (unit, imports) in units.iter().zip(&imports) {
        let types = TypeResolver {
            namespace: unit.namespace_name(),
            imports,
            units: &bundle_names,
            scripts: &scripts,
            builtins: &builtins,
        };
        match declare_unit(unit, &types, &builtins, &mut report) {
            Ok(unit) => declared.push(unit),
            Err(source) => return Err(FatalBindError { source, report }),
        }
    }
    let mut siblings: FxHashMap<String, Rc<ProgramDeclarations>> = FxHashMap::default();
    for unit in &declared {
        siblings
            .entry(unit.declarations.namespace.clone())
            .or_insert_with(|| Rc::clone(&unit.declarations));
    }

    // Pass 3: function bodies.
    let mut fatal = None;
    let mut programs = Vec::with_capacity(units.len());
    for ((unit, imports), declared) in units.iter().zip(&imports).zip(declared) {
        let namespace = unit.namespace_name();
        let _span = tracing::debug_span!("bind_unit", namespace = %namespace).entered();

        let mut references = ProgramReferences::new(Rc::clone(&declared.declarations));
        for import in imports {
            if let Some(program) = siblings.get(import) {
                references.add_program(Rc::clone(program));
            } else if let Some(script) = scripts.get(import) {
                references.add_script(Rc::clone(script));
            }
        }

        let types = TypeResolver {
            namespace,
            imports,
            units: &bundle_names,
            scripts: &scripts,
            builtins: &builtins,
        };
        let mut functions = IndexMap::new();
        for (index, symbol) in declared.functions {
            let Some(declaration) = unit.functions.get(index) else {
                continue;
            };
            let mut binder = FunctionBinder {
                source: &unit.source,
                namespace,
                builtins: &builtins,
                types: &types,
                references: &mut references,
                report: &mut report,
                fatal: &mut fatal,
                function: Rc::clone(&symbol),
                scope: declared.scope.clone().into_child(),
                loops: Vec::new(),
                next_label: 0,
                next_variable: 0,
            };
            let body = binder.bind_function(declaration);
            tracing::trace!(function = %symbol.name, statements = body.len(), "bound function");
            functions.insert(symbol.name.clone(), BoundFunction { symbol, body });
        }

        tracing::debug!(
            functions = functions.len(),
            bundles = declared.declarations.bundles.len(),
            "bound program"
        );
        programs.push(BoundProgram {
            namespace: BoundNamespace {
                name: namespace.to_string(),
                span: unit.namespace.map(|ns| ns.span),
            },
            source: Rc::clone(&unit.source),
            declarations: declared.declarations,
            functions,
            references,
        });
    }

    match fatal {
        Some(source) => Err(FatalBindError { source, report }),
        None => Ok(BoundUnits { programs, report }),
    }
}

/// The imports of `unit` that name a sibling or a script, deduplicated.
fn resolve_imports(
    unit: &CompilationUnit<'_>,
    siblings: &FxHashMap<String, FxHashSet<String>>,
    scripts: &FxHashMap<String, Rc<Script>>,
    report: &mut Report,
) -> Vec<String> {
    let mut imports: Vec<String> = Vec::new();
    for import in unit.imports {
        if !siblings.contains_key(import.name) && !scripts.contains_key(import.name) {
            report.report(&unit.source, import.name_span, &messages::IMPORT_NOT_FOUND, &[import.name]);
            continue;
        }
        if import.name != unit.namespace_name() && !imports.iter().any(|i| i == import.name) {
            imports.push(import.name.to_string());
        }
    }
    imports
}

// ============================================================================
// Type resolution
// ============================================================================

/// Report a corrupt reference at the place that needed it.
fn report_reference_error(report: &mut Report, source: &SourceText, span: TextSpan, error: &ReferenceError) {
    match error {
        ReferenceError::FieldCountMismatch {
            bundle,
            declared,
            reconstructed,
            ..
        } => report.report(
            source,
            span,
            &messages::REFERENCE_FIELD_COUNT_MISMATCH,
            &[bundle, &declared.to_string(), &reconstructed.to_string()],
        ),
        ReferenceError::UnknownType {
            namespace,
            function,
            type_name,
        } => report.report(
            source,
            span,
            &messages::REFERENCE_UNKNOWN_TYPE,
            &[&format!("{namespace}::{function}"), type_name],
        ),
    }
}

/// Resolves type clauses for one unit. Bundles of reference scripts are
/// materialized on resolution, so a corrupt one fails wherever it is named.
struct TypeResolver<'c> {
    namespace: &'c str,
    imports: &'c [String],
    /// Bundle names declared by each namespace being compiled.
    units: &'c FxHashMap<String, FxHashSet<String>>,
    scripts: &'c FxHashMap<String, Rc<Script>>,
    builtins: &'c Scope,
}

impl TypeResolver<'_> {
    fn resolve(
        &self,
        clause: &TypeClause<'_>,
        source: &SourceText,
        report: &mut Report,
    ) -> Result<TypeSymbol, ReferenceError> {
        let value = match clause.namespace {
            Some(ns) if ns.text != self.namespace => self
                .resolve_foreign(ns.text, clause.name.text)
                .map_err(|error| {
                    report_reference_error(report, source, clause.span, &error);
                    error
                })?,
            _ => self.resolve_local(clause.name.text),
        };
        let Some(value) = value else {
            let name = match clause.namespace {
                Some(ns) => format!("{}::{}", ns.text, clause.name.text),
                None => clause.name.text.to_string(),
            };
            report.report(source, clause.span, &messages::TYPE_DOES_NOT_EXIST, &[&name]);
            return Ok(TypeSymbol::Error);
        };
        if clause.rank > 0 {
            Ok(TypeSymbol::array(value, clause.rank))
        } else {
            Ok(value)
        }
    }

    fn resolve_local(&self, name: &str) -> Option<TypeSymbol> {
        if let Some(Symbol::Type(ty)) = self.builtins.lookup(name) {
            return Some(ty.clone());
        }
        let declared = self.units.get(self.namespace)?.contains(name);
        declared.then(|| TypeSymbol::named_bundle(self.namespace, name))
    }

    /// Bundles of other namespaces resolve only through imports.
    fn resolve_foreign(&self, namespace: &str, name: &str) -> Result<Option<TypeSymbol>, ReferenceError> {
        if !self.imports.iter().any(|i| i == namespace) {
            return Ok(None);
        }
        let declared = match self.units.get(namespace) {
            Some(bundles) => bundles.contains(name),
            None => match self.scripts.get(namespace).and_then(|s| s.bundles.get(name)) {
                Some(bundle) => {
                    materialize_bundle(namespace, bundle)?;
                    true
                }
                None => false,
            },
        };
        Ok(declared.then(|| TypeSymbol::named_bundle(namespace, name)))
    }
}

// ============================================================================
// Declarations
// ============================================================================

struct DeclaredUnit {
    declarations: Rc<ProgramDeclarations>,
    /// Unit scope holding bundles and functions, child of the builtins.
    scope: Scope,
    /// Functions whose bodies get bound, with their index in the unit.
    functions: Vec<(usize, Rc<FunctionSymbol>)>,
}

fn declare_unit(
    unit: &CompilationUnit<'_>,
    types: &TypeResolver<'_>,
    builtins: &Scope,
    report: &mut Report,
) -> Result<DeclaredUnit, ReferenceError> {
    let source = unit.source.as_ref();
    let mut declarations = ProgramDeclarations::new(unit.namespace_name());
    let mut scope = builtins.clone().into_child();
    let mut functions = Vec::new();

    for bundle in unit.bundles {
        let name = bundle.name.text;
        if declarations.bundles.contains_key(name) {
            report.report(source, bundle.name.span, &messages::BUNDLE_ALREADY_EXISTS, &[name]);
            continue;
        }
        let mut fields: Vec<BundleField> = Vec::with_capacity(bundle.fields.len());
        for field in bundle.fields {
            let ty = types.resolve(&field.ty, source, report)?;
            if fields.iter().any(|f| f.name == field.name.text) {
                report.report(
                    source,
                    field.name.span,
                    &messages::FIELD_ALREADY_DECLARED,
                    &[field.name.text, name],
                );
                continue;
            }
            fields.push(BundleField {
                ty,
                name: field.name.text.to_string(),
                ordinal: fields.len() as u32,
            });
        }
        let symbol = Rc::new(BundleSymbol {
            name: name.to_string(),
            namespace: declarations.namespace.clone(),
            fields,
            span: Some(bundle.span),
        });
        scope.declare(Symbol::Bundle(Rc::clone(&symbol)));
        declarations.bundles.insert(name.to_string(), symbol);
    }

    for native in unit.native_functions {
        let name = native.name.text;
        if declarations.native_functions.contains_key(name) {
            report.report(source, native.name.span, &messages::NATIVE_FUNCTION_ALREADY_EXISTS, &[name]);
            continue;
        }
        let symbol = Rc::new(FunctionSymbol {
            name: name.to_string(),
            parameters: declare_parameters(native.parameters, types, source, report)?,
            attributes: Vec::new(),
            return_type: types.resolve(&native.return_type, source, report)?,
            declaration: Declaration::Native { span: native.span },
        });
        scope.declare(Symbol::Function(Rc::clone(&symbol)));
        declarations.native_functions.insert(name.to_string(), symbol);
    }

    for (index, function) in unit.functions.iter().enumerate() {
        let name = function.name.text;
        if declarations.function(name).is_some() {
            report.report(source, function.name.span, &messages::FUNCTION_ALREADY_EXISTS, &[name]);
            continue;
        }
        let parameters = declare_parameters(function.parameters, types, source, report)?;
        let return_type = types.resolve(&function.return_type, source, report)?;
        let attributes = declare_attributes(function, &parameters, &return_type, builtins, source, report);
        let symbol = Rc::new(FunctionSymbol {
            name: name.to_string(),
            parameters,
            attributes,
            return_type,
            declaration: Declaration::User {
                span: function.span,
                name_span: function.name.span,
            },
        });
        scope.declare(Symbol::Function(Rc::clone(&symbol)));
        declarations.functions.insert(name.to_string(), Rc::clone(&symbol));
        functions.push((index, symbol));
    }

    Ok(DeclaredUnit {
        declarations: Rc::new(declarations),
        scope,
        functions,
    })
}

fn declare_parameters(
    parameters: &[Parameter<'_>],
    types: &TypeResolver<'_>,
    source: &SourceText,
    report: &mut Report,
) -> Result<Vec<Rc<ParameterSymbol>>, ReferenceError> {
    let mut symbols: Vec<Rc<ParameterSymbol>> = Vec::with_capacity(parameters.len());
    for parameter in parameters {
        let ty = types.resolve(&parameter.ty, source, report)?;
        let name = parameter.name.text;
        if symbols.iter().any(|p| p.name == name) {
            report.report(source, parameter.name.span, &messages::PARAMETER_ALREADY_DECLARED, &[name]);
            continue;
        }
        symbols.push(Rc::new(ParameterSymbol {
            name: name.to_string(),
            ty,
            ordinal: symbols.len() as u32,
        }));
    }
    Ok(symbols)
}

fn declare_attributes(
    function: &FunctionDeclaration<'_>,
    parameters: &[Rc<ParameterSymbol>],
    return_type: &TypeSymbol,
    builtins: &Scope,
    source: &SourceText,
    report: &mut Report,
) -> Vec<Attribute> {
    let function_name = function.name.text;
    let mut attributes = Vec::new();
    for identifier in function.attributes {
        let Some(Symbol::Attribute(attribute)) = builtins.lookup(identifier.text) else {
            report.report(source, identifier.span, &messages::UNKNOWN_ATTRIBUTE, &[identifier.text]);
            continue;
        };
        if attributes.contains(attribute) {
            continue;
        }
        match attribute {
            Attribute::AutoExec => {
                if *return_type != TypeSymbol::Void && !return_type.is_error() {
                    report.report(
                        source,
                        identifier.span,
                        &messages::ATTRIBUTE_REQUIRES_VOID_RETURN,
                        &[identifier.text, function_name],
                    );
                }
                if !parameters.is_empty() {
                    report.report(
                        source,
                        identifier.span,
                        &messages::ATTRIBUTE_REQUIRES_ZERO_PARAMS,
                        &[identifier.text, function_name],
                    );
                }
            }
        }
        attributes.push(*attribute);
    }
    attributes
}

// ============================================================================
// Function bodies
// ============================================================================

/// Where a value is bound; decides which conversions and defaults apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ValueContext {
    /// A variable initializer: `[]` and int-to-bundle initialization allowed.
    Declaration,
    /// The right-hand side of `=`: `[]` allowed.
    Assignment,
    /// Arguments, return values.
    Value,
}

struct FunctionBinder<'b> {
    source: &'b SourceText,
    namespace: &'b str,
    builtins: &'b Scope,
    types: &'b TypeResolver<'b>,
    references: &'b mut ProgramReferences,
    report: &'b mut Report,
    fatal: &'b mut Option<ReferenceError>,
    function: Rc<FunctionSymbol>,
    scope: Scope,
    /// Break and continue labels of the enclosing loops.
    loops: Vec<(LabelId, LabelId)>,
    next_label: u32,
    next_variable: u32,
}

impl FunctionBinder<'_> {
    fn bind_function(&mut self, declaration: &FunctionDeclaration<'_>) -> Vec<BoundStatement> {
        for parameter in &self.function.parameters {
            self.scope.declare(Symbol::Parameter(Rc::clone(parameter)));
        }

        let body = self.bind_block(&declaration.body);
        let mut statements = lowering::lower(body, self.next_label);

        if control_flow::end_is_reachable(&statements) {
            let return_type = &self.function.return_type;
            if *return_type == TypeSymbol::Void {
                let closing_brace = declaration.body.span.end().saturating_sub(1);
                statements.push(BoundStatement::Return {
                    value: None,
                    span: TextSpan::new(closing_brace, 1),
                });
            } else if !return_type.is_error() {
                self.error(declaration.name.span, &messages::NOT_ALL_PATHS_RETURN, &[declaration.name.text]);
            }
        }
        statements
    }

    fn error(&mut self, span: TextSpan, message: &DiagnosticMessage, args: &[&str]) {
        self.report.report(self.source, span, message, args);
    }

    /// Report a corrupt reference and halt.
    fn fail(&mut self, error: ReferenceError, span: TextSpan) {
        report_reference_error(self.report, self.source, span, &error);
        self.halt(error);
    }

    /// Only the first corrupt reference is kept as the fatal error.
    fn halt(&mut self, error: ReferenceError) {
        if self.fatal.is_none() {
            *self.fatal = Some(error);
        }
    }

    fn new_label(&mut self) -> LabelId {
        let label = LabelId(self.next_label);
        self.next_label += 1;
        label
    }

    fn push_scope(&mut self) {
        let scope = std::mem::take(&mut self.scope);
        self.scope = scope.into_child();
    }

    fn pop_scope(&mut self) {
        let scope = std::mem::take(&mut self.scope);
        self.scope = scope.into_parent().unwrap_or_default();
    }

    fn resolve_type(&mut self, clause: &TypeClause<'_>) -> TypeSymbol {
        match self.types.resolve(clause, self.source, self.report) {
            Ok(ty) => ty,
            Err(error) => {
                self.halt(error);
                TypeSymbol::Error
            }
        }
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn bind_statement(&mut self, statement: &Statement<'_>) -> BoundStatement {
        match *statement {
            Statement::Block(ref block) => self.bind_block(block),
            Statement::VariableDeclaration(ref list) => self.bind_variable_declarations(list),
            Statement::Expression { expression, span } => {
                let expression = self.bind_expression(expression);
                let allowed = matches!(
                    expression,
                    BoundExpression::Error { .. }
                        | BoundExpression::Assignment { .. }
                        | BoundExpression::CompoundAssignment { .. }
                        | BoundExpression::FieldAssignment { .. }
                        | BoundExpression::ArrayAssignment { .. }
                        | BoundExpression::Call { .. }
                );
                if !allowed {
                    self.error(span, &messages::INVALID_EXPRESSION_STATEMENT, &[]);
                }
                BoundStatement::Expression { expression, span }
            }
            Statement::Wait { time, span } => {
                let time = self.bind_expression(time);
                let ty = time.ty();
                if ty != TypeSymbol::Int && !ty.is_error() {
                    self.error(time.span(), &messages::WAIT_MUST_BE_INT, &[&ty.name()]);
                }
                BoundStatement::Wait { time, span }
            }
            Statement::WaitNotification { target, channel, span } => {
                let (target, channel) = self.bind_notification("waittill", target, channel);
                BoundStatement::WaitNotification { target, channel, span }
            }
            Statement::Notify { target, channel, span } => {
                let (target, channel) = self.bind_notification("notify", target, channel);
                BoundStatement::Notify { target, channel, span }
            }
            Statement::Return { value, span } => self.bind_return(value, span),
            Statement::Break { span } => self.bind_jump(span, "break", |(brk, _)| brk),
            Statement::Continue { span } => self.bind_jump(span, "continue", |(_, cont)| cont),
            Statement::If {
                condition,
                then_statement,
                else_statement,
                span,
            } => {
                let condition = self.bind_condition(condition);
                match condition.constant_value() {
                    Some(ConstantValue::Bool(false)) => {
                        self.error(then_statement.span(), &messages::UNREACHABLE_CODE, &[]);
                    }
                    Some(ConstantValue::Bool(true)) => {
                        if let Some(else_statement) = else_statement {
                            self.error(else_statement.span(), &messages::UNREACHABLE_CODE, &[]);
                        }
                    }
                    _ => {}
                }
                let then_statement = Box::new(self.bind_scoped(then_statement));
                let else_statement = else_statement.map(|s| Box::new(self.bind_scoped(s)));
                BoundStatement::If {
                    condition,
                    then_statement,
                    else_statement,
                    span,
                }
            }
            Statement::While { condition, body, span } => {
                let condition = self.bind_condition(condition);
                self.warn_if_never_entered(&condition, body.span());
                let (body, break_label, continue_label) = self.bind_loop_body(body);
                BoundStatement::While {
                    condition,
                    body,
                    break_label,
                    continue_label,
                    span,
                }
            }
            Statement::DoWhile { body, condition, span } => {
                let (body, break_label, continue_label) = self.bind_loop_body(body);
                let condition = self.bind_condition(condition);
                BoundStatement::DoWhile {
                    body,
                    condition,
                    break_label,
                    continue_label,
                    span,
                }
            }
            Statement::For {
                initializer,
                condition,
                step,
                body,
                span,
            } => {
                self.push_scope();
                let initializer = initializer
                    .as_ref()
                    .map(|list| Box::new(self.bind_variable_declarations(list)));
                let condition = condition.map(|c| self.bind_condition(c));
                if let Some(condition) = &condition {
                    self.warn_if_never_entered(condition, body.span());
                }
                let step = step.map(|s| self.bind_expression(s));
                let (body, break_label, continue_label) = self.bind_loop_body(body);
                self.pop_scope();
                BoundStatement::For {
                    initializer,
                    condition,
                    step,
                    body,
                    break_label,
                    continue_label,
                    span,
                }
            }
        }
    }

    fn bind_block(&mut self, block: &BlockStatement<'_>) -> BoundStatement {
        self.push_scope();
        let statements = block
            .statements
            .iter()
            .map(|statement| self.bind_statement(statement))
            .collect();
        self.pop_scope();
        BoundStatement::Block {
            statements,
            span: block.span,
        }
    }

    /// Bind a statement in its own scope, so declarations in unbraced
    /// branches and loop bodies do not leak.
    fn bind_scoped(&mut self, statement: &Statement<'_>) -> BoundStatement {
        self.push_scope();
        let bound = self.bind_statement(statement);
        self.pop_scope();
        bound
    }

    fn bind_loop_body(&mut self, body: &Statement<'_>) -> (Box<BoundStatement>, LabelId, LabelId) {
        let break_label = self.new_label();
        let continue_label = self.new_label();
        self.loops.push((break_label, continue_label));
        let body = self.bind_scoped(body);
        self.loops.pop();
        (Box::new(body), break_label, continue_label)
    }

    fn bind_jump(
        &mut self,
        span: TextSpan,
        keyword: &str,
        select: impl Fn((LabelId, LabelId)) -> LabelId,
    ) -> BoundStatement {
        match self.loops.last() {
            Some(&labels) => BoundStatement::Goto {
                label: select(labels),
                span: Some(span),
            },
            None => {
                self.error(span, &messages::INVALID_BREAK_OR_CONTINUE, &[keyword]);
                BoundStatement::Nop { span }
            }
        }
    }

    fn warn_if_never_entered(&mut self, condition: &BoundExpression, body: TextSpan) {
        if condition.constant_value() == Some(&ConstantValue::Bool(false)) {
            self.error(body, &messages::UNREACHABLE_CODE, &[]);
        }
    }

    fn bind_return(&mut self, value: Option<&Expression<'_>>, span: TextSpan) -> BoundStatement {
        let return_type = self.function.return_type.clone();
        let function_name = self.function.name.clone();
        let value = match value {
            Some(value) if return_type == TypeSymbol::Void => {
                self.error(value.span(), &messages::VOID_FUNCTION_CANNOT_RETURN_VALUE, &[&function_name]);
                self.bind_discarded(value);
                None
            }
            Some(value) => Some(self.bind_expression_to(value, &return_type, ValueContext::Value)),
            None => {
                if return_type != TypeSymbol::Void && !return_type.is_error() {
                    self.error(
                        span,
                        &messages::FUNCTION_EXPECTS_RETURN,
                        &[&function_name, &return_type.name()],
                    );
                }
                None
            }
        };
        BoundStatement::Return { value, span }
    }

    fn bind_notification(
        &mut self,
        keyword: &str,
        target: &Expression<'_>,
        channel: &Expression<'_>,
    ) -> (BoundExpression, BoundExpression) {
        let target = self.bind_expression(target);
        let ty = target.ty();
        if !ty.is_bundle() && !ty.is_error() {
            self.error(target.span(), &messages::WAIT_TARGET_MUST_BE_BUNDLE, &[keyword, &ty.name()]);
        }
        // Channels are ints or strings.
        let channel = self.bind_expression(channel);
        let channel_type = channel.ty();
        if !matches!(channel_type, TypeSymbol::Int | TypeSymbol::String | TypeSymbol::Error) {
            self.error(channel.span(), &messages::VALUE_NOT_OF_TYPE, &["int"]);
            return (target, BoundExpression::error(channel.span()));
        }
        (target, channel)
    }

    fn bind_variable_declarations(&mut self, list: &VariableDeclarationList<'_>) -> BoundStatement {
        let ty = self.resolve_type(&list.ty);
        let mut declarations: Vec<BoundVariableDeclaration> = list
            .declarators
            .iter()
            .map(|declarator| self.bind_declarator(list.is_const, &ty, declarator))
            .collect();
        if declarations.len() == 1 {
            if let Some(declaration) = declarations.pop() {
                return BoundStatement::VariableDeclaration(declaration);
            }
        }
        BoundStatement::VariableDeclarationCollection {
            declarations,
            span: list.span,
        }
    }

    fn bind_declarator(
        &mut self,
        is_const: bool,
        ty: &TypeSymbol,
        declarator: &VariableDeclarator<'_>,
    ) -> BoundVariableDeclaration {
        let name = declarator.name.text;
        let duplicate = self.scope.lookup_local(name).is_some();
        if duplicate {
            self.error(declarator.name.span, &messages::VARIABLE_ALREADY_DECLARED, &[name]);
        }
        let ty = if duplicate { TypeSymbol::Error } else { ty.clone() };

        let initializer = match declarator.initializer {
            Some(expression) => self.bind_expression_to(expression, &ty, ValueContext::Declaration),
            None => self.default_value(&ty, declarator.span),
        };
        let constant = if is_const {
            initializer.constant_value().cloned()
        } else {
            None
        };

        let variable = Rc::new(VariableSymbol {
            id: VariableId(self.next_variable),
            name: name.to_string(),
            ty,
            is_readonly: is_const,
            constant,
        });
        self.next_variable += 1;
        if !duplicate {
            self.scope.declare(Symbol::LocalVariable(Rc::clone(&variable)));
        }
        BoundVariableDeclaration {
            variable,
            initializer,
            span: declarator.span,
        }
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn bind_expression(&mut self, expression: &Expression<'_>) -> BoundExpression {
        match *expression {
            Expression::Literal { value, span } => {
                let value = match value {
                    LiteralValue::Int(v) => ConstantValue::Int(v),
                    LiteralValue::Bool(v) => ConstantValue::Bool(v),
                    LiteralValue::String(v) => ConstantValue::String(v.to_string()),
                };
                BoundExpression::Literal { value, span }
            }
            Expression::DefaultInitializer { span } => {
                self.error(span, &messages::EXPRESSION_MUST_HAVE_VALUE, &[]);
                BoundExpression::error(span)
            }
            Expression::Name(identifier) => match self.bind_variable_reference(identifier) {
                Some(variable) => BoundExpression::Variable {
                    variable,
                    span: identifier.span,
                },
                None => BoundExpression::error(identifier.span),
            },
            Expression::FieldAccess { target, field, span } => match self.bind_field(target, field) {
                Some((variable, bundle, field)) => BoundExpression::FieldAccess {
                    variable,
                    bundle,
                    field,
                    span,
                },
                None => BoundExpression::error(span),
            },
            Expression::ArrayAccess { target, indices, span } => {
                match self.bind_array_target(target, indices, span) {
                    Some((variable, indices, element_type)) => BoundExpression::ArrayAccess {
                        variable,
                        indices,
                        element_type,
                        span,
                    },
                    None => BoundExpression::error(span),
                }
            }
            Expression::Parenthesized { inner, .. } => self.bind_expression(inner),
            Expression::Unary { operator, operand, span } => self.bind_unary(operator, operand, span),
            Expression::Binary {
                left,
                operator,
                right,
                span,
            } => self.bind_binary(left, operator, right, span),
            Expression::Assignment {
                target,
                operator,
                value,
                span,
            } => self.bind_assignment(target, operator, value, span),
            Expression::Call {
                is_async,
                namespace,
                name,
                arguments,
                span,
            } => self.bind_call(is_async, namespace, name, arguments, span),
        }
    }

    /// Bind an expression whose value is not used, for its diagnostics only.
    fn bind_discarded(&mut self, expression: &Expression<'_>) {
        if !matches!(expression, Expression::DefaultInitializer { .. }) {
            self.bind_expression(expression);
        }
    }

    fn bind_condition(&mut self, expression: &Expression<'_>) -> BoundExpression {
        self.bind_value_of_type(expression, &TypeSymbol::Bool)
    }

    /// Bind an expression that must already have type `ty`.
    fn bind_value_of_type(&mut self, expression: &Expression<'_>, ty: &TypeSymbol) -> BoundExpression {
        let bound = self.bind_expression(expression);
        let actual = bound.ty();
        if actual != *ty && !actual.is_error() {
            self.error(bound.span(), &messages::VALUE_NOT_OF_TYPE, &[&ty.name()]);
            return BoundExpression::error(bound.span());
        }
        bound
    }

    /// Bind an expression and convert it to `ty`.
    fn bind_expression_to(
        &mut self,
        expression: &Expression<'_>,
        ty: &TypeSymbol,
        context: ValueContext,
    ) -> BoundExpression {
        if let Expression::DefaultInitializer { span } = *expression {
            if context != ValueContext::Value {
                return self.default_value(ty, span);
            }
        }
        let bound = self.bind_expression(expression);
        let span = bound.span();
        self.convert(bound, ty, false, context == ValueContext::Declaration, span)
    }

    fn convert(
        &mut self,
        expression: BoundExpression,
        ty: &TypeSymbol,
        allow_explicit: bool,
        allow_bundle_initialization: bool,
        span: TextSpan,
    ) -> BoundExpression {
        let from = expression.ty();
        if from.is_error() || ty.is_error() {
            return expression;
        }
        let conversion = Conversion::classify(&from, ty);
        match conversion {
            Conversion::Identity => expression,
            Conversion::Implicit if allow_bundle_initialization => BoundExpression::Conversion {
                ty: ty.clone(),
                expression: Box::new(expression),
                span,
            },
            Conversion::Explicit if allow_explicit => BoundExpression::Conversion {
                ty: ty.clone(),
                expression: Box::new(expression),
                span,
            },
            Conversion::Explicit => {
                self.error(
                    expression.span(),
                    &messages::CANNOT_CONVERT_IMPLICITLY,
                    &[&from.name(), &ty.name()],
                );
                BoundExpression::error(span)
            }
            Conversion::Implicit | Conversion::None => {
                self.error(expression.span(), &messages::CANNOT_CONVERT_TYPE, &[&from.name(), &ty.name()]);
                BoundExpression::error(span)
            }
        }
    }

    /// The value of a variable declared without an initializer or with `[]`.
    fn default_value(&mut self, ty: &TypeSymbol, span: TextSpan) -> BoundExpression {
        let literal = |value| BoundExpression::Literal { value, span };
        match ty {
            TypeSymbol::Int => literal(ConstantValue::Int(0)),
            TypeSymbol::Bool => literal(ConstantValue::Bool(false)),
            TypeSymbol::String => literal(ConstantValue::String(String::new())),
            TypeSymbol::NamedBundle { .. } => BoundExpression::Conversion {
                ty: ty.clone(),
                expression: Box::new(literal(ConstantValue::Int(0))),
                span,
            },
            TypeSymbol::Array { .. } => BoundExpression::ObjectAllocation { ty: ty.clone(), span },
            TypeSymbol::Error => BoundExpression::error(span),
            TypeSymbol::Void | TypeSymbol::Bundle => {
                self.error(span, &messages::CANNOT_CONVERT_TYPE, &["[]", &ty.name()]);
                BoundExpression::error(span)
            }
        }
    }

    fn bind_variable_reference(&mut self, identifier: Identifier<'_>) -> Option<VariableRef> {
        match self.scope.lookup(identifier.text) {
            Some(Symbol::LocalVariable(variable)) => Some(VariableRef::Local(Rc::clone(variable))),
            Some(Symbol::Parameter(parameter)) => Some(VariableRef::Parameter(Rc::clone(parameter))),
            Some(_) => {
                self.error(identifier.span, &messages::NAME_IS_NOT_A_VARIABLE, &[identifier.text]);
                None
            }
            None => {
                self.error(identifier.span, &messages::VARIABLE_DOES_NOT_EXIST, &[identifier.text]);
                None
            }
        }
    }

    fn bind_field(
        &mut self,
        target: Identifier<'_>,
        field: Identifier<'_>,
    ) -> Option<(VariableRef, Rc<BundleSymbol>, BundleField)> {
        let variable = self.bind_variable_reference(target)?;
        let (namespace, alias) = match variable.ty() {
            TypeSymbol::NamedBundle { namespace, alias } => (namespace.clone(), alias.clone()),
            TypeSymbol::Error => return None,
            other => {
                let other = other.to_string();
                self.error(target.span, &messages::VARIABLE_HAS_NO_FIELDS, &[target.text, &other]);
                return None;
            }
        };
        let bundle = match self.references.bundle(&namespace, &alias) {
            Ok(Some(bundle)) => bundle,
            Ok(None) => {
                self.error(target.span, &messages::BUNDLE_DOES_NOT_EXIST, &[&alias]);
                return None;
            }
            Err(error) => {
                self.fail(error, target.span);
                return None;
            }
        };
        let Some(bundle_field) = bundle.field(field.text).cloned() else {
            self.error(field.span, &messages::FIELD_DOES_NOT_EXIST, &[&alias, field.text]);
            return None;
        };
        Some((variable, bundle, bundle_field))
    }

    fn bind_array_target(
        &mut self,
        target: Identifier<'_>,
        indices: &[Expression<'_>],
        span: TextSpan,
    ) -> Option<(VariableRef, Vec<BoundExpression>, TypeSymbol)> {
        let variable = self.bind_variable_reference(target);
        let bound_indices: Vec<BoundExpression> = indices
            .iter()
            .map(|index| self.bind_value_of_type(index, &TypeSymbol::Int))
            .collect();
        let variable = variable?;
        let (element_type, rank) = match variable.ty() {
            TypeSymbol::Array { value, rank } => ((**value).clone(), *rank),
            TypeSymbol::Error => return None,
            other => {
                let other = other.to_string();
                self.error(target.span, &messages::VARIABLE_CANNOT_BE_INDEXED, &[target.text, &other]);
                return None;
            }
        };
        if bound_indices.len() != rank as usize {
            let (rank, count) = (rank.to_string(), bound_indices.len().to_string());
            self.error(span, &messages::WRONG_NUMBER_OF_INDICES, &[target.text, &rank, &count]);
            return None;
        }
        Some((variable, bound_indices, element_type))
    }

    fn bind_unary(&mut self, operator: Operator, operand: &Expression<'_>, span: TextSpan) -> BoundExpression {
        let operand = self.bind_expression(operand);
        let ty = operand.ty();
        if ty.is_error() {
            return BoundExpression::error(span);
        }
        let Some(bound_operator) = BoundUnaryOperator::bind(operator.kind, &ty) else {
            let text = operator.kind.to_string();
            self.error(operator.span, &messages::UNARY_OPERATOR_NOT_DEFINED, &[&text, &ty.name()]);
            return BoundExpression::error(span);
        };
        let constant = folding::fold_unary(&bound_operator, operand.constant_value());
        BoundExpression::Unary {
            operator: bound_operator,
            operand: Box::new(operand),
            constant,
            span,
        }
    }

    fn bind_binary(
        &mut self,
        left: &Expression<'_>,
        operator: Operator,
        right: &Expression<'_>,
        span: TextSpan,
    ) -> BoundExpression {
        let left = self.bind_expression(left);
        let right = self.bind_expression(right);
        self.bind_binary_operator(left, operator.kind, operator.span, right, span)
    }

    fn bind_binary_operator(
        &mut self,
        left: BoundExpression,
        kind: SyntaxKind,
        operator_span: TextSpan,
        right: BoundExpression,
        span: TextSpan,
    ) -> BoundExpression {
        let (left_type, right_type) = (left.ty(), right.ty());
        if left_type.is_error() || right_type.is_error() {
            return BoundExpression::error(span);
        }
        let Some(operator) = BoundBinaryOperator::bind(kind, &left_type, &right_type) else {
            let text = kind.to_string();
            self.error(
                operator_span,
                &messages::BINARY_OPERATOR_NOT_DEFINED,
                &[&text, &left_type.name(), &right_type.name()],
            );
            return BoundExpression::error(span);
        };
        let constant = folding::fold_binary(left.constant_value(), &operator, right.constant_value());
        BoundExpression::Binary {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            constant,
            span,
        }
    }

    fn bind_assignment(
        &mut self,
        target: &Expression<'_>,
        operator: Operator,
        value: &Expression<'_>,
        span: TextSpan,
    ) -> BoundExpression {
        let compound = operator.kind.compound_operator();
        match *target {
            Expression::Name(identifier) => {
                let Some(variable) = self.bind_variable_reference(identifier) else {
                    self.bind_discarded(value);
                    return BoundExpression::error(span);
                };
                if variable.is_readonly() {
                    self.error(identifier.span, &messages::CANNOT_REASSIGN_READONLY, &[identifier.text]);
                }
                let ty = variable.ty().clone();
                match compound {
                    None => {
                        let value = self.bind_expression_to(value, &ty, ValueContext::Assignment);
                        BoundExpression::Assignment {
                            variable,
                            value: Box::new(value),
                            span,
                        }
                    }
                    Some(kind) => {
                        let value = self.bind_expression(value);
                        let value_type = value.ty();
                        if ty.is_error() || value_type.is_error() {
                            return BoundExpression::error(span);
                        }
                        match BoundBinaryOperator::bind(kind, &ty, &value_type) {
                            Some(operator) => BoundExpression::CompoundAssignment {
                                variable,
                                operator,
                                value: Box::new(value),
                                span,
                            },
                            None => {
                                let text = kind.to_string();
                                self.error(
                                    operator.span,
                                    &messages::BINARY_OPERATOR_NOT_DEFINED,
                                    &[&text, &ty.name(), &value_type.name()],
                                );
                                BoundExpression::error(span)
                            }
                        }
                    }
                }
            }
            Expression::FieldAccess {
                target: field_target,
                field,
                span: access_span,
            } => {
                let Some((variable, bundle, field)) = self.bind_field(field_target, field) else {
                    self.bind_discarded(value);
                    return BoundExpression::error(span);
                };
                let value = match compound {
                    None => self.bind_expression_to(value, &field.ty, ValueContext::Assignment),
                    Some(kind) => {
                        let current = BoundExpression::FieldAccess {
                            variable: variable.clone(),
                            bundle: Rc::clone(&bundle),
                            field: field.clone(),
                            span: access_span,
                        };
                        let value = self.bind_expression(value);
                        self.bind_binary_operator(current, kind, operator.span, value, span)
                    }
                };
                BoundExpression::FieldAssignment {
                    variable,
                    bundle,
                    field,
                    value: Box::new(value),
                    span,
                }
            }
            Expression::ArrayAccess {
                target: array_target,
                indices,
                span: access_span,
            } => {
                let Some((variable, indices, element_type)) =
                    self.bind_array_target(array_target, indices, access_span)
                else {
                    self.bind_discarded(value);
                    return BoundExpression::error(span);
                };
                let value = match compound {
                    None => self.bind_expression_to(value, &element_type, ValueContext::Assignment),
                    Some(kind) => {
                        let current = BoundExpression::ArrayAccess {
                            variable: variable.clone(),
                            indices: indices.clone(),
                            element_type: element_type.clone(),
                            span: access_span,
                        };
                        let value = self.bind_expression(value);
                        self.bind_binary_operator(current, kind, operator.span, value, span)
                    }
                };
                BoundExpression::ArrayAssignment {
                    variable,
                    indices,
                    value: Box::new(value),
                    span,
                }
            }
            _ => {
                self.bind_expression(target);
                self.bind_discarded(value);
                BoundExpression::error(span)
            }
        }
    }

    fn bind_call(
        &mut self,
        is_async: bool,
        namespace: Option<Identifier<'_>>,
        name: Identifier<'_>,
        arguments: &[Expression<'_>],
        span: TextSpan,
    ) -> BoundExpression {
        if namespace.is_none() && arguments.len() == 1 {
            if let Some(Symbol::Type(ty @ (TypeSymbol::Int | TypeSymbol::Bool | TypeSymbol::String))) =
                self.builtins.lookup(name.text)
            {
                let ty = ty.clone();
                let bound = self.bind_expression(&arguments[0]);
                return self.convert(bound, &ty, true, false, span);
            }
        }

        let foreign = namespace.filter(|ns| ns.text != self.namespace);
        let function = match foreign {
            Some(ns) => match self.references.function(ns.text, name.text) {
                Ok(Some(function)) => Some(function),
                Ok(None) => {
                    let qualified = format!("{}::{}", ns.text, name.text);
                    self.error(name.span, &messages::FUNCTION_DOES_NOT_EXIST, &[&qualified]);
                    None
                }
                Err(error) => {
                    self.fail(error, name.span);
                    None
                }
            },
            None => match self.scope.lookup(name.text) {
                Some(Symbol::Function(function)) => Some(Rc::clone(function)),
                Some(_) => {
                    self.error(name.span, &messages::IDENTIFIER_IS_NOT_A_FUNCTION, &[name.text]);
                    None
                }
                None => {
                    self.error(name.span, &messages::FUNCTION_DOES_NOT_EXIST, &[name.text]);
                    None
                }
            },
        };

        let Some(function) = function else {
            for argument in arguments {
                self.bind_discarded(argument);
            }
            return BoundExpression::error(span);
        };
        if arguments.len() != function.parameters.len() {
            let (expected, given) = (function.parameters.len().to_string(), arguments.len().to_string());
            self.error(span, &messages::WRONG_NUMBER_OF_ARGUMENTS, &[name.text, &expected, &given]);
            for argument in arguments {
                self.bind_discarded(argument);
            }
            return BoundExpression::error(span);
        }

        let arguments = arguments
            .iter()
            .zip(function.parameters.iter())
            .map(|(argument, parameter)| self.bind_expression_to(argument, &parameter.ty, ValueContext::Value))
            .collect();
        BoundExpression::Call {
            function,
            namespace: foreign.map(|ns| ns.text.to_string()),
            arguments,
            is_async,
            span,
        }
    }
}
