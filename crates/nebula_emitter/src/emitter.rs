//! Bound programs to instruction streams.
//!
//! Each function is emitted on its own: locals get slots in declaration
//! order, parameters use their ordinal, and jumps to labels are patched with
//! absolute instruction indices once the whole body has been emitted.

use crate::assembly::{Assembly, MODULE_NAME, VERSION};
use crate::definitions::{BundleDefinition, MethodDefinition, VariableDefinition, Version};
use crate::error::EmitError;
use crate::instruction::{Instruction, Operand};
use crate::opcode::Opcode;
use nebula_binder::operators::{BinaryOperatorKind, PrimitiveType, UnaryOperatorKind};
use nebula_binder::{
    BoundExpression, BoundProgram, BoundStatement, ConstantValue, Declaration, FunctionSymbol,
    LabelId, TypeSymbol, VariableId, VariableRef, VariableSymbol,
};
use nebula_core::TextSpan;
use rustc_hash::FxHashMap;
use std::rc::Rc;

/// Emits bound programs into assemblies.
pub struct Emitter {
    module_name: String,
    version: Version,
}

impl Default for Emitter {
    fn default() -> Self {
        Self::new(MODULE_NAME)
    }
}

impl Emitter {
    pub fn new(module_name: impl Into<String>) -> Self {
        Self {
            module_name: module_name.into(),
            version: VERSION,
        }
    }

    #[tracing::instrument(skip_all, fields(namespace = %program.name()))]
    pub fn emit(&self, program: &BoundProgram) -> Result<Assembly, EmitError> {
        let mut assembly = Assembly::new(
            self.module_name.as_str(),
            self.version,
            program.name(),
            Rc::clone(&program.source),
        );

        assembly.native_methods = program
            .declarations
            .native_functions
            .keys()
            .cloned()
            .collect();
        assembly.bundles = program
            .declarations
            .bundles
            .values()
            .map(|b| BundleDefinition::from_symbol(b))
            .collect();

        for function in program.functions.values() {
            let method = FunctionEmitter::new(program.name(), &function.symbol).emit(&function.body)?;
            tracing::trace!(
                function = %method.name,
                instructions = method.instructions.len(),
                locals = method.locals.len(),
                "emitted function"
            );
            assembly.methods.push(method);
        }

        tracing::debug!(
            bundles = assembly.bundles.len(),
            methods = assembly.methods.len(),
            natives = assembly.native_methods.len(),
            "emitted program"
        );
        Ok(assembly)
    }
}

// ============================================================================
// Function emission
// ============================================================================

struct FunctionEmitter<'p> {
    namespace: &'p str,
    function: &'p FunctionSymbol,
    instructions: Vec<Instruction>,
    locals: Vec<VariableDefinition>,
    slots: FxHashMap<VariableId, u32>,
    labels: FxHashMap<LabelId, usize>,
    label_references: Vec<(usize, LabelId)>,
}

impl<'p> FunctionEmitter<'p> {
    fn new(namespace: &'p str, function: &'p FunctionSymbol) -> Self {
        Self {
            namespace,
            function,
            instructions: Vec::new(),
            locals: Vec::new(),
            slots: FxHashMap::default(),
            labels: FxHashMap::default(),
            label_references: Vec::new(),
        }
    }

    fn emit(mut self, body: &[BoundStatement]) -> Result<MethodDefinition, EmitError> {
        for statement in body {
            self.emit_statement(statement)?;
        }
        self.resolve_labels()?;

        let function = self.function;
        let span = match function.declaration {
            Declaration::User { span, .. } | Declaration::Native { span } => Some(span),
            Declaration::Compiled { .. } => None,
        };
        Ok(MethodDefinition {
            name: function.name.clone(),
            return_type: function.return_type.clone(),
            attributes: function.attributes.clone(),
            parameters: function
                .parameters
                .iter()
                .map(|p| VariableDefinition::new(p.name.as_str(), p.ty.clone(), p.ordinal))
                .collect(),
            locals: self.locals,
            instructions: self.instructions,
            span,
        })
    }

    fn resolve_labels(&mut self) -> Result<(), EmitError> {
        for &(index, label) in &self.label_references {
            let Some(&target) = self.labels.get(&label) else {
                return Err(EmitError::UnresolvedLabel {
                    function: self.function.name.clone(),
                    label,
                });
            };
            self.instructions[index].operand = Operand::Int(target as i32);
        }
        Ok(())
    }

    fn unexpected(&self, node: &'static str) -> EmitError {
        EmitError::UnexpectedNode {
            function: self.function.name.clone(),
            node,
        }
    }

    fn push(&mut self, opcode: Opcode, operand: Operand, span: Option<TextSpan>) -> usize {
        self.instructions.push(Instruction::new(opcode, operand, span));
        self.instructions.len() - 1
    }

    fn op(&mut self, opcode: Opcode, span: TextSpan) {
        self.push(opcode, Operand::None, Some(span));
    }

    fn branch_to(&mut self, opcode: Opcode, label: LabelId, span: Option<TextSpan>) {
        let index = self.push(opcode, Operand::Label(label), span);
        self.label_references.push((index, label));
    }

    /// Point a forward branch at the next instruction.
    fn patch(&mut self, index: usize) {
        let target = self.instructions.len() as i32;
        self.instructions[index].operand = Operand::Int(target);
    }

    fn local_slot(&self, variable: &VariableSymbol) -> Result<u32, EmitError> {
        self.slots
            .get(&variable.id)
            .copied()
            .ok_or_else(|| EmitError::MissingStorage {
                function: self.function.name.clone(),
                name: variable.name.clone(),
            })
    }

    // ------------------------------------------------------------------------
    // Statements
    // ------------------------------------------------------------------------

    fn emit_statement(&mut self, statement: &BoundStatement) -> Result<(), EmitError> {
        match statement {
            BoundStatement::Block { statements, .. } => {
                for statement in statements {
                    self.emit_statement(statement)?;
                }
            }
            BoundStatement::Expression { expression, span } => {
                self.emit_expression(expression)?;
                if expression.ty() != TypeSymbol::Void {
                    self.op(Opcode::Pop, *span);
                }
            }
            BoundStatement::VariableDeclaration(declaration) => {
                let index = self.locals.len() as u32;
                let variable = &declaration.variable;
                self.locals
                    .push(VariableDefinition::new(variable.name.as_str(), variable.ty.clone(), index));
                self.slots.insert(variable.id, index);
                self.emit_expression(&declaration.initializer)?;
                self.push(Opcode::StLoc, Operand::Slot(index), Some(declaration.span));
            }
            BoundStatement::VariableDeclarationCollection { declarations, .. } => {
                for declaration in declarations {
                    self.emit_statement(&BoundStatement::VariableDeclaration(declaration.clone()))?;
                }
            }
            BoundStatement::Wait { time, span } => {
                self.emit_expression(time)?;
                self.op(Opcode::Wait, *span);
            }
            BoundStatement::WaitNotification { target, channel, span } => {
                self.emit_expression(target)?;
                self.emit_expression(channel)?;
                self.op(Opcode::WaitN, *span);
            }
            BoundStatement::Notify { target, channel, span } => {
                self.emit_expression(target)?;
                self.emit_expression(channel)?;
                self.op(Opcode::Notify, *span);
            }
            BoundStatement::If {
                condition,
                then_statement,
                else_statement,
                span,
            } => {
                self.emit_expression(condition)?;
                let to_else = self.push(Opcode::BrFalse, Operand::Int(0), Some(*span));
                self.emit_statement(then_statement)?;
                match else_statement {
                    Some(else_statement) => {
                        let to_end = self.push(Opcode::Br, Operand::Int(0), None);
                        self.patch(to_else);
                        self.emit_statement(else_statement)?;
                        self.patch(to_end);
                    }
                    None => self.patch(to_else),
                }
            }
            BoundStatement::While { .. } => return Err(self.unexpected("while loop")),
            BoundStatement::DoWhile { .. } => return Err(self.unexpected("do-while loop")),
            BoundStatement::For { .. } => return Err(self.unexpected("for loop")),
            BoundStatement::ConditionalGoto {
                label,
                condition,
                jump_if_true,
                span,
            } => {
                self.emit_expression(condition)?;
                let opcode = if *jump_if_true { Opcode::BrTrue } else { Opcode::BrFalse };
                self.branch_to(opcode, *label, Some(*span));
            }
            BoundStatement::Goto { label, span } => self.branch_to(Opcode::Br, *label, *span),
            BoundStatement::Label { label } => {
                self.labels.insert(*label, self.instructions.len());
            }
            BoundStatement::Return { value, span } => {
                if let Some(value) = value {
                    self.emit_expression(value)?;
                }
                self.op(Opcode::Ret, *span);
            }
            BoundStatement::Nop { span } => self.op(Opcode::Nop, *span),
        }
        Ok(())
    }

    // ------------------------------------------------------------------------
    // Expressions
    // ------------------------------------------------------------------------

    fn emit_expression(&mut self, expression: &BoundExpression) -> Result<(), EmitError> {
        let span = expression.span();
        if let Some(constant) = expression.constant_value() {
            self.emit_constant(constant, span);
            return Ok(());
        }

        match expression {
            BoundExpression::Error { .. } => return Err(self.unexpected("error expression")),
            BoundExpression::CompoundAssignment { .. } => {
                return Err(self.unexpected("compound assignment"))
            }
            BoundExpression::Literal { value, .. } => self.emit_constant(value, span),
            BoundExpression::Unary { operator, operand, .. } => {
                self.emit_expression(operand)?;
                match operator.kind {
                    UnaryOperatorKind::Identity => {}
                    UnaryOperatorKind::LogicalNegation => {
                        self.op(Opcode::LdcI4_0, span);
                        self.op(Opcode::Ceq, span);
                    }
                    UnaryOperatorKind::Negation => self.op(Opcode::Neg, span),
                    UnaryOperatorKind::OnesComplement => self.op(Opcode::Not, span),
                }
            }
            BoundExpression::Binary {
                left, operator, right, ..
            } => {
                if operator.kind == BinaryOperatorKind::Addition && operator.left == PrimitiveType::String {
                    return self.emit_string_concat(expression, span);
                }
                self.emit_expression(left)?;
                self.emit_expression(right)?;
                self.emit_binary_operator(operator.kind, span);
            }
            BoundExpression::Variable { variable, .. } => self.emit_load(variable, span)?,
            BoundExpression::Assignment { variable, value, .. } => {
                self.emit_expression(value)?;
                self.op(Opcode::Dup, span);
                match variable {
                    VariableRef::Local(local) => {
                        let slot = self.local_slot(local)?;
                        self.push(Opcode::StLoc, Operand::Slot(slot), Some(span));
                    }
                    VariableRef::Parameter(parameter) => {
                        self.push(Opcode::StArg, Operand::Slot(parameter.ordinal), Some(span));
                    }
                }
            }
            BoundExpression::FieldAccess { variable, field, .. } => {
                let (opcode, slot) = match variable {
                    VariableRef::Local(local) => (Opcode::LdBLoc, self.local_slot(local)?),
                    VariableRef::Parameter(parameter) => (Opcode::LdBArg, parameter.ordinal),
                };
                self.push(opcode, Operand::Slots([slot, field.ordinal]), Some(span));
            }
            BoundExpression::FieldAssignment {
                variable, field, value, ..
            } => {
                let (opcode, slot) = match variable {
                    VariableRef::Local(local) => (Opcode::StBLoc, self.local_slot(local)?),
                    VariableRef::Parameter(parameter) => (Opcode::StBArg, parameter.ordinal),
                };
                self.emit_expression(value)?;
                self.op(Opcode::Dup, span);
                self.push(opcode, Operand::Slots([slot, field.ordinal]), Some(span));
            }
            BoundExpression::ArrayAccess { variable, indices, .. } => {
                self.emit_load(variable, span)?;
                for index in indices {
                    self.emit_expression(index)?;
                }
                self.op(Opcode::LdElem, span);
            }
            BoundExpression::ArrayAssignment {
                variable,
                indices,
                value,
                ..
            } => {
                self.emit_load(variable, span)?;
                for index in indices {
                    self.emit_expression(index)?;
                }
                self.emit_expression(value)?;
                self.op(Opcode::StElem, span);
            }
            BoundExpression::Call {
                function,
                namespace,
                arguments,
                is_async,
                ..
            } => {
                for argument in arguments {
                    self.emit_expression(argument)?;
                }
                let opcode = if *is_async { Opcode::CallT } else { Opcode::Call };
                let operand = match namespace {
                    Some(namespace) => Operand::Names(vec![namespace.clone(), function.name.clone()]),
                    None => Operand::Name(function.name.clone()),
                };
                self.push(opcode, operand, Some(span));
            }
            BoundExpression::Conversion { ty, expression, .. } => match ty {
                TypeSymbol::NamedBundle { namespace, alias } => {
                    let operand = if namespace == self.namespace {
                        Operand::Name(alias.clone())
                    } else {
                        Operand::Names(vec![namespace.clone(), alias.clone()])
                    };
                    self.push(Opcode::LdB, operand, Some(span));
                }
                _ => {
                    self.emit_expression(expression)?;
                    self.push(Opcode::ConvType, Operand::Type(ty.assembly_name().into_owned()), Some(span));
                }
            },
            BoundExpression::ObjectAllocation { ty, .. } => match ty {
                TypeSymbol::Array { value, rank } => {
                    let operand = Operand::Names(vec![value.assembly_name().into_owned(), rank.to_string()]);
                    self.push(Opcode::NewArr, operand, Some(span));
                }
                _ => return Err(self.unexpected("non-array allocation")),
            },
        }
        Ok(())
    }

    fn emit_constant(&mut self, constant: &ConstantValue, span: TextSpan) {
        match constant {
            ConstantValue::Int(value) => {
                self.push(Opcode::LdcI4, Operand::Int(*value), Some(span));
            }
            ConstantValue::Bool(true) => self.op(Opcode::LdcI4_1, span),
            ConstantValue::Bool(false) => self.op(Opcode::LdcI4_0, span),
            ConstantValue::String(value) => {
                self.push(Opcode::LdcS, Operand::String(value.clone()), Some(span));
            }
        }
    }

    fn emit_load(&mut self, variable: &VariableRef, span: TextSpan) -> Result<(), EmitError> {
        match variable {
            VariableRef::Local(local) => {
                let slot = self.local_slot(local)?;
                self.push(Opcode::LdLoc, Operand::Slot(slot), Some(span));
            }
            VariableRef::Parameter(parameter) => {
                self.push(Opcode::LdArg, Operand::Slot(parameter.ordinal), Some(span));
            }
        }
        Ok(())
    }

    fn emit_binary_operator(&mut self, kind: BinaryOperatorKind, span: TextSpan) {
        let opcodes: &[Opcode] = match kind {
            BinaryOperatorKind::Addition => &[Opcode::Add],
            BinaryOperatorKind::Subtraction => &[Opcode::Sub],
            BinaryOperatorKind::Multiplication => &[Opcode::Mul],
            BinaryOperatorKind::Division => &[Opcode::Div],
            BinaryOperatorKind::Remainder => &[Opcode::Rem],
            BinaryOperatorKind::BitwiseAnd | BinaryOperatorKind::LogicalAnd => &[Opcode::And],
            BinaryOperatorKind::BitwiseOr | BinaryOperatorKind::LogicalOr => &[Opcode::Or],
            BinaryOperatorKind::BitwiseXor => &[Opcode::Xor],
            BinaryOperatorKind::Equals => &[Opcode::Ceq],
            BinaryOperatorKind::NotEquals => &[Opcode::Ceq, Opcode::LdcI4_0, Opcode::Ceq],
            BinaryOperatorKind::Less => &[Opcode::Clt],
            BinaryOperatorKind::LessOrEquals => &[Opcode::Cgt, Opcode::LdcI4_0, Opcode::Ceq],
            BinaryOperatorKind::Greater => &[Opcode::Cgt],
            BinaryOperatorKind::GreaterOrEquals => &[Opcode::Clt, Opcode::LdcI4_0, Opcode::Ceq],
        };
        for &opcode in opcodes {
            self.op(opcode, span);
        }
    }

    /// `a + "x" + "y" + b` becomes `a; "xy"; b; addstr 3`.
    fn emit_string_concat(&mut self, expression: &BoundExpression, span: TextSpan) -> Result<(), EmitError> {
        let mut operands = Vec::new();
        flatten_concat(expression, &mut operands);

        let mut pieces = Vec::new();
        let mut pending = String::new();
        for operand in operands {
            match operand.constant_value() {
                Some(ConstantValue::String(text)) => pending.push_str(text),
                _ => {
                    if !pending.is_empty() {
                        pieces.push(ConcatPiece::Text(std::mem::take(&mut pending)));
                    }
                    pieces.push(ConcatPiece::Value(operand));
                }
            }
        }
        if !pending.is_empty() {
            pieces.push(ConcatPiece::Text(pending));
        }

        if pieces.is_empty() {
            self.push(Opcode::LdcS, Operand::String(String::new()), Some(span));
            return Ok(());
        }
        let count = pieces.len() as i32;
        for piece in pieces {
            match piece {
                ConcatPiece::Text(text) => {
                    self.push(Opcode::LdcS, Operand::String(text), Some(span));
                }
                ConcatPiece::Value(value) => self.emit_expression(value)?,
            }
        }
        self.push(Opcode::AddStr, Operand::Int(count), Some(span));
        Ok(())
    }
}

enum ConcatPiece<'e> {
    Text(String),
    Value(&'e BoundExpression),
}

fn flatten_concat<'e>(expression: &'e BoundExpression, out: &mut Vec<&'e BoundExpression>) {
    match expression {
        BoundExpression::Binary {
            left, operator, right, ..
        } if operator.kind == BinaryOperatorKind::Addition && operator.left == PrimitiveType::String => {
            flatten_concat(left, out);
            flatten_concat(right, out);
        }
        _ => out.push(expression),
    }
}
