//! Instructions and their operands.

use crate::error::EmitError;
use crate::opcode::{ArgumentKind, Opcode};
use nebula_binder::LabelId;
use nebula_core::TextSpan;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    None,
    Int(i32),
    String(String),
    Slot(u32),
    Type(String),
    /// A branch target before label resolution.
    Label(LabelId),
    Name(String),
    /// `namespace name`, `type rank` and similar pairs.
    Names(Vec<String>),
    /// `slot ordinal` for bundle field access.
    Slots([u32; 2]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    pub opcode: Opcode,
    pub operand: Operand,
    /// `None` for jumps introduced by lowering.
    pub span: Option<TextSpan>,
}

impl Instruction {
    pub fn new(opcode: Opcode, operand: Operand, span: Option<TextSpan>) -> Self {
        Self { opcode, operand, span }
    }

    /// Render the operand the way the opcode expects it.
    pub fn format_arguments(&self) -> Result<String, EmitError> {
        let text = match (self.opcode.argument_kind(), &self.operand) {
            (ArgumentKind::None, Operand::None) => String::new(),
            (ArgumentKind::Int, Operand::Int(value)) => value.to_string(),
            (ArgumentKind::String, Operand::String(value)) => format!("\"{}\"", value.replace('"', "\"\"")),
            (ArgumentKind::Slot, Operand::Slot(slot)) => slot.to_string(),
            (ArgumentKind::Type, Operand::Type(name)) => name.clone(),
            (ArgumentKind::Generic, Operand::Name(name)) => name.clone(),
            (ArgumentKind::Generic, Operand::Names(names)) => names.join(" "),
            (ArgumentKind::Generic, Operand::Slots([slot, ordinal])) => format!("{slot} {ordinal}"),
            (_, operand) => {
                return Err(EmitError::ArgumentMismatch {
                    opcode: self.opcode,
                    operand: format!("{operand:?}"),
                })
            }
        };
        Ok(text)
    }
}
