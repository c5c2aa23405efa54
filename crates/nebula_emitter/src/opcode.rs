//! The instruction set.

use std::fmt;

/// What an opcode expects as its operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentKind {
    None,
    /// Decimal integer; branch targets are resolved to instruction indices.
    Int,
    /// Double-quoted string constant.
    String,
    /// Local or parameter slot.
    Slot,
    /// Type name.
    Type,
    /// One or more space-separated tokens.
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Opcode {
    Nop,
    Pop,
    Dup,
    Call,
    Callvirt,
    ConvType,
    Ret,
    Br,
    BrTrue,
    BrFalse,
    Ceq,
    Neg,
    Not,
    And,
    Or,
    Xor,
    Clt,
    Cgt,
    CallT,
    Wait,
    WaitN,
    Notify,
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    AddStr,
    LdcI4_0,
    LdcI4_1,
    LdcI4,
    LdcS,
    LdB,
    NewArr,
    LdArg,
    LdBArg,
    LdLoc,
    LdBLoc,
    LdElem,
    StLoc,
    StBLoc,
    StArg,
    StBArg,
    StElem,
}

impl Opcode {
    /// The lowercase mnemonic used in assembly text.
    pub fn name(self) -> &'static str {
        match self {
            Opcode::Nop => "nop",
            Opcode::Pop => "pop",
            Opcode::Dup => "dup",
            Opcode::Call => "call",
            Opcode::Callvirt => "callvirt",
            Opcode::ConvType => "convtype",
            Opcode::Ret => "ret",
            Opcode::Br => "br",
            Opcode::BrTrue => "brtrue",
            Opcode::BrFalse => "brfalse",
            Opcode::Ceq => "ceq",
            Opcode::Neg => "neg",
            Opcode::Not => "not",
            Opcode::And => "and",
            Opcode::Or => "or",
            Opcode::Xor => "xor",
            Opcode::Clt => "clt",
            Opcode::Cgt => "cgt",
            Opcode::CallT => "call_t",
            Opcode::Wait => "wait",
            Opcode::WaitN => "wait_n",
            Opcode::Notify => "notify",
            Opcode::Add => "add",
            Opcode::Sub => "sub",
            Opcode::Mul => "mul",
            Opcode::Div => "div",
            Opcode::Rem => "rem",
            Opcode::AddStr => "addstr",
            Opcode::LdcI4_0 => "ldc_i4_0",
            Opcode::LdcI4_1 => "ldc_i4_1",
            Opcode::LdcI4 => "ldc_i4",
            Opcode::LdcS => "ldc_s",
            Opcode::LdB => "ld_b",
            Opcode::NewArr => "newarr",
            Opcode::LdArg => "ldarg",
            Opcode::LdBArg => "ldbarg",
            Opcode::LdLoc => "ldloc",
            Opcode::LdBLoc => "ldbloc",
            Opcode::LdElem => "ldelem",
            Opcode::StLoc => "stloc",
            Opcode::StBLoc => "stbloc",
            Opcode::StArg => "starg",
            Opcode::StBArg => "stbarg",
            Opcode::StElem => "stelem",
        }
    }

    pub fn argument_kind(self) -> ArgumentKind {
        match self {
            Opcode::LdcS => ArgumentKind::String,
            Opcode::LdcI4 | Opcode::AddStr | Opcode::Br | Opcode::BrTrue | Opcode::BrFalse => {
                ArgumentKind::Int
            }
            Opcode::LdArg | Opcode::LdLoc | Opcode::StLoc | Opcode::StArg => ArgumentKind::Slot,
            Opcode::ConvType => ArgumentKind::Type,
            Opcode::Call
            | Opcode::CallT
            | Opcode::Callvirt
            | Opcode::LdB
            | Opcode::NewArr
            | Opcode::LdBArg
            | Opcode::LdBLoc
            | Opcode::StBArg
            | Opcode::StBLoc => ArgumentKind::Generic,
            _ => ArgumentKind::None,
        }
    }

    pub fn is_branch(self) -> bool {
        matches!(self, Opcode::Br | Opcode::BrTrue | Opcode::BrFalse)
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
